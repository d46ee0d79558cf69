//! # Response Normalization
//!
//! Turns unpredictable LLM replies into the strict JSON shapes the front end
//! reads.
//!
//! - [`extract`]: recovers plain text from a raw reply, including replies
//!   that leaked a stringified `TextBlock(...)` content block
//! - [`parser`]: layered structured parsing (direct, repaired, line
//!   heuristic) against a [`parser::TargetShape`]
//! - [`sections`]: label- and paragraph-based splitting of prose replies
//! - [`markdown`]: light cleanup of model-written markdown
//! - [`citations`]: bare-domain citation labels for source URLs

pub mod citations;
pub mod extract;
pub mod lines;
pub mod markdown;
pub mod parser;
pub mod repair;
pub mod sections;
pub mod shapes;

pub use citations::CitationFormatter;
pub use extract::{extract, extract_text};
pub use markdown::tidy_markdown;
pub use parser::{Container, LineRule, Parsed, TargetShape, parse};
pub use shapes::{ExampleDraft, ExampleList};
