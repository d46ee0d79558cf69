//! # Prompt Catalog
//!
//! Named prompt templates with `{placeholder}` substitution.
//!
//! - Templates come from a directory of `<name>.txt` files or from the set
//!   compiled into this crate
//! - Each template is parsed once and cached for the life of the catalog
//! - Rendering fails with `PromptError::MissingParameter` when a placeholder
//!   has no value; nothing is ever sent with a hole in it

pub mod catalog;
pub mod template;

pub use catalog::{PromptCatalog, PromptName, PromptRequest, PromptSource};
pub use template::PromptTemplate;
