//! # LearnPath Core
//!
//! Shared types and traits for the LearnPath backend.
//!
//! This crate provides:
//! - The JSON shapes sent to the front end
//! - The raw reply representation returned by generation providers
//! - Provider traits for generation, web search and grounded answering

pub mod traits;
pub mod types;

pub use traits::{AnsweringProvider, GenerationProvider, SearchProvider};
pub use types::{
    CardDeck, ChatMessage, ChatRole, Citation, ContentSegment, Explanation, ExamplesResult,
    GenerationRequest, GoalList, GroundedAnswer, LearningCard, MiniModule, MiniModuleContent,
    ModuleContent, QuestionSet, RawModelReply, RealWorldExample, Resource, Roadmap, SearchQuery,
    SearchResult, SegmentKind
};
