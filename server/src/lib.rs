//! # LearnPath Server
//!
//! HTTP backend that turns a learner's topic and proficiency into study
//! material. Replies from the generation, search and grounded-answer
//! providers are normalized into the JSON shapes the front end reads.
//!
//! ## Endpoints
//!
//! - `POST /generate_goals` - learning goals for a topic
//! - `POST /generate_roadmap` - phased roadmap plus web resources
//! - `POST /generate_module_content` - first principles, key information and
//!   a practice exercise
//! - `POST /generate_learning_cards` - exactly three flashcards
//! - `POST /generate_questions` - exactly three comprehension questions
//! - `POST /generate_examples` - real-world examples with citations
//! - `POST /explain_sentence` - plain-language explanation, with
//!   per-session history
//! - `POST /generate_mini_module` - short module built on the last cards
//! - `GET /health` - Health check endpoint
//! - `GET /metrics` - Prometheus metrics endpoint
//!
//! Clients may send `X-Session-Id` to scope explanation history and card
//! context; without it every request is stateless.

pub mod error;
pub mod fallback;
pub mod handlers;
pub mod requests;
pub mod routes;
pub mod server;
pub mod service;
pub mod sessions;
pub mod state;
pub mod telemetry;

pub use error::ApiError;
pub use routes::create_router;
pub use server::LearnPathServer;
pub use service::{LearningService, Providers};
pub use state::AppState;
