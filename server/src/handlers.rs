//! HTTP request handlers for the LearnPath routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use lp_core::{
    CardDeck, ExamplesResult, Explanation, GoalList, MiniModule, ModuleContent, QuestionSet,
    Roadmap
};

use crate::error::Result;
use crate::requests::{
    ExamplesRequest, ExplainRequest, PlanRequest, QuestionsRequest, SessionId, TopicRequest,
    ValidatedJson
};
use crate::state::AppState;
use crate::telemetry::{RequestTimer, Telemetry};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String
}

/// Counts, times and error-codes one route invocation.
async fn observed<T, F>(route: &'static str, work: F) -> Result<Json<T>>
where
    F: Future<Output = Result<T>>
{
    Telemetry::record_request(route);
    let timer = RequestTimer::new(route);
    let outcome = work.await;
    timer.finish();

    match outcome {
        Ok(value) => Ok(Json(value)),
        Err(e) => {
            Telemetry::record_error(route, e.code());
            tracing::warn!(route, code = e.code(), error = %e, "Request failed");
            Err(e)
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string()
    })
}

/// Prometheus text exposition, or 404 when metrics are disabled.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string())
    }
}

/// POST /generate_goals
pub async fn generate_goals(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<TopicRequest>
) -> Result<Json<GoalList>> {
    tracing::debug!(topic = %req.topic, proficiency = %req.proficiency, "Generating goals");
    observed(
        "generate_goals",
        state.service.generate_goals(&req.topic, &req.proficiency)
    )
    .await
}

/// POST /generate_roadmap
pub async fn generate_roadmap(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<PlanRequest>
) -> Result<Json<Roadmap>> {
    tracing::debug!(topic = %req.topic, proficiency = %req.proficiency, "Generating roadmap");
    observed(
        "generate_roadmap",
        state
            .service
            .generate_roadmap(&req.topic, &req.proficiency, &req.goals)
    )
    .await
}

/// POST /generate_module_content
pub async fn generate_module_content(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<PlanRequest>
) -> Result<Json<ModuleContent>> {
    tracing::debug!(topic = %req.topic, "Generating module content");
    observed(
        "generate_module_content",
        state
            .service
            .generate_module_content(&req.topic, &req.proficiency, &req.goals)
    )
    .await
}

/// POST /generate_learning_cards
pub async fn generate_learning_cards(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    ValidatedJson(req): ValidatedJson<TopicRequest>
) -> Result<Json<CardDeck>> {
    observed(
        "generate_learning_cards",
        state
            .service
            .generate_learning_cards(&req.topic, &req.proficiency, session.as_deref())
    )
    .await
}

/// POST /generate_questions
pub async fn generate_questions(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<QuestionsRequest>
) -> Result<Json<QuestionSet>> {
    observed("generate_questions", state.service.generate_questions(&req.text)).await
}

/// POST /generate_examples
pub async fn generate_examples(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ExamplesRequest>
) -> Result<Json<ExamplesResult>> {
    observed(
        "generate_examples",
        state.service.generate_examples(&req.text, &req.topic)
    )
    .await
}

/// POST /explain_sentence
pub async fn explain_sentence(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    ValidatedJson(req): ValidatedJson<ExplainRequest>
) -> Result<Json<Explanation>> {
    observed(
        "explain_sentence",
        state
            .service
            .explain_sentence(&req.sentence, &req.topic, session.as_deref())
    )
    .await
}

/// POST /generate_mini_module
pub async fn generate_mini_module(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    ValidatedJson(req): ValidatedJson<TopicRequest>
) -> Result<Json<MiniModule>> {
    observed(
        "generate_mini_module",
        state
            .service
            .generate_mini_module(&req.topic, &req.proficiency, session.as_deref())
    )
    .await
}
