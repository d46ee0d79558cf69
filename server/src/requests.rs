//! Request bodies and the extractors that validate them.
//!
//! Bodies must be declared as JSON and every required field must be present
//! and non-blank; all missing fields are reported together.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::request::Parts
};
use errors::RequestError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ApiError;

/// Header carrying the client-chosen session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

/// A request body validated with `validator` after deserializing.
///
/// `FIELDS` fixes the order in which missing fields are reported.
pub trait RequestBody: DeserializeOwned + Validate {
    const FIELDS: &'static [&'static str];
}

/// Goals as the front end sends them: a list, or newline-separated text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GoalsInput {
    List(Vec<String>),
    Text(String)
}

impl Default for GoalsInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl GoalsInput {
    /// One `- goal` line per goal.
    pub fn goals_text(&self) -> String {
        self.goals()
            .map(|g| format!("- {}", g.strip_prefix("- ").unwrap_or(g)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn goals(&self) -> impl Iterator<Item = &str> {
        let lines: Vec<&str> = match self {
            Self::List(goals) => goals.iter().map(String::as_str).collect(),
            Self::Text(text) => text.lines().collect()
        };
        lines.into_iter().map(str::trim).filter(|g| !g.is_empty())
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn has_goals(goals: &GoalsInput) -> Result<(), ValidationError> {
    if goals.goals().next().is_none() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Treats an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TopicRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub proficiency: String
}

impl RequestBody for TopicRequest {
    const FIELDS: &'static [&'static str] = &["topic", "proficiency"];
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlanRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub proficiency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "has_goals"))]
    pub goals: GoalsInput
}

impl RequestBody for PlanRequest {
    const FIELDS: &'static [&'static str] = &["topic", "proficiency", "goals"];
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionsRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub text: String
}

impl RequestBody for QuestionsRequest {
    const FIELDS: &'static [&'static str] = &["text"];
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExamplesRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub topic: String
}

impl RequestBody for ExamplesRequest {
    const FIELDS: &'static [&'static str] = &["text", "topic"];
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExplainRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub sentence: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "non_blank"))]
    pub topic: String
}

impl RequestBody for ExplainRequest {
    const FIELDS: &'static [&'static str] = &["sentence", "topic"];
}

/// JSON body deserialized and then validated.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: RequestBody,
    S: Send + Sync
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        validate_body::<T>(value).map(ValidatedJson)
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => RequestError::not_json().into(),
        other => RequestError::MalformedBody {
            reason: format!("Invalid JSON body: {}", other.body_text())
        }
        .into()
    }
}

/// Typed deserialization, then field validation.
pub fn validate_body<T: RequestBody>(value: Value) -> Result<T, ApiError> {
    if !value.is_object() {
        return Err(RequestError::MalformedBody {
            reason: "Request body must be a JSON object".to_string()
        }
        .into());
    }

    let body: T = serde_json::from_value(value).map_err(|e| RequestError::MalformedBody {
        reason: format!("Invalid request body: {e}")
    })?;
    body.validate().map_err(|errors| missing_fields::<T>(&errors))?;
    Ok(body)
}

fn missing_fields<T: RequestBody>(errors: &ValidationErrors) -> ApiError {
    let failed = errors.field_errors();
    let mut fields: Vec<String> = T::FIELDS
        .iter()
        .filter(|field| failed.contains_key(**field))
        .map(|field| (*field).to_string())
        .collect();
    let mut extra: Vec<String> = failed
        .keys()
        .map(ToString::to_string)
        .filter(|key| !T::FIELDS.contains(&key.as_str()))
        .collect();
    extra.sort();
    fields.extend(extra);
    RequestError::MissingFields { fields }.into()
}

/// The `X-Session-Id` header, if the client sent a usable one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionId(pub Option<String>);

impl SessionId {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from);
        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_missing_fields_are_listed() {
        let err = validate_body::<TopicRequest>(json!({"proficiency": "  "})).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: topic, proficiency");
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        let err = validate_body::<QuestionsRequest>(json!(["text"])).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Request(RequestError::MalformedBody { .. })
        ));
    }

    #[test]
    fn test_wrong_field_type_is_malformed() {
        let err = validate_body::<QuestionsRequest>(json!({"text": 42})).unwrap_err();
        assert!(err.to_string().starts_with("Invalid request body"));
    }

    #[test]
    fn test_goals_accept_list_or_text() {
        let plan: PlanRequest = validate_body(json!({
            "topic": "Rust",
            "proficiency": "beginner",
            "goals": ["Ownership", "Traits"]
        }))
        .unwrap();
        assert_eq!(plan.goals.goals_text(), "- Ownership\n- Traits");

        let plan: PlanRequest = validate_body(json!({
            "topic": "Rust",
            "proficiency": "beginner",
            "goals": "- Ownership\n\nTraits"
        }))
        .unwrap();
        assert_eq!(plan.goals.goals_text(), "- Ownership\n- Traits");
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let err = validate_body::<ExplainRequest>(json!({"sentence": null, "topic": "Rust"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: sentence");
    }

    #[test]
    fn test_missing_fields_follow_declaration_order() {
        let err = validate_body::<PlanRequest>(json!({"goals": "  \n "})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: topic, proficiency, goals"
        );
    }

    #[test]
    fn test_empty_goal_list_counts_as_missing() {
        let err = validate_body::<PlanRequest>(json!({
            "topic": "Rust",
            "proficiency": "beginner",
            "goals": []
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: goals");
    }
}
