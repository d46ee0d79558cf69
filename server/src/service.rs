//! The learning service: prompt, provider call, normalization.
//!
//! Every route runs the same pipeline. A prompt is rendered from the
//! catalog, the provider is called through the retrying invoker, and the
//! reply is extracted and shaped. Handlers only validate input and
//! serialize what comes back.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, ProviderConfig};
use errors::{NormalizeError, ProviderError};
use lp_core::{
    AnsweringProvider, CardDeck, ChatMessage, Explanation, ExamplesResult, GenerationProvider,
    GenerationRequest, GoalList, MiniModule, ModuleContent, QuestionSet, RealWorldExample,
    Resource, Roadmap, SearchProvider, SearchQuery
};
use normalize::sections::{mini_module_sections, principle_sections};
use normalize::{CitationFormatter, ExampleList, TargetShape, extract, extract_text, parse, tidy_markdown};
use prompts::{PromptCatalog, PromptName, PromptRequest};
use providers::{AnthropicClient, ExaClient, PerplexityClient, RetryingInvoker};

use crate::error::Result;
use crate::fallback;
use crate::requests::GoalsInput;
use crate::sessions::SessionStore;
use crate::telemetry::Telemetry;

/// Example type used when the model did not label one.
const DEFAULT_EXAMPLE_TYPE: &str = "application";

/// The three external collaborators.
#[derive(Clone)]
pub struct Providers {
    pub generator: Arc<dyn GenerationProvider>,
    pub search: Arc<dyn SearchProvider>,
    pub answerer: Arc<dyn AnsweringProvider>
}

impl Providers {
    /// HTTP clients for Anthropic, Exa and Perplexity.
    pub fn from_config(config: &ProviderConfig) -> std::result::Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        Ok(Self {
            generator: Arc::new(AnthropicClient::new(&config.anthropic, timeout)?),
            search: Arc::new(ExaClient::new(&config.exa, timeout)?),
            answerer: Arc::new(PerplexityClient::new(&config.perplexity, timeout)?)
        })
    }
}

/// Model parameters shared by every generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub model: String,
    pub short_max_tokens: u32,
    pub long_max_tokens: u32,
    pub resource_count: usize,
    pub dummy_mode: bool
}

impl From<&Config> for GenerationSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.providers.anthropic.model.clone(),
            short_max_tokens: config.providers.anthropic.short_max_tokens,
            long_max_tokens: config.providers.anthropic.long_max_tokens,
            resource_count: config.providers.exa.num_results,
            dummy_mode: config.server.dummy_mode
        }
    }
}

pub struct LearningService {
    prompts: Arc<PromptCatalog>,
    providers: Providers,
    invoker: RetryingInvoker,
    sessions: Arc<SessionStore>,
    settings: GenerationSettings,
    citations: CitationFormatter
}

impl LearningService {
    pub fn new(
        prompts: Arc<PromptCatalog>,
        providers: Providers,
        invoker: RetryingInvoker,
        sessions: Arc<SessionStore>,
        settings: GenerationSettings
    ) -> Self {
        Self {
            prompts,
            providers,
            invoker,
            sessions,
            settings,
            citations: CitationFormatter
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub async fn generate_goals(&self, topic: &str, proficiency: &str) -> Result<GoalList> {
        if self.settings.dummy_mode {
            return Ok(fallback::dummy_goals());
        }

        let prompt = self.prompts.render(
            &PromptRequest::new(PromptName::GoalsPrompt)
                .param("topic", topic)
                .param("proficiency", proficiency)
        )?;
        let text = self
            .complete("generate_goals", prompt, self.settings.short_max_tokens, Vec::new())
            .await?;
        Ok(shaped::<GoalList>(&text)?)
    }

    pub async fn generate_roadmap(
        &self,
        topic: &str,
        proficiency: &str,
        goals: &GoalsInput
    ) -> Result<Roadmap> {
        if self.settings.dummy_mode {
            return Ok(fallback::dummy_roadmap());
        }

        let prompt = self.prompts.render(
            &PromptRequest::new(PromptName::RoadmapPrompt)
                .param("topic", topic)
                .param("proficiency", proficiency)
                .param("goals_text", goals.goals_text())
        )?;
        let text = self
            .complete("generate_roadmap", prompt, self.settings.long_max_tokens, Vec::new())
            .await?;
        let roadmap = tidy_markdown(&text);

        let resources = self.find_resources(topic).await?;
        tracing::info!(topic, resources = resources.len(), "Roadmap generated");

        Ok(Roadmap { roadmap, resources })
    }

    async fn find_resources(&self, topic: &str) -> Result<Vec<Resource>> {
        let query = SearchQuery {
            query: self
                .prompts
                .render(&PromptRequest::new(PromptName::ResourcesQuery).param("topic", topic))?,
            result_count: self.settings.resource_count
        };
        let results = self
            .invoker
            .invoke("search_resources", || self.providers.search.search(&query))
            .await?;

        Ok(results
            .into_iter()
            .enumerate()
            .map(|(position, result)| Resource::from_search(result, position))
            .collect())
    }

    pub async fn generate_module_content(
        &self,
        topic: &str,
        proficiency: &str,
        goals: &GoalsInput
    ) -> Result<ModuleContent> {
        if self.settings.dummy_mode {
            return Ok(fallback::dummy_module_content());
        }

        let goals_text = goals.goals_text();
        let render = |name: PromptName| {
            self.prompts.render(
                &PromptRequest::new(name)
                    .param("topic", topic)
                    .param("proficiency", proficiency)
                    .param("goals_text", goals_text.as_str())
            )
        };
        let principles_prompt = render(PromptName::ModuleFirstPrinciples)?;
        let key_info_prompt = render(PromptName::ModuleKeyInformation)?;
        let exercise_prompt = render(PromptName::ModulePracticeExercise)?;

        let max_tokens = self.settings.short_max_tokens;
        let (principles, key_information, practice_exercise) = tokio::try_join!(
            self.complete("module_first_principles", principles_prompt, max_tokens, Vec::new()),
            self.complete("module_key_information", key_info_prompt, max_tokens, Vec::new()),
            self.complete("module_practice_exercise", exercise_prompt, max_tokens, Vec::new())
        )?;

        let sections = principle_sections(&principles);
        Ok(ModuleContent {
            first_principles: tidy_markdown(&sections.first_principles),
            fundamental_truths: tidy_markdown(&sections.fundamental_truths),
            cross_domain_connections: tidy_markdown(&sections.cross_domain_connections),
            key_information: tidy_markdown(&key_information),
            practice_exercise: tidy_markdown(&practice_exercise)
        })
    }

    /// Three cards; a reply that cannot be shaped yields the generic deck.
    pub async fn generate_learning_cards(
        &self,
        topic: &str,
        proficiency: &str,
        session: Option<&str>
    ) -> Result<CardDeck> {
        let prompt = self.prompts.render(
            &PromptRequest::new(PromptName::LearningCards)
                .param("topic", topic)
                .param("proficiency", proficiency)
        )?;
        let text = self
            .complete("generate_learning_cards", prompt, self.settings.short_max_tokens, Vec::new())
            .await?;

        let deck = match shaped::<CardDeck>(&text) {
            Ok(deck) => deck,
            Err(e) => {
                tracing::warn!(topic, error = %e, "Serving fallback learning cards");
                Telemetry::record_fallback("generate_learning_cards");
                fallback::learning_cards(topic)
            }
        };

        if let Some(session_id) = session {
            self.sessions.set_card_descriptions(
                session_id,
                deck.cards.iter().map(|c| c.description.clone()).collect()
            );
        }
        Ok(deck)
    }

    pub async fn generate_questions(&self, text: &str) -> Result<QuestionSet> {
        let prompt = self
            .prompts
            .render(&PromptRequest::new(PromptName::ComprehensionQuestions).param("text", text))?;
        let reply = self
            .complete("generate_questions", prompt, self.settings.short_max_tokens, Vec::new())
            .await?;
        Ok(shaped::<QuestionSet>(&reply)?)
    }

    pub async fn generate_examples(&self, text: &str, topic: &str) -> Result<ExamplesResult> {
        let prompt = self.prompts.render(
            &PromptRequest::new(PromptName::RealWorldExamples)
                .param("text", text)
                .param("topic", topic)
        )?;
        let answer = self
            .invoker
            .invoke("generate_examples", || self.providers.answerer.answer(&prompt))
            .await?;

        let drafts = shaped::<ExampleList>(&extract_text(&answer.content))?;
        let timestamp = Utc::now().to_rfc3339();
        let examples = drafts
            .items
            .into_iter()
            .map(|draft| RealWorldExample {
                description: draft.description,
                example_type: draft
                    .kind
                    .unwrap_or_else(|| DEFAULT_EXAMPLE_TYPE.to_string()),
                timestamp: timestamp.clone(),
                text: text.to_string(),
                topic: topic.to_string()
            })
            .collect();

        let (citations, skipped) = self.citations.partition(&answer.citations);
        if !skipped.is_empty() {
            tracing::warn!(skipped = ?skipped, "Dropped citations without a usable host");
            Telemetry::record_skipped_citations(skipped.len());
        }

        Ok(ExamplesResult {
            examples,
            citations
        })
    }

    /// Explains `sentence`, continuing the session's conversation about
    /// `topic` when there is one.
    pub async fn explain_sentence(
        &self,
        sentence: &str,
        topic: &str,
        session: Option<&str>
    ) -> Result<Explanation> {
        let prompt = self.prompts.render(
            &PromptRequest::new(PromptName::SentenceExplanation)
                .param("sentence", sentence)
                .param("topic", topic)
        )?;
        let history = session
            .map(|id| self.sessions.history(id, topic))
            .unwrap_or_default();
        tracing::debug!(topic, prior_messages = history.len(), "Explaining sentence");

        let text = self
            .complete("explain_sentence", prompt.clone(), self.settings.short_max_tokens, history)
            .await?;
        let explanation = tidy_markdown(&text);

        if let Some(session_id) = session {
            self.sessions
                .record_turn(session_id, topic, prompt, explanation.clone());
        }
        Ok(Explanation { explanation })
    }

    pub async fn generate_mini_module(
        &self,
        topic: &str,
        proficiency: &str,
        session: Option<&str>
    ) -> Result<MiniModule> {
        let cards = session
            .map(|id| self.sessions.card_descriptions(id))
            .unwrap_or_default();
        let prompt = self.prompts.render(
            &PromptRequest::new(PromptName::MiniModule)
                .param("topic", topic)
                .param("proficiency", proficiency)
                .param("card_context", card_context(&cards))
        )?;
        let text = self
            .complete("generate_mini_module", prompt, self.settings.long_max_tokens, Vec::new())
            .await?;

        match mini_module_sections(&tidy_markdown(&text)) {
            Some(content) => Ok(MiniModule {
                topic: topic.to_string(),
                proficiency: proficiency.to_string(),
                content
            }),
            None => {
                tracing::warn!(topic, "Mini module reply had fewer than three sections");
                Telemetry::record_fallback("generate_mini_module");
                Ok(fallback::mini_module(topic, proficiency))
            }
        }
    }

    /// One generation through the invoker, returning the extracted text.
    async fn complete(
        &self,
        operation: &'static str,
        prompt: String,
        max_tokens: u32,
        history: Vec<ChatMessage>
    ) -> Result<String> {
        let system = self.prompts.get(PromptName::SystemPrompt, &HashMap::new())?;
        let request = GenerationRequest::new(&self.settings.model, max_tokens)
            .with_system(system)
            .with_messages(history)
            .with_user(prompt);

        let reply = self
            .invoker
            .invoke(operation, || self.providers.generator.generate(&request))
            .await?;
        let text = extract(&reply);
        tracing::debug!(operation, chars = text.len(), "Provider reply extracted");
        Ok(text)
    }
}

/// Parses `text` into `S`, recording which strategy worked.
fn shaped<S: TargetShape>(text: &str) -> std::result::Result<S, NormalizeError> {
    match parse::<S>(text) {
        Ok(parsed) => {
            tracing::debug!(shape = S::NAME, strategy = %parsed.strategy, "Reply shaped");
            Telemetry::record_parse(S::NAME, parsed.strategy.as_ref());
            Ok(parsed.value)
        }
        Err(e) => {
            tracing::warn!(shape = S::NAME, error = %e, "Reply could not be shaped");
            Telemetry::record_parse(S::NAME, "failed");
            Err(e)
        }
    }
}

fn card_context(descriptions: &[String]) -> String {
    if descriptions.is_empty() {
        return String::new();
    }
    let listed: Vec<String> = descriptions.iter().map(|d| format!("- {d}")).collect();
    format!(
        "The learner has just reviewed these cards:\n{}\n",
        listed.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_context_lists_descriptions() {
        assert_eq!(card_context(&[]), "");
        assert_eq!(
            card_context(&["Pitch".to_string(), "Rhythm".to_string()]),
            "The learner has just reviewed these cards:\n- Pitch\n- Rhythm\n"
        );
    }
}
