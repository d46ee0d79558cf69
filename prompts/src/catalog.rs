//! Prompt catalog: lookup, caching and rendering of named templates.

use errors::PromptError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

use crate::template::PromptTemplate;

/// Templates the LearnPath routes render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum PromptName {
    SystemPrompt,
    GoalsPrompt,
    RoadmapPrompt,
    ResourcesQuery,
    ModuleFirstPrinciples,
    ModuleKeyInformation,
    ModulePracticeExercise,
    LearningCards,
    ComprehensionQuestions,
    RealWorldExamples,
    SentenceExplanation,
    MiniModule
}

impl PromptName {
    /// Every template the server needs before it can answer any route.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

const EMBEDDED: &[(&str, &str)] = &[
    ("system_prompt", include_str!("../templates/system_prompt.txt")),
    ("goals_prompt", include_str!("../templates/goals_prompt.txt")),
    ("roadmap_prompt", include_str!("../templates/roadmap_prompt.txt")),
    ("resources_query", include_str!("../templates/resources_query.txt")),
    (
        "module_first_principles",
        include_str!("../templates/module_first_principles.txt")
    ),
    (
        "module_key_information",
        include_str!("../templates/module_key_information.txt")
    ),
    (
        "module_practice_exercise",
        include_str!("../templates/module_practice_exercise.txt")
    ),
    ("learning_cards", include_str!("../templates/learning_cards.txt")),
    (
        "comprehension_questions",
        include_str!("../templates/comprehension_questions.txt")
    ),
    ("real_world_examples", include_str!("../templates/real_world_examples.txt")),
    ("sentence_explanation", include_str!("../templates/sentence_explanation.txt")),
    ("mini_module", include_str!("../templates/mini_module.txt")),
];

/// Where template text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// The set compiled into this crate.
    Embedded,
    /// `<dir>/<name>.txt` files, read on first use.
    Directory(PathBuf)
}

/// A template name plus the values for its placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRequest {
    pub name: String,
    pub params: HashMap<String, String>
}

impl PromptRequest {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_string(),
            params: HashMap::new()
        }
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

pub struct PromptCatalog {
    source: PromptSource,
    cache: RwLock<HashMap<String, Arc<PromptTemplate>>>
}

impl PromptCatalog {
    pub fn new(source: PromptSource) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new())
        }
    }

    pub fn embedded() -> Self {
        Self::new(PromptSource::Embedded)
    }

    pub fn from_directory(dir: impl Into<PathBuf>) -> Self {
        Self::new(PromptSource::Directory(dir.into()))
    }

    /// Parsed template, loading and caching it on first use.
    pub fn template(&self, name: &str) -> Result<Arc<PromptTemplate>, PromptError> {
        if let Some(template) = self.cache.read().get(name) {
            return Ok(Arc::clone(template));
        }

        let text = self.load(name)?;
        let template = Arc::new(PromptTemplate::parse(name, text.trim()));

        // Another caller may have won the race; keep whichever landed first.
        let mut cache = self.cache.write();
        let entry = cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&template));
        tracing::debug!(template = name, "Prompt template loaded");
        Ok(Arc::clone(entry))
    }

    pub fn get(
        &self,
        name: impl AsRef<str>,
        params: &HashMap<String, String>
    ) -> Result<String, PromptError> {
        self.template(name.as_ref())?.render(params)
    }

    pub fn render(&self, request: &PromptRequest) -> Result<String, PromptError> {
        self.get(&request.name, &request.params)
    }

    pub fn placeholders(&self, name: impl AsRef<str>) -> Result<Vec<String>, PromptError> {
        Ok(self
            .template(name.as_ref())?
            .placeholders()
            .into_iter()
            .map(String::from)
            .collect())
    }

    /// Loads every named template now so a bad directory fails at startup.
    pub fn preload<I, N>(&self, names: I) -> Result<usize, PromptError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>
    {
        let mut count = 0;
        for name in names {
            self.template(name.as_ref())?;
            count += 1;
        }
        Ok(count)
    }

    fn load(&self, name: &str) -> Result<String, PromptError> {
        let not_found = || PromptError::TemplateNotFound {
            name: name.to_string()
        };

        if name.is_empty()
            || !name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        {
            return Err(not_found());
        }

        match &self.source {
            PromptSource::Embedded => EMBEDDED
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, text)| (*text).to_string())
                .ok_or_else(not_found),
            PromptSource::Directory(dir) => {
                let path = dir.join(format!("{name}.txt"));
                match std::fs::read_to_string(&path) {
                    Ok(text) => Ok(text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
                    Err(e) => Err(PromptError::Io {
                        name: name.to_string(),
                        reason: e.to_string()
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_every_named_template_is_embedded() {
        let catalog = PromptCatalog::embedded();
        assert_eq!(catalog.preload(PromptName::all()).unwrap(), EMBEDDED.len());
    }

    #[test]
    fn test_embedded_templates_render_with_their_placeholders() {
        let catalog = PromptCatalog::embedded();
        for name in PromptName::all() {
            let params: HashMap<String, String> = catalog
                .placeholders(name)
                .unwrap()
                .into_iter()
                .map(|p| (p, "value".to_string()))
                .collect();
            let rendered = catalog.get(name, &params).unwrap();
            assert!(!rendered.is_empty(), "{name} rendered empty");
            for key in params.keys() {
                assert!(
                    !rendered.contains(&format!("{{{key}}}")),
                    "{name} left {key} unresolved"
                );
            }
        }
    }

    #[test]
    fn test_goals_prompt_requires_topic_and_proficiency() {
        let catalog = PromptCatalog::embedded();
        let request = PromptRequest::new(PromptName::GoalsPrompt).param("topic", "music theory");
        let err = catalog.render(&request).unwrap_err();
        assert!(matches!(
            err,
            PromptError::MissingParameter { ref parameter, .. } if parameter == "proficiency"
        ));
    }

    #[test]
    fn test_resources_query_matches_search_wording() {
        let catalog = PromptCatalog::embedded();
        let request = PromptRequest::new(PromptName::ResourcesQuery).param("topic", "rust");
        assert_eq!(
            catalog.render(&request).unwrap(),
            "best learning resources and tutorials for rust"
        );
    }

    #[test]
    fn test_directory_source_reads_and_caches() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("greeting.txt"), "Hello {name}\n").unwrap();
        let catalog = PromptCatalog::from_directory(dir.path());

        let request = PromptRequest::new("greeting").param("name", "Ada");
        assert_eq!(catalog.render(&request).unwrap(), "Hello Ada");

        fs::remove_file(dir.path().join("greeting.txt")).unwrap();
        assert_eq!(catalog.render(&request).unwrap(), "Hello Ada");
    }

    #[test]
    fn test_directory_missing_template_fails_preload() {
        let dir = TempDir::new().unwrap();
        let catalog = PromptCatalog::from_directory(dir.path());
        let err = catalog.preload([PromptName::GoalsPrompt]).unwrap_err();
        assert!(matches!(err, PromptError::TemplateNotFound { ref name } if name == "goals_prompt"));
    }

    #[test]
    fn test_names_cannot_escape_directory() {
        let dir = TempDir::new().unwrap();
        let catalog = PromptCatalog::from_directory(dir.path());
        assert!(matches!(
            catalog.template("../secrets"),
            Err(PromptError::TemplateNotFound { .. })
        ));
    }
}
