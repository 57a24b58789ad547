use crate::adapters::gemini::GeminiGenerator;
use crate::core::classifier::classify;
use crate::core::fallback::fallback_flashcards;
use crate::core::parser::parse_response;
use crate::core::prompt::{build_prompt, resolve_language, truncate_input, DEFAULT_LANGUAGE};
use crate::core::retry::{invoke, RetryPolicy};
use crate::core::{ConfigProvider, ContentGenerator, Flashcard, GenerationRequest};
use crate::domain::model::Classification;
use crate::utils::error::{FlashcardError, Result};

/// Everything decided before the backend is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub classification: Classification,
    /// Truncated input text, or the topic override when one was given.
    pub subject: String,
    pub language: String,
    pub prompt: String,
}

/// classify → build prompt → invoke with retry → parse.
///
/// Holds no mutable state, so one pipeline can serve concurrent callers.
pub struct FlashcardPipeline<G: ContentGenerator> {
    generator: Option<G>,
    retry: RetryPolicy,
    default_language: String,
}

impl<G: ContentGenerator> FlashcardPipeline<G> {
    pub fn new(generator: G) -> Self {
        Self::with_generator(Some(generator))
    }

    /// A pipeline with no credential; every call returns fallback cards.
    pub fn offline() -> Self {
        Self::with_generator(None)
    }

    pub fn with_generator(generator: Option<G>) -> Self {
        Self {
            generator,
            retry: RetryPolicy::default(),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn is_offline(&self) -> bool {
        self.generator.is_none()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Classify the input (unless a topic override is given) and build its prompt.
    pub fn plan(&self, text: &str, topic: Option<&str>, language: Option<&str>) -> GenerationPlan {
        let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
            Some(language) => language,
            None => resolve_language(Some(self.default_language.as_str())),
        };

        let (classification, subject) = match topic.map(str::trim).filter(|t| !t.is_empty()) {
            Some(topic) => (Classification::ShortTopic, truncate_input(topic).to_string()),
            None => {
                let text = truncate_input(text);
                (classify(text), text.to_string())
            }
        };

        let prompt = build_prompt(classification, &subject, language);

        GenerationPlan {
            classification,
            subject,
            language: language.to_string(),
            prompt,
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Flashcard>> {
        self.generate_flashcards(
            &request.text,
            request.topic.as_deref(),
            request.language.as_deref(),
        )
        .await
    }

    pub async fn generate_flashcards(
        &self,
        text: &str,
        topic: Option<&str>,
        language: Option<&str>,
    ) -> Result<Vec<Flashcard>> {
        let Some(generator) = self.generator.as_ref() else {
            tracing::warn!("No API key configured, using offline flashcards");
            return Ok(fallback_flashcards(text));
        };

        let plan = self.plan(text, topic, language);
        tracing::debug!(
            "Classified input as {} ({} chars, language: {})",
            plan.classification,
            plan.subject.chars().count(),
            plan.language
        );

        let raw = invoke(&self.retry, || generator.generate(&plan.prompt))
            .await
            .map_err(|e| failed(plan.classification, e))?;

        tracing::debug!("Received {} bytes from generator", raw.len());

        let cards = parse_response(plan.classification, &plan.subject, &raw)
            .map_err(|e| failed(plan.classification, e))?;

        tracing::info!(
            "Generated {} flashcard(s) from {} input",
            cards.len(),
            plan.classification
        );
        Ok(cards)
    }
}

impl FlashcardPipeline<GeminiGenerator> {
    /// Build a Gemini-backed pipeline; an absent api key yields an offline pipeline.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let generator = GeminiGenerator::from_config(config)?;
        let mut pipeline = Self::with_generator(generator).with_retry_policy(config.retry_policy());
        if let Some(language) = config.default_language() {
            pipeline = pipeline.with_default_language(language);
        }
        Ok(pipeline)
    }
}

fn failed(classification: Classification, source: FlashcardError) -> FlashcardError {
    tracing::error!("Flashcard generation failed: {}", source);
    FlashcardError::GenerationFailed {
        classification,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned responses and records every prompt it receives.
    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FlashcardError::EmptyResponse))
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::default().with_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_question_end_to_end() {
        let pipeline = FlashcardPipeline::new(ScriptedGenerator::replying("  Paris.  "));

        let cards = pipeline
            .generate_flashcards("What is the capital of France?", None, None)
            .await
            .unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "What is the capital of France?");
        assert_eq!(cards[0].answer, "Paris.");
    }

    #[tokio::test]
    async fn test_sentence_prompt_carries_text_and_language() {
        let sentence = "The industrial revolution transformed manufacturing economies labor \
                        markets transport networks urban growth family life education systems \
                        and political power across Europe and North America forever";
        assert_eq!(sentence.split_whitespace().count(), 25);

        let generator = ScriptedGenerator::replying(r#"[{"question": "Q", "answer": "A"}]"#);
        let pipeline = FlashcardPipeline::new(generator);
        let plan = pipeline.plan(sentence, None, Some("Portuguese"));

        assert_eq!(plan.classification, Classification::LongPassage);
        assert!(plan.prompt.contains(sentence));
        assert!(plan.prompt.contains("Portuguese"));
    }

    #[tokio::test]
    async fn test_topic_override_skips_classifier() {
        let generator = ScriptedGenerator::replying(r#"[{"question": "Q", "answer": "A"}]"#);
        let pipeline = FlashcardPipeline::new(generator);

        let plan = pipeline.plan("Why is the sky blue?", Some("  Rayleigh scattering "), None);

        assert_eq!(plan.classification, Classification::ShortTopic);
        assert_eq!(plan.subject, "Rayleigh scattering");
        assert!(plan.prompt.contains("Topic:\nRayleigh scattering"));
        assert_eq!(plan.language, "English");
    }

    #[tokio::test]
    async fn test_blank_topic_override_is_ignored() {
        let pipeline = FlashcardPipeline::new(ScriptedGenerator::replying("x"));
        let plan = pipeline.plan("Why is the sky blue?", Some("   "), None);
        assert_eq!(plan.classification, Classification::Question);
    }

    #[tokio::test]
    async fn test_default_language_from_pipeline() {
        let pipeline =
            FlashcardPipeline::new(ScriptedGenerator::replying("x")).with_default_language("Japanese");
        let plan = pipeline.plan("Ownership", None, None);
        assert!(plan.prompt.contains("Answer in Japanese"));

        let plan = pipeline.plan("Ownership", None, Some("Korean"));
        assert!(plan.prompt.contains("Answer in Korean"));
    }

    #[tokio::test]
    async fn test_offline_pipeline_returns_fallback() {
        let pipeline = FlashcardPipeline::<ScriptedGenerator>::offline();
        assert!(pipeline.is_offline());

        let cards = pipeline
            .generate_flashcards(&"z".repeat(1200), None, None)
            .await
            .unwrap();

        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].id, "mock-1");
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let generator = ScriptedGenerator::new(vec![
            Err(FlashcardError::ApiStatusError {
                status: 500,
                body: "boom".to_string(),
            }),
            Ok(r#"Cards: [{"question": "Q1", "answer": "A1"}, {"question": "Q2", "answer": "A2"}]"#
                .to_string()),
        ]);
        let pipeline = FlashcardPipeline::new(generator).with_retry_policy(fast_retry());

        let cards = pipeline.generate_flashcards("Rust traits", None, None).await.unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].question, "Q2");
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_retried() {
        let generator = std::sync::Arc::new(ScriptedGenerator::new(vec![
            Ok("no cards for you".to_string()),
            Ok(r#"[{"question": "Q", "answer": "A"}]"#.to_string()),
        ]));
        let pipeline = FlashcardPipeline::new(generator.clone()).with_retry_policy(fast_retry());

        let err = pipeline
            .generate_flashcards("Rust traits", None, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FlashcardError::GenerationFailed {
                classification: Classification::ShortTopic,
                ..
            }
        ));
        assert!(err.is_malformed_response());
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_as_generation_failed() {
        let generator = std::sync::Arc::new(ScriptedGenerator::new(vec![]));
        let pipeline = FlashcardPipeline::new(generator.clone()).with_retry_policy(fast_retry());

        let err = pipeline
            .generate_flashcards("What is a monad?", None, None)
            .await
            .unwrap_err();

        assert!(err.is_remote_failure());
        assert!(matches!(err.root_cause(), FlashcardError::EmptyResponse));
        assert_eq!(generator.prompts().len(), 3);
    }
}
