//! The study session orchestrator.
//!
//! Ties a model provider, the progress store, and the in-memory record
//! together. Every mutation that succeeds is followed by a durable write
//! before the operation reports success; if the write fails, the in-memory
//! record is rolled back to the last durably written value.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::ModelError;
use crate::model::{AttemptError, ProgressRecord, SummaryStats};
use crate::prompt::{build_explain_prompt, build_quiz_prompt, PromptError};
use crate::quiz::{parse_quiz_response, ParsedQuiz, QuizParseError};
use crate::recommend::{recommend_topics, Recommendations};
use crate::store::{ProgressStore, StoreError};
use crate::traits::{GenerateRequest, ModelProvider};

/// Generation settings for the tutoring prompts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens per generation.
    pub max_output_tokens: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

/// Any failure a session operation can report.
///
/// Each variant keeps its category so callers can apply distinct recovery
/// policies: reject (validation), abort (storage), retry (external call or
/// quiz regeneration).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    QuizParse(#[from] QuizParseError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A single student's tutoring session.
pub struct StudySession {
    provider: Arc<dyn ModelProvider>,
    store: ProgressStore,
    record: ProgressRecord,
    config: SessionConfig,
}

impl StudySession {
    /// Load the progress record and open a session over it.
    pub fn open(
        provider: Arc<dyn ModelProvider>,
        store: ProgressStore,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let record = store.load()?;
        Ok(Self {
            provider,
            store,
            record,
            config,
        })
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn summary(&self) -> SummaryStats {
        self.record.summary()
    }

    pub fn recommendations<'a>(&'a self, catalog: &'a [String]) -> Recommendations<'a> {
        recommend_topics(&self.record, catalog)
    }

    /// Ask the model to explain a topic, recording it as studied.
    ///
    /// The topic is only persisted after the model call succeeds, matching
    /// the rule that a topic counts as studied once an explanation was
    /// actually delivered.
    pub async fn explain(&mut self, topic: &str) -> Result<String, SessionError> {
        let prompt = build_explain_prompt(topic)?;
        let response = self.provider.generate(&self.request(prompt)).await?;

        if !self.record.has_studied(topic) {
            self.commit(|record| {
                record.record_topic_studied(topic);
                Ok(())
            })?;
        }

        Ok(response.text)
    }

    /// Ask the model for a quiz and parse its response.
    ///
    /// Does not touch the record: a quiz only counts once it has been taken
    /// and graded, via [`StudySession::record_quiz_result`]. A
    /// [`SessionError::QuizParse`] signals the caller that regenerating is
    /// worth one more try.
    pub async fn generate_quiz(
        &self,
        topic: &str,
        question_count: u32,
    ) -> Result<ParsedQuiz, SessionError> {
        let prompt = build_quiz_prompt(topic, question_count)?;
        let response = self.provider.generate(&self.request(prompt)).await?;
        Ok(parse_quiz_response(&response.text)?)
    }

    /// Record a graded quiz attempt and persist it.
    pub fn record_quiz_result(
        &mut self,
        topic: &str,
        total_questions: u32,
        correct_answers: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.commit(|record| {
            record
                .record_quiz_attempt(topic, total_questions, correct_answers, timestamp)
                .map_err(SessionError::from)
        })
    }

    fn request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        }
    }

    /// Apply a mutation and persist it, rolling back on any failure.
    fn commit(
        &mut self,
        mutate: impl FnOnce(&mut ProgressRecord) -> Result<(), SessionError>,
    ) -> Result<(), SessionError> {
        let rollback = self.record.clone();
        if let Err(e) = mutate(&mut self.record) {
            self.record = rollback;
            return Err(e);
        }
        if let Err(e) = self.store.save(&self.record) {
            self.record = rollback;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::traits::{GenerateResponse, TokenUsage};

    /// Provider returning a fixed response, or a fixed error.
    struct ScriptedProvider {
        reply: Result<String, fn() -> ModelError>,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
            })
        }

        fn failing(make: fn() -> ModelError) -> Arc<Self> {
            Arc::new(Self { reply: Err(make) })
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            request: &GenerateRequest,
        ) -> Result<GenerateResponse, ModelError> {
            match &self.reply {
                Ok(text) => Ok(GenerateResponse {
                    text: text.clone(),
                    model: request.model.clone(),
                    token_usage: TokenUsage::default(),
                    latency_ms: 1,
                }),
                Err(make) => Err(make()),
            }
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    const QUIZ_REPLY: &str = "\
Question 1: What is phishing?
A) A fishing technique
B) Tricking people into revealing credentials
C) A firewall rule
D) An encryption scheme
Answer: B
Explanation: Phishing is social engineering aimed at credentials.
";

    #[tokio::test]
    async fn explain_records_topic_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let mut session = StudySession::open(
            ScriptedProvider::replying("Phishing is ..."),
            store.clone(),
            SessionConfig::default(),
        )
        .unwrap();

        let text = session.explain("Phishing").await.unwrap();
        assert_eq!(text, "Phishing is ...");
        assert!(session.record().has_studied("phishing"));
        assert!(store.load().unwrap().has_studied("phishing"));
    }

    #[tokio::test]
    async fn explain_failure_leaves_record_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let mut session = StudySession::open(
            ScriptedProvider::failing(|| ModelError::Timeout(30)),
            store.clone(),
            SessionConfig::default(),
        )
        .unwrap();

        let err = session.explain("phishing").await.unwrap_err();
        assert!(matches!(err, SessionError::Model(ModelError::Timeout(_))));
        assert!(session.record().topics_studied.is_empty());
        assert!(store.load().unwrap().topics_studied.is_empty());
    }

    #[tokio::test]
    async fn generate_quiz_parses_scripted_reply() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let session = StudySession::open(
            ScriptedProvider::replying(QUIZ_REPLY),
            store,
            SessionConfig::default(),
        )
        .unwrap();

        let quiz = session.generate_quiz("phishing", 1).await.unwrap();
        assert_eq!(quiz.questions.len(), 1);
        // Generating a quiz alone records nothing.
        assert!(session.record().topics_studied.is_empty());
    }

    #[tokio::test]
    async fn unparseable_reply_surfaces_quiz_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let session = StudySession::open(
            ScriptedProvider::replying("I would rather talk about kittens."),
            store,
            SessionConfig::default(),
        )
        .unwrap();

        let err = session.generate_quiz("phishing", 3).await.unwrap_err();
        assert!(matches!(err, SessionError::QuizParse(_)));
    }

    #[tokio::test]
    async fn quiz_result_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let mut session = StudySession::open(
            ScriptedProvider::replying(""),
            store.clone(),
            SessionConfig::default(),
        )
        .unwrap();

        session.record_quiz_result("malware", 5, 4, ts(1)).unwrap();

        let persisted = store.load().unwrap();
        assert_eq!(persisted.quiz_history.len(), 1);
        assert!(persisted.has_studied("malware"));
    }

    #[tokio::test]
    async fn invalid_result_is_rejected_before_any_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("progress.json"));
        let mut session = StudySession::open(
            ScriptedProvider::replying(""),
            store.clone(),
            SessionConfig::default(),
        )
        .unwrap();

        let err = session.record_quiz_result("malware", 3, 7, ts(1)).unwrap_err();
        assert!(matches!(err, SessionError::Attempt(_)));
        assert!(session.record().quiz_history.is_empty());
        assert!(store.load().unwrap().quiz_history.is_empty());
    }

    #[tokio::test]
    async fn failed_save_rolls_back_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        // Parent "directory" is a regular file, so every save fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let store = ProgressStore::new(blocker.join("progress.json"));

        let mut session = StudySession {
            provider: ScriptedProvider::replying("text"),
            store,
            record: ProgressRecord::default(),
            config: SessionConfig::default(),
        };

        let err = session.record_quiz_result("malware", 5, 5, ts(1)).unwrap_err();
        assert!(matches!(err, SessionError::Store(_)));
        assert!(session.record().quiz_history.is_empty());
        assert!(session.record().topics_studied.is_empty());
    }
}
