//! Progress record data model.
//!
//! These are the fundamental types the whole system uses to represent what
//! a student has studied and how their quizzes went. The record is the sole
//! persisted entity; summary statistics are always derived on demand.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalize a topic name for storage and comparison.
///
/// Topics are keyed case-insensitively: "Phishing" and "phishing " are the
/// same topic.
pub fn normalize_topic(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One completed round of quiz questions on a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// Normalized topic name.
    pub topic: String,
    /// Number of questions presented.
    pub total_questions: u32,
    /// Number answered correctly. Never exceeds `total_questions`.
    pub correct_answers: u32,
    /// When the attempt was completed.
    pub timestamp: DateTime<Utc>,
    /// Unknown fields from the backing file, preserved on round-trip.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl QuizAttempt {
    /// Fraction of questions answered correctly, 0.0 for an empty attempt.
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            f64::from(self.correct_answers) / f64::from(self.total_questions)
        }
    }
}

/// The persisted study progress for a single student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Topics the student has studied, normalized, in first-seen order.
    #[serde(default)]
    pub topics_studied: Vec<String>,
    /// Completed quiz attempts, append-only, chronological.
    #[serde(default)]
    pub quiz_history: Vec<QuizAttempt>,
    /// Unknown fields from the backing file, preserved on round-trip.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Validation failures for quiz attempt input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// `correct_answers` was larger than `total_questions`.
    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

impl ProgressRecord {
    /// Whether the (normalized) topic is already in `topics_studied`.
    pub fn has_studied(&self, topic: &str) -> bool {
        let normalized = normalize_topic(topic);
        self.topics_studied.iter().any(|t| *t == normalized)
    }

    /// Add a topic to `topics_studied` if absent.
    ///
    /// Idempotent. Returns `true` if the topic was newly added.
    pub fn record_topic_studied(&mut self, topic: &str) -> bool {
        let normalized = normalize_topic(topic);
        if normalized.is_empty() || self.topics_studied.contains(&normalized) {
            return false;
        }
        self.topics_studied.push(normalized);
        true
    }

    /// Append a quiz attempt, implicitly recording the topic as studied.
    ///
    /// Rejects `correct > total` before any state change.
    pub fn record_quiz_attempt(
        &mut self,
        topic: &str,
        total_questions: u32,
        correct_answers: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<(), AttemptError> {
        if correct_answers > total_questions {
            return Err(AttemptError::CorrectExceedsTotal {
                correct: correct_answers,
                total: total_questions,
            });
        }
        self.record_topic_studied(topic);
        self.quiz_history.push(QuizAttempt {
            topic: normalize_topic(topic),
            total_questions,
            correct_answers,
            timestamp,
            extra: serde_json::Map::new(),
        });
        Ok(())
    }

    /// Accuracy of the most recent attempt on a topic, if any.
    pub fn latest_accuracy(&self, topic: &str) -> Option<f64> {
        let normalized = normalize_topic(topic);
        self.quiz_history
            .iter()
            .rev()
            .find(|a| a.topic == normalized)
            .map(QuizAttempt::accuracy)
    }

    /// Timestamp of the most recent quiz attempt on a topic, if any.
    pub fn last_quizzed(&self, topic: &str) -> Option<DateTime<Utc>> {
        let normalized = normalize_topic(topic);
        self.quiz_history
            .iter()
            .rev()
            .find(|a| a.topic == normalized)
            .map(|a| a.timestamp)
    }

    /// Compute aggregate statistics over the current state.
    ///
    /// Pure, O(number of attempts). Expected scale is one user's session
    /// history, so no incremental bookkeeping is kept.
    pub fn summary(&self) -> SummaryStats {
        let mut per_topic: HashMap<String, TopicStats> = HashMap::new();
        let mut total_questions = 0u32;
        let mut correct_answers = 0u32;

        for attempt in &self.quiz_history {
            total_questions += attempt.total_questions;
            correct_answers += attempt.correct_answers;

            let stats = per_topic.entry(attempt.topic.clone()).or_default();
            stats.attempts += 1;
            stats.total_questions += attempt.total_questions;
            stats.correct_answers += attempt.correct_answers;
        }

        for stats in per_topic.values_mut() {
            stats.accuracy = if stats.total_questions == 0 {
                0.0
            } else {
                f64::from(stats.correct_answers) / f64::from(stats.total_questions)
            };
        }

        SummaryStats {
            topics_studied: self.topics_studied.len(),
            total_attempts: self.quiz_history.len(),
            total_questions,
            correct_answers,
            overall_accuracy: if total_questions == 0 {
                0.0
            } else {
                f64::from(correct_answers) / f64::from(total_questions)
            },
            per_topic,
        }
    }
}

/// Aggregate statistics derived from a [`ProgressRecord`]. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Number of distinct topics studied.
    pub topics_studied: usize,
    /// Number of completed quiz attempts.
    pub total_attempts: usize,
    /// Questions presented across all attempts.
    pub total_questions: u32,
    /// Questions answered correctly across all attempts.
    pub correct_answers: u32,
    /// `correct_answers / total_questions`, or 0.0 with no questions.
    pub overall_accuracy: f64,
    /// Aggregate accuracy per topic.
    pub per_topic: HashMap<String, TopicStats>,
}

/// Per-topic aggregate quiz statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopicStats {
    pub attempts: usize,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
}
