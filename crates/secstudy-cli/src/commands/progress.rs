//! The `secstudy progress` command.

use std::path::Path;

use anyhow::Result;

use secstudy_core::model::ProgressRecord;
use secstudy_core::recommend::recommend_topics;
use secstudy_core::store::ProgressStore;
use secstudy_providers::config::load_config_from;

/// Show progress from the store alone — no provider or credential needed.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config_from(config_path)?;
    let record = ProgressStore::new(&config.progress_file).load()?;
    print_progress(&record, &config.catalog);
    Ok(())
}

pub(crate) fn print_progress(record: &ProgressRecord, catalog: &[String]) {
    use comfy_table::{Cell, Table};

    let summary = record.summary();

    println!("\nYOUR LEARNING PROGRESS");
    println!("{}", "=".repeat(60));
    println!("\nTopics studied: {}", summary.topics_studied);
    if !record.topics_studied.is_empty() {
        println!("Recent topics:");
        for topic in record.topics_studied.iter().rev().take(5) {
            println!("  - {topic}");
        }
    }

    if summary.total_attempts > 0 {
        println!("\nQuiz performance:");
        println!("  Questions attempted: {}", summary.total_questions);
        println!("  Correct answers:     {}", summary.correct_answers);
        println!(
            "  Overall accuracy:    {:.1}%",
            summary.overall_accuracy * 100.0
        );

        let mut table = Table::new();
        table.set_header(vec!["Topic", "Attempts", "Questions", "Correct", "Accuracy"]);
        // Iterate topics_studied so the table order is stable.
        for topic in &record.topics_studied {
            if let Some(stats) = summary.per_topic.get(topic) {
                table.add_row(vec![
                    Cell::new(topic),
                    Cell::new(stats.attempts),
                    Cell::new(stats.total_questions),
                    Cell::new(stats.correct_answers),
                    Cell::new(format!("{:.1}%", stats.accuracy * 100.0)),
                ]);
            }
        }
        println!("\n{table}");

        println!("\nRecent quiz scores:");
        for attempt in record.quiz_history.iter().rev().take(3) {
            println!(
                "  {}: {}/{} ({:.1}%)",
                attempt.topic,
                attempt.correct_answers,
                attempt.total_questions,
                attempt.accuracy() * 100.0
            );
        }
    } else {
        println!("\nNo quizzes taken yet. Try `quiz phishing` to get started.");
    }

    let recommended: Vec<&str> = recommend_topics(record, catalog).take(5).collect();
    if !recommended.is_empty() {
        println!("\nRecommended next:");
        for topic in recommended {
            println!("  - {topic}");
        }
    }
}
