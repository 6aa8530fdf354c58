//! The `secstudy quiz` command and the shared quiz-taking flow.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use secstudy_core::quiz::AnswerLabel;
use secstudy_core::session::{SessionError, StudySession};

use super::prompt_line;

pub async fn execute(config_path: Option<&Path>, topic: &str, count: u32) -> Result<()> {
    let (mut session, _config) = super::open_session(config_path)?;
    run_quiz(&mut session, topic, count).await
}

/// Generate a quiz, present each question, grade the answers, and record
/// the attempt.
///
/// Each question moves Presented -> Answered -> Graded; an input that is
/// not one of A-D re-prompts without advancing. An unusable model response
/// is regenerated once before giving up.
pub(crate) async fn run_quiz(session: &mut StudySession, topic: &str, count: u32) -> Result<()> {
    println!("Generating a quiz on {topic}...");
    let quiz = match session.generate_quiz(topic, count).await {
        Ok(quiz) => quiz,
        Err(SessionError::QuizParse(e)) => {
            tracing::warn!("quiz response unusable ({e}), regenerating once");
            println!("The model response was not a usable quiz; trying once more...");
            session.generate_quiz(topic, count).await?
        }
        Err(e) => return Err(e.into()),
    };

    if !quiz.skipped.is_empty() {
        println!(
            "(skipped {} malformed question block(s))",
            quiz.skipped.len()
        );
    }

    let total = quiz.questions.len() as u32;
    let mut correct = 0u32;

    for (number, question) in quiz.questions.iter().enumerate() {
        println!("\n{}", "=".repeat(60));
        println!("Question {}: {}", number + 1, question.text);
        println!();
        for (label, option) in AnswerLabel::ALL.iter().zip(question.options.iter()) {
            println!("  {label}) {option}");
        }
        println!();

        let answer = loop {
            let Some(line) = prompt_line("Your answer (A/B/C/D): ")? else {
                // Input ended before the quiz finished; record nothing.
                println!("\nQuiz abandoned; nothing recorded.");
                return Ok(());
            };
            match line.parse::<AnswerLabel>() {
                Ok(label) => break label,
                Err(_) => println!("Please answer A, B, C, or D."),
            }
        };

        if answer == question.correct {
            println!("Correct!");
            correct += 1;
        } else {
            println!("Wrong. Correct answer: {}", question.correct);
        }
        if let Some(explanation) = &question.explanation {
            println!("Explanation: {explanation}");
        }
    }

    session.record_quiz_result(topic, total, correct, Utc::now())?;

    let percent = if total == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(total) * 100.0
    };
    println!("\n{}", "=".repeat(60));
    println!("Final score: {correct}/{total} ({percent:.1}%)");
    println!("{}", feedback(correct, total, topic));

    Ok(())
}

fn feedback(correct: u32, total: u32, topic: &str) -> String {
    let correct = f64::from(correct);
    let total = f64::from(total);
    if total > 0.0 && correct == total {
        "Perfect score! You mastered this topic.".into()
    } else if correct >= total * 0.8 {
        "Great job! You understand this well.".into()
    } else if correct >= total * 0.6 {
        "Good work. Review and try again for a higher score.".into()
    } else {
        format!("Keep studying. Try `explain {topic}` to review.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_tiers() {
        assert!(feedback(5, 5, "phishing").contains("Perfect"));
        assert!(feedback(4, 5, "phishing").contains("Great job"));
        assert!(feedback(3, 5, "phishing").contains("Good work"));
        assert!(feedback(1, 5, "phishing").contains("explain phishing"));
    }
}
