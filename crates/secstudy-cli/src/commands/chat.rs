//! The `secstudy chat` command — the interactive tutoring loop.

use std::path::Path;

use anyhow::Result;

use secstudy_core::error::ModelError;
use secstudy_core::session::{SessionError, StudySession};

use super::{progress::print_progress, prompt_line, quiz::run_quiz};

pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let (mut session, config) = super::open_session(config_path)?;

    print_banner(&config.catalog);

    loop {
        println!("\n{}", "-".repeat(60));
        let Some(line) = prompt_line("\nYou: ")? else {
            break; // end of input behaves like quit
        };
        let input = line.to_lowercase();

        if input == "quit" || input == "exit" {
            break;
        } else if input == "help" {
            print_help();
        } else if input == "progress" {
            print_progress(session.record(), &config.catalog);
        } else if let Some(topic) = input.strip_prefix("explain ") {
            handle_explain(&mut session, topic.trim()).await;
        } else if let Some(rest) = input.strip_prefix("quiz ") {
            let (topic, count) = parse_quiz_args(rest);
            if let Err(e) = run_quiz(&mut session, &topic, count).await {
                println!("{}", friendly_message(&e));
            }
        } else if input.is_empty() {
            continue;
        } else {
            println!("\nI didn't understand that command.");
            println!("Try: `explain phishing`, `quiz passwords`, or `progress`.");
        }
    }

    println!("\nHappy studying! Keep learning cybersecurity.");
    Ok(())
}

async fn handle_explain(session: &mut StudySession, topic: &str) {
    println!("\nLet me explain {topic}...\n");
    match session.explain(topic).await {
        Ok(explanation) => {
            println!("{explanation}");
            println!("\nWant to test your knowledge? Try: quiz {topic}");
        }
        Err(e) => println!("{}", friendly_message(&e.into())),
    }
}

/// Split `<topic> [count]` — a trailing integer is the question count.
fn parse_quiz_args(rest: &str) -> (String, u32) {
    let mut parts: Vec<&str> = rest.split_whitespace().collect();
    let count = match parts.last().and_then(|t| t.parse::<u32>().ok()) {
        Some(n) if parts.len() > 1 => {
            parts.pop();
            n
        }
        _ => 5,
    };
    (parts.join(" "), count)
}

/// Map session failures to messages a student can act on. The loop never
/// aborts on one failed operation.
fn friendly_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<SessionError>() {
        Some(SessionError::Model(ModelError::RateLimited { .. })) => {
            "The API rate limit was reached. Wait a minute and try again.".into()
        }
        Some(SessionError::Model(ModelError::AuthenticationFailed(_))) => {
            "API access was denied. Check that your API key is valid.".into()
        }
        Some(SessionError::Model(ModelError::Timeout(secs))) => {
            format!("The model did not answer within {secs}s. Try again.")
        }
        Some(SessionError::QuizParse(_)) => {
            "Sorry, couldn't generate a usable quiz. Try another topic.".into()
        }
        Some(SessionError::Prompt(e)) => format!("{e}."),
        _ => format!("Error: {err:#}"),
    }
}

fn print_banner(catalog: &[String]) {
    println!("\n{}", "=".repeat(60));
    println!("CYBERSECURITY STUDY ASSISTANT");
    println!("{}", "=".repeat(60));
    println!("\nI'm your AI tutor for learning cybersecurity.");
    print_help();
    if !catalog.is_empty() {
        println!("\nPopular topics: {}", catalog.join(", "));
    }
}

fn print_help() {
    println!("\nCommands:");
    println!("  explain <topic>      - Learn about a security topic");
    println!("  quiz <topic> [count] - Test your knowledge with a quiz");
    println!("  progress             - View your learning statistics");
    println!("  help                 - Show this message");
    println!("  quit                 - Exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_args_with_trailing_count() {
        assert_eq!(parse_quiz_args("phishing 3"), ("phishing".into(), 3));
        assert_eq!(
            parse_quiz_args("social engineering 7"),
            ("social engineering".into(), 7)
        );
    }

    #[test]
    fn quiz_args_default_count() {
        assert_eq!(parse_quiz_args("phishing"), ("phishing".into(), 5));
        // A bare number is a topic, not a count.
        assert_eq!(parse_quiz_args("443"), ("443".into(), 5));
    }

    #[test]
    fn friendly_messages_for_model_failures() {
        let err = anyhow::Error::new(SessionError::Model(ModelError::Timeout(30)));
        assert!(friendly_message(&err).contains("30s"));

        let err = anyhow::Error::new(SessionError::Model(ModelError::RateLimited {
            retry_after_ms: 5000,
        }));
        assert!(friendly_message(&err).contains("rate limit"));
    }
}
