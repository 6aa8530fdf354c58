//! Quiz response parsing.
//!
//! The model is asked for a line-based quiz format (`Question N:`, options
//! `A)`..`D)`, an `Answer:` marker, an optional `Explanation:` line). Models
//! do not always comply, so parsing is tolerant: each block either becomes a
//! [`ParsedBlock::Question`] or is skipped with a recorded reason, and only
//! a response with zero usable questions is an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four option labels of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLabel {
    A,
    B,
    C,
    D,
}

impl AnswerLabel {
    pub const ALL: [AnswerLabel; 4] = [AnswerLabel::A, AnswerLabel::B, AnswerLabel::C, AnswerLabel::D];

    /// Index into a question's options array.
    pub fn index(self) -> usize {
        match self {
            AnswerLabel::A => 0,
            AnswerLabel::B => 1,
            AnswerLabel::C => 2,
            AnswerLabel::D => 3,
        }
    }
}

impl fmt::Display for AnswerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerLabel::A => write!(f, "A"),
            AnswerLabel::B => write!(f, "B"),
            AnswerLabel::C => write!(f, "C"),
            AnswerLabel::D => write!(f, "D"),
        }
    }
}

impl FromStr for AnswerLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().trim_end_matches([')', '.', ':']);
        match cleaned.to_ascii_uppercase().as_str() {
            "A" => Ok(AnswerLabel::A),
            "B" => Ok(AnswerLabel::B),
            "C" => Ok(AnswerLabel::C),
            "D" => Ok(AnswerLabel::D),
            other => Err(format!("unrecognized answer '{other}'")),
        }
    }
}

/// A fully parsed multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// The question text.
    pub text: String,
    /// Options in A..D order, without their labels.
    pub options: [String; 4],
    /// The correct option.
    pub correct: AnswerLabel,
    /// Model-provided rationale, if any.
    pub explanation: Option<String>,
}

/// A question block the parser could not recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    /// The header line that opened the block.
    pub header: String,
    /// Why the block was skipped.
    pub reason: String,
}

/// Outcome of parsing one question block.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBlock {
    Question(QuizQuestion),
    Skipped(SkippedBlock),
}

/// All questions recovered from a model response, plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuiz {
    pub questions: Vec<QuizQuestion>,
    pub skipped: Vec<SkippedBlock>,
}

/// Parse failure for an entire quiz response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizParseError {
    /// Not a single block could be recovered as a question.
    #[error("no usable quiz questions in model response ({skipped} block(s) skipped)")]
    NoQuestions { skipped: usize },
}

/// Split a model response into question blocks and parse each one.
///
/// Text before the first `Question N:` header (prose preamble, markdown
/// fences) is ignored. Returns one [`ParsedBlock`] per header encountered.
pub fn scan_blocks(raw: &str) -> Vec<ParsedBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in raw.lines() {
        if let Some(text) = question_header(line) {
            if let Some((header, lines)) = current.take() {
                blocks.push(parse_block(&header, &lines));
            }
            current = Some((text.to_string(), Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some((header, lines)) = current.take() {
        blocks.push(parse_block(&header, &lines));
    }

    blocks
}

/// Parse a quiz response, skipping malformed blocks.
///
/// Fails only when zero valid questions are recovered, signaling the caller
/// that regeneration is worth asking for.
pub fn parse_quiz_response(raw: &str) -> Result<ParsedQuiz, QuizParseError> {
    let mut quiz = ParsedQuiz::default();
    for block in scan_blocks(raw) {
        match block {
            ParsedBlock::Question(q) => quiz.questions.push(q),
            ParsedBlock::Skipped(s) => {
                tracing::warn!(header = %s.header, reason = %s.reason, "skipping quiz block");
                quiz.skipped.push(s);
            }
        }
    }

    if quiz.questions.is_empty() {
        return Err(QuizParseError::NoQuestions {
            skipped: quiz.skipped.len(),
        });
    }
    Ok(quiz)
}

/// Match a `Question N:` header line, returning the text after the colon.
///
/// Requires the `:` (or `.`) separator so that prose beginning with the
/// word "question" is not mistaken for a header.
fn question_header(line: &str) -> Option<&str> {
    let trimmed = line.trim().trim_start_matches(['*', '#']).trim_start();
    let rest = strip_prefix_ignore_case(trimmed, "question")?;
    let rest = rest.trim_start();
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit()).trim_start();
    let body = rest.strip_prefix(':').or_else(|| rest.strip_prefix('.'))?;
    Some(body.trim_start_matches('*').trim())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Match an option line like `B) some text`, returning (label, text).
fn option_line(line: &str) -> Option<(AnswerLabel, &str)> {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    let letter = chars.next()?;
    let sep = chars.next()?;
    if !matches!(sep, ')' | '.' | ':') {
        return None;
    }
    let label = match letter.to_ascii_uppercase() {
        'A' => AnswerLabel::A,
        'B' => AnswerLabel::B,
        'C' => AnswerLabel::C,
        'D' => AnswerLabel::D,
        _ => return None,
    };
    Some((label, trimmed[2..].trim()))
}

/// Match an `Answer: X` (or `Correct answer: X`) marker line.
fn answer_line(line: &str) -> Option<&str> {
    let trimmed = line.trim().trim_start_matches(['*', '#']).trim_start();
    let rest = strip_prefix_ignore_case(trimmed, "correct answer")
        .or_else(|| strip_prefix_ignore_case(trimmed, "answer"))?;
    let rest = rest.trim_start();
    Some(rest.strip_prefix(':')?.trim_start_matches('*').trim())
}

fn explanation_line(line: &str) -> Option<&str> {
    let trimmed = line.trim().trim_start_matches(['*', '#']).trim_start();
    let rest = strip_prefix_ignore_case(trimmed, "explanation")?;
    Some(rest.trim_start().strip_prefix(':')?.trim_start_matches('*').trim())
}

fn parse_block(header: &str, lines: &[&str]) -> ParsedBlock {
    let skip = |reason: String| {
        ParsedBlock::Skipped(SkippedBlock {
            header: header.to_string(),
            reason,
        })
    };

    let mut text_lines: Vec<&str> = if header.is_empty() {
        Vec::new()
    } else {
        vec![header]
    };
    let mut options: [Option<String>; 4] = [None, None, None, None];
    let mut answer: Option<AnswerLabel> = None;
    let mut explanation: Option<String> = None;
    let mut seen_option = false;

    for line in lines {
        if let Some((label, option_text)) = option_line(line) {
            let slot = &mut options[label.index()];
            if slot.is_some() {
                return skip(format!("duplicate option {label}"));
            }
            *slot = Some(option_text.to_string());
            seen_option = true;
        } else if let Some(value) = answer_line(line) {
            match value.parse() {
                Ok(label) => answer = Some(label),
                Err(reason) => return skip(reason),
            }
        } else if let Some(value) = explanation_line(line) {
            explanation = Some(value.to_string());
        } else if !seen_option && !line.trim().is_empty() {
            // Question text wrapped over multiple lines.
            text_lines.push(line.trim());
        }
    }

    let text = text_lines.join(" ");
    if text.is_empty() {
        return skip("missing question text".into());
    }
    let Some(correct) = answer else {
        return skip("missing answer marker".into());
    };

    let missing = AnswerLabel::ALL
        .into_iter()
        .find(|label| options[label.index()].is_none());
    if let Some(label) = missing {
        return skip(format!("missing option {label}"));
    }
    let options = options.map(Option::unwrap_or_default);

    ParsedBlock::Question(QuizQuestion {
        text,
        options,
        correct,
        explanation,
    })
}
