//! Quiz Response Parsing
//!
//! Turns the model's free-text reply into a [`QuizItem`]. The expected layout is
//! one field per line:
//!
//! ```text
//! Question: What is inflation?
//! Options: A) Rising prices, B) Falling prices, C) Stable prices, D) None
//! Answer: A) because prices rise
//! Explanation: Inflation means general price increases.
//! ```
//!
//! [`QuizItem::parse`] is lenient and never fails; [`QuizItem::parse_strict`]
//! additionally checks that the reply actually describes a usable question.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const QUESTION_PREFIX: &str = "Question:";
const OPTIONS_PREFIX: &str = "Options:";
const ANSWER_PREFIX: &str = "Answer:";
const EXPLANATION_PREFIX: &str = "Explanation:";
const OPTION_SEPARATOR: &str = ", ";

/// The four fields of a quiz reply, used to report which one is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizField {
    Question,
    Options,
    Answer,
    Explanation,
}

impl fmt::Display for QuizField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizField::Question => write!(f, "question"),
            QuizField::Options => write!(f, "options"),
            QuizField::Answer => write!(f, "answer"),
            QuizField::Explanation => write!(f, "explanation"),
        }
    }
}

/// Reasons a reply does not describe a usable quiz question.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("quiz reply has no {0} line")]
    MissingField(QuizField),
    #[error("answer key '{answer}' is not one of the options [{}]", keys.join(", "))]
    UnknownAnswerKey { answer: String, keys: Vec<String> },
}

/// One multiple-choice question extracted from a model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    /// Option text keyed by its letter. Kept sorted by key for stable rendering.
    pub options: BTreeMap<String, String>,
    /// The correct option key, e.g. `"B"`.
    pub answer: String,
    pub explanation: String,
}

impl QuizItem {
    /// Parses a reply, leaving any field whose line is absent empty.
    ///
    /// Prefixes are matched exactly at the start of a line; everything else is
    /// ignored. When a prefix appears more than once the last line wins.
    pub fn parse(raw: &str) -> Self {
        let mut item = QuizItem::default();

        for line in raw.lines() {
            if let Some(rest) = line.strip_prefix(QUESTION_PREFIX) {
                item.question = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix(OPTIONS_PREFIX) {
                parse_options_into(rest, &mut item.options);
            } else if let Some(rest) = line.strip_prefix(ANSWER_PREFIX) {
                item.answer = parse_answer_key(rest);
            } else if let Some(rest) = line.strip_prefix(EXPLANATION_PREFIX) {
                item.explanation = rest.trim().to_string();
            }
        }

        item
    }

    /// Parses a reply and rejects it unless [`QuizItem::validate`] passes.
    pub fn parse_strict(raw: &str) -> Result<Self, ParseError> {
        let item = Self::parse(raw);
        item.validate()?;
        Ok(item)
    }

    /// Checks that every field is present and that the answer names an option.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.question.is_empty() {
            return Err(ParseError::MissingField(QuizField::Question));
        }
        if self.options.is_empty() {
            return Err(ParseError::MissingField(QuizField::Options));
        }
        if self.answer.is_empty() {
            return Err(ParseError::MissingField(QuizField::Answer));
        }
        if self.explanation.is_empty() {
            return Err(ParseError::MissingField(QuizField::Explanation));
        }
        if !self.options.contains_key(&self.answer) {
            return Err(ParseError::UnknownAnswerKey {
                answer: self.answer.clone(),
                keys: self.options.keys().cloned().collect(),
            });
        }
        Ok(())
    }

    /// Returns true when `key` is the correct option.
    pub fn is_correct(&self, key: &str) -> bool {
        !self.answer.is_empty() && self.answer == key
    }

    /// Option labels in display order, e.g. `"A) Stocks"`.
    pub fn option_labels(&self) -> Vec<(String, String)> {
        self.options
            .iter()
            .map(|(key, text)| (key.clone(), format!("{}) {}", key, text)))
            .collect()
    }
}

fn parse_options_into(rest: &str, options: &mut BTreeMap<String, String>) {
    for token in rest.trim().split(OPTION_SEPARATOR) {
        if let Some((key, text)) = token.split_once(')') {
            options.insert(key.trim().to_string(), text.trim().to_string());
        }
    }
}

/// Keeps only the answer letter: `"B) because it is safer"` and `"B (safer)"`
/// both become `"B"`.
fn parse_answer_key(rest: &str) -> String {
    let answer = rest.trim();
    let end = answer.find(['(', ')']).unwrap_or(answer.len());
    answer[..end].trim().to_string()
}
