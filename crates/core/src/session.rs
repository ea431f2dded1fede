//! Quiz Session State Machine
//!
//! A [`QuizSession`] holds everything one user's quiz needs: the current
//! question, the questions already shown, the user's selection and which of the
//! two pages they are on. The web layer owns one per session and passes it into
//! each handler.
//!
//! ```text
//!  ┌──────┐  submit (selection)   ┌────────┐
//!  │ Quiz │ ────────────────────▶ │ Answer │
//!  └──────┘ ◀──────────────────── └────────┘
//!                 next
//! ```

use crate::quiz::QuizItem;
use crate::requester::QuizRequester;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default bound on request-and-parse cycles for a single new question.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Failures while producing a new question.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// The text-generation collaborator itself failed. Not retried.
    #[error("quiz generation failed: {0:#}")]
    Generation(#[source] anyhow::Error),
    /// Every attempt produced a duplicate or malformed question.
    #[error(
        "no new question available after {attempts} attempts ({duplicates} duplicate, {malformed} malformed)"
    )]
    Exhausted {
        attempts: u32,
        duplicates: u32,
        malformed: u32,
    },
}

/// Invalid user actions for the current session state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("there is no current quiz question")]
    NoQuiz,
    #[error("no answer was selected")]
    NoSelection,
    #[error("'{0}' is not one of the current options")]
    UnknownOption(String),
}

/// The page a session is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Quiz,
    Answer,
}

/// Result of one call to [`QuizSession::generate_new_quiz`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Request-and-parse cycles used, including the successful one.
    pub attempts: u32,
    pub duplicates: u32,
    pub malformed: u32,
}

/// Everything shown on the quiz page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub question: String,
    /// `(key, label)` pairs, label formatted as `"A) text"`.
    pub options: Vec<(String, String)>,
    pub selected: Option<String>,
}

/// Everything shown on the answer page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerView {
    pub correct_answer: String,
    pub explanation: String,
    pub selected: Option<String>,
    pub is_correct: bool,
}

/// What the page router decides to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "lowercase")]
pub enum PageView {
    Quiz(QuizView),
    Answer(AnswerView),
    /// Nothing to render: the answer page before a submission, or the quiz page
    /// without a question.
    Blank,
}

/// Per-user quiz state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSession {
    pub current_quiz: Option<QuizItem>,
    /// Every question committed so far, in order. Append-only.
    pub asked_questions: Vec<String>,
    pub selected_answer: Option<String>,
    pub submitted: bool,
    pub page: Page,
    max_attempts: u32,
}

impl QuizSession {
    /// Creates a fresh session on the quiz page with no question yet.
    pub fn new() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }

    /// Creates a fresh session bounding each generation to `max_attempts`
    /// cycles (at least one).
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Discards all state, including the asked-question history.
    pub fn reset(&mut self) {
        *self = Self::with_max_attempts(self.max_attempts);
    }

    /// Whether `question` has been committed before.
    pub fn has_asked(&self, question: &str) -> bool {
        self.asked_questions.iter().any(|q| q == question)
    }

    /// Commits `item` unless its question was already asked.
    ///
    /// Returns `true` when the item became the current quiz. A committed item
    /// clears the previous selection and submission.
    pub fn commit_quiz(&mut self, item: QuizItem) -> bool {
        if self.has_asked(&item.question) {
            return false;
        }
        self.asked_questions.push(item.question.clone());
        self.current_quiz = Some(item);
        self.selected_answer = None;
        self.submitted = false;
        true
    }

    /// Requests, parses and commits a question not seen before in this session.
    ///
    /// Duplicate and malformed replies are discarded and retried until
    /// `max_attempts` cycles have been spent. On exhaustion the current quiz is
    /// cleared so the quiz page has nothing stale to show. Collaborator errors
    /// abort immediately.
    pub async fn generate_new_quiz(
        &mut self,
        requester: &QuizRequester,
    ) -> Result<GenerationReport, QuizError> {
        let mut duplicates = 0;
        let mut malformed = 0;

        for attempt in 1..=self.max_attempts {
            let raw = requester.request_raw().await.map_err(QuizError::Generation)?;

            let item = match QuizItem::parse_strict(&raw) {
                Ok(item) => item,
                Err(err) => {
                    malformed += 1;
                    warn!(attempt, error = %err, "Discarding malformed quiz reply");
                    continue;
                }
            };

            if self.commit_quiz(item) {
                info!(attempt, asked = self.asked_questions.len(), "Committed new quiz question");
                return Ok(GenerationReport {
                    attempts: attempt,
                    duplicates,
                    malformed,
                });
            }

            duplicates += 1;
            warn!(attempt, "Discarding duplicate quiz question");
        }

        warn!(
            attempts = self.max_attempts,
            duplicates, malformed, "Giving up on generating a new quiz question"
        );
        self.current_quiz = None;
        self.selected_answer = None;
        self.submitted = false;
        Err(QuizError::Exhausted {
            attempts: self.max_attempts,
            duplicates,
            malformed,
        })
    }

    /// Entry action of the quiz page: generates a question when none is set.
    ///
    /// Returns `None` when a question was already present.
    pub async fn enter_quiz(
        &mut self,
        requester: &QuizRequester,
    ) -> Result<Option<GenerationReport>, QuizError> {
        self.page = Page::Quiz;
        if self.current_quiz.is_some() {
            return Ok(None);
        }
        self.generate_new_quiz(requester).await.map(Some)
    }

    /// Records the user's choice on the quiz page.
    pub fn select_answer(&mut self, key: &str) -> Result<(), SessionError> {
        let quiz = self.current_quiz.as_ref().ok_or(SessionError::NoQuiz)?;
        let key = key.trim();
        if !quiz.options.contains_key(key) {
            return Err(SessionError::UnknownOption(key.to_string()));
        }
        self.selected_answer = Some(key.to_string());
        Ok(())
    }

    /// Submits the current selection and moves to the answer page.
    pub fn submit(&mut self) -> Result<(), SessionError> {
        if self.current_quiz.is_none() {
            return Err(SessionError::NoQuiz);
        }
        if self.selected_answer.is_none() {
            return Err(SessionError::NoSelection);
        }
        self.submitted = true;
        self.page = Page::Answer;
        Ok(())
    }

    /// Moves to `page` without any side effects. Whether anything is shown is
    /// decided by [`QuizSession::view`].
    pub fn navigate(&mut self, page: Page) {
        self.page = page;
    }

    /// The "next question" action of the answer page.
    ///
    /// The session returns to the quiz page even when generation fails, so a
    /// later visit can try again.
    pub async fn next_quiz(
        &mut self,
        requester: &QuizRequester,
    ) -> Result<GenerationReport, QuizError> {
        self.page = Page::Quiz;
        self.selected_answer = None;
        self.submitted = false;
        self.generate_new_quiz(requester).await
    }

    /// Decides what the current page displays.
    pub fn view(&self) -> PageView {
        match (self.page, &self.current_quiz) {
            (Page::Quiz, Some(quiz)) => PageView::Quiz(QuizView {
                question: quiz.question.clone(),
                options: quiz.option_labels(),
                selected: self.selected_answer.clone(),
            }),
            (Page::Answer, Some(quiz)) if self.submitted => PageView::Answer(AnswerView {
                correct_answer: quiz.answer.clone(),
                explanation: quiz.explanation.clone(),
                selected: self.selected_answer.clone(),
                is_correct: self
                    .selected_answer
                    .as_deref()
                    .is_some_and(|s| quiz.is_correct(s)),
            }),
            _ => PageView::Blank,
        }
    }
}
