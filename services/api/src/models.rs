//! API Models
//!
//! Request and response bodies for the JSON API, with `utoipa` schemas for the
//! OpenAPI document. Core session types are converted into these at the edge
//! so `finquiz-core` stays free of HTTP concerns.

use finquiz_core::{Page, PageView, QuizSession};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Quiz,
    Answer,
}

impl From<Page> for PageKind {
    fn from(page: Page) -> Self {
        match page {
            Page::Quiz => PageKind::Quiz,
            Page::Answer => PageKind::Answer,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct OptionPayload {
    #[schema(example = "A")]
    pub key: String,
    #[schema(example = "A) 소비자물가지수")]
    pub label: String,
}

/// The question as shown on the quiz page.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct QuizPayload {
    pub question: String,
    pub options: Vec<OptionPayload>,
    pub selected: Option<String>,
}

/// The revealed answer, only present after a submission.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct AnswerPayload {
    #[schema(example = "B")]
    pub correct_answer: String,
    pub explanation: String,
    pub selected: Option<String>,
    pub is_correct: bool,
}

/// Everything a client needs to render the caller's current page.
///
/// At most one of `quiz` and `answer` is set; neither is set when the current
/// page has nothing to show.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    pub page: PageKind,
    pub submitted: bool,
    pub asked_questions: usize,
    pub quiz: Option<QuizPayload>,
    pub answer: Option<AnswerPayload>,
}

impl SessionSnapshot {
    pub fn new(session_id: Uuid, session: &QuizSession) -> Self {
        let (quiz, answer) = match session.view() {
            PageView::Quiz(view) => (
                Some(QuizPayload {
                    question: view.question,
                    options: view
                        .options
                        .into_iter()
                        .map(|(key, label)| OptionPayload { key, label })
                        .collect(),
                    selected: view.selected,
                }),
                None,
            ),
            PageView::Answer(view) => (
                None,
                Some(AnswerPayload {
                    correct_answer: view.correct_answer,
                    explanation: view.explanation,
                    selected: view.selected,
                    is_correct: view.is_correct,
                }),
            ),
            PageView::Blank => (None, None),
        };

        Self {
            session_id,
            page: session.page.into(),
            submitted: session.submitted,
            asked_questions: session.asked_questions.len(),
            quiz,
            answer,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct SubmitAnswerPayload {
    #[schema(example = "B")]
    pub answer: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
