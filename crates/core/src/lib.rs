//! FinQuiz Core
//!
//! Quiz generation, reply parsing and the per-session page state machine.
//! Nothing here knows about HTTP; the `finquiz-api` service drives it.

pub mod llm_client;
pub mod quiz;
pub mod requester;
pub mod session;

pub use quiz::{ParseError, QuizField, QuizItem};
pub use session::{Page, PageView, QuizError, QuizSession, SessionError};
