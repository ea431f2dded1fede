//! Axum Handlers for the HTML Pages
//!
//! The browser flow: `GET /` renders whichever page the session is on, the
//! quiz page's form posts to `/submit`, the answer page's form posts to
//! `/next`. Successful actions redirect back to `/` so a reload never resubmits.

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use finquiz_core::{Page, PageView, QuizError, QuizSession};
use maud::Markup;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{state::AppState, store::session_cookie, views};

const UNAVAILABLE_MESSAGE: &str =
    "새로운 문제를 만들지 못했습니다. 잠시 후 다시 시도해 주세요.";
const GENERATOR_FAILED_MESSAGE: &str =
    "퀴즈 생성 서비스에 연결할 수 없습니다. 잠시 후 다시 시도해 주세요.";

#[derive(Deserialize, Debug)]
pub struct SubmitForm {
    #[serde(default)]
    pub answer: Option<String>,
}

fn html_response(session_id: Uuid, status: StatusCode, markup: Markup) -> Response {
    (
        status,
        [(header::SET_COOKIE, session_cookie(session_id))],
        markup,
    )
        .into_response()
}

fn redirect_home(session_id: Uuid) -> Response {
    (
        [(header::SET_COOKIE, session_cookie(session_id))],
        Redirect::to("/"),
    )
        .into_response()
}

fn render_view(session: &QuizSession, notice: Option<&str>) -> Markup {
    match session.view() {
        PageView::Quiz(view) => views::quiz_page(&view, notice),
        PageView::Answer(view) => views::answer_page(&view),
        PageView::Blank => views::blank_page(),
    }
}

fn generation_failure(session_id: Uuid, err: QuizError) -> Response {
    match err {
        QuizError::Generation(source) => {
            error!(session_id = %session_id, "Quiz generation failed: {:?}", source);
            html_response(
                session_id,
                StatusCode::BAD_GATEWAY,
                views::unavailable_page(GENERATOR_FAILED_MESSAGE),
            )
        }
        exhausted @ QuizError::Exhausted { .. } => {
            warn!(session_id = %session_id, error = %exhausted, "No new question available");
            html_response(
                session_id,
                StatusCode::SERVICE_UNAVAILABLE,
                views::unavailable_page(UNAVAILABLE_MESSAGE),
            )
        }
    }
}

/// Renders the session's current page, generating a question on first entry
/// to the quiz page.
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session_id, session) = state.sessions.for_request(&headers).await;
    let mut session = session.lock().await;

    if session.page == Page::Quiz {
        match session.enter_quiz(&state.requester).await {
            Ok(Some(report)) => {
                info!(session_id = %session_id, attempts = report.attempts, "Generated quiz question");
            }
            Ok(None) => {}
            Err(err) => return generation_failure(session_id, err),
        }
    }

    html_response(session_id, StatusCode::OK, render_view(&session, None))
}

/// Handles the quiz page's form.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> Response {
    let (session_id, session) = state.sessions.for_request(&headers).await;
    let mut session = session.lock().await;

    let result = match form.answer.as_deref() {
        Some(answer) => session
            .select_answer(answer)
            .and_then(|()| session.submit()),
        None => session.submit(),
    };

    match result {
        Ok(()) => {
            info!(session_id = %session_id, answer = ?session.selected_answer, "Answer submitted");
            redirect_home(session_id)
        }
        Err(err) => {
            warn!(session_id = %session_id, error = %err, "Rejected submission");
            html_response(
                session_id,
                StatusCode::BAD_REQUEST,
                render_view(&session, Some(&err.to_string())),
            )
        }
    }
}

/// Handles the answer page's "next question" button.
pub async fn next(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session_id, session) = state.sessions.for_request(&headers).await;
    let mut session = session.lock().await;

    match session.next_quiz(&state.requester).await {
        Ok(report) => {
            info!(session_id = %session_id, attempts = report.attempts, "Moved to next question");
            redirect_home(session_id)
        }
        Err(err) => generation_failure(session_id, err),
    }
}

/// Forgets the session's history and starts over.
pub async fn reset(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session_id, session) = state.sessions.for_request(&headers).await;
    session.lock().await.reset();
    info!(session_id = %session_id, "Session reset");
    redirect_home(session_id)
}
