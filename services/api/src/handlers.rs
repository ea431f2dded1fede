//! Axum Handlers for the JSON API
//!
//! Programmatic access to the caller's quiz session. The session is picked from
//! the `finquiz_session` cookie and every response refreshes that cookie. The
//! `utoipa` doc comments feed the OpenAPI document.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use finquiz_core::{QuizError, SessionError};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    models::{ErrorResponse, SessionSnapshot, SubmitAnswerPayload},
    state::AppState,
    store::{session_cookie, session_id_from_headers},
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// No fresh question could be produced within the attempt bound.
    Unavailable(String),
    /// The text-generation provider failed.
    BadGateway(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Unavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { message })).into_response()
            }
            ApiError::BadGateway(err) => {
                error!("Quiz generation failed: {:?}", err);
                let message = "The quiz generator is unavailable. Please try again.".to_string();
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::Generation(source) => Self::BadGateway(source),
            exhausted @ QuizError::Exhausted { .. } => Self::Unavailable(exhausted.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

fn snapshot_response(session_id: Uuid, snapshot: SessionSnapshot) -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(session_id))],
        Json(snapshot),
    )
        .into_response()
}

/// Get the caller's current quiz session.
///
/// Never generates a question; a new session reports an empty quiz page.
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session state", body = SessionSnapshot)
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (session_id, session) = state.sessions.for_request(&headers).await;
    let session = session.lock().await;
    Ok(snapshot_response(
        session_id,
        SessionSnapshot::new(session_id, &session),
    ))
}

/// Open the quiz page, generating a question if the session has none.
#[utoipa::path(
    post,
    path = "/api/session/quiz",
    responses(
        (status = 200, description = "Quiz page with the current question", body = SessionSnapshot),
        (status = 502, description = "Quiz generator failed", body = ErrorResponse),
        (status = 503, description = "No new question available", body = ErrorResponse)
    )
)]
pub async fn start_quiz(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (session_id, session) = state.sessions.for_request(&headers).await;
    let mut session = session.lock().await;

    if let Some(report) = session.enter_quiz(&state.requester).await? {
        info!(session_id = %session_id, attempts = report.attempts, "Generated quiz question");
    }

    Ok(snapshot_response(
        session_id,
        SessionSnapshot::new(session_id, &session),
    ))
}

/// Submit an answer and reveal the correct one.
#[utoipa::path(
    post,
    path = "/api/session/answer",
    request_body = SubmitAnswerPayload,
    responses(
        (status = 200, description = "Answer page with the correct answer", body = SessionSnapshot),
        (status = 400, description = "No current question or unknown option", body = ErrorResponse)
    )
)]
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SubmitAnswerPayload>,
) -> Result<Response, ApiError> {
    let (session_id, session) = state.sessions.for_request(&headers).await;
    let mut session = session.lock().await;

    session.select_answer(&payload.answer)?;
    session.submit()?;
    info!(session_id = %session_id, answer = %payload.answer, "Answer submitted");

    Ok(snapshot_response(
        session_id,
        SessionSnapshot::new(session_id, &session),
    ))
}

/// Move on to a new question.
#[utoipa::path(
    post,
    path = "/api/session/next",
    responses(
        (status = 200, description = "Quiz page with a new question", body = SessionSnapshot),
        (status = 502, description = "Quiz generator failed", body = ErrorResponse),
        (status = 503, description = "No new question available", body = ErrorResponse)
    )
)]
pub async fn next_question(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (session_id, session) = state.sessions.for_request(&headers).await;
    let mut session = session.lock().await;

    let report = session.next_quiz(&state.requester).await?;
    info!(session_id = %session_id, attempts = report.attempts, "Moved to next question");

    Ok(snapshot_response(
        session_id,
        SessionSnapshot::new(session_id, &session),
    ))
}

/// Discard the caller's session, including its question history.
#[utoipa::path(
    delete,
    path = "/api/session",
    responses(
        (status = 204, description = "Session discarded")
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> StatusCode {
    if let Some(session_id) = session_id_from_headers(&headers) {
        if !state.sessions.remove(session_id).await {
            warn!(session_id = %session_id, "Tried to discard an unknown session");
        }
    }
    StatusCode::NO_CONTENT
}
