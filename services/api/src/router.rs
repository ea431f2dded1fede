//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the HTML pages, the JSON API, and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AnswerPayload, ErrorResponse, OptionPayload, PageKind, QuizPayload, SessionSnapshot,
        SubmitAnswerPayload,
    },
    pages,
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_session,
        handlers::start_quiz,
        handlers::submit_answer,
        handlers::next_question,
        handlers::delete_session,
    ),
    components(
        schemas(SessionSnapshot, QuizPayload, AnswerPayload, OptionPayload, PageKind, SubmitAnswerPayload, ErrorResponse)
    ),
    tags(
        (name = "FinQuiz API", description = "Finance and economics quiz sessions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let page_router = Router::new()
        .route("/", get(pages::index))
        .route("/submit", post(pages::submit))
        .route("/next", post(pages::next))
        .route("/reset", post(pages::reset));

    let api_router = Router::new()
        .route(
            "/api/session",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/session/quiz", post(handlers::start_quiz))
        .route("/api/session/answer", post(handlers::submit_answer))
        .route("/api/session/next", post(handlers::next_question));

    // Apply the state to the page and API routes only; Swagger UI is stateless.
    let stateful = page_router.merge(api_router).with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(stateful)
}
