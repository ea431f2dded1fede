//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources like the session store and the quiz requester.

use crate::store::SessionStore;
use finquiz_core::requester::QuizRequester;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub requester: Arc<QuizRequester>,
}
