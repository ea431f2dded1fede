//! FinQuiz API Library Crate
//!
//! This library contains the web layer of the quiz service: configuration,
//! the in-memory session store, HTML pages, the JSON API and routing. The
//! `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod router;
pub mod state;
pub mod store;
pub mod views;
