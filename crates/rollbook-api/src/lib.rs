//! Rollbook HTTP API
//!
//! axum service exposing the student-records and file-ingestion surface.
//! Handlers stay thin: multipart parsing in [`extract`], workflow logic in
//! [`services::ingestion`], HTTP error mapping in [`error`].

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;
