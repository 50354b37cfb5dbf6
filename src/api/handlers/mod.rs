//! REST endpoint handlers organized by resource.

pub mod account;
pub mod admin;
pub mod catalog;
pub mod session;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog::routes())
        .merge(session::routes())
        .merge(account::routes())
        .merge(admin::routes())
}
