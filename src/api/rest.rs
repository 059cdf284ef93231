//! REST API endpoints for the registration service.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers::{list_registrations, submit_registration};
use crate::server::AppState;

/// Build the registration router.
///
/// `max_upload_bytes` caps the whole multipart body of a submission,
/// payment proof included.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/submit-registration",
            post(submit_registration).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/registrations", get(list_registrations))
}
