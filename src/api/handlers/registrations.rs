//! Registration submission and listing handlers.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, error, info, warn};

use crate::api::error::{
    ApiError, ErrorCode, LISTING_FAILED_MESSAGE, MULTIPLE_FILES_MESSAGE,
    SUBMISSION_FAILED_MESSAGE,
};
use crate::api::types::{MessageResponse, Submission, UploadedFile, REGISTRATION_SUCCESSFUL};
use crate::domain::{FormField, NewRegistration, Registration};
use crate::infra::{RegistrationError, Result};
use crate::server::AppState;

/// POST /submit-registration - Create a registration from a multipart form.
pub async fn submit_registration(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let submission = read_submission(multipart?).await?;

    // Validate before touching the blob store so rejected forms leave no files.
    let new = submission.form.validate()?;

    let new = match submission.payment_proof {
        Some(upload) => {
            let path = state
                .blobs
                .put(upload.file_name, upload.bytes)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to store payment proof");
                    ApiError::server(&e, SUBMISSION_FAILED_MESSAGE)
                })?;
            new.with_payment_proof(path)
        }
        None => new,
    };

    let proof = new.payment_proof.clone();
    match register(&state, new).await {
        Ok(registration) => {
            info!(
                registration_id = %registration.id,
                roll_number = %registration.roll_number,
                "Registration created"
            );
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new(REGISTRATION_SUCCESSFUL)),
            ))
        }
        Err(err) => {
            if let Some(path) = proof {
                discard_blob(&state, &path).await;
            }
            Err(submission_error(err))
        }
    }
}

/// GET /registrations - List every registration.
pub async fn list_registrations(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<Registration>>, ApiError> {
    let registrations = state.registrations.list().await.map_err(|e| {
        error!(error = %e, "Failed to list registrations");
        ApiError::server(&e, LISTING_FAILED_MESSAGE)
    })?;

    Ok(Json(registrations))
}

/// Duplicate check followed by insert.
///
/// The check and the insert are not atomic; a concurrent submission that
/// slips between them is caught by the store's unique constraints and
/// surfaces as the same `Duplicate` error.
async fn register(state: &AppState, new: NewRegistration) -> Result<Registration> {
    if state
        .registrations
        .exists_conflicting(&new.roll_number, &new.transaction_id)
        .await?
    {
        return Err(RegistrationError::Duplicate);
    }

    state.registrations.insert(new).await
}

fn submission_error(err: RegistrationError) -> ApiError {
    match err {
        RegistrationError::Duplicate => {
            debug!("Rejected duplicate registration");
            ApiError::duplicate_registration()
        }
        other => {
            error!(error = %other, "Registration failed");
            ApiError::server(&other, SUBMISSION_FAILED_MESSAGE)
        }
    }
}

async fn discard_blob(state: &AppState, path: &str) {
    if let Err(e) = state.blobs.remove(path).await {
        warn!(blob = %path, error = %e, "Failed to remove orphaned payment proof");
    }
}

/// Drain the multipart body into the text form and at most one file.
///
/// Unknown parts are skipped. A repeated text part overwrites the earlier
/// value. A `paymentProof` part is a file only when it carries a filename;
/// a plain text value under that name is ignored, and so is the empty part
/// browsers send for an untouched file input.
pub(crate) async fn read_submission(
    mut multipart: Multipart,
) -> std::result::Result<Submission, ApiError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match FormField::from_name(&name) {
            Some(FormField::PaymentProof) => {
                let Some(file_name) = field
                    .file_name()
                    .map(str::to_owned)
                    .filter(|s| !s.is_empty())
                else {
                    debug!("Ignoring paymentProof part without a filename");
                    continue;
                };
                let bytes = field.bytes().await?;

                if bytes.is_empty() {
                    continue;
                }
                if submission.payment_proof.is_some() {
                    return Err(ApiError::new(
                        ErrorCode::InvalidRequestBody,
                        MULTIPLE_FILES_MESSAGE,
                    ));
                }

                submission.payment_proof = Some(UploadedFile {
                    file_name: Some(file_name),
                    bytes: bytes.to_vec(),
                });
            }
            Some(text_field) => {
                let value = field.text().await?;
                submission.form.set(text_field, value);
            }
            None => debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    Ok(submission)
}
