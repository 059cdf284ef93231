//! Shared request and response types for REST API handlers.

use serde::{Deserialize, Serialize};

use crate::domain::RegistrationForm;

/// Body of a successful submission
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful";

/// `{"message": "..."}` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Payment proof file as received in the multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied filename, if any
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Everything read from a submission request, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub form: RegistrationForm,
    pub payment_proof: Option<UploadedFile>,
}
