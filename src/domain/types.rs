//! Core type definitions for the registration service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted length (in characters) of any submitted text field
pub const MAX_FIELD_LEN: usize = 256;

/// Registration identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub uuid::Uuid);

impl RegistrationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id)
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Form fields accepted by the submission endpoint, by their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    RollNumber,
    Section,
    Department,
    Year,
    TransactionId,
    PaymentProof,
}

impl FormField {
    /// Required text fields, in the order they are validated.
    pub const REQUIRED: [FormField; 6] = [
        FormField::Name,
        FormField::RollNumber,
        FormField::Section,
        FormField::Department,
        FormField::Year,
        FormField::TransactionId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::RollNumber => "rollNumber",
            FormField::Section => "section",
            FormField::Department => "department",
            FormField::Year => "year",
            FormField::TransactionId => "transactionId",
            FormField::PaymentProof => "paymentProof",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(FormField::Name),
            "rollNumber" => Some(FormField::RollNumber),
            "section" => Some(FormField::Section),
            "department" => Some(FormField::Department),
            "year" => Some(FormField::Year),
            "transactionId" => Some(FormField::TransactionId),
            "paymentProof" => Some(FormField::PaymentProof),
            _ => None,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_field_names_round_trip() {
        for field in FormField::REQUIRED {
            assert_eq!(FormField::from_name(field.as_str()), Some(field));
        }
        assert_eq!(
            FormField::from_name("paymentProof"),
            Some(FormField::PaymentProof)
        );
        assert_eq!(FormField::from_name("roll_number"), None);
    }

    #[test]
    fn test_registration_id_serializes_as_uuid() {
        let id = RegistrationId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!(id.0.to_string()));
    }
}
