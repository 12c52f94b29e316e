// SPDX-License-Identifier: Apache-2.0

use civica_model::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    DuplicateUsername,
    DuplicateEmail,
    InvalidCredentials,
    Unauthorized,
    Forbidden,
    NotFound,
    NotVisible,
    OpportunityInactive,
    DuplicateApplication,
    ValidationFailed,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, message, json!({}))
    }
}

impl From<&DomainError> for ApiError {
    fn from(err: &DomainError) -> Self {
        let code = match err {
            DomainError::DuplicateUsername => ApiErrorCode::DuplicateUsername,
            DomainError::DuplicateEmail => ApiErrorCode::DuplicateEmail,
            DomainError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            DomainError::Unauthorized => ApiErrorCode::Unauthorized,
            DomainError::Forbidden => ApiErrorCode::Forbidden,
            DomainError::NotFound => ApiErrorCode::NotFound,
            DomainError::NotVisible => ApiErrorCode::NotVisible,
            DomainError::OpportunityInactive => ApiErrorCode::OpportunityInactive,
            DomainError::DuplicateApplication => ApiErrorCode::DuplicateApplication,
            DomainError::Invalid(_) => ApiErrorCode::ValidationFailed,
            DomainError::Store(_) => ApiErrorCode::Internal,
        };
        // Store failure details stay out of the response body.
        let details = match err {
            DomainError::Invalid(v) => json!({"reason": v.to_string()}),
            _ => json!({}),
        };
        let message = match err {
            DomainError::Store(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        Self::new(code, message, details)
    }
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
    assert_traits::<ApiError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_details_are_not_leaked() {
        let err = DomainError::Store("users table is on fire".to_string());
        let api: ApiError = (&err).into();
        assert_eq!(api.code, ApiErrorCode::Internal);
        assert!(!api.message.contains("fire"));
    }

    #[test]
    fn codes_serialize_snake_case() {
        let api: ApiError = (&DomainError::DuplicateApplication).into();
        let value = serde_json::to_value(&api).expect("serialize");
        assert_eq!(value["code"], "duplicate_application");
    }
}
