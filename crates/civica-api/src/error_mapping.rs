// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};
use civica_model::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = match error.code {
        ApiErrorCode::ValidationFailed => 400,
        ApiErrorCode::Unauthorized | ApiErrorCode::InvalidCredentials => 401,
        ApiErrorCode::Forbidden | ApiErrorCode::NotVisible => 403,
        ApiErrorCode::NotFound => 404,
        ApiErrorCode::DuplicateUsername
        | ApiErrorCode::DuplicateEmail
        | ApiErrorCode::DuplicateApplication => 409,
        ApiErrorCode::OpportunityInactive => 410,
        ApiErrorCode::Internal => 500,
    };
    ApiErrorMapping { status_code }
}

/// Failures that send a browser back to the login page rather than
/// rendering an error body.
#[must_use]
pub fn redirects_to_login(err: &DomainError) -> bool {
    matches!(
        err,
        DomainError::Unauthorized | DomainError::InvalidCredentials
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_maps_to_a_client_or_server_status() {
        let all = [
            ApiErrorCode::DuplicateUsername,
            ApiErrorCode::DuplicateEmail,
            ApiErrorCode::InvalidCredentials,
            ApiErrorCode::Unauthorized,
            ApiErrorCode::Forbidden,
            ApiErrorCode::NotFound,
            ApiErrorCode::NotVisible,
            ApiErrorCode::OpportunityInactive,
            ApiErrorCode::DuplicateApplication,
            ApiErrorCode::ValidationFailed,
            ApiErrorCode::Internal,
        ];
        for code in all {
            let status = map_error(&ApiError::new(code, "x", serde_json::json!({}))).status_code;
            assert!((400..=599).contains(&status), "{code:?} -> {status}");
        }
    }

    #[test]
    fn only_authentication_failures_redirect_to_login() {
        assert!(redirects_to_login(&DomainError::Unauthorized));
        assert!(redirects_to_login(&DomainError::InvalidCredentials));
        assert!(!redirects_to_login(&DomainError::Forbidden));
        assert!(!redirects_to_login(&DomainError::NotFound));
    }
}
