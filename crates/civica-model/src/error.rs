use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

/// Outcome vocabulary shared by every domain operation.
///
/// Variants other than `Invalid` and `Store` map one-to-one onto the
/// request-boundary notices the server surfaces; `Store` wraps an
/// unexpected persistence failure after the enclosing transaction has
/// been rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    DuplicateUsername,
    DuplicateEmail,
    InvalidCredentials,
    Unauthorized,
    Forbidden,
    NotFound,
    NotVisible,
    OpportunityInactive,
    DuplicateApplication,
    Invalid(ValidationError),
    Store(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateUsername => write!(f, "username already exists"),
            Self::DuplicateEmail => write!(f, "email already exists"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Unauthorized => write!(f, "login required"),
            Self::Forbidden => write!(f, "not allowed"),
            Self::NotFound => write!(f, "not found"),
            Self::NotVisible => write!(f, "profile is not public"),
            Self::OpportunityInactive => write!(f, "opportunity is no longer available"),
            Self::DuplicateApplication => write!(f, "already applied for this opportunity"),
            Self::Invalid(e) => write!(f, "{e}"),
            Self::Store(msg) => write!(f, "store failure: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(e: ValidationError) -> Self {
        Self::Invalid(e)
    }
}
