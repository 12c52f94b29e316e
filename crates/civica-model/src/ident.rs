use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const USERNAME_MAX_LEN: usize = 80;
pub const EMAIL_MAX_LEN: usize = 120;
pub const ROLE_MAX_LEN: usize = 20;
pub const TITLE_MAX_LEN: usize = 200;
pub const TAG_MAX_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Username(String);

impl Username {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("username must not be empty".to_string()));
        }
        if s.len() > USERNAME_MAX_LEN {
            return Err(ValidationError(format!(
                "username exceeds max length {USERNAME_MAX_LEN}"
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
        {
            return Err(ValidationError(
                "username must match [A-Za-z0-9._-]+".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct EmailAddr(String);

impl EmailAddr {
    /// Addresses are normalized to ASCII lowercase so that uniqueness and
    /// duplicate-application checks are case-insensitive.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ValidationError("email must not be empty".to_string()));
        }
        if s.len() > EMAIL_MAX_LEN {
            return Err(ValidationError(format!(
                "email exceeds max length {EMAIL_MAX_LEN}"
            )));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ValidationError(
                "email must not contain whitespace".to_string(),
            ));
        }
        let Some((local, domain)) = s.split_once('@') else {
            return Err(ValidationError("email must contain '@'".to_string()));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(ValidationError(format!("malformed email address: {s}")));
        }
        Ok(Self(s))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EmailAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Membership role. An open set stored as text; `student` is the default
/// and `coordinator` is the only other role the original site recognizes.
/// Administrative rights are a separate flag, never inferred from the role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Role(String);

impl Role {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ValidationError("role must not be empty".to_string()));
        }
        if s.len() > ROLE_MAX_LEN {
            return Err(ValidationError(format!(
                "role exceeds max length {ROLE_MAX_LEN}"
            )));
        }
        if !s.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
            return Err(ValidationError("role must match [a-z_]+".to_string()));
        }
        Ok(Self(s))
    }

    #[must_use]
    pub fn student() -> Self {
        Self("student".to_string())
    }

    #[must_use]
    pub fn is_coordinator(&self) -> bool {
        self.0 == "coordinator"
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::student()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Required short text field: titles, organization names, full names.
pub fn parse_title(field: &str, input: &str) -> Result<String, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError(format!("{field} must not be empty")));
    }
    if s.len() > TITLE_MAX_LEN {
        return Err(ValidationError(format!(
            "{field} exceeds max length {TITLE_MAX_LEN}"
        )));
    }
    Ok(s.to_string())
}

/// Required long text field: bodies, descriptions, messages.
pub fn parse_body(field: &str, input: &str) -> Result<String, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError(format!("{field} must not be empty")));
    }
    Ok(s.to_string())
}

/// Optional classifier (question category, discussion topic, post category).
/// Blank input falls back to the given default.
pub fn parse_tag(input: &str, default: &str) -> Result<String, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(default.to_string());
    }
    if s.len() > TAG_MAX_LEN {
        return Err(ValidationError(format!(
            "category exceeds max length {TAG_MAX_LEN}"
        )));
    }
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rejects_empty_whitespace_and_oversize() {
        assert!(Username::parse("").is_err());
        assert!(Username::parse("   ").is_err());
        assert!(Username::parse("has space").is_err());
        assert!(Username::parse(&"a".repeat(USERNAME_MAX_LEN + 1)).is_err());
        assert_eq!(Username::parse("  alice  ").unwrap().as_str(), "alice");
    }

    #[test]
    fn email_is_normalized_and_shape_checked() {
        assert_eq!(EmailAddr::parse("A@X.Com").unwrap().as_str(), "a@x.com");
        assert!(EmailAddr::parse("nodomain@").is_err());
        assert!(EmailAddr::parse("@x.com").is_err());
        assert!(EmailAddr::parse("a@x").is_err());
        assert!(EmailAddr::parse("two@at@x.com").is_err());
        assert!(EmailAddr::parse("ws a@x.com").is_err());
    }

    #[test]
    fn role_defaults_to_student() {
        assert_eq!(Role::default().as_str(), "student");
        assert!(Role::parse("Coordinator").unwrap().is_coordinator());
        assert!(Role::parse("no spaces allowed").is_err());
    }

    #[test]
    fn tag_falls_back_to_default_when_blank() {
        assert_eq!(parse_tag("", "general").unwrap(), "general");
        assert_eq!(parse_tag("  events ", "general").unwrap(), "events");
        assert!(parse_tag(&"x".repeat(TAG_MAX_LEN + 1), "general").is_err());
    }
}
