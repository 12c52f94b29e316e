use crate::ident::Role;
use serde::{Deserialize, Serialize};

/// The authenticated user context attached to a request.
///
/// Decoded from the session cookie once per request and passed explicitly
/// into every domain operation; nothing reads authentication state from
/// ambient storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub email: String,
    pub is_admin: bool,
}
