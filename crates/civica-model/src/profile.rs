use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PROFILE_DEFAULT_PROFESSION: &str = "Member";

/// Directory entry owned by exactly one user. Created lazily the first
/// time its owner opens the profile editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profession: String,
    pub bio: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The editable subset of a profile, as submitted by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub full_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profession: String,
    pub bio: String,
    pub is_public: bool,
}
