#![forbid(unsafe_code)]
//! Civica domain model SSOT.
//!
//! Entity types, validated identifiers, and the shared error taxonomy.
//! This crate performs no I/O; everything here is plain data with parse
//! constructors that reject malformed input at the boundary.

mod content;
mod error;
mod ident;
mod identity;
mod profile;
mod user;
mod volunteer;

pub use content::{
    Announcement, Answer, CommunityComment, CommunityPost, Discussion, DiscussionReply, Question,
};
pub use error::{DomainError, ValidationError};
pub use ident::{
    parse_body, parse_tag, parse_title, EmailAddr, Role, Username, EMAIL_MAX_LEN, ROLE_MAX_LEN,
    TAG_MAX_LEN, TITLE_MAX_LEN, USERNAME_MAX_LEN,
};
pub use identity::Identity;
pub use profile::{MemberProfile, ProfileFields, PROFILE_DEFAULT_PROFESSION};
pub use user::User;
pub use volunteer::{ApplicationStatus, VolunteerApplication, VolunteerOpportunity};

pub const CRATE_NAME: &str = "civica-model";
