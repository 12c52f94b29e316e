#![forbid(unsafe_code)]
//! The Civica HTTP contract: the error envelope every handler speaks,
//! the mapping from domain failures onto statuses and redirects, and the
//! request form shapes.

mod dto;
mod error_mapping;
mod errors;

pub use dto::{
    checkbox_checked, optional_text, AnnouncementForm, AnswerForm, ApplicationForm, CommentForm,
    DiscussionForm, LoginForm, OpportunityForm, PostForm, ProfileForm, QuestionForm, RegisterForm,
    SearchQuery,
};
pub use error_mapping::{map_error, redirects_to_login, ApiErrorMapping};
pub use errors::{ApiError, ApiErrorCode};

pub const CRATE_NAME: &str = "civica-api";
