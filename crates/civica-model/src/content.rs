use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub is_urgent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub user_id: i64,
    pub is_resolved: bool,
    pub is_urgent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub content: String,
    pub author: String,
    pub user_id: i64,
    pub question_id: i64,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub topic: String,
    pub author: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionReply {
    pub id: i64,
    pub content: String,
    pub author: String,
    pub user_id: i64,
    pub discussion_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityComment {
    pub id: i64,
    pub content: String,
    pub author: String,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}
