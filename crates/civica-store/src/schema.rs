// SPDX-License-Identifier: Apache-2.0

//! Schema lifecycle: one idempotent init, one destructive reset, one
//! optional fixture seed. This replaces any per-environment reset script;
//! there is deliberately no HTTP surface for it.

use crate::{password, store_err};
use chrono::Utc;
use civica_model::DomainError;
use rusqlite::{params, Connection};
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_DDL: &str = "
    CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY,
      username TEXT NOT NULL UNIQUE,
      email TEXT NOT NULL UNIQUE,
      password_hash TEXT NOT NULL,
      role TEXT NOT NULL DEFAULT 'student',
      is_admin INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS announcements (
      id INTEGER PRIMARY KEY,
      title TEXT NOT NULL,
      content TEXT NOT NULL,
      author TEXT NOT NULL,
      is_urgent INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS questions (
      id INTEGER PRIMARY KEY,
      title TEXT NOT NULL,
      content TEXT NOT NULL,
      category TEXT NOT NULL DEFAULT 'general',
      author TEXT NOT NULL,
      user_id INTEGER NOT NULL REFERENCES users(id),
      is_resolved INTEGER NOT NULL DEFAULT 0,
      is_urgent INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS answers (
      id INTEGER PRIMARY KEY,
      content TEXT NOT NULL,
      author TEXT NOT NULL,
      user_id INTEGER NOT NULL REFERENCES users(id),
      question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
      is_accepted INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS discussions (
      id INTEGER PRIMARY KEY,
      title TEXT NOT NULL,
      content TEXT NOT NULL,
      topic TEXT NOT NULL DEFAULT 'general',
      author TEXT NOT NULL,
      user_id INTEGER NOT NULL REFERENCES users(id),
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS discussion_replies (
      id INTEGER PRIMARY KEY,
      content TEXT NOT NULL,
      author TEXT NOT NULL,
      user_id INTEGER NOT NULL REFERENCES users(id),
      discussion_id INTEGER NOT NULL REFERENCES discussions(id) ON DELETE CASCADE,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS community_posts (
      id INTEGER PRIMARY KEY,
      title TEXT NOT NULL,
      content TEXT NOT NULL,
      author TEXT NOT NULL,
      category TEXT NOT NULL DEFAULT 'general',
      is_pinned INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS community_comments (
      id INTEGER PRIMARY KEY,
      content TEXT NOT NULL,
      author TEXT NOT NULL,
      post_id INTEGER NOT NULL REFERENCES community_posts(id) ON DELETE CASCADE,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS member_profiles (
      id INTEGER PRIMARY KEY,
      user_id INTEGER NOT NULL UNIQUE REFERENCES users(id),
      full_name TEXT NOT NULL,
      phone TEXT,
      location TEXT,
      profession TEXT NOT NULL DEFAULT 'Member',
      bio TEXT NOT NULL DEFAULT '',
      is_public INTEGER NOT NULL DEFAULT 1,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS volunteer_opportunities (
      id INTEGER PRIMARY KEY,
      title TEXT NOT NULL,
      description TEXT NOT NULL,
      organization TEXT NOT NULL,
      location TEXT,
      contact_email TEXT,
      contact_phone TEXT,
      skills_needed TEXT,
      time_commitment TEXT,
      is_urgent INTEGER NOT NULL DEFAULT 0,
      is_active INTEGER NOT NULL DEFAULT 1,
      created_by TEXT NOT NULL,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS volunteer_applications (
      id INTEGER PRIMARY KEY,
      opportunity_id INTEGER NOT NULL REFERENCES volunteer_opportunities(id) ON DELETE CASCADE,
      applicant_name TEXT NOT NULL,
      applicant_email TEXT NOT NULL,
      applicant_phone TEXT,
      message TEXT,
      skills TEXT,
      status TEXT NOT NULL DEFAULT 'pending',
      applied_at TEXT NOT NULL,
      UNIQUE (opportunity_id, applicant_email)
    );

    CREATE INDEX IF NOT EXISTS idx_questions_created_at ON questions(created_at);
    CREATE INDEX IF NOT EXISTS idx_answers_question_id ON answers(question_id);
    CREATE INDEX IF NOT EXISTS idx_discussion_replies_discussion_id
      ON discussion_replies(discussion_id);
    CREATE INDEX IF NOT EXISTS idx_community_comments_post_id ON community_comments(post_id);
    CREATE INDEX IF NOT EXISTS idx_member_profiles_public ON member_profiles(is_public);
    CREATE INDEX IF NOT EXISTS idx_volunteer_applications_email
      ON volunteer_applications(applicant_email);
    CREATE INDEX IF NOT EXISTS idx_volunteer_opportunities_active
      ON volunteer_opportunities(is_active);
";

const DROP_DDL: &str = "
    DROP TABLE IF EXISTS volunteer_applications;
    DROP TABLE IF EXISTS volunteer_opportunities;
    DROP TABLE IF EXISTS member_profiles;
    DROP TABLE IF EXISTS community_comments;
    DROP TABLE IF EXISTS community_posts;
    DROP TABLE IF EXISTS discussion_replies;
    DROP TABLE IF EXISTS discussions;
    DROP TABLE IF EXISTS answers;
    DROP TABLE IF EXISTS questions;
    DROP TABLE IF EXISTS announcements;
    DROP TABLE IF EXISTS users;
";

/// Create all tables and indexes when missing. Safe to call on every boot.
pub fn init_schema(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(SCHEMA_DDL).map_err(store_err)?;
    conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))
        .map_err(store_err)?;
    Ok(())
}

/// Drop everything and recreate from scratch. Children drop before parents
/// so the statement batch also works with foreign keys enforced.
pub fn reset_schema(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(DROP_DDL).map_err(store_err)?;
    init_schema(conn)?;
    info!("schema reset to version {SCHEMA_VERSION}");
    Ok(())
}

/// Minimal fixture set for local runs: one administrator, a welcome
/// announcement, and one open opportunity. Idempotent via the admin
/// username probe.
pub fn seed_demo_data(conn: &Connection) -> Result<(), DomainError> {
    let already: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = 'admin')",
            [],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    if already {
        return Ok(());
    }
    let now = Utc::now();
    let hash = password::hash_password("change-me-now")?;
    conn.execute(
        "INSERT INTO users (username, email, password_hash, role, is_admin, created_at)
         VALUES ('admin', 'admin@civica.local', ?1, 'coordinator', 1, ?2)",
        params![hash, now],
    )
    .map_err(store_err)?;
    conn.execute(
        "INSERT INTO announcements (title, content, author, is_urgent, created_at)
         VALUES ('Welcome to Civica', 'The community site is up.', 'admin', 0, ?1)",
        params![now],
    )
    .map_err(store_err)?;
    conn.execute(
        "INSERT INTO volunteer_opportunities
           (title, description, organization, location, is_urgent, is_active,
            created_by, created_at, updated_at)
         VALUES ('Community clean-up', 'Monthly park clean-up crew.', 'Civica',
                 'Town hall', 0, 1, 'admin', ?1, ?1)",
        params![now],
    )
    .map_err(store_err)?;
    info!("seeded demo fixtures");
    Ok(())
}
