//! Announcement board: public reads, login-gated posting.

use crate::store_err;
use chrono::{DateTime, Utc};
use civica_model::{parse_body, parse_title, Announcement, DomainError, Identity};
use rusqlite::{params, Connection, Row};

fn announcement_from_row(row: &Row<'_>) -> rusqlite::Result<Announcement> {
    Ok(Announcement {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author: row.get(3)?,
        is_urgent: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const COLUMNS: &str = "id, title, content, author, is_urgent, created_at";

pub fn create_announcement(
    conn: &Connection,
    identity: &Identity,
    title: &str,
    content: &str,
    is_urgent: bool,
) -> Result<Announcement, DomainError> {
    let title = parse_title("title", title)?;
    let content = parse_body("content", content)?;
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO announcements (title, content, author, is_urgent, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![title, content, identity.username, is_urgent, created_at],
    )
    .map_err(store_err)?;
    Ok(Announcement {
        id: conn.last_insert_rowid(),
        title,
        content,
        author: identity.username.clone(),
        is_urgent,
        created_at,
    })
}

/// Newest first.
pub fn list_announcements(conn: &Connection) -> Result<Vec<Announcement>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], announcement_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

/// The activity feed for the admin dashboard.
pub fn recent_announcements(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<Announcement>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![limit as i64], announcement_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

pub fn count_announcements_since(
    conn: &Connection,
    since: DateTime<Utc>,
) -> Result<i64, DomainError> {
    conn.query_row(
        "SELECT COUNT(*) FROM announcements WHERE created_at >= ?1",
        params![since],
        |r| r.get(0),
    )
    .map_err(store_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{open_memory, schema, users};
    use chrono::Duration;

    fn fresh_with_identity() -> (Connection, Identity) {
        let conn = open_memory().expect("open");
        schema::init_schema(&conn).expect("schema");
        users::register(&conn, "alice", "a@x.com", "pw", None).expect("register");
        let identity = users::authenticate(&conn, "alice", "pw").expect("login");
        (conn, identity)
    }

    #[test]
    fn create_requires_title_and_content() {
        let (conn, identity) = fresh_with_identity();
        assert!(create_announcement(&conn, &identity, " ", "body", false).is_err());
        assert!(create_announcement(&conn, &identity, "title", "", false).is_err());
        let ann = create_announcement(&conn, &identity, "Meeting", "Sunday 4pm", true)
            .expect("create");
        assert_eq!(ann.author, "alice");
        assert!(ann.is_urgent);
    }

    #[test]
    fn listing_is_newest_first_and_count_since_filters() {
        let (conn, identity) = fresh_with_identity();
        create_announcement(&conn, &identity, "older", "x", false).expect("older");
        create_announcement(&conn, &identity, "newer", "x", false).expect("newer");
        let all = list_announcements(&conn).expect("list");
        assert_eq!(all[0].title, "newer");
        assert_eq!(all[1].title, "older");

        let future = Utc::now() + Duration::hours(1);
        assert_eq!(count_announcements_since(&conn, future).expect("count"), 0);
        let past = Utc::now() - Duration::hours(1);
        assert_eq!(count_announcements_since(&conn, past).expect("count"), 2);

        assert_eq!(recent_announcements(&conn, 1).expect("recent").len(), 1);
    }
}
