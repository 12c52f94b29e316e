//! Discussion forum: long-form threads with replies.

use crate::store_err;
use chrono::Utc;
use civica_model::{
    parse_body, parse_tag, parse_title, Discussion, DiscussionReply, DomainError, Identity,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn discussion_from_row(row: &Row<'_>) -> rusqlite::Result<Discussion> {
    Ok(Discussion {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        topic: row.get(3)?,
        author: row.get(4)?,
        user_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn reply_from_row(row: &Row<'_>) -> rusqlite::Result<DiscussionReply> {
    Ok(DiscussionReply {
        id: row.get(0)?,
        content: row.get(1)?,
        author: row.get(2)?,
        user_id: row.get(3)?,
        discussion_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const DISCUSSION_COLUMNS: &str = "id, title, content, topic, author, user_id, created_at";
const REPLY_COLUMNS: &str = "id, content, author, user_id, discussion_id, created_at";

pub fn create_discussion(
    conn: &Connection,
    identity: &Identity,
    title: &str,
    content: &str,
    topic: &str,
) -> Result<Discussion, DomainError> {
    let title = parse_title("title", title)?;
    let content = parse_body("content", content)?;
    let topic = parse_tag(topic, "general")?;
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO discussions (title, content, topic, author, user_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            title,
            content,
            topic,
            identity.username,
            identity.user_id,
            created_at
        ],
    )
    .map_err(store_err)?;
    Ok(Discussion {
        id: conn.last_insert_rowid(),
        title,
        content,
        topic,
        author: identity.username.clone(),
        user_id: identity.user_id,
        created_at,
    })
}

/// Newest first.
pub fn list_discussions(conn: &Connection) -> Result<Vec<Discussion>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {DISCUSSION_COLUMNS} FROM discussions ORDER BY created_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], discussion_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

pub fn post_discussion_reply(
    conn: &Connection,
    identity: &Identity,
    discussion_id: i64,
    content: &str,
) -> Result<DiscussionReply, DomainError> {
    let content = parse_body("content", content)?;
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM discussions WHERE id = ?1)",
            params![discussion_id],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    if !exists {
        return Err(DomainError::NotFound);
    }
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO discussion_replies (content, author, user_id, discussion_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            content,
            identity.username,
            identity.user_id,
            discussion_id,
            created_at
        ],
    )
    .map_err(store_err)?;
    Ok(DiscussionReply {
        id: conn.last_insert_rowid(),
        content,
        author: identity.username.clone(),
        user_id: identity.user_id,
        discussion_id,
        created_at,
    })
}

/// Oldest first, thread order.
pub fn list_replies(
    conn: &Connection,
    discussion_id: i64,
) -> Result<Vec<DiscussionReply>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {REPLY_COLUMNS} FROM discussion_replies
             WHERE discussion_id = ?1 ORDER BY created_at ASC, id ASC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![discussion_id], reply_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

/// Delete a thread and everything under it. Author or admin only; the
/// replies go in the same transaction as the parent row.
pub fn delete_discussion(
    conn: &mut Connection,
    identity: &Identity,
    discussion_id: i64,
) -> Result<(), DomainError> {
    let tx = conn.transaction().map_err(store_err)?;
    let author: Option<String> = tx
        .query_row(
            "SELECT author FROM discussions WHERE id = ?1",
            params![discussion_id],
            |r| r.get(0),
        )
        .optional()
        .map_err(store_err)?;
    let Some(author) = author else {
        return Err(DomainError::NotFound);
    };
    if author != identity.username && !identity.is_admin {
        return Err(DomainError::Forbidden);
    }
    tx.execute(
        "DELETE FROM discussion_replies WHERE discussion_id = ?1",
        params![discussion_id],
    )
    .map_err(store_err)?;
    tx.execute(
        "DELETE FROM discussions WHERE id = ?1",
        params![discussion_id],
    )
    .map_err(store_err)?;
    tx.commit().map_err(store_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{open_memory, schema, users};

    fn fresh() -> (Connection, Identity) {
        let conn = open_memory().expect("open");
        schema::init_schema(&conn).expect("schema");
        users::register(&conn, "dana", "d@x.com", "pw", None).expect("register");
        let identity = users::authenticate(&conn, "dana", "pw").expect("login");
        (conn, identity)
    }

    #[test]
    fn threads_default_topic_and_list_newest_first() {
        let (conn, identity) = fresh();
        let d = create_discussion(&conn, &identity, "first", "body", "").expect("d1");
        assert_eq!(d.topic, "general");
        create_discussion(&conn, &identity, "second", "body", "events").expect("d2");
        let all = list_discussions(&conn).expect("list");
        assert_eq!(all[0].title, "second");
    }

    #[test]
    fn replying_to_a_missing_thread_is_not_found() {
        let (conn, identity) = fresh();
        assert_eq!(
            post_discussion_reply(&conn, &identity, 7, "hello").unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn deleting_a_thread_removes_its_replies() {
        let (mut conn, identity) = fresh();
        let d = create_discussion(&conn, &identity, "t", "body", "").expect("thread");
        post_discussion_reply(&conn, &identity, d.id, "one").expect("r1");
        post_discussion_reply(&conn, &identity, d.id, "two").expect("r2");
        assert_eq!(list_replies(&conn, d.id).expect("replies").len(), 2);

        delete_discussion(&mut conn, &identity, d.id).expect("delete");
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM discussion_replies", [], |r| r.get(0))
            .expect("count");
        assert_eq!(orphans, 0);
    }

    #[test]
    fn only_author_or_admin_may_delete() {
        let (mut conn, author) = fresh();
        users::register(&conn, "other", "o@x.com", "pw", None).expect("other");
        let other = users::authenticate(&conn, "other", "pw").expect("login other");
        let d = create_discussion(&conn, &author, "t", "body", "").expect("thread");
        assert_eq!(
            delete_discussion(&mut conn, &other, d.id).unwrap_err(),
            DomainError::Forbidden
        );
        let mut admin = other;
        admin.is_admin = true;
        delete_discussion(&mut conn, &admin, d.id).expect("admin delete");
    }
}
