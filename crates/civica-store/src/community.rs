// SPDX-License-Identifier: Apache-2.0

//! Community post board: posts, comments, and moderated deletion.

use crate::store_err;
use chrono::Utc;
use civica_model::{
    parse_body, parse_tag, parse_title, CommunityComment, CommunityPost, DomainError, Identity,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<CommunityPost> {
    Ok(CommunityPost {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author: row.get(3)?,
        category: row.get(4)?,
        is_pinned: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommunityComment> {
    Ok(CommunityComment {
        id: row.get(0)?,
        content: row.get(1)?,
        author: row.get(2)?,
        post_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

const POST_COLUMNS: &str = "id, title, content, author, category, is_pinned, created_at";
const COMMENT_COLUMNS: &str = "id, content, author, post_id, created_at";

pub fn create_post(
    conn: &Connection,
    identity: &Identity,
    title: &str,
    content: &str,
    category: &str,
) -> Result<CommunityPost, DomainError> {
    let title = parse_title("title", title)?;
    let content = parse_body("content", content)?;
    let category = parse_tag(category, "general")?;
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO community_posts (title, content, author, category, is_pinned, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![title, content, identity.username, category, created_at],
    )
    .map_err(store_err)?;
    Ok(CommunityPost {
        id: conn.last_insert_rowid(),
        title,
        content,
        author: identity.username.clone(),
        category,
        is_pinned: false,
        created_at,
    })
}

/// Pinned posts first, then newest.
pub fn list_posts(conn: &Connection) -> Result<Vec<CommunityPost>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {POST_COLUMNS} FROM community_posts
             ORDER BY is_pinned DESC, created_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], post_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

pub fn comment_on_post(
    conn: &Connection,
    identity: &Identity,
    post_id: i64,
    content: &str,
) -> Result<CommunityComment, DomainError> {
    let content = parse_body("content", content)?;
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM community_posts WHERE id = ?1)",
            params![post_id],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    if !exists {
        return Err(DomainError::NotFound);
    }
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO community_comments (content, author, post_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![content, identity.username, post_id, created_at],
    )
    .map_err(store_err)?;
    Ok(CommunityComment {
        id: conn.last_insert_rowid(),
        content,
        author: identity.username.clone(),
        post_id,
        created_at,
    })
}

/// Oldest first, thread order.
pub fn list_comments(
    conn: &Connection,
    post_id: i64,
) -> Result<Vec<CommunityComment>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM community_comments
             WHERE post_id = ?1 ORDER BY created_at ASC, id ASC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![post_id], comment_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

/// Delete a post and its comments in one transaction. Author or admin only.
pub fn delete_post(
    conn: &mut Connection,
    identity: &Identity,
    post_id: i64,
) -> Result<(), DomainError> {
    let tx = conn.transaction().map_err(store_err)?;
    let author: Option<String> = tx
        .query_row(
            "SELECT author FROM community_posts WHERE id = ?1",
            params![post_id],
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
        "DELETE FROM community_comments WHERE post_id = ?1",
        params![post_id],
    )
    .map_err(store_err)?;
    tx.execute("DELETE FROM community_posts WHERE id = ?1", params![post_id])
        .map_err(store_err)?;
    tx.commit().map_err(store_err)
}
