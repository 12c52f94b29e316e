// SPDX-License-Identifier: Apache-2.0

//! Q&A forum: questions, answers, and the atomic accept flow.

use crate::store_err;
use chrono::Utc;
use civica_model::{
    parse_body, parse_tag, parse_title, Answer, DomainError, Identity, Question,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        author: row.get(4)?,
        user_id: row.get(5)?,
        is_resolved: row.get(6)?,
        is_urgent: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn answer_from_row(row: &Row<'_>) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: row.get(0)?,
        content: row.get(1)?,
        author: row.get(2)?,
        user_id: row.get(3)?,
        question_id: row.get(4)?,
        is_accepted: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const QUESTION_COLUMNS: &str =
    "id, title, content, category, author, user_id, is_resolved, is_urgent, created_at";
const ANSWER_COLUMNS: &str =
    "id, content, author, user_id, question_id, is_accepted, created_at";

pub fn ask_question(
    conn: &Connection,
    identity: &Identity,
    title: &str,
    content: &str,
    category: &str,
    is_urgent: bool,
) -> Result<Question, DomainError> {
    let title = parse_title("title", title)?;
    let content = parse_body("content", content)?;
    let category = parse_tag(category, "general")?;
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO questions (title, content, category, author, user_id,
                                is_resolved, is_urgent, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
        params![
            title,
            content,
            category,
            identity.username,
            identity.user_id,
            is_urgent,
            created_at
        ],
    )
    .map_err(store_err)?;
    Ok(Question {
        id: conn.last_insert_rowid(),
        title,
        content,
        category,
        author: identity.username.clone(),
        user_id: identity.user_id,
        is_resolved: false,
        is_urgent,
        created_at,
    })
}

/// Newest first.
pub fn list_questions(conn: &Connection) -> Result<Vec<Question>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY created_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], question_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

/// Detail view: the question plus its answers, oldest first.
pub fn get_question(
    conn: &Connection,
    question_id: i64,
) -> Result<(Question, Vec<Answer>), DomainError> {
    let question = conn
        .query_row(
            &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
            params![question_id],
            question_from_row,
        )
        .optional()
        .map_err(store_err)?
        .ok_or(DomainError::NotFound)?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers
             WHERE question_id = ?1 ORDER BY created_at ASC, id ASC"
        ))
        .map_err(store_err)?;
    let answers = stmt
        .query_map(params![question_id], answer_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok((question, answers))
}

/// Answering a question that does not exist is `NotFound`, not a silent
/// orphan row.
pub fn post_answer(
    conn: &Connection,
    identity: &Identity,
    question_id: i64,
    content: &str,
) -> Result<Answer, DomainError> {
    let content = parse_body("content", content)?;
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM questions WHERE id = ?1)",
            params![question_id],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    if !exists {
        return Err(DomainError::NotFound);
    }
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO answers (content, author, user_id, question_id, is_accepted, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![
            content,
            identity.username,
            identity.user_id,
            question_id,
            created_at
        ],
    )
    .map_err(store_err)?;
    Ok(Answer {
        id: conn.last_insert_rowid(),
        content,
        author: identity.username.clone(),
        user_id: identity.user_id,
        question_id,
        is_accepted: false,
        created_at,
    })
}

/// Accept an answer on behalf of the question owner.
///
/// `Answer.is_accepted` and `Question.is_resolved` flip inside one
/// transaction: either both become true or neither does. Returns the
/// parent question id for the caller's redirect.
pub fn accept_answer(
    conn: &mut Connection,
    identity: &Identity,
    answer_id: i64,
) -> Result<i64, DomainError> {
    let tx = conn.transaction().map_err(store_err)?;
    let target = tx
        .query_row(
            "SELECT a.question_id, q.user_id FROM answers a
             JOIN questions q ON q.id = a.question_id
             WHERE a.id = ?1",
            params![answer_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()
        .map_err(store_err)?;
    let Some((question_id, owner_id)) = target else {
        return Err(DomainError::NotFound);
    };
    if owner_id != identity.user_id {
        return Err(DomainError::Forbidden);
    }
    tx.execute(
        "UPDATE answers SET is_accepted = 1 WHERE id = ?1",
        params![answer_id],
    )
    .map_err(store_err)?;
    tx.execute(
        "UPDATE questions SET is_resolved = 1 WHERE id = ?1",
        params![question_id],
    )
    .map_err(store_err)?;
    tx.commit().map_err(store_err)?;
    Ok(question_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{open_memory, schema, users};

    fn fresh_two_users() -> (Connection, Identity, Identity) {
        let conn = open_memory().expect("open");
        schema::init_schema(&conn).expect("schema");
        users::register(&conn, "asker", "ask@x.com", "pw", None).expect("asker");
        users::register(&conn, "helper", "help@x.com", "pw", None).expect("helper");
        let asker = users::authenticate(&conn, "asker", "pw").expect("login asker");
        let helper = users::authenticate(&conn, "helper", "pw").expect("login helper");
        (conn, asker, helper)
    }

    #[test]
    fn accept_answer_sets_both_flags_for_the_owner() {
        let (mut conn, asker, helper) = fresh_two_users();
        let q = ask_question(&conn, &asker, "How?", "Details", "", false).expect("ask");
        let a = post_answer(&conn, &helper, q.id, "Like this").expect("answer");

        let question_id = accept_answer(&mut conn, &asker, a.id).expect("accept");
        assert_eq!(question_id, q.id);
        let (question, answers) = get_question(&conn, q.id).expect("detail");
        assert!(question.is_resolved);
        assert!(answers[0].is_accepted);
    }

    #[test]
    fn accept_answer_by_non_owner_changes_nothing() {
        let (mut conn, asker, helper) = fresh_two_users();
        let q = ask_question(&conn, &asker, "How?", "Details", "", false).expect("ask");
        let a = post_answer(&conn, &helper, q.id, "Like this").expect("answer");

        assert_eq!(
            accept_answer(&mut conn, &helper, a.id).unwrap_err(),
            DomainError::Forbidden
        );
        let (question, answers) = get_question(&conn, q.id).expect("detail");
        assert!(!question.is_resolved);
        assert!(!answers[0].is_accepted);
    }

    #[test]
    fn accept_answer_on_missing_answer_is_not_found() {
        let (mut conn, asker, _) = fresh_two_users();
        assert_eq!(
            accept_answer(&mut conn, &asker, 999).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn answering_a_missing_question_is_not_found() {
        let (conn, _, helper) = fresh_two_users();
        assert_eq!(
            post_answer(&conn, &helper, 42, "into the void").unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn question_defaults_category_and_lists_newest_first() {
        let (conn, asker, _) = fresh_two_users();
        let q1 = ask_question(&conn, &asker, "first", "x", " ", false).expect("q1");
        assert_eq!(q1.category, "general");
        ask_question(&conn, &asker, "second", "x", "events", true).expect("q2");
        let all = list_questions(&conn).expect("list");
        assert_eq!(all[0].title, "second");
        assert_eq!(all[1].title, "first");
    }
}
