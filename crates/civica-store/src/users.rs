// SPDX-License-Identifier: Apache-2.0

//! Registration, authentication, and account lookups.

use crate::{password, store_err};
use chrono::Utc;
use civica_model::{
    DomainError, EmailAddr, Identity, Role, User, Username, ValidationError,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn role_from_raw(idx: usize, raw: &str) -> rusqlite::Result<Role> {
    Role::parse(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_raw: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: role_from_raw(3, &role_raw)?,
        is_admin: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "id, username, email, role, is_admin, created_at";

/// Create an account. Duplicate username and email are reported as
/// distinct failures, probed before the insert the way the original site
/// does; the UNIQUE constraints remain as the backstop for races.
pub fn register(
    conn: &Connection,
    username: &str,
    email: &str,
    plain_password: &str,
    role: Option<&str>,
) -> Result<User, DomainError> {
    let username = Username::parse(username)?;
    let email = EmailAddr::parse(email)?;
    if plain_password.is_empty() {
        return Err(ValidationError("password must not be empty".to_string()).into());
    }
    let role = role.map(Role::parse).transpose()?.unwrap_or_default();

    let username_taken: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            params![username.as_str()],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    if username_taken {
        return Err(DomainError::DuplicateUsername);
    }
    let email_taken: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![email.as_str()],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    if email_taken {
        return Err(DomainError::DuplicateEmail);
    }

    let hash = password::hash_password(plain_password)?;
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO users (username, email, password_hash, role, is_admin, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![
            username.as_str(),
            email.as_str(),
            hash,
            role.as_str(),
            created_at
        ],
    )
    .map_err(|e| {
        if let rusqlite::Error::SqliteFailure(f, Some(msg)) = &e {
            if f.code == rusqlite::ErrorCode::ConstraintViolation {
                if msg.contains("users.username") {
                    return DomainError::DuplicateUsername;
                }
                if msg.contains("users.email") {
                    return DomainError::DuplicateEmail;
                }
            }
        }
        store_err(e)
    })?;

    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.into_inner(),
        email: email.into_inner(),
        role,
        is_admin: false,
        created_at,
    })
}

/// Verify credentials and produce the request identity. Unknown usernames
/// and wrong passwords are indistinguishable to the caller.
pub fn authenticate(
    conn: &Connection,
    username: &str,
    plain_password: &str,
) -> Result<Identity, DomainError> {
    let row = conn
        .query_row(
            "SELECT id, username, email, role, is_admin, password_hash
             FROM users WHERE username = ?1",
            params![username.trim()],
            |row| {
                let role_raw: String = row.get(3)?;
                Ok((
                    Identity {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        role: role_from_raw(3, &role_raw)?,
                        is_admin: row.get(4)?,
                    },
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()
        .map_err(store_err)?;

    let Some((identity, stored_hash)) = row else {
        return Err(DomainError::InvalidCredentials);
    };
    if !password::verify_password(&stored_hash, plain_password)? {
        return Err(DomainError::InvalidCredentials);
    }
    Ok(identity)
}

/// All accounts, newest first. Admin surface only.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], user_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

pub fn count_users(conn: &Connection) -> Result<i64, DomainError> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .map_err(store_err)
}
