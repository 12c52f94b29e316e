#![forbid(unsafe_code)]
//! SQLite persistence for Civica.
//!
//! Every domain operation is a free function over a [`rusqlite::Connection`]
//! (or `&mut Connection` where a multi-step mutation needs a transaction).
//! Operations return [`civica_model::DomainError`]; unexpected SQLite
//! failures are wrapped in `DomainError::Store` after the enclosing
//! transaction has rolled back.

use civica_model::DomainError;
use rusqlite::Connection;
use std::path::Path;

pub mod announcements;
pub mod community;
pub mod discussions;
pub mod forum;
pub mod password;
pub mod profiles;
pub mod schema;
pub mod stats;
pub mod users;
pub mod volunteer;

pub const CRATE_NAME: &str = "civica-store";

pub(crate) fn store_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Store(e.to_string())
}

fn apply_pragmas(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA foreign_keys=ON;
        PRAGMA temp_store=MEMORY;
        ",
    )
    .map_err(store_err)
}

/// Open (or create) the database file and apply connection pragmas.
/// Foreign keys are enforced on every connection; the declared cascades
/// back up the explicit parent-then-children deletes in the operations.
pub fn open_file(path: &Path) -> Result<Connection, DomainError> {
    let conn = Connection::open(path).map_err(store_err)?;
    apply_pragmas(&conn)?;
    Ok(conn)
}

/// In-memory database for tests and ephemeral runs.
pub fn open_memory() -> Result<Connection, DomainError> {
    let conn = Connection::open_in_memory().map_err(store_err)?;
    apply_pragmas(&conn)?;
    Ok(conn)
}
