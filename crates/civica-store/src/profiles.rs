// SPDX-License-Identifier: Apache-2.0

//! Member directory: lazily created profiles, owner-only edits, and
//! public search.

use crate::store_err;
use chrono::Utc;
use civica_model::{
    parse_title, DomainError, Identity, MemberProfile, ProfileFields, PROFILE_DEFAULT_PROFESSION,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<MemberProfile> {
    Ok(MemberProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        full_name: row.get(2)?,
        phone: row.get(3)?,
        location: row.get(4)?,
        profession: row.get(5)?,
        bio: row.get(6)?,
        is_public: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const COLUMNS: &str =
    "id, user_id, full_name, phone, location, profession, bio, is_public, created_at, updated_at";

/// `%` and `_` in user search input are literals, not wildcards.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '%' || c == '_' || c == '!' {
            out.push('!');
        }
        out.push(c);
    }
    out
}

/// Idempotent: returns the caller's existing profile or creates the
/// default one (public, profession "Member", full name from the account).
pub fn get_or_create_profile(
    conn: &Connection,
    identity: &Identity,
) -> Result<MemberProfile, DomainError> {
    let existing = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM member_profiles WHERE user_id = ?1"),
            params![identity.user_id],
            profile_from_row,
        )
        .optional()
        .map_err(store_err)?;
    if let Some(profile) = existing {
        return Ok(profile);
    }
    let now = Utc::now();
    conn.execute(
        "INSERT INTO member_profiles
           (user_id, full_name, profession, bio, is_public, created_at, updated_at)
         VALUES (?1, ?2, ?3, '', 1, ?4, ?4)",
        params![
            identity.user_id,
            identity.username,
            PROFILE_DEFAULT_PROFESSION,
            now
        ],
    )
    .map_err(store_err)?;
    Ok(MemberProfile {
        id: conn.last_insert_rowid(),
        user_id: identity.user_id,
        full_name: identity.username.clone(),
        phone: None,
        location: None,
        profession: PROFILE_DEFAULT_PROFESSION.to_string(),
        bio: String::new(),
        is_public: true,
        created_at: now,
        updated_at: now,
    })
}

/// The requester must own the addressed profile; a directly-addressed
/// profile id is always cross-checked against the session identity.
pub fn update_profile(
    conn: &Connection,
    identity: &Identity,
    profile_id: i64,
    fields: &ProfileFields,
) -> Result<MemberProfile, DomainError> {
    let full_name = parse_title("full name", &fields.full_name)?;
    let owner_id: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM member_profiles WHERE id = ?1",
            params![profile_id],
            |r| r.get(0),
        )
        .optional()
        .map_err(store_err)?;
    let Some(owner_id) = owner_id else {
        return Err(DomainError::NotFound);
    };
    if owner_id != identity.user_id {
        return Err(DomainError::Forbidden);
    }
    let updated_at = Utc::now();
    conn.execute(
        "UPDATE member_profiles
         SET full_name = ?1, phone = ?2, location = ?3, profession = ?4,
             bio = ?5, is_public = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            full_name,
            fields.phone,
            fields.location,
            fields.profession,
            fields.bio,
            fields.is_public,
            updated_at,
            profile_id
        ],
    )
    .map_err(store_err)?;
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM member_profiles WHERE id = ?1"),
        params![profile_id],
        profile_from_row,
    )
    .map_err(store_err)
}

pub fn list_public_profiles(conn: &Connection) -> Result<Vec<MemberProfile>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM member_profiles WHERE is_public = 1 ORDER BY full_name ASC, id ASC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], profile_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

/// Case-insensitive substring match over full name, profession, and
/// location, restricted to public profiles. A blank query returns every
/// public profile.
pub fn search_members(conn: &Connection, query: &str) -> Result<Vec<MemberProfile>, DomainError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return list_public_profiles(conn);
    }
    let needle = format!("%{}%", escape_like(&trimmed.to_lowercase()));
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM member_profiles
             WHERE is_public = 1
               AND (LOWER(full_name) LIKE ?1 ESCAPE '!'
                    OR LOWER(profession) LIKE ?1 ESCAPE '!'
                    OR LOWER(location) LIKE ?1 ESCAPE '!')
             ORDER BY full_name ASC, id ASC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![needle], profile_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

/// Directory detail page. Private profiles are `NotVisible` to everyone
/// but their owner through this path (the owner edits via their own page).
pub fn get_public_profile(
    conn: &Connection,
    member_id: i64,
) -> Result<MemberProfile, DomainError> {
    let profile = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM member_profiles WHERE id = ?1"),
            params![member_id],
            profile_from_row,
        )
        .optional()
        .map_err(store_err)?
        .ok_or(DomainError::NotFound)?;
    if !profile.is_public {
        return Err(DomainError::NotVisible);
    }
    Ok(profile)
}
