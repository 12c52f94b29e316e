// SPDX-License-Identifier: Apache-2.0

//! Volunteer board: opportunities, soft retirement, and applications.

use crate::store_err;
use chrono::Utc;
use civica_model::{
    parse_body, parse_title, ApplicationStatus, DomainError, EmailAddr, Identity,
    VolunteerApplication, VolunteerOpportunity,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Submission form for a new opportunity. Optional fields stay optional
/// all the way into the row.
#[derive(Debug, Clone, Default)]
pub struct OpportunityDraft {
    pub title: String,
    pub description: String,
    pub organization: String,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub skills_needed: Option<String>,
    pub time_commitment: Option<String>,
    pub is_urgent: bool,
}

/// Submission form for an application. The applicant need not be a
/// registered user; the email is the dedup key per opportunity.
#[derive(Debug, Clone, Default)]
pub struct ApplicationDraft {
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: Option<String>,
    pub message: Option<String>,
    pub skills: Option<String>,
}

fn opportunity_from_row(row: &Row<'_>) -> rusqlite::Result<VolunteerOpportunity> {
    Ok(VolunteerOpportunity {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        organization: row.get(3)?,
        location: row.get(4)?,
        contact_email: row.get(5)?,
        contact_phone: row.get(6)?,
        skills_needed: row.get(7)?,
        time_commitment: row.get(8)?,
        is_urgent: row.get(9)?,
        is_active: row.get(10)?,
        created_by: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<VolunteerApplication> {
    let status_raw: String = row.get(7)?;
    let status = ApplicationStatus::parse(&status_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(VolunteerApplication {
        id: row.get(0)?,
        opportunity_id: row.get(1)?,
        applicant_name: row.get(2)?,
        applicant_email: row.get(3)?,
        applicant_phone: row.get(4)?,
        message: row.get(5)?,
        skills: row.get(6)?,
        status,
        applied_at: row.get(8)?,
    })
}

const OPPORTUNITY_COLUMNS: &str = "id, title, description, organization, location, contact_email, \
     contact_phone, skills_needed, time_commitment, is_urgent, is_active, created_by, \
     created_at, updated_at";
const APPLICATION_COLUMNS: &str = "id, opportunity_id, applicant_name, applicant_email, \
     applicant_phone, message, skills, status, applied_at";

pub fn post_opportunity(
    conn: &Connection,
    identity: &Identity,
    draft: &OpportunityDraft,
) -> Result<VolunteerOpportunity, DomainError> {
    let title = parse_title("title", &draft.title)?;
    let description = parse_body("description", &draft.description)?;
    let organization = parse_title("organization", &draft.organization)?;
    let contact_email = draft
        .contact_email
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(EmailAddr::parse)
        .transpose()?
        .map(EmailAddr::into_inner);
    let now = Utc::now();
    conn.execute(
        "INSERT INTO volunteer_opportunities
           (title, description, organization, location, contact_email, contact_phone,
            skills_needed, time_commitment, is_urgent, is_active, created_by,
            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?11, ?11)",
        params![
            title,
            description,
            organization,
            draft.location,
            contact_email,
            draft.contact_phone,
            draft.skills_needed,
            draft.time_commitment,
            draft.is_urgent,
            identity.username,
            now
        ],
    )
    .map_err(store_err)?;
    Ok(VolunteerOpportunity {
        id: conn.last_insert_rowid(),
        title,
        description,
        organization,
        location: draft.location.clone(),
        contact_email,
        contact_phone: draft.contact_phone.clone(),
        skills_needed: draft.skills_needed.clone(),
        time_commitment: draft.time_commitment.clone(),
        is_urgent: draft.is_urgent,
        is_active: true,
        created_by: identity.username.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Active opportunities, urgent first, then newest.
pub fn list_opportunities(conn: &Connection) -> Result<Vec<VolunteerOpportunity>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM volunteer_opportunities
             WHERE is_active = 1
             ORDER BY is_urgent DESC, created_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], opportunity_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

/// Every opportunity including retired ones, newest first. Admin surface.
pub fn list_all_opportunities(
    conn: &Connection,
) -> Result<Vec<VolunteerOpportunity>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM volunteer_opportunities
             ORDER BY created_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], opportunity_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

pub fn get_opportunity(
    conn: &Connection,
    opportunity_id: i64,
) -> Result<VolunteerOpportunity, DomainError> {
    conn.query_row(
        &format!("SELECT {OPPORTUNITY_COLUMNS} FROM volunteer_opportunities WHERE id = ?1"),
        params![opportunity_id],
        opportunity_from_row,
    )
    .optional()
    .map_err(store_err)?
    .ok_or(DomainError::NotFound)
}

/// Soft retirement: opportunities are never hard-deleted, they stop
/// accepting applications. Creator or admin only.
pub fn set_opportunity_active(
    conn: &Connection,
    identity: &Identity,
    opportunity_id: i64,
    active: bool,
) -> Result<(), DomainError> {
    let created_by: Option<String> = conn
        .query_row(
            "SELECT created_by FROM volunteer_opportunities WHERE id = ?1",
            params![opportunity_id],
            |r| r.get(0),
        )
        .optional()
        .map_err(store_err)?;
    let Some(created_by) = created_by else {
        return Err(DomainError::NotFound);
    };
    if created_by != identity.username && !identity.is_admin {
        return Err(DomainError::Forbidden);
    }
    conn.execute(
        "UPDATE volunteer_opportunities SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![active, Utc::now(), opportunity_id],
    )
    .map_err(store_err)?;
    Ok(())
}

/// Apply to an opportunity. The inactive check, the duplicate probe, and
/// the insert run in one transaction; a concurrent duplicate that slips
/// past the probe is caught by the UNIQUE constraint and reported the
/// same way.
pub fn apply_to_opportunity(
    conn: &mut Connection,
    opportunity_id: i64,
    draft: &ApplicationDraft,
) -> Result<VolunteerApplication, DomainError> {
    let applicant_name = parse_title("name", &draft.applicant_name)?;
    let applicant_email = EmailAddr::parse(&draft.applicant_email)?;

    let tx = conn.transaction().map_err(store_err)?;
    let is_active: Option<bool> = tx
        .query_row(
            "SELECT is_active FROM volunteer_opportunities WHERE id = ?1",
            params![opportunity_id],
            |r| r.get(0),
        )
        .optional()
        .map_err(store_err)?;
    match is_active {
        None => return Err(DomainError::NotFound),
        Some(false) => return Err(DomainError::OpportunityInactive),
        Some(true) => {}
    }
    let duplicate: bool = tx
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM volunteer_applications
              WHERE opportunity_id = ?1 AND applicant_email = ?2)",
            params![opportunity_id, applicant_email.as_str()],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    if duplicate {
        return Err(DomainError::DuplicateApplication);
    }
    let applied_at = Utc::now();
    tx.execute(
        "INSERT INTO volunteer_applications
           (opportunity_id, applicant_name, applicant_email, applicant_phone,
            message, skills, status, applied_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7)",
        params![
            opportunity_id,
            applicant_name,
            applicant_email.as_str(),
            draft.applicant_phone,
            draft.message,
            draft.skills,
            applied_at
        ],
    )
    .map_err(|e| {
        if let rusqlite::Error::SqliteFailure(f, _) = &e {
            if f.code == rusqlite::ErrorCode::ConstraintViolation {
                return DomainError::DuplicateApplication;
            }
        }
        store_err(e)
    })?;
    let id = tx.last_insert_rowid();
    tx.commit().map_err(store_err)?;
    Ok(VolunteerApplication {
        id,
        opportunity_id,
        applicant_name,
        applicant_email: applicant_email.into_inner(),
        applicant_phone: draft.applicant_phone.clone(),
        message: draft.message.clone(),
        skills: draft.skills.clone(),
        status: ApplicationStatus::Pending,
        applied_at,
    })
}

/// Applications whose email matches the session identity, newest first.
pub fn list_my_applications(
    conn: &Connection,
    identity: &Identity,
) -> Result<Vec<VolunteerApplication>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM volunteer_applications
             WHERE applicant_email = ?1 ORDER BY applied_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![identity.email], application_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

/// Every application, newest first. Admin surface.
pub fn list_all_applications(
    conn: &Connection,
) -> Result<Vec<VolunteerApplication>, DomainError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM volunteer_applications
             ORDER BY applied_at DESC, id DESC"
        ))
        .map_err(store_err)?;
    let rows = stmt
        .query_map([], application_from_row)
        .map_err(store_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(store_err)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{open_memory, schema, users};

    fn fresh() -> (Connection, Identity) {
        let conn = open_memory().expect("open");
        schema::init_schema(&conn).expect("schema");
        users::register(&conn, "organizer", "org@x.com", "pw", None).expect("register");
        let identity = users::authenticate(&conn, "organizer", "pw").expect("login");
        (conn, identity)
    }

    fn draft() -> OpportunityDraft {
        OpportunityDraft {
            title: "Food drive".to_string(),
            description: "Sort donations at the hall".to_string(),
            organization: "Civica".to_string(),
            ..OpportunityDraft::default()
        }
    }

    fn applicant(email: &str) -> ApplicationDraft {
        ApplicationDraft {
            applicant_name: "Ben Okafor".to_string(),
            applicant_email: email.to_string(),
            ..ApplicationDraft::default()
        }
    }

    #[test]
    fn apply_twice_with_same_email_is_rejected_once() {
        let (mut conn, identity) = fresh();
        let opp = post_opportunity(&conn, &identity, &draft()).expect("post");

        let app = apply_to_opportunity(&mut conn, opp.id, &applicant("b@x.com")).expect("apply");
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(
            apply_to_opportunity(&mut conn, opp.id, &applicant("b@x.com")).unwrap_err(),
            DomainError::DuplicateApplication
        );
        // Same address, different case: still a duplicate.
        assert_eq!(
            apply_to_opportunity(&mut conn, opp.id, &applicant("B@X.COM")).unwrap_err(),
            DomainError::DuplicateApplication
        );
    }

    #[test]
    fn inactive_opportunities_reject_every_application() {
        let (mut conn, identity) = fresh();
        let opp = post_opportunity(&conn, &identity, &draft()).expect("post");
        set_opportunity_active(&conn, &identity, opp.id, false).expect("retire");

        assert_eq!(
            apply_to_opportunity(&mut conn, opp.id, &applicant("new@x.com")).unwrap_err(),
            DomainError::OpportunityInactive
        );
        assert!(list_opportunities(&conn).expect("active list").is_empty());
        assert_eq!(list_all_opportunities(&conn).expect("all").len(), 1);
    }

    #[test]
    fn applying_to_a_missing_opportunity_is_not_found() {
        let (mut conn, _) = fresh();
        assert_eq!(
            apply_to_opportunity(&mut conn, 41, &applicant("a@x.com")).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn urgent_opportunities_list_before_newer_ones() {
        let (conn, identity) = fresh();
        let mut urgent = draft();
        urgent.title = "Urgent roof repair".to_string();
        urgent.is_urgent = true;
        post_opportunity(&conn, &identity, &urgent).expect("urgent");
        post_opportunity(&conn, &identity, &draft()).expect("calm");
        let listed = list_opportunities(&conn).expect("list");
        assert_eq!(listed[0].title, "Urgent roof repair");
    }

    #[test]
    fn retirement_requires_creator_or_admin() {
        let (conn, creator) = fresh();
        users::register(&conn, "bystander", "by@x.com", "pw", None).expect("bystander");
        let bystander = users::authenticate(&conn, "bystander", "pw").expect("login");
        let opp = post_opportunity(&conn, &creator, &draft()).expect("post");

        assert_eq!(
            set_opportunity_active(&conn, &bystander, opp.id, false).unwrap_err(),
            DomainError::Forbidden
        );
        let mut admin = bystander;
        admin.is_admin = true;
        set_opportunity_active(&conn, &admin, opp.id, false).expect("admin retire");
        assert!(!get_opportunity(&conn, opp.id).expect("fetch").is_active);
    }

    #[test]
    fn my_applications_match_on_the_session_email() {
        let (mut conn, identity) = fresh();
        let opp = post_opportunity(&conn, &identity, &draft()).expect("post");
        apply_to_opportunity(&mut conn, opp.id, &applicant("org@x.com")).expect("mine");
        apply_to_opportunity(&mut conn, opp.id, &applicant("other@x.com")).expect("theirs");

        let mine = list_my_applications(&conn, &identity).expect("mine list");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].applicant_email, "org@x.com");
        assert_eq!(list_all_applications(&conn).expect("all").len(), 2);
    }
}
