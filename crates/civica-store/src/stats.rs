//! Admin dashboard aggregates. Pure reads, no mutation.

use crate::{announcements, store_err, users};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use civica_model::DomainError;
use rusqlite::Connection;
use serde::Serialize;

pub const ACTIVITY_FEED_LEN: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub username: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub active_opportunities: i64,
    pub pending_applications: i64,
    pub announcements_this_month: i64,
    pub recent_activity: Vec<ActivityEntry>,
}

/// Midnight UTC on the first day of `now`'s month.
pub fn month_start(now: DateTime<Utc>) -> Result<DateTime<Utc>, DomainError> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .ok_or_else(|| DomainError::Store("month start out of range".to_string()))
}

pub fn dashboard_stats(conn: &Connection) -> Result<DashboardStats, DomainError> {
    let total_users = users::count_users(conn)?;
    let active_opportunities: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM volunteer_opportunities WHERE is_active = 1",
            [],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    let pending_applications: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM volunteer_applications WHERE status = 'pending'",
            [],
            |r| r.get(0),
        )
        .map_err(store_err)?;
    let announcements_this_month =
        announcements::count_announcements_since(conn, month_start(Utc::now())?)?;
    let recent_activity = announcements::recent_announcements(conn, ACTIVITY_FEED_LEN)?
        .into_iter()
        .map(|ann| ActivityEntry {
            username: ann.author,
            action: format!("Posted: {}", ann.title),
            timestamp: ann.created_at,
        })
        .collect();
    Ok(DashboardStats {
        total_users,
        active_opportunities,
        pending_applications,
        announcements_this_month,
        recent_activity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volunteer::{ApplicationDraft, OpportunityDraft};
    use crate::{announcements, open_memory, schema, users, volunteer};
    use chrono::TimeZone;

    #[test]
    fn month_start_is_midnight_on_the_first() {
        let now = Utc.with_ymd_and_hms(2024, 7, 19, 15, 30, 45).unwrap();
        let start = month_start(now).expect("month start");
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn dashboard_counts_active_pending_and_this_month() {
        let mut conn = open_memory().expect("open");
        schema::init_schema(&conn).expect("schema");
        users::register(&conn, "admin", "ad@x.com", "pw", None).expect("register");
        let identity = users::authenticate(&conn, "admin", "pw").expect("login");

        announcements::create_announcement(&conn, &identity, "fresh", "x", false)
            .expect("announcement");
        let opp = volunteer::post_opportunity(
            &conn,
            &identity,
            &OpportunityDraft {
                title: "open".to_string(),
                description: "d".to_string(),
                organization: "o".to_string(),
                ..OpportunityDraft::default()
            },
        )
        .expect("open opportunity");
        let retired = volunteer::post_opportunity(
            &conn,
            &identity,
            &OpportunityDraft {
                title: "retired".to_string(),
                description: "d".to_string(),
                organization: "o".to_string(),
                ..OpportunityDraft::default()
            },
        )
        .expect("retired opportunity");
        volunteer::set_opportunity_active(&conn, &identity, retired.id, false).expect("retire");
        volunteer::apply_to_opportunity(
            &mut conn,
            opp.id,
            &ApplicationDraft {
                applicant_name: "n".to_string(),
                applicant_email: "ap@x.com".to_string(),
                ..ApplicationDraft::default()
            },
        )
        .expect("apply");
        let approved = volunteer::apply_to_opportunity(
            &mut conn,
            opp.id,
            &ApplicationDraft {
                applicant_name: "m".to_string(),
                applicant_email: "done@x.com".to_string(),
                ..ApplicationDraft::default()
            },
        )
        .expect("second apply");
        conn.execute(
            "UPDATE volunteer_applications SET status = 'approved' WHERE id = ?1",
            rusqlite::params![approved.id],
        )
        .expect("approve");

        let stats = dashboard_stats(&conn).expect("stats");
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.active_opportunities, 1);
        assert_eq!(stats.pending_applications, 1);
        assert_eq!(stats.announcements_this_month, 1);
        assert_eq!(stats.recent_activity.len(), 1);
        assert_eq!(stats.recent_activity[0].action, "Posted: fresh");
    }
}
