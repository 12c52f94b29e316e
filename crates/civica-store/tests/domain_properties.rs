// SPDX-License-Identifier: Apache-2.0

//! Cross-module behavior of the store as one contract: the full
//! register/login/apply scenario, and the search property.

use civica_store::volunteer::{ApplicationDraft, OpportunityDraft};
use civica_store::{open_memory, profiles, schema, users, volunteer};
use civica_model::{DomainError, ProfileFields};
use proptest::prelude::*;
use rusqlite::Connection;

fn fresh() -> Connection {
    let conn = open_memory().expect("open");
    schema::init_schema(&conn).expect("schema");
    conn
}

#[test]
fn register_login_post_apply_retire_scenario() {
    let mut conn = fresh();

    users::register(&conn, "alice", "a@x.com", "pw1", None).expect("register alice");
    users::authenticate(&conn, "alice", "pw1").expect("right password");
    assert_eq!(
        users::authenticate(&conn, "alice", "wrong").unwrap_err(),
        DomainError::InvalidCredentials
    );

    let identity = users::authenticate(&conn, "alice", "pw1").expect("login");
    let opportunity = volunteer::post_opportunity(
        &conn,
        &identity,
        &OpportunityDraft {
            title: "Library shift".to_string(),
            description: "Shelve returned books".to_string(),
            organization: "Civica".to_string(),
            ..OpportunityDraft::default()
        },
    )
    .expect("post opportunity");
    assert!(opportunity.is_active);

    let application = volunteer::apply_to_opportunity(
        &mut conn,
        opportunity.id,
        &ApplicationDraft {
            applicant_name: "Ben".to_string(),
            applicant_email: "b@x.com".to_string(),
            ..ApplicationDraft::default()
        },
    )
    .expect("first application");
    assert_eq!(application.status.as_str(), "pending");

    assert_eq!(
        volunteer::apply_to_opportunity(
            &mut conn,
            opportunity.id,
            &ApplicationDraft {
                applicant_name: "Ben again".to_string(),
                applicant_email: "b@x.com".to_string(),
                ..ApplicationDraft::default()
            },
        )
        .unwrap_err(),
        DomainError::DuplicateApplication
    );

    volunteer::set_opportunity_active(&conn, &identity, opportunity.id, false).expect("retire");
    assert_eq!(
        volunteer::apply_to_opportunity(
            &mut conn,
            opportunity.id,
            &ApplicationDraft {
                applicant_name: "Cara".to_string(),
                applicant_email: "c@x.com".to_string(),
                ..ApplicationDraft::default()
            },
        )
        .unwrap_err(),
        DomainError::OpportunityInactive
    );
}

#[derive(Debug, Clone)]
struct SeedProfile {
    username: String,
    full_name: String,
    profession: String,
    location: String,
    is_public: bool,
}

fn seed_profile_strategy() -> impl Strategy<Value = SeedProfile> {
    (
        "[a-z]{3,10}",
        "[A-Za-z][A-Za-z ]{0,19}",
        "[A-Za-z]{1,12}",
        any::<bool>(),
    )
        .prop_map(|(name, full_name, word, is_public)| SeedProfile {
            username: name,
            full_name,
            profession: word.clone(),
            location: word,
            is_public,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn search_hits_are_public_and_matching(
        seeds in prop::collection::vec(seed_profile_strategy(), 1..6),
        query in "[A-Za-z]{0,6}",
    ) {
        let conn = fresh();
        let mut public_count = 0usize;
        for (i, seed) in seeds.iter().enumerate() {
            let username = format!("{}{i}", seed.username);
            users::register(&conn, &username, &format!("{username}@x.com"), "pw", None)
                .expect("register");
            let identity = users::authenticate(&conn, &username, "pw").expect("login");
            let profile = profiles::get_or_create_profile(&conn, &identity).expect("profile");
            profiles::update_profile(
                &conn,
                &identity,
                profile.id,
                &ProfileFields {
                    full_name: seed.full_name.clone(),
                    phone: None,
                    location: Some(seed.location.clone()),
                    profession: seed.profession.clone(),
                    bio: String::new(),
                    is_public: seed.is_public,
                },
            )
            .expect("update");
            if seed.is_public {
                public_count += 1;
            }
        }

        let hits = profiles::search_members(&conn, &query).expect("search");
        let needle = query.trim().to_lowercase();
        for hit in &hits {
            prop_assert!(hit.is_public);
            if !needle.is_empty() {
                let matches = hit.full_name.to_lowercase().contains(&needle)
                    || hit.profession.to_lowercase().contains(&needle)
                    || hit
                        .location
                        .as_deref()
                        .is_some_and(|l| l.to_lowercase().contains(&needle));
                prop_assert!(matches, "hit {:?} does not match {needle:?}", hit.full_name);
            }
        }
        if needle.is_empty() {
            prop_assert_eq!(hits.len(), public_count);
        }
    }
}
