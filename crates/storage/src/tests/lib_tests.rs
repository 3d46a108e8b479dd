use super::*;
use chrono::TimeZone;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid time")
}

async fn seed_bill(storage: &Storage, slug: &str, last_action: Option<NaiveDate>) -> BillId {
    storage
        .upsert_bill(BillRecord {
            ocd_id: &format!("ocd-bill/{slug}"),
            identifier: &slug.to_uppercase(),
            description: &format!("A local law about {slug}"),
            bill_type: "Introduction",
            slug,
            last_action_date: last_action,
            inferred_status: Some(InferredStatus::Active),
        })
        .await
        .expect("bill")
}

async fn seed_event(storage: &Storage, slug: &str, start: DateTime<Utc>) -> EventId {
    storage
        .upsert_event(EventRecord {
            ocd_id: &format!("ocd-event/{slug}"),
            name: &format!("Meeting {slug}"),
            description: "",
            start_time: start,
            location: Some("Council Chambers"),
            status: EventStatus::Confirmed,
            slug,
        })
        .await
        .expect("event")
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("civic_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("site.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn upserting_a_bill_twice_keeps_one_row() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = seed_bill(&storage, "intro-1", Some(date(2026, 1, 5))).await;
    let second = storage
        .upsert_bill(BillRecord {
            ocd_id: "ocd-bill/intro-1",
            identifier: "INTRO-1",
            description: "Amended description",
            bill_type: "Introduction",
            slug: "intro-1",
            last_action_date: Some(date(2026, 2, 1)),
            inferred_status: Some(InferredStatus::Passed),
        })
        .await
        .expect("bill");
    assert_eq!(first, second);

    let bill = storage
        .bill_by_slug("intro-1")
        .await
        .expect("lookup")
        .expect("bill exists");
    assert_eq!(bill.description, "Amended description");
    assert_eq!(bill.inferred_status, Some(InferredStatus::Passed));
    assert_eq!(bill.last_action_date, Some(date(2026, 2, 1)));
}

#[tokio::test]
async fn bills_active_since_excludes_stale_and_actionless_bills() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    seed_bill(&storage, "fresh", Some(date(2026, 3, 20))).await;
    seed_bill(&storage, "fresher", Some(date(2026, 3, 25))).await;
    seed_bill(&storage, "stale", Some(date(2025, 1, 1))).await;
    seed_bill(&storage, "no-action", None).await;

    let bills = storage
        .bills_active_since(date(2026, 1, 1))
        .await
        .expect("bills");
    let slugs: Vec<&str> = bills.iter().map(|b| b.slug.as_str()).collect();
    assert_eq!(slugs, vec!["fresher", "fresh"]);
}

#[tokio::test]
async fn lists_bill_actions_latest_step_first() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let bill = seed_bill(&storage, "intro-2", Some(date(2026, 2, 10))).await;
    storage
        .add_action(bill, "Introduced", Some("introduction"), date(2026, 1, 5), 1)
        .await
        .expect("action");
    storage
        .add_action(bill, "Referred to committee", None, date(2026, 1, 12), 2)
        .await
        .expect("action");
    storage
        .add_action(bill, "Approved", Some("passage"), date(2026, 2, 10), 3)
        .await
        .expect("action");

    let actions = storage.actions_for_bill(bill).await.expect("actions");
    let sequences: Vec<i64> = actions.iter().map(|a| a.sequence).collect();
    assert_eq!(sequences, vec![3, 2, 1]);
    assert_eq!(actions[0].description, "Approved");
}

#[tokio::test]
async fn committees_require_classification_and_name_prefix() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .upsert_organization("ocd-org/council", "City Council", Some("legislature"), "city-council")
        .await
        .expect("org");
    storage
        .upsert_organization(
            "ocd-org/finance",
            "Committee on Finance",
            Some("committee"),
            "committee-on-finance",
        )
        .await
        .expect("org");
    storage
        .upsert_organization(
            "ocd-org/subcommittee",
            "Subcommittee on Parks",
            Some("committee"),
            "subcommittee-on-parks",
        )
        .await
        .expect("org");

    let committees = storage.committees().await.expect("committees");
    assert_eq!(committees.len(), 1);
    assert_eq!(committees[0].name, "Committee on Finance");
}

#[tokio::test]
async fn seats_resolve_current_holder_and_leave_lapsed_seats_vacant() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let council = storage
        .upsert_organization("ocd-org/council", "City Council", Some("legislature"), "city-council")
        .await
        .expect("org");
    let ward_1 = storage.create_post(council, "Ward 1").await.expect("post");
    let ward_2 = storage.create_post(council, "Ward 2").await.expect("post");

    let alice = storage
        .upsert_person("Alice Alder", "alice-alder", None, None)
        .await
        .expect("person");
    let bob = storage
        .upsert_person("Bob Burgher", "bob-burgher", None, None)
        .await
        .expect("person");

    storage
        .add_membership(council, alice, Some(ward_1), &MembershipRole::Other("Council Member".into()), None)
        .await
        .expect("membership");
    storage
        .add_membership(
            council,
            bob,
            Some(ward_2),
            &MembershipRole::Other("Council Member".into()),
            Some(date(2024, 12, 31)),
        )
        .await
        .expect("membership");

    let seats = storage.seats_for_organization(council).await.expect("seats");
    assert_eq!(seats.len(), 2);
    assert_eq!(
        seats[0].holder.as_ref().map(|h| h.name.as_str()),
        Some("Alice Alder")
    );
    assert!(seats[1].holder.is_none(), "lapsed seat should be vacant");
}

#[tokio::test]
async fn memberships_filter_by_role_and_currency() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let finance = storage
        .upsert_organization(
            "ocd-org/finance",
            "Committee on Finance",
            Some("committee"),
            "committee-on-finance",
        )
        .await
        .expect("org");
    let chair = storage
        .upsert_person("Carol Chair", "carol-chair", None, None)
        .await
        .expect("person");
    let member = storage
        .upsert_person("Dan Member", "dan-member", None, None)
        .await
        .expect("person");
    let former = storage
        .upsert_person("Eve Former", "eve-former", None, None)
        .await
        .expect("person");

    storage
        .add_membership(finance, chair, None, &MembershipRole::Chairperson, None)
        .await
        .expect("membership");
    storage
        .add_membership(finance, member, None, &MembershipRole::CommitteeMember, None)
        .await
        .expect("membership");
    storage
        .add_membership(
            finance,
            former,
            None,
            &MembershipRole::CommitteeMember,
            Some(date(2023, 6, 30)),
        )
        .await
        .expect("membership");

    let chairs = storage
        .memberships_for_organization(finance, &MembershipRole::Chairperson)
        .await
        .expect("chairs");
    assert_eq!(chairs.len(), 1);
    assert_eq!(chairs[0].person_name, "Carol Chair");

    let members = storage
        .memberships_for_organization(finance, &MembershipRole::CommitteeMember)
        .await
        .expect("members");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].person_name, "Dan Member");
}

#[tokio::test]
async fn sponsored_bills_are_primary_only_and_newest_first() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let alice = storage
        .upsert_person("Alice Alder", "alice-alder", None, None)
        .await
        .expect("person");
    let older = seed_bill(&storage, "older", Some(date(2026, 1, 2))).await;
    let newer = seed_bill(&storage, "newer", Some(date(2026, 3, 2))).await;
    let cosponsored = seed_bill(&storage, "cosponsored", Some(date(2026, 4, 2))).await;

    storage.add_sponsorship(older, alice, true).await.expect("sponsorship");
    storage.add_sponsorship(newer, alice, true).await.expect("sponsorship");
    storage
        .add_sponsorship(cosponsored, alice, false)
        .await
        .expect("sponsorship");

    let bills = storage
        .sponsored_bills_for_person(alice)
        .await
        .expect("bills");
    let slugs: Vec<&str> = bills.iter().map(|b| b.slug.as_str()).collect();
    assert_eq!(slugs, vec!["newer", "older"]);
}

#[tokio::test]
async fn events_in_range_honors_half_open_bounds() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    seed_event(&storage, "before", at(2026, 4, 30, 18)).await;
    seed_event(&storage, "first-of-month", at(2026, 5, 1, 0)).await;
    seed_event(&storage, "mid-month", at(2026, 5, 15, 10)).await;
    seed_event(&storage, "next-month", at(2026, 6, 1, 0)).await;

    let events = storage
        .events_in_range(at(2026, 5, 1, 0), at(2026, 6, 1, 0))
        .await
        .expect("events");
    let slugs: Vec<&str> = events.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["first-of-month", "mid-month"]);
}

#[tokio::test]
async fn upcoming_events_skip_cancelled_meetings() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    seed_event(&storage, "kept", at(2026, 7, 1, 18)).await;
    storage
        .upsert_event(EventRecord {
            ocd_id: "ocd-event/cancelled",
            name: "Meeting cancelled",
            description: "",
            start_time: at(2026, 7, 2, 18),
            location: None,
            status: EventStatus::Cancelled,
            slug: "cancelled",
        })
        .await
        .expect("event");

    let events = storage.events_after(at(2026, 6, 1, 0)).await.expect("events");
    let slugs: Vec<&str> = events.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["kept"]);
}

#[tokio::test]
async fn next_event_named_picks_earliest_future_match() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    for (slug, start) in [
        ("past", at(2026, 1, 10, 18)),
        ("soonest", at(2026, 7, 10, 18)),
        ("later", at(2026, 8, 10, 18)),
    ] {
        storage
            .upsert_event(EventRecord {
                ocd_id: &format!("ocd-event/{slug}"),
                name: "City Council Stated Meeting",
                description: "",
                start_time: start,
                location: None,
                status: EventStatus::Confirmed,
                slug,
            })
            .await
            .expect("event");
    }

    let next = storage
        .next_event_named("City Council Stated Meeting", at(2026, 6, 1, 0))
        .await
        .expect("query")
        .expect("future meeting exists");
    assert_eq!(next.slug, "soonest");
}

#[tokio::test]
async fn upcoming_events_excluding_name_caps_the_list() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .upsert_event(EventRecord {
            ocd_id: "ocd-event/council",
            name: "City Council Stated Meeting",
            description: "",
            start_time: at(2026, 7, 1, 18),
            location: None,
            status: EventStatus::Confirmed,
            slug: "council",
        })
        .await
        .expect("event");
    for i in 1..=4u32 {
        seed_event(&storage, &format!("committee-{i}"), at(2026, 7, 1 + i, 10)).await;
    }

    let events = storage
        .upcoming_events_excluding("City Council Stated Meeting", at(2026, 6, 1, 0), 3)
        .await
        .expect("events");
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.name != "City Council Stated Meeting"));
    assert_eq!(events[0].slug, "committee-1");
}

#[tokio::test]
async fn event_time_bounds_span_the_calendar() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.event_time_bounds().await.expect("bounds").is_none());

    seed_event(&storage, "early", at(2024, 2, 1, 10)).await;
    seed_event(&storage, "late", at(2026, 11, 1, 10)).await;

    let (min, max) = storage
        .event_time_bounds()
        .await
        .expect("bounds")
        .expect("events exist");
    assert_eq!(min, at(2024, 2, 1, 10));
    assert_eq!(max, at(2026, 11, 1, 10));
}

#[tokio::test]
async fn resolves_participants_to_organizations_by_name() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .upsert_organization(
            "ocd-org/finance",
            "Committee on Finance",
            Some("committee"),
            "committee-on-finance",
        )
        .await
        .expect("org");
    let event = seed_event(&storage, "budget-hearing", at(2026, 5, 4, 10)).await;
    storage
        .add_event_participant(event, "Committee on Finance", "organization")
        .await
        .expect("participant");
    storage
        .add_event_participant(event, "Mayor's Office", "organization")
        .await
        .expect("participant");

    let participants = storage
        .participants_for_event(event)
        .await
        .expect("participants");
    let names: Vec<String> = participants.into_iter().map(|p| p.entity_name).collect();
    let resolved = storage
        .organizations_by_names(&names)
        .await
        .expect("organizations");
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].slug, "committee-on-finance");
}

#[tokio::test]
async fn blank_search_returns_every_bill() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    seed_bill(&storage, "zoning-change", Some(date(2026, 3, 1))).await;
    seed_bill(&storage, "budget-resolution", Some(date(2026, 2, 1))).await;

    let all = storage
        .search_bills(&SearchQuery::from_form_input(None))
        .await
        .expect("search");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].slug, "zoning-change");

    let hits = storage
        .search_bills(&SearchQuery::from_form_input(Some("budget")))
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].slug, "budget-resolution");
}
