//! Subscription upsert semantics: one row per (buyer, plan), renewed in
//! place, end date overwritten rather than stacked.

#[path = "../common/mod.rs"]
mod common;

use common::*;

fn count_subscriptions(conn: &rusqlite::Connection, buyer_id: &str, plan_id: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM subscriptions WHERE buyer_id = ?1 AND plan_id = ?2",
        rusqlite::params![buyer_id, plan_id],
        |row| row.get(0),
    )
    .expect("count query failed")
}

#[test]
fn test_activate_creates_subscription() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let buyer = create_test_profile(&conn, "buyer", false);
    let plan = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);

    let until = queries::now() + 30 * 86400;
    let sub = queries::activate_subscription(&conn, &buyer.id, &plan.id, until)
        .expect("activate failed");

    assert!(sub.is_active);
    assert_eq!(sub.end_date, Some(until));
    assert_eq!(sub.buyer_id, buyer.id);
    assert_eq!(sub.plan_id, plan.id);
    assert_eq!(count_subscriptions(&conn, &buyer.id, &plan.id), 1);
}

#[test]
fn test_activate_twice_updates_same_row() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let buyer = create_test_profile(&conn, "buyer", false);
    let plan = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);

    let now = queries::now();
    let first = queries::activate_subscription(&conn, &buyer.id, &plan.id, now + 30 * 86400)
        .expect("activate failed");
    let second = queries::activate_subscription(&conn, &buyer.id, &plan.id, now + 60 * 86400)
        .expect("activate failed");

    assert_eq!(first.id, second.id, "renewal updates the same row");
    assert_eq!(second.end_date, Some(now + 60 * 86400), "end date overwritten");
    assert_eq!(
        second.start_date, first.start_date,
        "start date survives renewal"
    );
    assert_eq!(count_subscriptions(&conn, &buyer.id, &plan.id), 1);
}

#[test]
fn test_activate_is_idempotent() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let buyer = create_test_profile(&conn, "buyer", false);
    let plan = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);

    let until = queries::now() + 30 * 86400;
    let first = queries::activate_subscription(&conn, &buyer.id, &plan.id, until)
        .expect("activate failed");
    let second = queries::activate_subscription(&conn, &buyer.id, &plan.id, until)
        .expect("activate failed");

    assert_eq!(first.id, second.id);
    assert_eq!(first.end_date, second.end_date);
    assert!(second.is_active);
}

#[test]
fn test_activate_revives_cancelled_subscription() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let buyer = create_test_profile(&conn, "buyer", false);
    let plan = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);

    let now = queries::now();
    let sub = queries::activate_subscription(&conn, &buyer.id, &plan.id, now + 30 * 86400)
        .expect("activate failed");

    assert!(queries::deactivate_subscription(&conn, &sub.id).expect("deactivate failed"));
    let cancelled = queries::get_subscription_by_id(&conn, &sub.id)
        .expect("query failed")
        .expect("subscription should exist");
    assert!(!cancelled.is_active);

    // A new successful payment re-activates the existing row
    let revived = queries::activate_subscription(&conn, &buyer.id, &plan.id, now + 60 * 86400)
        .expect("activate failed");
    assert_eq!(revived.id, sub.id, "same row, not a duplicate");
    assert!(revived.is_active);
    assert_eq!(count_subscriptions(&conn, &buyer.id, &plan.id), 1);
}

#[test]
fn test_subscriptions_are_per_plan() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let buyer = create_test_profile(&conn, "buyer", false);
    let plan_a = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);
    let plan_b = create_test_plan(&conn, &creator.id, "Patron", PlanInterval::Yearly);

    let until = queries::now() + 30 * 86400;
    let sub_a = queries::activate_subscription(&conn, &buyer.id, &plan_a.id, until)
        .expect("activate failed");
    let sub_b = queries::activate_subscription(&conn, &buyer.id, &plan_b.id, until)
        .expect("activate failed");

    assert_ne!(sub_a.id, sub_b.id, "different plans get different rows");

    let subs = queries::list_subscriptions_for_buyer(&conn, &buyer.id).expect("query failed");
    assert_eq!(subs.len(), 2);
}

#[test]
fn test_is_current() {
    let now = queries::now();

    let active = Subscription {
        id: "s1".to_string(),
        buyer_id: "b".to_string(),
        plan_id: "p".to_string(),
        start_date: now - 86400,
        end_date: Some(now + 86400),
        is_active: true,
    };
    assert!(active.is_current(now));

    let expired = Subscription {
        end_date: Some(now - 1),
        ..active.clone()
    };
    assert!(!expired.is_current(now), "past end date is not current");

    let cancelled = Subscription {
        is_active: false,
        ..active.clone()
    };
    assert!(!cancelled.is_current(now));

    let open_ended = Subscription {
        end_date: None,
        ..active
    };
    assert!(open_ended.is_current(now), "no end date means no expiry");
}
