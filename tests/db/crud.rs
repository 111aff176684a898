//! Profile, plan, and integration CRUD tests

#[path = "../common/mod.rs"]
mod common;

use common::*;

// ============ Profiles ============

#[test]
fn test_create_and_get_profile() {
    let conn = setup_test_db();

    let profile = create_test_profile(&conn, "Alice", true);
    assert_eq!(profile.username, "alice", "usernames are lowercased");
    assert!(profile.is_creator);
    assert!(profile.api_key.starts_with("cp_"));

    let retrieved = queries::get_profile_by_id(&conn, &profile.id)
        .expect("query failed")
        .expect("profile should exist");
    assert_eq!(retrieved.id, profile.id);
    assert_eq!(retrieved.username, "alice");

    let by_username = queries::get_profile_by_username(&conn, "ALICE")
        .expect("query failed")
        .expect("lookup should be case-insensitive");
    assert_eq!(by_username.id, profile.id);
}

#[test]
fn test_duplicate_username_conflicts() {
    let conn = setup_test_db();
    create_test_profile(&conn, "alice", false);

    let input = CreateProfile {
        username: "alice".to_string(),
        phone_number: "9811111111".to_string(),
        discord_id: None,
        is_creator: false,
    };
    let result = queries::create_profile(&conn, &input);
    assert!(
        matches!(result, Err(creatorpay::error::AppError::Conflict(_))),
        "duplicate username should be a Conflict"
    );
}

#[test]
fn test_get_profile_by_api_key() {
    let conn = setup_test_db();
    let profile = create_test_profile(&conn, "bob", false);

    let found = queries::get_profile_by_api_key(&conn, &profile.api_key)
        .expect("query failed")
        .expect("profile should be found by its key");
    assert_eq!(found.id, profile.id);

    let missing = queries::get_profile_by_api_key(&conn, "cp_nonexistent")
        .expect("query failed");
    assert!(missing.is_none());
}

// ============ Plans ============

#[test]
fn test_create_and_list_plans() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);

    let monthly = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);
    let yearly = create_test_plan(&conn, &creator.id, "Patron", PlanInterval::Yearly);

    assert_eq!(monthly.interval, PlanInterval::Monthly);
    assert_eq!(monthly.price, "100".parse().unwrap());

    let plans = queries::list_plans_by_creator(&conn, &creator.id).expect("query failed");
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].id, monthly.id);
    assert_eq!(plans[1].id, yearly.id);

    let retrieved = queries::get_plan_by_id(&conn, &yearly.id)
        .expect("query failed")
        .expect("plan should exist");
    assert_eq!(retrieved.name, "Patron");
    assert_eq!(retrieved.interval, PlanInterval::Yearly);
}

#[test]
fn test_plan_price_roundtrips_decimal() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);

    let input = CreatePlan {
        name: "Precise".to_string(),
        bio: "test".to_string(),
        price: "499.99".parse().unwrap(),
        interval: PlanInterval::Monthly,
    };
    let plan = queries::create_plan(&conn, &creator.id, &input).expect("create failed");

    let retrieved = queries::get_plan_by_id(&conn, &plan.id)
        .expect("query failed")
        .expect("plan should exist");
    assert_eq!(retrieved.price, "499.99".parse().unwrap());
}

#[test]
fn test_plan_requires_existing_creator() {
    let conn = setup_test_db();

    let input = CreatePlan {
        name: "Orphan".to_string(),
        bio: "test".to_string(),
        price: "100".parse().unwrap(),
        interval: PlanInterval::Monthly,
    };
    assert!(
        queries::create_plan(&conn, "no-such-profile", &input).is_err(),
        "foreign keys must be enforced"
    );
}

#[test]
fn test_deleting_profile_cascades_to_plans() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let plan = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);

    conn.execute(
        "DELETE FROM profiles WHERE id = ?1",
        rusqlite::params![creator.id],
    )
    .expect("delete failed");

    assert!(
        queries::get_plan_by_id(&conn, &plan.id)
            .expect("query failed")
            .is_none(),
        "plans are removed with their creator"
    );
}

// ============ Integrations ============

#[test]
fn test_link_and_unlink_discord() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let plan = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);

    let input = LinkDiscord {
        plan_id: plan.id.clone(),
        guild_id: "123456789".to_string(),
        role_id: "987654321".to_string(),
    };
    queries::link_discord(&conn, &input).expect("link failed");

    let integration = queries::get_discord_integration(&conn, &plan.id)
        .expect("query failed")
        .expect("integration should exist");
    assert_eq!(integration.guild_id, "123456789");

    // Re-linking overwrites rather than duplicating
    let relink = LinkDiscord {
        plan_id: plan.id.clone(),
        guild_id: "123456789".to_string(),
        role_id: "111111111".to_string(),
    };
    queries::link_discord(&conn, &relink).expect("relink failed");

    let updated = queries::get_discord_integration(&conn, &plan.id)
        .expect("query failed")
        .expect("integration should exist");
    assert_eq!(updated.role_id, "111111111");

    assert!(queries::unlink_discord(&conn, &plan.id).expect("unlink failed"));
    assert!(queries::get_discord_integration(&conn, &plan.id)
        .expect("query failed")
        .is_none());
    assert!(
        !queries::unlink_discord(&conn, &plan.id).expect("unlink failed"),
        "second unlink is a no-op"
    );
}

#[test]
fn test_link_whatsapp() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let plan = create_test_plan(&conn, &creator.id, "Supporter", PlanInterval::Monthly);

    let input = LinkWhatsApp {
        plan_id: plan.id.clone(),
        group_link: "https://chat.whatsapp.com/abc123".to_string(),
    };
    queries::link_whatsapp(&conn, &input).expect("link failed");

    let integration = queries::get_whatsapp_integration(&conn, &plan.id)
        .expect("query failed")
        .expect("integration should exist");
    assert_eq!(integration.group_link, "https://chat.whatsapp.com/abc123");
}

#[test]
fn test_discord_grants_only_cover_current_subscriptions() {
    let conn = setup_test_db();
    let creator = create_test_profile(&conn, "creator", true);
    let buyer = create_test_profile(&conn, "buyer", false);
    let active_plan = create_test_plan(&conn, &creator.id, "Active", PlanInterval::Monthly);
    let expired_plan = create_test_plan(&conn, &creator.id, "Expired", PlanInterval::Monthly);

    for plan in [&active_plan, &expired_plan] {
        queries::link_discord(
            &conn,
            &LinkDiscord {
                plan_id: plan.id.clone(),
                guild_id: "guild".to_string(),
                role_id: format!("role-{}", plan.name),
            },
        )
        .expect("link failed");
    }

    let now = queries::now();
    queries::activate_subscription(&conn, &buyer.id, &active_plan.id, now + 86400)
        .expect("activate failed");
    queries::activate_subscription(&conn, &buyer.id, &expired_plan.id, now - 86400)
        .expect("activate failed");

    let grants = queries::list_discord_grants(&conn, &buyer.id, now).expect("query failed");
    assert_eq!(grants.len(), 1, "expired subscription grants nothing");
    assert_eq!(grants[0].role_id, "role-Active");
    assert_eq!(grants[0].plan_id, active_plan.id);
}
