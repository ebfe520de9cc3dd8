// Integration tests for Convivio Match
//
// The Supabase backend is stood in for by mockito: the client talks real
// HTTP to a local mock server, so these tests exercise the full run
// pipeline including PostgREST request shapes and failure isolation.

use convivio_match::core::GroupBuilder;
use convivio_match::models::{MaterializeStage, RunOutcome};
use convivio_match::services::{EventMaterializer, MatchmakingRun, RunError, SupabaseClient, SupabaseTables};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::sync::Arc;

fn tables() -> SupabaseTables {
    SupabaseTables {
        profiles: "profiles".to_string(),
        events: "events".to_string(),
        rsvps: "event_rsvps".to_string(),
        notifications: "notifications".to_string(),
        crossed_paths: "crossed_paths".to_string(),
    }
}

fn client_for(server: &ServerGuard) -> Arc<SupabaseClient> {
    Arc::new(SupabaseClient::new(
        server.url(),
        "test-service-role-key".to_string(),
        tables(),
    ))
}

fn matchmaking_run(store: Arc<SupabaseClient>) -> MatchmakingRun {
    let materializer = EventMaterializer::new(store.clone(), 7);
    MatchmakingRun::new(store, GroupBuilder::with_defaults(), materializer)
}

fn user_json(id: &str, lat: f64, lon: f64, city: &str, style: &str, diet: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "latitude": lat,
        "longitude": lon,
        "home_city": city,
        "dining_style": style,
        "dietary_preferences": diet,
        "onboarding_completed": true,
    })
}

async fn mock_pool(server: &mut ServerGuard, body: serde_json::Value) -> Mock {
    server
        .mock("GET", "/rest/v1/profiles")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

async fn mock_insert(server: &mut ServerGuard, path: &str, status: usize, hits: usize) -> Mock {
    server
        .mock("POST", path)
        .with_status(status)
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_run_skips_insufficient_pool() {
    let mut server = mockito::Server::new_async().await;

    let pool = mock_pool(
        &mut server,
        json!([user_json("U1", 40.0, -73.0, "New York", "adventurous", &["vegan"])]),
    )
    .await;
    let events = mock_insert(&mut server, "/rest/v1/events", 201, 0).await;

    let store = client_for(&server);
    let outcome = matchmaking_run(store).execute().await.unwrap();

    match outcome {
        RunOutcome::Skipped { eligible } => assert_eq!(eligible, 1),
        other => panic!("expected a skipped run, got {:?}", other),
    }

    pool.assert_async().await;
    // Nothing was written
    events.assert_async().await;
}

#[tokio::test]
async fn test_run_materializes_compatible_pair_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    // U1 and U2 are ~1.3 km apart with identical preferences; U3 is on
    // another continent and stays unplaced
    let pool = mock_pool(
        &mut server,
        json!([
            user_json("U1", 40.0, -73.0, "New York", "adventurous", &["vegan"]),
            user_json("U2", 40.01, -73.01, "New York", "adventurous", &["vegan"]),
            user_json("U3", 10.0, 10.0, "Lagos", "comfort_food", &[]),
        ]),
    )
    .await;

    let events = mock_insert(&mut server, "/rest/v1/events", 201, 1).await;
    let rsvps = mock_insert(&mut server, "/rest/v1/event_rsvps", 201, 1).await;
    let notifications = mock_insert(&mut server, "/rest/v1/notifications", 201, 1).await;
    let crossed = mock_insert(&mut server, "/rest/v1/crossed_paths", 201, 1).await;

    let store = client_for(&server);
    let outcome = matchmaking_run(store).execute().await.unwrap();

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    };

    assert_eq!(report.pool_size, 3);
    assert_eq!(report.groups_attempted, 1);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].participant_count, 2);
    assert_eq!(report.events[0].location, "Mystery venue in New York");
    assert!(report.failures.is_empty());

    pool.assert_async().await;
    events.assert_async().await;
    rsvps.assert_async().await;
    notifications.assert_async().await;
    crossed.assert_async().await;
}

#[tokio::test]
async fn test_attendance_failure_leaves_event_and_fails_group() {
    let mut server = mockito::Server::new_async().await;

    let _pool = mock_pool(
        &mut server,
        json!([
            user_json("U1", 40.0, -73.0, "New York", "adventurous", &["vegan"]),
            user_json("U2", 40.01, -73.01, "New York", "adventurous", &["vegan"]),
        ]),
    )
    .await;

    let events = mock_insert(&mut server, "/rest/v1/events", 201, 1).await;
    let rsvps = mock_insert(&mut server, "/rest/v1/event_rsvps", 500, 1).await;
    let notifications = mock_insert(&mut server, "/rest/v1/notifications", 201, 0).await;
    let crossed = mock_insert(&mut server, "/rest/v1/crossed_paths", 201, 0).await;

    let store = client_for(&server);
    // The run must not raise: the failure stays scoped to the group
    let outcome = matchmaking_run(store).execute().await.unwrap();

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    };

    assert!(report.events.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, MaterializeStage::Attendance);
    assert_eq!(report.failures[0].member_ids, vec!["U1", "U2"]);

    // The event row was written before the RSVP insert failed and stays
    // behind as a tolerated orphan; later stages never ran
    events.assert_async().await;
    rsvps.assert_async().await;
    notifications.assert_async().await;
    crossed.assert_async().await;
}

#[tokio::test]
async fn test_event_insert_failure_aborts_group_before_rsvps() {
    let mut server = mockito::Server::new_async().await;

    let _pool = mock_pool(
        &mut server,
        json!([
            user_json("U1", 40.0, -73.0, "New York", "adventurous", &["vegan"]),
            user_json("U2", 40.01, -73.01, "New York", "adventurous", &["vegan"]),
        ]),
    )
    .await;

    let _events = mock_insert(&mut server, "/rest/v1/events", 500, 1).await;
    let rsvps = mock_insert(&mut server, "/rest/v1/event_rsvps", 201, 0).await;

    let store = client_for(&server);
    let outcome = matchmaking_run(store).execute().await.unwrap();

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    };

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, MaterializeStage::Event);
    rsvps.assert_async().await;
}

#[tokio::test]
async fn test_notification_failure_keeps_group_created() {
    let mut server = mockito::Server::new_async().await;

    let _pool = mock_pool(
        &mut server,
        json!([
            user_json("U1", 40.0, -73.0, "New York", "adventurous", &["vegan"]),
            user_json("U2", 40.01, -73.01, "New York", "adventurous", &["vegan"]),
        ]),
    )
    .await;

    let _events = mock_insert(&mut server, "/rest/v1/events", 201, 1).await;
    let _rsvps = mock_insert(&mut server, "/rest/v1/event_rsvps", 201, 1).await;
    let _notifications = mock_insert(&mut server, "/rest/v1/notifications", 500, 1).await;
    // Crossed paths still run after a notification failure
    let crossed = mock_insert(&mut server, "/rest/v1/crossed_paths", 201, 1).await;

    let store = client_for(&server);
    let outcome = matchmaking_run(store).execute().await.unwrap();

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    };

    assert_eq!(report.events.len(), 1);
    assert!(report.failures.is_empty());
    crossed.assert_async().await;
}

#[tokio::test]
async fn test_group_failure_does_not_abort_other_groups() {
    let mut server = mockito::Server::new_async().await;

    // Two disjoint pairs: one in New York, one in Berlin
    let _pool = mock_pool(
        &mut server,
        json!([
            user_json("NY1", 40.0, -73.0, "New York", "adventurous", &["vegan"]),
            user_json("NY2", 40.01, -73.01, "New York", "adventurous", &["vegan"]),
            user_json("B1", 52.52, 13.40, "Berlin", "street_food", &["halal"]),
            user_json("B2", 52.53, 13.41, "Berlin", "street_food", &["halal"]),
        ]),
    )
    .await;

    // The New York event insert fails; the Berlin one succeeds
    let _ny_event = server
        .mock("POST", "/rest/v1/events")
        .match_body(Matcher::PartialJsonString(r#"{"created_by": "NY1"}"#.to_string()))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let berlin_event = server
        .mock("POST", "/rest/v1/events")
        .match_body(Matcher::PartialJsonString(r#"{"created_by": "B1"}"#.to_string()))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;
    let _rsvps = mock_insert(&mut server, "/rest/v1/event_rsvps", 201, 1).await;
    let _notifications = mock_insert(&mut server, "/rest/v1/notifications", 201, 1).await;
    let _crossed = mock_insert(&mut server, "/rest/v1/crossed_paths", 201, 1).await;

    let store = client_for(&server);
    let outcome = matchmaking_run(store).execute().await.unwrap();

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    };

    assert_eq!(report.groups_attempted, 2);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].location, "Mystery venue in Berlin");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].member_ids, vec!["NY1", "NY2"]);
    berlin_event.assert_async().await;
}

#[tokio::test]
async fn test_pool_read_failure_is_fatal() {
    let mut server = mockito::Server::new_async().await;

    let _pool = server
        .mock("GET", "/rest/v1/profiles")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let store = client_for(&server);
    let result = matchmaking_run(store).execute().await;

    assert!(matches!(result, Err(RunError::PoolRead(_))));
}

#[tokio::test]
async fn test_malformed_pool_rows_are_skipped() {
    let mut server = mockito::Server::new_async().await;

    let _pool = mock_pool(
        &mut server,
        json!([
            user_json("U1", 40.0, -73.0, "New York", "adventurous", &["vegan"]),
            { "garbage": true },
        ]),
    )
    .await;

    let store = client_for(&server);
    let outcome = matchmaking_run(store).execute().await.unwrap();

    // Only the parseable row counts toward the pool
    match outcome {
        RunOutcome::Skipped { eligible } => assert_eq!(eligible, 1),
        other => panic!("expected a skipped run, got {:?}", other),
    }
}
