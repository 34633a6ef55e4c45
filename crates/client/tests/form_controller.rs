//! Integration tests for form submission against the mock API.

mod common;

use std::sync::atomic::Ordering;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use chrono::NaiveDate;
use clubdesk_client::{FormController, FormMode, SubmitOutcome};
use clubdesk_core::entities::{Club, Player, Region};
use clubdesk_core::list::ListQuery;
use clubdesk_events::{drain, NotificationBus, NotificationLevel};
use common::{club_json, player_json, spawn_mock_api};
use serde_json::json;

fn filled_club_form() -> FormController<Club> {
    let mut form = FormController::<Club>::create();
    let draft = form.draft_mut();
    draft.club_name = "Pune Tigers".into();
    draft.region_id = 1;
    draft.address = "1 Stadium Road".into();
    draft.mobile = "9876543210".into();
    draft.email = "tigers@example.org".into();
    draft.contact_person = "Anil Pawar".into();
    form
}

// ---------------------------------------------------------------------------
// Test: invalid drafts never reach the network
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_draft_sends_no_request() {
    let mock = spawn_mock_api().await;
    let api = mock.signed_in_client();
    let bus = NotificationBus::default();
    let mut form = FormController::<Player>::create();
    form.draft_mut().first_name = "Ravi".into();

    let mut calls = 0;
    let outcome = form.submit(&api, &bus, |_| calls += 1).await;

    let errors = assert_matches!(outcome, SubmitOutcome::Invalid(errors) => errors);
    assert!(errors.get("lastName").is_some());
    assert!(errors.get("groupIds").is_some());
    assert!(errors.get("dateOfBirth").is_some());
    assert!(errors.get("firstName").is_none());
    assert_eq!(calls, 0);
    assert!(mock.state.requests().is_empty());
    assert!(!form.is_submitting());
}

// ---------------------------------------------------------------------------
// Test: create success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_create_notifies_runs_continuation_and_invalidates() {
    let mock = spawn_mock_api().await;
    let api = mock.signed_in_client();
    let bus = NotificationBus::default();
    let mut rx = bus.subscribe();

    let query = ListQuery::default();
    api.resource::<Club>().list(&query).await.unwrap();

    let mut form = filled_club_form();
    let mut saved_names = Vec::new();
    let outcome = form
        .submit(&api, &bus, |club| saved_names.push(club.club_name.clone()))
        .await;

    let club = assert_matches!(outcome, SubmitOutcome::Saved(club) => club);
    assert_eq!(club.club_name, "Pune Tigers");
    assert_eq!(saved_names, vec!["Pune Tigers"]);
    assert_eq!(mock.state.count("POST", "/clubs"), 1);
    assert_eq!(api.cache().is_stale("clubs", &query.signature()), Some(true));

    let notes = drain(&mut rx);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Success);
    assert_eq!(notes[0].message, "Club created successfully");
    assert!(!form.is_dirty());
}

#[tokio::test]
async fn edit_form_puts_to_record_path() {
    let mock = spawn_mock_api().await;
    let api = mock.signed_in_client();
    let bus = NotificationBus::default();
    let id = mock.state.seed("regions", json!({"name": "Konkan", "code": "KN"}));

    let mut form = FormController::<Region>::load(&api, id).await.unwrap();
    assert_eq!(form.mode(), FormMode::Edit(id));
    form.draft_mut().name = "Konkan Coast".into();

    let outcome = form.submit(&api, &bus, |_| {}).await;

    assert_matches!(outcome, SubmitOutcome::Saved(region) if region.name == "Konkan Coast");
    assert_eq!(mock.state.count("PUT", &format!("/regions/{id}")), 1);
    assert_eq!(mock.state.count("POST", "/regions"), 0);
    assert_eq!(form.draft().name, "Konkan Coast");
}

// ---------------------------------------------------------------------------
// Test: server rejections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_field_error_sets_only_that_field() {
    let mock = spawn_mock_api().await;
    let api = mock.signed_in_client();
    let bus = NotificationBus::default();
    let mut rx = bus.subscribe();
    mock.state.reject_next_write(
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({
            "message": "Validation failed",
            "errors": { "email": { "message": "Email already exists" } }
        }),
    );

    let mut form = filled_club_form();
    let mut calls = 0;
    let outcome = form.submit(&api, &bus, |_| calls += 1).await;

    assert_matches!(outcome, SubmitOutcome::Rejected);
    assert_eq!(form.errors().len(), 1);
    assert_eq!(form.errors().get("email"), Some("Email already exists"));
    assert_eq!(calls, 0);
    assert!(drain(&mut rx).is_empty());
    assert_eq!(form.draft().club_name, "Pune Tigers", "draft is preserved");
}

#[tokio::test]
async fn unmapped_server_error_becomes_notification() {
    let mock = spawn_mock_api().await;
    let api = mock.signed_in_client();
    let bus = NotificationBus::default();
    let mut rx = bus.subscribe();
    mock.state.reject_next_write(
        StatusCode::BAD_REQUEST,
        json!({ "errors": { "licenceNumber": ["Licence expired"] } }),
    );

    let mut form = filled_club_form();
    let outcome = form.submit(&api, &bus, |_| {}).await;

    assert_matches!(outcome, SubmitOutcome::Rejected);
    assert!(form.errors().is_empty());
    let notes = drain(&mut rx);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].message, "Licence expired");
}

#[tokio::test]
async fn bare_error_message_becomes_notification() {
    let mock = spawn_mock_api().await;
    let api = mock.signed_in_client();
    let bus = NotificationBus::default();
    let mut rx = bus.subscribe();
    mock.state
        .reject_next_write(StatusCode::CONFLICT, json!({ "error": "Club limit reached" }));

    let mut form = filled_club_form();
    form.submit(&api, &bus, |_| {}).await;

    let notes = drain(&mut rx);
    assert_eq!(notes[0].message, "Club limit reached");
    assert_eq!(notes[0].resource.as_deref(), Some("clubs"));
}

// ---------------------------------------------------------------------------
// Test: in-flight guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_while_in_flight_is_busy() {
    let mock = spawn_mock_api().await;
    let api = mock.signed_in_client();
    let bus = NotificationBus::default();
    let mut form = filled_club_form();

    let flag = form.submitting_flag();
    flag.store(true, Ordering::Release);
    assert!(form.is_submitting());

    let outcome = form.submit(&api, &bus, |_| {}).await;
    assert_matches!(outcome, SubmitOutcome::Busy);
    assert!(mock.state.requests().is_empty());

    flag.store(false, Ordering::Release);
    let outcome = form.submit(&api, &bus, |_| {}).await;
    assert_matches!(outcome, SubmitOutcome::Saved(_));
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn player_form_round_trips_through_edit() {
    let mock = spawn_mock_api().await;
    let api = mock.signed_in_client();
    let bus = NotificationBus::default();
    let club_id = mock.state.seed("clubs", club_json("Lions", 1));
    let id = mock.state.seed("players", player_json("Ravi", "Jadhav", club_id));

    let mut form = FormController::<Player>::load(&api, id).await.unwrap();
    assert_eq!(
        form.draft().date_of_birth,
        NaiveDate::from_ymd_opt(2008, 4, 10)
    );
    form.draft_mut().position = Some("Defender".into());

    let outcome = form.submit(&api, &bus, |_| {}).await;
    let player = assert_matches!(outcome, SubmitOutcome::Saved(p) => p);
    assert_eq!(player.position.as_deref(), Some("Defender"));
    assert_eq!(player.club_id, Some(club_id));
}
