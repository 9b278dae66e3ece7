// system-tests/tests/suites/boundary_security.rs
// ============================================================================
// Module: Boundary and Security Tests
// Description: Field bounds, oversized input and injection probes.
// Purpose: Show that invalid input yields 4xx and never an unhandled 500.
// Dependencies: system-tests helpers
// ============================================================================

//! ## Overview
//! Age must lie in [0, 150] and names must be non-empty. Hostile strings are
//! data to the API: they are either stored verbatim or rejected, but must
//! never crash a handler.

use titanic_e2e::Credentials;
use titanic_e2e::Passenger;
use titanic_e2e::PassengerRecord;
use titanic_e2e::fixtures::new_passenger;

use crate::helpers;
use helpers::assertions::TestResult;
use helpers::assertions::require;
use helpers::assertions::require_eq;
use helpers::assertions::require_status;
use helpers::session::Session;

const PASSENGERS: &str = "/api/passengers";

/// Starts a session and obtains a fresh non-admin token.
async fn hacker_session(test_name: &str) -> Result<(Session, String), Box<dyn std::error::Error>> {
    let session = Session::start(test_name).await?;
    let hacker = Credentials::generated(&session.unique, "hacker", "password123", "test.com");
    let token = session.token_for(&hacker).await?;
    Ok((session, token))
}

/// Posts `record` and requires one of `expected`.
async fn create_expecting(test_name: &str, record: PassengerRecord, expected: &[u16]) -> TestResult {
    let (session, token) = hacker_session(test_name).await?;
    let response = session.client.post_json_authed(PASSENGERS, &token, &record).await?;
    require_status(&response, expected, test_name)?;
    if response.status == 201 {
        let admin = session.admin_token().await?;
        let id = response.json::<Passenger>()?.id;
        let _cleanup = session.client.delete_authed(&format!("{PASSENGERS}/{id}"), &admin).await?;
    }
    session.finish()
}

// ============================================================================
// SECTION: Boundaries
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn negative_age_is_rejected() -> TestResult {
    create_expecting("negative_age_is_rejected", new_passenger().with_age(-1), &[422]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn age_above_limit_is_rejected() -> TestResult {
    create_expecting("age_above_limit_is_rejected", new_passenger().with_age(151), &[422]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn age_zero_is_accepted() -> TestResult {
    create_expecting("age_zero_is_accepted", new_passenger().with_age(0), &[201]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn age_at_limit_is_accepted() -> TestResult {
    create_expecting("age_at_limit_is_accepted", new_passenger().with_age(150), &[201]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_name_is_rejected() -> TestResult {
    create_expecting("empty_name_is_rejected", new_passenger().with_name(""), &[422]).await
}

#[tokio::test(flavor = "multi_thread")]
async fn huge_name_never_crashes() -> TestResult {
    let (session, token) = hacker_session("huge_name_never_crashes").await?;
    let record = new_passenger().with_name("A".repeat(10_000));
    let response = session.client.post_json_authed(PASSENGERS, &token, &record).await?;
    require(response.status != 500, format!("10k-char name caused 500: {}", response.raw))?;
    session.finish()
}

// ============================================================================
// SECTION: Injection
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn script_name_is_stored_verbatim() -> TestResult {
    let (session, token) = hacker_session("script_name_is_stored_verbatim").await?;
    let payload = "<script>alert('HACKED')</script>";
    let response = session
        .client
        .post_json_authed(PASSENGERS, &token, &new_passenger().with_name(payload))
        .await?;
    require_status(&response, &[201], "script name")?;
    require_eq(&response.str_field("/name"), &Some(payload), "stored name")?;
    session.finish()
}

#[tokio::test(flavor = "multi_thread")]
async fn sql_in_path_id_is_rejected() -> TestResult {
    let session = Session::start("sql_in_path_id_is_rejected").await?;
    let response = session.client.get(&format!("{PASSENGERS}/1' OR '1'='1")).await?;
    require(response.status != 500, "SQL-shaped id caused 500")?;
    require_status(&response, &[404, 422], "SQL-shaped id")?;
    session.finish()
}

#[tokio::test(flavor = "multi_thread")]
async fn non_numeric_path_id_is_rejected() -> TestResult {
    let session = Session::start("non_numeric_path_id_is_rejected").await?;
    let response = session.client.get(&format!("{PASSENGERS}/not-a-number")).await?;
    require_status(&response, &[404, 422], "non-numeric id")?;
    session.finish()
}
