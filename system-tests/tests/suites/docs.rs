// system-tests/tests/suites/docs.rs
// ============================================================================
// Module: Documentation Tests
// Description: Interactive documentation availability for every service.
// Purpose: Catch services whose docs page answers with JSON errors.
// Dependencies: system-tests helpers
// ============================================================================

use crate::helpers;
use helpers::assertions::TestResult;
use helpers::assertions::require;
use helpers::assertions::require_status;
use helpers::session::Session;

/// Fetches the docs page of the service displayed as `service` and requires
/// an HTML 200.
async fn docs_page_is_html(test_name: &str, service: &str) -> TestResult {
    let mut session = Session::start_unprobed(test_name)?;
    let endpoint = session
        .config
        .docs_endpoints()
        .into_iter()
        .find(|endpoint| endpoint.name == service)
        .ok_or_else(|| format!("no docs endpoint named {service}"))?;
    let response = session.client.get(&endpoint.url).await?;
    require_status(&response, &[200], service)?;
    require(
        response.is_html(),
        format!("{service} docs content type {:?}", response.content_type),
    )?;
    session.note(format!("{service} docs available at {}", endpoint.url));
    session.finish()
}

#[tokio::test(flavor = "multi_thread")]
async fn gateway_docs_are_html() -> TestResult {
    docs_page_is_html("gateway_docs_are_html", "Gateway").await
}

#[tokio::test(flavor = "multi_thread")]
async fn auth_docs_are_html() -> TestResult {
    docs_page_is_html("auth_docs_are_html", "Auth Service").await
}

#[tokio::test(flavor = "multi_thread")]
async fn passenger_docs_are_html() -> TestResult {
    docs_page_is_html("passenger_docs_are_html", "Passenger Service").await
}

#[tokio::test(flavor = "multi_thread")]
async fn statistics_docs_are_html() -> TestResult {
    docs_page_is_html("statistics_docs_are_html", "Statistics Service").await
}
