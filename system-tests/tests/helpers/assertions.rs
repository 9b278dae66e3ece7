// system-tests/tests/helpers/assertions.rs
// ============================================================================
// Module: Assertions
// Description: Result-returning checks for scenario steps.
// Purpose: Report the mismatched status or field instead of panicking.
// Dependencies: titanic-e2e
// ============================================================================

use std::fmt::Debug;

use serde_json::Value;
use titanic_e2e::ApiResponse;

/// Result type of every scenario.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Fails with `message` unless `condition` holds.
pub fn require(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into().into()) }
}

/// Fails unless `left == right`.
pub fn require_eq<T: PartialEq + Debug + ?Sized>(left: &T, right: &T, context: &str) -> TestResult {
    if left == right {
        Ok(())
    } else {
        Err(format!("{context}: left={left:?} right={right:?}").into())
    }
}

/// Fails unless the response status is one of `expected`.
pub fn require_status(response: &ApiResponse, expected: &[u16], context: &str) -> TestResult {
    if expected.contains(&response.status) {
        return Ok(());
    }
    Err(format!(
        "{context}: expected status {expected:?}, got {} with body {}",
        response.status, response.raw
    )
    .into())
}

/// Fails unless the `detail` message equals `expected`.
pub fn require_detail(response: &ApiResponse, expected: &str, context: &str) -> TestResult {
    require_eq(&response.detail(), &Some(expected), context)
}

/// Returns the field at `pointer`, failing when it is absent.
pub fn require_field<'a>(
    response: &'a ApiResponse,
    pointer: &str,
) -> Result<&'a Value, Box<dyn std::error::Error>> {
    response
        .field(pointer)
        .ok_or_else(|| format!("missing field {pointer} in {}", response.raw).into())
}

/// Returns the body as an array, failing otherwise.
pub fn require_array(response: &ApiResponse) -> Result<&Vec<Value>, Box<dyn std::error::Error>> {
    response.body.as_array().ok_or_else(|| format!("expected array body, got {}", response.raw).into())
}
