// crates/titanic-e2e/src/fixtures.rs
// ============================================================================
// Module: Fixtures
// Description: Literal credential and passenger records used as test input.
// Purpose: Keep fixture data in one place so suites stay in sync with the
//          messages and shapes the services enforce.
// Dependencies: serde, unique
// ============================================================================

//! ## Overview
//! Fixture records are plain serde DTOs. They are well-formed enough to be
//! accepted or rejected predictably by the services; nothing here validates
//! business rules locally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::unique::UniqueSource;

// ============================================================================
// SECTION: Service Messages
// ============================================================================

/// Detail returned when a login is rejected.
pub const INVALID_LOGIN_DETAIL: &str = "Incorrect username or password";
/// Detail returned when a revoked or unknown refresh token is presented.
pub const REVOKED_REFRESH_DETAIL: &str = "Refresh token has been revoked or is invalid";
/// Detail returned for an out-of-set `sex` filter.
pub const INVALID_SEX_FILTER_DETAIL: &str = "sex must be 'male' or 'female'";
/// Detail returned when a non-admin attempts an admin-only operation.
pub const ADMIN_REQUIRED_DETAIL: &str =
    "Admin access required. Only administrators can perform this action.";
/// Detail returned when passengers of different classes share a cabin.
pub const CABIN_CONFLICT_DETAIL: &str = "Different social classes cannot share cabins on \
                                         Titanic. Jack (3rd class) and Rose (1st class) must \
                                         remain separate... for now. 🎭🚢";
/// Service name reported by the gateway root.
pub const GATEWAY_SERVICE_NAME: &str = "Titanic API Gateway";
/// Service name reported by the auth service root.
pub const AUTH_SERVICE_NAME: &str = "Titanic Auth Service";
/// Access-token lifetime advertised on register/login (15 minutes).
pub const ACCESS_TOKEN_TTL_SECS: u64 = 900;
/// Embarkation ports the statistics service always reports.
pub const KNOWN_PORTS: [&str; 3] = ["Southampton", "Cherbourg", "Queenstown"];
/// Class keys reported by the per-class statistics endpoint.
pub const CLASS_KEYS: [&str; 3] = ["class_1", "class_2", "class_3"];
/// Buckets reported by the age-distribution endpoint.
pub const AGE_BUCKETS: [&str; 5] =
    ["children_0_12", "teens_13_19", "adults_20_40", "middle_age_41_60", "seniors_61_plus"];

/// Returns the detail the auth service emits for a duplicate username.
#[must_use]
pub fn duplicate_user_detail(username: &str) -> String {
    format!("User with username '{username}' already exists")
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Identity used to register or log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
    /// Contact address.
    pub email: String,
}

impl Credentials {
    /// Creates credentials from explicit parts.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
        }
    }

    /// Generates `<prefix>_<token>` / `<prefix>_<token>@<domain>` credentials.
    #[must_use]
    pub fn generated(
        source: &dyn UniqueSource,
        prefix: &str,
        password: &str,
        domain: &str,
    ) -> Self {
        let token = source.next_token();
        Self::new(
            format!("{prefix}_{token}"),
            password,
            format!("{prefix}_{token}@{domain}"),
        )
    }

    /// Returns the login body (username and password only).
    #[must_use]
    pub fn login_body(&self) -> LoginRequest<'_> {
        LoginRequest {
            username: &self.username,
            password: &self.password,
        }
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LoginRequest<'a> {
    /// Login name.
    pub username: &'a str,
    /// Plain-text password.
    pub password: &'a str,
}

/// The fixed administrator identity.
///
/// The first identity registered on a fresh deployment becomes the admin, so
/// this account must be bootstrapped before any other suite registers users.
#[must_use]
pub fn system_admin() -> Credentials {
    Credentials::new("admin", "admin123", "admin@titanic.com")
}

/// A fresh regular-user identity.
#[must_use]
pub fn regular_user(source: &dyn UniqueSource) -> Credentials {
    Credentials::generated(source, "user", "password123", "test.com")
}

// ============================================================================
// SECTION: Passengers
// ============================================================================

/// Passenger payload accepted by `POST`/`PUT /api/passengers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    /// Full name, `Surname, Title. Given`.
    pub name: String,
    /// Ticket class, 1 to 3.
    pub pclass: u8,
    /// `male` or `female`.
    pub sex: String,
    /// Age in years. Signed so out-of-range probes can be expressed.
    pub age: i64,
    /// Ticket fare.
    pub fare: f64,
    /// Embarkation port.
    pub embarked: String,
    /// Destination.
    pub destination: String,
    /// Cabin identifier, omitted when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabin: Option<String>,
    /// Ticket number.
    pub ticket: String,
}

impl PassengerRecord {
    /// Returns the surname portion of the name (text before the first comma).
    #[must_use]
    pub fn surname(&self) -> &str {
        self.name.split(',').next().unwrap_or(&self.name).trim()
    }

    /// Returns a copy with a different name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a copy with a different age.
    #[must_use]
    pub const fn with_age(mut self, age: i64) -> Self {
        self.age = age;
        self
    }

    /// Returns a copy with a different fare.
    #[must_use]
    pub const fn with_fare(mut self, fare: f64) -> Self {
        self.fare = fare;
        self
    }

    /// Returns a copy assigned to `cabin`.
    #[must_use]
    pub fn with_cabin(mut self, cabin: impl Into<String>) -> Self {
        self.cabin = Some(cabin.into());
        self
    }
}

/// Generic second-class passenger used for CRUD flows.
#[must_use]
pub fn new_passenger() -> PassengerRecord {
    PassengerRecord {
        name: "Smith, Mr. Test".to_string(),
        pclass: 2,
        sex: "male".to_string(),
        age: 30,
        fare: 25.50,
        embarked: "Southampton".to_string(),
        destination: "New York".to_string(),
        cabin: None,
        ticket: "TEST-123".to_string(),
    }
}

/// Rose: first class, cabin B52.
#[must_use]
pub fn rose() -> PassengerRecord {
    PassengerRecord {
        name: "Bukater, Miss. Rose DeWitt".to_string(),
        pclass: 1,
        sex: "female".to_string(),
        age: 17,
        fare: 150.0,
        embarked: "Southampton".to_string(),
        destination: "New York".to_string(),
        cabin: Some("B52".to_string()),
        ticket: "PC 17599".to_string(),
    }
}

/// Jack: third class, no cabin.
#[must_use]
pub fn jack() -> PassengerRecord {
    PassengerRecord {
        name: "Dawson, Mr. Jack".to_string(),
        pclass: 3,
        sex: "male".to_string(),
        age: 20,
        fare: 0.0,
        embarked: "Southampton".to_string(),
        destination: "New York".to_string(),
        cabin: None,
        ticket: "A/5 21171".to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
