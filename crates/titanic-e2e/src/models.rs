// crates/titanic-e2e/src/models.rs
// ============================================================================
// Module: Response Models
// Description: Typed views over passenger and statistics responses.
// Purpose: Let suites decode response bodies once the raw shape is asserted.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These are read-side views only. Field types are deliberately lenient where
//! the services may emit `null` (averages over empty sets, missing cabins), so
//! decoding never masks a contract assertion made on the raw JSON.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::fixtures::PassengerRecord;

/// Tolerance used when comparing fares and ages.
const FLOAT_TOLERANCE: f64 = 1e-6;

// ============================================================================
// SECTION: Passengers
// ============================================================================

/// A stored passenger as returned by the passenger endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    /// Server-assigned identifier.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Ticket class.
    pub pclass: u8,
    /// `male` or `female`.
    #[serde(default)]
    pub sex: Option<String>,
    /// Age in years.
    #[serde(default)]
    pub age: Option<f64>,
    /// Ticket fare.
    #[serde(default)]
    pub fare: Option<f64>,
    /// Embarkation port.
    #[serde(default)]
    pub embarked: Option<String>,
    /// Destination.
    #[serde(default)]
    pub destination: Option<String>,
    /// Cabin identifier.
    #[serde(default)]
    pub cabin: Option<String>,
    /// Ticket number.
    #[serde(default)]
    pub ticket: Option<String>,
    /// Identity that created the record.
    #[serde(default)]
    pub created_by: Option<Value>,
}

impl Passenger {
    /// Returns the names of submitted fields whose stored value differs.
    #[must_use]
    pub fn mismatches(&self, record: &PassengerRecord) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.name != record.name {
            out.push("name");
        }
        if self.pclass != record.pclass {
            out.push("pclass");
        }
        if self.sex.as_deref() != Some(record.sex.as_str()) {
            out.push("sex");
        }
        let age = i32::try_from(record.age).map(f64::from).ok();
        if !close(self.age, age) {
            out.push("age");
        }
        if !close(self.fare, Some(record.fare)) {
            out.push("fare");
        }
        if self.embarked.as_deref() != Some(record.embarked.as_str()) {
            out.push("embarked");
        }
        if self.destination.as_deref() != Some(record.destination.as_str()) {
            out.push("destination");
        }
        if self.cabin != record.cabin {
            out.push("cabin");
        }
        if self.ticket.as_deref() != Some(record.ticket.as_str()) {
            out.push("ticket");
        }
        out
    }

    /// Returns true when every submitted field round-tripped unchanged.
    #[must_use]
    pub fn matches(&self, record: &PassengerRecord) -> bool {
        self.mismatches(record).is_empty()
    }
}

/// Compares two optional floats within [`FLOAT_TOLERANCE`].
fn close(left: Option<f64>, right: Option<f64>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => (left - right).abs() < FLOAT_TOLERANCE,
        (None, None) => true,
        _ => false,
    }
}

// ============================================================================
// SECTION: Statistics
// ============================================================================

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsSummary {
    /// Number of stored passengers.
    pub total_passengers: u64,
    /// Mean age, `null` when no ages are known.
    pub average_age: Option<f64>,
    /// Mean fare.
    pub average_fare: f64,
    /// Highest fare.
    pub most_expensive_ticket: f64,
    /// Most frequent destination, `null` when empty.
    pub most_popular_destination: Option<String>,
}

/// Per-class aggregate from `GET /api/stats/by-class`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassStats {
    /// Passengers in the class.
    pub total: u64,
    /// Mean fare.
    pub average_fare: Option<f64>,
    /// Mean age.
    pub average_age: Option<f64>,
}

/// Per-port aggregate from `GET /api/stats/by-port`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PortStats {
    /// Passengers embarked at the port.
    pub total: u64,
    /// Mean fare.
    pub average_fare: Option<f64>,
}

/// One ranked destination.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DestinationCount {
    /// Destination name.
    pub name: String,
    /// Passengers heading there.
    pub count: u64,
}

/// Body of `GET /api/stats/destinations`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Destinations {
    /// Destinations ordered by count.
    pub destinations: Vec<DestinationCount>,
}

/// One bucket from `GET /api/stats/age-distribution`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgeBucket {
    /// Passengers in the bucket.
    pub count: u64,
    /// Share of all passengers, in percent.
    pub percentage: f64,
}

/// Body of `GET /api/stats/by-class`, keyed `class_1` to `class_3`.
pub type ClassBreakdown = BTreeMap<String, ClassStats>;
/// Body of `GET /api/stats/by-port`, keyed by port name.
pub type PortBreakdown = BTreeMap<String, PortStats>;
/// Body of `GET /api/stats/age-distribution`, keyed by bucket name.
pub type AgeDistribution = BTreeMap<String, AgeBucket>;

/// Sums bucket percentages.
#[must_use]
pub fn total_percentage(distribution: &AgeDistribution) -> f64 {
    distribution.values().map(|bucket| bucket.percentage).sum()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
