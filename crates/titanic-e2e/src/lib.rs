// crates/titanic-e2e/src/lib.rs
// ============================================================================
// Module: Titanic E2E Harness Library
// Description: Shared building blocks for Titanic black-box system tests.
// Purpose: Provide configuration, fixtures, HTTP access, credential bootstrap,
//          and event-bus helpers to the scenario suites.
// Dependencies: reqwest, rskafka, serde, thiserror, tokio, tracing, url
// ============================================================================

//! ## Overview
//! The harness talks to an already-running Titanic deployment (API gateway,
//! auth, passenger and statistics services, Kafka broker) and never owns any
//! of the state it exercises. Scenario suites combine:
//! - [`HarnessConfig`] for endpoint and broker addresses,
//! - [`fixtures`] for literal passenger and credential records,
//! - [`ApiClient`] for HTTP exchanges with transcript capture,
//! - [`auth::obtain_token`] for idempotent register-or-login bootstrap,
//! - [`EventBus`] for produce/consume round trips on a Kafka topic.
//!
//! Invariants:
//! - Every network wait is bounded by an explicit timeout.
//! - Isolation between runs comes from unique identifiers, never from resets.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod client;
pub mod config;
pub mod event_bus;
pub mod fixtures;
pub mod logging;
pub mod models;
pub mod unique;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth::AdminBootstrap;
pub use auth::AuthError;
pub use auth::TokenPair;
pub use client::ApiClient;
pub use client::ApiResponse;
pub use client::ClientError;
pub use config::ConfigError;
pub use config::HarnessConfig;
pub use event_bus::EventBus;
pub use event_bus::EventBusConfig;
pub use event_bus::EventBusError;
pub use event_bus::EventEnvelope;
pub use fixtures::Credentials;
pub use fixtures::PassengerRecord;
pub use models::Passenger;
pub use models::StatsSummary;
pub use unique::ClockSource;
pub use unique::FixedSource;
pub use unique::UniqueSource;
