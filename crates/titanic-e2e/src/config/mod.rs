// crates/titanic-e2e/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Endpoint and broker configuration for the Titanic harness.
// Purpose: Provide typed access to service addresses with env overrides.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! Harness configuration is read from environment variables and mapped into
//! [`HarnessConfig`]. Unset variables fall back to the local docker-compose
//! ports; set-but-invalid variables fail closed with a [`ConfigError`].

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env::ConfigError;
pub use env::DEFAULT_AUTH_URL;
pub use env::DEFAULT_GATEWAY_URL;
pub use env::DEFAULT_KAFKA_BROKER;
pub use env::DEFAULT_KAFKA_TOPIC;
pub use env::DEFAULT_PASSENGER_URL;
pub use env::DEFAULT_STATS_URL;
pub use env::DocsEndpoint;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::read_env_strict;

// ============================================================================
// SECTION: Tests
// ============================================================================
