// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Run-level configuration for Titanic system tests.
// Purpose: Provide typed access to artifact and timeout settings.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Run-level configuration is read from `TITANIC_SYSTEM_TEST_*` environment
//! variables and mapped into a small typed structure for the test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::read_env_strict;
