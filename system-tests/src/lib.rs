// system-tests/src/lib.rs
// ============================================================================
// Module: Titanic System Tests Library
// Description: Run-level configuration for the scenario test binaries.
// Purpose: Provide artifact, timeout and broker policy shared by every suite.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts the run-level configuration used by the Titanic scenario
//! binaries in `system-tests/tests`. Endpoint configuration lives in
//! `titanic_e2e::config`; this crate only decides where artifacts go, how
//! long suites may wait, and whether an unreachable broker is fatal.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
