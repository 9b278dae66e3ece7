// crates/titanic-e2e/src/unique.rs
// ============================================================================
// Module: Uniqueness Tokens
// Description: Injectable sources of per-run uniqueness tokens.
// Purpose: Keep fixture identifiers collision-free against shared service state.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! The services under test are never reset between runs, so every generated
//! username, email or passenger name carries a token from a [`UniqueSource`].
//! [`ClockSource`] combines wall-clock milliseconds, a process-wide counter
//! and a random suffix so two calls inside the same millisecond (or from two
//! parallel test binaries) still differ. [`FixedSource`] makes tokens
//! deterministic for unit tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::RngCore;

// ============================================================================
// SECTION: Source Trait
// ============================================================================

/// Produces tokens used to make fixture identifiers unique.
pub trait UniqueSource: Send + Sync {
    /// Returns the next token. Tokens contain only `[0-9a-z]`.
    fn next_token(&self) -> String;
}

// ============================================================================
// SECTION: Clock Source
// ============================================================================

/// Process-wide sequence shared by every [`ClockSource`].
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Clock-derived tokens hardened with a counter and a random suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockSource;

impl ClockSource {
    /// Creates a clock-backed source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UniqueSource for ClockSource {
    fn next_token(&self) -> String {
        let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let salt = rand::thread_rng().next_u32() & 0xffff;
        format!("{millis}{seq:03}{salt:04x}")
    }
}

// ============================================================================
// SECTION: Fixed Source
// ============================================================================

/// Deterministic tokens: `<prefix>0`, `<prefix>1`, ...
#[derive(Debug, Default)]
pub struct FixedSource {
    /// Token prefix.
    prefix: String,
    /// Next counter value.
    counter: AtomicU64,
}

impl FixedSource {
    /// Creates a source whose tokens start with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl UniqueSource for FixedSource {
    fn next_token(&self) -> String {
        let value = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{value}", self.prefix)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
