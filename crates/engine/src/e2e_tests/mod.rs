//! Backend E2E integration tests.
//!
//! These tests drive the full application stack:
//! - Real SQLite store (in memory, one per test)
//! - Stub art service with canned frames
//! - Complete App construction with all use cases
//! - Real combat timers at a short tick
//!
//! # Running E2E Tests
//!
//! ```bash
//! cargo test -p hexrealm-engine --lib e2e_tests
//! ```

mod e2e_helpers;
mod interaction_tests;
mod wizard_tests;

pub use e2e_helpers::*;
