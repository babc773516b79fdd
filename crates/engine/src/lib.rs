//! hexrealm engine library.
//!
//! All server-side code for the hexrealm session engine.
//!
//! ## Structure
//!
//! - `infrastructure/` - Ports, SQLite adapters, art service client, config
//! - `stores/` - Transient per-process state (wizard scratch, battles, art jobs)
//! - `use_cases/` - Movement, wizard, combat, interaction, auth, dispatcher
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Test fixtures module for integration testing.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end flows against an in-memory SQLite world.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
