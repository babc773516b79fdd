//! Test doubles shared by unit and end-to-end tests.
//!
//! - `StubArtService`: canned art with per-operation failure switches
//! - `RecordingSink`: an `EventSink` that keeps every unsolicited event

pub mod art_mocks;
pub mod recording_sink;

pub use art_mocks::StubArtService;
pub use recording_sink::{RecordingSink, Recipient};
