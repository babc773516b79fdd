//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Everything else is concrete
//! types. Ports exist for:
//! - World store access (users, rooms, items, animations, tokens)
//! - The external art service
//! - Pushing events to connected clients
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{AnimationRepo, AuthTokenRepo, ItemRepo, RoomRepo, StoredCredentials, UserRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{ArtGenPort, EventSink, GeneratedFrames};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockAnimationRepo, MockAuthTokenRepo, MockItemRepo, MockRoomRepo, MockUserRepo};

#[cfg(test)]
pub use external::{MockArtGenPort, MockEventSink};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{ArtGenError, RepoError};
