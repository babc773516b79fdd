//! External service ports: the art service and the client event channel.

use async_trait::async_trait;
use hexrealm_domain::{ConnectionId, Mood, UserId};
use hexrealm_shared::ServerMessage;

use super::error::ArtGenError;

/// Frames returned by the art service for a tapestry or interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFrames {
    pub frames: Vec<String>,
    pub fps: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtGenPort: Send + Sync {
    /// A single glyph for the map.
    async fn room_symbol(&self, title: &str, description: &str) -> Result<String, ArtGenError>;

    async fn room_tapestry(
        &self,
        title: &str,
        description: &str,
        mood: Mood,
    ) -> Result<GeneratedFrames, ArtGenError>;

    async fn item_interaction(
        &self,
        name: &str,
        description: &str,
        verb: &str,
    ) -> Result<GeneratedFrames, ArtGenError>;
}

/// Unsolicited delivery to clients (combat ticks, finished generation jobs).
///
/// Delivery is best effort. A closed connection drops the message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send_to_connection(&self, connection_id: ConnectionId, message: ServerMessage);
    async fn send_to_user(&self, user_id: UserId, message: ServerMessage);
}
