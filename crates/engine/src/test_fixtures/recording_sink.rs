//! An event sink that remembers what it was asked to deliver.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hexrealm_domain::{ConnectionId, UserId};
use hexrealm_shared::ServerMessage;

use crate::infrastructure::ports::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Connection(ConnectionId),
    User(UserId),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(Recipient, ServerMessage)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Recipient, ServerMessage)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, matches: impl Fn(&ServerMessage) -> bool) -> usize {
        self.events().iter().filter(|(_, m)| matches(m)).count()
    }

    /// Poll until an event matches or `timeout` passes.
    pub async fn wait_for(
        &self,
        timeout: Duration,
        matches: impl Fn(&ServerMessage) -> bool,
    ) -> Option<ServerMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some((_, message)) = self.events().into_iter().find(|(_, m)| matches(m)) {
                return Some(message);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn record(&self, recipient: Recipient, message: ServerMessage) {
        if let Ok(mut events) = self.events.lock() {
            events.push((recipient, message));
        }
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn send_to_connection(&self, connection_id: ConnectionId, message: ServerMessage) {
        self.record(Recipient::Connection(connection_id), message);
    }

    async fn send_to_user(&self, user_id: UserId, message: ServerMessage) {
        self.record(Recipient::User(user_id), message);
    }
}
