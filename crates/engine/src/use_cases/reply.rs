//! Outgoing events produced by handling one command.

use hexrealm_shared::{LogLine, ServerMessage};

/// Ordered messages for the acting connection.
#[derive(Debug, Default)]
pub struct Reply {
    messages: Vec<ServerMessage>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(text: impl Into<String>) -> Self {
        let mut reply = Self::new();
        reply.error(text);
        reply
    }

    pub fn info(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(ServerMessage::info(text))
    }

    pub fn error(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(ServerMessage::error(text))
    }

    pub fn prompt(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(ServerMessage::prompt(text))
    }

    pub fn log(&mut self, line: LogLine) -> &mut Self {
        self.push(ServerMessage::GameLog(line))
    }

    pub fn push(&mut self, message: ServerMessage) -> &mut Self {
        self.messages.push(message);
        self
    }

    pub fn push_opt(&mut self, message: Option<ServerMessage>) -> &mut Self {
        if let Some(message) = message {
            self.messages.push(message);
        }
        self
    }

    pub fn extend(&mut self, other: Reply) -> &mut Self {
        self.messages.extend(other.messages);
        self
    }

    pub fn messages(&self) -> &[ServerMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ServerMessage> {
        self.messages
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
