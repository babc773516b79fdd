//! Animation batches currently in flight.
//!
//! A user in `GENERATING_ANIMATIONS` without an entry here lost their job to
//! a restart and gets reset on their next input.

use dashmap::DashSet;
use hexrealm_domain::{RoomId, UserId};

#[derive(Default)]
pub struct GenerationJobs {
    authors: DashSet<UserId>,
    rooms: DashSet<RoomId>,
}

impl GenerationJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a batch for this room is already running.
    pub fn start(&self, author: Option<UserId>, room_id: RoomId) -> bool {
        if !self.rooms.insert(room_id) {
            return false;
        }
        if let Some(author) = author {
            self.authors.insert(author);
        }
        true
    }

    pub fn finish(&self, author: Option<UserId>, room_id: RoomId) {
        self.rooms.remove(&room_id);
        if let Some(author) = author {
            self.authors.remove(&author);
        }
    }

    pub fn is_author_waiting(&self, user_id: UserId) -> bool {
        self.authors.contains(&user_id)
    }
}
