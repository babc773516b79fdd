//! Canned art service for tests that don't need a real one.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use hexrealm_domain::Mood;

use crate::infrastructure::ports::{ArtGenError, ArtGenPort, GeneratedFrames};

pub const STUB_SYMBOL: &str = "▲";

/// Returns the same small frames for everything.
#[derive(Default)]
pub struct StubArtService {
    fail_interactions: AtomicBool,
    call_count: AtomicUsize,
}

impl StubArtService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `item_interaction` call fail from now on.
    pub fn fail_interactions(&self) {
        self.fail_interactions.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn frames() -> GeneratedFrames {
        GeneratedFrames {
            frames: vec!["/\\/\\".to_string(), "\\/\\/".to_string()],
            fps: 4,
        }
    }
}

#[async_trait]
impl ArtGenPort for StubArtService {
    async fn room_symbol(&self, _title: &str, _description: &str) -> Result<String, ArtGenError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(STUB_SYMBOL.to_string())
    }

    async fn room_tapestry(
        &self,
        _title: &str,
        _description: &str,
        _mood: Mood,
    ) -> Result<GeneratedFrames, ArtGenError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(Self::frames())
    }

    async fn item_interaction(
        &self,
        name: &str,
        _description: &str,
        _verb: &str,
    ) -> Result<GeneratedFrames, ArtGenError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_interactions.load(Ordering::SeqCst) {
            return Err(ArtGenError::RequestFailed(format!("no art for {name}")));
        }
        Ok(Self::frames())
    }
}
