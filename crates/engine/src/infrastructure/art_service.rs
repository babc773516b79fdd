//! Art service client
//!
//! Implements the ArtGenPort trait over the external ASCII art service's
//! JSON API. Every failure is returned as an `ArtGenError`; callers decide
//! how to degrade.

use async_trait::async_trait;
use hexrealm_domain::Mood;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::ports::{ArtGenError, ArtGenPort, GeneratedFrames};

const MAX_FPS: u32 = 60;

/// Client for the art service.
#[derive(Clone)]
pub struct HttpArtService {
    client: Client,
    base_url: String,
}

impl HttpArtService {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ArtGenError>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| ArtGenError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ArtGenError::RequestFailed(format!("{status}: {error_text}")));
        }

        response
            .json()
            .await
            .map_err(|e| ArtGenError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct SymbolRequest<'a> {
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct TapestryRequest<'a> {
    title: &'a str,
    description: &'a str,
    mood: &'a str,
}

#[derive(Debug, Serialize)]
struct InteractionRequest<'a> {
    name: &'a str,
    description: &'a str,
    verb: &'a str,
}

#[derive(Debug, Deserialize)]
struct SymbolResponse {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct FramesResponse {
    frames: Vec<String>,
    fps: u32,
}

/// First visible glyph of whatever the service sent back.
fn validate_symbol(response: SymbolResponse) -> Result<String, ArtGenError> {
    response
        .symbol
        .chars()
        .find(|c| !c.is_whitespace())
        .map(String::from)
        .ok_or_else(|| ArtGenError::InvalidResponse("empty symbol".to_string()))
}

fn validate_frames(response: FramesResponse) -> Result<GeneratedFrames, ArtGenError> {
    if response.frames.is_empty() {
        return Err(ArtGenError::InvalidResponse("no frames".to_string()));
    }
    Ok(GeneratedFrames {
        frames: response.frames,
        fps: response.fps.clamp(1, MAX_FPS),
    })
}

#[async_trait]
impl ArtGenPort for HttpArtService {
    async fn room_symbol(&self, title: &str, description: &str) -> Result<String, ArtGenError> {
        let response = self
            .post("symbol", &SymbolRequest { title, description })
            .await?;
        validate_symbol(response)
    }

    async fn room_tapestry(
        &self,
        title: &str,
        description: &str,
        mood: Mood,
    ) -> Result<GeneratedFrames, ArtGenError> {
        let response = self
            .post(
                "tapestry",
                &TapestryRequest {
                    title,
                    description,
                    mood: mood.as_str(),
                },
            )
            .await?;
        validate_frames(response)
    }

    async fn item_interaction(
        &self,
        name: &str,
        description: &str,
        verb: &str,
    ) -> Result<GeneratedFrames, ArtGenError> {
        let response = self
            .post(
                "interaction",
                &InteractionRequest {
                    name,
                    description,
                    verb,
                },
            )
            .await?;
        validate_frames(response)
    }
}

/// Stand-in when no art service URL is configured.
pub struct UnconfiguredArtService;

#[async_trait]
impl ArtGenPort for UnconfiguredArtService {
    async fn room_symbol(&self, _title: &str, _description: &str) -> Result<String, ArtGenError> {
        Err(ArtGenError::Unavailable)
    }

    async fn room_tapestry(
        &self,
        _title: &str,
        _description: &str,
        _mood: Mood,
    ) -> Result<GeneratedFrames, ArtGenError> {
        Err(ArtGenError::Unavailable)
    }

    async fn item_interaction(
        &self,
        _name: &str,
        _description: &str,
        _verb: &str,
    ) -> Result<GeneratedFrames, ArtGenError> {
        Err(ArtGenError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_reduced_to_first_glyph() {
        let symbol = validate_symbol(SymbolResponse {
            symbol: "  ♜ tower".to_string(),
        })
        .unwrap();
        assert_eq!(symbol, "♜");
    }

    #[test]
    fn blank_symbol_is_invalid() {
        assert!(matches!(
            validate_symbol(SymbolResponse {
                symbol: "   ".to_string()
            }),
            Err(ArtGenError::InvalidResponse(_))
        ));
    }

    #[test]
    fn frames_must_not_be_empty_and_fps_is_clamped() {
        assert!(validate_frames(FramesResponse {
            frames: vec![],
            fps: 8
        })
        .is_err());

        let frames = validate_frames(FramesResponse {
            frames: vec!["/\\".to_string()],
            fps: 0,
        })
        .unwrap();
        assert_eq!(frames.fps, 1);
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = HttpArtService::new("http://art.local:7000/", Duration::from_secs(1));
        assert_eq!(client.base_url, "http://art.local:7000");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_request_failure() {
        let client = HttpArtService::new("http://127.0.0.1:9", Duration::from_millis(500));
        let err = client.room_symbol("Hall", "Big").await.unwrap_err();
        assert!(matches!(err, ArtGenError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn unconfigured_service_always_fails() {
        let err = UnconfiguredArtService
            .room_tapestry("Hall", "Big", Mood::Grim)
            .await
            .unwrap_err();
        assert!(matches!(err, ArtGenError::Unavailable));
    }
}
