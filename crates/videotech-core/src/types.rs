//! Core types shared by factories, wrappers and backends

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;
use uuid::Uuid;

/// Presentation-only styling applied to a backend's visual surface
pub type StyleMap = BTreeMap<String, String>;

/// Host-supplied identifier of a playback session
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random identifier for hosts that do not name their sessions
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instance wrapper state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperState {
    /// Backend handle built, listeners not attached yet
    Created,
    /// Listeners attached, nothing loaded
    Subscribed,
    /// Source is being prepared
    Loading,
    /// Backend reports enough data to play through
    Ready,
    /// Backend confirmed playback
    Playing,
    /// Backend confirmed pause or reached the end
    Paused,
    /// Terminal
    Destroyed,
}

impl WrapperState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: WrapperState) -> bool {
        use WrapperState::*;
        matches!(
            (self, target),
            // From Created
            (Created, Subscribed) | (Created, Destroyed) |
            // From Subscribed
            (Subscribed, Loading) | (Subscribed, Ready) | (Subscribed, Playing) |
            (Subscribed, Paused) | (Subscribed, Destroyed) |
            // From Loading
            (Loading, Ready) | (Loading, Playing) | (Loading, Paused) | (Loading, Destroyed) |
            // From Ready
            (Ready, Loading) | (Ready, Playing) | (Ready, Paused) | (Ready, Destroyed) |
            // From Playing
            (Playing, Loading) | (Playing, Ready) | (Playing, Paused) | (Playing, Destroyed) |
            // From Paused
            (Paused, Loading) | (Paused, Ready) | (Paused, Playing) | (Paused, Destroyed)
        )
    }

    pub fn is_destroyed(&self) -> bool {
        *self == WrapperState::Destroyed
    }
}

impl std::fmt::Display for WrapperState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WrapperState::Created => write!(f, "created"),
            WrapperState::Subscribed => write!(f, "subscribed"),
            WrapperState::Loading => write!(f, "loading"),
            WrapperState::Ready => write!(f, "ready"),
            WrapperState::Playing => write!(f, "playing"),
            WrapperState::Paused => write!(f, "paused"),
            WrapperState::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Detect a stream's encoding from its URL path extension.
///
/// Accepts absolute and relative URLs; query and fragment are ignored and
/// the result is lowercase. Returns `Ok(None)` when the path has no extension,
/// which includes `blob:` and MSE object URLs; factories reject those as an
/// unsupported encoding.
pub fn stream_encoding(stream_url: &str) -> Result<Option<String>> {
    let url = match Url::parse(stream_url) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse("file:///")?;
            base.join(stream_url)?
        }
        Err(e) => return Err(e.into()),
    };

    // Opaque URLs (`custom:clip.mp4`) have no segments, only a path
    let file = match url.path_segments() {
        Some(mut segments) => segments.next_back().unwrap_or_default(),
        None => url.path().rsplit('/').next().unwrap_or_default(),
    };

    Ok(file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_encoding() {
        assert_eq!(stream_encoding("video.mp4").unwrap().as_deref(), Some("mp4"));
        assert_eq!(
            stream_encoding("https://cdn.example.com/live/master.M3U8?token=abc#t=10")
                .unwrap()
                .as_deref(),
            Some("m3u8")
        );
        assert_eq!(
            stream_encoding("/media/clips/intro.webm").unwrap().as_deref(),
            Some("webm")
        );
        assert_eq!(stream_encoding("https://cdn.example.com/stream").unwrap(), None);
        assert_eq!(stream_encoding("https://cdn.example.com/dir/").unwrap(), None);
    }

    #[test]
    fn test_stream_encoding_opaque_urls() {
        assert_eq!(stream_encoding("custom:clip.mp4").unwrap().as_deref(), Some("mp4"));
        assert_eq!(stream_encoding("blob:https://cdn.example.com/3f2a9c").unwrap(), None);
    }

    #[test]
    fn test_wrapper_state_serializes_like_display() {
        for state in [
            WrapperState::Created,
            WrapperState::Subscribed,
            WrapperState::Loading,
            WrapperState::Ready,
            WrapperState::Playing,
            WrapperState::Paused,
            WrapperState::Destroyed,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
            assert_eq!(serde_json::from_str::<WrapperState>(&json).unwrap(), state);
        }
    }

    #[test]
    fn test_stream_encoding_invalid_url() {
        assert!(stream_encoding("http://[::1").is_err());
    }

    #[test]
    fn test_wrapper_state_transitions() {
        assert!(WrapperState::Created.can_transition_to(WrapperState::Subscribed));
        assert!(WrapperState::Loading.can_transition_to(WrapperState::Ready));
        assert!(WrapperState::Ready.can_transition_to(WrapperState::Playing));
        assert!(WrapperState::Playing.can_transition_to(WrapperState::Paused));
        assert!(WrapperState::Paused.can_transition_to(WrapperState::Playing));

        // Destroyed is terminal
        assert!(!WrapperState::Destroyed.can_transition_to(WrapperState::Playing));
        assert!(!WrapperState::Destroyed.can_transition_to(WrapperState::Subscribed));
        // Subscribed is only reachable at construction
        assert!(!WrapperState::Paused.can_transition_to(WrapperState::Subscribed));
    }

    #[test]
    fn test_session_id() {
        let id = SessionId::from("main-video");
        assert_eq!(id.as_str(), "main-video");
        assert_eq!(id.to_string(), "main-video");
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
