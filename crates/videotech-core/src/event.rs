//! Canonical event vocabulary understood by the host controller

use serde::{Deserialize, Serialize};

/// Canonical notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Play,
    Playing,
    Ended,
    Error,
    Seeking,
    Seeked,
    Paused,
    RateChange,
    Stalled,
    VolumeChange,
    Waiting,
    TimeUpdate,
    DurationChange,
    Progress,
    Buffered,
    FullscreenChanged,
}

impl EventKind {
    /// Every canonical kind, in declaration order
    pub const ALL: [EventKind; 16] = [
        EventKind::Play,
        EventKind::Playing,
        EventKind::Ended,
        EventKind::Error,
        EventKind::Seeking,
        EventKind::Seeked,
        EventKind::Paused,
        EventKind::RateChange,
        EventKind::Stalled,
        EventKind::VolumeChange,
        EventKind::Waiting,
        EventKind::TimeUpdate,
        EventKind::DurationChange,
        EventKind::Progress,
        EventKind::Buffered,
        EventKind::FullscreenChanged,
    ];

    /// Host-facing name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Play => "PLAY",
            EventKind::Playing => "PLAYING",
            EventKind::Ended => "ENDED",
            EventKind::Error => "ERROR",
            EventKind::Seeking => "SEEKING",
            EventKind::Seeked => "SEEKED",
            EventKind::Paused => "PAUSED",
            EventKind::RateChange => "RATE_CHANGE",
            EventKind::Stalled => "STALLED",
            EventKind::VolumeChange => "VOLUME_CHANGE",
            EventKind::Waiting => "WAITING",
            EventKind::TimeUpdate => "TIME_UPDATE",
            EventKind::DurationChange => "DURATION_CHANGE",
            EventKind::Progress => "PROGRESS",
            EventKind::Buffered => "BUFFERED",
            EventKind::FullscreenChanged => "FULLSCREEN_CHANGED",
        }
    }

    /// Kinds that carry playhead information
    pub fn is_playhead(&self) -> bool {
        matches!(
            self,
            EventKind::TimeUpdate | EventKind::DurationChange | EventKind::Progress
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seekable window in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeekRange {
    pub begin: f64,
    pub end: f64,
}

/// Playhead payload shared by TIME_UPDATE, DURATION_CHANGE and PROGRESS.
///
/// Every field is always present so the payload shape does not depend on
/// which backend produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playhead {
    pub current_time: f64,
    pub duration: f64,
    pub buffer: f64,
    pub seek_range: SeekRange,
}

/// Kind-specific notification payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Play {
        url: String,
    },
    Error {
        errorcode: i32,
    },
    Volume {
        volume: f64,
    },
    Playhead(Playhead),
    Fullscreen {
        #[serde(rename = "isFullScreen")]
        is_full_screen: bool,
        paused: bool,
    },
}

/// A normalized notification, built fresh for every native event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalEvent {
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<EventPayload>,
}

impl CanonicalEvent {
    /// Event without a payload
    pub fn bare(kind: EventKind) -> Self {
        Self { kind, payload: None }
    }

    pub fn with_payload(kind: EventKind, payload: EventPayload) -> Self {
        Self {
            kind,
            payload: Some(payload),
        }
    }

    /// Volume carried by a VOLUME_CHANGE payload
    pub fn volume(&self) -> Option<f64> {
        match self.payload {
            Some(EventPayload::Volume { volume }) => Some(volume),
            _ => None,
        }
    }

    /// Playhead carried by TIME_UPDATE, DURATION_CHANGE or PROGRESS
    pub fn playhead(&self) -> Option<&Playhead> {
        match &self.payload {
            Some(EventPayload::Playhead(playhead)) => Some(playhead),
            _ => None,
        }
    }

    /// Serialize for hosts that consume JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!(r#"{{"kind":"{}"}}"#, self.kind))
    }
}
