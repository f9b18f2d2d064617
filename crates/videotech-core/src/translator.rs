//! Native-to-canonical event translation
//!
//! A [`TranslationTable`] maps native event names to canonical kinds plus a
//! payload rule. Tables are checked at construction: every canonical kind
//! must be reachable and no native name may be bound twice. Several native
//! names may alias the same kind (`volumechange` and `volumechangeNew`).
//!
//! Translation itself is pure. Stateful filtering (seek suppression, volume
//! alias de-duplication) happens in the session that owns the backend.

use crate::{
    channel::{MediaSnapshot, NativeEvent},
    event::{CanonicalEvent, EventKind, EventPayload, Playhead, SeekRange},
    Error, Result,
};
use std::collections::{BTreeMap, BTreeSet};

/// Error code reported when the backend has no structured error
pub const DEFAULT_ERROR_CODE: i32 = -1;

/// Native event names of an HTML5 media element and their canonical kinds
pub const HTML5_BINDINGS: [(&str, EventKind); 16] = [
    ("play", EventKind::Play),
    ("playing", EventKind::Playing),
    ("ended", EventKind::Ended),
    ("error", EventKind::Error),
    ("seeking", EventKind::Seeking),
    ("seeked", EventKind::Seeked),
    ("pause", EventKind::Paused),
    ("ratechange", EventKind::RateChange),
    ("stalled", EventKind::Stalled),
    ("volumechange", EventKind::VolumeChange),
    ("volumechangeNew", EventKind::VolumeChange),
    ("waiting", EventKind::Waiting),
    ("timeupdate", EventKind::TimeUpdate),
    ("durationchange", EventKind::DurationChange),
    ("progress", EventKind::Progress),
    ("canplaythrough", EventKind::Buffered),
];

/// How the payload of a canonical event is built from the native snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRule {
    None,
    SourceUrl,
    ErrorCode,
    Volume,
    Playhead,
    /// Fixed fullscreen flag, or read it from the snapshot when `None`
    Fullscreen(Option<bool>),
}

impl PayloadRule {
    /// Default rule for a canonical kind
    pub fn for_kind(kind: EventKind) -> Self {
        match kind {
            EventKind::Play => PayloadRule::SourceUrl,
            EventKind::Error => PayloadRule::ErrorCode,
            EventKind::VolumeChange => PayloadRule::Volume,
            EventKind::TimeUpdate | EventKind::DurationChange | EventKind::Progress => {
                PayloadRule::Playhead
            }
            EventKind::FullscreenChanged => PayloadRule::Fullscreen(None),
            _ => PayloadRule::None,
        }
    }

    fn build(&self, snapshot: &MediaSnapshot) -> Option<EventPayload> {
        match self {
            PayloadRule::None => None,
            PayloadRule::SourceUrl => Some(EventPayload::Play {
                url: snapshot.src.clone().unwrap_or_default(),
            }),
            PayloadRule::ErrorCode => Some(EventPayload::Error {
                errorcode: snapshot.error_code.unwrap_or(DEFAULT_ERROR_CODE),
            }),
            PayloadRule::Volume => Some(EventPayload::Volume {
                volume: snapshot.volume.filter(|v| v.is_finite()).unwrap_or(1.0),
            }),
            PayloadRule::Playhead => Some(EventPayload::Playhead(estimate_playhead(snapshot))),
            PayloadRule::Fullscreen(fixed) => Some(EventPayload::Fullscreen {
                is_full_screen: fixed.or(snapshot.fullscreen).unwrap_or(false),
                paused: snapshot.paused.unwrap_or(true),
            }),
        }
    }
}

/// One entry of a translation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub native: String,
    pub kind: EventKind,
    pub rule: PayloadRule,
}

impl Binding {
    /// Bind a native name using the kind's default payload rule
    pub fn new(native: impl Into<String>, kind: EventKind) -> Self {
        Self {
            native: native.into(),
            kind,
            rule: PayloadRule::for_kind(kind),
        }
    }

    /// Bind a native fullscreen enter/exit signal
    pub fn fullscreen(native: impl Into<String>, entering: bool) -> Self {
        Self {
            native: native.into(),
            kind: EventKind::FullscreenChanged,
            rule: PayloadRule::Fullscreen(Some(entering)),
        }
    }
}

/// Fill every playhead field from whatever the backend reported.
///
/// Non-finite values are treated as missing. Duration falls back to the end
/// of the seekable window, buffer to the current time, and the seek range to
/// `0..duration`.
pub fn estimate_playhead(snapshot: &MediaSnapshot) -> Playhead {
    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());

    let current_time = finite(snapshot.current_time).unwrap_or(0.0).max(0.0);
    let seekable = snapshot
        .seekable
        .filter(|r| r.start.is_finite() && r.end.is_finite());
    let duration = finite(snapshot.duration)
        .or(seekable.map(|r| r.end))
        .unwrap_or(0.0);
    let buffer = finite(snapshot.buffered_end).unwrap_or(current_time);
    let seek_range = seekable
        .map(|r| SeekRange {
            begin: r.start,
            end: r.end,
        })
        .unwrap_or(SeekRange {
            begin: 0.0,
            end: duration,
        });

    Playhead {
        current_time,
        duration,
        buffer,
        seek_range,
    }
}

/// Validated native-name to canonical-kind table
#[derive(Debug, Clone)]
pub struct TranslationTable {
    bindings: BTreeMap<String, (EventKind, PayloadRule)>,
}

impl TranslationTable {
    /// Build a table, rejecting duplicate native names and uncovered kinds
    pub fn new(bindings: impl IntoIterator<Item = Binding>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for binding in bindings {
            if table.contains_key(&binding.native) {
                return Err(Error::DuplicateBinding(binding.native));
            }
            table.insert(binding.native, (binding.kind, binding.rule));
        }

        let covered: BTreeSet<EventKind> = table.values().map(|(kind, _)| *kind).collect();
        let missing: Vec<EventKind> = EventKind::ALL
            .into_iter()
            .filter(|kind| !covered.contains(kind))
            .collect();
        if !missing.is_empty() {
            return Err(Error::IncompleteTranslation { missing });
        }

        Ok(Self { bindings: table })
    }

    /// Bindings for an HTML5 media element, including the WebKit
    /// fullscreen signals
    pub fn html5_bindings() -> Vec<Binding> {
        HTML5_BINDINGS
            .iter()
            .map(|(native, kind)| Binding::new(*native, *kind))
            .chain([
                Binding::fullscreen("webkitbeginfullscreen", true),
                Binding::fullscreen("webkitendfullscreen", false),
            ])
            .collect()
    }

    /// Table for an HTML5 media element
    pub fn html5() -> Self {
        let bindings = Self::html5_bindings()
            .into_iter()
            .map(|b| (b.native, (b.kind, b.rule)))
            .collect();
        Self { bindings }
    }

    /// Native names a session has to subscribe to
    pub fn native_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn kind_of(&self, native: &str) -> Option<EventKind> {
        self.bindings.get(native).map(|(kind, _)| *kind)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Translate one native event. Unbound names yield `None`.
    pub fn translate(&self, event: &NativeEvent) -> Option<CanonicalEvent> {
        let (kind, rule) = self.bindings.get(&event.name)?;
        Some(CanonicalEvent {
            kind: *kind,
            payload: rule.build(&event.target),
        })
    }
}

impl Default for TranslationTable {
    fn default() -> Self {
        Self::html5()
    }
}
