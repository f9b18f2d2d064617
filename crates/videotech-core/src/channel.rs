//! Backend event channel
//!
//! Abstracts "attach/detach a listener for a native event name" over whatever
//! event-emitting primitive a concrete backend offers. Native events carry a
//! [`MediaSnapshot`] of the backend at emission time; any field a backend
//! cannot report is left as `None` and filled in later by the translator.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Handle returned by [`EventChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked for every delivery of a subscribed native event
pub type NativeListener = Rc<dyn Fn(&NativeEvent)>;

/// Half-open time window reported by the backend, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

/// State of the backend at the moment a native event fired
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaSnapshot {
    pub src: Option<String>,
    pub error_code: Option<i32>,
    pub volume: Option<f64>,
    pub current_time: Option<f64>,
    pub duration: Option<f64>,
    pub buffered_end: Option<f64>,
    pub seekable: Option<TimeRange>,
    pub paused: Option<bool>,
    pub fullscreen: Option<bool>,
}

/// A backend-specific event signal
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent {
    pub name: String,
    pub target: MediaSnapshot,
}

impl NativeEvent {
    pub fn new(name: impl Into<String>, target: MediaSnapshot) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    /// Event with an empty snapshot
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, MediaSnapshot::default())
    }
}

/// Subscribe/unsubscribe to native events on an opaque backend handle
pub trait EventChannel {
    /// Attach a listener for one native event name
    fn subscribe(&mut self, event: &str, listener: NativeListener) -> ListenerId;

    /// Detach a listener. Returns false if it was not attached.
    fn unsubscribe(&mut self, event: &str, id: ListenerId) -> bool;
}
