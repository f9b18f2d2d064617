//! Backend control boundary
//!
//! A concrete backend (browser media element, plugin player, streaming SDK)
//! exposes native commands and a visual surface for styling on top of its
//! [`EventChannel`]. Commands are fire-and-forget: confirmation comes back
//! later as native events.

use crate::{channel::EventChannel, types::StyleMap, Result};

/// Native control primitives of a playback backend
pub trait MediaBackend: EventChannel {
    /// Point the backend at a new source. Must not start playback.
    fn set_source(&mut self, url: &str) -> bool;

    /// Current source, if any
    fn source(&self) -> Option<String>;

    /// Prepare the current source, leaving the backend paused
    fn load(&mut self);

    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, time: f64);

    /// Current playhead in seconds
    fn current_time(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    /// Presentation-only styling of the visual surface
    fn apply_style(&mut self, style: &StyleMap);

    /// Tear down the visual surface. Called after every listener is detached.
    fn release(&mut self);
}

/// Builds backend handles for a factory
pub trait BackendProvider {
    /// Where the backend's visual surface gets attached
    type Container;
    type Backend: MediaBackend + 'static;

    /// Build a backend for `stream_url`, already pointed at it.
    ///
    /// `encoding` has been checked against the factory's capabilities.
    fn build(
        &self,
        container: &Self::Container,
        stream_url: &str,
        encoding: &str,
    ) -> Result<Self::Backend>;
}
