//! Instance wrapper - the control surface a host drives
//!
//! Every operation is synchronous and fire-and-forget: the command goes to
//! the backend and confirmation arrives later as a canonical notification.
//! After [`PlaybackControl::destroy`] every operation is a silent no-op.

use crate::{
    backend::MediaBackend,
    config::FactoryConfig,
    host::HostController,
    session::Session,
    translator::TranslationTable,
    types::{SessionId, StyleMap, WrapperState},
};
use std::rc::{Rc, Weak};
use tracing::{debug, info, instrument, warn};

/// Normalized control surface shared by every technology
pub trait PlaybackControl {
    fn id(&self) -> &SessionId;

    fn state(&self) -> WrapperState;

    /// Point the backend at a new source without starting playback
    fn set_video_url(&self, url: &str) -> bool;

    /// Prepare the backend to play, optionally rewinding to 0. Leaves it paused.
    fn load(&self, rewind: bool);

    fn play(&self);

    fn pause(&self);

    /// Seek to `time` seconds. Ignored while seeking is disallowed.
    fn seek(&self, time: f64);

    /// Set volume in `[0, 1]`. Out-of-range values are ignored.
    fn set_volume(&self, volume: f64);

    fn apply_css(&self, style: &StyleMap);

    fn can_seek(&self) -> bool;

    /// Allow or forbid seeking. While forbidden, seeks coming from the
    /// backend's own controls are undone and never notified. Forbidding also
    /// drops a host seek that has not landed yet.
    fn set_can_seek(&self, allowed: bool);

    /// Detach every native listener and release the backend. Idempotent.
    fn destroy(&self);
}

/// Wrapper around one backend handle for one playback session
pub struct VideoWrapper<B: MediaBackend + 'static> {
    session: Rc<Session<B>>,
}

impl<B: MediaBackend + 'static> VideoWrapper<B> {
    /// Wrap a backend and subscribe to every native event in `table`
    pub fn new(
        id: SessionId,
        backend: B,
        host: Weak<dyn HostController>,
        table: Rc<TranslationTable>,
        config: &FactoryConfig,
        source: Option<String>,
    ) -> Self {
        let session = Session::new(id, backend, host, table, config, source);
        session.subscribe_all();
        Self { session }
    }

    pub fn is_destroyed(&self) -> bool {
        !self.session.is_live()
    }

    /// Native event names with an attached listener
    pub fn subscriptions(&self) -> Vec<String> {
        self.session.core.borrow().subscriptions.keys().cloned().collect()
    }

    /// Inspect the backend while the session holds it
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> Option<R> {
        self.session.core.borrow().backend.as_ref().map(f)
    }

    pub(crate) fn downgrade(&self) -> Weak<Session<B>> {
        Rc::downgrade(&self.session)
    }
}

impl<B: MediaBackend + 'static> PlaybackControl for VideoWrapper<B> {
    fn id(&self) -> &SessionId {
        &self.session.id
    }

    fn state(&self) -> WrapperState {
        self.session.core.borrow().state
    }

    #[instrument(skip(self), fields(session_id = %self.session.id))]
    fn set_video_url(&self, url: &str) -> bool {
        self.session
            .with_core("set_video_url", |core| {
                let Some(backend) = core.backend.as_mut() else {
                    return false;
                };
                if !backend.set_source(url) {
                    warn!(url, "Backend rejected source");
                    return false;
                }
                core.source = Some(url.to_string());
                core.seek.reset(0.0);
                info!(url, "Source updated");
                true
            })
            .unwrap_or(false)
    }

    #[instrument(skip(self), fields(session_id = %self.session.id))]
    fn load(&self, rewind: bool) {
        self.session.with_core("load", |core| {
            core.transition(WrapperState::Loading);
            let Some(backend) = core.backend.as_mut() else {
                return;
            };
            backend.load();
            if rewind {
                core.seek.host_issued(0.0);
                core.seek.anchor = 0.0;
                backend.seek(0.0);
            }
        });
    }

    fn play(&self) {
        self.session.with_core("play", |core| {
            if let Some(backend) = core.backend.as_mut() {
                backend.play();
            }
        });
    }

    fn pause(&self) {
        self.session.with_core("pause", |core| {
            if let Some(backend) = core.backend.as_mut() {
                backend.pause();
            }
        });
    }

    #[instrument(skip(self), fields(session_id = %self.session.id))]
    fn seek(&self, time: f64) {
        self.session.with_core("seek", |core| {
            if !core.seek.can_seek {
                warn!(time, "Seek ignored while seeking is disallowed");
                return;
            }
            if !time.is_finite() {
                warn!(time, "Seek ignored, time is not finite");
                return;
            }
            if let Some(backend) = core.backend.as_mut() {
                let target = time.max(0.0);
                core.seek.host_issued(target);
                backend.seek(target);
            }
        });
    }

    #[instrument(skip(self), fields(session_id = %self.session.id))]
    fn set_volume(&self, volume: f64) {
        self.session.with_core("set_volume", |core| {
            if !(0.0..=1.0).contains(&volume) {
                warn!(volume, "Volume outside [0, 1] ignored");
                return;
            }
            let Some(backend) = core.backend.as_mut() else {
                return;
            };
            backend.set_volume(volume);
            core.command_volume(volume);
        });
    }

    fn apply_css(&self, style: &StyleMap) {
        self.session.with_core("apply_css", |core| {
            if let Some(backend) = core.backend.as_mut() {
                backend.apply_style(style);
            }
        });
    }

    fn can_seek(&self) -> bool {
        self.session.core.borrow().seek.can_seek
    }

    fn set_can_seek(&self, allowed: bool) {
        self.session.with_core("set_can_seek", |core| {
            if core.seek.can_seek == allowed {
                return;
            }
            if allowed {
                core.seek.can_seek = true;
            } else {
                // A host seek still in flight is dropped with the permission
                let position = core.backend_time();
                core.seek.forbid(position);
            }
            debug!(allowed, anchor = core.seek.anchor, "Seeking permission changed");
        });
    }

    fn destroy(&self) {
        if !self.session.destroy() {
            debug!(session_id = %self.session.id, "Session already destroyed");
        }
    }
}

impl<B: MediaBackend + 'static> Drop for VideoWrapper<B> {
    fn drop(&mut self) {
        self.session.destroy();
    }
}

impl<B: MediaBackend + 'static> std::fmt::Debug for VideoWrapper<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoWrapper")
            .field("id", &self.session.id)
            .field("state", &self.state())
            .finish()
    }
}
