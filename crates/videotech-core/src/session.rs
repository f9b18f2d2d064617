//! Playback session - per-instance state behind a wrapper
//!
//! Coordinates:
//! - Native listener subscription and teardown
//! - Ordered delivery of native events through the translator
//! - Seek suppression and volume alias de-duplication
//! - State machine transitions driven by confirmed backend events
//!
//! Native events can arrive while the session is busy (a backend that emits
//! synchronously from inside a command, or a host that issues a command from
//! inside `notify`). Such events are queued in the inbox and drained in
//! emission order once the session is free again.

use crate::{
    backend::MediaBackend,
    channel::{ListenerId, MediaSnapshot, NativeEvent, NativeListener},
    config::FactoryConfig,
    event::{CanonicalEvent, EventKind},
    host::HostController,
    translator::TranslationTable,
    types::{SessionId, WrapperState},
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

/// Reverts issued for one native seek before its position is accepted
const MAX_REVERT_ATTEMPTS: u32 = 4;

/// Seek bookkeeping used to tell host-issued seeks from native-control seeks
#[derive(Debug, Clone)]
pub(crate) struct SeekGuard {
    /// Whether the host currently allows seeking
    pub can_seek: bool,
    /// Target of a seek issued through the wrapper, until a `seeked` arrives
    pub host_target: Option<f64>,
    /// A native-control seek passed through while seeking was allowed
    pub native_seek: bool,
    /// A disallowed native seek is being undone
    pub reverting: bool,
    /// Reverts issued since the guard last settled
    pub revert_attempts: u32,
    /// Last playhead observed while no native seek was in flight
    pub anchor: f64,
    /// Distance within which two positions count as the same
    pub tolerance: f64,
}

impl SeekGuard {
    fn new(tolerance: f64) -> Self {
        Self {
            can_seek: true,
            host_target: None,
            native_seek: false,
            reverting: false,
            revert_attempts: 0,
            anchor: 0.0,
            tolerance,
        }
    }

    /// No native seek is in flight. A pending host seek still anchors.
    fn settled(&self) -> bool {
        !self.native_seek && !self.reverting
    }

    fn near(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.tolerance
    }

    /// Whether a seek landing at `position` is the one the host asked for
    fn is_host_seek(&self, position: f64) -> bool {
        self.host_target.is_some_and(|target| self.near(target, position))
    }

    /// Record a seek issued through the wrapper
    pub fn host_issued(&mut self, target: f64) {
        self.host_target = Some(target);
        self.native_seek = false;
        self.reverting = false;
        self.revert_attempts = 0;
    }

    /// Forbid seeking from `position` on. A pending host seek is dropped.
    pub fn forbid(&mut self, position: f64) {
        self.can_seek = false;
        self.host_target = None;
        self.native_seek = false;
        self.reverting = false;
        self.revert_attempts = 0;
        self.anchor = position;
    }

    /// Forget every in-flight seek, anchoring at `position`
    pub fn reset(&mut self, position: f64) {
        self.host_target = None;
        self.native_seek = false;
        self.reverting = false;
        self.revert_attempts = 0;
        self.anchor = position;
    }

    fn settle(&mut self) {
        if self.reverting {
            debug!(anchor = self.anchor, "Native seek reverted");
        }
        self.reverting = false;
        self.revert_attempts = 0;
    }
}

/// Volume commanded through the wrapper, not yet confirmed by every alias
#[derive(Debug, Clone)]
pub(crate) struct PendingVolume {
    pub volume: f64,
    /// Native names that already reported this command
    pub reported_by: BTreeSet<String>,
}

/// Mutable per-session state
pub(crate) struct SessionCore<B> {
    pub backend: Option<B>,
    pub subscriptions: BTreeMap<String, ListenerId>,
    pub state: WrapperState,
    /// Source last handed to the backend
    pub source: Option<String>,
    /// Fills volume events from backends that do not report volume
    pub pending_volume: Option<PendingVolume>,
    /// Volume last notified to the host
    pub notified_volume: Option<f64>,
    pub volume_epsilon: f64,
    pub seek: SeekGuard,
}

impl<B: MediaBackend> SessionCore<B> {
    fn new(backend: B, source: Option<String>, config: &FactoryConfig) -> Self {
        Self {
            backend: Some(backend),
            subscriptions: BTreeMap::new(),
            state: WrapperState::Created,
            source,
            pending_volume: None,
            notified_volume: None,
            volume_epsilon: config.volume_epsilon,
            seek: SeekGuard::new(config.seek_tolerance),
        }
    }

    /// Apply a state transition, ignoring ones the table does not allow
    pub fn transition(&mut self, target: WrapperState) {
        if self.state == target {
            return;
        }
        if self.state.can_transition_to(target) {
            trace!(from = %self.state, to = %target, "State transition");
            self.state = target;
        } else {
            debug!(from = %self.state, to = %target, "Ignoring invalid state transition");
        }
    }

    /// Remember a volume sent to the backend
    pub fn command_volume(&mut self, volume: f64) {
        self.pending_volume = Some(PendingVolume {
            volume,
            reported_by: BTreeSet::new(),
        });
    }

    /// Current backend playhead, 0 once released
    pub fn backend_time(&self) -> f64 {
        self.backend
            .as_ref()
            .map(|b| b.current_time())
            .filter(|t| t.is_finite())
            .unwrap_or(0.0)
    }

    fn playhead_of(&self, snapshot: &MediaSnapshot) -> f64 {
        snapshot
            .current_time
            .filter(|t| t.is_finite())
            .unwrap_or_else(|| self.backend_time())
    }

    fn revert_seek(&mut self) {
        let anchor = self.seek.anchor;
        self.seek.reverting = true;
        self.seek.revert_attempts += 1;
        if let Some(backend) = self.backend.as_mut() {
            debug!(anchor, attempt = self.seek.revert_attempts, "Reverting native seek while seeking is disallowed");
            backend.seek(anchor);
        }
    }

    /// Keep the backend at the anchor while seeking is disallowed
    fn hold_anchor(&mut self, position: f64) {
        if self.seek.near(position, self.seek.anchor) {
            self.seek.settle();
            return;
        }
        if self.seek.revert_attempts >= MAX_REVERT_ATTEMPTS {
            warn!(
                position,
                anchor = self.seek.anchor,
                "Backend keeps leaving the anchor, accepting its position"
            );
            self.seek.settle();
            self.seek.anchor = position;
            return;
        }
        self.revert_seek();
    }

    fn on_seeking(&mut self, snapshot: &MediaSnapshot) -> bool {
        let position = self.playhead_of(snapshot);
        if self.seek.is_host_seek(position) {
            return true;
        }
        if !self.seek.can_seek {
            self.hold_anchor(position);
            return false;
        }
        self.seek.native_seek = true;
        true
    }

    fn on_seeked(&mut self, snapshot: &MediaSnapshot) -> bool {
        let position = self.playhead_of(snapshot);
        // Any `seeked` ends whatever seek the host had pending
        let host_seek = self.seek.is_host_seek(position);
        self.seek.host_target = None;

        if host_seek {
            self.seek.native_seek = false;
            self.seek.settle();
            self.seek.anchor = position;
            return true;
        }
        if !self.seek.can_seek {
            self.seek.native_seek = false;
            self.hold_anchor(position);
            return false;
        }
        self.seek.native_seek = false;
        self.seek.anchor = position;
        true
    }

    /// Filter one translated event. Returns false when it must not reach the host.
    fn admit(&mut self, event: &CanonicalEvent, snapshot: &MediaSnapshot) -> bool {
        match event.kind {
            EventKind::Seeking => self.on_seeking(snapshot),
            EventKind::Seeked => self.on_seeked(snapshot),
            EventKind::TimeUpdate if self.seek.reverting => {
                // The revert may land without a `seeked` of its own
                let position = self.playhead_of(snapshot);
                if self.seek.near(position, self.seek.anchor) {
                    self.seek.settle();
                }
                false
            }
            kind if kind.is_playhead() => {
                if self.seek.settled() {
                    if let Some(playhead) = event.playhead() {
                        self.seek.anchor = playhead.current_time;
                    }
                }
                true
            }
            EventKind::VolumeChange => {
                // Without a known volume aliases cannot be told apart
                let Some(volume) = snapshot.volume.filter(|v| v.is_finite()) else {
                    self.notified_volume = None;
                    return true;
                };
                match self.notified_volume {
                    Some(last) if (last - volume).abs() <= self.volume_epsilon => false,
                    _ => {
                        self.notified_volume = Some(volume);
                        true
                    }
                }
            }
            _ => true,
        }
    }

    fn advance(&mut self, kind: EventKind) {
        match kind {
            EventKind::Play | EventKind::Playing => self.transition(WrapperState::Playing),
            EventKind::Paused | EventKind::Ended => self.transition(WrapperState::Paused),
            EventKind::Buffered
                if matches!(self.state, WrapperState::Subscribed | WrapperState::Loading) =>
            {
                self.transition(WrapperState::Ready)
            }
            _ => {}
        }
    }

    /// Detach every native listener. Returns how many were attached.
    pub fn unsubscribe_all(&mut self, session_id: &SessionId) -> usize {
        let subscriptions = std::mem::take(&mut self.subscriptions);
        if let Some(backend) = self.backend.as_mut() {
            for (name, id) in &subscriptions {
                if !backend.unsubscribe(name, *id) {
                    warn!(session_id = %session_id, native = %name, "Listener was already detached");
                }
            }
        }
        subscriptions.len()
    }

    /// Translate and reconcile one native event
    pub fn reconcile(
        &mut self,
        mut event: NativeEvent,
        table: &TranslationTable,
    ) -> Option<CanonicalEvent> {
        // Fill what the backend left out with what the wrapper knows
        if event.target.src.is_none() {
            event.target.src = self
                .backend
                .as_ref()
                .and_then(|b| b.source())
                .or_else(|| self.source.clone());
        }
        if event.target.volume.is_none() && table.kind_of(&event.name) == Some(EventKind::VolumeChange) {
            // Each alias may report a commanded volume once
            if let Some(pending) = self.pending_volume.as_mut() {
                if pending.reported_by.insert(event.name.clone()) {
                    event.target.volume = Some(pending.volume);
                }
            }
        }

        let Some(canonical) = table.translate(&event) else {
            trace!(native = %event.name, "Unbound native event");
            return None;
        };

        if !self.admit(&canonical, &event.target) {
            debug!(native = %event.name, kind = %canonical.kind, "Suppressed native event");
            return None;
        }

        self.advance(canonical.kind);
        Some(canonical)
    }
}

/// Shared session behind a wrapper. Native listeners hold it weakly.
pub(crate) struct Session<B> {
    pub id: SessionId,
    host: Weak<dyn HostController>,
    table: Rc<TranslationTable>,
    live: Cell<bool>,
    draining: Cell<bool>,
    inbox: RefCell<VecDeque<NativeEvent>>,
    pub core: RefCell<SessionCore<B>>,
}

impl<B: MediaBackend + 'static> Session<B> {
    pub fn new(
        id: SessionId,
        backend: B,
        host: Weak<dyn HostController>,
        table: Rc<TranslationTable>,
        config: &FactoryConfig,
        source: Option<String>,
    ) -> Rc<Self> {
        Rc::new(Self {
            id,
            host,
            table,
            live: Cell::new(true),
            draining: Cell::new(false),
            inbox: RefCell::new(VecDeque::new()),
            core: RefCell::new(SessionCore::new(backend, source, config)),
        })
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Attach one listener per native name in the translation table
    pub fn subscribe_all(self: &Rc<Self>) {
        let names: Vec<String> = self.table.native_names().map(str::to_owned).collect();
        let mut core = self.core.borrow_mut();
        let Some(backend) = core.backend.as_mut() else {
            return;
        };

        let mut subscriptions = BTreeMap::new();
        for name in names {
            let weak = Rc::downgrade(self);
            let listener: NativeListener = Rc::new(move |event: &NativeEvent| {
                if let Some(session) = weak.upgrade() {
                    session.deliver(event.clone());
                }
            });
            let id = backend.subscribe(&name, listener);
            subscriptions.insert(name, id);
        }

        debug!(session_id = %self.id, listeners = subscriptions.len(), "Subscribed to native events");
        core.subscriptions = subscriptions;
        core.transition(WrapperState::Subscribed);
    }

    /// Run a command against the live session, then flush queued events
    pub fn with_core<R>(&self, op: &str, f: impl FnOnce(&mut SessionCore<B>) -> R) -> Option<R> {
        if !self.live.get() {
            debug!(session_id = %self.id, op, "Operation on destroyed session ignored");
            return None;
        }
        let result = {
            let mut core = self.core.borrow_mut();
            f(&mut *core)
        };
        self.drain();
        Some(result)
    }

    /// Entry point for native listeners
    pub fn deliver(&self, event: NativeEvent) {
        if !self.live.get() {
            trace!(session_id = %self.id, native = %event.name, "Dropping in-flight event");
            return;
        }
        self.inbox.borrow_mut().push_back(event);
        self.drain();
    }

    fn drain(&self) {
        if self.draining.replace(true) {
            return;
        }

        loop {
            if !self.live.get() {
                self.inbox.borrow_mut().clear();
                break;
            }
            let Some(event) = self.inbox.borrow_mut().pop_front() else {
                break;
            };
            let outcome = match self.core.try_borrow_mut() {
                Ok(mut core) => core.reconcile(event, &self.table),
                Err(_) => {
                    // A command is running; it drains once it returns
                    self.inbox.borrow_mut().push_front(event);
                    break;
                }
            };
            if let Some(canonical) = outcome {
                self.notify(canonical);
            }
        }

        self.draining.set(false);
    }

    fn notify(&self, event: CanonicalEvent) {
        if !self.live.get() {
            return;
        }
        match self.host.upgrade() {
            Some(host) => {
                trace!(session_id = %self.id, kind = %event.kind, "Notifying host");
                host.notify(event.kind, event.payload.as_ref());
            }
            None => debug!(session_id = %self.id, kind = %event.kind, "Host controller gone, notification dropped"),
        }
    }

    /// Stop notifications, detach every listener, then release the backend.
    /// Returns false if the session was already destroyed.
    pub fn destroy(&self) -> bool {
        if !self.live.replace(false) {
            return false;
        }
        self.inbox.borrow_mut().clear();

        let mut core = self.core.borrow_mut();
        if let Some(backend) = core.backend.as_mut() {
            backend.pause();
            backend.set_source("");
        }
        let detached = core.unsubscribe_all(&self.id);
        if let Some(mut backend) = core.backend.take() {
            backend.release();
        }
        core.transition(WrapperState::Destroyed);

        info!(session_id = %self.id, listeners = detached, "Session destroyed");
        true
    }
}
