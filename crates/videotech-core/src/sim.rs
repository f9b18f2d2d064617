//! In-memory simulated backend
//!
//! Records every command and lets callers emit native events by hand, so a
//! session can be driven through exact native event sequences without a
//! real media engine. Handles are cheap clones sharing one state.

use crate::{
    backend::{BackendProvider, MediaBackend},
    channel::{EventChannel, ListenerId, MediaSnapshot, NativeEvent, NativeListener, TimeRange},
    types::StyleMap,
    Error, Result,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Command received by a simulated backend
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetSource(String),
    Load,
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    ApplyStyle(StyleMap),
    Release,
}

#[derive(Default)]
struct SimState {
    src: Option<String>,
    current_time: f64,
    duration: Option<f64>,
    volume: f64,
    paused: bool,
    fullscreen: bool,
    error_code: Option<i32>,
    buffered_end: Option<f64>,
    /// Report only what a minimal plugin backend would
    sparse: bool,
    style: StyleMap,
    released: bool,
    next_listener: u64,
    listeners: BTreeMap<ListenerId, (String, NativeListener)>,
    commands: Vec<Command>,
}

/// Scriptable backend handle
#[derive(Clone)]
pub struct SimulatedBackend {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                volume: 1.0,
                paused: true,
                ..Default::default()
            })),
        }
    }

    /// Backend whose snapshots only carry the source
    pub fn sparse() -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().sparse = true;
        backend
    }

    pub fn with_duration(self, duration: f64) -> Self {
        self.state.borrow_mut().duration = Some(duration);
        self
    }

    /// Snapshot as the backend would report it right now
    pub fn snapshot(&self) -> MediaSnapshot {
        let state = self.state.borrow();
        if state.sparse {
            return MediaSnapshot {
                src: state.src.clone(),
                ..Default::default()
            };
        }
        MediaSnapshot {
            src: state.src.clone(),
            error_code: state.error_code,
            volume: Some(state.volume),
            current_time: Some(state.current_time),
            duration: state.duration,
            buffered_end: state.buffered_end,
            seekable: state.duration.map(|end| TimeRange { start: 0.0, end }),
            paused: Some(state.paused),
            fullscreen: Some(state.fullscreen),
        }
    }

    /// Deliver a native event to every listener attached for `name`
    pub fn emit(&self, name: &str) {
        self.emit_event(NativeEvent::new(name, self.snapshot()));
    }

    /// Deliver an explicit native event
    pub fn emit_event(&self, event: NativeEvent) {
        // Listeners may call back into the backend
        let listeners: Vec<NativeListener> = self
            .state
            .borrow()
            .listeners
            .values()
            .filter(|(name, _)| *name == event.name)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Simulate the user dragging the native scrubber
    pub fn user_seek(&self, time: f64) {
        self.state.borrow_mut().current_time = time;
        self.emit("seeking");
    }

    /// Advance the playhead and emit `timeupdate`
    pub fn advance_to(&self, time: f64) {
        {
            let mut state = self.state.borrow_mut();
            state.current_time = time;
            state.buffered_end = Some(state.buffered_end.unwrap_or(0.0).max(time));
        }
        self.emit("timeupdate");
    }

    pub fn set_error(&self, code: Option<i32>) {
        self.state.borrow_mut().error_code = code;
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.state.borrow_mut().fullscreen = fullscreen;
    }

    /// Change volume as the native controls would, without a wrapper command
    pub fn set_native_volume(&self, volume: f64) {
        self.state.borrow_mut().volume = volume;
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    /// Number of attached listeners across all native names
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    pub fn is_released(&self) -> bool {
        self.state.borrow().released
    }

    pub fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    pub fn style(&self) -> StyleMap {
        self.state.borrow().style.clone()
    }

    fn record(&self, command: Command) {
        self.state.borrow_mut().commands.push(command);
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EventChannel for SimulatedBackend {
    fn subscribe(&mut self, event: &str, listener: NativeListener) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.insert(id, (event.to_string(), listener));
        id
    }

    fn unsubscribe(&mut self, event: &str, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        match state.listeners.get(&id) {
            Some((name, _)) if name == event => state.listeners.remove(&id).is_some(),
            _ => false,
        }
    }
}

impl MediaBackend for SimulatedBackend {
    fn set_source(&mut self, url: &str) -> bool {
        self.record(Command::SetSource(url.to_string()));
        let mut state = self.state.borrow_mut();
        if url.is_empty() {
            state.src = None;
            return false;
        }
        state.src = Some(url.to_string());
        state.current_time = 0.0;
        true
    }

    fn source(&self) -> Option<String> {
        self.state.borrow().src.clone()
    }

    fn load(&mut self) {
        self.record(Command::Load);
        self.state.borrow_mut().paused = true;
    }

    fn play(&mut self) {
        self.record(Command::Play);
        self.state.borrow_mut().paused = false;
    }

    fn pause(&mut self) {
        self.record(Command::Pause);
        self.state.borrow_mut().paused = true;
    }

    fn seek(&mut self, time: f64) {
        self.record(Command::Seek(time));
        self.state.borrow_mut().current_time = time;
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_volume(&mut self, volume: f64) {
        self.record(Command::SetVolume(volume));
        self.state.borrow_mut().volume = volume;
    }

    fn apply_style(&mut self, style: &StyleMap) {
        self.record(Command::ApplyStyle(style.clone()));
        let mut state = self.state.borrow_mut();
        for (key, value) in style {
            state.style.insert(key.clone(), value.clone());
        }
    }

    fn release(&mut self) {
        self.record(Command::Release);
        let mut state = self.state.borrow_mut();
        state.released = true;
        state.listeners.clear();
    }
}

/// Provider handing out simulated backends. Clones share the build log.
#[derive(Clone, Default)]
pub struct SimulatedProvider {
    built: Rc<RefCell<Vec<SimulatedBackend>>>,
    fail_with: Option<String>,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose builds always fail
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Every backend built so far, oldest first
    pub fn built(&self) -> Vec<SimulatedBackend> {
        self.built.borrow().clone()
    }

    pub fn last(&self) -> Option<SimulatedBackend> {
        self.built.borrow().last().cloned()
    }
}

impl BackendProvider for SimulatedProvider {
    type Container = ();
    type Backend = SimulatedBackend;

    fn build(&self, _container: &(), stream_url: &str, _encoding: &str) -> Result<SimulatedBackend> {
        if let Some(reason) = &self.fail_with {
            return Err(Error::backend(reason.clone()));
        }
        let mut backend = SimulatedBackend::new();
        backend.set_source(stream_url);
        backend.clear_commands();
        self.built.borrow_mut().push(backend.clone());
        Ok(backend)
    }
}
