//! Videotech Core - Pluggable video technology adapters
//!
//! This crate lets a player controller drive heterogeneous playback
//! backends through one normalized interface:
//! - Capability descriptors and technology factories
//! - Backend event channel and control boundary
//! - Native-to-canonical event translation
//! - Per-session state machine with seek suppression and volume de-duplication
//! - Explicit technology registry
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Videotech Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐        ┌──────────────┐                       │
//! │  │  Technology  │───────▶│   Factory    │──── Capability        │
//! │  │   Registry   │        └──────┬───────┘     Descriptor        │
//! │  └──────────────┘               │ create                        │
//! │                          ┌──────┴───────┐     ┌──────────────┐  │
//! │   host ◀── notify ───────│   Wrapper    │────▶│    Event     │  │
//! │   host ─── commands ────▶│  (Session)   │◀────│  Translator  │  │
//! │                          └──────┬───────┘     └──────────────┘  │
//! │                                 │ subscribe / control           │
//! │                          ┌──────┴───────┐                       │
//! │                          │   Backend    │                       │
//! │                          │ Event Channel│                       │
//! │                          └──────────────┘                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use videotech_core::sim::SimulatedProvider;
//! use videotech_core::{
//!     downgrade_host, EventKind, FactoryConfig, PlaybackControl, RecordingHost, SessionId, StyleMap,
//!     VideoFactory,
//! };
//!
//! let provider = SimulatedProvider::new();
//! let factory = VideoFactory::new(provider.clone(), FactoryConfig::default()).unwrap();
//! let host = Rc::new(RecordingHost::new());
//!
//! let wrapper = factory
//!     .create(&(), "video.mp4", SessionId::from("main"), downgrade_host(&host), &StyleMap::new())
//!     .unwrap();
//! wrapper.play();
//!
//! let backend = provider.last().unwrap();
//! backend.emit("play");
//! backend.emit("playing");
//! assert_eq!(host.kinds(), vec![EventKind::Play, EventKind::Playing]);
//! ```

pub mod error;
pub mod types;
pub mod capability;
pub mod event;
pub mod channel;
pub mod backend;
pub mod translator;
pub mod host;
pub mod config;
mod session;
pub mod wrapper;
pub mod factory;
pub mod registry;
pub mod sim;

pub use error::{Error, Result};
pub use types::{stream_encoding, SessionId, StyleMap, WrapperState};
pub use capability::CapabilityDescriptor;
pub use event::{CanonicalEvent, EventKind, EventPayload, Playhead, SeekRange};
pub use channel::{EventChannel, ListenerId, MediaSnapshot, NativeEvent, NativeListener, TimeRange};
pub use backend::{BackendProvider, MediaBackend};
pub use translator::{Binding, PayloadRule, TranslationTable, DEFAULT_ERROR_CODE};
pub use host::{downgrade_host, HostController, RecordingHost};
#[cfg(feature = "channel")]
pub use host::ChannelHost;
pub use config::FactoryConfig;
pub use wrapper::{PlaybackControl, VideoWrapper};
pub use factory::{VideoFactory, VideoTechnology};
pub use registry::TechRegistry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "Videotech Core initialized");
}
