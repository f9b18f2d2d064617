//! Video technology factory
//!
//! The single point a host queries to discover a technology: advertises the
//! capability descriptor, builds backend handles through a
//! [`BackendProvider`] and hands back subscribed wrappers.

use crate::{
    backend::BackendProvider,
    capability::CapabilityDescriptor,
    config::FactoryConfig,
    host::HostController,
    session::Session,
    translator::TranslationTable,
    types::{stream_encoding, SessionId, StyleMap},
    wrapper::{PlaybackControl, VideoWrapper},
    Error, Result,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// Object-safe factory surface used by the registry
pub trait VideoTechnology<C> {
    fn capability(&self) -> CapabilityDescriptor;

    fn create_session(
        &self,
        container: &C,
        stream_url: &str,
        id: SessionId,
        host: Weak<dyn HostController>,
        style: &StyleMap,
    ) -> Result<Box<dyn PlaybackControl>>;

    /// Retire the technology. Existing sessions are left to their owners.
    fn destroy(&self);
}

/// Factory creating wrappers around backends built by `P`
pub struct VideoFactory<P: BackendProvider> {
    provider: P,
    config: FactoryConfig,
    table: Rc<TranslationTable>,
    capability: RefCell<CapabilityDescriptor>,
    sessions: RefCell<BTreeMap<SessionId, Weak<Session<P::Backend>>>>,
}

impl<P: BackendProvider> VideoFactory<P> {
    /// Factory with the HTML5 translation table
    pub fn new(provider: P, config: FactoryConfig) -> Result<Self> {
        Self::with_table(provider, config, TranslationTable::html5())
    }

    /// Factory with a custom translation table
    pub fn with_table(provider: P, config: FactoryConfig, table: TranslationTable) -> Result<Self> {
        let config = config.validate()?;
        let capability = config.capability();
        info!(
            technology = %capability.technology_name(),
            encodings = ?capability.supported_encodings(),
            "Video technology ready"
        );
        Ok(Self {
            provider,
            config,
            table: Rc::new(table),
            capability: RefCell::new(capability),
            sessions: RefCell::new(BTreeMap::new()),
        })
    }

    pub fn name(&self) -> String {
        self.capability.borrow().technology_name().to_string()
    }

    pub fn is_ready(&self) -> bool {
        self.capability.borrow().is_ready()
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Sessions created by this factory that are not destroyed yet
    pub fn live_sessions(&self) -> usize {
        self.prune();
        self.sessions.borrow().len()
    }

    fn prune(&self) {
        self.sessions
            .borrow_mut()
            .retain(|_, session| session.upgrade().is_some_and(|s| s.is_live()));
    }

    /// Build a backend for `stream_url`, wrap it and subscribe to its events
    pub fn create(
        &self,
        container: &P::Container,
        stream_url: &str,
        id: SessionId,
        host: Weak<dyn HostController>,
        style: &StyleMap,
    ) -> Result<VideoWrapper<P::Backend>> {
        let (technology, ready) = {
            let caps = self.capability.borrow();
            (caps.technology_name().to_string(), caps.is_ready())
        };
        if !ready {
            debug!(technology = %technology, "Create called on retired technology");
            return Err(Error::FactoryRetired(technology));
        }

        let encoding = stream_encoding(stream_url)?.unwrap_or_default();
        if !self.capability.borrow().supports(&encoding) {
            warn!(technology = %technology, encoding = %encoding, url = stream_url, "Unsupported stream encoding");
            return Err(Error::UnsupportedEncoding {
                technology,
                encoding,
            });
        }

        self.prune();
        if self.sessions.borrow().contains_key(&id) {
            return Err(Error::DuplicateSession(id.to_string()));
        }

        let backend = self.provider.build(container, stream_url, &encoding)?;
        let wrapper = VideoWrapper::new(
            id.clone(),
            backend,
            host,
            Rc::clone(&self.table),
            &self.config,
            Some(stream_url.to_string()),
        );
        if !style.is_empty() {
            wrapper.apply_css(style);
        }

        self.sessions.borrow_mut().insert(id.clone(), wrapper.downgrade());
        info!(technology = %technology, session_id = %id, url = stream_url, encoding = %encoding, "Session created");
        Ok(wrapper)
    }

    /// Retire the technology. Idempotent; `create` fails from now on.
    pub fn destroy(&self) {
        let technology = self.name();
        if self.capability.borrow_mut().retire() {
            info!(technology = %technology, "Video technology retired");
        } else {
            debug!(technology = %technology, "Video technology already retired");
        }
    }
}

impl<P: BackendProvider> VideoTechnology<P::Container> for VideoFactory<P> {
    fn capability(&self) -> CapabilityDescriptor {
        self.capability.borrow().clone()
    }

    fn create_session(
        &self,
        container: &P::Container,
        stream_url: &str,
        id: SessionId,
        host: Weak<dyn HostController>,
        style: &StyleMap,
    ) -> Result<Box<dyn PlaybackControl>> {
        let wrapper = self.create(container, stream_url, id, host, style)?;
        Ok(Box::new(wrapper))
    }

    fn destroy(&self) {
        VideoFactory::destroy(self)
    }
}

impl<P: BackendProvider> std::fmt::Debug for VideoFactory<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFactory")
            .field("capability", &*self.capability.borrow())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{downgrade_host, RecordingHost};
    use crate::sim::SimulatedProvider;

    fn factory() -> (VideoFactory<SimulatedProvider>, SimulatedProvider) {
        let provider = SimulatedProvider::new();
        let factory = VideoFactory::new(provider.clone(), FactoryConfig::default()).unwrap();
        (factory, provider)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FactoryConfig::new("", ["mp4"]);
        assert!(matches!(
            VideoFactory::new(SimulatedProvider::new(), config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_encoding_matches_path_not_query() {
        let (factory, provider) = factory();
        let host = Rc::new(RecordingHost::new());

        let wrapper = factory.create(
            &(),
            "https://cdn.example.com/vod/clip.MP4?sig=abc.mpd",
            SessionId::from("a"),
            downgrade_host(&host),
            &StyleMap::new(),
        );
        assert!(wrapper.is_ok());
        assert_eq!(provider.built().len(), 1);
    }

    #[test]
    fn test_url_without_extension_unsupported() {
        let (factory, _) = factory();
        let host = Rc::new(RecordingHost::new());
        let result = factory.create(
            &(),
            "https://cdn.example.com/live",
            SessionId::from("a"),
            downgrade_host(&host),
            &StyleMap::new(),
        );
        match result {
            Err(Error::UnsupportedEncoding { encoding, .. }) => assert!(encoding.is_empty()),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_live_sessions_pruned() {
        let (factory, _) = factory();
        let host = Rc::new(RecordingHost::new());
        let a = factory
            .create(&(), "a.mp4", SessionId::from("a"), downgrade_host(&host), &StyleMap::new())
            .unwrap();
        let b = factory
            .create(&(), "b.m3u8", SessionId::from("b"), downgrade_host(&host), &StyleMap::new())
            .unwrap();
        assert_eq!(factory.live_sessions(), 2);

        a.destroy();
        assert_eq!(factory.live_sessions(), 1);
        drop(b);
        assert_eq!(factory.live_sessions(), 0);
    }

    #[test]
    fn test_destroy_idempotent() {
        let (factory, _) = factory();
        assert!(factory.is_ready());
        factory.destroy();
        factory.destroy();
        assert!(!factory.is_ready());
        assert_eq!(factory.name(), "html5");
    }
}
