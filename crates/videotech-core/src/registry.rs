//! Explicit technology registry
//!
//! Built once at startup and handed to whatever composes the host, instead
//! of technologies registering themselves into ambient global state.

use crate::{
    capability::CapabilityDescriptor,
    factory::VideoTechnology,
    host::HostController,
    types::{stream_encoding, SessionId, StyleMap},
    wrapper::PlaybackControl,
    Error, Result,
};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use tracing::{debug, info};

/// Technologies available to a host, keyed by technology name
pub struct TechRegistry<C> {
    technologies: BTreeMap<String, Rc<dyn VideoTechnology<C>>>,
}

impl<C> TechRegistry<C> {
    pub fn new() -> Self {
        Self {
            technologies: BTreeMap::new(),
        }
    }

    /// Register a technology under its advertised name
    pub fn register(&mut self, technology: Rc<dyn VideoTechnology<C>>) -> Result<()> {
        let name = technology.capability().technology_name().to_string();
        if self.technologies.contains_key(&name) {
            return Err(Error::DuplicateTechnology(name));
        }
        info!(technology = %name, "Technology registered");
        self.technologies.insert(name, technology);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn VideoTechnology<C>>> {
        self.technologies.get(name).cloned()
    }

    /// Registered names in order
    pub fn names(&self) -> Vec<String> {
        self.technologies.keys().cloned().collect()
    }

    /// Capability descriptors of every registered technology
    pub fn capabilities(&self) -> Vec<CapabilityDescriptor> {
        self.technologies.values().map(|t| t.capability()).collect()
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    /// First ready technology, by name, able to play `stream_url`
    pub fn select_for(&self, stream_url: &str) -> Result<Option<Rc<dyn VideoTechnology<C>>>> {
        let Some(encoding) = stream_encoding(stream_url)? else {
            return Ok(None);
        };
        let selected = self
            .technologies
            .values()
            .find(|t| t.capability().supports(&encoding))
            .cloned();
        debug!(
            encoding = %encoding,
            technology = ?selected.as_ref().map(|t| t.capability().technology_name().to_string()),
            "Technology selection"
        );
        Ok(selected)
    }

    /// Create a session on the named technology
    pub fn create(
        &self,
        name: &str,
        container: &C,
        stream_url: &str,
        id: SessionId,
        host: Weak<dyn HostController>,
        style: &StyleMap,
    ) -> Result<Box<dyn PlaybackControl>> {
        let technology = self
            .get(name)
            .ok_or_else(|| Error::UnknownTechnology(name.to_string()))?;
        technology.create_session(container, stream_url, id, host, style)
    }

    /// Retire one technology. It stays registered but is never selected again.
    pub fn retire(&self, name: &str) -> Result<()> {
        let technology = self
            .get(name)
            .ok_or_else(|| Error::UnknownTechnology(name.to_string()))?;
        technology.destroy();
        Ok(())
    }
}

impl<C> Default for TechRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryConfig;
    use crate::factory::VideoFactory;
    use crate::host::{downgrade_host, RecordingHost};
    use crate::sim::SimulatedProvider;

    fn technology(name: &str, encodings: &[&str]) -> Rc<VideoFactory<SimulatedProvider>> {
        let config = FactoryConfig::new(name, encodings.iter().copied());
        Rc::new(VideoFactory::new(SimulatedProvider::new(), config).unwrap())
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry: TechRegistry<()> = TechRegistry::new();
        assert!(registry.is_empty());
        registry.register(technology("html5", &["mp4"])).unwrap();
        assert!(matches!(
            registry.register(technology("html5", &["m3u8"])),
            Err(Error::DuplicateTechnology(name)) if name == "html5"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_select_skips_retired() {
        let mut registry: TechRegistry<()> = TechRegistry::new();
        registry.register(technology("a", &["mp4"])).unwrap();
        registry.register(technology("b", &["mp4", "webm"])).unwrap();

        let name = |r: &TechRegistry<()>, url: &str| {
            r.select_for(url)
                .unwrap()
                .map(|t| t.capability().technology_name().to_string())
        };
        assert_eq!(name(&registry, "x.mp4").as_deref(), Some("a"));
        registry.retire("a").unwrap();
        assert_eq!(name(&registry, "x.mp4").as_deref(), Some("b"));
        assert_eq!(name(&registry, "x.webm").as_deref(), Some("b"));
        assert_eq!(name(&registry, "x.ogg"), None);
    }

    #[test]
    fn test_create_unknown_technology() {
        let registry: TechRegistry<()> = TechRegistry::new();
        let host = Rc::new(RecordingHost::new());
        let result = registry.create(
            "flash",
            &(),
            "x.flv",
            SessionId::from("s"),
            downgrade_host(&host),
            &StyleMap::new(),
        );
        assert!(matches!(result, Err(Error::UnknownTechnology(_))));
    }
}
