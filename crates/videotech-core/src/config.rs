//! Factory configuration

use crate::{capability::CapabilityDescriptor, Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration of one video technology factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Name the technology registers under
    pub technology_name: String,
    /// Stream encodings the technology can play (file extensions)
    pub encodings: Vec<String>,
    /// Distance in seconds at which a reverted seek counts as settled
    pub seek_tolerance: f64,
    /// Volume differences below this are treated as the same volume
    pub volume_epsilon: f64,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            technology_name: "html5".to_string(),
            encodings: vec!["m3u8".to_string(), "mp4".to_string()],
            seek_tolerance: 0.5,
            volume_epsilon: 0.001,
        }
    }
}

impl FactoryConfig {
    /// Config for a technology with the default tolerances
    pub fn new<I, S>(technology_name: impl Into<String>, encodings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            technology_name: technology_name.into(),
            encodings: encodings.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FactoryConfig = serde_json::from_str(json)?;
        config.validate()
    }

    /// Check invariants and normalise encodings to lowercase without a dot
    pub fn validate(mut self) -> Result<Self> {
        if self.technology_name.trim().is_empty() {
            return Err(Error::InvalidConfig("technology_name must not be empty".into()));
        }

        self.encodings = self
            .encodings
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self.encodings.sort();
        self.encodings.dedup();
        if self.encodings.is_empty() {
            return Err(Error::InvalidConfig("at least one encoding is required".into()));
        }

        for (name, value) in [
            ("seek_tolerance", self.seek_tolerance),
            ("volume_epsilon", self.volume_epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        Ok(self)
    }

    /// Capability descriptor this config advertises
    pub fn capability(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(self.technology_name.clone(), self.encodings.iter().cloned())
    }
}
