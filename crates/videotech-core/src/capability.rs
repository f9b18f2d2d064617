//! Capability descriptor advertised by a video technology

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Static metadata describing what a technology can play.
///
/// Retirement is permanent: once `ready` is cleared it never comes back and
/// the encoding set stays empty. A fresh factory is needed to re-register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    technology_name: String,
    supported_encodings: BTreeSet<String>,
    ready: bool,
}

impl CapabilityDescriptor {
    /// Create a ready descriptor
    pub fn new<I, S>(technology_name: impl Into<String>, encodings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            technology_name: technology_name.into(),
            supported_encodings: encodings
                .into_iter()
                .map(|e| e.into().to_ascii_lowercase())
                .collect(),
            ready: true,
        }
    }

    pub fn technology_name(&self) -> &str {
        &self.technology_name
    }

    pub fn supported_encodings(&self) -> &BTreeSet<String> {
        &self.supported_encodings
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether a stream with this encoding can be created right now
    pub fn supports(&self, encoding: &str) -> bool {
        self.ready && self.supported_encodings.contains(&encoding.to_ascii_lowercase())
    }

    /// Clear readiness and encodings. Returns false if already retired.
    pub(crate) fn retire(&mut self) -> bool {
        let was_ready = self.ready;
        self.ready = false;
        self.supported_encodings.clear();
        was_ready
    }
}
