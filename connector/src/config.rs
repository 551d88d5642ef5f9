//! Connector configuration, loaded once per process and immutable afterwards

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::adapter::ReturnCodePolicy;
use crate::error::{DeliveryError, Result};
use crate::transport::TransportConfig;

/// Top-level connector configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    /// Short-circuit recognized fake data instead of calling partners.
    /// Must never be set outside test environments.
    #[serde(default)]
    pub stub_mode: bool,

    /// Foreigner-registry partner (AGDREF)
    pub agdref: PartnerConfig,

    /// Reception-system partner (DNA)
    pub dna: PartnerConfig,
}

/// Per-partner configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerConfig {
    /// Administratively disable the whole partner connector
    #[serde(default)]
    pub disabled: bool,

    /// Handler names operators marked as to-be-skipped
    #[serde(default)]
    pub skip_flows: BTreeSet<String>,

    /// Endpoint settings
    pub transport: TransportConfig,

    /// Return-code partition
    #[serde(default)]
    pub codes: ReturnCodePolicy,
}

impl ConnectorConfig {
    /// Load from a file, with `CONNECTOR__*` environment overrides layered on
    pub fn load(path: &Path) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("CONNECTOR").separator("__"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| DeliveryError::Configuration(format!("connector configuration: {e}")))
    }
}
