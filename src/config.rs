//! Overlay configuration.

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{SubrasterError, SubrasterResult};
use crate::region::partition::{DEFAULT_MAX_REGIONS, PartitionOpts, TolerancePolicy};

/// Settings for region partitioning, buffer layout and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Maximum number of regions per overlay, must be >= 1.
    pub max_regions: usize,

    /// Proximity tolerance used when merging fragments.
    pub tolerance: TolerancePolicy,

    /// Region buffer rows are padded to a multiple of this many bytes (1 = tight).
    pub row_alignment: usize,

    /// Logging configuration, consumed by [`crate::logging::init_logging`].
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "subraster=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_regions: DEFAULT_MAX_REGIONS,
            tolerance: TolerancePolicy::default(),
            row_alignment: 1,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl OverlayConfig {
    /// Check value ranges.
    pub fn validate(&self) -> SubrasterResult<()> {
        if self.max_regions == 0 {
            return Err(SubrasterError::validation("max_regions must be >= 1"));
        }
        if self.row_alignment == 0 {
            return Err(SubrasterError::validation("row_alignment must be >= 1"));
        }
        self.tolerance.validate()
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> SubrasterResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    pub fn from_path(path: &Path) -> SubrasterResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read overlay config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Partitioning parameters derived from this configuration.
    pub fn partition_opts(&self) -> PartitionOpts {
        PartitionOpts {
            max_regions: self.max_regions,
            tolerance: self.tolerance,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
