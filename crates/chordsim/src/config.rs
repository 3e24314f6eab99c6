//! TOML configuration for the `chordsim` driver.

use std::path::Path;

use chord_sim::SimConfig;
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring parameter and initial membership.
    pub ring: RingSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Ring parameter M.
    pub bits: u8,
    /// Largest M accepted by the session.
    pub max_bits: u8,
    /// RNG seed for reproducible runs.
    pub seed: Option<u64>,
    /// Members added with explicit identifiers, in order.
    pub nodes: Vec<u32>,
    /// Members added with random identifiers after `nodes`.
    pub random_nodes: usize,
}

impl Default for RingSection {
    fn default() -> Self {
        let sim = SimConfig::default();
        Self {
            bits: sim.bits,
            max_bits: sim.max_bits,
            seed: sim.seed,
            nodes: Vec::new(),
            random_nodes: 0,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Session parameters for [`chord_sim::Simulation::new`].
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            bits: self.ring.bits,
            max_bits: self.ring.max_bits,
            seed: self.ring.seed,
        }
    }
}
