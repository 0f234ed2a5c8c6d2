pub mod messages;

pub use messages::{MessageKey, Messages};

use crate::core::{Result, RtpError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Region used when neither the arguments nor the world name one.
pub const DEFAULT_REGION: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Log every command invocation and each processed target
    pub command: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceConfig {
    /// Run every placement job inline instead of queueing it
    pub sync_loading: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EconomyConfig {
    pub price: f64,
    pub other_price: f64,
    pub params_price: f64,
    pub biome_price: f64,
    pub balance_floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Default region for requests resolved through this world
    pub region: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
        }
    }
}

/// Typed configuration store consumed by the command pipeline.
///
/// Every section defaults, so a partial JSON document is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RtpConfig {
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub economy: EconomyConfig,
    pub worlds: HashMap<String, WorldConfig>,
    pub messages: Messages,
}

impl RtpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable verbose command logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.logging.command = verbose;
        self
    }

    /// Prefer inline placement over the setup queue
    pub fn sync_loading(mut self, sync_loading: bool) -> Self {
        self.performance.sync_loading = sync_loading;
        self
    }

    pub fn economy(mut self, economy: EconomyConfig) -> Self {
        self.economy = economy;
        self
    }

    /// Configure a world and its default region
    pub fn world(mut self, world: &str, region: &str) -> Self {
        self.worlds.insert(
            world.to_string(),
            WorldConfig {
                region: region.to_string(),
            },
        );
        self
    }

    pub fn message(mut self, key: MessageKey, template: &str) -> Self {
        self.messages = self.messages.set(key, template);
        self
    }

    pub fn world_config(&self, world: &str) -> Option<&WorldConfig> {
        self.worlds.get(world)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let eco = &self.economy;
        let prices = [
            ("price", eco.price),
            ("otherPrice", eco.other_price),
            ("paramsPrice", eco.params_price),
            ("biomePrice", eco.biome_price),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value < 0.0 {
                return Err(RtpError::Config(format!(
                    "economy.{} must be a non-negative number",
                    name
                )));
            }
        }

        if !eco.balance_floor.is_finite() {
            return Err(RtpError::Config("economy.balanceFloor must be finite".into()));
        }

        for (world, cfg) in &self.worlds {
            if cfg.region.is_empty() {
                return Err(RtpError::Config(format!(
                    "worlds.{}.region cannot be empty",
                    world
                )));
            }
        }

        Ok(())
    }
}

impl EconomyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn other_price(mut self, price: f64) -> Self {
        self.other_price = price;
        self
    }

    pub fn params_price(mut self, price: f64) -> Self {
        self.params_price = price;
        self
    }

    pub fn biome_price(mut self, price: f64) -> Self {
        self.biome_price = price;
        self
    }

    pub fn balance_floor(mut self, floor: f64) -> Self {
        self.balance_floor = floor;
        self
    }
}
