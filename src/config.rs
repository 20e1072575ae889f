//! Adapter configuration
//!
//! ```toml
//! system = "vampire4sa"
//!
//! [[out_cfg]]
//! dev_mode = "pad"
//!
//! [[in_cfg]]
//! [[in_cfg.map_cfg]]
//! src_btn = 18
//! dst_btn = 18
//! dst_id = 0
//! ```

use crate::error::AdapterError;
use crate::mapping::InputConfig;
use crate::wired::{DeviceMode, WiredSystem, WIRED_MAX_DEV};
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".config/padbridge";
const CONFIG_FILE: &str = "adapter.toml";

/// Settings of one wired port
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default)]
    pub dev_mode: DeviceMode,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AdapterConfig {
    #[serde(default)]
    pub system: WiredSystem,
    /// One entry per wired port; missing ports default to pad mode
    #[serde(default)]
    pub out_cfg: Vec<OutputConfig>,
    /// One remap table per wireless source
    #[serde(default)]
    pub in_cfg: Vec<InputConfig>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            system: WiredSystem::Auto,
            out_cfg: vec![OutputConfig::default(); WIRED_MAX_DEV],
            in_cfg: (0..WIRED_MAX_DEV as u8).map(InputConfig::identity).collect(),
        }
    }
}

impl AdapterConfig {
    pub fn with_system(mut self, system: WiredSystem) -> Self {
        self.system = system;
        self
    }

    pub fn with_mode(mut self, port: usize, dev_mode: DeviceMode) -> Self {
        if port < WIRED_MAX_DEV {
            if self.out_cfg.len() <= port {
                self.out_cfg.resize(port + 1, OutputConfig::default());
            }
            self.out_cfg[port].dev_mode = dev_mode;
        }
        self
    }

    /// Device mode of every port
    pub fn modes(&self) -> [DeviceMode; WIRED_MAX_DEV] {
        let mut modes = [DeviceMode::default(); WIRED_MAX_DEV];
        for (mode, out) in modes.iter_mut().zip(self.out_cfg.iter()) {
            *mode = out.dev_mode;
        }
        modes
    }

    /// Remap table of a wireless source
    pub fn input(&self, dev_id: u8) -> Option<&InputConfig> {
        self.in_cfg.get(dev_id as usize)
    }

    pub fn validate(&self) -> Result<(), AdapterError> {
        if self.out_cfg.len() > WIRED_MAX_DEV {
            return Err(AdapterError::InvalidConfig(format!(
                "{} output ports configured, at most {} supported",
                self.out_cfg.len(),
                WIRED_MAX_DEV
            )));
        }
        self.in_cfg
            .iter()
            .try_for_each(|input| input.validate(WIRED_MAX_DEV))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| eyre!("Failed to parse adapter config: {}", e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid adapter config: {}", e))?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| eyre!("Failed to serialize adapter config: {}", e))
    }

    /// Loads `path`, falling back to the default when it does not exist
    pub async fn load(path: &Path) -> Result<Self> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check config file {}: {}", path.display(), e))?;
        if !exists {
            warn!("Config file {} does not exist, using default", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_toml_str(&content)?;
        info!(
            "Loaded config {} ({} system, {} remap tables)",
            path.display(),
            config.system,
            config.in_cfg.len()
        );
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        tokio::fs::write(path, self.to_toml_string()?)
            .await
            .map_err(|e| eyre!("Failed to write config file {}: {}", path.display(), e))?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        let mut path = Self::get_home_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    fn get_home_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}
