//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ssd_display_hw::{DisplayConfig, SerialConfig};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// USB bridge configuration
    #[serde(default)]
    pub device: DeviceConfig,

    /// Display resolution
    #[serde(default)]
    pub display: DisplaySettings,
}

/// USB bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// USB vendor ID
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,

    /// USB product ID
    #[serde(default = "default_product_id")]
    pub product_id: u16,

    /// Serial line rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Write timeout in milliseconds
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,

    /// Largest single write in bytes
    #[serde(default = "default_max_write_size")]
    pub max_write_size: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            baud_rate: default_baud_rate(),
            write_timeout_ms: default_write_timeout(),
            max_write_size: default_max_write_size(),
        }
    }
}

/// Display resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_width")]
    pub width: u16,

    #[serde(default = "default_height")]
    pub height: u16,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

// Default value functions
fn default_vendor_id() -> u16 {
    ssd_display_hw::FTDI_VID
}

fn default_product_id() -> u16 {
    ssd_display_hw::FTDI_PID
}

fn default_baud_rate() -> u32 {
    SerialConfig::default().baud_rate
}

fn default_write_timeout() -> u64 {
    1000
}

fn default_max_write_size() -> usize {
    SerialConfig::default().max_write_size
}

fn default_width() -> u16 {
    ssd_display_hw::DISPLAY_WIDTH
}

fn default_height() -> u16 {
    ssd_display_hw::DISPLAY_HEIGHT
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Serial transport settings.
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            baud_rate: self.device.baud_rate,
            write_timeout: Duration::from_millis(self.device.write_timeout_ms),
            max_write_size: self.device.max_write_size,
        }
    }

    /// Validated display resolution.
    pub fn display_config(&self) -> Result<DisplayConfig> {
        DisplayConfig::new(self.display.width, self.display.height)
            .context("Invalid [display] section")
    }
}
