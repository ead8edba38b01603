use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub timing: TimingConfig,
    pub bridge: BridgeConfig,
    pub spinner: SpinnerConfig,
    pub tiles: TilesConfig,
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".config/tile-deck/config.toml"))
    }

    /// Get state file path (resume marker)
    pub fn state_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".tile-deck/state.json"))
    }
}

/// Hardware class of the target surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Small memory, monochrome display
    Compact,
    /// Color display with a large inbox
    Standard,
}

impl DeviceClass {
    /// Largest inbound message the transport will accept, in bytes
    pub fn inbox_capacity(self) -> usize {
        match self {
            DeviceClass::Compact => 256,
            DeviceClass::Standard => 8200,
        }
    }

    /// Largest outbound message, in bytes
    pub fn outbox_capacity(self) -> usize {
        64
    }

    pub fn supports_color(self) -> bool {
        matches!(self, DeviceClass::Standard)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub class: DeviceClass,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            class: DeviceClass::Standard,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before the spinner starts animating after a click
    pub spinner_delay_ms: u64,
    /// How long select must be held before the overflow glyph appears
    pub long_press_ms: u64,
    /// Delay between the overflow glyph and the page swap
    pub hold_swap_ms: u64,
    /// Window in which back clicks are counted together
    pub multi_click_timeout_ms: u64,
    /// Frame delay used when the spinner resource carries none
    pub frame_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            spinner_delay_ms: 200,
            long_press_ms: 250,
            hold_swap_ms: 100,
            multi_click_timeout_ms: 150,
            frame_delay_ms: 80,
        }
    }
}

impl TimingConfig {
    pub fn spinner_delay(&self) -> Duration {
        Duration::from_millis(self.spinner_delay_ms)
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn hold_swap(&self) -> Duration {
        Duration::from_millis(self.hold_swap_ms)
    }

    pub fn multi_click_timeout(&self) -> Duration {
        Duration::from_millis(self.multi_click_timeout_ms)
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Base URL of the request bridge
    pub url: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8787".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinnerConfig {
    /// Animated GIF used for the spinner (generated frames when unset)
    pub gif_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesConfig {
    /// Local tile file loaded at startup instead of asking the bridge
    pub path: Option<PathBuf>,
}
