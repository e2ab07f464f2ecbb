use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlideConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub transitions: TransitionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Position model and input tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Start in Smooth mode (engine-owned position)
    #[serde(default = "default_true")]
    pub smooth: bool,
    /// Fraction of the remaining distance covered per frame, in (0, 1]
    #[serde(default = "default_elasticity")]
    pub elasticity: f64,
    /// Wheel delta multiplier
    #[serde(default = "default_velocity")]
    pub velocity: f64,
    /// Distance below which interpolation is considered converged
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Distance below which an awaited scroll_to is considered settled
    #[serde(default = "default_settle_tolerance")]
    pub settle_tolerance: f64,
    /// Duration (seconds) of an animated scroll in Native mode
    #[serde(default = "default_native_scroll_duration")]
    pub native_scroll_duration: f64,
    /// Screen widths at or below this are reported as mobile
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth: default_true(),
            elasticity: default_elasticity(),
            velocity: default_velocity(),
            epsilon: default_epsilon(),
            settle_tolerance: default_settle_tolerance(),
            native_scroll_duration: default_native_scroll_duration(),
            mobile_breakpoint: default_mobile_breakpoint(),
        }
    }
}

/// Enter/exit animation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Enter duration (seconds) when an element configures none
    #[serde(default = "default_enter_duration")]
    pub enter_duration: f64,
    /// Exit duration (seconds) when an element configures none
    #[serde(default = "default_exit_duration")]
    pub exit_duration: f64,
    /// Duration of the whole-page fade used when no element has an exit animation
    #[serde(default = "default_page_exit_duration")]
    pub page_exit_duration: f64,
    /// Margin (px) around an element inside which it tracks the scroll 1:1
    #[serde(default = "default_scroll_offset")]
    pub default_scroll_offset: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            enter_duration: default_enter_duration(),
            exit_duration: default_exit_duration(),
            page_exit_duration: default_page_exit_duration(),
            default_scroll_offset: default_scroll_offset(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_elasticity() -> f64 {
    0.075
}

fn default_velocity() -> f64 {
    0.5
}

fn default_epsilon() -> f64 {
    0.1
}

fn default_settle_tolerance() -> f64 {
    1.0
}

fn default_native_scroll_duration() -> f64 {
    1.0
}

fn default_mobile_breakpoint() -> f64 {
    768.0
}

fn default_enter_duration() -> f64 {
    0.4
}

fn default_exit_duration() -> f64 {
    0.2
}

fn default_page_exit_duration() -> f64 {
    0.2
}

fn default_scroll_offset() -> f64 {
    50.0
}

impl GlideConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from an explicit file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/glide/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("glide")
            .join("config.toml")
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let scroll = &self.scroll;
        if !(scroll.elasticity > 0.0 && scroll.elasticity <= 1.0) {
            return Err(crate::Error::Config(format!(
                "scroll.elasticity must be in (0, 1], got {}",
                scroll.elasticity
            )));
        }
        if !(scroll.epsilon > 0.0) {
            return Err(crate::Error::Config(format!(
                "scroll.epsilon must be positive, got {}",
                scroll.epsilon
            )));
        }
        if scroll.settle_tolerance < 0.0 || scroll.native_scroll_duration < 0.0 {
            return Err(crate::Error::Config(
                "scroll tolerances and durations must not be negative".to_string(),
            ));
        }

        let t = &self.transitions;
        for (name, value) in [
            ("enter_duration", t.enter_duration),
            ("exit_duration", t.exit_duration),
            ("page_exit_duration", t.page_exit_duration),
        ] {
            if value < 0.0 {
                return Err(crate::Error::Config(format!(
                    "transitions.{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
