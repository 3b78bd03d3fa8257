use serde::{Deserialize, Serialize};

/// How Steam's `controller_base` configuration files are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControllerConfigsMode {
    /// Leave Steam's own configuration files alone.
    #[default]
    DoNotTouch,
    /// Overwrite and lock them while Steam is running.
    Overwrite,
}

/// User configuration from `SteamLock Config.yaml`
///
/// Contains the lock feature toggles and daemon tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "Controller Configs", default)]
    pub controller_configs: ControllerConfigsMode,

    #[serde(rename = "Steam Detection", default = "default_steam_detection")]
    pub steam_detection: bool,

    #[serde(rename = "Steam Keyboard", default)]
    pub steam_keyboard: bool,

    #[serde(rename = "Steam Path", default)]
    pub steam_path: String,

    #[serde(rename = "Tick Interval Ms", default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            controller_configs: ControllerConfigsMode::DoNotTouch,
            steam_detection: true,
            steam_keyboard: false,
            steam_path: String::new(),
            tick_interval_ms: 1000,
            debug_mode: false,
        }
    }
}

fn default_steam_detection() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.controller_configs, ControllerConfigsMode::DoNotTouch);
        assert!(settings.steam_detection);
        assert!(!settings.steam_keyboard);
        assert_eq!(settings.tick_interval_ms, 1000);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let settings: Settings = serde_yaml_ng::from_str("Steam Keyboard: true").unwrap();
        assert!(settings.steam_keyboard);
        assert!(settings.steam_detection);
        assert_eq!(settings.controller_configs, ControllerConfigsMode::DoNotTouch);
        assert_eq!(settings.tick_interval_ms, 1000);
    }
}
