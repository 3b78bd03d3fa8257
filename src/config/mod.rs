use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

use crate::models::{ControllerConfigsMode, Settings};
use crate::services::lock::SettingsSource;

/// Setting key names passed to changing-observers.
pub mod keys {
    pub const CONTROLLER_CONFIGS: &str = "ControllerConfigs";
    pub const STEAM_DETECTION: &str = "SteamDetection";
    pub const STEAM_KEYBOARD: &str = "SteamKeyboard";
    pub const STEAM_PATH: &str = "SteamPath";
}

type ChangingObserver = Box<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`SettingsManager::subscribe_changing`], used to
/// unsubscribe again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Settings manager for loading, saving and mutating `SteamLock Config.yaml`.
///
/// Mutations go through the typed setters, which notify every registered
/// changing-observer with the setting key **before** the new value is
/// committed. Observers therefore always see the old values when they read
/// back through the manager, which is what lets the lock controller restore
/// files under the still-active gate. Setters that would not change the
/// value do not notify and do not write the file.
pub struct SettingsManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    settings: RwLock<Settings>,
    observers: Mutex<Vec<(SubscriptionId, ChangingObserver)>>,
    next_subscription: AtomicU64,
}

impl SettingsManager {
    /// Create a new SettingsManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "SteamLock Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join("SteamLock Config.yaml"),
            config_dir,
            settings: RwLock::new(Settings::default()),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        })
    }

    /// Load settings from disk, falling back to defaults when the file is
    /// missing.
    ///
    /// Returns whether the file was present. Callers report the outcome
    /// themselves; load runs before logging is up, so tracing from here
    /// would be dropped.
    pub fn load(&self) -> Result<bool> {
        if !self.settings_path.exists() {
            *self.settings.write().unwrap() = Settings::default();
            return Ok(false);
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: Settings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        *self.settings.write().unwrap() = settings;
        Ok(true)
    }

    /// Save the current settings to disk.
    pub fn save(&self) -> Result<()> {
        let settings = self.snapshot();
        let yaml_string =
            serde_yaml_ng::to_string(&settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Get a copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.settings.read().unwrap().clone()
    }

    /// Execute a function with read access to the settings.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Settings) -> R,
    {
        let settings = self.settings.read().unwrap();
        f(&settings)
    }

    /// Register an observer called with the setting key before any value change
    /// is committed.
    pub fn subscribe_changing<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.observers
            .lock()
            .unwrap()
            .push((id, Box::new(observer)));
        id
    }

    /// Remove a previously registered changing-observer.
    pub fn unsubscribe_changing(&self, id: SubscriptionId) {
        self.observers
            .lock()
            .unwrap()
            .retain(|(observer_id, _)| *observer_id != id);
    }

    fn notify_changing(&self, key: &str) {
        let observers = self.observers.lock().unwrap();
        for (_, observer) in observers.iter() {
            observer(key);
        }
    }

    pub fn set_controller_configs(&self, mode: ControllerConfigsMode) -> Result<()> {
        if self.read(|s| s.controller_configs) == mode {
            return Ok(());
        }
        self.notify_changing(keys::CONTROLLER_CONFIGS);
        self.settings.write().unwrap().controller_configs = mode;
        self.save()
    }

    pub fn set_steam_detection(&self, enabled: bool) -> Result<()> {
        if self.read(|s| s.steam_detection) == enabled {
            return Ok(());
        }
        self.notify_changing(keys::STEAM_DETECTION);
        self.settings.write().unwrap().steam_detection = enabled;
        self.save()
    }

    pub fn set_steam_keyboard(&self, enabled: bool) -> Result<()> {
        if self.read(|s| s.steam_keyboard) == enabled {
            return Ok(());
        }
        self.notify_changing(keys::STEAM_KEYBOARD);
        self.settings.write().unwrap().steam_keyboard = enabled;
        self.save()
    }

    pub fn set_steam_path(&self, path: String) -> Result<()> {
        if self.read(|s| s.steam_path == path) {
            return Ok(());
        }
        self.notify_changing(keys::STEAM_PATH);
        self.settings.write().unwrap().steam_path = path;
        self.save()
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Path of the settings file inside the configuration directory.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

impl SettingsSource for SettingsManager {
    fn controller_configs(&self) -> ControllerConfigsMode {
        self.read(|s| s.controller_configs)
    }

    fn steam_detection(&self) -> bool {
        self.read(|s| s.steam_detection)
    }

    fn steam_keyboard(&self) -> bool {
        self.read(|s| s.steam_keyboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    fn create_test_settings_manager() -> (Arc<SettingsManager>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = Arc::new(SettingsManager::new(&config_path).unwrap());
        (manager, temp_dir)
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let (manager, _temp_dir) = create_test_settings_manager();
        assert!(!manager.load().unwrap());

        let settings = manager.snapshot();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_reports_file_presence() {
        let (manager, _temp_dir) = create_test_settings_manager();
        assert!(!manager.load().unwrap());

        manager.save().unwrap();
        assert!(manager.load().unwrap());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (manager, _temp_dir) = create_test_settings_manager();

        manager
            .set_controller_configs(ControllerConfigsMode::Overwrite)
            .unwrap();
        manager.set_steam_keyboard(true).unwrap();

        let reloaded = SettingsManager::new(manager.config_dir()).unwrap();
        reloaded.load().unwrap();
        assert_eq!(
            reloaded.snapshot().controller_configs,
            ControllerConfigsMode::Overwrite
        );
        assert!(reloaded.snapshot().steam_keyboard);
    }

    #[test]
    fn test_observer_sees_old_value() {
        let (manager, _temp_dir) = create_test_settings_manager();

        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let reader = manager.clone();
            let seen = seen.clone();
            manager.subscribe_changing(move |key| {
                seen.lock()
                    .unwrap()
                    .push((key.to_string(), reader.snapshot().steam_keyboard));
            });
        }

        manager.set_steam_keyboard(true).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), [(keys::STEAM_KEYBOARD.to_string(), false)]);
        assert!(manager.snapshot().steam_keyboard);
    }

    #[test]
    fn test_unchanged_value_does_not_notify() {
        let (manager, _temp_dir) = create_test_settings_manager();

        let calls = Arc::new(AtomicUsize::new(0));
        {
            let calls = calls.clone();
            manager.subscribe_changing(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        manager.set_steam_keyboard(false).unwrap(); // already the default
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        manager.set_steam_keyboard(true).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let (manager, _temp_dir) = create_test_settings_manager();

        let calls = Arc::new(AtomicUsize::new(0));
        let id = {
            let calls = calls.clone();
            manager.subscribe_changing(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        manager.unsubscribe_changing(id);
        manager.set_steam_detection(false).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_settings_source_reads_live_values() {
        let (manager, _temp_dir) = create_test_settings_manager();

        let source: &dyn SettingsSource = manager.as_ref();
        assert_eq!(
            source.controller_configs(),
            ControllerConfigsMode::DoNotTouch
        );

        manager
            .set_controller_configs(ControllerConfigsMode::Overwrite)
            .unwrap();
        assert_eq!(
            source.controller_configs(),
            ControllerConfigsMode::Overwrite
        );
    }
}
