use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use crate::config::SettingsManager;
use crate::config::SubscriptionId;
use crate::models::ControllerConfigsMode;
use crate::services::store::StoreError;

/// An ordered mapping from a path relative to the Steam root to the payload
/// written there while the lock is held.
pub type ConfigFileSet = IndexMap<&'static str, &'static [u8]>;

/// The three payload tables driving the lock state machine.
///
/// `full_lock` and `guide_lock` deliberately share the same path keys: unlocking
/// only walks `full_lock`, and a single reset pass has to cover both. If the
/// sets ever diverge, unlocking would leave orphaned overrides behind.
pub struct LockFileSets {
    /// Overwritten (protected) while in [`LockState::FullLock`]; reset on unlock.
    pub full_lock: ConfigFileSet,
    /// Overwritten (protected) while in [`LockState::GuideLock`].
    pub guide_lock: ConfigFileSet,
    /// Written once if absent whenever a lock is taken; never reset.
    pub installed: ConfigFileSet,
}

/// Current lock state of Steam's controller configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No overrides are imposed; Steam uses its own files.
    Disabled,
    /// All base configs overridden except the guide keyboard chord.
    GuideLock,
    /// All base configs overridden.
    FullLock,
}

/// File mutation contract the controller drives.
///
/// Implementations write under the Steam root. A `protect`ed write must keep
/// its content in place until explicitly reset, even if Steam tries to
/// rewrite the file.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigFileStore: Send + Sync {
    /// Write `payload` to `path`, protecting the file when `protect` is set.
    fn overwrite_config_file(&self, path: &str, payload: &[u8], protect: bool)
    -> Result<(), StoreError>;

    /// Write `payload` to `path` only if nothing exists there yet.
    fn install_config_file(&self, path: &str, payload: &[u8]) -> Result<(), StoreError>;

    /// Drop any override and protection on `path`, returning it to Steam's default.
    fn reset_config_file(&self, path: &str) -> Result<(), StoreError>;
}

/// Live view of the settings the controller depends on.
///
/// Values are re-read on every call; the controller never caches them.
pub trait SettingsSource: Send + Sync {
    fn controller_configs(&self) -> ControllerConfigsMode;
    fn steam_detection(&self) -> bool;
    fn steam_keyboard(&self) -> bool;
}

/// Reports whether the Steam process is currently running.
pub trait ProcessDetector: Send + Sync {
    fn is_running(&self) -> bool;
}

/// Keeps Steam's controller configuration files in sync with the observed
/// Steam run-state and the user settings.
///
/// The controller is a small three-state machine. Each [`tick`](Self::tick)
/// computes the desired state from the process detector and the keyboard
/// toggle, and applies a transition only when it differs from the current
/// state, so repeated ticks with unchanged inputs perform zero file
/// operations. Transitions are computed from the target state alone, which
/// makes every transition idempotent and re-entrant.
///
/// Store failures propagate to the caller unmodified. The current state is
/// advanced only after the whole file-set action succeeded, so a partial
/// failure leaves the desired/current mismatch in place and the next tick
/// retries the entire transition.
///
/// The controller performs no internal locking; `tick` and the
/// settings-change callback must not run concurrently. Wrap the controller
/// in `Arc<Mutex<_>>` and register the callback via [`watch_settings`].
pub struct LockController {
    store: Arc<dyn ConfigFileStore>,
    settings: Arc<dyn SettingsSource>,
    detector: Arc<dyn ProcessDetector>,
    sets: LockFileSets,
    state: LockState,
}

impl LockController {
    pub fn new(
        store: Arc<dyn ConfigFileStore>,
        settings: Arc<dyn SettingsSource>,
        detector: Arc<dyn ProcessDetector>,
        sets: LockFileSets,
    ) -> Self {
        Self {
            store,
            settings,
            detector,
            sets,
            state: LockState::Disabled,
        }
    }

    /// Force a clean baseline before the first tick.
    pub fn initialize(&mut self) -> Result<(), StoreError> {
        self.apply(LockState::Disabled)
    }

    /// Drop all overrides. No lock state survives disposal.
    pub fn dispose(&mut self) -> Result<(), StoreError> {
        self.apply(LockState::Disabled)
    }

    /// Current lock state.
    pub fn state(&self) -> LockState {
        self.state
    }

    /// The feature gate: only manage files while the user opted into
    /// overwriting and Steam detection is on. Re-evaluated on every call.
    pub fn is_active(&self) -> bool {
        self.settings.controller_configs() == ControllerConfigsMode::Overwrite
            && self.settings.steam_detection()
    }

    /// Periodic evaluation entry point, invoked by the daemon loop.
    pub fn tick(&mut self) -> Result<(), StoreError> {
        if !self.is_active() {
            return Ok(());
        }

        let desired = if !self.detector.is_running() {
            LockState::Disabled
        } else if self.settings.steam_keyboard() {
            LockState::GuideLock
        } else {
            LockState::FullLock
        };

        if desired == self.state {
            return Ok(());
        }

        self.apply(desired)
    }

    /// Forced unlock, fired before a setting value is committed so the old
    /// (still active) gate decides whether files need restoring.
    fn unlock_for_settings_change(&mut self, key: &str) -> Result<(), StoreError> {
        tracing::debug!(key, "setting about to change, unlocking controller files");
        self.apply(LockState::Disabled)
    }

    fn apply(&mut self, new_state: LockState) -> Result<(), StoreError> {
        if !self.is_active() {
            // With the feature off the files were never overwritten, so there
            // is nothing to undo; only the tracked state is pinned back.
            self.state = LockState::Disabled;
            return Ok(());
        }

        tracing::info!(state = ?new_state, "setting controller config lock");

        match new_state {
            LockState::Disabled => {
                // guide_lock shares these path keys, one reset pass covers both
                for path in self.sets.full_lock.keys() {
                    self.store.reset_config_file(path)?;
                }
            }
            LockState::GuideLock => {
                for (path, payload) in &self.sets.guide_lock {
                    self.store.overwrite_config_file(path, payload, true)?;
                }
                for (path, payload) in &self.sets.installed {
                    self.store.install_config_file(path, payload)?;
                }
            }
            LockState::FullLock => {
                for (path, payload) in &self.sets.full_lock {
                    self.store.overwrite_config_file(path, payload, true)?;
                }
                for (path, payload) in &self.sets.installed {
                    self.store.install_config_file(path, payload)?;
                }
            }
        }

        self.state = new_state;
        Ok(())
    }
}

/// Subscribe `controller` to the settings-changing notification so any
/// setting mutation unlocks the files before the new value takes effect.
///
/// The callback runs synchronously inside the setter, while the old values
/// are still visible, which preserves the "always unlock before the value
/// changes" ordering. The returned id must be unsubscribed before disposal.
pub fn watch_settings(
    controller: Arc<Mutex<LockController>>,
    settings: &SettingsManager,
) -> SubscriptionId {
    settings.subscribe_changing(move |key| {
        let mut controller = controller.lock().unwrap();
        if let Err(err) = controller.unlock_for_settings_change(key) {
            tracing::warn!(%err, key, "failed to reset controller configs before settings change");
        }
    })
}
