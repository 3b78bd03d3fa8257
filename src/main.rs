//! steamlock - Keeps Steam's controller_base configs locked while Steam runs.
//!
//! Main entry point for the daemon.
//!
//! # Overview
//!
//! This binary wires the lock controller to its concrete collaborators and
//! drives it from a steady tick loop:
//! - Logging infrastructure (file rotation + console output)
//! - Tokio runtime (tick scheduler and Ctrl-C handling)
//! - Settings loading ([`SettingsManager`], `SteamLock Data/SteamLock Config.yaml`)
//! - Steam install discovery (configured path or conventional locations)
//! - [`LockController`] fed by [`SteamConfigStore`] and [`SteamProcessDetector`]
//!
//! # Execution Flow
//!
//! 1. Load settings from SteamLock Data/
//! 2. Initialize logging → logs/steamlock.<date> (debug filter from settings)
//! 3. Resolve the Steam root and build the collaborators
//! 4. Force a Disabled baseline and subscribe the unlock-before-change observer
//! 5. Tick the controller at the configured cadence until Ctrl-C
//! 6. Unsubscribe and dispose, dropping any remaining overrides
//!
//! A failed tick is logged and the loop keeps running; the controller retries
//! the transition on the next tick because its state only advances after a
//! fully successful transition.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use steamlock::services::{
    LockController, SettingsSource, SteamConfigStore, SteamProcessDetector, locate_steam_root,
    watch_settings,
};
use steamlock::{APP_NAME, SettingsManager, VERSION, resources};

fn main() -> Result<()> {
    // Settings have to be read before logging starts (debug_mode picks the
    // filter), so the load outcome is reported once the subscriber exists.
    let settings = Arc::new(SettingsManager::new("SteamLock Data")?);
    let settings_file_found = settings.load()?;

    let (debug_mode, tick_interval_ms) =
        settings.read(|s| (s.debug_mode, s.tick_interval_ms.max(100)));

    // Hold the guard until exit to keep the file appender alive
    let _guard = steamlock::logging::setup_logging("logs", "steamlock", debug_mode, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    if settings_file_found {
        tracing::info!("Loaded settings from {}", settings.settings_path());
    } else {
        tracing::warn!(
            "Settings file not found at {}, using defaults",
            settings.settings_path()
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("steamlock-worker")
        .build()?;

    let steam_root = resolve_steam_root(&settings)?;
    tracing::info!("Using Steam root: {}", steam_root);

    let store = Arc::new(SteamConfigStore::new(&steam_root));
    let detector = Arc::new(SteamProcessDetector::new());

    let controller = Arc::new(Mutex::new(LockController::new(
        store,
        settings.clone() as Arc<dyn SettingsSource>,
        detector,
        resources::lock_file_sets(),
    )));

    controller
        .lock()
        .unwrap()
        .initialize()
        .context("Failed to establish the disabled baseline")?;

    // Any setting mutation must unlock the files before the value commits
    let subscription = watch_settings(controller.clone(), &settings);
    tracing::info!("Lock controller initialized, ticking every {}ms", tick_interval_ms);

    runtime.block_on(run_tick_loop(
        controller.clone(),
        Duration::from_millis(tick_interval_ms),
    ));

    tracing::info!("Shutting down");
    settings.unsubscribe_changing(subscription);

    let dispose_result = controller.lock().unwrap().dispose();
    runtime.shutdown_timeout(Duration::from_secs(5));

    dispose_result.map_err(|err| {
        tracing::error!("Failed to restore configs on shutdown: {}", err);
        anyhow!("Failed to restore configs on shutdown: {}", err)
    })?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Tick the controller at a steady cadence until Ctrl-C.
async fn run_tick_loop(controller: Arc<Mutex<LockController>>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut controller = controller.lock().unwrap();
                if let Err(err) = controller.tick() {
                    tracing::error!("Config lock transition failed: {}", err);
                }
            }
            result = &mut shutdown => {
                if let Err(err) = result {
                    tracing::error!("Failed to listen for shutdown signal: {}", err);
                }
                break;
            }
        }
    }
}

/// The configured Steam path wins; otherwise probe the usual install locations.
fn resolve_steam_root(settings: &SettingsManager) -> Result<Utf8PathBuf> {
    let configured = settings.read(|s| s.steam_path.clone());
    if !configured.is_empty() {
        return Ok(Utf8PathBuf::from(configured));
    }

    locate_steam_root().context(
        "Could not locate a Steam installation; set `Steam Path` in SteamLock Config.yaml",
    )
}
