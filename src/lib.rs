// steamlock - Keeps Steam's controller_base configs locked while Steam runs
//
// This is the library crate containing the lock state machine and its
// collaborators. The binary crate (main.rs) provides the daemon entry point.

pub mod config;
pub mod logging;
pub mod models;
pub mod resources;
pub mod services;

// Re-export commonly used types for convenience
pub use config::SettingsManager;
pub use models::{ControllerConfigsMode, Settings};
pub use services::{LockController, LockState, SteamConfigStore, SteamProcessDetector};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
