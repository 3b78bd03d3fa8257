//! Data models for the steamlock daemon.
//!
//! This module contains the serializable data structures:
//! - [`Settings`]: The lock feature toggles and daemon tuning loaded from `SteamLock Config.yaml`
//! - [`ControllerConfigsMode`]: Whether Steam's controller files are left alone or overwritten
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: Config structs derive `Serialize`/`Deserialize` for YAML persistence
//! - **Immutable in flight**: Settings mutations go through
//!   [`SettingsManager`](crate::config::SettingsManager), which notifies observers before
//!   committing a new value

pub mod settings;

pub use settings::{ControllerConfigsMode, Settings};
