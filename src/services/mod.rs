//! Services module - Business logic for the controller config lock.
//!
//! This module contains the logic that keeps Steam's `controller_base` files in
//! sync with the observed Steam run-state. The services are **framework-agnostic**
//! and consume their collaborators through narrow traits, making them testable in
//! isolation.
//!
//! # Components
//!
//! - [`LockController`]: The three-state lock machine. Evaluates the active gate
//!   and the desired state on every tick, and applies idempotent transitions:
//!   - `Disabled`: overrides dropped, Steam's own defaults restored
//!   - `GuideLock`: base configs overridden except the guide keyboard chord
//!   - `FullLock`: all base configs overridden
//!
//! - [`SteamConfigStore`]: Concrete [`ConfigFileStore`] writing under the Steam
//!   root. Protects overridden files by marking them read-only and keeps a
//!   one-time backup so resets restore exactly what Steam had.
//!
//! - [`SteamProcessDetector`]: Concrete [`ProcessDetector`] scanning the system
//!   process table for a running Steam client.
//!
//! # Design Philosophy
//!
//! - **Synchronous**: a tick either performs at most one transition or is a no-op;
//!   nothing blocks or suspends
//! - **No local recovery**: store failures propagate to the caller; the state only
//!   advances after a whole transition succeeded, so the next tick retries it
//! - **Testable**: collaborators are traits, all inputs are explicit

pub mod detection;
pub mod lock;
pub mod store;

pub use detection::SteamProcessDetector;
pub use lock::{
    ConfigFileSet, ConfigFileStore, LockController, LockFileSets, LockState, ProcessDetector,
    SettingsSource, watch_settings,
};
pub use store::{SteamConfigStore, StoreError, locate_steam_root};
