//! Steam process detection.
//!
//! Watches the system process table for a running Steam client. Only process
//! presence matters here; the lock controller decides what to do with it.

use std::sync::Mutex;

use sysinfo::{ProcessesToUpdate, System};

use crate::services::lock::ProcessDetector;

/// Process names that count as "Steam is running".
const STEAM_PROCESS_NAMES: &[&str] = &["steam", "steam.exe"];

/// Detects a running Steam client via the system process table.
pub struct SteamProcessDetector {
    system: Mutex<System>,
}

impl SteamProcessDetector {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SteamProcessDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessDetector for SteamProcessDetector {
    fn is_running(&self) -> bool {
        let mut system = self.system.lock().unwrap();
        system.refresh_processes(ProcessesToUpdate::All, true);

        system.processes().values().any(|process| {
            let name = process.name().to_string_lossy();
            STEAM_PROCESS_NAMES
                .iter()
                .any(|candidate| name.eq_ignore_ascii_case(candidate))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_queries_process_table() {
        // Smoke test: refreshing and scanning must not panic, whatever the
        // host is running.
        let detector = SteamProcessDetector::new();
        let _ = detector.is_running();
    }

    #[test]
    fn test_process_name_matching_is_case_insensitive() {
        assert!(STEAM_PROCESS_NAMES
            .iter()
            .any(|candidate| "Steam.exe".eq_ignore_ascii_case(candidate)));
        assert!(!STEAM_PROCESS_NAMES
            .iter()
            .any(|candidate| "steamwebhelper".eq_ignore_ascii_case(candidate)));
    }
}
