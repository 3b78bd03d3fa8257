//! Embedded controller configuration payloads.
//!
//! The VDF payloads are compiled into the binary and assembled into the three
//! immutable file sets the lock controller walks. Construction is explicit
//! rather than hidden in statics so tests and the daemon share one source of
//! truth for the path keys.

use crate::services::lock::{ConfigFileSet, LockFileSets};

/// Empty neptune configuration: all input handled outside of Steam.
pub static EMPTY_NEPTUNE: &[u8] = include_bytes!("../resources/empty_neptune.vdf");

/// Chord configuration with every Steam chord released.
pub static CHORD_NEPTUNE: &[u8] = include_bytes!("../resources/chord_neptune.vdf");

/// Chord configuration keeping only the guide keyboard chord.
pub static CHORD_NEPTUNE_GUIDE: &[u8] = include_bytes!("../resources/chord_neptune_guide.vdf");

/// Build the payload tables for the lock controller.
pub fn lock_file_sets() -> LockFileSets {
    LockFileSets {
        full_lock: ConfigFileSet::from([
            ("controller_base/desktop_neptune.vdf", EMPTY_NEPTUNE),
            ("controller_base/chord_neptune.vdf", CHORD_NEPTUNE),
        ]),
        guide_lock: ConfigFileSet::from([
            ("controller_base/desktop_neptune.vdf", EMPTY_NEPTUNE),
            ("controller_base/chord_neptune.vdf", CHORD_NEPTUNE_GUIDE),
        ]),
        installed: ConfigFileSet::from([(
            "controller_base/templates/controller_neptune_steamcontroller.vdf",
            EMPTY_NEPTUNE,
        )]),
    }
}
