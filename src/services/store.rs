use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::services::lock::ConfigFileStore;

/// Suffix used to keep Steam's original file around while an override is held.
const BACKUP_SUFFIX: &str = ".steamlock.bak";

/// Errors raised while mutating files under the Steam root.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("failed to reset config file {path}: {source}")]
    Reset {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("failed to update protection on {path}: {source}")]
    Protect {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

/// File store operating on Steam's configuration tree.
///
/// Overwritten files are protected by marking them read-only, which stops
/// Steam from silently rewriting them while the lock is held. The original
/// file is backed up once (with a [`BACKUP_SUFFIX`] sibling) so a reset can
/// return exactly what Steam had; when no backup exists the override is
/// removed and Steam regenerates its default on next start.
#[derive(Debug, Clone)]
pub struct SteamConfigStore {
    steam_root: Utf8PathBuf,
}

impl SteamConfigStore {
    /// Create a store rooted at the Steam installation directory
    /// (the directory containing `controller_base/`).
    pub fn new<P: AsRef<Utf8Path>>(steam_root: P) -> Self {
        Self {
            steam_root: steam_root.as_ref().to_path_buf(),
        }
    }

    /// The Steam root this store writes under.
    pub fn steam_root(&self) -> &Utf8Path {
        &self.steam_root
    }

    fn full_path(&self, path: &str) -> Utf8PathBuf {
        self.steam_root.join(path)
    }

    fn set_protected(path: &Utf8Path, protected: bool) -> Result<(), StoreError> {
        let metadata = fs::metadata(path).map_err(|source| StoreError::Protect {
            path: path.to_path_buf(),
            source,
        })?;
        let mut permissions = metadata.permissions();
        if permissions.readonly() == protected {
            return Ok(());
        }
        permissions.set_readonly(protected);
        fs::set_permissions(path, permissions).map_err(|source| StoreError::Protect {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ConfigFileStore for SteamConfigStore {
    fn overwrite_config_file(
        &self,
        path: &str,
        payload: &[u8],
        protect: bool,
    ) -> Result<(), StoreError> {
        let full = self.full_path(path);
        let write_err = |source| StoreError::Write {
            path: full.clone(),
            source,
        };

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        if full.exists() {
            // a previous lock may have left the file read-only
            Self::set_protected(&full, false)?;

            let backup = Utf8PathBuf::from(format!("{full}{BACKUP_SUFFIX}"));
            if !backup.exists() {
                fs::rename(&full, &backup).map_err(write_err)?;
            }
        }

        fs::write(&full, payload).map_err(write_err)?;

        if protect {
            Self::set_protected(&full, true)?;
        }

        tracing::debug!(path, protect, "overwrote config file");
        Ok(())
    }

    fn install_config_file(&self, path: &str, payload: &[u8]) -> Result<(), StoreError> {
        let full = self.full_path(path);
        if full.exists() {
            return Ok(());
        }

        let write_err = |source| StoreError::Write {
            path: full.clone(),
            source,
        };

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&full, payload).map_err(write_err)?;

        tracing::debug!(path, "installed config file");
        Ok(())
    }

    fn reset_config_file(&self, path: &str) -> Result<(), StoreError> {
        let full = self.full_path(path);
        let backup = Utf8PathBuf::from(format!("{full}{BACKUP_SUFFIX}"));

        let reset_err = |source| StoreError::Reset {
            path: full.clone(),
            source,
        };

        if !full.exists() {
            // a failed overwrite can leave Steam's original stranded in the
            // backup with no override in place; it still has to come back
            if backup.exists() {
                fs::rename(&backup, &full).map_err(reset_err)?;
                tracing::debug!(path, "restored config file from backup");
            }
            return Ok(());
        }

        Self::set_protected(&full, false)?;

        if backup.exists() {
            fs::rename(&backup, &full).map_err(reset_err)?;
        } else {
            fs::remove_file(&full).map_err(reset_err)?;
        }

        tracing::debug!(path, "reset config file");
        Ok(())
    }
}

/// Probe the conventional Steam install locations for this platform.
///
/// Used when the user left `Steam Path` empty in the settings file.
pub fn locate_steam_root() -> Option<Utf8PathBuf> {
    let mut candidates: Vec<Utf8PathBuf> = Vec::new();

    if let Some(home) = dirs::home_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok()) {
        candidates.push(home.join(".steam/steam"));
        candidates.push(home.join(".local/share/Steam"));
        candidates.push(home.join("Library/Application Support/Steam"));
    }

    candidates.push(Utf8PathBuf::from("C:\\Program Files (x86)\\Steam"));

    candidates.into_iter().find(|p| p.is_dir())
}
