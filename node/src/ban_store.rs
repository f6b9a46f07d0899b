//! Ban list persistence in a JSON file.
//!
//! The file holds one versioned document. Writes go to a sibling temp file
//! that is renamed over the target, so a crash mid-write leaves the previous
//! list intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ember_network::{BanEntry, BanStore, NetworkError};
use serde::{Deserialize, Serialize};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct BanFile {
    version: u32,
    entries: Vec<BanEntry>,
}

/// [`BanStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonBanStore {
    path: PathBuf,
}

impl JsonBanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "banlist".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BanStore for JsonBanStore {
    fn load(&self) -> Result<Vec<BanEntry>, NetworkError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ban file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let file: BanFile = serde_json::from_slice(&bytes).map_err(|e| {
            NetworkError::Store(format!("{}: {e}", self.path.display()))
        })?;
        if file.version != FORMAT_VERSION {
            return Err(NetworkError::Store(format!(
                "{}: unsupported ban file version {}",
                self.path.display(),
                file.version
            )));
        }
        Ok(file.entries)
    }

    fn save(&self, entries: &[BanEntry]) -> Result<(), NetworkError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let doc = BanFile {
            version: FORMAT_VERSION,
            entries: entries.to_vec(),
        };
        let body = serde_json::to_vec_pretty(&doc).map_err(|e| NetworkError::Store(e.to_string()))?;

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "ban list saved");
        Ok(())
    }
}
