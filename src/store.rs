use crate::errors::{HedgeError, HedgeResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Flat artifact exchange between pipeline stages: one pretty JSON document per
/// artifact, record arrays with named fields.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn open(dir: &Path) -> HedgeResult<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| HedgeError::Io(format!("create {}: {e}", dir.display())))?;
        tracing::info!("artifact store at {}", dir.display());
        Ok(Self { dir: dir.to_path_buf() })
    }

    #[inline]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> HedgeResult<PathBuf> {
        let path = self.path(name);
        write_json(&path, value)?;
        tracing::debug!(artifact = name, "artifact written");
        Ok(path)
    }

    pub fn read<T: DeserializeOwned>(&self, name: &str) -> HedgeResult<T> {
        read_json(&self.path(name))
    }
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> HedgeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| HedgeError::Io(format!("create {}: {e}", parent.display())))?;
    }
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body).map_err(|e| HedgeError::Io(format!("write {}: {e}", path.display())))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> HedgeResult<T> {
    let body = std::fs::read_to_string(path)
        .map_err(|e| HedgeError::Io(format!("read {}: {e}", path.display())))?;
    serde_json::from_str(&body).map_err(|e| HedgeError::Parse(format!("{}: {e}", path.display())))
}
