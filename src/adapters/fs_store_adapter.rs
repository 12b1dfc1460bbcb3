//! Local directory store adapter.
//!
//! The directory plays the role of a bucket: object keys are paths relative to
//! the root, joined with `/`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;

use crate::domain::error::PricedashError;
use crate::ports::store_port::StorePort;

pub struct FsStoreAdapter {
    root: PathBuf,
}

impl FsStoreAdapter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, PricedashError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(PricedashError::NotFound {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }

    fn walk(&self, dir: &Path, keys: &mut Vec<String>) -> Result<(), PricedashError> {
        let entries = fs::read_dir(dir).map_err(|e| PricedashError::Store {
            reason: format!("failed to read directory {}: {}", dir.display(), e),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| PricedashError::Store {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| PricedashError::Store {
                reason: format!("failed to stat {}: {}", path.display(), e),
            })?;

            if file_type.is_dir() {
                self.walk(&path, keys)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                keys.push(key);
            }
        }
        Ok(())
    }
}

impl StorePort for FsStoreAdapter {
    fn list(&self, prefix: &str) -> Result<Vec<String>, PricedashError> {
        if !self.root.is_dir() {
            return Err(PricedashError::Store {
                reason: format!("store root {} is not a directory", self.root.display()),
            });
        }

        let mut keys = Vec::new();
        self.walk(&self.root, &mut keys)?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Bytes, PricedashError> {
        let path = self.object_path(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PricedashError::NotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(PricedashError::Store {
                reason: format!("failed to read {}: {}", path.display(), e),
            }),
        }
    }
}
