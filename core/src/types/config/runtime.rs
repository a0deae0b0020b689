use std::path::{Path, PathBuf};

/// Runtime configuration for opening a [`Registry`](crate::core::Registry).
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory holding one subdirectory per pack.
    pub base_path: PathBuf,
}

impl Config {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn pack_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

/// File names inside a pack directory.
pub(crate) mod layout {
    use super::*;

    pub const PACK_INFO_FILE: &str = "pack.json";
    pub const KEY_STORE_FILE: &str = "keys.redb";

    pub fn pack_info_path(pack_dir: &Path) -> PathBuf {
        pack_dir.join(PACK_INFO_FILE)
    }

    pub fn key_store_path(pack_dir: &Path) -> PathBuf {
        pack_dir.join(KEY_STORE_FILE)
    }
}
