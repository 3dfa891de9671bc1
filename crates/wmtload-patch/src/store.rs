use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, info};

use crate::error::{PatchError, Result};
use crate::image::Patch;

/// Directory the kernel's `request_firmware` searches.
pub const DEFAULT_FIRMWARE_DIR: &str = "/lib/firmware";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Patch files in one firmware directory.
///
/// Nothing is cached: every lookup rescans the directory and rereads the files.
#[derive(Debug, Clone)]
pub struct PatchStore {
    root: PathBuf,
}

impl PatchStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The firmware directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every regular file whose name matches `pattern`, sorted by name.
    ///
    /// Zero matches is [`PatchError::NoPatchFound`].
    pub fn find(&self, pattern: &str) -> Result<Vec<Patch>> {
        let matcher = Pattern::new(pattern)?;

        let entries = std::fs::read_dir(&self.root).map_err(|source| PatchError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut patches = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PatchError::Io {
                path: self.root.clone(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                debug!(name = ?entry.file_name(), "skipping non-UTF-8 file name");
                continue;
            };
            if !matcher.matches_with(file_name, MATCH_OPTIONS) {
                continue;
            }

            // Firmware directories are full of symlinks; follow them.
            let path = entry.path();
            let is_file = std::fs::metadata(&path)
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let contents = std::fs::read(&path).map_err(|source| PatchError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(?path, size = contents.len(), "loaded patch candidate");
            patches.push(Patch::new(file_name, &path, contents));
        }

        if patches.is_empty() {
            return Err(PatchError::NoPatchFound {
                pattern: pattern.to_string(),
                dir: self.root.clone(),
            });
        }

        patches.sort_by(|a, b| a.filename.cmp(&b.filename));
        info!(pattern, count = patches.len(), "found patches");
        Ok(patches)
    }
}

impl Default for PatchStore {
    fn default() -> Self {
        Self::new(DEFAULT_FIRMWARE_DIR)
    }
}
