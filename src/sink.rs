// src/sink.rs
// =============================================================================
// Writes downloaded files into the output directory.
//
// - The directory is created (with parents) when the sink is opened
// - Each file lands at <output_dir>/<remote name>, replacing any older copy
// - Remote names that could climb out of the directory are refused
// =============================================================================

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::SinkError;

#[derive(Debug, Clone)]
pub struct LocalSink {
    output_dir: PathBuf,
}

impl LocalSink {
    pub async fn open(output_dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let output_dir = output_dir.into();

        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| SinkError::CreateDir {
                path: output_dir.clone(),
                source,
            })?;

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `bytes` as `name`, returning the full path written.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError> {
        let path = self.target(name)?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;

        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    fn target(&self, name: &str) -> Result<PathBuf, SinkError> {
        let unsafe_name = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0');

        if unsafe_name {
            return Err(SinkError::UnsafeName(name.to_string()));
        }

        Ok(self.output_dir.join(name))
    }
}
