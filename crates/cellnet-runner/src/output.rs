//! Writing run results to YAML or JSON files.

use crate::{Result, RunnerError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `.yaml`, `.yml` and anything unrecognized.
    Yaml,
    /// `.json`.
    Json,
}

impl OutputFormat {
    /// Format for `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }

    /// Render `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        Ok(match self {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
        })
    }
}

/// Removes a partially written file unless disarmed.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Write `value` to `path`, formatted by its extension.
///
/// The data goes to a sibling temporary file first and is renamed into place
/// once complete, so `path` is either untouched or fully written.
pub fn write_output<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = OutputFormat::from_path(path).render(value)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| RunnerError::Io { path, source }
    };

    let guard = TempFileGuard::new(tmp.clone());
    std::fs::write(&tmp, text).map_err(io_err(&tmp))?;
    std::fs::rename(&tmp, path).map_err(io_err(path))?;
    guard.disarm();

    debug!(path = %path.display(), "Wrote output");
    Ok(())
}
