//! Output naming and temporary artifacts.
//!
//! The final name is `<input without extension>_discordpressed.mp4` next to
//! the input. Everything else written during an encode (the single-pass temp
//! output, the pass-log directory, a partial pass 2 output) is tied to an
//! RAII handle so it is removed on every exit path.

use crate::config::{OUTPUT_EXTENSION, OUTPUT_SUFFIX};
use crate::error::{CoreError, CoreResult};

use log::{info, warn};
use tempfile::{Builder as TempFileBuilder, TempDir, TempPath};

use std::ffi::{OsStr, OsString};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// File name used for the pass log prefix inside the pass-log directory.
pub const PASS_LOG_NAME: &str = "2passlog";

/// Returns the final output path for `input`.
///
/// Only the last extension is stripped: `a/clip.tar.gz` -> `a/clip.tar_discordpressed.mp4`.
/// Leading dots never start an extension, so `a/..foo` -> `a/..foo_discordpressed.mp4`.
pub fn final_output_path(input: &Path) -> CoreResult<PathBuf> {
    let stem = file_stem(input)?;
    let mut name = stem.to_os_string();
    name.push(format!("{OUTPUT_SUFFIX}.{OUTPUT_EXTENSION}"));
    Ok(input.with_file_name(name))
}

fn file_stem(input: &Path) -> CoreResult<&OsStr> {
    let (Some(name), Some(stem)) = (input.file_name(), input.file_stem()) else {
        return Err(CoreError::PathError(format!(
            "Cannot derive an output name from {}",
            input.display()
        )));
    };
    // `Path::file_stem` splits `..foo` into `.` and `foo`; a dot inside the
    // leading run of dots is part of the name.
    if stem.as_encoded_bytes().iter().all(|b| *b == b'.') {
        return Ok(name);
    }
    Ok(stem)
}

/// Where one input's artifacts go.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub final_output: PathBuf,
    work_dir: PathBuf,
    stem: OsString,
}

impl OutputPaths {
    pub fn for_input(input: &Path) -> CoreResult<Self> {
        let work_dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self {
            final_output: final_output_path(input)?,
            work_dir,
            stem: file_stem(input)?.to_os_string(),
        })
    }

    fn prefixed(&self, tag: &str) -> OsString {
        let mut prefix = self.stem.clone();
        prefix.push(format!("_{tag}_"));
        prefix
    }

    /// Creates the single-pass temp output. Deleted when dropped unless persisted.
    ///
    /// On unix the file gets the umask default mode rather than 0600, since
    /// it may be renamed into place as the final output.
    pub fn create_temp_output(&self) -> CoreResult<TempPath> {
        let prefix = self.prefixed("temp");
        let suffix = format!(".{OUTPUT_EXTENSION}");
        let mut builder = TempFileBuilder::new();
        builder.prefix(&prefix).suffix(&suffix);
        #[cfg(unix)]
        builder.permissions(fs::Permissions::from_mode(0o666));
        let temp_file = builder.tempfile_in(&self.work_dir)?;
        Ok(temp_file.into_temp_path())
    }

    /// Creates the directory holding the rate-control logs. Removed with its contents when dropped.
    pub fn create_pass_log_dir(&self) -> CoreResult<TempDir> {
        Ok(TempFileBuilder::new()
            .prefix(&self.prefixed("2passlog"))
            .tempdir_in(&self.work_dir)?)
    }
}

/// Removes a partially written output on drop unless disarmed.
#[derive(Debug)]
pub struct PartialOutputGuard {
    path: PathBuf,
    armed: bool,
}

impl PartialOutputGuard {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    /// Keeps the file.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialOutputGuard {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("Could not remove failed output {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Size of `path` if it exists and is non-empty.
#[must_use]
pub fn non_empty_size(path: &Path) -> Option<u64> {
    fs::metadata(path)
        .ok()
        .map(|m| m.len())
        .filter(|len| *len > 0)
}

/// Moves the accepted single-pass output to its final name.
///
/// An existing final output is replaced. If the rename fails the file is
/// copied instead and the temp file deleted.
pub fn promote_temp_output(temp_output: TempPath, final_output: &Path) -> CoreResult<()> {
    if final_output.exists() {
        if let Err(e) = fs::remove_file(final_output) {
            warn!("Could not remove existing {}: {}", final_output.display(), e);
        }
    }

    match temp_output.persist(final_output) {
        Ok(()) => Ok(()),
        Err(err) => {
            warn!(
                "Renaming {} to {} failed: {}",
                err.path.display(),
                final_output.display(),
                err.error
            );
            let guard = PartialOutputGuard::new(final_output);
            fs::copy(&err.path, final_output)?;
            guard.disarm();
            info!("Used copy & delete as rename fallback.");
            // Dropping the TempPath deletes the original.
            drop(err.path);
            Ok(())
        }
    }
}
