//! Temp file lifecycle.
//!
//! Every run that needs its source on disk gets a fresh directory with a
//! random name under the scratch root, holding a single `snippet.<ext>` file.
//! Toolchain artifacts written next to the file (`$1.out`, `Main.class`,
//! cargo projects) live in the same directory and go away with it, and two
//! concurrent runs never share a path.

use std::io::{self, Write};
use std::path::Path;

use tempfile::TempDir;

const DIR_PREFIX: &str = "coderun-";
const FILE_STEM: &str = "snippet";

/// A source file materialized for one run.
#[derive(Debug)]
pub struct ScratchFile {
    dir: TempDir,
    file: std::path::PathBuf,
}

impl ScratchFile {
    /// Write `source` verbatim to a new file with extension `ext` under
    /// `root`.
    pub fn create(root: &Path, ext: &str, source: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(DIR_PREFIX).tempdir_in(root)?;
        let file = dir.path().join(format!("{FILE_STEM}.{ext}"));

        let mut handle = fs_err::File::create(&file)?;
        handle.write_all(source.as_bytes())?;
        handle.flush()?;
        drop(handle);

        tracing::debug!(path = %file.display(), bytes = source.len(), "wrote scratch file");
        Ok(Self { dir, file })
    }

    /// Path of the source file.
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Directory containing the source file.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the file and everything next to it. Failures are logged and
    /// otherwise ignored.
    pub fn remove(self) {
        let dir = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::debug!(path = %dir.display(), error = %e, "failed to remove scratch dir");
        } else {
            tracing::debug!(path = %dir.display(), "removed scratch dir");
        }
    }
}
