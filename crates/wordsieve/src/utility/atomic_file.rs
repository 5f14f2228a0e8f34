//! # Atomic File Publication
//!
//! Outputs are written to a hidden sibling file and renamed into place on
//! [`AtomicFile::commit`]. An uncommitted [`AtomicFile`] removes its partial
//! file when dropped, so an aborted run never leaves a truncated artifact at
//! the target path.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::errors::{WSResult, WordsieveError};

/// Compute the partial-file path used while writing `target`.
pub fn partial_path<P: AsRef<Path>>(target: P) -> WSResult<PathBuf> {
    let target = target.as_ref();
    let name = target.file_name().ok_or_else(|| {
        WordsieveError::InvalidConfig(format!("output path has no file name: {}", target.display()))
    })?;

    let mut partial = std::ffi::OsString::from(".");
    partial.push(name);
    partial.push(".partial");
    Ok(target.with_file_name(partial))
}

/// A file which becomes visible at its target path only once committed.
#[derive(Debug)]
pub struct AtomicFile {
    target: PathBuf,
    partial: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl AtomicFile {
    /// Create the partial file for `target`.
    ///
    /// The parent directory of `target` must exist.
    pub fn create<P: AsRef<Path>>(target: P) -> WSResult<Self> {
        let target = target.as_ref().to_path_buf();
        let partial = partial_path(&target)?;
        let writer = BufWriter::new(File::create(&partial)?);

        Ok(Self {
            target,
            partial,
            writer: Some(writer),
        })
    }

    /// The path the file is published to.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Flush, sync, and rename the partial file over the target.
    pub fn commit(mut self) -> WSResult<PathBuf> {
        let Some(writer) = self.writer.take() else {
            return Ok(self.target.clone());
        };

        let published = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .and_then(|file| file.sync_all())
            .and_then(|_| fs::rename(&self.partial, &self.target));

        if let Err(err) = published {
            let _ = fs::remove_file(&self.partial);
            return Err(err.into());
        }

        log::debug!("published {}", self.target.display());
        Ok(self.target.clone())
    }

    fn writer_mut(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("atomic file already committed"))
    }
}

impl Write for AtomicFile {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> std::io::Result<usize> {
        self.writer_mut()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer_mut()?.flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            // Uncommitted; the target path is left untouched.
            let _ = fs::remove_file(&self.partial);
        }
    }
}
