//! TextSink - append-only line-oriented log file

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DispatchError;

/// Create `path`'s parent directory, then the file itself
pub(crate) fn create_file(name: &str, path: &Path) -> Result<File, DispatchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DispatchError::sink_open(name, path, e))?;
    }
    File::create(path).map_err(|e| DispatchError::sink_open(name, path, e))
}

/// Flat text sink holding one open handle for its whole lifetime
pub struct TextSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines: u64,
}

impl TextSink {
    /// Create (truncate) the file at `path`
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, DispatchError> {
        let path = path.into();
        let file = create_file("text", &path)?;
        debug!(path = %path.display(), "TextSink opened");
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            lines: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines written so far
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Append one line; a newline is added
    pub fn write_line(&mut self, line: impl fmt::Display) -> Result<(), DispatchError> {
        let writer = self.writer.as_mut().ok_or_else(|| DispatchError::SinkClosed {
            name: self.path.display().to_string(),
        })?;
        writeln!(writer, "{line}")?;
        self.lines += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DispatchError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flush and release the handle. Idempotent.
    pub fn close(&mut self) -> Result<(), DispatchError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            debug!(path = %self.path.display(), lines = self.lines, "TextSink closed");
        }
        Ok(())
    }
}

/// Series of text files, one per sample, keeping only the newest `max_files`
pub struct RotatingTextFiles {
    dir: PathBuf,
    prefix: String,
    suffix: String,
    max_files: usize,
    kept: VecDeque<PathBuf>,
}

impl RotatingTextFiles {
    /// Files are named `{dir}/{prefix}{label}{suffix}`
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        max_files: usize,
    ) -> Result<Self, DispatchError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| DispatchError::sink_open("rotating", &dir, e))?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            suffix: suffix.into(),
            max_files: max_files.max(1),
            kept: VecDeque::new(),
        })
    }

    /// Open the next file and drop the oldest ones beyond `max_files`
    pub fn open_next(&mut self, label: impl fmt::Display) -> Result<TextSink, DispatchError> {
        let path = self
            .dir
            .join(format!("{}{}{}", self.prefix, label, self.suffix));
        let sink = TextSink::create(&path)?;
        self.kept.push_back(path);

        while self.kept.len() > self.max_files {
            if let Some(oldest) = self.kept.pop_front() {
                fs::remove_file(&oldest)?;
                debug!(path = %oldest.display(), "Rotated out");
            }
        }
        Ok(sink)
    }

    /// Files currently on disk, oldest first
    pub fn kept(&self) -> impl Iterator<Item = &Path> {
        self.kept.iter().map(PathBuf::as_path)
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }
}
