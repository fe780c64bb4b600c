//! RecordFile - format-transparent file, plain or gzip
//!
//! The encoding is chosen by the process-wide `RecordFileType`; readers
//! detect it from the gzip magic bytes so callers never need to know.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use contracts::RecordFileType;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::error::DispatchError;
use crate::sinks::text::create_file;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

enum Encoder {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

/// Write side of a record file
pub struct RecordFile {
    path: PathBuf,
    encoder: Option<Encoder>,
}

impl RecordFile {
    /// Create `path` (plus the type's suffix, e.g. `.gz`)
    pub fn create(path: impl AsRef<Path>, file_type: RecordFileType) -> Result<Self, DispatchError> {
        let mut path = path.as_ref().as_os_str().to_owned();
        path.push(file_type.extension());
        let path = PathBuf::from(path);

        let file = BufWriter::new(create_file("record", &path)?);
        let encoder = match file_type {
            RecordFileType::Plain => Encoder::Plain(file),
            RecordFileType::Gzip => Encoder::Gzip(GzEncoder::new(file, Compression::default())),
        };
        Ok(Self {
            path,
            encoder: Some(encoder),
        })
    }

    /// Final on-disk path, suffix included
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, write the gzip trailer if any, and close
    pub fn finish(mut self) -> Result<(), DispatchError> {
        self.finish_inner()?;
        Ok(())
    }

    fn finish_inner(&mut self) -> io::Result<()> {
        match self.encoder.take() {
            Some(Encoder::Plain(mut w)) => w.flush()?,
            Some(Encoder::Gzip(gz)) => gz.finish()?.flush()?,
            None => {}
        }
        debug!(path = %self.path.display(), "RecordFile finished");
        Ok(())
    }

    /// Open a record file for reading, whatever its encoding
    ///
    /// A truncated gzip stream surfaces as an error while reading.
    pub fn open_read(path: impl AsRef<Path>) -> io::Result<Box<dyn BufRead>> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
        if is_gzip {
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
        } else {
            Ok(Box::new(reader))
        }
    }

    /// Copy the decoded content of `path` to `out`, returning the byte count
    pub fn cat(path: impl AsRef<Path>, out: &mut impl Write) -> io::Result<u64> {
        let mut reader = Self::open_read(path)?;
        io::copy(&mut reader, out)
    }

    /// Read the decoded content of `path` into a string
    pub fn read_to_string(path: impl AsRef<Path>) -> io::Result<String> {
        let mut content = String::new();
        Self::open_read(path)?.read_to_string(&mut content)?;
        Ok(content)
    }
}

impl Write for RecordFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.encoder.as_mut() {
            Some(Encoder::Plain(w)) => w.write(buf),
            Some(Encoder::Gzip(w)) => w.write(buf),
            None => Err(io::Error::other("record file already finished")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.encoder.as_mut() {
            Some(Encoder::Plain(w)) => w.flush(),
            Some(Encoder::Gzip(w)) => w.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RecordFile {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            if let Err(e) = self.finish_inner() {
                tracing::error!(path = %self.path.display(), error = %e, "RecordFile finish failed on drop");
            }
        }
    }
}
