//! Write-as-you-go archive sinks.

use std::collections::HashSet;
use std::io::Write;

use campuscard_common::error::{CampusCardError, CampusCardResult};
use zip::result::ZipError;
use zip::write::{SimpleFileOptions, StreamWriter};
use zip::{CompressionMethod, ZipWriter};

/// Destination for named archive entries.
///
/// Entries are written in call order and never buffered as a whole.
pub trait ArchiveSink {
    /// Append one entry. Names must be unique within the archive.
    fn append(&mut self, name: &str, bytes: &[u8]) -> CampusCardResult<()>;

    /// Write the archive trailer. No entries may follow.
    fn finish(&mut self) -> CampusCardResult<()>;

    /// Number of entries appended so far.
    fn entry_count(&self) -> usize;
}

/// Streams a Deflate-compressed zip into any [`Write`], without seeking.
pub struct ZipArchiveSink<W: Write> {
    zip: Option<ZipWriter<StreamWriter<W>>>,
    names: HashSet<String>,
}

impl<W: Write> ZipArchiveSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: Some(ZipWriter::new_stream(writer)),
            names: HashSet::new(),
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9))
    }
}

fn zip_error(err: ZipError) -> CampusCardError {
    match err {
        ZipError::Io(io) => CampusCardError::from_sink_io(io),
        other => CampusCardError::archive(other.to_string()),
    }
}

impl<W: Write> ArchiveSink for ZipArchiveSink<W> {
    fn append(&mut self, name: &str, bytes: &[u8]) -> CampusCardResult<()> {
        let zip = self
            .zip
            .as_mut()
            .ok_or_else(|| CampusCardError::archive("archive already finished"))?;
        if self.names.contains(name) {
            return Err(CampusCardError::archive(format!(
                "duplicate entry name `{name}`"
            )));
        }

        zip.start_file(name, Self::options()).map_err(zip_error)?;
        zip.write_all(bytes).map_err(CampusCardError::from_sink_io)?;
        self.names.insert(name.to_string());
        Ok(())
    }

    fn finish(&mut self) -> CampusCardResult<()> {
        let zip = self
            .zip
            .take()
            .ok_or_else(|| CampusCardError::archive("archive already finished"))?;
        let mut inner = zip.finish().map_err(zip_error)?;
        inner.flush().map_err(CampusCardError::from_sink_io)?;
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.names.len()
    }
}
