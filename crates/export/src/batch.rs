//! Batch archive building with per-item failure isolation.

use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_student_model::StudentRecord;
use serde::Serialize;

use crate::archive::ArchiveSink;

/// One named archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Result of producing the entry for one record.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Entry produced as intended.
    Ready(ArchiveEntry),
    /// Entry produced, but part of it fell back to a substitute.
    Degraded(ArchiveEntry),
    /// Nothing to write for this record.
    Skipped { reason: String },
    /// The entry could not be produced.
    Failed(CampusCardError),
}

/// Produces one archive entry per student record.
pub trait ItemProducer {
    /// Short label used in logs.
    fn label(&self) -> &'static str;

    fn produce(&self, record: &StudentRecord, college_name: &str) -> ItemOutcome;
}

/// An item that did not make it into the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub admission_no: String,
    pub name: String,
    pub reason: String,
}

impl ItemFailure {
    fn new(record: &StudentRecord, reason: impl Into<String>) -> Self {
        Self {
            admission_no: record.admission_no.clone(),
            name: record.name.clone(),
            reason: reason.into(),
        }
    }
}

/// Aggregate outcome of a batch.
///
/// `degraded` counts written entries that used a substitute, so it is
/// always at most `written`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub written: usize,
    pub degraded: usize,
    pub skipped: usize,
    pub failed: Vec<ItemFailure>,
}

impl ArchiveReport {
    pub fn processed(&self) -> usize {
        self.written + self.skipped + self.failed.len()
    }
}

/// Progress report for a running batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Progress callback invoked after every item.
pub type ProgressCallback = Box<dyn Fn(BatchProgress) + Send>;

/// Drives an [`ItemProducer`] over a record set into an [`ArchiveSink`].
///
/// Items are processed one at a time in input order. Producer failures and
/// rejected entries are recorded and skipped. Only a closed sink aborts the
/// batch; otherwise the archive is always finalized, even when empty.
#[derive(Default)]
pub struct ArchiveBuilder {
    progress: Option<ProgressCallback>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn build(
        &self,
        records: &[StudentRecord],
        college_name: &str,
        producer: &dyn ItemProducer,
        sink: &mut dyn ArchiveSink,
    ) -> CampusCardResult<ArchiveReport> {
        let mut report = ArchiveReport::default();
        let total = records.len();

        tracing::info!(
            producer = producer.label(),
            total,
            college = college_name,
            "Building archive"
        );

        for (index, record) in records.iter().enumerate() {
            match producer.produce(record, college_name) {
                ItemOutcome::Ready(entry) => {
                    self.write_entry(record, &entry, false, sink, &mut report)?;
                }
                ItemOutcome::Degraded(entry) => {
                    self.write_entry(record, &entry, true, sink, &mut report)?;
                }
                ItemOutcome::Skipped { reason } => {
                    tracing::info!(admission_no = %record.admission_no, "Skipped: {reason}");
                    report.skipped += 1;
                }
                ItemOutcome::Failed(err) => {
                    tracing::warn!(admission_no = %record.admission_no, "Item failed: {err}");
                    report.failed.push(ItemFailure::new(record, err.to_string()));
                }
            }

            if let Some(cb) = &self.progress {
                cb(BatchProgress {
                    processed: index + 1,
                    total,
                });
            }
        }

        sink.finish()?;

        tracing::info!(
            producer = producer.label(),
            written = report.written,
            degraded = report.degraded,
            skipped = report.skipped,
            failed = report.failed.len(),
            "Archive finished"
        );
        Ok(report)
    }

    fn write_entry(
        &self,
        record: &StudentRecord,
        entry: &ArchiveEntry,
        degraded: bool,
        sink: &mut dyn ArchiveSink,
        report: &mut ArchiveReport,
    ) -> CampusCardResult<()> {
        match sink.append(&entry.name, &entry.bytes) {
            Ok(()) => {
                tracing::debug!(entry = %entry.name, bytes = entry.bytes.len(), degraded, "Entry written");
                report.written += 1;
                if degraded {
                    report.degraded += 1;
                }
                Ok(())
            }
            Err(err) if err.is_batch_fatal() => {
                tracing::warn!(
                    entry = %entry.name,
                    written = report.written,
                    "Output failed, aborting batch: {err}"
                );
                Err(err)
            }
            Err(err) => {
                tracing::warn!(entry = %entry.name, "Entry rejected: {err}");
                report.failed.push(ItemFailure::new(record, err.to_string()));
                Ok(())
            }
        }
    }
}
