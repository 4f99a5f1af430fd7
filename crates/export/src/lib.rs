//! CampusCard Export
//!
//! Turns a tenant's student records into downloadable outputs:
//!
//! - **ID-card archive**: one rendered PNG per student, zipped
//! - **Image archive**: each student's original photo, zipped
//! - **Spreadsheet**: one `.xlsx` row per student
//!
//! Archives are written entry by entry into any [`std::io::Write`] so a
//! caller can stream them to a file or an HTTP response. A failing item
//! (unreachable photo, invalid record) never aborts the batch.

pub mod archive;
pub mod batch;
pub mod coordinator;
pub mod fetch;
pub mod producers;
pub mod source;
pub mod spreadsheet;

pub use archive::{ArchiveSink, ZipArchiveSink};
pub use batch::{ArchiveBuilder, ArchiveReport, ItemFailure, ItemOutcome, ItemProducer};
pub use coordinator::{ExportCoordinator, ExportKind, ExportSummary, PreparedExport};
pub use fetch::UriPhotoFetcher;
pub use source::{InMemoryRecordStore, JsonRecordStore, RecordSource};
