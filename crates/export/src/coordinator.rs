//! Export orchestration: fetch records, pick the output, stream it.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use campuscard_card_render::{CardTheme, PhotoFetcher, RenderOptions};
use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_student_model::{StudentRecord, TenantId};

use crate::archive::ZipArchiveSink;
use crate::batch::{ArchiveBuilder, ArchiveReport, ProgressCallback};
use crate::producers::{IdCardProducer, PhotoPassthroughProducer};
use crate::source::RecordSource;
use crate::spreadsheet::write_xlsx;

pub const ZIP_CONTENT_TYPE: &str = "application/zip";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// What to export for a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Zip of rendered ID card PNGs.
    IdCards(CardTheme),
    /// Zip of the original student photos.
    Images,
    /// Single `.xlsx` workbook.
    Spreadsheet,
}

impl ExportKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::IdCards(_) => "id-cards",
            Self::Images => "images",
            Self::Spreadsheet => "excel",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses `id-cards`, `images` or `excel`; ID cards use the default theme.
impl FromStr for ExportKind {
    type Err = CampusCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id-cards" | "idcards" | "cards" => Ok(Self::IdCards(CardTheme::default())),
            "images" | "photos" => Ok(Self::Images),
            "excel" | "xlsx" | "spreadsheet" => Ok(Self::Spreadsheet),
            other => Err(CampusCardError::config(format!(
                "unknown export kind `{other}` (expected id-cards, images or excel)"
            ))),
        }
    }
}

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSummary {
    Archive(ArchiveReport),
    Spreadsheet { rows: usize, bytes: usize },
}

/// Runs exports against a record source.
pub struct ExportCoordinator {
    source: Arc<dyn RecordSource>,
    fetcher: Arc<dyn PhotoFetcher>,
    options: RenderOptions,
}

impl ExportCoordinator {
    pub fn new(
        source: Arc<dyn RecordSource>,
        fetcher: Arc<dyn PhotoFetcher>,
        options: RenderOptions,
    ) -> Self {
        Self {
            source,
            fetcher,
            options,
        }
    }

    /// Fetch the tenant's records and return an export ready to write.
    ///
    /// Fails with [`CampusCardError::NotFound`] before any output exists when
    /// the tenant has no records.
    pub fn prepare(&self, kind: ExportKind, tenant: &TenantId) -> CampusCardResult<PreparedExport> {
        let records = self.source.fetch_records_for_tenant(tenant)?;
        let college_name = records
            .first()
            .map(|record| record.college_name.clone())
            .unwrap_or_else(|| tenant.to_string());

        tracing::info!(
            tenant = %tenant,
            kind = kind.name(),
            records = records.len(),
            "Export prepared"
        );

        Ok(PreparedExport {
            kind,
            tenant: tenant.clone(),
            college_name,
            records,
            fetcher: Arc::clone(&self.fetcher),
            options: self.options.clone(),
            progress: None,
        })
    }
}

/// A tenant's record snapshot bound to an export kind.
pub struct PreparedExport {
    kind: ExportKind,
    tenant: TenantId,
    college_name: String,
    records: Vec<StudentRecord>,
    fetcher: Arc<dyn PhotoFetcher>,
    options: RenderOptions,
    progress: Option<ProgressCallback>,
}

impl PreparedExport {
    pub fn kind(&self) -> ExportKind {
        self.kind
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn college_name(&self) -> &str {
        &self.college_name
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn content_type(&self) -> &'static str {
        match self.kind {
            ExportKind::IdCards(_) | ExportKind::Images => ZIP_CONTENT_TYPE,
            ExportKind::Spreadsheet => XLSX_CONTENT_TYPE,
        }
    }

    /// Suggested download name.
    pub fn file_name(&self) -> String {
        let college = &self.college_name;
        match self.kind {
            ExportKind::IdCards(_) => format!("{college}_ID_Cards.zip"),
            ExportKind::Images => format!("{college}_student_images.zip"),
            ExportKind::Spreadsheet => format!("{college}_students.xlsx"),
        }
    }

    /// Write the export to `writer`, entry by entry for archives.
    pub fn write_to<W: Write>(self, writer: W) -> CampusCardResult<ExportSummary> {
        let span = tracing::info_span!("export", tenant = %self.tenant, kind = self.kind.name());
        let _guard = span.enter();

        let mut builder = ArchiveBuilder::new();
        if let Some(progress) = self.progress {
            builder = builder.with_progress(progress);
        }

        match self.kind {
            ExportKind::IdCards(theme) => {
                let producer = IdCardProducer::new(theme, self.fetcher.as_ref(), &self.options);
                let mut sink = ZipArchiveSink::new(writer);
                let report = builder.build(&self.records, &self.college_name, &producer, &mut sink)?;
                Ok(ExportSummary::Archive(report))
            }
            ExportKind::Images => {
                let producer = PhotoPassthroughProducer::new(self.fetcher.as_ref());
                let mut sink = ZipArchiveSink::new(writer);
                let report = builder.build(&self.records, &self.college_name, &producer, &mut sink)?;
                Ok(ExportSummary::Archive(report))
            }
            ExportKind::Spreadsheet => {
                let bytes = write_xlsx(&self.records)?;
                let mut writer = writer;
                writer.write_all(&bytes).map_err(CampusCardError::from_sink_io)?;
                writer.flush().map_err(CampusCardError::from_sink_io)?;
                tracing::info!(rows = self.records.len(), bytes = bytes.len(), "Spreadsheet written");
                Ok(ExportSummary::Spreadsheet {
                    rows: self.records.len(),
                    bytes: bytes.len(),
                })
            }
        }
    }
}

impl fmt::Debug for PreparedExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedExport")
            .field("kind", &self.kind)
            .field("tenant", &self.tenant)
            .field("college_name", &self.college_name)
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}
