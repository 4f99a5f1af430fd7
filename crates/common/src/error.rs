//! Error types shared across CampusCard crates.

/// Top-level error type for CampusCard operations.
#[derive(Debug, thiserror::Error)]
pub enum CampusCardError {
    #[error("Render error: {message}")]
    Render { message: String },

    #[error("QR encoding error: {message}")]
    Qr { message: String },

    #[error("Photo fetch error for {uri}: {message}")]
    Fetch { uri: String, message: String },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Spreadsheet error: {message}")]
    Spreadsheet { message: String },

    #[error("Record store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("No students found for tenant {tenant}")]
    NotFound { tenant: String },

    #[error("Invalid student record: {message}")]
    InvalidRecord { message: String },

    #[error("Output sink closed before the export finished")]
    SinkClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CampusCardError.
pub type CampusCardResult<T> = Result<T, CampusCardError>;

impl CampusCardError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn qr(msg: impl Into<String>) -> Self {
        Self::Qr {
            message: msg.into(),
        }
    }

    pub fn fetch(uri: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            uri: uri.into(),
            message: msg.into(),
        }
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive {
            message: msg.into(),
        }
    }

    pub fn spreadsheet(msg: impl Into<String>) -> Self {
        Self::Spreadsheet {
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn not_found(tenant: impl Into<String>) -> Self {
        Self::NotFound {
            tenant: tenant.into(),
        }
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: msg.into(),
        }
    }

    /// Classify an error raised while writing export output. A peer that
    /// went away surfaces as [`CampusCardError::SinkClosed`].
    pub fn from_sink_io(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::BrokenPipe | ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset => {
                Self::SinkClosed
            }
            _ => Self::Io(err),
        }
    }

    /// Whether this error aborts a whole export rather than a single item.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Store { .. } | Self::SinkClosed
        )
    }
}
