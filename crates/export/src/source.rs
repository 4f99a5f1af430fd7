//! Record sources: where a tenant's student records come from.

use std::path::{Path, PathBuf};

use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_student_model::{parse_records, RecordSet, StudentRecord, TenantId};

/// Read access to the student record store.
pub trait RecordSource: Send + Sync {
    /// All records of `tenant`, in store order.
    ///
    /// Returns [`CampusCardError::NotFound`] when the tenant has no records.
    fn fetch_records_for_tenant(&self, tenant: &TenantId) -> CampusCardResult<Vec<StudentRecord>>;
}

fn select_tenant(
    records: impl IntoIterator<Item = StudentRecord>,
    tenant: &TenantId,
) -> CampusCardResult<Vec<StudentRecord>> {
    let selected: Vec<StudentRecord> = records
        .into_iter()
        .filter(|record| &record.college_id == tenant)
        .collect();
    if selected.is_empty() {
        return Err(CampusCardError::not_found(tenant.as_str()));
    }
    Ok(selected)
}

/// Records stored as a JSON array in a single file.
///
/// The file is re-read on every call so each export sees a fresh snapshot.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record regardless of tenant, together with the entries
    /// that failed to decode.
    pub fn load_all(&self) -> CampusCardResult<RecordSet> {
        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            CampusCardError::store(format!("cannot read {}: {e}", self.path.display()))
        })?;
        parse_records(&json).map_err(|e| {
            CampusCardError::store(format!("malformed records in {}: {e}", self.path.display()))
        })
    }
}

impl RecordSource for JsonRecordStore {
    fn fetch_records_for_tenant(&self, tenant: &TenantId) -> CampusCardResult<Vec<StudentRecord>> {
        let set = self.load_all()?;
        tracing::debug!(
            tenant = %tenant,
            total = set.records.len(),
            rejected = set.rejected.len(),
            path = %self.path.display(),
            "Loaded record store"
        );
        for entry in &set.rejected {
            // Entries without a readable college id may belong to anyone.
            if entry.college_id.as_ref().map_or(true, |id| id == tenant) {
                tracing::warn!(
                    tenant = %tenant,
                    index = entry.index,
                    admission_no = entry.admission_no.as_deref().unwrap_or("?"),
                    "Skipping malformed record: {}",
                    entry.reason
                );
            }
        }
        select_tenant(set.records, tenant)
    }
}

/// Fixed record set held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Vec<StudentRecord>,
}

impl InMemoryRecordStore {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for InMemoryRecordStore {
    fn fetch_records_for_tenant(&self, tenant: &TenantId) -> CampusCardResult<Vec<StudentRecord>> {
        select_tenant(self.records.iter().cloned(), tenant)
    }
}
