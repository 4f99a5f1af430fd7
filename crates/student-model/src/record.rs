//! Student record types.
//!
//! A record is created once when a student submits the registration form
//! and is never modified afterwards. Exports read records as snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::naming;
use crate::tenant::TenantId;

/// One student's submission (`students.json` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Full name as entered by the student.
    pub name: String,

    /// Admission number, unique within a college.
    pub admission_no: String,

    /// Class or grade (e.g. "10").
    #[serde(rename = "class")]
    pub class_name: String,

    #[serde(default)]
    pub section: String,

    /// National identity number.
    #[serde(default)]
    pub aadhar: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub father_name: String,

    #[serde(default)]
    pub mother_name: String,

    /// Date of birth.
    #[serde(with = "dates::flexible_date")]
    pub dob: NaiveDate,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub email: String,

    /// URI of the uploaded photo (http(s), file:// or a local path).
    /// Older documents store it under `studentImage`.
    #[serde(default, alias = "studentImage")]
    pub photo_reference: Option<String>,

    /// Owning college.
    pub college_id: TenantId,

    /// Display name of the owning college at submission time.
    pub college_name: String,

    /// Registration link the record was submitted through.
    #[serde(default)]
    pub link_id: String,

    /// Submission timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl StudentRecord {
    /// Check the fields every export depends on.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::MissingField { field: "name" });
        }
        if self.admission_no.trim().is_empty() {
            return Err(RecordError::MissingField {
                field: "admissionNo",
            });
        }
        Ok(())
    }

    /// Photo reference, ignoring blank values.
    pub fn photo_uri(&self) -> Option<&str> {
        self.photo_reference
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }

    /// `"{class} - {section}"` as printed on cards.
    pub fn class_section(&self) -> String {
        format!("{} - {}", self.class_name, self.section)
    }

    /// Birth date as printed on cards.
    pub fn dob_display(&self) -> String {
        dates::card_date(self.dob)
    }

    /// Archive entry name for this student's ID card.
    pub fn card_entry_name(&self) -> String {
        naming::card_entry_name(&self.admission_no, &self.name)
    }

    /// Archive entry name for this student's raw photo.
    pub fn photo_entry_name(&self, extension: &str) -> String {
        naming::photo_entry_name(&self.name, &self.admission_no, extension)
    }
}

/// Errors raised when a record breaks the model's invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("required field `{field}` is empty")]
    MissingField { field: &'static str },
}

/// A store entry that could not be decoded into a [`StudentRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position in the store array.
    pub index: usize,
    /// Owning college, when the entry names one.
    pub college_id: Option<TenantId>,
    /// Admission number, when the entry carries one.
    pub admission_no: Option<String>,
    pub reason: String,
}

/// Store contents decoded entry by entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub records: Vec<StudentRecord>,
    pub rejected: Vec<RejectedRecord>,
}

/// Parse a JSON array of records.
///
/// Only a document that is not an array fails as a whole. Entries that do
/// not decode are collected in [`RecordSet::rejected`].
pub fn parse_records(json: &str) -> Result<RecordSet, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut set = RecordSet::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let field = |key: &str| entry.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let college_id = field("collegeId").map(TenantId::new);
        let admission_no = field("admissionNo");
        match serde_json::from_value::<StudentRecord>(entry) {
            Ok(record) => set.records.push(record),
            Err(e) => set.rejected.push(RejectedRecord {
                index,
                college_id,
                admission_no,
                reason: e.to_string(),
            }),
        }
    }
    Ok(set)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_store_export() {
        let json = r#"[{
            "_id": "65f0c0ffee",
            "studentImage": "https://res.cloudinary.com/demo/asha.jpg",
            "name": "Asha Rao",
            "class": "10",
            "section": "B",
            "aadhar": "1234",
            "phone": "9876543210",
            "fatherName": "Suresh Rao",
            "motherName": "Meena Rao",
            "dob": "2008-05-01T00:00:00.000Z",
            "address": "12 Lake Road",
            "admissionNo": "A100",
            "email": "asha@example.com",
            "collegeId": "greenfield",
            "collegeName": "Greenfield College",
            "linkId": "abc",
            "createdAt": "2024-07-15T10:00:00Z"
        }]"#;

        let records = parse_records(json).unwrap().records;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.class_name, "10");
        assert_eq!(
            record.photo_uri(),
            Some("https://res.cloudinary.com/demo/asha.jpg")
        );
        assert_eq!(record.dob, NaiveDate::from_ymd_opt(2008, 5, 1).unwrap());
        assert_eq!(record.college_id.as_str(), "greenfield");
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"[{
            "name": "Ravi",
            "admissionNo": "7",
            "class": "9",
            "dob": "2010-01-02",
            "collegeId": "c1",
            "collegeName": "C One"
        }]"#;

        let record = &parse_records(json).unwrap().records[0];
        assert_eq!(record.photo_uri(), None);
        assert_eq!(record.section, "");
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn test_undecodable_entries_are_rejected_individually() {
        let json = r#"[
            {"name":"Ravi","admissionNo":"7","class":"9","dob":"2010-01-02",
             "collegeId":"c1","collegeName":"C One"},
            {"name":"Broken","admissionNo":"8","class":"9","dob":"",
             "collegeId":"c2","collegeName":"C Two"},
            {"name":"No Class","admissionNo":"9","dob":"2010-01-02",
             "collegeId":"c1","collegeName":"C One"},
            "not an object"
        ]"#;

        let set = parse_records(json).unwrap();
        assert_eq!(set.records.len(), 1);
        assert_eq!(set.records[0].admission_no, "7");

        let rejected: Vec<(usize, Option<&str>)> = set
            .rejected
            .iter()
            .map(|r| (r.index, r.admission_no.as_deref()))
            .collect();
        assert_eq!(rejected, [(1, Some("8")), (2, Some("9")), (3, None)]);
        assert_eq!(set.rejected[0].college_id, Some(TenantId::from("c2")));
        assert!(set.rejected[1].reason.contains("class"));
    }

    #[test]
    fn test_non_array_document_is_an_error() {
        assert!(parse_records(r#"{"name":"Ravi"}"#).is_err());
    }

    #[test]
    fn test_validate_requires_name_and_admission_no() {
        let mut record = fixtures::asha();
        assert!(record.validate().is_ok());

        record.admission_no = "  ".to_string();
        assert_eq!(
            record.validate(),
            Err(RecordError::MissingField {
                field: "admissionNo"
            })
        );

        record.name = String::new();
        assert_eq!(
            record.validate(),
            Err(RecordError::MissingField { field: "name" })
        );
    }

    #[test]
    fn test_blank_photo_reference_is_absent() {
        let mut record = fixtures::asha();
        record.photo_reference = Some("   ".to_string());
        assert_eq!(record.photo_uri(), None);
    }

    #[test]
    fn test_card_display_helpers() {
        let record = fixtures::asha();
        assert_eq!(record.class_section(), "10 - B");
        assert_eq!(record.dob_display(), "5/1/2008");
        assert_eq!(record.card_entry_name(), "A100_Asha_Rao_ID_Card.png");
        assert_eq!(record.photo_entry_name("jpg"), "Asha_Rao_A100.jpg");
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let value = serde_json::to_value(fixtures::asha()).unwrap();
        assert_eq!(value["admissionNo"], "A100");
        assert_eq!(value["class"], "10");
        assert_eq!(value["dob"], "2008-05-01");
        assert_eq!(value["photoReference"], "https://cdn.example.com/asha.jpg");
    }
}
