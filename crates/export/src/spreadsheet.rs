//! Tabular export of a tenant's records as an `.xlsx` workbook.

use campuscard_common::error::{CampusCardError, CampusCardResult};
use campuscard_student_model::dates::{sheet_date, sheet_timestamp};
use campuscard_student_model::StudentRecord;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

pub const SHEET_NAME: &str = "Students";

pub const COLUMNS: [&str; 12] = [
    "Name",
    "Class",
    "Section",
    "Aadhar",
    "Phone",
    "Father Name",
    "Mother Name",
    "Date of Birth",
    "Address",
    "Admission No",
    "Email",
    "Created At",
];

const COLUMN_WIDTH: f64 = 20.0;

pub type SheetRow = [String; 12];

/// Cell values for one record, in [`COLUMNS`] order.
pub fn sheet_row(record: &StudentRecord) -> SheetRow {
    [
        record.name.clone(),
        record.class_name.clone(),
        record.section.clone(),
        record.aadhar.clone(),
        record.phone.clone(),
        record.father_name.clone(),
        record.mother_name.clone(),
        sheet_date(record.dob),
        record.address.clone(),
        record.admission_no.clone(),
        record.email.clone(),
        record.created_at.map(sheet_timestamp).unwrap_or_default(),
    ]
}

pub fn sheet_rows(records: &[StudentRecord]) -> Vec<SheetRow> {
    records.iter().map(sheet_row).collect()
}

fn xlsx_error(err: XlsxError) -> CampusCardError {
    CampusCardError::spreadsheet(err.to_string())
}

/// Build the workbook in memory: a bold header row followed by one row per
/// record, all cells written as text.
pub fn write_xlsx(records: &[StudentRecord]) -> CampusCardResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

    for (col, title) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *title, &header)
            .map_err(xlsx_error)?;
        worksheet
            .set_column_width(col, COLUMN_WIDTH)
            .map_err(xlsx_error)?;
    }

    for (index, row) in sheet_rows(records).iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_num, col as u16, value)
                .map_err(xlsx_error)?;
        }
    }

    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
    tracing::debug!(rows = records.len(), bytes = bytes.len(), "Spreadsheet built");
    Ok(bytes)
}
