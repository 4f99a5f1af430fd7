//! Archive entry naming.
//!
//! Entry names are derived only from record fields, so two exports of the
//! same record set always produce the same names. Admission numbers are
//! unique per tenant, which keeps names unique within one archive.

/// Characters that would create directories or break common filesystems.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Collapse whitespace runs to `_` and replace reserved characters.
pub fn sanitize_component(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// `{admissionNo}_{name}_ID_Card.png`
pub fn card_entry_name(admission_no: &str, name: &str) -> String {
    format!(
        "{}_{}_ID_Card.png",
        sanitize_component(admission_no),
        sanitize_component(name)
    )
}

/// `{name}_{admissionNo}.{ext}`
pub fn photo_entry_name(name: &str, admission_no: &str, extension: &str) -> String {
    format!(
        "{}_{}.{extension}",
        sanitize_component(name),
        sanitize_component(admission_no)
    )
}
