//! Date parsing and display formats.
//!
//! Birth dates arrive either as plain `YYYY-MM-DD` strings (form
//! submissions) or as full RFC 3339 timestamps (document store exports).
//! Two display formats are used downstream:
//! - cards print `M/D/YYYY`
//! - spreadsheets print `Thu May 01 2008`

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Parse a date from either `YYYY-MM-DD` or an RFC 3339 timestamp.
/// Timestamps are converted to UTC before the date is taken.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Short numeric form printed on ID cards.
pub fn card_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Long form used in spreadsheet cells.
pub fn sheet_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Spreadsheet form of a timestamp (date part only, UTC).
pub fn sheet_timestamp(ts: DateTime<Utc>) -> String {
    sheet_date(ts.date_naive())
}

/// Serde adapter for [`NaiveDate`] fields that accept both input forms.
pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2008, 5, 1).unwrap();
        assert_eq!(parse_date("2008-05-01"), Some(expected));
        assert_eq!(parse_date("2008-05-01T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_date(" 2008-05-01 "), Some(expected));
        assert_eq!(parse_date("01/05/2008"), None);
    }

    #[test]
    fn test_display_formats() {
        let date = NaiveDate::from_ymd_opt(2008, 5, 1).unwrap();
        assert_eq!(card_date(date), "5/1/2008");
        assert_eq!(sheet_date(date), "Thu May 01 2008");
    }

    #[test]
    fn test_sheet_timestamp_uses_utc_date() {
        let ts = DateTime::parse_from_rfc3339("2024-07-15T23:30:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(sheet_timestamp(ts), "Mon Jul 15 2024");
    }
}
