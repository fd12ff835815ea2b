use chrono::NaiveDate;

use crate::{ClientError, ClientResult};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Day-first rendering used by the ledger screens.
pub fn format_display_date(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Lenient parse for stored dates; malformed legacy values yield `None`.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    if !looks_like_iso_date(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Strict parse for dates typed by the user.
pub fn parse_input_date(value: &str, field_name: &str) -> ClientResult<NaiveDate> {
    let trimmed = value.trim();
    if !looks_like_iso_date(trimmed) {
        return Err(ClientError::validation_failed(
            field_name,
            &format!("`{field_name}` must use YYYY-MM-DD format."),
        ));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        ClientError::validation_failed(
            field_name,
            &format!("`{field_name}` must be a real calendar date."),
        )
    })
}

pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{format_display_date, month_name, parse_input_date, parse_record_date};

    #[test]
    fn record_dates_parse_leniently() {
        assert!(parse_record_date("2024-03-10").is_some());
        assert!(parse_record_date("2024-02-30").is_none());
        assert!(parse_record_date("10/03/2024").is_none());
        assert!(parse_record_date("").is_none());
        assert!(parse_record_date("2024-3-10").is_none());
    }

    #[test]
    fn input_dates_report_the_field() {
        let result = parse_input_date("2024-13-01", "date");
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "validation_failed");
        }
    }

    #[test]
    fn display_dates_are_day_first() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert!(date.is_some());
        if let Some(value) = date {
            assert_eq!(format_display_date(&value), "09/03/2024");
        }
    }

    #[test]
    fn month_names_cover_the_calendar() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
