// Date normalisation into `YYYY-MM-DD`.
// Model output and MRZ dates follow different fallback rules and are kept apart.

use chrono::{Datelike, NaiveDate};

/// Formats tried, in order, for dates read off a document image.
const DOCUMENT_DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalise a date extracted by the vision model.
///
/// The first format that parses wins, so `01/02/2024` is read day first.
/// Unrecognised input is returned unchanged.
pub fn normalize_date(date_str: &str) -> String {
    let trimmed = date_str.trim();
    DOCUMENT_DATE_FORMATS
        .iter()
        .find_map(|format| parse_with_four_digit_year(trimmed, format))
        .map(|date| date.format(ISO_DATE_FORMAT).to_string())
        .unwrap_or_else(|| date_str.to_string())
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_iso_date(date_str: &str) -> Option<NaiveDate> {
    parse_with_four_digit_year(date_str, ISO_DATE_FORMAT)
}

// chrono accepts short years for %Y; printed documents always carry four digits.
fn parse_with_four_digit_year(date_str: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, format)
        .ok()
        .filter(|date| (1000..=9999).contains(&date.year()))
}

/// Parse an MRZ `YYMMDD` date.
///
/// Two digit years 00-68 land in 2000-2068 and 69-99 in 1969-1999.
pub fn parse_mrz_date(yymmdd: &str) -> Option<NaiveDate> {
    if yymmdd.len() != 6 || !yymmdd.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let yy: i32 = yymmdd[0..2].parse().ok()?;
    let month: u32 = yymmdd[2..4].parse().ok()?;
    let day: u32 = yymmdd[4..6].parse().ok()?;
    let year = if yy < 69 { 2000 + yy } else { 1900 + yy };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert an MRZ `YYMMDD` date to `YYYY-MM-DD`, or `None` if it does not parse.
pub fn format_mrz_date(yymmdd: &str) -> Option<String> {
    parse_mrz_date(yymmdd).map(|date| date.format(ISO_DATE_FORMAT).to_string())
}
