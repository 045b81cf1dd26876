use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Date-only layouts seen in chart exports.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Timestamp layouts; the time part is discarded.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// Release dates with reduced precision: "2019" or "2019-05"
static PARTIAL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<year>\d{4})(?:-(?P<month>\d{1,2}))?$").unwrap()
});

/// Parse a calendar date. Returns `None` for anything that isn't a full date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Extract the release year from a release date.
/// Accepts full dates plus year-only and year-month precision.
pub fn parse_release_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Some(caps) = PARTIAL_DATE_RE.captures(s) {
        if let Some(month) = caps.name("month") {
            let m: u32 = month.as_str().parse().ok()?;
            if !(1..=12).contains(&m) {
                return None;
            }
        }
        return caps["year"].parse().ok();
    }
    parse_date(s).map(|d| d.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("2020-01-08"), NaiveDate::from_ymd_opt(2020, 1, 8));
        assert_eq!(parse_date(" 2020-01-08 "), NaiveDate::from_ymd_opt(2020, 1, 8));
    }

    #[test]
    fn test_parse_timestamp_drops_time() {
        assert_eq!(
            parse_date("2021-03-06 00:00:00"),
            NaiveDate::from_ymd_opt(2021, 3, 6)
        );
        assert_eq!(
            parse_date("2021-03-06T12:30:00"),
            NaiveDate::from_ymd_opt(2021, 3, 6)
        );
    }

    #[test]
    fn test_parse_slash_dates() {
        assert_eq!(parse_date("2019/12/28"), NaiveDate::from_ymd_opt(2019, 12, 28));
        assert_eq!(parse_date("12/28/2019"), NaiveDate::from_ymd_opt(2019, 12, 28));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2020-13-01"), None);
        assert_eq!(parse_date("2020-02-30"), None);
    }

    #[test]
    fn test_release_year_precisions() {
        assert_eq!(parse_release_year("2017-06-23"), Some(2017));
        assert_eq!(parse_release_year("2017-06"), Some(2017));
        assert_eq!(parse_release_year("2017"), Some(2017));
        assert_eq!(parse_release_year("2017-06-23 00:00:00"), Some(2017));
    }

    #[test]
    fn test_release_year_rejects_bad_input() {
        assert_eq!(parse_release_year(""), None);
        assert_eq!(parse_release_year("2017-13"), None);
        assert_eq!(parse_release_year("unknown"), None);
        assert_eq!(parse_release_year("17"), None);
    }
}
