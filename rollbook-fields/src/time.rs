//! Timestamp parsing for the time field kinds.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Format a timestamp value with a chrono pattern.
///
/// Accepts RFC 3339 strings (shifted to `offset`), naive date-times and dates
/// (formatted as given), and epoch milliseconds. Returns `None` for anything
/// else, or when `pattern` is not a valid strftime pattern.
pub fn format_timestamp(value: &Value, pattern: &str, offset: FixedOffset) -> Option<String> {
    let naive = match value {
        Value::String(s) => parse_str(s.trim(), offset)?,
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::<Utc>::from_timestamp_millis(millis)?
                .with_timezone(&offset)
                .naive_local()
        }
        _ => return None,
    };
    let mut out = String::new();
    write!(out, "{}", naive.format(pattern)).ok()?;
    Some(out)
}

fn parse_str(s: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&offset).naive_local());
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Build the display offset from minutes east of UTC, falling back to UTC.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("2024-03-01T10:00:00Z"), "%d/%m/%Y", 0, Some("01/03/2024"))]
    #[case(json!("2024-03-01T10:00:00Z"), "%H:%M:%S", 420, Some("17:00:00"))]
    #[case(json!("2024-02-29T23:30:00Z"), "%d/%m/%Y", 60, Some("01/03/2024"))]
    #[case(json!("2024-03-01T10:00:00.123"), "%d/%m/%Y %H:%M:%S", 420, Some("01/03/2024 10:00:00"))]
    #[case(json!("2024-11-05"), "%m", 0, Some("11"))]
    #[case(json!(0), "%d/%m/%Y", 0, Some("01/01/1970"))]
    #[case(json!("yesterday"), "%d/%m/%Y", 0, None)]
    #[case(json!(null), "%d/%m/%Y", 0, None)]
    #[case(json!("2024-03-01T10:00:00Z"), "%Q", 0, None)]
    #[case(json!("2024-03-01T10:00:00Z"), "%d/%", 0, None)]
    fn formats(
        #[case] value: Value,
        #[case] pattern: &str,
        #[case] offset_minutes: i32,
        #[case] expected: Option<&str>,
    ) {
        let got = format_timestamp(&value, pattern, offset_from_minutes(offset_minutes));
        assert_eq!(got.as_deref(), expected);
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        assert_eq!(offset_from_minutes(100_000).local_minus_utc(), 0);
        assert_eq!(offset_from_minutes(i32::MAX).local_minus_utc(), 0);
        assert_eq!(offset_from_minutes(i32::MIN).local_minus_utc(), 0);
    }
}
