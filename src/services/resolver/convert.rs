/*
 * Responsibility
 * - Named scalar conversions applied by `convert`
 * - Unknown names are configuration errors
 * - Timestamps are rendered in UTC
 */
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::services::resolver::error::ResolveError;

const ISO_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S";
const ISO_DATE: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    StampToIsoDateTime,
    StampToIsoDate,
    StampToElapsed,
    DateTimeToIsoDateTime,
}

impl FromStr for Conversion {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stampToIsoDateTime" => Ok(Self::StampToIsoDateTime),
            "stampToIsoDate" => Ok(Self::StampToIsoDate),
            "stampToElapsed" => Ok(Self::StampToElapsed),
            "dateTimeToIsoDateTime" => Ok(Self::DateTimeToIsoDateTime),
            other => Err(ResolveError::UnsupportedConversion(other.to_string())),
        }
    }
}

impl Conversion {
    pub fn apply(&self, value: &Value, now: DateTime<Utc>) -> Result<Value, ResolveError> {
        let text = match self {
            Self::StampToIsoDateTime => stamp(value)?.format(ISO_DATE_TIME).to_string(),
            Self::StampToIsoDate => stamp(value)?.format(ISO_DATE).to_string(),
            Self::StampToElapsed => elapsed(stamp(value)?, now),
            Self::DateTimeToIsoDateTime => date_time(value)?.format(ISO_DATE_TIME).to_string(),
        };
        Ok(Value::String(text))
    }
}

// Unix seconds, as a number or numeric string. Fractions are truncated.
fn stamp(value: &Value) -> Result<DateTime<Utc>, ResolveError> {
    let seconds = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    };

    seconds
        .and_then(|s| Utc.timestamp_opt(s, 0).single())
        .ok_or_else(|| ResolveError::InvalidValue(format!("not a unix timestamp: {value}")))
}

// Wall-clock part of a date/time string, offset kept as written.
fn date_time(value: &Value) -> Result<NaiveDateTime, ResolveError> {
    let invalid = || ResolveError::InvalidValue(format!("not a date/time: {value}"));
    let s = value.as_str().map(str::trim).ok_or_else(invalid)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, ISO_DATE)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)
}

fn elapsed(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let (count, unit) = match seconds {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };

    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().unwrap()
    }

    #[rstest]
    #[case("stampToIsoDateTime", json!(1_700_000_000), "2023-11-14T22:13:20")]
    #[case("stampToIsoDateTime", json!("1700000000"), "2023-11-14T22:13:20")]
    #[case("stampToIsoDate", json!(1_700_000_000), "2023-11-14")]
    #[case("dateTimeToIsoDateTime", json!("2024-02-03 04:05:06"), "2024-02-03T04:05:06")]
    #[case("dateTimeToIsoDateTime", json!("2024-02-03T04:05:06+02:00"), "2024-02-03T04:05:06")]
    #[case("dateTimeToIsoDateTime", json!("2024-02-03"), "2024-02-03T00:00:00")]
    fn test_conversions(#[case] name: &str, #[case] input: Value, #[case] expected: &str) {
        let conversion: Conversion = name.parse().unwrap();
        assert_eq!(conversion.apply(&input, now()).unwrap(), json!(expected));
    }

    #[rstest]
    #[case(10, "just now")]
    #[case(60, "1 minute ago")]
    #[case(5 * 60, "5 minutes ago")]
    #[case(3 * 3_600, "3 hours ago")]
    #[case(86_400, "1 day ago")]
    #[case(60 * 86_400, "2 months ago")]
    #[case(2 * 365 * 86_400, "2 years ago")]
    #[case(-500, "just now")]
    fn test_elapsed(#[case] ago: i64, #[case] expected: &str) {
        let then = json!(1_700_000_000 - ago);
        assert_eq!(
            Conversion::StampToElapsed.apply(&then, now()).unwrap(),
            json!(expected)
        );
    }

    #[test]
    fn test_unknown_conversion_name() {
        let err = "stampToRoman".parse::<Conversion>().unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedConversion(ref n) if n == "stampToRoman"));
        assert_eq!(err.to_string(), "Unsupported conversion: stampToRoman");
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            Conversion::StampToIsoDate.apply(&json!("yesterday"), now()),
            Err(ResolveError::InvalidValue(_))
        ));
        assert!(matches!(
            Conversion::DateTimeToIsoDateTime.apply(&json!(12), now()),
            Err(ResolveError::InvalidValue(_))
        ));
    }
}
