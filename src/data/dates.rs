//! Timestamp parsing and the fixed UTC+9 day window.
//!
//! The plant reports in Korea Standard Time. Timestamps that carry an offset
//! are taken as-is; naive timestamps are read as UTC+9 civil time. Date
//! ranges always cover whole UTC+9 days.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Offset of the plant's civil time from UTC, in seconds.
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Naive layouts accepted after RFC 3339 fails.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The UTC+9 offset.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// Today's date on the UTC+9 calendar.
pub fn today_kst() -> NaiveDate {
    Utc::now().with_timezone(&kst()).date_naive()
}

/// Parse an API timestamp like "2025-06-01T12:00:00+09:00" or "2025-06-01 12:00:00".
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            if let Some(dt) = kst().from_local_datetime(&naive).single() {
                return Ok(dt);
            }
        }
    }

    bail!("Unknown timestamp format: {}", s)
}

/// Parse a "YYYY-MM-DD" date typed by the user.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", s.trim()))
}

/// Format a timestamp for display in UTC+9.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.with_timezone(&kst()).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Inclusive date window, each bound optional.
///
/// `start` covers from `{start}T00:00:00+09:00`, `end` up to and including
/// `{end}T23:59:59+09:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// An unbounded range.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A range bounded on both sides.
    pub fn days(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// The default timeline window: yesterday through today.
    pub fn last_two_days(today: NaiveDate) -> Self {
        Self::days(today - Duration::days(1), today)
    }

    /// First instant inside the range.
    pub fn start_instant(&self) -> Option<DateTime<FixedOffset>> {
        let naive = self.start?.and_hms_opt(0, 0, 0)?;
        kst().from_local_datetime(&naive).single()
    }

    /// Last instant inside the range.
    pub fn end_instant(&self) -> Option<DateTime<FixedOffset>> {
        let naive = self.end?.and_hms_opt(23, 59, 59)?;
        kst().from_local_datetime(&naive).single()
    }

    /// Whether `at` falls inside the range (both ends inclusive).
    pub fn contains(&self, at: &DateTime<FixedOffset>) -> bool {
        let after_start = self.start_instant().map_or(true, |start| *at >= start);
        let before_end = self.end_instant().map_or(true, |end| *at <= end);
        after_start && before_end
    }

    /// Move the start bound by `days`, starting from `today` when unset.
    pub fn shift_start(&mut self, days: i64, today: NaiveDate) {
        let base = self.start.unwrap_or(today);
        self.start = Some(base + Duration::days(days));
    }

    /// Move the end bound by `days`, starting from `today` when unset.
    pub fn shift_end(&mut self, days: i64, today: NaiveDate) {
        let base = self.end.unwrap_or(today);
        self.end = Some(base + Duration::days(days));
    }

    /// Display label like "2025-06-01 ~ 2025-06-02".
    pub fn label(&self) -> String {
        let fmt = |d: Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "--".to_string())
        };
        format!("{} ~ {}", fmt(self.start), fmt(self.end))
    }
}

/// Serde adapter for timestamps: lenient on input, RFC 3339 on output.
pub mod timestamp {
    use chrono::{DateTime, FixedOffset};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
