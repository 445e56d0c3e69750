//! Publication-date parsing and the display-only freshness label.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Parse a feed item's `pub_date`.
///
/// Accepts RFC 3339 / ISO-8601 with offset, RFC 2822 (common in RSS), a naive
/// ISO date-time (read as local wall-clock time), and a bare `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&naive).fixed_offset());
    }
    None
}

/// Recency of an item relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Published on today's calendar day.
    Fresh,
    /// Whole days between the item's day and today. Negative for future dates.
    Days(i64),
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh => f.write_str("FRESH"),
            Self::Days(1) => f.write_str("1 Day"),
            Self::Days(n) => write!(f, "{n} Days"),
        }
    }
}

/// Freshness of `pub_date` against the local clock.
pub fn freshness(pub_date: &str) -> Option<Freshness> {
    freshness_on(pub_date, Local::now().date_naive())
}

/// Freshness of `pub_date` against a given local calendar day.
///
/// Both dates are reduced to local midnight; the millisecond gap is rounded up
/// to whole days, so a 25-hour day across a DST change counts as two.
pub fn freshness_on(pub_date: &str, today: NaiveDate) -> Option<Freshness> {
    let item_day = parse_pub_date(pub_date)?
        .with_timezone(&Local)
        .date_naive();

    if item_day == today {
        return Some(Freshness::Fresh);
    }

    let days = match (local_midnight_millis(today), local_midnight_millis(item_day)) {
        (Some(now_ms), Some(item_ms)) => ceil_div(now_ms - item_ms, MILLIS_PER_DAY),
        // Midnight skipped by a DST jump; plain calendar difference is close enough
        _ => (today - item_day).num_days(),
    };
    Some(Freshness::Days(days))
}

fn local_midnight_millis(day: NaiveDate) -> Option<i64> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Integer division rounding toward positive infinity.
fn ceil_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a > 0) == (b > 0)) {
        q + 1
    } else {
        q
    }
}

// ============================================================================
// Tests
// ============================================================================
