//! Time bucketing and ordered tallies used by the aggregator.
//!
//! Buckets are keyed by normalized calendar values (`MonthKey`, week index)
//! and only turned into display labels when the output is built.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::HashMap;
use std::hash::Hash;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const WEEK_MS: i64 = 7 * DAY_MS;

/// Number of weekly buckets ("Sem 1" .. "Sem 8").
pub const WEEK_BUCKETS: usize = 8;
/// Number of monthly volume buckets.
pub const MONTH_BUCKETS: usize = 12;
/// Number of months in the acceptance trend.
pub const TREND_BUCKETS: usize = 6;

/// Short month names as rendered by the es-MX locale.
const MONTH_ABBREV: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// A calendar month, independent of how it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
}

impl MonthKey {
    pub fn of<Tz: TimeZone>(date: &DateTime<Tz>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// The month `n` months before this one.
    pub fn months_back(self, n: usize) -> Self {
        Self::from_ordinal(self.ordinal() - n as i64)
    }

    /// Label such as `"oct 26"`.
    pub fn label(self) -> String {
        format!(
            "{} {:02}",
            MONTH_ABBREV[(self.month - 1) as usize],
            self.year.rem_euclid(100)
        )
    }
}

/// The trailing `width` months ending at `current`, oldest first.
pub fn trailing_months(current: MonthKey, width: usize) -> Vec<MonthKey> {
    (0..width).rev().map(|i| current.months_back(i)).collect()
}

/// Position of `month` inside a window of `width` months ending at `current`.
pub fn month_slot(current: MonthKey, month: MonthKey, width: usize) -> Option<usize> {
    let back = current.ordinal() - month.ordinal();
    if (0..width as i64).contains(&back) {
        Some(width - 1 - back as usize)
    } else {
        None
    }
}

/// Slot in the weekly series for a report created at `created`.
///
/// Slot `WEEK_BUCKETS - 1` is the seven days ending at `now`. Future
/// timestamps and anything older than the window yield `None`.
pub fn week_slot<Tz: TimeZone>(now: &DateTime<Tz>, created: &DateTime<Tz>) -> Option<usize> {
    let weeks_ago = now
        .clone()
        .signed_duration_since(created.clone())
        .num_milliseconds()
        .div_euclid(WEEK_MS);
    if (0..WEEK_BUCKETS as i64).contains(&weeks_ago) {
        Some(WEEK_BUCKETS - 1 - weeks_ago as usize)
    } else {
        None
    }
}

/// Label for a week slot: `"Sem 1"` (oldest) to `"Sem 8"` (current).
pub fn week_label(slot: usize) -> String {
    format!("Sem {}", slot + 1)
}

/// Whole days elapsed from `from` to `to`, rounded toward negative infinity.
pub fn elapsed_days<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> i64 {
    to.clone()
        .signed_duration_since(from.clone())
        .num_milliseconds()
        .div_euclid(DAY_MS)
}

/// Parse an API timestamp into the given zone.
///
/// Accepts RFC 3339, naive date-times (read as local to `tz`), and bare
/// dates (read as UTC midnight).
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(tz));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return tz.from_local_datetime(&naive).earliest();
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().with_timezone(tz))
}

/// Round half up, the way chart percentages are rounded.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Accumulator that remembers the order in which keys first appeared.
#[derive(Debug)]
pub struct Tally<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash, V: Default> Tally<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Get the slot for `key`, creating it on first sight.
    pub fn entry(&mut self, key: K) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.clone(), V::default()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}
