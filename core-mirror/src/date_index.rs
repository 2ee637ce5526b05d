//! # Date Index
//!
//! Buckets media items by creation date: year → month → day → filenames.
//!
//! Filenames are unique across the whole index. Within a day, filenames keep
//! the order they were added in. The visitors always walk keys in ascending
//! numeric order, whatever order the underlying maps iterate in.
//!
//! ```
//! use core_mirror::DateIndex;
//!
//! let mut index = DateIndex::new();
//! index.add_image("b.jpg", "2021-03-05T10:00:00Z").unwrap();
//! index.add_image("a.jpg", "2020-12-01T08:30:00Z").unwrap();
//!
//! let mut years = Vec::new();
//! index.visit_years(|year| years.push(year));
//! assert_eq!(years, vec![2020, 2021]);
//! ```

use crate::error::{MirrorError, Result};
use chrono::{DateTime, Datelike};
use std::collections::{HashMap, HashSet};
use tracing::trace;

type DayIndex = HashMap<u32, Vec<String>>;
type MonthIndex = HashMap<u32, DayIndex>;

/// Media filenames bucketed by creation date
#[derive(Debug, Default, Clone)]
pub struct DateIndex {
    years: HashMap<i32, MonthIndex>,
    seen: HashSet<String>,
}

impl DateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image under the calendar date of `creation_time`.
    ///
    /// `creation_time` must be RFC 3339; the date is taken in the timestamp's
    /// own UTC offset. Fails without modifying the index if `filename` was
    /// already added or the timestamp does not parse.
    pub fn add_image(&mut self, filename: &str, creation_time: &str) -> Result<()> {
        if self.seen.contains(filename) {
            return Err(MirrorError::DuplicateFilename {
                filename: filename.to_string(),
            });
        }

        let timestamp =
            DateTime::parse_from_rfc3339(creation_time).map_err(|e| MirrorError::TimestampParse {
                filename: filename.to_string(),
                value: creation_time.to_string(),
                reason: e.to_string(),
            })?;
        let date = timestamp.date_naive();

        self.seen.insert(filename.to_string());
        self.years
            .entry(date.year())
            .or_default()
            .entry(date.month())
            .or_default()
            .entry(date.day())
            .or_default()
            .push(filename.to_string());

        trace!(filename, creation_time, "Added image to date index");
        Ok(())
    }

    /// Number of distinct images in the index
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.seen.contains(filename)
    }

    /// Call `f` with every year, ascending
    pub fn visit_years<F: FnMut(i32)>(&self, mut f: F) {
        for year in sorted_keys(&self.years) {
            f(year);
        }
    }

    /// Call `f` with every month of `year`, ascending
    pub fn visit_months<F: FnMut(u32)>(&self, year: i32, mut f: F) {
        if let Some(months) = self.years.get(&year) {
            for month in sorted_keys(months) {
                f(month);
            }
        }
    }

    /// Call `f` with every day of `year`/`month`, ascending, and that day's
    /// filenames in insertion order
    pub fn visit_days<F: FnMut(u32, &[String])>(&self, year: i32, month: u32, mut f: F) {
        let Some(days) = self.years.get(&year).and_then(|months| months.get(&month)) else {
            return;
        };

        for day in sorted_keys(days) {
            if let Some(filenames) = days.get(&day) {
                f(day, filenames);
            }
        }
    }
}

fn sorted_keys<K: Copy + Ord, V>(map: &HashMap<K, V>) -> Vec<K> {
    let mut keys: Vec<K> = map.keys().copied().collect();
    keys.sort_unstable();
    keys
}
