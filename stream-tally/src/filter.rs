use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    invariants::{Hour, Timestamp},
    models::ColumnBatch,
};

pub type HourlyCounts = [u64; Hour::COUNT];

/// Server errors raised on a weekday.
pub fn is_qualifying(time: &Timestamp, status_code: u16) -> bool {
    (500..600).contains(&status_code) && time.is_weekday()
}

/// Counts qualifying rows per hour of day. Rows sharing the same ip, date and
/// hour are counted once.
pub fn tally(batch: &ColumnBatch) -> HourlyCounts {
    let mut seen: HashSet<(&str, NaiveDate, Hour)> = HashSet::new();
    let mut counts = [0; Hour::COUNT];
    for ((time, ip), status_code) in batch
        .time()
        .iter()
        .zip(batch.ip())
        .zip(batch.status_code())
    {
        if !is_qualifying(time, *status_code) {
            continue;
        }
        let hour = time.hour();
        if seen.insert((ip.as_str(), time.date(), hour)) {
            counts[hour.index()] += 1;
        }
    }
    counts
}
