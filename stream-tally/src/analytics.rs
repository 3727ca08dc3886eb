use parking_lot::RwLock;

use crate::filter::HourlyCounts;

/// Qualifying error counts per hour of day, shared between the processor and
/// the display.
#[derive(Debug, Default)]
pub struct HourlyCounter {
    by_hour: RwLock<HourlyCounts>,
}

impl HourlyCounter {
    pub fn record(&self, counts: &HourlyCounts) {
        let mut by_hour = self.by_hour.write();
        for (total, add) in by_hour.iter_mut().zip(counts) {
            *total += add;
        }
    }

    pub fn snapshot(&self) -> HourlyCounts {
        *self.by_hour.read()
    }

    pub fn total(&self) -> u64 {
        self.by_hour.read().iter().sum()
    }
}
