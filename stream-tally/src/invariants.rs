use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use derive_more::{Debug, Display};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
// `%.f` prints nothing for whole seconds, so plain inputs come back unchanged.
const TS_OUTPUT: &str = "%Y-%m-%d %H:%M:%S%.f";
// Accepted on input only.
const TS_FALLBACKS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Naive wall-clock time of a log entry, e.g. `2019-05-14 12:05:52`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{}", _0.format(TS_OUTPUT))]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn hour(&self) -> Hour {
        Hour(self.0.hour() as u8)
    }

    pub fn is_weekday(&self) -> bool {
        !matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDateTime::parse_from_str(s, TS_FORMAT)
            .or_else(|e| {
                TS_FALLBACKS
                    .iter()
                    .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                    .ok_or(e)
            })
            .map(Self)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Hour of day, always in `0..24`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{:02}", _0)]
pub struct Hour(u8);

impl Hour {
    pub const COUNT: usize = 24;

    pub fn new(hour: u8) -> Option<Self> {
        (usize::from(hour) < Self::COUNT).then_some(Self(hour))
    }

    pub fn all() -> impl Iterator<Item = Hour> {
        (0..Self::COUNT as u8).map(Self)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    #[test]
    fn parses_the_plain_format() {
        let ts: Timestamp = "2019-05-14 12:05:52".parse().unwrap();
        assert_that!(ts.hour().index()).is_equal_to(12);
        assert_that!(ts.to_string()).is_equal_to("2019-05-14 12:05:52".to_string());
    }

    #[test]
    fn accepts_iso_separator_and_fractions() {
        let ts: Timestamp = "2019-05-14T01:02:03.250".parse().unwrap();
        assert_that!(ts.hour().index()).is_equal_to(1);
        assert_that!(ts.to_string()).is_equal_to("2019-05-14 01:02:03.250".to_string());
    }

    #[test]
    fn fractions_survive_a_json_trip() {
        let ts: Timestamp = "2019-05-14 01:02:03.250".parse().unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_that!(json.as_str()).is_equal_to("\"2019-05-14 01:02:03.250\"");
        assert_that!(serde_json::from_str::<Timestamp>(&json).unwrap()).is_equal_to(ts);
    }

    #[test]
    fn rejects_garbage() {
        assert_that!("yesterday".parse::<Timestamp>()).is_err();
    }

    #[test]
    fn weekends_are_not_weekdays() {
        // 2019-05-18 was a Saturday.
        let sat: Timestamp = "2019-05-18 10:00:00".parse().unwrap();
        let fri: Timestamp = "2019-05-17 10:00:00".parse().unwrap();
        assert_that!(sat.is_weekday()).is_false();
        assert_that!(fri.is_weekday()).is_true();
    }

    #[test]
    fn hour_bounds() {
        assert_that!(Hour::new(23)).is_some();
        assert_that!(Hour::new(24)).is_none();
        assert_that!(Hour::new(7).unwrap().to_string()).is_equal_to("07".to_string());
        assert_that!(Hour::all().count()).is_equal_to(24);
    }
}
