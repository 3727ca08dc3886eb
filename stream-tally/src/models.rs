use serde::{Deserialize, Serialize};

use crate::invariants::Timestamp;

/// One line of script output, e.g.
/// `{"time":"2019-05-14 12:05:52","ip":"10.0.191.219","status_code":303}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    pub time: Timestamp,
    pub ip: String,
    pub status_code: u16,
}

/// Column-wise view of a run of [`LogRow`]s. Also the snapshot file format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColumns")]
pub struct ColumnBatch {
    time: Vec<Timestamp>,
    ip: Vec<String>,
    status_code: Vec<u16>,
}

impl ColumnBatch {
    pub fn push(&mut self, LogRow { time, ip, status_code }: LogRow) {
        self.time.push(time);
        self.ip.push(ip);
        self.status_code.push(status_code);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[Timestamp] {
        &self.time
    }

    pub fn ip(&self) -> &[String] {
        &self.ip
    }

    pub fn status_code(&self) -> &[u16] {
        &self.status_code
    }
}

impl FromIterator<LogRow> for ColumnBatch {
    fn from_iter<I: IntoIterator<Item = LogRow>>(iter: I) -> Self {
        let mut batch = Self::default();
        for row in iter {
            batch.push(row);
        }
        batch
    }
}

#[derive(Deserialize)]
struct RawColumns {
    time: Vec<Timestamp>,
    ip: Vec<String>,
    status_code: Vec<u16>,
}

impl TryFrom<RawColumns> for ColumnBatch {
    type Error = String;

    fn try_from(RawColumns { time, ip, status_code }: RawColumns) -> Result<Self, Self::Error> {
        if time.len() != ip.len() || time.len() != status_code.len() {
            return Err(format!(
                "column lengths differ: time={}, ip={}, status_code={}",
                time.len(),
                ip.len(),
                status_code.len()
            ));
        }
        Ok(Self {
            time,
            ip,
            status_code,
        })
    }
}
