use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
};

use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt},
    time::{Duration, sleep},
};

use crate::{
    columnar::rows_to_columns, controller::Controller, error::Result, models::ColumnBatch,
};

const STARTUP_POLL: Duration = Duration::from_millis(100);

/// Reads a growing stream file, handing out each complete row exactly once.
#[derive(Debug)]
pub struct Tailer {
    path: PathBuf,
    byte_offset: u64,
    rows: usize,
}

impl Tailer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            byte_offset: 0,
            rows: 0,
        }
    }

    /// Rows handed out so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// Parses whatever complete rows were flushed since the last poll.
    pub async fn poll(&mut self) -> Result<ColumnBatch> {
        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.byte_offset)).await?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;

        // A multi-byte character may be cut in half at the end.
        let text = match std::str::from_utf8(&buf) {
            Ok(text) => text,
            Err(e) => std::str::from_utf8(&buf[..e.valid_up_to()]).unwrap_or_default(),
        };
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let parsed = rows_to_columns(lines.iter().copied(), 0);

        let consumed: usize = lines[..parsed.lines].iter().map(|l| l.len()).sum();
        self.byte_offset += consumed as u64;
        self.rows += parsed.rows();
        Ok(parsed.batch)
    }
}

/// Blocks until the stream file holds at least one full line. Returns `false`
/// if the producer finished or a shutdown came first without any output.
pub async fn wait_for_first_entry(path: &Path, controller: &Controller) -> Result<bool> {
    loop {
        let producer_done = controller.producer_done();
        if has_line(path).await? {
            return Ok(true);
        }
        if producer_done || controller.shutdown_requested() {
            return Ok(false);
        }
        sleep(STARTUP_POLL).await;
    }
}

async fn has_line(path: &Path) -> Result<bool> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes.contains(&b'\n')),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;
    use std::{fs::OpenOptions, io::Write};

    fn row(ip: &str) -> String {
        format!(r#"{{"time":"2019-05-14 12:05:52","ip":"{ip}","status_code":500}}"#)
    }

    fn append(path: &Path, text: &str) {
        let mut f = OpenOptions::new().create(true).append(true).open(path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn rows_are_handed_out_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.txt");
        append(&path, &format!("{}\n{}\n", row("a"), row("b")));

        let mut tailer = Tailer::new(&path);
        assert_that!(tailer.poll().await.unwrap().len()).is_equal_to(2);
        assert_that!(tailer.poll().await.unwrap().len()).is_equal_to(0);

        append(&path, &format!("{}\n", row("c")));
        let batch = tailer.poll().await.unwrap();
        assert_that!(batch.ip().to_vec()).is_equal_to(vec!["c".to_string()]);
        assert_that!(tailer.rows()).is_equal_to(3);
    }

    #[tokio::test]
    async fn half_written_line_waits_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.txt");
        let full = row("a");
        let (head, tail) = full.split_at(20);
        append(&path, &format!("{}\n{head}", row("z")));

        let mut tailer = Tailer::new(&path);
        assert_that!(tailer.poll().await.unwrap().len()).is_equal_to(1);
        let offset = tailer.byte_offset();

        append(&path, &format!("{tail}\n"));
        let batch = tailer.poll().await.unwrap();
        assert_that!(batch.ip().to_vec()).is_equal_to(vec!["a".to_string()]);
        assert_that!(tailer.byte_offset()).is_equal_to(offset + full.len() as u64 + 1);
    }

    #[tokio::test]
    async fn unterminated_complete_row_is_not_counted_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.txt");
        append(&path, &row("a"));

        let mut tailer = Tailer::new(&path);
        assert_that!(tailer.poll().await.unwrap().len()).is_equal_to(1);
        append(&path, &format!("\n{}\n", row("b")));
        assert_that!(tailer.poll().await.unwrap().len()).is_equal_to(1);
        assert_that!(tailer.rows()).is_equal_to(2);
    }

    #[tokio::test]
    async fn waiting_gives_up_when_producer_is_done() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.txt");
        let controller = Controller::default();
        controller.mark_producer_done();
        assert_that!(wait_for_first_entry(&path, &controller).await.unwrap()).is_false();

        append(&path, "x\n");
        assert_that!(wait_for_first_entry(&path, &controller).await.unwrap()).is_true();
    }
}
