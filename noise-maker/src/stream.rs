use crate::generator::generate_json_log;
use chrono::{Local, NaiveDate};
use rand::{SeedableRng, rngs::StdRng};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{Duration, sleep};

const MAX_RATE_BEFORE_DISABLING_THROTTLING: u64 = 10_000;

pub struct StreamConfig {
    pub rate: u64,
    pub count: Option<u64>,
    pub day: Option<NaiveDate>,
    pub seed: Option<u64>,
}

/// Writes one entry per line, flushing each so a reader tailing the output
/// sees whole lines as they are produced.
pub async fn run_log_stream<W>(config: StreamConfig, out: &mut W) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let day = config.day.unwrap_or_else(|| Local::now().date_naive());
    let delay = if config.rate > 0 && config.rate < MAX_RATE_BEFORE_DISABLING_THROTTLING {
        Some(Duration::from_secs_f64(1f64 / config.rate as f64))
    } else {
        None
    };

    let mut written = 0;
    while config.count.is_none_or(|n| written < n) {
        let mut line = generate_json_log(&mut rng, day);
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        written += 1;

        if let Some(d) = delay {
            sleep(d).await;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    #[tokio::test]
    async fn stops_after_count() {
        let mut out = Vec::new();
        let config = StreamConfig {
            rate: 0,
            count: Some(25),
            day: NaiveDate::from_ymd_opt(2019, 5, 14),
            seed: Some(3),
        };
        let written = run_log_stream(config, &mut out).await.unwrap();

        assert_that!(written).is_equal_to(25);
        let text = String::from_utf8(out).unwrap();
        assert_that!(text.lines().count()).is_equal_to(25);
        assert_that!(text.ends_with('\n')).is_true();
    }
}
