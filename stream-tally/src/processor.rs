use std::sync::Arc;

use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, info, warn};

use crate::{
    columnar::rows_to_columns,
    controller::Controller,
    error::Result,
    filter::tally,
    launcher,
    models::ColumnBatch,
    snapshot,
    tail::{Tailer, wait_for_first_entry},
    workspace::Workspace,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Run the script once and process everything it printed.
    Static,
    /// Tail the stream file while the producer writes it.
    Stream { interval: Duration },
}

pub async fn run(ws: Workspace, controller: Arc<Controller>, mode: Mode) -> Result<()> {
    let result = match mode {
        Mode::Static => process_static(&ws, &controller).await,
        Mode::Stream { interval } => process_stream(&ws, &controller, interval).await,
    };
    controller.mark_processing_done();
    result
}

pub async fn process_static(ws: &Workspace, controller: &Controller) -> Result<()> {
    let started = Instant::now();
    controller.announce(format!(
        "Running script \"{}\" and saving result",
        ws.script_name
    ));

    let batch = match cached(ws, controller) {
        Some(batch) => batch,
        None => {
            let lines = launcher::run_to_completion(ws).await?;
            let batch = rows_to_columns(lines.iter().map(String::as_str), 0).batch;
            snapshot::store(&ws.snapshot_file, &batch)?;
            batch
        }
    };

    controller.counter.record(&tally(&batch));
    controller.announce(format!(
        "Successfully processed {} rows in {}",
        batch.len(),
        human_duration(started.elapsed())
    ));
    info!(
        total = controller.counter.total(),
        result = ?controller.counter.snapshot(),
        "hourly error counts"
    );
    Ok(())
}

fn cached(ws: &Workspace, controller: &Controller) -> Option<ColumnBatch> {
    if !ws.snapshot_file.is_file() {
        return None;
    }
    controller.announce(format!(
        "Script \"{}\" already executed before, skipping to processing",
        ws.script_name
    ));
    match snapshot::load(&ws.snapshot_file) {
        Ok(batch) => Some(batch),
        Err(e) => {
            warn!(error = %e, path = %ws.snapshot_file.display(), "bad snapshot");
            controller.announce("Could not read saved JSON data, running script");
            None
        }
    }
}

pub async fn process_stream(
    ws: &Workspace,
    controller: &Controller,
    interval: Duration,
) -> Result<()> {
    controller.announce("Waiting for streaming to start");
    if !wait_for_first_entry(&ws.stream_file, controller).await? {
        controller.announce("Stream ended before any output");
        return Ok(());
    }
    controller.announce("Streaming started");

    let started = Instant::now();
    let mut tailer = Tailer::new(&ws.stream_file);
    let mut last_loop = false;
    loop {
        let polled_at = Instant::now();
        let batch = tailer.poll().await?;
        if !batch.is_empty() {
            controller.counter.record(&tally(&batch));
        }
        debug!(
            new_rows = batch.len(),
            total_rows = tailer.rows(),
            offset = tailer.byte_offset(),
            "polled stream"
        );

        if controller.shutdown_requested() {
            break;
        }
        sleep(interval.saturating_sub(polled_at.elapsed())).await;

        if controller.producer_done() {
            if last_loop {
                break;
            }
            last_loop = true;
        }
    }

    controller.announce(format!(
        "Processed {} streamed rows in {}",
        tailer.rows(),
        human_duration(started.elapsed())
    ));
    Ok(())
}

pub fn human_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs <= 60.0 {
        format!("{secs:.2} secs")
    } else if secs <= 3600.0 {
        format!("{:.2} mins", secs / 60.0)
    } else {
        format!("{:.2} hrs", secs / 3600.0)
    }
}
