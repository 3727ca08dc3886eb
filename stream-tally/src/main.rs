mod analytics;
mod columnar;
mod controller;
mod display;
mod error;
mod filter;
mod invariants;
mod launcher;
mod logging;
mod models;
mod processor;
mod snapshot;
mod tail;
mod workspace;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use controller::Controller;
use error::Result;
use processor::Mode;
use tokio::{task::JoinHandle, time::Duration};
use tracing::error;
use workspace::Workspace;

#[derive(Parser, Debug)]
#[command(version, about = "Counts weekday 5xx errors per hour from a script's JSON output", long_about = None)]
struct Args {
    /// Directory holding `scripts/`; run output lands next to it.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Script to run, without the `.sh` suffix.
    #[arg(long)]
    script_name: String,

    /// Tail the script's output while it runs instead of waiting for it.
    #[arg(long)]
    stream: bool,

    /// Seconds between polls of the stream file.
    #[arg(long, default_value_t = 1.0)]
    sleep_time: f64,

    /// Print the final counts instead of showing the dashboard.
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let ws = Workspace::prepare(&args.root, &args.script_name, args.stream)?;
    logging::write_run_header(&ws.log_file)?;
    logging::init(&ws.log_file, args.headless)?;

    let controller = Arc::new(Controller::default());
    let mode = if args.stream {
        Mode::Stream {
            interval: Duration::from_secs_f64(args.sleep_time.max(0.0)),
        }
    } else {
        Mode::Static
    };

    let producer_handle = args
        .stream
        .then(|| spawn_producer(ws.clone(), controller.clone()));
    let processor_handle = spawn_processor(ws, controller.clone(), mode);
    let display_handle = spawn_display(controller.clone(), args.headless);

    let producer = async {
        match producer_handle {
            Some(handle) => joined(handle).await,
            None => Ok(()),
        }
    };
    let (produced, processed, displayed) = tokio::join!(
        producer,
        joined(processor_handle),
        joined(display_handle)
    );
    produced.and(processed).and(displayed)
}

async fn joined(handle: JoinHandle<Result<()>>) -> Result<()> {
    handle.await?
}

fn spawn_producer(ws: Workspace, controller: Arc<Controller>) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let result = launcher::stream_to_file(ws, controller.clone()).await;
        if result.is_err() {
            controller.request_shutdown();
        }
        result
    })
}

fn spawn_processor(
    ws: Workspace,
    controller: Arc<Controller>,
    mode: Mode,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let result = processor::run(ws, controller.clone(), mode).await;
        if result.is_err() {
            controller.request_shutdown();
        }
        result
    })
}

/// Once the display is gone, nothing else stops the producer, so its exit
/// (quit key or a terminal failure) always requests a shutdown.
fn spawn_display(controller: Arc<Controller>, headless: bool) -> JoinHandle<Result<()>> {
    if headless {
        tokio::spawn(async move {
            let result = display::run_headless(controller.clone()).await;
            controller.request_shutdown();
            result
        })
    } else {
        tokio::task::spawn_blocking(move || {
            let result = display::run(&controller);
            controller.request_shutdown();
            result
        })
    }
}
