mod args;
mod generator;
mod stream;

use args::CliArgs;
use clap::Parser;
use std::process::ExitCode;
use stream::{StreamConfig, run_log_stream};
use tokio::{io, signal};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    let config = StreamConfig {
        rate: *args.rate(),
        count: *args.count(),
        day: *args.day(),
        seed: *args.seed(),
    };

    let mut stdout = io::stdout();
    tokio::select! {
        result = run_log_stream(config, &mut stdout) => match result {
            Ok(_) => ExitCode::SUCCESS,
            // The reader went away; nothing left to do.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("noise-maker: {e}");
                ExitCode::FAILURE
            }
        },
        _ = signal::ctrl_c() => ExitCode::SUCCESS,
    }
}
