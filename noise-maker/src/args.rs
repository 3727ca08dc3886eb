use chrono::NaiveDate;
use clap::Parser;
use derive_getters::Getters;

#[derive(Parser, Debug, Getters)]
#[command(name = "noise-maker")]
#[command(about = "Print fake JSON access log entries to stdout", long_about = None)]
pub struct CliArgs {
    /// Entries per second; 0 disables throttling.
    #[arg(long, default_value_t = 10)]
    rate: u64,

    /// Stop after this many entries. Runs forever when omitted.
    #[arg(long)]
    count: Option<u64>,

    /// Day the entry times fall on, e.g. 2019-05-14.
    #[arg(long)]
    day: Option<NaiveDate>,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}
