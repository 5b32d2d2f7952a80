use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;

mod config;
mod entry;
mod format;
mod ingestion;
mod output;
mod pipeline;
mod report;
mod scan;
mod telemetry;
mod util;
mod webhook;

use config::{Overrides, RunConfig};

#[derive(Parser)]
#[command(name = "feedpost", about = "Post new RSS/Atom entries to a chat webhook")]
struct Cli {
    /// Count entries as posted without sending them
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Trailing window in minutes (overrides POST_WINDOW_MIN)
    #[arg(long)]
    window_min: Option<u64>,
    /// Cap on posts for this run (overrides MAX_POSTS)
    #[arg(long)]
    max_posts: Option<u64>,
    /// Do not post the scan summary to the webhook
    #[arg(long, default_value_t = false)]
    no_summary_post: bool,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            dry_run: self.dry_run,
            window_minutes: self.window_min,
            max_posts: self.max_posts,
            no_summary_post: self.no_summary_post,
            json: self.json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    // initialize logging/tracing (stderr). Respect RUST_LOG and FEEDPOST_LOG_FORMAT
    telemetry::config::init_tracing();
    let log = telemetry::scan();

    let cfg = match RunConfig::from_env(&cli.overrides()) {
        Ok(cfg) => cfg,
        Err(e) => {
            log.error(format!("❌ {e}"));
            return ExitCode::from(e.exit_code());
        }
    };

    match scan::run(&cfg).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(format!("❌ scan aborted: {e:#}"));
            ExitCode::from(scan::RUN_FAILURE_EXIT)
        }
    }
}
