// loopcast-cli/src/main.rs
//
// Entry point of the `loopcast` binary.
//
// Responsibilities:
// - Parsing the command line (`Cli`).
// - Installing console (and optional file) logging.
// - Resolving tool settings from the environment and global flags.
// - Dispatching to the render, batch or run command.
// - Exiting with status 1 when the run fails.

use std::process;
use std::time::Instant;

use clap::Parser;
use console::style;
use indicatif::MultiProgress;
use log::{debug, info};

use loopcast_cli::logging::init_logging;
use loopcast_cli::{Cli, Commands, run_batch, run_job, run_render};
use loopcast_core::{RunSettings, format_duration};

fn main() {
    let cli = Cli::parse();
    // Shared by the progress bars and the logger so log lines never tear the bars.
    let multi = MultiProgress::new();

    match init_logging(cli.verbose, cli.log_dir.as_deref(), &multi) {
        Ok(Some(log_file)) => debug!("Logging to {}", log_file.display()),
        Ok(None) => {}
        Err(e) => eprintln!("{} {e:#}", style("Warning:").yellow().bold()),
    }

    let settings = RunSettings::from_env().with_stall_timeout_secs(cli.stall_timeout);
    let start = Instant::now();

    let result = match cli.command {
        Commands::Render(args) => run_render(args, settings, &multi),
        Commands::Batch(args) => run_batch(args, settings, &multi),
        Commands::Run(args) => run_job(args, settings, &multi),
    };

    match result {
        Ok(summary) => {
            info!(
                "Finished in {} ({} output file(s))",
                format_duration(start.elapsed().as_secs_f64()),
                summary.outputs.len()
            );
        }
        Err(e) => {
            debug!("Command failed: {e:?}");
            eprintln!("{} {e:#}", style("Error:").red().bold());
            process::exit(1);
        }
    }
}
