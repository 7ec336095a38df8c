use std::env;
use std::fs::{self, canonicalize};

use chrono::Local;
use clap::Parser;
use colored::Colorize;
use tracing::info;

use crate::cli::args::Args;
use crate::config::{self, RunConfig};
use crate::verification::klayout::{self, CheckParams};
use crate::verification::report;
use crate::{deck_path, logging, paths, MAIN_CHECK_NAME, MAIN_DECK};

pub mod args;

pub const BANNER: &str = r"
 ____  ____   ____   ____  _   _  _   _
|  _ \|  _ \ / ___| |  _ \| | | || \ | |
| | | | |_) | |     | |_) | | | ||  \| |
| |_| |  _ <| |___  |  _ <| |_| || |\  |
|____/|_| \_\\____| |_| \_\\___/ |_| \_|

drcrun v0.1
";

/// The whole run, start to finish. Linear: validate the layout path, gate
/// on the installed KLayout, resolve the remaining parameters, invoke the
/// rule deck, analyze the report. Every failure propagates to `main`, the
/// single point of process exit.
pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let run_name = Local::now().format("drc_run_%Y_%m_%d_%H_%M_%S").to_string();
    let run_dir = match &args.run_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir()?.join(&run_name),
    };
    fs::create_dir_all(&run_dir)?;
    let run_dir = canonicalize(run_dir)?;

    logging::init(&run_dir, &run_name)?;

    println!("{BANNER}");
    println!("Run directory: {:?}\n", &run_dir);

    let (layout_path, format) = config::check_layout_path(&args.path)?;

    klayout::check_klayout_version()?;

    let config = RunConfig::from_args(&args, &layout_path, format)?;

    println!("DRC parameters:");
    println!("\tLayout: {:?} ({})", &config.layout_path, config.format);
    println!("\tTopcell: {}", config.topcell);
    println!("\tThreads: {}", config.threads);
    println!("\tRun mode: {}", config.run_mode);
    println!("\tVerbose: {}\n", config.verbose);

    fs::write(
        paths::out_config(&run_dir),
        serde_json::to_string_pretty(&config)?,
    )?;

    let switches = klayout::generate_switches(&config);
    let deck = deck_path(MAIN_DECK);

    let report_path = klayout::run_check(&CheckParams {
        deck_path: &deck,
        check_name: MAIN_CHECK_NAME,
        layout_path: &config.layout_path,
        run_dir: &run_dir,
        switches: &switches,
    })?;

    report::check_drc_results(&[report_path])?;

    println!("\n{}", "DRC run completed with no violations.".green().bold());
    info!("artifacts saved to: {:?}", &run_dir);

    Ok(())
}
