use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about,
    help_template(
        "{before-help}{name} {version}\n{author-with-newline}{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
    )
)]
pub struct Args {
    /// The input layout file path (GDSII or OASIS).
    #[arg(long)]
    pub path: PathBuf,

    /// Topcell name to use. Auto-detected from the layout if omitted.
    #[arg(long)]
    pub topcell: Option<String>,

    /// Run the rule deck in parts in parallel to speed up the run.
    #[arg(long, default_value_t = 1)]
    pub mp: u32,

    /// Run directory to save all the results.
    #[arg(long = "run_dir")]
    pub run_dir: Option<PathBuf>,

    /// The number of threads used in the run.
    #[arg(long)]
    pub thr: Option<u32>,

    /// KLayout hierarchy mode. Allowed modes: flat, deep, tiling.
    #[arg(long = "run_mode", default_value = "deep")]
    pub run_mode: String,

    /// Detailed rule execution log for debugging.
    #[arg(long)]
    pub verbose: bool,

    /// Accepted for compatibility with other rule decks; unused here.
    #[arg(long)]
    pub offgrid: bool,
}
