use std::env;
use std::path::PathBuf;

use lazy_static::lazy_static;

pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod paths;
pub mod verification;

pub use error::{DrcError, Result};

/// Rule deck executed by every run. This runner drives a single deck
/// table, reported under the "main" check name.
pub const MAIN_DECK: &str = "generic_tech_malformed.drc";
pub const MAIN_CHECK_NAME: &str = "main";

lazy_static! {
    /// Directory holding the rule decks. Defaults to the `tech/` directory
    /// shipped with the crate; override with `DRC_DECK_ROOT`.
    pub static ref DECK_ROOT: PathBuf = env::var_os("DRC_DECK_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tech")));
}

pub fn deck_path(deck: &str) -> PathBuf {
    DECK_ROOT.join(deck)
}
