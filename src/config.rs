use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cli::args::Args;
use crate::error::{DrcError, Result};
use crate::layout;

pub const DEFAULT_THREADS: u32 = 2;

/// Layout formats accepted as input. Only the extension is inspected;
/// the file contents are left to KLayout except for GDSII topcell
/// resolution.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutFormat {
    Gds,
    Oasis,
}

impl fmt::Display for LayoutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutFormat::Gds => write!(f, "GDSII"),
            LayoutFormat::Oasis => write!(f, "OASIS"),
        }
    }
}

/// KLayout hierarchy mode for the run. Forwarded verbatim to the rule
/// deck; opaque to this runner.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Flat,
    #[default]
    Deep,
    Tiling,
}

impl FromStr for RunMode {
    type Err = DrcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flat" => Ok(RunMode::Flat),
            "deep" => Ok(RunMode::Deep),
            "tiling" => Ok(RunMode::Tiling),
            _ => Err(DrcError::InvalidConfiguration(format!(
                "allowed klayout modes are (flat, deep, tiling) only, got `{s}`"
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Flat => write!(f, "flat"),
            RunMode::Deep => write!(f, "deep"),
            RunMode::Tiling => write!(f, "tiling"),
        }
    }
}

/// Fully validated parameters for one DRC run. Built once, then read-only;
/// a copy is serialized into the run directory for reproducibility.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub layout_path: PathBuf,
    pub format: LayoutFormat,
    pub topcell: String,
    pub threads: u32,
    pub run_mode: RunMode,
    pub verbose: bool,
    /// `--mp` pass-through; the single-process path does not use it.
    pub num_cores: u32,
    /// Accepted for compatibility; unused by this deck.
    pub offgrid: bool,
}

/// Checks that the layout exists, is a regular file, and carries a
/// recognized extension. Returns the canonicalized path and the detected
/// format.
pub fn check_layout_path(path: &Path) -> Result<(PathBuf, LayoutFormat)> {
    if !path.is_file() {
        return Err(DrcError::InvalidInput(path.to_path_buf()));
    }

    let format = match path.extension().and_then(|ext| ext.to_str()) {
        Some("gds") => LayoutFormat::Gds,
        Some("oas") => LayoutFormat::Oasis,
        _ => return Err(DrcError::UnsupportedFormat(path.to_path_buf())),
    };

    Ok((fs::canonicalize(path)?, format))
}

impl RunConfig {
    /// Resolves the remaining run parameters once the layout path has been
    /// checked and the tool version gated. Topcell resolution may open the
    /// layout for structural metadata.
    pub fn from_args(args: &Args, layout_path: &Path, format: LayoutFormat) -> Result<Self> {
        let run_mode = args.run_mode.parse::<RunMode>()?;
        let threads = args.thr.unwrap_or(DEFAULT_THREADS);
        let topcell = layout::resolve_topcell(args.topcell.as_deref(), layout_path, format)?;

        Ok(RunConfig {
            layout_path: layout_path.to_path_buf(),
            format,
            topcell,
            threads,
            run_mode,
            verbose: args.verbose,
            num_cores: args.mp,
            offgrid: args.offgrid,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use super::*;

    fn args_for(path: &Path) -> Args {
        Args {
            path: path.to_path_buf(),
            topcell: None,
            mp: 1,
            run_dir: None,
            thr: None,
            run_mode: "deep".to_string(),
            verbose: false,
            offgrid: false,
        }
    }

    #[test]
    fn missing_layout_is_invalid_input() {
        let err = check_layout_path(Path::new("/nonexistent/chip.gds")).unwrap_err();
        assert!(matches!(err, DrcError::InvalidInput(_)));
    }

    #[test]
    fn wrong_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netlist.txt");
        File::create(&path).unwrap().write_all(b"not a layout").unwrap();

        let err = check_layout_path(&path).unwrap_err();
        assert!(matches!(err, DrcError::UnsupportedFormat(_)));
    }

    #[test]
    fn gds_extension_is_recognized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chip.gds");
        File::create(&path).unwrap();

        let (abs, format) = check_layout_path(&path).unwrap();
        assert_eq!(format, LayoutFormat::Gds);
        assert!(abs.is_absolute());
    }

    #[test]
    fn oas_extension_is_recognized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chip.oas");
        File::create(&path).unwrap();

        let (_, format) = check_layout_path(&path).unwrap();
        assert_eq!(format, LayoutFormat::Oasis);
    }

    #[test]
    fn bogus_run_mode_is_rejected() {
        let err = "bogus".parse::<RunMode>().unwrap_err();
        assert!(matches!(err, DrcError::InvalidConfiguration(_)));
    }

    #[test]
    fn run_modes_parse() {
        assert_eq!("flat".parse::<RunMode>().unwrap(), RunMode::Flat);
        assert_eq!("deep".parse::<RunMode>().unwrap(), RunMode::Deep);
        assert_eq!("tiling".parse::<RunMode>().unwrap(), RunMode::Tiling);
    }

    #[test]
    fn thread_count_defaults_to_two() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chip.oas");
        File::create(&path).unwrap();

        let mut args = args_for(&path);
        args.topcell = Some("top".to_string());

        let config = RunConfig::from_args(&args, &path, LayoutFormat::Oasis).unwrap();
        assert_eq!(config.threads, DEFAULT_THREADS);
        assert_eq!(config.run_mode, RunMode::Deep);
        assert_eq!(config.topcell, "top");
    }

    #[test]
    fn explicit_thread_count_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chip.oas");
        File::create(&path).unwrap();

        let mut args = args_for(&path);
        args.topcell = Some("top".to_string());
        args.thr = Some(8);

        let config = RunConfig::from_args(&args, &path, LayoutFormat::Oasis).unwrap();
        assert_eq!(config.threads, 8);
    }
}
