use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use indexmap::IndexMap;
use tracing::{debug, error, info};

use crate::config::RunConfig;
use crate::error::{DrcError, Result};
use crate::paths;

pub const KLAYOUT_BIN: &str = "klayout";

/// Minimum supported minor version; older releases have not been assessed
/// with this rule deck.
pub const MIN_SUPPORTED_MINOR: u32 = 28;

/// Queries `klayout -b -v` and gates on the reported version. Returns the
/// banner line on success. Hard precondition: no layout processing happens
/// if this fails.
pub fn check_klayout_version() -> Result<String> {
    let output = match Command::new(KLAYOUT_BIN).arg("-b").arg("-v").output() {
        Ok(output) => output,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(DrcError::ToolNotFound),
        Err(err) => return Err(err.into()),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let banner = stdout.lines().next().unwrap_or("").trim().to_string();
    if banner.is_empty() {
        return Err(DrcError::ToolNotFound);
    }

    gate_version(&banner)?;
    info!("your KLayout version is: {banner}");

    Ok(banner)
}

/// The version numeral is the last whitespace-separated token of the
/// banner, with 1 to 3 dotted components. The minimum applies to the minor
/// component, so a single-component numeral passes.
fn gate_version(banner: &str) -> Result<Vec<u32>> {
    let components =
        parse_version(banner).ok_or_else(|| DrcError::UnsupportedVersion(banner.to_string()))?;

    if components.len() >= 2 && components[1] < MIN_SUPPORTED_MINOR {
        error!("prerequisites at a minimum: KLayout 0.{MIN_SUPPORTED_MINOR}.0");
        return Err(DrcError::UnsupportedVersion(banner.to_string()));
    }

    Ok(components)
}

fn parse_version(banner: &str) -> Option<Vec<u32>> {
    let numeral = banner.split_whitespace().last()?;
    let components: Vec<u32> = numeral
        .split('.')
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if components.is_empty() || components.len() > 3 {
        return None;
    }
    Some(components)
}

/// Switches passed to the rule deck as `-rd key=value` redefinitions, in
/// the order the deck documents them.
pub fn generate_switches(config: &RunConfig) -> IndexMap<String, String> {
    let mut switches = IndexMap::new();
    switches.insert("thr".to_string(), config.threads.to_string());
    switches.insert("run_mode".to_string(), config.run_mode.to_string());
    switches.insert(
        "verbose".to_string(),
        if config.verbose { "true" } else { "false" }.to_string(),
    );
    switches.insert("topcell".to_string(), config.topcell.clone());
    switches.insert(
        "input".to_string(),
        config.layout_path.display().to_string(),
    );
    switches
}

/// Renders the switch mapping in KLayout's command-line syntax. Insertion
/// order is preserved; the result carries a trailing space.
pub fn build_switches_string(switches: &IndexMap<String, String>) -> String {
    let mut rendered = String::new();
    for (key, value) in switches {
        rendered.push_str(&format!("-rd {key}={value} "));
    }
    rendered
}

/// One rule-deck invocation.
pub struct CheckParams<'a> {
    pub deck_path: &'a Path,
    pub check_name: &'a str,
    pub layout_path: &'a Path,
    pub run_dir: &'a Path,
    pub switches: &'a IndexMap<String, String>,
}

/// Runs a single check synchronously, blocking until KLayout exits. A
/// non-zero exit status is fatal for the run. Returns the report path the
/// deck was told to write; the path is computed up front, not discovered.
pub fn run_check(params: &CheckParams) -> Result<PathBuf> {
    let report_path = paths::out_report(params.run_dir, params.layout_path, params.check_name);

    let mut switches = params.switches.clone();
    switches.insert("report".to_string(), report_path.display().to_string());

    info!(
        "running {} checks on design {} on cell {}",
        params.check_name,
        params.layout_path.display(),
        switches.get("topcell").map(String::as_str).unwrap_or("?"),
    );
    debug!(
        "{KLAYOUT_BIN} -b -r {} {}",
        params.deck_path.display(),
        build_switches_string(&switches),
    );

    let mut cmd = Command::new(KLAYOUT_BIN);
    cmd.arg("-b").arg("-r").arg(params.deck_path);
    for (key, value) in &switches {
        cmd.arg("-rd").arg(format!("{key}={value}"));
    }

    let status = cmd.status()?;
    if !status.success() {
        return Err(DrcError::ToolFailed(status));
    }

    Ok(report_path)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::{LayoutFormat, RunMode};

    use super::*;

    fn test_config() -> RunConfig {
        RunConfig {
            layout_path: PathBuf::from("/designs/chip_top.gds"),
            format: LayoutFormat::Gds,
            topcell: "chip_top".to_string(),
            threads: 2,
            run_mode: RunMode::Deep,
            verbose: false,
            num_cores: 1,
            offgrid: false,
        }
    }

    #[test]
    fn switches_string_preserves_insertion_order() {
        let mut switches = IndexMap::new();
        switches.insert("a".to_string(), "1".to_string());
        switches.insert("b".to_string(), "2".to_string());
        assert_eq!(build_switches_string(&switches), "-rd a=1 -rd b=2 ");
    }

    #[test]
    fn switches_cover_the_run_parameters() {
        let switches = generate_switches(&test_config());
        let keys: Vec<&str> = switches.keys().map(String::as_str).collect();
        assert_eq!(keys, ["thr", "run_mode", "verbose", "topcell", "input"]);
        assert_eq!(switches["thr"], "2");
        assert_eq!(switches["run_mode"], "deep");
        assert_eq!(switches["verbose"], "false");
        assert_eq!(switches["topcell"], "chip_top");
        assert_eq!(switches["input"], "/designs/chip_top.gds");
    }

    #[test]
    fn verbose_flag_renders_as_string_literal() {
        let mut config = test_config();
        config.verbose = true;
        assert_eq!(generate_switches(&config)["verbose"], "true");
    }

    #[test]
    fn current_versions_pass_the_gate() {
        assert_eq!(gate_version("KLayout 0.28.12").unwrap(), vec![0, 28, 12]);
        assert_eq!(gate_version("KLayout 0.29.1").unwrap(), vec![0, 29, 1]);
    }

    #[test]
    fn old_minor_version_is_rejected() {
        let err = gate_version("KLayout 0.27.9").unwrap_err();
        assert!(matches!(err, DrcError::UnsupportedVersion(_)));
    }

    #[test]
    fn single_component_version_has_no_minor_to_gate() {
        assert_eq!(gate_version("KLayout 1").unwrap(), vec![1]);
    }

    #[test]
    fn two_component_version_is_gated_on_minor() {
        assert!(gate_version("KLayout 0.26").is_err());
        assert_eq!(gate_version("KLayout 0.28").unwrap(), vec![0, 28]);
    }

    #[test]
    fn garbage_banner_is_rejected() {
        assert!(matches!(
            gate_version("KLayout unknown").unwrap_err(),
            DrcError::UnsupportedVersion(_)
        ));
        assert!(matches!(
            gate_version("KLayout 1.2.3.4").unwrap_err(),
            DrcError::UnsupportedVersion(_)
        ));
    }
}
