use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Every failure mode of a DRC run. All variants are terminal: the run
/// either completes cleanly or aborts at the first failing precondition.
#[derive(Debug, Error)]
pub enum DrcError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("layout path {0:?} does not exist or is not a file")]
    InvalidInput(PathBuf),

    #[error("layout {0:?} is not in GDSII or OASIS format")]
    UnsupportedFormat(PathBuf),

    #[error("layout has multiple top cells ({0}); select one with --topcell")]
    AmbiguousTopcell(String),

    #[error("layout contains no top cells")]
    EmptyLayout,

    #[error("error reading layout: {0}")]
    LayoutRead(String),

    #[error("klayout not found; make sure klayout is installed and on your PATH")]
    ToolNotFound,

    #[error("unsupported klayout version `{0}`; 0.28.0 or newer is required")]
    UnsupportedVersion(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("klayout exited unsuccessfully ({0})")]
    ToolFailed(ExitStatus),

    #[error("error parsing report database: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed report database: {0}")]
    ReportFormat(String),

    #[error("klayout did not generate any rdb results; check the run logs")]
    NoReportGenerated,

    #[error("klayout DRC run is not clean: {} violated rule(s)", .0.len())]
    ViolationsFound(Vec<String>),
}

pub type Result<T> = std::result::Result<T, DrcError>;
