use std::path::{Path, PathBuf};

/// Report database written by a single check, named
/// `<layout_stem>_<check_name>.lyrdb` inside the run directory.
pub fn out_report(
    run_dir: impl AsRef<Path>,
    layout_path: impl AsRef<Path>,
    check_name: &str,
) -> PathBuf {
    let stem = layout_path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    run_dir.as_ref().join(format!("{stem}_{check_name}.lyrdb"))
}

pub fn out_log(run_dir: impl AsRef<Path>, run_name: &str) -> PathBuf {
    run_dir.as_ref().join(format!("{run_name}.log"))
}

pub fn out_config(run_dir: impl AsRef<Path>) -> PathBuf {
    run_dir.as_ref().join("run_config.json")
}
