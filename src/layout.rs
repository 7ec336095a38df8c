use std::collections::HashSet;
use std::path::Path;

use gds21::{GdsElement, GdsLibrary};
use tracing::debug;

use crate::config::LayoutFormat;
use crate::error::{DrcError, Result};

/// Names of the top-level cells of a GDSII layout, i.e. structures that are
/// never the target of an SREF or AREF. Order follows the structure order
/// in the stream file.
pub fn top_cell_names(gds_path: &Path) -> Result<Vec<String>> {
    let library =
        GdsLibrary::load(gds_path).map_err(|e| DrcError::LayoutRead(format!("{e:?}")))?;

    let mut referenced: HashSet<String> = HashSet::new();
    for structure in &library.structs {
        for elem in &structure.elems {
            match elem {
                GdsElement::GdsStructRef(sref) => {
                    referenced.insert(sref.name.clone());
                }
                GdsElement::GdsArrayRef(aref) => {
                    referenced.insert(aref.name.clone());
                }
                _ => {}
            }
        }
    }

    Ok(library
        .structs
        .iter()
        .map(|s| s.name.clone())
        .filter(|name| !referenced.contains(name))
        .collect())
}

/// The topcell to verify. A user-supplied name always wins; otherwise the
/// layout is opened read-only and must contain exactly one top cell.
pub fn resolve_topcell(
    requested: Option<&str>,
    layout_path: &Path,
    format: LayoutFormat,
) -> Result<String> {
    if let Some(name) = requested {
        return Ok(name.to_string());
    }

    match format {
        LayoutFormat::Gds => {
            let mut top_cells = top_cell_names(layout_path)?;
            match top_cells.len() {
                0 => Err(DrcError::EmptyLayout),
                1 => {
                    let cell = top_cells.remove(0);
                    debug!("resolved topcell `{cell}` from {}", layout_path.display());
                    Ok(cell)
                }
                _ => Err(DrcError::AmbiguousTopcell(top_cells.join(", "))),
            }
        }
        LayoutFormat::Oasis => Err(DrcError::InvalidConfiguration(
            "topcell auto-detection is not supported for OASIS layouts; pass --topcell".to_string(),
        )),
    }
}
