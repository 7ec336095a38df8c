use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{error, info};

use crate::error::{DrcError, Result};

/// Rule names of every violation recorded in a KLayout report database.
///
/// The `.lyrdb` file is decoded by element name: violation entries are the
/// `<category>` children of `<items>/<item>`, carrying the rule name in
/// surrounding single quotes. Category *definitions* (under
/// `<categories>`) are ignored. Duplicates collapse.
pub fn get_rules_with_violations(report_path: &Path) -> Result<BTreeSet<String>> {
    let file = File::open(report_path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.trim_text(true);

    let mut rules = BTreeSet::new();
    let mut stack: Vec<String> = Vec::new();
    let mut saw_items = false;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                check_element(&stack, &name, &mut saw_items)?;
                stack.push(name);
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                check_element(&stack, &name, &mut saw_items)?;
            }
            Event::Text(text) => {
                if is_item_category(&stack) {
                    let value = String::from_utf8_lossy(text.as_ref());
                    rules.insert(value.trim().trim_matches('\'').to_string());
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_items {
        return Err(DrcError::ReportFormat(format!(
            "no <items> section in {}",
            report_path.display()
        )));
    }

    Ok(rules)
}

/// Schema validation for the named decode: the root element must be
/// `<report-database>`, and the `<items>` section must exist at the top
/// level.
fn check_element(stack: &[String], name: &str, saw_items: &mut bool) -> Result<()> {
    if stack.is_empty() && name != "report-database" {
        return Err(DrcError::ReportFormat(format!(
            "expected <report-database> root element, found <{name}>"
        )));
    }
    if stack.len() == 1 && name == "items" {
        *saw_items = true;
    }
    Ok(())
}

fn is_item_category(stack: &[String]) -> bool {
    matches!(
        stack,
        [root, items, item, category]
            if root == "report-database"
                && items == "items"
                && item == "item"
                && category == "category"
    )
}

/// Decides pass/fail for the whole run from the report databases it
/// produced. An empty list means KLayout generated nothing and is fatal;
/// otherwise the violation sets of all reports are unioned.
pub fn check_drc_results(report_paths: &[PathBuf]) -> Result<()> {
    if report_paths.is_empty() {
        error!("klayout did not generate any rdb results; check the run logs");
        return Err(DrcError::NoReportGenerated);
    }

    let mut violating_rules: BTreeSet<String> = BTreeSet::new();
    for path in report_paths {
        violating_rules.extend(get_rules_with_violations(path)?);
    }

    if violating_rules.is_empty() {
        info!("klayout DRC run is clean; layout has no DRC violations");
        Ok(())
    } else {
        error!("klayout DRC run is not clean");
        error!("violated rules are: {}", violating_rules.iter().join(", "));
        Err(DrcError::ViolationsFound(
            violating_rules.into_iter().collect(),
        ))
    }
}
