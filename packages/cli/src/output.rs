//! JSON result file.

use std::path::Path;

use schematizer_pass::{PassReport, SchematicOutput};
use serde::Serialize;

/// Everything one invocation produced.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput<'a> {
    pub reports: &'a [PassReport],
    pub rows: &'a SchematicOutput,
}

/// Writes `output` as pretty JSON to `path`, or to standard output.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write(output: &RunOutput<'_>, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let contents = serde_json::to_string_pretty(output)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
            log::info!("Wrote schematic rows to {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}
