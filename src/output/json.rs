//! JSON export of a full audit result

use crate::output::error::OutputResult;
use crate::report::AuditResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializes the audit result as pretty-printed JSON
pub fn to_json_string(result: &AuditResult) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Writes the audit result as pretty-printed JSON
///
/// # Arguments
///
/// * `result` - The finished audit
/// * `output_path` - Path where the JSON file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - Failed to serialize or write
pub fn export_json(result: &AuditResult, output_path: &Path) -> OutputResult<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("JSON report written to {}", output_path.display());
    Ok(())
}
