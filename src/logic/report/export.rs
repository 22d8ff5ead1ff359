use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use chrono::Utc;

use super::SessionReport;
use crate::logic::record::DeltaRecord;

#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "I/O error: {}", e),
            ExportError::Serialize(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Serialize(e)
    }
}

/// Write the report as pretty JSON into `dir`, returns the file path
pub fn write_report(report: &SessionReport, dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;

    // timestamp format: YYYY-MM-DD-HHMMSS
    let filename = format!("report-{}.json", Utc::now().format("%Y-%m-%d-%H%M%S"));
    let path = dir.join(filename);

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;

    log::info!(
        "Exported report ({} points, {} anomalies) to {}",
        report.total_points,
        report.anomalies.len(),
        path.display()
    );
    Ok(path)
}

/// Write records one JSON object per line, returns the number written
pub fn to_jsonl(records: &[DeltaRecord], target_path: &Path) -> Result<usize, ExportError> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(target_path)?);
    for record in records {
        let json = serde_json::to_string(record)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;

    log::info!("Exported {} history records to {}", records.len(), target_path.display());
    Ok(records.len())
}
