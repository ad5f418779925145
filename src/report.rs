//! Report sink: path validation, pre-write backup, CSV write and re-parse

use crate::aggregator::UsageRow;
use chrono::Local;
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ReportError {
    InvalidPath(String),
    Io(std::io::Error),
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err)
    }
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::InvalidPath(msg) => write!(f, "Invalid output path: {}", msg),
            ReportError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}

/// Pre-flight check of the output destination, creating parent directories
/// as needed. Runs before any API traffic.
pub fn validate_output_path(output_path: &str) -> Result<(), ReportError> {
    if output_path.is_empty() {
        return Err(ReportError::InvalidPath("output path is empty".to_string()));
    }

    let path = Path::new(output_path);
    if path.is_dir() {
        return Err(ReportError::InvalidPath(format!(
            "{} is a directory",
            output_path
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                ReportError::InvalidPath(format!(
                    "cannot create output directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

/// Copy any existing file at `output_path` to a timestamped `.backup_` path.
/// Failure to back up is logged, never fatal.
pub fn backup_existing_file(output_path: &str) {
    if !Path::new(output_path).exists() {
        return;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = format!("{}.backup_{}", output_path, timestamp);

    match fs::copy(output_path, &backup_path) {
        Ok(_) => log::info!("Created backup: {}", backup_path),
        Err(e) => log::warn!("Failed to create backup: {}", e),
    }
}

/// Write the rendered report in one shot.
pub fn write_report(table_text: &str, output_path: &str) -> Result<(), ReportError> {
    log::info!("Writing report to {}", output_path);
    fs::write(output_path, table_text)?;

    let size = fs::metadata(output_path)?.len();
    log::info!("Output file size: {} bytes", size);
    Ok(())
}

/// Parse a rendered report back into flat usage rows.
///
/// Reads the period labels from the header, then one row per symbol until
/// the blank separator or the TOTAL footer. A count cell that does not parse
/// as a non-negative integer is skipped with a warning.
pub fn parse_report(text: &str) -> Vec<UsageRow> {
    let mut lines = text.lines();
    let header = match lines.next() {
        Some(h) => h,
        None => return vec![],
    };

    let cells: Vec<&str> = header.split(',').collect();
    // Period columns sit between "emoji" and the derived columns.
    let derived = if cells.last() == Some(&"max_period") { 3 } else { 1 };
    if cells.len() < 1 + derived {
        log::warn!("Malformed report header: {}", header);
        return vec![];
    }
    let periods: Vec<&str> = cells[1..cells.len() - derived].to_vec();

    let mut rows = Vec::new();
    for line in lines {
        if line.is_empty() || line.starts_with("TOTAL") {
            break;
        }

        let cells: Vec<&str> = line.split(',').collect();
        let emoji = cells[0];
        for (i, period) in periods.iter().enumerate() {
            match cells.get(i + 1).map(|c| c.parse::<u64>()) {
                Some(Ok(count)) => rows.push(UsageRow::new(emoji, period, count)),
                _ => log::warn!("Skipping unparsable count for {} in {}", emoji, period),
            }
        }
    }

    log::debug!("Parsed {} rows from report", rows.len());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::build_pivot;

    #[test]
    fn test_write_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let path_str = path.to_str().unwrap();

        validate_output_path(path_str).unwrap();
        write_report("emoji,total\n\nTOTAL,0\n", path_str).unwrap();
        assert!(path.exists());

        backup_existing_file(path_str);
        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".backup_"))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_validate_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/report.csv");
        validate_output_path(nested.to_str().unwrap()).unwrap();
        assert!(nested.parent().unwrap().is_dir());
    }

    #[test]
    fn test_validate_rejects_directory_target() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(dir.path().to_str().unwrap()).is_err());
        assert!(validate_output_path("").is_err());
    }

    #[test]
    fn test_round_trip_single_period() {
        let rows = vec![
            UsageRow::new("heart", "2023-01", 5),
            UsageRow::new("smile", "2023-01", 10),
        ];

        let rendered = build_pivot(&rows).render();
        let parsed = parse_report(&rendered);
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_round_trip_multi_period_fills_zeros() {
        let rows = vec![
            UsageRow::new("smile", "2023-01", 10),
            UsageRow::new("smile", "2023-02", 15),
            UsageRow::new("heart", "2023-01", 5),
        ];

        let rendered = build_pivot(&rows).render();
        let parsed = parse_report(&rendered);

        // Dense output: heart gains an explicit zero for 2023-02.
        assert_eq!(parsed.len(), 4);
        assert!(parsed.contains(&UsageRow::new("heart", "2023-02", 0)));
        assert!(parsed.contains(&UsageRow::new("smile", "2023-02", 15)));
    }

    #[test]
    fn test_parse_skips_bad_counts() {
        let text = "emoji,2023-01,total,average,max_period\n\
                    smile,oops,0,0.0,2023-01\n\
                    heart,5,5,5.0,2023-01\n\
                    \n\
                    TOTAL,5,5,5.0,\n";

        let parsed = parse_report(text);
        assert_eq!(parsed, vec![UsageRow::new("heart", "2023-01", 5)]);
    }
}
