use crate::error::Result;
use crate::types::{Finding, PortResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;

/// Persisted scan report. Field names are the on-disk format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub target: String,
    pub scan_time: String,
    pub total_open_ports: usize,
    pub open_ports: Vec<PortResult>,
    pub vulnerabilities: Vec<String>,
}

impl ScanReport {
    pub fn new(
        target: &str,
        scan_time: OffsetDateTime,
        open_ports: Vec<PortResult>,
        findings: &[Finding],
    ) -> Self {
        Self {
            target: target.to_string(),
            scan_time: iso_timestamp(scan_time),
            total_open_ports: open_ports.len(),
            open_ports,
            vulnerabilities: findings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Local wall-clock time, falling back to UTC when the offset can't be
/// determined (e.g. multi-threaded process on some Unix platforms).
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// ISO-8601 timestamp with microseconds and no offset, e.g.
/// `2024-05-01T13:07:42.123456`.
pub fn iso_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
    ))
    .unwrap_or_else(|_| String::from("1970-01-01T00:00:00.000000"))
}

/// `scan_<target with dots as underscores>_<YYYYMMDD_HHMMSS>.json`
pub fn report_filename(target: &str, at: OffsetDateTime) -> String {
    let stamp = at
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| String::from("19700101_000000"));
    format!("scan_{}_{}.json", target.replace('.', "_"), stamp)
}

/// Write `report` as pretty JSON into `dir` and return the file path.
pub fn write_report(dir: &Path, report: &ScanReport, at: OffsetDateTime) -> Result<PathBuf> {
    let path = dir.join(report_filename(&report.target, at));
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, report)?;
    log::info!("wrote report to {}", path.display());
    Ok(path)
}

/// Build the report and write it, stamping `scan_time` and the filename with
/// the same instant.
pub fn export_report(
    dir: &Path,
    target: &str,
    generated_at: OffsetDateTime,
    open_ports: Vec<PortResult>,
    findings: &[Finding],
) -> Result<(ScanReport, PathBuf)> {
    let report = ScanReport::new(target, generated_at, open_ports, findings);
    let path = write_report(dir, &report, generated_at)?;
    Ok((report, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn filename_replaces_dots() {
        let at = datetime!(2024-03-09 07:05:01 UTC);
        assert_eq!(
            report_filename("192.168.1.10", at),
            "scan_192_168_1_10_20240309_070501.json"
        );
        assert_eq!(
            report_filename("scanme.example.org", at),
            "scan_scanme_example_org_20240309_070501.json"
        );
    }

    #[test]
    fn timestamp_is_iso_with_micros() {
        let at = datetime!(2024-03-09 07:05:01.25 UTC);
        assert_eq!(iso_timestamp(at), "2024-03-09T07:05:01.250000");
    }

    #[test]
    fn total_matches_open_ports() {
        let at = datetime!(2024-01-01 00:00:00 UTC);
        let ports = vec![PortResult::open(22, "SSH", "SSH-2.0"), PortResult::open(80, "HTTP", "")];
        let report = ScanReport::new("10.0.0.1", at, ports, &[]);
        assert_eq!(report.total_open_ports, 2);
        assert!(report.vulnerabilities.is_empty());
    }
}
