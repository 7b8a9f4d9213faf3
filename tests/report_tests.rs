use portprobe::findings::aggregate;
use portprobe::report::{export_report, report_filename, write_report, ScanReport};
use portprobe::types::PortResult;
use serde_json::Value;
use time::macros::datetime;

fn sample_report() -> ScanReport {
    let open = vec![
        PortResult::open(21, "FTP", "220 (vsFTPd 3.0.5)"),
        PortResult::open(3306, "MySQL", ""),
        PortResult::open(9999, "Unknown", "hello \"world\""),
    ];
    let findings = aggregate(&open);
    ScanReport::new("10.0.0.5", datetime!(2024-06-01 12:30:45.5 UTC), open, &findings)
}

#[test]
fn json_shape_matches_report_format() {
    let json = serde_json::to_value(sample_report()).unwrap();
    let obj = json.as_object().unwrap();

    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["open_ports", "scan_time", "target", "total_open_ports", "vulnerabilities"]
    );
    assert_eq!(obj["target"], "10.0.0.5");
    assert_eq!(obj["scan_time"], "2024-06-01T12:30:45.500000");
    assert_eq!(obj["total_open_ports"], 3);

    let first = obj["open_ports"][0].as_object().unwrap();
    let mut port_keys: Vec<&str> = first.keys().map(String::as_str).collect();
    port_keys.sort_unstable();
    assert_eq!(port_keys, vec!["banner", "port", "service"]);

    assert_eq!(
        obj["vulnerabilities"],
        Value::from(vec![
            "Port 21: FTP may allow anonymous access",
            "Port 3306: Database directly exposed to network",
        ])
    );
}

#[test]
fn report_round_trip_preserves_fields() {
    let report = sample_report();
    let text = serde_json::to_string_pretty(&report).unwrap();
    let parsed: ScanReport = serde_json::from_str(&text).unwrap();

    assert_eq!(parsed, report);
    assert_eq!(parsed.total_open_ports, parsed.open_ports.len());
    assert!(parsed.open_ports.iter().all(PortResult::is_open));
}

#[test]
fn report_written_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let at = datetime!(2024-06-01 12:30:45 UTC);
    let report = sample_report();

    let path = write_report(dir.path(), &report, at).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "scan_10_0_0_5_20240601_123045.json"
    );
    assert_eq!(path.file_name().unwrap().to_str().unwrap(), report_filename("10.0.0.5", at));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"target\""), "2-space pretty JSON");
    let parsed: ScanReport = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn unwritable_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does/not/exist");
    let at = datetime!(2024-06-01 12:30:45 UTC);
    assert!(write_report(&missing, &sample_report(), at).is_err());
}

#[test]
fn exported_report_shares_one_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let at = datetime!(2025-11-30 23:59:59.75 UTC);
    let open = vec![PortResult::open(3389, "RDP", "")];
    let findings = aggregate(&open);

    let (report, path) = export_report(dir.path(), "host.lan", at, open, &findings).unwrap();
    assert_eq!(report.scan_time, "2025-11-30T23:59:59.750000");
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "scan_host_lan_20251130_235959.json"
    );
    assert_eq!(report.vulnerabilities, vec!["Port 3389: RDP exposed - potential brute force target"]);

    let parsed: ScanReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, report);
}
