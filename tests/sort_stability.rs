//! §8.3: `sort_diagnostics` is idempotent and orders by
//! `(severity, line-or-infinity, code)`.

use air_diagnostics::{create_diagnostic, sort_diagnostics, Category, DiagnosticOpts, Location, Severity};

fn diag(code: &str, severity: Severity, line: Option<u32>) -> air_diagnostics::Diagnostic {
    create_diagnostic(
        code,
        severity,
        "message",
        Category::Semantic,
        DiagnosticOpts {
            location: line.map(|l| Location::new(l, 1)),
            ..Default::default()
        },
    )
}

#[test]
fn orders_by_severity_then_line_then_code() {
    let input = vec![
        diag("AIR-L002", Severity::Info, Some(9)),
        diag("AIR-W002", Severity::Warning, None),
        diag("AIR-E003", Severity::Error, Some(4)),
        diag("AIR-E001", Severity::Error, Some(4)),
        diag("AIR-E002", Severity::Error, None),
    ];
    let sorted = sort_diagnostics(input);
    let codes: Vec<&str> = sorted.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["AIR-E001", "AIR-E003", "AIR-E002", "AIR-W002", "AIR-L002"]);
}

#[test]
fn sorting_twice_is_the_same_as_sorting_once() {
    let input = vec![
        diag("AIR-W002", Severity::Warning, Some(3)),
        diag("AIR-E001", Severity::Error, Some(1)),
        diag("AIR-L002", Severity::Info, Some(2)),
    ];
    let once = sort_diagnostics(input);
    let twice = sort_diagnostics(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn missing_location_sorts_as_if_on_the_last_line() {
    let input = vec![
        diag("AIR-E001", Severity::Error, None),
        diag("AIR-E002", Severity::Error, Some(1)),
    ];
    let sorted = sort_diagnostics(input);
    assert_eq!(sorted[0].code, "AIR-E002");
    assert_eq!(sorted[1].code, "AIR-E001");
}
