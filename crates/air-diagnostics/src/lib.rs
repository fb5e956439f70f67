//! The diagnostic model shared by every stage of the compiler: codes,
//! severities, sorting, schema versioning and source hashing.
//!
//! This crate has no dependency on the AST or the parser — it only
//! knows how to represent, sort, hash and format diagnostics, so the
//! parser, validator and repair engine can all depend on it without a
//! cycle.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Schema version stamped onto every `DiagnosticResult`. Bump only when
/// the JSON shape changes in a way consumers must be aware of.
pub const SCHEMA_VERSION: &str = "1.0";

/// Severity of a diagnostic. Ordering matters: it is the primary sort
/// key (`error` sorts before `warning` before `info`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    const fn rank(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warning => 1,
            Self::Info => 2,
        }
    }
}

/// Which stage or concern raised the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Syntax,
    Structural,
    Semantic,
    Style,
    Performance,
}

/// Source location of a diagnostic. All line/column values are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub col: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_col: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(line: u32, col: u32) -> Self {
        Self {
            line,
            col,
            end_line: None,
            end_col: None,
            source_line: None,
        }
    }

    #[must_use]
    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = Some(source_line.into());
        self
    }
}

/// A suggested remediation attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// A single diagnostic. Field order here is the wire order — do not
/// reorder without updating `schema_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

/// Builder options for [`create_diagnostic`]. All fields are optional;
/// omitted ones are left unset on the resulting [`Diagnostic`].
#[derive(Debug, Clone, Default)]
pub struct DiagnosticOpts {
    pub location: Option<Location>,
    pub block: Option<String>,
    pub path: Option<String>,
    pub fix: Option<Fix>,
}

#[must_use]
pub fn create_diagnostic(
    code: impl Into<String>,
    severity: Severity,
    message: impl Into<String>,
    category: Category,
    opts: DiagnosticOpts,
) -> Diagnostic {
    Diagnostic {
        code: code.into(),
        severity,
        message: message.into(),
        category,
        location: opts.location,
        block: opts.block,
        path: opts.path,
        fix: opts.fix,
    }
}

/// Sort diagnostics by `(severity, line-or-infinity, code)`. Stable:
/// diagnostics that compare equal keep their relative input order.
pub fn sort_diagnostics(mut diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics.sort_by(|a, b| {
        let sev = a.severity.rank().cmp(&b.severity.rank());
        if sev != std::cmp::Ordering::Equal {
            return sev;
        }
        let line_a = a.location.as_ref().map_or(u32::MAX, |l| l.line);
        let line_b = b.location.as_ref().map_or(u32::MAX, |l| l.line);
        let line = line_a.cmp(&line_b);
        if line != std::cmp::Ordering::Equal {
            return line;
        }
        a.code.cmp(&b.code)
    });
    diagnostics
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl Summary {
    #[must_use]
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut summary = Self::default();
        for d in diagnostics {
            match d.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }
}

/// The result of validating one AIR source: field order matches
/// `spec.md` §6 ("valid, diagnostics, summary, source_hash,
/// airengine_version, schema_version").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: Summary,
    pub source_hash: String,
    pub airengine_version: String,
    pub schema_version: String,
}

/// Assemble a [`DiagnosticResult`] from an (unsorted) diagnostic list.
/// Sorts the diagnostics, derives the summary, and stamps the schema
/// version and crate version.
#[must_use]
pub fn build_result(diagnostics: Vec<Diagnostic>, source_hash: String) -> DiagnosticResult {
    let sorted = sort_diagnostics(diagnostics);
    let summary = Summary::from_diagnostics(&sorted);
    DiagnosticResult {
        valid: summary.errors == 0,
        diagnostics: sorted,
        summary,
        source_hash,
        airengine_version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
    }
}

/// Hex-encoded SHA-256 of the source text — the `source_hash` field and
/// the basis for every content hash elsewhere in the compiler.
#[must_use]
pub fn hash_source(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// The first 16 hex characters of a SHA-256 digest, used for manifest
/// and cache entries where a full 64-character hash would be noise.
#[must_use]
pub fn hash16(text: &str) -> String {
    hash_source(text)[..16].to_string()
}

/// Render a diagnostic the way the CLI prints it: one line, plus a
/// caret under the offending column when a source line is available.
#[must_use]
pub fn format_diagnostic_cli(d: &Diagnostic) -> String {
    let sev = match d.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    };
    let loc = d
        .location
        .as_ref()
        .map(|l| format!(" at {}:{}", l.line, l.col))
        .unwrap_or_default();
    let mut out = format!("{sev}[{}]{loc}: {}", d.code, d.message);
    if let Some(loc) = &d.location {
        if let Some(source_line) = &loc.source_line {
            out.push('\n');
            out.push_str(source_line);
            out.push('\n');
            let col = loc.col.saturating_sub(1) as usize;
            out.push_str(&" ".repeat(col));
            out.push('^');
        }
    }
    if let Some(fix) = &d.fix {
        out.push_str(&format!("\n  fix: {}", fix.description));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(code: &str, sev: Severity, line: Option<u32>) -> Diagnostic {
        create_diagnostic(
            code,
            sev,
            "message",
            Category::Semantic,
            DiagnosticOpts {
                location: line.map(|l| Location::new(l, 1)),
                ..Default::default()
            },
        )
    }

    #[test]
    fn sorts_by_severity_then_line_then_code() {
        let input = vec![
            diag("AIR-W001", Severity::Warning, Some(5)),
            diag("AIR-E002", Severity::Error, None),
            diag("AIR-E001", Severity::Error, Some(1)),
        ];
        let sorted = sort_diagnostics(input);
        let codes: Vec<&str> = sorted.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["AIR-E001", "AIR-E002", "AIR-W001"]);
    }

    #[test]
    fn sort_is_idempotent() {
        let input = vec![
            diag("AIR-E003", Severity::Error, Some(2)),
            diag("AIR-E001", Severity::Error, Some(2)),
        ];
        let once = sort_diagnostics(input);
        let twice = sort_diagnostics(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn valid_iff_zero_errors() {
        let with_errors = build_result(vec![diag("AIR-E001", Severity::Error, Some(1))], "h".into());
        assert!(!with_errors.valid);

        let without_errors =
            build_result(vec![diag("AIR-W001", Severity::Warning, Some(1))], "h".into());
        assert!(without_errors.valid);
    }

    #[test]
    fn hash_source_is_deterministic() {
        let a = hash_source("@app:x");
        let b = hash_source("@app:x");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash16_is_truncated_hash_source() {
        let full = hash_source("hello");
        assert_eq!(hash16("hello"), full[..16]);
    }

    #[test]
    fn omits_absent_optional_fields() {
        let d = diag("AIR-E001", Severity::Error, None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("location"));
        assert!(!json.contains("\"block\""));
    }

    #[test]
    fn field_order_is_stable() {
        let result = build_result(vec![], "hash".into());
        let json = serde_json::to_string(&result).unwrap();
        let valid_pos = json.find("\"valid\"").unwrap();
        let diag_pos = json.find("\"diagnostics\"").unwrap();
        let summary_pos = json.find("\"summary\"").unwrap();
        let hash_pos = json.find("\"source_hash\"").unwrap();
        let version_pos = json.find("\"airengine_version\"").unwrap();
        let schema_pos = json.find("\"schema_version\"").unwrap();
        assert!(valid_pos < diag_pos);
        assert!(diag_pos < summary_pos);
        assert!(summary_pos < hash_pos);
        assert!(hash_pos < version_pos);
        assert!(version_pos < schema_pos);
    }
}
