//! Parse error shapes and their mapping onto diagnostic codes.

use air_diagnostics::{Category, Diagnostic, DiagnosticOpts, Location, Severity, create_diagnostic};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unknown block '@{0}'")]
    UnknownBlock(String),
    #[error("invalid type '{0}'")]
    InvalidType(String),
    #[error("expected {expected}, got {found}")]
    Mismatched { expected: String, found: String },
    #[error("missing @app declaration")]
    MissingApp,
    #[error("{0}")]
    Other(String),
}

/// A single parse failure. The parser never returns more than one — a
/// partial AST is never produced (`spec.md` §4.2).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
    pub col: u32,
    pub source_line: Option<String>,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: u32, col: u32, source: &str) -> Self {
        let source_line = source.lines().nth((line.saturating_sub(1)) as usize).map(str::to_string);
        Self {
            kind,
            line,
            col,
            source_line,
        }
    }
}

/// Map a [`ParseError`] onto the `AIR-P…` diagnostic codes from
/// `spec.md` §4.2.
#[must_use]
pub fn wrap_parse_error(err: &ParseError) -> Diagnostic {
    let code = match &err.kind {
        ParseErrorKind::UnterminatedString => "AIR-P002",
        ParseErrorKind::UnknownBlock(_) => "AIR-P004",
        ParseErrorKind::InvalidType(_) => "AIR-P005",
        ParseErrorKind::Mismatched { .. } => "AIR-P003",
        ParseErrorKind::MissingApp | ParseErrorKind::Other(_) => "AIR-P001",
    };
    let mut location = Location::new(err.line, err.col);
    if let Some(source_line) = &err.source_line {
        location = location.with_source_line(source_line.clone());
    }
    create_diagnostic(
        code,
        Severity::Error,
        err.kind.to_string(),
        Category::Syntax,
        DiagnosticOpts {
            location: Some(location),
            ..Default::default()
        },
    )
}
