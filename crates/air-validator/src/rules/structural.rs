//! Rules that check for the presence of blocks an app cannot do without.

use air_diagnostics::{create_diagnostic, Category, Diagnostic, DiagnosticOpts, Severity};

use crate::facts::Facts;
use crate::Rule;

/// `AIR-E001` — `@app` is present but its name is empty (`@app:` with
/// nothing after the colon). A fully absent `@app` never reaches the
/// validator — the parser rejects it first as `AIR-P001`.
pub struct AppNamePresent;

impl Rule for AppNamePresent {
    fn code(&self) -> &'static str {
        "AIR-E001"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        if facts.app.name.trim().is_empty() {
            vec![create_diagnostic(
                self.code(),
                Severity::Error,
                "Missing @app:name",
                Category::Structural,
                DiagnosticOpts::default(),
            )]
        } else {
            Vec::new()
        }
    }
}

/// `AIR-E002` — no `@ui` block declared anywhere.
pub struct UiBlockPresent;

impl Rule for UiBlockPresent {
    fn code(&self) -> &'static str {
        "AIR-E002"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        if facts.app.ui_blocks().is_empty() {
            vec![create_diagnostic(
                self.code(),
                Severity::Error,
                "No @ui block",
                Category::Structural,
                DiagnosticOpts::default(),
            )]
        } else {
            Vec::new()
        }
    }
}

/// `AIR-W001` — no `@state` block declared.
pub struct StateBlockPresent;

impl Rule for StateBlockPresent {
    fn code(&self) -> &'static str {
        "AIR-W001"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        if facts.app.state_block().is_none() {
            vec![create_diagnostic(
                self.code(),
                Severity::Warning,
                "No @state block",
                Category::Structural,
                DiagnosticOpts::default(),
            )]
        } else {
            Vec::new()
        }
    }
}

/// `AIR-L002` — no `@style` block declared.
pub struct StyleBlockPresent;

impl Rule for StyleBlockPresent {
    fn code(&self) -> &'static str {
        "AIR-L002"
    }

    fn check(&self, facts: &Facts) -> Vec<Diagnostic> {
        let has_style = crate::facts::has_block(facts.app, |b| matches!(b, air_ast::Block::Style(_)));
        if has_style {
            Vec::new()
        } else {
            vec![create_diagnostic(
                self.code(),
                Severity::Info,
                "No @style block",
                Category::Style,
                DiagnosticOpts::default(),
            )]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_ast::{AirAST, App};

    fn app(name: &str, blocks: Vec<air_ast::Block>) -> AirAST {
        AirAST {
            app: App {
                name: name.to_string(),
                blocks,
            },
        }
    }

    #[test]
    fn flags_empty_app_name() {
        let ast = app("", vec![]);
        let facts = Facts::collect(&ast.app);
        assert_eq!(AppNamePresent.check(&facts).len(), 1);
    }

    #[test]
    fn no_ui_block_is_flagged() {
        let ast = app("x", vec![]);
        let facts = Facts::collect(&ast.app);
        assert_eq!(UiBlockPresent.check(&facts).len(), 1);
    }
}
