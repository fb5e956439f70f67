//! Structural and semantic rule checks over a parsed AIR [`App`].
//!
//! Each rule is a small, stateless, independently testable unit — the
//! same shape as a linter rule — registered in [`rules::build_registry`]
//! and run over a single [`facts::Facts`] snapshot so no rule re-derives
//! data another rule already computed.

mod facts;
mod rules;

use air_ast::App;
use air_diagnostics::Diagnostic;

pub use facts::Facts;

/// One independent structural or semantic check.
pub trait Rule {
    /// The `AIR-...` diagnostic code this rule raises. Used only for
    /// registry bookkeeping — the diagnostics it returns carry the code
    /// themselves.
    fn code(&self) -> &'static str;

    fn check(&self, facts: &Facts) -> Vec<Diagnostic>;
}

/// Run every registered rule over `app` and return the raw (unsorted)
/// diagnostics. Callers that need the full `spec.md` §6 result shape
/// should feed this into `air_diagnostics::build_result`.
#[must_use]
pub fn validate(app: &App) -> Vec<Diagnostic> {
    let facts = Facts::collect(app);
    rules::build_registry()
        .iter()
        .flat_map(|rule| rule.check(&facts))
        .collect()
}
