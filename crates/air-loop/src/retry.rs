//! The repair stage's retry state machine (`spec.md` §4.8): attempts
//! are strictly sequential, attempt N observes attempts `1..N-1` via
//! the accumulated source-hash list, and the loop halts on the first
//! of five stop conditions.

use air_diagnostics::{hash_source, Diagnostic};
use air_repair::{RepairAdapter, RepairContext, RepairResult, RepairStatus};

use crate::stages::{RepairAttempt, StopReason};

pub struct RepairLoopOutcome {
    pub final_source: String,
    pub final_diagnostics: Vec<Diagnostic>,
    pub attempts: Vec<RepairAttempt>,
    pub last_result: Option<RepairResult>,
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == air_diagnostics::Severity::Error)
        .count()
}

fn reparse_and_diagnose(source: &str) -> Vec<Diagnostic> {
    match air_parser::parse(source) {
        Ok(ast) => air_validator::validate(&ast.app),
        Err(err) => vec![air_parser::wrap_parse_error(&err)],
    }
}

/// Run the retry loop. `initial_diagnostics` must already reflect
/// `source` (the validate stage's output). Returns the last source
/// text seen (whether or not it ended up valid) and the full attempt
/// history for the audit artifact.
pub async fn run(
    adapter: &dyn RepairAdapter,
    source: &str,
    initial_diagnostics: &[Diagnostic],
    max_attempts: u32,
) -> RepairLoopOutcome {
    let mut current_source = source.to_string();
    let mut current_diagnostics = initial_diagnostics.to_vec();
    let mut previous_hashes = vec![hash_source(source)];
    let mut attempts = Vec::new();
    let mut last_result = None;

    for attempt_number in 1..=max_attempts {
        let errors_before = error_count(&current_diagnostics);
        let context = RepairContext {
            attempt_number,
            max_attempts,
            previous_hashes: previous_hashes.clone(),
        };
        let result = adapter
            .repair(&current_source, &current_diagnostics, Some(&context))
            .await;

        if matches!(result.status, RepairStatus::Failed) || result.source == current_source {
            let source_hash = hash_source(&result.source);
            attempts.push(RepairAttempt {
                attempt_number,
                errors_before,
                errors_after: errors_before,
                source_hash,
                stop_reason: Some(StopReason::Noop),
            });
            last_result = Some(result);
            break;
        }

        let new_hash = hash_source(&result.source);
        if previous_hashes.contains(&new_hash) {
            attempts.push(RepairAttempt {
                attempt_number,
                errors_before,
                errors_after: errors_before,
                source_hash: new_hash,
                stop_reason: Some(StopReason::CycleDetected),
            });
            last_result = Some(result);
            break;
        }
        previous_hashes.push(new_hash.clone());

        let new_diagnostics = reparse_and_diagnose(&result.source);
        let errors_after = error_count(&new_diagnostics);
        current_source = result.source.clone();
        current_diagnostics = new_diagnostics;

        let stop_reason = if errors_after == 0 {
            Some(StopReason::Success)
        } else if errors_after >= errors_before {
            Some(StopReason::NoImprovement)
        } else if attempt_number == max_attempts {
            Some(StopReason::MaxAttempts)
        } else {
            None
        };

        attempts.push(RepairAttempt {
            attempt_number,
            errors_before,
            errors_after,
            source_hash: new_hash,
            stop_reason,
        });
        last_result = Some(result);

        if stop_reason.is_some() {
            break;
        }
    }

    RepairLoopOutcome {
        final_source: current_source,
        final_diagnostics: current_diagnostics,
        attempts,
        last_result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_diagnostics::{create_diagnostic, Category, DiagnosticOpts, Severity};
    use air_repair::DeterministicAdapter;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn diag(code: &str) -> Diagnostic {
        create_diagnostic(code, Severity::Error, "msg", Category::Structural, DiagnosticOpts::default())
    }

    #[tokio::test]
    async fn deterministic_adapter_succeeds_within_one_attempt() {
        let diagnostics = vec![diag("AIR-E002")];
        let outcome = run(&DeterministicAdapter, "@app:x", &diagnostics, 3).await;
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].stop_reason, Some(StopReason::Success));
        assert!(air_parser::parse(&outcome.final_source).is_ok());
    }

    #[tokio::test]
    async fn no_matching_rule_stops_as_noop_on_first_attempt() {
        let diagnostics = vec![diag("AIR-W001")];
        let outcome = run(&DeterministicAdapter, "@app:x", &diagnostics, 3).await;
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].stop_reason, Some(StopReason::Noop));
    }

    struct StaticBrokenAdapter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RepairAdapter for StaticBrokenAdapter {
        fn name(&self) -> &'static str {
            "static-broken"
        }

        async fn repair(
            &self,
            _source: &str,
            _diagnostics: &[Diagnostic],
            _context: Option<&RepairContext>,
        ) -> RepairResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            RepairResult {
                status: RepairStatus::Partial,
                source: "@app:x\nstill broken".to_string(),
                actions: Vec::new(),
                message: None,
            }
        }
    }

    #[tokio::test]
    async fn adapter_returning_same_broken_source_detects_cycle() {
        let adapter = StaticBrokenAdapter {
            calls: AtomicUsize::new(0),
        };
        let diagnostics = vec![diag("AIR-P001")];
        let outcome = run(&adapter, "@app:x", &diagnostics, 5).await;
        let reasons: Vec<_> = outcome.attempts.iter().map(|a| a.stop_reason).collect();
        assert!(reasons.contains(&Some(StopReason::CycleDetected)) || reasons.contains(&Some(StopReason::NoImprovement)));
        assert!(adapter.calls.load(Ordering::SeqCst) <= 5);
    }
}
