//! §8.6: the repair retry loop always terminates within
//! `maxRepairAttempts` attempts, and `cycle_detected` fires whenever a
//! repeated source hash is observed. `retry::run` itself is private to
//! `air-loop`, so these drive it through `run_loop`'s public surface
//! with synthetic adapters passed in as `repair_mode: Llm`.

use air_config::{LoopOptions, RepairMode};
use air_diagnostics::Diagnostic;
use air_loop::{LoopStageName, StageStatus, StopReason};
use air_repair::{RepairAdapter, RepairContext, RepairResult, RepairStatus};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Alternates between two fixed broken sources, so the third attempt
/// repeats a hash already seen on the first — forcing `cycle_detected`
/// well before `maxRepairAttempts`.
struct OscillatingAdapter {
    calls: AtomicUsize,
}

#[async_trait]
impl RepairAdapter for OscillatingAdapter {
    fn name(&self) -> &'static str {
        "oscillating"
    }

    async fn repair(&self, _source: &str, _diagnostics: &[Diagnostic], _ctx: Option<&RepairContext>) -> RepairResult {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let source = if n % 2 == 0 {
            "@app:x\n// variant-a".to_string()
        } else {
            "@app:x\n// variant-b".to_string()
        };
        RepairResult {
            status: RepairStatus::Partial,
            source,
            actions: Vec::new(),
            message: None,
        }
    }
}

/// Returns the same broken fix every call (distinct first edit, then a
/// stable cycle), forcing `no_improvement` or `cycle_detected` well
/// before `maxRepairAttempts`.
struct StaticFixAdapter {
    calls: AtomicUsize,
}

#[async_trait]
impl RepairAdapter for StaticFixAdapter {
    fn name(&self) -> &'static str {
        "static-fix"
    }

    async fn repair(&self, _source: &str, _diagnostics: &[Diagnostic], _ctx: Option<&RepairContext>) -> RepairResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        RepairResult {
            status: RepairStatus::Partial,
            source: "@app:x\nstill broken".to_string(),
            actions: Vec::new(),
            message: None,
        }
    }
}

fn loop_opts(max_attempts: u32) -> LoopOptions {
    LoopOptions {
        repair_mode: RepairMode::Llm,
        max_repair_attempts: max_attempts,
        write_artifacts: false,
        ..LoopOptions::default()
    }
}

#[tokio::test]
async fn oscillating_adapter_stops_on_cycle_or_no_improvement_before_max_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let opts = loop_opts(5);
    let adapter: Arc<dyn RepairAdapter> = Arc::new(OscillatingAdapter {
        calls: AtomicUsize::new(0),
    });
    let result = airengine::run_loop("broken.air", "@state{x:int}", dir.path(), &opts, Some(adapter)).unwrap();
    let reasons: Vec<_> = result
        .repair_attempts
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.stop_reason)
        .collect();
    assert!(reasons.iter().any(|r| matches!(r, StopReason::CycleDetected | StopReason::NoImprovement)));
}

#[tokio::test]
async fn loop_never_exceeds_max_repair_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let max_attempts = 3;
    let opts = loop_opts(max_attempts);
    let adapter = Arc::new(StaticFixAdapter {
        calls: AtomicUsize::new(0),
    });
    let result = airengine::run_loop("broken.air", "@state{x:int}", dir.path(), &opts, Some(adapter.clone())).unwrap();
    assert!(adapter.calls.load(Ordering::SeqCst) <= max_attempts as usize);
    let attempts = result.repair_attempts.unwrap_or_default();
    assert!(attempts.len() as u32 <= max_attempts);
    assert!(result
        .stages
        .iter()
        .find(|s| s.name == LoopStageName::Repair)
        .is_some_and(|s| s.status != StageStatus::Skip));
}
