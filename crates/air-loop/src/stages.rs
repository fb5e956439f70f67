//! The fixed stage sequence and its artifact shapes (`spec.md` §4.8).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopStageName {
    Validate,
    Repair,
    Transpile,
    Smoke,
    Determinism,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pass,
    Fail,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopStage {
    pub name: LoopStageName,
    pub status: StageStatus,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LoopStage {
    #[must_use]
    pub fn new(name: LoopStageName, status: StageStatus, duration_ms: u64) -> Self {
        Self {
            name,
            status,
            duration_ms,
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Why the repair retry loop stopped after a given attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Success,
    Noop,
    NoImprovement,
    CycleDetected,
    MaxAttempts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairAttempt {
    #[serde(rename = "attemptNumber")]
    pub attempt_number: u32,
    #[serde(rename = "errorsBefore")]
    pub errors_before: usize,
    #[serde(rename = "errorsAfter")]
    pub errors_after: usize,
    #[serde(rename = "sourceHash")]
    pub source_hash: String,
    #[serde(rename = "stopReason", skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeterminismCheck {
    #[serde(rename = "sourceHash")]
    pub source_hash: String,
    #[serde(rename = "outputHashes")]
    pub output_hashes: BTreeMap<String, String>,
    pub deterministic: bool,
}
