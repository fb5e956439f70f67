//! [`air_repair::RepairAdapter`] implementation backed by an
//! [`LlmClient`]. Owns the transport-layer retry loop (429/5xx/timeout);
//! semantic retries across attempts are the agent loop's job, not this
//! adapter's.

use std::sync::Arc;
use std::time::Duration;

use air_diagnostics::{format_diagnostic_cli, Diagnostic};
use air_repair::{RepairAdapter, RepairContext, RepairResult, RepairStatus};
use async_trait::async_trait;

use crate::client::{LlmClient, TransportError};
use crate::extract::extract_air_source;
use crate::message::Message;

const SYSTEM_PROMPT: &str = "You fix AIR source files so they parse and validate. \
Return only the corrected AIR source in a fenced ```air code block, nothing else.";

pub struct LlmRepairAdapter {
    client: Arc<dyn LlmClient>,
    max_retries: u32,
}

impl LlmRepairAdapter {
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>, max_retries: u32) -> Self {
        Self { client, max_retries }
    }

    fn build_prompt(source: &str, diagnostics: &[Diagnostic]) -> Vec<Message> {
        let rendered: Vec<String> = diagnostics.iter().map(format_diagnostic_cli).collect();
        let user = format!(
            "Source:\n```air\n{source}\n```\n\nDiagnostics:\n{}",
            rendered.join("\n")
        );
        vec![Message::system(SYSTEM_PROMPT), Message::user(user)]
    }

    async fn complete_with_retries(&self, messages: &[Message]) -> Result<String, TransportError> {
        let mut attempt = 0;
        loop {
            match self.client.complete(messages).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = Duration::from_millis(200 * u64::from(attempt));
                    tracing::warn!(attempt, error = %e, "retrying LLM repair call");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl RepairAdapter for LlmRepairAdapter {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn repair(
        &self,
        source: &str,
        diagnostics: &[Diagnostic],
        _context: Option<&RepairContext>,
    ) -> RepairResult {
        let messages = Self::build_prompt(source, diagnostics);
        let response = match self.complete_with_retries(&messages).await {
            Ok(text) => text,
            Err(e) => {
                return RepairResult {
                    status: RepairStatus::Failed,
                    source: source.to_string(),
                    actions: Vec::new(),
                    message: Some(e.to_string()),
                };
            }
        };

        let candidate = extract_air_source(&response);
        if candidate == source {
            return RepairResult::unchanged(source, RepairStatus::Noop);
        }

        let status = match air_parser::parse(&candidate) {
            Ok(_) => RepairStatus::Repaired,
            Err(_) => RepairStatus::Partial,
        };
        RepairResult {
            status,
            source: candidate,
            actions: Vec::new(),
            message: None,
        }
    }
}
