//! LLM-backed repair adapter: prompt construction over the shared
//! [`air_diagnostics::Diagnostic`] shape, transport retries, and gating
//! the model's response by re-parsing it.

mod adapter;
mod client;
mod extract;
mod message;

pub use adapter::LlmRepairAdapter;
pub use client::{HttpLlmClient, LlmClient, TransportError};
pub use extract::extract_air_source;
pub use message::{Message, Role};
