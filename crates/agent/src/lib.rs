//! Decision engine - LLM-backed loan eligibility analysis.
//!
//! This crate turns (loan type, application data, derived ratios) into a
//! structured [`loanlens_core::AnalysisResult`] by way of an external text
//! generation service:
//!
//! 1. **Prompt construction** (`prompt`) - deterministic template over the
//!    application fields and calculated ratios.
//! 2. **Completion** (`llm`, `openai`) - pluggable [`llm::LlmClient`] trait
//!    with an OpenAI-compatible chat-completions provider.
//! 3. **Reply parsing** (`engine`) - best-effort extraction of the embedded
//!    JSON object, with a fixed low-confidence fallback when the model
//!    output cannot be parsed.
//!
//! # Safety principle
//!
//! The model only phrases the verdict. Parsing failures never surface to
//! callers; provider failures do, as upstream-service errors, and are never
//! retried.

pub mod engine;
pub mod llm;
pub mod openai;
pub mod prompt;

pub use engine::DecisionEngine;
pub use llm::{LlmClient, LlmError};
pub use openai::OpenAiClient;
