//! Orchestrates one analysis: build the prompt, call the model, parse the
//! reply. Parsing is the terminal error-absorption point for malformed model
//! output; only provider failures surface to the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use loanlens_core::application::ApplicationData;
use loanlens_core::errors::ApplicationError;
use loanlens_core::ratios::DerivedRatios;
use loanlens_core::AnalysisResult;

use crate::llm::LlmClient;
use crate::prompt::build_prompt;

#[derive(Clone)]
pub struct DecisionEngine {
    client: Arc<dyn LlmClient>,
}

impl DecisionEngine {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub async fn analyze(
        &self,
        loan_type: &str,
        data: &ApplicationData,
        ratios: &DerivedRatios,
    ) -> Result<AnalysisResult, ApplicationError> {
        let prompt = build_prompt(loan_type, data, ratios);

        let reply = self
            .client
            .complete(&prompt)
            .await
            .map_err(|error| ApplicationError::DecisionEngine(error.to_string()))?;

        Ok(parse_reply(&reply))
    }
}

/// Best-effort boundary parse of free-form model text. Scans for the
/// greedy `{...}` span, deserializes it into the analysis shape, and falls
/// back to the fixed low-confidence result on any failure. Never errors.
pub fn parse_reply(reply: &str) -> AnalysisResult {
    let Some(candidate) = extract_json_object(reply) else {
        warn!("model reply contained no JSON object, using fallback analysis");
        return AnalysisResult::unparseable();
    };

    match serde_json::from_str::<AnalysisResult>(candidate) {
        Ok(result) => result.clamp_risk_score(),
        Err(error) => {
            warn!(error = %error, "model reply JSON did not match the analysis shape");
            AnalysisResult::unparseable()
        }
    }
}

/// Greedy match from the first `{` to the last `}`, mirroring surrounding
/// prose being stripped rather than balanced-brace counting.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        debug!("brace span in model reply was empty or inverted");
        return None;
    }
    Some(&text[start..=end])
}
