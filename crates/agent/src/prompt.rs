//! Deterministic prompt template for the eligibility analysis.

use std::fmt::Write;

use loanlens_core::application::{display_scalar, title_case, ApplicationData};
use loanlens_core::ratios::DerivedRatios;

const INSTRUCTION_BLOCK: &str = r#"
Evaluate eligibility and reply STRICTLY in JSON format:
{
  "decision": "Approved or Risk",
  "risk_score": [0-100],
  "reasons": ["..."],
  "improvement_tips": ["..."],
  "comparison_insights": ["..."]
}
If rejected, give alternative loan suggestions."#;

/// Header naming the loan type, one line per submitted field, one line per
/// calculated ratio, then the fixed instruction block. Identical inputs
/// always produce the identical prompt.
pub fn build_prompt(loan_type: &str, data: &ApplicationData, ratios: &DerivedRatios) -> String {
    let mut prompt =
        format!("A candidate applied for a {loan_type} with the following details:\n");

    for (key, value) in data.iter() {
        let _ = writeln!(prompt, "- {}: {}", title_case(key), display_scalar(value));
    }
    for (name, value) in ratios.entries() {
        let _ = writeln!(prompt, "- {} (calculated): {}", title_case(name), format_ratio(value));
    }

    prompt.push_str(INSTRUCTION_BLOCK);
    prompt
}

fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(ratio) => format!("{ratio}"),
        None => "None".to_string(),
    }
}
