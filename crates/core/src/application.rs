//! Per-request application payload.
//!
//! Field sets vary per loan type, so the payload stays a loosely typed
//! key/value mapping rather than a rigid record. All numeric coercion goes
//! through [`ApplicationData::numeric`] so the parse-or-null policy lives in
//! exactly one place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationData(Map<String, Value>);

impl ApplicationData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Fields in payload insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse-or-null numeric access: JSON numbers pass through, numeric
    /// strings are parsed, everything else is `None`. Non-finite values are
    /// treated as unusable input.
    pub fn numeric(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(numeric_scalar)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Copy of the payload with the loan type merged in, as report rendering
    /// expects. An existing `loan_type` key is overwritten in place.
    pub fn with_loan_type(&self, loan_type: &str) -> Self {
        let mut merged = self.clone();
        merged.insert("loan_type", Value::String(loan_type.to_string()));
        merged
    }
}

pub fn numeric_scalar(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|parsed| parsed.is_finite()),
        Value::String(raw) => raw.trim().parse::<f64>().ok().filter(|parsed| parsed.is_finite()),
        _ => None,
    }
}

/// Render a scalar the way it appears in prompts and reports: strings
/// without quotes, everything else via its JSON form.
pub fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// `snake_case_key` -> `Snake Case Key`, used for prompt and report labels.
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut characters = word.chars();
            match characters.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + characters.as_str()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{display_scalar, title_case, ApplicationData};

    fn payload() -> ApplicationData {
        serde_json::from_value(json!({
            "full_name": "Jane Doe",
            "annual_income": 120000,
            "loan_amount": "250000",
            "credit_score": 710.5,
            "collateral": "Yes",
            "notes": null,
        }))
        .expect("payload should deserialize")
    }

    #[test]
    fn numeric_parses_numbers_and_numeric_strings() {
        let data = payload();
        assert_eq!(data.numeric("annual_income"), Some(120_000.0));
        assert_eq!(data.numeric("loan_amount"), Some(250_000.0));
        assert_eq!(data.numeric("credit_score"), Some(710.5));
    }

    #[test]
    fn numeric_is_null_for_missing_text_and_null_values() {
        let data = payload();
        assert_eq!(data.numeric("full_name"), None);
        assert_eq!(data.numeric("notes"), None);
        assert_eq!(data.numeric("absent"), None);
        assert_eq!(data.numeric("collateral"), None);
    }

    #[test]
    fn iteration_preserves_payload_insertion_order() {
        let data = payload();
        let keys = data.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();
        assert_eq!(
            keys,
            ["full_name", "annual_income", "loan_amount", "credit_score", "collateral", "notes"]
        );
    }

    #[test]
    fn with_loan_type_appends_or_overwrites_in_place() {
        let merged = payload().with_loan_type("car");
        assert_eq!(merged.text("loan_type"), Some("car"));
        let keys = merged.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys.last(), Some(&"loan_type"));

        let remerged = merged.with_loan_type("home");
        assert_eq!(remerged.text("loan_type"), Some("home"));
        assert_eq!(remerged.len(), merged.len());
    }

    #[test]
    fn display_scalar_strips_quotes_from_strings_only() {
        assert_eq!(display_scalar(&Value::String("Jane Doe".to_string())), "Jane Doe");
        assert_eq!(display_scalar(&serde_json::json!(42)), "42");
        assert_eq!(display_scalar(&Value::Null), "null");
    }

    #[test]
    fn title_case_formats_field_names() {
        assert_eq!(title_case("loan_to_income_ratio"), "Loan To Income Ratio");
        assert_eq!(title_case("full_name"), "Full Name");
        assert_eq!(title_case("age"), "Age");
    }
}
