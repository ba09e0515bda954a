//! Derived financial ratios computed from a submitted application.
//!
//! Pure and infallible: any missing, non-numeric, or zero-denominator input
//! degrades the affected ratio to `None` without touching the others.

use serde::{Deserialize, Serialize};

use crate::application::ApplicationData;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    pub loan_to_income_ratio: Option<f64>,
    pub debt_to_income_ratio: Option<f64>,
    pub collateral_to_loan_ratio: Option<f64>,
}

impl DerivedRatios {
    /// Ratios in their fixed presentation order.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 3] {
        [
            ("loan_to_income_ratio", self.loan_to_income_ratio),
            ("debt_to_income_ratio", self.debt_to_income_ratio),
            ("collateral_to_loan_ratio", self.collateral_to_loan_ratio),
        ]
    }
}

pub fn compute_derived_ratios(data: &ApplicationData) -> DerivedRatios {
    let annual_income = data.numeric("annual_income");
    let loan_amount = data.numeric("loan_amount");

    // A field that is absent counts as zero; a field that is present but
    // unparseable poisons its ratio instead.
    let existing_debts = match data.get("existing_debts") {
        None => Some(0.0),
        Some(value) => crate::application::numeric_scalar(value),
    };
    let collateral_value = match data.get("collateral_value") {
        None => Some(0.0),
        Some(value) => crate::application::numeric_scalar(value),
    };

    let collateral_to_loan_ratio = if data.text("collateral") == Some("Yes") {
        divide(collateral_value, loan_amount)
    } else {
        None
    };

    DerivedRatios {
        loan_to_income_ratio: divide(loan_amount, annual_income),
        debt_to_income_ratio: divide(existing_debts, annual_income),
        collateral_to_loan_ratio,
    }
}

fn divide(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let numerator = numerator?;
    let denominator = denominator?;
    if denominator == 0.0 {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}
