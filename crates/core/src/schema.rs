//! Static loan-type schema: which fields each loan category expects.
//!
//! The schema is fixed at compile time and never changes over the process
//! lifetime. Field order matters: it is the order forms present fields in.

static CAR_FIELDS: &[&str] = &[
    "full_name",
    "age",
    "employment_status",
    "annual_income",
    "existing_debts",
    "credit_score",
    "loan_amount",
    "loan_tenure",
    "collateral",
    "vehicle_value",
    "down_payment",
    "insurance_status",
];

static HOME_FIELDS: &[&str] = &[
    "full_name",
    "age",
    "employment_status",
    "annual_income",
    "existing_debts",
    "credit_score",
    "loan_amount",
    "loan_tenure",
    "collateral",
    "property_value",
    "down_payment",
    "years_in_current_job",
];

static STUDENT_FIELDS: &[&str] = &[
    "full_name",
    "age",
    "employment_status",
    "annual_income",
    "existing_debts",
    "credit_score",
    "loan_amount",
    "loan_tenure",
    "collateral",
    "course_type",
    "university_tier",
    "expected_future_salary",
    "co_signer_presence",
];

static PERSONAL_FIELDS: &[&str] = &[
    "full_name",
    "age",
    "employment_status",
    "annual_income",
    "existing_debts",
    "credit_score",
    "loan_amount",
    "loan_tenure",
    "collateral",
    "purpose",
    "existing_credit_card_usage",
];

static BUSINESS_FIELDS: &[&str] = &[
    "full_name",
    "age",
    "employment_status",
    "annual_income",
    "existing_debts",
    "credit_score",
    "loan_amount",
    "loan_tenure",
    "collateral",
    "business_type",
    "years_in_business",
    "annual_turnover",
    "profit_margin",
];

/// Closed set of supported loan categories, in presentation order.
pub fn loan_types() -> &'static [&'static str] {
    &["car", "home", "student", "personal", "business"]
}

/// Expected field names for a loan type, or `None` for unknown types.
pub fn fields_for(loan_type: &str) -> Option<&'static [&'static str]> {
    match loan_type {
        "car" => Some(CAR_FIELDS),
        "home" => Some(HOME_FIELDS),
        "student" => Some(STUDENT_FIELDS),
        "personal" => Some(PERSONAL_FIELDS),
        "business" => Some(BUSINESS_FIELDS),
        _ => None,
    }
}

pub fn is_known(loan_type: &str) -> bool {
    fields_for(loan_type).is_some()
}
