use thiserror::Error;

/// Client-input failures: the caller sent something the schema rejects.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid loan type `{0}`")]
    UnknownLoanType(String),
    #[error("report data is missing a loan_type")]
    MissingLoanType,
}

/// Request-scoped failures after validation. Every variant is terminal for
/// its request; nothing is retried and nothing is persisted to roll back.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("decision engine failure: {0}")]
    DecisionEngine(String),
    #[error("report rendering failure: {0}")]
    Render(String),
    #[error("mail delivery failure: {0}")]
    Mail(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Whether the failure is the caller's fault (4xx) rather than an
    /// upstream or internal one (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}
