//! Core domain for the loanlens service.
//!
//! Everything in this crate is deterministic and free of I/O: the static
//! loan-type schema, the per-request application payload, derived financial
//! ratios, the structured analysis result, configuration loading, and the
//! error taxonomy shared by the agent and server crates.

pub mod analysis;
pub mod application;
pub mod config;
pub mod errors;
pub mod ratios;
pub mod schema;

pub use analysis::{AnalysisResult, Decision};
pub use application::ApplicationData;
pub use errors::{ApplicationError, DomainError};
pub use ratios::{compute_derived_ratios, DerivedRatios};
