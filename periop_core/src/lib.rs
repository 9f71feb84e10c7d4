#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

pub mod error;
pub mod field;
pub mod finding;
pub mod patch;
pub mod record;
pub mod text;

pub use error::{Error, Result};
pub use field::FieldPath;
pub use finding::{Finding, NOT_FOUND};
pub use patch::{ExtractorKind, Patch};
pub use record::{
    AirwayAssessment, Comorbidities, Findings, InsightRecord, IntraOperative, LaboratoryValues,
    Medications, Metadata, PatientInfo, PostOperative, PreOperative, RiskAssessment, SurgicalPlan,
};
pub use text::{ClinicalText, TextView};

/// Schema version stamped into every record's metadata.
pub const SCHEMA_VERSION: &str = "1.0";

/// Disclaimer stamped into every record's metadata.
pub const CONFIDENCE_NOTE: &str = "Automated extraction - verify critical values";

/// A sub-extractor: a pure function from clinical text to a patch over the
/// fields it owns.
pub trait Extractor: Send + Sync {
    /// Which sub-extractor this is. Every field in the returned patch must be
    /// owned by this kind.
    fn kind(&self) -> ExtractorKind;

    /// Run against the text and return the fields this extractor found.
    fn extract(&self, text: &ClinicalText) -> Patch;
}
