//! Partial results produced by sub-extractors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::field::FieldPath;

/// The sub-extractors of the insight engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    Demographics,
    Status,
    Allergy,
    Medication,
    Comorbidity,
    Laboratory,
    SurgicalPlan,
    Airway,
    Risk,
}

impl ExtractorKind {
    /// Fixed run order of the engine.
    pub const ORDER: [Self; 9] = [
        Self::Demographics,
        Self::Status,
        Self::Allergy,
        Self::Medication,
        Self::Comorbidity,
        Self::Laboratory,
        Self::SurgicalPlan,
        Self::Airway,
        Self::Risk,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Demographics => "demographics",
            Self::Status => "status",
            Self::Allergy => "allergy",
            Self::Medication => "medication",
            Self::Comorbidity => "comorbidity",
            Self::Laboratory => "laboratory",
            Self::SurgicalPlan => "surgical_plan",
            Self::Airway => "airway",
            Self::Risk => "risk",
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields located by one sub-extractor in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    source: ExtractorKind,
    entries: Vec<(FieldPath, String)>,
}

impl Patch {
    #[must_use]
    pub const fn new(source: ExtractorKind) -> Self {
        Self {
            source,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub const fn source(&self) -> ExtractorKind {
        self.source
    }

    pub fn set(&mut self, field: FieldPath, value: impl Into<String>) {
        self.entries.push((field, value.into()));
    }

    /// Value this patch holds for `field`, if any.
    #[must_use]
    pub fn get(&self, field: FieldPath) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<(FieldPath, String)> {
        self.entries
    }
}
