//! Extraction engine for perioperative insight records.
//!
//! The engine compiles the configured rule table once, splits it into one
//! [`RuleGroup`] per sub-extractor, and folds their patches into a single
//! [`InsightRecord`] in a fixed order.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use periop_core::{ClinicalText, Extractor, ExtractorKind, Findings, InsightRecord, Metadata};

use crate::extractors::RuleGroup;
use crate::preprocess::clean_text;
use crate::rules::{BuildError, RuleDef, default_rules};

/// Configuration for the extraction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// The rule table. Replaces the built-in table when set.
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleDef>,

    /// Rules appended to `rules`, for site-specific additions.
    #[serde(default)]
    pub extra_rules: Vec<RuleDef>,

    /// Run [`clean_text`] on every input before extraction.
    #[serde(default)]
    pub clean_input: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            extra_rules: Vec::new(),
            clean_input: false,
        }
    }
}

/// One input of a batch run.
#[derive(Debug, Clone)]
pub struct Document {
    /// Label recorded as `metadata.source`, usually a file name.
    pub source: String,
    pub content: Vec<u8>,
}

impl Document {
    #[must_use]
    pub fn new(source: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            content,
        }
    }

    #[must_use]
    pub fn from_text(source: impl Into<String>, text: &str) -> Self {
        Self::new(source, text.as_bytes().to_vec())
    }
}

/// Orchestrates the sub-extractors over one document at a time.
pub struct InsightExtractor {
    /// Sub-extractors in fold order.
    extractors: Vec<Box<dyn Extractor>>,
    clean_input: bool,
}

impl std::fmt::Debug for InsightExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<ExtractorKind> = self.extractors.iter().map(|e| e.kind()).collect();
        f.debug_struct("InsightExtractor")
            .field("extractors", &kinds)
            .field("clean_input", &self.clean_input)
            .finish()
    }
}

impl InsightExtractor {
    /// Create an extractor from configuration.
    ///
    /// # Errors
    /// Returns an error if a rule fails to compile or two rules share an id.
    pub fn new(config: &ExtractionConfig) -> Result<Self, BuildError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(config.rules.len() + config.extra_rules.len());

        for def in config.rules.iter().chain(&config.extra_rules) {
            if !seen.insert(def.id.as_str()) {
                return Err(BuildError::DuplicateId(def.id.clone()));
            }
            compiled.push(def.build()?);
        }

        let extractors: Vec<Box<dyn Extractor>> = ExtractorKind::ORDER
            .iter()
            .map(|kind| Box::new(RuleGroup::new(*kind, &compiled)) as Box<dyn Extractor>)
            .collect();

        info!(
            rules = compiled.len(),
            extra = config.extra_rules.len(),
            clean_input = config.clean_input,
            "Extraction engine ready"
        );

        Ok(Self {
            extractors,
            clean_input: config.clean_input,
        })
    }

    /// Create an extractor with the built-in rule table.
    ///
    /// # Errors
    /// Returns an error if the built-in table fails to compile.
    pub fn with_defaults() -> Result<Self, BuildError> {
        Self::new(&ExtractionConfig::default())
    }

    /// Assemble an extractor from arbitrary sub-extractors. Patches are
    /// folded in the order given.
    #[must_use]
    pub fn from_extractors(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self {
            extractors,
            clean_input: false,
        }
    }

    #[must_use]
    pub const fn with_clean_input(mut self, clean: bool) -> Self {
        self.clean_input = clean;
        self
    }

    /// Extract a record, stamped with the current time.
    pub fn extract(&self, text: &str) -> periop_core::Result<InsightRecord> {
        self.extract_with_timestamp(text, Utc::now())
    }

    /// Extract a record with a caller-supplied timestamp. Same text and same
    /// timestamp always give the same record.
    pub fn extract_with_timestamp(
        &self,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> periop_core::Result<InsightRecord> {
        self.record_for(ClinicalText::new(text), timestamp)
    }

    /// Extract from raw bytes.
    ///
    /// # Errors
    /// Returns [`periop_core::Error::InvalidInput`] if the bytes are not UTF-8.
    pub fn extract_bytes(&self, bytes: &[u8]) -> periop_core::Result<InsightRecord> {
        self.record_for(ClinicalText::from_bytes(bytes)?, Utc::now())
    }

    /// Single path from prepared text to record. The text is only rebuilt
    /// when clean-up is on.
    fn record_for(
        &self,
        text: ClinicalText,
        timestamp: DateTime<Utc>,
    ) -> periop_core::Result<InsightRecord> {
        let text = if self.clean_input {
            ClinicalText::new(clean_text(text.raw()))
        } else {
            text
        };
        let findings = self.findings(&text)?;
        Ok(InsightRecord::new(findings, Metadata::new(timestamp)))
    }

    /// Run every sub-extractor and fold the patches.
    ///
    /// # Errors
    /// Fails if a sub-extractor writes a field it does not own or a field
    /// already written. No partial findings are returned.
    pub fn findings(&self, text: &ClinicalText) -> periop_core::Result<Findings> {
        let mut findings = Findings::default();

        for extractor in &self.extractors {
            let patch = extractor.extract(text);
            debug!(
                extractor = %extractor.kind(),
                fields = patch.len(),
                "Applying patch"
            );
            findings.apply(patch)?;
        }

        Ok(findings)
    }

    /// Extract every document in parallel. Results keep input order and a
    /// failing document does not affect the others.
    #[must_use]
    pub fn extract_batch(&self, documents: &[Document]) -> Vec<periop_core::Result<InsightRecord>> {
        info!(documents = documents.len(), "Starting batch extraction");

        documents
            .par_iter()
            .map(|doc| {
                let result = self.extract_bytes(&doc.content).map(|mut record| {
                    record.metadata = record.metadata.with_source(doc.source.clone());
                    record
                });
                if let Err(e) = &result {
                    warn!(source = %doc.source, error = %e, "Document failed");
                }
                result
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use periop_core::{Error, FieldPath, Patch};

    /// Writes a field owned by the laboratory extractor while claiming to be
    /// the risk extractor.
    struct RogueExtractor;

    impl Extractor for RogueExtractor {
        fn kind(&self) -> ExtractorKind {
            ExtractorKind::Risk
        }

        fn extract(&self, _text: &ClinicalText) -> Patch {
            let mut patch = Patch::new(ExtractorKind::Risk);
            patch.set(FieldPath::Hemoglobin, "99");
            patch
        }
    }

    struct FixedExtractor(ExtractorKind, FieldPath, &'static str);

    impl Extractor for FixedExtractor {
        fn kind(&self) -> ExtractorKind {
            self.0
        }

        fn extract(&self, _text: &ClinicalText) -> Patch {
            let mut patch = Patch::new(self.0);
            patch.set(self.1, self.2);
            patch
        }
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_default_engine_builds() {
        let engine = InsightExtractor::with_defaults().expect("defaults should compile");
        assert_eq!(engine.extractors.len(), ExtractorKind::ORDER.len());
        for (extractor, kind) in engine.extractors.iter().zip(ExtractorKind::ORDER) {
            assert_eq!(extractor.kind(), kind);
        }
    }

    #[test]
    fn test_duplicate_rule_id_rejected() {
        let config = ExtractionConfig {
            extra_rules: vec![RuleDef::regex(
                "asa_labelled",
                FieldPath::Glucose,
                r"glucose:?\s*(\d+)",
            )],
            ..ExtractionConfig::default()
        };
        let result = InsightExtractor::new(&config);
        assert!(matches!(result, Err(BuildError::DuplicateId(id)) if id == "asa_labelled"));
    }

    #[test]
    fn test_foreign_field_aborts_extraction() {
        let engine = InsightExtractor::from_extractors(vec![Box::new(RogueExtractor)]);
        let result = engine.extract("anything");
        assert!(matches!(
            result,
            Err(Error::ForeignField { extractor: "risk", .. })
        ));
    }

    #[test]
    fn test_double_write_aborts_extraction() {
        let engine = InsightExtractor::from_extractors(vec![
            Box::new(FixedExtractor(ExtractorKind::Laboratory, FieldPath::Glucose, "90")),
            Box::new(FixedExtractor(ExtractorKind::Laboratory, FieldPath::Glucose, "95")),
        ]);
        let result = engine.extract("");
        assert!(matches!(result, Err(Error::FieldConflict { .. })));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_timestamp_is_caller_supplied() {
        let engine = InsightExtractor::with_defaults().expect("defaults should compile");
        let ts = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        let record = engine
            .extract_with_timestamp("ASA II", ts)
            .expect("extraction should succeed");
        assert_eq!(record.metadata.processed_timestamp, ts);
        assert_eq!(record.metadata.version, "1.0");
        assert!(record.metadata.source.is_none());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_clean_input_applies_before_matching() {
        let engine = InsightExtractor::with_defaults()
            .expect("defaults should compile")
            .with_clean_input(true);
        let record = engine
            .extract("Hemoglobin:\t\t11.8\r\n")
            .expect("extraction should succeed");
        assert_eq!(record.get(FieldPath::Hemoglobin).value(), Some("11.8 g/dL"));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_extract_bytes_matches_extract() {
        let chart = "Hemoglobin:\t\t11.8\r\nASA IIIE\r\n\r\n\r\nNKDA";
        for clean in [false, true] {
            let engine = InsightExtractor::with_defaults()
                .expect("defaults should compile")
                .with_clean_input(clean);
            let from_str = engine.extract(chart).expect("extraction should succeed");
            let from_bytes = engine
                .extract_bytes(chart.as_bytes())
                .expect("extraction should succeed");
            assert_eq!(from_bytes.findings, from_str.findings, "clean = {clean}");
        }
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn test_extract_bytes_rejects_invalid_utf8() {
        let engine = InsightExtractor::with_defaults().expect("defaults should compile");
        assert!(matches!(
            engine.extract_bytes(&[b'A', b'S', b'A', 0xc3, 0x28]),
            Err(Error::InvalidInput(_))
        ));
    }
}
