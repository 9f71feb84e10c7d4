//! Clinical text input.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which case-normalised view of the text a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextView {
    Raw,
    #[default]
    Lower,
    Upper,
}

/// Immutable clinical narrative with its case-folded views computed once.
#[derive(Debug, Clone)]
pub struct ClinicalText {
    raw: String,
    lower: String,
    upper: String,
}

impl ClinicalText {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let lower = raw.to_lowercase();
        let upper = raw.to_uppercase();
        Self { raw, lower, upper }
    }

    /// Build from raw bytes, rejecting anything that is not UTF-8 text.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `bytes` is not valid UTF-8. No lossy
    /// conversion is attempted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = std::str::from_utf8(bytes).map_err(|e| {
            Error::InvalidInput(format!(
                "expected UTF-8 text, invalid byte at offset {}",
                e.valid_up_to()
            ))
        })?;
        Ok(Self::new(raw))
    }

    #[must_use]
    pub fn view(&self, view: TextView) -> &str {
        match view {
            TextView::Raw => &self.raw,
            TextView::Lower => &self.lower,
            TextView::Upper => &self.upper,
        }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl From<&str> for ClinicalText {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ClinicalText {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views() {
        let text = ClinicalText::new("ASA iii, Hgb 11.8");
        assert_eq!(text.view(TextView::Raw), "ASA iii, Hgb 11.8");
        assert_eq!(text.view(TextView::Lower), "asa iii, hgb 11.8");
        assert_eq!(text.view(TextView::Upper), "ASA III, HGB 11.8");
    }

    #[test]
    fn test_from_bytes_rejects_binary() {
        let result = ClinicalText::from_bytes(&[0x41, 0x53, 0xff, 0xfe]);
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.contains("offset 2")));
    }

    #[test]
    fn test_from_bytes_accepts_empty() {
        let text = ClinicalText::from_bytes(b"").ok();
        assert!(text.is_some_and(|t| t.is_empty()));
    }
}
