//! A single record leaf.
//!
//! Absence is an `Option` inside the crate. The `"Not Found"` text only
//! appears at the serde boundary so it can never be mistaken for clinical
//! text by code that reads a `Finding`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Serialized form of an absent finding.
pub const NOT_FOUND: &str = "Not Found";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Finding(Option<String>);

impl Finding {
    #[must_use]
    pub const fn absent() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn found(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    /// The extracted value, if any evidence was located.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.0.is_some()
    }

    /// Whether the extracted value contains `needle`. Always false when absent.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.value().is_some_and(|v| v.contains(needle))
    }

    /// Text used in the serialized record.
    #[must_use]
    pub fn as_display(&self) -> &str {
        self.value().unwrap_or(NOT_FOUND)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_display())
    }
}

impl Serialize for Finding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_display())
    }
}

impl<'de> Deserialize<'de> for Finding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == NOT_FOUND {
            Ok(Self::absent())
        } else {
            Ok(Self(Some(raw)))
        }
    }
}
