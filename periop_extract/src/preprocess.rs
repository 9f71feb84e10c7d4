//! Optional clean-up of raw document text before extraction.
//!
//! Meant for text pulled out of case reports and exported documents, where
//! line endings, tab runs, long blank gaps and a trailing bibliography add
//! noise. Off by default.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Two or more consecutive blank lines.
static BLANK_LINES: OnceLock<Regex> = OnceLock::new();

/// A run of tabs.
static TAB_RUN: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn blank_lines() -> &'static Regex {
    BLANK_LINES.get_or_init(|| {
        Regex::new(r"\n\s*\n\s*\n+").expect("Static regex pattern is guaranteed to be valid")
    })
}

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn tab_run() -> &'static Regex {
    TAB_RUN.get_or_init(|| Regex::new(r"\t+").expect("Static regex pattern is guaranteed to be valid"))
}

/// A `References` heading that starts after this fraction of the document is
/// treated as the bibliography and cut.
const REFERENCES_CUTOFF: (usize, usize) = (3, 5);

/// Normalise line endings, collapse blank-line and tab runs, drop a trailing
/// references section, and trim.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = blank_lines().replace_all(&text, "\n\n");
    let text = tab_run().replace_all(&text, " ");
    strip_references(&text).trim().to_string()
}

fn strip_references(text: &str) -> &str {
    // ASCII folding keeps byte offsets aligned with `text`.
    let folded = text.to_ascii_lowercase();
    let Some(idx) = folded.rfind("\nreferences") else {
        return text;
    };

    let (num, den) = REFERENCES_CUTOFF;
    if idx * den > text.len() * num {
        debug!(
            offset = idx,
            len = text.len(),
            "dropping trailing references section"
        );
        &text[..idx]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings_and_tabs() {
        assert_eq!(clean_text("Hgb\t\t11.8\r\nASA II\rNPO"), "Hgb 11.8\nASA II\nNPO");
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        assert_eq!(clean_text("a\n\n\n   \n\nb"), "a\n\nb");
        assert_eq!(clean_text("a\n\nb"), "a\n\nb");
        assert_eq!(clean_text("a\r\n\r\n\r\nb"), "a\n\nb");
    }

    #[test]
    fn test_trailing_references_dropped() {
        let body = "Case: 70 year old male scheduled for hip arthroplasty. ".repeat(4);
        let text = format!("{body}\nReferences\n1. Smith J. Anesthesiology 2019.");
        let cleaned = clean_text(&text);
        assert!(!cleaned.contains("References"));
        assert!(cleaned.ends_with("arthroplasty."));
    }

    #[test]
    fn test_early_references_kept() {
        let text = format!("Intro\nReferences to prior notes.\n{}", "More text. ".repeat(20));
        assert!(clean_text(&text).contains("References"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t\n "), "");
    }
}
