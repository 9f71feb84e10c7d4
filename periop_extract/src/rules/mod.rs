//! Data-driven extraction rules.
//!
//! A rule is a (field, matcher, priority, formatter) tuple. Rules are plain
//! serde data so a rule table can be loaded from configuration; they are
//! compiled once into [`CompiledRule`]s before any text is processed.

pub mod tables;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use periop_core::{ClinicalText, FieldPath, TextView};

pub use tables::default_rules;

/// Error type for rule compilation.
#[derive(Debug)]
pub enum BuildError {
    /// The regex pattern of a rule is invalid.
    Regex { rule: String, message: String },

    /// A keyword rule has no terms.
    EmptyKeywords(String),

    /// Two rules share an id.
    DuplicateId(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regex { rule, message } => write!(f, "rule {rule}: invalid regex: {message}"),
            Self::EmptyKeywords(rule) => write!(f, "rule {rule}: keyword list is empty"),
            Self::DuplicateId(rule) => write!(f, "duplicate rule id: {rule}"),
        }
    }
}

impl std::error::Error for BuildError {}

/// How a rule finds candidates in the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherDef {
    /// First regex match; capture groups feed the formatter.
    Regex { pattern: String },

    /// Substring scan for each term, in table order.
    Keywords {
        terms: Vec<String>,
        #[serde(default)]
        collect: Collect,
    },
}

/// Whether a keyword rule keeps the first hit or every hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Collect {
    #[default]
    First,
    /// Every hit, joined with `", "` in table order.
    All,
}

/// Case transform applied to captured text before it is placed in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    #[default]
    Keep,
    Title,
    Upper,
}

impl Transform {
    fn apply(self, s: &str) -> String {
        match self {
            Self::Keep => s.to_string(),
            Self::Title => title_case(s),
            Self::Upper => s.to_uppercase(),
        }
    }
}

/// How a hit becomes the field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatDef {
    /// Template with `$0` (whole match or keyword) and `$1`..`$9` (groups).
    /// Hits whose primary capture is shorter than `min_len` characters are
    /// rejected.
    Template {
        template: String,
        #[serde(default)]
        transform: Transform,
        #[serde(default)]
        min_len: usize,
    },

    /// A fixed value whenever the matcher hits.
    Fixed { value: String },

    /// Map the lower-cased primary capture through a table.
    Lookup {
        entries: BTreeMap<String, String>,
        #[serde(default)]
        fallback: Option<String>,
    },
}

impl FormatDef {
    #[must_use]
    pub fn template(template: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            transform: Transform::Keep,
            min_len: 0,
        }
    }

    #[must_use]
    pub fn fixed(value: impl Into<String>) -> Self {
        Self::Fixed {
            value: value.into(),
        }
    }

    #[must_use]
    pub fn lookup(entries: &[(&str, &str)], fallback: Option<&str>) -> Self {
        Self::Lookup {
            entries: entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            fallback: fallback.map(str::to_string),
        }
    }

    /// Set the transform of a template format. No effect on other formats.
    #[must_use]
    pub fn with_transform(mut self, new: Transform) -> Self {
        if let Self::Template { transform, .. } = &mut self {
            *transform = new;
        }
        self
    }

    /// Set the minimum primary capture length of a template format.
    #[must_use]
    pub fn with_min_len(mut self, len: usize) -> Self {
        if let Self::Template { min_len, .. } = &mut self {
            *min_len = len;
        }
        self
    }

    /// Render one hit. `groups[0]` is the whole match (or the keyword).
    fn render(&self, groups: &[Option<&str>]) -> Option<String> {
        let primary = groups
            .get(1)
            .copied()
            .flatten()
            .or_else(|| groups.first().copied().flatten())?
            .trim();

        match self {
            Self::Template {
                template,
                transform,
                min_len,
            } => {
                if primary.chars().count() < *min_len {
                    return None;
                }
                Some(expand_template(template, groups, *transform))
            }
            Self::Fixed { value } => Some(value.clone()),
            Self::Lookup { entries, fallback } => entries
                .get(&primary.to_lowercase())
                .or(fallback.as_ref())
                .cloned(),
        }
    }
}

/// Definition of a single extraction rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    /// Unique identifier for this rule.
    pub id: String,

    /// The record leaf this rule fills.
    pub field: FieldPath,

    /// Rules for the same field are tried highest priority first; equal
    /// priorities keep table order.
    #[serde(default)]
    pub priority: i32,

    /// Which case-folded view of the text the matcher reads.
    #[serde(default)]
    pub view: TextView,

    pub matcher: MatcherDef,

    pub format: FormatDef,
}

impl RuleDef {
    /// A regex rule over the lower-cased text that emits capture group 1.
    #[must_use]
    pub fn regex(id: &str, field: FieldPath, pattern: &str) -> Self {
        Self {
            id: id.to_string(),
            field,
            priority: 0,
            view: TextView::Lower,
            matcher: MatcherDef::Regex {
                pattern: pattern.to_string(),
            },
            format: FormatDef::template("$1"),
        }
    }

    /// A keyword rule over the lower-cased text that emits the matched term.
    #[must_use]
    pub fn keywords(id: &str, field: FieldPath, terms: &[&str], collect: Collect) -> Self {
        Self {
            id: id.to_string(),
            field,
            priority: 0,
            view: TextView::Lower,
            matcher: MatcherDef::Keywords {
                terms: terms.iter().map(|t| (*t).to_string()).collect(),
                collect,
            },
            format: FormatDef::template("$0"),
        }
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn with_view(mut self, view: TextView) -> Self {
        self.view = view;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: FormatDef) -> Self {
        self.format = format;
        self
    }

    /// Compile into a [`CompiledRule`].
    ///
    /// # Errors
    /// Returns an error if the regex is invalid or the keyword list is empty.
    pub fn build(&self) -> Result<CompiledRule, BuildError> {
        let matcher = match &self.matcher {
            MatcherDef::Regex { pattern } => {
                let re = Regex::new(pattern).map_err(|e| BuildError::Regex {
                    rule: self.id.clone(),
                    message: e.to_string(),
                })?;
                Matcher::Regex(re)
            }
            MatcherDef::Keywords { terms, collect } => {
                if terms.is_empty() {
                    return Err(BuildError::EmptyKeywords(self.id.clone()));
                }
                Matcher::Keywords {
                    terms: terms.clone(),
                    collect: *collect,
                }
            }
        };

        Ok(CompiledRule {
            id: self.id.clone(),
            field: self.field,
            priority: self.priority,
            view: self.view,
            matcher,
            format: self.format.clone(),
        })
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    Keywords { terms: Vec<String>, collect: Collect },
}

/// A rule ready to run against text.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    id: String,
    field: FieldPath,
    priority: i32,
    view: TextView,
    matcher: Matcher,
    format: FormatDef,
}

impl CompiledRule {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn field(&self) -> FieldPath {
        self.field
    }

    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Run the rule. `None` means no hit survived formatting.
    #[must_use]
    pub fn evaluate(&self, text: &ClinicalText) -> Option<String> {
        let haystack = text.view(self.view);

        match &self.matcher {
            Matcher::Regex(re) => {
                let caps = re.captures(haystack)?;
                let groups: Vec<Option<&str>> =
                    caps.iter().map(|m| m.map(|m| m.as_str())).collect();
                self.format.render(&groups)
            }
            Matcher::Keywords { terms, collect } => {
                // Plain substring test: "heparin" also hits "heparinized".
                let mut hits = terms
                    .iter()
                    .map(String::as_str)
                    .filter(|term| haystack.contains(term));

                match collect {
                    Collect::First => hits.find_map(|term| self.format.render(&[Some(term)])),
                    Collect::All => {
                        let rendered: Vec<String> = hits
                            .filter_map(|term| self.format.render(&[Some(term)]))
                            .collect();
                        (!rendered.is_empty()).then(|| rendered.join(", "))
                    }
                }
            }
        }
    }
}

/// Expand a template string with capture groups.
fn expand_template(template: &str, groups: &[Option<&str>], transform: Transform) -> String {
    let mut result = template.to_string();

    for (i, group) in groups.iter().enumerate().take(10) {
        let placeholder = format!("${i}");
        if let Some(matched) = group {
            result = result.replace(&placeholder, &transform.apply(matched.trim()));
        }
    }

    result.trim().to_string()
}

/// Capitalise the first letter of every word and lower-case the rest. A word
/// starts at any letter that does not follow another letter, so
/// `"o'brien"` becomes `"O'Brien"`.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if prev_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_alpha = ch.is_alphabetic();
    }
    out
}
