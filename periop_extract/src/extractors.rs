//! Rule-table sub-extractors.
//!
//! A [`RuleGroup`] is the generic table walker behind every sub-extractor:
//! for each field it owns it tries the field's rules in priority order and
//! keeps the first value produced.

use periop_core::{ClinicalText, Extractor, ExtractorKind, FieldPath, Patch};
use tracing::trace;

use crate::rules::CompiledRule;

/// The rules of one sub-extractor, grouped per field.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    kind: ExtractorKind,
    /// Fields in first-seen order; rules sorted by descending priority.
    fields: Vec<(FieldPath, Vec<CompiledRule>)>,
}

impl RuleGroup {
    /// Collect the rules owned by `kind`. Rules for other extractors are
    /// ignored.
    #[must_use]
    pub fn new(kind: ExtractorKind, rules: &[CompiledRule]) -> Self {
        let mut fields: Vec<(FieldPath, Vec<CompiledRule>)> = Vec::new();

        for rule in rules.iter().filter(|r| r.field().owner() == kind) {
            match fields.iter_mut().find(|(f, _)| *f == rule.field()) {
                Some((_, group)) => group.push(rule.clone()),
                None => fields.push((rule.field(), vec![rule.clone()])),
            }
        }

        // Stable, so equal priorities keep table order.
        for (_, group) in &mut fields {
            group.sort_by_key(|r| std::cmp::Reverse(r.priority()));
        }

        Self { kind, fields }
    }
}

impl Extractor for RuleGroup {
    fn kind(&self) -> ExtractorKind {
        self.kind
    }

    fn extract(&self, text: &ClinicalText) -> Patch {
        let mut patch = Patch::new(self.kind);

        for (field, rules) in &self.fields {
            let hit = rules
                .iter()
                .find_map(|rule| rule.evaluate(text).map(|value| (rule.id(), value)));

            if let Some((rule, value)) = hit {
                trace!(field = %field, rule, "rule matched");
                patch.set(*field, value);
            }
        }

        patch
    }
}
