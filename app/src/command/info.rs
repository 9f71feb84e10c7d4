use std::collections::BTreeMap;

use periop_config::Config;
use periop_core::ExtractorKind;
use periop_extract::RuleDef;

/// Strategy for displaying configuration information.
///
/// This strategy outputs:
/// - Where the config file lives and whether it exists
/// - Extraction settings and the rule count per sub-extractor
/// - Output settings
///
/// # Design
/// - Stateless: No internal state
/// - Falls back to defaults when no config file exists
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::config_path()?;
        let config = Config::load_or_default()?;

        println!("=== periop Configuration ===\n");

        println!("Config File:");
        println!("  Path: {}", config_path.display());
        if config_path.exists() {
            println!("  Status: Loaded");
        } else {
            println!("  Status: Not found (using defaults, run 'periop init')");
        }
        println!();

        let extraction = &config.extraction;
        println!("Extraction:");
        println!("  Clean Input: {}", extraction.clean_input);
        println!("  Rules: {}", extraction.rules.len());
        println!("  Extra Rules: {}", extraction.extra_rules.len());
        println!("  Rules per extractor:");
        let counts = rules_per_extractor(extraction.rules.iter().chain(&extraction.extra_rules));
        for kind in ExtractorKind::ORDER {
            println!(
                "    {}: {}",
                kind,
                counts.get(&kind.as_str()).copied().unwrap_or(0)
            );
        }
        println!();

        println!("Output:");
        println!("  Pretty: {}", config.output.pretty);

        Ok(())
    }
}

fn rules_per_extractor<'a>(
    rules: impl Iterator<Item = &'a RuleDef>,
) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for rule in rules {
        *counts.entry(rule.field.owner().as_str()).or_insert(0) += 1;
    }
    counts
}
