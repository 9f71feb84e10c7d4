use serde_json::json;

/// Strategy for printing the active rule table.
///
/// Prints the built-in (or configured) `rules` and any `extra_rules` in the
/// same JSON shape the config file accepts, so the output can be edited and
/// pasted back.
#[derive(Debug, Clone, Copy)]
pub struct RulesStrategy;

impl super::CommandStrategy for RulesStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        // Building validates the table before it is shown.
        let (config, _extractor) = super::load_extractor(false)?;

        let table = json!({
            "rules": config.extraction.rules,
            "extra_rules": config.extraction.extra_rules,
        });
        println!("{}", super::to_json(&table, true)?);
        Ok(())
    }
}
