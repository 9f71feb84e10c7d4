use periop_config::Config;

/// Strategy for initializing the configuration.
///
/// This strategy creates the default configuration file at `~/periop/config.json`.
/// An existing file is never overwritten.
///
/// # Design
/// - Stateless: No internal state, simplest form of strategy
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::create_config()?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Configuration options:");
        println!("   - extraction.clean_input: normalise text before extraction");
        println!("   - extraction.rules: replace the built-in rule table");
        println!("   - extraction.extra_rules: rules appended to the table");
        println!("   - output.pretty: pretty-print JSON output");
        println!();
        println!("Run 'periop rules' to see the built-in table.");
        Ok(())
    }
}
