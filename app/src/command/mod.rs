//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own type and input, so
//! dispatch in `main` is resolved at compile time.

use periop_config::Config;
use periop_extract::InsightExtractor;
use serde::Serialize;
use tracing::info;

mod batch;
mod extract;
mod info;
mod init;
mod rules;
mod version;

pub use batch::{BatchInput, BatchStrategy};
pub use extract::{ExtractInput, ExtractStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use rules::RulesStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Load the config (or defaults) and build an extractor from it. `clean`
/// forces text clean-up on regardless of the config.
fn load_extractor(clean: bool) -> anyhow::Result<(Config, InsightExtractor)> {
    let mut config = Config::load_or_default()?;
    config.extraction.clean_input |= clean;

    let extractor = InsightExtractor::new(&config.extraction)?;
    info!(
        clean_input = config.extraction.clean_input,
        "Extractor built from config"
    );
    Ok((config, extractor))
}

/// Serialize to JSON, pretty-printed when `pretty` is set.
fn to_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}
