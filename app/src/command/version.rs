/// Strategy for displaying version information.
///
/// Prints the application version and the record schema version it emits.
#[derive(Debug, Clone, Copy)]
pub struct VersionStrategy;

impl super::CommandStrategy for VersionStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        println!(
            "periop {} (record schema {})",
            env!("CARGO_PKG_VERSION"),
            periop_core::SCHEMA_VERSION
        );
        Ok(())
    }
}
