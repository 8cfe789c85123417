//! Configuration display

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{print_single, OutputFormat};

/// Print the effective configuration
///
/// The table format prints TOML, ready to be saved as `config.toml`.
pub fn execute(config: &CliConfig, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Yaml => print_single(config, format),
    }
}
