//! Sequence solving command

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args};
use gapfill_engine::{PropertyMode, ReferenceLists, SearchConfig, SearchDriver, SearchReport};
use tracing::debug;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::input::SequenceInput;
use crate::output::{print_report, OutputFormat};

/// Arguments for `gapfill solve`
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["series", "values", "input"])))]
pub struct SolveArgs {
    /// Sequence with unknowns written as `?`, `_` or `NA` (e.g. "1,3,?,7,9")
    #[arg(short, long, allow_hyphen_values = true)]
    pub series: Option<String>,

    /// Fully known sequence; use with --unknown to withhold positions
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub values: Option<Vec<f64>>,

    /// Zero-based positions to withhold from --values
    #[arg(short, long, value_delimiter = ',', requires = "values")]
    pub unknown: Vec<usize>,

    /// JSON file with `series` (null for unknown) and optional `unknown`
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Reference lists file (JSON); switches to reference property mode
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Shape tests to run, in order (const, sum, fac, fib)
    #[arg(long, value_delimiter = ',')]
    pub shape_tests: Option<Vec<String>>,

    /// Block tests to run, in order (const, sum, fac)
    #[arg(long, value_delimiter = ',')]
    pub block_tests: Option<Vec<String>>,

    /// Element properties to test, in order (prime, square, cube)
    #[arg(long, value_delimiter = ',')]
    pub element_tests: Option<Vec<String>>,

    /// Upper bound on candidates kept per layer
    #[arg(long)]
    pub max_candidates: Option<usize>,
}

impl SolveArgs {
    fn sequence(&self) -> CliResult<SequenceInput> {
        if let Some(text) = &self.series {
            SequenceInput::parse_series(text)
        } else if let Some(values) = &self.values {
            Ok(SequenceInput::from_values(values.clone(), self.unknown.clone()))
        } else if let Some(path) = &self.input {
            SequenceInput::from_file(path)
        } else {
            Ok(SequenceInput::default())
        }
    }

    /// Layer command-line overrides over the file configuration.
    fn search_config(&self, base: &SearchConfig) -> SearchConfig {
        let mut config = base.clone();
        if let Some(tests) = &self.shape_tests {
            config.shape_tests = tests.clone();
        }
        if let Some(tests) = &self.block_tests {
            config.block_tests = tests.clone();
        }
        if let Some(tests) = &self.element_tests {
            config.element_tests = tests.clone();
        }
        if self.max_candidates.is_some() {
            config.max_candidates = self.max_candidates;
        }
        if self.reference.is_some() {
            config.property_mode = PropertyMode::Reference;
        }
        config
    }
}

/// Run a search and print its report
pub fn execute(args: SolveArgs, config: &CliConfig, format: OutputFormat) -> CliResult<SearchReport> {
    let search = args.search_config(&config.search);
    let reference = args.reference.as_ref().or(config.reference.as_ref());
    let lists = match (search.property_mode, reference) {
        (PropertyMode::Reference, Some(path)) => Some(load_reference(path)?),
        _ => None,
    };

    let driver = SearchDriver::from_config(search, lists)?;
    let root = args.sequence()?.into_root()?;
    debug!(len = root.len(), unknown = root.unknown_count(), "parsed input");

    let report = driver.search(root);
    print_report(&report, format)?;
    Ok(report)
}

fn load_reference(path: &Path) -> CliResult<ReferenceLists> {
    let contents = std::fs::read_to_string(path)?;
    Ok(ReferenceLists::from_json(&contents)?)
}
