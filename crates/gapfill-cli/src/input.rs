//! Sequence input: inline text, values plus mask, or a JSON file.

use crate::error::{CliError, CliResult};
use gapfill_types::Hypothesis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Tokens accepted as an unknown position in inline series text.
const UNKNOWN_TOKENS: [&str; 3] = ["?", "_", "NA"];

/// A sequence with its unknown positions.
///
/// `null` entries are unknown whether or not they are listed in `unknown`.
/// Values given at listed positions are kept as the truth for checking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceInput {
    pub series: Vec<Option<f64>>,
    #[serde(default)]
    pub unknown: Vec<usize>,
}

impl SequenceInput {
    /// Parse inline text such as `1, 3, ?, 7, 9`.
    pub fn parse_series(text: &str) -> CliResult<Self> {
        let series = text
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(i, token)| {
                if UNKNOWN_TOKENS.iter().any(|u| u.eq_ignore_ascii_case(token)) {
                    Ok(None)
                } else {
                    token.parse::<f64>().map(Some).map_err(|_| {
                        CliError::InvalidInput(format!(
                            "entry {} ({:?}) is neither a number nor an unknown marker",
                            i, token
                        ))
                    })
                }
            })
            .collect::<CliResult<Vec<_>>>()?;
        Ok(Self {
            series,
            unknown: Vec::new(),
        })
    }

    /// Fully known values with positions to withhold.
    pub fn from_values(values: Vec<f64>, unknown: Vec<usize>) -> Self {
        Self {
            series: values.into_iter().map(Some).collect(),
            unknown,
        }
    }

    /// Read a JSON file of the form `{"series": [...], "unknown": [...]}`.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Build the root hypothesis.
    pub fn into_root(self) -> CliResult<Hypothesis> {
        let mut unknown: BTreeSet<usize> = self.unknown.into_iter().collect();
        let values = self
            .series
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.unwrap_or_else(|| {
                    unknown.insert(i);
                    f64::NAN
                })
            })
            .collect();
        Ok(Hypothesis::root(values, unknown)?)
    }
}
