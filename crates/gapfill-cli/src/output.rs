//! Output formatting utilities

use colored::*;
use gapfill_engine::{LayerRules, LayerStats, ReconstructionStatus, SearchOutcome, SearchReport, Solution};
use gapfill_types::Cell;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

// ── Table Rows ──────────────────────────────────────────────────────────

/// One resolved candidate, as a table row
#[derive(Debug, Tabled)]
pub struct SolutionRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Lineage")]
    pub lineage: String,
    #[tabled(rename = "Rules")]
    pub rules: String,
    #[tabled(rename = "Series")]
    pub series: String,
    #[tabled(rename = "Reconstruction")]
    pub reconstruction: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Truth")]
    pub truth: String,
}

impl SolutionRow {
    fn new(index: usize, solution: &Solution) -> Self {
        let lineage: Vec<String> = solution.lineage.iter().map(|d| d.to_string()).collect();
        let rules: Vec<String> = solution.rule_chain.iter().map(layer_rules).collect();
        let truth = match solution.matches_truth {
            Some(true) => "match".to_string(),
            Some(false) => "differs".to_string(),
            None => "-".to_string(),
        };
        Self {
            index,
            lineage: lineage.join(" > "),
            rules: rules.join("\n"),
            series: join_cells(&solution.series),
            reconstruction: join_cells(&solution.reconstruction),
            status: status_label(solution.reconstruction_status).to_string(),
            truth,
        }
    }
}

/// Per-layer counters, as a table row
#[derive(Debug, Tabled)]
pub struct LayerRow {
    #[tabled(rename = "Depth")]
    pub depth: usize,
    #[tabled(rename = "Input")]
    pub input: usize,
    #[tabled(rename = "Normalized")]
    pub normalized: usize,
    #[tabled(rename = "Shaped")]
    pub shaped: usize,
    #[tabled(rename = "Blocked")]
    pub blocked: usize,
    #[tabled(rename = "Resolved")]
    pub resolved: usize,
    #[tabled(rename = "Capped")]
    pub truncated: bool,
}

impl From<&LayerStats> for LayerRow {
    fn from(stats: &LayerStats) -> Self {
        Self {
            depth: stats.depth,
            input: stats.input,
            normalized: stats.normalized,
            shaped: stats.shaped,
            blocked: stats.blocked,
            resolved: stats.resolved,
            truncated: stats.truncated,
        }
    }
}

/// `dif: (sum, 0, 1, 2)`, or `dif: -` for a layer that applied no rule.
fn layer_rules(layer: &LayerRules) -> String {
    if layer.rules.is_empty() {
        return format!("{}: -", layer.origin);
    }
    let rules: Vec<String> = layer.rules.iter().map(|r| r.to_string()).collect();
    format!("{}: {}", layer.origin, rules.join(", "))
}

fn status_label(status: ReconstructionStatus) -> &'static str {
    match status {
        ReconstructionStatus::Complete => "complete",
        ReconstructionStatus::Partial => "partial",
        ReconstructionStatus::Inconsistent => "inconsistent",
    }
}

fn join_cells(cells: &[Cell]) -> String {
    let parts: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
    parts.join(", ")
}

// ── Printing ────────────────────────────────────────────────────────────

/// Print a single item in the specified format
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
        }
    }
    Ok(())
}

/// Print a search report in the specified format
///
/// Machine formats carry the whole report; the table view shows layer
/// counters, then the solutions.
pub fn print_report(report: &SearchReport, format: OutputFormat) -> CliResult<()> {
    if format != OutputFormat::Table {
        return print_single(report, format);
    }

    for issue in &report.issues {
        print_warning(issue);
    }

    let layers: Vec<LayerRow> = report.layers.iter().map(LayerRow::from).collect();
    println!("{}", Table::new(layers));

    match &report.outcome {
        SearchOutcome::Solved { depth, solutions } => {
            print_success(&format!(
                "{} solution(s) at depth {} ({} complete, {} properties)",
                solutions.len(),
                depth,
                report.complete_solutions().count(),
                report.property_source
            ));
            let rows: Vec<SolutionRow> = solutions
                .iter()
                .enumerate()
                .map(|(i, s)| SolutionRow::new(i + 1, s))
                .collect();
            println!("{}", Table::new(rows));
        }
        SearchOutcome::NoSolution { layers_searched } => {
            print_info(&format!(
                "No solution within {} layer(s)",
                layers_searched
            ));
        }
    }
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}
