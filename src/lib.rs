// src/lib.rs
pub mod error;
pub mod external;
pub mod metrics;
pub mod records;
pub mod scoring;
pub mod taxdb;
pub mod types;

use std::path::Path;

use crate::error::Result;
use crate::metrics::{write_rank_report, RankMetrics};
use crate::scoring::score_ranks;
use crate::taxdb::{TaxonomyIndex, STRAIN_RANK};
use crate::types::RankResult;

/// Ranks scored when the caller does not pick any.
pub const DEFAULT_RANKS: [&str; 7] = [
    "strain", "species", "genus", "family", "order", "class", "phylum",
];

/// What to score.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Ranks in report order
    pub ranks: Vec<String>,
    /// Drop the strain rank, e.g. for compressed indexes that merged strains
    pub skip_strain: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            ranks: DEFAULT_RANKS.iter().map(|r| r.to_string()).collect(),
            skip_strain: false,
        }
    }
}

impl EvalConfig {
    /// Parses a comma-separated rank list such as `"species,genus"`.
    pub fn with_rank_list(mut self, rank_list: &str) -> Self {
        self.ranks = rank_list
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Ranks that will actually be scored: strain removed if requested,
    /// repeats dropped, first occurrence wins.
    pub fn effective_ranks(&self) -> Vec<String> {
        let mut ranks: Vec<String> = Vec::with_capacity(self.ranks.len());
        for rank in &self.ranks {
            if self.skip_strain && rank == STRAIN_RANK {
                continue;
            }
            if !ranks.contains(rank) {
                ranks.push(rank.clone());
            }
        }
        ranks
    }
}

/// Outcome of scoring one rank.
#[derive(Debug, Clone)]
pub struct RankEvaluation {
    pub rank: String,
    pub result: RankResult,
    pub metrics: RankMetrics,
}

/// Per-rank counts and metrics, in the requested rank order.
pub struct EvaluationResults {
    pub ranks: Vec<RankEvaluation>,
}

impl EvaluationResults {
    pub fn get(&self, rank: &str) -> Option<&RankEvaluation> {
        self.ranks.iter().find(|r| r.rank == rank)
    }

    /// Ranks where some sensitivity or precision could not be computed.
    pub fn degenerate_ranks(&self) -> Vec<&str> {
        self.ranks
            .iter()
            .filter(|r| r.metrics.is_degenerate())
            .map(|r| r.rank.as_str())
            .collect()
    }

    /// Generate the report text on demand
    pub fn get_report(&self) -> String {
        let mut output = String::new();
        for eval in &self.ranks {
            write_rank_report(&mut output, &eval.rank, &eval.metrics);
        }
        output
    }
}

/// Scores a classifier output file against a truth file over a prebuilt
/// taxonomy, once per rank in `config`.
pub fn evaluate<P: AsRef<Path> + Sync, Q: AsRef<Path> + Sync>(
    taxonomy: &TaxonomyIndex,
    classification_path: P,
    truth_path: Q,
    config: &EvalConfig,
) -> Result<EvaluationResults> {
    let ranks = config.effective_ranks();
    let scored = score_ranks(taxonomy, classification_path, truth_path, &ranks)?;

    let ranks = scored
        .into_iter()
        .map(|(rank, result)| {
            let metrics = RankMetrics::from(&result);
            if metrics.is_degenerate() {
                log::warn!("{rank}: some metrics are undefined (zero denominator)");
            }
            RankEvaluation { rank, result, metrics }
        })
        .collect();

    Ok(EvaluationResults { ranks })
}

/// Same as [`evaluate`], loading the taxonomy tree from a file first.
pub fn evaluate_files<T, P, Q>(
    taxonomy_path: T,
    classification_path: P,
    truth_path: Q,
    config: &EvalConfig,
) -> Result<EvaluationResults>
where
    T: AsRef<Path>,
    P: AsRef<Path> + Sync,
    Q: AsRef<Path> + Sync,
{
    let taxonomy = TaxonomyIndex::from_file(taxonomy_path)?;
    evaluate(&taxonomy, classification_path, truth_path, config)
}
