//src/types.rs

/// One line of classifier output:
/// ```text
/// readID  seqID  taxID  score  2ndBestScore  hitLength  queryLength  numMatches
/// ```
/// Only the first three columns take part in scoring; the rest are kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRecord {
    pub read_name: String,
    pub seq_id: String,
    pub tax_id: String,
    pub score: String,
    pub extra: Vec<String>,
}

/// One line of ground truth: `<anything>\t<read_name>\t<tax_id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthRecord {
    pub read_name: String,
    pub tax_id: String,
}

/// Aggregate counts of one rank's scoring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankResult {
    /// Truth reads whose projection is among the predicted taxa
    pub classified: u64,
    /// Classified reads whose predicted set has exactly one member
    pub unique_classified: u64,
    /// Truth reads never predicted, or predicted to the wrong taxa
    pub unclassified: u64,
    /// Number of reads with at least one scorable prediction
    pub total_predicted_reads: u64,
    /// Predicted reads with exactly one candidate, ignoring the truth
    pub raw_unique_classified: u64,
}

impl RankResult {
    /// Number of scorable ground-truth cases at this rank.
    pub fn num_cases(&self) -> u64 {
        self.classified + self.unclassified
    }
}
