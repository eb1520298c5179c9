use rayon::prelude::*;
use std::path::Path;

use super::{score_rank, RankResult, Result, TaxonomyIndex};
use crate::records::{ClassificationReader, TruthReader};

/// Scores every rank in `ranks` against the same pair of files.
///
/// Each rank re-reads both files, so ranks run in parallel over the shared,
/// read-only taxonomy. Results come back in the order of `ranks`.
pub fn score_ranks<P, Q>(
    taxonomy: &TaxonomyIndex,
    classification_path: P,
    truth_path: Q,
    ranks: &[String],
) -> Result<Vec<(String, RankResult)>>
where
    P: AsRef<Path> + Sync,
    Q: AsRef<Path> + Sync,
{
    ranks
        .par_iter()
        .map(|rank| -> Result<(String, RankResult)> {
            let result = score_rank(
                taxonomy,
                ClassificationReader::from_path(&classification_path)?,
                TruthReader::from_path(&truth_path)?,
                rank,
            )?;
            Ok((rank.clone(), result))
        })
        .collect()
}
