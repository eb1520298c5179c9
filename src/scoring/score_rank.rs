use ahash::AHashSet;

use super::{ClassificationRecord, GroundTruthRecord, PredictionMap, RankResult, Result, TaxonomyIndex};

/// Scores one rank: builds the prediction map from `classifications`, then
/// walks `truth` and tallies hits and misses.
///
/// Ranks are scored independently; see [`score_rank_excluding`] to carry
/// reads already settled at another rank.
pub fn score_rank<C, T>(
    taxonomy: &TaxonomyIndex,
    classifications: C,
    truth: T,
    rank: &str,
) -> Result<RankResult>
where
    C: IntoIterator<Item = Result<ClassificationRecord>>,
    T: IntoIterator<Item = Result<GroundTruthRecord>>,
{
    score_rank_excluding(taxonomy, classifications, truth, rank, &AHashSet::new())
}

/// Like [`score_rank`], but reads in `higher_ranked` never count as uniquely
/// classified, neither against the truth nor in the raw unique total.
pub fn score_rank_excluding<C, T>(
    taxonomy: &TaxonomyIndex,
    classifications: C,
    truth: T,
    rank: &str,
    higher_ranked: &AHashSet<String>,
) -> Result<RankResult>
where
    C: IntoIterator<Item = Result<ClassificationRecord>>,
    T: IntoIterator<Item = Result<GroundTruthRecord>>,
{
    let db_dic = PredictionMap::build(taxonomy, classifications, rank)?;

    let mut result = RankResult::default();
    for record in truth {
        let record = record?;
        let Some(rank_tax_id) = taxonomy.project_to_rank(&record.tax_id, rank) else {
            continue;
        };

        let Some(maps) = db_dic.predictions(&record.read_name) else {
            result.unclassified += 1;
            continue;
        };

        if maps.contains(rank_tax_id) {
            result.classified += 1;
            if maps.len() == 1 && !higher_ranked.contains(&record.read_name) {
                result.unique_classified += 1;
            }
        } else {
            result.unclassified += 1;
        }
    }

    result.total_predicted_reads = db_dic.len() as u64;
    result.raw_unique_classified = db_dic.count_unique(higher_ranked);

    log::info!(
        "{rank}: classified {} / {} truth reads, {} predicted reads",
        result.classified,
        result.num_cases(),
        result.total_predicted_reads
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ClassificationReader, TruthReader};
    use crate::taxdb::TaxonNode;
    use std::io::Cursor;

    const HEADER: &str = "readID\tseqID\ttaxID\tscore\t2ndBestScore\thitLength\tqueryLength\tnumMatches\n";

    /// root(1) -> genus(G) -> species(X) -> strain(X1)
    ///                     \-> species(Y)
    fn taxonomy() -> TaxonomyIndex {
        let entries = [
            ("1", "1", "root"),
            ("G", "1", "genus"),
            ("X", "G", "species"),
            ("Y", "G", "species"),
            ("X1", "X", "strain"),
        ];
        TaxonomyIndex::build(entries.iter().map(|&(id, parent, rank)| {
            (
                id.to_string(),
                TaxonNode { parent_id: parent.to_string(), rank: rank.to_string() },
            )
        }))
        .unwrap()
    }

    fn run(classified: &[(&str, &str)], truth: &[(&str, &str)], rank: &str) -> RankResult {
        let mut out = String::from(HEADER);
        for (read, tax) in classified {
            out.push_str(&format!("{read}\tseq\t{tax}\t100\t0\t50\t100\t1\n"));
        }
        let mut truth_text = String::from("@header\n");
        for (i, (read, tax)) in truth.iter().enumerate() {
            truth_text.push_str(&format!("{i}\t{read}\t{tax}\n"));
        }
        score_rank(
            &taxonomy(),
            ClassificationReader::new(Cursor::new(out)),
            TruthReader::new(Cursor::new(truth_text)),
            rank,
        )
        .unwrap()
    }

    #[test]
    fn test_exact_hit_is_classified_and_unique() {
        let r = run(&[("read1", "X")], &[("read1", "X")], "species");
        assert_eq!(r.classified, 1);
        assert_eq!(r.unique_classified, 1);
        assert_eq!(r.unclassified, 0);
        assert_eq!(r.total_predicted_reads, 1);
        assert_eq!(r.raw_unique_classified, 1);
    }

    #[test]
    fn test_wrong_species_is_unclassified() {
        let r = run(&[("read1", "X")], &[("read1", "Y")], "species");
        assert_eq!(r.classified, 0);
        assert_eq!(r.unclassified, 1);
    }

    #[test]
    fn test_missing_read_is_unclassified() {
        let r = run(&[("read1", "X")], &[("read1", "X"), ("read2", "Y")], "species");
        assert_eq!(r.classified, 1);
        assert_eq!(r.unclassified, 1);
        assert_eq!(r.num_cases(), 2);
    }

    #[test]
    fn test_strain_prediction_matches_at_species() {
        let r = run(&[("read1", "X1")], &[("read1", "X")], "species");
        assert_eq!(r.classified, 1);
        assert_eq!(r.unique_classified, 1);
    }

    #[test]
    fn test_multi_mapped_read_is_never_unique() {
        let r = run(&[("read1", "X"), ("read1", "Y")], &[("read1", "X")], "species");
        assert_eq!(r.classified, 1);
        assert_eq!(r.unique_classified, 0);
        assert_eq!(r.raw_unique_classified, 0);
        assert_eq!(r.total_predicted_reads, 1);
    }

    #[test]
    fn test_multi_mapped_read_collapses_at_genus() {
        let r = run(&[("read1", "X"), ("read1", "Y")], &[("read1", "X1")], "genus");
        assert_eq!(r.classified, 1);
        assert_eq!(r.unique_classified, 1);
        assert_eq!(r.raw_unique_classified, 1);
    }

    #[test]
    fn test_unprojectable_truth_is_not_a_case() {
        let r = run(&[("read1", "X")], &[("read1", "G"), ("read2", "unknown")], "species");
        assert_eq!(r.num_cases(), 0);
        assert_eq!(r.total_predicted_reads, 1);
    }

    #[test]
    fn test_strain_rank_excludes_internal_predictions() {
        // X is the parent of X1, so a prediction of X says nothing at strain level.
        let r = run(&[("read1", "X"), ("read2", "X1")], &[("read1", "X1"), ("read2", "X1")], "strain");
        assert_eq!(r.total_predicted_reads, 1);
        assert_eq!(r.classified, 1);
        assert_eq!(r.unclassified, 1);
    }

    #[test]
    fn test_higher_ranked_reads_lose_uniqueness() {
        let higher_ranked: AHashSet<String> = ["read1".to_string()].into_iter().collect();
        let classified = format!("{HEADER}read1\tseq\tX\t1\t0\t1\t1\t1\nread2\tseq\tY\t1\t0\t1\t1\t1\n");
        let truth = "0\tread1\tX\n1\tread2\tY\n";
        let r = score_rank_excluding(
            &taxonomy(),
            ClassificationReader::new(Cursor::new(classified)),
            TruthReader::new(Cursor::new(truth)),
            "species",
            &higher_ranked,
        )
        .unwrap();
        assert_eq!(r.classified, 2);
        assert_eq!(r.unique_classified, 1);
        assert_eq!(r.raw_unique_classified, 1);
    }
}
