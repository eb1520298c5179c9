use ahash::{AHashMap, AHashSet};

use super::{ClassificationRecord, Result, TaxonomyIndex};

/// `read_name -> {rank-projected taxon, ...}` for a single rank.
///
/// A read reported on several output lines keeps every distinct projection.
#[derive(Debug, Default)]
pub struct PredictionMap {
    reads: AHashMap<String, AHashSet<String>>,
}

impl PredictionMap {
    /// Folds classifier records into the map, projecting each tax id to `rank`.
    /// Records without a projection contribute nothing.
    pub fn build<I>(taxonomy: &TaxonomyIndex, records: I, rank: &str) -> Result<Self>
    where
        I: IntoIterator<Item = Result<ClassificationRecord>>,
    {
        let mut reads: AHashMap<String, AHashSet<String>> = AHashMap::new();
        let mut excluded = 0u64;

        for record in records {
            let record = record?;
            let Some(rank_tax_id) = taxonomy.project_to_rank(&record.tax_id, rank) else {
                excluded += 1;
                continue;
            };
            let rank_tax_id = rank_tax_id.to_string();
            reads.entry(record.read_name).or_default().insert(rank_tax_id);
        }

        log::debug!(
            "{rank}: {} predicted reads, {excluded} records without projection",
            reads.len()
        );

        Ok(Self { reads })
    }

    pub fn predictions(&self, read_name: &str) -> Option<&AHashSet<String>> {
        self.reads.get(read_name)
    }

    /// Reads with at least one prediction.
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Reads predicted to exactly one taxon, not counting `higher_ranked` reads.
    pub fn count_unique(&self, higher_ranked: &AHashSet<String>) -> u64 {
        self.reads
            .iter()
            .filter(|(read_name, maps)| maps.len() == 1 && !higher_ranked.contains(*read_name))
            .count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxdb::TaxonNode;

    fn taxonomy() -> TaxonomyIndex {
        let entries = [
            ("1", "1", "root"),
            ("10", "1", "genus"),
            ("100", "10", "species"),
            ("101", "10", "species"),
            ("1000", "100", "strain"),
            ("1001", "100", "strain"),
        ];
        TaxonomyIndex::build(entries.iter().map(|&(id, parent, rank)| {
            (
                id.to_string(),
                TaxonNode { parent_id: parent.to_string(), rank: rank.to_string() },
            )
        }))
        .unwrap()
    }

    fn rec(read: &str, tax_id: &str) -> Result<ClassificationRecord> {
        Ok(ClassificationRecord {
            read_name: read.to_string(),
            seq_id: "seq".to_string(),
            tax_id: tax_id.to_string(),
            score: "0".to_string(),
            extra: Vec::new(),
        })
    }

    #[test]
    fn test_sibling_strains_collapse_at_species() {
        let map = PredictionMap::build(
            &taxonomy(),
            vec![rec("r1", "1000"), rec("r1", "1001")],
            "species",
        )
        .unwrap();
        let maps = map.predictions("r1").unwrap();
        assert_eq!(maps.len(), 1);
        assert!(maps.contains("100"));
        assert_eq!(map.count_unique(&AHashSet::new()), 1);
    }

    #[test]
    fn test_sibling_strains_stay_distinct_at_strain() {
        let map = PredictionMap::build(
            &taxonomy(),
            vec![rec("r1", "1000"), rec("r1", "1001")],
            "strain",
        )
        .unwrap();
        assert_eq!(map.predictions("r1").unwrap().len(), 2);
        assert_eq!(map.count_unique(&AHashSet::new()), 0);
    }

    #[test]
    fn test_unprojectable_records_add_nothing() {
        let map = PredictionMap::build(
            &taxonomy(),
            vec![rec("r1", "999999"), rec("r2", "10"), rec("r3", "100")],
            "species",
        )
        .unwrap();
        assert!(map.predictions("r1").is_none());
        assert!(map.predictions("r2").is_none());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_higher_ranked_reads_are_not_unique() {
        let map = PredictionMap::build(
            &taxonomy(),
            vec![rec("r1", "1000"), rec("r2", "101")],
            "species",
        )
        .unwrap();
        let higher_ranked: AHashSet<String> = ["r2".to_string()].into_iter().collect();
        assert_eq!(map.count_unique(&AHashSet::new()), 2);
        assert_eq!(map.count_unique(&higher_ranked), 1);
    }

    #[test]
    fn test_reader_error_propagates() {
        let records = vec![
            rec("r1", "1000"),
            Err(std::io::Error::other("boom").into()),
        ];
        assert!(PredictionMap::build(&taxonomy(), records, "species").is_err());
    }
}
