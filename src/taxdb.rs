//src/taxdb.rs

use ahash::{AHashMap, AHashSet};
use std::io::BufRead;
use std::path::Path;

use crate::error::{EvalError, Result, Stream};
use crate::records::open_input;

/// Rank at which no climbing happens: the taxon itself is the answer,
/// unless it is an internal node.
pub const STRAIN_RANK: &str = "strain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonNode {
    /// Immediate parent; equal to the node's own id at a root.
    pub parent_id: String,
    pub rank: String,
}

/// Immutable lookup over a taxonomy forest.
///
/// Built once and shared by reference across every rank that gets scored.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyIndex {
    nodes: AHashMap<String, TaxonNode>,
    /// Every taxon that is the parent of some other taxon
    ancestors: AHashSet<String>,
}

impl TaxonomyIndex {
    /// Builds the index from `(tax_id, node)` pairs.
    ///
    /// Fails on a repeated tax id or on a parent cycle that does not end in a
    /// self-parented root.
    pub fn build<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, TaxonNode)>,
    {
        let mut nodes: AHashMap<String, TaxonNode> = AHashMap::new();
        for (tax_id, node) in entries {
            if nodes.contains_key(&tax_id) {
                return Err(EvalError::DuplicateTaxon { tax_id });
            }
            nodes.insert(tax_id, node);
        }

        check_acyclic(&nodes)?;
        let ancestors = collect_ancestors(&nodes);

        log::info!(
            "Loaded taxonomy with {} taxa ({} internal)",
            nodes.len(),
            ancestors.len()
        );

        Ok(Self { nodes, ancestors })
    }

    /// Parses a taxonomy tree stream in the format:
    /// ```text
    /// <taxid>\t<?>\t<parent_taxid>\t<?>\t<rank>
    /// ```
    /// Blank lines are ignored; any other line without exactly 5 fields is fatal.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = Vec::new();

        for (i, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 5 {
                return Err(EvalError::MalformedRecord {
                    stream: Stream::Taxonomy,
                    line: i + 1,
                    reason: format!("expected 5 fields, found {}", fields.len()),
                });
            }

            entries.push((
                fields[0].to_string(),
                TaxonNode {
                    parent_id: fields[2].to_string(),
                    rank: fields[4].to_string(),
                },
            ));
        }

        Self::build(entries)
    }

    /// Reads a taxonomy tree file, gzipped or plain.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(open_input(path)?)
    }

    pub fn get(&self, tax_id: &str) -> Option<&TaxonNode> {
        self.nodes.get(tax_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ancestors(&self) -> &AHashSet<String> {
        &self.ancestors
    }

    pub fn is_ancestor(&self, tax_id: &str) -> bool {
        self.ancestors.contains(tax_id)
    }

    /// Projects `tax_id` onto its ancestor (or itself) at `rank`.
    ///
    /// Returns `None` when the taxon cannot be scored at this rank: it is
    /// unknown, no node on its path to the root carries `rank`, or, for
    /// [`STRAIN_RANK`], it is an internal node.
    pub fn project_to_rank<'a>(&'a self, tax_id: &'a str, rank: &str) -> Option<&'a str> {
        if rank == STRAIN_RANK {
            return (!self.is_ancestor(tax_id)).then_some(tax_id);
        }

        // Terminates: build() rejects cycles.
        let mut cur = tax_id;
        loop {
            let node = self.nodes.get(cur)?;
            if node.rank == rank {
                return Some(cur);
            }
            if node.parent_id == cur {
                return None;
            }
            cur = node.parent_id.as_str();
        }
    }
}

/// Walks every parent chain once; a chain may end at a self-parented root or at
/// a parent id missing from the taxonomy, anything else is a cycle.
fn check_acyclic(nodes: &AHashMap<String, TaxonNode>) -> Result<()> {
    let mut terminating: AHashSet<&str> = AHashSet::with_capacity(nodes.len());
    let mut path: Vec<&str> = Vec::new();
    let mut on_path: AHashSet<&str> = AHashSet::new();

    for start in nodes.keys() {
        path.clear();
        on_path.clear();

        let mut cur = start.as_str();
        loop {
            if terminating.contains(cur) {
                break;
            }
            if !on_path.insert(cur) {
                return Err(EvalError::CyclicTaxonomy {
                    tax_id: cur.to_string(),
                });
            }
            path.push(cur);

            match nodes.get(cur) {
                Some(node) if node.parent_id != cur => cur = node.parent_id.as_str(),
                _ => break,
            }
        }

        terminating.extend(path.iter().copied());
    }

    Ok(())
}

/// For each unmarked taxon, climb and mark every parent until reaching one
/// already marked or a self-parented root.
fn collect_ancestors(nodes: &AHashMap<String, TaxonNode>) -> AHashSet<String> {
    let mut ancestors: AHashSet<String> = AHashSet::new();

    for tax_id in nodes.keys() {
        if ancestors.contains(tax_id) {
            continue;
        }
        let mut cur = tax_id.as_str();
        while let Some(node) = nodes.get(cur) {
            let parent = node.parent_id.as_str();
            if ancestors.contains(parent) || parent == cur {
                break;
            }
            ancestors.insert(parent.to_string());
            cur = parent;
        }
    }

    ancestors
}
