// src/external.rs

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{EvalError, Result};
use crate::taxdb::TaxonomyIndex;

/// Number of `<base>.N.cf` files making up a classifier index.
pub const INDEX_FILE_COUNT: usize = 3;

/// Paths of the index files behind `index_base`.
pub fn index_files(index_base: &str) -> Vec<String> {
    (1..=INDEX_FILE_COUNT)
        .map(|i| format!("{index_base}.{i}.cf"))
        .collect()
}

/// Fails with [`EvalError::MissingIndex`] on the first index file not on disk.
pub fn check_index_files(index_base: &str) -> Result<()> {
    for fname in index_files(index_base) {
        if !Path::new(&fname).exists() {
            return Err(EvalError::MissingIndex(fname));
        }
    }
    Ok(())
}

/// Runs `<inspect_bin> --taxonomy-tree <index_base>` and builds the taxonomy
/// straight from its stdout. stderr is discarded.
pub fn inspect_taxonomy(inspect_bin: &Path, index_base: &str) -> Result<TaxonomyIndex> {
    let mut child = Command::new(inspect_bin)
        .arg("--taxonomy-tree")
        .arg(index_base)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let taxonomy = match child.stdout.take() {
        Some(stdout) => TaxonomyIndex::from_reader(BufReader::new(stdout)),
        None => Ok(TaxonomyIndex::default()),
    };

    // stdout is closed by now, a child still writing gets SIGPIPE instead of blocking.
    let status = child.wait()?;
    let taxonomy = taxonomy?;
    if !status.success() {
        return Err(EvalError::ExternalTool {
            program: inspect_bin.display().to_string(),
            status,
        });
    }
    Ok(taxonomy)
}

/// Builds the classifier invocation:
/// `<classifier_bin> -f -p <threads> <index_base> <reads>`.
pub fn classifier_command(
    classifier_bin: &Path,
    index_base: &str,
    reads: &Path,
    threads: usize,
) -> Command {
    let mut cmd = Command::new(classifier_bin);
    cmd.arg("-f")
        .arg("-p")
        .arg(threads.to_string())
        .arg(index_base)
        .arg(reads);
    cmd
}

/// Runs the classifier on a FASTA file, writing its output to `out_path`.
pub fn run_classifier(
    classifier_bin: &Path,
    index_base: &str,
    reads: &Path,
    threads: usize,
    out_path: &Path,
) -> Result<()> {
    let out = File::create(out_path)?;
    let mut cmd = classifier_command(classifier_bin, index_base, reads, threads);
    log::info!("Running {:?}", cmd);

    let output = cmd.stdout(Stdio::from(out)).stderr(Stdio::piped()).output()?;
    if !output.status.success() {
        log::error!("{}", String::from_utf8_lossy(&output.stderr).trim());
        return Err(EvalError::ExternalTool {
            program: classifier_bin.display().to_string(),
            status: output.status,
        });
    }
    Ok(())
}
