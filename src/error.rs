// src/error.rs

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Which input stream a malformed record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Taxonomy,
    Classification,
    Truth,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stream::Taxonomy => "taxonomy",
            Stream::Classification => "classification",
            Stream::Truth => "ground truth",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("duplicate taxon id in taxonomy: {tax_id}")]
    DuplicateTaxon { tax_id: String },

    #[error("taxonomy contains a parent cycle through taxon {tax_id}")]
    CyclicTaxonomy { tax_id: String },

    /// `line` is 1-based.
    #[error("malformed {stream} record on line {line}: {reason}")]
    MalformedRecord {
        stream: Stream,
        line: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{program} exited with {status}")]
    ExternalTool { program: String, status: ExitStatus },

    #[error("missing index file: {0}")]
    MissingIndex(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
