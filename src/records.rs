// src/records.rs

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::{EvalError, Result, Stream};
use crate::types::{ClassificationRecord, GroundTruthRecord};

/// Opens `path` for buffered reading, transparently decompressing `.gz` files.
pub fn open_input<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead + Send> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Lazy reader over classifier output.
///
/// The first line is a header and is discarded. Every other line needs at
/// least `readID`, `seqID` and `taxID`; fewer is a fatal error.
pub struct ClassificationReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> ClassificationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl ClassificationReader<Box<dyn BufRead + Send>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(open_input(path)?))
    }
}

impl<R: BufRead> Iterator for ClassificationReader<R> {
    type Item = Result<ClassificationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if self.line_no == 1 {
                continue;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Some(parse_classification(line, self.line_no));
        }
    }
}

fn parse_classification(line: &str, line_no: usize) -> Result<ClassificationRecord> {
    let mut fields = line.split('\t').map(str::to_string);
    let (Some(read_name), Some(seq_id), Some(tax_id)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(EvalError::MalformedRecord {
            stream: Stream::Classification,
            line: line_no,
            reason: "expected at least readID, seqID and taxID".to_string(),
        });
    };
    let score = fields.next().unwrap_or_default();

    Ok(ClassificationRecord {
        read_name,
        seq_id,
        tax_id,
        score,
        extra: fields.collect(),
    })
}

/// Lazy reader over a ground-truth file.
///
/// Lines starting with `@` are headers. A line without exactly 3 fields is
/// logged and skipped; only IO failures surface as errors.
pub struct TruthReader<R> {
    lines: Lines<R>,
    line_no: usize,
    skipped: usize,
}

impl<R: BufRead> TruthReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl TruthReader<Box<dyn BufRead + Send>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(open_input(path)?))
    }
}

impl<R: BufRead> Iterator for TruthReader<R> {
    type Item = Result<GroundTruthRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.starts_with('@') {
                continue;
            }
            let line = line.trim();
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 {
                log::warn!(
                    "{} line {}: {} missing",
                    Stream::Truth,
                    self.line_no,
                    line
                );
                self.skipped += 1;
                continue;
            }

            return Some(Ok(GroundTruthRecord {
                read_name: fields[1].to_string(),
                tax_id: fields[2].to_string(),
            }));
        }
    }
}
