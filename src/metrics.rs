// src/metrics.rs

use std::fmt;
use std::fmt::Write as _;

use crate::types::RankResult;

/// A count over a total. The fraction is undefined when the total is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub numerator: u64,
    pub denominator: u64,
}

impl Ratio {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self { numerator, denominator }
    }

    /// `None` on division by zero.
    pub fn fraction(&self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }

    pub fn is_defined(&self) -> bool {
        self.denominator != 0
    }
}

impl fmt::Display for Ratio {
    /// `1,234 / 2,000 (61.70%)`, or `(undefined)` for a zero total.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} ",
            with_thousands(self.numerator),
            with_thousands(self.denominator)
        )?;
        match self.fraction() {
            Some(frac) => write!(f, "({:.2}%)", frac * 100.0),
            None => f.write_str("(undefined)"),
        }
    }
}

/// Sensitivity and precision derived from one rank's counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankMetrics {
    pub sensitivity: Ratio,
    pub precision: Ratio,
    pub unique_sensitivity: Ratio,
    pub unique_precision: Ratio,
}

impl RankMetrics {
    pub fn from_result(result: &RankResult) -> Self {
        let num_cases = result.num_cases();
        Self {
            sensitivity: Ratio::new(result.classified, num_cases),
            precision: Ratio::new(result.classified, result.total_predicted_reads),
            unique_sensitivity: Ratio::new(result.unique_classified, num_cases),
            unique_precision: Ratio::new(result.unique_classified, result.raw_unique_classified),
        }
    }

    /// True when any of the four ratios has a zero denominator.
    pub fn is_degenerate(&self) -> bool {
        ![
            self.sensitivity,
            self.precision,
            self.unique_sensitivity,
            self.unique_precision,
        ]
        .iter()
        .all(Ratio::is_defined)
    }
}

impl From<&RankResult> for RankMetrics {
    fn from(result: &RankResult) -> Self {
        Self::from_result(result)
    }
}

/// Appends one rank's block to `out`:
/// ```text
///         species
///             sensitivity: 9,000 / 10,000 (90.00%)
///             precision  : 9,000 / 9,500 (94.74%)
///
///             for uniquely classified
///                     sensitivity: ...
///                     precision  : ...
/// ```
pub fn write_rank_report(out: &mut String, rank: &str, metrics: &RankMetrics) {
    let _ = writeln!(out, "\t\t{rank}");
    let _ = writeln!(out, "\t\t\tsensitivity: {}", metrics.sensitivity);
    let _ = writeln!(out, "\t\t\tprecision  : {}", metrics.precision);
    let _ = writeln!(out, "\n\t\t\tfor uniquely classified");
    let _ = writeln!(out, "\t\t\t\t\tsensitivity: {}", metrics.unique_sensitivity);
    let _ = writeln!(out, "\t\t\t\t\tprecision  : {}", metrics.unique_precision);
}

/// Formats an integer with `,` between groups of three digits.
pub fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
