//! Failures and warnings of the design searches.
//!
//! Hard failures abort the pipeline and carry the thresholds and the
//! last value that was computed. Warnings never change control flow;
//! they are collected and reported alongside the design.
//!

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use sp_structure::SequenceError;

use crate::EnergyWindow;

fn last(value: &Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3} kcal/mol"),
        None => "none computed".to_string(),
    }
}

fn hint(too_stable: &bool) -> &'static str {
    if *too_stable {
        "too negative, try a shorter target sequence"
    } else {
        "too positive, try a longer target sequence"
    }
}

/// Malformed or out-of-range configuration. Raised before any search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing field {index} ({name})")]
    MissingField { index: usize, name: &'static str },

    #[error("field {name}: cannot read number from '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("field {name}: {source}")]
    InvalidSequence {
        name: &'static str,
        #[source]
        source: SequenceError,
    },

    #[error("field {name}: {reason}")]
    OutOfRange { name: &'static str, reason: String },
}

/// The neck search of a hairpin ran out of neck lengths.
///
/// Recoverable inside the fuel search (the random draw is abandoned),
/// fatal for the probe.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("no neck of length {min_neck}..={max_neck} folds within {window} (last ΔG: {})", last(.last_dg))]
pub struct HairpinSearchExhausted {
    pub min_neck: usize,
    pub max_neck: usize,
    pub window: EnergyWindow,
    pub last_dg: Option<f64>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed strand: {0}")]
    Sequence(#[from] SequenceError),

    #[error("target-placeholder corrected ΔG {corrected:.3} kcal/mol is outside {window}: {}", hint(.too_stable))]
    TargetPlaceholderOutOfWindow {
        corrected: f64,
        window: EnergyWindow,
        too_stable: bool,
    },

    #[error("no toehold 1 of length {min_length}..={max_length} gives ΔΔG > {threshold} kcal/mol (last ΔΔG: {})", last(.last_ddg))]
    InfeasibleTarget {
        min_length: usize,
        max_length: usize,
        threshold: f64,
        last_ddg: Option<f64>,
    },

    #[error("no toehold 2 found after {attempts} attempts with ΔΔG in {window} (last ΔΔG: {})", last(.last_ddg))]
    FuelSearchExhausted {
        attempts: usize,
        window: EnergyWindow,
        last_ddg: Option<f64>,
    },

    #[error("the probe hairpin does not work, the target needs to change: {0}")]
    InfeasibleProbe(HairpinSearchExhausted),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HairpinKind {
    Fuel,
    Probe,
}

impl fmt::Display for HairpinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HairpinKind::Fuel => write!(f, "fuel"),
            HairpinKind::Probe => write!(f, "probe"),
        }
    }
}

/// Non-fatal findings attached to a design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DesignWarning {
    /// The strand without its hairpin closure already folds.
    SecondaryStructure {
        strand: HairpinKind,
        corrected_dg: f64,
        threshold: f64,
    },
    /// The temperature sweep hit its ceiling before the hairpin opened.
    UnfoldNotFound {
        strand: HairpinKind,
        ceiling: f64,
    },
}

impl fmt::Display for DesignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignWarning::SecondaryStructure { strand, corrected_dg, threshold } => write!(f,
                "unwanted secondary structure in {strand}: {corrected_dg:.3} <= {threshold} kcal/mol"),
            DesignWarning::UnfoldNotFound { strand, ceiling } => write!(f,
                "the {strand} hairpin does not reliably unfold below {ceiling} C, try a larger hairpin loop"),
        }
    }
}
