//! Design parameters.
//!
//! `DesignParameters` is read once, validated, and then only ever
//! borrowed by the searches. It can be built from the positional
//! record of a parameter sheet (one value per row, in a
//! fixed order) or deserialized directly.
//!

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use sp_energy::Conditions;
use sp_structure::canonicalize;
use sp_structure::NucleicSeq;

use crate::ConfigError;

/// A closed free energy interval, `lower` being the more negative bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyWindow {
    pub lower: f64,
    pub upper: f64,
}

impl EnergyWindow {
    pub const fn new(lower: f64, upper: f64) -> Self {
        EnergyWindow { lower, upper }
    }

    /// `lower <= dg <= upper`
    pub fn contains(&self, dg: f64) -> bool {
        self.lower <= dg && dg <= self.upper
    }

    /// `lower < dg < upper`
    pub fn contains_strictly(&self, dg: f64) -> bool {
        self.lower < dg && dg < self.upper
    }

    fn is_ordered(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower <= self.upper
    }
}

impl fmt::Display for EnergyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] kcal/mol", self.lower, self.upper)
    }
}

/// Temperature sweep locating the point where a hairpin opens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnfoldSweep {
    /// First temperature, relative to the operating temperature (°C).
    pub start_offset: f64,
    /// Increment between evaluations (°C).
    pub step: f64,
    /// Distance of the confirming evaluation below a folded point (°C).
    pub back_off: f64,
    /// Accepted |ΔG| at the unfolding point (kcal/mol).
    pub tolerance: f64,
    /// The sweep gives up above this temperature (°C).
    pub ceiling: f64,
}

impl Default for UnfoldSweep {
    fn default() -> Self {
        UnfoldSweep {
            start_offset: 2.,
            step: 2.,
            back_off: 1.,
            tolerance: 1.,
            ceiling: 50.,
        }
    }
}

/// Smallest sweep increment (°C); finer steps are raised to it.
pub const MIN_SWEEP_STEP: f64 = 0.01;

impl UnfoldSweep {
    /// The temperatures visited, from `operating` plus the offset up to
    /// the ceiling. The count is fixed before the first evaluation.
    pub fn temperatures(&self, operating: f64) -> impl Iterator<Item = f64> {
        let start = operating + self.start_offset;
        let step = self.step.max(MIN_SWEEP_STEP);
        let span = ((self.ceiling - start) / step).floor();
        let count = if span >= 0. { span as usize + 1 } else { 0 };
        (0..count).map(move |n| start + n as f64 * step)
    }
}

/// Acceptance thresholds of the fuel and probe hairpins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairpinSettings {
    pub fuel_window: EnergyWindow,
    pub probe_window: EnergyWindow,
    /// Warn if the bare fuel folds at or below this ΔG.
    pub fuel_structure_warning: f64,
    /// Warn if the bare probe folds at or below this ΔG.
    pub probe_structure_warning: f64,
    pub sweep: UnfoldSweep,
}

impl Default for HairpinSettings {
    fn default() -> Self {
        HairpinSettings {
            fuel_window: EnergyWindow::new(-6., -2.),
            probe_window: EnergyWindow::new(-7., -5.),
            fuel_structure_warning: -4.,
            probe_structure_warning: -3.,
            sweep: UnfoldSweep::default(),
        }
    }
}

pub const DEFAULT_MAX_FUEL_ATTEMPTS: usize = 15;

fn default_max_fuel_attempts() -> usize {
    DEFAULT_MAX_FUEL_ATTEMPTS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignParameters {
    pub design_id: String,
    pub target: NucleicSeq,
    /// Monovalent salt concentration (M).
    pub salt: f64,
    /// Operating temperature (°C).
    pub temperature: f64,
    /// Accepted corrected ΔG of the target-placeholder duplex.
    pub target_placeholder_window: EnergyWindow,
    pub toehold1_min: usize,
    /// Required ΔG(placeholder 2, probe) − ΔG(target, placeholder 1).
    pub probe_ddg_threshold: f64,
    pub neck_min: usize,
    pub spacer: NucleicSeq,
    pub fuel_loop: NucleicSeq,
    /// Accepted ΔG(fuel, placeholder 3) − ΔG(target, placeholder 1).
    pub fuel_ddg_window: EnergyWindow,
    #[serde(default = "default_max_fuel_attempts")]
    pub max_fuel_attempts: usize,
    #[serde(default)]
    pub hairpins: HairpinSettings,
}

/// Row names of the positional record, in order.
pub const RECORD_FIELDS: [&str; 14] = [
    "design id",
    "target",
    "salt",
    "temperature",
    "target-placeholder dG max",
    "target-placeholder dG min",
    "toehold 1 min length",
    "placeholder-probe ddG",
    "neck min length",
    "spacer",
    "fuel loop",
    "fuel ddG max",
    "fuel ddG min",
    "max fuel attempts",
];

struct Record<'a> {
    values: &'a [String],
}

impl<'a> Record<'a> {
    fn get(&self, index: usize) -> Result<&'a str, ConfigError> {
        self.values
            .get(index)
            .map(|v| v.trim())
            .ok_or(ConfigError::MissingField { index, name: RECORD_FIELDS[index] })
    }

    fn number<T: std::str::FromStr>(&self, index: usize) -> Result<T, ConfigError> {
        let value = self.get(index)?;
        value.parse().map_err(|_| ConfigError::InvalidNumber {
            name: RECORD_FIELDS[index],
            value: value.to_string(),
        })
    }

    fn sequence(&self, index: usize) -> Result<NucleicSeq, ConfigError> {
        self.get(index)?
            .parse()
            .map_err(|source| ConfigError::InvalidSequence { name: RECORD_FIELDS[index], source })
    }
}

impl DesignParameters {
    /// Build parameters from the values of the positional record (see
    /// `RECORD_FIELDS`). The last field is optional. The result is
    /// validated.
    pub fn from_record(values: &[String]) -> Result<Self, ConfigError> {
        let r = Record { values };
        let target = canonicalize(r.get(1)?)
            .map_err(|source| ConfigError::InvalidSequence { name: RECORD_FIELDS[1], source })?;
        let max_fuel_attempts = if values.len() > 13 && !r.get(13)?.is_empty() {
            r.number(13)?
        } else {
            DEFAULT_MAX_FUEL_ATTEMPTS
        };

        let params = DesignParameters {
            design_id: r.get(0)?.to_string(),
            target,
            salt: r.number(2)?,
            temperature: r.number(3)?,
            target_placeholder_window: EnergyWindow::new(r.number(4)?, r.number(5)?),
            toehold1_min: r.number(6)?,
            probe_ddg_threshold: r.number(7)?,
            neck_min: r.number(8)?,
            spacer: r.sequence(9)?,
            fuel_loop: r.sequence(10)?,
            fuel_ddg_window: EnergyWindow::new(r.number(12)?, r.number(11)?),
            max_fuel_attempts,
            hairpins: HairpinSettings::default(),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn conditions(&self) -> Conditions {
        Conditions::new(self.temperature, self.salt)
    }

    /// Check ranges and orderings. Searches assume this has passed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let out_of_range = |name: &'static str, reason: String| {
            Err(ConfigError::OutOfRange { name, reason })
        };

        if self.target.len() < 3 {
            return out_of_range("target", format!(
                "{} bases, need at least 3", self.target.len()));
        }
        if !(self.salt.is_finite() && self.salt > 0.) {
            return out_of_range("salt", format!("{} M must be positive", self.salt));
        }
        if !self.temperature.is_finite() {
            return out_of_range("temperature", format!("{} C", self.temperature));
        }
        for (name, window) in [
            ("target-placeholder window", self.target_placeholder_window),
            ("fuel ddG window", self.fuel_ddg_window),
            ("fuel hairpin window", self.hairpins.fuel_window),
            ("probe hairpin window", self.hairpins.probe_window),
        ] {
            if !window.is_ordered() {
                return out_of_range(name, format!("{window} is not an ordered interval"));
            }
        }
        let max_toehold = self.target.len() - 2;
        if self.toehold1_min == 0 || self.toehold1_min > max_toehold {
            return out_of_range("toehold 1 min length", format!(
                "{} must be within 1..={max_toehold}", self.toehold1_min));
        }
        if !self.probe_ddg_threshold.is_finite() {
            return out_of_range("placeholder-probe ddG", format!("{}", self.probe_ddg_threshold));
        }
        if self.neck_min == 0 {
            return out_of_range("neck min length", "must be at least 1".to_string());
        }
        if self.max_fuel_attempts == 0 {
            return out_of_range("max fuel attempts", "must be at least 1".to_string());
        }
        let sweep = &self.hairpins.sweep;
        if !(sweep.step >= MIN_SWEEP_STEP
            && sweep.ceiling.is_finite()
            && sweep.start_offset.is_finite()
            && sweep.back_off.is_finite()
            && sweep.tolerance >= 0.)
        {
            return out_of_range("unfold sweep", format!("{sweep:?}"));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sp_structure::SequenceError;

    pub(crate) fn record() -> Vec<String> {
        [
            "S1", "TGATCGATCGATCGATCGATCG", "1.0", "25", "-40", "-10", "6", "2", "4",
            "tttt", "aacaa", "100", "-100", "15",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_from_record() {
        let p = DesignParameters::from_record(&record()).unwrap();
        assert_eq!(p.design_id, "S1");
        assert_eq!(p.target.to_string(), "tgatcgatcgatcgatcgatcg");
        assert_eq!(p.salt, 1.0);
        assert_eq!(p.temperature, 25.);
        assert_eq!(p.target_placeholder_window, EnergyWindow::new(-40., -10.));
        assert_eq!(p.toehold1_min, 6);
        assert_eq!(p.probe_ddg_threshold, 2.);
        assert_eq!(p.neck_min, 4);
        assert_eq!(p.spacer.to_string(), "tttt");
        assert_eq!(p.fuel_loop.to_string(), "aacaa");
        assert_eq!(p.fuel_ddg_window, EnergyWindow::new(-100., 100.));
        assert_eq!(p.max_fuel_attempts, 15);
        assert_eq!(p.hairpins, HairpinSettings::default());
        assert_eq!(p.conditions(), Conditions::new(25., 1.0));
    }

    #[test]
    fn test_from_record_defaults_attempts() {
        let mut r = record();
        r.truncate(13);
        let p = DesignParameters::from_record(&r).unwrap();
        assert_eq!(p.max_fuel_attempts, DEFAULT_MAX_FUEL_ATTEMPTS);
    }

    #[test]
    fn test_from_record_errors() {
        let mut r = record();
        r.truncate(5);
        assert_eq!(DesignParameters::from_record(&r),
            Err(ConfigError::MissingField { index: 5, name: "target-placeholder dG min" }));

        let mut r = record();
        r[2] = "salty".to_string();
        assert!(matches!(DesignParameters::from_record(&r),
            Err(ConfigError::InvalidNumber { name: "salt", .. })));

        let mut r = record();
        r[9] = "ttxt".to_string();
        assert_eq!(DesignParameters::from_record(&r),
            Err(ConfigError::InvalidSequence {
                name: "spacer",
                source: SequenceError::InvalidSymbol { symbol: 'x', position: 2 },
            }));

        let mut r = record();
        r[1] = "".to_string();
        assert!(matches!(DesignParameters::from_record(&r),
            Err(ConfigError::InvalidSequence { name: "target", source: SequenceError::Empty })));
    }

    #[test]
    fn test_validate_ranges() {
        let base = DesignParameters::from_record(&record()).unwrap();

        let mut p = base.clone();
        p.salt = 0.;
        assert!(matches!(p.validate(), Err(ConfigError::OutOfRange { name: "salt", .. })));

        let mut p = base.clone();
        p.toehold1_min = 21;
        assert!(matches!(p.validate(), Err(ConfigError::OutOfRange { .. })));
        p.toehold1_min = 20;
        assert!(p.validate().is_ok());

        let mut p = base.clone();
        p.target_placeholder_window = EnergyWindow::new(-10., -40.);
        assert!(p.validate().is_err());

        let mut p = base.clone();
        p.max_fuel_attempts = 0;
        assert!(p.validate().is_err());

        let mut p = base;
        p.hairpins.sweep.step = 0.;
        assert!(p.validate().is_err());
        p.hairpins.sweep.step = 1e-300;
        assert!(p.validate().is_err());
        p.hairpins.sweep.step = MIN_SWEEP_STEP;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_sweep_temperatures() {
        let sweep = UnfoldSweep::default();
        let temps: Vec<f64> = sweep.temperatures(25.).collect();
        assert_eq!(temps.first(), Some(&27.));
        assert_eq!(temps.last(), Some(&49.));
        assert_eq!(temps.len(), 12);

        // Starting above the ceiling visits nothing.
        assert_eq!(sweep.temperatures(60.).count(), 0);

        // A vanishing step cannot stall the sweep.
        let fine = UnfoldSweep { step: 1e-300, ..sweep };
        let n = fine.temperatures(25.).count();
        assert!((2300..=2301).contains(&n));
        assert!(fine.temperatures(25.).all(|t| (27. ..=50. + 1e-9).contains(&t)));
    }

    #[test]
    fn test_windows() {
        let w = EnergyWindow::new(-6., -2.);
        assert!(w.contains(-6.) && w.contains(-2.) && w.contains(-4.));
        assert!(!w.contains(-1.9));
        assert!(!w.contains_strictly(-6.));
        assert!(w.contains_strictly(-5.9));
        assert_eq!(w.to_string(), "[-6, -2] kcal/mol");
    }

    #[test]
    fn test_serde_roundtrip_with_defaults() {
        let p = DesignParameters::from_record(&record()).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: DesignParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        // Tunables may be omitted.
        let mut v: serde_json::Value = serde_json::from_str(&json).unwrap();
        v.as_object_mut().unwrap().remove("hairpins");
        v.as_object_mut().unwrap().remove("max_fuel_attempts");
        let back: DesignParameters = serde_json::from_value(v).unwrap();
        assert_eq!(back.max_fuel_attempts, DEFAULT_MAX_FUEL_ATTEMPTS);
        assert_eq!(back.hairpins, HairpinSettings::default());
    }
}
