//! Nearest-neighbor duplex thermodynamics.
//!
//! Parameters for Watson-Crick stacks in 1 M NaCl, from:
//! SantaLucia and Hicks (2004), The Thermodynamics of DNA Structural
//! Motifs, Annu.Rev.Biophys.Biomol.Struct. 33:415-40.
//!
//! Enthalpies are in kcal/mol. Entropy increments are tabulated in
//! cal/(K·mol) and converted to kcal/(K·mol) once a duplex has been
//! accumulated.
//!

use serde::Deserialize;
use serde::Serialize;

use sp_structure::Base;
use sp_structure::NucleicSeq;
use sp_structure::SequenceError;

use crate::KELVIN;

/// One additive increment of the nearest-neighbor model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NNParams {
    /// kcal/mol
    pub dh: f64,
    /// cal/(K·mol)
    pub ds: f64,
    /// kcal/mol at 37 °C
    pub dg: f64,
}

impl NNParams {
    const fn new(dh: f64, ds: f64, dg: f64) -> Self {
        NNParams { dh, ds, dg }
    }
}

/// Duplex initiation.
pub const INITIATION: NNParams = NNParams::new(0.2, -5.7, 1.96);

/// Penalty for each duplex end closed by an A·T pair.
pub const TERMINAL_AT: NNParams = NNParams::new(2.2, 6.9, 0.05);

/// Stacking increment of the dinucleotide 5'-xy-3' paired with its complement.
pub fn stack(x: Base, y: Base) -> NNParams {
    use Base::*;
    match (x, y) {
        (A, A) | (T, T) => NNParams::new(-7.6, -21.3, -1.00),
        (A, T) => NNParams::new(-7.2, -20.4, -0.88),
        (T, A) => NNParams::new(-7.2, -21.3, -0.58),
        (C, A) | (T, G) => NNParams::new(-8.5, -22.7, -1.45),
        (G, T) | (A, C) => NNParams::new(-8.4, -22.4, -1.44),
        (C, T) | (A, G) => NNParams::new(-7.8, -21.0, -1.28),
        (G, A) | (T, C) => NNParams::new(-8.2, -22.2, -1.30),
        (C, G) => NNParams::new(-10.6, -27.2, -2.17),
        (G, C) => NNParams::new(-9.8, -24.4, -2.24),
        (G, G) | (C, C) => NNParams::new(-8.0, -19.9, -1.84),
    }
}

/// Accumulated duplex thermodynamics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermoResult {
    /// ΔH in kcal/mol.
    pub enthalpy: f64,
    /// ΔS in kcal/(K·mol).
    pub entropy: f64,
    /// ΔG in kcal/mol at the 37 °C reference temperature.
    pub gibbs: f64,
}

impl ThermoResult {
    /// ΔG at `temperature` (°C), see [`gibbs_at`].
    pub fn gibbs_at(&self, temperature: f64) -> f64 {
        gibbs_at(temperature, self.enthalpy, self.entropy)
    }
}

/// Nearest-neighbor thermodynamics of `strand_a` hybridized to `strand_b`.
///
/// The terminal A·T penalty is applied independently for the 5' and 3'
/// base of `strand_a`; stacks are read off the dinucleotides of
/// `strand_b`. Both strands must be non-empty and of equal length.
pub fn nearest_neighbor(
    strand_a: &NucleicSeq,
    strand_b: &NucleicSeq,
) -> Result<ThermoResult, SequenceError> {
    if strand_a.len() != strand_b.len() {
        return Err(SequenceError::LengthMismatch {
            left: strand_a.len(),
            right: strand_b.len(),
        });
    }
    if strand_a.is_empty() {
        return Err(SequenceError::Empty);
    }
    Ok(accumulate(strand_a, strand_b))
}

/// Sum the model increments of a validated strand pair.
fn accumulate(strand_a: &NucleicSeq, strand_b: &NucleicSeq) -> ThermoResult {
    let mut acc = INITIATION;
    let mut add = |p: NNParams| {
        acc.dh += p.dh;
        acc.ds += p.ds;
        acc.dg += p.dg;
    };
    for end in [strand_a.first(), strand_a.last()].into_iter().flatten() {
        if end.is_weak() {
            add(TERMINAL_AT);
        }
    }
    for (x, y) in strand_b.dinucleotides() {
        add(stack(x, y));
    }
    ThermoResult {
        enthalpy: acc.dh,
        entropy: acc.ds / 1000.,
        gibbs: acc.dg,
    }
}

/// A designed hybridization of two equal-length strands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duplex {
    strand_a: NucleicSeq,
    strand_b: NucleicSeq,
}

impl Duplex {
    pub fn try_new(strand_a: NucleicSeq, strand_b: NucleicSeq) -> Result<Self, SequenceError> {
        if strand_a.is_empty() {
            return Err(SequenceError::Empty);
        }
        if strand_a.len() != strand_b.len() {
            return Err(SequenceError::LengthMismatch {
                left: strand_a.len(),
                right: strand_b.len(),
            });
        }
        Ok(Duplex { strand_a, strand_b })
    }

    /// A strand paired with its own reverse complement.
    pub fn perfect(strand: NucleicSeq) -> Result<Self, SequenceError> {
        let rc = strand.reverse_complement();
        Duplex::try_new(strand, rc)
    }

    pub fn strand_a(&self) -> &NucleicSeq {
        &self.strand_a
    }

    pub fn strand_b(&self) -> &NucleicSeq {
        &self.strand_b
    }

    pub fn len(&self) -> usize {
        self.strand_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strand_a.is_empty()
    }

    pub fn thermo(&self) -> ThermoResult {
        accumulate(&self.strand_a, &self.strand_b)
    }
}

/// ΔG = ΔH − T·ΔS, with `temperature` in °C and ΔS in kcal/(K·mol).
pub fn gibbs_at(temperature: f64, enthalpy: f64, entropy: f64) -> f64 {
    enthalpy - (temperature + KELVIN) * entropy
}

/// Length and monovalent salt correction, subtracted from [`gibbs_at`].
pub fn length_salt_correction(length: usize, salt: f64) -> f64 {
    0.114 * (length as f64 / 2.) * salt.ln()
}

/// Melting temperature in Kelvin for ΔH (kcal/mol) and ΔS (kcal/(K·mol)).
pub fn melting_temperature_kelvin(enthalpy: f64, entropy: f64, salt: f64) -> f64 {
    let r_term = -0.0108 + 0.00199 * (0.25e-9_f64).ln();
    (enthalpy * 1000.) / (entropy * 1000. + r_term) + 16.6 * salt.log10()
}

/// Salt correction applied to a folding oracle's free energy.
pub fn folded_salt_correction(raw: f64, salt: f64) -> f64 {
    raw + 1.5e-6 * (1000. - salt * 1000.).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_structure::canonicalize;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_stack_table_symmetry() {
        use Base::*;
        // Every dinucleotide reads the same as its reverse complement.
        for x in Base::ALL {
            for y in Base::ALL {
                let p = stack(x, y);
                let q = stack(y.complement(), x.complement());
                assert_eq!(p, q, "{x:?}{y:?}");
            }
        }
        assert_eq!(stack(C, G).dh, -10.6);
        assert_eq!(stack(G, C).dg, -2.24);
    }

    #[test]
    fn test_nearest_neighbor_single_stack() {
        let a = canonicalize("gc").unwrap();
        let b = a.reverse_complement();
        let t = nearest_neighbor(&a, &b).unwrap();
        assert!(close(t.enthalpy, 0.2 - 9.8));
        assert!(close(t.entropy, (-5.7 - 24.4) / 1000.));
        assert!(close(t.gibbs, 1.96 - 2.24));
    }

    #[test]
    fn test_nearest_neighbor_terminal_at() {
        // Both ends weak: two penalties, stacks at and ta.
        let a = canonicalize("ata").unwrap();
        let b = a.reverse_complement();
        assert_eq!(b.to_string(), "tat");
        let t = nearest_neighbor(&a, &b).unwrap();
        let dh = 0.2 + 2. * 2.2 - 7.2 - 7.2;
        let ds = (-5.7 + 2. * 6.9 - 21.3 - 20.4) / 1000.;
        let dg = 1.96 + 2. * 0.05 - 0.58 - 0.88;
        assert!(close(t.enthalpy, dh));
        assert!(close(t.entropy, ds));
        assert!(close(t.gibbs, dg));
    }

    #[test]
    fn test_nearest_neighbor_deterministic() {
        let a = canonicalize("tgatcgatcgatcgatcgatcg").unwrap();
        let b = a.reverse_complement();
        let t1 = nearest_neighbor(&a, &b).unwrap();
        let t2 = nearest_neighbor(&a, &b).unwrap();
        assert_eq!(t1, t2);
        let d = Duplex::try_new(a, b).unwrap();
        assert_eq!(d.thermo(), t1);
    }

    #[test]
    fn test_single_dinucleotide_change() {
        // b1 and b2 differ in their last dinucleotide only (gc -> gg).
        let a = canonicalize("gcatgc").unwrap();
        let b1 = canonicalize("ccatgc").unwrap();
        let b2 = canonicalize("ccatgg").unwrap();
        let t1 = nearest_neighbor(&a, &b1).unwrap();
        let t2 = nearest_neighbor(&a, &b2).unwrap();
        let (old, new) = (stack(Base::G, Base::C), stack(Base::G, Base::G));
        assert!(close(t2.enthalpy - t1.enthalpy, new.dh - old.dh));
        assert!(close(t2.entropy - t1.entropy, (new.ds - old.ds) / 1000.));
    }

    #[test]
    fn test_nearest_neighbor_errors() {
        let a = canonicalize("acgt").unwrap();
        let b = canonicalize("acg").unwrap();
        assert_eq!(nearest_neighbor(&a, &b),
            Err(SequenceError::LengthMismatch { left: 4, right: 3 }));
        let e = NucleicSeq::default();
        assert_eq!(nearest_neighbor(&e, &e), Err(SequenceError::Empty));
        assert!(Duplex::try_new(a, b).is_err());
    }

    #[test]
    fn test_single_base_duplex() {
        // One base is both 5' and 3' end.
        let a = canonicalize("a").unwrap();
        let t = nearest_neighbor(&a, &a.reverse_complement()).unwrap();
        assert!(close(t.enthalpy, 0.2 + 4.4));
    }

    #[test]
    fn test_corrections() {
        assert!(close(gibbs_at(25., -100., -0.3), -100. + 298.15 * 0.3));
        assert!(close(length_salt_correction(22, 1.0), 0.0));
        assert!(close(length_salt_correction(20, 0.5), 0.114 * 10. * 0.5_f64.ln()));
        assert!(close(folded_salt_correction(-3.0, 1.0), -3.0));
        assert!(close(folded_salt_correction(-3.0, 0.5), -3.0 + 1.5e-6 * 250000.));
        let t = ThermoResult { enthalpy: -150., entropy: -0.4, gibbs: -20. };
        assert!(close(t.gibbs_at(37.), -150. + 310.15 * 0.4));
    }

    #[test]
    fn test_melting_temperature() {
        let a = canonicalize("tgatcgatcgatcgatcgatcg").unwrap();
        let t = Duplex::perfect(a).unwrap().thermo();
        let tm = melting_temperature_kelvin(t.enthalpy, t.entropy, 1.0) - KELVIN;
        // A 22-mer in 1 M salt melts well above room temperature.
        assert!(tm > 60. && tm < 110., "{tm}");
        // Lower salt lowers Tm.
        let tm_low = melting_temperature_kelvin(t.enthalpy, t.entropy, 0.1) - KELVIN;
        assert!(close(tm - tm_low, 16.6));
    }
}
