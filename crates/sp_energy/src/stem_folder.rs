//! Stem-loop folding oracle.
//!
//! A minimum free energy folder restricted to what the sensor design
//! needs to see: Watson-Crick stacked stems closed by hairpin loops,
//! placed side by side in the exterior loop. There are no mismatches,
//! bulges, interior or multibranch loops. The open chain has ΔG = 0, so
//! the result is never positive.
//!
//! Hairpin loop entropies (cal/(K·mol)) follow Table 4 of SantaLucia
//! and Hicks (2004); loops longer than 30 nt use Jacobson-Stockmayer
//! extrapolation. Helix ends closed by A·T pay the terminal penalty.
//!

use ndarray::Array2;
use sp_structure::Base;
use sp_structure::NucleicSeq;
use sp_structure::Pair;
use sp_structure::PairSet;
use sp_structure::NAIDX;

use crate::stack;
use crate::FoldOracle;
use crate::NNParams;
use crate::GAS_CONSTANT;
use crate::KELVIN;
use crate::TERMINAL_AT;

const EPS: f64 = 1e-9;

/// Hairpin loop entropies for loop lengths 3 to 30.
const HAIRPIN_LOOP_DS: [f64; 28] = [
    -11.3, -11.3, -10.6, -12.9, -13.5, -13.9, -14.5, -14.8, -15.5, -16.1,
    -16.1, -16.4, -16.8, -17.1, -17.4, -17.7, -18.1, -18.4, -18.7, -18.7,
    -19.0, -19.3, -19.7, -19.7, -19.7, -20.0, -20.0, -20.3,
];

/// Entropy of a hairpin loop with `len` unpaired bases, if it can form.
fn hairpin_loop_entropy(len: usize) -> Option<f64> {
    match len {
        0..=2 => None,
        3..=30 => Some(HAIRPIN_LOOP_DS[len - 3]),
        _ => {
            let ds30 = HAIRPIN_LOOP_DS[27];
            Some(ds30 - 2.44 * GAS_CONSTANT * (len as f64 / 30.).ln())
        }
    }
}

/// Stem-loop minimum free energy folder.
#[derive(Debug, Clone, Copy)]
pub struct StemFolder {
    min_loop: usize,
}

impl Default for StemFolder {
    fn default() -> Self {
        Self { min_loop: 3 }
    }
}

impl StemFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum free energy in kcal/mol at `temperature` (°C).
    pub fn mfe(&self, sequence: &NucleicSeq, temperature: f64) -> f64 {
        let dp = FoldingDP::fill(sequence.bases(), temperature, self.min_loop);
        dp.mfe()
    }

    /// Minimum free energy and one structure that attains it.
    pub fn mfe_structure(&self, sequence: &NucleicSeq, temperature: f64) -> (f64, PairSet) {
        let dp = FoldingDP::fill(sequence.bases(), temperature, self.min_loop);
        let mut pairs = PairSet::new(sequence.len());
        if sequence.len() > 1 {
            dp.traceback_exterior(0, sequence.len() - 1, &mut pairs);
        }
        (dp.mfe(), pairs)
    }
}

impl FoldOracle for StemFolder {
    fn fold(&self, sequence: &NucleicSeq, temperature: f64) -> f64 {
        self.mfe(sequence, temperature)
    }
}

struct FoldingDP<'a> {
    seq: &'a [Base],
    kelvin: f64,
    min_loop: usize,
    /// Best energy of (i, j) given that i and j pair.
    v: Array2<f64>,
    /// Best energy of the exterior segment (i, j).
    w: Array2<f64>,
}

impl<'a> FoldingDP<'a> {
    fn fill(seq: &'a [Base], temperature: f64, min_loop: usize) -> Self {
        debug_assert!(seq.len() < NAIDX::MAX as usize);
        let n = seq.len();
        let mut dp = FoldingDP {
            seq,
            kelvin: temperature + KELVIN,
            min_loop,
            v: Array2::from_elem((n, n), f64::INFINITY),
            w: Array2::from_elem((n, n), 0.),
        };

        for l in min_loop + 1..n {
            for i in 0..n - l {
                let j = i + l;
                if dp.seq[i].pairs_with(dp.seq[j]) {
                    let mut best = dp.hairpin(i, j);
                    if l - 2 > min_loop {
                        best = best.min(dp.stack(i) + dp.v[(i + 1, j - 1)]);
                    }
                    dp.v[(i, j)] = best;
                }

                let mut best = dp.w[(i + 1, j)].min(dp.w[(i, j - 1)]);
                best = best.min(dp.v[(i, j)] + dp.helix_end(i));
                for k in i + 1..j {
                    best = best.min(dp.w[(i, k)] + dp.w[(k + 1, j)]);
                }
                dp.w[(i, j)] = best;
            }
        }
        dp
    }

    fn mfe(&self) -> f64 {
        match self.seq.len() {
            0 | 1 => 0.,
            n => self.w[(0, n - 1)],
        }
    }

    fn gibbs(&self, p: NNParams) -> f64 {
        p.dh - self.kelvin * p.ds / 1000.
    }

    /// Terminal penalty of a helix end closed by the pair at `i`.
    fn helix_end(&self, i: usize) -> f64 {
        if self.seq[i].is_weak() {
            self.gibbs(TERMINAL_AT)
        } else {
            0.
        }
    }

    /// Pair (i, j) stacked on (i+1, j-1).
    fn stack(&self, i: usize) -> f64 {
        self.gibbs(stack(self.seq[i], self.seq[i + 1]))
    }

    /// Hairpin loop closed by (i, j).
    fn hairpin(&self, i: usize, j: usize) -> f64 {
        match hairpin_loop_entropy(j - i - 1) {
            Some(ds) => -self.kelvin * ds / 1000. + self.helix_end(i),
            None => f64::INFINITY,
        }
    }

    fn traceback_exterior(&self, i: usize, j: usize, pairs: &mut PairSet) {
        if j <= i + self.min_loop {
            return;
        }
        let w_ij = self.w[(i, j)];

        if (w_ij - self.w[(i + 1, j)]).abs() < EPS {
            self.traceback_exterior(i + 1, j, pairs);
        } else if (w_ij - self.w[(i, j - 1)]).abs() < EPS {
            self.traceback_exterior(i, j - 1, pairs);
        } else if (w_ij - (self.v[(i, j)] + self.helix_end(i))).abs() < EPS {
            self.traceback_stem(i, j, pairs);
        } else {
            for k in i + 1..j {
                if (w_ij - (self.w[(i, k)] + self.w[(k + 1, j)])).abs() < EPS {
                    self.traceback_exterior(i, k, pairs);
                    self.traceback_exterior(k + 1, j, pairs);
                    break;
                }
            }
        }
    }

    fn traceback_stem(&self, i: usize, j: usize, pairs: &mut PairSet) {
        pairs.insert(Pair::new(i as NAIDX, j as NAIDX));
        let v_ij = self.v[(i, j)];
        if (v_ij - self.hairpin(i, j)).abs() < EPS {
            return;
        }
        self.traceback_stem(i + 1, j - 1, pairs);
    }
}
