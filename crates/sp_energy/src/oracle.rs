//! The folding oracle interface.
//!
//! Design searches only ever ask one question about single-stranded
//! structure: "what is the folded free energy of this sequence at this
//! temperature?". Anything answering it deterministically can be
//! plugged in, including plain closures in tests.
//!

use std::cell::Cell;
use std::cell::RefCell;

use ahash::AHashMap;
use log::trace;
use sp_structure::NucleicSeq;

pub trait FoldOracle {
    /// Folded free energy (kcal/mol) of `sequence` at `temperature` (°C),
    /// before any salt correction.
    fn fold(&self, sequence: &NucleicSeq, temperature: f64) -> f64;
}

impl<F> FoldOracle for F
where
    F: Fn(&NucleicSeq, f64) -> f64,
{
    fn fold(&self, sequence: &NucleicSeq, temperature: f64) -> f64 {
        self(sequence, temperature)
    }
}

/// Memoizes (sequence, temperature) evaluations of an inner oracle.
/// Temperature sweeps revisit the same constructs, and fuel
/// candidates share long prefixes of their search.
pub struct CachedOracle<O> {
    inner: O,
    cache: RefCell<AHashMap<(NucleicSeq, u64), f64>>,
    hits: Cell<usize>,
}

impl<O: FoldOracle> CachedOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            cache: RefCell::new(AHashMap::default()),
            hits: Cell::new(0),
        }
    }

    /// Number of distinct evaluations stored.
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }
}

impl<O: FoldOracle> FoldOracle for CachedOracle<O> {
    fn fold(&self, sequence: &NucleicSeq, temperature: f64) -> f64 {
        let key = (sequence.clone(), temperature.to_bits());
        if let Some(&dg) = self.cache.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return dg;
        }
        let dg = self.inner.fold(sequence, temperature);
        trace!("fold {sequence} at {temperature} C: {dg:.4} kcal/mol");
        self.cache.borrow_mut().insert(key, dg);
        dg
    }
}
