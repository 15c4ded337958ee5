//! Base pairs of a single strand.
//!
//! The folding oracle reports its minimum free energy structure as a
//! `PairSet`. Both indices of a pair are packed into one `P1KEY`, so
//! the set is a plain integer set without hashing overhead.
//!

use nohash_hasher::IntSet;

use crate::NAIDX;
use crate::P1KEY;

/// Positions (i, j) of a base pair, with i < j.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    i: NAIDX,
    j: NAIDX,
}

impl Pair {
    pub fn new(i: NAIDX, j: NAIDX) -> Self {
        debug_assert!(i < j);
        Pair { i, j }
    }

    pub fn i(&self) -> NAIDX {
        self.i
    }

    pub fn j(&self) -> NAIDX {
        self.j
    }

    fn key(&self) -> P1KEY {
        ((self.i as P1KEY) << NAIDX::BITS) | self.j as P1KEY
    }

    fn from_key(key: P1KEY) -> Self {
        Pair {
            i: (key >> NAIDX::BITS) as NAIDX,
            j: key as NAIDX,
        }
    }
}

/// The pairs of a strand of known length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSet {
    length: usize,
    pairs: IntSet<P1KEY>,
}

impl PairSet {
    /// No pairs on a strand of `length` bases.
    pub fn new(length: usize) -> Self {
        PairSet {
            length,
            pairs: IntSet::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Length of the strand, not the number of pairs.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn insert(&mut self, pair: Pair) -> bool {
        debug_assert!((pair.j as usize) < self.length);
        self.pairs.insert(pair.key())
    }

    /// All pairs, ordered by their 5' position.
    pub fn sorted(&self) -> Vec<Pair> {
        let mut pairs: Vec<Pair> = self.pairs.iter().map(|&k| Pair::from_key(k)).collect();
        pairs.sort_unstable();
        pairs
    }
}
