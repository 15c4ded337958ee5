//! Bases and canonical DNA sequences.
//!
//! A `NucleicSeq` only ever holds the four Watson-Crick bases and
//! renders in lowercase, whatever case it was read in. Sequences are
//! values: every operation returns a new sequence, so a strand produced
//! by one design stage can only be extended by concatenation later on.
//!

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::SequenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Base { A, C, G, T }

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

    /// Watson-Crick partner.
    pub fn complement(self) -> Self {
        match self {
            Base::A => Base::T,
            Base::C => Base::G,
            Base::G => Base::C,
            Base::T => Base::A,
        }
    }

    /// A and T form the weaker (two hydrogen bond) pair.
    pub fn is_weak(self) -> bool {
        matches!(self, Base::A | Base::T)
    }

    pub fn pairs_with(self, other: Base) -> bool {
        self.complement() == other
    }
}

impl TryFrom<char> for Base {
    type Error = char;

    fn try_from(c: char) -> Result<Self, char> {
        Ok(match c.to_ascii_lowercase() {
            'a' => Base::A,
            'c' => Base::C,
            'g' => Base::G,
            't' => Base::T,
            _ => return Err(c),
        })
    }
}

impl From<Base> for char {
    fn from(b: Base) -> Self {
        match b {
            Base::A => 'a',
            Base::C => 'c',
            Base::G => 'g',
            Base::T => 't',
        }
    }
}

/// An ordered, canonical DNA sequence (5' to 3').
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NucleicSeq(Vec<Base>);

impl NucleicSeq {
    pub fn new(bases: Vec<Base>) -> Self {
        NucleicSeq(bases)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bases(&self) -> &[Base] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Base> + '_ {
        self.0.iter().copied()
    }

    pub fn first(&self) -> Option<Base> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<Base> {
        self.0.last().copied()
    }

    /// Reverse complement, read 5' to 3'.
    pub fn reverse_complement(&self) -> Self {
        NucleicSeq(self.0.iter().rev().map(|b| b.complement()).collect())
    }

    /// Base-wise complement, keeping the orientation.
    pub fn complement(&self) -> Self {
        NucleicSeq(self.0.iter().map(|b| b.complement()).collect())
    }

    /// The first `n` bases. Panics if `n > len`.
    pub fn prefix(&self, n: usize) -> Self {
        NucleicSeq(self.0[..n].to_vec())
    }

    /// The last `n` bases. Panics if `n > len`.
    pub fn suffix(&self, n: usize) -> Self {
        NucleicSeq(self.0[self.len() - n..].to_vec())
    }

    /// Split into `[0, mid)` and `[mid, len)`. Panics if `mid > len`.
    pub fn split_at(&self, mid: usize) -> (Self, Self) {
        let (l, r) = self.0.split_at(mid);
        (NucleicSeq(l.to_vec()), NucleicSeq(r.to_vec()))
    }

    pub fn concat(&self, other: &NucleicSeq) -> Self {
        let mut bases = Vec::with_capacity(self.len() + other.len());
        bases.extend_from_slice(&self.0);
        bases.extend_from_slice(&other.0);
        NucleicSeq(bases)
    }

    /// A new sequence with `base` added on the 5' side.
    pub fn prepend(&self, base: Base) -> Self {
        let mut bases = Vec::with_capacity(self.len() + 1);
        bases.push(base);
        bases.extend_from_slice(&self.0);
        NucleicSeq(bases)
    }

    /// Consecutive dinucleotides, 5' to 3'.
    pub fn dinucleotides(&self) -> impl Iterator<Item = (Base, Base)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Read a sequence in any case, tolerating surrounding whitespace.
/// An empty string is a valid, empty sequence.
impl FromStr for NucleicSeq {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .chars()
            .enumerate()
            .map(|(position, c)| Base::try_from(c)
                .map_err(|symbol| SequenceError::InvalidSymbol { symbol, position }))
            .collect::<Result<Vec<_>, _>>()
            .map(NucleicSeq)
    }
}

impl TryFrom<&str> for NucleicSeq {
    type Error = SequenceError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for NucleicSeq {
    type Error = SequenceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NucleicSeq> for String {
    fn from(seq: NucleicSeq) -> Self {
        seq.to_string()
    }
}

impl fmt::Display for NucleicSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.0.iter().map(|&b| char::from(b)).collect();
        f.write_str(&s)
    }
}

impl Add<&NucleicSeq> for &NucleicSeq {
    type Output = NucleicSeq;

    fn add(self, rhs: &NucleicSeq) -> NucleicSeq {
        self.concat(rhs)
    }
}

/// Validate and lowercase a sequence. Unlike `str::parse`, this
/// rejects the empty sequence.
pub fn canonicalize(s: &str) -> Result<NucleicSeq, SequenceError> {
    let seq: NucleicSeq = s.parse()?;
    if seq.is_empty() {
        return Err(SequenceError::Empty);
    }
    Ok(seq)
}

pub fn reverse_complement(seq: &NucleicSeq) -> NucleicSeq {
    seq.reverse_complement()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_lowercases() {
        let seq = canonicalize(" TGatCG\n").unwrap();
        assert_eq!(seq.to_string(), "tgatcg");
        assert_eq!(seq.len(), 6);
        assert_eq!(seq.first(), Some(Base::T));
        assert_eq!(seq.last(), Some(Base::G));
    }

    #[test]
    fn test_canonicalize_rejects() {
        assert_eq!(canonicalize(""), Err(SequenceError::Empty));
        assert_eq!(canonicalize("   "), Err(SequenceError::Empty));
        assert_eq!(canonicalize("acgu"),
            Err(SequenceError::InvalidSymbol { symbol: 'u', position: 3 }));
        assert_eq!(canonicalize("ac gt"),
            Err(SequenceError::InvalidSymbol { symbol: ' ', position: 2 }));
        // Parsing (not canonicalizing) accepts the empty loop/spacer case.
        assert!("".parse::<NucleicSeq>().unwrap().is_empty());
    }

    #[test]
    fn test_reverse_complement() {
        let seq = canonicalize("aacgtg").unwrap();
        assert_eq!(seq.reverse_complement().to_string(), "cacgtt");
        assert_eq!(seq.complement().to_string(), "ttgcac");
        assert_eq!(reverse_complement(&seq), seq.reverse_complement());
    }

    #[test]
    fn test_reverse_complement_involution() {
        for s in ["a", "tgatcgatcgatcgatcgatcg", "gggcccaatt", "acgtacgtt"] {
            let seq = canonicalize(s).unwrap();
            assert_eq!(seq.reverse_complement().reverse_complement(), seq);
        }
    }

    #[test]
    fn test_slicing_and_concat() {
        let seq = canonicalize("acgtac").unwrap();
        assert_eq!(seq.prefix(2).to_string(), "ac");
        assert_eq!(seq.suffix(2).to_string(), "ac");
        let (l, r) = seq.split_at(4);
        assert_eq!(l.to_string(), "acgt");
        assert_eq!(r.to_string(), "ac");
        assert_eq!(&l + &r, seq);
        assert_eq!(r.prepend(Base::G).to_string(), "gac");
        assert_eq!(seq.prefix(0).len(), 0);
    }

    #[test]
    fn test_dinucleotides() {
        let seq = canonicalize("acg").unwrap();
        let d: Vec<_> = seq.dinucleotides().collect();
        assert_eq!(d, vec![(Base::A, Base::C), (Base::C, Base::G)]);
        assert_eq!(canonicalize("a").unwrap().dinucleotides().count(), 0);
    }

    #[test]
    fn test_serde_as_string() {
        let seq = canonicalize("ACGT").unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(json, "\"acgt\"");
        let back: NucleicSeq = serde_json::from_str("\"ttGG\"").unwrap();
        assert_eq!(back.to_string(), "ttgg");
        assert!(serde_json::from_str::<NucleicSeq>("\"acxg\"").is_err());
    }
}
