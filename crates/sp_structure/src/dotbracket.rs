//! Dot-bracket rendering of pseudoknot-free structures.

use std::fmt;

use crate::PairSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotBracket {
    Unpaired,
    Open,
    Close,
}

impl From<DotBracket> for char {
    fn from(db: DotBracket) -> Self {
        match db {
            DotBracket::Unpaired => '.',
            DotBracket::Open => '(',
            DotBracket::Close => ')',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotBracketVec(pub Vec<DotBracket>);

impl From<&PairSet> for DotBracketVec {
    fn from(ps: &PairSet) -> Self {
        let mut dbv = vec![DotBracket::Unpaired; ps.length()];
        for pair in ps.sorted() {
            dbv[pair.i() as usize] = DotBracket::Open;
            dbv[pair.j() as usize] = DotBracket::Close;
        }
        DotBracketVec(dbv)
    }
}

impl fmt::Display for DotBracketVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.0.iter().map(|&db| char::from(db)).collect();
        f.write_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pair;

    #[test]
    fn test_dotbracket_from_pair_set() {
        let mut ps = PairSet::new(8);
        for (i, j) in [(0, 7), (1, 6), (3, 5)] {
            ps.insert(Pair::new(i, j));
        }
        let dbv = DotBracketVec::from(&ps);
        assert_eq!(dbv.0[2], DotBracket::Unpaired);
        assert_eq!(dbv.to_string(), "((.(.)))");
    }

    #[test]
    fn test_empty_structure() {
        let ps = PairSet::new(4);
        assert_eq!(DotBracketVec::from(&ps).to_string(), "....");
    }
}
