//! The sp_structure crate.
//!
//! Sequence toolkit and structure representations shared by the
//! strobprobe crates:
//!  - Bases and canonical (lowercase) DNA sequences
//!  - Reverse complements, slicing and concatenation
//!  - Base pairs, pair sets and dot-bracket strings
//!

mod error;
mod sequence;
mod pair_set;
mod dotbracket;

pub use error::*;
pub use sequence::*;
pub use pair_set::*;
pub use dotbracket::*;


/// Nucleic Acid INdeX: we use `u16` (0 to 65k), which is plenty for
/// sensor strands. `P1KEY` needs to be *twice as large* (in bits) as
/// `NAIDX`, since pairs `(NAIDX, NAIDX)` are compacted into one `P1KEY`.
pub type NAIDX = u16;

/// Pair key. Must be >= 2×`NAIDX` in bit width so we can safely pack two indices.
pub type P1KEY = u32;

/// Compile-time sanity check: 2×NAIDX bits must fit into P1KEY.
const _: () = {
    debug_assert!(2 * NAIDX::BITS <= P1KEY::BITS);
};
