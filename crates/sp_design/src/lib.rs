//! The sp_design crate.
//!
//! Staged search for a three-strand toehold-exchange sensor:
//!  - toehold 1 and the trimmed placeholder
//!  - a randomized toehold 2 with its fuel hairpin
//!  - the probe hairpin
//!
//! Every stage is a function of the immutable `DesignParameters`, a
//! folding oracle and (for the fuel) a random source. The
//! `DesignPipeline` chains them and stops at the first hard failure.
//!

mod error;
mod params;
mod retry;
mod toehold;
mod hairpin;
mod fuel;
mod probe;
mod pipeline;

pub use error::*;
pub use params::*;
pub use retry::*;
pub use toehold::*;
pub use hairpin::*;
pub use fuel::*;
pub use probe::*;
pub use pipeline::*;
