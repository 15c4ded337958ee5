//! # strobprobe
//!
//! Design of three-strand toehold-exchange DNA sensors: a placeholder,
//! a fuel hairpin and a probe hairpin for a given target sequence.
//!
//! This crate reads parameter sheets, renders reports and re-exports
//! the functionality of its library crates.

pub mod config;
pub mod report;

pub mod structure {
    pub use ::sp_structure::*;
}

pub mod energy {
    pub use ::sp_energy::*;
}

pub mod design {
    pub use ::sp_design::*;
}
