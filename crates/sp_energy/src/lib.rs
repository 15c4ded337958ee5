//! The sp_energy crate.
//!
//! Energy evaluation for sensor strands:
//!  - nearest-neighbor duplex thermodynamics (SantaLucia & Hicks, 2004)
//!  - temperature, length and salt corrections
//!  - the folding oracle interface, a memoizing wrapper and a
//!    built-in stem-loop folder.
//!

mod thermo;
mod conditions;
mod oracle;
mod stem_folder;

pub use thermo::*;
pub use conditions::*;
pub use oracle::*;
pub use stem_folder::*;

/// Offset between degrees Celsius and Kelvin.
pub const KELVIN: f64 = 273.15;

/// Gas constant in cal/(K·mol).
pub const GAS_CONSTANT: f64 = 1.9872;
