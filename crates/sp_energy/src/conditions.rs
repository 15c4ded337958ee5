//! Operating conditions: temperature and monovalent salt.
//!
//! Every free energy that is compared against a design threshold goes
//! through `Conditions`, so duplex and folded energies are always
//! corrected the same way.
//!

use serde::Deserialize;
use serde::Serialize;

use crate::ThermoResult;
use crate::length_salt_correction;
use crate::melting_temperature_kelvin;
use crate::folded_salt_correction;
use crate::KELVIN;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Temperature in °C.
    pub temperature: f64,
    /// Monovalent salt concentration in M.
    pub salt: f64,
}

/// A duplex evaluated under specific conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuplexEnergy {
    pub thermo: ThermoResult,
    /// Number of bases the length correction was computed for.
    pub length: usize,
    /// ΔG at the operating temperature, before the salt correction.
    pub gibbs_at_temperature: f64,
    pub salt_correction: f64,
    /// Temperature and salt corrected ΔG, used in all acceptance checks.
    pub corrected: f64,
    /// Melting temperature in °C.
    pub melting_temperature: f64,
}

impl Conditions {
    pub fn new(temperature: f64, salt: f64) -> Self {
        Conditions { temperature, salt }
    }

    pub fn corrected_gibbs(&self, thermo: &ThermoResult, length: usize) -> f64 {
        thermo.gibbs_at(self.temperature) - length_salt_correction(length, self.salt)
    }

    /// Melting temperature in °C.
    pub fn melting_temperature(&self, thermo: &ThermoResult) -> f64 {
        melting_temperature_kelvin(thermo.enthalpy, thermo.entropy, self.salt) - KELVIN
    }

    pub fn duplex(&self, thermo: ThermoResult, length: usize) -> DuplexEnergy {
        let gibbs_at_temperature = thermo.gibbs_at(self.temperature);
        let salt_correction = length_salt_correction(length, self.salt);
        DuplexEnergy {
            thermo,
            length,
            gibbs_at_temperature,
            salt_correction,
            corrected: gibbs_at_temperature - salt_correction,
            melting_temperature: self.melting_temperature(&thermo),
        }
    }

    /// Salt-correct a folding oracle result.
    pub fn corrected_fold(&self, raw: f64) -> f64 {
        folded_salt_correction(raw, self.salt)
    }
}
