//! Toehold 1 search.
//!
//! Toehold 1 is a prefix of the first placeholder (the reverse
//! complement of the target). It has to be long enough that the
//! remaining placeholder binds the probe clearly less stably than the
//! full placeholder binds the target.
//!

use log::debug;
use log::info;
use serde::Serialize;

use sp_energy::DuplexEnergy;
use sp_energy::nearest_neighbor;
use sp_structure::NucleicSeq;

use crate::DesignError;
use crate::DesignParameters;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toehold1Design {
    pub toehold1: NucleicSeq,
    /// The first placeholder without toehold 1.
    pub placeholder2: NucleicSeq,
    /// Reverse complement of `placeholder2`.
    pub probe_check: NucleicSeq,
    /// Placeholder 2 hybridized to the probe check.
    pub duplex: DuplexEnergy,
    /// `duplex.corrected` minus the target-placeholder corrected ΔG.
    pub ddg: f64,
    pub candidates_examined: usize,
}

/// Smallest toehold 1 length, from the configured minimum up to
/// |target| − 2, with ΔΔG above the threshold.
///
/// `reference` is the target / placeholder 1 duplex under the design
/// conditions.
pub fn find_toehold1(
    params: &DesignParameters,
    reference: &DuplexEnergy,
) -> Result<Toehold1Design, DesignError> {
    let conditions = params.conditions();
    let placeholder1 = params.target.reverse_complement();
    let max_length = params.target.len().saturating_sub(2);

    let mut last_ddg = None;
    for (examined, length) in (params.toehold1_min..=max_length).enumerate() {
        let (toehold1, placeholder2) = placeholder1.split_at(length);
        let probe_check = placeholder2.reverse_complement();
        let thermo = nearest_neighbor(&placeholder2, &probe_check)?;
        let duplex = conditions.duplex(thermo, probe_check.len());
        let ddg = duplex.corrected - reference.corrected;
        debug!("toehold 1 length {length}: {toehold1}, ΔΔG {ddg:.3} kcal/mol");
        last_ddg = Some(ddg);

        if ddg > params.probe_ddg_threshold {
            info!("toehold 1 accepted: {toehold1} ({length} nt), ΔΔG {ddg:.3} kcal/mol");
            return Ok(Toehold1Design {
                toehold1,
                placeholder2,
                probe_check,
                duplex,
                ddg,
                candidates_examined: examined + 1,
            });
        }
    }

    Err(DesignError::InfeasibleTarget {
        min_length: params.toehold1_min,
        max_length,
        threshold: params.probe_ddg_threshold,
        last_ddg,
    })
}
