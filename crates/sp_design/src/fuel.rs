//! Fuel search.
//!
//! Each attempt grows a random toehold 2 base by base on its 5' side.
//! Once it is longer than toehold 1, every length is checked: the bare
//! fuel for unwanted structure (warning only), the fuel hairpin neck,
//! and the ΔΔG of fuel / placeholder 3 against target / placeholder 1.
//! An attempt ends on acceptance, when the ΔΔG becomes too favorable,
//! when no hairpin neck fits, or when toehold 2 reaches |target| − 2.
//!

use log::debug;
use log::info;
use log::warn;
use rand::Rng;
use serde::Serialize;

use sp_energy::DuplexEnergy;
use sp_energy::FoldOracle;
use sp_energy::nearest_neighbor;
use sp_structure::Base;
use sp_structure::NucleicSeq;

use crate::Attempt;
use crate::DesignError;
use crate::DesignParameters;
use crate::DesignWarning;
use crate::Hairpin;
use crate::HairpinKind;
use crate::HairpinSearchExhausted;
use crate::HairpinTemplate;
use crate::RetryError;
use crate::Toehold1Design;
use crate::Unfolding;
use crate::bounded_attempts;
use crate::find_hairpin;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelDesign {
    pub toehold2: NucleicSeq,
    /// Toehold 2 followed by the target without its toehold 1 region.
    pub fuel_body: NucleicSeq,
    /// The fuel hairpin strand: body, loop and neck complement.
    pub fuel: NucleicSeq,
    /// Placeholder 2 extended by the complement of toehold 2.
    pub placeholder3: NucleicSeq,
    /// Toehold 1 followed by placeholder 3.
    pub final_placeholder: NucleicSeq,
    /// Fuel body hybridized to placeholder 3.
    pub duplex: DuplexEnergy,
    pub ddg: f64,
    pub hairpin: Hairpin,
    /// Corrected folded ΔG of the bare fuel body.
    pub bare_fold: f64,
    /// The attempt (1-based) that produced this fuel.
    pub attempts: usize,
}

/// Why a single attempt was abandoned.
#[derive(Debug, Clone, PartialEq)]
pub enum FuelRejection {
    /// Toehold 2 reached |target| − 2 with ΔΔG still above the window.
    ToeholdTooLong { last_ddg: Option<f64> },
    /// ΔΔG at or below the lower bound.
    TooFavorable { ddg: f64 },
    /// No neck closes the fuel hairpin for this toehold 2.
    HairpinExhausted(HairpinSearchExhausted),
}

impl FuelRejection {
    fn last_ddg(&self) -> Option<f64> {
        match self {
            FuelRejection::ToeholdTooLong { last_ddg } => *last_ddg,
            FuelRejection::TooFavorable { ddg } => Some(*ddg),
            FuelRejection::HairpinExhausted(_) => None,
        }
    }
}

fn random_base<R: Rng>(rng: &mut R) -> Base {
    Base::ALL[rng.random_range(0..Base::ALL.len())]
}

/// Find toehold 2 and the fuel hairpin.
///
/// Warnings of the accepted candidate are appended to `warnings`;
/// warnings of rejected candidates are only logged.
pub fn find_fuel<O, R>(
    params: &DesignParameters,
    toehold: &Toehold1Design,
    reference: &DuplexEnergy,
    oracle: &O,
    rng: &mut R,
    warnings: &mut Vec<DesignWarning>,
) -> Result<FuelDesign, DesignError>
where
    O: FoldOracle + ?Sized,
    R: Rng,
{
    let conditions = params.conditions();
    let settings = &params.hairpins;
    let window = params.fuel_ddg_window;
    let target = &params.target;
    let core = target.prefix(target.len() - toehold.toehold1.len());
    let max_toehold2 = target.len().saturating_sub(2);

    let result = bounded_attempts(params.max_fuel_attempts, |attempt|
        -> Result<Attempt<FuelDesign, FuelRejection>, DesignError>
    {
        debug!("fuel attempt {attempt} of {}", params.max_fuel_attempts);
        let mut toehold2 = NucleicSeq::default();
        let mut last_ddg = None;

        while toehold2.len() < max_toehold2 {
            toehold2 = toehold2.prepend(random_base(&mut *rng));
            if toehold2.len() <= toehold.toehold1.len() {
                continue;
            }
            let fuel_body = &toehold2 + &core;
            let placeholder3 = &toehold.placeholder2 + &toehold2.reverse_complement();

            let mut candidate_warnings = Vec::new();
            let bare_fold = conditions.corrected_fold(oracle.fold(&fuel_body, conditions.temperature));
            if bare_fold <= settings.fuel_structure_warning {
                let w = DesignWarning::SecondaryStructure {
                    strand: HairpinKind::Fuel,
                    corrected_dg: bare_fold,
                    threshold: settings.fuel_structure_warning,
                };
                warn!("{w} ({fuel_body})");
                candidate_warnings.push(w);
            }

            let template = HairpinTemplate::fuel(fuel_body.clone(), params.fuel_loop.clone());
            let hairpin = match find_hairpin(&template, settings.fuel_window, params.neck_min,
                &conditions, &settings.sweep, oracle)
            {
                Ok(hairpin) => hairpin,
                Err(e) => {
                    debug!("toehold 2 {toehold2}: {e}");
                    return Ok(Attempt::Rejected(FuelRejection::HairpinExhausted(e)));
                }
            };
            if let Unfolding::NotFound { ceiling } = hairpin.unfolding {
                let w = DesignWarning::UnfoldNotFound { strand: HairpinKind::Fuel, ceiling };
                warn!("{w} ({})", hairpin.strand);
                candidate_warnings.push(w);
            }

            let thermo = nearest_neighbor(&fuel_body, &placeholder3)?;
            let duplex = conditions.duplex(thermo, target.len());
            let ddg = duplex.corrected - reference.corrected;
            debug!("toehold 2 {toehold2} ({} nt): ΔΔG {ddg:.3} kcal/mol", toehold2.len());

            if window.contains_strictly(ddg) {
                warnings.extend(candidate_warnings);
                return Ok(Attempt::Accepted(FuelDesign {
                    final_placeholder: &toehold.toehold1 + &placeholder3,
                    fuel: hairpin.strand.clone(),
                    toehold2,
                    fuel_body,
                    placeholder3,
                    duplex,
                    ddg,
                    hairpin,
                    bare_fold,
                    attempts: attempt,
                }));
            }
            if ddg <= window.lower {
                debug!("ΔΔG {ddg:.3} is too favorable, next attempt");
                return Ok(Attempt::Rejected(FuelRejection::TooFavorable { ddg }));
            }
            last_ddg = Some(ddg);
        }
        debug!("toehold 2 is too long, next attempt");
        Ok(Attempt::Rejected(FuelRejection::ToeholdTooLong { last_ddg }))
    });

    match result {
        Ok((fuel, attempts)) => {
            info!("fuel accepted on attempt {attempts}: toehold 2 {} ({} nt), ΔΔG {:.3} kcal/mol",
                fuel.toehold2, fuel.toehold2.len(), fuel.ddg);
            Ok(fuel)
        }
        Err(RetryError::Exhausted { attempts, last }) => Err(DesignError::FuelSearchExhausted {
            attempts,
            window,
            last_ddg: last.and_then(|r| r.last_ddg()),
        }),
        Err(RetryError::Aborted(e)) => Err(e),
    }
}
