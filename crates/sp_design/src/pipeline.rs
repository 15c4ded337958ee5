//! The design pipeline.
//!
//! Stages run strictly in order, each one consuming the frozen output
//! of the previous ones:
//!
//!   Init → TargetPlaceholderThermo → ToeholdSearch → FuelSearch
//!        → ProbeHairpinSearch → Done
//!
//! Any stage may end in `Failed`. Nothing is retried across stage
//! boundaries; the only retries are the bounded loops inside a stage.
//!

use std::fmt;

use log::info;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use sp_energy::DuplexEnergy;
use sp_energy::FoldOracle;
use sp_energy::nearest_neighbor;
use sp_structure::NucleicSeq;

use crate::DesignError;
use crate::DesignParameters;
use crate::DesignWarning;
use crate::FuelDesign;
use crate::ProbeDesign;
use crate::Toehold1Design;
use crate::find_fuel;
use crate::find_probe_hairpin;
use crate::find_toehold1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Init,
    TargetPlaceholderThermo,
    ToeholdSearch,
    FuelSearch,
    ProbeHairpinSearch,
    Done,
    Failed,
}

impl Stage {
    /// The stage following a successful one. Terminal stages have none.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::TargetPlaceholderThermo),
            Stage::TargetPlaceholderThermo => Some(Stage::ToeholdSearch),
            Stage::ToeholdSearch => Some(Stage::FuelSearch),
            Stage::FuelSearch => Some(Stage::ProbeHairpinSearch),
            Stage::ProbeHairpinSearch => Some(Stage::Done),
            Stage::Done | Stage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "initialization",
            Stage::TargetPlaceholderThermo => "target-placeholder thermodynamics",
            Stage::ToeholdSearch => "toehold 1 search",
            Stage::FuelSearch => "fuel search",
            Stage::ProbeHairpinSearch => "probe hairpin search",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// The target hybridized to its full placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetPlaceholder {
    pub placeholder1: NucleicSeq,
    pub duplex: DuplexEnergy,
}

/// Thermodynamics of target / placeholder 1, which must fall inside the
/// configured window.
pub fn check_target_placeholder(params: &DesignParameters) -> Result<TargetPlaceholder, DesignError> {
    let placeholder1 = params.target.reverse_complement();
    let thermo = nearest_neighbor(&params.target, &placeholder1)?;
    let duplex = params.conditions().duplex(thermo, params.target.len());
    let window = params.target_placeholder_window;
    if !window.contains(duplex.corrected) {
        return Err(DesignError::TargetPlaceholderOutOfWindow {
            corrected: duplex.corrected,
            window,
            too_stable: duplex.corrected < window.lower,
        });
    }
    info!("target-placeholder corrected ΔG {:.3} kcal/mol, Tm {:.1} C",
        duplex.corrected, duplex.melting_temperature);
    Ok(TargetPlaceholder { placeholder1, duplex })
}

/// The four strands to synthesize, plus both toeholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalStrands {
    pub target: NucleicSeq,
    pub placeholder: NucleicSeq,
    pub fuel: NucleicSeq,
    pub probe: NucleicSeq,
    pub toehold1: NucleicSeq,
    pub toehold2: NucleicSeq,
}

/// Everything a successful run computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorDesign {
    pub parameters: DesignParameters,
    pub target_placeholder: TargetPlaceholder,
    pub toehold: Toehold1Design,
    pub fuel: FuelDesign,
    pub probe: ProbeDesign,
    pub warnings: Vec<DesignWarning>,
    pub stages: Vec<Stage>,
}

impl SensorDesign {
    pub fn strands(&self) -> FinalStrands {
        FinalStrands {
            target: self.parameters.target.clone(),
            placeholder: self.fuel.final_placeholder.clone(),
            fuel: self.fuel.fuel.clone(),
            probe: self.probe.probe.clone(),
            toehold1: self.toehold.toehold1.clone(),
            toehold2: self.fuel.toehold2.clone(),
        }
    }
}

/// A hard failure, with the stage it happened in and the warnings
/// collected up to that point. No strands are final.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{stage} failed")]
pub struct DesignFailure {
    pub stage: Stage,
    #[source]
    pub error: DesignError,
    pub warnings: Vec<DesignWarning>,
    pub stages: Vec<Stage>,
}

pub struct DesignPipeline<'o, O: ?Sized, R> {
    params: DesignParameters,
    oracle: &'o O,
    rng: R,
    stage: Stage,
    stages: Vec<Stage>,
    warnings: Vec<DesignWarning>,
}

impl<'o, O, R> DesignPipeline<'o, O, R>
where
    O: FoldOracle + ?Sized,
    R: Rng,
{
    pub fn new(params: DesignParameters, oracle: &'o O, rng: R) -> Self {
        DesignPipeline {
            params,
            oracle,
            rng,
            stage: Stage::Init,
            stages: vec![Stage::Init],
            warnings: Vec::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            info!("{} done, entering {next}", self.stage);
            self.stage = next;
            self.stages.push(next);
        }
    }

    fn run_stages(&mut self)
        -> Result<(TargetPlaceholder, Toehold1Design, FuelDesign, ProbeDesign), DesignError>
    {
        self.params.validate()?;
        self.advance();

        let target_placeholder = check_target_placeholder(&self.params)?;
        self.advance();

        let toehold = find_toehold1(&self.params, &target_placeholder.duplex)?;
        self.advance();

        let fuel = find_fuel(&self.params, &toehold, &target_placeholder.duplex,
            self.oracle, &mut self.rng, &mut self.warnings)?;
        self.advance();

        let probe = find_probe_hairpin(&self.params, &fuel.placeholder3,
            self.oracle, &mut self.warnings)?;
        self.advance();

        Ok((target_placeholder, toehold, fuel, probe))
    }

    /// Run every stage. The parameters are validated before any search.
    pub fn run(mut self) -> Result<SensorDesign, DesignFailure> {
        match self.run_stages() {
            Ok((target_placeholder, toehold, fuel, probe)) => Ok(SensorDesign {
                parameters: self.params,
                target_placeholder,
                toehold,
                fuel,
                probe,
                warnings: self.warnings,
                stages: self.stages,
            }),
            Err(error) => {
                let stage = self.stage;
                self.stages.push(Stage::Failed);
                Err(DesignFailure {
                    stage,
                    error,
                    warnings: self.warnings,
                    stages: self.stages,
                })
            }
        }
    }
}

/// Design a sensor for `params` in one call.
pub fn design_sensor<O, R>(
    params: &DesignParameters,
    oracle: &O,
    rng: R,
) -> Result<SensorDesign, DesignFailure>
where
    O: FoldOracle + ?Sized,
    R: Rng,
{
    DesignPipeline::new(params.clone(), oracle, rng).run()
}
