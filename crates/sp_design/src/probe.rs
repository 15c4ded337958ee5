//! Probe hairpin search.
//!
//! The probe body is the reverse complement of placeholder 3. It is
//! closed on its 5' side by the complement of its own 3' end and gets
//! the spacer in front once a neck is accepted. There is no other body
//! to try, so running out of neck lengths ends the design.
//!

use log::info;
use log::warn;
use serde::Serialize;

use sp_energy::FoldOracle;
use sp_structure::NucleicSeq;

use crate::DesignError;
use crate::DesignParameters;
use crate::DesignWarning;
use crate::Hairpin;
use crate::HairpinKind;
use crate::HairpinTemplate;
use crate::Unfolding;
use crate::find_hairpin;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeDesign {
    /// Reverse complement of placeholder 3.
    pub probe_check2: NucleicSeq,
    pub hairpin: Hairpin,
    /// Spacer, neck complement and body.
    pub probe: NucleicSeq,
    /// Corrected folded ΔG of the bare probe body.
    pub bare_fold: f64,
}

pub fn find_probe_hairpin<O: FoldOracle + ?Sized>(
    params: &DesignParameters,
    placeholder3: &NucleicSeq,
    oracle: &O,
    warnings: &mut Vec<DesignWarning>,
) -> Result<ProbeDesign, DesignError> {
    let conditions = params.conditions();
    let settings = &params.hairpins;
    let probe_check2 = placeholder3.reverse_complement();

    let bare_fold = conditions.corrected_fold(oracle.fold(&probe_check2, conditions.temperature));
    if bare_fold <= settings.probe_structure_warning {
        let w = DesignWarning::SecondaryStructure {
            strand: HairpinKind::Probe,
            corrected_dg: bare_fold,
            threshold: settings.probe_structure_warning,
        };
        warn!("{w}");
        warnings.push(w);
    }

    let template = HairpinTemplate::probe(probe_check2.clone(), params.spacer.clone());
    let hairpin = find_hairpin(&template, settings.probe_window, params.neck_min,
        &conditions, &settings.sweep, oracle)
        .map_err(DesignError::InfeasibleProbe)?;

    if let Unfolding::NotFound { ceiling } = hairpin.unfolding {
        let w = DesignWarning::UnfoldNotFound { strand: HairpinKind::Probe, ceiling };
        warn!("{w}");
        warnings.push(w);
    }
    info!("probe accepted: {} ({} nt)", hairpin.strand, hairpin.strand.len());

    Ok(ProbeDesign {
        probe_check2,
        probe: hairpin.strand.clone(),
        hairpin,
        bare_fold,
    })
}
