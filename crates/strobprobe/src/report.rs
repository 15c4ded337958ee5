//! Design reports.
//!
//! The text report walks through the stages in order and ends with the
//! final sequences. A failed run reports the stage, the thresholds
//! that were used and the last computed value, but no final sequences.
//! The JSON report is the serialized design (or failure summary).
//!

use std::fmt;
use std::fmt::Write;

use itertools::Itertools;
use serde::Serialize;

use sp_design::DesignFailure;
use sp_design::DesignParameters;
use sp_design::DesignWarning;
use sp_design::FinalStrands;
use sp_design::Hairpin;
use sp_design::SensorDesign;
use sp_design::Stage;
use sp_design::Unfolding;
use sp_energy::DuplexEnergy;

const RULE: &str = "--------------------------------------------------------------------------------";

/// Default report file of a design.
pub fn report_file_name(params: &DesignParameters) -> String {
    format!("ProbeDesign_{}.txt", params.design_id)
}

fn parameters(out: &mut String, p: &DesignParameters, seed: u64) -> fmt::Result {
    let rows = [
        ("Design ID", p.design_id.clone()),
        ("Target", format!("{} ({} nt)", p.target, p.target.len())),
        ("Salt (M)", p.salt.to_string()),
        ("Temperature (C)", p.temperature.to_string()),
        ("Target-placeholder window", p.target_placeholder_window.to_string()),
        ("Toehold 1 min length", p.toehold1_min.to_string()),
        ("Placeholder-probe ddG (kcal/mol)", p.probe_ddg_threshold.to_string()),
        ("Neck min length", p.neck_min.to_string()),
        ("Spacer", p.spacer.to_string()),
        ("Fuel loop", p.fuel_loop.to_string()),
        ("Fuel ddG window", p.fuel_ddg_window.to_string()),
        ("Max fuel attempts", p.max_fuel_attempts.to_string()),
        ("Fuel hairpin window", p.hairpins.fuel_window.to_string()),
        ("Probe hairpin window", p.hairpins.probe_window.to_string()),
        ("Random seed", seed.to_string()),
    ];
    writeln!(out, "{RULE}\nDESIGN PARAMETERS\n{RULE}")?;
    writeln!(out, "{}", rows.iter().map(|(k, v)| format!("{k:<34}{v}")).join("\n"))?;
    Ok(())
}

fn thermo(out: &mut String, d: &DuplexEnergy) -> fmt::Result {
    writeln!(out, "- Theoretical thermodynamics (SantaLucia & Hicks, 2004) -")?;
    writeln!(out, "DH - Enthalpy (kcal/mol): {:.4}", d.thermo.enthalpy)?;
    writeln!(out, "DS - Entropy (kcal/Kmol): {:.4}", d.thermo.entropy)?;
    writeln!(out, "DG - Gibbs free energy (kcal/mol): {:.4}", d.thermo.gibbs)?;
    writeln!(out, "- Calculated values ({} nt length correction) -", d.length)?;
    writeln!(out, "Temperature corrected DG (kcal/mol): {:.4}", d.gibbs_at_temperature)?;
    writeln!(out, "Temp & salt corrected DG (kcal/mol): {:.4}", d.corrected)?;
    writeln!(out, "Melting temperature (C): {:.4}", d.melting_temperature)?;
    Ok(())
}

fn hairpin(out: &mut String, name: &str, h: &Hairpin, salt: f64) -> fmt::Result {
    writeln!(out, "{name} hairpin loop of {} elements", h.loop_length)?;
    writeln!(out, "{name} hairpin neck of {} elements: {}", h.neck_length, h.neck)?;
    writeln!(out, "Folded DG (kcal/mol): {:.4}, salt corrected: {:.4}", h.folded_raw, h.folded)?;
    match h.unfolding {
        Unfolding::At { temperature, corrected_dg } => {
            writeln!(out,
                "The {} hairpin opens at {temperature} C in {salt} M monovalent salt (DG {corrected_dg:.3} kcal/mol)",
                name.to_lowercase())?;
        }
        Unfolding::NotFound { ceiling } => {
            writeln!(out, "The {} hairpin does not unfold below {ceiling} C", name.to_lowercase())?;
        }
    }
    Ok(())
}

fn warnings(out: &mut String, warnings: &[DesignWarning]) -> fmt::Result {
    writeln!(out, "{RULE}\nWARNINGS\n{RULE}")?;
    if warnings.is_empty() {
        writeln!(out, "none")?;
    } else {
        writeln!(out, "{}", warnings.iter().map(|w| format!("~ {w}")).join("\n"))?;
    }
    Ok(())
}

fn final_sequences(out: &mut String, s: &FinalStrands) -> fmt::Result {
    writeln!(out, "{RULE}\nFINAL SEQUENCES\n{RULE}")?;
    for (name, seq) in [
        ("Target", &s.target),
        ("Final placeholder", &s.placeholder),
        ("Final fuel", &s.fuel),
        ("Final probe", &s.probe),
        ("Toehold 1", &s.toehold1),
        ("Toehold 2", &s.toehold2),
    ] {
        writeln!(out, "{name}:\n{seq}\nLength of {}: {}\n", name.to_lowercase(), seq.len())?;
    }
    Ok(())
}

/// The text report of a successful design.
pub fn render_design(design: &SensorDesign, seed: u64) -> Result<String, fmt::Error> {
    let p = &design.parameters;
    let mut out = String::new();
    parameters(&mut out, p, seed)?;

    let tp = &design.target_placeholder;
    writeln!(out, "{RULE}\nTARGET - PLACEHOLDER 1\n{RULE}")?;
    writeln!(out, "Placeholder 1: {}", tp.placeholder1)?;
    thermo(&mut out, &tp.duplex)?;
    writeln!(out, "{} <= corrected DG <= {} kcal/mol",
        p.target_placeholder_window.lower, p.target_placeholder_window.upper)?;

    let t = &design.toehold;
    writeln!(out, "{RULE}\nTOEHOLD 1\n{RULE}")?;
    writeln!(out, "Toehold 1 ({} elements): {}", t.toehold1.len(), t.toehold1)?;
    writeln!(out, "Placeholder 2: {}", t.placeholder2)?;
    writeln!(out, "Probe check: {}", t.probe_check)?;
    writeln!(out, "Lengths examined: {}", t.candidates_examined)?;
    thermo(&mut out, &t.duplex)?;
    writeln!(out, "DDG placeholder 2 - probe vs target - placeholder 1: {:.3} > {} kcal/mol",
        t.ddg, p.probe_ddg_threshold)?;

    let f = &design.fuel;
    writeln!(out, "{RULE}\nFUEL\n{RULE}")?;
    writeln!(out, "Toehold 2 ({} elements): {}", f.toehold2.len(), f.toehold2)?;
    writeln!(out, "Found on attempt {} of {}", f.attempts, p.max_fuel_attempts)?;
    writeln!(out, "Bare fuel folded DG (kcal/mol): {:.4}", f.bare_fold)?;
    thermo(&mut out, &f.duplex)?;
    writeln!(out, "{} < DDG fuel - placeholder 3 vs target - placeholder 1 = {:.3} < {} kcal/mol",
        p.fuel_ddg_window.lower, f.ddg, p.fuel_ddg_window.upper)?;
    hairpin(&mut out, "Fuel", &f.hairpin, p.salt)?;

    let pr = &design.probe;
    writeln!(out, "{RULE}\nPROBE HAIRPIN\n{RULE}")?;
    writeln!(out, "Probe check 2: {}", pr.probe_check2)?;
    writeln!(out, "Bare probe folded DG (kcal/mol): {:.4}", pr.bare_fold)?;
    hairpin(&mut out, "Probe", &pr.hairpin, p.salt)?;

    warnings(&mut out, &design.warnings)?;
    final_sequences(&mut out, &design.strands())?;
    Ok(out)
}

/// The text report of a failed design.
pub fn render_failure(
    params: &DesignParameters,
    failure: &DesignFailure,
    seed: u64,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    parameters(&mut out, params, seed)?;
    writeln!(out, "{RULE}\nDESIGN FAILED\n{RULE}")?;
    writeln!(out, "Stage: {}", failure.stage)?;
    writeln!(out, "Completed: {}", failure.stages.iter()
        .filter(|&&s| s != Stage::Failed && s != failure.stage)
        .join(", "))?;
    writeln!(out, "ERROR: {}", failure.error)?;
    warnings(&mut out, &failure.warnings)?;
    Ok(out)
}

#[derive(Debug, Serialize)]
struct FailureSummary<'a> {
    stage: Stage,
    error: String,
    warnings: &'a [DesignWarning],
    stages: &'a [Stage],
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    seed: u64,
    strands: Option<FinalStrands>,
    design: Option<&'a SensorDesign>,
    failure: Option<FailureSummary<'a>>,
}

pub fn design_json(design: &SensorDesign, seed: u64) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        seed,
        strands: Some(design.strands()),
        design: Some(design),
        failure: None,
    })
}

pub fn failure_json(failure: &DesignFailure, seed: u64) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        seed,
        strands: None,
        design: None,
        failure: Some(FailureSummary {
            stage: failure.stage,
            error: failure.error.to_string(),
            warnings: &failure.warnings,
            stages: &failure.stages,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sp_design::DesignError;
    use sp_design::EnergyWindow;
    use sp_design::design_sensor;
    use sp_structure::NucleicSeq;

    use crate::config::parameters_from_csv;

    const SHEET: &str = "id,R1\ntarget,tgatcgatcgatcgatcgatcg\nsalt,1.0\ntemp,25\n\
        max,-40\nmin,-10\nth1,6\nddg,2\nneck,4\nspacer,tttt\nloop,aacaa\nfmax,100\nfmin,-100\n";

    fn melting(_: &NucleicSeq, t: f64) -> f64 {
        -6. + 0.25 * (t - 25.)
    }

    fn params() -> DesignParameters {
        parameters_from_csv(SHEET.as_bytes()).unwrap()
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name(&params()), "ProbeDesign_R1.txt");
    }

    #[test]
    fn test_render_design() {
        let params = params();
        let design = design_sensor(&params, &melting, StdRng::seed_from_u64(3)).unwrap();
        let text = render_design(&design, 3).unwrap();
        for section in ["DESIGN PARAMETERS", "TARGET - PLACEHOLDER 1", "TOEHOLD 1", "FUEL",
            "PROBE HAIRPIN", "WARNINGS", "FINAL SEQUENCES"]
        {
            assert!(text.contains(section), "missing {section}");
        }
        let strands = design.strands();
        assert!(text.contains(&format!("{}\nLength of final probe: {}", strands.probe, strands.probe.len())));
        assert!(text.contains("opens at 46 C"));
        assert!(text.contains("Random seed"));
        // The target-placeholder window is closed.
        assert!(text.contains("-40 <= corrected DG <= -10 kcal/mol"));
    }

    #[test]
    fn test_render_failure() {
        let mut params = params();
        params.fuel_ddg_window = EnergyWindow::new(5., 10.);
        params.max_fuel_attempts = 1;
        let failure = design_sensor(&params, &melting, StdRng::seed_from_u64(3)).unwrap_err();
        assert!(matches!(failure.error, DesignError::FuelSearchExhausted { .. }));
        let text = render_failure(&params, &failure, 3).unwrap();
        assert!(text.contains("Stage: fuel search"));
        assert!(text.contains("[5, 10] kcal/mol"));
        assert!(!text.contains("FINAL SEQUENCES"));
    }

    #[test]
    fn test_json_reports() {
        let params = params();
        let design = design_sensor(&params, &melting, StdRng::seed_from_u64(3)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&design_json(&design, 3).unwrap()).unwrap();
        assert_eq!(v["seed"], 3);
        assert_eq!(v["strands"]["probe"], design.strands().probe.to_string());
        assert!(v["failure"].is_null());

        let mut params = params;
        params.neck_min = 0;
        let failure = design_sensor(&params, &melting, StdRng::seed_from_u64(3)).unwrap_err();
        let v: serde_json::Value = serde_json::from_str(&failure_json(&failure, 3).unwrap()).unwrap();
        assert_eq!(v["failure"]["stage"], "Init");
        assert!(v["design"].is_null());
    }
}
