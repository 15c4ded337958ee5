//! Hairpin neck search and unfolding sweep.
//!
//! A hairpin is closed by copying the last `k` bases of a body (the
//! neck) as a reverse complement onto one end of the construct. The
//! fuel closes on its 3' side behind a fixed loop, the probe closes on
//! its 5' side and gets a spacer in front once a neck is accepted.
//!
//! Neck lengths are tried in increasing order, each at most once, and
//! the first one whose salt-corrected folded ΔG lies inside the window
//! wins. The sweep then walks up in temperature until the hairpin is
//! about to open.
//!

use log::debug;
use log::info;
use serde::Serialize;

use sp_energy::Conditions;
use sp_energy::FoldOracle;
use sp_structure::NucleicSeq;

use crate::EnergyWindow;
use crate::HairpinSearchExhausted;
use crate::UnfoldSweep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NeckSide {
    /// body + loop + neck*
    ThreePrime,
    /// prefix + neck* + body
    FivePrime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HairpinTemplate {
    body: NucleicSeq,
    loop_seq: NucleicSeq,
    prefix: NucleicSeq,
    side: NeckSide,
}

impl HairpinTemplate {
    /// Fuel layout: body, then the fixed loop, then the neck complement.
    pub fn fuel(body: NucleicSeq, loop_seq: NucleicSeq) -> Self {
        HairpinTemplate {
            body,
            loop_seq,
            prefix: NucleicSeq::default(),
            side: NeckSide::ThreePrime,
        }
    }

    /// Probe layout: neck complement, then the body. The spacer is only
    /// part of the finished strand, not of the neck search.
    pub fn probe(body: NucleicSeq, spacer: NucleicSeq) -> Self {
        HairpinTemplate {
            body,
            loop_seq: NucleicSeq::default(),
            prefix: spacer,
            side: NeckSide::FivePrime,
        }
    }

    /// Longest neck: the neck and its complement may take at most half
    /// of the construct, and the neck must come from the body.
    pub fn max_neck(&self) -> usize {
        ((self.body.len() + self.loop_seq.len()) / 2).min(self.body.len())
    }

    pub fn neck(&self, k: usize) -> NucleicSeq {
        self.body.suffix(k)
    }

    /// The construct the neck search folds.
    pub fn closed(&self, k: usize) -> NucleicSeq {
        let neck_comp = self.neck(k).reverse_complement();
        match self.side {
            NeckSide::ThreePrime => &(&self.body + &self.loop_seq) + &neck_comp,
            NeckSide::FivePrime => &neck_comp + &self.body,
        }
    }

    /// The finished strand, including the prefix.
    pub fn finished(&self, k: usize) -> NucleicSeq {
        &self.prefix + &self.closed(k)
    }
}

/// An accepted neck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeckFit {
    pub neck_length: usize,
    pub neck: NucleicSeq,
    pub construct: NucleicSeq,
    /// Oracle ΔG at the operating temperature.
    pub folded_raw: f64,
    /// Salt-corrected folded ΔG.
    pub folded: f64,
}

/// Smallest neck length in `k_min..=template.max_neck()` whose corrected
/// folded ΔG lies in `window`.
pub fn find_neck<O: FoldOracle + ?Sized>(
    template: &HairpinTemplate,
    window: EnergyWindow,
    k_min: usize,
    conditions: &Conditions,
    oracle: &O,
) -> Result<NeckFit, HairpinSearchExhausted> {
    let max_neck = template.max_neck();
    let mut last_dg = None;
    for k in k_min..=max_neck {
        let construct = template.closed(k);
        let folded_raw = oracle.fold(&construct, conditions.temperature);
        let folded = conditions.corrected_fold(folded_raw);
        debug!("neck {k}: {construct} folds at {folded:.3} kcal/mol");
        last_dg = Some(folded);
        if window.contains(folded) {
            return Ok(NeckFit {
                neck_length: k,
                neck: template.neck(k),
                construct,
                folded_raw,
                folded,
            });
        }
    }
    Err(HairpinSearchExhausted {
        min_neck: k_min,
        max_neck,
        window,
        last_dg,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Unfolding {
    /// The hairpin opens at this temperature (°C).
    At { temperature: f64, corrected_dg: f64 },
    /// The sweep passed its ceiling without finding the opening point.
    NotFound { ceiling: f64 },
}

impl Unfolding {
    pub fn temperature(&self) -> Option<f64> {
        match self {
            Unfolding::At { temperature, .. } => Some(*temperature),
            Unfolding::NotFound { .. } => None,
        }
    }
}

/// Walk up from the operating temperature. Whenever the construct is
/// still folded (ΔG < 0), confirm slightly below: if ΔG there is within
/// the tolerance of zero, that temperature is where the hairpin opens.
/// Every branch is bounded by the ceiling.
pub fn sweep_unfold<O: FoldOracle + ?Sized>(
    construct: &NucleicSeq,
    conditions: &Conditions,
    sweep: &UnfoldSweep,
    oracle: &O,
) -> Unfolding {
    for t in sweep.temperatures(conditions.temperature) {
        let dg = conditions.corrected_fold(oracle.fold(construct, t));
        debug!("sweep {t} C: {dg:.3} kcal/mol");
        if dg < 0. {
            let below = t - sweep.back_off;
            let dg_below = conditions.corrected_fold(oracle.fold(construct, below));
            if dg_below.abs() <= sweep.tolerance {
                return Unfolding::At { temperature: below, corrected_dg: dg_below };
            }
        }
    }
    Unfolding::NotFound { ceiling: sweep.ceiling }
}

/// An accepted hairpin with its finished strand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hairpin {
    pub neck_length: usize,
    pub neck: NucleicSeq,
    pub loop_length: usize,
    pub side: NeckSide,
    /// The strand as it will be synthesized (prefix included).
    pub strand: NucleicSeq,
    pub folded_raw: f64,
    pub folded: f64,
    pub unfolding: Unfolding,
}

/// Neck search followed by the unfolding sweep on the finished strand.
pub fn find_hairpin<O: FoldOracle + ?Sized>(
    template: &HairpinTemplate,
    window: EnergyWindow,
    k_min: usize,
    conditions: &Conditions,
    sweep: &UnfoldSweep,
    oracle: &O,
) -> Result<Hairpin, HairpinSearchExhausted> {
    let fit = find_neck(template, window, k_min, conditions, oracle)?;
    let strand = template.finished(fit.neck_length);
    let unfolding = sweep_unfold(&strand, conditions, sweep, oracle);
    info!("hairpin neck {} ({}), folded {:.3} kcal/mol, opens at {:?} C",
        fit.neck_length, fit.neck, fit.folded, unfolding.temperature());
    Ok(Hairpin {
        neck_length: fit.neck_length,
        neck: fit.neck,
        loop_length: template.loop_seq.len(),
        side: template.side,
        strand,
        folded_raw: fit.folded_raw,
        folded: fit.folded,
        unfolding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use sp_structure::canonicalize;

    fn seq(s: &str) -> NucleicSeq {
        canonicalize(s).unwrap()
    }

    #[test]
    fn test_template_layouts() {
        let fuel = HairpinTemplate::fuel(seq("acgtggca"), seq("ttt"));
        assert_eq!(fuel.neck(3).to_string(), "gca");
        assert_eq!(fuel.closed(3).to_string(), "acgtggcattttgc");
        assert_eq!(fuel.finished(3), fuel.closed(3));
        assert_eq!(fuel.max_neck(), 5);

        let probe = HairpinTemplate::probe(seq("acgtggca"), seq("aa"));
        assert_eq!(probe.closed(3).to_string(), "tgcacgtggca");
        assert_eq!(probe.finished(3).to_string(), "aatgcacgtggca");
        assert_eq!(probe.max_neck(), 4);
    }

    #[test]
    fn test_find_neck_first_in_window() {
        // ΔG falls by one per neck base.
        let tried = RefCell::new(Vec::new());
        let oracle = |s: &NucleicSeq, _t: f64| {
            tried.borrow_mut().push(s.len());
            -((s.len() - 20) as f64)
        };
        let template = HairpinTemplate::fuel(seq("acgtacgtacgtacgtacgt"), NucleicSeq::default());
        let c = Conditions::new(25., 1.0);
        let fit = find_neck(&template, EnergyWindow::new(-6., -4.), 2, &c, &oracle).unwrap();
        assert_eq!(fit.neck_length, 4);
        assert_eq!(fit.folded, -4.);
        assert_eq!(fit.construct.len(), 24);
        // 2, 3, 4: every length once, in order.
        assert_eq!(*tried.borrow(), vec![22, 23, 24]);
    }

    #[test]
    fn test_find_neck_exhausted() {
        let oracle = |_: &NucleicSeq, _: f64| 0.;
        let template = HairpinTemplate::probe(seq("acgtacgtac"), seq("tt"));
        let c = Conditions::new(25., 1.0);
        let e = find_neck(&template, EnergyWindow::new(-7., -5.), 3, &c, &oracle).unwrap_err();
        assert_eq!(e.min_neck, 3);
        assert_eq!(e.max_neck, 5);
        assert_eq!(e.last_dg, Some(0.));
    }

    #[test]
    fn test_find_neck_short_body_never_folds() {
        let calls = RefCell::new(0);
        let oracle = |_: &NucleicSeq, _: f64| {
            *calls.borrow_mut() += 1;
            -6.
        };
        let template = HairpinTemplate::probe(seq("acgtac"), NucleicSeq::default());
        let c = Conditions::new(25., 1.0);
        let e = find_neck(&template, EnergyWindow::new(-7., -5.), 4, &c, &oracle).unwrap_err();
        assert_eq!(e.last_dg, None);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_salt_corrected_window() {
        // 0.5 M adds 0.375 kcal/mol to the oracle value.
        let oracle = |_: &NucleicSeq, _: f64| -5.2;
        let template = HairpinTemplate::probe(seq("acgtacgtacgt"), NucleicSeq::default());
        let c = Conditions::new(25., 0.5);
        assert!(find_neck(&template, EnergyWindow::new(-7., -5.), 3, &c, &oracle).is_err());
        let c = Conditions::new(25., 1.0);
        assert!(find_neck(&template, EnergyWindow::new(-7., -5.), 3, &c, &oracle).is_ok());
    }

    #[test]
    fn test_sweep_unfold() {
        // Linear melting: -6 at 25 C, +0.25 per degree.
        let oracle = |_: &NucleicSeq, t: f64| -6. + 0.25 * (t - 25.);
        let c = Conditions::new(25., 1.0);
        let u = sweep_unfold(&seq("acgt"), &c, &UnfoldSweep::default(), &oracle);
        assert_eq!(u, Unfolding::At { temperature: 46., corrected_dg: -0.75 });
        assert_eq!(u.temperature(), Some(46.));
    }

    #[test]
    fn test_sweep_unfold_ceiling() {
        let temps = RefCell::new(Vec::new());
        let oracle = |_: &NucleicSeq, t: f64| {
            temps.borrow_mut().push(t);
            -20.
        };
        let c = Conditions::new(25., 1.0);
        let u = sweep_unfold(&seq("acgt"), &c, &UnfoldSweep::default(), &oracle);
        assert_eq!(u, Unfolding::NotFound { ceiling: 50. });
        assert_eq!(u.temperature(), None);
        assert!(temps.borrow().iter().all(|&t| t <= 50.));

        // Never folded: stepping only, still bounded.
        let oracle = |_: &NucleicSeq, _: f64| 1.;
        let u = sweep_unfold(&seq("acgt"), &c, &UnfoldSweep::default(), &oracle);
        assert_eq!(u, Unfolding::NotFound { ceiling: 50. });
    }

    #[test]
    fn test_sweep_unfold_vanishing_step() {
        let calls = RefCell::new(0);
        let oracle = |_: &NucleicSeq, _: f64| {
            *calls.borrow_mut() += 1;
            1.
        };
        let c = Conditions::new(25., 1.0);
        let sweep = UnfoldSweep { step: 1e-300, ..UnfoldSweep::default() };
        let u = sweep_unfold(&seq("acgt"), &c, &sweep, &oracle);
        assert_eq!(u, Unfolding::NotFound { ceiling: 50. });
        assert!(*calls.borrow() <= 2301);
    }

    #[test]
    fn test_find_hairpin_sweeps_finished_strand() {
        let swept = RefCell::new(Vec::new());
        let oracle = |s: &NucleicSeq, t: f64| {
            if t > 25. {
                swept.borrow_mut().push(s.to_string());
            }
            -6. + 0.25 * (t - 25.)
        };
        let template = HairpinTemplate::probe(seq("acgtggcaacgt"), seq("ttt"));
        let c = Conditions::new(25., 1.0);
        let hp = find_hairpin(&template, EnergyWindow::new(-7., -5.), 4, &c,
            &UnfoldSweep::default(), &oracle).unwrap();
        assert_eq!(hp.neck_length, 4);
        assert_eq!(hp.neck.to_string(), "acgt");
        assert_eq!(hp.strand.to_string(), "tttacgtacgtggcaacgt");
        assert_eq!(hp.side, NeckSide::FivePrime);
        assert_eq!(hp.loop_length, 0);
        assert_eq!(hp.unfolding.temperature(), Some(46.));
        assert!(swept.borrow().iter().all(|s| s.starts_with("ttt")));
    }
}
