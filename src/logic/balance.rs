//! Daily soil-water-balance step: FAO-56 dual crop coefficient method
//! with an upland single-bucket root zone or a ponded paddy three-pool
//! model (ponding, saturation zone, residual root zone).
//!
//! The advance is a pure function of the previous day's state and the
//! day's inputs; callers own the state and the daily log.

use super::{clamp3, growth};
use crate::models::parameters::Parameters;
use crate::models::rules::IrrigationEvent;
use crate::models::state::DayState;
use crate::models::update::GrowthUpdate;
use crate::models::weather::RefCrop;
use tracing::debug;

/// Field water regime, fixed at run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Classic FAO-56 single-bucket root zone
    Upland,
    /// Bunded paddy with ponded water pools. `puddled` pins the root
    /// depth at its maximum and expects a reduced conductivity from
    /// land preparation.
    Ponded { puddled: bool },
}

impl Regime {
    pub fn is_ponded(&self) -> bool {
        matches!(self, Regime::Ponded { .. })
    }

    pub fn is_puddled(&self) -> bool {
        matches!(self, Regime::Ponded { puddled: true })
    }
}

/// Transpiration stress coefficient formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KsMethod {
    /// FAO-56 Eq. 84, linear between RAW and TAW
    Fao56,
    /// AquaCrop exponential response, shape factor 1.5
    AquaCrop,
}

/// Per-run configuration of the daily step.
#[derive(Debug, Clone)]
pub struct StepConfig<'a> {
    pub params: &'a Parameters,
    pub regime: Regime,
    pub ks_method: KsMethod,
    /// Curve-number rainfall runoff enabled
    pub runoff: bool,
    /// Hold the depletion fraction p at its base value
    pub cons_p: bool,
    pub ref_crop: RefCrop,
    pub wind_height_m: f64,
}

/// One day's external inputs to the balance step.
#[derive(Debug, Clone)]
pub struct DayInputs {
    /// Reference ET (mm)
    pub etref: f64,
    /// Rainfall (mm)
    pub rain: f64,
    /// Wind speed at measurement height (m/s)
    pub wndsp: f64,
    /// Minimum relative humidity (%)
    pub rhmin: f64,
    /// Irrigation applied today, if any
    pub irrigation: Option<IrrigationEvent>,
    /// Measured canopy overrides, if any
    pub update: Option<GrowthUpdate>,
}

/// State at season start, before the first daily step.
pub fn initial_state(cfg: &StepConfig) -> DayState {
    let par = cfg.params;
    let tew = par.tew();
    let taw = 1000.0 * (par.theta_fc - par.theta_wp) * par.zr_ini;
    let dr = 1000.0 * (par.theta_fc - par.theta0) * par.zr_ini;
    let se = clamp3(
        0.0,
        (par.theta0 - par.theta_wp) / (par.theta_s - par.theta_wp),
        1.0,
    );

    let (daw, veff, vp, vs, vr, ds) = if cfg.regime.is_ponded() {
        let daw = 1000.0 * (par.theta_s - par.theta_fc) * par.zr_ini;
        let veff = 1000.0 * (par.theta0 - par.theta_wp) * par.zr_ini;
        let (vp, vs, vr) = partition_pools(veff, daw, taw, par.bundh_mm());
        let ds = (daw - vs).max(0.0);
        (daw, veff, vp, vs, vr, ds)
    } else {
        (0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    };

    DayState {
        t_kcb: par.kcb_ini,
        kcb: par.kcb_ini,
        h: par.h_ini,
        zr: par.zr_ini,
        fc: 0.0,
        kcmax: 0.0,
        kc: 0.0,
        kc_adj: 0.0,
        ke: 0.0,
        kr: 0.0,
        ks: 1.0,
        etc: 0.0,
        etc_adj: 0.0,
        e: 0.0,
        t: 0.0,
        fw: 1.0,
        few: 1.0,
        de: tew,
        dpe: 0.0,
        irrig: 0.0,
        irr_loss: 0.0,
        runoff: 0.0,
        p: par.p_base,
        taw,
        daw,
        raw: 0.0,
        dp: 0.0,
        dr,
        ds,
        f_dr: depletion_fraction(dr, taw),
        f_ds: depletion_fraction(ds, daw),
        veff,
        vp,
        vs,
        vr,
        theta0: par.theta0,
        se,
        k: par.ksat,
    }
}

/// Advance one day. `day` is the 0-based index from the start of the
/// initial crop stage.
pub fn advance(cfg: &StepConfig, prev: &DayState, day: u32, inputs: &DayInputs) -> DayState {
    let par = cfg.params;
    let tew = par.tew();
    let upd = inputs.update.unwrap_or_default();

    // Crop geometry
    let (t_kcb, kcb) = growth::basal_kcb(par, day, prev.t_kcb, prev.kcb, upd.kcb);
    let h = growth::plant_height(par, kcb, prev.h, upd.h);
    let zr = growth::root_depth(par, day, prev.zr, cfg.regime.is_puddled());

    // Upper limit crop coefficient, FAO-56 Eq. 72
    let u2 = inputs.wndsp * (4.87 / (67.8 * cfg.wind_height_m - 5.42).ln());
    let u2 = clamp3(1.0, u2, 6.0);
    let rhmin = clamp3(20.0, inputs.rhmin, 80.0);
    let kcmax = match cfg.ref_crop {
        RefCrop::Short => {
            (1.2 + (0.04 * (u2 - 2.0) - 0.004 * (rhmin - 45.0)) * (h / 3.0).powf(0.3))
                .max(kcb + 0.05)
        }
        RefCrop::Tall => 1.0_f64.max(kcb + 0.05),
    };

    let fc = growth::canopy_fraction(par, kcb, kcmax, h, upd.fc);

    // Surface inputs
    let (idep, in_fw, ieff) = match inputs.irrigation {
        Some(ev) => (ev.depth, Some(ev.fw), ev.ieff),
        None => (0.0, None, 100.0),
    };
    let mut irr_loss = idep * (1.0 - ieff / 100.0);

    // Rain-side runoff: curve number when enabled; under ponding the
    // bund overflow takes its place. Irrigation overflow joins the
    // irrigation losses; same-day rain+irrigation overflow stays
    // unreconciled (known limitation of the formulation).
    let mut rain_runoff = if cfg.runoff {
        cn_runoff(par, prev.de, tew, inputs.rain)
    } else {
        0.0
    };
    let mut irr_overflow = 0.0;
    if cfg.regime.is_ponded() {
        let bundh = par.bundh_mm();
        if idep + prev.vp > bundh {
            irr_overflow = idep + prev.vp - bundh;
            irr_loss += irr_overflow;
        }
        if inputs.rain + prev.vp > bundh {
            rain_runoff = inputs.rain + prev.vp - bundh;
        }
        if irr_overflow > 0.0 || rain_runoff > 0.0 {
            debug!(irr_overflow, rain_runoff, "bund overflow");
        }
    }
    let runoff = rain_runoff + irr_overflow;
    let effirr = (idep - irr_loss).max(0.0);
    let effrain = (inputs.rain - rain_runoff).max(0.0);

    // Wetted fraction carryover, FAO-56 Table 20. An application event
    // fixes the day's wetting pattern even at zero depth; soaking rain
    // rewets the whole surface.
    let fw = match in_fw {
        Some(fw) => fw,
        None if inputs.rain >= 3.0 => 1.0,
        None => prev.fw,
    };

    // Evaporation partition, FAO-56 Eqs. 71-78
    let few = clamp3(0.01, (1.0 - fc).min(fw), 1.0);
    let kr = clamp3(0.0, (tew - prev.de) / (tew - par.rew), 1.0);
    let ke = (kr * (kcmax - kcb)).min(few * kcmax);
    let e = ke * inputs.etref;
    let dpe = clamp3(0.0, effrain + effirr / fw - prev.de, prev.k);
    let de = clamp3(
        0.0,
        prev.de - effrain - effirr / fw + e / few + dpe,
        tew,
    );

    let kc = ke + kcb;
    let etc = kc * inputs.etref;

    // Available water capacities follow the root depth
    let taw = 1000.0 * (par.theta_fc - par.theta_wp) * zr;
    let daw = if cfg.regime.is_ponded() {
        1000.0 * (par.theta_s - par.theta_fc) * zr
    } else {
        0.0
    };

    // Depletion fraction, FAO-56 p. 162 and Table 22
    let p = if cfg.cons_p {
        par.p_base
    } else {
        clamp3(0.1, par.p_base + 0.04 * (5.0 - etc), 0.8)
    };
    let raw = if cfg.regime.is_ponded() { p * daw } else { p * taw };

    // Transpiration stress on yesterday's depletion
    let ks = match cfg.ks_method {
        KsMethod::AquaCrop => {
            let rswd = prev.dr / taw;
            let drel = (rswd - p) / (1.0 - p);
            let sf = 1.5_f64;
            clamp3(0.0, 1.0 - ((sf * drel).exp() - 1.0) / (sf.exp() - 1.0), 1.0)
        }
        KsMethod::Fao56 => clamp3(0.0, (taw - prev.dr) / (taw - raw), 1.0),
    };

    let kc_adj = ks * kcb + ke;
    let etc_adj = kc_adj * inputs.etref;
    let t = ks * kcb * inputs.etref;

    // Water balance
    let (veff, vp, vs, vr, dp, ds, dr) = if cfg.regime.is_ponded() {
        // Percolation lags one day: today's loss is yesterday's DP
        let veff = (prev.veff + effrain + effirr - etc_adj - prev.dp).max(0.0);
        let (vp, vs, vr) = partition_pools(veff, daw, taw, par.bundh_mm());
        let dp = clamp3(0.0, vs, prev.k);
        let ds = (daw - vs).max(0.0);
        let dr = (taw - vr).max(0.0);
        (veff, vp, vs, vr, dp, ds, dr)
    } else {
        // FAO-56 Eqs. 85, 86, 88
        let dp = clamp3(0.0, effrain + effirr - etc_adj - prev.dr, prev.k);
        let dr = clamp3(0.0, prev.dr - effrain - effirr + etc_adj + dp, taw);
        (0.0, 0.0, 0.0, 0.0, dp, 0.0, dr)
    };

    let theta0 = veff / (1000.0 * zr) + par.theta_wp;
    let se = clamp3(
        0.0,
        (theta0 - par.theta_wp) / (par.theta_s - par.theta_wp),
        1.0,
    );

    DayState {
        t_kcb,
        kcb,
        h,
        zr,
        fc,
        kcmax,
        kc,
        kc_adj,
        ke,
        kr,
        ks,
        etc,
        etc_adj,
        e,
        t,
        fw,
        few,
        de,
        dpe,
        irrig: idep,
        irr_loss,
        runoff,
        p,
        taw,
        daw,
        raw,
        dp,
        dr,
        ds,
        f_dr: depletion_fraction(dr, taw),
        f_ds: depletion_fraction(ds, daw),
        veff,
        vp,
        vs,
        vr,
        theta0,
        se,
        k: prev.k,
    }
}

/// Split total stored water into ponding, saturation-zone, and residual
/// pools in strict priority order. Each pool is clamped into
/// [0, capacity], so the sum never exceeds Veff.
pub(crate) fn partition_pools(veff: f64, daw: f64, taw: f64, bundh: f64) -> (f64, f64, f64) {
    let vp = clamp3(0.0, veff - daw - taw, bundh);
    let vs = clamp3(0.0, veff - vp - taw, daw);
    let vr = clamp3(0.0, veff - vp - vs, taw);
    (vp, vs, vr)
}

/// Depletion as a fraction of capacity; zero-capacity pools read as
/// fully wet rather than dividing by zero.
pub(crate) fn depletion_fraction(depletion: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        1.0 - (capacity - depletion) / capacity
    } else {
        0.0
    }
}

/// Curve-number rainfall runoff, ASCE (2016) Eqs. 14-12 to 14-20. The
/// antecedent condition interpolates on the evaporation-layer depletion.
fn cn_runoff(par: &Parameters, de: f64, tew: f64, rain: f64) -> f64 {
    let cn2 = par.cn2;
    let cn1 = cn2 / (2.281 - 0.01281 * cn2);
    let cn3 = cn2 / (0.427 + 0.00573 * cn2);
    let cn = if de <= 0.5 * par.rew {
        cn3
    } else if de >= 0.7 * par.rew + 0.3 * tew {
        cn1
    } else {
        ((de - 0.5 * par.rew) * cn1 + (0.7 * par.rew + 0.3 * tew - de) * cn3)
            / (0.2 * par.rew + 0.3 * tew)
    };
    let storage = 250.0 * (100.0 / cn - 1.0);
    if rain > 0.2 * storage {
        ((rain - 0.2 * storage).powi(2) / (rain + 0.8 * storage)).min(rain)
    } else {
        0.0
    }
}
