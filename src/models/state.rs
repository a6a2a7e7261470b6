use serde::{Deserialize, Serialize};

/// Complete water-balance state after one daily step.
///
/// A `DayState` is produced by the balance engine as a pure function of
/// the previous day's state and the day's inputs; nothing mutates it
/// afterward. Fields mirror the FAO-56 bookkeeping: crop coefficients,
/// the surface evaporation layer, and the root-zone (plus, for ponded
/// fields, the three-pool partition of stored water).
///
/// All depths are mm, lengths m, coefficients dimensionless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayState {
    // -- Crop geometry --
    /// Tabular basal crop coefficient (before overrides)
    pub t_kcb: f64,
    /// Basal crop coefficient in effect
    pub kcb: f64,
    /// Plant height (m)
    pub h: f64,
    /// Root depth (m)
    pub zr: f64,
    /// Canopy cover fraction
    pub fc: f64,

    // -- Coefficients --
    /// Upper-limit crop coefficient
    pub kcmax: f64,
    /// Crop coefficient Ke + Kcb
    pub kc: f64,
    /// Stress-adjusted crop coefficient Ks*Kcb + Ke
    pub kc_adj: f64,
    /// Evaporation coefficient
    pub ke: f64,
    /// Evaporation reduction coefficient
    pub kr: f64,
    /// Transpiration stress coefficient
    pub ks: f64,

    // -- Evapotranspiration (mm) --
    /// Non-stressed crop ET
    pub etc: f64,
    /// Stress-adjusted crop ET
    pub etc_adj: f64,
    /// Soil evaporation
    pub e: f64,
    /// Crop transpiration
    pub t: f64,

    // -- Surface evaporation layer --
    /// Fraction of soil surface wetted
    pub fw: f64,
    /// Exposed and wetted soil fraction
    pub few: f64,
    /// Cumulative evaporation-layer depletion (mm)
    pub de: f64,
    /// Deep percolation from the evaporation layer (mm)
    pub dpe: f64,

    // -- Surface water components (mm) --
    /// Irrigation depth applied
    pub irrig: f64,
    /// Irrigation losses (inefficiency + bund overflow)
    pub irr_loss: f64,
    /// Surface runoff
    pub runoff: f64,

    // -- Root zone --
    /// Depletion fraction p in effect
    pub p: f64,
    /// Total available water (mm)
    pub taw: f64,
    /// Drainable available water above field capacity (mm), ponded only
    pub daw: f64,
    /// Readily available water (mm)
    pub raw: f64,
    /// Deep percolation below the root zone (mm)
    pub dp: f64,
    /// Root-zone depletion (mm)
    pub dr: f64,
    /// Saturation-zone depletion (mm), ponded only
    pub ds: f64,
    /// Root-zone depletion fraction
    pub f_dr: f64,
    /// Saturation-zone depletion fraction
    pub f_ds: f64,

    // -- Ponded water pools (mm) --
    /// Total effective stored water
    pub veff: f64,
    /// Ponding depth above saturation
    pub vp: f64,
    /// Saturation-zone storage
    pub vs: f64,
    /// Residual root-zone storage
    pub vr: f64,

    // -- Soil hydraulics --
    /// Volumetric water content recomputed from storage
    pub theta0: f64,
    /// Relative saturation
    pub se: f64,
    /// Hydraulic conductivity for the day (mm/day)
    pub k: f64,
}
