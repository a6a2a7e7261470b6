use crate::error::{PaddysimError, Result};
use serde::{Deserialize, Serialize};

/// Immutable per-run crop, soil, and field parameters (FAO-56 Tables 11,
/// 12, 17, 19, 22; ASCE (2016) Table 14-3 for the curve number).
///
/// Depth-like soil constants are volumetric water contents (cm3/cm3);
/// lengths are meters unless a field says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Kcb for the nursery stage (transplanted rice)
    pub kcb_nrs: f64,
    /// Kc for dry bare soil during land preparation
    pub kc_dry: f64,
    /// Kc for wetted bare soil during land preparation
    pub kc_wet: f64,
    /// Kcb initial
    pub kcb_ini: f64,
    /// Kcb mid-season
    pub kcb_mid: f64,
    /// Kcb end of season
    pub kcb_end: f64,
    /// Nursery stage length (days)
    pub l_nrs: u32,
    /// Land preparation stage length (days)
    pub l_prp: u32,
    /// Initial stage length (days)
    pub l_ini: u32,
    /// Development stage length (days)
    pub l_dev: u32,
    /// Mid-season stage length (days)
    pub l_mid: u32,
    /// Late season stage length (days)
    pub l_end: u32,
    /// Initial plant height (m)
    pub h_ini: f64,
    /// Maximum plant height (m)
    pub h_max: f64,
    /// Water content at field capacity
    pub theta_fc: f64,
    /// Water content at wilting point
    pub theta_wp: f64,
    /// Initial water content
    pub theta0: f64,
    /// Water content at saturation
    pub theta_s: f64,
    /// Residual water content
    pub theta_r: f64,
    /// Saturated hydraulic conductivity (mm/day)
    pub ksat: f64,
    /// Puddle depth (m)
    pub zp: f64,
    /// Initial rooting depth (m)
    pub zr_ini: f64,
    /// Maximum rooting depth (m)
    pub zr_max: f64,
    /// Bund height of the paddy field (m)
    pub bundh: f64,
    /// Target ponding depth during/after puddling (mm)
    pub wd_pud: f64,
    /// Initial ponding depth at transplanting (mm)
    pub wd_ini: f64,
    /// Puddling duration (days)
    pub pud_days: u32,
    /// Base depletion fraction p
    pub p_base: f64,
    /// Depth of the surface evaporation layer (m)
    pub ze: f64,
    /// Readily evaporable water (mm)
    pub rew: f64,
    /// Runoff curve number for AWC II
    pub cn2: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            kcb_nrs: 0.07,
            kc_dry: 0.35,
            kc_wet: 1.10,
            kcb_ini: 0.15,
            kcb_mid: 1.10,
            kcb_end: 0.50,
            l_nrs: 30,
            l_prp: 10,
            l_ini: 25,
            l_dev: 50,
            l_mid: 50,
            l_end: 25,
            h_ini: 0.010,
            h_max: 1.20,
            theta_fc: 0.250,
            theta_wp: 0.100,
            theta0: 0.100,
            theta_s: 0.330,
            theta_r: 0.0971,
            ksat: 42.0,
            zp: 0.4,
            zr_ini: 0.20,
            zr_max: 1.40,
            bundh: 0.0,
            wd_pud: 50.0,
            wd_ini: 50.0,
            pud_days: 5,
            p_base: 0.50,
            ze: 0.10,
            rew: 8.0,
            cn2: 70.0,
        }
    }
}

impl Parameters {
    /// Total evaporable water (mm), FAO-56 Eq. 73.
    pub fn tew(&self) -> f64 {
        1000.0 * (self.theta_fc - 0.50 * self.theta_wp) * self.ze
    }

    /// Bund height in millimeters, the unit the water pools use.
    pub fn bundh_mm(&self) -> f64 {
        self.bundh * 1000.0
    }

    /// Fail-fast precondition checks before a run starts. Zero-capacity
    /// denominators and degenerate stage lengths are configuration errors,
    /// not per-day numeric guards.
    pub fn validate(&self, ponded: bool) -> Result<()> {
        if self.theta_fc <= self.theta_wp {
            return Err(PaddysimError::Config(format!(
                "thetaFC ({}) must exceed thetaWP ({})",
                self.theta_fc, self.theta_wp
            )));
        }
        if ponded && self.theta_s <= self.theta_fc {
            return Err(PaddysimError::Config(format!(
                "thetaS ({}) must exceed thetaFC ({}) for ponded simulations",
                self.theta_s, self.theta_fc
            )));
        }
        if self.l_ini == 0 || self.l_dev == 0 || self.l_mid == 0 || self.l_end == 0 {
            return Err(PaddysimError::Config(
                "all crop stage lengths must be positive".into(),
            ));
        }
        if (self.kcb_mid - self.kcb_ini).abs() < f64::EPSILON {
            return Err(PaddysimError::Config(
                "Kcbmid must differ from Kcbini".into(),
            ));
        }
        if self.zr_ini <= 0.0 || self.zr_max < self.zr_ini {
            return Err(PaddysimError::Config(format!(
                "rooting depths out of order: Zrini={} Zrmax={}",
                self.zr_ini, self.zr_max
            )));
        }
        if self.ksat <= 0.0 {
            return Err(PaddysimError::Config(format!(
                "Ksat must be positive, got {}",
                self.ksat
            )));
        }
        if self.tew() <= self.rew {
            return Err(PaddysimError::Config(format!(
                "TEW ({:.2}) must exceed REW ({:.2})",
                self.tew(),
                self.rew
            )));
        }
        Ok(())
    }

    /// Additional checks for the land preparation engine.
    pub fn validate_landprep(&self) -> Result<()> {
        self.validate(true)?;
        if self.pud_days == 0 {
            return Err(PaddysimError::Config(
                "Puddays must be positive for land preparation".into(),
            ));
        }
        if self.l_prp < self.pud_days {
            return Err(PaddysimError::Config(format!(
                "Lprp ({}) must cover Puddays ({})",
                self.l_prp, self.pud_days
            )));
        }
        if self.zp <= 0.0 {
            return Err(PaddysimError::Config(format!(
                "puddle depth Zp must be positive, got {}",
                self.zp
            )));
        }
        Ok(())
    }
}
