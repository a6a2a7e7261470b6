//! Land preparation for transplanted rice: soaking the dry field,
//! puddling under standing water, and the conductivity collapse that
//! puddling causes. Runs before the cropping season and hands its final
//! soil condition to the main simulation.

use super::{clamp3, refet};
use crate::error::Result;
use crate::logic::balance::{depletion_fraction, partition_pools};
use crate::models::parameters::Parameters;
use crate::models::results::{DailyRecord, SeasonSummary};
use crate::models::state::DayState;
use crate::models::weather::{DayKey, WeatherSeries};
use chrono::{Days, NaiveDate};
use tracing::debug;

/// Terminal soil condition of land preparation, consumed as the initial
/// condition of a puddled main-season run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandPrepHandoff {
    /// Volumetric water content of the puddled layer
    pub theta0: f64,
    /// Standing water at transplanting (mm)
    pub ponding_mm: f64,
    /// Post-puddling hydraulic conductivity (mm/day)
    pub ksat_mm_day: f64,
}

impl LandPrepHandoff {
    /// Parameters for the main run seeded with the prepared-field soil
    /// condition.
    pub fn seed(&self, par: &Parameters) -> Parameters {
        Parameters {
            theta0: self.theta0,
            wd_pud: self.ponding_mm,
            ksat: self.ksat_mm_day,
            ..par.clone()
        }
    }
}

/// A completed land preparation phase.
#[derive(Debug, Clone)]
pub struct LandPrepRun {
    pub records: Vec<DailyRecord>,
    pub summary: SeasonSummary,
    pub handoff: LandPrepHandoff,
}

/// Land preparation engine over a bare, bunded field.
#[derive(Debug)]
pub struct LandPrep<'a> {
    params: &'a Parameters,
    weather: &'a WeatherSeries,
}

impl<'a> LandPrep<'a> {
    pub fn new(params: &'a Parameters, weather: &'a WeatherSeries) -> Self {
        Self { params, weather }
    }

    /// Simulate the preparation window (inclusive). Irrigation is fully
    /// automatic: soak to field deficit before puddling, then hold the
    /// target ponding depth through the puddling days.
    pub fn run(&self, start: NaiveDate, end: NaiveDate) -> Result<LandPrepRun> {
        let par = self.params;
        par.validate_landprep()?;

        let tew = par.tew();
        let bundh = par.bundh_mm();
        let taw = 1000.0 * (par.theta_fc - par.theta_wp) * par.zp;
        let daw = 1000.0 * (par.theta_s - par.theta_fc) * par.zp;
        let lamb = (par.ksat.powf(0.33) / par.ksat).ln() / par.pud_days as f64;

        let mut de = tew;
        let mut dr = 1000.0 * (par.theta_fc - par.theta0) * par.zp;
        let mut veff = 1000.0 * (par.theta0 - par.theta_wp) * par.zp;
        let (mut vp, vs, _vr) = partition_pools(veff, daw, taw, bundh);
        let mut ds = (daw - vs).max(0.0);
        let mut dp = clamp3(0.0, vs + vp, par.ksat);

        let initial = self.day_state(BareSoilDay {
            kcmax: 0.0,
            kr: 1.0,
            k: par.ksat,
            irrig: 0.0,
            e: 0.0,
            de,
            dpe: 0.0,
            veff,
            taw,
            daw,
            dp,
            ds,
            dr,
        });

        let mut records = Vec::new();
        let mut date = start;
        let mut i: u32 = 0;
        while date <= end {
            let key = DayKey::from_date(date);
            let rec = self.weather.get(key)?;
            let etref = refet::resolve_etref(&self.weather.station, rec, key.doy)?;
            let rain = rec.rain;
            let wndsp = rec.wind_speed();
            let rhmin = rec.rh_min();

            // Automatic irrigation: soak, then maintain puddling depth
            let idep = if i < par.l_prp - par.pud_days {
                ds + dr
            } else if vp < par.wd_pud {
                ds + dr + par.wd_pud
            } else {
                0.0
            };
            let effirr = idep;
            let effrain = rain;

            // Conductivity collapses exponentially through puddling
            let k = clamp3(
                par.ksat.powf(0.33),
                par.ksat * (lamb * (i as f64 + 1.0 - par.l_prp as f64 + par.pud_days as f64)).exp(),
                par.ksat,
            );

            // Bare wet soil evaporates at the climatic ceiling
            let u2 = wndsp * (4.87 / (67.8 * self.weather.station.wind_height_m - 5.42).ln());
            let u2 = clamp3(1.0, u2, 6.0);
            let rhmin = clamp3(20.0, rhmin, 80.0);
            let kcmax = 1.2
                + (0.04 * (u2 - 2.0) - 0.004 * (rhmin - 45.0)) * (par.h_ini / 3.0).powf(0.3);
            let kr = if dr == 0.0 {
                1.0
            } else {
                clamp3(0.0, (tew - de) / (tew - par.rew), 1.0)
            };
            let e = kcmax * etref;

            let dpe = clamp3(0.0, effrain + effirr - de, k);
            de = clamp3(0.0, de - effrain - effirr + e + dpe, tew);

            // Percolation lags one day, as in the ponded season balance
            veff = (veff + effrain + effirr - e - dp).max(0.0);
            let (nvp, nvs, nvr) = partition_pools(veff, daw, taw, bundh);
            vp = nvp;
            dp = clamp3(0.0, nvs, k);
            ds = (daw - nvs).max(0.0);
            dr = (taw - nvr).max(0.0);

            let state = self.day_state(BareSoilDay {
                kcmax,
                kr,
                k,
                irrig: idep,
                e,
                de,
                dpe,
                veff,
                taw,
                daw,
                dp,
                ds,
                dr,
            });
            records.push(DailyRecord {
                key,
                day: i,
                etref,
                rain,
                state,
            });

            date = date
                .checked_add_days(Days::new(1))
                .expect("date overflow advancing land preparation");
            i += 1;
        }

        let summary = SeasonSummary::from_records(&initial, &records);
        let last = records.last().map(|r| &r.state).unwrap_or(&initial);
        let handoff = LandPrepHandoff {
            theta0: last.theta0,
            ponding_mm: last.vp,
            ksat_mm_day: last.k,
        };
        debug!(
            theta0 = handoff.theta0,
            ponding_mm = handoff.ponding_mm,
            ksat = handoff.ksat_mm_day,
            "land preparation complete"
        );
        Ok(LandPrepRun {
            records,
            summary,
            handoff,
        })
    }

    /// Bare-soil day state: no crop, evaporation only, so ETc and its
    /// adjusted form both equal the soil evaporation.
    fn day_state(&self, day: BareSoilDay) -> DayState {
        let par = self.params;
        let (vp, vs, vr) = partition_pools(day.veff, day.daw, day.taw, par.bundh_mm());
        let theta0 = day.veff / (1000.0 * par.zp) + par.theta_wp;
        let se = clamp3(
            0.0,
            (theta0 - par.theta_wp) / (par.theta_s - par.theta_wp),
            1.0,
        );
        DayState {
            t_kcb: 0.0,
            kcb: 0.0,
            h: par.h_ini,
            zr: par.zp,
            fc: 0.0,
            kcmax: day.kcmax,
            kc: day.kcmax,
            kc_adj: day.kcmax,
            ke: day.kcmax,
            kr: day.kr,
            ks: 0.0,
            etc: day.e,
            etc_adj: day.e,
            e: day.e,
            t: 0.0,
            fw: 1.0,
            few: 1.0,
            de: day.de,
            dpe: day.dpe,
            irrig: day.irrig,
            irr_loss: 0.0,
            runoff: 0.0,
            p: par.p_base,
            taw: day.taw,
            daw: day.daw,
            raw: 0.0,
            dp: day.dp,
            dr: day.dr,
            ds: day.ds,
            f_dr: depletion_fraction(day.dr, day.taw),
            f_ds: depletion_fraction(day.ds, day.daw),
            veff: day.veff,
            vp,
            vs,
            vr,
            theta0,
            se,
            k: day.k,
        }
    }
}

/// Scratch values for one bare-soil day.
struct BareSoilDay {
    kcmax: f64,
    kr: f64,
    k: f64,
    irrig: f64,
    e: f64,
    de: f64,
    dpe: f64,
    veff: f64,
    taw: f64,
    daw: f64,
    dp: f64,
    ds: f64,
    dr: f64,
}
