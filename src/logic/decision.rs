//! Automatic irrigation: an ordered rule list evaluated each morning
//! against yesterday's water-balance state and the daily log so far.
//! The first rule whose gates all pass supplies the day's application;
//! later rules are not consulted.

use crate::models::results::DailyRecord;
use crate::models::rules::{ForecastAction, IrrigationRule, IrrigationSchedule};
use crate::models::state::DayState;
use crate::models::weather::{DayKey, WeatherSeries};
use chrono::{Days, NaiveDate};
use tracing::debug;

/// A positive decision from the rule list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrigationDecision {
    /// Gross application depth (mm)
    pub depth: f64,
    /// Fraction of soil surface wetted by the method
    pub fw: f64,
    /// Application efficiency (%)
    pub ieff: f64,
}

/// Evaluate the rule list for one day. `state` is the balance state at
/// the end of the previous day; `history` holds every day simulated so
/// far, in order, so days-since gates can count back from today.
pub fn decide(
    rules: &[IrrigationRule],
    today: NaiveDate,
    state: &DayState,
    history: &[DailyRecord],
    weather: &WeatherSeries,
    schedule: Option<&IrrigationSchedule>,
) -> Option<IrrigationDecision> {
    let today_key = DayKey::from_date(today);

    for (idx, rule) in rules.iter().enumerate() {
        if today_key < rule.start || today_key > rule.end {
            continue;
        }

        // Defer to the recorded schedule until its last event has passed
        if rule.alre {
            if let Some(last) = schedule.and_then(|s| s.last_date()) {
                if today_key <= last {
                    continue;
                }
            }
        }

        // Forecast precipitation over the lookahead window; days without
        // a record count as dry
        let mut reduce = 0.0;
        if let Some(fpdep) = rule.fpdep {
            let window = rule.fpday.unwrap_or(0);
            let mut fcrain = 0.0;
            for j in 0..window {
                if let Some(date) = today.checked_add_days(Days::new(j as u64)) {
                    fcrain += weather.rain_on(DayKey::from_date(date)).unwrap_or(0.0);
                }
            }
            if fcrain >= fpdep {
                match rule.fpact {
                    Some(ForecastAction::Proceed) => {}
                    Some(ForecastAction::Reduce) => reduce = fcrain,
                    Some(ForecastAction::Cancel) | None => continue,
                }
            }
        }

        // Depletion and stress gates; an absent threshold never blocks
        if rule.mad_ds.is_some_and(|mad_ds| state.f_ds <= mad_ds) {
            continue;
        }
        if rule.mad.is_some_and(|mad| state.f_dr <= mad) {
            continue;
        }
        if rule.mad_dr.is_some_and(|mad_dr| state.dr >= mad_dr) {
            continue;
        }
        if rule.mad_vp.is_some_and(|mad_vp| state.vp >= mad_vp) {
            continue;
        }
        if rule.ksc.is_some_and(|ksc| state.ks >= ksc) {
            continue;
        }

        // Days since the last irrigation application
        if let Some(min_dsli) = rule.dsli {
            let dsli = days_since(history, |r| r.state.irrig > 0.0);
            if dsli < min_dsli {
                continue;
            }
        }

        // Days since the last watering event (net input over threshold)
        if let Some(min_dsle) = rule.dsle {
            let evnt = rule.event_threshold();
            let dsle = days_since(history, |r| {
                r.state.irrig - r.state.irr_loss + r.rain - r.state.runoff >= evnt
            });
            if dsle < min_dsle {
                continue;
            }
        }

        // Default rate: refill the root zone plus most of the
        // saturation-zone deficit
        let mut rate = (state.dr + state.ds * 0.8 - reduce).max(0.0);

        // Refill toward a target ponding depth when the saturation gate
        // or the ponding ceiling asked for it
        if let Some(wdpth) = rule.wdpth {
            let sat_depleted = rule.mad_ds.is_some_and(|mad_ds| state.f_ds >= mad_ds);
            let pond_low = rule.mad_vp.is_some_and(|mad_vp| state.vp <= mad_vp);
            if sat_depleted || pond_low {
                rate = (state.dr + state.ds + wdpth - reduce).max(0.0);
            }
        }

        // Overrides, strongest last
        if let Some(icon) = rule.icon {
            rate = (icon - reduce).max(0.0);
        }
        if let Some(itdr) = rule.itdr {
            rate = (state.dr - reduce - itdr).max(0.0);
        }
        if let Some(itfdr) = rule.itfdr {
            rate = (state.dr - reduce - state.taw * itfdr).max(0.0);
        }

        debug!(rule = idx, depth = rate, "irrigation rule fired");
        return Some(IrrigationDecision {
            depth: rate,
            fw: rule.fw,
            ieff: rule.ieff,
        });
    }
    None
}

/// Days from the most recent history entry matching `pred` to today.
/// With no match the whole run counts, plus one for the day before it.
fn days_since(history: &[DailyRecord], pred: impl Fn(&DailyRecord) -> bool) -> u32 {
    let today_idx = history.len() as u32;
    history
        .iter()
        .rposition(|r| pred(r))
        .map(|i| today_idx - i as u32)
        .unwrap_or(today_idx + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::balance::{self, KsMethod, Regime, StepConfig};
    use crate::models::parameters::Parameters;
    use crate::models::weather::{RefCrop, Station, WeatherRecord, WeatherSource};

    fn base_state(par: &Parameters) -> DayState {
        let cfg = StepConfig {
            params: par,
            regime: Regime::Ponded { puddled: false },
            ks_method: KsMethod::Fao56,
            runoff: false,
            cons_p: true,
            ref_crop: RefCrop::Short,
            wind_height_m: 2.0,
        };
        balance::initial_state(&cfg)
    }

    fn record(day: u32, irrig: f64, rain: f64, state: &DayState) -> DailyRecord {
        let mut s = state.clone();
        s.irrig = irrig;
        DailyRecord {
            key: DayKey::new(2018, 152 + day as u16),
            day,
            etref: 5.0,
            rain,
            state: s,
        }
    }

    fn date(doy: u32) -> NaiveDate {
        NaiveDate::from_yo_opt(2018, doy).unwrap()
    }

    fn season_rule() -> IrrigationRule {
        IrrigationRule::new(DayKey::new(2018, 152), DayKey::new(2018, 252))
    }

    fn weather_with_rain(doy: u16, rain: f64) -> WeatherSeries {
        let mut w = WeatherSeries::new(Station::default());
        w.insert(
            DayKey::new(2018, doy),
            WeatherRecord {
                srad: None,
                tmax: 34.0,
                tmin: 24.0,
                vapr: None,
                tdew: None,
                rhmax: None,
                rhmin: None,
                wndsp: None,
                rain,
                etref: Some(5.0),
                source: WeatherSource::Predicted,
            },
        );
        w
    }

    #[test]
    fn out_of_range_rule_never_fires() {
        let par = Parameters::default();
        let state = base_state(&par);
        let w = WeatherSeries::default();
        let d = decide(&[season_rule()], date(300), &state, &[], &w, None);
        assert!(d.is_none());
    }

    #[test]
    fn saturation_gate_skips_wet_field() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.f_ds = 0.0; // saturation zone full
        let mut rule = season_rule();
        rule.mad_ds = Some(0.01);
        let w = WeatherSeries::default();
        assert!(decide(&[rule], date(170), &state, &[], &w, None).is_none());
    }

    #[test]
    fn forecast_cancel_skips_before_rain() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 20.0;
        state.f_dr = 0.6;
        let mut rule = season_rule();
        rule.fpdep = Some(10.0);
        rule.fpday = Some(2);
        rule.fpact = Some(ForecastAction::Cancel);
        let w = weather_with_rain(171, 25.0); // tomorrow
        assert!(decide(&[rule.clone()], date(170), &state, &[], &w, None).is_none());
        // same rule proceeds when the window is dry
        let dry = WeatherSeries::default();
        assert!(decide(&[rule], date(170), &state, &[], &dry, None).is_some());
    }

    #[test]
    fn forecast_reduce_lowers_the_rate() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 30.0;
        state.ds = 0.0;
        let mut rule = season_rule();
        rule.fpdep = Some(5.0);
        rule.fpday = Some(1);
        rule.fpact = Some(ForecastAction::Reduce);
        let w = weather_with_rain(170, 12.0); // today's rain is in the window
        let d = decide(&[rule], date(170), &state, &[], &w, None).unwrap();
        assert!((d.depth - 18.0).abs() < 1e-9);
    }

    #[test]
    fn first_matching_rule_wins() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 25.0;
        state.ds = 0.0;
        let mut first = season_rule();
        first.icon = Some(40.0);
        let mut second = season_rule();
        second.icon = Some(99.0);
        let w = WeatherSeries::default();
        let d = decide(&[first, second], date(170), &state, &[], &w, None).unwrap();
        assert_eq!(d.depth, 40.0);
    }

    #[test]
    fn dsli_gate_counts_from_last_application() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 25.0;
        let mut rule = season_rule();
        rule.dsli = Some(5);
        let history = vec![
            record(0, 0.0, 0.0, &state),
            record(1, 70.0, 0.0, &state), // 17 days before "today"
            record(2, 0.0, 0.0, &state),
        ];
        let w = WeatherSeries::default();
        // today is index 3, last irrigation at index 1: dsli = 2 < 5
        assert!(decide(&[rule.clone()], date(170), &state, &history, &w, None).is_none());
        // with no irrigation in the log the gate passes (4 days in)
        let dry_history = vec![
            record(0, 0.0, 0.0, &state),
            record(1, 0.0, 0.0, &state),
            record(2, 0.0, 0.0, &state),
            record(3, 0.0, 0.0, &state),
        ];
        assert!(decide(&[rule], date(170), &state, &dry_history, &w, None).is_some());
    }

    #[test]
    fn dsle_gate_uses_net_water_input() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 25.0;
        let mut rule = season_rule();
        rule.dsle = Some(2);
        // 12 mm of rain yesterday exceeds the 10 mm default event
        let history = vec![record(0, 0.0, 12.0, &state)];
        let w = WeatherSeries::default();
        assert!(decide(&[rule.clone()], date(170), &state, &history, &w, None).is_none());
        // 5 mm is below the event threshold
        let light = vec![record(0, 0.0, 5.0, &state)];
        assert!(decide(&[rule], date(170), &state, &light, &w, None).is_some());
    }

    #[test]
    fn default_rate_refills_root_zone_and_most_of_saturation() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 10.0;
        state.ds = 5.0;
        let w = WeatherSeries::default();
        let d = decide(&[season_rule()], date(170), &state, &[], &w, None).unwrap();
        assert!((d.depth - 14.0).abs() < 1e-9);
    }

    #[test]
    fn ponding_target_extends_the_rate() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 10.0;
        state.ds = 5.0;
        state.vp = 0.0;
        let mut rule = season_rule();
        rule.mad_vp = Some(10.0);
        rule.wdpth = Some(70.0);
        let w = WeatherSeries::default();
        let d = decide(&[rule], date(170), &state, &[], &w, None).unwrap();
        assert!((d.depth - 85.0).abs() < 1e-9);
    }

    #[test]
    fn target_depletion_overrides_default_rate() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 30.0;
        state.ds = 20.0;
        state.taw = 100.0;
        let mut rule = season_rule();
        rule.itdr = Some(12.0);
        let w = WeatherSeries::default();
        let d = decide(&[rule.clone()], date(170), &state, &[], &w, None).unwrap();
        assert!((d.depth - 18.0).abs() < 1e-9);

        rule.itdr = None;
        rule.itfdr = Some(0.1);
        let d = decide(&[rule], date(170), &state, &[], &w, None).unwrap();
        assert!((d.depth - 20.0).abs() < 1e-9);
    }

    #[test]
    fn alre_defers_to_manual_schedule() {
        let par = Parameters::default();
        let mut state = base_state(&par);
        state.dr = 25.0;
        let mut rule = season_rule();
        rule.alre = true;
        let mut schedule = IrrigationSchedule::new();
        schedule.add_event(2018, 180, 70.0, 1.0);
        let w = WeatherSeries::default();
        assert!(decide(&[rule.clone()], date(170), &state, &[], &w, Some(&schedule)).is_none());
        assert!(decide(&[rule], date(181), &state, &[], &w, Some(&schedule)).is_some());
    }
}
