//! Season driver: walks the calendar one day at a time, resolves the
//! day's weather and irrigation, advances the balance step, and reduces
//! the daily log to a seasonal summary.

use super::balance::{self, DayInputs, KsMethod, Regime, StepConfig};
use super::{decision, refet};
use crate::error::{PaddysimError, Result};
use crate::models::parameters::Parameters;
use crate::models::results::{DailyRecord, SeasonRun, SeasonSummary};
use crate::models::rules::{IrrigationEvent, IrrigationRule, IrrigationSchedule};
use crate::models::update::GrowthUpdates;
use crate::models::weather::{DayKey, WeatherSeries};
use chrono::{Days, NaiveDate};
use tracing::{debug, info};

/// A configured simulation, reusable across runs.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: Parameters,
    regime: Regime,
    ks_method: KsMethod,
    runoff: bool,
    cons_p: bool,
    rules: Vec<IrrigationRule>,
    schedule: Option<IrrigationSchedule>,
    updates: GrowthUpdates,
}

impl Simulation {
    pub fn new(params: Parameters, regime: Regime) -> Self {
        Self {
            params,
            regime,
            ks_method: KsMethod::Fao56,
            runoff: false,
            cons_p: false,
            rules: Vec::new(),
            schedule: None,
            updates: GrowthUpdates::new(),
        }
    }

    pub fn ks_method(mut self, method: KsMethod) -> Self {
        self.ks_method = method;
        self
    }

    /// Enable curve-number rainfall runoff.
    pub fn with_runoff(mut self) -> Self {
        self.runoff = true;
        self
    }

    /// Hold the depletion fraction p at its base value instead of
    /// adjusting it with daily ETc.
    pub fn constant_p(mut self) -> Self {
        self.cons_p = true;
        self
    }

    /// Ordered automatic irrigation rules, first match wins.
    pub fn rules(mut self, rules: Vec<IrrigationRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Recorded manual irrigation events.
    pub fn schedule(mut self, schedule: IrrigationSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Measured canopy overrides.
    pub fn updates(mut self, updates: GrowthUpdates) -> Self {
        self.updates = updates;
        self
    }

    /// Run the season over the inclusive date range. A missing weather
    /// date aborts with no partial day appended.
    pub fn run(
        &self,
        weather: &WeatherSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SeasonRun> {
        self.params.validate(self.regime.is_ponded())?;
        if end < start {
            return Err(PaddysimError::Config(format!(
                "end date {end} precedes start date {start}"
            )));
        }

        let cfg = StepConfig {
            params: &self.params,
            regime: self.regime,
            ks_method: self.ks_method,
            runoff: self.runoff,
            cons_p: self.cons_p,
            ref_crop: weather.station.ref_crop,
            wind_height_m: weather.station.wind_height_m,
        };

        let initial = balance::initial_state(&cfg);
        let mut state = initial.clone();
        let mut records: Vec<DailyRecord> = Vec::new();

        let mut date = start;
        let mut day: u32 = 0;
        while date <= end {
            let key = DayKey::from_date(date);
            let rec = weather.get(key)?;
            let etref = refet::resolve_etref(&weather.station, rec, key.doy)?;

            // Manual applications take the day unless an automatic rule
            // fires and replaces them
            let manual = self.schedule.as_ref().and_then(|s| s.get(key)).copied();
            let auto = decision::decide(
                &self.rules,
                date,
                &state,
                &records,
                weather,
                self.schedule.as_ref(),
            )
            .map(|d| IrrigationEvent {
                depth: d.depth,
                fw: d.fw,
                ieff: d.ieff,
            });
            let irrigation = auto.or(manual);
            if let Some(ev) = irrigation {
                debug!(%key, depth = ev.depth, "irrigation applied");
            }

            let inputs = DayInputs {
                etref,
                rain: rec.rain,
                wndsp: rec.wind_speed(),
                rhmin: rec.rh_min(),
                irrigation,
                update: self.updates.get(key).copied(),
            };
            state = balance::advance(&cfg, &state, day, &inputs);
            records.push(DailyRecord {
                key,
                day,
                etref,
                rain: rec.rain,
                state: state.clone(),
            });

            date = date
                .checked_add_days(Days::new(1))
                .expect("date overflow advancing season");
            day += 1;
        }

        let summary = SeasonSummary::from_records(&initial, &records);
        info!(
            days = records.len(),
            etc_adj = summary.etc_adj_sum,
            gross_irrig = summary.gross_irrig,
            "season complete"
        );
        Ok(SeasonRun { records, summary })
    }
}
