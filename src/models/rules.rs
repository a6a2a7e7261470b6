use super::weather::DayKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do when forecast rain over the lookahead window meets the
/// rule's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastAction {
    /// Skip the rule for the day
    Cancel,
    /// Lower the computed rate by the forecast amount
    Reduce,
    /// Irrigate as computed
    Proceed,
}

/// One automatic irrigation rule. Rules are evaluated in list order and
/// the first rule whose gates all pass supplies the day's irrigation;
/// absent thresholds disable the corresponding gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrigationRule {
    /// First day the rule is active
    pub start: DayKey,
    /// Last day the rule is active
    pub end: DayKey,

    /// Only irrigate after the last recorded manual irrigation event
    #[serde(default)]
    pub alre: bool,

    /// Minimum root-zone depletion fraction (fDr) to trigger
    #[serde(default)]
    pub mad: Option<f64>,
    /// Minimum saturation-zone depletion fraction (fDs) to trigger
    #[serde(default)]
    pub mad_ds: Option<f64>,
    /// Ceiling on absolute root-zone depletion Dr (mm)
    #[serde(default)]
    pub mad_dr: Option<f64>,
    /// Ceiling on ponding depth Vp (mm)
    #[serde(default)]
    pub mad_vp: Option<f64>,
    /// Ceiling on the stress coefficient Ks
    #[serde(default)]
    pub ksc: Option<f64>,

    /// Minimum days since the last day with positive irrigation
    #[serde(default)]
    pub dsli: Option<u32>,
    /// Minimum days since the last watering event
    #[serde(default)]
    pub dsle: Option<u32>,
    /// Net water input for a day to count as a watering event (mm)
    #[serde(default)]
    pub evnt: Option<f64>,

    /// Forecast rain threshold (mm) over the lookahead window
    #[serde(default)]
    pub fpdep: Option<f64>,
    /// Forecast lookahead window (days, today inclusive)
    #[serde(default)]
    pub fpday: Option<u32>,
    /// Action when the forecast threshold is met
    #[serde(default)]
    pub fpact: Option<ForecastAction>,

    /// Constant-rate override (mm)
    #[serde(default)]
    pub icon: Option<f64>,
    /// Target absolute residual root-zone depletion (mm)
    #[serde(default)]
    pub itdr: Option<f64>,
    /// Target fractional root-zone depletion (fraction of TAW)
    #[serde(default)]
    pub itfdr: Option<f64>,
    /// Target ponding depth above saturation for refill rates (mm)
    #[serde(default)]
    pub wdpth: Option<f64>,

    /// Fraction of the soil surface wetted by this irrigation method
    #[serde(default = "default_fw")]
    pub fw: f64,
    /// Irrigation application efficiency (%)
    #[serde(default = "default_ieff")]
    pub ieff: f64,
}

fn default_fw() -> f64 {
    1.0
}

fn default_ieff() -> f64 {
    100.0
}

impl IrrigationRule {
    /// A rule active over a date range with every gate disabled.
    pub fn new(start: DayKey, end: DayKey) -> Self {
        Self {
            start,
            end,
            alre: false,
            mad: None,
            mad_ds: None,
            mad_dr: None,
            mad_vp: None,
            ksc: None,
            dsli: None,
            dsle: None,
            evnt: None,
            fpdep: None,
            fpday: None,
            fpact: None,
            icon: None,
            itdr: None,
            itfdr: None,
            wdpth: None,
            fw: default_fw(),
            ieff: default_ieff(),
        }
    }

    /// Watering-event threshold with the collaborator's 10 mm default.
    pub fn event_threshold(&self) -> f64 {
        self.evnt.unwrap_or(10.0)
    }
}

/// A manually recorded irrigation event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IrrigationEvent {
    /// Applied depth (mm)
    pub depth: f64,
    /// Fraction of soil surface wetted
    pub fw: f64,
    /// Application efficiency (%)
    pub ieff: f64,
}

/// Date-keyed manual irrigation schedule, consumed before the automatic
/// rules each day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrrigationSchedule {
    events: BTreeMap<DayKey, IrrigationEvent>,
}

impl IrrigationSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, year: i32, doy: u16, depth: f64, fw: f64) {
        self.events.insert(
            DayKey::new(year, doy),
            IrrigationEvent {
                depth,
                fw,
                ieff: 100.0,
            },
        );
    }

    pub fn add_event_with_efficiency(
        &mut self,
        year: i32,
        doy: u16,
        depth: f64,
        fw: f64,
        ieff: f64,
    ) {
        self.events
            .insert(DayKey::new(year, doy), IrrigationEvent { depth, fw, ieff });
    }

    pub fn get(&self, key: DayKey) -> Option<&IrrigationEvent> {
        self.events.get(&key)
    }

    /// Date of the last scheduled event, used by the `alre` gate.
    pub fn last_date(&self) -> Option<DayKey> {
        self.events.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
