//! Daily soil water balance and crop evapotranspiration for rice and
//! upland field crops, following the FAO-56 dual crop coefficient
//! method with a ponded-paddy extension (three-pool storage behind a
//! bund, puddled-layer conductivity, land preparation).
//!
//! The crate is a pure simulation library: callers load a
//! [`WeatherSeries`], configure a [`Simulation`] from a
//! [`Parameters`] set, and receive a day-by-day [`SeasonRun`] log plus
//! seasonal totals. For transplanted rice, [`LandPrep`] simulates the
//! soak-and-puddle window first and hands its terminal soil condition
//! to the main season.
//!
//! ```
//! use chrono::NaiveDate;
//! use paddysim::{Parameters, Regime, Simulation, WeatherSeries};
//!
//! fn season(weather: &WeatherSeries) -> paddysim::Result<()> {
//!     let sim = Simulation::new(Parameters::default(), Regime::Upland);
//!     let start = NaiveDate::from_yo_opt(2018, 152).unwrap();
//!     let end = NaiveDate::from_yo_opt(2018, 181).unwrap();
//!     let run = sim.run(weather, start, end)?;
//!     println!("seasonal ETcadj: {:.1} mm", run.summary.etc_adj_sum);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logic;
pub mod models;

pub use error::{PaddysimError, Result};
pub use logic::balance::{DayInputs, KsMethod, Regime, StepConfig};
pub use logic::decision::IrrigationDecision;
pub use logic::driver::Simulation;
pub use logic::landprep::{LandPrep, LandPrepHandoff, LandPrepRun};
pub use models::{
    DailyRecord, DayKey, DayState, ForecastAction, GrowthUpdate, GrowthUpdates, IrrigationEvent,
    IrrigationRule, IrrigationSchedule, Parameters, RefCrop, SeasonRun, SeasonSummary, Station,
    WeatherRecord, WeatherSeries, WeatherSource,
};
