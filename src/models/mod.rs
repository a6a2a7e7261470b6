pub mod parameters;
pub mod results;
pub mod rules;
pub mod state;
pub mod update;
pub mod weather;

pub use parameters::Parameters;
pub use results::{DailyRecord, SeasonRun, SeasonSummary};
pub use rules::{ForecastAction, IrrigationEvent, IrrigationRule, IrrigationSchedule};
pub use state::DayState;
pub use update::{GrowthUpdate, GrowthUpdates};
pub use weather::{DayKey, RefCrop, Station, WeatherRecord, WeatherSeries, WeatherSource};
