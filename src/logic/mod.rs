pub mod balance;
pub mod decision;
pub mod driver;
pub mod growth;
pub mod landprep;
pub mod refet;

pub use balance::{DayInputs, KsMethod, Regime, StepConfig};
pub use decision::IrrigationDecision;
pub use driver::Simulation;
pub use landprep::{LandPrep, LandPrepHandoff};

/// Middle of three values: clamps `x` into `[lo, hi]` when the bounds
/// are ordered, and degrades to the median otherwise instead of
/// panicking on an inverted range.
pub(crate) fn clamp3(lo: f64, x: f64, hi: f64) -> f64 {
    let mut v = [lo, x, hi];
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    v[1]
}
