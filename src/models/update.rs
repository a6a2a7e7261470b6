use super::weather::DayKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measured canopy values that override the tabular growth model on a
/// given day. Absent fields leave the modeled value in place.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GrowthUpdate {
    /// Basal crop coefficient
    #[serde(default)]
    pub kcb: Option<f64>,
    /// Plant height (m)
    #[serde(default)]
    pub h: Option<f64>,
    /// Canopy cover fraction
    #[serde(default)]
    pub fc: Option<f64>,
}

/// Date-keyed observed growth overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrowthUpdates {
    updates: BTreeMap<DayKey, GrowthUpdate>,
}

impl GrowthUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: DayKey, update: GrowthUpdate) {
        self.updates.insert(key, update);
    }

    pub fn get(&self, key: DayKey) -> Option<&GrowthUpdate> {
        self.updates.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}
