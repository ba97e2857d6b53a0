use crate::aircraft::AircraftType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Turnaround minutes per arriving → departing direction pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalTat {
    pub dom_dom: Option<i64>,
    pub dom_int: Option<i64>,
    pub int_dom: Option<i64>,
    pub int_int: Option<i64>,
}

impl DirectionalTat {
    fn get(&self, arriving_domestic: bool, departing_domestic: bool) -> Option<i64> {
        match (arriving_domestic, departing_domestic) {
            (true, true) => self.dom_dom,
            (true, false) => self.dom_int,
            (false, true) => self.int_dom,
            (false, false) => self.int_int,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TatTable {
    pub aircraft_type: AircraftType,
    #[serde(default)]
    pub minimum: DirectionalTat,
    #[serde(default)]
    pub scheduled: DirectionalTat,
    pub default_minutes: i64,
}

impl TatTable {
    pub fn flat(aircraft_type: AircraftType, default_minutes: i64) -> TatTable {
        TatTable {
            aircraft_type,
            minimum: DirectionalTat::default(),
            scheduled: DirectionalTat::default(),
            default_minutes,
        }
    }

    /// Minimum (if asked for) → scheduled → flat default.
    pub fn resolve(&self, arriving_domestic: bool, departing_domestic: bool, use_minimum: bool) -> i64 {
        use_minimum
            .then(|| self.minimum.get(arriving_domestic, departing_domestic))
            .flatten()
            .or_else(|| self.scheduled.get(arriving_domestic, departing_domestic))
            .unwrap_or(self.default_minutes)
    }
}

/// TAT tables keyed by aircraft type.
#[derive(Clone, Debug, Default)]
pub struct TatCatalog {
    tables: HashMap<AircraftType, TatTable>,
}

impl TatCatalog {
    pub fn new(tables: Vec<TatTable>) -> TatCatalog {
        TatCatalog {
            tables: tables
                .into_iter()
                .map(|t| (t.aircraft_type.clone(), t))
                .collect(),
        }
    }

    pub fn get(&self, aircraft_type: &str) -> Option<&TatTable> {
        self.tables.get(aircraft_type)
    }

    /// Table for the type, or a flat table of `fallback` minutes.
    pub fn table_or_flat(&self, aircraft_type: &AircraftType, fallback: i64) -> TatTable {
        self.get(aircraft_type)
            .cloned()
            .unwrap_or_else(|| TatTable::flat(aircraft_type.clone(), fallback))
    }

    /// First table found walking `types` in order.
    pub fn first_available(&self, types: &[AircraftType]) -> Option<&TatTable> {
        types.iter().find_map(|t| self.get(t))
    }
}
