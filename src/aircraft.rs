use crate::airport::AirportId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type AircraftId = Arc<str>;
pub type AircraftType = Arc<str>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: AircraftId,
    pub aircraft_type: AircraftType,
    #[serde(default)]
    pub home_base: Option<AirportId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub name: Arc<str>,
    /// Member types in preference order.
    pub types: Vec<AircraftType>,
}

/// Aircraft-type → family lookup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Families(Vec<Family>);

impl Families {
    pub fn new(families: Vec<Family>) -> Families {
        Families(families)
    }

    pub fn family_of(&self, aircraft_type: &str) -> Option<&Family> {
        self.0
            .iter()
            .find(|f| f.types.iter().any(|t| &**t == aircraft_type))
    }

    pub fn is_member(&self, aircraft_type: &str, family: &str) -> bool {
        self.family_of(aircraft_type)
            .map_or(false, |f| &*f.name == family)
    }

    /// Types of the same family, excluding `aircraft_type` itself.
    pub fn siblings(&self, aircraft_type: &str) -> Vec<AircraftType> {
        self.family_of(aircraft_type)
            .map(|f| {
                f.types
                    .iter()
                    .filter(|t| &***t != aircraft_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
