use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tabled::Tabled;

pub type AirportId = Arc<str>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Airport {
    pub id: AirportId,
    pub country: Arc<str>,
}

/// Domestic/international class of a leg, used for TAT direction pairs and
/// rule criteria.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Domestic,
    International,
}

impl Classification {
    /// Applied whenever neither the leg nor the station table gives the
    /// class.
    pub const UNKNOWN_DEFAULT: Classification = Classification::Domestic;

    pub fn is_domestic(self) -> bool {
        self == Classification::Domestic
    }
}

/// Station lookup plus the operator's home country.
#[derive(Clone, Debug, Default)]
pub struct Stations {
    airports: HashMap<AirportId, Airport>,
    home_country: Option<Arc<str>>,
}

impl Stations {
    pub fn new(airports: Vec<Airport>, home_country: Option<Arc<str>>) -> Stations {
        Stations {
            airports: airports.into_iter().map(|a| (a.id.clone(), a)).collect(),
            home_country,
        }
    }

    /// Known stations by code.
    pub fn airports(&self) -> Vec<&Airport> {
        let mut airports: Vec<&Airport> = self.airports.values().collect();
        airports.sort_by(|a, b| a.id.cmp(&b.id));
        airports
    }

    pub fn country(&self, id: &AirportId) -> Option<&Arc<str>> {
        self.airports.get(id).map(|a| &a.country)
    }

    fn countries<'a>(&'a self, from: &AirportId, to: &AirportId) -> Option<(&'a Arc<str>, &'a Arc<str>)> {
        self.country(from).zip(self.country(to))
    }

    /// Explicit class wins. With both countries known, a border crossing is
    /// international; a same-country leg is domestic unless a home country is
    /// set and differs. Anything else gets the unknown default.
    pub fn classify(&self, explicit: Option<Classification>, from: &AirportId, to: &AirportId) -> Classification {
        if let Some(class) = explicit {
            return class;
        }
        match (self.countries(from, to), &self.home_country) {
            (Some((a, b)), _) if a != b => Classification::International,
            (Some((a, _)), Some(home)) if a != home => Classification::International,
            (Some(_), _) => Classification::Domestic,
            (None, _) => Classification::UNKNOWN_DEFAULT,
        }
    }

    /// Departure and arrival countries differ.
    pub fn is_cross_border(&self, explicit: Option<Classification>, from: &AirportId, to: &AirportId) -> bool {
        match self.countries(from, to) {
            Some((a, b)) => a != b,
            None => !explicit.unwrap_or(Classification::UNKNOWN_DEFAULT).is_domestic(),
        }
    }

    /// Both stations lie in the operator's home country.
    pub fn is_home_domestic(&self, explicit: Option<Classification>, from: &AirportId, to: &AirportId) -> bool {
        match (self.countries(from, to), &self.home_country) {
            (Some((a, b)), Some(home)) => a == home && b == home,
            _ => explicit.unwrap_or(Classification::UNKNOWN_DEFAULT).is_domestic(),
        }
    }
}
