use crate::aircraft::{AircraftId, AircraftType};
use crate::airport::{AirportId, Classification};
use crate::time::{MINUTES_PER_DAY, Time};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type FlightId = Arc<str>;

/// One dated occurrence of a scheduled leg.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: FlightId,
    pub origin_id: AirportId,
    pub destination_id: AirportId,
    /// Minutes from midnight of `date`.
    pub departure_minutes: i64,
    /// Minutes from midnight of `date`, may exceed 1440.
    pub arrival_minutes: i64,
    pub aircraft_type: AircraftType,
    pub date: NaiveDate,
    #[serde(default)]
    pub route_id: Option<Arc<str>>,
    #[serde(default)]
    pub pinned_aircraft_id: Option<AircraftId>,
    /// Day of a multi-day route this leg operates on, 0 for the first.
    #[serde(default)]
    pub day_offset: i64,
    #[serde(default)]
    pub service_type: Option<Arc<str>>,
    #[serde(default)]
    pub classification: Option<Classification>,
}

impl Flight {
    pub fn departure_time(&self) -> Time {
        Time::at(self.date, self.departure_minutes)
    }

    pub fn arrival_time(&self) -> Time {
        let wrap = if self.arrival_minutes < self.departure_minutes {
            MINUTES_PER_DAY
        } else {
            0
        };
        Time::at(self.date, self.arrival_minutes + wrap)
    }

    pub fn duration(&self) -> i64 {
        self.arrival_time() - self.departure_time()
    }

    pub fn is_overnight(&self) -> bool {
        self.arrival_minutes > MINUTES_PER_DAY || self.arrival_minutes < self.departure_minutes
    }

    /// "DEP-ARR" station pair.
    pub fn route(&self) -> String {
        format!("{}-{}", self.origin_id, self.destination_id)
    }

    /// Operating date of the first leg of the route this leg belongs to.
    pub fn base_date(&self) -> NaiveDate {
        self.date - chrono::Duration::days(self.day_offset)
    }
}
