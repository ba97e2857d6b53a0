use crate::aircraft::{AircraftId, AircraftType};
use crate::airport::AirportId;
use crate::flight::{Flight, FlightId};
use crate::time::Time;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Atomic placement unit: a standalone leg, or every leg of one route
/// operation, in chronological order.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub legs: Vec<Flight>,
    pub aircraft_type: AircraftType,
    pub pinned_aircraft_id: Option<AircraftId>,
    pub start: Time,
    pub end: Time,
    /// First consecutive pair whose times overlap, if any.
    pub ordering_violation: Option<(FlightId, FlightId)>,
}

impl Block {
    fn from_legs(mut legs: Vec<Flight>) -> Block {
        legs.sort_by(|a, b| {
            (a.date, a.departure_minutes, &a.id).cmp(&(b.date, b.departure_minutes, &b.id))
        });
        let first = &legs[0];
        let last = &legs[legs.len() - 1];
        let ordering_violation = legs
            .windows(2)
            .find(|pair| pair[1].departure_time() < pair[0].arrival_time())
            .map(|pair| (pair[0].id.clone(), pair[1].id.clone()));
        Block {
            aircraft_type: first.aircraft_type.clone(),
            pinned_aircraft_id: legs.iter().find_map(|l| l.pinned_aircraft_id.clone()),
            start: first.departure_time(),
            end: last.arrival_time(),
            ordering_violation,
            legs,
        }
    }

    pub fn first_leg(&self) -> &Flight {
        &self.legs[0]
    }

    pub fn last_leg(&self) -> &Flight {
        &self.legs[self.legs.len() - 1]
    }

    pub fn origin_id(&self) -> &AirportId {
        &self.first_leg().origin_id
    }

    pub fn destination_id(&self) -> &AirportId {
        &self.last_leg().destination_id
    }

    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    pub fn leg_ids(&self) -> impl Iterator<Item = &FlightId> {
        self.legs.iter().map(|l| &l.id)
    }

    pub fn is_well_formed(&self) -> bool {
        self.ordering_violation.is_none()
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Route(Arc<str>, NaiveDate),
    Single(usize),
}

/// Groups legs into blocks, ordered by start, end, then first leg id.
pub fn build_blocks<'a>(legs: impl IntoIterator<Item = &'a Flight>) -> Vec<Block> {
    let mut groups: BTreeMap<GroupKey, Vec<Flight>> = BTreeMap::new();
    for (i, leg) in legs.into_iter().enumerate() {
        let key = match &leg.route_id {
            Some(route) => GroupKey::Route(route.clone(), leg.base_date()),
            None => GroupKey::Single(i),
        };
        groups.entry(key).or_default().push(leg.clone());
    }

    let mut blocks: Vec<Block> = groups.into_values().map(Block::from_legs).collect();
    blocks.sort_by(|a, b| {
        (a.start, a.end, &a.first_leg().id).cmp(&(b.start, b.end, &b.first_leg().id))
    });

    blocks
        .iter()
        .filter_map(|b| b.ordering_violation.as_ref())
        .for_each(|(first, second)| {
            warn!(%first, %second, "overlapping legs inside route block, block goes to overflow");
        });
    blocks
}
