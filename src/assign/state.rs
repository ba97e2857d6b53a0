use crate::aircraft::AircraftId;
use crate::airport::{AirportId, Classification, Stations};
use crate::assign::result::ChainBreak;
use crate::block::Block;
use crate::flight::FlightId;
use crate::tat::TatTable;
use crate::time::Time;

/// Time span a placed block occupies on a tail.
#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    pub start: Time,
    pub end: Time,
    pub origin_id: AirportId,
    pub destination_id: AirportId,
    pub departure_class: Classification,
    pub arrival_class: Classification,
    pub first_leg: FlightId,
    pub last_leg: FlightId,
}

impl Window {
    pub fn of(block: &Block, stations: &Stations) -> Window {
        let first = block.first_leg();
        let last = block.last_leg();
        Window {
            start: block.start,
            end: block.end,
            origin_id: first.origin_id.clone(),
            destination_id: last.destination_id.clone(),
            departure_class: stations.classify(first.classification, &first.origin_id, &first.destination_id),
            arrival_class: stations.classify(last.classification, &last.origin_id, &last.destination_id),
            first_leg: first.id.clone(),
            last_leg: last.id.clone(),
        }
    }

    /// Both turnaround directions are checked on their own classification
    /// pair.
    pub fn conflicts_with(&self, other: &Window, tat: &TatTable, use_minimum: bool) -> bool {
        let tat_before = tat.resolve(
            other.arrival_class.is_domestic(),
            self.departure_class.is_domestic(),
            use_minimum,
        );
        let tat_after = tat.resolve(
            self.arrival_class.is_domestic(),
            other.departure_class.is_domestic(),
            use_minimum,
        );
        Time::is_overlapping(
            &(self.start, self.end + tat_after),
            &(other.start, other.end + tat_before),
        )
    }
}

/// Station continuity around a candidate window.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainCheck {
    pub previous_break: Option<ChainBreak>,
    pub next_break: Option<ChainBreak>,
}

impl ChainCheck {
    pub fn is_compatible(&self) -> bool {
        self.previous_break.is_none() && self.next_break.is_none()
    }

    pub fn into_breaks(self) -> impl Iterator<Item = ChainBreak> {
        self.previous_break.into_iter().chain(self.next_break)
    }
}

/// Run-scoped bookkeeping for one tail.
#[derive(Clone, Debug)]
pub struct AircraftState {
    pub aircraft_id: AircraftId,
    pub windows: Vec<Window>,
    pub last_arrival: Option<(AirportId, Time)>,
    pub assigned_legs: usize,
    pub assigned_minutes: i64,
}

impl AircraftState {
    pub fn new(aircraft_id: AircraftId) -> AircraftState {
        AircraftState {
            aircraft_id,
            windows: vec![],
            last_arrival: None,
            assigned_legs: 0,
            assigned_minutes: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.windows.is_empty()
    }

    /// First committed window the candidate cannot coexist with.
    pub fn find_conflict(&self, candidate: &Window, tat: &TatTable, use_minimum: bool) -> Option<&Window> {
        self.windows
            .iter()
            .find(|w| candidate.conflicts_with(w, tat, use_minimum))
    }

    pub fn chain(&self, candidate: &Window) -> ChainCheck {
        let previous = self
            .windows
            .iter()
            .filter(|w| w.end <= candidate.start)
            .max_by_key(|w| (w.end, w.start));
        let next = self
            .windows
            .iter()
            .filter(|w| w.start >= candidate.end)
            .min_by_key(|w| (w.start, w.end));

        ChainCheck {
            previous_break: previous
                .filter(|p| p.destination_id != candidate.origin_id)
                .map(|p| ChainBreak {
                    aircraft_id: self.aircraft_id.clone(),
                    arriving_leg: p.last_leg.clone(),
                    departing_leg: candidate.first_leg.clone(),
                    arrival_station: p.destination_id.clone(),
                    departure_station: candidate.origin_id.clone(),
                }),
            next_break: next
                .filter(|n| candidate.destination_id != n.origin_id)
                .map(|n| ChainBreak {
                    aircraft_id: self.aircraft_id.clone(),
                    arriving_leg: candidate.last_leg.clone(),
                    departing_leg: n.first_leg.clone(),
                    arrival_station: candidate.destination_id.clone(),
                    departure_station: n.origin_id.clone(),
                }),
        }
    }

    /// The candidate leaves from where the tail last landed, after it landed.
    pub fn continues(&self, candidate: &Window) -> bool {
        self.last_arrival
            .as_ref()
            .map_or(false, |(station, at)| *station == candidate.origin_id && *at <= candidate.start)
    }

    /// Minutes from the latest arrival to `start`.
    pub fn gap_to(&self, start: Time) -> Option<i64> {
        self.last_arrival.as_ref().map(|(_, at)| start - *at)
    }

    pub fn commit(&mut self, window: Window, legs: usize) {
        if self.last_arrival.as_ref().map_or(true, |(_, at)| window.end > *at) {
            self.last_arrival = Some((window.destination_id.clone(), window.end));
        }
        self.assigned_legs += legs;
        self.assigned_minutes += window.end - window.start;
        self.windows.push(window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tat::DirectionalTat;
    use std::sync::Arc;

    fn window(first: &str, from: &str, to: &str, start: i64, end: i64, class: Classification) -> Window {
        Window {
            start: Time(start),
            end: Time(end),
            origin_id: Arc::from(from),
            destination_id: Arc::from(to),
            departure_class: class,
            arrival_class: class,
            first_leg: Arc::from(first),
            last_leg: Arc::from(first),
        }
    }

    fn dom(first: &str, from: &str, to: &str, start: i64, end: i64) -> Window {
        window(first, from, to, start, end, Classification::Domestic)
    }

    fn tat() -> TatTable {
        TatTable {
            aircraft_type: Arc::from("ABC"),
            minimum: DirectionalTat {
                dom_dom: Some(30),
                dom_int: Some(60),
                int_dom: Some(45),
                int_int: Some(90),
            },
            scheduled: DirectionalTat::default(),
            default_minutes: 40,
        }
    }

    #[test]
    fn test_tat_gap_respected_on_both_sides() {
        let mut state = AircraftState::new(Arc::from("SP-A"));
        state.commit(dom("L1", "KRK", "WAW", 100, 200), 1);

        assert!(state.find_conflict(&dom("L2", "WAW", "KRK", 229, 300), &tat(), true).is_some());
        assert!(state.find_conflict(&dom("L2", "WAW", "KRK", 230, 300), &tat(), true).is_none());
        assert!(state.find_conflict(&dom("L0", "GDN", "KRK", 0, 71), &tat(), true).is_some());
        assert!(state.find_conflict(&dom("L0", "GDN", "KRK", 0, 70), &tat(), true).is_none());
    }

    #[test]
    fn test_tat_direction_is_asymmetric() {
        let mut state = AircraftState::new(Arc::from("SP-A"));
        state.commit(dom("L1", "KRK", "WAW", 100, 200), 1);
        let mut intl = window("L2", "WAW", "BER", 250, 300, Classification::International);
        // dom arrival -> intl departure needs 60
        assert!(state.find_conflict(&intl, &tat(), true).is_some());
        intl.start = Time(260);
        assert!(state.find_conflict(&intl, &tat(), true).is_none());
    }

    #[test]
    fn test_feasibility_checks_every_window() {
        let mut state = AircraftState::new(Arc::from("SP-A"));
        state.commit(dom("L1", "KRK", "WAW", 1000, 1100), 1);
        state.commit(dom("L2", "KRK", "WAW", 100, 200), 1);
        assert!(state.find_conflict(&dom("L3", "WAW", "KRK", 150, 220), &tat(), true).is_some());
    }

    #[test]
    fn test_chain_previous_and_next() {
        let mut state = AircraftState::new(Arc::from("SP-A"));
        state.commit(dom("L1", "KRK", "WAW", 100, 200), 1);
        state.commit(dom("L3", "GDN", "KRK", 600, 700), 1);

        let fits = state.chain(&dom("L2", "WAW", "GDN", 300, 400));
        assert!(fits.is_compatible());

        let broken = state.chain(&dom("L2", "WAW", "WRO", 300, 400));
        assert!(!broken.is_compatible());
        assert!(broken.previous_break.is_none());
        let next = broken.next_break.unwrap();
        assert_eq!(&*next.arrival_station, "WRO");
        assert_eq!(&*next.departure_station, "GDN");
    }

    #[test]
    fn test_commit_tracks_latest_arrival_only() {
        let mut state = AircraftState::new(Arc::from("SP-A"));
        state.commit(dom("L1", "KRK", "WAW", 1000, 1100), 1);
        state.commit(dom("L2", "GDN", "KRK", 100, 200), 1);
        assert_eq!(state.last_arrival, Some((Arc::from("WAW"), Time(1100))));
        assert_eq!(state.assigned_minutes, 200);
        assert_eq!(state.gap_to(Time(1160)), Some(60));
        assert!(state.continues(&dom("L3", "WAW", "KRK", 1160, 1200)));
        assert!(!state.continues(&dom("L3", "KRK", "WAW", 1160, 1200)));
    }
}
