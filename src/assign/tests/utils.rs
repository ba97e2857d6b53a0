use crate::aircraft::Aircraft;
use crate::assign::result::AssignmentResult;
use crate::block::build_blocks;
use crate::config::EngineConfig;
use crate::flight::Flight;
use crate::rule::{AirportCriterion, AirportDirection, Criteria, Enforcement, Rule, RuleAction, RuleScope};
use crate::scenario::Scenario;
use crate::tat::TatTable;
use crate::time::Time;
use chrono::NaiveDate;
use proptest::prelude::Strategy;
use proptest::strategy::Just;
use proptest::test_runner::TestCaseError;
use proptest::{prop_assert, prop_assert_eq, prop_oneof};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const TYPE: &str = "ABC";

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

/// Monday.
pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn add_aircraft(aircraft: &mut Vec<Aircraft>, aircraft_id: &str, aircraft_type: &str) {
    aircraft.push(Aircraft {
        id: id(aircraft_id),
        aircraft_type: id(aircraft_type),
        home_base: None,
    });
}

pub fn add_flight<'a>(
    flights: &'a mut Vec<Flight>,
    flight_id: &str,
    origin_id: &str,
    destination_id: &str,
    departure_minutes: i64,
    arrival_minutes: i64,
) -> &'a mut Flight {
    flights.push(Flight {
        id: id(flight_id),
        origin_id: id(origin_id),
        destination_id: id(destination_id),
        departure_minutes,
        arrival_minutes,
        aircraft_type: id(TYPE),
        date: day(),
        route_id: None,
        pinned_aircraft_id: None,
        day_offset: 0,
        service_type: None,
        classification: None,
    });
    flights.last_mut().unwrap()
}

/// No family substitution, flat 30 minute turnaround for every type.
pub fn config() -> EngineConfig {
    EngineConfig {
        family_substitution: false,
        ..EngineConfig::default()
    }
}

pub fn scenario(aircraft: Vec<Aircraft>, flights: Vec<Flight>) -> Scenario {
    Scenario::new(config(), vec![], aircraft, flights).with_tat(vec![TatTable::flat(id(TYPE), 30)])
}

pub fn hard_rule(rule_id: &str, action: RuleAction, criteria: Criteria) -> Rule {
    Rule {
        id: id(rule_id),
        name: rule_id.to_string(),
        scope: RuleScope::AircraftType(vec![id(TYPE)]),
        criteria,
        action,
        enforcement: Enforcement::Hard,
        penalty_cost: None,
        valid_from: None,
        valid_to: None,
        active: true,
    }
}

pub fn soft_rule(rule_id: &str, action: RuleAction, scope: RuleScope, criteria: Criteria, cost: i64) -> Rule {
    Rule {
        enforcement: Enforcement::Soft,
        penalty_cost: Some(cost),
        scope,
        ..hard_rule(rule_id, action, criteria)
    }
}

pub fn tail_of<'a>(result: &'a AssignmentResult, leg: &str) -> Option<&'a str> {
    result.assignments.get(&id(leg)).map(|t| t.as_ref())
}

/// Blocks sharing a tail are at least `tat` minutes apart, unless both are
/// pinned there.
pub fn overlap_on_tail(scenario: &Scenario, result: &AssignmentResult, tat: i64) -> Option<String> {
    let blocks = build_blocks(&scenario.flights);
    for tail in &scenario.aircraft {
        let spans: Vec<(Time, Time, bool)> = blocks
            .iter()
            .filter(|b| result.assignments.get(&b.first_leg().id) == Some(&tail.id))
            .map(|b| (b.start, b.end, b.pinned_aircraft_id.is_some()))
            .collect();
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                if a.2 && b.2 {
                    continue;
                }
                if b.0 < a.1 + tat && a.0 < b.1 + tat {
                    return Some(format!("\nOverlap on {}: {}..{} vs {}..{} with {}m TAT", tail.id, a.0, a.1, b.0, b.1, tat));
                }
            }
        }
    }
    None
}

/// An unpinned block placed on a roster tail whose hard rules forbid it.
pub fn hard_rule_breach(scenario: &Scenario, result: &AssignmentResult) -> Option<String> {
    let rules = scenario.rule_evaluator();
    for block in build_blocks(&scenario.flights) {
        if block.pinned_aircraft_id.is_some() {
            continue;
        }
        let Some(tail) = result.assignments.get(&block.first_leg().id) else {
            continue;
        };
        let Some(aircraft) = scenario.find_aircraft(tail) else {
            continue;
        };
        let evaluation = rules.evaluate_block(&block.legs, aircraft);
        if !evaluation.allowed {
            return Some(format!(
                "\nBlock {} on {} breaks {:?}",
                block.first_leg().id,
                tail,
                evaluation.hard_rule_ids()
            ));
        }
    }
    None
}

/// Invariants every method must hold on any input.
pub fn check_invariants(scenario: &Scenario, result: &AssignmentResult) -> Result<(), TestCaseError> {
    if let Some(overlap) = overlap_on_tail(scenario, result, 30) {
        prop_assert!(false, "{}", overlap);
    }
    if let Some(breach) = hard_rule_breach(scenario, result) {
        prop_assert!(false, "{}", breach);
    }

    // every leg lands exactly once
    let overflow: BTreeSet<_> = result.overflow.iter().cloned().collect();
    prop_assert_eq!(overflow.len(), result.overflow.len());
    prop_assert_eq!(result.assignments.len() + overflow.len(), scenario.flights.len());
    prop_assert!(result.assignments.keys().all(|leg| !overflow.contains(leg)));

    for block in build_blocks(&scenario.flights) {
        let tails: BTreeSet<_> = block.leg_ids().map(|leg| result.assignments.get(leg)).collect();
        prop_assert_eq!(tails.len(), 1, "block {} split across tails", block.first_leg().id);

        if let Some(pinned) = &block.pinned_aircraft_id {
            for leg in block.leg_ids() {
                prop_assert_eq!(result.assignments.get(leg), Some(pinned));
            }
        } else if !block.is_well_formed() {
            prop_assert!(block.leg_ids().all(|leg| overflow.contains(leg)));
        }
    }
    Ok(())
}

pub fn arb_station() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("KRK"), Just("WAW"), Just("GDN")]
}

pub fn arb_flight() -> impl Strategy<Value = Flight> {
    (
        arb_station(),
        arb_station(),
        0..2000i64,
        20..400i64,
        proptest::option::weighted(0.3, prop_oneof![Just("R1"), Just("R2")]),
        proptest::option::weighted(0.1, prop_oneof![Just("SP-AAA"), Just("SP-BBB")]),
    )
        .prop_map(|(origin, destination, dep, duration, route, pin)| Flight {
            id: id("FL"),
            origin_id: id(origin),
            destination_id: id(destination),
            departure_minutes: dep,
            arrival_minutes: dep + duration,
            aircraft_type: id(TYPE),
            date: day(),
            route_id: route.map(id),
            pinned_aircraft_id: pin.map(id),
            day_offset: 0,
            service_type: None,
            classification: None,
        })
}

/// Flights with unique ids.
pub fn arb_flights(max: usize) -> impl Strategy<Value = Vec<Flight>> {
    proptest::collection::vec(arb_flight(), 1..max).prop_map(|mut flights| {
        for (i, flight) in flights.iter_mut().enumerate() {
            flight.id = id(&format!("FL{i:03}"));
        }
        flights
    })
}

fn arb_criteria() -> impl Strategy<Value = Criteria> {
    prop_oneof![
        (arb_station(), arb_station()).prop_map(|(origin, destination)| Criteria {
            routes: vec![format!("{origin}-{destination}")],
            ..Criteria::default()
        }),
        arb_station().prop_map(|station| Criteria {
            airports: Some(AirportCriterion {
                codes: vec![id(station)],
                direction: AirportDirection::Departure,
            }),
            ..Criteria::default()
        }),
    ]
}

fn arb_hard_rule() -> impl Strategy<Value = Rule> {
    (
        prop_oneof![Just(RuleAction::MustNotFly), Just(RuleAction::CanOnlyFly)],
        prop_oneof![
            Just(RuleScope::AircraftType(vec![id(TYPE)])),
            Just(RuleScope::Registration(vec![id("SP-AAA")])),
            Just(RuleScope::Registration(vec![id("SP-BBB")])),
        ],
        arb_criteria(),
    )
        .prop_map(|(action, scope, criteria)| Rule {
            scope,
            ..hard_rule("HARD", action, criteria)
        })
}

/// Up to two hard rules with distinct ids.
pub fn arb_hard_rules() -> impl Strategy<Value = Vec<Rule>> {
    proptest::collection::vec(arb_hard_rule(), 0..3).prop_map(|mut rules| {
        for (i, rule) in rules.iter_mut().enumerate() {
            rule.id = id(&format!("HARD{i}"));
        }
        rules
    })
}
