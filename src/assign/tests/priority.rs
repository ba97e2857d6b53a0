use crate::assign::result::RejectionReason;
use crate::assign::tests::utils::{add_aircraft, add_flight, hard_rule, id, overlap_on_tail, scenario, soft_rule, tail_of};
use crate::assign::{Strategy, assign};
use crate::rule::{Criteria, RuleAction, RuleScope};

#[test]
fn test_perfect_continuation() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");
    add_aircraft(&mut aircraft, "SP-BBB", "ABC");

    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420);
    add_flight(&mut flights, "L2", "WAW", "KRK", 480, 540);

    let result = assign(&scenario(aircraft, flights), Strategy::Priority);

    assert_eq!(tail_of(&result, "L1"), Some("SP-AAA"));
    assert_eq!(tail_of(&result, "L2"), Some("SP-AAA"));
    assert!(result.chain_breaks.is_empty());
    assert!(result.overflow.is_empty());
    assert_eq!(result.rejections[&id("L2")][0].aircraft_id, id("SP-BBB"));
    assert_eq!(result.rejections[&id("L2")][0].reason, RejectionReason::Score);
}

#[test]
fn test_forced_overflow() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");

    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420);
    add_flight(&mut flights, "L2", "WAW", "KRK", 430, 500);

    let result = assign(&scenario(aircraft, flights), Strategy::Priority);

    assert_eq!(tail_of(&result, "L1"), Some("SP-AAA"));
    assert_eq!(result.overflow, vec![id("L2")]);
    assert_eq!(
        result.rejections[&id("L2")][0].reason,
        RejectionReason::Overlap {
            conflicting_leg: id("L1")
        }
    );
    assert_eq!(result.summary.total, 2);
    assert_eq!(result.summary.assigned, 1);
    assert_eq!(result.summary.overflowed, 1);
}

#[test]
fn test_hard_exclusion() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");
    add_aircraft(&mut aircraft, "SP-BBB", "ABC");

    add_flight(&mut flights, "L1", "AAA", "BBB", 360, 420);
    add_flight(&mut flights, "L2", "BBB", "AAA", 480, 540);

    let criteria = Criteria {
        routes: vec!["AAA-BBB".to_string()],
        ..Criteria::default()
    };
    let scenario = scenario(aircraft, flights).with_rules(vec![hard_rule("NO-AAA-BBB", RuleAction::MustNotFly, criteria)]);
    let result = assign(&scenario, Strategy::Priority);

    assert_eq!(result.overflow, vec![id("L1")]);
    assert_eq!(tail_of(&result, "L2"), Some("SP-AAA"));
    let rejections = &result.rejections[&id("L1")];
    assert_eq!(rejections.len(), 2);
    for rejection in rejections {
        assert_eq!(
            rejection.reason,
            RejectionReason::HardRule {
                rule_ids: vec![id("NO-AAA-BBB")]
            }
        );
    }
    assert_eq!(result.summary.hard_rule_violations, 0);
}

#[test]
fn test_pinned_leg_overrides_rules_and_blocks_tail() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");
    add_aircraft(&mut aircraft, "SP-BBB", "ABC");

    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420).pinned_aircraft_id = Some(id("SP-BBB"));
    add_flight(&mut flights, "L2", "KRK", "GDN", 380, 440);

    let criteria = Criteria {
        routes: vec!["KRK-WAW".to_string()],
        ..Criteria::default()
    };
    let scenario = scenario(aircraft, flights).with_rules(vec![hard_rule("NO-WAW", RuleAction::MustNotFly, criteria)]);
    let result = assign(&scenario, Strategy::Priority);

    assert_eq!(tail_of(&result, "L1"), Some("SP-BBB"));
    assert_eq!(tail_of(&result, "L2"), Some("SP-AAA"));
    assert_eq!(result.violations[&id("L1")][0].rule_id, id("NO-WAW"));
    assert_eq!(result.summary.hard_rule_violations, 1);
    assert!(
        result.rejections[&id("L2")]
            .iter()
            .any(|r| r.aircraft_id == id("SP-BBB") && matches!(r.reason, RejectionReason::Overlap { .. }))
    );
}

#[test]
fn test_pin_to_unknown_tail_is_honoured() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");
    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420).pinned_aircraft_id = Some(id("SP-ZZZ"));

    let result = assign(&scenario(aircraft, flights), Strategy::Priority);

    assert_eq!(tail_of(&result, "L1"), Some("SP-ZZZ"));
}

#[test]
fn test_route_block_moves_as_a_whole() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");
    add_aircraft(&mut aircraft, "SP-BBB", "ABC");

    add_flight(&mut flights, "L0", "GDN", "WAW", 480, 540).pinned_aircraft_id = Some(id("SP-AAA"));
    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420).route_id = Some(id("R1"));
    add_flight(&mut flights, "L2", "WAW", "KRK", 460, 520).route_id = Some(id("R1"));

    let result = assign(&scenario(aircraft, flights), Strategy::Priority);

    assert_eq!(tail_of(&result, "L1"), Some("SP-BBB"));
    assert_eq!(tail_of(&result, "L2"), Some("SP-BBB"));
    assert_eq!(tail_of(&result, "L0"), Some("SP-AAA"));
}

#[test]
fn test_overlapping_route_legs_overflow() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");

    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420).route_id = Some(id("R1"));
    add_flight(&mut flights, "L2", "WAW", "KRK", 400, 460).route_id = Some(id("R1"));

    let result = assign(&scenario(aircraft, flights), Strategy::Priority);

    assert!(result.assignments.is_empty());
    assert_eq!(result.overflow, vec![id("L1"), id("L2")]);
}

#[test]
fn test_soft_cost_breaks_ties() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");
    add_aircraft(&mut aircraft, "SP-BBB", "ABC");

    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420);

    let avoid = soft_rule(
        "AVOID-A",
        RuleAction::ShouldAvoid,
        RuleScope::Registration(vec![id("SP-AAA")]),
        Criteria::default(),
        500,
    );
    let result = assign(&scenario(aircraft, flights).with_rules(vec![avoid]), Strategy::Priority);

    assert_eq!(tail_of(&result, "L1"), Some("SP-BBB"));
    assert!(result.violations.is_empty());
    assert_eq!(result.summary.total_penalty, 0);
}

#[test]
fn test_continuation_beats_soft_cost() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");
    add_aircraft(&mut aircraft, "SP-BBB", "ABC");

    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420).pinned_aircraft_id = Some(id("SP-AAA"));
    add_flight(&mut flights, "L2", "WAW", "KRK", 480, 540);

    let avoid = soft_rule(
        "AVOID-A",
        RuleAction::ShouldAvoid,
        RuleScope::Registration(vec![id("SP-AAA")]),
        Criteria::default(),
        500,
    );
    let result = assign(&scenario(aircraft, flights).with_rules(vec![avoid]), Strategy::Priority);

    assert_eq!(tail_of(&result, "L2"), Some("SP-AAA"));
    assert_eq!(result.summary.soft_rule_violations, 2);
    assert_eq!(result.summary.total_penalty, 1000);
}

#[test]
fn test_chain_break_is_reported() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");

    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420);
    add_flight(&mut flights, "L2", "GDN", "KRK", 600, 660);

    let result = assign(&scenario(aircraft, flights), Strategy::Priority);

    assert_eq!(result.summary.assigned, 2);
    assert_eq!(result.chain_breaks.len(), 1);
    let chain_break = &result.chain_breaks[0];
    assert_eq!(chain_break.arriving_leg, id("L1"));
    assert_eq!(chain_break.departing_leg, id("L2"));
    assert_eq!(chain_break.arrival_station, id("WAW"));
    assert_eq!(chain_break.departure_station, id("GDN"));
}

#[test]
fn test_repeated_runs_are_identical() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-BBB", "ABC");
    add_aircraft(&mut aircraft, "SP-AAA", "ABC");

    add_flight(&mut flights, "L3", "WAW", "KRK", 480, 540);
    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420);
    add_flight(&mut flights, "L2", "KRK", "GDN", 370, 430);
    add_flight(&mut flights, "L4", "GDN", "KRK", 470, 530);

    let scenario = scenario(aircraft, flights);
    let first = assign(&scenario, Strategy::Priority);
    let second = assign(&scenario, Strategy::Priority);

    assert_eq!(first, second);
    assert_eq!(tail_of(&first, "L1"), Some("SP-AAA"));
    assert_eq!(tail_of(&first, "L3"), Some("SP-AAA"));
    assert_eq!(tail_of(&first, "L2"), Some("SP-BBB"));
    assert_eq!(tail_of(&first, "L4"), Some("SP-BBB"));
}

#[test]
fn test_pin_on_tail_of_other_type_blocks_it() {
    let mut aircraft = Vec::new();
    let mut flights = Vec::new();

    add_aircraft(&mut aircraft, "SP-AAA", "ABC");

    add_flight(&mut flights, "L1", "KRK", "WAW", 360, 420);
    let pinned = add_flight(&mut flights, "L2", "KRK", "GDN", 370, 430);
    pinned.aircraft_type = id("XYZ");
    pinned.pinned_aircraft_id = Some(id("SP-AAA"));

    let scenario = scenario(aircraft, flights);
    for strategy in [Strategy::Priority, Strategy::Balance] {
        let result = assign(&scenario, strategy);

        assert_eq!(tail_of(&result, "L2"), Some("SP-AAA"));
        assert_eq!(result.overflow, vec![id("L1")]);
        assert_eq!(
            result.rejections[&id("L1")][0].reason,
            RejectionReason::Overlap {
                conflicting_leg: id("L2")
            }
        );
        assert_eq!(overlap_on_tail(&scenario, &result, 30), None);
    }
}
