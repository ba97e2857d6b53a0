//! Greedy tail assignment.
//!
//! Blocks are placed one at a time in ascending start order. Pinned blocks
//! of every type go first, since a pin may sit on a tail of another type;
//! then, per aircraft type, each unpinned block is offered to every tail
//! of its type; tails that cannot take it (turnaround conflict, hard rule)
//! are rejected with a reason, the rest are ranked by the active
//! [`Strategy`].

mod balance;
mod family;
mod priority;
pub mod result;
pub mod state;

#[cfg(test)]
pub(crate) mod tests;

use crate::aircraft::{Aircraft, AircraftId, AircraftType};
use crate::assign::result::{AssignmentResult, RejectionReason, ResultBuilder};
use crate::assign::state::{AircraftState, ChainCheck, Window};
use crate::block::{Block, build_blocks};
use crate::engine::Method;
use crate::rule::{BlockEvaluation, RuleEvaluator};
use crate::scenario::Scenario;
use crate::tat::TatTable;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub use priority::Tier;

/// How feasible tails are ranked against each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Tiered: continuation first, then lowest rule cost, then shortest gap.
    Priority,
    /// Weighted score spreading utilisation across the fleet.
    Balance,
}

impl Strategy {
    pub fn method(self) -> Method {
        match self {
            Strategy::Priority => Method::Minimize,
            Strategy::Balance => Method::Balance,
        }
    }

    /// Index of the winning candidate; ties go to the earlier one.
    pub fn select(self, candidates: &[Candidate]) -> Option<usize> {
        match self {
            Strategy::Priority => priority::select(candidates),
            Strategy::Balance => balance::select(candidates),
        }
    }
}

/// A tail that can legally take the block under consideration.
#[derive(Clone, Debug)]
pub struct Candidate<'a> {
    pub aircraft: &'a Aircraft,
    pub evaluation: BlockEvaluation,
    pub chain: ChainCheck,
    pub continues: bool,
    pub idle: bool,
    /// Minutes since the tail's latest arrival, `None` while idle.
    pub gap: Option<i64>,
    pub assigned_minutes: i64,
    pub assigned_legs: usize,
}

pub(crate) struct RunContext<'a> {
    scenario: &'a Scenario,
    rules: RuleEvaluator<'a>,
    strategy: Strategy,
    states: BTreeMap<AircraftId, AircraftState>,
    results: ResultBuilder,
}

impl<'a> RunContext<'a> {
    fn new(scenario: &'a Scenario, strategy: Strategy) -> RunContext<'a> {
        RunContext {
            scenario,
            rules: scenario.rule_evaluator(),
            strategy,
            states: scenario
                .aircraft
                .iter()
                .map(|a| (a.id.clone(), AircraftState::new(a.id.clone())))
                .collect(),
            results: ResultBuilder::new(),
        }
    }

    fn commit(&mut self, block: &Block, aircraft_id: &AircraftId, window: Window, chain: ChainCheck, evaluation: BlockEvaluation) {
        let state = self
            .states
            .entry(aircraft_id.clone())
            .or_insert_with(|| AircraftState::new(aircraft_id.clone()));
        state.commit(window, block.legs.len());
        chain.into_breaks().for_each(|b| self.results.chain_break(b));
        self.results.assign(block, aircraft_id, evaluation);
    }

    /// Pins are absolute: no feasibility or rule veto, but the window still
    /// blocks the tail and violations are still reported.
    fn place_pinned(&mut self, block: &Block, aircraft_id: &AircraftId, tat: &TatTable) {
        let aircraft = self
            .scenario
            .find_aircraft(aircraft_id)
            .cloned()
            .unwrap_or_else(|| Aircraft {
                id: aircraft_id.clone(),
                aircraft_type: block.aircraft_type.clone(),
                home_base: None,
            });
        let evaluation = self.rules.evaluate_block(&block.legs, &aircraft);
        let window = Window::of(block, &self.scenario.stations);

        let chain = match self.states.get(aircraft_id) {
            Some(state) => {
                if let Some(conflict) = state.find_conflict(&window, tat, self.scenario.config.use_minimum_tat) {
                    warn!(
                        leg = %block.first_leg().id,
                        tail = %aircraft_id,
                        conflicting = %conflict.first_leg,
                        "pinned block conflicts with another pinned block"
                    );
                }
                state.chain(&window)
            }
            None => ChainCheck { previous_break: None, next_break: None },
        };
        debug!(leg = %block.first_leg().id, tail = %aircraft_id, "pinned");
        self.commit(block, aircraft_id, window, chain, evaluation);
    }

    /// Offers the block to `tails`; returns whether a tail took it.
    fn place(&mut self, block: &Block, tails: &[&'a Aircraft], tat: &TatTable) -> bool {
        let window = Window::of(block, &self.scenario.stations);
        let use_minimum = self.scenario.config.use_minimum_tat;

        let mut candidates = Vec::with_capacity(tails.len());
        for aircraft in tails {
            let Some(state) = self.states.get(&aircraft.id) else {
                continue;
            };
            if let Some(conflict) = state.find_conflict(&window, tat, use_minimum) {
                let reason = RejectionReason::Overlap {
                    conflicting_leg: conflict.first_leg.clone(),
                };
                self.results.reject(block, &aircraft.id, reason);
                continue;
            }
            let evaluation = self.rules.evaluate_block(&block.legs, aircraft);
            if !evaluation.allowed {
                let reason = RejectionReason::HardRule {
                    rule_ids: evaluation.hard_rule_ids(),
                };
                self.results.reject(block, &aircraft.id, reason);
                continue;
            }
            candidates.push(Candidate {
                aircraft,
                evaluation,
                chain: state.chain(&window),
                continues: state.continues(&window),
                idle: state.is_idle(),
                gap: state.gap_to(window.start),
                assigned_minutes: state.assigned_minutes,
                assigned_legs: state.assigned_legs,
            });
        }

        let Some(winner) = self.strategy.select(&candidates) else {
            debug!(leg = %block.first_leg().id, "no feasible tail");
            return false;
        };
        for (i, loser) in candidates.iter().enumerate() {
            if i != winner {
                self.results.reject(block, &loser.aircraft.id, RejectionReason::Score);
            }
        }

        let chosen = candidates.swap_remove(winner);
        debug!(
            leg = %block.first_leg().id,
            tail = %chosen.aircraft.id,
            compatible = chosen.chain.is_compatible(),
            "assigned"
        );
        self.commit(block, &chosen.aircraft.id, window, chosen.chain, chosen.evaluation);
        true
    }
}

/// Runs one greedy pass over the scenario.
pub fn assign(scenario: &Scenario, strategy: Strategy) -> AssignmentResult {
    let blocks = build_blocks(&scenario.flights);
    let mut ctx = RunContext::new(scenario, strategy);

    let mut by_type: BTreeMap<AircraftType, Vec<&Block>> = BTreeMap::new();
    for block in &blocks {
        match &block.pinned_aircraft_id {
            Some(aircraft_id) => ctx.place_pinned(block, aircraft_id, &scenario.tat_for(&block.aircraft_type)),
            None => by_type.entry(block.aircraft_type.clone()).or_default().push(block),
        }
    }

    for (aircraft_type, blocks) in &by_type {
        let tat = scenario.tat_for(aircraft_type);
        let tails = scenario.aircraft_of_types(std::slice::from_ref(aircraft_type));

        for block in blocks {
            if !block.is_well_formed() || !ctx.place(block, &tails, &tat) {
                ctx.results.overflow(block);
            }
        }
    }

    if scenario.config.family_substitution && !ctx.results.overflowed().is_empty() {
        family::substitute(&mut ctx);
    }

    let result = ctx.results.finish(strategy.method(), scenario.flights.len(), None);
    info!(
        method = ?result.method,
        total = result.summary.total,
        assigned = result.summary.assigned,
        overflowed = result.summary.overflowed,
        chain_breaks = result.chain_breaks.len(),
        "greedy assignment complete"
    );
    result
}
