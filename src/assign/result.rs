use crate::aircraft::AircraftId;
use crate::airport::AirportId;
use crate::block::Block;
use crate::engine::Method;
use crate::exact::SolveStatus;
use crate::flight::FlightId;
use crate::rule::{BlockEvaluation, Enforcement, RuleId, RuleViolation};
use serde::Serialize;
use std::collections::BTreeMap;

/// Why a tail did not get a block.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    Overlap { conflicting_leg: FlightId },
    HardRule { rule_ids: Vec<RuleId> },
    /// Feasible, but another tail ranked higher.
    Score,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rejection {
    pub aircraft_id: AircraftId,
    pub reason: RejectionReason,
}

/// A placed leg whose neighbour on the same tail is at another station.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainBreak {
    pub aircraft_id: AircraftId,
    pub arriving_leg: FlightId,
    pub departing_leg: FlightId,
    pub arrival_station: AirportId,
    pub departure_station: AirportId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub assigned: usize,
    pub overflowed: usize,
    pub hard_rule_violations: usize,
    pub soft_rule_violations: usize,
    pub total_penalty: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssignmentResult {
    pub method: Method,
    pub assignments: BTreeMap<FlightId, AircraftId>,
    pub overflow: Vec<FlightId>,
    pub chain_breaks: Vec<ChainBreak>,
    pub violations: BTreeMap<FlightId, Vec<RuleViolation>>,
    pub rejections: BTreeMap<FlightId, Vec<Rejection>>,
    pub summary: Summary,
    /// Only set by the exact method.
    pub solver_status: Option<SolveStatus>,
}

/// Collects placements while a run is in progress.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    assignments: BTreeMap<FlightId, AircraftId>,
    overflow: Vec<FlightId>,
    chain_breaks: Vec<ChainBreak>,
    violations: BTreeMap<FlightId, Vec<RuleViolation>>,
    rejections: BTreeMap<FlightId, Vec<Rejection>>,
}

impl ResultBuilder {
    pub fn new() -> ResultBuilder {
        ResultBuilder::default()
    }

    pub fn assign(&mut self, block: &Block, aircraft_id: &AircraftId, evaluation: BlockEvaluation) {
        for id in block.leg_ids() {
            self.assignments.insert(id.clone(), aircraft_id.clone());
        }
        for (leg, violation) in evaluation.violations {
            self.violations.entry(leg).or_default().push(violation);
        }
    }

    pub fn overflow(&mut self, block: &Block) {
        self.overflow.extend(block.leg_ids().cloned());
    }

    pub fn reject(&mut self, block: &Block, aircraft_id: &AircraftId, reason: RejectionReason) {
        for id in block.leg_ids() {
            self.rejections.entry(id.clone()).or_default().push(Rejection {
                aircraft_id: aircraft_id.clone(),
                reason: reason.clone(),
            });
        }
    }

    pub fn chain_break(&mut self, chain_break: ChainBreak) {
        self.chain_breaks.push(chain_break);
    }

    pub fn overflowed(&self) -> &[FlightId] {
        &self.overflow
    }

    /// Takes legs out of the overflow tray, e.g. after a successful retry.
    pub fn retain_overflow(&mut self, keep: impl Fn(&FlightId) -> bool) {
        self.overflow.retain(|id| keep(id));
    }

    pub fn finish(self, method: Method, total: usize, solver_status: Option<SolveStatus>) -> AssignmentResult {
        let all = self.violations.values().flatten();
        let hard_rule_violations = all.clone().filter(|v| v.enforcement == Enforcement::Hard).count();
        let soft_rule_violations = all.clone().filter(|v| v.enforcement == Enforcement::Soft).count();
        let total_penalty = all.map(|v| v.penalty).sum();

        let summary = Summary {
            total,
            assigned: self.assignments.len(),
            overflowed: self.overflow.len(),
            hard_rule_violations,
            soft_rule_violations,
            total_penalty,
        };

        AssignmentResult {
            method,
            assignments: self.assignments,
            overflow: self.overflow,
            chain_breaks: self.chain_breaks,
            violations: self.violations,
            rejections: self.rejections,
            summary,
            solver_status,
        }
    }
}
