use crate::aircraft::{Aircraft, Families};
use crate::airport::{AirportId, Stations};
use crate::config::EngineConfig;
use crate::flight::{Flight, FlightId};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type RuleId = Arc<str>;

/// Which tails a rule applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum RuleScope {
    All,
    AircraftType(Vec<Arc<str>>),
    Family(Vec<Arc<str>>),
    Registration(Vec<Arc<str>>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportDirection {
    Departure,
    Arrival,
    #[default]
    Either,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirportCriterion {
    pub codes: Vec<AirportId>,
    #[serde(default)]
    pub direction: AirportDirection,
}

/// Minutes-of-day window on the departure; wraps past midnight when
/// `from > to`. Both bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepartureWindow {
    pub from: i64,
    pub to: i64,
}

impl DepartureWindow {
    fn contains(&self, minute: i64) -> bool {
        if self.from <= self.to {
            minute >= self.from && minute <= self.to
        } else {
            minute >= self.from || minute <= self.to
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "=")]
    Eq,
}

impl Comparison {
    fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationCriterion {
    pub op: Comparison,
    pub minutes: i64,
}

/// Leg predicates; every criterion present must hold, an empty set matches
/// every leg.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub airports: Option<AirportCriterion>,
    pub routes: Vec<String>,
    pub international: bool,
    pub domestic: bool,
    pub service_types: Vec<Arc<str>>,
    pub departure_window: Option<DepartureWindow>,
    pub block_duration: Option<DurationCriterion>,
    pub overnight: bool,
    /// ISO weekdays, Monday = 1.
    pub days_of_week: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    MustFly,
    ShouldFly,
    MustNotFly,
    ShouldAvoid,
    CanOnlyFly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    Hard,
    Soft,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    #[serde(default)]
    pub name: String,
    pub scope: RuleScope,
    #[serde(default)]
    pub criteria: Criteria,
    pub action: RuleAction,
    pub enforcement: Enforcement,
    #[serde(default)]
    pub penalty_cost: Option<i64>,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Rule {
    fn is_live_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.valid_from.map_or(true, |from| date >= from)
            && self.valid_to.map_or(true, |to| date <= to)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleViolation {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub enforcement: Enforcement,
    /// Zero for hard rules.
    pub penalty: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuleEvaluation {
    pub allowed: bool,
    pub violations: Vec<RuleViolation>,
    pub total_soft_penalty: i64,
}

/// Aggregate over every leg of a block placed on one tail.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct BlockEvaluation {
    pub allowed: bool,
    pub violations: Vec<(FlightId, RuleViolation)>,
    pub soft_penalty: i64,
    pub bonus: i64,
}

impl BlockEvaluation {
    pub fn net_cost(&self) -> i64 {
        self.soft_penalty - self.bonus
    }

    pub fn hard_rule_ids(&self) -> Vec<RuleId> {
        let mut ids: Vec<RuleId> = self
            .violations
            .iter()
            .filter(|(_, v)| v.enforcement == Enforcement::Hard)
            .map(|(_, v)| v.rule_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

pub struct RuleEvaluator<'a> {
    rules: &'a [Rule],
    stations: &'a Stations,
    families: &'a Families,
    default_soft_penalty: i64,
    must_fly_bonus: i64,
}

impl<'a> RuleEvaluator<'a> {
    pub fn new(rules: &'a [Rule], stations: &'a Stations, families: &'a Families, config: &EngineConfig) -> Self {
        RuleEvaluator {
            rules,
            stations,
            families,
            default_soft_penalty: config.default_soft_penalty,
            must_fly_bonus: config.must_fly_bonus,
        }
    }

    fn cost_of(&self, rule: &Rule) -> i64 {
        rule.penalty_cost.unwrap_or(self.default_soft_penalty)
    }

    fn applicable<'r>(&'r self, leg: &'r Flight, aircraft: &'r Aircraft) -> impl Iterator<Item = &'a Rule> + 'r {
        self.rules
            .iter()
            .filter(move |r| r.is_live_on(leg.date) && self.scope_matches(&r.scope, aircraft))
    }

    fn scope_matches(&self, scope: &RuleScope, aircraft: &Aircraft) -> bool {
        match scope {
            RuleScope::All => true,
            RuleScope::AircraftType(types) => types.iter().any(|t| *t == aircraft.aircraft_type),
            RuleScope::Family(families) => families
                .iter()
                .any(|f| self.families.is_member(&aircraft.aircraft_type, f)),
            RuleScope::Registration(ids) => ids.iter().any(|id| *id == aircraft.id),
        }
    }

    pub fn criteria_match(&self, criteria: &Criteria, leg: &Flight) -> bool {
        if let Some(airports) = &criteria.airports {
            let dep = airports.codes.contains(&leg.origin_id);
            let arr = airports.codes.contains(&leg.destination_id);
            let hit = match airports.direction {
                AirportDirection::Departure => dep,
                AirportDirection::Arrival => arr,
                AirportDirection::Either => dep || arr,
            };
            if !hit {
                return false;
            }
        }
        if !criteria.routes.is_empty() && !criteria.routes.contains(&leg.route()) {
            return false;
        }
        if criteria.international
            && !self
                .stations
                .is_cross_border(leg.classification, &leg.origin_id, &leg.destination_id)
        {
            return false;
        }
        if criteria.domestic
            && !self
                .stations
                .is_home_domestic(leg.classification, &leg.origin_id, &leg.destination_id)
        {
            return false;
        }
        if !criteria.service_types.is_empty()
            && !leg
                .service_type
                .as_ref()
                .map_or(false, |s| criteria.service_types.contains(s))
        {
            return false;
        }
        if let Some(window) = &criteria.departure_window {
            if !window.contains(leg.departure_minutes.rem_euclid(1440)) {
                return false;
            }
        }
        if let Some(duration) = &criteria.block_duration {
            if !duration.op.holds(leg.duration(), duration.minutes) {
                return false;
            }
        }
        if criteria.overnight && !leg.is_overnight() {
            return false;
        }
        if !criteria.days_of_week.is_empty()
            && !criteria
                .days_of_week
                .contains(&leg.date.weekday().number_from_monday())
        {
            return false;
        }
        true
    }

    /// Hard/soft verdict for placing `leg` on `aircraft`.
    pub fn evaluate(&self, leg: &Flight, aircraft: &Aircraft) -> RuleEvaluation {
        let mut evaluation = RuleEvaluation {
            allowed: true,
            violations: vec![],
            total_soft_penalty: 0,
        };
        for rule in self.applicable(leg, aircraft) {
            let matches = self.criteria_match(&rule.criteria, leg);
            let violated = match rule.action {
                RuleAction::MustNotFly | RuleAction::ShouldAvoid => matches,
                RuleAction::CanOnlyFly => !matches,
                RuleAction::MustFly | RuleAction::ShouldFly => false,
            };
            if !violated {
                continue;
            }
            let penalty = match rule.enforcement {
                Enforcement::Hard => {
                    evaluation.allowed = false;
                    0
                }
                Enforcement::Soft => {
                    let cost = self.cost_of(rule);
                    evaluation.total_soft_penalty += cost;
                    cost
                }
            };
            evaluation.violations.push(RuleViolation {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                enforcement: rule.enforcement,
                penalty,
            });
        }
        evaluation
    }

    /// Preference weight of `aircraft` for `leg`; ranking only.
    pub fn bonus(&self, leg: &Flight, aircraft: &Aircraft) -> i64 {
        self.applicable(leg, aircraft)
            .filter(|r| self.criteria_match(&r.criteria, leg))
            .map(|r| match r.action {
                RuleAction::MustFly => self.must_fly_bonus,
                RuleAction::ShouldFly => self.cost_of(r),
                _ => 0,
            })
            .sum()
    }

    pub fn evaluate_block<'l>(&self, legs: impl IntoIterator<Item = &'l Flight>, aircraft: &Aircraft) -> BlockEvaluation {
        let mut block = BlockEvaluation {
            allowed: true,
            ..BlockEvaluation::default()
        };
        for leg in legs {
            let evaluation = self.evaluate(leg, aircraft);
            block.allowed &= evaluation.allowed;
            block.soft_penalty += evaluation.total_soft_penalty;
            block.bonus += self.bonus(leg, aircraft);
            block
                .violations
                .extend(evaluation.violations.into_iter().map(|v| (leg.id.clone(), v)));
        }
        block
    }
}
