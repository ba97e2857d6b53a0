use crate::aircraft::Aircraft;
use crate::assign::result::{AssignmentResult, ChainBreak, RejectionReason, ResultBuilder};
use crate::assign::state::Window;
use crate::block::{Block, build_blocks};
use crate::engine::Method;
use crate::error::EngineError;
use crate::exact::lp::{LpModel, Sense, VarId};
use crate::exact::solver::{Solution, SolveStatus};
use crate::rule::BlockEvaluation;
use crate::scenario::Scenario;
use crate::tat::TatTable;

/// `x_b{block}_t{tail}`: one block on one tail.
struct Column {
    block: usize,
    tail: usize,
    var: VarId,
    pinned: bool,
    evaluation: BlockEvaluation,
}

/// `z_t{tail}_b{earlier}_b{later}`: set when both columns are taken and the
/// stations do not line up.
struct ChainLink {
    tail: usize,
    earlier: usize,
    later: usize,
    var: VarId,
}

/// The assignment problem as a binary program, plus what is needed to read
/// a solution back into an [`AssignmentResult`].
pub struct TailModel {
    lp: LpModel,
    blocks: Vec<Block>,
    /// Roster first, then pinned registrations missing from it.
    tails: Vec<Aircraft>,
    columns: Vec<Column>,
    overflow: Vec<VarId>,
    /// (tail, column, column) pairs that cannot share the tail.
    conflicts: Vec<(usize, usize, usize)>,
    chains: Vec<ChainLink>,
    total_legs: usize,
}

impl TailModel {
    pub fn build(scenario: &Scenario) -> Result<TailModel, EngineError> {
        let blocks = build_blocks(&scenario.flights);
        let rules = scenario.rule_evaluator();
        let exact = &scenario.config.exact;
        let roster = scenario.aircraft.len();

        let mut lp = LpModel::new("tail_assignment");
        let mut tails: Vec<Aircraft> = scenario.aircraft.clone();
        let mut columns = vec![];
        let mut overflow = vec![];

        for (b, block) in blocks.iter().enumerate() {
            if let Some(aircraft_id) = &block.pinned_aircraft_id {
                let t = match tails.iter().position(|a| a.id == *aircraft_id) {
                    Some(t) => t,
                    None => {
                        tails.push(Aircraft {
                            id: aircraft_id.clone(),
                            aircraft_type: block.aircraft_type.clone(),
                            home_base: None,
                        });
                        tails.len() - 1
                    }
                };
                let var = lp.add_binary(format!("x_b{b}_t{t}"));
                lp.fix(format!("pin_b{b}"), var, 1.0);
                columns.push(Column {
                    block: b,
                    tail: t,
                    var,
                    pinned: true,
                    evaluation: rules.evaluate_block(&block.legs, &tails[t]),
                });
                continue;
            }
            // unpinned blocks with an ordering violation stay out and overflow
            if !block.is_well_formed() {
                continue;
            }

            let mut terms = vec![];
            for (t, aircraft) in tails[..roster].iter().enumerate() {
                if aircraft.aircraft_type != block.aircraft_type {
                    continue;
                }
                let evaluation = rules.evaluate_block(&block.legs, aircraft);
                let var = lp.add_binary(format!("x_b{b}_t{t}"));
                if evaluation.allowed {
                    lp.add_cost(var, evaluation.soft_penalty as f64);
                } else {
                    lp.fix(format!("deny_b{b}_t{t}"), var, 0.0);
                }
                terms.push((var, 1.0));
                columns.push(Column {
                    block: b,
                    tail: t,
                    var,
                    pinned: false,
                    evaluation,
                });
            }
            let slack = lp.add_binary(format!("o_b{b}"));
            lp.add_cost(slack, exact.overflow_cost as f64);
            terms.push((slack, 1.0));
            lp.add_constraint(format!("assign_b{b}"), terms, Sense::Eq, 1.0);
            overflow.push(slack);
        }

        let mut conflicts = vec![];
        let mut chains = vec![];
        for (t, aircraft) in tails.iter().enumerate() {
            let on_tail: Vec<usize> = (0..columns.len()).filter(|&k| columns[k].tail == t).collect();
            if on_tail.is_empty() {
                continue;
            }
            let tat = TatTable::flat(
                aircraft.aircraft_type.clone(),
                scenario.tat_for(&aircraft.aircraft_type).default_minutes,
            );
            let windows: Vec<Window> = on_tail
                .iter()
                .map(|&k| Window::of(&blocks[columns[k].block], &scenario.stations))
                .collect();

            for i in 0..on_tail.len() {
                let a = &columns[on_tail[i]];
                for j in i + 1..on_tail.len() {
                    let b = &columns[on_tail[j]];
                    if a.pinned && b.pinned {
                        continue;
                    }
                    if windows[i].conflicts_with(&windows[j], &tat, scenario.config.use_minimum_tat) {
                        lp.add_constraint(
                            format!("conflict_t{t}_b{}_b{}", a.block, b.block),
                            vec![(a.var, 1.0), (b.var, 1.0)],
                            Sense::Le,
                            1.0,
                        );
                        conflicts.push((t, on_tail[i], on_tail[j]));
                    }
                }

                // nearest successors; blocks tied on start are all linked
                let successors: Vec<usize> = (0..on_tail.len())
                    .filter(|&j| j != i && windows[j].start >= windows[i].end)
                    .collect();
                let Some(next_start) = successors.iter().map(|&j| windows[j].start).min() else {
                    continue;
                };
                for &j in successors.iter().filter(|&&j| windows[j].start == next_start) {
                    if windows[i].destination_id == windows[j].origin_id {
                        continue;
                    }
                    let b = &columns[on_tail[j]];
                    let var = lp.add_binary(format!("z_t{t}_b{}_b{}", a.block, b.block));
                    lp.add_cost(var, exact.chain_break_cost as f64);
                    lp.add_constraint(
                        format!("chain_t{t}_b{}_b{}", a.block, b.block),
                        vec![(var, 1.0), (a.var, -1.0), (b.var, -1.0)],
                        Sense::Ge,
                        -1.0,
                    );
                    chains.push(ChainLink {
                        tail: t,
                        earlier: on_tail[i],
                        later: on_tail[j],
                        var,
                    });
                }
            }
        }

        let variables = lp.variable_count();
        if variables > exact.max_variables {
            return Err(EngineError::ModelTooLarge {
                variables,
                limit: exact.max_variables,
            });
        }

        Ok(TailModel {
            lp,
            blocks,
            tails,
            columns,
            overflow,
            conflicts,
            chains,
            total_legs: scenario.flights.len(),
        })
    }

    pub fn lp(&self) -> &LpModel {
        &self.lp
    }

    /// Whether any block is left for the solver to decide.
    pub fn has_free_blocks(&self) -> bool {
        !self.overflow.is_empty()
    }

    fn name_of(&self, var: VarId) -> &str {
        &self.lp.variable(var).name
    }

    /// Reads `solution` back into a result. Without a solution only the
    /// pins hold and every other block overflows.
    pub fn extract(&self, solution: Option<&Solution>, status: SolveStatus) -> AssignmentResult {
        let taken = |column: &Column| {
            column.pinned
                || (column.evaluation.allowed && solution.is_some_and(|s| s.is_on(self.name_of(column.var))))
        };

        let mut placed: Vec<Option<usize>> = vec![None; self.blocks.len()];
        for (k, column) in self.columns.iter().enumerate() {
            if placed[column.block].is_none() && taken(column) {
                placed[column.block] = Some(k);
            }
        }

        let mut results = ResultBuilder::new();
        for (b, block) in self.blocks.iter().enumerate() {
            match placed[b] {
                Some(k) => {
                    let column = &self.columns[k];
                    results.assign(block, &self.tails[column.tail].id, column.evaluation.clone());
                }
                None => results.overflow(block),
            }
        }

        for (k, column) in self.columns.iter().enumerate() {
            if column.pinned || placed[column.block] == Some(k) {
                continue;
            }
            let reason = if !column.evaluation.allowed {
                RejectionReason::HardRule {
                    rule_ids: column.evaluation.hard_rule_ids(),
                }
            } else if let Some(other) = self.placed_conflict(k, &placed) {
                RejectionReason::Overlap {
                    conflicting_leg: self.blocks[self.columns[other].block].first_leg().id.clone(),
                }
            } else {
                RejectionReason::Score
            };
            results.reject(&self.blocks[column.block], &self.tails[column.tail].id, reason);
        }

        for link in &self.chains {
            let (earlier, later) = (&self.columns[link.earlier], &self.columns[link.later]);
            let both = placed[earlier.block] == Some(link.earlier) && placed[later.block] == Some(link.later);
            let on = match solution {
                Some(s) => both && s.is_on(self.name_of(link.var)),
                None => both,
            };
            if !on {
                continue;
            }
            let (arriving, departing) = (&self.blocks[earlier.block], &self.blocks[later.block]);
            results.chain_break(ChainBreak {
                aircraft_id: self.tails[link.tail].id.clone(),
                arriving_leg: arriving.last_leg().id.clone(),
                departing_leg: departing.first_leg().id.clone(),
                arrival_station: arriving.destination_id().clone(),
                departure_station: departing.origin_id().clone(),
            });
        }

        results.finish(Method::Exact, self.total_legs, Some(status))
    }

    /// A taken column on the same tail that `column` conflicts with.
    fn placed_conflict(&self, column: usize, placed: &[Option<usize>]) -> Option<usize> {
        self.conflicts
            .iter()
            .filter(|(t, _, _)| *t == self.columns[column].tail)
            .filter_map(|&(_, a, b)| match (a == column, b == column) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .find(|&other| placed[self.columns[other].block] == Some(other))
    }
}
