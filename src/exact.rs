//! Exact tail assignment as a binary program.
//!
//! Every unpinned block gets one binary per same-type tail plus an overflow
//! slack; pinned blocks get a single binary fixed to one. Turnaround
//! conflicts, hard rules and station continuity become constraints, and the
//! objective weighs overflow, chain breaks and soft-rule cost. The program is
//! handed to a [`MipSolver`]: HiGHS linked in through good_lp, or the HiGHS
//! binary fed CPLEX LP text.

mod embedded;
mod formulation;
mod highs;
mod lp;
mod solver;

#[cfg(test)]
mod tests;

pub use embedded::HighsLp;
pub use formulation::TailModel;
pub use highs::{HighsCli, parse_solution};
pub use lp::{Constraint, LpModel, Sense, VarId, Variable};
pub use solver::{MipSolver, Solution, SolvePhase, SolveStatus};

use crate::assign::result::AssignmentResult;
use crate::config::SolveLimits;
use crate::error::EngineError;
use crate::scenario::Scenario;
use tracing::{info, warn};

/// Solves the scenario exactly. Oversized models fail before the solver is
/// started; solver failures and infeasible outcomes degrade to a result
/// where only the pinned blocks are placed.
pub async fn assign_exact(
    scenario: &Scenario,
    solver: &dyn MipSolver,
    limits: &SolveLimits,
    progress: &dyn Fn(SolvePhase),
) -> Result<AssignmentResult, EngineError> {
    progress(SolvePhase::Building);
    let model = TailModel::build(scenario)?;
    info!(
        variables = model.lp().variable_count(),
        constraints = model.lp().constraints().len(),
        "exact model built"
    );

    if !model.has_free_blocks() {
        progress(SolvePhase::Extracting);
        return Ok(model.extract(None, SolveStatus::Optimal));
    }

    progress(SolvePhase::Solving);
    let outcome = solver.solve(model.lp(), limits).await;
    progress(SolvePhase::Extracting);

    let result = match outcome {
        Ok(solution) if solution.status.has_solution() => model.extract(Some(&solution), solution.status.clone()),
        Ok(solution) => {
            warn!(status = ?solution.status, "no usable solution, unpinned blocks overflow");
            model.extract(None, solution.status)
        }
        Err(error) => {
            warn!(solver = solver.name(), %error, "solver failed, unpinned blocks overflow");
            model.extract(None, SolveStatus::Error(error.to_string()))
        }
    };

    info!(
        status = ?result.solver_status,
        total = result.summary.total,
        assigned = result.summary.assigned,
        overflowed = result.summary.overflowed,
        chain_breaks = result.chain_breaks.len(),
        "exact assignment complete"
    );
    Ok(result)
}
