use crate::config::SolveLimits;
use crate::error::SolverError;
use crate::exact::lp::{LpModel, Sense, VarId};
use crate::exact::solver::{MipSolver, Solution, SolveStatus};
use async_trait::async_trait;
use good_lp::solvers::highs::highs;
use good_lp::solvers::{ResolutionError, Solution as _, SolutionStatus, SolverModel, WithMipGap, WithTimeLimit};
use good_lp::{Expression, ProblemVariables, variable};
use std::collections::HashMap;
use tracing::debug;

/// HiGHS linked in through good_lp. The solve runs on a blocking worker so
/// the caller's runtime keeps going.
pub struct HighsLp;

#[async_trait]
impl MipSolver for HighsLp {
    fn name(&self) -> &str {
        "highs (embedded)"
    }

    async fn solve(&self, model: &LpModel, limits: &SolveLimits) -> Result<Solution, SolverError> {
        let model = model.clone();
        let limits = *limits;
        tokio::task::spawn_blocking(move || solve_blocking(&model, &limits)).await?
    }
}

fn solve_blocking(model: &LpModel, limits: &SolveLimits) -> Result<Solution, SolverError> {
    let mut vars = ProblemVariables::new();
    let columns: Vec<good_lp::Variable> = model
        .variables()
        .iter()
        .map(|v| {
            let definition = variable().binary().name(v.name.clone());
            vars.add(match v.fixed {
                Some(value) => definition.min(value).max(value),
                None => definition,
            })
        })
        .collect();
    let linear = |terms: &[(VarId, f64)]| {
        terms
            .iter()
            .fold(Expression::from(0.0), |acc, (var, coefficient)| acc + *coefficient * columns[var.index()])
    };

    let mut problem = vars
        .minimise(linear(model.objective()))
        .using(highs)
        .with_time_limit(limits.time_limit.as_secs_f64())
        .with_mip_gap(limits.relative_gap as f32)
        .map_err(|error| SolverError::Backend(error.to_string()))?;
    for row in model.constraints() {
        let lhs = linear(&row.terms);
        problem.add_constraint(match row.sense {
            Sense::Le => lhs.leq(row.rhs),
            Sense::Ge => lhs.geq(row.rhs),
            Sense::Eq => lhs.eq(row.rhs),
        });
    }

    debug!(
        variables = model.variable_count(),
        constraints = model.constraints().len(),
        "solving in process"
    );
    let solution = match problem.solve() {
        Ok(solution) => solution,
        // binaries cannot be unbounded; presolve reports some infeasible
        // models that way
        Err(ResolutionError::Infeasible | ResolutionError::Unbounded) => {
            return Ok(Solution {
                status: SolveStatus::Infeasible,
                objective: None,
                values: HashMap::new(),
            });
        }
        Err(error) => return Err(SolverError::Backend(error.to_string())),
    };

    // binaries come back within the integrality tolerance
    let values: Vec<f64> = columns.iter().map(|&c| solution.value(c).round()).collect();
    let status = match solution.status() {
        SolutionStatus::TimeLimit if model.is_satisfied(&values) => SolveStatus::Feasible,
        SolutionStatus::TimeLimit => SolveStatus::Error("time limit reached without a feasible solution".to_string()),
        _ => SolveStatus::Optimal,
    };

    Ok(Solution {
        objective: Some(model.objective_value(&values)),
        values: model
            .variables()
            .iter()
            .zip(values)
            .map(|(v, x)| (v.name.clone(), x))
            .collect(),
        status,
    })
}
