use crate::config::SolveLimits;
use crate::error::SolverError;
use crate::exact::{LpModel, MipSolver, Solution, SolveStatus};
use async_trait::async_trait;
use std::collections::HashMap;

const MAX_FREE_VARIABLES: usize = 20;

/// Tries every assignment of the free binaries; fine for a handful of legs.
pub struct EnumeratingSolver;

#[async_trait]
impl MipSolver for EnumeratingSolver {
    fn name(&self) -> &str {
        "enumerate"
    }

    async fn solve(&self, model: &LpModel, _limits: &SolveLimits) -> Result<Solution, SolverError> {
        let free: Vec<usize> = model
            .variables()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.fixed.is_none())
            .map(|(i, _)| i)
            .collect();
        assert!(free.len() <= MAX_FREE_VARIABLES, "{} free variables", free.len());

        let mut values: Vec<f64> = model.variables().iter().map(|v| v.fixed.unwrap_or(0.0)).collect();
        let mut best: Option<(f64, Vec<f64>)> = None;
        for mask in 0u32..(1 << free.len()) {
            for (bit, &i) in free.iter().enumerate() {
                values[i] = ((mask >> bit) & 1) as f64;
            }
            if !model.is_satisfied(&values) {
                continue;
            }
            let objective = model.objective_value(&values);
            if best.as_ref().map_or(true, |(b, _)| objective < *b - 1e-9) {
                best = Some((objective, values.clone()));
            }
        }

        Ok(match best {
            Some((objective, values)) => Solution {
                status: SolveStatus::Optimal,
                objective: Some(objective),
                values: model
                    .variables()
                    .iter()
                    .zip(values)
                    .map(|(v, x)| (v.name.clone(), x))
                    .collect(),
            },
            None => Solution {
                status: SolveStatus::Infeasible,
                objective: None,
                values: HashMap::new(),
            },
        })
    }
}

/// Always reports the given status without values.
pub struct FixedStatusSolver(pub SolveStatus);

#[async_trait]
impl MipSolver for FixedStatusSolver {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn solve(&self, _model: &LpModel, _limits: &SolveLimits) -> Result<Solution, SolverError> {
        Ok(Solution {
            status: self.0.clone(),
            objective: None,
            values: HashMap::new(),
        })
    }
}

pub struct MissingBinary;

#[async_trait]
impl MipSolver for MissingBinary {
    fn name(&self) -> &str {
        "missing"
    }

    async fn solve(&self, _model: &LpModel, _limits: &SolveLimits) -> Result<Solution, SolverError> {
        Err(SolverError::Spawn {
            binary: "missing".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    }
}

/// Fails the test when the engine reaches the solver.
pub struct UnreachableSolver;

#[async_trait]
impl MipSolver for UnreachableSolver {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn solve(&self, _model: &LpModel, _limits: &SolveLimits) -> Result<Solution, SolverError> {
        panic!("solver must not run")
    }
}
