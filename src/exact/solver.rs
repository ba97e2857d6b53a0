use crate::config::SolveLimits;
use crate::error::SolverError;
use crate::exact::lp::LpModel;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    /// Time limit hit with an incumbent in hand.
    Feasible,
    Infeasible,
    Error(String),
}

impl SolveStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolvePhase {
    Building,
    Solving,
    Extracting,
}

/// Primal values keyed by variable name.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    pub values: HashMap<String, f64>,
}

impl Solution {
    pub fn value(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    pub fn is_on(&self, name: &str) -> bool {
        self.value(name) > 0.5
    }
}

/// Mixed-integer backend. The wall-clock limit is the solver's to enforce.
#[async_trait]
pub trait MipSolver: Send + Sync {
    fn name(&self) -> &str;

    async fn solve(&self, model: &LpModel, limits: &SolveLimits) -> Result<Solution, SolverError>;
}
