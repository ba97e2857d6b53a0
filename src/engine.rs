use crate::assign::result::AssignmentResult;
use crate::assign::{Strategy, assign};
use crate::config::{SolvePreset, SolverBackend};
use crate::error::EngineError;
use crate::exact::{HighsCli, HighsLp, MipSolver, SolvePhase, assign_exact};
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Greedy, tiered by continuity then rule cost.
    #[default]
    Minimize,
    /// Greedy, spreading block hours across the fleet.
    Balance,
    /// Binary program handed to HiGHS.
    Exact,
}

impl Method {
    pub fn strategy(self) -> Option<Strategy> {
        match self {
            Method::Minimize => Some(Strategy::Priority),
            Method::Balance => Some(Strategy::Balance),
            Method::Exact => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Minimize => "minimize",
            Method::Balance => "balance",
            Method::Exact => "exact",
        };
        write!(f, "{name}")
    }
}

/// One full assignment run. The exact method uses the solver backend named
/// in the scenario config.
pub async fn run(
    scenario: &Scenario,
    method: Method,
    preset: SolvePreset,
    progress: &dyn Fn(SolvePhase),
) -> Result<AssignmentResult, EngineError> {
    match method.strategy() {
        Some(strategy) => Ok(assign(scenario, strategy)),
        None => {
            let solver = solver_for(scenario.config.exact.backend, &scenario.config.exact.solver_binary);
            assign_exact(scenario, solver.as_ref(), &preset.limits(), progress).await
        }
    }
}

pub fn solver_for(backend: SolverBackend, binary: &str) -> Box<dyn MipSolver> {
    match backend {
        SolverBackend::Embedded => Box::new(HighsLp),
        SolverBackend::Command => Box::new(HighsCli::new(binary)),
    }
}
