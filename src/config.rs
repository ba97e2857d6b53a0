use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Engine tuning carried in the scenario's `config` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// ISO country code of the operator; legs between two stations of this
    /// country count as domestic.
    pub operator_home_country: Option<Arc<str>>,
    pub use_minimum_tat: bool,
    /// TAT used for an aircraft type without a table.
    pub fallback_tat_minutes: i64,
    pub family_substitution: bool,
    pub default_soft_penalty: i64,
    pub must_fly_bonus: i64,
    pub exact: ExactConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            operator_home_country: None,
            use_minimum_tat: true,
            fallback_tat_minutes: 30,
            family_substitution: true,
            default_soft_penalty: 3000,
            must_fly_bonus: 50_000,
            exact: ExactConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactConfig {
    pub overflow_cost: i64,
    pub chain_break_cost: i64,
    pub max_variables: usize,
    pub backend: SolverBackend,
    /// Solver executable for [`SolverBackend::Command`], looked up on `PATH`
    /// when not absolute.
    pub solver_binary: String,
}

/// Where the exact model is solved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// HiGHS linked in through good_lp.
    #[default]
    Embedded,
    /// The HiGHS command-line binary, fed an LP file.
    Command,
}

impl Default for ExactConfig {
    fn default() -> Self {
        ExactConfig {
            overflow_cost: 100_000,
            chain_break_cost: 1_000,
            max_variables: 50_000,
            backend: SolverBackend::Embedded,
            solver_binary: "highs".to_string(),
        }
    }
}

/// Wall-clock and optimality-gap limits handed to the solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveLimits {
    pub time_limit: Duration,
    pub relative_gap: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SolvePreset {
    Fast,
    #[default]
    Balanced,
    Thorough,
}

impl SolvePreset {
    pub fn limits(self) -> SolveLimits {
        let (secs, gap) = match self {
            SolvePreset::Fast => (10, 0.05),
            SolvePreset::Balanced => (30, 0.01),
            SolvePreset::Thorough => (120, 0.001),
        };
        SolveLimits {
            time_limit: Duration::from_secs(secs),
            relative_gap: gap,
        }
    }
}
