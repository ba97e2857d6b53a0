use crate::config::SolveLimits;
use crate::error::SolverError;
use crate::exact::lp::LpModel;
use crate::exact::solver::{MipSolver, Solution, SolveStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::process::Command;
use tracing::debug;

/// Runs the HiGHS command-line solver on an LP file in a scratch directory.
pub struct HighsCli {
    binary: String,
}

impl HighsCli {
    pub fn new(binary: impl Into<String>) -> HighsCli {
        HighsCli { binary: binary.into() }
    }
}

#[async_trait]
impl MipSolver for HighsCli {
    fn name(&self) -> &str {
        &self.binary
    }

    async fn solve(&self, model: &LpModel, limits: &SolveLimits) -> Result<Solution, SolverError> {
        let dir = tempfile::tempdir()?;
        let model_path = dir.path().join("model.lp");
        let options_path = dir.path().join("highs.opt");
        let solution_path = dir.path().join("model.sol");

        tokio::fs::write(&model_path, model.to_lp_string()).await?;
        tokio::fs::write(
            &options_path,
            format!("mip_rel_gap = {}\nwrite_solution_style = 0\n", limits.relative_gap),
        )
        .await?;

        debug!(binary = %self.binary, variables = model.variable_count(), "starting solver");
        let output = Command::new(&self.binary)
            .arg("--model_file")
            .arg(&model_path)
            .arg("--options_file")
            .arg(&options_path)
            .arg("--time_limit")
            .arg(limits.time_limit.as_secs_f64().to_string())
            .arg("--solution_file")
            .arg(&solution_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SolverError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SolverError::Exit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let text = tokio::fs::read_to_string(&solution_path).await?;
        parse_solution(&text).map_err(|message| SolverError::Solution {
            path: solution_path,
            message,
        })
    }
}

fn classify(model_status: &str, primal_feasible: bool) -> SolveStatus {
    match model_status {
        "Optimal" => SolveStatus::Optimal,
        "Infeasible" | "Primal infeasible or unbounded" => SolveStatus::Infeasible,
        _ if primal_feasible => SolveStatus::Feasible,
        other => SolveStatus::Error(other.to_string()),
    }
}

/// Reads the raw HiGHS solution layout: a "Model status" line pair, then
/// "# Columns N" followed by N `name value` rows.
pub fn parse_solution(text: &str) -> Result<Solution, String> {
    let mut lines = text.lines().map(str::trim);
    let mut model_status = None;
    let mut primal_feasible = false;
    let mut objective = None;
    let mut values = HashMap::new();

    while let Some(line) = lines.next() {
        if line == "Model status" {
            model_status = lines.next().map(str::to_string);
        } else if line == "# Primal solution values" {
            primal_feasible = lines.next() == Some("Feasible");
        } else if let Some(rest) = line.strip_prefix("Objective ") {
            objective = rest.trim().parse::<f64>().ok();
        } else if let Some(count) = line.strip_prefix("# Columns ") {
            let count: usize = count
                .trim()
                .parse()
                .map_err(|_| format!("bad column count '{count}'"))?;
            for _ in 0..count {
                let row = lines.next().ok_or("solution ends inside the column table")?;
                let mut parts = row.split_whitespace();
                let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
                    return Err(format!("bad column row '{row}'"));
                };
                let value = value
                    .parse::<f64>()
                    .map_err(|_| format!("bad value in row '{row}'"))?;
                values.insert(name.to_string(), value);
            }
            // only the primal table is needed
            break;
        }
    }

    let model_status = model_status.ok_or("no model status")?;
    Ok(Solution {
        status: classify(&model_status, primal_feasible && !values.is_empty()),
        objective,
        values,
    })
}
