use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Binary decision variable, optionally fixed to a value through its bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub name: String,
    pub fixed: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl Sense {
    fn symbol(self) -> &'static str {
        match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "=",
        }
    }

    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        const EPS: f64 = 1e-6;
        match self {
            Sense::Le => lhs <= rhs + EPS,
            Sense::Ge => lhs >= rhs - EPS,
            Sense::Eq => (lhs - rhs).abs() <= EPS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

/// Minimisation model over binary variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LpModel {
    name: String,
    variables: Vec<Variable>,
    objective: Vec<(VarId, f64)>,
    constraints: Vec<Constraint>,
}

const TERMS_PER_LINE: usize = 8;

impl LpModel {
    pub fn new(name: impl Into<String>) -> LpModel {
        LpModel {
            name: name.into(),
            ..LpModel::default()
        }
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            fixed: None,
        });
        VarId(self.variables.len() - 1)
    }

    /// Fixes `var` through its bounds and a named equality row, so the value
    /// holds even for readers that reset binary bounds.
    pub fn fix(&mut self, row: impl Into<String>, var: VarId, value: f64) {
        self.variables[var.0].fixed = Some(value);
        self.add_constraint(row, vec![(var, 1.0)], Sense::Eq, value);
    }

    pub fn add_cost(&mut self, var: VarId, coefficient: f64) {
        if coefficient != 0.0 {
            self.objective.push((var, coefficient));
        }
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, terms: Vec<(VarId, f64)>, sense: Sense, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            terms,
            sense,
            rhs,
        });
    }

    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> &Variable {
        &self.variables[var.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().map(|(v, c)| c * values[v.0]).sum()
    }

    /// Every constraint and fixed bound holds for `values`.
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let bounds_hold = self
            .variables
            .iter()
            .zip(values)
            .all(|(var, value)| var.fixed.map_or(true, |f| (f - value).abs() < 1e-6));
        bounds_hold
            && self.constraints.iter().all(|c| {
                let lhs: f64 = c.terms.iter().map(|(v, k)| k * values[v.0]).sum();
                c.sense.holds(lhs, c.rhs)
            })
    }

    fn write_terms(&self, out: &mut String, terms: &[(VarId, f64)]) {
        for (i, (var, coefficient)) in terms.iter().enumerate() {
            if i > 0 && i % TERMS_PER_LINE == 0 {
                out.push_str("\n   ");
            }
            let sign = if *coefficient < 0.0 { "-" } else { "+" };
            let magnitude = coefficient.abs();
            if i == 0 && sign == "+" {
                let _ = write!(out, " {} {}", magnitude, self.variables[var.0].name);
            } else {
                let _ = write!(out, " {} {} {}", sign, magnitude, self.variables[var.0].name);
            }
        }
    }

    /// CPLEX LP text.
    pub fn to_lp_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\\ {}", self.name);
        out.push_str("Minimize\n obj:");
        if self.objective.is_empty() {
            match self.variables.first() {
                Some(var) => {
                    let _ = write!(out, " 0 {}", var.name);
                }
                None => out.push_str(" 0"),
            }
        } else {
            self.write_terms(&mut out, &self.objective);
        }
        out.push_str("\nSubject To\n");
        for constraint in &self.constraints {
            let _ = write!(out, " {}:", constraint.name);
            self.write_terms(&mut out, &constraint.terms);
            let _ = writeln!(out, " {} {}", constraint.sense.symbol(), constraint.rhs);
        }

        let fixed: Vec<&Variable> = self.variables.iter().filter(|v| v.fixed.is_some()).collect();
        if !fixed.is_empty() {
            out.push_str("Bounds\n");
            for var in fixed {
                let _ = writeln!(out, " {} = {}", var.name, var.fixed.unwrap_or_default());
            }
        }

        if !self.variables.is_empty() {
            out.push_str("Binary\n");
            for var in &self.variables {
                let _ = writeln!(out, " {}", var.name);
            }
        }
        out.push_str("End\n");
        out
    }
}
