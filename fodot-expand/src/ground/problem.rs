//! Defines [`GroundedProblem`], the flat constraint satisfaction problem produced by the
//! grounder and solved by the search engine.
use super::domain::{Domain, ValueOrder};
use fodot_syntax::syntax::{CmpOp, SymbolId, Value};
use itertools::Itertools;
use std::fmt;

/// Is the index of a variable in a [`GroundedProblem`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VarId(pub usize);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Is the back-reference of a ground variable: a 0-ary symbol (with no arguments) or a cell of
/// a function table.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
    pub symbol: SymbolId,
    pub args: Vec<Value>,
}

impl Cell {
    pub fn new(symbol: SymbolId, args: Vec<Value>) -> Self {
        Self { symbol, args }
    }
}

/// Is a variable of a grounded problem.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Variable {
    /// Is the display name of the variable, e.g. `a` or `f(red, green)`.
    pub name: String,

    /// Is the initial domain of the variable.
    pub domain: Domain,

    /// Is the order in which the search tries the values of the variable.
    pub order: ValueOrder,

    /// Is the ground cell that the variable stands for, used by the model reporter.
    pub cell: Cell,
}

/// Is a ground integer expression over encoded values.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Expr {
    Const { value: i64 },
    Var { var: VarId },
    Sum {
        constant: i64,
        terms: Vec<(i64, Expr)>,
    },
    Product { factors: Vec<Expr> },
    /// Is the number of conditions that hold.
    Count { conditions: Vec<Constraint> },
}

impl Expr {
    /// Pushes the variables of the receiver into `vars`, once each.
    pub(crate) fn collect_vars(&self, vars: &mut Vec<VarId>) {
        match self {
            Self::Const { .. } => {}
            Self::Var { var } => {
                if !vars.contains(var) {
                    vars.push(*var);
                }
            }
            Self::Sum { terms, .. } => terms.iter().for_each(|(_, e)| e.collect_vars(vars)),
            Self::Product { factors } => factors.iter().for_each(|e| e.collect_vars(vars)),
            Self::Count { conditions } => conditions.iter().for_each(|c| c.collect_vars(vars)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Const { value } => write!(f, "{}", value),
            Self::Var { var } => write!(f, "{}", var),
            Self::Sum { constant, terms } => {
                let mut parts = terms
                    .iter()
                    .map(|(k, e)| format!("{}·{}", k, e))
                    .collect_vec();
                if *constant != 0 {
                    parts.push(constant.to_string());
                }
                write!(f, "({})", parts.join(" + "))
            }
            Self::Product { factors } => write!(f, "({})", factors.iter().join(" * ")),
            Self::Count { conditions } => write!(f, "#{{{}}}", conditions.iter().join(", ")),
        }
    }
}

/// Is a ground constraint over the variables of a [`GroundedProblem`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Constraint {
    Bool { value: bool },
    Not { constraint: Box<Constraint> },
    And { constraints: Vec<Constraint> },
    Or { constraints: Vec<Constraint> },
    Iff {
        left: Box<Constraint>,
        right: Box<Constraint>,
    },
    Compare { op: CmpOp, left: Expr, right: Expr },

    /// Is an instance of a table constraint: `body` must hold whenever every variable of
    /// `guard` takes its paired value.
    Guarded {
        guard: Vec<(VarId, i64)>,
        body: Box<Constraint>,
    },
}

impl Constraint {
    pub fn truth(value: bool) -> Self {
        Self::Bool { value }
    }

    pub fn not(constraint: Self) -> Self {
        match constraint {
            Self::Bool { value } => Self::truth(!value),
            Self::Not { constraint } => *constraint,
            Self::Compare { op, left, right } => Self::Compare {
                op: op.negate(),
                left,
                right,
            },
            constraint => Self::Not {
                constraint: Box::new(constraint),
            },
        }
    }

    pub fn and(constraints: Vec<Self>) -> Self {
        let mut result = Vec::new();
        for constraint in constraints {
            match constraint {
                Self::Bool { value: true } => {}
                Self::Bool { value: false } => return Self::truth(false),
                constraint => result.push(constraint),
            }
        }
        match result.len() {
            0 => Self::truth(true),
            1 => result.remove(0),
            _ => Self::And {
                constraints: result,
            },
        }
    }

    pub fn or(constraints: Vec<Self>) -> Self {
        let mut result = Vec::new();
        for constraint in constraints {
            match constraint {
                Self::Bool { value: false } => {}
                Self::Bool { value: true } => return Self::truth(true),
                constraint => result.push(constraint),
            }
        }
        match result.len() {
            0 => Self::truth(false),
            1 => result.remove(0),
            _ => Self::Or {
                constraints: result,
            },
        }
    }

    pub fn iff(left: Self, right: Self) -> Self {
        match (left, right) {
            (Self::Bool { value }, other) | (other, Self::Bool { value }) => {
                if value {
                    other
                } else {
                    Self::not(other)
                }
            }
            (left, right) => Self::Iff {
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    pub fn compare(op: CmpOp, left: Expr, right: Expr) -> Self {
        match (&left, &right) {
            (Expr::Const { value: l }, Expr::Const { value: r }) => Self::truth(op.holds(l, r)),
            _ => Self::Compare { op, left, right },
        }
    }

    /// Returns `body` guarded by `guard`; a trivially true body drops the instance.
    pub fn guarded(guard: Vec<(VarId, i64)>, body: Self) -> Self {
        if guard.is_empty() {
            return body;
        }
        match body {
            Self::Bool { value: true } => Self::truth(true),
            body => Self::Guarded {
                guard,
                body: Box::new(body),
            },
        }
    }

    /// Returns the variables that the receiver refers to, in order of first occurrence.
    pub fn vars(&self) -> Vec<VarId> {
        let mut vars = Vec::new();
        self.collect_vars(&mut vars);
        vars
    }

    pub(crate) fn collect_vars(&self, vars: &mut Vec<VarId>) {
        match self {
            Self::Bool { .. } => {}
            Self::Not { constraint } => constraint.collect_vars(vars),
            Self::And { constraints } | Self::Or { constraints } => {
                constraints.iter().for_each(|c| c.collect_vars(vars))
            }
            Self::Iff { left, right } => {
                left.collect_vars(vars);
                right.collect_vars(vars);
            }
            Self::Compare { left, right, .. } => {
                left.collect_vars(vars);
                right.collect_vars(vars);
            }
            Self::Guarded { guard, body } => {
                guard.iter().for_each(|(v, _)| {
                    if !vars.contains(v) {
                        vars.push(*v);
                    }
                });
                body.collect_vars(vars);
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bool { value } => write!(f, "{}", value),
            Self::Not { constraint } => write!(f, "¬({})", constraint),
            Self::And { constraints } => write!(f, "({})", constraints.iter().join(" ∧ ")),
            Self::Or { constraints } => write!(f, "({})", constraints.iter().join(" ∨ ")),
            Self::Iff { left, right } => write!(f, "({} ⇔ {})", left, right),
            Self::Compare { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Self::Guarded { guard, body } => write!(
                f,
                "[{}] ⇒ {}",
                guard.iter().map(|(v, x)| format!("{} = {}", v, x)).join(", "),
                body
            ),
        }
    }
}

/// Is the result of grounding a theory: a set of variables, each with a finite domain, and a
/// set of constraints over them.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct GroundedProblem {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl GroundedProblem {
    pub fn new(variables: Vec<Variable>, constraints: Vec<Constraint>) -> Self {
        Self {
            variables,
            constraints,
        }
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

    /// Returns the number of assignments in the cross product of all variable domains, or
    /// `None` on overflow.
    pub fn search_space(&self) -> Option<u128> {
        self.variables
            .iter()
            .try_fold(1u128, |acc, v| acc.checked_mul(v.domain.len() as u128))
    }
}

impl fmt::Display for GroundedProblem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, v) in self.variables.iter().enumerate() {
            writeln!(f, "{} ({}) ∈ {}", VarId(i), v.name, v.domain)?;
        }
        for c in &self.constraints {
            writeln!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::Var { var: VarId(0) }
    }

    fn y() -> Expr {
        Expr::Var { var: VarId(1) }
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            Constraint::truth(true),
            Constraint::compare(CmpOp::Lt, Expr::Const { value: 1 }, Expr::Const { value: 2 })
        );
        assert_eq!(
            Constraint::Compare {
                op: CmpOp::Ne,
                left: x(),
                right: y()
            },
            Constraint::not(Constraint::compare(CmpOp::Eq, x(), y()))
        );
        assert_eq!(
            Constraint::truth(true),
            Constraint::guarded(vec![(VarId(0), 1)], Constraint::truth(true))
        );
        assert_eq!(
            Constraint::truth(false),
            Constraint::guarded(vec![], Constraint::truth(false))
        );
    }

    #[test]
    fn test_vars() {
        let c = Constraint::Guarded {
            guard: vec![(VarId(2), 0)],
            body: Box::new(Constraint::or(vec![
                Constraint::compare(CmpOp::Eq, y(), x()),
                Constraint::compare(
                    CmpOp::Gt,
                    Expr::Count {
                        conditions: vec![Constraint::compare(
                            CmpOp::Eq,
                            Expr::Var { var: VarId(3) },
                            x(),
                        )],
                    },
                    Expr::Const { value: 0 },
                ),
            ])),
        };
        assert_eq!(vec![VarId(2), VarId(1), VarId(0), VarId(3)], c.vars());
        assert_eq!(
            "[v2 = 0] ⇒ (v1 = v0 ∨ #{v3 = v0} > 0)",
            c.to_string()
        );
    }
}
