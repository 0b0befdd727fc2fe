/*! Defines normalized [`Term`]s and [`Constraint`]s.

The constructors on both types simplify as they build: constants are folded, nested sums,
products, conjunctions and disjunctions are flattened and like terms of a sum are merged.
Every transformation that rebuilds a constraint goes through them, so a constraint never
contains a foldable constant sub-expression.

[`Term`]: crate::transform::Term
[`Constraint`]: crate::transform::Constraint
*/
use crate::syntax::{CmpOp, SymbolId, SymbolTable, Value};
use itertools::Itertools;
use std::fmt;

/// Is a normalized term.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Term {
    /// Is a constant value.
    Const { value: Value },

    /// Is a 0-ary symbol.
    Symbol { symbol: SymbolId },

    /// Is the application of a function symbol.
    App { function: SymbolId, args: Vec<Term> },

    /// Is the linear combination `constant + Σ k·t`. No `k` is zero. A `t` is a constant, a
    /// sum or equal to another `t` only where folding it would overflow.
    Sum {
        constant: i64,
        terms: Vec<(i64, Term)>,
    },

    /// Is a product of at least two factors, none of which is a product. A factor is constant
    /// only where folding it into the coefficient would overflow.
    Product { factors: Vec<Term> },

    /// Is the number of conditions that hold.
    Count { conditions: Vec<Constraint> },
}

impl Term {
    pub fn constant<V: Into<Value>>(value: V) -> Self {
        Self::Const {
            value: value.into(),
        }
    }

    /// Returns the value of the receiver if it is a constant.
    pub fn as_const(&self) -> Option<&Value> {
        match self {
            Self::Const { value } => Some(value),
            _ => None,
        }
    }

    /// Returns the integer value of the receiver if it is an integer constant.
    pub fn as_int(&self) -> Option<i64> {
        self.as_const().and_then(Value::as_int)
    }

    /// Returns the canonical linear combination `constant + Σ k·t`. A constant or a like term
    /// whose folding would overflow `i64` is kept as a separate summand.
    pub fn sum(constant: i64, terms: Vec<(i64, Term)>) -> Self {
        let mut constant = constant;
        let mut merged: Vec<(i64, Term)> = Vec::new();
        let push = |k: i64, term: Term, merged: &mut Vec<(i64, Term)>| {
            match merged
                .iter_mut()
                .find(|(k2, t)| *t == term && k2.checked_add(k).is_some())
            {
                Some(entry) => entry.0 += k,
                None => merged.push((k, term)),
            }
        };

        let mut pending: Vec<(i64, Term)> = terms;
        pending.reverse();
        while let Some((k, term)) = pending.pop() {
            if k == 0 {
                continue;
            }
            match term {
                Self::Const {
                    value: Value::Int(v),
                } => match k.checked_mul(v).and_then(|kv| constant.checked_add(kv)) {
                    Some(folded) => constant = folded,
                    None => push(k, Self::constant(v), &mut merged),
                },
                Self::Sum { constant: c, terms } => {
                    let scaled = k.checked_mul(c).and_then(|kc| {
                        terms
                            .iter()
                            .map(|(k2, t)| k.checked_mul(*k2).map(|kk| (kk, t.clone())))
                            .collect::<Option<Vec<_>>>()
                            .map(|scaled| (kc, scaled))
                    });
                    match scaled {
                        Some((kc, scaled)) => {
                            pending.extend(scaled.into_iter().rev());
                            pending.push((1, Self::constant(kc)));
                        }
                        None => push(k, Self::Sum { constant: c, terms }, &mut merged),
                    }
                }
                term => push(k, term, &mut merged),
            }
        }
        merged.retain(|(k, _)| *k != 0);

        if merged.is_empty() {
            Self::constant(constant)
        } else if constant == 0 && merged.len() == 1 && merged[0].0 == 1 {
            merged.remove(0).1
        } else {
            Self::Sum {
                constant,
                terms: merged,
            }
        }
    }

    pub fn add(self, other: Self) -> Self {
        Self::sum(0, vec![(1, self), (1, other)])
    }

    pub fn sub(self, other: Self) -> Self {
        Self::sum(0, vec![(1, self), (-1, other)])
    }

    pub fn scale(self, k: i64) -> Self {
        Self::sum(0, vec![(k, self)])
    }

    /// Returns the product of `factors`, with constant factors moved into a coefficient.
    pub fn product(factors: Vec<Term>) -> Self {
        let mut k: i64 = 1;
        let mut result = Vec::new();
        let mut pending = factors;
        while let Some(factor) = pending.pop() {
            match factor {
                Self::Const {
                    value: Value::Int(v),
                } => match k.checked_mul(v) {
                    Some(folded) => k = folded,
                    None => result.push(Self::constant(v)),
                },
                Self::Product { factors } => pending.extend(factors),
                Self::Sum { constant: 0, mut terms } if terms.len() == 1 => {
                    let (k2, t) = terms.remove(0);
                    match k.checked_mul(k2) {
                        Some(folded) => {
                            k = folded;
                            pending.push(t);
                        }
                        None => result.push(Self::Sum {
                            constant: 0,
                            terms: vec![(k2, t)],
                        }),
                    }
                }
                factor => result.push(factor),
            }
        }
        result.reverse();

        if k == 0 {
            return Self::constant(0);
        }
        let term = match result.len() {
            0 => return Self::constant(k),
            1 => result.remove(0),
            _ => Self::Product { factors: result },
        };
        Self::sum(0, vec![(k, term)])
    }

    pub fn mul(self, other: Self) -> Self {
        Self::product(vec![self, other])
    }

    /// Returns the number of `conditions` that hold, counting constant conditions upfront.
    pub fn count(conditions: Vec<Constraint>) -> Self {
        let mut trues = 0;
        let mut rest = Vec::new();
        for condition in conditions {
            match condition {
                Constraint::Bool { value: true } => trues += 1,
                Constraint::Bool { value: false } => {}
                condition => rest.push(condition),
            }
        }
        if rest.is_empty() {
            Self::constant(trues)
        } else {
            Self::sum(trues, vec![(1, Self::Count { conditions: rest })])
        }
    }

    /// Returns a printer that shows the receiver with the names in `table`.
    pub fn printer<'a>(&'a self, table: &'a SymbolTable) -> Printer<'a, Self> {
        Printer { item: self, table }
    }
}

/// Is a normalized constraint.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Constraint {
    Bool { value: bool },

    /// Is a boolean-valued term, a proposition or an application of a predicate.
    Atom { term: Term },

    Not { constraint: Box<Constraint> },

    And { constraints: Vec<Constraint> },

    Or { constraints: Vec<Constraint> },

    Iff {
        left: Box<Constraint>,
        right: Box<Constraint>,
    },

    Compare { op: CmpOp, left: Term, right: Term },
}

impl Constraint {
    pub fn truth(value: bool) -> Self {
        Self::Bool { value }
    }

    pub fn atom(term: Term) -> Self {
        match term {
            Term::Const {
                value: Value::Bool(value),
            } => Self::Bool { value },
            term => Self::Atom { term },
        }
    }

    pub fn not(constraint: Self) -> Self {
        match constraint {
            Self::Bool { value } => Self::Bool { value: !value },
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
                Self::And { constraints } => result.extend(constraints),
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
                Self::Or { constraints } => result.extend(constraints),
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
            (left, right) if left == right => Self::truth(true),
            (left, right) => Self::Iff {
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    pub fn compare(op: CmpOp, left: Term, right: Term) -> Self {
        if let (Some(l), Some(r)) = (left.as_const(), right.as_const()) {
            return Self::truth(op.holds(l, r));
        }
        if left == right {
            return Self::truth(matches!(op, CmpOp::Eq | CmpOp::Le | CmpOp::Ge));
        }
        Self::Compare { op, left, right }
    }

    /// Returns the top-level conjuncts of the receiver.
    pub fn conjuncts(&self) -> Vec<&Self> {
        match self {
            Self::And { constraints } => constraints.iter().collect(),
            Self::Bool { value: true } => Vec::new(),
            constraint => vec![constraint],
        }
    }

    /// Returns a printer that shows the receiver with the names in `table`.
    pub fn printer<'a>(&'a self, table: &'a SymbolTable) -> Printer<'a, Self> {
        Printer { item: self, table }
    }
}

/// Shows a [`Term`] or a [`Constraint`] with symbol names looked up in a [`SymbolTable`].
///
/// [`SymbolTable`]: crate::syntax::SymbolTable
pub struct Printer<'a, T> {
    item: &'a T,
    table: &'a SymbolTable,
}

impl<'a> Printer<'a, Term> {
    fn operand(&self, term: &'a Term) -> String {
        let printer = term.printer(self.table);
        match term {
            Term::Sum { .. } | Term::Product { .. } => format!("({})", printer),
            _ => printer.to_string(),
        }
    }
}

impl<'a> fmt::Display for Printer<'a, Term> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let table = self.table;
        match self.item {
            Term::Const { value } => write!(f, "{}", value),
            Term::Symbol { symbol } => write!(f, "{}", table.symbol(*symbol)),
            Term::App { function, args } => write!(
                f,
                "{}({})",
                table.symbol(*function),
                args.iter().map(|a| a.printer(table)).join(", ")
            ),
            Term::Sum { constant, terms } => {
                let mut parts: Vec<String> = terms
                    .iter()
                    .map(|(k, t)| match k {
                        1 => self.operand(t),
                        -1 => format!("-{}", self.operand(t)),
                        k => format!("{}·{}", k, self.operand(t)),
                    })
                    .collect();
                if *constant != 0 {
                    parts.push(constant.to_string());
                }
                write!(f, "{}", parts.join(" + "))
            }
            Term::Product { factors } => {
                write!(f, "{}", factors.iter().map(|t| self.operand(t)).join(" * "))
            }
            Term::Count { conditions } => write!(
                f,
                "#{{{}}}",
                conditions.iter().map(|c| c.printer(table)).join(", ")
            ),
        }
    }
}

impl<'a> Printer<'a, Constraint> {
    fn operand(&self, constraint: &'a Constraint) -> String {
        let printer = constraint.printer(self.table);
        match constraint {
            Constraint::Bool { .. } | Constraint::Atom { .. } => printer.to_string(),
            _ => format!("({})", printer),
        }
    }
}

impl<'a> fmt::Display for Printer<'a, Constraint> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let table = self.table;
        match self.item {
            Constraint::Bool { value } => write!(f, "{}", value),
            Constraint::Atom { term } => write!(f, "{}", term.printer(table)),
            Constraint::Not { constraint } => write!(f, "¬{}", self.operand(constraint)),
            Constraint::And { constraints } => {
                write!(f, "{}", constraints.iter().map(|c| self.operand(c)).join(" ∧ "))
            }
            Constraint::Or { constraints } => {
                write!(f, "{}", constraints.iter().map(|c| self.operand(c)).join(" ∨ "))
            }
            Constraint::Iff { left, right } => {
                write!(f, "{} ⇔ {}", self.operand(left), self.operand(right))
            }
            Constraint::Compare { op, left, right } => {
                let left = left.printer(table);
                let right = right.printer(table);
                write!(f, "{} {} {}", left, op, right)
            }
        }
    }
}
