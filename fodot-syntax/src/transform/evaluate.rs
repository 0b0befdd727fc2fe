/*! Implements the evaluation of [`Term`]s and [`Constraint`]s in a [`Structure`].

[`Term`]: crate::transform::Term
[`Constraint`]: crate::transform::Constraint
[`Structure`]: crate::transform::Structure
*/
use super::{Constraint, Term};
use crate::syntax::{SymbolId, Value};
use std::convert::TryFrom;

/// Is an interpretation of the symbols of a vocabulary.
pub trait Structure {
    /// Returns the value of `symbol` on `args`, or `None` if the structure does not interpret
    /// the symbol on those arguments.
    fn value(&self, symbol: SymbolId, args: &[Value]) -> Option<Value>;
}

impl Term {
    /// Evaluates the receiver in `structure`. Returns `None` if some symbol is not
    /// interpreted or an integer result does not fit in `i64`.
    pub fn evaluate<S: Structure + ?Sized>(&self, structure: &S) -> Option<Value> {
        match self {
            Self::Const { value } => Some(value.clone()),
            Self::Symbol { symbol } => structure.value(*symbol, &[]),
            Self::App { function, args } => {
                let args = args
                    .iter()
                    .map(|a| a.evaluate(structure))
                    .collect::<Option<Vec<_>>>()?;
                structure.value(*function, &args)
            }
            Self::Sum { .. } | Self::Product { .. } => self
                .number(structure)
                .and_then(|n| i64::try_from(n).ok())
                .map(Value::Int),
            Self::Count { conditions } => {
                let mut result = 0;
                for c in conditions {
                    if c.evaluate(structure)? {
                        result += 1;
                    }
                }
                Some(Value::Int(result))
            }
        }
    }

    // Evaluates an integer-valued term, allowing intermediate results outside the range of
    // `i64`.
    fn number<S: Structure + ?Sized>(&self, structure: &S) -> Option<i128> {
        match self {
            Self::Sum { constant, terms } => {
                terms.iter().try_fold(*constant as i128, |acc, (k, t)| {
                    acc.checked_add((*k as i128).checked_mul(t.number(structure)?)?)
                })
            }
            Self::Product { factors } => factors
                .iter()
                .try_fold(1i128, |acc, t| acc.checked_mul(t.number(structure)?)),
            term => term.evaluate(structure)?.as_int().map(i128::from),
        }
    }
}

impl Constraint {
    /// Evaluates the receiver in `structure`. Returns `None` if a term of the receiver cannot
    /// be evaluated.
    pub fn evaluate<S: Structure + ?Sized>(&self, structure: &S) -> Option<bool> {
        match self {
            Self::Bool { value } => Some(*value),
            Self::Atom { term } => term.evaluate(structure)?.as_bool(),
            Self::Not { constraint } => constraint.evaluate(structure).map(|b| !b),
            Self::And { constraints } => {
                for c in constraints {
                    if !c.evaluate(structure)? {
                        return Some(false);
                    }
                }
                Some(true)
            }
            Self::Or { constraints } => {
                for c in constraints {
                    if c.evaluate(structure)? {
                        return Some(true);
                    }
                }
                Some(false)
            }
            Self::Iff { left, right } => {
                Some(left.evaluate(structure)? == right.evaluate(structure)?)
            }
            Self::Compare { op, left, right } => {
                match (left.number(structure), right.number(structure)) {
                    (Some(left), Some(right)) => Some(op.holds(&left, &right)),
                    _ => {
                        let left = left.evaluate(structure)?;
                        let right = right.evaluate(structure)?;
                        Some(op.holds(&left, &right))
                    }
                }
            }
        }
    }
}
