/*! Implements substitution on [`Term`]s and [`Constraint`]s, and the collection of the terms
that occur as (part of) function arguments.

[`Term`]: crate::transform::Term
[`Constraint`]: crate::transform::Constraint
*/
use super::{Constraint, Term};

impl Term {
    /// Returns the result of replacing every sub-term `t` of the receiver for which `f`
    /// returns `Some(s)` with `s`. The result is rebuilt through the simplifying
    /// constructors.
    pub fn substitute<F: Fn(&Term) -> Option<Term>>(&self, f: &F) -> Term {
        if let Some(term) = f(self) {
            return term;
        }
        match self {
            Self::Const { .. } | Self::Symbol { .. } => self.clone(),
            Self::App { function, args } => Self::App {
                function: *function,
                args: args.iter().map(|a| a.substitute(f)).collect(),
            },
            Self::Sum { constant, terms } => Self::sum(
                *constant,
                terms.iter().map(|(k, t)| (*k, t.substitute(f))).collect(),
            ),
            Self::Product { factors } => {
                Self::product(factors.iter().map(|t| t.substitute(f)).collect())
            }
            Self::Count { conditions } => {
                Self::count(conditions.iter().map(|c| c.substitute(f)).collect())
            }
        }
    }

    /// Returns true if the receiver is a 0-ary symbol or an application on constants.
    pub fn is_leaf(&self) -> bool {
        match self {
            Self::Symbol { .. } => true,
            Self::App { args, .. } => args.iter().all(|a| a.as_const().is_some()),
            _ => false,
        }
    }

    // Collects the leaves of a term in argument position.
    fn argument_leaves(&self, leaves: &mut Vec<Term>) {
        if self.is_leaf() {
            if !leaves.contains(self) {
                leaves.push(self.clone());
            }
            return;
        }
        match self {
            Self::Const { .. } | Self::Symbol { .. } => {}
            Self::App { args, .. } => args.iter().for_each(|a| a.argument_leaves(leaves)),
            Self::Sum { terms, .. } => terms.iter().for_each(|(_, t)| t.argument_leaves(leaves)),
            Self::Product { factors } => factors.iter().for_each(|t| t.argument_leaves(leaves)),
            Self::Count { conditions } => conditions.iter().for_each(|c| c.all_leaves(leaves)),
        }
    }

    // Collects the argument leaves of applications inside the receiver.
    fn nested_leaves(&self, leaves: &mut Vec<Term>) {
        match self {
            Self::Const { .. } | Self::Symbol { .. } => {}
            Self::App { args, .. } => {
                if !self.is_leaf() {
                    args.iter().for_each(|a| a.argument_leaves(leaves));
                }
            }
            Self::Sum { terms, .. } => terms.iter().for_each(|(_, t)| t.nested_leaves(leaves)),
            Self::Product { factors } => factors.iter().for_each(|t| t.nested_leaves(leaves)),
            Self::Count { conditions } => {
                conditions.iter().for_each(|c| c.collect_argument_leaves(leaves))
            }
        }
    }
}

impl Constraint {
    /// Returns the result of applying [`Term::substitute`] on every term of the receiver.
    pub fn substitute<F: Fn(&Term) -> Option<Term>>(&self, f: &F) -> Constraint {
        match self {
            Self::Bool { .. } => self.clone(),
            Self::Atom { term } => Self::atom(term.substitute(f)),
            Self::Not { constraint } => Self::not(constraint.substitute(f)),
            Self::And { constraints } => {
                Self::and(constraints.iter().map(|c| c.substitute(f)).collect())
            }
            Self::Or { constraints } => {
                Self::or(constraints.iter().map(|c| c.substitute(f)).collect())
            }
            Self::Iff { left, right } => Self::iff(left.substitute(f), right.substitute(f)),
            Self::Compare { op, left, right } => {
                Self::compare(*op, left.substitute(f), right.substitute(f))
            }
        }
    }

    /// Returns the leaves (0-ary symbols and applications on constants) that occur inside
    /// the arguments of a function application whose arguments are not all constants, in
    /// order of first occurrence. These are the terms whose values decide which function
    /// cells the receiver refers to.
    pub fn argument_leaves(&self) -> Vec<Term> {
        let mut leaves = Vec::new();
        self.collect_argument_leaves(&mut leaves);
        leaves
    }

    fn collect_argument_leaves(&self, leaves: &mut Vec<Term>) {
        match self {
            Self::Bool { .. } => {}
            Self::Atom { term } => term.nested_leaves(leaves),
            Self::Not { constraint } => constraint.collect_argument_leaves(leaves),
            Self::And { constraints } | Self::Or { constraints } => constraints
                .iter()
                .for_each(|c| c.collect_argument_leaves(leaves)),
            Self::Iff { left, right } => {
                left.collect_argument_leaves(leaves);
                right.collect_argument_leaves(leaves);
            }
            Self::Compare { left, right, .. } => {
                left.nested_leaves(leaves);
                right.nested_leaves(leaves);
            }
        }
    }

    // Collects every leaf of the receiver; used when the receiver decides an argument value.
    fn all_leaves(&self, leaves: &mut Vec<Term>) {
        match self {
            Self::Bool { .. } => {}
            Self::Atom { term } => term.argument_leaves(leaves),
            Self::Not { constraint } => constraint.all_leaves(leaves),
            Self::And { constraints } | Self::Or { constraints } => {
                constraints.iter().for_each(|c| c.all_leaves(leaves))
            }
            Self::Iff { left, right } => {
                left.all_leaves(leaves);
                right.all_leaves(leaves);
            }
            Self::Compare { left, right, .. } => {
                left.argument_leaves(leaves);
                right.argument_leaves(leaves);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    const KB: &str = "vocabulary { type Color constructed from {red, green, blue}. \
        a : Color. b : Color. f : Color * Color -> Color. g : Color -> Color. n : Int. \
        type Digit = {0..9}. h : Digit -> Bool. m : Digit. } \
        theory { f(a, b) ~= f(b, a). g(g(a)) = red. g(red) = b. f(red, g(blue)) = a. n > 2. \
        h(m + n). }";

    #[test]
    fn test_argument_leaves() {
        let (table, theory) = normalized(KB);
        let leaves: Vec<Vec<String>> = theory
            .statements()
            .iter()
            .map(|s| {
                s.constraint
                    .argument_leaves()
                    .iter()
                    .map(|t| t.printer(&table).to_string())
                    .collect()
            })
            .collect();
        assert_eq!(
            vec![
                vec!["a", "b"],
                vec!["a"],
                vec![],
                vec!["g(blue)"],
                vec![],
                vec!["m", "n"],
            ],
            leaves
        );
    }

    #[test]
    fn test_substitute() {
        let (table, theory) = normalized(KB);
        let a = Term::Symbol {
            symbol: table.symbol_id("a").unwrap(),
        };
        let b = Term::Symbol {
            symbol: table.symbol_id("b").unwrap(),
        };
        let red = Term::constant(crate::syntax::Value::Literal("red".into()));
        let to_red = |t: &Term| {
            if *t == a || *t == b {
                Some(red.clone())
            } else {
                None
            }
        };

        let first = theory.statements()[0].constraint.substitute(&to_red);
        assert_eq!(Constraint::truth(false), first);

        let second = theory.statements()[1].constraint.substitute(&to_red);
        assert_eq!("g(g(red)) = red", second.printer(&table).to_string());
        assert_eq!(
            vec!["g(red)"],
            second
                .argument_leaves()
                .iter()
                .map(|t| t.printer(&table).to_string())
                .collect::<Vec<_>>()
        );
    }
}
