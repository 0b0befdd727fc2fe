/*! Implements model expansion for typed first-order theories over finite domains.

Given a vocabulary and a theory over it, model expansion looks for interpretations of the
symbols of the vocabulary (models) that satisfy every statement of the theory. The pipeline
has three stages:

1. The [grounder] expands every symbol into ground variables with finite domains, and every
normalized statement into ground constraints over those variables.

2. The [search] engine solves the resulting constraint satisfaction problem by propagation
interleaved with backtracking, producing zero, one or all models.

3. The [model] reporter translates every satisfying assignment back into symbol-level values.

A [`Context`] owns the products of the front end for one knowledge base and runs the pipeline
through a [`Solver`].

[grounder]: crate::ground
[search]: crate::search
[model]: crate::model
[`Context`]: crate::context::Context
[`Solver`]: crate::solver::Solver
*/
#[macro_use]
extern crate tracing;

pub mod bounder;
pub mod context;
pub mod ground;
pub mod model;
pub mod search;
pub mod solver;
pub mod strategy;
#[cfg(test)]
mod test_prelude;
pub mod trace;

use fodot_syntax::{
    syntax::{self, SymbolTable, Theory, Vocabulary},
    transform::{self, normalize, Location},
};
use thiserror::Error;

/// Is the type of errors returned by model expansion.
#[derive(Error, PartialEq, Debug)]
pub enum Error {
    /// Is returned when the vocabulary cannot be resolved.
    #[error("{}", .source.to_string())]
    Declaration {
        #[from]
        source: syntax::Error,
    },

    /// Is returned when a statement of the theory cannot be normalized.
    #[error("{}", .source.to_string())]
    Reference {
        #[from]
        source: transform::Error,
    },

    /// Is returned when no finite domain can be inferred for an integer symbol, or a function
    /// has a parameter of an infinite type.
    #[error("cannot infer a finite domain for `{symbol}`")]
    UnboundedDomain { symbol: String },

    /// Is returned when the constraints of the theory leave no value for a symbol.
    #[error("the domain of `{symbol}` is empty")]
    EmptyDomain { symbol: String },

    /// Is returned when the inferred domain of a symbol is larger than the configured maximum.
    #[error("the domain of `{symbol}` has {size} values; the maximum is {max}")]
    DomainTooLarge {
        symbol: String,
        size: i128,
        max: usize,
    },

    /// Is returned when a function has more cells than the configured maximum table size.
    #[error("`{symbol}` has {size} cells; the maximum is {max}")]
    FunctionTooLarge {
        symbol: String,
        size: u128,
        max: usize,
    },

    /// Is returned when a statement expands into more guarded instances than the configured
    /// maximum.
    #[error("{location} expands into more than {max} instances")]
    TableTooLarge { location: Location, max: usize },
}

/// Resolves `vocabulary`, normalizes `theory` against it and grounds the result with the
/// default configuration.
pub fn ground(vocabulary: &Vocabulary, theory: &Theory) -> Result<ground::GroundedProblem, Error> {
    let table = SymbolTable::new(vocabulary)?;
    let theory = normalize(&table, theory)?;
    ground::ground_theory(&table, &theory)
}

/// Searches `problem` sequentially with the default strategy.
pub fn solve(problem: &ground::GroundedProblem, mode: solver::Mode) -> solver::Outcome<search::Assignment> {
    solver::Solver::new(mode).solve(problem).outcome
}
