/*! Implements grounding: the expansion of a normalized theory into a [`GroundedProblem`].

Every 0-ary symbol and every cell of every function table becomes a variable with a finite
domain of encoded values. Booleans range over `{0, 1}`, enumerations over the indices of their
literals, range types over their declared values and `Int` symbols over an interval inferred
from the theory (see [`bounds`]). Constraints that apply a function on non-constant arguments
are expanded into table constraints: one instance per combination of argument values, guarded
by that combination.

[`GroundedProblem`]: crate::ground::GroundedProblem
*/
pub mod bounds;
mod domain;
mod grounder;
mod problem;

pub use domain::{Domain, ValueOrder, Values};
pub use grounder::{ground_theory, GroundConfig, Grounder};
pub use problem::{Cell, Constraint, Expr, GroundedProblem, VarId, Variable};
