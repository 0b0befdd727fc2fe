/*! Implements the normalization of theory statements into [`Constraint`]s, a small closed set
of node kinds over resolved symbols, together with substitution and evaluation on them.

The normalizer resolves every name of a statement against a [`SymbolTable`], checks arities
and sorts, rewrites implications into disjunctions, keeps arithmetic in a canonical linear
form, folds constants, and expands quantifiers and count aggregates over finite types.

**Example**:
```rust
use fodot_syntax::{syntax::{KnowledgeBase, SymbolTable}, transform::normalize};

let kb: KnowledgeBase = r#"
    vocabulary { type Color constructed from {red, green}. f : Color -> Int. }
    theory { !x in Color: f(x) > 0. }
"#.parse().unwrap();
let table = SymbolTable::new(&kb.vocabulary).unwrap();
let theory = normalize(&table, &kb.theory).unwrap();

assert_eq!(
    "(f(red) > 0) ∧ (f(green) > 0)",
    theory.statements()[0].constraint.printer(&table).to_string(),
);
```

[`Constraint`]: crate::transform::Constraint
[`SymbolTable`]: crate::syntax::SymbolTable
*/
mod constraint;
mod evaluate;
mod normalize;
mod substitution;

pub use constraint::{Constraint, Printer, Term};
pub use evaluate::Structure;
pub use normalize::{normalize, normalize_kb, Normalizer, Sort};

use crate::syntax::{Name, Position, Value};
use std::fmt;
use thiserror::Error;

/// Is the location of a statement in a theory: its index and its position in the source.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Location {
    pub statement: usize,
    pub position: Position,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "statement {} ({})", self.statement + 1, self.position)
    }
}

/// Is the type of errors returned by the normalizer.
#[derive(Error, PartialEq, Debug)]
pub enum Error {
    /// Is returned when a statement refers to a name that is not declared.
    #[error("undeclared symbol `{name}` in {location}")]
    UndeclaredSymbol { name: Name, location: Location },

    /// Is returned when a symbol is applied on the wrong number of arguments.
    #[error("symbol `{symbol}` expects {expected} argument(s) but is applied on {found} in {location}")]
    ArityMismatch {
        symbol: Name,
        expected: usize,
        found: usize,
        location: Location,
    },

    /// Is returned when an argument of a function application has the wrong type.
    #[error("argument {} of `{symbol}` expects `{expected}` but found `{found}` in {location}", .index + 1)]
    ArgumentMismatch {
        symbol: Name,
        index: usize,
        expected: String,
        found: String,
        location: Location,
    },

    /// Is returned when an expression of one sort is used where another is expected.
    #[error("expecting `{expected}` but found `{found}` in {location}")]
    TypeMismatch {
        expected: String,
        found: String,
        location: Location,
    },

    /// Is returned when a quantifier ranges over an infinite type.
    #[error("cannot quantify over infinite type `{sort}` in {location}")]
    InfiniteQuantifier { sort: Name, location: Location },

    /// Is returned when expanding a quantifier would produce too many instances.
    #[error("quantifying over `{sort}` yields {size} instances, more than {max}, in {location}")]
    QuantifierTooLarge {
        sort: Name,
        size: u128,
        max: u128,
        location: Location,
    },

    /// Is returned when a structure block gives a symbol a value outside its type.
    #[error("`{value}` is not a value of `{expected}` in the interpretation of `{symbol}` at {location}")]
    InvalidValue {
        symbol: Name,
        value: Value,
        expected: Name,
        location: Location,
    },

    /// Is returned when a row of a function table has no value.
    #[error("a row of `{symbol}` has no value at {location}")]
    MissingValue { symbol: Name, location: Location },

    /// Is returned when a function table leaves cells out and has no default.
    #[error("the interpretation of `{symbol}` needs an `else` value at {location}")]
    MissingDefault { symbol: Name, location: Location },

    /// Is returned when a quantifier ranges over a name that is not a type.
    #[error("unknown type `{name}` in {location}")]
    UnknownSort { name: Name, location: Location },
}

impl Error {
    /// Returns the location of the statement that caused the error.
    pub fn location(&self) -> Location {
        match self {
            Self::UndeclaredSymbol { location, .. }
            | Self::ArityMismatch { location, .. }
            | Self::ArgumentMismatch { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::InfiniteQuantifier { location, .. }
            | Self::QuantifierTooLarge { location, .. }
            | Self::InvalidValue { location, .. }
            | Self::MissingValue { location, .. }
            | Self::MissingDefault { location, .. }
            | Self::UnknownSort { location, .. } => *location,
        }
    }
}

/// Is a normalized statement.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NormalStatement {
    pub constraint: Constraint,
    pub location: Location,
}

/// Is the result of normalizing a theory. Statements keep their source order.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct NormalTheory {
    statements: Vec<NormalStatement>,
}

impl NormalTheory {
    pub fn new(statements: Vec<NormalStatement>) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &[NormalStatement] {
        &self.statements
    }

    /// Returns the top-level conjuncts of every statement, paired with the location of the
    /// statement they come from.
    pub fn conjuncts(&self) -> Vec<(&Constraint, Location)> {
        let mut result = Vec::new();
        for statement in &self.statements {
            for conjunct in statement.constraint.conjuncts() {
                result.push((conjunct, statement.location));
            }
        }
        result
    }
}
