/*! Defines the [`Interpretations`] of a structure block, which fix the values of symbols.

[`Interpretations`]: crate::syntax::Interpretations
*/
use super::{Name, Position, Value};
use itertools::Itertools;
use std::fmt;

/// Is one row of an enumerated interpretation: the arguments of a cell and, for a function,
/// its value. A row without a value lists a cell where a predicate holds.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tuple {
    pub args: Vec<Value>,
    pub value: Option<Value>,
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.args.as_slice() {
            [arg] => write!(f, "{}", arg)?,
            args => write!(f, "({})", args.iter().join(", "))?,
        }
        if let Some(value) = &self.value {
            write!(f, " -> {}", value)?;
        }
        Ok(())
    }
}

/// Is the body of an interpretation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Enumeration {
    /// Gives a 0-ary symbol its value, `x := 3`.
    Value(Value),

    /// Enumerates the cells of a function or predicate, `f := {red -> 1, blue -> 2} else 0`.
    /// Cells that are not listed take `default`; for a predicate they are false.
    Table {
        tuples: Vec<Tuple>,
        default: Option<Value>,
    },
}

/// Is the interpretation of one symbol in a structure block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Interpretation {
    pub name: Name,
    pub body: Enumeration,
    pub position: Position,
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.body {
            Enumeration::Value(value) => write!(f, "{} := {}", self.name, value),
            Enumeration::Table { tuples, default } => {
                write!(f, "{} := {{{}}}", self.name, tuples.iter().join(", "))?;
                if let Some(default) = default {
                    write!(f, " else {}", default)?;
                }
                Ok(())
            }
        }
    }
}

/// Is the structure section of a knowledge base: the interpretations in source order.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Interpretations {
    interpretations: Vec<Interpretation>,
}

impl Interpretations {
    pub fn new(interpretations: Vec<Interpretation>) -> Self {
        Self { interpretations }
    }

    pub fn interpretations(&self) -> &[Interpretation] {
        &self.interpretations
    }

    pub fn is_empty(&self) -> bool {
        self.interpretations.is_empty()
    }
}

impl fmt::Display for Interpretations {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let is: Vec<String> = self.interpretations.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", is.join("\n"))
    }
}
