/*! Defines the declarations of a [`Vocabulary`].

[`Vocabulary`]: crate::syntax::Vocabulary
*/
use super::{Name, Position};
use itertools::Itertools;
use std::fmt;

/// Is the body of a type declaration.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeBody {
    /// Is an enumerated type, `type Color constructed from {red, green, blue}`.
    Constructed(Vec<Name>),

    /// Is a finite range of integers, `type Digit = {0..9}`, bounds included.
    Range { lo: i64, hi: i64 },

    /// Is an explicit finite set of integers, `type Odd = {1, 3, 5}`.
    Ints(Vec<i64>),
}

/// Is a declaration in a vocabulary.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Declaration {
    /// Declares a new type.
    Type {
        name: Name,
        body: TypeBody,
        position: Position,
    },

    /// Declares a symbol. A symbol with no output type (`p.`) is a proposition, a symbol with
    /// no parameters is a typed variable (`a : Int.`), and any other symbol is a function
    /// (`f : Color * Color -> Color.`).
    Symbol {
        name: Name,
        params: Vec<Name>,
        out: Option<Name>,
        position: Position,
    },
}

impl Declaration {
    /// Returns the declared name.
    pub fn name(&self) -> &Name {
        match self {
            Self::Type { name, .. } | Self::Symbol { name, .. } => name,
        }
    }

    /// Returns the position of the declaration in the source.
    pub fn position(&self) -> Position {
        match self {
            Self::Type { position, .. } | Self::Symbol { position, .. } => *position,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Type { name, body, .. } => match body {
                TypeBody::Constructed(literals) => write!(
                    f,
                    "type {} constructed from {{{}}}",
                    name,
                    literals.iter().join(", ")
                ),
                TypeBody::Range { lo, hi } => write!(f, "type {} = {{{}..{}}}", name, lo, hi),
                TypeBody::Ints(values) => {
                    write!(f, "type {} = {{{}}}", name, values.iter().join(", "))
                }
            },
            Self::Symbol {
                name, params, out, ..
            } => match out {
                None => write!(f, "{}", name),
                Some(out) if params.is_empty() => write!(f, "{} : {}", name, out),
                Some(out) => write!(f, "{} : {} -> {}", name, params.iter().join(" * "), out),
            },
        }
    }
}

/// Is the vocabulary section of a knowledge base: a list of declarations in source order.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Vocabulary {
    declarations: Vec<Declaration>,
}

impl Vocabulary {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }

    /// Returns the declarations of the vocabulary in source order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ds: Vec<String> = self.declarations.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", ds.join("\n"))
    }
}
