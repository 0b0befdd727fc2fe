/*! Defines an abstract syntax tree (AST) for vocabularies and theories, together with the
[`SymbolTable`] that resolves a vocabulary into typed symbols.

[`SymbolTable`]: crate::syntax::SymbolTable
*/

mod expr;
mod structure;
mod symbol;
mod table;
mod value;
mod vocabulary;

pub use expr::{not, ArithOp, CmpOp, Connective, Expr, KnowledgeBase, Quantifier, Statement, Theory};
pub use structure::{Enumeration, Interpretation, Interpretations, Tuple};
pub use symbol::{Name, Position};
pub use table::{
    Entry, Symbol, SymbolId, SymbolKind, SymbolTable, TypeDef, TypeId, TypeIter, TypeValues,
};
pub use value::Value;
pub use vocabulary::{Declaration, TypeBody, Vocabulary};

use thiserror::Error;

/// Is the type of errors returned when a vocabulary is resolved into a [`SymbolTable`].
#[derive(Error, PartialEq, Debug)]
pub enum Error {
    /// Is returned when a name is declared more than once, either as a symbol, a type or an
    /// enumeration literal.
    #[error("`{name}` is declared more than once at {position}")]
    DuplicateSymbol { name: Name, position: Position },

    /// Is returned when a symbol declaration refers to a type that is not declared.
    #[error("symbol `{symbol}` refers to unknown type `{name}` at {position}")]
    UnknownType {
        name: Name,
        symbol: Name,
        position: Position,
    },

    /// Is returned when a type declaration has no values.
    #[error("type `{name}` is empty at {position}")]
    EmptyType { name: Name, position: Position },
}
