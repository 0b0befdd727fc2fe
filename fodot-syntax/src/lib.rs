/*! Provides the front end of the model expansion engine: an abstract syntax tree for
vocabularies and theories, a parser for their textual form, a resolver that turns a vocabulary
into a typed [`SymbolTable`], and a normalizer that rewrites theory statements into a small
closed set of constraint nodes.

[`SymbolTable`]: crate::syntax::SymbolTable
*/
#[macro_use]
extern crate lalrpop_util;

pub mod parser;
pub mod syntax;
#[cfg(test)]
mod test_prelude;
pub mod transform;
