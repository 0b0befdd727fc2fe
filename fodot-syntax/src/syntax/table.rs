/*! Defines a [`SymbolTable`] to resolve the declarations of a vocabulary into typed symbols.

[`SymbolTable`]: crate::syntax::SymbolTable
*/
use super::{Declaration, Error, Name, Position, TypeBody, Value, Vocabulary};
use std::{collections::HashMap, convert::TryFrom, fmt, ops::RangeInclusive};

/// Identifies a symbol by its index in a [`SymbolTable`], in declaration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(pub usize);

/// Identifies a type by its index in a [`SymbolTable`]. The built-in types `Bool` and `Int`
/// come first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeId(pub usize);

impl TypeId {
    pub const BOOL: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
}

/// Is the set of values of a type.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeValues {
    Bool,
    /// All integers; only finite after bounds are inferred for a particular symbol.
    Int,
    /// An enumerated type with its literals in declaration order.
    Literals(Vec<Name>),
    /// A finite set of integers in ascending order.
    Ints(Vec<i64>),
    /// The integers in `[lo, hi]`.
    Range { lo: i64, hi: i64 },
}

/// Is a resolved type.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeDef {
    pub name: Name,
    pub values: TypeValues,
}

impl TypeDef {
    /// Returns true if values of this type are integers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.values,
            TypeValues::Int | TypeValues::Ints(_) | TypeValues::Range { .. }
        )
    }

    /// Returns the values of the type in declaration order, or `None` if the type is infinite.
    /// Ranges are enumerated lazily.
    pub fn finite_values(&self) -> Option<TypeIter> {
        let inner = match &self.values {
            TypeValues::Bool => Inner::Bool(BOOLS.iter()),
            TypeValues::Int => return None,
            TypeValues::Literals(ls) => Inner::Literals(ls.iter()),
            TypeValues::Ints(is) => Inner::Ints(is.iter()),
            TypeValues::Range { lo, hi } => Inner::Range(*lo..=*hi),
        };
        Some(TypeIter { inner })
    }

    /// Returns true if `value` is a value of the type.
    pub fn contains(&self, value: &Value) -> bool {
        match (&self.values, value) {
            (TypeValues::Bool, Value::Bool(_)) | (TypeValues::Int, Value::Int(_)) => true,
            (TypeValues::Ints(is), Value::Int(i)) => is.binary_search(i).is_ok(),
            (TypeValues::Range { lo, hi }, Value::Int(i)) => lo <= i && i <= hi,
            (TypeValues::Literals(ls), Value::Literal(l)) => ls.contains(l),
            _ => false,
        }
    }

    /// Returns the number of values of the type, or `None` if the type is infinite.
    pub fn size(&self) -> Option<u128> {
        match &self.values {
            TypeValues::Bool => Some(2),
            TypeValues::Int => None,
            TypeValues::Literals(ls) => Some(ls.len() as u128),
            TypeValues::Ints(is) => Some(is.len() as u128),
            TypeValues::Range { lo, hi } => Some((*hi as i128 - *lo as i128 + 1).max(0) as u128),
        }
    }
}

static BOOLS: [bool; 2] = [true, false];

/// Iterates over the values of a finite type.
#[derive(Clone)]
pub struct TypeIter<'t> {
    inner: Inner<'t>,
}

#[derive(Clone)]
enum Inner<'t> {
    Bool(std::slice::Iter<'static, bool>),
    Literals(std::slice::Iter<'t, Name>),
    Ints(std::slice::Iter<'t, i64>),
    Range(RangeInclusive<i64>),
}

impl<'t> Iterator for TypeIter<'t> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match &mut self.inner {
            Inner::Bool(it) => it.next().map(|b| Value::Bool(*b)),
            Inner::Literals(it) => it.next().cloned().map(Value::Literal),
            Inner::Ints(it) => it.next().map(|i| Value::Int(*i)),
            Inner::Range(it) => it.next().map(Value::Int),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    Proposition,
    Variable,
    Function,
}

/// Is a resolved symbol.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,

    /// Is the list of parameter types; empty for propositions and variables.
    pub params: Vec<TypeId>,

    /// Is the type of the symbol (the return type for functions).
    pub out: TypeId,

    pub position: Position,
}

impl Symbol {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Is what a name resolves to in a [`SymbolTable`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Entry {
    Symbol(SymbolId),
    Type(TypeId),
    /// Is the literal at `index` of the enumerated type `ty`.
    Literal { ty: TypeId, index: usize },
}

/// Is the resolved form of a [`Vocabulary`], mapping every declared name to a symbol, a type
/// or an enumeration literal.
///
/// [`Vocabulary`]: crate::syntax::Vocabulary
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    types: Vec<TypeDef>,
    entries: HashMap<Name, Entry>,
}

impl SymbolTable {
    /// Resolves `vocabulary` into a symbol table. Types are registered before symbols, so a
    /// symbol may refer to a type that is declared after it.
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, Error> {
        let mut table = Self {
            symbols: Vec::new(),
            types: Vec::new(),
            entries: HashMap::new(),
        };
        table.add_type(Name::from("Bool"), TypeValues::Bool, Position::default())?;
        table.add_type(Name::from("Int"), TypeValues::Int, Position::default())?;

        for declaration in vocabulary.declarations() {
            if let Declaration::Type {
                name,
                body,
                position,
            } = declaration
            {
                let values = match body {
                    TypeBody::Constructed(literals) => TypeValues::Literals(literals.clone()),
                    TypeBody::Range { lo, hi } => TypeValues::Range { lo: *lo, hi: *hi },
                    TypeBody::Ints(values) => {
                        let mut values = values.clone();
                        values.sort_unstable();
                        values.dedup();
                        TypeValues::Ints(values)
                    }
                };
                table.add_type(name.clone(), values, *position)?;
            }
        }

        for declaration in vocabulary.declarations() {
            if let Declaration::Symbol {
                name,
                params,
                out,
                position,
            } = declaration
            {
                let resolve = |ty: &Name| {
                    table.type_id(ty.as_str()).ok_or_else(|| Error::UnknownType {
                        name: ty.clone(),
                        symbol: name.clone(),
                        position: *position,
                    })
                };
                let params = params.iter().map(resolve).collect::<Result<Vec<_>, _>>()?;
                let (kind, out) = match out {
                    None => (SymbolKind::Proposition, TypeId::BOOL),
                    Some(out) if params.is_empty() => (SymbolKind::Variable, resolve(out)?),
                    Some(out) => (SymbolKind::Function, resolve(out)?),
                };
                table.add_symbol(Symbol {
                    name: name.clone(),
                    kind,
                    params,
                    out,
                    position: *position,
                })?;
            }
        }

        Ok(table)
    }

    fn insert(&mut self, name: Name, entry: Entry, position: Position) -> Result<(), Error> {
        if self.entries.contains_key(&name) {
            return Err(Error::DuplicateSymbol { name, position });
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    fn add_type(&mut self, name: Name, values: TypeValues, position: Position) -> Result<(), Error> {
        let empty = match &values {
            TypeValues::Literals(ls) => ls.is_empty(),
            TypeValues::Ints(is) => is.is_empty(),
            TypeValues::Range { lo, hi } => lo > hi,
            TypeValues::Bool | TypeValues::Int => false,
        };
        if empty {
            return Err(Error::EmptyType { name, position });
        }

        let id = TypeId(self.types.len());
        self.insert(name.clone(), Entry::Type(id), position)?;
        if let TypeValues::Literals(literals) = &values {
            for (index, literal) in literals.iter().enumerate() {
                self.insert(literal.clone(), Entry::Literal { ty: id, index }, position)?;
            }
        }
        self.types.push(TypeDef { name, values });
        Ok(())
    }

    fn add_symbol(&mut self, symbol: Symbol) -> Result<(), Error> {
        let id = SymbolId(self.symbols.len());
        self.insert(symbol.name.clone(), Entry::Symbol(id), symbol.position)?;
        self.symbols.push(symbol);
        Ok(())
    }

    /// Returns what `name` resolves to, if declared.
    pub fn lookup(&self, name: &str) -> Option<Entry> {
        self.entries.get(&Name::from(name)).copied()
    }

    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        match self.lookup(name) {
            Some(Entry::Symbol(id)) => Some(id),
            _ => None,
        }
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        match self.lookup(name) {
            Some(Entry::Type(id)) => Some(id),
            _ => None,
        }
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0]
    }

    /// Returns the symbols of the table in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i), s))
    }

    /// Returns the declared types, including the built-in `Bool` and `Int`.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypeDef)> {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }

    /// Encodes `value` as an integer: `false` and `true` as 0 and 1, integers as themselves and
    /// enumeration literals as their index in the declaration of their type.
    pub fn encode(&self, value: &Value) -> Option<i64> {
        match value {
            Value::Bool(b) => Some(*b as i64),
            Value::Int(i) => Some(*i),
            Value::Literal(l) => match self.lookup(l.as_str()) {
                Some(Entry::Literal { index, .. }) => Some(index as i64),
                _ => None,
            },
        }
    }

    /// Decodes an integer produced by [`SymbolTable::encode`] back into a value of type `ty`.
    pub fn decode(&self, ty: TypeId, code: i64) -> Option<Value> {
        match &self.type_def(ty).values {
            TypeValues::Bool => match code {
                0 => Some(Value::Bool(false)),
                1 => Some(Value::Bool(true)),
                _ => None,
            },
            TypeValues::Int | TypeValues::Ints(_) => Some(Value::Int(code)),
            TypeValues::Range { lo, hi } if *lo <= code && code <= *hi => Some(Value::Int(code)),
            TypeValues::Range { .. } => None,
            TypeValues::Literals(ls) => usize::try_from(code)
                .ok()
                .and_then(|i| ls.get(i))
                .cloned()
                .map(Value::Literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[test]
    fn test_resolve() {
        let table = table_of(
            "vocabulary { p. q : Bool. a : Int. type Color constructed from {red, green, blue}. \
             col : Color. f : Color * Color -> Color. type Digit = {0..9}. d : Digit. } \
             theory { }",
        );
        let p = table.symbol(table.symbol_id("p").unwrap());
        assert_eq!(SymbolKind::Proposition, p.kind);
        assert_eq!(TypeId::BOOL, p.out);

        let q = table.symbol(table.symbol_id("q").unwrap());
        assert_eq!(SymbolKind::Variable, q.kind);
        assert_eq!(TypeId::BOOL, q.out);

        let f = table.symbol(table.symbol_id("f").unwrap());
        let color = table.type_id("Color").unwrap();
        assert_eq!(SymbolKind::Function, f.kind);
        assert_eq!(2, f.arity());
        assert_eq!(vec![color, color], f.params);
        assert_eq!(color, f.out);

        assert_eq!(
            Some(Entry::Literal { ty: color, index: 2 }),
            table.lookup("blue")
        );
        let digit = table.type_id("Digit").unwrap();
        assert!(table.type_def(digit).is_numeric());
        assert_eq!(10, table.type_def(digit).finite_values().unwrap().count());
        assert_eq!(Some(10), table.type_def(digit).size());
        assert!(table.type_def(digit).contains(&Value::Int(9)));
        assert!(!table.type_def(digit).contains(&Value::Int(10)));
        assert!(table.type_def(color).contains(&Value::Literal("red".into())));
        assert!(!table.type_def(color).contains(&Value::Int(0)));
        assert!(table.type_def(TypeId::INT).finite_values().is_none());

        let names: Vec<String> = table.symbols().map(|(_, s)| s.name.to_string()).collect();
        assert_eq!(vec!["p", "q", "a", "col", "f", "d"], names);
    }

    #[test]
    fn test_forward_type_reference() {
        let table = table_of("vocabulary { c : Shade. type Shade constructed from {dark, light} } theory { }");
        let c = table.symbol(table.symbol_id("c").unwrap());
        assert_eq!(table.type_id("Shade").unwrap(), c.out);
    }

    #[test]
    fn test_duplicate_symbol() {
        {
            let err = resolve_error("vocabulary { a : Int. a : Bool. } theory { }");
            assert_eq!(
                "`a` is declared more than once at line 1, column 23",
                err.to_string()
            );
        }
        {
            let err = resolve_error(
                "vocabulary { type C constructed from {red, blue}. red : Int. } theory { }",
            );
            assert!(matches!(err, Error::DuplicateSymbol { name, .. } if name.as_str() == "red"));
        }
        {
            let err = resolve_error(
                "vocabulary { type C constructed from {red}. type D constructed from {red}. } theory { }",
            );
            assert!(matches!(err, Error::DuplicateSymbol { .. }));
        }
        {
            let err = resolve_error("vocabulary { type Int constructed from {one}. } theory { }");
            assert!(matches!(err, Error::DuplicateSymbol { .. }));
        }
    }

    #[test]
    fn test_unknown_type() {
        let err = resolve_error("vocabulary { a : Integer. } theory { }");
        assert_eq!(
            Error::UnknownType {
                name: "Integer".into(),
                symbol: "a".into(),
                position: Position::new(1, 14),
            },
            err
        );

        let err = resolve_error("vocabulary { f : Bool * Nat -> Bool. } theory { }");
        assert!(matches!(err, Error::UnknownType { name, .. } if name.as_str() == "Nat"));
    }

    #[test]
    fn test_empty_type() {
        let err = resolve_error("vocabulary { type T = {5..1}. } theory { }");
        assert!(matches!(err, Error::EmptyType { name, .. } if name.as_str() == "T"));
    }

    #[test]
    fn test_encode_decode() {
        let table = table_of(
            "vocabulary { type Color constructed from {red, green, blue}. } theory { }",
        );
        let color = table.type_id("Color").unwrap();
        assert_eq!(Some(1), table.encode(&Value::Literal("green".into())));
        assert_eq!(Some(1), table.encode(&Value::Bool(true)));
        assert_eq!(Some(-4), table.encode(&Value::Int(-4)));
        assert_eq!(None, table.encode(&Value::Literal("purple".into())));
        assert_eq!(Some(Value::Literal("blue".into())), table.decode(color, 2));
        assert_eq!(None, table.decode(color, 3));
        assert_eq!(Some(Value::Bool(false)), table.decode(TypeId::BOOL, 0));
    }

    #[test]
    fn test_wide_range() {
        let table = table_of("vocabulary { type T = {0..9223372036854775807}. x : T. } theory { }");
        let ty = table.type_def(table.type_id("T").unwrap());
        assert_eq!(
            TypeValues::Range {
                lo: 0,
                hi: i64::MAX
            },
            ty.values
        );
        assert_eq!(Some(i64::MAX as u128 + 1), ty.size());
        assert_eq!(
            vec![Value::Int(0), Value::Int(1), Value::Int(2)],
            ty.finite_values().unwrap().take(3).collect::<Vec<_>>()
        );

        assert_eq!(None, table.decode(table.type_id("T").unwrap(), -1));

        let table = table_of("vocabulary { type S = {-9223372036854775808..9223372036854775807}. } theory { }");
        let ty = table.type_def(table.type_id("S").unwrap());
        assert_eq!(Some(u64::MAX as u128 + 1), ty.size());
    }
}
