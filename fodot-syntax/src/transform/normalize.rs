/*! Implements the [`Normalizer`] that rewrites theory statements into [`Constraint`]s.

[`Normalizer`]: crate::transform::Normalizer
[`Constraint`]: crate::transform::Constraint
*/
use super::{Constraint, Error, Location, NormalStatement, NormalTheory, Term};
use crate::syntax::{
    ArithOp, CmpOp, Connective, Entry, Enumeration, Expr, Interpretation, Interpretations,
    KnowledgeBase, Name, Quantifier, Statement, SymbolId, SymbolTable, Theory, TypeId, Value,
};
use itertools::Itertools;
use std::{collections::HashSet, convert::TryFrom};

// The largest number of instances one quantifier or count aggregate expands into.
const MAX_INSTANCES: u128 = 1 << 20;

/// Is the sort of a normalized expression. Range types share the `Int` sort; every enumerated
/// type is a sort of its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sort {
    Bool,
    Int,
    Enum(TypeId),
}

impl Sort {
    /// Returns the sort of values of type `ty`.
    pub fn of(table: &SymbolTable, ty: TypeId) -> Self {
        if ty == TypeId::BOOL {
            Self::Bool
        } else if table.type_def(ty).is_numeric() {
            Self::Int
        } else {
            Self::Enum(ty)
        }
    }

    fn name(self, table: &SymbolTable) -> String {
        match self {
            Self::Bool => "Bool".into(),
            Self::Int => "Int".into(),
            Self::Enum(ty) => table.type_def(ty).name.to_string(),
        }
    }
}

// Bound variables of the enclosing quantifiers, innermost last.
type Scope = Vec<(Name, Value, Sort)>;

/// Normalizes the statements of a theory against a [`SymbolTable`].
///
/// [`SymbolTable`]: crate::syntax::SymbolTable
pub struct Normalizer<'t> {
    table: &'t SymbolTable,
}

impl<'t> Normalizer<'t> {
    pub fn new(table: &'t SymbolTable) -> Self {
        Self { table }
    }

    /// Normalizes every statement of `theory`, stopping at the first error.
    pub fn theory(&self, theory: &Theory) -> Result<NormalTheory, Error> {
        let statements = theory
            .statements()
            .iter()
            .enumerate()
            .map(|(index, statement)| self.statement(index, statement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NormalTheory::new(statements))
    }

    /// Normalizes `statement`, the statement at `index` of its theory.
    pub fn statement(&self, index: usize, statement: &Statement) -> Result<NormalStatement, Error> {
        let location = Location {
            statement: index,
            position: statement.position,
        };
        let mut scope = Scope::new();
        let constraint = self.formula(&statement.expr, &mut scope, location)?;
        Ok(NormalStatement {
            constraint,
            location,
        })
    }

    /// Turns the interpretations of a structure block into statements that fix the values of
    /// the interpreted symbols. The statements are numbered from `first`.
    pub fn structure(
        &self,
        structure: &Interpretations,
        first: usize,
    ) -> Result<Vec<NormalStatement>, Error> {
        structure
            .interpretations()
            .iter()
            .enumerate()
            .map(|(index, interpretation)| {
                let location = Location {
                    statement: first + index,
                    position: interpretation.position,
                };
                let constraint = self.interpretation(interpretation, location)?;
                Ok(NormalStatement {
                    constraint,
                    location,
                })
            })
            .collect()
    }

    fn interpretation(
        &self,
        interpretation: &Interpretation,
        location: Location,
    ) -> Result<Constraint, Error> {
        let name = &interpretation.name;
        let id = self
            .table
            .symbol_id(name.as_str())
            .ok_or_else(|| Error::UndeclaredSymbol {
                name: name.clone(),
                location,
            })?;
        let symbol = self.table.symbol(id);
        let arity = |found: usize| Error::ArityMismatch {
            symbol: name.clone(),
            expected: symbol.arity(),
            found,
            location,
        };
        let value = |ty: TypeId, value: &Value| {
            let def = self.table.type_def(ty);
            if def.contains(value) {
                Ok(Term::constant(value.clone()))
            } else {
                Err(Error::InvalidValue {
                    symbol: name.clone(),
                    value: value.clone(),
                    expected: def.name.clone(),
                    location,
                })
            }
        };

        let (tuples, default) = match &interpretation.body {
            Enumeration::Value(v) => {
                if symbol.arity() != 0 {
                    return Err(arity(0));
                }
                return Ok(fix(Term::Symbol { symbol: id }, value(symbol.out, v)?));
            }
            Enumeration::Table { tuples, default } => (tuples, default),
        };
        if symbol.arity() == 0 {
            return Err(arity(tuples.first().map_or(1, |t| t.args.len())));
        }

        let predicate = symbol.out == TypeId::BOOL;
        let mut listed = HashSet::new();
        let mut constraints = Vec::new();
        for tuple in tuples {
            if tuple.args.len() != symbol.arity() {
                return Err(arity(tuple.args.len()));
            }
            let args = tuple
                .args
                .iter()
                .zip(&symbol.params)
                .map(|(arg, ty)| value(*ty, arg))
                .collect::<Result<Vec<_>, _>>()?;
            let result = match &tuple.value {
                Some(v) => value(symbol.out, v)?,
                None if predicate => Term::constant(true),
                None => {
                    return Err(Error::MissingValue {
                        symbol: name.clone(),
                        location,
                    })
                }
            };
            listed.insert(tuple.args.clone());
            constraints.push(fix(app(id, args), result));
        }

        let default = match default {
            Some(v) => value(symbol.out, v)?,
            None if predicate => Term::constant(false),
            None => {
                let cells = symbol
                    .params
                    .iter()
                    .try_fold(1u128, |acc, ty| acc.checked_mul(self.table.type_def(*ty).size()?));
                if cells == Some(listed.len() as u128) {
                    return Ok(Constraint::and(constraints));
                }
                return Err(Error::MissingDefault {
                    symbol: name.clone(),
                    location,
                });
            }
        };

        let mut params = Vec::new();
        let mut cells: u128 = 1;
        for ty in &symbol.params {
            let def = self.table.type_def(*ty);
            match (def.finite_values(), def.size()) {
                (Some(values), Some(size)) => {
                    params.push(values);
                    cells = cells.saturating_mul(size);
                }
                _ => {
                    return Err(Error::InfiniteQuantifier {
                        sort: def.name.clone(),
                        location,
                    })
                }
            }
        }
        if cells > MAX_INSTANCES {
            return Err(Error::QuantifierTooLarge {
                sort: name.clone(),
                size: cells,
                max: MAX_INSTANCES,
                location,
            });
        }
        for args in params.into_iter().multi_cartesian_product() {
            if !listed.contains(&args) {
                let args = args.into_iter().map(Term::constant).collect();
                constraints.push(fix(app(id, args), default.clone()));
            }
        }
        Ok(Constraint::and(constraints))
    }

    fn mismatch(&self, expected: Sort, found: Sort, location: Location) -> Error {
        Error::TypeMismatch {
            expected: expected.name(self.table),
            found: found.name(self.table),
            location,
        }
    }

    fn formula(&self, expr: &Expr, scope: &mut Scope, location: Location) -> Result<Constraint, Error> {
        match expr {
            Expr::Bool { value } => Ok(Constraint::truth(*value)),
            Expr::Ident { .. } | Expr::App { .. } => {
                let (term, sort) = self.term(expr, scope, location)?;
                if sort != Sort::Bool {
                    return Err(self.mismatch(Sort::Bool, sort, location));
                }
                Ok(Constraint::atom(term))
            }
            Expr::Not { expr } => Ok(Constraint::not(self.formula(expr, scope, location)?)),
            Expr::Binary { op, left, right } => {
                let left = self.formula(left, scope, location)?;
                let right = self.formula(right, scope, location)?;
                Ok(match op {
                    Connective::And => Constraint::and(vec![left, right]),
                    Connective::Or => Constraint::or(vec![left, right]),
                    Connective::Implies => Constraint::or(vec![Constraint::not(left), right]),
                    Connective::Implied => Constraint::or(vec![left, Constraint::not(right)]),
                    Connective::Iff => Constraint::iff(left, right),
                })
            }
            Expr::Compare { op, left, right } => self.comparison(*op, left, right, scope, location),
            Expr::Quant {
                quantifier,
                vars,
                sort,
                body,
            } => {
                let instances = self.instances(vars, sort, scope, location, |scope| {
                    self.formula(body, scope, location)
                })?;
                Ok(match quantifier {
                    Quantifier::Forall => Constraint::and(instances),
                    Quantifier::Exists => Constraint::or(instances),
                })
            }
            Expr::Int { .. } | Expr::Neg { .. } | Expr::Arith { .. } | Expr::Count { .. } => {
                Err(self.mismatch(Sort::Bool, Sort::Int, location))
            }
        }
    }

    fn comparison(
        &self,
        op: CmpOp,
        left: &Expr,
        right: &Expr,
        scope: &mut Scope,
        location: Location,
    ) -> Result<Constraint, Error> {
        let is_formula = |e: &Expr| {
            matches!(
                e,
                Expr::Bool { .. }
                    | Expr::Not { .. }
                    | Expr::Binary { .. }
                    | Expr::Compare { .. }
                    | Expr::Quant { .. }
            )
        };
        if op.is_equality() && (is_formula(left) || is_formula(right)) {
            let left = self.formula(left, scope, location)?;
            let right = self.formula(right, scope, location)?;
            let iff = Constraint::iff(left, right);
            return Ok(if op == CmpOp::Eq { iff } else { Constraint::not(iff) });
        }

        let (left, left_sort) = self.term(left, scope, location)?;
        let (right, right_sort) = self.term(right, scope, location)?;
        if left_sort != right_sort {
            return Err(self.mismatch(left_sort, right_sort, location));
        }
        match left_sort {
            Sort::Int => Ok(Constraint::compare(op, left, right)),
            Sort::Bool if op.is_equality() => {
                let iff = Constraint::iff(Constraint::atom(left), Constraint::atom(right));
                Ok(if op == CmpOp::Eq { iff } else { Constraint::not(iff) })
            }
            Sort::Enum(_) if op.is_equality() => Ok(Constraint::compare(op, left, right)),
            sort => Err(self.mismatch(Sort::Int, sort, location)),
        }
    }

    fn term(&self, expr: &Expr, scope: &mut Scope, location: Location) -> Result<(Term, Sort), Error> {
        match expr {
            Expr::Int { value } => Ok((Term::constant(*value), Sort::Int)),
            Expr::Bool { value } => Ok((Term::constant(*value), Sort::Bool)),
            Expr::Ident { name } => {
                if let Some((_, value, sort)) = scope.iter().rev().find(|(n, _, _)| n == name) {
                    return Ok((Term::constant(value.clone()), *sort));
                }
                match self.table.lookup(name.as_str()) {
                    Some(Entry::Symbol(id)) => {
                        let symbol = self.table.symbol(id);
                        if symbol.arity() != 0 {
                            return Err(Error::ArityMismatch {
                                symbol: name.clone(),
                                expected: symbol.arity(),
                                found: 0,
                                location,
                            });
                        }
                        Ok((Term::Symbol { symbol: id }, Sort::of(self.table, symbol.out)))
                    }
                    Some(Entry::Literal { ty, .. }) => Ok((
                        Term::constant(Value::Literal(name.clone())),
                        Sort::Enum(ty),
                    )),
                    Some(Entry::Type(_)) => Err(Error::TypeMismatch {
                        expected: "value".into(),
                        found: format!("type {}", name),
                        location,
                    }),
                    None => Err(Error::UndeclaredSymbol {
                        name: name.clone(),
                        location,
                    }),
                }
            }
            Expr::App { function, args } => {
                if scope.iter().any(|(n, _, _)| n == function) {
                    return Err(Error::ArityMismatch {
                        symbol: function.clone(),
                        expected: 0,
                        found: args.len(),
                        location,
                    });
                }
                let id = match self.table.lookup(function.as_str()) {
                    Some(Entry::Symbol(id)) => id,
                    Some(_) => {
                        return Err(Error::ArityMismatch {
                            symbol: function.clone(),
                            expected: 0,
                            found: args.len(),
                            location,
                        })
                    }
                    None => {
                        return Err(Error::UndeclaredSymbol {
                            name: function.clone(),
                            location,
                        })
                    }
                };
                let symbol = self.table.symbol(id);
                if symbol.arity() != args.len() {
                    return Err(Error::ArityMismatch {
                        symbol: function.clone(),
                        expected: symbol.arity(),
                        found: args.len(),
                        location,
                    });
                }

                let mut terms = Vec::with_capacity(args.len());
                for (index, (arg, param)) in args.iter().zip(&symbol.params).enumerate() {
                    let (term, sort) = self.term(arg, scope, location)?;
                    let expected = Sort::of(self.table, *param);
                    if sort != expected {
                        return Err(Error::ArgumentMismatch {
                            symbol: function.clone(),
                            index,
                            expected: expected.name(self.table),
                            found: sort.name(self.table),
                            location,
                        });
                    }
                    terms.push(term);
                }
                Ok((
                    Term::App {
                        function: id,
                        args: terms,
                    },
                    Sort::of(self.table, symbol.out),
                ))
            }
            Expr::Neg { expr } => Ok((self.int_term(expr, scope, location)?.scale(-1), Sort::Int)),
            Expr::Arith { op, left, right } => {
                let left = self.int_term(left, scope, location)?;
                let right = self.int_term(right, scope, location)?;
                let term = match op {
                    ArithOp::Add => left.add(right),
                    ArithOp::Sub => left.sub(right),
                    ArithOp::Mul => left.mul(right),
                };
                Ok((term, Sort::Int))
            }
            Expr::Count { vars, sort, body } => {
                let conditions = self.instances(vars, sort, scope, location, |scope| {
                    self.formula(body, scope, location)
                })?;
                Ok((Term::count(conditions), Sort::Int))
            }
            Expr::Not { .. } | Expr::Binary { .. } | Expr::Compare { .. } | Expr::Quant { .. } => {
                match self.formula(expr, scope, location)? {
                    Constraint::Bool { value } => Ok((Term::constant(value), Sort::Bool)),
                    Constraint::Atom { term } => Ok((term, Sort::Bool)),
                    _ => Err(Error::TypeMismatch {
                        expected: "term".into(),
                        found: "formula".into(),
                        location,
                    }),
                }
            }
        }
    }

    fn int_term(&self, expr: &Expr, scope: &mut Scope, location: Location) -> Result<Term, Error> {
        let (term, sort) = self.term(expr, scope, location)?;
        if sort != Sort::Int {
            return Err(self.mismatch(Sort::Int, sort, location));
        }
        Ok(term)
    }

    // Applies `body` on every binding of `vars` to the values of the type named `sort`.
    fn instances<T, F>(
        &self,
        vars: &[Name],
        sort: &Name,
        scope: &mut Scope,
        location: Location,
        body: F,
    ) -> Result<Vec<T>, Error>
    where
        F: Fn(&mut Scope) -> Result<T, Error>,
    {
        let ty = match self.table.lookup(sort.as_str()) {
            Some(Entry::Type(ty)) => ty,
            _ => {
                return Err(Error::UnknownSort {
                    name: sort.clone(),
                    location,
                })
            }
        };
        let def = self.table.type_def(ty);
        let (values, size) = match (def.finite_values(), def.size()) {
            (Some(values), Some(size)) => (values, size),
            _ => {
                return Err(Error::InfiniteQuantifier {
                    sort: sort.clone(),
                    location,
                })
            }
        };
        let instances = u32::try_from(vars.len())
            .ok()
            .and_then(|n| size.checked_pow(n))
            .unwrap_or(u128::MAX);
        if instances > MAX_INSTANCES {
            return Err(Error::QuantifierTooLarge {
                sort: sort.clone(),
                size: instances,
                max: MAX_INSTANCES,
                location,
            });
        }
        let value_sort = Sort::of(self.table, ty);

        let mut result = Vec::new();
        let combinations = vars
            .iter()
            .map(|_| values.clone())
            .multi_cartesian_product();
        for combination in combinations {
            let depth = scope.len();
            for (var, value) in vars.iter().zip(combination) {
                scope.push((var.clone(), value, value_sort));
            }
            let instance = body(scope);
            scope.truncate(depth);
            result.push(instance?);
        }
        Ok(result)
    }
}

// Returns the constraint that `term` has the constant value `value`.
fn fix(term: Term, value: Term) -> Constraint {
    match value.as_const().and_then(Value::as_bool) {
        Some(true) => Constraint::atom(term),
        Some(false) => Constraint::not(Constraint::atom(term)),
        None => Constraint::compare(CmpOp::Eq, term, value),
    }
}

fn app(function: SymbolId, args: Vec<Term>) -> Term {
    Term::App { function, args }
}

/// Normalizes `theory` against `table`.
pub fn normalize(table: &SymbolTable, theory: &Theory) -> Result<NormalTheory, Error> {
    Normalizer::new(table).theory(theory)
}

/// Normalizes the theory of `kb` and appends the statements of its structure block.
pub fn normalize_kb(table: &SymbolTable, kb: &KnowledgeBase) -> Result<NormalTheory, Error> {
    let normalizer = Normalizer::new(table);
    let theory = normalizer.theory(&kb.theory)?;
    let fixed = normalizer.structure(&kb.structure, theory.statements().len())?;
    let mut statements = theory.statements().to_vec();
    statements.extend(fixed);
    Ok(NormalTheory::new(statements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    const VOCABULARY: &str = "vocabulary { p. q : Bool. r. a : Int. b : Int. c : Int. \
        type Color constructed from {red, green, blue}. col : Color. col2 : Color. \
        f : Color * Color -> Color. g : Color -> Bool. h : Color -> Int. \
        type Digit = {0..3}. d : Digit. }";

    fn printed(theory: &str) -> Vec<String> {
        let (table, theory) = normalized(&format!("{} theory {{ {} }}", VOCABULARY, theory));
        theory
            .statements()
            .iter()
            .map(|s| s.constraint.printer(&table).to_string())
            .collect()
    }

    fn failed(theory: &str) -> Error {
        normalize_error(&format!("{} theory {{ {} }}", VOCABULARY, theory))
    }

    fn fixed(structure: &str) -> Result<Vec<String>, Error> {
        let kb = parse_kb(&format!("{} theory {{ a > 0. }} structure {{ {} }}", VOCABULARY, structure));
        let table = SymbolTable::new(&kb.vocabulary).unwrap();
        let theory = normalize_kb(&table, &kb)?;
        Ok(theory
            .statements()
            .iter()
            .map(|s| s.constraint.printer(&table).to_string())
            .collect())
    }

    #[test]
    fn test_structure() {
        assert_eq!(
            vec!["a > 0", "a = 3", "p", "¬q", "col = green"],
            fixed("a := 3. p := true. q := false. col := green.").unwrap()
        );
        assert_eq!(
            vec!["a > 0", "g(red) ∧ (¬g(green)) ∧ (¬g(blue))"],
            fixed("g := {red}.").unwrap()
        );
        assert_eq!(
            vec!["a > 0", "(h(green) = 2) ∧ (h(red) = 0) ∧ (h(blue) = 0)"],
            fixed("h := {green -> 2} else 0.").unwrap()
        );
        assert_eq!(
            vec!["a > 0", "(h(red) = 1) ∧ (h(green) = 2) ∧ (h(blue) = 3)"],
            fixed("h := {red -> 1, green -> 2, blue -> 3}.").unwrap()
        );

        let kb = parse_kb(&format!("{} theory {{ a > 0. b > 0. }} structure {{ d := 2. }}", VOCABULARY));
        let table = SymbolTable::new(&kb.vocabulary).unwrap();
        let theory = normalize_kb(&table, &kb).unwrap();
        assert_eq!(2, theory.statements()[2].location.statement);
    }

    #[test]
    fn test_structure_errors() {
        assert!(matches!(
            fixed("e := 1.").unwrap_err(),
            Error::UndeclaredSymbol { name, .. } if name.as_str() == "e"
        ));
        assert!(matches!(
            fixed("d := 4.").unwrap_err(),
            Error::InvalidValue { value: Value::Int(4), .. }
        ));
        assert!(matches!(
            fixed("col := 1.").unwrap_err(),
            Error::InvalidValue { .. }
        ));
        assert!(matches!(
            fixed("g := {purple}.").unwrap_err(),
            Error::InvalidValue { .. }
        ));
        assert!(matches!(
            fixed("h := 3.").unwrap_err(),
            Error::ArityMismatch { expected: 1, found: 0, .. }
        ));
        assert!(matches!(
            fixed("f := {(red, red, red) -> red} else red.").unwrap_err(),
            Error::ArityMismatch { expected: 2, found: 3, .. }
        ));
        assert!(matches!(
            fixed("h := {red}.").unwrap_err(),
            Error::MissingValue { .. }
        ));
        assert!(matches!(
            fixed("h := {red -> 1}.").unwrap_err(),
            Error::MissingDefault { .. }
        ));
    }

    #[test]
    fn test_connectives() {
        assert_eq!(vec!["p ⇔ (q ∨ r)"], printed("p <=> (q | r)."));
        assert_eq!(vec!["¬r"], printed("~r."));
        assert_eq!(vec!["(¬p) ∨ q"], printed("p => q."));
        assert_eq!(vec!["p ∨ (¬q)"], printed("p <= q."));
        assert_eq!(vec!["p ∧ q ∧ r"], printed("p & (q & r)."));
        assert_eq!(vec!["q"], printed("true & q."));
        assert_eq!(vec!["p ⇔ q"], printed("p = q."));
        assert_eq!(vec!["¬(p ⇔ q)"], printed("p ~= q."));
        assert_eq!(vec!["p ⇔ (a > 1)"], printed("p = (a > 1)."));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(vec!["a + (b * c) = 13"], printed("a + b * c = 13."));
        assert_eq!(vec!["a > 0"], printed("a > 0."));
        assert_eq!(vec!["2·a + -13 = b"], printed("a + a - 13 = b."));
        assert_eq!(vec!["-a ≤ 3"], printed("-a =< 3."));
        assert_eq!(vec!["true"], printed("2 * 3 = 6."));
        assert_eq!(vec!["false"], printed("1 > 2."));
        assert_eq!(vec!["(0 < a) ∧ (a < 6)"], printed("0 < a < 6."));
        assert_eq!(vec!["a ≥ b"], printed("~(a < b)."));
    }

    #[test]
    fn test_enumerations() {
        assert_eq!(vec!["col ≠ red"], printed("col ~= red."));
        assert_eq!(vec!["f(col, col2) ≠ f(col2, col)"], printed("f(col, col2) ~= f(col2, col)."));
        assert_eq!(vec!["false"], printed("red = green."));
        assert_eq!(vec!["g(blue)"], printed("g(blue)."));
    }

    #[test]
    fn test_quantifiers() {
        assert_eq!(
            vec!["g(red) ∧ g(green) ∧ g(blue)"],
            printed("!x in Color: g(x).")
        );
        assert_eq!(
            vec!["(h(red) > 0) ∨ (h(green) > 0) ∨ (h(blue) > 0)"],
            printed("?x in Color: h(x) > 0.")
        );
        assert_eq!(
            vec!["f(red, green) ≠ f(green, red)"],
            printed("!x, y in Color: x = red & y = green => f(x, y) ~= f(y, x).")
        );
        assert_eq!(
            vec!["(1 = d) ∨ (2 = d) ∨ (3 = d)"],
            printed("?x in Digit: x > 0 & x = d.")
        );
        assert_eq!(vec!["true"], printed("!x in Bool: x | ~x."));
    }

    #[test]
    fn test_quantifier_shadowing() {
        assert_eq!(vec!["g(red) ∧ g(green) ∧ g(blue)"], printed("!col in Color: g(col)."));
    }

    #[test]
    fn test_count() {
        assert_eq!(
            vec!["#{g(red), g(green), g(blue)} ≥ 2"],
            printed("#{x in Color: g(x)} >= 2.")
        );
        assert_eq!(vec!["true"], printed("#{x in Color: x ~= red} = 2."));
    }

    #[test]
    fn test_undeclared_symbol() {
        let err = failed("p. s | q.");
        assert_eq!(
            Error::UndeclaredSymbol {
                name: "s".into(),
                location: Location {
                    statement: 1,
                    position: err.location().position,
                },
            },
            err
        );
        assert!(err.to_string().starts_with("undeclared symbol `s` in statement 2"));
        assert!(matches!(failed("k(red)."), Error::UndeclaredSymbol { .. }));
    }

    #[test]
    fn test_arity_mismatch() {
        assert!(matches!(
            failed("f(red) = blue."),
            Error::ArityMismatch { expected: 2, found: 1, .. }
        ));
        assert!(matches!(
            failed("g."),
            Error::ArityMismatch { expected: 1, found: 0, .. }
        ));
        assert!(matches!(
            failed("p(red)."),
            Error::ArityMismatch { expected: 0, found: 1, .. }
        ));
        assert!(matches!(
            failed("!x in Color: x(red)."),
            Error::ArityMismatch { .. }
        ));
    }

    #[test]
    fn test_argument_mismatch() {
        let err = failed("f(red, 3) = red.");
        assert!(matches!(err, Error::ArgumentMismatch { index: 1, .. }));
        assert!(err
            .to_string()
            .starts_with("argument 2 of `f` expects `Color` but found `Int` in statement 1"));
    }

    #[test]
    fn test_type_mismatch() {
        assert!(matches!(failed("p + 1 = 2."), Error::TypeMismatch { .. }));
        assert!(matches!(failed("col < green."), Error::TypeMismatch { .. }));
        assert!(matches!(failed("col = 3."), Error::TypeMismatch { .. }));
        assert!(matches!(failed("a."), Error::TypeMismatch { .. }));
        assert!(matches!(failed("a + 1."), Error::TypeMismatch { .. }));
        assert!(matches!(failed("Color = red."), Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_quantifier_errors() {
        assert!(matches!(
            failed("!x in Int: x > 0."),
            Error::InfiniteQuantifier { .. }
        ));
        assert!(matches!(
            failed("!x in Colour: g(x)."),
            Error::UnknownSort { .. }
        ));
    }

    #[test]
    fn test_quantifier_too_large() {
        let err = normalize_error(
            "vocabulary { type T = {0..9223372036854775807}. t : T. } \
             theory { !x in T: t >= x. }",
        );
        assert!(matches!(
            err,
            Error::QuantifierTooLarge { size, .. } if size == i64::MAX as u128 + 1
        ));

        let err = normalize_error(
            "vocabulary { type D = {1..1000}. n : Int. } theory { n = #{x, y, z in D: x < y}. }",
        );
        assert!(matches!(
            err,
            Error::QuantifierTooLarge { size: 1_000_000_000, .. }
        ));

        let (_, theory) = normalized(
            "vocabulary { type D = {1..100}. n : Int. } theory { n = #{x, y in D: x < y}. }",
        );
        assert_eq!(1, theory.statements().len());
    }

    #[test]
    fn test_statement_order() {
        let (_, theory) = normalized(&format!("{} theory {{ a > 0. b > 1. p. }}", VOCABULARY));
        let indices: Vec<usize> = theory
            .statements()
            .iter()
            .map(|s| s.location.statement)
            .collect();
        assert_eq!(vec![0, 1, 2], indices);
    }
}
