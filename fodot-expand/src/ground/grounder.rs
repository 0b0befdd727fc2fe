//! Implements the [`Grounder`] that turns a normalized theory into a [`GroundedProblem`].
use super::{
    bounds::{cell_name, Bounds, Ext},
    domain::{Domain, ValueOrder},
    problem::{Cell, Constraint, Expr, GroundedProblem, VarId, Variable},
};
use crate::Error;
use fodot_syntax::{
    syntax::{CmpOp, SymbolTable, TypeId, TypeValues},
    transform::{Constraint as Normal, Location, NormalTheory, Term},
};
use itertools::Itertools;
use std::collections::HashMap;

/// Is the configuration of the [`Grounder`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GroundConfig {
    /// Is the largest domain an integer symbol may be given.
    pub max_domain_size: usize,

    /// Is the largest number of guarded instances a single statement may expand into.
    pub max_table_size: usize,

    /// Is the maximum number of bound inference rounds.
    pub bound_rounds: usize,
}

impl GroundConfig {
    pub fn max_domain_size(self, max_domain_size: usize) -> Self {
        Self {
            max_domain_size,
            ..self
        }
    }

    pub fn max_table_size(self, max_table_size: usize) -> Self {
        Self {
            max_table_size,
            ..self
        }
    }

    pub fn bound_rounds(self, bound_rounds: usize) -> Self {
        Self {
            bound_rounds,
            ..self
        }
    }
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            max_domain_size: 1 << 16,
            max_table_size: 1 << 20,
            bound_rounds: 64,
        }
    }
}

/// Expands every symbol of a vocabulary into ground variables with finite domains, and every
/// normalized constraint into ground constraints over those variables.
pub struct Grounder<'t> {
    table: &'t SymbolTable,
    config: GroundConfig,
}

// Is the state of grounding one theory.
struct Ground<'t> {
    table: &'t SymbolTable,
    config: GroundConfig,
    variables: Vec<Variable>,
    cells: HashMap<Cell, VarId>,
}

impl<'t> Grounder<'t> {
    pub fn new(table: &'t SymbolTable, config: GroundConfig) -> Self {
        Self { table, config }
    }

    /// Grounds `theory`. The result only depends on the symbol table, the theory and the
    /// configuration.
    pub fn ground(&self, theory: &NormalTheory) -> Result<GroundedProblem, Error> {
        let bounds = Bounds::infer(self.table, theory, self.config.bound_rounds)?;
        let mut ground = Ground {
            table: self.table,
            config: self.config,
            variables: Vec::new(),
            cells: HashMap::new(),
        };
        ground.variables(&bounds)?;

        let mut constraints = Vec::new();
        for (conjunct, location) in theory.conjuncts() {
            let mut instances = 0;
            for constraint in ground.expand(conjunct, Vec::new(), &mut instances, location)? {
                match constraint {
                    Constraint::Bool { value: true } => {}
                    Constraint::And { constraints: cs } => constraints.extend(cs),
                    constraint => constraints.push(constraint),
                }
            }
        }
        Ok(GroundedProblem::new(ground.variables, constraints))
    }
}

impl<'t> Ground<'t> {
    // Creates one variable per 0-ary symbol and per cell of every function, in declaration
    // order. An empty domain is reported before an unbounded or oversized one.
    fn variables(&mut self, bounds: &Bounds) -> Result<(), Error> {
        let table = self.table;
        let mut deferred = None;
        for (id, symbol) in table.symbols() {
            let mut params = Vec::new();
            let mut size: u128 = 1;
            for ty in &symbol.params {
                let def = table.type_def(*ty);
                match (def.finite_values(), def.size()) {
                    (Some(values), Some(n)) => {
                        params.push(values);
                        size = size.saturating_mul(n);
                    }
                    _ => {
                        deferred.get_or_insert(Error::UnboundedDomain {
                            symbol: symbol.name.to_string(),
                        });
                        break;
                    }
                }
            }
            if params.len() < symbol.params.len() {
                continue;
            }
            if size > self.config.max_table_size as u128 {
                deferred.get_or_insert(Error::FunctionTooLarge {
                    symbol: symbol.name.to_string(),
                    size,
                    max: self.config.max_table_size,
                });
                continue;
            }

            let cells: Vec<Cell> = if params.is_empty() {
                vec![Cell::new(id, Vec::new())]
            } else {
                params
                    .into_iter()
                    .multi_cartesian_product()
                    .map(|args| Cell::new(id, args))
                    .collect()
            };
            for cell in cells {
                let (domain, order) = match self.domain(&cell, symbol.out, bounds) {
                    Ok(domain) => domain,
                    Err(err) => {
                        deferred.get_or_insert(err);
                        (Domain::range(0, 0), ValueOrder::Ascending)
                    }
                };
                let var = VarId(self.variables.len());
                self.variables.push(Variable {
                    name: cell_name(table, &cell),
                    domain,
                    order,
                    cell: cell.clone(),
                });
                self.cells.insert(cell, var);
            }
        }

        if let Some(variable) = self.variables.iter().find(|v| v.domain.is_empty()) {
            return Err(Error::EmptyDomain {
                symbol: variable.name.clone(),
            });
        }
        match deferred {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn domain(&self, cell: &Cell, ty: TypeId, bounds: &Bounds) -> Result<(Domain, ValueOrder), Error> {
        match &self.table.type_def(ty).values {
            TypeValues::Bool => Ok((Domain::range(0, 1), ValueOrder::Descending)),
            TypeValues::Literals(literals) => Ok((
                Domain::range(0, literals.len() as i64 - 1),
                ValueOrder::Ascending,
            )),
            TypeValues::Ints(values) => {
                let interval = bounds.interval(cell);
                let domain = values
                    .iter()
                    .copied()
                    .filter(|v| interval.lo <= Ext::Fin(*v) && Ext::Fin(*v) <= interval.hi);
                Ok((Domain::from_values(domain), ValueOrder::Ascending))
            }
            TypeValues::Int | TypeValues::Range { .. } => {
                let interval = bounds.interval(cell);
                let (lo, hi) = interval.finite().ok_or_else(|| Error::UnboundedDomain {
                    symbol: bounds.name(cell),
                })?;
                let size = hi as i128 - lo as i128 + 1;
                if size > self.config.max_domain_size as i128 {
                    return Err(Error::DomainTooLarge {
                        symbol: bounds.name(cell),
                        size,
                        max: self.config.max_domain_size,
                    });
                }
                Ok((Domain::range(lo, hi), ValueOrder::Ascending))
            }
        }
    }

    // Returns the variable that a leaf term stands for.
    fn leaf(&self, term: &Term) -> Option<VarId> {
        let cell = match term {
            Term::Symbol { symbol } => Cell::new(*symbol, Vec::new()),
            Term::App { function, args } => Cell::new(
                *function,
                args.iter()
                    .map(|a| a.as_const().cloned())
                    .collect::<Option<Vec<_>>>()?,
            ),
            _ => return None,
        };
        self.cells.get(&cell).copied()
    }

    // Grounds `constraint` under `guard`. Terms whose values decide the arguments of a
    // function application are replaced by each value in their domain in turn, and every
    // replacement becomes an instance guarded by the values chosen.
    fn expand(
        &self,
        constraint: &Normal,
        guard: Vec<(VarId, i64)>,
        instances: &mut usize,
        location: Location,
    ) -> Result<Vec<Constraint>, Error> {
        let leaves: Vec<(Term, VarId)> = constraint
            .argument_leaves()
            .into_iter()
            .filter_map(|t| self.leaf(&t).map(|v| (t, v)))
            .collect();
        if leaves.is_empty() {
            *instances += 1;
            if *instances > self.config.max_table_size {
                return Err(Error::TableTooLarge {
                    location,
                    max: self.config.max_table_size,
                });
            }
            let body = self.constraint(constraint);
            return Ok(vec![Constraint::guarded(guard, body)]);
        }

        let mut result = Vec::new();
        let combinations = leaves
            .iter()
            .map(|(_, v)| self.variables[v.0].domain.iter().collect_vec())
            .multi_cartesian_product();
        for values in combinations {
            let substitution = |t: &Term| {
                leaves
                    .iter()
                    .zip(&values)
                    .find(|((leaf, _), _)| leaf == t)
                    .and_then(|((_, var), value)| {
                        let ty = self.table.symbol(self.variables[var.0].cell.symbol).out;
                        self.table.decode(ty, *value)
                    })
                    .map(Term::constant)
            };
            let instance = constraint.substitute(&substitution);
            let mut guard = guard.clone();
            guard.extend(leaves.iter().map(|(_, v)| *v).zip(values.iter().copied()));
            result.extend(self.expand(&instance, guard, instances, location)?);
        }
        Ok(result)
    }

    // Grounds a constraint whose function applications all have constant arguments. An
    // atomic comparison that refers to a cell outside the function table is false.
    fn constraint(&self, constraint: &Normal) -> Constraint {
        match constraint {
            Normal::Bool { value } => Constraint::truth(*value),
            Normal::Atom { term } => match self.expr(term) {
                Some(expr) => Constraint::compare(CmpOp::Eq, expr, Expr::Const { value: 1 }),
                None => Constraint::truth(false),
            },
            Normal::Not { constraint } => Constraint::not(self.constraint(constraint)),
            Normal::And { constraints } => {
                Constraint::and(constraints.iter().map(|c| self.constraint(c)).collect())
            }
            Normal::Or { constraints } => {
                Constraint::or(constraints.iter().map(|c| self.constraint(c)).collect())
            }
            Normal::Iff { left, right } => {
                Constraint::iff(self.constraint(left), self.constraint(right))
            }
            Normal::Compare { op, left, right } => match (self.expr(left), self.expr(right)) {
                (Some(left), Some(right)) => Constraint::compare(*op, left, right),
                _ => Constraint::truth(false),
            },
        }
    }

    // Returns `None` if `term` refers to a cell that does not exist.
    fn expr(&self, term: &Term) -> Option<Expr> {
        Some(match term {
            Term::Const { value } => Expr::Const {
                value: self.table.encode(value)?,
            },
            Term::Symbol { .. } | Term::App { .. } => Expr::Var {
                var: self.leaf(term)?,
            },
            Term::Sum { constant, terms } => Expr::Sum {
                constant: *constant,
                terms: terms
                    .iter()
                    .map(|(k, t)| self.expr(t).map(|e| (*k, e)))
                    .collect::<Option<Vec<_>>>()?,
            },
            Term::Product { factors } => Expr::Product {
                factors: factors
                    .iter()
                    .map(|t| self.expr(t))
                    .collect::<Option<Vec<_>>>()?,
            },
            Term::Count { conditions } => Expr::Count {
                conditions: conditions.iter().map(|c| self.constraint(c)).collect(),
            },
        })
    }
}

/// Grounds `theory` against `table` with the default [`GroundConfig`].
pub fn ground_theory(table: &SymbolTable, theory: &NormalTheory) -> Result<GroundedProblem, Error> {
    Grounder::new(table, GroundConfig::default()).ground(theory)
}
