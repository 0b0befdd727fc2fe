//! Implements [`Context`], which owns everything built from one knowledge base and runs the
//! pipeline from grounding to reporting.
use crate::{
    ground::{GroundConfig, GroundedProblem, Grounder},
    model::{Consequences, Model},
    search::{Assignment, Stats},
    solver::{Expansion, Outcome, Solver},
    Error,
};
use fodot_syntax::{
    syntax::{KnowledgeBase, SymbolTable},
    transform::{normalize_kb, NormalTheory},
};

/// Holds the symbol table and the normalized theory of a knowledge base, together with the
/// configuration of the grounder. A context is built once per theory and may be expanded any
/// number of times.
///
/// **Example**:
/// ```rust
/// use fodot_syntax::syntax::KnowledgeBase;
/// use fodot_expand::{context::Context, solver::{Mode, Solver}};
///
/// let kb: KnowledgeBase = r#"
///     vocabulary { a, b : Int. }
///     theory { a + b = 4. a > 0. b > 2. }
/// "#.parse().unwrap();
/// let context = Context::new(&kb).unwrap();
/// let expansion = context.expand(&Solver::new(Mode::AllModels)).unwrap();
///
/// assert_eq!("a := 1.\nb := 3.\n", expansion.outcome.models()[0].to_string());
/// ```
pub struct Context {
    table: SymbolTable,
    theory: NormalTheory,
    config: GroundConfig,
}

impl Context {
    /// Resolves and normalizes `kb` with the default [`GroundConfig`].
    pub fn new(kb: &KnowledgeBase) -> Result<Self, Error> {
        Self::with_config(kb, GroundConfig::default())
    }

    pub fn with_config(kb: &KnowledgeBase, config: GroundConfig) -> Result<Self, Error> {
        let table = SymbolTable::new(&kb.vocabulary)?;
        let theory = normalize_kb(&table, kb)?;
        Ok(Self {
            table,
            theory,
            config,
        })
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn theory(&self) -> &NormalTheory {
        &self.theory
    }

    pub fn config(&self) -> &GroundConfig {
        &self.config
    }

    pub fn ground(&self) -> Result<GroundedProblem, Error> {
        Grounder::new(&self.table, self.config).ground(&self.theory)
    }

    // Grounds the theory; `None` if grounding finds an empty domain.
    fn ground_satisfiable(&self) -> Result<Option<GroundedProblem>, Error> {
        match self.ground() {
            Ok(problem) => Ok(Some(problem)),
            Err(Error::EmptyDomain { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Grounds the theory and searches for its models with `solver`. An empty domain is
    /// reported as [`Outcome::Unsatisfiable`] without search.
    pub fn expand(&self, solver: &Solver) -> Result<Expansion<Model>, Error> {
        let problem = match self.ground_satisfiable()? {
            Some(problem) => problem,
            None => {
                return Ok(Expansion {
                    outcome: Outcome::Unsatisfiable,
                    stats: Stats::default(),
                })
            }
        };
        let expansion = solver.solve(&problem);
        Ok(Expansion {
            outcome: expansion
                .outcome
                .map(|assignment| self.report(&problem, &assignment)),
            stats: expansion.stats,
        })
    }

    /// Returns true if the theory has a model.
    pub fn check(&self) -> Result<bool, Error> {
        Ok(match self.ground_satisfiable()? {
            Some(problem) => Solver::default().check(&problem),
            None => false,
        })
    }

    /// Returns the values every ground symbol takes in some model, or `None` if the theory has
    /// no model.
    pub fn propagate(&self, solver: &Solver) -> Result<Option<Consequences>, Error> {
        let problem = match self.ground_satisfiable()? {
            Some(problem) => problem,
            None => return Ok(None),
        };
        Ok(solver
            .consequences(&problem)
            .map(|domains| Consequences::new(&self.table, &problem, &domains)))
    }

    /// Translates `assignment`, a model of `problem`, into a [`Model`].
    pub fn report(&self, problem: &GroundedProblem, assignment: &Assignment) -> Model {
        Model::new(&self.table, problem, assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Interp, solver::Mode, test_prelude::*};
    use fodot_syntax::syntax::Value;

    #[test]
    fn test_expand() {
        let context = Context::new(&read_kb("../theories/example.idp")).unwrap();
        let expansion = context.expand(&Solver::new(Mode::AllModels)).unwrap();
        let models = expansion.outcome.models();
        assert_eq!(72, models.len());
        for model in models {
            for statement in context.theory().statements() {
                assert_eq!(Some(true), statement.constraint.evaluate(model));
            }
            let col = model.get("col").unwrap();
            assert_ne!(
                &Interp::Value {
                    value: Value::Literal("red".into())
                },
                col
            );
            let colors: Vec<&Interp> = ["col", "col2", "col3"]
                .iter()
                .map(|c| model.get(c).unwrap())
                .collect();
            assert!(colors[0] != colors[1] && colors[1] != colors[2] && colors[2] != colors[0]);
        }
    }

    #[test]
    fn test_empty_domain() {
        let context = Context::new(&read_kb("../theories/unsat.idp")).unwrap();
        let expansion = context.expand(&Solver::new(Mode::AllModels)).unwrap();
        assert_eq!(Outcome::Unsatisfiable, expansion.outcome);
        assert_eq!(Stats::default(), expansion.stats);
        assert!(!context.check().unwrap());
        assert_eq!(None, context.propagate(&Solver::default()).unwrap());
    }

    #[test]
    fn test_errors() {
        {
            let kb = parse_kb("vocabulary { a : Color. } theory { }");
            assert!(matches!(Context::new(&kb), Err(Error::Declaration { .. })));
        }
        {
            let kb = parse_kb("vocabulary { a : Int. } theory { b > 1. }");
            assert!(matches!(Context::new(&kb), Err(Error::Reference { .. })));
        }
        {
            let kb = parse_kb("vocabulary { a : Int. } theory { a ~= 1. }");
            let context = Context::new(&kb).unwrap();
            assert!(matches!(
                context.expand(&Solver::default()),
                Err(Error::UnboundedDomain { symbol }) if symbol == "a"
            ));
            assert!(context.check().is_err());
        }
    }

    #[test]
    fn test_propagate() {
        let context = Context::new(&read_kb("../theories/arith.idp")).unwrap();
        let consequences = context.propagate(&Solver::default()).unwrap().unwrap();
        assert_eq!(
            Some(&[Value::Int(3), Value::Int(4), Value::Int(5)][..]),
            consequences.get("x")
        );
        assert_eq!(
            Some(&[Value::Int(7), Value::Int(8), Value::Int(9)][..]),
            consequences.get("y")
        );
    }

    #[test]
    fn test_wide_constants() {
        let context = Context::new(&parse_kb(
            "vocabulary { x : Int. } \
             theory { x >= 0. x =< 1. x + 9223372036854775807 = 9223372036854775807 + 1. }",
        ))
        .unwrap();
        let expansion = context.expand(&Solver::new(Mode::AllModels)).unwrap();
        let models = expansion.outcome.models();
        assert_eq!(1, models.len());
        assert_eq!("x := 1.\n", models[0].to_string());
    }

    #[test]
    fn test_sparse_types() {
        {
            let context = Context::new(&parse_kb(
                "vocabulary { type Big = {0, 1000000000000000}. b : Big. } theory { b > 0. }",
            ))
            .unwrap();
            let expansion = context.expand(&Solver::new(Mode::AllModels)).unwrap();
            let models = expansion.outcome.models();
            assert_eq!(1, models.len());
            assert_eq!("b := 1000000000000000.\n", models[0].to_string());
        }
        {
            let context = Context::new(&parse_kb(
                "vocabulary { type Far = {-9000000000000000000, 9000000000000000000}. \
                 s : Far. t : Far. } theory { s ~= t. }",
            ))
            .unwrap();
            let expansion = context.expand(&Solver::new(Mode::CountModels)).unwrap();
            assert_eq!(Outcome::Count(2), expansion.outcome);
        }
        {
            let context = Context::new(&parse_kb(
                "vocabulary { type T = {0..9223372036854775807}. t : T. } \
                 theory { t > 9223372036854775805. }",
            ))
            .unwrap();
            let expansion = context.expand(&Solver::new(Mode::CountModels)).unwrap();
            assert_eq!(Outcome::Count(2), expansion.outcome);
        }
        {
            let context = Context::new(&parse_kb(
                "vocabulary { type T = {0..9223372036854775807}. t : T. } theory { }",
            ))
            .unwrap();
            assert!(matches!(
                context.expand(&Solver::default()),
                Err(Error::DomainTooLarge { .. })
            ));
        }
    }

    #[test]
    fn test_structure() {
        let context = Context::new(&read_kb("../theories/structure.idp")).unwrap();
        let expansion = context.expand(&Solver::new(Mode::AllModels)).unwrap();
        let models = expansion.outcome.models();
        assert_eq!(2, models.len());
        let mut cols: Vec<String> = models
            .iter()
            .map(|m| match m.get("col") {
                Some(Interp::Value { value }) => value.to_string(),
                _ => String::new(),
            })
            .collect();
        cols.sort();
        assert_eq!(vec!["blue", "green"], cols);
        for model in models {
            assert_eq!(
                Some(&Interp::Value {
                    value: Value::Bool(true)
                }),
                model.get("p")
            );
        }

        let kb = parse_kb("vocabulary { x : Int. } theory { x > 0. } structure { x := 0. }");
        let context = Context::new(&kb).unwrap();
        assert!(!context.check().unwrap());
        let kb = parse_kb("vocabulary { x : Int. } theory { } structure { x := y. }");
        assert!(matches!(Context::new(&kb), Err(Error::Reference { .. })));
    }

    #[test]
    fn test_check() {
        let context = Context::new(&read_kb("../theories/quantifiers.idp")).unwrap();
        assert!(context.check().unwrap());
    }
}
