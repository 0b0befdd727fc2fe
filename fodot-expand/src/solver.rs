//! Implements the [`Solver`], the entry point for running the search on a grounded problem,
//! sequentially or split across worker threads.
use crate::{
    bounder::{Bounder, StopReason},
    ground::{Domain, GroundedProblem, VarId},
    search::{Assignment, Search, Solutions, Stats},
    strategy::Dispatch,
};
use std::{fmt, sync::mpsc, thread};

/// Is what the caller asks the search for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Mode {
    FirstModel,
    AllModels,
    /// Counts the models without keeping them.
    CountModels,
}

impl Default for Mode {
    fn default() -> Self {
        Self::FirstModel
    }
}

/// Is the result of a search.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Outcome<T> {
    /// The models found, for `FirstModel` and `AllModels`.
    Models(Vec<T>),

    /// The number of models, for `CountModels`.
    Count(u64),

    /// The problem has no model.
    Unsatisfiable,

    /// A bounder stopped the search; `models` and `count` hold what was found before it did.
    Stopped {
        models: Vec<T>,
        count: u64,
        reason: StopReason,
    },
}

impl<T> Outcome<T> {
    /// Applies `f` on every model of the receiver.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Models(models) => Outcome::Models(models.into_iter().map(f).collect()),
            Self::Count(count) => Outcome::Count(count),
            Self::Unsatisfiable => Outcome::Unsatisfiable,
            Self::Stopped {
                models,
                count,
                reason,
            } => Outcome::Stopped {
                models: models.into_iter().map(f).collect(),
                count,
                reason,
            },
        }
    }

    /// Returns the models in the receiver, if any.
    pub fn models(&self) -> &[T] {
        match self {
            Self::Models(models) | Self::Stopped { models, .. } => models,
            _ => &[],
        }
    }

    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Self::Unsatisfiable)
    }
}

impl<T> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Models(models) => write!(f, "{} model(s)", models.len()),
            Self::Count(count) => write!(f, "{} model(s)", count),
            Self::Unsatisfiable => write!(f, "unsatisfiable"),
            Self::Stopped { count, reason, .. } => {
                write!(f, "stopped after {} model(s): {}", count, reason)
            }
        }
    }
}

/// Is an [`Outcome`] together with the statistics of the search that produced it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Expansion<T> {
    pub outcome: Outcome<T>,
    pub stats: Stats,
}

/// Runs the search on grounded problems.
pub struct Solver {
    mode: Mode,
    strategy: Dispatch,
    bounders: Vec<Box<dyn Bounder + Send + Sync>>,
    workers: usize,
}

impl Solver {
    /// Creates a sequential solver with the default strategy and no bounders.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            strategy: Dispatch::default(),
            bounders: Vec::new(),
            workers: 1,
        }
    }

    pub fn with_strategy(self, strategy: Dispatch) -> Self {
        Self { strategy, ..self }
    }

    /// Adds `bounder` to the bounders of the solver.
    pub fn with_bounder<B: Bounder + Send + Sync + 'static>(mut self, bounder: B) -> Self {
        self.bounders.push(Box::new(bounder));
        self
    }

    /// Splits the search across `workers` threads (at least one).
    pub fn with_workers(self, workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            ..self
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn search<'p>(&'p self, problem: &'p GroundedProblem) -> Search<'p> {
        Search::new(problem)
            .with_strategy(self.strategy)
            .with_bounders(&self.bounders)
    }

    /// Returns a lazy iterator over the models of `problem`, ignoring the mode of the solver.
    pub fn solutions<'p>(&'p self, problem: &'p GroundedProblem) -> Solutions<'p> {
        self.search(problem).solutions()
    }

    /// Searches `problem` according to the mode of the solver.
    pub fn solve(&self, problem: &GroundedProblem) -> Expansion<Assignment> {
        if self.workers > 1 {
            self.solve_parallel(problem)
        } else {
            self.solve_sequential(problem)
        }
    }

    fn solve_sequential(&self, problem: &GroundedProblem) -> Expansion<Assignment> {
        let mut search = self.search(problem);
        let found = collect(&mut search, self.mode);
        Expansion {
            outcome: found.outcome(self.mode),
            stats: *search.stats(),
        }
    }

    // Splits the values of the first branching variable into contiguous chunks, one per
    // worker, and merges the results in worker order.
    fn solve_parallel(&self, problem: &GroundedProblem) -> Expansion<Assignment> {
        let mut root = Search::new(problem).with_strategy(self.strategy);
        if !root.propagate_root() {
            return Expansion {
                outcome: Outcome::Unsatisfiable,
                stats: *root.stats(),
            };
        }
        let var = match root.branching_var() {
            Some(var) => var,
            None => return self.solve_sequential(problem),
        };
        let order = problem.variable(var).order;
        let values: Vec<i64> = root.domains()[var.0].values(order).collect();
        let size = (values.len() + self.workers - 1) / self.workers;

        let (sender, receiver) = mpsc::channel();
        thread::scope(|scope| {
            for (worker, chunk) in values.chunks(size).enumerate() {
                let sender = sender.clone();
                scope.spawn(move || {
                    let mut search = self.search(problem).restrict(var, chunk);
                    let found = collect(&mut search, self.mode);
                    let _ = sender.send((worker, found, *search.stats()));
                });
            }
        });
        drop(sender);

        let mut results: Vec<(usize, Found, Stats)> = receiver.into_iter().collect();
        results.sort_by_key(|(worker, _, _)| *worker);

        let mut stats = *root.stats();
        let mut merged = Found::default();
        for (_, found, worker_stats) in results {
            stats.merge(&worker_stats);
            merged.count += found.count;
            merged.models.extend(found.models);
            merged.stopped = merged.stopped.or(found.stopped);
        }
        if let Some(limit) = self.model_limit() {
            if merged.count >= limit {
                merged.models.truncate(limit as usize);
                merged.count = limit;
                merged.stopped = Some(StopReason::ModelCap);
            }
        }
        if self.mode == Mode::FirstModel {
            merged.models.truncate(1);
            merged.count = merged.count.min(1);
            if merged.count == 1 {
                merged.stopped = None;
            }
        }
        Expansion {
            outcome: merged.outcome(self.mode),
            stats,
        }
    }

    // The tightest model cap among the bounders; every worker obeys it separately.
    fn model_limit(&self) -> Option<u64> {
        self.bounders.iter().filter_map(|b| b.model_limit()).min()
    }

    /// Returns true if `problem` has a model.
    pub fn check(&self, problem: &GroundedProblem) -> bool {
        Search::new(problem)
            .with_strategy(self.strategy)
            .next_model()
            .is_some()
    }

    /// Returns, for every variable of `problem`, the values it takes in some model, or `None`
    /// if `problem` has no model. A value whose search was stopped by a bounder is kept.
    pub fn consequences(&self, problem: &GroundedProblem) -> Option<Vec<Domain>> {
        let mut root = Search::new(problem).with_strategy(self.strategy);
        if !root.propagate_root() {
            return None;
        }
        let domains = root.domains().to_vec();
        let mut supported: Vec<Vec<i64>> = vec![Vec::new(); domains.len()];

        for (i, domain) in domains.iter().enumerate() {
            for value in domain.iter() {
                if supported[i].contains(&value) {
                    continue;
                }
                let mut search = self.search(problem).restrict(VarId(i), &[value]);
                match search.next_model() {
                    Some(model) => {
                        for (j, v) in model.values().iter().enumerate() {
                            if !supported[j].contains(v) {
                                supported[j].push(*v);
                            }
                        }
                    }
                    None if search.stopped().is_some() => supported[i].push(value),
                    None => {}
                }
            }
        }

        if supported.iter().any(Vec::is_empty) {
            return None;
        }
        Some(supported.into_iter().map(Domain::from_values).collect())
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

// Is what a single search found.
#[derive(Default)]
struct Found {
    models: Vec<Assignment>,
    count: u64,
    stopped: Option<StopReason>,
}

impl Found {
    fn outcome(self, mode: Mode) -> Outcome<Assignment> {
        match self.stopped {
            Some(reason) => Outcome::Stopped {
                models: self.models,
                count: self.count,
                reason,
            },
            None if self.count == 0 => Outcome::Unsatisfiable,
            None => match mode {
                Mode::CountModels => Outcome::Count(self.count),
                _ => Outcome::Models(self.models),
            },
        }
    }
}

fn collect(search: &mut Search<'_>, mode: Mode) -> Found {
    let mut found = Found::default();
    while let Some(model) = search.next_model() {
        found.count += 1;
        if mode != Mode::CountModels {
            found.models.push(model);
        }
        if mode == Mode::FirstModel {
            break;
        }
    }
    found.stopped = search.stopped();
    if mode == Mode::FirstModel && found.count == 1 {
        found.stopped = None;
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bounder::{Cancellation, ModelCap},
        test_prelude::*,
    };
    use itertools::Itertools;

    #[test]
    fn test_modes() {
        let problem = grounded(&read_source("../theories/example.idp"));
        {
            let expansion = Solver::new(Mode::FirstModel).solve(&problem);
            assert_eq!(1, expansion.outcome.models().len());
            assert_eq!(1, expansion.stats.models);
        }
        {
            let expansion = Solver::new(Mode::AllModels).solve(&problem);
            assert_eq!(72, expansion.outcome.models().len());
            assert_eq!(
                72,
                expansion.outcome.models().iter().unique().count()
            );
        }
        {
            let expansion = Solver::new(Mode::CountModels).solve(&problem);
            assert_eq!(Outcome::Count(72), expansion.outcome);
        }
    }

    #[test]
    fn test_linear_equation() {
        let (table, theory) = normalized(&read_source("../theories/example.idp"));
        let problem = crate::ground::ground_theory(&table, &theory).unwrap();
        let models = Solver::new(Mode::AllModels).solve(&problem).outcome;
        let (a, b, c) = (VarId(3), VarId(4), VarId(5));
        let mut solutions: Vec<(i64, i64, i64)> = models
            .models()
            .iter()
            .map(|m| (m.get(a), m.get(b), m.get(c)))
            .unique()
            .collect();
        solutions.sort();
        assert_eq!(
            vec![
                (1, 2, 6),
                (1, 3, 4),
                (1, 4, 3),
                (1, 6, 2),
                (3, 2, 5),
                (3, 5, 2),
                (4, 3, 3),
                (5, 2, 4),
                (5, 4, 2)
            ],
            solutions
        );
        for (a, b, c) in solutions {
            assert!(a + b * c == 13 && a > 0 && a < 6 && b > 1 && c > 1);
        }
    }

    #[test]
    fn test_unsatisfiable() {
        let problem = grounded("vocabulary { p. } theory { p. ~p. }");
        assert_eq!(
            Outcome::Unsatisfiable,
            Solver::new(Mode::AllModels).solve(&problem).outcome
        );
        assert_eq!(
            Outcome::Unsatisfiable,
            Solver::new(Mode::CountModels).solve(&problem).outcome
        );
        assert!(!Solver::default().check(&problem));
        assert_eq!(None, Solver::default().consequences(&problem));
    }

    #[test]
    fn test_model_cap() {
        let problem = grounded(&read_source("../theories/example.idp"));
        let outcome = Solver::new(Mode::AllModels)
            .with_bounder(ModelCap::from(5))
            .solve(&problem)
            .outcome;
        assert!(matches!(
            &outcome,
            Outcome::Stopped { models, count: 5, reason: StopReason::ModelCap } if models.len() == 5
        ));
    }

    #[test]
    fn test_cancellation() {
        let problem = grounded(&read_source("../theories/example.idp"));
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let outcome = Solver::new(Mode::AllModels)
            .with_bounder(cancellation)
            .solve(&problem)
            .outcome;
        assert_eq!(
            Outcome::Stopped {
                models: vec![],
                count: 0,
                reason: StopReason::Cancelled
            },
            outcome
        );
    }

    #[test]
    fn test_parallel() {
        for source in &[
            "../theories/example.idp",
            "../theories/colors.idp",
            "../theories/quantifiers.idp",
        ] {
            let problem = grounded(&read_source(source));
            let sequential: Vec<Assignment> = Solver::new(Mode::AllModels)
                .solve(&problem)
                .outcome
                .models()
                .iter()
                .cloned()
                .sorted()
                .collect();
            for workers in 2..5 {
                let parallel: Vec<Assignment> = Solver::new(Mode::AllModels)
                    .with_workers(workers)
                    .solve(&problem)
                    .outcome
                    .models()
                    .iter()
                    .cloned()
                    .sorted()
                    .collect();
                assert_eq!(sequential, parallel);
            }
        }
        {
            let problem = grounded(&read_source("../theories/example.idp"));
            let expansion = Solver::new(Mode::CountModels).with_workers(3).solve(&problem);
            assert_eq!(Outcome::Count(72), expansion.outcome);
            let expansion = Solver::new(Mode::FirstModel).with_workers(3).solve(&problem);
            assert_eq!(1, expansion.outcome.models().len());
        }
        {
            let problem = grounded("vocabulary { p. } theory { p. ~p. }");
            let expansion = Solver::new(Mode::AllModels).with_workers(4).solve(&problem);
            assert_eq!(Outcome::Unsatisfiable, expansion.outcome);
        }
    }

    #[test]
    fn test_parallel_model_cap() {
        let problem = grounded(&read_source("../theories/example.idp"));
        for workers in 2..5 {
            let outcome = Solver::new(Mode::AllModels)
                .with_bounder(ModelCap::from(5))
                .with_workers(workers)
                .solve(&problem)
                .outcome;
            assert!(matches!(
                &outcome,
                Outcome::Stopped { models, count: 5, reason: StopReason::ModelCap } if models.len() == 5
            ));
            let outcome = Solver::new(Mode::CountModels)
                .with_bounder(ModelCap::from(5))
                .with_workers(workers)
                .solve(&problem)
                .outcome;
            assert!(matches!(
                &outcome,
                Outcome::Stopped { count: 5, reason: StopReason::ModelCap, .. }
            ));
        }
        {
            let outcome = Solver::new(Mode::AllModels)
                .with_bounder(ModelCap::from(100))
                .with_workers(3)
                .solve(&problem)
                .outcome;
            assert_eq!(72, outcome.models().len());
            assert!(matches!(outcome, Outcome::Models(_)));
        }
    }

    #[test]
    fn test_consequences() {
        let problem = grounded(&read_source("../theories/example.idp"));
        let domains = Solver::default().consequences(&problem).unwrap();
        let printed: Vec<String> = domains.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            vec![
                "{0, 1}",
                "{0, 1}",
                "{0}",
                "{1, 3, 4, 5}",
                "{2, 3, 4, 5, 6}",
                "{2, 3, 4, 5, 6}",
                "{1, 2}",
                "{0, 1, 2}",
                "{0, 1, 2}"
            ],
            printed
        );
    }

    #[test]
    fn test_solutions() {
        let problem = grounded(&read_source("../theories/colors.idp"));
        let solver = Solver::default();
        let mut solutions = solver.solutions(&problem);
        assert_eq!(4, solutions.by_ref().count());
        assert_eq!(None, solutions.next());
    }
}
