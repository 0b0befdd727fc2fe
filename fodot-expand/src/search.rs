/*! Implements the propagation and backtracking search that enumerates the models of a
[`GroundedProblem`].

The search is a state machine over a trail of [`ChoicePoint`]s. Every choice point saves the
domains before a decision, so backtracking restores them in one step. Propagation revises the
constraints that watch a narrowed variable until a fixpoint is reached or a domain empties:

* a constraint whose scope has a small cross product is revised exactly, keeping only the
  values that appear in some satisfying tuple;
* larger constraints are evaluated over domain bounds in three-valued logic, removing the
  values under which the constraint is certainly false.

Every model found is blocked by a new constraint that excludes it, so a model is never
reported twice.

[`GroundedProblem`]: crate::ground::GroundedProblem
*/
use crate::{
    bounder::{Bounder, StopReason},
    ground::{Constraint, Domain, Expr, GroundedProblem, VarId},
    strategy::{Dispatch, Strategy},
    trace::{CONFLICT, DECIDE, EXHAUSTED, MODEL, STOPPED},
};
use fodot_syntax::syntax::CmpOp;
use itertools::Itertools;
use serde_derive::Serialize;
use std::{collections::VecDeque, fmt, iter::FusedIterator};

// Largest cross product of a constraint scope that is revised by enumerating tuples.
const EXACT_SUPPORT_LIMIT: u128 = 512;

// Largest domain whose values are tested one by one under interval revision.
const FULL_SCAN_LIMIT: usize = 64;

/// Is the state of the search state machine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum State {
    /// Domains were narrowed; propagation is pending.
    Propagating,

    /// Propagation reached a fixpoint; the next variable is chosen.
    Branching,

    /// A conflict (or a reported model) requires undoing the last decision.
    Backtracking,

    /// Every variable is assigned; the assignment is verified and reported.
    Solved,

    /// No choice point is left.
    Exhausted,
}

/// Is a decision on the trail: `var` was assigned `value`, and `saved` holds the domains of
/// all variables just before the assignment.
#[derive(Clone, Debug)]
pub struct ChoicePoint {
    pub var: VarId,
    pub value: i64,
    pub saved: Vec<Domain>,
}

/// Is a complete assignment of encoded values to the variables of a grounded problem.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Assignment {
    values: Vec<i64>,
}

impl Assignment {
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Returns the value of `var`.
    pub fn get(&self, var: VarId) -> i64 {
        self.values[var.0]
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{} = {}", VarId(i), v));
        write!(f, "{}", values.format(", "))
    }
}

/// Counts the work done by a search.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Debug)]
pub struct Stats {
    pub decisions: u64,
    pub conflicts: u64,
    pub backtracks: u64,
    pub propagations: u64,
    pub models: u64,
}

impl Stats {
    /// Adds the counters of `other` to the receiver.
    pub fn merge(&mut self, other: &Stats) {
        self.decisions += other.decisions;
        self.conflicts += other.conflicts;
        self.backtracks += other.backtracks;
        self.propagations += other.propagations;
        self.models += other.models;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "decisions: {}, conflicts: {}, backtracks: {}, propagations: {}, models: {}",
            self.decisions, self.conflicts, self.backtracks, self.propagations, self.models
        )
    }
}

/// Is the bounders consulted by a [`Search`].
pub type Bounders = [Box<dyn Bounder + Send + Sync>];

/// Enumerates the models of a [`GroundedProblem`], one per call to [`Search::next_model`].
pub struct Search<'p> {
    problem: &'p GroundedProblem,

    // the constraints of the problem followed by the blocking constraints of reported models
    constraints: Vec<Constraint>,
    scopes: Vec<Vec<VarId>>,

    // for each variable, the constraints that refer to it
    watches: Vec<Vec<usize>>,

    domains: Vec<Domain>,
    queue: VecDeque<usize>,
    queued: Vec<bool>,
    stack: Vec<ChoicePoint>,
    state: State,
    strategy: Dispatch,
    bounders: &'p Bounders,
    stats: Stats,
    stopped: Option<StopReason>,
}

impl<'p> Search<'p> {
    /// Creates a search over `problem` with the default strategy and no bounders.
    pub fn new(problem: &'p GroundedProblem) -> Self {
        let mut search = Self {
            problem,
            constraints: Vec::new(),
            scopes: Vec::new(),
            watches: vec![Vec::new(); problem.variables().len()],
            domains: problem
                .variables()
                .iter()
                .map(|v| v.domain.clone())
                .collect(),
            queue: VecDeque::new(),
            queued: Vec::new(),
            stack: Vec::new(),
            state: State::Propagating,
            strategy: Dispatch::default(),
            bounders: &[],
            stats: Stats::default(),
            stopped: None,
        };
        for constraint in problem.constraints() {
            let index = search.add_constraint(constraint.clone());
            search.enqueue(index);
        }
        search
    }

    pub fn with_strategy(self, strategy: Dispatch) -> Self {
        Self { strategy, ..self }
    }

    pub fn with_bounders(self, bounders: &'p Bounders) -> Self {
        Self { bounders, ..self }
    }

    /// Removes from the domain of `var` every value not in `values`. Must be called before
    /// the search starts.
    pub fn restrict(mut self, var: VarId, values: &[i64]) -> Self {
        if self.domains[var.0].retain(|v| values.contains(&v)) {
            self.enqueue_watchers(var, None);
        }
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Returns the reason the search was stopped by a bounder, if it was.
    pub fn stopped(&self) -> Option<StopReason> {
        self.stopped
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Returns the variable the search branches on next, according to its strategy.
    pub fn branching_var(&self) -> Option<VarId> {
        self.strategy.select(&self.domains)
    }

    /// Propagates the constraints before any decision is made. Returns false if the problem
    /// is found unsatisfiable.
    pub fn propagate_root(&mut self) -> bool {
        if self.state != State::Propagating || !self.stack.is_empty() {
            return self.state != State::Exhausted;
        }
        if self.propagate() {
            self.state = State::Branching;
            true
        } else {
            self.conflict();
            false
        }
    }

    /// Returns the next model, or `None` when the search is exhausted or stopped.
    pub fn next_model(&mut self) -> Option<Assignment> {
        loop {
            if self.stopped.is_some() {
                return None;
            }
            match self.state {
                State::Propagating => {
                    if self.propagate() {
                        self.state = State::Branching;
                    } else {
                        self.conflict();
                    }
                }
                State::Branching => match self.strategy.select(&self.domains) {
                    None => self.state = State::Solved,
                    Some(var) => {
                        if let Some(reason) = self.bound() {
                            self.stop(reason);
                            continue;
                        }
                        self.decide(var);
                    }
                },
                State::Backtracking => match self.stack.pop() {
                    None => {
                        self.state = State::Exhausted;
                        info!(
                            event = EXHAUSTED,
                            decisions = self.stats.decisions,
                            conflicts = self.stats.conflicts,
                            models = self.stats.models,
                        );
                    }
                    Some(ChoicePoint { var, value, saved }) => {
                        self.domains = saved;
                        self.domains[var.0].remove(value);
                        self.stats.backtracks += 1;
                        self.enqueue_watchers(var, None);
                        self.state = State::Propagating;
                    }
                },
                State::Solved => {
                    let assignment = match self.verified() {
                        Some(assignment) => assignment,
                        None => {
                            self.conflict();
                            continue;
                        }
                    };
                    self.stats.models += 1;
                    info!(event = MODEL, model_id = self.stats.models, model = %assignment);
                    self.block(&assignment);
                    self.state = State::Backtracking;
                    if let Some(reason) = self.bound() {
                        self.stop(reason);
                    }
                    return Some(assignment);
                }
                State::Exhausted => return None,
            }
        }
    }

    fn decide(&mut self, var: VarId) {
        let order = self.problem.variable(var).order;
        let first = self.domains[var.0].values(order).next();
        let value = match first {
            Some(value) => value,
            None => {
                self.conflict();
                return;
            }
        };
        self.stack.push(ChoicePoint {
            var,
            value,
            saved: self.domains.clone(),
        });
        self.domains[var.0].assign(value);
        self.stats.decisions += 1;
        info!(
            event = DECIDE,
            var = self.problem.variable(var).name.as_str(),
            value = value,
            depth = self.stack.len() as u64,
        );
        self.enqueue_watchers(var, None);
        self.state = State::Propagating;
    }

    fn conflict(&mut self) {
        self.stats.conflicts += 1;
        info!(event = CONFLICT, depth = self.stack.len() as u64);
        self.state = State::Backtracking;
    }

    fn stop(&mut self, reason: StopReason) {
        info!(event = STOPPED, reason = %reason);
        self.stopped = Some(reason);
    }

    fn bound(&self) -> Option<StopReason> {
        self.bounders.iter().find_map(|b| b.bound(&self.stats))
    }

    // Returns the current assignment if every domain is a singleton and every constraint
    // holds under it.
    fn verified(&self) -> Option<Assignment> {
        let values: Vec<i64> = self
            .domains
            .iter()
            .map(Domain::singleton)
            .collect::<Option<_>>()?;
        let view = Current(&self.domains);
        if self
            .constraints
            .iter()
            .all(|c| truth(c, &view) == Truth::True)
        {
            Some(Assignment::new(values))
        } else {
            None
        }
    }

    // Adds a constraint that excludes `assignment`.
    fn block(&mut self, assignment: &Assignment) {
        let blocking = Constraint::or(
            assignment
                .values()
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    Constraint::compare(
                        CmpOp::Ne,
                        Expr::Var { var: VarId(i) },
                        Expr::Const { value: *v },
                    )
                })
                .collect(),
        );
        self.add_constraint(blocking);
    }

    fn add_constraint(&mut self, constraint: Constraint) -> usize {
        let index = self.constraints.len();
        let scope = constraint.vars();
        for var in &scope {
            self.watches[var.0].push(index);
        }
        self.constraints.push(constraint);
        self.scopes.push(scope);
        self.queued.push(false);
        index
    }

    fn enqueue(&mut self, index: usize) {
        if !self.queued[index] {
            self.queued[index] = true;
            self.queue.push_back(index);
        }
    }

    fn enqueue_watchers(&mut self, var: VarId, except: Option<usize>) {
        for i in 0..self.watches[var.0].len() {
            let index = self.watches[var.0][i];
            if Some(index) != except {
                self.enqueue(index);
            }
        }
    }

    // Revises queued constraints until the queue is empty. Returns false on conflict.
    fn propagate(&mut self) -> bool {
        while let Some(index) = self.queue.pop_front() {
            self.queued[index] = false;
            self.stats.propagations += 1;
            match self.revise(index) {
                Some(narrowed) => {
                    for var in narrowed {
                        self.enqueue_watchers(var, Some(index));
                    }
                }
                None => {
                    while let Some(index) = self.queue.pop_front() {
                        self.queued[index] = false;
                    }
                    return false;
                }
            }
        }
        true
    }

    // Narrows the domains of the scope of a constraint. Returns the narrowed variables, or
    // `None` if the constraint cannot be satisfied.
    fn revise(&mut self, index: usize) -> Option<Vec<VarId>> {
        let constraint = &self.constraints[index];
        let scope = &self.scopes[index];
        if scope.is_empty() {
            return match truth(constraint, &Current(&self.domains)) {
                Truth::False => None,
                _ => Some(Vec::new()),
            };
        }

        let space = scope.iter().try_fold(1u128, |acc, v| {
            acc.checked_mul(self.domains[v.0].len() as u128)
        });
        let removals = match space {
            Some(space) if space <= EXACT_SUPPORT_LIMIT => {
                exact_removals(constraint, scope, &self.domains)?
            }
            _ => interval_removals(constraint, scope, &self.domains)?,
        };

        let mut narrowed = Vec::new();
        for (var, values) in removals {
            if values.is_empty() {
                continue;
            }
            let domain = &mut self.domains[var.0];
            values.iter().for_each(|v| {
                domain.remove(*v);
            });
            if domain.is_empty() {
                return None;
            }
            narrowed.push(var);
        }
        Some(narrowed)
    }

    /// Consumes the receiver and returns an iterator over its models.
    pub fn solutions(self) -> Solutions<'p> {
        Solutions { search: self }
    }
}

/// Iterates over the models of a [`Search`].
pub struct Solutions<'p> {
    search: Search<'p>,
}

impl<'p> Solutions<'p> {
    pub fn search(&self) -> &Search<'p> {
        &self.search
    }
}

impl<'p> Iterator for Solutions<'p> {
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        self.search.next_model()
    }
}

impl<'p> FusedIterator for Solutions<'p> {}

// Finds, for every variable of `scope`, the values with no satisfying tuple, by enumerating
// the cross product of the scope domains.
fn exact_removals(
    constraint: &Constraint,
    scope: &[VarId],
    domains: &[Domain],
) -> Option<Vec<(VarId, Vec<i64>)>> {
    let values: Vec<Vec<i64>> = scope.iter().map(|v| domains[v.0].iter().collect()).collect();
    let mut supported: Vec<Vec<bool>> = values.iter().map(|vs| vec![false; vs.len()]).collect();
    let mut satisfiable = false;

    for tuple in values
        .iter()
        .map(|vs| 0..vs.len())
        .multi_cartesian_product()
    {
        let fixed: Vec<(VarId, i64)> = scope
            .iter()
            .zip(&tuple)
            .zip(&values)
            .map(|((var, i), vs)| (*var, vs[*i]))
            .collect();
        if truth(constraint, &Fixed { domains, fixed: &fixed }) != Truth::False {
            satisfiable = true;
            supported
                .iter_mut()
                .zip(&tuple)
                .for_each(|(s, i)| s[*i] = true);
        }
    }
    if !satisfiable {
        return None;
    }

    Some(
        scope
            .iter()
            .zip(values)
            .zip(supported)
            .map(|((var, vs), s)| {
                let removed = vs
                    .into_iter()
                    .zip(s)
                    .filter(|(_, s)| !s)
                    .map(|(v, _)| v)
                    .collect();
                (*var, removed)
            })
            .collect(),
    )
}

// Finds values under which `constraint` is certainly false, evaluating over domain bounds.
// Small domains are scanned value by value; larger ones are shaved from both ends.
fn interval_removals(
    constraint: &Constraint,
    scope: &[VarId],
    domains: &[Domain],
) -> Option<Vec<(VarId, Vec<i64>)>> {
    match truth(constraint, &Current(domains)) {
        Truth::False => return None,
        Truth::True => return Some(Vec::new()),
        Truth::Unknown => {}
    }

    let fails = |var: VarId, value: i64| {
        let fixed = [(var, value)];
        truth(constraint, &Fixed { domains, fixed: &fixed }) == Truth::False
    };

    let mut result = Vec::new();
    for var in scope {
        let domain = &domains[var.0];
        if domain.len() <= 1 {
            continue;
        }
        let removed: Vec<i64> = if domain.len() <= FULL_SCAN_LIMIT {
            domain.iter().filter(|v| fails(*var, *v)).collect()
        } else {
            let mut removed: Vec<i64> = domain.iter().take_while(|v| fails(*var, *v)).collect();
            if removed.len() < domain.len() {
                removed.extend(domain.iter().rev().take_while(|v| fails(*var, *v)));
            }
            removed
        };
        result.push((*var, removed));
    }
    Some(result)
}

/// Is a truth value in three-valued logic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }
}

impl From<bool> for Truth {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

// Is a view of the possible values of variables.
trait View {
    fn contains(&self, var: VarId, value: i64) -> bool;

    // Returns the least and greatest possible values of `var`.
    fn bounds(&self, var: VarId) -> (i128, i128);

    fn value(&self, var: VarId) -> Option<i64>;
}

// Is the view of the current domains.
struct Current<'d>(&'d [Domain]);

impl<'d> View for Current<'d> {
    fn contains(&self, var: VarId, value: i64) -> bool {
        self.0[var.0].contains(value)
    }

    fn bounds(&self, var: VarId) -> (i128, i128) {
        let domain = &self.0[var.0];
        match (domain.min(), domain.max()) {
            (Some(lo), Some(hi)) => (lo as i128, hi as i128),
            _ => (0, 0),
        }
    }

    fn value(&self, var: VarId) -> Option<i64> {
        self.0[var.0].singleton()
    }
}

// Is the view of the current domains with some variables fixed to a value.
struct Fixed<'d> {
    domains: &'d [Domain],
    fixed: &'d [(VarId, i64)],
}

impl<'d> Fixed<'d> {
    fn fixed(&self, var: VarId) -> Option<i64> {
        self.fixed
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, value)| *value)
    }
}

impl<'d> View for Fixed<'d> {
    fn contains(&self, var: VarId, value: i64) -> bool {
        match self.fixed(var) {
            Some(fixed) => fixed == value,
            None => Current(self.domains).contains(var, value),
        }
    }

    fn bounds(&self, var: VarId) -> (i128, i128) {
        match self.fixed(var) {
            Some(fixed) => (fixed as i128, fixed as i128),
            None => Current(self.domains).bounds(var),
        }
    }

    fn value(&self, var: VarId) -> Option<i64> {
        self.fixed(var).or_else(|| Current(self.domains).value(var))
    }
}

fn truth<V: View>(constraint: &Constraint, view: &V) -> Truth {
    match constraint {
        Constraint::Bool { value } => Truth::from(*value),
        Constraint::Not { constraint } => truth(constraint, view).not(),
        Constraint::And { constraints } => {
            let mut result = Truth::True;
            for c in constraints {
                match truth(c, view) {
                    Truth::False => return Truth::False,
                    Truth::Unknown => result = Truth::Unknown,
                    Truth::True => {}
                }
            }
            result
        }
        Constraint::Or { constraints } => {
            let mut result = Truth::False;
            for c in constraints {
                match truth(c, view) {
                    Truth::True => return Truth::True,
                    Truth::Unknown => result = Truth::Unknown,
                    Truth::False => {}
                }
            }
            result
        }
        Constraint::Iff { left, right } => match (truth(left, view), truth(right, view)) {
            (Truth::Unknown, _) | (_, Truth::Unknown) => Truth::Unknown,
            (l, r) => Truth::from(l == r),
        },
        Constraint::Compare { op, left, right } => compare(*op, left, right, view),
        Constraint::Guarded { guard, body } => {
            let mut active = true;
            for (var, value) in guard {
                if !view.contains(*var, *value) {
                    return Truth::True;
                }
                if view.value(*var) != Some(*value) {
                    active = false;
                }
            }
            match truth(body, view) {
                Truth::True => Truth::True,
                body if active => body,
                _ => Truth::Unknown,
            }
        }
    }
}

fn compare<V: View>(op: CmpOp, left: &Expr, right: &Expr, view: &V) -> Truth {
    let (a, b) = range(left, view);
    let (c, d) = range(right, view);
    match op {
        CmpOp::Eq => {
            if a == b && c == d {
                Truth::from(a == c)
            } else if b < c || d < a || excluded(left, right, view) {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
        CmpOp::Ne => compare(CmpOp::Eq, left, right, view).not(),
        CmpOp::Lt => {
            if b < c {
                Truth::True
            } else if a >= d {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
        CmpOp::Le => {
            if b <= c {
                Truth::True
            } else if a > d {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
        CmpOp::Gt => compare(CmpOp::Lt, right, left, view),
        CmpOp::Ge => compare(CmpOp::Le, right, left, view),
    }
}

// Returns true if an equality between a variable and a constant is impossible because the
// constant was removed from the domain of the variable.
fn excluded<V: View>(left: &Expr, right: &Expr, view: &V) -> bool {
    match (left, right) {
        (Expr::Var { var }, Expr::Const { value }) | (Expr::Const { value }, Expr::Var { var }) => {
            !view.contains(*var, *value)
        }
        _ => false,
    }
}

// Returns the least and greatest values of `expr` over the view.
fn range<V: View>(expr: &Expr, view: &V) -> (i128, i128) {
    match expr {
        Expr::Const { value } => (*value as i128, *value as i128),
        Expr::Var { var } => view.bounds(*var),
        Expr::Sum { constant, terms } => {
            terms
                .iter()
                .fold((*constant as i128, *constant as i128), |(lo, hi), (k, e)| {
                    let (l, h) = range(e, view);
                    let (l, h) = (l.saturating_mul(*k as i128), h.saturating_mul(*k as i128));
                    (
                        lo.saturating_add(l.min(h)),
                        hi.saturating_add(l.max(h)),
                    )
                })
        }
        Expr::Product { factors } => factors.iter().fold((1, 1), |(lo, hi), e| {
            let (l, h) = range(e, view);
            let corners = [
                lo.saturating_mul(l),
                lo.saturating_mul(h),
                hi.saturating_mul(l),
                hi.saturating_mul(h),
            ];
            (
                corners.iter().copied().min().unwrap_or(0),
                corners.iter().copied().max().unwrap_or(0),
            )
        }),
        Expr::Count { conditions } => {
            let (mut certain, mut possible) = (0, 0);
            for c in conditions {
                match truth(c, view) {
                    Truth::True => {
                        certain += 1;
                        possible += 1;
                    }
                    Truth::Unknown => possible += 1,
                    Truth::False => {}
                }
            }
            (certain, possible)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bounder::{DecisionCap, ModelCap},
        ground::{Cell, ValueOrder, Variable},
        test_prelude::*,
    };
    use fodot_syntax::syntax::SymbolId;

    fn var(i: usize) -> Expr {
        Expr::Var { var: VarId(i) }
    }

    fn int(value: i64) -> Expr {
        Expr::Const { value }
    }

    fn problem(domains: Vec<Domain>, constraints: Vec<Constraint>) -> GroundedProblem {
        let variables = domains
            .into_iter()
            .enumerate()
            .map(|(i, domain)| Variable {
                name: format!("x{}", i),
                domain,
                order: ValueOrder::Ascending,
                cell: Cell::new(SymbolId(i), Vec::new()),
            })
            .collect();
        GroundedProblem::new(variables, constraints)
    }

    #[test]
    fn test_propagate_root() {
        {
            let problem = problem(
                vec![Domain::range(0, 100), Domain::range(0, 100)],
                vec![
                    Constraint::compare(CmpOp::Lt, var(0), var(1)),
                    Constraint::compare(CmpOp::Gt, var(0), int(97)),
                ],
            );
            let mut search = Search::new(&problem);
            assert!(search.propagate_root());
            assert_eq!("{98, 99}", search.domains()[0].to_string());
            assert_eq!("{99, 100}", search.domains()[1].to_string());
        }
        {
            let problem = problem(
                vec![Domain::range(0, 3)],
                vec![
                    Constraint::compare(CmpOp::Gt, var(0), int(2)),
                    Constraint::compare(CmpOp::Lt, var(0), int(2)),
                ],
            );
            let mut search = Search::new(&problem);
            assert!(!search.propagate_root());
            assert_eq!(None, search.next_model());
            assert_eq!(State::Exhausted, search.state());
        }
    }

    #[test]
    fn test_exact_support() {
        let problem = problem(
            vec![Domain::range(0, 2), Domain::range(0, 2)],
            vec![
                Constraint::compare(CmpOp::Ne, var(0), var(1)),
                Constraint::compare(CmpOp::Ne, var(0), int(1)),
                Constraint::compare(CmpOp::Ne, var(1), int(0)),
                Constraint::compare(CmpOp::Ne, var(1), int(2)),
            ],
        );
        let mut search = Search::new(&problem);
        assert!(search.propagate_root());
        assert_eq!("{0, 2}", search.domains()[0].to_string());
        assert_eq!("{1}", search.domains()[1].to_string());
    }

    #[test]
    fn test_guarded() {
        let problem = problem(
            vec![Domain::range(0, 1), Domain::range(0, 5)],
            vec![
                Constraint::guarded(
                    vec![(VarId(0), 1)],
                    Constraint::compare(CmpOp::Eq, var(1), int(3)),
                ),
                Constraint::compare(CmpOp::Eq, var(0), int(1)),
            ],
        );
        let mut search = Search::new(&problem);
        assert!(search.propagate_root());
        assert_eq!("{3}", search.domains()[1].to_string());
    }

    #[test]
    fn test_all_models() {
        let problem = problem(
            vec![Domain::range(1, 3), Domain::range(1, 3)],
            vec![Constraint::compare(CmpOp::Lt, var(0), var(1))],
        );
        let models: Vec<Vec<i64>> = Search::new(&problem)
            .solutions()
            .map(|a| a.values().to_vec())
            .collect();
        assert_eq!(vec![vec![1, 2], vec![1, 3], vec![2, 3]], models);
    }

    #[test]
    fn test_no_variables() {
        {
            let problem = problem(vec![], vec![]);
            assert_eq!(1, Search::new(&problem).solutions().count());
        }
        {
            let problem = problem(vec![], vec![Constraint::truth(false)]);
            assert_eq!(0, Search::new(&problem).solutions().count());
        }
    }

    #[test]
    fn test_value_order() {
        let problem = GroundedProblem::new(
            vec![Variable {
                name: "p".to_string(),
                domain: Domain::range(0, 1),
                order: ValueOrder::Descending,
                cell: Cell::new(SymbolId(0), Vec::new()),
            }],
            Vec::new(),
        );
        let models: Vec<i64> = Search::new(&problem)
            .solutions()
            .map(|a| a.get(VarId(0)))
            .collect();
        assert_eq!(vec![1, 0], models);
    }

    #[test]
    fn test_bounders() {
        let problem = problem(vec![Domain::range(0, 9), Domain::range(0, 9)], vec![]);
        {
            let bounders: Vec<Box<dyn Bounder + Send + Sync>> = vec![Box::new(ModelCap::from(3))];
            let mut solutions = Search::new(&problem).with_bounders(&bounders).solutions();
            assert_eq!(3, solutions.by_ref().count());
            assert_eq!(Some(StopReason::ModelCap), solutions.search().stopped());
            assert_eq!(None, solutions.next());
        }
        {
            let bounders: Vec<Box<dyn Bounder + Send + Sync>> =
                vec![Box::new(DecisionCap::from(1))];
            let mut search = Search::new(&problem).with_bounders(&bounders);
            assert_eq!(None, search.next_model());
            assert_eq!(Some(StopReason::DecisionCap), search.stopped());
        }
    }

    #[test]
    fn test_restrict() {
        let problem = problem(
            vec![Domain::range(0, 3), Domain::range(0, 3)],
            vec![Constraint::compare(CmpOp::Eq, var(0), var(1))],
        );
        let models: Vec<Assignment> = Search::new(&problem)
            .restrict(VarId(1), &[2, 3])
            .solutions()
            .collect();
        assert_eq!(
            vec![Assignment::new(vec![2, 2]), Assignment::new(vec![3, 3])],
            models
        );
    }

    #[test]
    fn test_strategies() {
        let problem = grounded(&read_source("../theories/example.idp"));
        let first_fail: Vec<Assignment> = Search::new(&problem).solutions().sorted().collect();
        let linear: Vec<Assignment> = Search::new(&problem)
            .with_strategy(Dispatch::new_linear())
            .solutions()
            .sorted()
            .collect();
        assert_eq!(72, first_fail.len());
        assert_eq!(first_fail, linear);
    }

    #[test]
    fn test_models_satisfy_theory() {
        let problem = grounded(&read_source("../theories/quantifiers.idp"));
        let models: Vec<Assignment> = Search::new(&problem).solutions().collect();
        assert!(!models.is_empty());
        assert_eq!(models.len(), models.iter().unique().count());
        for model in &models {
            let view = Fixed {
                domains: &[],
                fixed: &model
                    .values()
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (VarId(i), *v))
                    .collect::<Vec<_>>(),
            };
            assert!(problem
                .constraints()
                .iter()
                .all(|c| truth(c, &view) == Truth::True));
        }
    }

    #[test]
    fn test_stats() {
        let problem = grounded(&read_source("../theories/unsat.idp").replace("x < 3", "x < 7"));
        let mut search = Search::new(&problem);
        assert_eq!(Some(Assignment::new(vec![6])), search.next_model());
        assert_eq!(None, search.next_model());
        assert_eq!(1, search.stats().models);
        assert_eq!(0, search.stats().decisions);
    }
}
