//! Implements strategies for selecting the variable to branch on.
//!
//! The strategies are instances of [`Strategy`].
use crate::ground::{Domain, VarId};

/// Is the trait of algorithms for choosing the next variable to branch on.
pub trait Strategy {
    /// Returns an unassigned variable (one whose domain has more than one value), or `None` if
    /// every variable is assigned.
    fn select(&self, domains: &[Domain]) -> Option<VarId>;
}

/// Chooses the variable with the fewest remaining values, breaking ties by declaration order.
#[derive(Clone, Copy, Default, Debug)]
pub struct FirstFail;

impl Strategy for FirstFail {
    fn select(&self, domains: &[Domain]) -> Option<VarId> {
        domains
            .iter()
            .enumerate()
            .filter(|(_, d)| d.len() > 1)
            .min_by_key(|(i, d)| (d.len(), *i))
            .map(|(i, _)| VarId(i))
    }
}

/// Chooses the first unassigned variable in declaration order.
#[derive(Clone, Copy, Default, Debug)]
pub struct Linear;

impl Strategy for Linear {
    fn select(&self, domains: &[Domain]) -> Option<VarId> {
        domains.iter().position(|d| d.len() > 1).map(VarId)
    }
}

/// Is a wrapper around other implementations of strategy, preferred over a trait object where a
/// choice among strategies is desirable.
#[derive(Clone, Copy, Debug)]
pub enum Dispatch {
    /// Wraps a [`FirstFail`] strategy.
    FirstFail { strategy: FirstFail },

    /// Wraps a [`Linear`] strategy.
    Linear { strategy: Linear },
}

impl Dispatch {
    /// Returns a [`FirstFail`], wrapped in a `Dispatch` strategy.
    pub fn new_first_fail() -> Self {
        Self::FirstFail {
            strategy: FirstFail,
        }
    }

    /// Returns a [`Linear`], wrapped in a `Dispatch` strategy.
    pub fn new_linear() -> Self {
        Self::Linear { strategy: Linear }
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Self::new_first_fail()
    }
}

impl Strategy for Dispatch {
    fn select(&self, domains: &[Domain]) -> Option<VarId> {
        match self {
            Self::FirstFail { strategy } => strategy.select(domains),
            Self::Linear { strategy } => strategy.select(domains),
        }
    }
}
