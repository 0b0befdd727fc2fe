//! Implements bounders that stop the search early.
//!
//! The bounders are instances of [`Bounder`]; the search consults them before every branch
//! decision and after every model.
use crate::search::Stats;
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Is the reason the search stopped before it was exhausted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StopReason {
    /// The requested number of models was found.
    ModelCap,

    /// The caller cancelled the search.
    Cancelled,

    /// The search made the maximum number of branch decisions.
    DecisionCap,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ModelCap => write!(f, "model limit reached"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::DecisionCap => write!(f, "decision limit reached"),
        }
    }
}

/// Is the trait of algorithms for bounding the search.
pub trait Bounder {
    /// Returns a reason to stop, given the statistics of the search so far.
    fn bound(&self, stats: &Stats) -> Option<StopReason>;

    /// Returns the number of models after which the receiver stops any search, if it has one.
    /// Searches that run on separate threads use it to cap their merged result.
    fn model_limit(&self) -> Option<u64> {
        None
    }
}

/// Stops the search once `max` models are found.
#[derive(Clone, Copy, Debug)]
pub struct ModelCap {
    max: u64,
}

impl From<u64> for ModelCap {
    fn from(max: u64) -> Self {
        Self { max }
    }
}

impl Bounder for ModelCap {
    fn bound(&self, stats: &Stats) -> Option<StopReason> {
        if stats.models >= self.max {
            Some(StopReason::ModelCap)
        } else {
            None
        }
    }

    fn model_limit(&self) -> Option<u64> {
        Some(self.max)
    }
}

/// Stops the search once `max` branch decisions are made.
#[derive(Clone, Copy, Debug)]
pub struct DecisionCap {
    max: u64,
}

impl From<u64> for DecisionCap {
    fn from(max: u64) -> Self {
        Self { max }
    }
}

impl Bounder for DecisionCap {
    fn bound(&self, stats: &Stats) -> Option<StopReason> {
        if stats.decisions >= self.max {
            Some(StopReason::DecisionCap)
        } else {
            None
        }
    }
}

/// Stops the search when its flag is raised, possibly from another thread.
#[derive(Clone, Default, Debug)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the flag that cancels the search when set to true.
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.flag.clone()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl From<Arc<AtomicBool>> for Cancellation {
    fn from(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl Bounder for Cancellation {
    fn bound(&self, _: &Stats) -> Option<StopReason> {
        if self.flag.load(Ordering::SeqCst) {
            Some(StopReason::Cancelled)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_cap() {
        let cap = ModelCap::from(2);
        let mut stats = Stats::default();
        stats.models = 1;
        assert_eq!(None, cap.bound(&stats));
        stats.models = 2;
        assert_eq!(Some(StopReason::ModelCap), cap.bound(&stats));
        assert_eq!(Some(2), cap.model_limit());
        assert_eq!(None, DecisionCap::from(2).model_limit());
    }

    #[test]
    fn test_decision_cap() {
        let cap = DecisionCap::from(10);
        let mut stats = Stats::default();
        stats.decisions = 9;
        assert_eq!(None, cap.bound(&stats));
        stats.decisions = 10;
        assert_eq!(Some(StopReason::DecisionCap), cap.bound(&stats));
    }

    #[test]
    fn test_cancellation() {
        let cancellation = Cancellation::new();
        let flag = cancellation.flag();
        assert_eq!(None, cancellation.bound(&Stats::default()));
        flag.store(true, Ordering::SeqCst);
        assert_eq!(Some(StopReason::Cancelled), cancellation.bound(&Stats::default()));
    }
}
