//! Termination conditions.
//!
//! An engine stops as soon as **any** of its limits is reached.

use super::optimizer::Optimizer;
use crate::error::{GeneticError, Result};
use std::fmt;
use std::time::Duration;

/// A termination condition, checked after every generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Limit {
    /// Stop after this many generations.
    MaxGenerations(usize),

    /// Stop once the best fitness so far is at least as good as this value.
    TargetFitness(f64),

    /// Stop after this many consecutive generations without improving the
    /// best fitness so far.
    SteadyGenerations(usize),

    /// Stop once this much wall-clock time has elapsed.
    ///
    /// Checked between generations, so a run may overshoot by one
    /// generation's worth of work.
    TimeLimit(Duration),
}

/// Where a run stands, as seen by the limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Generations completed so far.
    pub generation: usize,

    /// Best fitness found so far (`NaN` if nothing was evaluated).
    pub best_fitness: f64,

    /// Consecutive generations without improvement.
    pub steady_generations: usize,

    /// Time since the run started.
    pub elapsed: Duration,
}

impl Limit {
    /// # Errors
    /// [`GeneticError::InvalidConfig`] for zero counts, a zero time limit
    /// or a NaN target.
    pub fn validate(&self) -> Result<()> {
        let problem = match self {
            Limit::MaxGenerations(0) => "max generations must be at least 1",
            Limit::SteadyGenerations(0) => "steady generations must be at least 1",
            Limit::TimeLimit(d) if d.is_zero() => "time limit must be positive",
            Limit::TargetFitness(f) if f.is_nan() => "target fitness must not be NaN",
            _ => return Ok(()),
        };
        Err(GeneticError::InvalidConfig(problem.into()))
    }

    /// Returns `true` if the run should stop.
    pub fn is_reached(&self, progress: &Progress, optimizer: Optimizer) -> bool {
        match *self {
            Limit::MaxGenerations(n) => progress.generation >= n,
            Limit::TargetFitness(target) => {
                !progress.best_fitness.is_nan()
                    && !optimizer.is_better(target, progress.best_fitness)
            }
            Limit::SteadyGenerations(n) => progress.steady_generations >= n,
            Limit::TimeLimit(d) => progress.elapsed >= d,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::MaxGenerations(n) => write!(f, "{n} generations"),
            Limit::TargetFitness(t) => write!(f, "target fitness {t}"),
            Limit::SteadyGenerations(n) => write!(f, "{n} steady generations"),
            Limit::TimeLimit(d) => write!(f, "time limit {d:?}"),
        }
    }
}

/// The first limit in `limits` that `progress` reaches.
pub(crate) fn first_reached(
    limits: &[Limit],
    progress: &Progress,
    optimizer: Optimizer,
) -> Option<Limit> {
    limits
        .iter()
        .find(|limit| limit.is_reached(progress, optimizer))
        .copied()
}
