//! Run statistics and observers.
//!
//! Listeners are purely observational: they see every generation's
//! statistics and the final summary, but cannot steer the run.

use super::limit::Limit;
use crate::genetics::{Individual, Population};
use std::fmt;
use std::time::Duration;

/// Statistics for one completed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// 1-based generation number.
    pub generation: usize,

    /// Best fitness in this generation's population.
    pub best_fitness: f64,

    /// Mean of the evaluated (non-NaN) fitness values.
    pub mean_fitness: f64,

    /// Worst evaluated fitness in this generation's population.
    pub worst_fitness: f64,

    /// Best fitness found so far in the run.
    pub best_so_far: f64,

    pub survivors: usize,
    pub offspring: usize,

    /// `(kind, count)` for each alterer, in pipeline order.
    pub alterations: Vec<(&'static str, usize)>,

    /// Time spent on this generation.
    pub elapsed: Duration,
}

impl GenerationStats {
    /// Total alterations across the pipeline.
    pub fn total_alterations(&self) -> usize {
        self.alterations.iter().map(|(_, n)| n).sum()
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopReason {
    /// A configured limit was reached.
    Limit(Limit),

    /// The cancellation flag was raised.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Limit(limit) => write!(f, "reached {limit}"),
            StopReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Final summary handed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionSummary {
    pub generations: usize,
    pub best_fitness: f64,
    pub stopped_by: StopReason,
    pub elapsed: Duration,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct EvolutionResult<G> {
    /// The best individual found during the entire run.
    pub best: Individual<G>,

    /// The last generation.
    pub population: Population<G>,

    /// Total number of generations executed.
    pub generations: usize,

    /// Which condition ended the run.
    pub stopped_by: StopReason,

    /// Best-so-far fitness after each generation.
    pub fitness_history: Vec<f64>,

    pub elapsed: Duration,
}

impl<G> EvolutionResult<G> {
    pub fn best_fitness(&self) -> f64 {
        self.best.fitness()
    }

    pub fn summary(&self) -> EvolutionSummary {
        EvolutionSummary {
            generations: self.generations,
            best_fitness: self.best.fitness(),
            stopped_by: self.stopped_by,
            elapsed: self.elapsed,
        }
    }
}

/// Observer notified at generation boundaries.
///
/// Any `FnMut(&GenerationStats)` closure is a listener.
pub trait EvolutionListener: Send {
    fn on_generation(&mut self, stats: &GenerationStats);

    fn on_finish(&mut self, _summary: &EvolutionSummary) {}
}

impl<F> EvolutionListener for F
where
    F: FnMut(&GenerationStats) + Send,
{
    fn on_generation(&mut self, stats: &GenerationStats) {
        self(stats)
    }
}
