//! Optimization direction.

use crate::genetics::Individual;
use std::cmp::Ordering;

/// Whether larger or smaller fitness is better.
///
/// `NaN` fitness is never better than anything: it compares below every
/// number in both directions, and equal to another `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Optimizer {
    #[default]
    Maximize,
    Minimize,
}

impl Optimizer {
    /// Orders two fitness values so that `Greater` means `a` is better.
    ///
    /// Antisymmetric: `compare(a, b) == compare(b, a).reverse()`.
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => {
                let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
                match self {
                    Optimizer::Maximize => ord,
                    Optimizer::Minimize => ord.reverse(),
                }
            }
        }
    }

    /// Returns `true` if `a` is strictly better than `b`.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    /// Index of the best individual; the first one wins ties.
    pub fn best_index<G>(&self, population: &[Individual<G>]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, individual) in population.iter().enumerate() {
            match best {
                Some(b) if !self.is_better(individual.fitness(), population[b].fitness()) => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// The best individual, if any.
    pub fn best<'a, G>(&self, population: &'a [Individual<G>]) -> Option<&'a Individual<G>> {
        self.best_index(population).map(|i| &population[i])
    }

    /// Sorts best first. Stable, so equal individuals keep their order.
    pub fn sort<G>(&self, population: &mut [Individual<G>]) {
        population.sort_by(|a, b| self.compare(b.fitness(), a.fitness()));
    }
}
