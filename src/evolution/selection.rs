//! Selection strategies for survivors and offspring parents.
//!
//! Selection determines which individuals survive into the next generation
//! and which become parents. Different strategies provide different
//! selection pressure. All of them sample with replacement and honour the
//! [`Optimizer`] direction; `NaN` fitness always loses.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::optimizer::Optimizer;
use crate::error::{GeneticError, Result};
use crate::genetics::{Gene, Individual, Population};
use rand::Rng;

/// Selection strategy.
///
/// # Examples
///
/// ```
/// use u_genetic::evolution::Selection;
///
/// // Tournament with size 3 (moderate selection pressure)
/// let sel = Selection::Tournament(3);
///
/// // Roulette wheel (fitness-proportionate)
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random, select the best.
    ///
    /// Higher `k` = stronger selection pressure.
    /// - k=2: light pressure (good for diversity)
    /// - k=3-5: moderate pressure (typical default)
    /// - k>5: strong pressure (risk of premature convergence)
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Weights are fitness shifted so the worst individual gets a weight of
    /// almost zero, in the optimizer's direction.
    ///
    /// **Warning**: Susceptible to super-individual dominance when
    /// fitness variance is high.
    ///
    /// # Complexity
    /// O(n) setup, O(log n) per selection
    Roulette,

    /// Rank-based selection with linear weights: the best of `n` individuals
    /// weighs `n`, the worst weighs 1.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n log n) setup, O(log n) per selection
    Rank,

    /// Uniform selection, ignoring fitness.
    Random,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// # Errors
    /// [`GeneticError::InvalidConfig`] for a tournament of size 0.
    pub fn validate(&self) -> Result<()> {
        match self {
            Selection::Tournament(0) => Err(GeneticError::InvalidConfig(
                "tournament size must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Selects `count` individuals (clones, with replacement).
    ///
    /// # Errors
    /// [`GeneticError::EmptyPopulation`] if `count > 0` and the population
    /// is empty.
    pub fn select<G, R>(
        &self,
        population: &[Individual<G>],
        count: usize,
        optimizer: Optimizer,
        rng: &mut R,
    ) -> Result<Population<G>>
    where
        G: Gene,
        R: Rng + ?Sized,
    {
        if count == 0 {
            return Ok(Vec::new());
        }
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        self.validate()?;

        let n = population.len();
        let indices: Vec<usize> = match self {
            Selection::Tournament(k) => (0..count)
                .map(|_| tournament(population, *k, optimizer, rng))
                .collect(),
            Selection::Random => (0..count).map(|_| rng.random_range(0..n)).collect(),
            Selection::Roulette => {
                let wheel = Wheel::new(roulette_weights(population, optimizer));
                (0..count).map(|_| wheel.spin(rng)).collect()
            }
            Selection::Rank => {
                let wheel = Wheel::new(rank_weights(population, optimizer));
                (0..count).map(|_| wheel.spin(rng)).collect()
            }
        };
        Ok(indices.into_iter().map(|i| population[i].clone()).collect())
    }
}

/// Tournament selection: pick k random individuals, return the best.
fn tournament<G, R: Rng + ?Sized>(
    population: &[Individual<G>],
    k: usize,
    optimizer: Optimizer,
    rng: &mut R,
) -> usize {
    let n = population.len();
    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if optimizer.is_better(population[idx].fitness(), population[best_idx].fitness()) {
            best_idx = idx;
        }
    }
    best_idx
}

/// For maximization: weight_i = fitness_i - min_fitness + epsilon.
/// For minimization: weight_i = max_fitness - fitness_i + epsilon.
/// `NaN` and infinite fitness get weight 0.
fn roulette_weights<G>(population: &[Individual<G>], optimizer: Optimizer) -> Vec<f64> {
    let epsilon = 1e-10;
    let finite = population
        .iter()
        .map(|ind| ind.fitness())
        .filter(|f| f.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| {
        (lo.min(f), hi.max(f))
    });

    population
        .iter()
        .map(|ind| {
            let f = ind.fitness();
            if !f.is_finite() {
                return 0.0;
            }
            match optimizer {
                Optimizer::Maximize => f - min + epsilon,
                Optimizer::Minimize => max - f + epsilon,
            }
        })
        .collect()
}

/// Linear ranking: rank 0 (best) gets weight n, the worst gets 1.
fn rank_weights<G>(population: &[Individual<G>], optimizer: Optimizer) -> Vec<f64> {
    let n = population.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| optimizer.compare(population[b].fitness(), population[a].fitness()));

    let mut weights = vec![0.0; n];
    for (rank, &idx) in order.iter().enumerate() {
        weights[idx] = (n - rank) as f64;
    }
    weights
}

/// Cumulative weights for fitness-proportionate draws.
struct Wheel {
    cumulative: Vec<f64>,
}

impl Wheel {
    fn new(weights: Vec<f64>) -> Self {
        let cumulative = weights
            .into_iter()
            .scan(0.0, |acc, w| {
                *acc += w;
                Some(*acc)
            })
            .collect();
        Self { cumulative }
    }

    fn spin<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = self.cumulative.len();
        let total = self.cumulative.last().copied().unwrap_or(0.0);
        if !total.is_finite() || total <= 0.0 {
            return rng.random_range(0..n);
        }
        let threshold = rng.random_range(0.0..total);
        // First slot whose cumulative weight exceeds the threshold.
        self.cumulative
            .partition_point(|&c| c <= threshold)
            .min(n - 1)
    }
}
