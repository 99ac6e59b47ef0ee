//! Evolutionary operators.
//!
//! An [`Alterer`] turns one population into another of a requested size.
//! The engine chains its alterers (crossovers, then mutators) over the
//! offspring of each generation; each one consumes the previous one's output.
//!
//! # Core Traits
//!
//! - [`Mutator`]: perturbs single individuals, rate-gated at individual,
//!   chromosome and gene level
//! - [`Crossover`]: recombines groups of parents, rate-gated per chromosome
//!
//! # Strategies
//!
//! | Family | Operators |
//! |---|---|
//! | Mutation | [`BitFlipMutator`], [`SwapMutator`], [`InversionMutator`], [`RandomResetMutator`], [`PointMutator`] |
//! | Crossover | [`MultiPointCrossover`], [`AverageCrossover`], [`SubtreeCrossover`] |
//! | Permutation crossover | [`PartiallyMappedCrossover`], [`OrderedCrossover`], [`PositionBasedCrossover`] |
//!
//! # References
//!
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Syswerda (1991), "Schedule Optimization Using Genetic Algorithms"
//! - Koza (1992), *Genetic Programming*

mod crossover;
mod crossovers;
mod mutations;
mod mutator;
pub mod permutation;

pub use crossover::Crossover;
pub use crossovers::{AverageCrossover, MultiPointCrossover, SubtreeCrossover, DEFAULT_MAX_DEPTH};
pub use mutations::{BitFlipMutator, InversionMutator, PointMutator, RandomResetMutator, SwapMutator};
pub use mutator::{MutationRates, Mutator};
pub use permutation::{OrderedCrossover, PartiallyMappedCrossover, PositionBasedCrossover};

use crate::error::{GeneticError, Result};
use crate::genetics::{Gene, Population};
use rand::RngCore;

/// Output of one alteration step.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterResult<G> {
    /// The altered population, of exactly the requested size.
    pub population: Population<G>,

    /// Number of mutations (for mutators) or chromosome crossovers (for
    /// crossovers) performed.
    pub count: usize,
}

impl<G> AlterResult<G> {
    /// A result that leaves `population` untouched.
    pub fn unchanged(population: Population<G>) -> Self {
        Self {
            population,
            count: 0,
        }
    }
}

/// One step of the engine's alteration pipeline.
pub enum Alterer<G: Gene> {
    Mutator(Box<dyn Mutator<G>>),
    Crossover(Box<dyn Crossover<G>>),
}

impl<G: Gene> Alterer<G> {
    pub fn mutator(mutator: impl Mutator<G> + 'static) -> Self {
        Alterer::Mutator(Box::new(mutator))
    }

    pub fn crossover(crossover: impl Crossover<G> + 'static) -> Self {
        Alterer::Crossover(Box::new(crossover))
    }

    /// Short label used in logs and statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            Alterer::Mutator(_) => "mutation",
            Alterer::Crossover(_) => "crossover",
        }
    }

    /// Applies the operator and checks that the output has `target_size`
    /// individuals.
    ///
    /// # Errors
    /// Propagates the operator's precondition violations, and reports
    /// [`GeneticError::SizeMismatch`] if the operator broke the size contract.
    pub fn alter(
        &self,
        population: Population<G>,
        target_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<AlterResult<G>> {
        let result = match self {
            Alterer::Mutator(m) => m.mutate_population(population, target_size, rng)?,
            Alterer::Crossover(c) => c.crossover_population(&population, target_size, rng)?,
        };
        if result.population.len() != target_size {
            return Err(GeneticError::SizeMismatch {
                expected: target_size,
                actual: result.population.len(),
            });
        }
        log::trace!("{} produced {} alterations", self.kind(), result.count);
        Ok(result)
    }
}

impl<G: Gene> std::fmt::Debug for Alterer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Alterer").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{BoolGene, Chromosome, Genotype, Individual};
    use crate::random::create_rng;

    fn population(n: usize) -> Population<BoolGene> {
        (0..n)
            .map(|i| {
                let genes = (0..6).map(|j| BoolGene::new((i + j) % 2 == 0)).collect();
                Individual::evaluated(Genotype::new(vec![Chromosome::new(genes).unwrap()]), i as f64)
            })
            .collect()
    }

    #[test]
    fn test_chain_preserves_size() {
        let mut rng = create_rng(42);
        let alterers = vec![
            Alterer::crossover(MultiPointCrossover::single_point(0.8).unwrap()),
            Alterer::mutator(BitFlipMutator::new(MutationRates::new(0.5, 0.5, 0.2).unwrap())),
        ];

        let mut pop = population(10);
        for alterer in &alterers {
            pop = alterer.alter(pop, 10, &mut rng).unwrap().population;
            assert_eq!(pop.len(), 10);
        }
    }

    #[test]
    fn test_crossover_step_resizes() {
        let mut rng = create_rng(1);
        let alterer = Alterer::crossover(MultiPointCrossover::single_point(1.0).unwrap());
        let result = alterer.alter(population(4), 7, &mut rng).unwrap();
        assert_eq!(result.population.len(), 7);
        assert!(result.count > 0);
    }

    #[test]
    fn test_mutator_step_rejects_resize() {
        let mut rng = create_rng(1);
        let alterer =
            Alterer::mutator(BitFlipMutator::new(MutationRates::new(1.0, 1.0, 1.0).unwrap()));
        let err = alterer.alter(population(4), 5, &mut rng).unwrap_err();
        assert_eq!(
            err,
            GeneticError::SizeMismatch {
                expected: 5,
                actual: 4
            }
        );
    }
}
