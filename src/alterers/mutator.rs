//! The mutation framework.
//!
//! Mutation is gated at three nested levels:
//!
//! 1. **Individual**: each individual is mutated with `individual_rate`.
//! 2. **Chromosome**: each chromosome of a selected individual is mutated
//!    with `chromosome_rate`.
//! 3. **Gene**: the strategy decides per gene, usually with `gene_rate`.
//!
//! Each level draws one uniform value per candidate, in order, so a seeded
//! run is reproducible.

use super::AlterResult;
use crate::error::{check_rate, GeneticError, Result};
use crate::genetics::{Chromosome, Gene, Individual, Population};
use crate::probability::EPSILON;
use crate::random::is_hit;
use rand::RngCore;

/// The three gating probabilities of a mutator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationRates {
    /// Probability that an individual is mutated at all.
    pub individual: f64,

    /// Probability that a chromosome of a selected individual is mutated.
    pub chromosome: f64,

    /// Per-gene probability used by the strategy.
    pub gene: f64,
}

impl MutationRates {
    /// Validates and bundles the three rates.
    ///
    /// # Errors
    /// [`GeneticError::InvalidRate`] naming the first rate outside `[0, 1]`.
    pub fn new(individual: f64, chromosome: f64, gene: f64) -> Result<Self> {
        Ok(Self {
            individual: check_rate("individual_rate", individual)?,
            chromosome: check_rate("chromosome_rate", chromosome)?,
            gene: check_rate("gene_rate", gene)?,
        })
    }

    /// Rates that mutate every individual, chromosome and gene.
    pub fn always() -> Self {
        Self {
            individual: 1.0,
            chromosome: 1.0,
            gene: 1.0,
        }
    }
}

impl Default for MutationRates {
    fn default() -> Self {
        Self {
            individual: 0.5,
            chromosome: 0.5,
            gene: 0.5,
        }
    }
}

/// A mutation operator.
///
/// Strategies implement [`mutate_chromosome`](Mutator::mutate_chromosome);
/// the individual and population levels are provided.
pub trait Mutator<G: Gene>: Send + Sync {
    /// Probability that an individual is mutated at all.
    fn individual_rate(&self) -> f64;

    /// Probability that each chromosome of a selected individual is mutated.
    fn chromosome_rate(&self) -> f64;

    /// Mutates one chromosome, returning the result and the number of
    /// mutations applied. Zero mutations must return an equal chromosome.
    fn mutate_chromosome(
        &self,
        chromosome: &Chromosome<G>,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome<G>, usize)>;

    /// Mutates the chromosomes of one individual.
    ///
    /// Each chromosome is passed to `mutate_chromosome` with probability
    /// `chromosome_rate`. If anything changed, the result is a new
    /// unevaluated individual; otherwise the original is returned with its
    /// fitness intact.
    fn mutate_individual(
        &self,
        individual: &Individual<G>,
        rng: &mut dyn RngCore,
    ) -> Result<(Individual<G>, usize)> {
        let mut count = 0;
        let mut chromosomes = Vec::with_capacity(individual.genotype().len());
        for chromosome in individual.genotype().chromosomes() {
            if is_hit(rng, self.chromosome_rate()) {
                let (mutated, n) = self.mutate_chromosome(chromosome, rng)?;
                count += n;
                chromosomes.push(mutated);
            } else {
                chromosomes.push(chromosome.clone());
            }
        }
        if count == 0 {
            return Ok((individual.clone(), 0));
        }
        let genotype = individual.genotype().with_chromosomes(chromosomes);
        Ok((individual.with_genotype(genotype), count))
    }

    /// Mutates a population in order, one individual-level draw each.
    ///
    /// # Errors
    /// [`GeneticError::SizeMismatch`] if `population.len() != target_size`:
    /// mutation never resizes a population.
    fn mutate_population(
        &self,
        population: Population<G>,
        target_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<AlterResult<G>> {
        if population.len() != target_size {
            return Err(GeneticError::SizeMismatch {
                expected: target_size,
                actual: population.len(),
            });
        }
        if self.individual_rate() <= EPSILON {
            return Ok(AlterResult::unchanged(population));
        }

        let mut count = 0;
        let mut mutated = Vec::with_capacity(population.len());
        for individual in population {
            if is_hit(rng, self.individual_rate()) {
                let (next, n) = self.mutate_individual(&individual, rng)?;
                count += n;
                mutated.push(next);
            } else {
                mutated.push(individual);
            }
        }
        Ok(AlterResult {
            population: mutated,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Genotype, IntGene};
    use crate::random::create_rng;

    /// Adds one to every gene, counting each as a mutation.
    struct Increment {
        rates: MutationRates,
    }

    impl Mutator<IntGene> for Increment {
        fn individual_rate(&self) -> f64 {
            self.rates.individual
        }

        fn chromosome_rate(&self) -> f64 {
            self.rates.chromosome
        }

        fn mutate_chromosome(
            &self,
            chromosome: &Chromosome<IntGene>,
            _rng: &mut dyn RngCore,
        ) -> Result<(Chromosome<IntGene>, usize)> {
            let genes = chromosome
                .iter()
                .map(|g| g.with_value(g.value() + 1))
                .collect();
            Ok((chromosome.with_genes(genes), chromosome.len()))
        }
    }

    fn population(n: usize) -> Population<IntGene> {
        (0..n)
            .map(|_| {
                let genes = (0..3).map(|v| IntGene::new(v, (0, 100)).unwrap()).collect();
                let chromosomes = vec![Chromosome::new(genes).unwrap(); 2];
                Individual::evaluated(Genotype::new(chromosomes), 1.0)
            })
            .collect()
    }

    #[test]
    fn test_rates_validation() {
        assert!(MutationRates::new(0.1, 0.2, 0.3).is_ok());
        let err = MutationRates::new(0.1, 1.2, 0.3).unwrap_err();
        assert_eq!(
            err,
            GeneticError::InvalidRate {
                name: "chromosome_rate",
                value: 1.2
            }
        );
    }

    #[test]
    fn test_zero_individual_rate_is_identity() {
        let mut rng = create_rng(42);
        let mutator = Increment {
            rates: MutationRates::new(0.0, 1.0, 1.0).unwrap(),
        };
        let pop = population(5);
        let result = mutator.mutate_population(pop.clone(), 5, &mut rng).unwrap();
        assert_eq!(result.population, pop);
        assert_eq!(result.count, 0);
    }

    #[test]
    fn test_full_rates_mutate_everything() {
        let mut rng = create_rng(42);
        let mutator = Increment {
            rates: MutationRates::always(),
        };
        let result = mutator.mutate_population(population(4), 4, &mut rng).unwrap();
        // 4 individuals x 2 chromosomes x 3 genes
        assert_eq!(result.count, 24);
        for ind in &result.population {
            assert!(!ind.is_evaluated());
            assert_eq!(ind.genotype().flatten(), vec![1, 2, 3, 1, 2, 3]);
        }
    }

    #[test]
    fn test_zero_chromosome_rate_keeps_fitness() {
        let mut rng = create_rng(42);
        let mutator = Increment {
            rates: MutationRates::new(1.0, 0.0, 1.0).unwrap(),
        };
        let pop = population(3);
        let result = mutator.mutate_population(pop.clone(), 3, &mut rng).unwrap();
        assert_eq!(result.count, 0);
        assert_eq!(result.population, pop);
    }

    #[test]
    fn test_size_mismatch() {
        let mut rng = create_rng(42);
        let mutator = Increment {
            rates: MutationRates::always(),
        };
        assert!(matches!(
            mutator.mutate_population(population(3), 2, &mut rng),
            Err(GeneticError::SizeMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_seeded_runs_match() {
        let mutator = Increment {
            rates: MutationRates::new(0.5, 0.5, 1.0).unwrap(),
        };
        let a = mutator
            .mutate_population(population(20), 20, &mut create_rng(9))
            .unwrap();
        let b = mutator
            .mutate_population(population(20), 20, &mut create_rng(9))
            .unwrap();
        assert_eq!(a, b);
    }
}
