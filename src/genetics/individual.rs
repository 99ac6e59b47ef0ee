//! Individuals and populations.

use super::chromosome::Genotype;
use super::gene::Gene;

/// A genotype paired with its fitness.
///
/// `NaN` fitness means "not evaluated yet". Replacing the genotype always
/// resets the fitness to `NaN`.
#[derive(Debug, Clone)]
pub struct Individual<G> {
    genotype: Genotype<G>,
    fitness: f64,
}

impl<G> Individual<G> {
    /// Creates an unevaluated individual.
    pub fn new(genotype: Genotype<G>) -> Self {
        Self {
            genotype,
            fitness: f64::NAN,
        }
    }

    /// Creates an individual with a known fitness.
    pub fn evaluated(genotype: Genotype<G>, fitness: f64) -> Self {
        Self { genotype, fitness }
    }

    pub fn genotype(&self) -> &Genotype<G> {
        &self.genotype
    }

    pub fn into_genotype(self) -> Genotype<G> {
        self.genotype
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Returns `true` once a non-NaN fitness has been assigned.
    pub fn is_evaluated(&self) -> bool {
        !self.fitness.is_nan()
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl<G: Gene> Individual<G> {
    /// Returns a copy carrying `fitness`.
    pub fn with_fitness(&self, fitness: f64) -> Self {
        Self {
            genotype: self.genotype.clone(),
            fitness,
        }
    }

    /// Returns a new, unevaluated individual with a different genotype.
    pub fn with_genotype(&self, genotype: Genotype<G>) -> Self {
        Self::new(genotype)
    }
}

// Two unevaluated individuals with equal genotypes are equal.
impl<G: PartialEq> PartialEq for Individual<G> {
    fn eq(&self, other: &Self) -> bool {
        self.genotype == other.genotype
            && (self.fitness == other.fitness
                || (self.fitness.is_nan() && other.fitness.is_nan()))
    }
}

/// An ordered sequence of individuals.
pub type Population<G> = Vec<Individual<G>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{BoolGene, Chromosome};

    fn genotype(bits: &[bool]) -> Genotype<BoolGene> {
        Genotype::new(vec![Chromosome::new(
            bits.iter().map(|&b| BoolGene::new(b)).collect(),
        )
        .unwrap()])
    }

    #[test]
    fn test_new_is_unevaluated() {
        let ind = Individual::new(genotype(&[true]));
        assert!(!ind.is_evaluated());
        assert!(ind.fitness().is_nan());
    }

    #[test]
    fn test_with_genotype_resets_fitness() {
        let ind = Individual::evaluated(genotype(&[true]), 3.0);
        assert!(ind.is_evaluated());
        let changed = ind.with_genotype(genotype(&[false]));
        assert!(!changed.is_evaluated());
        assert_eq!(ind.fitness(), 3.0);
    }

    #[test]
    fn test_unevaluated_individuals_compare_equal() {
        let a = Individual::new(genotype(&[true, false]));
        let b = Individual::new(genotype(&[true, false]));
        assert_eq!(a, b);
        assert_ne!(a, b.with_fitness(1.0));
        assert_ne!(a, Individual::new(genotype(&[false, false])));
    }

    #[test]
    fn test_with_fitness() {
        let ind = Individual::new(genotype(&[true, false])).with_fitness(1.5);
        assert_eq!(ind.fitness(), 1.5);
        assert_eq!(ind.genotype().flatten(), vec![true, false]);
    }
}
