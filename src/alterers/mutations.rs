//! Concrete mutation strategies.
//!
//! | Strategy | Genes | Effect |
//! |---|---|---|
//! | [`BitFlipMutator`] | [`Flip`] | negates selected genes |
//! | [`SwapMutator`] | any | exchanges selected genes with another position |
//! | [`InversionMutator`] | any | reverses the segment between two boundaries |
//! | [`RandomResetMutator`] | [`Resample`] | redraws selected genes from their range |
//! | [`PointMutator`] | [`ProgramGene`] | replaces a program by one of its same-arity subtrees |

use super::mutator::{MutationRates, Mutator};
use crate::error::{check_rate, Result};
use crate::genetics::{Chromosome, Flip, Gene, ProgramGene, Resample};
use crate::probability::select_indices;
use crate::random::is_hit;
use rand::{Rng, RngCore};
use std::fmt;

/// Implements the rate accessors shared by every strategy holding a
/// `rates: MutationRates` field.
macro_rules! rate_accessors {
    () => {
        fn individual_rate(&self) -> f64 {
            self.rates.individual
        }

        fn chromosome_rate(&self) -> f64 {
            self.rates.chromosome
        }
    };
}

// ============================================================================
// Bit flip
// ============================================================================

/// Negates each gene with probability `gene_rate`.
///
/// The new value is always the opposite of the old one, never re-sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitFlipMutator {
    rates: MutationRates,
}

impl BitFlipMutator {
    pub fn new(rates: MutationRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> MutationRates {
        self.rates
    }
}

impl<G: Flip> Mutator<G> for BitFlipMutator {
    rate_accessors!();

    fn mutate_chromosome(
        &self,
        chromosome: &Chromosome<G>,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome<G>, usize)> {
        let mut count = 0;
        let genes = chromosome
            .iter()
            .map(|gene| {
                if is_hit(rng, self.rates.gene) {
                    count += 1;
                    gene.flipped()
                } else {
                    gene.clone()
                }
            })
            .collect();
        Ok((chromosome.with_genes(genes), count))
    }
}

// ============================================================================
// Swap
// ============================================================================

/// Visits each position in order and, with probability `gene_rate`, swaps
/// it with a different, uniformly chosen position.
///
/// Chromosomes with fewer than two genes are left alone. Swaps that cancel
/// out are not counted. Swapping keeps permutations valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapMutator {
    rates: MutationRates,
}

impl SwapMutator {
    pub fn new(rates: MutationRates) -> Self {
        Self { rates }
    }
}

impl<G: Gene> Mutator<G> for SwapMutator {
    rate_accessors!();

    fn mutate_chromosome(
        &self,
        chromosome: &Chromosome<G>,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome<G>, usize)> {
        let n = chromosome.len();
        if n < 2 {
            return Ok((chromosome.clone(), 0));
        }
        let mut genes = chromosome.genes().to_vec();
        let mut count = 0;
        for i in 0..n {
            if is_hit(rng, self.rates.gene) {
                // Uniform over the other n - 1 positions.
                let mut j = rng.random_range(0..n - 1);
                if j >= i {
                    j += 1;
                }
                genes.swap(i, j);
                count += 1;
            }
        }
        if genes == chromosome.genes() {
            return Ok((chromosome.clone(), 0));
        }
        Ok((chromosome.with_genes(genes), count))
    }
}

// ============================================================================
// Inversion
// ============================================================================

/// Reverses the genes between two boundaries, inclusive.
///
/// Boundaries are chosen with [`select_indices`] over the chromosome using
/// `boundary_rate`; the first and last selected positions delimit the
/// segment. Fewer than two selected positions means no inversion. This
/// operator has no gene rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InversionMutator {
    individual_rate: f64,
    chromosome_rate: f64,
    boundary_rate: f64,
}

impl InversionMutator {
    pub fn new(individual_rate: f64, chromosome_rate: f64, boundary_rate: f64) -> Result<Self> {
        Ok(Self {
            individual_rate: check_rate("individual_rate", individual_rate)?,
            chromosome_rate: check_rate("chromosome_rate", chromosome_rate)?,
            boundary_rate: check_rate("inversion_boundary_probability", boundary_rate)?,
        })
    }

    pub fn boundary_rate(&self) -> f64 {
        self.boundary_rate
    }
}

impl<G: Gene> Mutator<G> for InversionMutator {
    fn individual_rate(&self) -> f64 {
        self.individual_rate
    }

    fn chromosome_rate(&self) -> f64 {
        self.chromosome_rate
    }

    fn mutate_chromosome(
        &self,
        chromosome: &Chromosome<G>,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome<G>, usize)> {
        if chromosome.len() < 2 {
            return Ok((chromosome.clone(), 0));
        }
        let boundaries = select_indices(self.boundary_rate, chromosome.len(), rng)?;
        let (Some(&start), Some(&end)) = (boundaries.first(), boundaries.last()) else {
            return Ok((chromosome.clone(), 0));
        };
        if start == end {
            return Ok((chromosome.clone(), 0));
        }
        let mut genes = chromosome.genes().to_vec();
        genes[start..=end].reverse();
        Ok((chromosome.with_genes(genes), 1))
    }
}

// ============================================================================
// Random reset
// ============================================================================

/// Replaces each gene, with probability `gene_rate`, by a fresh uniform
/// sample from the gene's own range. A sample equal to the old value, or a
/// filter that rejects every draw, leaves the gene as it was and is not
/// counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomResetMutator {
    rates: MutationRates,
}

impl RandomResetMutator {
    pub fn new(rates: MutationRates) -> Self {
        Self { rates }
    }
}

impl<G: Resample> Mutator<G> for RandomResetMutator {
    rate_accessors!();

    fn mutate_chromosome(
        &self,
        chromosome: &Chromosome<G>,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome<G>, usize)> {
        let mut count = 0;
        let mut genes = Vec::with_capacity(chromosome.len());
        for gene in chromosome.iter() {
            if is_hit(rng, self.rates.gene) {
                let next = gene.resample(rng);
                if next != *gene {
                    count += 1;
                }
                genes.push(next);
            } else {
                genes.push(gene.clone());
            }
        }
        Ok((chromosome.with_genes(genes), count))
    }
}

// ============================================================================
// Point (programs)
// ============================================================================

/// Program mutation by root substitution.
///
/// With probability `gene_rate`, picks a node whose arity equals the
/// root's arity and makes it the new root. Choosing the root itself leaves
/// the program unchanged and is not counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMutator {
    rates: MutationRates,
}

impl PointMutator {
    pub fn new(rates: MutationRates) -> Self {
        Self { rates }
    }
}

impl<V> Mutator<ProgramGene<V>> for PointMutator
where
    V: Clone + fmt::Debug + PartialEq + Send + Sync + 'static,
{
    rate_accessors!();

    fn mutate_chromosome(
        &self,
        chromosome: &Chromosome<ProgramGene<V>>,
        rng: &mut dyn RngCore,
    ) -> Result<(Chromosome<ProgramGene<V>>, usize)> {
        let mut count = 0;
        let mut genes = Vec::with_capacity(chromosome.len());
        for gene in chromosome.iter() {
            if !is_hit(rng, self.rates.gene) {
                genes.push(gene.clone());
                continue;
            }
            let tree = gene.tree();
            let candidates: Vec<_> = tree
                .paths()
                .into_iter()
                .filter(|p| tree.subtree(p).is_some_and(|t| t.arity() == tree.arity()))
                .collect();
            // The root always qualifies, so candidates is never empty.
            let path = &candidates[rng.random_range(0..candidates.len())];
            match tree.subtree(path) {
                Some(subtree) if !path.is_empty() => {
                    count += 1;
                    genes.push(gene.with_value(subtree.clone()));
                }
                _ => genes.push(gene.clone()),
            }
        }
        Ok((chromosome.with_genes(genes), count))
    }
}
