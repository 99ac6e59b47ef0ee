//! Concrete crossover strategies for ordered, numeric and program genes.
//!
//! Permutation-preserving crossovers live in [`permutation`](super::permutation).

use super::crossover::Crossover;
use crate::error::{check_rate, GeneticError, Result};
use crate::genetics::{Average, Chromosome, Gene, ProgramGene, Tree};
use crate::random::is_hit;
use rand::seq::index;
use rand::{Rng, RngCore};
use std::fmt;

/// Default maximum program height for [`SubtreeCrossover`].
pub const DEFAULT_MAX_DEPTH: usize = 17;

fn check_lengths<G: Gene>(parents: &[&Chromosome<G>]) -> Result<usize> {
    let len = parents.first().map_or(0, |c| c.len());
    match parents.iter().find(|c| c.len() != len) {
        Some(other) => Err(GeneticError::LengthMismatch {
            expected: len,
            actual: other.len(),
        }),
        None => Ok(len),
    }
}

fn check_parent_count<G>(parents: &[&Chromosome<G>], expected: usize) -> Result<()> {
    if parents.len() != expected {
        return Err(GeneticError::ParentCountMismatch {
            expected,
            actual: parents.len(),
        });
    }
    Ok(())
}

// ============================================================================
// Multi-point
// ============================================================================

/// Cuts both parents at `k` distinct random points and swaps every second
/// segment.
///
/// Cut `c` separates position `c - 1` from position `c`; a position is
/// swapped when an odd number of cuts lie at or before it. With more cuts
/// than genes, every position is a cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiPointCrossover {
    chromosome_rate: f64,
    cuts: usize,
    exclusivity: bool,
}

impl MultiPointCrossover {
    /// Creates a crossover with `cuts` cut points.
    ///
    /// # Errors
    /// [`GeneticError::InvalidRate`] for a rate outside `[0, 1]`, and
    /// [`GeneticError::InvalidConfig`] for zero cuts.
    pub fn new(chromosome_rate: f64, cuts: usize) -> Result<Self> {
        if cuts == 0 {
            return Err(GeneticError::InvalidConfig(
                "multi-point crossover needs at least one cut".into(),
            ));
        }
        Ok(Self {
            chromosome_rate: check_rate("chromosome_rate", chromosome_rate)?,
            cuts,
            exclusivity: false,
        })
    }

    /// One cut point.
    pub fn single_point(chromosome_rate: f64) -> Result<Self> {
        Self::new(chromosome_rate, 1)
    }

    pub fn with_exclusivity(mut self, exclusivity: bool) -> Self {
        self.exclusivity = exclusivity;
        self
    }

    pub fn cuts(&self) -> usize {
        self.cuts
    }
}

/// Swap the alternate segments of `a` and `b` delimited by sorted `cuts`.
pub(crate) fn swap_segments<T: Clone>(a: &[T], b: &[T], cuts: &[usize]) -> (Vec<T>, Vec<T>) {
    let mut c1 = a.to_vec();
    let mut c2 = b.to_vec();
    let mut crossed = 0;
    for i in 0..a.len() {
        while crossed < cuts.len() && cuts[crossed] <= i {
            crossed += 1;
        }
        if crossed % 2 == 1 {
            c1[i] = b[i].clone();
            c2[i] = a[i].clone();
        }
    }
    (c1, c2)
}

impl<G: Gene> Crossover<G> for MultiPointCrossover {
    fn chromosome_rate(&self) -> f64 {
        self.chromosome_rate
    }

    fn exclusivity(&self) -> bool {
        self.exclusivity
    }

    fn crossover_chromosomes(
        &self,
        parents: &[&Chromosome<G>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<G>>> {
        check_parent_count(parents, 2)?;
        let n = check_lengths(parents)?;
        let (a, b) = (parents[0], parents[1]);

        let mut cuts = index::sample(rng, n, self.cuts.min(n)).into_vec();
        cuts.sort_unstable();
        let (c1, c2) = swap_segments(a.genes(), b.genes(), &cuts);
        Ok(vec![a.with_genes(c1), b.with_genes(c2)])
    }
}

// ============================================================================
// Average
// ============================================================================

/// Blends any number of parents into one child.
///
/// Each gene is replaced, with probability `gene_rate`, by the mean of the
/// genes at the same position across all parents; the others are copied from
/// the first parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageCrossover {
    chromosome_rate: f64,
    gene_rate: f64,
    num_parents: usize,
    exclusivity: bool,
}

impl AverageCrossover {
    /// A two-parent blend.
    pub fn new(chromosome_rate: f64, gene_rate: f64) -> Result<Self> {
        Ok(Self {
            chromosome_rate: check_rate("chromosome_rate", chromosome_rate)?,
            gene_rate: check_rate("gene_rate", gene_rate)?,
            num_parents: 2,
            exclusivity: false,
        })
    }

    /// # Errors
    /// [`GeneticError::InvalidParentCount`] for fewer than two parents.
    pub fn with_parents(mut self, num_parents: usize) -> Result<Self> {
        if num_parents < 2 {
            return Err(GeneticError::InvalidParentCount(num_parents));
        }
        self.num_parents = num_parents;
        Ok(self)
    }

    pub fn with_exclusivity(mut self, exclusivity: bool) -> Self {
        self.exclusivity = exclusivity;
        self
    }
}

impl<G: Average> Crossover<G> for AverageCrossover {
    fn num_parents(&self) -> usize {
        self.num_parents
    }

    fn num_offspring(&self) -> usize {
        1
    }

    fn chromosome_rate(&self) -> f64 {
        self.chromosome_rate
    }

    fn exclusivity(&self) -> bool {
        self.exclusivity
    }

    fn crossover_chromosomes(
        &self,
        parents: &[&Chromosome<G>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<G>>> {
        check_parent_count(parents, self.num_parents)?;
        check_lengths(parents)?;
        let (first, rest) = (parents[0], &parents[1..]);

        let genes = first
            .iter()
            .enumerate()
            .map(|(i, gene)| {
                if is_hit(rng, self.gene_rate) {
                    let others: Vec<&G> = rest.iter().map(|c| &c.genes()[i]).collect();
                    gene.average(&others)
                } else {
                    Ok(gene.clone())
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(vec![first.with_genes(genes)])
    }
}

// ============================================================================
// Subtree
// ============================================================================

/// Swaps random subtrees between the programs of two parents.
///
/// Applies only when every program involved has more than one node. For
/// each gene pair, with probability `gene_rate`, one node is drawn from each
/// tree and the two subtrees are exchanged. A child taller than `max_depth`
/// is replaced by its parent's original tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubtreeCrossover {
    chromosome_rate: f64,
    gene_rate: f64,
    max_depth: usize,
    exclusivity: bool,
}

impl SubtreeCrossover {
    pub fn new(chromosome_rate: f64, gene_rate: f64) -> Result<Self> {
        Ok(Self {
            chromosome_rate: check_rate("chromosome_rate", chromosome_rate)?,
            gene_rate: check_rate("gene_rate", gene_rate)?,
            max_depth: DEFAULT_MAX_DEPTH,
            exclusivity: false,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_exclusivity(mut self, exclusivity: bool) -> Self {
        self.exclusivity = exclusivity;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn swap<V: Clone>(
        &self,
        a: &Tree<V>,
        b: &Tree<V>,
        rng: &mut dyn RngCore,
    ) -> (Tree<V>, Tree<V>) {
        let a_paths = a.paths();
        let b_paths = b.paths();
        let pa = &a_paths[rng.random_range(0..a_paths.len())];
        let pb = &b_paths[rng.random_range(0..b_paths.len())];

        let swapped = a.subtree(pa).zip(b.subtree(pb)).and_then(|(sa, sb)| {
            let ca = a.replace(pa, sb.clone())?;
            let cb = b.replace(pb, sa.clone())?;
            Some((ca, cb))
        });
        let Some((ca, cb)) = swapped else {
            return (a.clone(), b.clone());
        };
        let bounded = |child: Tree<V>, original: &Tree<V>| {
            if child.height() > self.max_depth {
                original.clone()
            } else {
                child
            }
        };
        (bounded(ca, a), bounded(cb, b))
    }
}

impl<V> Crossover<ProgramGene<V>> for SubtreeCrossover
where
    V: Clone + fmt::Debug + PartialEq + Send + Sync + 'static,
{
    fn chromosome_rate(&self) -> f64 {
        self.chromosome_rate
    }

    fn exclusivity(&self) -> bool {
        self.exclusivity
    }

    fn crossover_chromosomes(
        &self,
        parents: &[&Chromosome<ProgramGene<V>>],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Chromosome<ProgramGene<V>>>> {
        check_parent_count(parents, 2)?;
        check_lengths(parents)?;
        let (a, b) = (parents[0], parents[1]);

        for gene in a.iter().chain(b.iter()) {
            gene.tree().validate()?;
        }
        if a.iter().chain(b.iter()).any(|g| g.tree().size() <= 1) {
            return Ok(vec![a.clone(), b.clone()]);
        }

        let mut c1 = Vec::with_capacity(a.len());
        let mut c2 = Vec::with_capacity(b.len());
        for (ga, gb) in a.iter().zip(b.iter()) {
            if is_hit(rng, self.gene_rate) {
                let (ta, tb) = self.swap(ga.tree(), gb.tree(), rng);
                c1.push(ga.with_value(ta));
                c2.push(gb.with_value(tb));
            } else {
                c1.push(ga.clone());
                c2.push(gb.clone());
            }
        }
        Ok(vec![a.with_genes(c1), b.with_genes(c2)])
    }
}
