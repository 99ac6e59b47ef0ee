//! Permutation-preserving crossover.
//!
//! These operators recombine two chromosomes holding the same set of
//! distinct genes and always return permutations of that set. The
//! algorithms are exposed as free functions over `&[T]` so they can be
//! used on plain vectors; the operator types apply them gene-wise.
//!
//! # Crossover Operators
//!
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985), keeps absolute positions
//! - [`order_crossover`] (OX): Davis (1985), keeps relative order
//! - [`position_based_crossover`] (PBX): Syswerda (1991), keeps a random set of positions
//!
//! # References
//!
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Syswerda (1991), "Schedule Optimization Using Genetic Algorithms"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use super::crossover::Crossover;
use crate::error::{check_rate, GeneticError, Result};
use crate::genetics::{Chromosome, Gene};
use crate::probability::select_indices;
use rand::{Rng, RngCore};

// ============================================================================
// Preconditions
// ============================================================================

/// Checks that `a` has no duplicates and `b` is a rearrangement of `a`.
///
/// # Errors
/// [`GeneticError::LengthMismatch`] or [`GeneticError::NotAPermutation`].
pub fn check_permutations<T: PartialEq + std::fmt::Debug>(a: &[T], b: &[T]) -> Result<()> {
    if a.len() != b.len() {
        return Err(GeneticError::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    for (i, value) in a.iter().enumerate() {
        if a[..i].contains(value) {
            return Err(GeneticError::NotAPermutation(format!(
                "{value:?} repeats at position {i}"
            )));
        }
        if !b.contains(value) {
            return Err(GeneticError::NotAPermutation(format!(
                "{value:?} missing from second parent"
            )));
        }
    }
    Ok(())
}

fn two_parents<'a, G>(parents: &[&'a Chromosome<G>]) -> Result<(&'a Chromosome<G>, &'a Chromosome<G>)> {
    match parents {
        [a, b] => Ok((*a, *b)),
        _ => Err(GeneticError::ParentCountMismatch {
            expected: 2,
            actual: parents.len(),
        }),
    }
}

// ============================================================================
// PMX
// ============================================================================

/// Partially Mapped Crossover (PMX).
///
/// Preserves the **absolute position** of elements from both parents
/// as much as possible.
///
/// # Algorithm (Goldberg & Lingle, 1985)
///
/// 1. Pick a random window `[lo, hi)`
/// 2. Each child takes the other parent's window at the same positions
/// 3. Outside the window, a value that already occurs in the window is
///    replaced through the window's positional mapping until it no longer does
///
/// # Complexity
/// O(n²) time, O(n) space
///
/// Inputs must satisfy [`check_permutations`].
pub fn pmx_crossover<T, R>(a: &[T], b: &[T], rng: &mut R) -> (Vec<T>, Vec<T>)
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let n = a.len();
    if n < 2 {
        return (a.to_vec(), b.to_vec());
    }
    let x = rng.random_range(0..=n);
    let y = rng.random_range(0..=n);
    pmx_with_window(a, b, x.min(y), x.max(y))
}

/// PMX with a fixed window `[lo, hi)`.
pub fn pmx_with_window<T: Clone + PartialEq>(
    a: &[T],
    b: &[T],
    lo: usize,
    hi: usize,
) -> (Vec<T>, Vec<T>) {
    (pmx_child(a, b, lo, hi), pmx_child(b, a, lo, hi))
}

/// Build one PMX child: `template` outside the window, `donor` inside it.
fn pmx_child<T: Clone + PartialEq>(template: &[T], donor: &[T], lo: usize, hi: usize) -> Vec<T> {
    let n = template.len();
    let window = &donor[lo..hi];
    let mut child = template.to_vec();
    child[lo..hi].clone_from_slice(window);

    for i in (0..lo).chain(hi..n) {
        let mut value = template[i].clone();
        // Follow the mapping chain; its length is bounded by the window size.
        for _ in 0..=window.len() {
            match window.iter().position(|w| *w == value) {
                Some(k) => value = template[lo + k].clone(),
                None => break,
            }
        }
        child[i] = value;
    }
    child
}

// ============================================================================
// OX
// ============================================================================

/// Order Crossover (OX) for permutations.
///
/// Preserves the **relative order** of elements from both parents.
///
/// # Algorithm (Davis, 1985)
///
/// 1. Select a random segment `[start, end]`
/// 2. Copy the segment from parent1 to the child at the same positions
/// 3. Fill the remaining positions, left to right, with parent2's elements
///    in their original order, skipping those already in the segment
///
/// The second child mirrors the process with the parents swapped.
///
/// # Complexity
/// O(n²) time, O(n) space
pub fn order_crossover<T, R>(a: &[T], b: &[T], rng: &mut R) -> (Vec<T>, Vec<T>)
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let n = a.len();
    if n < 2 {
        return (a.to_vec(), b.to_vec());
    }
    let (start, end) = random_segment(n, rng);
    order_with_segment(a, b, start, end)
}

/// OX with a fixed inclusive segment `[start, end]`.
pub fn order_with_segment<T: Clone + PartialEq>(
    a: &[T],
    b: &[T],
    start: usize,
    end: usize,
) -> (Vec<T>, Vec<T>) {
    let keep: Vec<usize> = (start..=end).collect();
    (fill_from(a, b, &keep), fill_from(b, a, &keep))
}

// ============================================================================
// PBX
// ============================================================================

/// Position-Based Crossover (PBX).
///
/// Each position is kept from parent1 independently with `position_rate`
/// (see [`select_indices`]); the remaining positions are filled with
/// parent2's elements in parent2's order, skipping kept values. The second
/// child swaps the roles.
///
/// # Errors
/// [`GeneticError::InvalidRate`] if `position_rate` is outside `[0, 1]`.
pub fn position_based_crossover<T, R>(
    a: &[T],
    b: &[T],
    position_rate: f64,
    rng: &mut R,
) -> Result<(Vec<T>, Vec<T>)>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let positions = select_indices(position_rate, a.len(), rng)?;
    Ok(position_with_positions(a, b, &positions))
}

/// PBX with a fixed, ascending set of kept positions.
pub fn position_with_positions<T: Clone + PartialEq>(
    a: &[T],
    b: &[T],
    positions: &[usize],
) -> (Vec<T>, Vec<T>) {
    (fill_from(a, b, positions), fill_from(b, a, positions))
}

/// Build a child that keeps `template` at `kept` (ascending) and fills the
/// rest, left to right, with `donor`'s elements not already kept.
fn fill_from<T: Clone + PartialEq>(template: &[T], donor: &[T], kept: &[usize]) -> Vec<T> {
    let kept_values: Vec<&T> = kept.iter().map(|&i| &template[i]).collect();
    let mut fill = donor.iter().filter(|v| !kept_values.contains(v));
    let mut kept = kept.iter().peekable();
    let mut child = Vec::with_capacity(template.len());
    for i in 0..template.len() {
        if kept.next_if_eq(&&i).is_some() {
            child.push(template[i].clone());
        } else if let Some(value) = fill.next() {
            child.push(value.clone());
        } else {
            // Only reachable when the parents are not permutations of each other.
            child.push(template[i].clone());
        }
    }
    child
}

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
fn random_segment<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Operators
// ============================================================================

/// PMX applied to chromosomes of distinct genes. Exactly two parents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartiallyMappedCrossover {
    chromosome_rate: f64,
    exclusivity: bool,
}

impl PartiallyMappedCrossover {
    pub fn new(chromosome_rate: f64) -> Result<Self> {
        Ok(Self {
            chromosome_rate: check_rate("chromosome_rate", chromosome_rate)?,
            exclusivity: false,
        })
    }

    pub fn with_exclusivity(mut self, exclusivity: bool) -> Self {
        self.exclusivity = exclusivity;
        self
    }
}

impl<G: Gene> Crossover<G> for PartiallyMappedCrossover {
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
        let (a, b) = two_parents(parents)?;
        check_permutations(a.genes(), b.genes())?;
        let (c1, c2) = pmx_crossover(a.genes(), b.genes(), rng);
        Ok(vec![a.with_genes(c1), b.with_genes(c2)])
    }
}

/// OX applied to chromosomes of distinct genes. Exactly two parents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedCrossover {
    chromosome_rate: f64,
    exclusivity: bool,
}

impl OrderedCrossover {
    pub fn new(chromosome_rate: f64) -> Result<Self> {
        Ok(Self {
            chromosome_rate: check_rate("chromosome_rate", chromosome_rate)?,
            exclusivity: false,
        })
    }

    pub fn with_exclusivity(mut self, exclusivity: bool) -> Self {
        self.exclusivity = exclusivity;
        self
    }
}

impl<G: Gene> Crossover<G> for OrderedCrossover {
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
        let (a, b) = two_parents(parents)?;
        check_permutations(a.genes(), b.genes())?;
        let (c1, c2) = order_crossover(a.genes(), b.genes(), rng);
        Ok(vec![a.with_genes(c1), b.with_genes(c2)])
    }
}

/// PBX applied to chromosomes of distinct genes. Exactly two parents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionBasedCrossover {
    chromosome_rate: f64,
    position_rate: f64,
    exclusivity: bool,
}

impl PositionBasedCrossover {
    /// Creates a PBX operator keeping each position with probability 0.5.
    pub fn new(chromosome_rate: f64) -> Result<Self> {
        Ok(Self {
            chromosome_rate: check_rate("chromosome_rate", chromosome_rate)?,
            position_rate: 0.5,
            exclusivity: false,
        })
    }

    pub fn with_position_rate(mut self, position_rate: f64) -> Result<Self> {
        self.position_rate = check_rate("position_rate", position_rate)?;
        Ok(self)
    }

    pub fn with_exclusivity(mut self, exclusivity: bool) -> Self {
        self.exclusivity = exclusivity;
        self
    }
}

impl<G: Gene> Crossover<G> for PositionBasedCrossover {
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
        let (a, b) = two_parents(parents)?;
        check_permutations(a.genes(), b.genes())?;
        let (c1, c2) = position_based_crossover(a.genes(), b.genes(), self.position_rate, rng)?;
        Ok(vec![a.with_genes(c1), b.with_genes(c2)])
    }
}

// ============================================================================
// Tests
// ============================================================================
