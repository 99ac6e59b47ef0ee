//! Gene types and their capabilities.
//!
//! Every gene implements [`Gene`]. The remaining traits are capabilities an
//! operator may require: [`Verifiable`] (constraint check), [`Resample`]
//! (fresh value from the gene's own range), [`Average`] (arithmetic mean of
//! several genes) and [`Flip`] (boolean negation). Gene types implement only
//! the ones that make sense for them.

use crate::error::{GeneticError, Result};
use rand::{Rng, RngCore};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A value predicate attached to a gene.
pub type Filter<T> = fn(&T) -> bool;

/// Attempts made by [`Resample`] before giving up on a filter.
const MAX_RESAMPLE_ATTEMPTS: usize = 1000;

fn filter_addr<T>(filter: Option<Filter<T>>) -> Option<usize> {
    filter.map(|f| f as usize)
}

fn checked<G: Verifiable + fmt::Debug>(gene: G) -> Result<G> {
    if gene.verify() {
        Ok(gene)
    } else {
        Err(GeneticError::InvalidGene(format!(
            "{gene:?} violates its constraints"
        )))
    }
}

/// The smallest unit of genetic encoding.
///
/// Genes are immutable: [`with_value`](Gene::with_value) returns a new gene
/// carrying the same constraints as `self`.
pub trait Gene: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The domain type of the wrapped value.
    type Value: Clone + fmt::Debug + PartialEq + Send + Sync;

    /// Returns the wrapped value.
    fn value(&self) -> &Self::Value;

    /// Duplicates this gene with a new value and the same constraints.
    fn with_value(&self, value: Self::Value) -> Self;
}

/// Genes that can check their own range/filter constraints.
pub trait Verifiable {
    /// Returns `true` if the gene satisfies its constraints.
    fn verify(&self) -> bool;

    /// Returns `true` if `other` carries the same range and filter.
    ///
    /// Genes without constraints always agree.
    fn same_constraints(&self, _other: &Self) -> bool {
        true
    }
}

/// Genes that can draw a fresh value from their own valid range.
pub trait Resample: Gene {
    /// Returns a copy of this gene with a uniformly sampled value.
    ///
    /// The new value may coincide with the old one.
    fn resample(&self, rng: &mut dyn RngCore) -> Self;
}

/// Numeric genes that support arithmetic blending.
pub trait Average: Gene {
    /// Returns a copy of `self` whose value is the mean of `self` and `others`.
    ///
    /// # Errors
    /// [`GeneticError::InvalidGene`] if the mean violates the gene's filter.
    fn average(&self, others: &[&Self]) -> Result<Self>;
}

/// Boolean genes that can be negated.
pub trait Flip: Gene {
    /// Returns a copy of this gene with its value negated.
    fn flipped(&self) -> Self;
}

// ============================================================================
// BoolGene
// ============================================================================

/// A boolean gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoolGene(bool);

impl BoolGene {
    /// Creates a gene holding `value`.
    pub fn new(value: bool) -> Self {
        Self(value)
    }
}

impl Gene for BoolGene {
    type Value = bool;

    fn value(&self) -> &bool {
        &self.0
    }

    fn with_value(&self, value: bool) -> Self {
        Self(value)
    }
}

impl Verifiable for BoolGene {
    fn verify(&self) -> bool {
        true
    }
}

impl Flip for BoolGene {
    fn flipped(&self) -> Self {
        Self(!self.0)
    }
}

impl Resample for BoolGene {
    fn resample(&self, rng: &mut dyn RngCore) -> Self {
        Self(rng.random_bool(0.5))
    }
}

// ============================================================================
// IntGene
// ============================================================================

/// An integer gene constrained to the inclusive range `lo..=hi` and an
/// optional filter.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntGene {
    value: i64,
    range: (i64, i64),
    #[cfg_attr(feature = "serde", serde(skip))]
    filter: Option<Filter<i64>>,
}

impl IntGene {
    /// Creates a gene, validating `value` against `range`.
    ///
    /// # Errors
    /// [`GeneticError::InvalidGene`] if the range is inverted or the value
    /// lies outside it.
    pub fn new(value: i64, range: (i64, i64)) -> Result<Self> {
        let gene = Self {
            value,
            range,
            filter: None,
        };
        if range.0 > range.1 {
            return Err(GeneticError::InvalidGene(format!(
                "inverted range {}..={}",
                range.0, range.1
            )));
        }
        if !gene.verify() {
            return Err(GeneticError::InvalidGene(format!(
                "{value} outside {}..={}",
                range.0, range.1
            )));
        }
        Ok(gene)
    }

    /// Attaches a filter, re-validating the current value.
    pub fn with_filter(mut self, filter: Filter<i64>) -> Result<Self> {
        self.filter = Some(filter);
        if self.verify() {
            Ok(self)
        } else {
            Err(GeneticError::InvalidGene(format!(
                "{} rejected by filter",
                self.value
            )))
        }
    }

    /// The inclusive `(lo, hi)` range.
    pub fn range(&self) -> (i64, i64) {
        self.range
    }

    pub fn filter(&self) -> Option<Filter<i64>> {
        self.filter
    }
}

impl PartialEq for IntGene {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.range == other.range
    }
}

impl Gene for IntGene {
    type Value = i64;

    fn value(&self) -> &i64 {
        &self.value
    }

    fn with_value(&self, value: i64) -> Self {
        Self { value, ..*self }
    }
}

impl Verifiable for IntGene {
    fn verify(&self) -> bool {
        let (lo, hi) = self.range;
        (lo..=hi).contains(&self.value) && self.filter.map_or(true, |f| f(&self.value))
    }

    fn same_constraints(&self, other: &Self) -> bool {
        self.range == other.range && filter_addr(self.filter) == filter_addr(other.filter)
    }
}

impl Resample for IntGene {
    fn resample(&self, rng: &mut dyn RngCore) -> Self {
        let (lo, hi) = self.range;
        for _ in 0..MAX_RESAMPLE_ATTEMPTS {
            let candidate = rng.random_range(lo..=hi);
            if self.filter.map_or(true, |f| f(&candidate)) {
                return self.with_value(candidate);
            }
        }
        *self
    }
}

impl Average for IntGene {
    fn average(&self, others: &[&Self]) -> Result<Self> {
        let sum: i128 = others
            .iter()
            .map(|g| g.value as i128)
            .sum::<i128>()
            + self.value as i128;
        let mean = sum.div_euclid(others.len() as i128 + 1);
        checked(self.with_value(mean as i64))
    }
}

// ============================================================================
// DoubleGene
// ============================================================================

/// A floating-point gene constrained to the half-open range `lo..hi` and an
/// optional filter.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DoubleGene {
    value: f64,
    range: (f64, f64),
    #[cfg_attr(feature = "serde", serde(skip))]
    filter: Option<Filter<f64>>,
}

impl DoubleGene {
    /// Creates a gene, validating `value` against `range`.
    ///
    /// # Errors
    /// [`GeneticError::InvalidGene`] if the range is empty, its width is not
    /// finite, or the value lies outside it.
    pub fn new(value: f64, range: (f64, f64)) -> Result<Self> {
        let (lo, hi) = range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(GeneticError::InvalidGene(format!("empty range {lo}..{hi}")));
        }
        if !(hi - lo).is_finite() {
            return Err(GeneticError::InvalidGene(format!(
                "range {lo}..{hi} is too wide to sample"
            )));
        }
        let gene = Self {
            value,
            range,
            filter: None,
        };
        if !gene.verify() {
            return Err(GeneticError::InvalidGene(format!(
                "{value} outside {lo}..{hi}"
            )));
        }
        Ok(gene)
    }

    /// Attaches a filter, re-validating the current value.
    pub fn with_filter(mut self, filter: Filter<f64>) -> Result<Self> {
        self.filter = Some(filter);
        if self.verify() {
            Ok(self)
        } else {
            Err(GeneticError::InvalidGene(format!(
                "{} rejected by filter",
                self.value
            )))
        }
    }

    /// The half-open `(lo, hi)` range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn filter(&self) -> Option<Filter<f64>> {
        self.filter
    }
}

impl PartialEq for DoubleGene {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.range == other.range
    }
}

impl Gene for DoubleGene {
    type Value = f64;

    fn value(&self) -> &f64 {
        &self.value
    }

    fn with_value(&self, value: f64) -> Self {
        Self { value, ..*self }
    }
}

impl Verifiable for DoubleGene {
    fn verify(&self) -> bool {
        let (lo, hi) = self.range;
        (lo..hi).contains(&self.value) && self.filter.map_or(true, |f| f(&self.value))
    }

    fn same_constraints(&self, other: &Self) -> bool {
        self.range == other.range && filter_addr(self.filter) == filter_addr(other.filter)
    }
}

impl Resample for DoubleGene {
    fn resample(&self, rng: &mut dyn RngCore) -> Self {
        let (lo, hi) = self.range;
        for _ in 0..MAX_RESAMPLE_ATTEMPTS {
            let candidate = rng.random_range(lo..hi);
            if self.filter.map_or(true, |f| f(&candidate)) {
                return self.with_value(candidate);
            }
        }
        *self
    }
}

impl Average for DoubleGene {
    fn average(&self, others: &[&Self]) -> Result<Self> {
        let sum = others.iter().map(|g| g.value).sum::<f64>() + self.value;
        checked(self.with_value(sum / (others.len() + 1) as f64))
    }
}
