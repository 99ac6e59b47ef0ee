//! Error type shared by operators and the engine.
//!
//! Errors fall into two families:
//!
//! - **Configuration errors** are raised while building an operator or an
//!   engine (a rate outside `[0, 1]`, too few parents, an empty population).
//! - **Precondition violations** are raised while an operator runs (wrong
//!   parent count, mismatched chromosome lengths, an operator returning the
//!   wrong number of individuals).
//!
//! Both are deterministic functions of their input. Nothing in the crate
//! retries.

use thiserror::Error;

/// Errors reported by genetic operators and the evolution engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneticError {
    /// A probability parameter is outside `[0, 1]` (or is NaN).
    #[error("{name} must be in [0, 1], got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    /// A crossover was configured with fewer than two parents.
    #[error("num_parents must be at least 2, got {0}")]
    InvalidParentCount(usize),

    /// A crossover was configured to produce no offspring.
    #[error("num_offspring must be at least 1, got {0}")]
    InvalidOffspringCount(usize),

    /// The population size is too small to evolve.
    #[error("population_size must be at least 1, got {0}")]
    InvalidPopulationSize(usize),

    /// Any other invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `crossover_chromosomes` received the wrong number of parents.
    #[error("expected {expected} parent chromosomes, got {actual}")]
    ParentCountMismatch { expected: usize, actual: usize },

    /// Two sequences that must have equal length do not.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A population does not have the size an operator or the engine requires.
    #[error("population size mismatch: expected {expected} individuals, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Exclusive crossover needs the population to split evenly into parent groups.
    #[error("exclusive crossover needs a population divisible by {parents}, got {population}")]
    NotDivisible { population: usize, parents: usize },

    /// A permutation operator received a chromosome with duplicate values.
    #[error("chromosome is not a permutation: {0}")]
    NotAPermutation(String),

    /// A gene value violates its own range or filter.
    #[error("invalid gene: {0}")]
    InvalidGene(String),

    /// A tree node's declared arity differs from its child count.
    #[error("node declares arity {arity} but has {children} children")]
    ArityMismatch { arity: usize, children: usize },

    /// An operation that needs at least one individual got none.
    #[error("population is empty")]
    EmptyPopulation,

    /// `step` was called on an engine that has already stopped.
    #[error("engine has terminated after {0} generations")]
    Terminated(usize),
}

impl GeneticError {
    /// Returns `true` for errors raised while building an operator or engine.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GeneticError::InvalidRate { .. }
                | GeneticError::InvalidParentCount(_)
                | GeneticError::InvalidOffspringCount(_)
                | GeneticError::InvalidPopulationSize(_)
                | GeneticError::InvalidConfig(_)
        )
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Checks that `value` is a probability.
///
/// NaN is rejected along with anything outside `[0, 1]`.
pub fn check_rate(name: &'static str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(GeneticError::InvalidRate { name, value })
    }
}
