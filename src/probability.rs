//! Probabilistic subset selection.
//!
//! Every rate-gated operator decides which chromosomes, genes or positions
//! take part through [`select_indices`]. Each index gets its own Bernoulli
//! trial, in ascending order, consuming exactly one draw from the stream,
//! so a replayed seed predicts every decision.

use crate::error::{check_rate, Result};
use rand::Rng;

/// Probabilities closer than this to 0 or 1 are treated as exactly 0 or 1.
pub const EPSILON: f64 = 1e-20;

/// Selects the indices of `0..range_size` that take part in an operation.
///
/// - `probability <= EPSILON` selects nothing and draws nothing.
/// - `probability >= 1 - EPSILON` selects every index and draws nothing.
/// - Otherwise each index is kept independently with `probability`.
///
/// # Errors
/// Returns [`GeneticError::InvalidRate`](crate::GeneticError::InvalidRate)
/// if `probability` is outside `[0, 1]`.
pub fn select_indices<R: Rng + ?Sized>(
    probability: f64,
    range_size: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let probability = check_rate("probability", probability)?;
    if range_size == 0 || probability <= EPSILON {
        return Ok(Vec::new());
    }
    if probability >= 1.0 - EPSILON {
        return Ok((0..range_size).collect());
    }
    Ok((0..range_size)
        .filter(|_| rng.random::<f64>() < probability)
        .collect())
}

/// Like [`select_indices`], but returns references to the chosen items.
pub fn select_items<'a, T, R: Rng + ?Sized>(
    probability: f64,
    items: &'a [T],
    rng: &mut R,
) -> Result<Vec<&'a T>> {
    Ok(select_indices(probability, items.len(), rng)?
        .into_iter()
        .map(|i| &items[i])
        .collect())
}
