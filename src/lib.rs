//! Genetic algorithm and genetic programming operators with a generational engine.
//!
//! Provides the building blocks of an evolutionary run:
//!
//! - **Genetics**: immutable genes, chromosomes, genotypes and individuals,
//!   including program-tree genes for genetic programming.
//! - **Operators**: rate-gated mutators (bit-flip, swap, inversion,
//!   random-reset, point) and crossovers (multi-point, average, PMX, OX,
//!   PBX, subtree), chained as an alteration pipeline.
//! - **Engine**: the generational loop with pluggable selection,
//!   optimization direction, termination limits and listeners.
//!
//! # Architecture
//!
//! Every operation that needs randomness receives the generator explicitly;
//! there is no global state. With a fixed seed a run is reproducible bit for
//! bit, with or without the `parallel` feature.
//!
//! # Features
//!
//! - `parallel`: builds and evaluates individuals with rayon.
//! - `serde`: `Serialize`/`Deserialize` for configuration types and plain genes.

pub mod alterers;
pub mod error;
pub mod evolution;
pub mod genetics;
pub mod probability;
pub mod random;

pub use error::{GeneticError, Result};
