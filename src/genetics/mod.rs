//! Genetic material model.
//!
//! Immutable value containers: [`Gene`] types, [`Chromosome`], [`Genotype`],
//! [`Individual`] and the GP [`Tree`]. Every "change" produces a new value
//! and leaves the old one usable.
//!
//! # Capabilities
//!
//! Instead of a shared base type, each gene implements the small traits it
//! needs: [`Verifiable`], [`Resample`], [`Average`], [`Flip`].
//!
//! # Submodules
//!
//! - [`factory`]: random chromosome and genotype creation for the initial population

mod chromosome;
pub mod factory;
mod gene;
mod individual;
mod tree;

pub use chromosome::{Chromosome, Genotype};
pub use factory::{ChromosomeFactory, GenotypeFactory};
pub use gene::{Average, BoolGene, DoubleGene, Filter, Flip, Gene, IntGene, Resample, Verifiable};
pub use individual::{Individual, Population};
pub use tree::{Primitive, ProgramGene, Tree, TreePath};
