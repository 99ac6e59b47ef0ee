//! The generational engine.
//!
//! Each generation the [`Engine`] keeps `survivor_count` individuals chosen by
//! the survivor [`Selection`], breeds `offspring_count` more by running the
//! offspring parents through its [`Alterer`](crate::alterers::Alterer)
//! pipeline, merges both into the next population and evaluates it. The run
//! stops when any [`Limit`] is reached.
//!
//! # Key Types
//!
//! - [`EngineConfig`]: population size, survival rate, selection, limits, presets
//! - [`Engine`] / [`EngineBuilder`]: executes the loop, one [`step`](Engine::step)
//!   at a time or to completion with [`evolve`](Engine::evolve)
//! - [`Optimizer`]: maximize or minimize, with `NaN` always losing
//! - [`EvolutionListener`]: observes [`GenerationStats`] and the final [`EvolutionSummary`]
//! - [`EvolutionResult`]: best individual, final population and fitness history
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod config;
mod engine;
mod limit;
mod listener;
mod optimizer;
mod selection;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, EngineState, FitnessFunction};
pub use limit::{Limit, Progress};
pub use listener::{
    EvolutionListener, EvolutionResult, EvolutionSummary, GenerationStats, StopReason,
};
pub use optimizer::Optimizer;
pub use selection::Selection;
