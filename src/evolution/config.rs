//! Engine configuration.
//!
//! [`EngineConfig`] holds all parameters that control the generational loop.

use super::limit::Limit;
use super::optimizer::Optimizer;
use super::selection::Selection;
use crate::error::{check_rate, GeneticError, Result};
use std::time::Duration;

/// Configuration for the generational engine.
///
/// Controls population size, the survivor/offspring split, selection
/// strategies, termination and parallelism. Setters store values as given;
/// [`validate`](Self::validate) reports anything out of range.
///
/// # Defaults
///
/// ```
/// use u_genetic::evolution::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.survivor_count(), 20);
/// assert_eq!(config.offspring_count(), 30);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_genetic::evolution::{EngineConfig, Limit, Optimizer, Selection};
///
/// let config = EngineConfig::default()
///     .with_population_size(200)
///     .with_survival_rate(0.2)
///     .with_optimizer(Optimizer::Minimize)
///     .with_offspring_selection(Selection::Roulette)
///     .with_limit(Limit::TargetFitness(0.0));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Number of individuals in every generation.
    pub population_size: usize,

    /// Fraction of each generation kept as survivors (0.0–1.0).
    ///
    /// `offspring = floor((1 - survival_rate) * population_size)`; survivors
    /// fill the rest.
    pub survival_rate: f64,

    /// Whether higher or lower fitness is better.
    pub optimizer: Optimizer,

    /// Strategy choosing the survivors.
    pub survivor_selection: Selection,

    /// Strategy choosing the parents of the offspring.
    pub offspring_selection: Selection,

    /// Termination conditions, OR-combined.
    pub limits: Vec<Limit>,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether to build and evaluate individuals in parallel using rayon.
    ///
    /// Only takes effect with the `parallel` feature. Results are identical
    /// either way.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            survival_rate: 0.4,
            optimizer: Optimizer::Maximize,
            survivor_selection: Selection::default(),
            offspring_selection: Selection::default(),
            limits: vec![Limit::MaxGenerations(100)],
            seed: None,
            parallel: false,
        }
    }
}

impl EngineConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the survival rate.
    pub fn with_survival_rate(mut self, rate: f64) -> Self {
        self.survival_rate = rate;
        self
    }

    pub fn with_optimizer(mut self, optimizer: Optimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets the survivor selection strategy.
    pub fn with_survivor_selection(mut self, sel: Selection) -> Self {
        self.survivor_selection = sel;
        self
    }

    /// Sets the offspring (parent) selection strategy.
    pub fn with_offspring_selection(mut self, sel: Selection) -> Self {
        self.offspring_selection = sel;
        self
    }

    /// Replaces every limit.
    pub fn with_limits(mut self, limits: Vec<Limit>) -> Self {
        self.limits = limits;
        self
    }

    /// Adds a limit to the existing ones.
    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limits.push(limit);
        self
    }

    /// Replaces the generation-count limit, keeping the others.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.limits.retain(|l| !matches!(l, Limit::MaxGenerations(_)));
        self.limits.push(Limit::MaxGenerations(n));
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of offspring bred each generation.
    pub fn offspring_count(&self) -> usize {
        let offspring = ((1.0 - self.survival_rate) * self.population_size as f64).floor();
        (offspring.max(0.0) as usize).min(self.population_size)
    }

    /// Number of survivors kept each generation.
    pub fn survivor_count(&self) -> usize {
        self.population_size - self.offspring_count()
    }

    /// Preset for fast optimization: small population, few generations.
    ///
    /// - Population: 50, Generations: 100, Time limit: 10s
    /// - Steady generations: 20
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            limits: vec![
                Limit::MaxGenerations(100),
                Limit::SteadyGenerations(20),
                Limit::TimeLimit(Duration::from_secs(10)),
            ],
            ..Self::default()
        }
    }

    /// Preset for balanced optimization: moderate population and generations.
    ///
    /// - Population: 100, Generations: 300, Time limit: 30s
    /// - Steady generations: 50
    pub fn balanced() -> Self {
        Self {
            population_size: 100,
            limits: vec![
                Limit::MaxGenerations(300),
                Limit::SteadyGenerations(50),
                Limit::TimeLimit(Duration::from_secs(30)),
            ],
            ..Self::default()
        }
    }

    /// Preset for quality optimization: large population, many generations.
    ///
    /// - Population: 150, Generations: 500, Time limit: 60s
    /// - Steady generations: 80
    pub fn quality() -> Self {
        Self {
            population_size: 150,
            limits: vec![
                Limit::MaxGenerations(500),
                Limit::SteadyGenerations(80),
                Limit::TimeLimit(Duration::from_secs(60)),
            ],
            ..Self::default()
        }
    }

    /// Automatically selects a preset based on problem size.
    ///
    /// - `gene_count < 50` → [`fast()`](Self::fast)
    /// - `50 ≤ gene_count < 200` → [`balanced()`](Self::balanced)
    /// - `gene_count ≥ 200` → [`quality()`](Self::quality)
    pub fn auto_select(gene_count: usize) -> Self {
        if gene_count < 50 {
            Self::fast()
        } else if gene_count < 200 {
            Self::balanced()
        } else {
            Self::quality()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// The first invalid parameter found, as a configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(GeneticError::InvalidPopulationSize(self.population_size));
        }
        check_rate("survival_rate", self.survival_rate)?;
        self.survivor_selection.validate()?;
        self.offspring_selection.validate()?;
        if self.limits.is_empty() {
            return Err(GeneticError::InvalidConfig(
                "at least one limit is required".into(),
            ));
        }
        self.limits.iter().try_for_each(Limit::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.population_size, 50);
        assert!((config.survival_rate - 0.4).abs() < 1e-10);
        assert_eq!(config.optimizer, Optimizer::Maximize);
        assert_eq!(config.survivor_selection, Selection::Tournament(3));
        assert_eq!(config.offspring_selection, Selection::Tournament(3));
        assert_eq!(config.limits, vec![Limit::MaxGenerations(100)]);
        assert!(config.seed.is_none());
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split() {
        let config = EngineConfig::default();
        assert_eq!(config.offspring_count(), 30);
        assert_eq!(config.survivor_count(), 20);

        let all_offspring = config.clone().with_survival_rate(0.0);
        assert_eq!(all_offspring.offspring_count(), 50);
        assert_eq!(all_offspring.survivor_count(), 0);

        let all_survivors = config.clone().with_survival_rate(1.0);
        assert_eq!(all_survivors.offspring_count(), 0);

        let odd = config.with_population_size(7).with_survival_rate(0.5);
        assert_eq!(odd.offspring_count(), 3);
        assert_eq!(odd.survivor_count(), 4);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::default()
            .with_population_size(200)
            .with_survival_rate(0.25)
            .with_optimizer(Optimizer::Minimize)
            .with_survivor_selection(Selection::Rank)
            .with_offspring_selection(Selection::Roulette)
            .with_max_generations(1000)
            .with_parallel(true)
            .with_seed(42);

        assert_eq!(config.population_size, 200);
        assert_eq!(config.optimizer, Optimizer::Minimize);
        assert_eq!(config.survivor_selection, Selection::Rank);
        assert_eq!(config.offspring_selection, Selection::Roulette);
        assert_eq!(config.limits, vec![Limit::MaxGenerations(1000)]);
        assert!(config.parallel);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_rates_are_not_clamped() {
        let config = EngineConfig::default().with_survival_rate(1.5);
        assert!((config.survival_rate - 1.5).abs() < 1e-10);
        assert_eq!(
            config.validate(),
            Err(GeneticError::InvalidRate {
                name: "survival_rate",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_validate_rejects() {
        let zero = EngineConfig::default().with_population_size(0);
        assert_eq!(zero.validate(), Err(GeneticError::InvalidPopulationSize(0)));
        assert!(zero.validate().unwrap_err().is_configuration());

        let no_limits = EngineConfig::default().with_limits(Vec::new());
        assert!(no_limits.validate().is_err());

        let bad_limit = EngineConfig::default().with_limit(Limit::SteadyGenerations(0));
        assert!(bad_limit.validate().is_err());

        let bad_tournament =
            EngineConfig::default().with_survivor_selection(Selection::Tournament(0));
        assert!(bad_tournament.validate().is_err());
    }

    // ---- Presets ----

    #[test]
    fn test_presets() {
        for (config, size, generations) in [
            (EngineConfig::fast(), 50, 100),
            (EngineConfig::balanced(), 100, 300),
            (EngineConfig::quality(), 150, 500),
        ] {
            assert_eq!(config.population_size, size);
            assert!(config.limits.contains(&Limit::MaxGenerations(generations)));
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_preset_chainable() {
        let config = EngineConfig::fast().with_population_size(75).with_seed(42);
        assert_eq!(config.population_size, 75);
        assert_eq!(config.seed, Some(42));
        assert!(config
            .limits
            .contains(&Limit::TimeLimit(Duration::from_secs(10))));
    }

    #[test]
    fn test_auto_select_boundaries() {
        assert_eq!(EngineConfig::auto_select(49).population_size, 50);
        assert_eq!(EngineConfig::auto_select(50).population_size, 100);
        assert_eq!(EngineConfig::auto_select(199).population_size, 100);
        assert_eq!(EngineConfig::auto_select(200).population_size, 150);
    }
}
