//! The generational loop.
//!
//! [`Engine`] orchestrates the evolutionary process:
//! evaluate → select survivors → select offspring → alter → merge → check limits.
//!
//! # State machine
//!
//! `Created → Evolving → Terminated`. The first [`step`](Engine::step) builds
//! and evaluates the initial population; every step then runs exactly one
//! generation. Once any limit is reached (or the run is cancelled) the engine
//! is terminated and further steps fail.

use super::config::EngineConfig;
use super::limit::{first_reached, Progress};
use super::listener::{EvolutionListener, EvolutionResult, GenerationStats, StopReason};
use super::optimizer::Optimizer;
use crate::alterers::Alterer;
use crate::error::{GeneticError, Result};
use crate::genetics::{Gene, Genotype, GenotypeFactory, Individual, Population};
use crate::random::{create_random_rng, create_rng, derive_seeds};
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Scores a genotype. Must be pure; `NaN` marks an invalid genotype.
///
/// Any `Fn(&Genotype<G>) -> f64` closure is a fitness function.
pub trait FitnessFunction<G: Gene>: Send + Sync {
    fn evaluate(&self, genotype: &Genotype<G>) -> f64;
}

impl<G, F> FitnessFunction<G> for F
where
    G: Gene,
    F: Fn(&Genotype<G>) -> f64 + Send + Sync,
{
    fn evaluate(&self, genotype: &Genotype<G>) -> f64 {
        self(genotype)
    }
}

/// Lifecycle of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Created,
    Evolving,
    Terminated,
}

/// Assembles an [`Engine`].
///
/// # Usage
///
/// ```
/// use u_genetic::alterers::{Alterer, BitFlipMutator, MultiPointCrossover, MutationRates};
/// use u_genetic::evolution::{Engine, EngineConfig};
/// use u_genetic::genetics::factory::BoolChromosomeFactory;
/// use u_genetic::genetics::{BoolGene, Gene, Genotype, GenotypeFactory};
///
/// let factory = GenotypeFactory::new()
///     .with_chromosome(BoolChromosomeFactory::new(16, 0.5).unwrap());
/// let ones = |g: &Genotype<BoolGene>| g.genes().filter(|b| *b.value()).count() as f64;
///
/// let mut engine = Engine::builder(factory, ones)
///     .config(EngineConfig::default().with_seed(7).with_max_generations(20))
///     .alterer(Alterer::crossover(MultiPointCrossover::single_point(0.6).unwrap()))
///     .alterer(Alterer::mutator(BitFlipMutator::new(MutationRates::new(0.3, 1.0, 0.05).unwrap())))
///     .build()
///     .unwrap();
///
/// let result = engine.evolve().unwrap();
/// assert_eq!(result.generations, 20);
/// ```
pub struct EngineBuilder<G: Gene> {
    factory: GenotypeFactory<G>,
    fitness: Box<dyn FitnessFunction<G>>,
    config: EngineConfig,
    alterers: Vec<Alterer<G>>,
    listeners: Vec<Box<dyn EvolutionListener>>,
    population: Option<Population<G>>,
}

impl<G: Gene> EngineBuilder<G> {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends an alterer to the pipeline; they run in insertion order.
    pub fn alterer(mut self, alterer: Alterer<G>) -> Self {
        self.alterers.push(alterer);
        self
    }

    pub fn alterers(mut self, alterers: impl IntoIterator<Item = Alterer<G>>) -> Self {
        self.alterers.extend(alterers);
        self
    }

    pub fn listener(mut self, listener: impl EvolutionListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Starts from these individuals instead of building the first
    /// generation from the factory. Missing individuals are still built.
    pub fn population(mut self, population: Population<G>) -> Self {
        self.population = Some(population);
        self
    }

    /// Validates the configuration and builds the engine.
    ///
    /// # Errors
    /// Any configuration error of [`EngineConfig::validate`], an empty
    /// genotype factory, or a seed population larger than `population_size`.
    pub fn build(self) -> Result<Engine<G>> {
        self.config.validate()?;
        if self.factory.is_empty() {
            return Err(GeneticError::InvalidConfig(
                "genotype factory has no chromosomes".into(),
            ));
        }
        if let Some(initial) = &self.population {
            if initial.len() > self.config.population_size {
                return Err(GeneticError::SizeMismatch {
                    expected: self.config.population_size,
                    actual: initial.len(),
                });
            }
        }

        let rng = match self.config.seed {
            Some(seed) => create_rng(seed),
            None => create_random_rng(),
        };
        Ok(Engine {
            factory: self.factory,
            fitness: self.fitness,
            alterers: self.alterers,
            listeners: self.listeners,
            rng,
            population: self.population.unwrap_or_default(),
            state: EngineState::Created,
            generation: 0,
            best: None,
            steady: 0,
            fitness_history: Vec::new(),
            started: None,
            cancel: None,
            stopped_by: None,
            config: self.config,
        })
    }
}

/// Executes the generational loop.
pub struct Engine<G: Gene> {
    config: EngineConfig,
    factory: GenotypeFactory<G>,
    fitness: Box<dyn FitnessFunction<G>>,
    alterers: Vec<Alterer<G>>,
    listeners: Vec<Box<dyn EvolutionListener>>,
    rng: StdRng,
    population: Population<G>,
    state: EngineState,
    generation: usize,
    best: Option<Individual<G>>,
    steady: usize,
    fitness_history: Vec<f64>,
    started: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
    stopped_by: Option<StopReason>,
}

impl<G: Gene> Engine<G> {
    /// Starts building an engine from a genotype factory and a fitness function.
    pub fn builder(
        factory: GenotypeFactory<G>,
        fitness: impl FitnessFunction<G> + 'static,
    ) -> EngineBuilder<G> {
        EngineBuilder {
            factory,
            fitness: Box::new(fitness),
            config: EngineConfig::default(),
            alterers: Vec::new(),
            listeners: Vec::new(),
            population: None,
        }
    }

    /// Attaches a cancellation flag.
    ///
    /// If the flag is set to `true`, [`evolve`](Self::evolve) stops before
    /// the next generation and returns the best solution found so far.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[Individual<G>] {
        &self.population
    }

    /// Best individual found so far.
    pub fn best(&self) -> Option<&Individual<G>> {
        self.best.as_ref()
    }

    pub fn stopped_by(&self) -> Option<StopReason> {
        self.stopped_by
    }

    /// Runs one generation, building the initial population first if needed.
    ///
    /// # Errors
    /// [`GeneticError::Terminated`] once the engine has stopped, otherwise
    /// any error raised by selection or the alterers. Errors are fatal to
    /// the run.
    pub fn step(&mut self) -> Result<GenerationStats> {
        match self.state {
            EngineState::Terminated => return Err(GeneticError::Terminated(self.generation)),
            EngineState::Created => self.initialize()?,
            EngineState::Evolving => {}
        }

        let start = Instant::now();
        let optimizer = self.config.optimizer;
        let survivor_count = self.config.survivor_count();
        let offspring_count = self.config.offspring_count();

        evaluate(self.fitness.as_ref(), &mut self.population, self.config.parallel);

        let survivors = self.config.survivor_selection.select(
            &self.population,
            survivor_count,
            optimizer,
            &mut self.rng,
        )?;
        let mut offspring = self.config.offspring_selection.select(
            &self.population,
            offspring_count,
            optimizer,
            &mut self.rng,
        )?;

        let mut alterations = Vec::with_capacity(self.alterers.len());
        for alterer in &self.alterers {
            let result = alterer.alter(offspring, offspring_count, &mut self.rng)?;
            alterations.push((alterer.kind(), result.count));
            offspring = result.population;
        }

        let mut next = survivors;
        next.extend(offspring);
        if next.len() != self.config.population_size {
            return Err(GeneticError::SizeMismatch {
                expected: self.config.population_size,
                actual: next.len(),
            });
        }
        evaluate(self.fitness.as_ref(), &mut next, self.config.parallel);
        self.population = next;
        self.generation += 1;

        self.update_best();
        let best_so_far = self.best_fitness();
        self.fitness_history.push(best_so_far);

        let (best_fitness, mean_fitness, worst_fitness) = summarize(&self.population, optimizer);
        let stats = GenerationStats {
            generation: self.generation,
            best_fitness,
            mean_fitness,
            worst_fitness,
            best_so_far,
            survivors: survivor_count,
            offspring: offspring_count,
            alterations,
            elapsed: start.elapsed(),
        };
        log::debug!(
            "generation {}: best {:.6} (so far {:.6}), mean {:.6}, {} alterations",
            stats.generation,
            stats.best_fitness,
            stats.best_so_far,
            stats.mean_fitness,
            stats.total_alterations()
        );
        for listener in &mut self.listeners {
            listener.on_generation(&stats);
        }

        let progress = Progress {
            generation: self.generation,
            best_fitness: best_so_far,
            steady_generations: self.steady,
            elapsed: self.elapsed(),
        };
        if let Some(limit) = first_reached(&self.config.limits, &progress, optimizer) {
            self.terminate(StopReason::Limit(limit));
        }
        Ok(stats)
    }

    /// Runs generations until a limit is reached or the run is cancelled.
    ///
    /// # Errors
    /// The first error raised by [`step`](Self::step); a run that has
    /// already terminated reports [`GeneticError::Terminated`].
    pub fn evolve(&mut self) -> Result<EvolutionResult<G>> {
        if self.state == EngineState::Terminated {
            return Err(GeneticError::Terminated(self.generation));
        }
        log::info!(
            "evolution started: population {}, {} survivors, {} alterers",
            self.config.population_size,
            self.config.survivor_count(),
            self.alterers.len()
        );

        while self.state != EngineState::Terminated {
            if self.is_cancelled() {
                if self.state == EngineState::Created {
                    self.initialize()?;
                }
                self.terminate(StopReason::Cancelled);
                break;
            }
            self.step()?;
        }

        let stopped_by = self.stopped_by.unwrap_or(StopReason::Cancelled);
        let best = match &self.best {
            Some(best) => best.clone(),
            None => return Err(GeneticError::EmptyPopulation),
        };
        let result = EvolutionResult {
            best,
            population: self.population.clone(),
            generations: self.generation,
            stopped_by,
            fitness_history: self.fitness_history.clone(),
            elapsed: self.elapsed(),
        };

        let summary = result.summary();
        for listener in &mut self.listeners {
            listener.on_finish(&summary);
        }
        Ok(result)
    }

    fn initialize(&mut self) -> Result<()> {
        self.started = Some(Instant::now());
        let missing = self.config.population_size - self.population.len();
        let seeds = derive_seeds(&mut self.rng, missing);
        let built = build_population(&self.factory, &seeds, self.config.parallel)?;
        self.population.extend(built);

        evaluate(self.fitness.as_ref(), &mut self.population, self.config.parallel);
        self.update_best();
        self.steady = 0;
        self.state = EngineState::Evolving;
        log::debug!(
            "initial population of {} evaluated, best {:.6}",
            self.population.len(),
            self.best_fitness()
        );
        Ok(())
    }

    /// Tracks the best individual and the steady-generation counter.
    fn update_best(&mut self) {
        let optimizer = self.config.optimizer;
        let Some(candidate) = optimizer.best(&self.population) else {
            return;
        };
        match &self.best {
            Some(best) if !optimizer.is_better(candidate.fitness(), best.fitness()) => {
                self.steady += 1;
            }
            _ => {
                self.best = Some(candidate.clone());
                self.steady = 0;
            }
        }
    }

    fn terminate(&mut self, reason: StopReason) {
        log::info!(
            "evolution stopped after {} generations ({reason}), best fitness {:.6}",
            self.generation,
            self.best_fitness()
        );
        self.state = EngineState::Terminated;
        self.stopped_by = Some(reason);
    }

    fn best_fitness(&self) -> f64 {
        self.best.as_ref().map_or(f64::NAN, Individual::fitness)
    }

    fn elapsed(&self) -> Duration {
        self.started.map_or(Duration::ZERO, |t| t.elapsed())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Build one genotype per seed, each from its own sub-stream.
fn build_population<G: Gene>(
    factory: &GenotypeFactory<G>,
    seeds: &[u64],
    parallel: bool,
) -> Result<Population<G>> {
    let build = |&seed: &u64| -> Result<Individual<G>> {
        let mut rng = create_rng(seed);
        Ok(Individual::new(factory.make(&mut rng)?))
    };

    #[cfg(feature = "parallel")]
    {
        if parallel {
            return seeds.par_iter().map(build).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    seeds.iter().map(build).collect()
}

/// Evaluate every individual that has no fitness yet.
fn evaluate<G: Gene>(
    fitness: &dyn FitnessFunction<G>,
    population: &mut [Individual<G>],
    parallel: bool,
) {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            population
                .par_iter_mut()
                .filter(|ind| !ind.is_evaluated())
                .for_each(|ind| {
                    let f = fitness.evaluate(ind.genotype());
                    ind.set_fitness(f);
                });
            return;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for ind in population.iter_mut().filter(|ind| !ind.is_evaluated()) {
        let f = fitness.evaluate(ind.genotype());
        ind.set_fitness(f);
    }
}

/// Best, mean and worst of the evaluated fitness values (NaN if none).
fn summarize<G>(population: &[Individual<G>], optimizer: Optimizer) -> (f64, f64, f64) {
    let values: Vec<f64> = population
        .iter()
        .map(Individual::fitness)
        .filter(|f| !f.is_nan())
        .collect();
    let Some(&first) = values.first() else {
        return (f64::NAN, f64::NAN, f64::NAN);
    };
    let (best, worst) = values.iter().fold((first, first), |(best, worst), &f| {
        (
            if optimizer.is_better(f, best) { f } else { best },
            if optimizer.is_better(worst, f) { f } else { worst },
        )
    });
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (best, mean, worst)
}
