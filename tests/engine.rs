//! End-to-end runs of the engine on small benchmark problems.

use std::sync::{Arc, Mutex};

use u_genetic::alterers::{
    Alterer, AverageCrossover, BitFlipMutator, MultiPointCrossover, MutationRates,
    OrderedCrossover, PartiallyMappedCrossover, PointMutator, RandomResetMutator,
    SubtreeCrossover, SwapMutator,
};
use u_genetic::evolution::{
    Engine, EngineConfig, GenerationStats, Limit, Optimizer, Selection, StopReason,
};
use u_genetic::genetics::factory::{
    BoolChromosomeFactory, DoubleChromosomeFactory, PermutationChromosomeFactory,
    ProgramChromosomeFactory,
};
use u_genetic::genetics::{
    BoolGene, DoubleGene, Gene, Genotype, GenotypeFactory, IntGene, Primitive, ProgramGene,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_monotonic(history: &[f64], optimizer: Optimizer) {
    for w in history.windows(2) {
        assert!(
            !optimizer.is_better(w[0], w[1]),
            "best-so-far regressed from {} to {}",
            w[0],
            w[1]
        );
    }
}

// ---- OneMax ----

fn ones(genotype: &Genotype<BoolGene>) -> f64 {
    genotype.genes().filter(|g| *g.value()).count() as f64
}

#[test]
fn onemax_reaches_the_optimum() {
    init_logger();
    let factory =
        GenotypeFactory::new().with_chromosome(BoolChromosomeFactory::new(32, 0.5).unwrap());
    let mut engine = Engine::builder(factory, ones)
        .config(
            EngineConfig::default()
                .with_seed(7)
                .with_max_generations(300)
                .with_limit(Limit::TargetFitness(32.0)),
        )
        .alterer(Alterer::crossover(MultiPointCrossover::new(0.8, 2).unwrap()))
        .alterer(Alterer::mutator(BitFlipMutator::new(
            MutationRates::new(0.5, 1.0, 1.0 / 32.0).unwrap(),
        )))
        .build()
        .unwrap();

    let result = engine.evolve().unwrap();
    assert!(result.best_fitness() >= 28.0, "got {}", result.best_fitness());
    assert_eq!(result.fitness_history.len(), result.generations);
    assert_monotonic(&result.fitness_history, Optimizer::Maximize);
    if result.best_fitness() == 32.0 {
        assert_eq!(
            result.stopped_by,
            StopReason::Limit(Limit::TargetFitness(32.0))
        );
    }
}

#[test]
fn population_split_follows_survival_rate() {
    init_logger();
    let factory =
        GenotypeFactory::new().with_chromosome(BoolChromosomeFactory::new(12, 0.5).unwrap());
    let seen: Arc<Mutex<Vec<GenerationStats>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut engine = Engine::builder(factory, ones)
        .config(
            EngineConfig::default()
                .with_population_size(50)
                .with_survival_rate(0.4)
                .with_seed(3)
                .with_max_generations(15),
        )
        .alterer(Alterer::crossover(MultiPointCrossover::single_point(1.0).unwrap()))
        .listener(move |stats: &GenerationStats| sink.lock().unwrap().push(stats.clone()))
        .build()
        .unwrap();

    let result = engine.evolve().unwrap();
    assert_eq!(result.population.len(), 50);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 15);
    for (i, stats) in seen.iter().enumerate() {
        assert_eq!(stats.generation, i + 1);
        assert_eq!(stats.survivors, 20);
        assert_eq!(stats.offspring, 30);
        assert_eq!(stats.alterations.len(), 1);
        assert_eq!(stats.alterations[0].0, "crossover");
    }
}

// ---- Sphere (real-valued minimisation) ----

fn sphere(genotype: &Genotype<DoubleGene>) -> f64 {
    genotype.genes().map(|g| g.value() * g.value()).sum()
}

#[test]
fn sphere_is_minimised() {
    init_logger();
    let factory = GenotypeFactory::new()
        .with_chromosome(DoubleChromosomeFactory::new(3, (-5.0, 5.0)).unwrap());
    let mut engine = Engine::builder(factory, sphere)
        .config(
            EngineConfig::default()
                .with_optimizer(Optimizer::Minimize)
                .with_offspring_selection(Selection::Rank)
                .with_seed(11)
                .with_max_generations(100),
        )
        .alterer(Alterer::crossover(AverageCrossover::new(0.7, 0.5).unwrap()))
        .alterer(Alterer::mutator(RandomResetMutator::new(
            MutationRates::new(0.3, 1.0, 0.2).unwrap(),
        )))
        .build()
        .unwrap();

    let result = engine.evolve().unwrap();
    assert_monotonic(&result.fitness_history, Optimizer::Minimize);
    assert!(result.best_fitness() <= result.fitness_history[0]);
    assert!(result.best_fitness() < 4.0, "got {}", result.best_fitness());
    for gene in result.best.genotype().genes() {
        assert!((-5.0..=5.0).contains(gene.value()));
    }
}

// ---- Permutation sorting ----

fn fixed_points(genotype: &Genotype<IntGene>) -> f64 {
    genotype
        .genes()
        .enumerate()
        .filter(|(i, g)| *g.value() == *i as i64)
        .count() as f64
}

#[test]
fn permutations_stay_valid_and_improve() {
    init_logger();
    const N: usize = 8;
    let factory =
        GenotypeFactory::new().with_chromosome(PermutationChromosomeFactory::new(N).unwrap());
    let mut engine = Engine::builder(factory, fixed_points)
        .config(EngineConfig::balanced().with_seed(5).with_max_generations(120))
        .alterer(Alterer::crossover(PartiallyMappedCrossover::new(0.6).unwrap()))
        .alterer(Alterer::crossover(OrderedCrossover::new(0.3).unwrap()))
        .alterer(Alterer::mutator(SwapMutator::new(
            MutationRates::new(0.4, 1.0, 0.1).unwrap(),
        )))
        .build()
        .unwrap();

    let result = engine.evolve().unwrap();
    assert!(result.best_fitness() >= 5.0, "got {}", result.best_fitness());
    for individual in &result.population {
        let mut values = individual.genotype().flatten();
        values.sort_unstable();
        assert_eq!(values, (0..N as i64).collect::<Vec<_>>());
    }
}

// ---- Symbolic regression ----

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Add,
    Mul,
    X,
    One,
}

impl Primitive for Expr {
    fn arity(&self) -> usize {
        match self {
            Expr::Add | Expr::Mul => 2,
            Expr::X | Expr::One => 0,
        }
    }

    fn apply(&self, args: &[f64], inputs: &[f64]) -> f64 {
        match self {
            Expr::Add => args[0] + args[1],
            Expr::Mul => args[0] * args[1],
            Expr::X => inputs[0],
            Expr::One => 1.0,
        }
    }
}

fn regression_error(genotype: &Genotype<ProgramGene<Expr>>) -> f64 {
    let Some(program) = genotype.genes().next() else {
        return f64::NAN;
    };
    (-5..=5)
        .map(|i| {
            let x = i as f64;
            let target = x * x + x + 1.0;
            (program.tree().eval(&[x]) - target).abs()
        })
        .sum()
}

#[test]
fn programs_fit_a_quadratic() {
    init_logger();
    const MAX_DEPTH: usize = 6;
    let factory = GenotypeFactory::new().with_chromosome(
        ProgramChromosomeFactory::new(
            1,
            vec![Expr::Add, Expr::Mul],
            vec![Expr::X, Expr::One],
            4,
        )
        .unwrap(),
    );
    let mut engine = Engine::builder(factory, regression_error)
        .config(
            EngineConfig::default()
                .with_population_size(80)
                .with_optimizer(Optimizer::Minimize)
                .with_seed(21)
                .with_max_generations(60)
                .with_limit(Limit::TargetFitness(0.0)),
        )
        .alterer(Alterer::crossover(
            SubtreeCrossover::new(0.8, 1.0)
                .unwrap()
                .with_max_depth(MAX_DEPTH),
        ))
        .alterer(Alterer::mutator(PointMutator::new(
            MutationRates::new(0.2, 1.0, 1.0).unwrap(),
        )))
        .build()
        .unwrap();

    let result = engine.evolve().unwrap();
    assert_monotonic(&result.fitness_history, Optimizer::Minimize);
    assert!(result.best_fitness() <= result.fitness_history[0]);
    for individual in &result.population {
        for gene in individual.genotype().genes() {
            assert!(gene.tree().height() <= MAX_DEPTH);
            assert!(gene.tree().validate().is_ok());
        }
    }
}

// ---- Reproducibility ----

fn seeded_history(parallel: bool) -> Vec<f64> {
    let factory =
        GenotypeFactory::new().with_chromosome(BoolChromosomeFactory::new(24, 0.5).unwrap());
    let mut engine = Engine::builder(factory, ones)
        .config(
            EngineConfig::fast()
                .with_seed(99)
                .with_parallel(parallel)
                .with_max_generations(25),
        )
        .alterer(Alterer::crossover(MultiPointCrossover::single_point(0.7).unwrap()))
        .alterer(Alterer::mutator(BitFlipMutator::new(MutationRates::default())))
        .build()
        .unwrap();
    engine.evolve().unwrap().fitness_history
}

#[test]
fn seeded_runs_repeat_with_or_without_parallelism() {
    init_logger();
    let sequential = seeded_history(false);
    assert_eq!(sequential, seeded_history(false));
    assert_eq!(sequential, seeded_history(true));
}
