//! Chromosome and genotype factories.
//!
//! Factories create the random genetic material of the initial population.
//! Their parameters are validated when the factory is built; `make` then
//! only fails if a gene filter rejects every value it tries.

use super::chromosome::{Chromosome, Genotype};
use super::gene::{BoolGene, DoubleGene, Filter, Gene, IntGene, Resample};
use super::tree::{Primitive, ProgramGene, Tree};
use crate::error::{check_rate, GeneticError, Result};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Draws attempted before a filtered factory gives up.
const MAX_FILTER_ATTEMPTS: usize = 1000;

/// Creates random chromosomes of one gene type.
pub trait ChromosomeFactory<G: Gene>: Send + Sync {
    fn make(&self, rng: &mut dyn RngCore) -> Result<Chromosome<G>>;
}

impl<G, F> ChromosomeFactory<G> for F
where
    G: Gene,
    F: Fn(&mut dyn RngCore) -> Result<Chromosome<G>> + Send + Sync,
{
    fn make(&self, rng: &mut dyn RngCore) -> Result<Chromosome<G>> {
        self(rng)
    }
}

fn check_size(size: usize) -> Result<usize> {
    if size == 0 {
        Err(GeneticError::InvalidConfig(
            "chromosome size must be at least 1".into(),
        ))
    } else {
        Ok(size)
    }
}

// ============================================================================
// Boolean
// ============================================================================

/// Boolean chromosomes where each gene is `true` with probability `true_rate`.
#[derive(Debug, Clone)]
pub struct BoolChromosomeFactory {
    size: usize,
    true_rate: f64,
}

impl BoolChromosomeFactory {
    pub fn new(size: usize, true_rate: f64) -> Result<Self> {
        Ok(Self {
            size: check_size(size)?,
            true_rate: check_rate("true_rate", true_rate)?,
        })
    }
}

impl ChromosomeFactory<BoolGene> for BoolChromosomeFactory {
    fn make(&self, rng: &mut dyn RngCore) -> Result<Chromosome<BoolGene>> {
        let genes = (0..self.size)
            .map(|_| BoolGene::new(rng.random_bool(self.true_rate)))
            .collect();
        Chromosome::new(genes)
    }
}

// ============================================================================
// Integer
// ============================================================================

/// Integer chromosomes with values drawn uniformly from `lo..=hi`.
#[derive(Debug, Clone)]
pub struct IntChromosomeFactory {
    size: usize,
    template: IntGene,
    filter: Option<Filter<i64>>,
}

impl IntChromosomeFactory {
    pub fn new(size: usize, range: (i64, i64)) -> Result<Self> {
        Ok(Self {
            size: check_size(size)?,
            template: IntGene::new(range.0, range)?,
            filter: None,
        })
    }

    /// Restricts generated values to those accepted by `filter`.
    pub fn with_filter(mut self, filter: Filter<i64>) -> Self {
        self.filter = Some(filter);
        self
    }

    fn sample_gene(&self, rng: &mut dyn RngCore) -> Result<IntGene> {
        let Some(filter) = self.filter else {
            return Ok(self.template.resample(rng));
        };
        // Attaching a filter validates the current value, so draw an
        // accepted value first.
        let (lo, hi) = self.template.range();
        let value = (0..MAX_FILTER_ATTEMPTS)
            .map(|_| rng.random_range(lo..=hi))
            .find(|v| filter(v))
            .ok_or_else(|| {
                GeneticError::InvalidGene(format!(
                    "filter rejected every sampled value in {lo}..={hi}"
                ))
            })?;
        self.template.with_value(value).with_filter(filter)
    }
}

impl ChromosomeFactory<IntGene> for IntChromosomeFactory {
    fn make(&self, rng: &mut dyn RngCore) -> Result<Chromosome<IntGene>> {
        let genes = (0..self.size)
            .map(|_| self.sample_gene(rng))
            .collect::<Result<Vec<_>>>()?;
        Chromosome::new(genes)
    }
}

// ============================================================================
// Double
// ============================================================================

/// Floating-point chromosomes with values drawn uniformly from `lo..hi`.
#[derive(Debug, Clone)]
pub struct DoubleChromosomeFactory {
    size: usize,
    template: DoubleGene,
    filter: Option<Filter<f64>>,
}

impl DoubleChromosomeFactory {
    pub fn new(size: usize, range: (f64, f64)) -> Result<Self> {
        Ok(Self {
            size: check_size(size)?,
            template: DoubleGene::new(range.0, range)?,
            filter: None,
        })
    }

    /// Restricts generated values to those accepted by `filter`.
    pub fn with_filter(mut self, filter: Filter<f64>) -> Self {
        self.filter = Some(filter);
        self
    }

    fn sample_gene(&self, rng: &mut dyn RngCore) -> Result<DoubleGene> {
        let Some(filter) = self.filter else {
            return Ok(self.template.resample(rng));
        };
        let (lo, hi) = self.template.range();
        let value = (0..MAX_FILTER_ATTEMPTS)
            .map(|_| rng.random_range(lo..hi))
            .find(|v| filter(v))
            .ok_or_else(|| {
                GeneticError::InvalidGene(format!(
                    "filter rejected every sampled value in {lo}..{hi}"
                ))
            })?;
        self.template.with_value(value).with_filter(filter)
    }
}

impl ChromosomeFactory<DoubleGene> for DoubleChromosomeFactory {
    fn make(&self, rng: &mut dyn RngCore) -> Result<Chromosome<DoubleGene>> {
        let genes = (0..self.size)
            .map(|_| self.sample_gene(rng))
            .collect::<Result<Vec<_>>>()?;
        Chromosome::new(genes)
    }
}

// ============================================================================
// Permutation
// ============================================================================

/// Chromosomes holding a random permutation of `0..size`.
#[derive(Debug, Clone)]
pub struct PermutationChromosomeFactory {
    size: usize,
}

impl PermutationChromosomeFactory {
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self {
            size: check_size(size)?,
        })
    }
}

impl ChromosomeFactory<IntGene> for PermutationChromosomeFactory {
    fn make(&self, rng: &mut dyn RngCore) -> Result<Chromosome<IntGene>> {
        let mut values: Vec<i64> = (0..self.size as i64).collect();
        values.shuffle(rng);
        let range = (0, self.size as i64 - 1);
        let genes = values
            .into_iter()
            .map(|v| IntGene::new(v, range))
            .collect::<Result<Vec<_>>>()?;
        Chromosome::new(genes)
    }
}

// ============================================================================
// Program
// ============================================================================

/// Program chromosomes grown from a function and terminal set.
///
/// Uses the "grow" method: below `max_depth` each node is a terminal with
/// probability `terminals / (functions + terminals)`, at `max_depth` it is
/// always a terminal.
#[derive(Debug, Clone)]
pub struct ProgramChromosomeFactory<V> {
    size: usize,
    functions: Vec<V>,
    terminals: Vec<V>,
    max_depth: usize,
}

impl<V: Primitive> ProgramChromosomeFactory<V> {
    pub fn new(size: usize, functions: Vec<V>, terminals: Vec<V>, max_depth: usize) -> Result<Self> {
        if terminals.is_empty() {
            return Err(GeneticError::InvalidConfig(
                "program factory needs at least one terminal".into(),
            ));
        }
        if let Some(t) = terminals.iter().find(|t| t.arity() != 0) {
            return Err(GeneticError::InvalidConfig(format!(
                "terminal {t:?} has arity {}",
                t.arity()
            )));
        }
        Ok(Self {
            size: check_size(size)?,
            functions,
            terminals,
            max_depth,
        })
    }

    fn grow(&self, depth: usize, rng: &mut dyn RngCore) -> Result<Tree<V>> {
        let total = self.functions.len() + self.terminals.len();
        let pick = rng.random_range(0..total);
        if depth >= self.max_depth || pick >= self.functions.len() {
            let terminal = &self.terminals[rng.random_range(0..self.terminals.len())];
            return Ok(Tree::leaf(terminal.clone()));
        }
        let function = self.functions[pick].clone();
        let children = (0..function.arity())
            .map(|_| self.grow(depth + 1, rng))
            .collect::<Result<Vec<_>>>()?;
        Tree::from_primitive(function, children)
    }
}

impl<V: Primitive> ChromosomeFactory<ProgramGene<V>> for ProgramChromosomeFactory<V> {
    fn make(&self, rng: &mut dyn RngCore) -> Result<Chromosome<ProgramGene<V>>> {
        let genes = (0..self.size)
            .map(|_| self.grow(0, rng).map(ProgramGene::new))
            .collect::<Result<Vec<_>>>()?;
        Chromosome::new(genes)
    }
}

// ============================================================================
// Genotype
// ============================================================================

/// Builds genotypes from one chromosome factory per chromosome slot.
pub struct GenotypeFactory<G: Gene> {
    chromosomes: Vec<Box<dyn ChromosomeFactory<G>>>,
}

impl<G: Gene> GenotypeFactory<G> {
    pub fn new() -> Self {
        Self {
            chromosomes: Vec::new(),
        }
    }

    /// Appends a chromosome slot.
    pub fn with_chromosome(mut self, factory: impl ChromosomeFactory<G> + 'static) -> Self {
        self.chromosomes.push(Box::new(factory));
        self
    }

    /// Number of chromosome slots.
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn make(&self, rng: &mut dyn RngCore) -> Result<Genotype<G>> {
        let chromosomes = self
            .chromosomes
            .iter()
            .map(|f| f.make(rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Genotype::new(chromosomes))
    }
}

impl<G: Gene> Default for GenotypeFactory<G> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::Verifiable;
    use crate::random::create_rng;
    use std::collections::HashSet;

    #[test]
    fn test_bool_factory_extremes() {
        let mut rng = create_rng(42);
        let all_true = BoolChromosomeFactory::new(8, 1.0).unwrap();
        assert!(all_true.make(&mut rng).unwrap().values().iter().all(|&b| b));
        let all_false = BoolChromosomeFactory::new(8, 0.0).unwrap();
        assert!(all_false.make(&mut rng).unwrap().values().iter().all(|&b| !b));
        assert!(BoolChromosomeFactory::new(8, 1.5).is_err());
        assert!(BoolChromosomeFactory::new(0, 0.5).is_err());
    }

    #[test]
    fn test_int_factory_respects_range_and_filter() {
        let mut rng = create_rng(42);
        let factory = IntChromosomeFactory::new(50, (-3, 3))
            .unwrap()
            .with_filter(|v| *v != 0);
        let chromosome = factory.make(&mut rng).unwrap();
        assert_eq!(chromosome.len(), 50);
        for gene in chromosome.iter() {
            assert!(gene.verify());
            assert_ne!(*gene.value(), 0);
        }
    }

    #[test]
    fn test_double_factory() {
        let mut rng = create_rng(42);
        let factory = DoubleChromosomeFactory::new(20, (-1.0, 1.0)).unwrap();
        let chromosome = factory.make(&mut rng).unwrap();
        assert!(chromosome.values().iter().all(|v| (-1.0..1.0).contains(v)));
        assert!(DoubleChromosomeFactory::new(3, (1.0, 1.0)).is_err());
        assert!(DoubleChromosomeFactory::new(3, (-f64::MAX, f64::MAX)).is_err());

        let positive = DoubleChromosomeFactory::new(20, (-1.0, 1.0))
            .unwrap()
            .with_filter(|v| *v > 0.0);
        let chromosome = positive.make(&mut rng).unwrap();
        assert!(chromosome.iter().all(|g| g.verify() && *g.value() > 0.0));

        let impossible = DoubleChromosomeFactory::new(1, (-1.0, 1.0))
            .unwrap()
            .with_filter(|v| *v > 5.0);
        assert!(matches!(
            impossible.make(&mut rng),
            Err(GeneticError::InvalidGene(_))
        ));
    }

    #[test]
    fn test_permutation_factory() {
        let mut rng = create_rng(42);
        let factory = PermutationChromosomeFactory::new(10).unwrap();
        let values = factory.make(&mut rng).unwrap().values();
        let set: HashSet<i64> = values.iter().copied().collect();
        assert_eq!(set.len(), 10);
        assert!(values.iter().all(|v| (0..10).contains(v)));
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Add,
        Neg,
        One,
    }

    impl Primitive for Op {
        fn arity(&self) -> usize {
            match self {
                Op::Add => 2,
                Op::Neg => 1,
                Op::One => 0,
            }
        }

        fn apply(&self, args: &[f64], _inputs: &[f64]) -> f64 {
            match self {
                Op::Add => args[0] + args[1],
                Op::Neg => -args[0],
                Op::One => 1.0,
            }
        }
    }

    #[test]
    fn test_program_factory_depth_bound() {
        let mut rng = create_rng(42);
        let factory =
            ProgramChromosomeFactory::new(5, vec![Op::Add, Op::Neg], vec![Op::One], 4).unwrap();
        for _ in 0..20 {
            for gene in factory.make(&mut rng).unwrap().iter() {
                assert!(gene.tree().height() <= 4);
                assert!(gene.tree().validate().is_ok());
            }
        }
        assert!(ProgramChromosomeFactory::new(1, vec![Op::Add], vec![Op::Neg], 3).is_err());
        assert!(ProgramChromosomeFactory::<Op>::new(1, vec![Op::Add], vec![], 3).is_err());
    }

    #[test]
    fn test_genotype_factory_with_closure() {
        let mut rng = create_rng(42);
        let factory = GenotypeFactory::new()
            .with_chromosome(BoolChromosomeFactory::new(4, 0.5).unwrap())
            .with_chromosome(|_: &mut dyn RngCore| {
                Chromosome::new(vec![BoolGene::new(true)])
            });
        let genotype = factory.make(&mut rng).unwrap();
        assert_eq!(factory.len(), 2);
        assert_eq!(genotype.chromosomes()[0].len(), 4);
        assert_eq!(genotype.chromosomes()[1].values(), vec![true]);
    }
}
