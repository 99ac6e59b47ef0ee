//! Chromosomes and genotypes.

use super::gene::{Gene, Verifiable};
use crate::error::{GeneticError, Result};

/// A fixed-length ordered sequence of genes.
///
/// The length never changes after construction; operators build a new
/// chromosome through [`with_genes`](Chromosome::with_genes).
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome<G> {
    genes: Vec<G>,
}

impl<G: Gene> Chromosome<G> {
    /// Creates a chromosome, verifying every gene's constraints.
    ///
    /// All genes must share the first gene's range and filter.
    ///
    /// # Errors
    /// [`GeneticError::InvalidGene`] naming the first gene that fails.
    pub fn new(genes: Vec<G>) -> Result<Self>
    where
        G: Verifiable,
    {
        if let Some((i, gene)) = genes.iter().enumerate().find(|(_, g)| !g.verify()) {
            return Err(GeneticError::InvalidGene(format!(
                "gene {i} violates its constraints: {gene:?}"
            )));
        }
        if let Some(first) = genes.first() {
            if let Some((i, gene)) = genes
                .iter()
                .enumerate()
                .find(|(_, g)| !first.same_constraints(g))
            {
                return Err(GeneticError::InvalidGene(format!(
                    "gene {i} has constraints different from gene 0: {gene:?}"
                )));
            }
        }
        Ok(Self { genes })
    }

    /// Duplicates this chromosome with a new gene sequence.
    ///
    /// The genes are expected to come from chromosomes of the same type, so
    /// they already carry valid constraints.
    pub fn with_genes(&self, genes: Vec<G>) -> Self {
        Self { genes }
    }

    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    pub fn into_genes(self) -> Vec<G> {
        self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, G> {
        self.genes.iter()
    }

    /// Copies out the gene values in order.
    pub fn values(&self) -> Vec<G::Value> {
        self.genes.iter().map(|g| g.value().clone()).collect()
    }
}

impl<'a, G> IntoIterator for &'a Chromosome<G> {
    type Item = &'a G;
    type IntoIter = std::slice::Iter<'a, G>;

    fn into_iter(self) -> Self::IntoIter {
        self.genes.iter()
    }
}

/// The complete genetic encoding of one candidate solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Genotype<G> {
    chromosomes: Vec<Chromosome<G>>,
}

impl<G: Gene> Genotype<G> {
    pub fn new(chromosomes: Vec<Chromosome<G>>) -> Self {
        Self { chromosomes }
    }

    /// Duplicates this genotype with new chromosomes.
    pub fn with_chromosomes(&self, chromosomes: Vec<Chromosome<G>>) -> Self {
        Self { chromosomes }
    }

    pub fn chromosomes(&self) -> &[Chromosome<G>] {
        &self.chromosomes
    }

    pub fn into_chromosomes(self) -> Vec<Chromosome<G>> {
        self.chromosomes
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Iterates over every gene of every chromosome, in order.
    pub fn genes(&self) -> impl Iterator<Item = &G> {
        self.chromosomes.iter().flat_map(|c| c.iter())
    }

    /// All gene values concatenated across chromosomes.
    pub fn flatten(&self) -> Vec<G::Value> {
        self.genes().map(|g| g.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{BoolGene, IntGene};

    fn ints(values: &[i64]) -> Chromosome<IntGene> {
        Chromosome::new(
            values
                .iter()
                .map(|&v| IntGene::new(v, (0, 9)).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_gene() {
        let good = IntGene::new(3, (0, 9)).unwrap();
        let bad = IntGene::new(3, (0, 9))
            .unwrap()
            .with_value(42);
        let err = Chromosome::new(vec![good, bad]).unwrap_err();
        assert!(err.to_string().contains("gene 1"), "{err}");
    }

    #[test]
    fn test_new_rejects_mixed_constraints() {
        let narrow = IntGene::new(1, (0, 3)).unwrap();
        let wide = IntGene::new(1, (0, 1000)).unwrap();
        let err = Chromosome::new(vec![narrow, wide]).unwrap_err();
        assert!(matches!(err, GeneticError::InvalidGene(_)));
        assert!(err.to_string().contains("gene 1"), "{err}");

        let even = |v: &i64| v % 2 == 0;
        let filtered = IntGene::new(2, (0, 3)).unwrap().with_filter(even).unwrap();
        assert!(Chromosome::new(vec![filtered, narrow.with_value(2)]).is_err());
        assert!(Chromosome::new(vec![filtered, filtered.with_value(0)]).is_ok());
    }

    #[test]
    fn test_with_genes_leaves_original() {
        let chromosome = ints(&[1, 2, 3]);
        let reversed: Vec<IntGene> = chromosome.genes().iter().rev().copied().collect();
        let copy = chromosome.with_genes(reversed);
        assert_eq!(copy.values(), vec![3, 2, 1]);
        assert_eq!(chromosome.values(), vec![1, 2, 3]);
    }

    #[test]
    fn test_genotype_flatten() {
        let genotype = Genotype::new(vec![ints(&[1, 2]), ints(&[3])]);
        assert_eq!(genotype.len(), 2);
        assert_eq!(genotype.flatten(), vec![1, 2, 3]);
        assert_eq!(genotype.genes().count(), 3);
    }

    #[test]
    fn test_bool_chromosome() {
        let chromosome =
            Chromosome::new(vec![BoolGene::new(true), BoolGene::new(false)]).unwrap();
        assert_eq!(chromosome.values(), vec![true, false]);
        assert!(!chromosome.is_empty());
    }
}
