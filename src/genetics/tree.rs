//! Program trees for genetic programming.
//!
//! A [`Tree`] node holds a value, a declared arity and exactly that many
//! children. Trees are values: replacing a subtree rebuilds the path from
//! the root and leaves the original untouched.
//!
//! Nodes are addressed by a [`TreePath`], the list of child indices walked
//! from the root. Operators pick a path once and rebuild along it instead of
//! relying on node identity.

use super::gene::{Gene, Verifiable};
use crate::error::{GeneticError, Result};
use std::fmt;

/// Child indices leading from the root to a node. The empty path is the root.
pub type TreePath = Vec<usize>;

/// A GP tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<V> {
    value: V,
    arity: usize,
    children: Vec<Tree<V>>,
}

impl<V: Clone> Tree<V> {
    /// Creates a node with `arity` children.
    ///
    /// # Errors
    /// [`GeneticError::ArityMismatch`] if `children.len() != arity`.
    pub fn new(value: V, arity: usize, children: Vec<Tree<V>>) -> Result<Self> {
        if children.len() != arity {
            return Err(GeneticError::ArityMismatch {
                arity,
                children: children.len(),
            });
        }
        Ok(Self {
            value,
            arity,
            children,
        })
    }

    /// Creates a node with no children.
    pub fn leaf(value: V) -> Self {
        Self {
            value,
            arity: 0,
            children: Vec::new(),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn children(&self) -> &[Tree<V>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Height of the tree: 0 for a leaf, else 1 + the tallest child.
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes, this one included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Tree::size).sum::<usize>()
    }

    /// Paths of every node in preorder. The root's (empty) path comes first.
    pub fn paths(&self) -> Vec<TreePath> {
        let mut paths = Vec::with_capacity(self.size());
        self.collect_paths(&mut Vec::new(), &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &mut TreePath, out: &mut Vec<TreePath>) {
        out.push(prefix.clone());
        for (i, child) in self.children.iter().enumerate() {
            prefix.push(i);
            child.collect_paths(prefix, out);
            prefix.pop();
        }
    }

    /// Returns the node at `path`, or `None` if the path leaves the tree.
    pub fn subtree(&self, path: &[usize]) -> Option<&Tree<V>> {
        match path.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.children.get(i)?.subtree(rest),
        }
    }

    /// Returns a copy of this tree with the node at `path` replaced by `subtree`.
    ///
    /// Returns `None` if the path leaves the tree.
    pub fn replace(&self, path: &[usize], subtree: Tree<V>) -> Option<Tree<V>> {
        match path.split_first() {
            None => Some(subtree),
            Some((&i, rest)) => {
                let child = self.children.get(i)?.replace(rest, subtree)?;
                let mut children = self.children.clone();
                children[i] = child;
                Some(Self {
                    value: self.value.clone(),
                    arity: self.arity,
                    children,
                })
            }
        }
    }

    /// Checks recursively that every node's arity matches its child count.
    pub fn validate(&self) -> Result<()> {
        if self.children.len() != self.arity {
            return Err(GeneticError::ArityMismatch {
                arity: self.arity,
                children: self.children.len(),
            });
        }
        self.children.iter().try_for_each(Tree::validate)
    }
}

impl<V: fmt::Display> fmt::Display for Tree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            return write!(f, "{}", self.value);
        }
        write!(f, "({}", self.value)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// A node value that knows its arity and how to compute a result.
///
/// Implement this for a function/terminal set to build and evaluate
/// programs with [`Tree::from_primitive`] and [`Tree::eval`].
pub trait Primitive: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Number of arguments this primitive consumes.
    fn arity(&self) -> usize;

    /// Computes the node's value from its evaluated children and the
    /// program inputs.
    fn apply(&self, args: &[f64], inputs: &[f64]) -> f64;
}

impl<V: Primitive> Tree<V> {
    /// Creates a node whose arity is the primitive's own.
    pub fn from_primitive(value: V, children: Vec<Tree<V>>) -> Result<Self> {
        let arity = value.arity();
        Self::new(value, arity, children)
    }

    /// Evaluates the program bottom-up.
    pub fn eval(&self, inputs: &[f64]) -> f64 {
        let args: Vec<f64> = self.children.iter().map(|c| c.eval(inputs)).collect();
        self.value.apply(&args, inputs)
    }
}

// ============================================================================
// ProgramGene
// ============================================================================

/// A gene whose value is a whole program tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramGene<V> {
    tree: Tree<V>,
}

impl<V> ProgramGene<V> {
    pub fn new(tree: Tree<V>) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &Tree<V> {
        &self.tree
    }
}

impl<V> Gene for ProgramGene<V>
where
    V: Clone + fmt::Debug + PartialEq + Send + Sync + 'static,
{
    type Value = Tree<V>;

    fn value(&self) -> &Tree<V> {
        &self.tree
    }

    fn with_value(&self, tree: Tree<V>) -> Self {
        Self { tree }
    }
}

impl<V: Clone> Verifiable for ProgramGene<V> {
    fn verify(&self) -> bool {
        self.tree.validate().is_ok()
    }
}
