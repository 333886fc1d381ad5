//! Binary decision tree stored as a flat node arena.

use ndarray::ArrayView1;

/// Tree node. Splits send `feature <= threshold` to `left`.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<L> {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf(L),
}

/// Decision tree with leaf payload `L`; node `0` is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<L> {
    nodes: Vec<Node<L>>,
}

impl<L> Default for Tree<L> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<L> Tree<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node<L>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node and return its index.
    pub fn push(&mut self, node: Node<L>) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Overwrite a node reserved earlier with [`Tree::push`].
    pub fn set(&mut self, index: usize, node: Node<L>) {
        self.nodes[index] = node;
    }

    /// Walk from the root to the leaf that `row` falls into.
    pub fn leaf(&self, row: ArrayView1<'_, f32>) -> Option<&L> {
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx)? {
                Node::Leaf(value) => return Some(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}
