use crate::tree::{Evaluation, NodeId, Tree};
use std::f64::consts::SQRT_2;

/// Upper Confidence bound applied to Trees.
///
/// `uct(n) = mean(n) + C * sqrt(ln(N) / n.visits)` where `N` is the parent's visit count.
/// Unvisited children score +inf so each is tried once before any is exploited;
/// dead children score -inf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uct {
    pub exploration: f64,
}

impl Default for Uct {
    fn default() -> Self {
        Uct {
            exploration: SQRT_2,
        }
    }
}

impl Uct {
    pub fn new(exploration: f64) -> Self {
        Uct { exploration }
    }

    pub fn value(&self, parent_visits: u32, child: &Evaluation) -> f64 {
        if child.dead {
            return f64::NEG_INFINITY;
        }
        if child.visits == 0 {
            return f64::INFINITY;
        }
        let visits = child.visits as f64;
        let exploration = if parent_visits > 0 {
            self.exploration * ((parent_visits as f64).ln() / visits).sqrt()
        } else {
            0.0
        };
        child.mean_score() + exploration
    }

    /// The child of `id` with the highest value; the first one wins ties.
    pub fn select_child(&self, tree: &Tree, id: NodeId) -> Option<NodeId> {
        let parent_visits = tree.get(id).eval.visits;
        let mut best: Option<(NodeId, f64)> = None;
        for &child in tree.children(id) {
            let value = self.value(parent_visits, &tree.get(child).eval);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((child, value)),
            }
        }
        best.map(|(child, _)| child)
    }

    /// Descend from the root along the best children until reaching a leaf.
    pub fn select_leaf(&self, tree: &Tree) -> NodeId {
        let mut node = NodeId::ROOT;
        while let Some(child) = self.select_child(tree, node) {
            node = child;
        }
        node
    }
}
