use crate::game::Game;
use crate::pathfind::walking_distance;
use crate::tree::{NodeId, Tree};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Picks which freshly expanded child gets evaluated.
pub trait ChildPolicy {
    /// `children` is never empty.
    fn pick(&mut self, tree: &Tree, children: &[NodeId]) -> NodeId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Cost {
    Finished,
    Distance(usize),
}

/// Prefers the child whose player is closest, in total, to every box not yet on a goal.
///
/// Distances are walking paths that only avoid walls, and a box the player cannot
/// reach adds nothing. A child with all boxes on goals beats any other. Ties go to
/// the first child.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestBoxes;

impl NearestBoxes {
    pub fn new() -> Self {
        NearestBoxes
    }

    pub fn cost(game: &Game) -> Cost {
        let player = game.player();
        let mut remaining = game.boxes_off_goal().peekable();
        if remaining.peek().is_none() {
            return Cost::Finished;
        }
        let total = remaining
            .map(|target| walking_distance(player, target, game).unwrap_or(0))
            .sum();
        Cost::Distance(total)
    }
}

impl ChildPolicy for NearestBoxes {
    fn pick(&mut self, tree: &Tree, children: &[NodeId]) -> NodeId {
        let mut best = children[0];
        let mut best_cost = Self::cost(&tree.get(best).state);
        for &child in &children[1..] {
            let cost = Self::cost(&tree.get(child).state);
            if cost < best_cost {
                best = child;
                best_cost = cost;
            }
        }
        best
    }
}

/// Picks a child uniformly at random from a seeded generator.
#[derive(Debug, Clone)]
pub struct RandomChild {
    rng: ChaCha8Rng,
}

impl RandomChild {
    pub fn new(seed: u64) -> Self {
        RandomChild {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ChildPolicy for RandomChild {
    fn pick(&mut self, _tree: &Tree, children: &[NodeId]) -> NodeId {
        children[self.rng.gen_range(0..children.len())]
    }
}
