use crate::game::{Game, Position};
use crate::heuristic::{ChildPolicy, NearestBoxes};
use crate::status::{DeadlockDetection, Status, StatusEvaluator};
use crate::tree::{NodeId, Tree};
use crate::uct::Uct;
use log::{debug, trace};
use std::f64::consts::SQRT_2;
use std::time::{Duration, Instant};

pub const DEFAULT_GOAL_BONUS: i64 = 50;

/// Budget for one search. Both limits are off by default, in which case an
/// unsolvable level that the evaluator cannot prove stuck is searched forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_iterations: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn iterations(max_iterations: usize) -> Self {
        SearchLimits {
            max_iterations: Some(max_iterations),
            time_limit: None,
        }
    }

    fn exhausted(&self, iterations: usize, elapsed: Duration) -> bool {
        self.max_iterations.is_some_and(|max| iterations >= max)
            || self.time_limit.is_some_and(|limit| elapsed >= limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub limits: SearchLimits,
    /// UCT exploration constant.
    pub exploration: f64,
    /// Added to the score of every node on a backpropagated path whose board has a box on a goal.
    pub goal_bonus: i64,
    pub deadlocks: DeadlockDetection,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            limits: SearchLimits::unlimited(),
            exploration: SQRT_2,
            goal_bonus: DEFAULT_GOAL_BONUS,
            deadlocks: DeadlockDetection::Baseline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// Player positions after each move, first move first.
    Solved(Vec<Position>),
    /// The search budget ran out.
    Cutoff,
    /// The starting position is already stuck.
    Impossible,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub iterations: usize,
    pub nodes: usize,
    pub elapsed: Duration,
}

/// Observes every evaluated node.
pub trait Tracer {
    fn trace(&self, iteration: usize, tree: &Tree, node: NodeId, status: Status);
}

pub struct NullTracer;

impl Tracer for NullTracer {
    fn trace(&self, _iteration: usize, _tree: &Tree, _node: NodeId, _status: Status) {}
}

/// Monte Carlo style tree search: select a leaf by UCT, expand it, evaluate one new
/// child picked by the child policy, and fold the result back up to the root.
pub struct Solver<P = NearestBoxes, T = NullTracer> {
    config: SolverConfig,
    uct: Uct,
    evaluator: StatusEvaluator,
    policy: P,
    tracer: T,
    tree: Tree,
    iterations: usize,
    elapsed: Duration,
    outcome: Option<SolveResult>,
}

impl<P: ChildPolicy> Solver<P, NullTracer> {
    pub fn new(game: Game, config: SolverConfig, policy: P) -> Self {
        Solver {
            uct: Uct::new(config.exploration),
            evaluator: StatusEvaluator::new(&game, config.deadlocks),
            policy,
            tracer: NullTracer,
            tree: Tree::new(game),
            config,
            iterations: 0,
            elapsed: Duration::ZERO,
            outcome: None,
        }
    }
}

impl<P: ChildPolicy, T: Tracer> Solver<P, T> {
    pub fn with_tracer<U: Tracer>(self, tracer: U) -> Solver<P, U> {
        Solver {
            config: self.config,
            uct: self.uct,
            evaluator: self.evaluator,
            policy: self.policy,
            tracer,
            tree: self.tree,
            iterations: self.iterations,
            elapsed: self.elapsed,
            outcome: self.outcome,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn stats(&self) -> Stats {
        Stats {
            iterations: self.iterations,
            nodes: self.tree.len(),
            elapsed: self.elapsed,
        }
    }

    /// Run the search until it finishes or the limits run out. Once a level is
    /// solved or proven impossible, later calls return the same result without
    /// searching; after a cutoff a call resumes the existing tree.
    pub fn solve(&mut self) -> SolveResult {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let start = Instant::now();
        let result = self.search(start);
        self.elapsed += start.elapsed();
        debug!(
            "search finished after {} iterations, {} nodes, {:?}: {:?}",
            self.iterations,
            self.tree.len(),
            self.elapsed,
            result
        );
        if result != SolveResult::Cutoff {
            self.outcome = Some(result.clone());
        }
        result
    }

    fn search(&mut self, start: Instant) -> SolveResult {
        let root = &self.tree.root().state;
        debug!(
            "searching {}x{} level with {} boxes",
            root.width(),
            root.height(),
            root.boxes().len()
        );

        match self.evaluator.classify(root) {
            Status::Completed => return SolveResult::Solved(Vec::new()),
            Status::Stuck => return SolveResult::Impossible,
            Status::Continuing => {}
        }

        loop {
            if self
                .config
                .limits
                .exhausted(self.iterations, self.elapsed + start.elapsed())
            {
                return SolveResult::Cutoff;
            }
            self.iterations += 1;

            let leaf = self.uct.select_leaf(&self.tree);
            let children = self.tree.expand(leaf);
            let node = if children.is_empty() {
                leaf
            } else {
                self.policy.pick(&self.tree, &children)
            };

            let status = self.evaluate(node);
            self.backpropagate(node, status);
            self.tracer.trace(self.iterations, &self.tree, node, status);
            trace!(
                "iteration {}: leaf={} children={} evaluated={} depth={} status={}",
                self.iterations,
                leaf.index(),
                children.len(),
                node.index(),
                self.tree.depth(node),
                status
            );

            if status == Status::Completed {
                return SolveResult::Solved(self.tree.path_to(node));
            }
        }
    }

    fn evaluate(&mut self, node: NodeId) -> Status {
        let status = self.evaluator.classify(&self.tree.get(node).state);
        if status == Status::Stuck {
            if let Some(parent) = self.tree.parent(node) {
                self.tree.get_mut(parent).eval.dead = true;
            }
        }
        status
    }

    fn backpropagate(&mut self, from: NodeId, status: Status) {
        let mut next = Some(from);
        while let Some(id) = next {
            let node = self.tree.get_mut(id);
            node.eval.visits += 1;
            if node.state.any_box_on_goal() {
                node.eval.score += self.config.goal_bonus;
            }
            node.eval.status = Some(status);
            next = node.parent;
        }
    }
}
