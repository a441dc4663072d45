pub mod deadlocks;
pub mod game;
pub mod heuristic;
pub mod levels;
pub mod pathfind;
pub mod solver;
pub mod status;
pub mod tree;
pub mod uct;

pub use game::{Direction, Game, MoveError, Position};
pub use heuristic::{ChildPolicy, NearestBoxes, RandomChild};
pub use levels::{LevelError, Levels};
pub use solver::{SearchLimits, SolveResult, Solver, SolverConfig, Stats};
pub use status::{DeadlockDetection, Status, StatusEvaluator};

/// Parse a single level.
pub fn load_level(text: &str) -> Result<Game, LevelError> {
    Game::from_text(text)
}

/// Search for a solution with the nearest-boxes child policy.
pub fn solve(game: &Game, config: SolverConfig) -> SolveResult {
    Solver::new(game.clone(), config, NearestBoxes::new()).solve()
}

/// Text dump of a board in the level format.
pub fn render(game: &Game) -> String {
    game.to_string()
}
