use crate::deadlocks::DeadSquares;
use crate::game::Game;
use std::fmt;

/// Classification of a single board state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Continuing,
    Stuck,
    Completed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Continuing => write!(f, "continuing"),
            Status::Stuck => write!(f, "stuck"),
            Status::Completed => write!(f, "completed"),
        }
    }
}

/// How hard the evaluator looks for dead ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlockDetection {
    /// Stuck only when no box can be pushed at all, or the player cannot move.
    #[default]
    Baseline,
    /// Additionally stuck when a box off its goal sits on a dead square.
    DeadSquares,
}

/// Classifies states as continuing, stuck or completed.
///
/// Stuck detection is approximate. Boxes are judged one at a time against the walls
/// only, so configurations where boxes block each other are reported as continuing.
#[derive(Debug, Clone, Default)]
pub struct StatusEvaluator {
    dead_squares: Option<DeadSquares>,
}

impl StatusEvaluator {
    pub fn new(game: &Game, detection: DeadlockDetection) -> Self {
        let dead_squares = match detection {
            DeadlockDetection::Baseline => None,
            DeadlockDetection::DeadSquares => Some(DeadSquares::new(game)),
        };
        StatusEvaluator { dead_squares }
    }

    pub fn classify(&self, game: &Game) -> Status {
        if game.is_solved() {
            return Status::Completed;
        }

        let all_boxes_frozen = game
            .boxes()
            .iter()
            .all(|&pos| game.box_push_directions(pos).is_empty());
        if all_boxes_frozen || game.legal_moves().is_empty() {
            return Status::Stuck;
        }

        if let Some(dead_squares) = &self.dead_squares {
            if game.boxes_off_goal().any(|pos| dead_squares.is_dead(pos)) {
                return Status::Stuck;
            }
        }

        Status::Continuing
    }
}

/// Classify with baseline deadlock detection.
pub fn classify(game: &Game) -> Status {
    StatusEvaluator::default().classify(game)
}
