use crate::game::{ALL_DIRECTIONS, Game, MAX_SIZE, Position};

/// Cells from which a lone box can never reach any goal by pushing.
#[derive(Debug, Clone)]
pub struct DeadSquares {
    /// Positions reachable by pulling a box away from some goal.
    live: [[bool; MAX_SIZE]; MAX_SIZE],
}

impl DeadSquares {
    pub fn new(game: &Game) -> Self {
        let mut live = [[false; MAX_SIZE]; MAX_SIZE];

        for goal in game.goals() {
            Self::mark_live_from_goal(game, goal, &mut live);
        }

        DeadSquares { live }
    }

    fn mark_live_from_goal(game: &Game, goal: Position, live: &mut [[bool; MAX_SIZE]; MAX_SIZE]) {
        if live[goal.row as usize][goal.col as usize] {
            return;
        }

        let mut stack = vec![goal];
        live[goal.row as usize][goal.col as usize] = true;

        while let Some(box_pos) = stack.pop() {
            // A box at `prev` pushed in `dir` lands on `box_pos`; the pusher stands behind `prev`.
            for dir in ALL_DIRECTIONS {
                let Some(prev) = game.neighbor(box_pos, dir.reverse()) else {
                    continue;
                };
                let Some(player) = game.neighbor(prev, dir.reverse()) else {
                    continue;
                };
                if !game.is_wall(prev)
                    && !game.is_wall(player)
                    && !live[prev.row as usize][prev.col as usize]
                {
                    live[prev.row as usize][prev.col as usize] = true;
                    stack.push(prev);
                }
            }
        }
    }

    pub fn is_dead(&self, pos: Position) -> bool {
        !self.live[pos.row as usize][pos.col as usize]
    }
}
