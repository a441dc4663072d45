use crate::game::{ALL_DIRECTIONS, Direction, Game, MAX_SIZE, MoveError, Position};
use std::collections::VecDeque;

/// Breadth-first search over the 4-connected board.
///
/// Returns the cells after `start` up to and including `goal`, or None if `goal` cannot
/// be reached through cells accepted by `passable`. `Some(vec![])` means `start == goal`.
pub fn shortest_path<F>(
    start: Position,
    goal: Position,
    game: &Game,
    passable: F,
) -> Option<Vec<Position>>
where
    F: Fn(Position) -> bool,
{
    if start == goal {
        return Some(Vec::new());
    }
    if !game.in_bounds(start) || !game.in_bounds(goal) {
        return None;
    }

    let mut came_from: [[Option<Position>; MAX_SIZE]; MAX_SIZE] = [[None; MAX_SIZE]; MAX_SIZE];
    let mut queue = VecDeque::new();
    queue.push_back(start);
    came_from[start.row as usize][start.col as usize] = Some(start);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        for &dir in &ALL_DIRECTIONS {
            if let Some(next) = game.neighbor(current, dir) {
                if came_from[next.row as usize][next.col as usize].is_none() && passable(next) {
                    came_from[next.row as usize][next.col as usize] = Some(current);
                    queue.push_back(next);
                }
            }
        }
    }

    came_from[goal.row as usize][goal.col as usize]?;

    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        current = came_from[current.row as usize][current.col as usize]?;
    }
    path.reverse();
    Some(path)
}

/// Like [`shortest_path`], but an unreachable goal yields an empty path too.
pub fn find_path<F>(start: Position, goal: Position, game: &Game, passable: F) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    shortest_path(start, goal, game, passable).unwrap_or_default()
}

/// Number of steps from `start` to `goal` crossing only non-wall cells.
pub fn walking_distance(start: Position, goal: Position, game: &Game) -> Option<usize> {
    shortest_path(start, goal, game, |pos| !game.is_wall(pos)).map(|path| path.len())
}

/// Translate consecutive player positions into the directions of each step.
pub fn directions_for_path(start: Position, path: &[Position]) -> Option<Vec<Direction>> {
    let mut current = start;
    path.iter()
        .map(|&next| {
            let dir = Direction::between(current, next)?;
            current = next;
            Some(dir)
        })
        .collect()
}

/// Render a path as LURD: lowercase letters walk, uppercase letters push a box.
pub fn lurd(game: &Game, path: &[Position]) -> Result<String, MoveError> {
    let mut game = game.clone();
    let mut out = String::with_capacity(path.len());
    for &target in path {
        let player = game.player();
        let dir = Direction::between(player, target)
            .ok_or(MoveError::NotAdjacent { player, target })?;
        let push = game.has_box(target);
        game.perform(target)?;
        out.push(dir.to_char(push));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_same_cell_is_empty() {
        let game = Game::from_text("#@ #").unwrap();
        assert!(find_path(pos(0, 1), pos(0, 1), &game, |_| false).is_empty());
        assert_eq!(
            shortest_path(pos(0, 1), pos(0, 1), &game, |_| true),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_straight_corridor() {
        let game = Game::from_text("#@   #").unwrap();
        let path = find_path(pos(0, 1), pos(0, 4), &game, |p| !game.is_wall(p));
        assert_eq!(path, vec![pos(0, 2), pos(0, 3), pos(0, 4)]);
    }

    #[test]
    fn test_path_around_obstacle() {
        let input = "#####\n\
                     #@  #\n\
                     ### #\n\
                     #   #\n\
                     #####";
        let game = Game::from_text(input).unwrap();
        let path = find_path(pos(1, 1), pos(3, 1), &game, |p| !game.is_wall(p));
        assert_eq!(path.len(), 6);
        assert_eq!(path.last(), Some(&pos(3, 1)));
        assert_eq!(walking_distance(pos(1, 1), pos(3, 1), &game), Some(6));

        // Every step is to an adjacent cell.
        assert!(directions_for_path(pos(1, 1), &path).is_some());
    }

    #[test]
    fn test_unreachable_is_empty() {
        let input = "#####\n\
                     #@# #\n\
                     #####";
        let game = Game::from_text(input).unwrap();
        assert!(find_path(pos(1, 1), pos(1, 3), &game, |p| !game.is_wall(p)).is_empty());
        assert_eq!(shortest_path(pos(1, 1), pos(1, 3), &game, |p| !game.is_wall(p)), None);
    }

    #[test]
    fn test_passability_predicate() {
        let input = "######\n\
                     #@$  #\n\
                     #    #\n\
                     ######";
        let game = Game::from_text(input).unwrap();
        let through_boxes = find_path(pos(1, 1), pos(1, 3), &game, |p| !game.is_wall(p));
        assert_eq!(through_boxes.len(), 2);

        let around_boxes = find_path(pos(1, 1), pos(1, 3), &game, |p| {
            !game.is_wall(p) && !game.has_box(p)
        });
        assert_eq!(around_boxes.len(), 4);
        assert!(!around_boxes.contains(&pos(1, 2)));
    }

    #[test]
    fn test_directions_for_path() {
        let dirs = directions_for_path(pos(1, 1), &[pos(1, 2), pos(2, 2), pos(2, 1), pos(1, 1)]);
        assert_eq!(
            dirs,
            Some(vec![
                Direction::Right,
                Direction::Down,
                Direction::Left,
                Direction::Up
            ])
        );
        assert_eq!(directions_for_path(pos(1, 1), &[pos(3, 3)]), None);
    }

    #[test]
    fn test_lurd() {
        let input = "######\n\
                     #    #\n\
                     #@$ X#\n\
                     ######";
        let game = Game::from_text(input).unwrap();
        let path = [pos(1, 1), pos(2, 1), pos(2, 2), pos(2, 3)];
        assert_eq!(lurd(&game, &path).unwrap(), "udRR");
    }
}
