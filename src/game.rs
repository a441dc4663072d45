use crate::levels::LevelError;
use arrayvec::ArrayVec;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const MAX_SIZE: usize = 64;
pub const MAX_BOXES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Goal,
}

/// A cell on the board, addressed by row then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Offset as (row, col).
    fn delta(&self) -> (i16, i16) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn reverse(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The direction leading from `from` to the orthogonally adjacent cell `to`.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        let dr = to.row as i16 - from.row as i16;
        let dc = to.col as i16 - from.col as i16;
        match (dr, dc) {
            (-1, 0) => Some(Direction::Up),
            (1, 0) => Some(Direction::Down),
            (0, -1) => Some(Direction::Left),
            (0, 1) => Some(Direction::Right),
            _ => None,
        }
    }

    /// LURD notation: lowercase for a walk, uppercase for a push.
    pub fn to_char(&self, push: bool) -> char {
        let c = match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        };
        if push { c.to_ascii_uppercase() } else { c }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// Reasons a requested player move cannot be applied. The state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("{target} is not adjacent to the player at {player}")]
    NotAdjacent { player: Position, target: Position },
    #[error("cannot move into the wall at {0}")]
    IntoWall(Position),
    #[error("box at {0} cannot be pushed")]
    Blocked(Position),
}

/// The immutable part of a level. Shared between every state of one puzzle.
#[derive(Debug, PartialEq, Eq)]
struct Layout {
    tiles: [[Tile; MAX_SIZE]; MAX_SIZE],
    width: u8,
    height: u8,
}

/// A board snapshot: walls and goals from the shared layout, plus the boxes and the player.
///
/// Cloning copies the boxes and the player; the layout is never mutated after parsing,
/// so clones are fully isolated from each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    layout: Arc<Layout>,
    // Kept sorted so that equal box sets compare equal.
    boxes: ArrayVec<Position, MAX_BOXES>,
    player: Position,
}

impl Game {
    /// Parse a board from text.
    ///
    /// Characters:
    /// - `#` = Wall
    /// - `$` = Box
    /// - `X` = Goal
    /// - `@` = Player
    /// - `*` = Box on goal
    /// - `+` = Player on goal
    /// - anything else = Floor
    ///
    /// Rows shorter than the longest one are padded with floor.
    pub fn from_text(text: &str) -> Result<Self, LevelError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let height = lines.len();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        if width == 0 || height == 0 {
            return Err(LevelError::Empty);
        }
        if width > MAX_SIZE || height > MAX_SIZE {
            return Err(LevelError::TooLarge {
                width,
                height,
                max: MAX_SIZE,
            });
        }

        let mut tiles = [[Tile::Wall; MAX_SIZE]; MAX_SIZE];
        for row in tiles.iter_mut().take(height) {
            for tile in row.iter_mut().take(width) {
                *tile = Tile::Floor;
            }
        }

        let mut player: Option<Position> = None;
        let mut boxes: ArrayVec<Position, MAX_BOXES> = ArrayVec::new();

        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(row as u8, col as u8);
                let (tile, has_box, has_player) = match ch {
                    '#' => (Tile::Wall, false, false),
                    '$' => (Tile::Floor, true, false),
                    'X' => (Tile::Goal, false, false),
                    '@' => (Tile::Floor, false, true),
                    '*' => (Tile::Goal, true, false),
                    '+' => (Tile::Goal, false, true),
                    _ => (Tile::Floor, false, false),
                };
                tiles[row][col] = tile;
                if has_box {
                    boxes
                        .try_push(pos)
                        .map_err(|_| LevelError::TooManyBoxes { max: MAX_BOXES })?;
                }
                if has_player {
                    if let Some(first) = player {
                        return Err(LevelError::MultiplePlayers { first, second: pos });
                    }
                    player = Some(pos);
                }
            }
        }

        let player = player.ok_or(LevelError::NoPlayer)?;
        boxes.sort_unstable();

        Ok(Game {
            layout: Arc::new(Layout {
                tiles,
                width: width as u8,
                height: height as u8,
            }),
            boxes,
            player,
        })
    }

    pub fn width(&self) -> usize {
        self.layout.width as usize
    }

    pub fn height(&self) -> usize {
        self.layout.height as usize
    }

    pub fn player(&self) -> Position {
        self.player
    }

    /// Box positions in ascending order.
    pub fn boxes(&self) -> &[Position] {
        &self.boxes
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        (pos.row as usize) < self.height() && (pos.col as usize) < self.width()
    }

    /// Tile at `pos`. Cells outside the board read as walls.
    pub fn tile(&self, pos: Position) -> Tile {
        if self.in_bounds(pos) {
            self.layout.tiles[pos.row as usize][pos.col as usize]
        } else {
            Tile::Wall
        }
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.tile(pos) == Tile::Wall
    }

    pub fn is_goal(&self, pos: Position) -> bool {
        self.tile(pos) == Tile::Goal
    }

    pub fn has_box(&self, pos: Position) -> bool {
        self.boxes.binary_search(&pos).is_ok()
    }

    /// Every cell of the board in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height()).flat_map(move |row| {
            (0..self.width()).map(move |col| Position::new(row as u8, col as u8))
        })
    }

    pub fn goals(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells().filter(|&pos| self.is_goal(pos))
    }

    /// Move from `pos` one step in `dir`.
    /// Returns None if the new position would leave the board.
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row as i16 + dr;
        let col = pos.col as i16 + dc;
        if row >= 0 && col >= 0 && (row as usize) < self.height() && (col as usize) < self.width()
        {
            Some(Position::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Cells the player could step into next (Up, Down, Left, Right order), excluding walls.
    ///
    /// A listed cell may still hold an unpushable box; `apply` rejects those.
    pub fn legal_moves(&self) -> ArrayVec<Position, 4> {
        ALL_DIRECTIONS
            .iter()
            .filter_map(|&dir| self.neighbor(self.player, dir))
            .filter(|&pos| !self.is_wall(pos))
            .collect()
    }

    /// Directions in which the box at `pos` could be pushed, looking only at walls
    /// and the board edge. Other boxes are ignored.
    pub fn box_push_directions(&self, pos: Position) -> ArrayVec<Direction, 4> {
        ALL_DIRECTIONS
            .iter()
            .copied()
            .filter(|&dir| {
                let from = self.neighbor(pos, dir.reverse());
                let to = self.neighbor(pos, dir);
                matches!((from, to), (Some(from), Some(to)) if !self.is_wall(from) && !self.is_wall(to))
            })
            .collect()
    }

    /// Move the player into the adjacent cell `target`, pushing a box if one is there.
    /// Fails without touching the state if the move is illegal.
    pub fn perform(&mut self, target: Position) -> Result<(), MoveError> {
        let dir = Direction::between(self.player, target).ok_or(MoveError::NotAdjacent {
            player: self.player,
            target,
        })?;
        if self.is_wall(target) {
            return Err(MoveError::IntoWall(target));
        }

        if let Ok(box_idx) = self.boxes.binary_search(&target) {
            let beyond = self
                .neighbor(target, dir)
                .filter(|&beyond| !self.is_wall(beyond) && !self.has_box(beyond))
                .ok_or(MoveError::Blocked(target))?;
            self.boxes[box_idx] = beyond;
            self.boxes.sort_unstable();
        }

        self.player = target;
        Ok(())
    }

    /// Return a copy of this state with the player moved into `target`.
    pub fn apply(&self, target: Position) -> Result<Game, MoveError> {
        let mut next = self.clone();
        next.perform(target)?;
        Ok(next)
    }

    /// Every state reachable with one legal player move.
    pub fn successors(&self) -> ArrayVec<Game, 4> {
        self.legal_moves()
            .into_iter()
            .filter_map(|target| self.apply(target).ok())
            .collect()
    }

    /// Apply a sequence of player positions, returning each intermediate state.
    pub fn replay(&self, path: &[Position]) -> Result<Vec<Game>, MoveError> {
        let mut states = Vec::with_capacity(path.len());
        let mut game = self.clone();
        for &pos in path {
            game.perform(pos)?;
            states.push(game.clone());
        }
        Ok(states)
    }

    /// True if every box rests on some goal cell.
    pub fn is_solved(&self) -> bool {
        self.boxes.iter().all(|&pos| self.is_goal(pos))
    }

    pub fn any_box_on_goal(&self) -> bool {
        self.boxes.iter().any(|&pos| self.is_goal(pos))
    }

    pub fn boxes_off_goal(&self) -> impl Iterator<Item = Position> + '_ {
        self.boxes.iter().copied().filter(|&pos| !self.is_goal(pos))
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height() {
            let mut line = String::with_capacity(self.width());
            for col in 0..self.width() {
                let pos = Position::new(row as u8, col as u8);
                let tile = self.tile(pos);
                let ch = if pos == self.player {
                    match tile {
                        Tile::Goal => '+',
                        _ => '@',
                    }
                } else if self.has_box(pos) {
                    match tile {
                        Tile::Goal => '*',
                        _ => '$',
                    }
                } else {
                    match tile {
                        Tile::Wall => '#',
                        Tile::Floor => ' ',
                        Tile::Goal => 'X',
                    }
                };
                line.push(ch);
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_parse_basic_board() {
        let input = "####\n\
                     # X#\n\
                     #  ###\n\
                     #*@  #\n\
                     #  $ #\n\
                     #  ###\n\
                     ####";
        let game = Game::from_text(input).unwrap();

        assert_eq!(game.width(), 6);
        assert_eq!(game.height(), 7);
        assert_eq!(game.player(), pos(3, 2));
        assert_eq!(game.boxes(), &[pos(3, 1), pos(4, 3)]);
        assert_eq!(game.goals().collect::<Vec<_>>(), vec![pos(1, 2), pos(3, 1)]);
        // Short rows are padded with floor.
        assert_eq!(game.tile(pos(0, 5)), Tile::Floor);
    }

    #[test]
    fn test_no_player() {
        let input = "####\n\
                     #  #\n\
                     ####";
        assert!(matches!(Game::from_text(input), Err(LevelError::NoPlayer)));
    }

    #[test]
    fn test_multiple_players() {
        let input = "####\n\
                     #@@#\n\
                     ####";
        assert!(matches!(
            Game::from_text(input),
            Err(LevelError::MultiplePlayers { .. })
        ));
    }

    #[test]
    fn test_empty_and_oversized() {
        assert!(matches!(Game::from_text(""), Err(LevelError::Empty)));

        let wide = format!("@{}", " ".repeat(MAX_SIZE));
        assert!(matches!(
            Game::from_text(&wide),
            Err(LevelError::TooLarge { .. })
        ));

        let crowded = format!("@{}", "$".repeat(MAX_BOXES + 1));
        assert!(matches!(
            Game::from_text(&crowded),
            Err(LevelError::TooManyBoxes { .. })
        ));
    }

    #[test]
    fn test_unknown_characters_are_floor() {
        let game = Game::from_text("#@.-X#").unwrap();
        assert_eq!(game.tile(pos(0, 2)), Tile::Floor);
        assert_eq!(game.tile(pos(0, 3)), Tile::Floor);
        assert_eq!(game.tile(pos(0, 4)), Tile::Goal);
    }

    #[test]
    fn test_carriage_returns_are_stripped() {
        let game = Game::from_text("#####\r\n#@$X#\r\n#####\r").unwrap();
        assert_eq!(game.width(), 5);
        assert_eq!(game.height(), 3);
        assert_eq!(game.to_string(), "#####\n#@$X#\n#####\n");
    }

    #[test]
    fn test_display() {
        let input = "####\n\
                     # X#\n\
                     #  ###\n\
                     #*@  #\n\
                     #  $ #\n\
                     #  ###\n\
                     ####";
        let game = Game::from_text(input).unwrap();
        assert_eq!(game.to_string().trim_end(), input);

        let on_goal = Game::from_text("#+$X#").unwrap();
        assert_eq!(on_goal.to_string(), "#+$X#\n");
    }

    #[test]
    fn test_legal_moves_exclude_walls() {
        let input = "#####\n\
                     #   #\n\
                     #@$ #\n\
                     #####";
        let game = Game::from_text(input).unwrap();
        // Up is floor, Down and Left are walls, Right holds a box.
        assert_eq!(game.legal_moves().as_slice(), &[pos(1, 1), pos(2, 2)]);
    }

    #[test]
    fn test_push_all_directions() {
        let tests = [
            ("#####\n#@$ #\n#   #\n#####", pos(1, 2), pos(1, 3)),
            ("#####\n# @ #\n# $ #\n#   #\n#####", pos(2, 2), pos(3, 2)),
            ("#####\n# $@#\n#   #\n#####", pos(1, 2), pos(1, 1)),
            ("#####\n#   #\n# $ #\n# @ #\n#####", pos(2, 2), pos(1, 2)),
        ];

        for (input, target, beyond) in tests {
            let game = Game::from_text(input).unwrap();
            let next = game.apply(target).unwrap();
            assert_eq!(next.player(), target, "Failed for {}", input);
            assert_eq!(next.boxes(), &[beyond], "Failed for {}", input);
        }
    }

    #[test]
    fn test_walk_without_push() {
        let game = Game::from_text("#@ $#").unwrap();
        let next = game.apply(pos(0, 2)).unwrap();
        assert_eq!(next.player(), pos(0, 2));
        assert_eq!(next.boxes(), &[pos(0, 3)]);
    }

    #[test]
    fn test_push_blocked() {
        let input = "####\n\
                     #@$##\n\
                     #   #\n\
                     ####";
        let game = Game::from_text(input).unwrap();
        assert_eq!(game.apply(pos(1, 2)), Err(MoveError::Blocked(pos(1, 2))));
    }

    #[test]
    fn test_push_into_another_box() {
        let input = "######\n\
                     #@$$ #\n\
                     ######";
        let game = Game::from_text(input).unwrap();
        assert_eq!(game.apply(pos(1, 2)), Err(MoveError::Blocked(pos(1, 2))));
    }

    #[test]
    fn test_push_off_the_board() {
        // No wall behind the box: the board edge blocks the push the same way.
        let game = Game::from_text(" @$").unwrap();
        assert_eq!(game.apply(pos(0, 2)), Err(MoveError::Blocked(pos(0, 2))));
        assert!(game.successors().iter().all(|next| next.boxes() == [pos(0, 2)]));
    }

    #[test]
    fn test_illegal_targets() {
        let game = Game::from_text("#@ #").unwrap();
        assert_eq!(game.apply(pos(0, 0)), Err(MoveError::IntoWall(pos(0, 0))));
        assert!(matches!(
            game.apply(pos(0, 3)),
            Err(MoveError::NotAdjacent { .. })
        ));
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let game = Game::from_text("#@$ X#").unwrap();
        let original = game.clone();

        let mut next = game.apply(pos(0, 2)).unwrap();
        next.perform(pos(0, 3)).unwrap();

        assert_eq!(game, original);
        assert_eq!(game.player(), pos(0, 1));
        assert_eq!(game.boxes(), &[pos(0, 2)]);
        assert_eq!(next.boxes(), &[pos(0, 4)]);
    }

    #[test]
    fn test_successors_stay_in_bounds() {
        let game = Game::from_text("     \n  $  \n $@$ \n  $  \n     ").unwrap();
        assert_eq!(game.successors().len(), 4);
        for next in game.successors() {
            assert!(game.in_bounds(next.player()));
            for &b in next.boxes() {
                assert!(next.in_bounds(b));
            }
            let mut boxes = next.boxes().to_vec();
            boxes.dedup();
            assert_eq!(boxes.len(), game.boxes().len());
        }
    }

    #[test]
    fn test_is_solved() {
        let solved = Game::from_text("#@*#").unwrap();
        assert!(solved.is_solved());

        let unsolved = Game::from_text("#@$X#").unwrap();
        assert!(!unsolved.is_solved());

        // Extra goals do not matter.
        let spare_goals = Game::from_text("#@*XX#").unwrap();
        assert!(spare_goals.is_solved());

        // Every box must sit on some goal.
        let spare_boxes = Game::from_text("#@*$#").unwrap();
        assert!(!spare_boxes.is_solved());
        assert!(spare_boxes.any_box_on_goal());
    }

    #[test]
    fn test_box_push_directions_ignore_other_boxes() {
        let input = "#####\n\
                     #$  #\n\
                     # $$#\n\
                     # @ #\n\
                     #####";
        let game = Game::from_text(input).unwrap();
        assert!(game.box_push_directions(pos(1, 1)).is_empty());
        assert_eq!(
            game.box_push_directions(pos(2, 2)).as_slice(),
            &[Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        );
        assert_eq!(
            game.box_push_directions(pos(2, 3)).as_slice(),
            &[Direction::Up, Direction::Down]
        );
    }

    #[test]
    fn test_replay() {
        let game = Game::from_text("#@$ X#").unwrap();
        let states = game.replay(&[pos(0, 2), pos(0, 3)]).unwrap();
        assert_eq!(states.len(), 2);
        assert!(states[1].is_solved());

        assert_eq!(
            game.replay(&[pos(0, 3)]),
            Err(MoveError::NotAdjacent {
                player: pos(0, 1),
                target: pos(0, 3)
            })
        );
    }

    #[test]
    fn test_direction_between() {
        let center = pos(2, 2);
        assert_eq!(Direction::between(center, pos(1, 2)), Some(Direction::Up));
        assert_eq!(Direction::between(center, pos(3, 2)), Some(Direction::Down));
        assert_eq!(Direction::between(center, pos(2, 1)), Some(Direction::Left));
        assert_eq!(Direction::between(center, pos(2, 3)), Some(Direction::Right));
        assert_eq!(Direction::between(center, pos(3, 3)), None);
        assert_eq!(Direction::between(center, center), None);
    }
}
