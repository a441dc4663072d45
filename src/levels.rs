use crate::game::{Game, Position};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Error type for level parsing operations.
#[derive(Debug, Error)]
pub enum LevelError {
    /// IO error when reading from file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("empty level")]
    Empty,
    #[error("no player found on board")]
    NoPlayer,
    #[error("multiple players found at {first} and {second}")]
    MultiplePlayers { first: Position, second: Position },
    #[error("board is {width}x{height}, the maximum is {max}x{max}")]
    TooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
    #[error("more than {max} boxes on the board")]
    TooManyBoxes { max: usize },
    /// A level inside a collection failed to parse
    #[error("level {number}: {source}")]
    InLevel {
        number: usize,
        #[source]
        source: Box<LevelError>,
    },
}

/// A collection of Sokoban levels.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Game>,
}

impl Levels {
    /// Parse one or more levels from a string.
    ///
    /// Lines whose first non-blank character is `;` separate levels and are otherwise
    /// ignored. Blank lines at the start and end of each level are dropped; blank lines
    /// inside a level are kept as rows of floor.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current_level: Vec<&str> = Vec::new();

        for line in contents.lines() {
            if line.trim_start().starts_with(';') {
                Self::flush(&mut current_level, &mut levels)?;
                continue;
            }
            current_level.push(line);
        }
        Self::flush(&mut current_level, &mut levels)?;

        Ok(Levels { levels })
    }

    fn flush(lines: &mut Vec<&str>, levels: &mut Vec<Game>) -> Result<(), LevelError> {
        let is_blank = |line: &&str| line.trim().is_empty();
        let start = lines.iter().position(|l| !is_blank(l));
        let end = lines.iter().rposition(|l| !is_blank(l));
        if let (Some(start), Some(end)) = (start, end) {
            let text = lines[start..=end].join("\n");
            let game = Game::from_text(&text).map_err(|err| LevelError::InLevel {
                number: levels.len() + 1,
                source: Box::new(err),
            })?;
            levels.push(game);
        }
        lines.clear();
        Ok(())
    }

    /// Parse levels from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Game> {
        self.levels.get(index)
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
