//! Static map geometry for the frozen lake.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{Action, RewardSchedule, State},
};

/// Classification of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl CellKind {
    pub fn to_char(self) -> char {
        match self {
            CellKind::Start => 'S',
            CellKind::Frozen => 'F',
            CellKind::Hole => 'H',
            CellKind::Goal => 'G',
        }
    }

    pub fn from_char(c: char) -> Option<CellKind> {
        match c {
            'S' | 's' => Some(CellKind::Start),
            'F' | 'f' | '.' => Some(CellKind::Frozen),
            'H' | 'h' => Some(CellKind::Hole),
            'G' | 'g' => Some(CellKind::Goal),
            _ => None,
        }
    }
}

/// Immutable rows × cols lake map.
///
/// States are flat indices computed as `row * cols + col`. The map is
/// validated once at construction and read-only afterwards; every query is
/// total over valid state indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWorld {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
    start: State,
}

impl GridWorld {
    /// Parse a map from rows of single-character cell codes.
    ///
    /// Rejects empty maps, inconsistent row lengths, and unknown characters.
    /// A map without a Start cell falls back to state 0 with a warning; the
    /// standard layouts always carry one.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        if lines.is_empty() {
            return Err(Error::EmptyMap);
        }

        let cols = lines[0].as_ref().chars().count();
        if cols == 0 {
            return Err(Error::EmptyMap);
        }

        let mut cells = Vec::with_capacity(lines.len() * cols);
        for (row, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let got = line.chars().count();
            if got != cols {
                return Err(Error::InconsistentRowLength {
                    row,
                    expected: cols,
                    got,
                });
            }
            for (col, character) in line.chars().enumerate() {
                let kind = CellKind::from_char(character).ok_or(Error::InvalidCellCharacter {
                    character,
                    row,
                    col,
                })?;
                cells.push(kind);
            }
        }

        let start = match cells.iter().position(|&kind| kind == CellKind::Start) {
            Some(state) => state,
            None => {
                eprintln!("Warning: map has no start cell; defaulting to state 0.");
                0
            }
        };

        Ok(Self {
            rows: lines.len(),
            cols,
            cells,
            start,
        })
    }

    /// Build one of the built-in layouts: `4x4`, `8x8`, or the `1x4`
    /// corridor.
    pub fn named(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "4x4" => Self::parse(&["SFFF", "FHFH", "FFFH", "HFFG"]),
            "8x8" => Self::parse(&[
                "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF",
                "FFFHFFFG",
            ]),
            "1x4" | "corridor" => Self::parse(&["SFFG"]),
            _ => Err(Error::UnknownMap {
                name: name.to_string(),
                expected: "4x4, 8x8, 1x4".to_string(),
            }),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of states on the map.
    pub fn state_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, state: State) -> bool {
        state < self.cells.len()
    }

    /// Reject an out-of-range state index with a reportable error.
    pub fn check_state(&self, state: State) -> Result<()> {
        if self.contains(state) {
            Ok(())
        } else {
            Err(Error::StateOutOfRange {
                state,
                state_count: self.cells.len(),
            })
        }
    }

    pub fn cell_kind(&self, state: State) -> CellKind {
        self.cells[state]
    }

    /// Holes and goals end the episode.
    pub fn is_terminal(&self, state: State) -> bool {
        matches!(self.cell_kind(state), CellKind::Hole | CellKind::Goal)
    }

    /// Reward for entering `state`. Start cells are rewarded as Frozen.
    pub fn reward(&self, state: State, schedule: &RewardSchedule) -> f64 {
        match self.cell_kind(state) {
            CellKind::Hole => schedule.hole,
            CellKind::Goal => schedule.goal,
            CellKind::Start | CellKind::Frozen => schedule.frozen,
        }
    }

    /// Actions that stay on the map from `state`, in index order.
    ///
    /// There is no wraparound; a boundary cell simply has fewer actions.
    pub fn available_actions(&self, state: State) -> Vec<Action> {
        let (row, col) = self.position(state);
        Action::ALL
            .iter()
            .copied()
            .filter(|action| match action {
                Action::Left => col > 0,
                Action::Down => row + 1 < self.rows,
                Action::Right => col + 1 < self.cols,
                Action::Up => row > 0,
            })
            .collect()
    }

    /// Apply a move. A move that would leave the grid returns the same
    /// state; it still counts as a step for the caller.
    pub fn apply_action(&self, state: State, action: Action) -> State {
        let (row, col) = self.position(state);
        let (dr, dc) = action.delta();
        let new_row = row as isize + dr;
        let new_col = col as isize + dc;
        if new_row < 0 || new_row >= self.rows as isize || new_col < 0 || new_col >= self.cols as isize
        {
            return state;
        }
        self.state_at(new_row as usize, new_col as usize)
    }

    /// The episode reset target: the first Start cell, or the documented
    /// fallback chosen at construction.
    pub fn start_state(&self) -> State {
        self.start
    }

    pub fn position(&self, state: State) -> (usize, usize) {
        (state / self.cols, state % self.cols)
    }

    pub fn state_at(&self, row: usize, col: usize) -> State {
        row * self.cols + col
    }

    /// Re-encode the map as rows of cell codes (snapshot format).
    pub fn to_lines(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|kind| kind.to_char()).collect())
            .collect()
    }
}

impl fmt::Display for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_map() {
        let grid = GridWorld::named("4x4").unwrap();
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.state_count(), 16);
        assert_eq!(grid.start_state(), 0);
        assert_eq!(grid.cell_kind(0), CellKind::Start);
        assert_eq!(grid.cell_kind(5), CellKind::Hole);
        assert_eq!(grid.cell_kind(15), CellKind::Goal);
    }

    #[test]
    fn test_parse_rejects_empty_map() {
        let lines: [&str; 0] = [];
        assert!(matches!(GridWorld::parse(&lines), Err(Error::EmptyMap)));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let result = GridWorld::parse(&["SFF", "FG"]);
        assert!(matches!(
            result,
            Err(Error::InconsistentRowLength {
                row: 1,
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_character() {
        let result = GridWorld::parse(&["SFX", "FFG"]);
        assert!(matches!(
            result,
            Err(Error::InvalidCellCharacter {
                character: 'X',
                row: 0,
                col: 2
            })
        ));
    }

    #[test]
    fn test_missing_start_falls_back_to_zero() {
        let grid = GridWorld::parse(&["FFG"]).unwrap();
        assert_eq!(grid.start_state(), 0);
    }

    #[test]
    fn test_available_actions_at_corners() {
        let grid = GridWorld::named("4x4").unwrap();
        assert_eq!(
            grid.available_actions(0),
            vec![Action::Down, Action::Right]
        );
        assert_eq!(grid.available_actions(3), vec![Action::Left, Action::Down]);
        assert_eq!(grid.available_actions(12), vec![Action::Right, Action::Up]);
        assert_eq!(grid.available_actions(15), vec![Action::Left, Action::Up]);
        assert_eq!(grid.available_actions(5).len(), 4);
    }

    #[test]
    fn test_one_row_grid_has_no_vertical_moves() {
        let grid = GridWorld::named("1x4").unwrap();
        assert_eq!(grid.available_actions(0), vec![Action::Right]);
        assert_eq!(grid.available_actions(1), vec![Action::Left, Action::Right]);
        assert_eq!(grid.available_actions(3), vec![Action::Left]);
    }

    #[test]
    fn test_apply_action_no_op_at_boundary() {
        let grid = GridWorld::named("4x4").unwrap();
        assert_eq!(grid.apply_action(0, Action::Up), 0);
        assert_eq!(grid.apply_action(0, Action::Left), 0);
        assert_eq!(grid.apply_action(0, Action::Right), 1);
        assert_eq!(grid.apply_action(0, Action::Down), 4);
        assert_eq!(grid.apply_action(15, Action::Down), 15);
    }

    #[test]
    fn test_reward_schedule_lookup() {
        let grid = GridWorld::named("4x4").unwrap();
        let schedule = RewardSchedule::new(-10.0, 10.0, 0.5);
        assert_eq!(grid.reward(5, &schedule), -10.0);
        assert_eq!(grid.reward(15, &schedule), 10.0);
        assert_eq!(grid.reward(1, &schedule), 0.5);
        // Start cell is rewarded as Frozen.
        assert_eq!(grid.reward(0, &schedule), 0.5);
    }

    #[test]
    fn test_check_state_bounds() {
        let grid = GridWorld::named("1x4").unwrap();
        assert!(grid.check_state(3).is_ok());
        assert!(matches!(
            grid.check_state(4),
            Err(Error::StateOutOfRange {
                state: 4,
                state_count: 4
            })
        ));
    }

    #[test]
    fn test_to_lines_roundtrip() {
        let lines = ["SFFF", "FHFH", "FFFH", "HFFG"];
        let grid = GridWorld::parse(&lines).unwrap();
        assert_eq!(grid.to_lines(), lines);
    }

    #[test]
    fn test_unknown_named_map() {
        assert!(matches!(
            GridWorld::named("5x5"),
            Err(Error::UnknownMap { .. })
        ));
    }
}
