// Minefield model: cells, mine placement, neighbor counts and reveal rules
// Coordinates are always (x, y) = (column, row); cells are stored row-major

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use thiserror::Error;

pub const MIN_COLUMNS: usize = 4;
pub const MAX_COLUMNS: usize = 60;
pub const MIN_ROWS: usize = 4;
pub const MAX_ROWS: usize = 40;
pub const DEFAULT_COLUMNS: usize = 9;
pub const DEFAULT_ROWS: usize = 9;

/// Cell-to-mine ratios for (small, large) boards
const MINE_RATIOS: (f64, f64) = (0.125, 0.16);
/// Boards with at least this many cells use the large ratio
const MINE_RATIO_THRESHOLD: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(
        "board must be {min_c}-{max_c} columns by {min_r}-{max_r} rows, got {columns}x{rows}",
        min_c = MIN_COLUMNS,
        max_c = MAX_COLUMNS,
        min_r = MIN_ROWS,
        max_r = MAX_ROWS
    )]
    InvalidDimensions { columns: usize, rows: usize },
    #[error("{mines} mines do not fit on a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },
}

/// Check that a board size is playable
pub fn validate_dimensions(columns: usize, rows: usize) -> Result<(), BoardError> {
    if (MIN_COLUMNS..=MAX_COLUMNS).contains(&columns) && (MIN_ROWS..=MAX_ROWS).contains(&rows) {
        Ok(())
    } else {
        Err(BoardError::InvalidDimensions { columns, rows })
    }
}

/// Number of mines used for a board of the given size
pub fn mine_count_for(columns: usize, rows: usize) -> usize {
    let cells = columns * rows;
    let ratio = if cells < MINE_RATIO_THRESHOLD {
        MINE_RATIOS.0
    } else {
        MINE_RATIOS.1
    };
    ((cells as f64 * ratio).round() as usize).clamp(1, cells.saturating_sub(1).max(1))
}

/// Player annotation on a hidden cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    #[default]
    None,
    Flag,
    Question,
}

/// A single cell on the minefield
#[derive(Debug, Clone, Copy, Default)]
pub struct Cell {
    pub mine: bool,     // Contains a mine
    pub adj: u8,        // Adjacent mine count (0-8)
    pub revealed: bool, // Opened by the player (or shown at game end)
    pub mark: Mark,     // Flag / question mark
}

/// Where a cell sits on the board; bounds how many neighbors it has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKind {
    Corner,
    Edge,
    Interior,
}

impl PositionKind {
    /// Maximum number of neighboring mines a cell of this kind can have
    pub fn max_neighbor_mines(self) -> usize {
        match self {
            PositionKind::Corner => 3,
            PositionKind::Edge => 5,
            PositionKind::Interior => 8,
        }
    }
}

/// Result of a reveal or chord on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Ignored,      // Nothing changed
    Opened(usize), // Number of safe cells opened
    Exploded,     // A mine was revealed
    Refused,      // Chord on a cell whose flags do not match its number
}

#[derive(Debug, Clone)]
pub struct Board {
    columns: usize,
    rows: usize,
    mines: usize,
    cells: Vec<Cell>,
    armed: bool,                // Mines have been placed
    revealed_safe: usize,       // Opened non-mine cells, for the win check
    detonated: Option<usize>,   // Index of the mine that ended the game
}

impl Board {
    /// Create an empty board whose mine count follows the board size
    pub fn new(columns: usize, rows: usize) -> Result<Self, BoardError> {
        validate_dimensions(columns, rows)?;
        Self::with_mines(columns, rows, mine_count_for(columns, rows))
    }

    /// Create an empty board with an explicit mine count
    /// One cell always stays free so the first click can be safe
    pub fn with_mines(columns: usize, rows: usize, mines: usize) -> Result<Self, BoardError> {
        validate_dimensions(columns, rows)?;
        let cells = columns * rows;
        if mines >= cells {
            return Err(BoardError::TooManyMines { mines, cells });
        }
        Ok(Board {
            columns,
            rows,
            mines,
            cells: vec![Cell::default(); cells],
            armed: false,
            revealed_safe: 0,
            detonated: None,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn mines(&self) -> usize {
        self.mines
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn detonated(&self) -> Option<(usize, usize)> {
        self.detonated.map(|i| self.coords(i))
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.columns + x
    }

    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.columns, index / self.columns)
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.columns && y < self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    /// All cells touching (x, y), clipped at the board edges
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(8);
        for ny in y.saturating_sub(1)..=(y + 1).min(self.rows - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(self.columns - 1) {
                if nx != x || ny != y {
                    out.push((nx, ny));
                }
            }
        }
        out
    }

    pub fn position_kind(&self, x: usize, y: usize) -> PositionKind {
        let on_x_edge = x == 0 || x == self.columns - 1;
        let on_y_edge = y == 0 || y == self.rows - 1;
        match (on_x_edge, on_y_edge) {
            (true, true) => PositionKind::Corner,
            (true, false) | (false, true) => PositionKind::Edge,
            (false, false) => PositionKind::Interior,
        }
    }

    /// Randomly place mines, never on `avoid`
    /// Candidates that would bury a cell under mines on every side are held
    /// back and only used when the board cannot be filled otherwise
    pub fn place_mines<R: Rng + ?Sized>(&mut self, avoid: (usize, usize), rng: &mut R) {
        self.clear_mines();
        let avoid_idx = self.index(avoid.0, avoid.1);
        let mut candidates: Vec<usize> = (0..self.cells.len()).filter(|&i| i != avoid_idx).collect();
        candidates.shuffle(rng);

        let wanted = self.mines.min(candidates.len());
        let mut placed = 0;
        let mut held_back = Vec::new();
        for i in candidates {
            if placed == wanted {
                break;
            }
            if self.would_enclose(i) {
                held_back.push(i);
                continue;
            }
            self.cells[i].mine = true;
            placed += 1;
        }
        for i in held_back {
            if placed == wanted {
                break;
            }
            self.cells[i].mine = true;
            placed += 1;
        }
        self.count_neighbors();
        self.armed = true;
    }

    /// Place mines at exact coordinates; out-of-range entries are skipped
    #[cfg(test)]
    pub fn place_mines_at(&mut self, coords: &[(usize, usize)]) {
        self.clear_mines();
        for &(x, y) in coords {
            if self.in_bounds(x, y) {
                let i = self.index(x, y);
                self.cells[i].mine = true;
            }
        }
        self.mines = self.cells.iter().filter(|c| c.mine).count();
        self.count_neighbors();
        self.armed = true;
    }

    fn clear_mines(&mut self) {
        for cell in &mut self.cells {
            cell.mine = false;
            cell.adj = 0;
        }
    }

    // true if mining `index` would leave one of its neighbors fully surrounded
    fn would_enclose(&self, index: usize) -> bool {
        let (x, y) = self.coords(index);
        self.neighbors(x, y).into_iter().any(|(nx, ny)| {
            let mined = self
                .neighbors(nx, ny)
                .into_iter()
                .filter(|&(ax, ay)| self.cells[self.index(ax, ay)].mine)
                .count();
            mined + 1 >= self.position_kind(nx, ny).max_neighbor_mines()
        })
    }

    fn count_neighbors(&mut self) {
        for y in 0..self.rows {
            for x in 0..self.columns {
                let adj = self
                    .neighbors(x, y)
                    .into_iter()
                    .filter(|&(nx, ny)| self.cells[self.index(nx, ny)].mine)
                    .count() as u8;
                let idx = self.index(x, y);
                self.cells[idx].adj = adj;
            }
        }
    }

    /// Open a cell
    /// Flagged cells are left alone; a zero cell opens its whole empty
    /// region plus the numbered cells bordering it
    pub fn reveal(&mut self, x: usize, y: usize) -> Reveal {
        if !self.in_bounds(x, y) {
            return Reveal::Ignored;
        }
        let idx = self.index(x, y);
        let cell = self.cells[idx];
        if cell.revealed || cell.mark == Mark::Flag {
            return Reveal::Ignored;
        }
        if cell.mine {
            self.cells[idx].revealed = true;
            self.cells[idx].mark = Mark::None;
            self.detonated = Some(idx);
            return Reveal::Exploded;
        }
        Reveal::Opened(self.flood_from(idx))
    }

    fn flood_from(&mut self, start: usize) -> usize {
        let mut opened = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            let cell = self.cells[i];
            if cell.revealed || cell.mine || cell.mark == Mark::Flag {
                continue;
            }
            self.cells[i].revealed = true;
            self.cells[i].mark = Mark::None;
            self.revealed_safe += 1;
            opened += 1;
            if cell.adj == 0 {
                let (x, y) = self.coords(i);
                for (nx, ny) in self.neighbors(x, y) {
                    let n = self.index(nx, ny);
                    if !self.cells[n].revealed {
                        queue.push_back(n);
                    }
                }
            }
        }
        opened
    }

    /// Open every unflagged neighbor of a satisfied numbered cell
    pub fn chord(&mut self, x: usize, y: usize) -> Reveal {
        if !self.in_bounds(x, y) {
            return Reveal::Ignored;
        }
        let cell = *self.cell(x, y);
        if !cell.revealed || cell.mine || cell.adj == 0 {
            return Reveal::Ignored;
        }
        let neighbors = self.neighbors(x, y);
        let flags = neighbors
            .iter()
            .filter(|&&(nx, ny)| self.cell(nx, ny).mark == Mark::Flag)
            .count();
        if flags != cell.adj as usize {
            return Reveal::Refused;
        }
        let mut opened = 0;
        let mut exploded = false;
        for (nx, ny) in neighbors {
            match self.reveal(nx, ny) {
                Reveal::Opened(n) => opened += n,
                Reveal::Exploded => exploded = true,
                Reveal::Ignored | Reveal::Refused => {}
            }
        }
        if exploded {
            Reveal::Exploded
        } else if opened == 0 {
            Reveal::Ignored
        } else {
            Reveal::Opened(opened)
        }
    }

    /// Cycle the mark on a hidden cell
    /// - two-state: none <-> flag
    /// - three-state: none -> flag -> question -> none
    pub fn toggle_mark(&mut self, x: usize, y: usize, use_question_marks: bool) -> Option<Mark> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x, y);
        if self.cells[idx].revealed {
            return None;
        }
        let next = match (self.cells[idx].mark, use_question_marks) {
            (Mark::None, _) => Mark::Flag,
            (Mark::Flag, true) => Mark::Question,
            (Mark::Flag, false) | (Mark::Question, _) => Mark::None,
        };
        self.cells[idx].mark = next;
        Some(next)
    }

    /// Every non-mine cell is open
    pub fn is_cleared(&self) -> bool {
        self.armed && self.revealed_safe == self.cells.len() - self.mines
    }

    pub fn flag_count(&self) -> usize {
        self.cells.iter().filter(|c| c.mark == Mark::Flag).count()
    }

    /// Mine counter shown to the player; negative when over-flagged
    pub fn remaining_mines(&self) -> isize {
        self.mines as isize - self.flag_count() as isize
    }

    /// A flag placed on a safe cell, shown once the game is over
    pub fn is_wrong_flag(&self, x: usize, y: usize) -> bool {
        let cell = self.cell(x, y);
        cell.mark == Mark::Flag && !cell.mine
    }

    pub fn reveal_all_mines(&mut self) {
        for cell in &mut self.cells {
            if cell.mine && cell.mark != Mark::Flag {
                cell.revealed = true;
            }
        }
    }

    pub fn flag_all_mines(&mut self) {
        for cell in &mut self.cells {
            if cell.mine {
                cell.mark = Mark::Flag;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // 5x5 board with mines at the two right-hand corners:
    //   . . . 1 *
    //   . . . 1 1
    //   . . . . .
    //   . . . 1 1
    //   . . . 1 *
    fn corners_board() -> Board {
        let mut b = Board::with_mines(5, 5, 2).unwrap();
        b.place_mines_at(&[(4, 0), (4, 4)]);
        b
    }

    #[test]
    fn rejects_out_of_range_dimensions() {
        assert_eq!(
            Board::new(3, 9).unwrap_err(),
            BoardError::InvalidDimensions { columns: 3, rows: 9 }
        );
        assert!(Board::new(MAX_COLUMNS + 1, 9).is_err());
        assert!(Board::new(9, MAX_ROWS).is_ok());
    }

    #[test]
    fn rejects_boards_without_a_free_cell() {
        assert_eq!(
            Board::with_mines(4, 4, 16).unwrap_err(),
            BoardError::TooManyMines { mines: 16, cells: 16 }
        );
        assert!(Board::with_mines(4, 4, 15).is_ok());
    }

    #[test]
    fn mine_count_follows_board_size() {
        assert_eq!(mine_count_for(9, 9), 10);
        assert_eq!(mine_count_for(16, 16), 41);
        assert_eq!(mine_count_for(4, 4), 2);
    }

    #[test]
    fn neighbors_are_clipped_at_edges() {
        let b = Board::new(9, 9).unwrap();
        assert_eq!(b.neighbors(0, 0).len(), 3);
        assert_eq!(b.neighbors(4, 0).len(), 5);
        assert_eq!(b.neighbors(4, 4).len(), 8);
        assert_eq!(b.position_kind(8, 8), PositionKind::Corner);
        assert_eq!(b.position_kind(0, 3), PositionKind::Edge);
        assert_eq!(b.position_kind(3, 3), PositionKind::Interior);
        assert_eq!(b.position_kind(3, 3).max_neighbor_mines(), 8);
    }

    #[test]
    fn random_placement_keeps_first_click_safe_and_counts_exact() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut b = Board::with_mines(9, 9, 30).unwrap();
            b.place_mines((4, 4), &mut rng);
            assert!(!b.cell(4, 4).mine);
            assert_eq!(b.cells.iter().filter(|c| c.mine).count(), 30);
        }
    }

    #[test]
    fn dense_placement_still_fills_the_board() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut b = Board::with_mines(4, 4, 15).unwrap();
        b.place_mines((0, 0), &mut rng);
        assert_eq!(b.cells.iter().filter(|c| c.mine).count(), 15);
        assert!(!b.cell(0, 0).mine);
        assert_eq!(b.cell(0, 0).adj, 3);
    }

    #[test]
    fn sparse_placement_never_buries_a_cell() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let mut b = Board::new(9, 9).unwrap();
            b.place_mines((0, 0), &mut rng);
            for y in 0..9 {
                for x in 0..9 {
                    let around = b.neighbors(x, y).len();
                    assert!((b.cell(x, y).adj as usize) < around);
                }
            }
        }
    }

    #[test]
    fn neighbor_counts_match_layout() {
        let b = corners_board();
        assert_eq!(b.cell(3, 0).adj, 1);
        assert_eq!(b.cell(3, 1).adj, 1);
        assert_eq!(b.cell(4, 1).adj, 1);
        assert_eq!(b.cell(2, 2).adj, 0);
        assert_eq!(b.cell(3, 4).adj, 1);
    }

    #[test]
    fn zero_cell_floods_region_and_its_border() {
        let mut b = corners_board();
        let r = b.reveal(0, 0);
        // everything except the two mines opens
        assert_eq!(r, Reveal::Opened(23));
        assert!(b.cell(3, 0).revealed);
        assert!(b.cell(4, 1).revealed);
        assert!(!b.cell(4, 0).revealed);
        assert!(b.is_cleared());
    }

    #[test]
    fn flood_stops_at_the_numbered_border() {
        // 6x5 with a wall of mines down column 2
        let mut b = Board::with_mines(6, 5, 5).unwrap();
        b.place_mines_at(&[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);
        assert_eq!(b.cell(1, 0).adj, 2);
        assert_eq!(b.cell(1, 2).adj, 3);

        assert_eq!(b.reveal(0, 2), Reveal::Opened(10));
        for y in 0..5 {
            assert!(b.cell(0, y).revealed);
            assert!(b.cell(1, y).revealed);
            for x in 2..6 {
                assert!(!b.cell(x, y).revealed, "({x}, {y}) opened past the wall");
            }
        }
        assert!(!b.is_cleared());
    }

    #[test]
    fn revealing_safe_cells_never_opens_a_mine() {
        let mut rng = StdRng::seed_from_u64(19);
        for _ in 0..30 {
            let mut b = Board::new(12, 10).unwrap();
            b.place_mines((5, 5), &mut rng);
            let mut order: Vec<usize> = (0..b.cells.len()).collect();
            order.shuffle(&mut rng);
            for i in order {
                let (x, y) = b.coords(i);
                if b.cell(x, y).mine || b.cell(x, y).revealed {
                    continue;
                }
                assert!(matches!(b.reveal(x, y), Reveal::Opened(n) if n > 0));
                assert!(b.cells.iter().all(|c| !(c.mine && c.revealed)));
            }
            assert!(b.is_cleared());
        }
    }

    #[test]
    fn numbered_cell_opens_alone() {
        let mut b = corners_board();
        assert_eq!(b.reveal(3, 0), Reveal::Opened(1));
        assert!(!b.cell(2, 0).revealed);
        assert!(!b.is_cleared());
    }

    #[test]
    fn flags_stop_the_flood() {
        let mut b = corners_board();
        b.toggle_mark(2, 2, false);
        b.reveal(0, 0);
        assert!(!b.cell(2, 2).revealed);
        assert_eq!(b.cell(2, 2).mark, Mark::Flag);
        assert!(!b.is_cleared());
    }

    #[test]
    fn flood_clears_question_marks() {
        let mut b = corners_board();
        b.toggle_mark(1, 1, true);
        b.toggle_mark(1, 1, true);
        assert_eq!(b.cell(1, 1).mark, Mark::Question);
        b.reveal(0, 0);
        assert!(b.cell(1, 1).revealed);
        assert_eq!(b.cell(1, 1).mark, Mark::None);
    }

    #[test]
    fn flagged_cells_cannot_be_revealed() {
        let mut b = corners_board();
        b.toggle_mark(4, 0, false);
        assert_eq!(b.reveal(4, 0), Reveal::Ignored);
        assert!(b.detonated().is_none());
    }

    #[test]
    fn revealing_a_mine_explodes() {
        let mut b = corners_board();
        assert_eq!(b.reveal(4, 4), Reveal::Exploded);
        assert_eq!(b.detonated(), Some((4, 4)));
        assert!(!b.is_cleared());
    }

    #[test]
    fn mark_cycles() {
        let mut b = corners_board();
        assert_eq!(b.toggle_mark(0, 0, false), Some(Mark::Flag));
        assert_eq!(b.toggle_mark(0, 0, false), Some(Mark::None));
        assert_eq!(b.toggle_mark(0, 0, true), Some(Mark::Flag));
        assert_eq!(b.toggle_mark(0, 0, true), Some(Mark::Question));
        assert_eq!(b.toggle_mark(0, 0, true), Some(Mark::None));
        b.reveal(0, 0);
        assert_eq!(b.toggle_mark(0, 0, true), None);
    }

    #[test]
    fn chord_requires_matching_flags() {
        let mut b = corners_board();
        b.reveal(3, 1);
        assert_eq!(b.chord(3, 1), Reveal::Refused);
        b.toggle_mark(4, 0, false);
        // (2, 0) is a zero cell, so the chord floods every other safe cell
        assert_eq!(b.chord(3, 1), Reveal::Opened(22));
        assert!(b.is_cleared());
    }

    #[test]
    fn chord_with_misplaced_flag_explodes() {
        let mut b = corners_board();
        b.reveal(3, 1);
        b.toggle_mark(4, 1, false);
        assert_eq!(b.chord(3, 1), Reveal::Exploded);
        assert_eq!(b.detonated(), Some((4, 0)));
        assert!(b.is_wrong_flag(4, 1));
    }

    #[test]
    fn flagged_plus_unflagged_mines_equals_mine_count() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut b = Board::new(16, 16).unwrap();
        b.place_mines((0, 0), &mut rng);
        for (i, c) in b.cells.clone().iter().enumerate().step_by(3) {
            let (x, y) = b.coords(i);
            if !c.revealed {
                b.toggle_mark(x, y, false);
            }
        }
        let flagged = b.cells.iter().filter(|c| c.mine && c.mark == Mark::Flag).count();
        let unflagged = b.cells.iter().filter(|c| c.mine && c.mark != Mark::Flag).count();
        assert_eq!(flagged + unflagged, b.mines());
        assert_eq!(b.remaining_mines(), b.mines() as isize - b.flag_count() as isize);
    }

    #[test]
    fn end_of_game_display_helpers() {
        let mut b = corners_board();
        b.toggle_mark(4, 4, false);
        b.reveal_all_mines();
        assert!(b.cell(4, 0).revealed);
        assert!(!b.cell(4, 4).revealed);
        b.flag_all_mines();
        assert_eq!(b.cell(4, 0).mark, Mark::Flag);
        assert_eq!(b.remaining_mines(), 0);
    }
}
