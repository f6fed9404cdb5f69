// Game controller: owns the board and drives the game lifecycle
// (first-click arming, moves, pause, win/loss, mood face)

use crate::tms_board::{Board, BoardError, Mark, Reveal};
use crate::tms_timer::PlayTimer;
use rand::thread_rng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long the face winks after a flag is planted
pub const WINKY_FACE_TIMEOUT: Duration = Duration::from_millis(1500);
/// Idle time before the face falls asleep
pub const SLEEPY_FACE_TIMEOUT: Duration = Duration::from_secs(20);
/// A left press held at least this long marks instead of revealing
pub const LONG_CLICK_THRESHOLD: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ready,  // Waiting for the first reveal
    Active, // Clock running
    Paused,
    Won,
    Lost,
}

/// What a player action did to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Continued,
    Refused,
    Exploded,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Smiley,
    Worried,
    Winky,
    BigSmiley,
    Frowny,
    Sleepy,
}

pub struct GameController {
    board: Board,
    state: GameState,
    moves: u32,
    timer: PlayTimer,
    cursor: (usize, usize),
    last_input: Instant,
    wink_until: Option<Instant>,
    pressing: bool,
}

impl GameController {
    pub fn new(columns: usize, rows: usize) -> Result<Self, BoardError> {
        Ok(Self::from_board(Board::new(columns, rows)?))
    }

    #[cfg(test)]
    pub fn with_mines(columns: usize, rows: usize, mines: usize) -> Result<Self, BoardError> {
        Ok(Self::from_board(Board::with_mines(columns, rows, mines)?))
    }

    /// Game on a fixed mine layout; the first click is not protected
    #[cfg(test)]
    pub fn from_layout(
        columns: usize,
        rows: usize,
        mines: &[(usize, usize)],
    ) -> Result<Self, BoardError> {
        let mut board = Board::with_mines(columns, rows, mines.len())?;
        board.place_mines_at(mines);
        Ok(Self::from_board(board))
    }

    fn from_board(board: Board) -> Self {
        GameController {
            board,
            state: GameState::Ready,
            moves: 0,
            timer: PlayTimer::default(),
            cursor: (0, 0),
            last_input: Instant::now(),
            wink_until: None,
            pressing: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    pub fn remaining_mines(&self) -> isize {
        self.board.remaining_mines()
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::Won | GameState::Lost)
    }

    /// Started and not yet finished
    pub fn in_progress(&self) -> bool {
        matches!(self.state, GameState::Active | GameState::Paused)
    }

    fn accepts_input(&self) -> bool {
        matches!(self.state, GameState::Ready | GameState::Active)
    }

    // First reveal arms the board around the clicked cell and starts the clock
    fn begin(&mut self, x: usize, y: usize) {
        if self.state != GameState::Ready {
            return;
        }
        if !self.board.is_armed() {
            self.board.place_mines((x, y), &mut thread_rng());
        }
        self.state = GameState::Active;
        self.timer.start();
        info!(
            columns = self.board.columns(),
            rows = self.board.rows(),
            mines = self.board.mines(),
            "game started"
        );
    }

    pub fn reveal(&mut self, x: usize, y: usize) -> Outcome {
        if !self.accepts_input() || !self.board.in_bounds(x, y) {
            return Outcome::Ignored;
        }
        let cell = self.board.cell(x, y);
        if cell.revealed || cell.mark == Mark::Flag {
            return Outcome::Ignored;
        }
        self.begin(x, y);
        let result = self.board.reveal(x, y);
        self.settle(result)
    }

    pub fn chord(&mut self, x: usize, y: usize) -> Outcome {
        if self.state != GameState::Active {
            return Outcome::Ignored;
        }
        let result = self.board.chord(x, y);
        self.settle(result)
    }

    pub fn toggle_mark(&mut self, x: usize, y: usize, use_question_marks: bool) -> Outcome {
        if !self.accepts_input() {
            return Outcome::Ignored;
        }
        match self.board.toggle_mark(x, y, use_question_marks) {
            Some(mark) => {
                self.moves += 1;
                if mark == Mark::Flag {
                    self.wink_until = Some(Instant::now() + WINKY_FACE_TIMEOUT);
                }
                Outcome::Continued
            }
            None => Outcome::Ignored,
        }
    }

    fn settle(&mut self, result: Reveal) -> Outcome {
        match result {
            Reveal::Ignored => Outcome::Ignored,
            Reveal::Refused => Outcome::Refused,
            Reveal::Opened(_) => {
                self.moves += 1;
                if self.board.is_cleared() {
                    self.win();
                    Outcome::Won
                } else {
                    Outcome::Continued
                }
            }
            Reveal::Exploded => {
                self.moves += 1;
                self.lose();
                Outcome::Exploded
            }
        }
    }

    fn win(&mut self) {
        self.timer.stop();
        self.state = GameState::Won;
        self.board.flag_all_mines();
        info!(moves = self.moves, elapsed_ms = self.elapsed().as_millis() as u64, "game won");
    }

    fn lose(&mut self) {
        self.timer.stop();
        self.state = GameState::Lost;
        self.board.reveal_all_mines();
        info!(moves = self.moves, "game lost");
    }

    /// Returns true if the game was running and is now paused
    pub fn pause(&mut self) -> bool {
        if self.state != GameState::Active {
            return false;
        }
        self.timer.pause();
        self.state = GameState::Paused;
        debug!("game paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.timer.resume();
        self.state = GameState::Active;
        self.last_input = Instant::now();
        debug!("game resumed");
        true
    }

    /// New game on the same board size and mine count
    pub fn reset(&mut self) {
        let columns = self.board.columns();
        let rows = self.board.rows();
        let mines = self.board.mines();
        match Board::with_mines(columns, rows, mines) {
            Ok(board) => self.replace_board(board),
            // a live board always satisfies its own constraints
            Err(e) => debug!(error = %e, "reset kept the old board"),
        }
    }

    /// New game on a board of a different size
    pub fn resize(&mut self, columns: usize, rows: usize) -> Result<(), BoardError> {
        let board = Board::new(columns, rows)?;
        info!(columns, rows, "board resized");
        self.replace_board(board);
        Ok(())
    }

    fn replace_board(&mut self, board: Board) {
        let cursor = (
            self.cursor.0.min(board.columns() - 1),
            self.cursor.1.min(board.rows() - 1),
        );
        *self = Self::from_board(board);
        self.cursor = cursor;
    }

    pub fn step_cursor(&mut self, dx: isize, dy: isize) {
        let nx = (self.cursor.0 as isize + dx).clamp(0, (self.board.columns() - 1) as isize);
        let ny = (self.cursor.1 as isize + dy).clamp(0, (self.board.rows() - 1) as isize);
        self.cursor = (nx as usize, ny as usize);
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        if self.board.in_bounds(x, y) {
            self.cursor = (x, y);
        }
    }

    /// Any key or click wakes the face up
    pub fn note_input(&mut self) {
        self.note_input_at(Instant::now());
    }

    pub(crate) fn note_input_at(&mut self, now: Instant) {
        self.last_input = now;
    }

    /// A mouse button or key is being held down on the board
    pub fn set_pressing(&mut self, pressing: bool) {
        self.pressing = pressing;
    }

    pub fn mood(&self) -> Mood {
        self.mood_at(Instant::now())
    }

    pub(crate) fn mood_at(&self, now: Instant) -> Mood {
        match self.state {
            GameState::Won => return Mood::BigSmiley,
            GameState::Lost => return Mood::Frowny,
            _ => {}
        }
        if self.pressing {
            return Mood::Worried;
        }
        if self.wink_until.is_some_and(|until| now < until) {
            return Mood::Winky;
        }
        if self.state == GameState::Active
            && now.saturating_duration_since(self.last_input) >= SLEEPY_FACE_TIMEOUT
        {
            return Mood::Sleepy;
        }
        Mood::Smiley
    }
}
