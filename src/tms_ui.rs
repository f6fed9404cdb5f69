// Terminal front end: event loop, rendering and modal dialogs
// Layout is a menu row, the minefield and a status row, each in a bordered block

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::error::Error;
use std::io;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use unicode_width::UnicodeWidthStr;

use crate::tms_board::{MAX_COLUMNS, MAX_ROWS, MIN_COLUMNS, MIN_ROWS, Mark, mine_count_for, validate_dimensions};
use crate::tms_color::Palette;
use crate::tms_config::{Config, save_config};
use crate::tms_game::{GameController, GameState, LONG_CLICK_THRESHOLD, Mood, Outcome};
use crate::tms_lang::{Lang, fill};
use crate::tms_timer::format_elapsed;

const TICK_RATE: Duration = Duration::from_millis(200);
/// Release is simulated after this long on terminals without key-release events
const KEY_RELEASE_DELAY: Duration = Duration::from_millis(100);
const FLASH_DURATION: Duration = Duration::from_millis(350);
const CLICK_FEEDBACK: Duration = Duration::from_millis(200);
const MENU_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 3;
/// Narrowest layout that still shows the whole menu row
const MIN_WIDTH: u16 = 76;

/// Terminal size needed to show a board of the given dimensions
pub fn required_size(columns: usize, rows: usize) -> (u16, u16) {
    let width = (columns as u16) * 2 + 3;
    let height = rows as u16 + 2 + MENU_HEIGHT + STATUS_HEIGHT;
    (width.max(MIN_WIDTH), height)
}

fn fits(columns: usize, rows: usize, screen: Rect) -> bool {
    let (w, h) = required_size(columns, rows);
    screen.width >= w && screen.height >= h
}

/// Map a mouse position to a board cell; each cell is two columns wide
fn cell_at(board: Rect, column: u16, row: u16, columns: usize, rows: usize) -> Option<(usize, usize)> {
    let (ix, iy) = (board.x + 1, board.y + 1);
    if column < ix || row < iy {
        return None;
    }
    let cx = ((column - ix) / 2) as usize;
    let cy = (row - iy) as usize;
    (cx < columns && cy < rows).then_some((cx, cy))
}

fn contains(r: Rect, column: u16, row: u16) -> bool {
    column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
}

fn face(mood: Mood, ascii: bool) -> &'static str {
    match (mood, ascii) {
        (Mood::Smiley, false) => "🙂",
        (Mood::Worried, false) => "😮",
        (Mood::Winky, false) => "😉",
        (Mood::BigSmiley, false) => "😀",
        (Mood::Frowny, false) => "😵",
        (Mood::Sleepy, false) => "😴",
        (Mood::Smiley, true) => ":)",
        (Mood::Worried, true) => ":o",
        (Mood::Winky, true) => ";)",
        (Mood::BigSmiley, true) => ":D",
        (Mood::Frowny, true) => "x(",
        (Mood::Sleepy, true) => "-_-",
    }
}

struct Glyphs {
    hidden: &'static str,
    mine: &'static str,
    flag: &'static str,
    question: &'static str,
    wrong_flag: &'static str,
    indicator: &'static str,
}

impl Glyphs {
    fn new(ascii: bool) -> Self {
        if ascii {
            Glyphs { hidden: "#", mine: "*", flag: "F", question: "?", wrong_flag: "X", indicator: ">" }
        } else {
            Glyphs { hidden: "■", mine: "☼", flag: "⚑", question: "?", wrong_flag: "✗", indicator: "▸" }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Help,
    New,
    Records,
    Board,
    Options,
    About,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Close,
    Ok,
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirm {
    NewGame,
    Exit,
    Resize(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormError {
    OutOfRange,
    TooLarge,
}

#[derive(Debug, Clone, PartialEq)]
struct BoardForm {
    columns: String,
    rows: String,
    focus: u8, // 0 = columns, 1 = rows
    error: Option<FormError>,
    flash: Option<(u8, Instant)>,
}

impl BoardForm {
    fn field_mut(&mut self) -> &mut String {
        if self.focus == 0 { &mut self.columns } else { &mut self.rows }
    }

    fn parsed(&self) -> (Option<usize>, Option<usize>) {
        (self.columns.trim().parse().ok(), self.rows.trim().parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct OptionsForm {
    show_indicator: bool,
    use_question_marks: bool,
    ascii_icons: bool,
    language: usize, // Index into Lang::choices
    focus: usize,    // 0..=3
}

#[derive(Debug, Clone, PartialEq)]
enum Modal {
    Help,
    Records,
    About,
    Board(BoardForm),
    Options(OptionsForm),
    Win { new_record: bool },
    Loss,
    Confirm(Confirm),
    /// The starting board cannot fit this terminal; any key exits
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyPress {
    Reveal,
    Chord,
}

// Runtime UI state grouped in one place
#[derive(Debug)]
struct UiState {
    modal: Option<Modal>,
    resume_on_close: bool, // The open modal paused a running game
    auto_paused: bool,     // Paused by focus loss or an undersized terminal
    focus_lost: bool,
    too_small: bool,
    left_press: Option<((usize, usize), Instant)>,
    right_press: Option<(usize, usize)>,
    chord_active: Option<(usize, usize)>,
    key_timer: Option<(Instant, KeyPress)>,
    supports_key_release: bool,
    flash_cell: Option<((usize, usize), Instant)>,
    clicked_index: Option<(usize, Instant)>,
    hover_index: Option<usize>,
    exit_hovered: bool,
    screen: Rect,
    board_rect: Option<Rect>,
    exit_rect: Option<Rect>,
    menu_hits: Vec<(u16, u16, u16, Action)>, // (row, start, end) of each menu entry
    button_rects: Vec<(Rect, Button)>,
    option_rects: Vec<Rect>,
    hovered_button: Option<Button>,
    pressed_button: Option<Button>,
}

impl UiState {
    fn new() -> Self {
        UiState {
            modal: None,
            resume_on_close: false,
            auto_paused: false,
            focus_lost: false,
            too_small: false,
            left_press: None,
            right_press: None,
            chord_active: None,
            key_timer: None,
            supports_key_release: cfg!(windows),
            flash_cell: None,
            clicked_index: None,
            hover_index: None,
            exit_hovered: false,
            screen: Rect::default(),
            board_rect: None,
            exit_rect: None,
            menu_hits: Vec::new(),
            button_rects: Vec::new(),
            option_rects: Vec::new(),
            hovered_button: None,
            pressed_button: None,
        }
    }

    fn clear_presses(&mut self) {
        self.left_press = None;
        self.right_press = None;
        self.chord_active = None;
        self.key_timer = None;
        self.flash_cell = None;
    }
}

struct App<'a> {
    cfg: &'a mut Config,
    lang: &'a mut Lang,
    game: GameController,
    ui: UiState,
    palette: Palette,
    glyphs: Glyphs,
    exit: Option<ExitCode>,
}

/// Run the game until the player exits
pub fn run(cfg: &mut Config, lang: &mut Lang, columns: usize, rows: usize) -> Result<ExitCode, Box<dyn Error>> {
    let game = GameController::new(columns, rows)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, EnableFocusChange, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        glyphs: Glyphs::new(cfg.ascii_icons),
        cfg,
        lang,
        game,
        ui: UiState::new(),
        palette: Palette::detect(),
        exit: None,
    };

    let size = terminal.size()?;
    if !fits(columns, rows, size) {
        let (w, h) = required_size(columns, rows);
        error!(columns, rows, width = size.width, height = size.height, need_width = w, need_height = h, "board does not fit the terminal");
        app.ui.modal = Some(Modal::Fatal);
    }

    let result = app.event_loop(&mut terminal);

    save_config(app.cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, DisableFocusChange, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

impl App<'_> {
    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<ExitCode, Box<dyn Error>> {
        let mut last_tick = Instant::now();
        loop {
            terminal.draw(|f| self.draw(f))?;

            let timeout = TICK_RATE.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(me) => self.handle_mouse(me),
                    Event::FocusLost => self.ui.focus_lost = true,
                    Event::FocusGained => self.ui.focus_lost = false,
                    _ => {}
                }
            }

            self.tick();
            if let Some(code) = self.exit {
                return Ok(code);
            }
            if last_tick.elapsed() >= TICK_RATE {
                last_tick = Instant::now();
            }
        }
    }

    // Timers that run whether or not an event arrived
    fn tick(&mut self) {
        if let Some((t0, kind)) = self.ui.key_timer {
            if t0.elapsed() >= KEY_RELEASE_DELAY {
                self.ui.key_timer = None;
                self.finish_key(kind);
            }
        }
        if let Some((_, t0)) = self.ui.clicked_index {
            if t0.elapsed() > CLICK_FEEDBACK {
                self.ui.clicked_index = None;
            }
        }

        let hold = self.ui.focus_lost || self.ui.too_small;
        if hold && self.game.pause() {
            self.ui.auto_paused = true;
        } else if !hold && self.ui.auto_paused && self.ui.modal.is_none() {
            self.ui.auto_paused = false;
            self.game.resume();
        }
    }

    fn open_modal(&mut self, modal: Modal) {
        if self.ui.modal.is_none() && self.game.pause() {
            self.ui.resume_on_close = true;
        }
        self.ui.clear_presses();
        self.game.set_pressing(false);
        self.ui.hovered_button = None;
        self.ui.pressed_button = None;
        self.ui.modal = Some(modal);
    }

    fn close_modal(&mut self) {
        self.ui.modal = None;
        self.ui.button_rects.clear();
        self.ui.option_rects.clear();
        self.ui.hovered_button = None;
        self.ui.pressed_button = None;
        if std::mem::take(&mut self.ui.resume_on_close) {
            self.game.resume();
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Help => self.open_modal(Modal::Help),
            Action::Records => self.open_modal(Modal::Records),
            Action::About => self.open_modal(Modal::About),
            Action::New => {
                if self.game.in_progress() {
                    self.open_modal(Modal::Confirm(Confirm::NewGame));
                } else {
                    self.new_game();
                }
            }
            Action::Board => {
                let board = self.game.board();
                self.open_modal(Modal::Board(BoardForm {
                    columns: board.columns().to_string(),
                    rows: board.rows().to_string(),
                    focus: 0,
                    error: None,
                    flash: None,
                }));
            }
            Action::Options => {
                let language = self
                    .lang
                    .choices()
                    .iter()
                    .position(|(code, _)| *code == self.lang.current_lang)
                    .unwrap_or(0);
                self.open_modal(Modal::Options(OptionsForm {
                    show_indicator: self.cfg.show_indicator,
                    use_question_marks: self.cfg.use_question_marks,
                    ascii_icons: self.cfg.ascii_icons,
                    language,
                    focus: 0,
                }));
            }
            Action::Exit => {
                if self.game.in_progress() {
                    self.open_modal(Modal::Confirm(Confirm::Exit));
                } else {
                    self.exit = Some(ExitCode::SUCCESS);
                }
            }
        }
    }

    fn new_game(&mut self) {
        self.game.reset();
        self.ui.clear_presses();
        self.ui.resume_on_close = false;
        self.ui.auto_paused = false;
    }

    fn apply_resize(&mut self, columns: usize, rows: usize) {
        match self.game.resize(columns, rows) {
            Ok(()) => {
                self.cfg.columns = columns;
                self.cfg.rows = rows;
                save_config(self.cfg);
            }
            Err(e) => warn!(error = %e, "resize rejected"),
        }
        self.ui.clear_presses();
        self.ui.resume_on_close = false;
        self.ui.auto_paused = false;
    }

    fn confirm(&mut self, what: Confirm) {
        match what {
            Confirm::NewGame => self.new_game(),
            Confirm::Exit => {
                self.exit = Some(ExitCode::SUCCESS);
                return;
            }
            Confirm::Resize(columns, rows) => self.apply_resize(columns, rows),
        }
        self.close_modal();
    }

    fn after_action(&mut self, outcome: Outcome, at: (usize, usize)) {
        match outcome {
            Outcome::Refused => self.ui.flash_cell = Some((at, Instant::now())),
            Outcome::Won => {
                let board = self.game.board();
                let (columns, rows) = (board.columns(), board.rows());
                let millis = self.game.elapsed().as_millis() as u64;
                let new_record = self.cfg.set_record(columns, rows, millis);
                if new_record {
                    info!(columns, rows, millis, "new record");
                    save_config(self.cfg);
                }
                self.open_modal(Modal::Win { new_record });
            }
            Outcome::Exploded => self.open_modal(Modal::Loss),
            Outcome::Ignored | Outcome::Continued => {}
        }
    }

    fn toggle_pause(&mut self) {
        if self.ui.too_small {
            return;
        }
        if self.game.state() == GameState::Paused {
            self.ui.auto_paused = false;
            self.game.resume();
        } else {
            self.game.pause();
        }
    }

    fn mark(&mut self, x: usize, y: usize) {
        let outcome = self.game.toggle_mark(x, y, self.cfg.use_question_marks);
        self.after_action(outcome, (x, y));
    }

    fn reveal(&mut self, x: usize, y: usize) {
        let outcome = self.game.reveal(x, y);
        self.after_action(outcome, (x, y));
    }

    fn chord(&mut self, x: usize, y: usize) {
        let outcome = self.game.chord(x, y);
        self.after_action(outcome, (x, y));
    }

    // ---- keyboard ----

    fn handle_key(&mut self, key: KeyEvent) {
        self.game.note_input();
        if key.kind == KeyEventKind::Press
            && key.modifiers.contains(KeyModifiers::CONTROL)
            && key.code == KeyCode::Char('c')
        {
            // the startup size dialog always ends with a failure status
            let fatal = matches!(self.ui.modal, Some(Modal::Fatal));
            self.exit = Some(if fatal { ExitCode::FAILURE } else { ExitCode::SUCCESS });
            return;
        }
        if self.ui.modal.is_some() {
            // modals act on press only
            if key.kind == KeyEventKind::Press {
                self.modal_key(key.code);
            }
            return;
        }
        match key.kind {
            KeyEventKind::Press => self.board_key_press(key.code),
            KeyEventKind::Release => self.board_key_release(key.code),
            KeyEventKind::Repeat => {}
        }
    }

    fn board_key_press(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.dispatch(Action::Exit),
            KeyCode::F(1) => self.dispatch(Action::Help),
            KeyCode::F(2) => self.dispatch(Action::New),
            KeyCode::F(4) => self.dispatch(Action::Records),
            KeyCode::F(5) => self.dispatch(Action::Board),
            KeyCode::F(7) => self.dispatch(Action::Options),
            KeyCode::F(9) => self.dispatch(Action::About),
            KeyCode::Char('p') | KeyCode::Char('P') => self.toggle_pause(),
            KeyCode::Left => self.game.step_cursor(-1, 0),
            KeyCode::Right => self.game.step_cursor(1, 0),
            KeyCode::Up => self.game.step_cursor(0, -1),
            KeyCode::Down => self.game.step_cursor(0, 1),
            KeyCode::Char(' ') => {
                // emulate a left button press at the cursor
                self.ui.left_press = Some((self.game.cursor(), Instant::now()));
                self.game.set_pressing(true);
                if !self.ui.supports_key_release {
                    self.ui.key_timer = Some((Instant::now(), KeyPress::Reveal));
                }
            }
            KeyCode::Enter => {
                // emulate both buttons at the cursor
                self.ui.chord_active = Some(self.game.cursor());
                self.game.set_pressing(true);
                if !self.ui.supports_key_release {
                    self.ui.key_timer = Some((Instant::now(), KeyPress::Chord));
                }
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                let (x, y) = self.game.cursor();
                self.mark(x, y);
            }
            _ => {}
        }
    }

    fn board_key_release(&mut self, code: KeyCode) {
        let kind = match code {
            KeyCode::Char(' ') => KeyPress::Reveal,
            KeyCode::Enter => KeyPress::Chord,
            _ => return,
        };
        self.ui.supports_key_release = true;
        self.ui.key_timer = None;
        self.finish_key(kind);
    }

    fn finish_key(&mut self, kind: KeyPress) {
        self.game.set_pressing(false);
        match kind {
            KeyPress::Reveal => {
                if let Some((at, _)) = self.ui.left_press.take() {
                    if at == self.game.cursor() {
                        self.reveal(at.0, at.1);
                    }
                }
            }
            KeyPress::Chord => {
                if let Some((x, y)) = self.ui.chord_active.take() {
                    self.chord(x, y);
                }
            }
        }
    }

    fn modal_key(&mut self, code: KeyCode) {
        let Some(modal) = self.ui.modal.take() else { return };
        match modal {
            Modal::Fatal => self.exit = Some(ExitCode::FAILURE),
            Modal::Board(form) => self.board_form_key(form, code),
            Modal::Options(form) => self.options_key(form, code),
            Modal::Confirm(what) => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.confirm(what),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.close_modal(),
                _ => self.ui.modal = Some(Modal::Confirm(what)),
            },
            // informational modals close on any key
            Modal::Help | Modal::Records | Modal::About | Modal::Win { .. } | Modal::Loss => self.close_modal(),
        }
    }

    fn board_form_key(&mut self, mut form: BoardForm, code: KeyCode) {
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let field = form.field_mut();
                if field.len() < 2 {
                    field.push(c);
                }
                form.error = None;
            }
            KeyCode::Backspace => {
                form.field_mut().pop();
                form.error = None;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.focus = 1 - form.focus,
            KeyCode::Enter => return self.submit_board_form(form),
            KeyCode::Esc => return self.close_modal(),
            _ => {}
        }
        self.ui.modal = Some(Modal::Board(form));
    }

    fn check_board_form(&self, form: &BoardForm) -> Result<(usize, usize), (u8, FormError)> {
        let (columns, rows) = form.parsed();
        let columns = columns
            .filter(|c| (MIN_COLUMNS..=MAX_COLUMNS).contains(c))
            .ok_or((0, FormError::OutOfRange))?;
        let rows = rows
            .filter(|r| (MIN_ROWS..=MAX_ROWS).contains(r))
            .ok_or((1, FormError::OutOfRange))?;
        if !fits(columns, rows, self.ui.screen) {
            return Err((0, FormError::TooLarge));
        }
        Ok((columns, rows))
    }

    fn submit_board_form(&mut self, mut form: BoardForm) {
        match self.check_board_form(&form) {
            Err((field, err)) => {
                form.error = Some(err);
                form.focus = field;
                form.flash = Some((field, Instant::now()));
                self.ui.modal = Some(Modal::Board(form));
            }
            Ok((columns, rows)) if self.game.in_progress() => {
                self.ui.modal = Some(Modal::Confirm(Confirm::Resize(columns, rows)));
            }
            Ok((columns, rows)) => {
                self.apply_resize(columns, rows);
                self.close_modal();
            }
        }
    }

    fn options_key(&mut self, mut form: OptionsForm, code: KeyCode) {
        match code {
            KeyCode::Up => form.focus = (form.focus + 3) % 4,
            KeyCode::Down | KeyCode::Tab => form.focus = (form.focus + 1) % 4,
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => self.toggle_option(&mut form),
            KeyCode::Enter => return self.apply_options(form),
            KeyCode::Esc => return self.close_modal(),
            _ => {}
        }
        self.ui.modal = Some(Modal::Options(form));
    }

    fn toggle_option(&self, form: &mut OptionsForm) {
        match form.focus {
            0 => form.show_indicator = !form.show_indicator,
            1 => form.use_question_marks = !form.use_question_marks,
            2 => form.ascii_icons = !form.ascii_icons,
            _ => form.language = (form.language + 1) % self.lang.choices().len(),
        }
    }

    fn apply_options(&mut self, form: OptionsForm) {
        self.cfg.show_indicator = form.show_indicator;
        self.cfg.use_question_marks = form.use_question_marks;
        self.cfg.ascii_icons = form.ascii_icons;
        if let Some((code, _)) = self.lang.choices().get(form.language) {
            self.cfg.language = code.to_string();
            self.lang.switch_to(code);
        }
        self.glyphs = Glyphs::new(self.cfg.ascii_icons);
        save_config(self.cfg);
        self.close_modal();
    }

    // ---- mouse ----

    fn handle_mouse(&mut self, me: MouseEvent) {
        if !matches!(me.kind, MouseEventKind::Moved) {
            self.game.note_input();
        }
        if self.ui.modal.is_some() {
            self.modal_mouse(me);
            return;
        }

        if let MouseEventKind::Moved = me.kind {
            self.ui.hover_index = self.menu_hit(me.column, me.row).map(|(i, _)| i);
            self.ui.exit_hovered = self.ui.exit_rect.is_some_and(|r| contains(r, me.column, me.row));
        }
        if let MouseEventKind::Down(MouseButton::Left) = me.kind {
            if let Some((i, action)) = self.menu_hit(me.column, me.row) {
                self.ui.clicked_index = Some((i, Instant::now()));
                self.dispatch(action);
                return;
            }
            if self.ui.exit_rect.is_some_and(|r| contains(r, me.column, me.row)) {
                self.dispatch(Action::Exit);
                return;
            }
        }
        self.board_mouse(me);
    }

    fn menu_hit(&self, column: u16, row: u16) -> Option<(usize, Action)> {
        self.ui
            .menu_hits
            .iter()
            .enumerate()
            .find(|(_, (r, start, end, _))| row == *r && column >= *start && column < *end)
            .map(|(i, (_, _, _, action))| (i, *action))
    }

    fn board_mouse(&mut self, me: MouseEvent) {
        if self.ui.too_small {
            return;
        }
        let Some(rect) = self.ui.board_rect else { return };
        let board = self.game.board();
        let cell = cell_at(rect, me.column, me.row, board.columns(), board.rows());

        match me.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if let Some((x, y)) = cell {
                    self.game.set_cursor(x, y);
                }
            }
            MouseEventKind::Down(button) => {
                let Some(at) = cell else { return };
                self.game.set_cursor(at.0, at.1);
                if self.game.state() == GameState::Paused {
                    // a click on the hidden board resumes play
                    self.toggle_pause();
                    return;
                }
                self.game.set_pressing(true);
                match button {
                    MouseButton::Left => {
                        if self.ui.right_press == Some(at) {
                            self.ui.chord_active = Some(at);
                        }
                        self.ui.left_press = Some((at, Instant::now()));
                    }
                    MouseButton::Right => {
                        if self.ui.left_press.is_some_and(|(p, _)| p == at) {
                            self.ui.chord_active = Some(at);
                        }
                        self.ui.right_press = Some(at);
                    }
                    MouseButton::Middle => self.ui.chord_active = Some(at),
                }
            }
            MouseEventKind::Up(button) => {
                self.game.set_pressing(false);
                if let Some((x, y)) = self.ui.chord_active.take() {
                    self.ui.left_press = None;
                    self.ui.right_press = None;
                    if cell == Some((x, y)) {
                        self.chord(x, y);
                    }
                    return;
                }
                match button {
                    MouseButton::Left => {
                        if let Some((at, t0)) = self.ui.left_press.take() {
                            if cell == Some(at) {
                                if t0.elapsed() >= LONG_CLICK_THRESHOLD {
                                    self.mark(at.0, at.1);
                                } else {
                                    self.reveal(at.0, at.1);
                                }
                            }
                        }
                    }
                    MouseButton::Right => {
                        if let Some(at) = self.ui.right_press.take() {
                            if cell == Some(at) {
                                self.mark(at.0, at.1);
                            }
                        }
                    }
                    MouseButton::Middle => {}
                }
            }
            _ => {}
        }
    }

    fn modal_mouse(&mut self, me: MouseEvent) {
        let button = self
            .ui
            .button_rects
            .iter()
            .find(|(r, _)| contains(*r, me.column, me.row))
            .map(|(_, b)| *b);
        match me.kind {
            MouseEventKind::Moved => self.ui.hovered_button = button,
            MouseEventKind::Down(MouseButton::Left) => {
                if matches!(self.ui.modal, Some(Modal::Fatal)) {
                    self.exit = Some(ExitCode::FAILURE);
                    return;
                }
                self.ui.pressed_button = button;
                if button.is_none() {
                    self.modal_click(me.column, me.row);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let pressed = self.ui.pressed_button.take();
                if let Some(b) = pressed.filter(|p| Some(*p) == button) {
                    self.activate(b);
                }
            }
            MouseEventKind::Down(MouseButton::Right) => {
                // right click dismisses anything that needs no answer
                if matches!(
                    self.ui.modal,
                    Some(Modal::Help | Modal::Records | Modal::About | Modal::Win { .. } | Modal::Loss)
                ) {
                    self.close_modal();
                }
            }
            _ => {}
        }
    }

    // Clicks on checkboxes and input fields
    fn modal_click(&mut self, column: u16, row: u16) {
        let Some(index) = self.ui.option_rects.iter().position(|r| contains(*r, column, row)) else {
            return;
        };
        match self.ui.modal.take() {
            Some(Modal::Options(mut form)) => {
                form.focus = index;
                self.toggle_option(&mut form);
                self.ui.modal = Some(Modal::Options(form));
            }
            Some(Modal::Board(mut form)) => {
                form.focus = index.min(1) as u8;
                self.ui.modal = Some(Modal::Board(form));
            }
            other => self.ui.modal = other,
        }
    }

    fn activate(&mut self, button: Button) {
        let Some(modal) = self.ui.modal.take() else { return };
        match (modal, button) {
            (Modal::Board(form), Button::Ok) => self.submit_board_form(form),
            (Modal::Options(form), Button::Ok) => self.apply_options(form),
            (Modal::Confirm(what), Button::Yes) => self.confirm(what),
            (Modal::Fatal, _) => self.exit = Some(ExitCode::FAILURE),
            _ => self.close_modal(),
        }
    }

    // ---- rendering ----

    fn draw<B: Backend>(&mut self, f: &mut Frame<B>) {
        let size = f.size();
        self.ui.screen = size;
        self.ui.button_rects.clear();
        self.ui.option_rects.clear();

        if let Some(Modal::Fatal) = self.ui.modal {
            self.draw_fatal(f, size);
            return;
        }

        let board = self.game.board();
        let (columns, rows) = (board.columns(), board.rows());
        let (need_w, need_h) = required_size(columns, rows);
        self.ui.too_small = size.width < need_w || size.height < need_h;
        if self.ui.too_small {
            self.ui.board_rect = None;
            let a = &self.lang.assets;
            let lines = vec![
                Spans::from(Span::raw(a.tsmsg_line1)),
                Spans::from(Span::raw(fill(a.tsmsg_line2, &[&need_w, &need_h]))),
            ];
            let warn = Paragraph::new(Text::from(lines))
                .block(Block::default().borders(Borders::ALL).title(a.tsmsg_title))
                .alignment(Alignment::Center);
            f.render_widget(Clear, size);
            let area = center_rect(40u16.min(size.width), 4u16.min(size.height), size);
            f.render_widget(warn, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(MENU_HEIGHT),
                    Constraint::Min(rows as u16 + 2),
                    Constraint::Length(STATUS_HEIGHT),
                ]
                .as_ref(),
            )
            .split(size);

        self.draw_menu(f, chunks[0]);
        self.draw_status(f, chunks[2]);
        self.draw_board(f, chunks[1]);
        if self.ui.modal.is_some() {
            self.draw_modal(f, size);
        }
    }

    fn menu_items(&self) -> [(&'static str, &'static str, Action); 6] {
        let a = &self.lang.assets;
        [
            ("F1", a.menu_help, Action::Help),
            ("F2", a.menu_new, Action::New),
            ("F4", a.menu_records, Action::Records),
            ("F5", a.menu_board, Action::Board),
            ("F7", a.menu_options, Action::Options),
            ("F9", a.menu_about, Action::About),
        ]
    }

    fn key_styles(&self, pressed: bool, hovered: bool) -> (Style, Style) {
        let p = &self.palette;
        if pressed {
            (
                Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD),
                Style::default().bg(Color::Green).fg(Color::Black),
            )
        } else if hovered {
            (
                Style::default().bg(p.cursor_bg).fg(Color::Black).add_modifier(Modifier::BOLD),
                Style::default().bg(p.cursor_bg).fg(Color::Black),
            )
        } else {
            (
                Style::default().fg(p.menu_key).add_modifier(Modifier::BOLD),
                Style::default().fg(p.menu_text),
            )
        }
    }

    fn draw_menu<B: Backend>(&mut self, f: &mut Frame<B>, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        let mut hits = Vec::new();
        let mut x = area.x + 2; // border + padding
        for (i, (key, label, action)) in self.menu_items().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("   "));
                x += 3;
            }
            let pressed = self.ui.clicked_index.is_some_and(|(c, _)| c == i);
            let hovered = self.ui.hover_index == Some(i);
            let (key_style, rest_style) = self.key_styles(pressed, hovered);
            let rest = format!(": {label}");
            let width = (key.width() + rest.width()) as u16;
            hits.push((area.y + 1, x, x + width, action));
            x += width;
            spans.push(Span::styled(key, key_style));
            spans.push(Span::styled(rest, rest_style));
        }
        self.ui.menu_hits = hits;
        let menu = Paragraph::new(Spans::from(spans)).block(self.bordered());
        f.render_widget(menu, area);
    }

    fn bordered(&self) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.border))
    }

    fn draw_status<B: Backend>(&mut self, f: &mut Frame<B>, area: Rect) {
        let a = &self.lang.assets;
        let mut left = fill(a.status_mines_fmt, &[&self.game.remaining_mines()]);
        left.push_str(&fill(a.status_moves_fmt, &[&self.game.moves()]));
        match self.game.state() {
            GameState::Ready => left.push_str(a.status_start_hint),
            GameState::Paused => {
                left.push_str(&format!(" {} ", format_elapsed(self.game.elapsed())));
                left.push_str(a.status_paused);
            }
            _ => left.push_str(&format!(" {} ", format_elapsed(self.game.elapsed()))),
        }

        let rest = format!(": {}", a.menu_exit);
        let right_w = "Esc".width() + rest.width();
        let inner_w = area.width.saturating_sub(2) as usize;
        let gap = inner_w.saturating_sub(left.width() + right_w + 1).max(1);
        let exit_x = area.x + 1 + (left.width() + gap) as u16;
        self.ui.exit_rect = Some(Rect::new(exit_x, area.y + 1, right_w as u16, 1));

        let (key_style, rest_style) = self.key_styles(false, self.ui.exit_hovered);
        let spans = vec![
            Span::raw(left),
            Span::raw(" ".repeat(gap)),
            Span::styled("Esc", key_style),
            Span::styled(rest, rest_style),
        ];
        let status = Paragraph::new(Spans::from(spans)).block(self.bordered());
        f.render_widget(status, area);
    }

    fn cell_look(&self, x: usize, y: usize) -> (&'static str, String, Style) {
        let board = self.game.board();
        let cell = board.cell(x, y);
        let p = &self.palette;
        let g = &self.glyphs;
        let over = self.game.is_over();

        let hidden = Style::default().fg(p.hidden);
        let (text, mut style) = if self.game.state() == GameState::Paused {
            (g.hidden.to_string(), hidden)
        } else if cell.revealed {
            let open = Style::default().bg(p.revealed_bg);
            if cell.mine {
                let bg = if board.detonated() == Some((x, y)) { p.exploded_bg } else { p.revealed_bg };
                (g.mine.to_string(), open.bg(bg).fg(p.mine).add_modifier(Modifier::BOLD))
            } else if cell.adj > 0 {
                (cell.adj.to_string(), open.fg(p.number(cell.adj)).add_modifier(Modifier::BOLD))
            } else {
                (" ".to_string(), open)
            }
        } else {
            match cell.mark {
                Mark::Flag if over && board.is_wrong_flag(x, y) => {
                    (g.wrong_flag.to_string(), Style::default().fg(p.wrong_flag).add_modifier(Modifier::BOLD))
                }
                Mark::Flag => (g.flag.to_string(), Style::default().fg(p.flag)),
                Mark::Question => (g.question.to_string(), Style::default().fg(p.flag)),
                Mark::None => (g.hidden.to_string(), hidden),
            }
        };

        let pressable = !cell.revealed && cell.mark != Mark::Flag;
        let in_chord = self
            .ui
            .chord_active
            .is_some_and(|(cx, cy)| x.abs_diff(cx) <= 1 && y.abs_diff(cy) <= 1);
        let pressed = self.ui.left_press.is_some_and(|(at, _)| at == (x, y));
        if pressable && (in_chord || pressed) {
            style = style.bg(p.pressed_bg).fg(p.pressed_bg);
        }

        let cursor = self.game.cursor() == (x, y);
        if cursor {
            style = style.bg(p.cursor_bg);
        }
        if let Some((at, t0)) = self.ui.flash_cell {
            if at == (x, y) && t0.elapsed() < FLASH_DURATION {
                style = style.bg(p.warning).fg(Color::White).add_modifier(Modifier::BOLD);
            }
        }
        let prefix = if cursor && self.cfg.show_indicator { g.indicator } else { " " };
        (prefix, text, style)
    }

    fn draw_board<B: Backend>(&mut self, f: &mut Frame<B>, area: Rect) {
        let board = self.game.board();
        let (columns, rows) = (board.columns(), board.rows());
        let rect = centered_block(columns as u16 * 2 + 3, rows as u16 + 2, area);
        self.ui.board_rect = Some(rect);

        let mut lines = Vec::with_capacity(rows);
        for y in 0..rows {
            let mut spans = Vec::with_capacity(columns * 2 + 1);
            for x in 0..columns {
                let (prefix, text, style) = self.cell_look(x, y);
                let prefix_style = if prefix == " " {
                    style
                } else {
                    style.fg(Color::Yellow).add_modifier(Modifier::BOLD)
                };
                spans.push(Span::styled(prefix, prefix_style));
                spans.push(Span::styled(text, style));
            }
            spans.push(Span::raw(" "));
            lines.push(Spans::from(spans));
        }

        let title = format!(
            " {}x{} {} ",
            columns,
            rows,
            face(self.game.mood(), self.cfg.ascii_icons)
        );
        let paragraph = Paragraph::new(Text::from(lines))
            .block(self.bordered().title(title).title_alignment(Alignment::Center));
        f.render_widget(paragraph, rect);

        if self.game.state() == GameState::Paused && self.ui.modal.is_none() {
            let a = &self.lang.assets;
            let lines = vec![Spans::from(Span::raw("")), Spans::from(Span::raw(a.paused_hint))];
            let width = (a.paused_hint.width() as u16 + 4).min(rect.width);
            let overlay = center_rect(width, 4u16.min(rect.height), rect);
            f.render_widget(Clear, overlay);
            let p = Paragraph::new(Text::from(lines))
                .block(self.bordered().title(a.paused_title))
                .alignment(Alignment::Center);
            f.render_widget(p, overlay);
        }
    }

    // Frame a modal sized to its content; returns the inner area
    fn modal_frame<B: Backend>(&self, f: &mut Frame<B>, screen: Rect, title: &str, lines: &[Spans], min_w: u16) -> Rect {
        let content_w = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
        let w = (content_w + 4).max(min_w).max(title.width() as u16 + 4).min(screen.width);
        let h = (lines.len() as u16 + 4).min(screen.height);
        let rect = centered_block(w, h, screen);
        f.render_widget(Clear, rect);
        f.render_widget(self.bordered().title(title.to_string()), rect);
        Rect::new(rect.x + 1, rect.y + 1, rect.width.saturating_sub(2), rect.height.saturating_sub(2))
    }

    // Buttons share the last inner row, centered
    fn draw_buttons<B: Backend>(&mut self, f: &mut Frame<B>, inner: Rect, buttons: &[Button]) {
        let a = &self.lang.assets;
        let labels: Vec<(&str, Button)> = buttons
            .iter()
            .map(|b| {
                let text = match b {
                    Button::Close => a.btn_close,
                    Button::Ok => a.btn_ok,
                    Button::Yes => a.btn_yes,
                    Button::No => a.btn_no,
                };
                (text, *b)
            })
            .collect();
        let total: u16 = labels.iter().map(|(t, _)| t.width() as u16).sum::<u16>() + 2 * (labels.len() as u16).saturating_sub(1);
        let mut x = inner.x + inner.width.saturating_sub(total) / 2;
        let y = inner.y + inner.height.saturating_sub(1);
        for (text, b) in labels {
            let w = text.width() as u16;
            let rect = Rect::new(x, y, w, 1).intersection(inner);
            let style = if self.ui.pressed_button == Some(b) {
                Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD)
            } else if self.ui.hovered_button == Some(b) {
                Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD)
            } else {
                Style::default().bg(Color::Gray).fg(Color::Black).add_modifier(Modifier::BOLD)
            };
            f.render_widget(Paragraph::new(Spans::from(Span::styled(text, style))), rect);
            self.ui.button_rects.push((rect, b));
            x += w + 2;
        }
    }

    fn draw_modal<B: Backend>(&mut self, f: &mut Frame<B>, screen: Rect) {
        let Some(modal) = self.ui.modal.clone() else { return };
        match modal {
            Modal::Help => self.draw_help(f, screen),
            Modal::Records => self.draw_records(f, screen),
            Modal::About => {
                let a = &self.lang.assets;
                let version = fill(a.about_version_fmt, &[&env!("CARGO_PKG_VERSION"), &env!("CARGO_PKG_AUTHORS")]);
                let lines = vec![
                    Spans::from(Span::raw(a.about_description)),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(version)),
                ];
                self.draw_message(f, screen, a.menu_about, lines, &[Button::Close]);
            }
            Modal::Board(form) => self.draw_board_form(f, screen, &form),
            Modal::Options(form) => self.draw_options(f, screen, &form),
            Modal::Win { new_record } => {
                let a = &self.lang.assets;
                let mut lines = vec![
                    Spans::from(Span::styled(a.win_message, Style::default().add_modifier(Modifier::BOLD))),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(fill(a.win_moves_fmt, &[&self.game.moves()]))),
                    Spans::from(Span::raw(fill(a.win_time_fmt, &[&format_elapsed(self.game.elapsed())]))),
                ];
                if new_record {
                    lines.push(Spans::from(Span::styled(
                        a.win_new_record,
                        Style::default().fg(self.palette.menu_key).add_modifier(Modifier::BOLD),
                    )));
                }
                self.draw_message(f, screen, a.win_title, lines, &[Button::Ok]);
            }
            Modal::Loss => {
                let a = &self.lang.assets;
                let lines = vec![
                    Spans::from(Span::styled(a.loss_message, Style::default().add_modifier(Modifier::BOLD))),
                    Spans::from(Span::raw("")),
                    Spans::from(Span::raw(a.loss_better_luck)),
                ];
                self.draw_message(f, screen, a.loss_title, lines, &[Button::Ok]);
            }
            Modal::Confirm(what) => {
                let a = &self.lang.assets;
                let question = match what {
                    Confirm::NewGame => a.confirm_new.to_string(),
                    Confirm::Exit => a.confirm_exit.to_string(),
                    Confirm::Resize(c, r) => fill(a.confirm_resize_fmt, &[&c, &r]),
                };
                let lines = vec![Spans::from(Span::raw(question))];
                self.draw_message(f, screen, a.confirm_in_game, lines, &[Button::Yes, Button::No]);
            }
            Modal::Fatal => self.draw_fatal(f, screen),
        }
    }

    fn draw_message<B: Backend>(&mut self, f: &mut Frame<B>, screen: Rect, title: &str, lines: Vec<Spans>, buttons: &[Button]) {
        let mut body = vec![Spans::from(Span::raw(""))];
        body.extend(lines);
        let inner = self.modal_frame(f, screen, title, &body, 30);
        f.render_widget(Paragraph::new(Text::from(body)).alignment(Alignment::Center), inner);
        self.draw_buttons(f, inner, buttons);
    }

    fn draw_help<B: Backend>(&mut self, f: &mut Frame<B>, screen: Rect) {
        let a = &self.lang.assets;
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let lines = vec![
            Spans::from(Span::raw("")),
            Spans::from(Span::styled(a.help_controls, bold)),
            Spans::from(Span::raw(a.help_move)),
            Spans::from(Span::raw(a.help_reveal)),
            Spans::from(Span::raw(a.help_flag)),
            Spans::from(Span::raw(a.help_chord)),
            Spans::from(Span::raw(a.help_pause)),
        ];
        let inner = self.modal_frame(f, screen, a.menu_help, &lines, 30);
        f.render_widget(Paragraph::new(Text::from(lines)), inner);
        self.draw_buttons(f, inner, &[Button::Close]);
    }

    fn draw_records<B: Backend>(&mut self, f: &mut Frame<B>, screen: Rect) {
        let a = &self.lang.assets;
        let current = (self.game.board().columns(), self.game.board().rows());
        let mut lines = vec![
            Spans::from(Span::raw("")),
            Spans::from(Span::styled(a.rec_best_time, Style::default().add_modifier(Modifier::BOLD))),
        ];
        let records = self.cfg.records_by_size();
        if records.is_empty() {
            lines.push(Spans::from(Span::raw(a.rec_no_record)));
        }
        for ((c, r), rec) in records {
            let text = format!(
                "  {:>7}  {:>10}  {}",
                format!("{c}x{r}"),
                format_elapsed(Duration::from_millis(rec.millis)),
                self.lang.format_date(&rec.date)
            );
            let style = if (c, r) == current {
                Style::default().fg(self.palette.menu_key).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Spans::from(Span::styled(text, style)));
        }
        let inner = self.modal_frame(f, screen, a.menu_records, &lines, 36);
        f.render_widget(Paragraph::new(Text::from(lines)), inner);
        self.draw_buttons(f, inner, &[Button::Close]);
    }

    fn draw_board_form<B: Backend>(&mut self, f: &mut Frame<B>, screen: Rect, form: &BoardForm) {
        let a = &self.lang.assets;
        let labels = [
            fill(a.board_columns_fmt, &[&MIN_COLUMNS, &MAX_COLUMNS]),
            fill(a.board_rows_fmt, &[&MIN_ROWS, &MAX_ROWS]),
        ];
        let label_w = labels.iter().map(|l| l.width()).max().unwrap_or(0);
        let flashing = form.flash.filter(|(_, t0)| t0.elapsed() < FLASH_DURATION).map(|(i, _)| i);

        let mut lines = vec![Spans::from(Span::raw(""))];
        for (i, (label, value)) in labels.iter().zip([&form.columns, &form.rows]).enumerate() {
            let field_style = if flashing == Some(i as u8) {
                Style::default().bg(self.palette.warning).fg(Color::White)
            } else if form.focus == i as u8 {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                Style::default().bg(Color::DarkGray)
            };
            lines.push(Spans::from(vec![
                Span::raw(format!(" {label:<label_w$} ")),
                Span::styled(format!(" {value:>2} "), field_style),
            ]));
        }
        let note = match (form.error, form.parsed()) {
            (Some(FormError::OutOfRange), _) => Span::styled(a.board_out_of_range, Style::default().fg(self.palette.warning)),
            (Some(FormError::TooLarge), _) => Span::styled(a.board_too_large, Style::default().fg(self.palette.warning)),
            (None, (Some(c), Some(r))) if validate_dimensions(c, r).is_ok() => {
                Span::raw(format!(" {}", fill(a.board_mines_fmt, &[&mine_count_for(c, r)])))
            }
            (None, _) => Span::raw(""),
        };
        lines.push(Spans::from(Span::raw("")));
        lines.push(Spans::from(note));

        let inner = self.modal_frame(f, screen, a.board_title, &lines, 34);
        for i in 0..2u16 {
            self.ui.option_rects.push(Rect::new(inner.x, inner.y + 1 + i, inner.width, 1));
        }
        f.render_widget(Paragraph::new(Text::from(lines)), inner);
        self.draw_buttons(f, inner, &[Button::Ok]);
    }

    fn draw_options<B: Backend>(&mut self, f: &mut Frame<B>, screen: Rect, form: &OptionsForm) {
        let a = &self.lang.assets;
        let check = |on: bool| if on { "[x]" } else { "[ ]" };
        let language = self.lang.choices().get(form.language).map_or("", |(_, name)| *name);
        let rows = [
            format!("{} {}", check(form.show_indicator), a.opt_show_indicator),
            format!("{} {}", check(form.use_question_marks), a.opt_use_question),
            format!("{} {}", check(form.ascii_icons), a.opt_ascii_icons),
            format!("{}: < {} >", a.opt_language, language),
        ];
        let focus_style = Style::default().bg(self.palette.cursor_bg).fg(Color::Black).add_modifier(Modifier::BOLD);

        let mut lines = vec![Spans::from(Span::raw(""))];
        for (i, text) in rows.iter().enumerate() {
            let span = if form.focus == i {
                Span::styled(text.clone(), focus_style)
            } else {
                Span::raw(text.clone())
            };
            lines.push(Spans::from(vec![Span::raw(" "), span]));
        }
        let inner = self.modal_frame(f, screen, a.menu_options, &lines, 30);
        for (i, text) in rows.iter().enumerate() {
            self.ui.option_rects.push(Rect::new(inner.x + 1, inner.y + 1 + i as u16, text.width() as u16, 1));
        }
        f.render_widget(Paragraph::new(Text::from(lines)), inner);
        self.draw_buttons(f, inner, &[Button::Ok]);
    }

    fn draw_fatal<B: Backend>(&mut self, f: &mut Frame<B>, screen: Rect) {
        let a = &self.lang.assets;
        let board = self.game.board();
        let (need_w, need_h) = required_size(board.columns(), board.rows());
        let lines = vec![
            Spans::from(Span::raw("")),
            Spans::from(Span::raw(fill(a.fatal_line1, &[&board.columns(), &board.rows()]))),
            Spans::from(Span::raw(fill(a.tsmsg_line2, &[&need_w, &need_h]))),
            Spans::from(Span::raw("")),
            Spans::from(Span::styled(a.fatal_line2, Style::default().fg(self.palette.warning))),
        ];
        f.render_widget(Clear, screen);
        let inner = self.modal_frame(f, screen, a.tsmsg_title, &lines, 30);
        f.render_widget(Paragraph::new(Text::from(lines)).alignment(Alignment::Center), inner);
    }
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn centered_block(w: u16, h: u16, r: Rect) -> Rect {
    center_rect(w, h, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_size_covers_board_and_chrome() {
        assert_eq!(required_size(9, 9), (MIN_WIDTH, 17));
        assert_eq!(required_size(60, 40), (123, 48));
    }

    #[test]
    fn fits_compares_both_axes() {
        assert!(fits(9, 9, Rect::new(0, 0, 80, 24)));
        assert!(!fits(9, 9, Rect::new(0, 0, 60, 24)));
        assert!(!fits(30, 20, Rect::new(0, 0, 80, 24)));
    }

    #[test]
    fn mouse_positions_map_to_cells() {
        let board = Rect::new(10, 5, 9 * 2 + 3, 11);
        assert_eq!(cell_at(board, 11, 6, 9, 9), Some((0, 0)));
        assert_eq!(cell_at(board, 12, 6, 9, 9), Some((0, 0)));
        assert_eq!(cell_at(board, 13, 7, 9, 9), Some((1, 1)));
        assert_eq!(cell_at(board, 27, 14, 9, 9), Some((8, 8)));
        assert_eq!(cell_at(board, 10, 6, 9, 9), None);
        assert_eq!(cell_at(board, 29, 6, 9, 9), None);
        assert_eq!(cell_at(board, 11, 15, 9, 9), None);
    }

    #[test]
    fn centered_rect_is_clipped_to_parent() {
        let outer = Rect::new(0, 0, 20, 10);
        assert_eq!(center_rect(10, 4, outer), Rect::new(5, 3, 10, 4));
        assert_eq!(center_rect(30, 4, outer), Rect::new(0, 3, 20, 4));
    }

    #[test]
    fn faces_exist_for_both_icon_sets() {
        for mood in [Mood::Smiley, Mood::Worried, Mood::Winky, Mood::BigSmiley, Mood::Frowny, Mood::Sleepy] {
            assert!(!face(mood, true).is_empty());
            assert!(face(mood, true).is_ascii());
            assert!(!face(mood, false).is_ascii());
        }
    }

    #[test]
    fn board_form_reads_both_fields() {
        let mut form = BoardForm {
            columns: "16".to_string(),
            rows: String::new(),
            focus: 1,
            error: None,
            flash: None,
        };
        form.field_mut().push('9');
        assert_eq!(form.parsed(), (Some(16), Some(9)));
    }

    fn with_app(f: impl FnOnce(&mut App)) {
        let mut cfg = Config::default();
        let mut lang = Lang::new("en");
        // (1, 0) touches the corner mine, so revealing it opens one cell
        let mut game = GameController::from_layout(9, 9, &[(0, 0), (8, 8)]).unwrap();
        assert_eq!(game.reveal(1, 0), Outcome::Continued);
        let mut app = App {
            glyphs: Glyphs::new(true),
            cfg: &mut cfg,
            lang: &mut lang,
            game,
            ui: UiState::new(),
            palette: Palette::build(|c| c),
            exit: None,
        };
        f(&mut app);
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    #[test]
    fn ctrl_c_on_startup_size_dialog_fails() {
        with_app(|app| {
            app.ui.modal = Some(Modal::Fatal);
            app.handle_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL));
            assert_eq!(app.exit, Some(ExitCode::FAILURE));
        });
        with_app(|app| {
            app.handle_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL));
            assert_eq!(app.exit, Some(ExitCode::SUCCESS));
        });
    }

    #[test]
    fn undersized_terminal_keeps_the_game_paused() {
        with_app(|app| {
            app.ui.too_small = true;
            app.ui.board_rect = Some(Rect::new(10, 5, 9 * 2 + 3, 11));
            app.tick();
            assert_eq!(app.game.state(), GameState::Paused);

            app.handle_key(press(KeyCode::Char('p'), KeyModifiers::NONE));
            assert_eq!(app.game.state(), GameState::Paused);

            app.handle_mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 13,
                row: 7,
                modifiers: KeyModifiers::NONE,
            });
            assert_eq!(app.game.state(), GameState::Paused);

            app.ui.too_small = false;
            app.tick();
            assert_eq!(app.game.state(), GameState::Active);
        });
    }
}
