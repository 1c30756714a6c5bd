//! App: terminal init, main loop, key handling.

use crate::Args;
use crate::board::Direction;
use crate::board::TileKind;
use crate::events::GameEvent;
use crate::game::{GameState, SwapOutcome};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;

/// Points per gem removed; cascades score the same per gem as the triggering
/// match, chains simply remove more gems.
const POINTS_PER_GEM: u32 = 10;

pub struct App {
    args: Args,
    overrides: Vec<(usize, usize, TileKind)>,
    theme: Theme,
    game: GameState,
    cursor: (usize, usize),
    score: u32,
    /// One-line status shown in the sidebar, replaced on every swap.
    message: String,
    quit: bool,
}

impl App {
    pub fn new(
        args: Args,
        overrides: Vec<(usize, usize, TileKind)>,
        theme: Theme,
        game: GameState,
    ) -> Self {
        let cursor = first_playable(&game);
        Self {
            args,
            overrides,
            theme,
            game,
            cursor,
            score: 0,
            message: String::from("swap adjacent gems to match 3+"),
            quit: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        // Drop the setup events; the first draw shows the settled board.
        self.game.take_events();
        loop {
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.theme,
                    self.game.board(),
                    self.cursor,
                    self.score,
                    self.args.seed,
                    &self.message,
                )
            })?;
            if self.quit {
                return Ok(());
            }
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.apply_action(key_to_action(key))?;
                    }
                }
            }
        }
    }

    fn apply_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.quit = true,
            Action::NewGame => self.new_game()?,
            Action::CursorLeft => self.move_cursor(Direction::Left),
            Action::CursorRight => self.move_cursor(Direction::Right),
            Action::CursorUp => self.move_cursor(Direction::Up),
            Action::CursorDown => self.move_cursor(Direction::Down),
            Action::SwapLeft => self.swap(Direction::Left)?,
            Action::SwapRight => self.swap(Direction::Right)?,
            Action::SwapUp => self.swap(Direction::Up)?,
            Action::SwapDown => self.swap(Direction::Down)?,
            Action::None => {}
        }
        Ok(())
    }

    fn move_cursor(&mut self, dir: Direction) {
        let (x, y) = self.cursor;
        if let Some(next) = self.game.board().neighbor(x, y, dir) {
            self.cursor = next;
        }
    }

    fn swap(&mut self, dir: Direction) -> Result<()> {
        let (x, y) = self.cursor;
        // ReshuffleExhausted is the one fatal path; it tears down the app.
        let outcome = self.game.request_swap(x, y, dir)?;
        match outcome {
            SwapOutcome::Rejected => self.message = String::from("can't swap there"),
            SwapOutcome::RevertedNoMatch => self.message = String::from("no match"),
            SwapOutcome::Resolved(_) => {
                let mut removed = 0u32;
                let mut bombs = 0u32;
                let mut reshuffled = false;
                for ev in self.game.take_events() {
                    match ev {
                        GameEvent::PieceRemoved { .. } => removed += 1,
                        GameEvent::BombCreated { .. } => bombs += 1,
                        GameEvent::BoardReshuffled => reshuffled = true,
                        _ => {}
                    }
                }
                self.score += removed * POINTS_PER_GEM;
                self.message = match (bombs, reshuffled) {
                    (0, false) => format!("cleared {removed} gems"),
                    (_, false) => format!("cleared {removed} gems, made a bomb!"),
                    (0, true) => format!("cleared {removed} gems; board reshuffled"),
                    _ => format!("cleared {removed} gems, made a bomb; board reshuffled"),
                };
            }
        }
        Ok(())
    }

    fn new_game(&mut self) -> Result<()> {
        self.game = GameState::new(
            self.args.width as usize,
            self.args.height as usize,
            &self.overrides,
            self.args.colors,
            self.args.seed,
        )?;
        self.game.take_events();
        self.cursor = first_playable(&self.game);
        self.score = 0;
        self.message = String::from("new game");
        Ok(())
    }
}

/// Top-left-most playable cell; (0, 0) can be a hole in a custom layout.
fn first_playable(game: &GameState) -> (usize, usize) {
    let board = game.board();
    board
        .positions()
        .find(|&(x, y)| board.is_playable(x, y))
        .unwrap_or((0, 0))
}
