//! Game state: swap controller, cascade resolver, initial fill, reshuffle.

use crate::board::{Board, Direction, Piece, PowerKind, TileKind};
use crate::bombs;
use crate::deadlock;
use crate::events::GameEvent;
use crate::matches::{self, SwapContext};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Random-colour retries per cell before the initial fill settles for the
/// first non-matching colour still available.
const FILL_RETRIES: u32 = 100;

/// Reshuffle attempts before the layout is declared unplayable.
const RESHUFFLE_CAP: u32 = 64;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    BadDimensions { width: usize, height: usize },
    #[error("palette must have 3..=6 colours, got {0}")]
    BadPalette(u8),
    #[error("layout override out of bounds: ({x}, {y})")]
    OverrideOutOfBounds { x: usize, y: usize },
    #[error(
        "board stayed deadlocked after {attempts} reshuffles; the layout admits no playable arrangement"
    )]
    ReshuffleExhausted { attempts: u32 },
}

/// Outcome of a swap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Invalid target, or a resolution already in flight: no state change.
    Rejected,
    /// The swap produced no match and was undone bit-for-bit.
    RevertedNoMatch,
    /// The swap matched and the board cascaded to a stable state; carries a
    /// snapshot of the settled board.
    Resolved(Board),
}

/// `Move` accepts input; `Wait` means a swap is resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlState {
    Move,
    Wait,
}

/// The engine: board, palette, seedable RNG, control gate and the event
/// queue the presentation layer drains. Strictly sequential: every
/// resolution cycle runs to completion inside a single call.
#[derive(Debug)]
pub struct GameState {
    board: Board,
    colors: u8,
    rng: StdRng,
    state: ControlState,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Build layout and breakable tiles from `overrides`, fill every playable
    /// cell with a colour that creates no immediate match (bounded retries),
    /// and reshuffle if the fresh board is already deadlocked.
    pub fn new(
        width: usize,
        height: usize,
        overrides: &[(usize, usize, TileKind)],
        colors: u8,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        if width == 0 || height == 0 {
            return Err(GameError::BadDimensions { width, height });
        }
        if !(3..=6).contains(&colors) {
            return Err(GameError::BadPalette(colors));
        }
        if let Some(&(x, y, _)) = overrides.iter().find(|&&(x, y, _)| x >= width || y >= height) {
            return Err(GameError::OverrideOutOfBounds { x, y });
        }
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let mut game = Self {
            board: Board::new(width, height, overrides),
            colors,
            rng,
            state: ControlState::Move,
            events: Vec::new(),
        };
        game.initial_fill();
        game.break_deadlock()?;
        game.events.push(GameEvent::BoardSettled);
        Ok(game)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Drain the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Validate and apply a player swap, resolve everything it sets off, and
    /// report how it went. Rejected and reverted swaps leave no trace.
    pub fn request_swap(
        &mut self,
        x: usize,
        y: usize,
        dir: Direction,
    ) -> Result<SwapOutcome, GameError> {
        if self.state != ControlState::Move {
            return Ok(SwapOutcome::Rejected);
        }
        if !self.board.contains(x, y) || !self.board.is_playable(x, y) {
            return Ok(SwapOutcome::Rejected);
        }
        let Some((tx, ty)) = self.board.neighbor(x, y, dir) else {
            return Ok(SwapOutcome::Rejected);
        };
        if !self.board.is_playable(tx, ty) {
            return Ok(SwapOutcome::Rejected);
        }
        if self.board.get(x, y).is_none() || self.board.get(tx, ty).is_none() {
            return Ok(SwapOutcome::Rejected);
        }

        self.state = ControlState::Wait;
        let before = self.board.clone();
        let involves_color_bomb = [self.board.get(x, y), self.board.get(tx, ty)]
            .into_iter()
            .flatten()
            .any(|p| p.power == PowerKind::ColorClear);
        self.board.swap(x, y, tx, ty);

        // The player's piece now sits at the target cell.
        let ctx = SwapContext {
            a: (tx, ty),
            b: (x, y),
            a_color: self.color_at(tx, ty),
            b_color: self.color_at(x, y),
            horizontal: Some(dir.is_horizontal()),
        };
        let set = matches::find_matches(&mut self.board, Some(&ctx));
        if set.is_empty() {
            self.board = before;
            self.state = ControlState::Move;
            return Ok(SwapOutcome::RevertedNoMatch);
        }

        // Only the player-triggered match mints bombs, and a colour-bomb
        // swap's inflated set size must not mint another one on top.
        if !involves_color_bomb && set.len() >= 4 {
            for ((bx, by), kind) in bombs::classify(&mut self.board, &set, &ctx, &mut self.rng) {
                self.events.push(GameEvent::BombCreated { x: bx, y: by, kind });
            }
        }

        self.resolve_cascades();
        self.break_deadlock()?;
        self.events.push(GameEvent::BoardSettled);
        self.state = ControlState::Move;
        Ok(SwapOutcome::Resolved(self.board.clone()))
    }

    fn color_at(&self, x: usize, y: usize) -> u8 {
        self.board.get(x, y).map_or(0, |p| p.color)
    }

    /// Remove, collapse, refill, re-detect until no piece is matched.
    /// Entered with the triggering cycle's flags already set. Terminates:
    /// every iteration clears the current matched mass and refills are only
    /// ever evaluated against the finite board.
    fn resolve_cascades(&mut self) {
        while self.board.any_matched() {
            self.remove_matched();
            self.collapse_columns();
            self.refill();
            let _ = matches::find_matches(&mut self.board, None);
        }
    }

    /// One atomic removal pass: damage the breakable tile under each matched
    /// piece and empty the cell. No cross-cell dependency; per-cell order is
    /// unobservable.
    fn remove_matched(&mut self) {
        for (x, y) in self.board.matched_positions() {
            if let Some(remaining) = self.board.damage_tile(x, y) {
                self.events
                    .push(GameEvent::BreakableDamaged { x, y, remaining });
            }
            self.board.take(x, y);
            self.events.push(GameEvent::PieceRemoved { x, y });
        }
    }

    /// Compact every column downward. Blank cells are skipped outright:
    /// pieces fall past them into the next playable cell below.
    fn collapse_columns(&mut self) {
        for x in 0..self.board.width {
            let slots: Vec<usize> = (0..self.board.height)
                .rev()
                .filter(|&y| self.board.is_playable(x, y))
                .collect();
            let pieces: Vec<Piece> = slots
                .iter()
                .filter_map(|&y| self.board.take(x, y))
                .collect();
            for (&y, piece) in slots.iter().zip(pieces) {
                let from_y = piece.y;
                self.board.place(x, y, piece);
                if from_y != y {
                    self.events
                        .push(GameEvent::PieceDropped { x, from_y, to_y: y });
                }
            }
        }
    }

    /// Fill every empty playable cell with a uniform-random colour. No
    /// look-ahead: immediate matches are allowed and feed the next cycle.
    fn refill(&mut self) {
        for x in 0..self.board.width {
            for y in 0..self.board.height {
                if !self.board.is_playable(x, y) || self.board.get(x, y).is_some() {
                    continue;
                }
                let color = self.rng.gen_range(0..self.colors);
                self.board.place(x, y, Piece::new(color, x, y));
                self.events.push(GameEvent::PieceRefilled { x, y, color });
            }
        }
    }

    /// Initial fill avoids immediate matches: each cell redraws its colour
    /// while the two cells left of / above it would complete a run, up to
    /// [`FILL_RETRIES`], then falls back to scanning the palette in order.
    fn initial_fill(&mut self) {
        for y in 0..self.board.height {
            for x in 0..self.board.width {
                if !self.board.is_playable(x, y) {
                    continue;
                }
                let mut color = self.rng.gen_range(0..self.colors);
                let mut retries = 0;
                while self.would_match(x, y, color) && retries < FILL_RETRIES {
                    color = self.rng.gen_range(0..self.colors);
                    retries += 1;
                }
                if self.would_match(x, y, color) {
                    color = (0..self.colors)
                        .find(|&c| !self.would_match(x, y, c))
                        .unwrap_or(color);
                }
                self.board.place(x, y, Piece::new(color, x, y));
            }
        }
    }

    /// Would placing `color` at (x, y) complete a run with the already-filled
    /// cells to its left or above?
    fn would_match(&self, x: usize, y: usize, color: u8) -> bool {
        let at = |cx: usize, cy: usize| self.board.get(cx, cy).map(|p| p.color);
        (x >= 2 && at(x - 1, y) == Some(color) && at(x - 2, y) == Some(color))
            || (y >= 2 && at(x, y - 1) == Some(color) && at(x, y - 2) == Some(color))
    }

    /// Reshuffle until the board admits at least one matching swap. A
    /// reshuffle that lands pre-matched is cascaded (no bomb creation), so
    /// the board it leaves behind is always match-free. A board that stays
    /// deadlocked through the whole budget is a fatal configuration error
    /// rather than an infinite loop.
    fn break_deadlock(&mut self) -> Result<(), GameError> {
        let mut attempts = 0u32;
        while deadlock::is_deadlocked(&self.board) {
            if attempts >= RESHUFFLE_CAP {
                return Err(GameError::ReshuffleExhausted { attempts });
            }
            attempts += 1;
            deadlock::reshuffle(&mut self.board, &mut self.rng);
            self.events.push(GameEvent::BoardReshuffled);
            if deadlock::has_any_match(&self.board) {
                let _ = matches::find_matches(&mut self.board, None);
                self.resolve_cascades();
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_board(board: Board, colors: u8, seed: u64) -> Self {
        Self {
            board,
            colors,
            rng: StdRng::seed_from_u64(seed),
            state: ControlState::Move,
            events: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{board_from, board_from_layout};

    fn blanks_empty(board: &Board) -> bool {
        board
            .positions()
            .filter(|&(x, y)| !board.is_playable(x, y))
            .all(|(x, y)| board.get(x, y).is_none())
    }

    fn playable_full(board: &Board) -> bool {
        board
            .positions()
            .filter(|&(x, y)| board.is_playable(x, y))
            .all(|(x, y)| board.get(x, y).is_some())
    }

    /// Scan for any swap the engine accepts as a match; a board fresh from
    /// `new` must have one, deadlock was just checked.
    fn first_resolved_swap(game: &mut GameState) -> SwapOutcome {
        for y in 0..game.board().height {
            for x in 0..game.board().width {
                for dir in [Direction::Right, Direction::Down] {
                    if let SwapOutcome::Resolved(b) = game.request_swap(x, y, dir).unwrap() {
                        return SwapOutcome::Resolved(b);
                    }
                }
            }
        }
        panic!("no matching swap found on a non-deadlocked board");
    }

    #[test]
    fn initial_fill_has_no_prematch() {
        for seed in 0..10 {
            let game = GameState::new(6, 6, &[], 4, Some(seed)).unwrap();
            assert!(!deadlock::has_any_match(game.board()), "seed {seed}");
            assert!(playable_full(game.board()));
        }
    }

    #[test]
    fn initial_fill_respects_blank_cells() {
        let overrides = [(2, 2, TileKind::Blank), (3, 0, TileKind::Blank)];
        let game = GameState::new(6, 6, &overrides, 4, Some(1)).unwrap();
        assert!(blanks_empty(game.board()));
        assert!(playable_full(game.board()));
        assert!(!deadlock::has_any_match(game.board()));
    }

    #[test]
    fn bad_config_is_rejected() {
        assert!(matches!(
            GameState::new(0, 6, &[], 4, Some(0)),
            Err(GameError::BadDimensions { .. })
        ));
        assert!(matches!(
            GameState::new(6, 6, &[], 2, Some(0)),
            Err(GameError::BadPalette(2))
        ));
        assert!(matches!(
            GameState::new(6, 6, &[(6, 0, TileKind::Blank)], 4, Some(0)),
            Err(GameError::OverrideOutOfBounds { x: 6, y: 0 })
        ));
    }

    #[test]
    fn swap_off_the_board_is_rejected() {
        let mut game = GameState::new(6, 6, &[], 4, Some(2)).unwrap();
        let before = game.board().clone();
        assert_eq!(
            game.request_swap(5, 0, Direction::Right).unwrap(),
            SwapOutcome::Rejected
        );
        assert_eq!(
            game.request_swap(0, 0, Direction::Up).unwrap(),
            SwapOutcome::Rejected
        );
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn swap_into_blank_is_rejected() {
        let overrides = [(1, 0, TileKind::Blank)];
        let mut game = GameState::new(6, 6, &overrides, 4, Some(3)).unwrap();
        assert_eq!(
            game.request_swap(0, 0, Direction::Right).unwrap(),
            SwapOutcome::Rejected
        );
        assert_eq!(
            game.request_swap(1, 0, Direction::Down).unwrap(),
            SwapOutcome::Rejected
        );
    }

    #[test]
    fn no_match_swap_reverts_bit_for_bit() {
        let board = board_from(&[
            "121212", "212121", "121212", "212121", "121212", "212121",
        ]);
        let mut game = GameState::from_board(board, 4, 0);
        let before = game.board().clone();
        // A corner swap on a checkerboard never completes a run.
        let outcome = game.request_swap(0, 0, Direction::Right).unwrap();
        assert_eq!(outcome, SwapOutcome::RevertedNoMatch);
        assert_eq!(game.board(), &before);
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn four_match_vertical_swap_promotes_column_bomb() {
        let board = board_from(&[
            "121134", "314211", "142323", "234141", "412323", "231414",
        ]);
        let mut game = GameState::from_board(board, 4, 5);
        // (1,0) is 2, (1,1) is 1: swapping down completes 1111 in row 0.
        let outcome = game.request_swap(1, 0, Direction::Down).unwrap();
        assert!(matches!(outcome, SwapOutcome::Resolved(_)));
        let events = game.take_events();
        let bombs: Vec<&GameEvent> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BombCreated { .. }))
            .collect();
        assert_eq!(
            bombs,
            vec![&GameEvent::BombCreated {
                x: 1,
                y: 0,
                kind: PowerKind::ColumnClear
            }]
        );
        assert!(!deadlock::has_any_match(game.board()));
        assert!(playable_full(game.board()));
    }

    #[test]
    fn five_collinear_swap_promotes_color_bomb() {
        let board = board_from(&[
            "112114", "431214", "214343", "341212", "123434", "412123",
        ]);
        let mut game = GameState::from_board(board, 4, 5);
        // (2,1) is 1; swapping it up completes 11111 in row 0.
        let outcome = game.request_swap(2, 1, Direction::Up).unwrap();
        assert!(matches!(outcome, SwapOutcome::Resolved(_)));
        let events = game.take_events();
        assert!(events.contains(&GameEvent::BombCreated {
            x: 2,
            y: 0,
            kind: PowerKind::ColorClear
        }));
        assert!(!deadlock::has_any_match(game.board()));
    }

    #[test]
    fn color_bomb_swap_clears_partner_color() {
        let mut board = board_from(&[
            "121343", "214131", "132414", "341232", "213441", "434213",
        ]);
        board.get_mut(1, 1).unwrap().power = PowerKind::ColorClear;
        let mut game = GameState::from_board(board, 4, 11);
        // The bomb swaps right onto a colour-4 piece.
        let outcome = game.request_swap(1, 1, Direction::Right).unwrap();
        assert!(matches!(outcome, SwapOutcome::Resolved(_)));
        let events = game.take_events();
        let removed: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PieceRemoved { x, y } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        // The bomb (now at (2,1)) and every colour-4 piece, including the
        // partner that moved to (1,1), must be gone.
        for pos in [
            (2, 1),
            (4, 0),
            (1, 1),
            (3, 2),
            (5, 2),
            (1, 3),
            (3, 4),
            (4, 4),
            (0, 5),
            (2, 5),
        ] {
            assert!(removed.contains(&pos), "expected {pos:?} removed");
        }
        // A colour-bomb swap never mints a new bomb.
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::BombCreated { .. }))
        );
    }

    #[test]
    fn breakable_tile_takes_damage_across_cycles_then_goes_inert() {
        let overrides = [(0, 0, TileKind::Breakable { hit_points: 2 })];
        let board = board_from_layout(
            &["121212", "212121", "121212", "212121", "121212", "212121"],
            &overrides,
        );
        let mut game = GameState::from_board(board, 4, 21);

        // Cycle 1: force a removal at (0,0).
        game.board.get_mut(0, 0).unwrap().matched = true;
        game.resolve_cascades();
        let events = game.take_events();
        assert!(events.contains(&GameEvent::BreakableDamaged {
            x: 0,
            y: 0,
            remaining: 1
        }));
        assert_eq!(
            game.board().tile_kind(0, 0),
            TileKind::Breakable { hit_points: 1 }
        );

        // Cycle 2: the tile reaches zero and goes inert.
        game.board.get_mut(0, 0).unwrap().matched = true;
        game.resolve_cascades();
        let events = game.take_events();
        assert!(events.contains(&GameEvent::BreakableDamaged {
            x: 0,
            y: 0,
            remaining: 0
        }));
        assert_eq!(game.board().tile_kind(0, 0), TileKind::Default);

        // Cycle 3: damage past zero is impossible.
        game.board.get_mut(0, 0).unwrap().matched = true;
        game.resolve_cascades();
        let events = game.take_events();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::BreakableDamaged { .. }))
        );
    }

    #[test]
    fn collapse_skips_blank_cells() {
        // Column 0: pieces at y=0 and y=1, blank at y=2, empty below.
        let board = board_from_layout(&["13", "21", "..", ".2", ".1"], &[(0, 2, TileKind::Blank)]);
        let mut game = GameState::from_board(board, 4, 0);
        game.collapse_columns();
        let board = game.board();
        // The blank neither receives pieces nor blocks the fall past it.
        assert!(board.get(0, 2).is_none());
        assert_eq!(board.get(0, 4).unwrap().color, 2);
        assert_eq!(board.get(0, 3).unwrap().color, 1);
        assert!(board.get(0, 0).is_none());
        assert!(board.get(0, 1).is_none());
        let events = game.take_events();
        assert!(events.contains(&GameEvent::PieceDropped {
            x: 0,
            from_y: 1,
            to_y: 4
        }));
        assert!(events.contains(&GameEvent::PieceDropped {
            x: 0,
            from_y: 0,
            to_y: 3
        }));
    }

    #[test]
    fn cascades_terminate_and_keep_invariants() {
        for seed in [7u64, 19, 33] {
            let overrides = [(1, 1, TileKind::Blank), (4, 3, TileKind::Blank)];
            let mut game = GameState::new(6, 6, &overrides, 4, Some(seed)).unwrap();
            game.take_events();
            let SwapOutcome::Resolved(snapshot) = first_resolved_swap(&mut game) else {
                unreachable!();
            };
            assert_eq!(&snapshot, game.board());
            assert!(blanks_empty(game.board()), "seed {seed}");
            assert!(playable_full(game.board()), "seed {seed}");
            assert!(!game.board().any_matched(), "seed {seed}");
            let events = game.take_events();
            assert_eq!(events.last(), Some(&GameEvent::BoardSettled));
        }
    }

    #[test]
    fn deadlocked_board_gets_reshuffled() {
        // Diagonal stripes over 3 colours admit no matching swap at all.
        let mut board = Board::new(5, 5, &[]);
        for y in 0..5 {
            for x in 0..5 {
                board.place(x, y, Piece::new(((x + 2 * y) % 3) as u8, x, y));
            }
        }
        let mut game = GameState::from_board(board, 3, 4);
        assert!(deadlock::is_deadlocked(game.board()));
        game.break_deadlock().unwrap();
        assert!(!deadlock::is_deadlocked(game.board()));
        assert!(!deadlock::has_any_match(game.board()));
        assert!(game.take_events().contains(&GameEvent::BoardReshuffled));
        assert!(playable_full(game.board()));
    }
}
