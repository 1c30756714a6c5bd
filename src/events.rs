//! Events emitted by the engine for the presentation layer.
//!
//! Display-only: the front-end uses these to show what happened, never to
//! drive correctness. The engine pushes, the app drains.

use crate::board::PowerKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A matched gem left the board.
    PieceRemoved { x: usize, y: usize },
    /// A gem fell within its column during collapse.
    PieceDropped { x: usize, from_y: usize, to_y: usize },
    /// An empty playable cell received a fresh gem.
    PieceRefilled { x: usize, y: usize, color: u8 },
    /// A swap endpoint was promoted instead of removed.
    BombCreated { x: usize, y: usize, kind: PowerKind },
    /// A breakable tile absorbed a hit.
    BreakableDamaged { x: usize, y: usize, remaining: u8 },
    /// The deadlocked board was redistributed.
    BoardReshuffled,
    /// A resolution cycle finished; the board is stable and accepting input.
    BoardSettled,
}
