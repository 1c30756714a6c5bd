//! Deadlock detection and board reshuffling.

use crate::board::{Board, PowerKind};
use rand::Rng;
use rand::seq::SliceRandom;

/// True iff no single adjacent swap can produce a match. Exhaustive: every
/// playable cell is trial-swapped with its right and down neighbours (that
/// covers every adjacent pair once) on a scratch copy of the board.
pub fn is_deadlocked(board: &Board) -> bool {
    let mut trial = board.clone();
    for y in 0..board.height {
        for x in 0..board.width {
            if !board.is_playable(x, y) || board.get(x, y).is_none() {
                continue;
            }
            for (nx, ny) in [(x + 1, y), (x, y + 1)] {
                if !board.contains(nx, ny)
                    || !board.is_playable(nx, ny)
                    || board.get(nx, ny).is_none()
                {
                    continue;
                }
                // A colour bomb swapped with any occupied neighbour always
                // clears that neighbour's colour.
                let color_bomb = board.get(x, y).is_some_and(|p| p.power == PowerKind::ColorClear)
                    || board
                        .get(nx, ny)
                        .is_some_and(|p| p.power == PowerKind::ColorClear);
                if color_bomb {
                    return false;
                }
                trial.swap(x, y, nx, ny);
                let matched = has_any_match(&trial);
                trial.swap(x, y, nx, ny);
                if matched {
                    return false;
                }
            }
        }
    }
    true
}

/// Cheap triple scan: does any horizontal or vertical run of 3+ exist?
pub fn has_any_match(board: &Board) -> bool {
    for y in 0..board.height {
        for x in 0..board.width {
            let Some(color) = board.get(x, y).map(|p| p.color) else {
                continue;
            };
            if x + 2 < board.width
                && board.get(x + 1, y).map(|p| p.color) == Some(color)
                && board.get(x + 2, y).map(|p| p.color) == Some(color)
            {
                return true;
            }
            if y + 2 < board.height
                && board.get(x, y + 1).map(|p| p.color) == Some(color)
                && board.get(x, y + 2).map(|p| p.color) == Some(color)
            {
                return true;
            }
        }
    }
    false
}

/// Pool every piece on a playable cell, forget its position, and deal the
/// pool back out in random order. The caller re-checks deadlock (and match)
/// state; one reshuffle carries no guarantee.
pub fn reshuffle(board: &mut Board, rng: &mut impl Rng) {
    let cells: Vec<(usize, usize)> = board
        .positions()
        .filter(|&(x, y)| board.is_playable(x, y))
        .collect();
    let mut pool = Vec::with_capacity(cells.len());
    for &(x, y) in &cells {
        if let Some(piece) = board.take(x, y) {
            pool.push(piece);
        }
    }
    pool.shuffle(rng);
    for (piece, &(x, y)) in pool.into_iter().zip(cells.iter()) {
        board.place(x, y, piece);
    }
}
