//! Test helpers: build boards from ascii art.

use crate::board::{Board, Piece, TileKind};

/// Build an all-`Default` board from rows of digits; `.` leaves a cell empty.
/// Row 0 is the top of the board.
pub fn board_from(rows: &[&str]) -> Board {
    board_from_layout(rows, &[])
}

/// Same as [`board_from`] but with tile overrides. Overridden `Blank` cells
/// must be `.` in the ascii art.
pub fn board_from_layout(rows: &[&str], overrides: &[(usize, usize, TileKind)]) -> Board {
    let height = rows.len();
    let width = rows[0].len();
    let mut board = Board::new(width, height, overrides);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), width, "ragged test board");
        for (x, ch) in row.chars().enumerate() {
            if ch == '.' {
                continue;
            }
            let color = ch.to_digit(10).expect("test cells are digits or '.'") as u8;
            board.place(x, y, Piece::new(color, x, y));
        }
    }
    board
}
