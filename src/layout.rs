//! Layout files: per-cell tile overrides for the board.
//!
//! Plain text, one override per line: `x y blank` or `x y breakable <hp>`.
//! Blank lines and `#` comments are skipped. Cells not named default to a
//! normal playable tile.

use crate::board::TileKind;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected `x y blank` or `x y breakable <hp>`, got {text:?}")]
    Malformed { line: usize, text: String },
    #[error("line {line}: unknown tile kind {kind:?}")]
    UnknownKind { line: usize, kind: String },
    #[error("line {line}: breakable hit points must be 1..=9, got {hp}")]
    BadHitPoints { line: usize, hp: String },
    #[error("line {line}: duplicate override for cell ({x}, {y})")]
    Duplicate { line: usize, x: usize, y: usize },
}

/// Read tile overrides from `path`. Bounds against the board are checked by
/// the game on construction, not here.
pub fn load(path: &Path) -> Result<Vec<(usize, usize, TileKind)>, LayoutError> {
    parse(&std::fs::read_to_string(path)?)
}

pub fn parse(s: &str) -> Result<Vec<(usize, usize, TileKind)>, LayoutError> {
    let mut overrides: Vec<(usize, usize, TileKind)> = Vec::new();
    for (idx, raw) in s.lines().enumerate() {
        let line = idx + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let mut fields = text.split_whitespace();
        let malformed = || LayoutError::Malformed {
            line,
            text: text.to_string(),
        };
        let x: usize = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(malformed)?;
        let y: usize = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(malformed)?;
        let kind = match fields.next().ok_or_else(malformed)? {
            "blank" => TileKind::Blank,
            "breakable" => {
                let hp = fields.next().ok_or_else(malformed)?;
                let hit_points: u8 = hp.parse().map_err(|_| LayoutError::BadHitPoints {
                    line,
                    hp: hp.to_string(),
                })?;
                if !(1..=9).contains(&hit_points) {
                    return Err(LayoutError::BadHitPoints {
                        line,
                        hp: hp.to_string(),
                    });
                }
                TileKind::Breakable { hit_points }
            }
            other => {
                return Err(LayoutError::UnknownKind {
                    line,
                    kind: other.to_string(),
                });
            }
        };
        if fields.next().is_some() {
            return Err(malformed());
        }
        if overrides.iter().any(|&(ox, oy, _)| (ox, oy) == (x, y)) {
            return Err(LayoutError::Duplicate { line, x, y });
        }
        overrides.push((x, y, kind));
    }
    Ok(overrides)
}
