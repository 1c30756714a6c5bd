//! Bomb classification: which power (if any) a swap's match earns.

use crate::board::{Board, PowerKind};
use crate::matches::{MatchSet, SwapContext};
use rand::Rng;

/// Decide bomb promotions for a player-triggered match and apply them.
/// A promoted piece has its `matched` flag cleared so it survives removal and
/// stays on the board carrying its new power. Returns the promotions made,
/// in endpoint order, for event emission.
///
/// Sizes 4 and 7 upgrade each matched swap endpoint (that has no power yet)
/// to a row or column bomb oriented by the swap axis; sizes 5 and 8 upgrade
/// the first matched endpoint to a colour bomb when at least five of the
/// match share a single row or column, and to an area bomb otherwise. Any
/// other size earns nothing. Cascade cycles never call this.
pub fn classify(
    board: &mut Board,
    set: &MatchSet,
    ctx: &SwapContext,
    rng: &mut impl Rng,
) -> Vec<((usize, usize), PowerKind)> {
    let mut promoted = Vec::new();
    match set.len() {
        4 | 7 => {
            let kind = oriented_kind(ctx, rng);
            for pos in [ctx.a, ctx.b] {
                if let Some(p) = board.get_mut(pos.0, pos.1) {
                    if p.matched && p.power == PowerKind::None {
                        p.matched = false;
                        p.power = kind;
                        promoted.push((pos, kind));
                    }
                }
            }
        }
        5 | 8 => {
            let kind = if is_collinear(set) {
                PowerKind::ColorClear
            } else {
                PowerKind::AreaClear
            };
            for pos in [ctx.a, ctx.b] {
                if let Some(p) = board.get_mut(pos.0, pos.1) {
                    if p.matched {
                        // A piece that already is this bomb stays matched and
                        // is simply destroyed.
                        if p.power != kind {
                            p.matched = false;
                            p.power = kind;
                            promoted.push((pos, kind));
                        }
                        break;
                    }
                }
            }
        }
        _ => {}
    }
    promoted
}

/// Row bomb for a horizontal swap, column bomb for a vertical one. A trigger
/// with no directional bias keeps the original's uniform draw over [0, 100).
fn oriented_kind(ctx: &SwapContext, rng: &mut impl Rng) -> PowerKind {
    let horizontal = ctx
        .horizontal
        .unwrap_or_else(|| rng.gen_range(0..100) < 50);
    if horizontal {
        PowerKind::RowClear
    } else {
        PowerKind::ColumnClear
    }
}

/// True when at least five matched positions share one row or one column.
fn is_collinear(set: &MatchSet) -> bool {
    let mut row_counts = std::collections::HashMap::new();
    let mut col_counts = std::collections::HashMap::new();
    for (x, y) in set.iter() {
        *row_counts.entry(y).or_insert(0u32) += 1;
        *col_counts.entry(x).or_insert(0u32) += 1;
    }
    row_counts.values().chain(col_counts.values()).any(|&n| n >= 5)
}
