//! Match detection: runs of 3+ same-coloured gems and bomb blast expansion.

use crate::board::{Board, PowerKind};
use std::collections::{HashSet, VecDeque};

/// The two endpoints of the swap that triggered the current cycle, with the
/// colour of the piece now sitting at each. A `ColorClear` bomb's blast is
/// defined by the *other* endpoint's colour, so detection needs this context;
/// cascade-triggered cycles run without it.
#[derive(Debug, Clone, Copy)]
pub struct SwapContext {
    pub a: (usize, usize),
    pub b: (usize, usize),
    /// Colour of the piece at `a` (post-swap).
    pub a_color: u8,
    /// Colour of the piece at `b` (post-swap).
    pub b_color: u8,
    /// `Some(true)` for a horizontal swap, `Some(false)` for vertical,
    /// `None` when the trigger had no directional bias.
    pub horizontal: Option<bool>,
}

impl SwapContext {
    /// Colour of the endpoint opposite `pos`, if `pos` is an endpoint.
    fn other_color(&self, pos: (usize, usize)) -> Option<u8> {
        if pos == self.a {
            Some(self.b_color)
        } else if pos == self.b {
            Some(self.a_color)
        } else {
            None
        }
    }
}

/// Positions matched in one resolution step. Recomputed every cycle; a piece
/// joins at most once however many triples or blasts touch it.
#[derive(Debug, Default)]
pub struct MatchSet {
    positions: HashSet<(usize, usize)>,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: (usize, usize)) -> bool {
        self.positions.contains(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.positions.iter().copied()
    }
}

/// Scan the whole board for horizontal and vertical triples, mark every piece
/// in a run `matched`, then expand bombs breadth-first until the set is
/// closed. When `ctx` names a `ColorClear` endpoint, that bomb is seeded into
/// the set so its colour blast (and anything it chains into) resolves here.
pub fn find_matches(board: &mut Board, ctx: Option<&SwapContext>) -> MatchSet {
    let mut set = MatchSet::default();
    let mut queue = VecDeque::new();

    if let Some(ctx) = ctx {
        for pos in [ctx.a, ctx.b] {
            let is_color_bomb = board
                .get(pos.0, pos.1)
                .is_some_and(|p| p.power == PowerKind::ColorClear);
            if is_color_bomb {
                mark(board, pos, &mut set, &mut queue);
            }
        }
    }

    for (x, y) in board.positions().collect::<Vec<_>>() {
        let Some(color) = board.get(x, y).map(|p| p.color) else {
            continue;
        };
        if x > 0 && x + 1 < board.width {
            let left = board.get(x - 1, y).map(|p| p.color);
            let right = board.get(x + 1, y).map(|p| p.color);
            if left == Some(color) && right == Some(color) {
                for pos in [(x - 1, y), (x, y), (x + 1, y)] {
                    mark(board, pos, &mut set, &mut queue);
                }
            }
        }
        if y > 0 && y + 1 < board.height {
            let up = board.get(x, y - 1).map(|p| p.color);
            let down = board.get(x, y + 1).map(|p| p.color);
            if up == Some(color) && down == Some(color) {
                for pos in [(x, y - 1), (x, y), (x, y + 1)] {
                    mark(board, pos, &mut set, &mut queue);
                }
            }
        }
    }

    // Transitive blast expansion. Bounded: every iteration either drains the
    // queue or adds a never-before-seen position, and there are width*height
    // of those at most.
    while let Some(pos) = queue.pop_front() {
        for blast in blast_area(board, pos, ctx) {
            mark(board, blast, &mut set, &mut queue);
        }
    }

    set
}

fn mark(
    board: &mut Board,
    pos: (usize, usize),
    set: &mut MatchSet,
    queue: &mut VecDeque<(usize, usize)>,
) {
    if !set.positions.insert(pos) {
        return;
    }
    if let Some(p) = board.get_mut(pos.0, pos.1) {
        p.matched = true;
    }
    queue.push_back(pos);
}

/// Occupied cells hit by the power (if any) of the piece at `pos`.
fn blast_area(
    board: &Board,
    pos: (usize, usize),
    ctx: Option<&SwapContext>,
) -> Vec<(usize, usize)> {
    let (x, y) = pos;
    let Some(piece) = board.get(x, y) else {
        return Vec::new();
    };
    match piece.power {
        PowerKind::None => Vec::new(),
        PowerKind::RowClear => (0..board.width)
            .filter(|&cx| board.get(cx, y).is_some())
            .map(|cx| (cx, y))
            .collect(),
        PowerKind::ColumnClear => (0..board.height)
            .filter(|&cy| board.get(x, cy).is_some())
            .map(|cy| (x, cy))
            .collect(),
        PowerKind::AreaClear => {
            let x0 = x.saturating_sub(1);
            let y0 = y.saturating_sub(1);
            let x1 = (x + 1).min(board.width - 1);
            let y1 = (y + 1).min(board.height - 1);
            let mut out = Vec::new();
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    if board.get(cx, cy).is_some() {
                        out.push((cx, cy));
                    }
                }
            }
            out
        }
        PowerKind::ColorClear => {
            // The blast colour comes from the swap partner; a colour bomb
            // caught in a cascade has no partner and just dies.
            let Some(target) = ctx.and_then(|c| c.other_color(pos)) else {
                return Vec::new();
            };
            board
                .positions()
                .filter(|&(cx, cy)| board.get(cx, cy).is_some_and(|p| p.color == target))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PowerKind;
    use crate::testutil::board_from;

    #[test]
    fn horizontal_triple_marks_all_three() {
        let mut board = board_from(&["111.", "2323", "3232"]);
        let set = find_matches(&mut board, None);
        assert_eq!(set.len(), 3);
        for x in 0..3 {
            assert!(board.get(x, 0).unwrap().matched);
        }
        assert!(!board.get(0, 1).unwrap().matched);
    }

    #[test]
    fn vertical_run_of_four_is_fully_marked() {
        let mut board = board_from(&["123", "132", "123", "121", "212"]);
        let set = find_matches(&mut board, None);
        assert_eq!(set.len(), 4);
        for y in 0..4 {
            assert!(set.contains((0, y)));
        }
    }

    #[test]
    fn overlapping_runs_union_without_duplicates() {
        // L shape: horizontal triple and vertical triple sharing a corner.
        let mut board = board_from(&["111", "122", "132"]);
        let set = find_matches(&mut board, None);
        assert_eq!(set.len(), 5);
        assert!(set.contains((0, 0)));
        assert!(set.contains((0, 2)));
    }

    #[test]
    fn no_match_on_scattered_board() {
        let mut board = board_from(&["1212", "2121", "1212"]);
        let set = find_matches(&mut board, None);
        assert!(set.is_empty());
        assert!(!board.any_matched());
    }

    #[test]
    fn row_bomb_in_match_clears_its_row() {
        let mut board = board_from(&["1112", "3123", "2312"]);
        board.get_mut(1, 0).unwrap().power = PowerKind::RowClear;
        let set = find_matches(&mut board, None);
        assert_eq!(set.len(), 4);
        assert!(set.contains((3, 0)));
        assert!(board.get(3, 0).unwrap().matched);
    }

    #[test]
    fn blast_expansion_is_transitive() {
        // Row bomb's row contains a column bomb; both blasts must fire.
        let mut board = board_from(&["1113", "3123", "2312"]);
        board.get_mut(1, 0).unwrap().power = PowerKind::RowClear;
        board.get_mut(3, 0).unwrap().power = PowerKind::ColumnClear;
        let set = find_matches(&mut board, None);
        assert!(set.contains((3, 1)));
        assert!(set.contains((3, 2)));
    }

    #[test]
    fn area_bomb_clears_clamped_neighbourhood() {
        let mut board = board_from(&["1112", "3123", "2312"]);
        board.get_mut(0, 0).unwrap().power = PowerKind::AreaClear;
        let set = find_matches(&mut board, None);
        assert!(set.contains((0, 1)));
        assert!(set.contains((1, 1)));
        assert!(!set.contains((2, 1)));
    }

    #[test]
    fn color_bomb_without_swap_context_has_no_blast() {
        let mut board = board_from(&["1112", "3223", "2332"]);
        board.get_mut(1, 0).unwrap().power = PowerKind::ColorClear;
        let set = find_matches(&mut board, None);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn color_bomb_endpoint_clears_partner_color() {
        let mut board = board_from(&["1232", "3123", "2312"]);
        board.get_mut(0, 0).unwrap().power = PowerKind::ColorClear;
        let ctx = SwapContext {
            a: (0, 0),
            b: (1, 0),
            a_color: 1,
            b_color: 2,
            horizontal: Some(true),
        };
        let set = find_matches(&mut board, Some(&ctx));
        // Every colour-2 piece plus the bomb itself.
        let twos = board
            .positions()
            .filter(|&(x, y)| board.get(x, y).is_some_and(|p| p.color == 2))
            .count();
        assert_eq!(set.len(), twos + 1);
        assert!(set.contains((0, 0)));
    }
}
