//! Board: grid of optional gem pieces plus the static tile layout.

/// Swap direction requested by the player. `Up` is toward row 0 (screen up).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// (dx, dy) offset of the neighbouring cell.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// True for Left/Right swaps.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Static per-cell layout. `Blank` cells never hold pieces; `Breakable` cells
/// absorb one hit per matched removal until their hit points run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Default,
    Blank,
    Breakable { hit_points: u8 },
}

/// Power carried by a gem. Anything but `None` expands its match's blast area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerKind {
    None,
    RowClear,
    ColumnClear,
    AreaClear,
    ColorClear,
}

/// A single gem. `x`/`y` mirror the owning cell; `matched` is transient and
/// only set while the piece is queued for removal in the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub color: u8,
    pub x: usize,
    pub y: usize,
    pub power: PowerKind,
    pub matched: bool,
}

impl Piece {
    pub fn new(color: u8, x: usize, y: usize) -> Self {
        Self {
            color,
            x,
            y,
            power: PowerKind::None,
            matched: false,
        }
    }
}

/// Grid of cells in row-major order. y=0 is the top row; gravity pulls
/// pieces toward larger y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    cells: Vec<Option<Piece>>,
    layout: Vec<TileKind>,
}

impl Board {
    /// Empty board with the given tile overrides; everything else `Default`.
    /// Overrides outside the grid are a configuration bug and panic.
    pub fn new(width: usize, height: usize, overrides: &[(usize, usize, TileKind)]) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be positive");
        let mut layout = vec![TileKind::Default; width * height];
        for &(x, y, kind) in overrides {
            assert!(
                x < width && y < height,
                "layout override out of bounds: ({x}, {y})"
            );
            layout[y * width + x] = kind;
        }
        Self {
            width,
            height,
            cells: vec![None; width * height],
            layout,
        }
    }

    /// Flat index for (x, y). Out-of-range access is a programming error.
    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "board access out of bounds: ({x}, {y})"
        );
        y * self.width + x
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Neighbouring in-bounds cell in `dir`, if any.
    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dx, dy) = dir.delta();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        self.contains(nx, ny).then_some((nx, ny))
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&Piece> {
        self.cells[self.index(x, y)].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Piece> {
        let i = self.index(x, y);
        self.cells[i].as_mut()
    }

    #[inline]
    pub fn tile_kind(&self, x: usize, y: usize) -> TileKind {
        self.layout[self.index(x, y)]
    }

    /// A Blank cell is permanently excluded from gameplay.
    #[inline]
    pub fn is_playable(&self, x: usize, y: usize) -> bool {
        self.tile_kind(x, y) != TileKind::Blank
    }

    /// Put `piece` into (x, y), syncing its position fields. The cell must be
    /// playable and empty; anything else is an internal invariant violation.
    pub fn place(&mut self, x: usize, y: usize, mut piece: Piece) {
        let i = self.index(x, y);
        assert!(
            self.layout[i] != TileKind::Blank,
            "piece placed on blank cell ({x}, {y})"
        );
        assert!(self.cells[i].is_none(), "cell ({x}, {y}) already occupied");
        piece.x = x;
        piece.y = y;
        self.cells[i] = Some(piece);
    }

    /// Remove and return the piece at (x, y), leaving the cell empty.
    pub fn take(&mut self, x: usize, y: usize) -> Option<Piece> {
        let i = self.index(x, y);
        self.cells[i].take()
    }

    /// Exchange the contents of two cells, keeping piece positions in sync.
    pub fn swap(&mut self, ax: usize, ay: usize, bx: usize, by: usize) {
        let ia = self.index(ax, ay);
        let ib = self.index(bx, by);
        self.cells.swap(ia, ib);
        if let Some(p) = self.cells[ia].as_mut() {
            p.x = ax;
            p.y = ay;
        }
        if let Some(p) = self.cells[ib].as_mut() {
            p.x = bx;
            p.y = by;
        }
    }

    /// Damage the breakable tile under (x, y), if any. Returns the remaining
    /// hit points after the hit. At zero the cell reverts to `Default`, so it
    /// can never be damaged again.
    pub fn damage_tile(&mut self, x: usize, y: usize) -> Option<u8> {
        let i = self.index(x, y);
        if let TileKind::Breakable { hit_points } = self.layout[i] {
            let remaining = hit_points.saturating_sub(1);
            self.layout[i] = if remaining == 0 {
                TileKind::Default
            } else {
                TileKind::Breakable {
                    hit_points: remaining,
                }
            };
            Some(remaining)
        } else {
            None
        }
    }

    /// All (x, y) positions, row by row.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y)))
    }

    pub fn any_matched(&self) -> bool {
        self.cells.iter().flatten().any(|p| p.matched)
    }

    pub fn matched_positions(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .flatten()
            .filter(|p| p.matched)
            .map(|p| (p.x, p.y))
            .collect()
    }
}
