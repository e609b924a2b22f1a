//! Level grid normalization and walkability queries.

use maze_painter_core::{CellCoord, CellKind, LevelSpec};

const DEFAULT_START: CellCoord = CellCoord::new(1, 1);

/// Immutable cell matrix derived from a level specification.
///
/// Construction repairs malformed input deterministically: ragged rows are
/// padded with walls, unknown cell codes decode to walls, a missing start
/// defaults to (1, 1), and a missing goal synthesizes the bottom-right
/// interior cell. An empty matrix degenerates to a 0×0 grid with zero
/// walkable cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    start: CellCoord,
    goal: CellCoord,
    total_walkable: u32,
}

impl Grid {
    /// Creates the degenerate empty grid used before any level loads.
    #[must_use]
    pub(crate) fn empty() -> Self {
        Self {
            columns: 0,
            rows: 0,
            cells: Vec::new(),
            start: DEFAULT_START,
            goal: CellCoord::new(0, 0),
            total_walkable: 0,
        }
    }

    /// Builds a normalized grid from the wire-format level description.
    #[must_use]
    pub(crate) fn from_spec(spec: &LevelSpec) -> Self {
        let rows_u = spec.grid.len();
        let columns_u = spec.grid.iter().map(Vec::len).max().unwrap_or(0);
        let rows = u32::try_from(rows_u).unwrap_or(u32::MAX);
        let columns = u32::try_from(columns_u).unwrap_or(u32::MAX);

        if rows == 0 || columns == 0 {
            return Self::empty();
        }

        let mut cells = Vec::with_capacity(rows_u * columns_u);
        let mut total_walkable = 0u32;
        let mut located_goal = None;
        for (y, row) in spec.grid.iter().enumerate() {
            for x in 0..columns_u {
                let kind = row.get(x).copied().map_or(CellKind::Wall, CellKind::from_code);
                if kind.is_walkable() {
                    total_walkable = total_walkable.saturating_add(1);
                }
                if kind == CellKind::Goal && located_goal.is_none() {
                    located_goal = Some(CellCoord::new(x as u32, y as u32));
                }
                cells.push(kind);
            }
        }

        let start = spec.start.map_or(DEFAULT_START, |coord| {
            CellCoord::new(clamp_component(coord.x), clamp_component(coord.y))
        });
        let goal = located_goal.unwrap_or_else(|| {
            CellCoord::new(columns.saturating_sub(2), rows.saturating_sub(2))
        });

        Self {
            columns,
            rows,
            cells,
            start,
            goal,
            total_walkable,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Normalized starting cell of the actor.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Goal cell, located in the matrix or synthesized during load.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Number of walkable cells that must be painted to win.
    #[must_use]
    pub const fn total_walkable(&self) -> u32 {
        self.total_walkable
    }

    /// Kind of the cell at the provided coordinate, if it is in bounds.
    #[must_use]
    pub fn kind_at(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the actor may enter the provided cell.
    ///
    /// Out-of-bounds coordinates are never walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.kind_at(cell).is_some_and(CellKind::is_walkable)
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.columns && cell.y() < self.rows {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

fn clamp_component(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
