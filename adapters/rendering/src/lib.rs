#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for maze-painter adapters.
//!
//! Concrete frontends implement [`Presenter`] and receive a [`Scene`] per
//! frame; the scene carries the actor's pixel position, the camera offset
//! derived from it, and the paint counters. Nothing in this crate touches
//! world state directly.

use anyhow::Result as AnyResult;
use glam::Vec2;
use maze_painter_core::{CompletionSummary, PlayerSnapshot};
use std::{error::Error, fmt};

/// Describes the pixel metrics of the level board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardPresentation {
    columns: u32,
    rows: u32,
    tile_length: f32,
}

impl BoardPresentation {
    /// Creates a new board descriptor.
    ///
    /// Returns an error when `tile_length` is not strictly positive.
    pub fn new(columns: u32, rows: u32, tile_length: f32) -> Result<Self, RenderingError> {
        if tile_length <= 0.0 {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
        })
    }

    /// Number of columns contained in the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile in pixels.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the board in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the board in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Pixel center of a continuous cell-space position.
    #[must_use]
    pub fn cell_center(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new((x + 0.5) * self.tile_length, (y + 0.5) * self.tile_length)
    }
}

/// Rectangular window the scene is framed into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Creates a new viewport descriptor.
    ///
    /// Returns an error when either extent is not strictly positive.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(RenderingError::InvalidViewport { width, height });
        }

        Ok(Self { width, height })
    }

    /// Width of the viewport in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the viewport in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Viewport offset that keeps the actor framed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    offset: Vec2,
}

impl CameraFrame {
    /// Derives the offset that centers `focus` in the viewport.
    ///
    /// On any axis where the board is smaller than the viewport, the offset
    /// centers the whole board instead of tracking the focus.
    #[must_use]
    pub fn follow(focus: Vec2, viewport: Viewport, board: BoardPresentation) -> Self {
        let mut offset = Vec2::new(
            viewport.width() / 2.0 - focus.x,
            viewport.height() / 2.0 - focus.y,
        );

        if board.width() < viewport.width() {
            offset.x = (viewport.width() - board.width()) / 2.0;
        }
        if board.height() < viewport.height() {
            offset.y = (viewport.height() - board.height()) / 2.0;
        }

        Self { offset }
    }

    /// Offset applied to board-space positions before drawing.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Projects a board-space pixel position into viewport space.
    #[must_use]
    pub fn project(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }
}

/// Declarative frame description handed to presenters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scene {
    /// Actor position in board-space pixels.
    pub player: Vec2,
    /// Raw progress of the active slide, clamped to [0, 1].
    pub progress: f32,
    /// Whether a slide is currently animating.
    pub moving: bool,
    /// Camera offset framing the actor within the viewport.
    pub camera: CameraFrame,
    /// Number of painted cells.
    pub painted: u32,
    /// Number of walkable cells in the level.
    pub total: u32,
}

impl Scene {
    /// Composes a frame from the world's render snapshot.
    #[must_use]
    pub fn compose(
        snapshot: PlayerSnapshot,
        completion: CompletionSummary,
        board: BoardPresentation,
        viewport: Viewport,
    ) -> Self {
        let player = board.cell_center(snapshot.x, snapshot.y);
        Self {
            player,
            progress: snapshot.progress,
            moving: snapshot.moving,
            camera: CameraFrame::follow(player, viewport, board),
            painted: completion.painted,
            total: completion.total,
        }
    }
}

/// Frontend seam that consumes composed scenes.
///
/// Presenter failure is the frontend's problem; callers log and drop the
/// error without touching gameplay state.
pub trait Presenter {
    /// Presents a single composed frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors surfaced while constructing presentation descriptors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderingError {
    /// The provided tile length cannot produce a drawable board.
    InvalidTileLength {
        /// Tile length passed to the constructor.
        tile_length: f32,
    },
    /// The provided viewport extents cannot frame a scene.
    InvalidViewport {
        /// Viewport width passed to the constructor.
        width: f32,
        /// Viewport height passed to the constructor.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile_length must be positive (received {tile_length})")
            }
            Self::InvalidViewport { width, height } => {
                write!(
                    f,
                    "viewport extents must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
