#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the maze-painter engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond with derived records such as progress-save
//! requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Classification of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Impassable cell; the actor never enters or paints it.
    Wall,
    /// Ordinary walkable cell that counts toward level completion.
    Floor,
    /// Walkable cell highlighted as the level's goal marker.
    Goal,
}

impl CellKind {
    /// Decodes the wire representation used by level specifications.
    ///
    /// Unrecognized codes repair to [`CellKind::Wall`] so malformed level
    /// data degrades to an impassable cell instead of an error.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Floor,
            2 => Self::Goal,
            _ => Self::Wall,
        }
    }

    /// Reports whether the actor may enter and paint this cell.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Goal)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the neighboring cell one step in the provided direction.
    ///
    /// Stepping below zero on either axis yields `None` rather than
    /// wrapping; upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.as_vector();
        let x = checked_offset(self.x, dx)?;
        let y = checked_offset(self.y, dy)?;
        Some(Self::new(x, y))
    }
}

fn checked_offset(value: u32, delta: i32) -> Option<u32> {
    if delta.is_negative() {
        value.checked_sub(delta.unsigned_abs())
    } else {
        value.checked_add(delta.unsigned_abs())
    }
}

/// Cardinal movement directions available to the actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Translates a raw `(dx, dy)` intent into a direction.
    ///
    /// Only the four unit vectors are accepted; diagonal or zero vectors
    /// yield `None` and must be dropped by the caller as a silent no-op.
    #[must_use]
    pub const fn from_vector(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }

    /// Unit vector representation of the direction.
    #[must_use]
    pub const fn as_vector(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Monotonic timestamp sampled from the external frame clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameTime(Duration);

impl FrameTime {
    /// Timestamp at the origin of the frame clock.
    pub const ZERO: FrameTime = FrameTime(Duration::ZERO);

    /// Creates a timestamp from whole milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Creates a timestamp from a duration since the clock origin.
    #[must_use]
    pub const fn from_duration(since_origin: Duration) -> Self {
        Self(since_origin)
    }

    /// Elapsed time since `earlier`, saturating to zero on clock jitter.
    #[must_use]
    pub fn since(self, earlier: FrameTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    /// Whole milliseconds since the clock origin.
    #[must_use]
    pub const fn as_millis(self) -> u128 {
        self.0.as_millis()
    }
}

/// Unique identifier assigned to a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Wire format of a level handed to the engine by external tooling.
///
/// `grid` carries cell codes (0 = Floor, 1 = Wall, 2 = Goal); rows may be
/// ragged and are padded with walls at load. `start` and `id` are optional
/// and repair to (1, 1) and 1 respectively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Optional numeric identifier used in completion and save records.
    #[serde(default)]
    pub id: Option<u32>,
    /// Row-major matrix of cell codes.
    pub grid: Vec<Vec<u8>>,
    /// Optional starting coordinate of the actor.
    #[serde(default)]
    pub start: Option<StartCoord>,
}

/// Starting coordinate as it appears in level specifications.
///
/// Components are signed on the wire; negative values clamp to zero during
/// normalization rather than failing the parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCoord {
    /// Column index of the starting cell.
    pub x: i64,
    /// Row index of the starting cell.
    pub y: i64,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Tears down and rebuilds the level state from the provided spec.
    LoadLevel {
        /// Wire-format level description, normalized during load.
        spec: LevelSpec,
    },
    /// Requests that the actor slide one axis-aligned run in a direction.
    RequestMove {
        /// Direction of the requested slide.
        direction: Direction,
    },
    /// Advances the animation clock to the provided frame timestamp.
    Tick {
        /// Timestamp sampled from the external frame clock.
        now: FrameTime,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level finished loading and normalization.
    LevelLoaded {
        /// Identifier of the loaded level.
        level: LevelId,
        /// Normalized starting cell of the actor.
        start: CellCoord,
        /// Number of walkable cells that must be painted to win.
        total_walkable: u32,
    },
    /// Announces that the actor began sliding toward a target cell.
    SlideStarted {
        /// Cell the actor occupied when the slide began.
        from: CellCoord,
        /// Last walkable cell before the obstruction that ends the slide.
        to: CellCoord,
        /// Animation duration derived from the slide distance.
        duration: Duration,
    },
    /// Confirms that a walkable cell was painted for the first time.
    CellPainted {
        /// Cell that transitioned to the painted state.
        cell: CellCoord,
    },
    /// Announces that the active slide reached its target.
    SlideFinished {
        /// Cell the actor landed on.
        at: CellCoord,
    },
    /// Fires exactly once per level instance when every walkable cell is
    /// painted.
    LevelCompleted {
        /// Identifier of the completed level.
        level: LevelId,
        /// Number of painted cells at completion time.
        painted: u32,
        /// Number of walkable cells in the level.
        total: u32,
    },
}

/// Per-frame render state consumed by presentation adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Animated column position in continuous cell units.
    pub x: f32,
    /// Animated row position in continuous cell units.
    pub y: f32,
    /// Raw (un-eased) progress of the active slide, clamped to [0, 1].
    pub progress: f32,
    /// Whether a slide is currently in flight.
    pub moving: bool,
}

/// Aggregate paint progress for the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionSummary {
    /// Number of cells painted so far.
    pub painted: u32,
    /// Number of walkable cells in the level.
    pub total: u32,
    /// Whether every walkable cell has been painted.
    pub complete: bool,
}

/// Identity of the player driving the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerIdentity {
    /// Anonymous player; progress is never persisted.
    Guest,
    /// Authenticated player eligible for progress persistence.
    SignedIn {
        /// Display name reported by the account service.
        username: String,
        /// Stable account identifier reported by the account service.
        uid: String,
    },
}

impl PlayerIdentity {
    /// Reports whether the identity is the anonymous guest.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

/// Fire-and-forget progress record handed to an external transport.
///
/// The engine never retries or awaits delivery; transport failure must stay
/// inside the collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSaveRequest {
    /// Account name the progress belongs to.
    pub username: String,
    /// Level the progress was recorded on.
    pub level: LevelId,
    /// Column of the actor's logical cell at save time.
    pub x: u32,
    /// Row of the actor's logical cell at save time.
    pub y: u32,
    /// Number of painted cells at save time.
    pub painted: u32,
    /// Frame-clock timestamp of the save, in whole milliseconds.
    pub timestamp_ms: u64,
}
