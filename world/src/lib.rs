#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the maze-painter engine.
//!
//! The world owns the level grid, the trail ledger, the pending-move queue,
//! and the slide state machine. All mutation flows through [`apply`], which
//! executes one [`Command`] and appends the resulting [`Event`]s; adapters
//! and systems observe state exclusively through the [`query`] module.

use std::{collections::VecDeque, time::Duration};

use maze_painter_core::{CellCoord, Command, Direction, Event, FrameTime, LevelId, LevelSpec};

mod grid;

pub use grid::Grid;

/// Flat portion of every slide duration.
const SLIDE_BASE_DURATION: Duration = Duration::from_millis(120);

/// Additional duration per cell of slide distance.
const SLIDE_PER_TILE_DURATION: Duration = Duration::from_millis(90);

/// Maximum number of buffered move intents; overflow drops the oldest.
const MOVE_QUEUE_CAPACITY: usize = 3;

const DEFAULT_LEVEL: LevelId = LevelId::new(1);

/// Represents the authoritative maze-painter world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    trail: TrailLedger,
    queue: MoveQueue,
    motion: Motion,
    player: Player,
    level: LevelId,
    clock: FrameTime,
    completed: bool,
}

impl World {
    /// Creates a world with the degenerate empty level loaded.
    ///
    /// Callers are expected to issue [`Command::LoadLevel`] before play; the
    /// empty level has zero walkable cells and is trivially complete.
    #[must_use]
    pub fn new() -> Self {
        let grid = Grid::empty();
        let trail = TrailLedger::for_grid(&grid);
        Self {
            player: Player::at(grid.start()),
            grid,
            trail,
            queue: MoveQueue::new(),
            motion: Motion::Idle,
            level: DEFAULT_LEVEL,
            clock: FrameTime::ZERO,
            completed: false,
        }
    }

    fn load_level(&mut self, spec: &LevelSpec, out_events: &mut Vec<Event>) {
        self.grid = Grid::from_spec(spec);
        self.level = spec.id.map_or(DEFAULT_LEVEL, LevelId::new);
        self.player = Player::at(self.grid.start());
        self.trail.reset(&self.grid);
        self.queue.clear();
        self.motion = Motion::Idle;
        self.completed = false;

        out_events.push(Event::LevelLoaded {
            level: self.level,
            start: self.grid.start(),
            total_walkable: self.grid.total_walkable(),
        });
        self.check_completion(out_events);
    }

    /// Opens a slide toward the last walkable cell in `direction`.
    ///
    /// The logical coordinate commits to the target immediately; only the
    /// animated position interpolates. Returns false when an immediate
    /// obstruction makes the request a no-op.
    fn start_slide(&mut self, direction: Direction, out_events: &mut Vec<Event>) -> bool {
        let origin = self.player.cell;
        let target = slide_target(&self.grid, origin, direction);
        if target == origin {
            return false;
        }

        let length = origin.manhattan_distance(target);
        let duration = SLIDE_BASE_DURATION + SLIDE_PER_TILE_DURATION * length;
        self.motion = Motion::Sliding(Slide {
            start: origin,
            target,
            direction,
            started_at: self.clock,
            duration,
            length,
            cursor: origin,
            painted_steps: 0,
        });
        self.player.cell = target;
        self.player.animated = AnimatedPosition::from_cell(origin);

        out_events.push(Event::SlideStarted {
            from: origin,
            to: target,
            duration,
        });
        true
    }

    fn advance_slide(&mut self, now: FrameTime, out_events: &mut Vec<Event>) {
        let Motion::Sliding(slide) = self.motion else {
            return;
        };

        let raw = slide.progress_at(now);
        let eased = ease_out_cubic(raw);
        self.player.animated = slide.animated_at(eased);

        let crossed = slide.cells_crossed(eased);
        let mut cursor = slide.cursor;
        let mut painted_steps = slide.painted_steps;
        while painted_steps < crossed {
            let Some(next) = cursor.step(slide.direction) else {
                break;
            };
            cursor = next;
            painted_steps += 1;
            if self.trail.paint(cursor, &self.grid) {
                out_events.push(Event::CellPainted { cell: cursor });
            }
        }

        if raw >= 1.0 {
            self.player.animated = AnimatedPosition::from_cell(slide.target);
            if self.trail.paint(slide.target, &self.grid) {
                out_events.push(Event::CellPainted { cell: slide.target });
            }
            self.motion = Motion::Idle;
            out_events.push(Event::SlideFinished { at: slide.target });
            self.check_completion(out_events);

            if let Some(direction) = self.queue.pop() {
                let _ = self.start_slide(direction, out_events);
            }
        } else if let Motion::Sliding(active) = &mut self.motion {
            active.cursor = cursor;
            active.painted_steps = painted_steps;
        }
    }

    fn check_completion(&mut self, out_events: &mut Vec<Event>) {
        if self.completed {
            return;
        }
        if self.trail.painted_count() >= self.grid.total_walkable() {
            self.completed = true;
            out_events.push(Event::LevelCompleted {
                level: self.level,
                painted: self.trail.painted_count(),
                total: self.grid.total_walkable(),
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { spec } => world.load_level(&spec, out_events),
        Command::RequestMove { direction } => match world.motion {
            Motion::Sliding(_) => world.queue.push(direction),
            Motion::Idle => {
                let _ = world.start_slide(direction, out_events);
            }
        },
        Command::Tick { now } => {
            world.clock = now;
            world.advance_slide(now, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_painter_core::{CellCoord, CompletionSummary, LevelId, PlayerSnapshot};

    use super::{Grid, Motion, World};

    /// Provides read-only access to the world's normalized level grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Identifier of the currently loaded level.
    #[must_use]
    pub fn level(world: &World) -> LevelId {
        world.level
    }

    /// Captures the per-frame render state of the actor.
    #[must_use]
    pub fn player_snapshot(world: &World) -> PlayerSnapshot {
        let (progress, moving) = match world.motion {
            Motion::Idle => (0.0, false),
            Motion::Sliding(slide) => (slide.progress_at(world.clock), true),
        };
        PlayerSnapshot {
            x: world.player.animated.x,
            y: world.player.animated.y,
            progress,
            moving,
        }
    }

    /// Logical (integer) cell currently committed for the actor.
    #[must_use]
    pub fn player_cell(world: &World) -> CellCoord {
        world.player.cell
    }

    /// Reports whether the provided cell has been painted.
    #[must_use]
    pub fn is_painted(world: &World, cell: CellCoord) -> bool {
        world.trail.is_painted(cell)
    }

    /// Aggregate paint progress for the current level.
    #[must_use]
    pub fn completion(world: &World) -> CompletionSummary {
        let painted = world.trail.painted_count();
        let total = world.grid.total_walkable();
        CompletionSummary {
            painted,
            total,
            complete: painted >= total,
        }
    }

    /// Number of buffered move intents awaiting the next idle transition.
    #[must_use]
    pub fn queued_moves(world: &World) -> usize {
        world.queue.len()
    }
}

/// Slide state machine; at most one slide is live at a time.
#[derive(Clone, Copy, Debug)]
enum Motion {
    Idle,
    Sliding(Slide),
}

/// One in-flight slide segment.
#[derive(Clone, Copy, Debug)]
struct Slide {
    start: CellCoord,
    target: CellCoord,
    direction: Direction,
    started_at: FrameTime,
    duration: Duration,
    length: u32,
    /// Last cell crossed (and painted) along the segment so far.
    cursor: CellCoord,
    painted_steps: u32,
}

impl Slide {
    fn progress_at(&self, now: FrameTime) -> f32 {
        let elapsed = now.since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn animated_at(&self, eased: f32) -> AnimatedPosition {
        let sx = self.start.x() as f32;
        let sy = self.start.y() as f32;
        let tx = self.target.x() as f32;
        let ty = self.target.y() as f32;
        AnimatedPosition {
            x: sx + (tx - sx) * eased,
            y: sy + (ty - sy) * eased,
        }
    }

    fn cells_crossed(&self, eased: f32) -> u32 {
        ((eased * self.length as f32).floor() as u32).min(self.length)
    }
}

/// Progress curve applied to slide interpolation: fast start, slow finish.
fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Advances from `origin` while the next cell is walkable, landing on the
/// last walkable cell before an obstruction.
fn slide_target(grid: &Grid, origin: CellCoord, direction: Direction) -> CellCoord {
    let mut cell = origin;
    while let Some(next) = cell.step(direction) {
        if !grid.is_walkable(next) {
            break;
        }
        cell = next;
    }
    cell
}

#[derive(Clone, Copy, Debug)]
struct Player {
    /// Authoritative integer cell; mutated only at slide start.
    cell: CellCoord,
    /// Continuous position used for rendering and camera framing.
    animated: AnimatedPosition,
}

impl Player {
    fn at(cell: CellCoord) -> Self {
        Self {
            cell,
            animated: AnimatedPosition::from_cell(cell),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct AnimatedPosition {
    x: f32,
    y: f32,
}

impl AnimatedPosition {
    fn from_cell(cell: CellCoord) -> Self {
        Self {
            x: cell.x() as f32,
            y: cell.y() as f32,
        }
    }
}

/// Dense painted-cell ledger mirroring the grid layout.
#[derive(Clone, Debug)]
struct TrailLedger {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
    painted: u32,
}

impl TrailLedger {
    fn for_grid(grid: &Grid) -> Self {
        let mut ledger = Self {
            columns: grid.columns(),
            rows: grid.rows(),
            cells: vec![false; grid.cell_count()],
            painted: 0,
        };
        let _ = ledger.paint(grid.start(), grid);
        ledger
    }

    /// Clears the ledger and seeds the start cell; the single place
    /// start-cell bootstrapping happens.
    fn reset(&mut self, grid: &Grid) {
        self.columns = grid.columns();
        self.rows = grid.rows();
        self.cells.clear();
        self.cells.resize(grid.cell_count(), false);
        self.painted = 0;
        let _ = self.paint(grid.start(), grid);
    }

    /// Idempotent paint; returns true exactly when the ledger changed.
    ///
    /// Unwalkable cells are rejected, preserving painted ⊆ walkable.
    fn paint(&mut self, cell: CellCoord, grid: &Grid) -> bool {
        if !grid.is_walkable(cell) {
            return false;
        }
        let Some(index) = self.index(cell) else {
            return false;
        };
        match self.cells.get_mut(index) {
            Some(slot) if !*slot => {
                *slot = true;
                self.painted = self.painted.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    fn is_painted(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.cells.get(index).copied().unwrap_or(false))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.columns && cell.y() < self.rows {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn painted_count(&self) -> u32 {
        self.painted
    }
}

/// Bounded FIFO of buffered move intents.
#[derive(Clone, Debug)]
struct MoveQueue {
    pending: VecDeque<Direction>,
}

impl MoveQueue {
    fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(MOVE_QUEUE_CAPACITY),
        }
    }

    /// Appends an intent, dropping the oldest entry on overflow.
    fn push(&mut self, direction: Direction) {
        self.pending.push_back(direction);
        if self.pending.len() > MOVE_QUEUE_CAPACITY {
            let _ = self.pending.pop_front();
        }
    }

    fn pop(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }

    fn clear(&mut self) {
        self.pending.clear();
    }

    fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_painter_core::{LevelSpec, StartCoord};

    fn open_room() -> LevelSpec {
        LevelSpec {
            id: Some(1),
            grid: vec![
                vec![1, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 1],
                vec![1, 0, 0, 0, 1],
                vec![1, 1, 1, 1, 1],
            ],
            start: Some(StartCoord { x: 1, y: 1 }),
        }
    }

    fn loaded_world(spec: LevelSpec) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { spec }, &mut events);
        (world, events)
    }

    #[test]
    fn load_announces_level_and_walkable_count() {
        let (_, events) = loaded_world(open_room());

        assert_eq!(
            events,
            vec![Event::LevelLoaded {
                level: LevelId::new(1),
                start: CellCoord::new(1, 1),
                total_walkable: 6,
            }]
        );
    }

    #[test]
    fn empty_level_is_trivially_complete_at_load() {
        let (world, events) = loaded_world(LevelSpec {
            id: None,
            grid: Vec::new(),
            start: None,
        });

        assert!(events.contains(&Event::LevelCompleted {
            level: LevelId::new(1),
            painted: 0,
            total: 0,
        }));
        assert!(query::completion(&world).complete);
    }

    #[test]
    fn move_into_immediate_wall_is_a_silent_noop() {
        let (mut world, _) = loaded_world(open_room());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::North,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::player_cell(&world), CellCoord::new(1, 1));
        assert!(!query::player_snapshot(&world).moving);
    }

    #[test]
    fn slide_commits_logical_cell_immediately() {
        let (mut world, _) = loaded_world(open_room());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::SlideStarted {
                from: CellCoord::new(1, 1),
                to: CellCoord::new(3, 1),
                duration: Duration::from_millis(120 + 2 * 90),
            }]
        );
        assert_eq!(query::player_cell(&world), CellCoord::new(3, 1));

        let snapshot = query::player_snapshot(&world);
        assert!(snapshot.moving);
        assert_eq!(snapshot.x, 1.0);
        assert_eq!(snapshot.y, 1.0);
    }

    #[test]
    fn slide_targeting_is_deterministic() {
        let (world, _) = loaded_world(open_room());
        let grid = query::grid(&world);

        for _ in 0..3 {
            assert_eq!(
                slide_target(grid, CellCoord::new(1, 1), Direction::East),
                CellCoord::new(3, 1)
            );
        }
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let (mut world, _) = loaded_world(open_room());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );

        let mut last = -1.0f32;
        for millis in [0u64, 50, 120, 200, 280, 300, 5_000] {
            apply(
                &mut world,
                Command::Tick {
                    now: FrameTime::from_millis(millis),
                },
                &mut events,
            );
            let progress = query::player_snapshot(&world).progress;
            assert!((0.0..=1.0).contains(&progress));
            assert!(progress >= last);
            last = progress;
        }
    }

    #[test]
    fn clock_jitter_before_slide_start_clamps_to_zero() {
        let (mut world, _) = loaded_world(open_room());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                now: FrameTime::from_millis(400),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );

        apply(
            &mut world,
            Command::Tick {
                now: FrameTime::from_millis(150),
            },
            &mut events,
        );

        let snapshot = query::player_snapshot(&world);
        assert_eq!(snapshot.progress, 0.0);
        assert_eq!(snapshot.x, 1.0);
        assert!(snapshot.moving);
    }

    #[test]
    fn repeated_tick_with_same_timestamp_is_idempotent() {
        let (mut world, _) = loaded_world(open_room());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                now: FrameTime::from_millis(200),
            },
            &mut events,
        );
        let first = query::player_snapshot(&world);
        let observed = events.len();

        apply(
            &mut world,
            Command::Tick {
                now: FrameTime::from_millis(200),
            },
            &mut events,
        );

        assert_eq!(query::player_snapshot(&world), first);
        assert_eq!(events.len(), observed);
    }

    #[test]
    fn queue_holds_three_pending_moves_and_drops_the_oldest() {
        let (mut world, _) = loaded_world(open_room());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );

        for direction in [
            Direction::South,
            Direction::West,
            Direction::North,
            Direction::East,
        ] {
            apply(&mut world, Command::RequestMove { direction }, &mut events);
        }

        assert_eq!(query::queued_moves(&world), 3);

        let mut queue = MoveQueue::new();
        queue.push(Direction::South);
        queue.push(Direction::West);
        queue.push(Direction::North);
        queue.push(Direction::East);
        assert_eq!(queue.pop(), Some(Direction::West));
        assert_eq!(queue.pop(), Some(Direction::North));
        assert_eq!(queue.pop(), Some(Direction::East));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn snapshot_snaps_exactly_to_target_at_completion() {
        let (mut world, _) = loaded_world(open_room());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );

        apply(
            &mut world,
            Command::Tick {
                now: FrameTime::from_millis(10_000),
            },
            &mut events,
        );

        let snapshot = query::player_snapshot(&world);
        assert!(!snapshot.moving);
        assert_eq!(snapshot.x, 3.0);
        assert_eq!(snapshot.y, 1.0);
        assert!(events.contains(&Event::SlideFinished {
            at: CellCoord::new(3, 1),
        }));
    }

    #[test]
    fn completion_flips_exactly_at_full_coverage() {
        let spec = LevelSpec {
            id: None,
            grid: vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]],
            start: Some(StartCoord { x: 0, y: 0 }),
        };
        let (mut world, _) = loaded_world(spec);
        let grid = query::grid(&world).clone();

        for (x, y) in [(1, 0), (2, 0), (0, 1), (1, 1), (2, 1), (0, 2), (1, 2)] {
            assert!(world.trail.paint(CellCoord::new(x, y), &grid));
        }
        let summary = query::completion(&world);
        assert_eq!(summary.painted, 8);
        assert!(!summary.complete);

        assert!(world.trail.paint(CellCoord::new(2, 2), &grid));
        assert!(query::completion(&world).complete);
    }

    #[test]
    fn painting_stays_within_walkable_cells() {
        let (mut world, _) = loaded_world(open_room());
        let grid = query::grid(&world).clone();
        assert!(!world.trail.paint(CellCoord::new(0, 0), &grid));
        assert!(!world.trail.paint(CellCoord::new(9, 9), &grid));

        assert!(world.trail.paint(CellCoord::new(2, 1), &grid));
        assert!(!world.trail.paint(CellCoord::new(2, 1), &grid));
        assert_eq!(world.trail.painted_count(), 2);
    }
}
