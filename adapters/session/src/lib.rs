#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session controller that wires the world to external collaborators.
//!
//! A [`Session`] owns one world instance plus the progress system and talks
//! to the outside through three seams: an [`InputSource`] supplying
//! direction intents, a [`ProgressSink`] receiving fire-and-forget save
//! requests, and an [`AccountProvider`] reporting the player identity. The
//! embedder drives it with [`Session::frame`] once per tick of its frame
//! clock and receives the render snapshot back.

use log::{debug, info};
use maze_painter_core::{
    Command, CompletionSummary, Direction, Event, FrameTime, LevelId, LevelSpec, PlayerIdentity,
    PlayerSnapshot, ProgressSaveRequest,
};
use maze_painter_system_progress::ProgressReporter;
use maze_painter_world::{apply, query, World};

/// Opaque handle proving an active input subscription.
///
/// Returned by [`InputSource::subscribe`] and handed back on release; the
/// session stays agnostic of the concrete input transport behind it.
#[derive(Debug, PartialEq, Eq)]
pub struct InputSubscription(u64);

impl InputSubscription {
    /// Creates a subscription handle with the provided token.
    #[must_use]
    pub const fn new(token: u64) -> Self {
        Self(token)
    }

    /// Retrieves the numeric token backing the handle.
    #[must_use]
    pub const fn token(&self) -> u64 {
        self.0
    }
}

/// External source of direction intents (keyboard/swipe translation lives
/// outside the engine).
pub trait InputSource {
    /// Activates delivery and returns the handle that keeps it alive.
    fn subscribe(&mut self) -> InputSubscription;

    /// Returns the next pending intent, if any.
    fn next_intent(&mut self) -> Option<Direction>;

    /// Releases a previously issued subscription.
    fn release(&mut self, subscription: InputSubscription);
}

/// External transport for progress-save requests.
///
/// Submissions are fire-and-forget: implementations must swallow and log
/// their own failures rather than surface them to gameplay.
pub trait ProgressSink {
    /// Hands one save request to the transport.
    fn submit(&mut self, request: &ProgressSaveRequest);
}

/// External accessor for the player identity.
pub trait AccountProvider {
    /// Reports who is driving the session right now.
    fn current_user(&self) -> PlayerIdentity;
}

/// Payload delivered to the completion callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelCompletion {
    /// Identifier of the completed level.
    pub level: LevelId,
    /// Number of painted cells at completion time.
    pub painted: u32,
    /// Number of walkable cells in the level.
    pub total: u32,
}

/// Composition root owning the world and its collaborator seams.
pub struct Session<I, S, A>
where
    I: InputSource,
    S: ProgressSink,
    A: AccountProvider,
{
    world: World,
    reporter: ProgressReporter,
    input: I,
    sink: S,
    accounts: A,
    on_level_complete: Box<dyn FnMut(LevelCompletion)>,
    subscription: Option<InputSubscription>,
    pending_level: Option<LevelSpec>,
    clock: FrameTime,
    events_scratch: Vec<Event>,
    requests_scratch: Vec<ProgressSaveRequest>,
}

impl<I, S, A> Session<I, S, A>
where
    I: InputSource,
    S: ProgressSink,
    A: AccountProvider,
{
    /// Creates a stopped session with `spec` staged as the first level.
    #[must_use]
    pub fn new(
        spec: LevelSpec,
        input: I,
        sink: S,
        accounts: A,
        on_level_complete: impl FnMut(LevelCompletion) + 'static,
    ) -> Self {
        Self {
            world: World::new(),
            reporter: ProgressReporter::new(),
            input,
            sink,
            accounts,
            on_level_complete: Box::new(on_level_complete),
            subscription: None,
            pending_level: Some(spec),
            clock: FrameTime::ZERO,
            events_scratch: Vec::new(),
            requests_scratch: Vec::new(),
        }
    }

    /// Reports whether the session is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribes to input and loads the staged level.
    ///
    /// Idempotent; a degenerate level with nothing to paint completes
    /// immediately during the initial check.
    pub fn start(&mut self) {
        if self.subscription.is_some() {
            return;
        }

        self.subscription = Some(self.input.subscribe());
        info!("session started");

        if let Some(spec) = self.pending_level.take() {
            self.load(spec);
        }
    }

    /// Replaces the current level, aborting any in-flight slide.
    ///
    /// Before [`Session::start`] this merely restages the spec; afterwards
    /// the world rebuilds immediately and the initial completion check
    /// re-runs for the new level instance.
    pub fn set_level(&mut self, spec: LevelSpec) {
        if self.subscription.is_none() && self.pending_level.is_some() {
            self.pending_level = Some(spec);
            return;
        }
        self.load(spec);
    }

    /// Releases the input subscription and halts frames. Idempotent.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.input.release(subscription);
            info!("session stopped");
        }
    }

    /// Runs one frame: drains input intents, advances the animation clock,
    /// dispatches events, and returns the render snapshot.
    ///
    /// A stopped session ignores the tick and returns the last snapshot.
    pub fn frame(&mut self, now: FrameTime) -> PlayerSnapshot {
        if self.subscription.is_none() {
            return query::player_snapshot(&self.world);
        }

        self.clock = now;
        let mut events = std::mem::take(&mut self.events_scratch);
        events.clear();

        while let Some(direction) = self.input.next_intent() {
            apply(
                &mut self.world,
                Command::RequestMove { direction },
                &mut events,
            );
        }
        apply(&mut self.world, Command::Tick { now }, &mut events);

        self.dispatch(&events);
        self.events_scratch = events;

        query::player_snapshot(&self.world)
    }

    /// Aggregate paint progress of the current level.
    #[must_use]
    pub fn completion(&self) -> CompletionSummary {
        query::completion(&self.world)
    }

    /// Identifier of the currently loaded level.
    #[must_use]
    pub fn level(&self) -> LevelId {
        query::level(&self.world)
    }

    /// Column and row extents of the loaded grid, for presentation sizing.
    #[must_use]
    pub fn grid_dimensions(&self) -> (u32, u32) {
        let grid = query::grid(&self.world);
        (grid.columns(), grid.rows())
    }

    fn load(&mut self, spec: LevelSpec) {
        let mut events = std::mem::take(&mut self.events_scratch);
        events.clear();
        apply(&mut self.world, Command::LoadLevel { spec }, &mut events);
        self.dispatch(&events);
        self.events_scratch = events;
    }

    fn dispatch(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::LevelLoaded {
                    level,
                    total_walkable,
                    ..
                } => {
                    info!(
                        "level {} loaded with {total_walkable} walkable cells",
                        level.get()
                    );
                }
                Event::SlideStarted { from, to, .. } => {
                    debug!(
                        "slide ({}, {}) -> ({}, {})",
                        from.x(),
                        from.y(),
                        to.x(),
                        to.y()
                    );
                }
                Event::LevelCompleted {
                    level,
                    painted,
                    total,
                } => {
                    info!("level {} completed ({painted}/{total})", level.get());
                    (self.on_level_complete)(LevelCompletion {
                        level: *level,
                        painted: *painted,
                        total: *total,
                    });
                }
                Event::CellPainted { .. } | Event::SlideFinished { .. } => {}
            }
        }

        let identity = self.accounts.current_user();
        if identity.is_guest() {
            return;
        }

        let mut requests = std::mem::take(&mut self.requests_scratch);
        requests.clear();
        self.reporter.handle(
            events,
            &identity,
            query::level(&self.world),
            query::completion(&self.world).painted,
            self.clock,
            &mut requests,
        );
        for request in &requests {
            self.sink.submit(request);
        }
        self.requests_scratch = requests;
    }
}
