#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure progress system that turns slide completions into save requests.
//!
//! The system consumes world events and responds with fire-and-forget
//! [`ProgressSaveRequest`] records for the session to hand to its transport.
//! Guests produce nothing; the identity decides whether the progress-save
//! collaborator is invoked at all.

use maze_painter_core::{Event, FrameTime, LevelId, PlayerIdentity, ProgressSaveRequest};

/// Pure system that emits a save request per finished slide.
#[derive(Debug, Default)]
pub struct ProgressReporter;

impl ProgressReporter {
    /// Creates a new progress reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and appends save requests for signed-in players.
    pub fn handle(
        &self,
        events: &[Event],
        identity: &PlayerIdentity,
        level: LevelId,
        painted: u32,
        now: FrameTime,
        out: &mut Vec<ProgressSaveRequest>,
    ) {
        let PlayerIdentity::SignedIn { username, .. } = identity else {
            return;
        };

        for event in events {
            if let Event::SlideFinished { at } = event {
                out.push(ProgressSaveRequest {
                    username: username.clone(),
                    level,
                    x: at.x(),
                    y: at.y(),
                    painted,
                    timestamp_ms: u64::try_from(now.as_millis()).unwrap_or(u64::MAX),
                });
            }
        }
    }
}
