use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use maze_painter_core::{
    Direction, FrameTime, LevelId, LevelSpec, PlayerIdentity, ProgressSaveRequest, StartCoord,
};
use maze_painter_session::{
    AccountProvider, InputSource, InputSubscription, LevelCompletion, ProgressSink, Session,
};

#[derive(Default)]
struct ScriptedInput {
    script: VecDeque<Direction>,
    subscriptions: u64,
    released: u64,
}

impl ScriptedInput {
    fn with_script(script: impl IntoIterator<Item = Direction>) -> Self {
        Self {
            script: script.into_iter().collect(),
            subscriptions: 0,
            released: 0,
        }
    }
}

struct SharedInput(Rc<RefCell<ScriptedInput>>);

impl InputSource for SharedInput {
    fn subscribe(&mut self) -> InputSubscription {
        let mut inner = self.0.borrow_mut();
        inner.subscriptions += 1;
        InputSubscription::new(inner.subscriptions)
    }

    fn next_intent(&mut self) -> Option<Direction> {
        self.0.borrow_mut().script.pop_front()
    }

    fn release(&mut self, _subscription: InputSubscription) {
        self.0.borrow_mut().released += 1;
    }
}

#[derive(Default)]
struct RecordingSink {
    requests: Vec<ProgressSaveRequest>,
}

struct SharedSink(Rc<RefCell<RecordingSink>>);

impl ProgressSink for SharedSink {
    fn submit(&mut self, request: &ProgressSaveRequest) {
        self.0.borrow_mut().requests.push(request.clone());
    }
}

struct StaticAccounts(PlayerIdentity);

impl AccountProvider for StaticAccounts {
    fn current_user(&self) -> PlayerIdentity {
        self.0.clone()
    }
}

fn two_by_three_room() -> LevelSpec {
    LevelSpec {
        id: Some(9),
        grid: vec![vec![0, 0, 0], vec![0, 0, 0]],
        start: Some(StartCoord { x: 0, y: 0 }),
    }
}

fn empty_level() -> LevelSpec {
    LevelSpec {
        id: Some(2),
        grid: Vec::new(),
        start: None,
    }
}

type Completions = Rc<RefCell<Vec<LevelCompletion>>>;

fn session_with(
    spec: LevelSpec,
    script: Vec<Direction>,
    identity: PlayerIdentity,
) -> (
    Session<SharedInput, SharedSink, StaticAccounts>,
    Rc<RefCell<ScriptedInput>>,
    Rc<RefCell<RecordingSink>>,
    Completions,
) {
    let input = Rc::new(RefCell::new(ScriptedInput::with_script(script)));
    let sink = Rc::new(RefCell::new(RecordingSink::default()));
    let completions: Completions = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&completions);
    let session = Session::new(
        spec,
        SharedInput(Rc::clone(&input)),
        SharedSink(Rc::clone(&sink)),
        StaticAccounts(identity),
        move |completion| recorded.borrow_mut().push(completion),
    );
    (session, input, sink, completions)
}

#[test]
fn scripted_session_completes_the_level_once() {
    let (mut session, _input, _sink, completions) = session_with(
        two_by_three_room(),
        vec![Direction::East, Direction::South, Direction::West],
        PlayerIdentity::Guest,
    );

    session.start();
    assert!(session.is_running());

    let mut now = 0u64;
    while !session.completion().complete && now < 60_000 {
        now += 16;
        let _ = session.frame(FrameTime::from_millis(now));
    }

    assert!(session.completion().complete);
    assert_eq!(
        completions.borrow().as_slice(),
        &[LevelCompletion {
            level: LevelId::new(9),
            painted: 6,
            total: 6,
        }]
    );

    // Further idle frames never re-fire the callback.
    for _ in 0..10 {
        now += 16;
        let _ = session.frame(FrameTime::from_millis(now));
    }
    assert_eq!(completions.borrow().len(), 1);
}

#[test]
fn degenerate_level_completes_at_start() {
    let (mut session, _input, _sink, completions) =
        session_with(empty_level(), Vec::new(), PlayerIdentity::Guest);

    session.start();

    assert_eq!(
        completions.borrow().as_slice(),
        &[LevelCompletion {
            level: LevelId::new(2),
            painted: 0,
            total: 0,
        }]
    );
}

#[test]
fn frames_are_ignored_until_start() {
    let (mut session, input, _sink, completions) = session_with(
        two_by_three_room(),
        vec![Direction::East],
        PlayerIdentity::Guest,
    );

    let snapshot = session.frame(FrameTime::from_millis(16));
    assert!(!snapshot.moving);
    assert_eq!(input.borrow().script.len(), 1);
    assert!(completions.borrow().is_empty());
}

#[test]
fn stop_is_idempotent_and_releases_the_subscription() {
    let (mut session, input, _sink, _completions) = session_with(
        two_by_three_room(),
        Vec::new(),
        PlayerIdentity::Guest,
    );

    session.start();
    session.stop();
    session.stop();

    assert!(!session.is_running());
    assert_eq!(input.borrow().subscriptions, 1);
    assert_eq!(input.borrow().released, 1);
}

#[test]
fn signed_in_players_produce_save_requests() {
    let identity = PlayerIdentity::SignedIn {
        username: "pioneer".to_owned(),
        uid: "uid-1".to_owned(),
    };
    let (mut session, _input, sink, _completions) = session_with(
        two_by_three_room(),
        vec![Direction::East],
        identity,
    );

    session.start();
    let mut now = 0u64;
    for _ in 0..64 {
        now += 16;
        let _ = session.frame(FrameTime::from_millis(now));
    }

    let requests = sink.borrow();
    assert_eq!(requests.requests.len(), 1);
    let request = &requests.requests[0];
    assert_eq!(request.username, "pioneer");
    assert_eq!(request.level, LevelId::new(9));
    assert_eq!((request.x, request.y), (2, 0));
    assert_eq!(request.painted, 3);
}

#[test]
fn guests_never_touch_the_progress_sink() {
    let (mut session, _input, sink, _completions) = session_with(
        two_by_three_room(),
        vec![Direction::East, Direction::South],
        PlayerIdentity::Guest,
    );

    session.start();
    let mut now = 0u64;
    for _ in 0..128 {
        now += 16;
        let _ = session.frame(FrameTime::from_millis(now));
    }

    assert!(sink.borrow().requests.is_empty());
}

#[test]
fn set_level_resets_the_completion_guard() {
    let (mut session, _input, _sink, completions) = session_with(
        empty_level(),
        Vec::new(),
        PlayerIdentity::Guest,
    );

    session.start();
    assert_eq!(completions.borrow().len(), 1);

    // A second degenerate level is a fresh instance with its own one-shot.
    session.set_level(LevelSpec {
        id: Some(3),
        grid: Vec::new(),
        start: None,
    });

    let recorded = completions.borrow();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[1].level, LevelId::new(3));
}
