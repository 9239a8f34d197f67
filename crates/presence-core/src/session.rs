//! The liveness session: task queue state machine and per-frame dispatch.
//!
//! A session is single-threaded by design — frame delivery and start/stop
//! must be serialized onto one execution context by the caller (the daemon
//! does this with a dedicated engine thread). Each frame is fully
//! processed before the next is accepted.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ConfigError;
use crate::gesture::{classify, GestureKind};
use crate::guide::{GuideRegion, StyleConfig};
use crate::landmarks::Frame;
use crate::signals::{ListenerId, Signal, SignalKind, SignalRegistry};
use crate::thresholds::Thresholds;

/// Observable session lifecycle state. The transient advancing step
/// between a pass and the next task exists only inside
/// [`LivenessSession::process_frame`] and is never observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No active session; frames are ignored.
    Idle,
    /// Session active, waiting for the queue head to be satisfied.
    AwaitingGesture,
    /// Every queued gesture passed; evaluation stays halted until the
    /// session is restarted.
    Completed,
}

/// Sample `count` distinct gesture kinds uniformly at random without
/// replacement. The random source is injected so callers (and tests) can
/// pin a seed.
pub fn random_tasks<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
) -> Result<Vec<GestureKind>, ConfigError> {
    if count == 0 {
        return Err(ConfigError::TaskCountZero);
    }
    if count > GestureKind::ALL.len() {
        return Err(ConfigError::TaskCountTooLarge {
            requested: count,
            available: GestureKind::ALL.len(),
        });
    }
    let mut kinds = GestureKind::ALL;
    kinds.shuffle(rng);
    Ok(kinds[..count].to_vec())
}

/// One run of the gesture-challenge flow: owns the task queue, the pass
/// history, the guide region, the threshold configuration, and the signal
/// registry listeners subscribe to.
pub struct LivenessSession {
    guide: GuideRegion,
    thresholds: Thresholds,
    style: StyleConfig,
    phase: SessionPhase,
    queue: VecDeque<GestureKind>,
    passed: Vec<GestureKind>,
    signals: SignalRegistry,
}

impl LivenessSession {
    pub fn new(guide: GuideRegion) -> Self {
        Self::with_thresholds(guide, Thresholds::default())
    }

    pub fn with_thresholds(guide: GuideRegion, thresholds: Thresholds) -> Self {
        Self {
            guide,
            thresholds,
            style: StyleConfig::default(),
            phase: SessionPhase::Idle,
            queue: VecDeque::new(),
            passed: Vec::new(),
            signals: SignalRegistry::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::AwaitingGesture
    }

    /// The gesture currently awaited: the queue head.
    pub fn current_task(&self) -> Option<GestureKind> {
        self.queue.front().copied()
    }

    /// Gestures not yet passed, in challenge order.
    pub fn remaining_tasks(&self) -> Vec<GestureKind> {
        self.queue.iter().copied().collect()
    }

    /// Gestures passed this session, in pass order.
    pub fn pass_history(&self) -> &[GestureKind] {
        &self.passed
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn set_style(&mut self, style: StyleConfig) {
        self.style = style;
    }

    pub fn subscribe(
        &mut self,
        kind: SignalKind,
        listener: impl FnMut(&Signal) + Send + 'static,
    ) -> ListenerId {
        self.signals.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.signals.unsubscribe(id)
    }

    /// Begin a session with an explicit task list. Any previous queue and
    /// pass history are discarded. An empty list completes immediately; a
    /// list with a repeated kind is rejected without touching state.
    pub fn start(&mut self, tasks: Vec<GestureKind>) -> Result<(), ConfigError> {
        for (i, kind) in tasks.iter().enumerate() {
            if tasks[..i].contains(kind) {
                return Err(ConfigError::DuplicateTask(*kind));
            }
        }

        self.queue = tasks.into();
        self.passed.clear();

        match self.queue.front().copied() {
            Some(head) => {
                self.phase = SessionPhase::AwaitingGesture;
                tracing::info!(tasks = self.queue.len(), head = %head, "session started");
                self.signals.emit(&Signal::TaskStarted { task: head });
            }
            None => {
                self.phase = SessionPhase::Completed;
                tracing::info!("session started with no tasks; completing immediately");
                self.signals.emit(&Signal::AllTasksPassed);
            }
        }
        Ok(())
    }

    /// Begin a session with `count` randomly selected gestures. Returns
    /// the selected list so callers can present it.
    pub fn start_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<GestureKind>, ConfigError> {
        let tasks = random_tasks(rng, count)?;
        self.start(tasks.clone())?;
        Ok(tasks)
    }

    /// Halt gesture evaluation. Idempotent; the queue and pass history
    /// are retained for inspection until `reset` or the next `start`.
    pub fn stop(&mut self) {
        if self.phase != SessionPhase::Idle {
            tracing::info!(remaining = self.queue.len(), "session stopped");
        }
        self.phase = SessionPhase::Idle;
    }

    /// Clear the queue and pass history and return to idle.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.passed.clear();
        self.phase = SessionPhase::Idle;
        tracing::debug!("session reset");
    }

    /// Feed one frame through the pipeline: containment check, placement
    /// signal, then (when the session is active and the face is inside
    /// the guide) the active gesture's classifier and the state update.
    ///
    /// A malformed landmark set is logged and skipped; session state is
    /// never changed by a skipped frame.
    pub fn process_frame(&mut self, frame: &Frame) {
        let inside = match self.guide.contains(&frame.landmarks) {
            Ok(inside) => inside,
            Err(err) => {
                tracing::warn!(error = %err, "skipping frame: containment check failed");
                return;
            }
        };

        self.signals.emit(&Signal::FacePlaceStatus { inside });

        if self.phase != SessionPhase::AwaitingGesture || !inside {
            return;
        }
        let Some(head) = self.queue.front().copied() else {
            return;
        };

        let satisfied = match classify(head, &frame.landmarks, &self.thresholds) {
            Ok(satisfied) => satisfied,
            Err(err) => {
                tracing::warn!(task = %head, error = %err, "skipping frame: classification failed");
                return;
            }
        };
        if !satisfied || self.passed.contains(&head) {
            return;
        }

        // Advance: record the pass, then arm the next task or complete.
        self.passed.push(head);
        self.queue.pop_front();
        tracing::info!(task = %head, remaining = self.queue.len(), "task passed");
        self.signals.emit(&Signal::TaskPassed {
            task: head,
            snapshot: frame.snapshot.clone(),
        });

        match self.queue.front().copied() {
            Some(next) => self.signals.emit(&Signal::TaskStarted { task: next }),
            None => {
                self.phase = SessionPhase::Completed;
                tracing::info!(passed = self.passed.len(), "all tasks passed");
                self.signals.emit(&Signal::AllTasksPassed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Snapshot;
    use crate::testutil::FaceBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};

    fn session() -> LivenessSession {
        LivenessSession::new(GuideRegion::new(1280, 720))
    }

    fn record(session: &mut LivenessSession, kind: SignalKind) -> Arc<Mutex<Vec<Signal>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        session.subscribe(kind, move |signal| {
            sink.lock().unwrap().push(signal.clone());
        });
        log
    }

    fn passed_tasks(log: &Arc<Mutex<Vec<Signal>>>) -> Vec<GestureKind> {
        log.lock()
            .unwrap()
            .iter()
            .filter_map(|signal| match signal {
                Signal::TaskPassed { task, .. } => Some(*task),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn random_tasks_exact_length_no_duplicates() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in 1..=GestureKind::ALL.len() {
            let tasks = random_tasks(&mut rng, count).unwrap();
            assert_eq!(tasks.len(), count);
            for (i, kind) in tasks.iter().enumerate() {
                assert!(!tasks[..i].contains(kind), "duplicate {kind} at count {count}");
            }
        }
    }

    #[test]
    fn random_tasks_rejects_bad_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(random_tasks(&mut rng, 0).unwrap_err(), ConfigError::TaskCountZero);
        assert_eq!(
            random_tasks(&mut rng, 8).unwrap_err(),
            ConfigError::TaskCountTooLarge {
                requested: 8,
                available: 7
            }
        );
    }

    #[test]
    fn random_tasks_deterministic_per_seed() {
        let first = random_tasks(&mut StdRng::seed_from_u64(42), 5).unwrap();
        let second = random_tasks(&mut StdRng::seed_from_u64(42), 5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn start_emits_task_started_with_head() {
        let mut s = session();
        let started = record(&mut s, SignalKind::TaskStarted);

        s.start(vec![GestureKind::Smile, GestureKind::Blink]).unwrap();

        assert_eq!(s.phase(), SessionPhase::AwaitingGesture);
        assert_eq!(s.current_task(), Some(GestureKind::Smile));
        let log = started.lock().unwrap();
        assert!(
            matches!(log[..], [Signal::TaskStarted { task: GestureKind::Smile }]),
            "unexpected signals: {log:?}"
        );
    }

    #[test]
    fn start_with_empty_list_completes_immediately() {
        let mut s = session();
        let done = record(&mut s, SignalKind::AllTasksPassed);

        s.start(Vec::new()).unwrap();

        assert_eq!(s.phase(), SessionPhase::Completed);
        assert_eq!(done.lock().unwrap().len(), 1);
    }

    #[test]
    fn start_rejects_duplicate_tasks() {
        let mut s = session();
        let err = s
            .start(vec![GestureKind::Blink, GestureKind::Smile, GestureKind::Blink])
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateTask(GestureKind::Blink));
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.remaining_tasks().is_empty());
    }

    #[test]
    fn repeated_satisfying_frames_pass_once() {
        let mut s = session();
        let passed = record(&mut s, SignalKind::TaskPassed);
        let started = record(&mut s, SignalKind::TaskStarted);

        s.start(vec![GestureKind::Blink, GestureKind::OpenMouth, GestureKind::Smile])
            .unwrap();

        // Several consecutive frames satisfying the head gesture.
        let blink = FaceBuilder::neutral().blink().frame();
        for _ in 0..5 {
            s.process_frame(&blink);
        }

        assert_eq!(passed_tasks(&passed), vec![GestureKind::Blink]);
        assert_eq!(s.current_task(), Some(GestureKind::OpenMouth));
        // taskStarted fired for the initial head and then the new head.
        assert_eq!(started.lock().unwrap().len(), 2);
    }

    #[test]
    fn non_head_gesture_does_not_pass() {
        let mut s = session();
        let passed = record(&mut s, SignalKind::TaskPassed);

        s.start(vec![GestureKind::Blink, GestureKind::OpenMouth]).unwrap();
        s.process_frame(&FaceBuilder::neutral().open_mouth().frame());

        assert!(passed_tasks(&passed).is_empty());
        assert_eq!(s.current_task(), Some(GestureKind::Blink));
    }

    #[test]
    fn final_pass_completes_and_halts_evaluation() {
        let mut s = session();
        let passed = record(&mut s, SignalKind::TaskPassed);
        let done = record(&mut s, SignalKind::AllTasksPassed);

        s.start(vec![GestureKind::OpenMouth, GestureKind::Smile]).unwrap();
        s.process_frame(&FaceBuilder::neutral().open_mouth().frame());
        s.process_frame(&FaceBuilder::neutral().smile().frame());

        assert_eq!(
            passed_tasks(&passed),
            vec![GestureKind::OpenMouth, GestureKind::Smile]
        );
        assert_eq!(done.lock().unwrap().len(), 1);
        assert_eq!(s.phase(), SessionPhase::Completed);
        assert_eq!(s.pass_history(), &[GestureKind::OpenMouth, GestureKind::Smile]);

        // Further frames are rejected until restart.
        s.process_frame(&FaceBuilder::neutral().blink().frame());
        assert_eq!(done.lock().unwrap().len(), 1);
        assert_eq!(passed_tasks(&passed).len(), 2);
    }

    #[test]
    fn stop_halts_evaluation_immediately() {
        let mut s = session();
        let passed = record(&mut s, SignalKind::TaskPassed);

        s.start(vec![GestureKind::Blink]).unwrap();
        s.stop();
        s.process_frame(&FaceBuilder::neutral().blink().frame());

        assert!(passed_tasks(&passed).is_empty());
        assert_eq!(s.phase(), SessionPhase::Idle);
        // Queue retained for inspection; reset clears it.
        assert_eq!(s.remaining_tasks(), vec![GestureKind::Blink]);
        s.reset();
        assert!(s.remaining_tasks().is_empty());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut s = session();
        s.stop();
        s.stop();
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn face_outside_guide_gates_evaluation() {
        let mut s = session();
        let passed = record(&mut s, SignalKind::TaskPassed);
        let placement = record(&mut s, SignalKind::FacePlaceStatus);

        s.start(vec![GestureKind::Blink]).unwrap();
        // Satisfying gesture, but one landmark pinned at the frame corner.
        s.process_frame(&FaceBuilder::neutral().blink().point(0, 0.0, 0.0).frame());

        assert!(passed_tasks(&passed).is_empty());
        let log = placement.lock().unwrap();
        assert!(matches!(log[..], [Signal::FacePlaceStatus { inside: false }]));
    }

    #[test]
    fn placement_status_emitted_when_idle() {
        let mut s = session();
        let placement = record(&mut s, SignalKind::FacePlaceStatus);

        // No session started; placement feedback still flows every frame.
        s.process_frame(&FaceBuilder::neutral().frame());
        s.process_frame(&FaceBuilder::neutral().point(0, 0.0, 0.0).frame());

        let log = placement.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert!(matches!(log[0], Signal::FacePlaceStatus { inside: true }));
        assert!(matches!(log[1], Signal::FacePlaceStatus { inside: false }));
    }

    #[test]
    fn malformed_frame_is_skipped_without_state_change() {
        let mut s = session();
        let passed = record(&mut s, SignalKind::TaskPassed);

        s.start(vec![GestureKind::RaiseEyebrows]).unwrap();
        // Satisfying pose, but the set lacks the refined iris points the
        // classifier needs.
        let frame = FaceBuilder::neutral()
            .raise_eyebrows()
            .without_iris_points()
            .frame();
        s.process_frame(&frame);

        assert!(passed_tasks(&passed).is_empty());
        assert_eq!(s.current_task(), Some(GestureKind::RaiseEyebrows));
        assert_eq!(s.phase(), SessionPhase::AwaitingGesture);
    }

    #[test]
    fn pass_signal_carries_snapshot() {
        let mut s = session();
        let passed = record(&mut s, SignalKind::TaskPassed);

        s.start(vec![GestureKind::Smile]).unwrap();
        let landmarks = FaceBuilder::neutral().smile().build();
        let frame = Frame::with_snapshot(landmarks, Snapshot::rgb8(2, 2, vec![7u8; 12]));
        s.process_frame(&frame);

        let log = passed.lock().unwrap();
        match &log[..] {
            [Signal::TaskPassed {
                task: GestureKind::Smile,
                snapshot: Some(snapshot),
            }] => {
                assert_eq!(snapshot.data(), &[7u8; 12]);
            }
            other => panic!("unexpected signals: {other:?}"),
        }
    }

    #[test]
    fn restart_begins_a_fresh_session() {
        let mut s = session();
        s.start(vec![GestureKind::OpenMouth, GestureKind::Blink]).unwrap();
        s.process_frame(&FaceBuilder::neutral().open_mouth().frame());
        assert_eq!(s.pass_history(), &[GestureKind::OpenMouth]);

        s.start(vec![GestureKind::Smile]).unwrap();
        assert!(s.pass_history().is_empty());
        assert_eq!(s.remaining_tasks(), vec![GestureKind::Smile]);
        assert_eq!(s.current_task(), Some(GestureKind::Smile));
    }

    #[test]
    fn start_random_uses_injected_rng() {
        let mut s = session();
        let expected = random_tasks(&mut StdRng::seed_from_u64(9), 4).unwrap();
        let actual = s
            .start_random(&mut StdRng::seed_from_u64(9), 4)
            .unwrap();
        assert_eq!(actual, expected);
        assert_eq!(s.remaining_tasks(), expected);
    }
}
