//! Per-session signal registry.
//!
//! Listeners subscribe per signal kind and any number may coexist; a
//! failing listener is isolated so it can never block other listeners or
//! the sequencer. The registry is owned by the session instance — there is
//! no process-wide event bus.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::gesture::GestureKind;
use crate::landmarks::Snapshot;

/// Signal names listeners subscribe by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    TaskStarted,
    TaskPassed,
    AllTasksPassed,
    FacePlaceStatus,
}

/// A lifecycle notification with its payload.
#[derive(Debug, Clone)]
pub enum Signal {
    /// A gesture became the active task.
    TaskStarted { task: GestureKind },
    /// The active gesture was satisfied; carries the frame snapshot when
    /// the producer supplied one.
    TaskPassed {
        task: GestureKind,
        snapshot: Option<Snapshot>,
    },
    /// The queue drained; the session has stopped.
    AllTasksPassed,
    /// Per-frame face placement feedback, emitted regardless of task
    /// state.
    FacePlaceStatus { inside: bool },
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::TaskStarted { .. } => SignalKind::TaskStarted,
            Signal::TaskPassed { .. } => SignalKind::TaskPassed,
            Signal::AllTasksPassed => SignalKind::AllTasksPassed,
            Signal::FacePlaceStatus { .. } => SignalKind::FacePlaceStatus,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
pub type ListenerId = u64;

type Listener = Box<dyn FnMut(&Signal) + Send>;

#[derive(Default)]
pub struct SignalRegistry {
    next_id: ListenerId,
    listeners: HashMap<SignalKind, Vec<(ListenerId, Listener)>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one signal kind. Multiple listeners per
    /// kind are supported; delivery follows subscription order.
    pub fn subscribe(
        &mut self,
        kind: SignalKind,
        listener: impl FnMut(&Signal) + Send + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a listener by id. Returns whether anything was removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver a signal to every listener of its kind. A panicking
    /// listener is caught and reported; remaining listeners still run.
    pub(crate) fn emit(&mut self, signal: &Signal) {
        let Some(list) = self.listeners.get_mut(&signal.kind()) else {
            return;
        };
        for (id, listener) in list.iter_mut() {
            if catch_unwind(AssertUnwindSafe(|| listener(signal))).is_err() {
                tracing::warn!(
                    listener = *id,
                    signal = ?signal.kind(),
                    "signal listener panicked; continuing with remaining listeners"
                );
            }
        }
    }
}
