//! In-memory registry of download tasks.
//!
//! Each task owns a watch channel carrying its latest [`TaskSnapshot`].
//! Writers replace the snapshot wholesale; any number of progress streams
//! can subscribe and observe every state the task passes through from the
//! moment they attach.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::{Stream, stream};
use magpie_api::TaskSnapshot;
use tokio::sync::watch;
use uuid::Uuid;

struct TaskEntry {
    sender: watch::Sender<TaskSnapshot>,
    finished_at: Option<Instant>,
}

/// Registry of live and recently finished tasks, keyed by task id.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: DashMap<Uuid, TaskEntry>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    /// Register a new task with an empty snapshot and return its id.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let (sender, _) = watch::channel(TaskSnapshot::default());
        self.tasks.insert(
            id,
            TaskEntry {
                sender,
                finished_at: None,
            },
        );

        id
    }

    /// Replace the published snapshot for `id`.
    ///
    /// Publishing to an evicted or unknown task is a no-op.
    pub fn publish(&self, id: Uuid, snapshot: TaskSnapshot) {
        if let Some(entry) = self.tasks.get(&id) {
            entry.sender.send_replace(snapshot);
        }
    }

    /// Record that `id` reached its terminal snapshot.
    ///
    /// Finished tasks stay subscribable until the janitor evicts them, so
    /// clients that poll in after completion still receive the final state.
    pub fn finish(&self, id: Uuid) {
        if let Some(mut entry) = self.tasks.get_mut(&id) {
            entry.finished_at = Some(Instant::now());
        }
    }

    /// Subscribe to snapshot updates for `id`.
    pub fn subscribe(&self, id: Uuid) -> Option<watch::Receiver<TaskSnapshot>> {
        self.tasks.get(&id).map(|entry| entry.sender.subscribe())
    }

    /// Drop tasks that finished more than `ttl` ago. Returns the evicted count.
    pub fn evict_finished(&self, ttl: Duration) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, entry| match entry.finished_at {
            Some(finished_at) => finished_at.elapsed() < ttl,
            None => true,
        });

        before - self.tasks.len()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

enum StreamState {
    First(watch::Receiver<TaskSnapshot>),
    Open(watch::Receiver<TaskSnapshot>),
    Closed,
}

/// Turn a watch receiver into a stream of task snapshots.
///
/// The current snapshot is yielded immediately, then every subsequent change.
/// The first snapshot with `done` set is the final item; subscribers that
/// attach after completion get exactly one item.
pub fn snapshot_stream(rx: watch::Receiver<TaskSnapshot>) -> impl Stream<Item = TaskSnapshot> {
    stream::unfold(StreamState::First(rx), |state| async move {
        match state {
            StreamState::First(mut rx) => {
                let snapshot = rx.borrow_and_update().clone();
                let next = if snapshot.done {
                    StreamState::Closed
                } else {
                    StreamState::Open(rx)
                };
                Some((snapshot, next))
            }
            StreamState::Open(mut rx) => {
                if rx.changed().await.is_err() {
                    return None;
                }
                let snapshot = rx.borrow_and_update().clone();
                let next = if snapshot.done {
                    StreamState::Closed
                } else {
                    StreamState::Open(rx)
                };
                Some((snapshot, next))
            }
            StreamState::Closed => None,
        }
    })
}
