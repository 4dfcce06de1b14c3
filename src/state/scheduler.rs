//! Delayed task queue.
//!
//! Every timer a round needs (clock ticks, move commits, the reveal) is a
//! named task owned by a session id. Re-initializing a game cancels exactly
//! the old session's tasks, so a stale timer can never touch a new round.
//!
//! Time is virtual: the owner asks for tasks due at or before "now" and
//! decides what "now" is.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use strum::IntoStaticStr;

/// Game session identifier. A new one is issued on every initialize.
pub type SessionId = u64;

/// Scheduled task identifier, unique per scheduler.
pub type TaskId = u64;

/// What a task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    /// Countdown tick
    ClockTick,
    /// End of a move's transit window
    CommitMove,
    /// End of the join animation
    RevealWin,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// A pending task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub session: SessionId,
    pub kind: TaskKind,
    pub due: Duration,
}

/// Scheduler - tasks ordered by due time, then by scheduling order.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: BTreeMap<(Duration, TaskId), ScheduledTask>,
    next_id: TaskId,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a task at an absolute due time.
    pub fn schedule(&mut self, session: SessionId, kind: TaskKind, due: Duration) -> TaskId {
        self.next_id += 1;
        let id = self.next_id;
        self.tasks.insert(
            (due, id),
            ScheduledTask {
                id,
                session,
                kind,
                due,
            },
        );
        let due_ms = due.as_millis() as u64;
        tracing::trace!(session, task = kind.as_str(), due_ms, "Scheduled task");
        id
    }

    /// Cancel one session's tasks of a given kind.
    /// Returns how many were removed.
    pub fn cancel(&mut self, session: SessionId, kind: TaskKind) -> usize {
        self.remove_where(|t| t.session == session && t.kind == kind)
    }

    /// Cancel every task belonging to a session.
    pub fn cancel_session(&mut self, session: SessionId) -> usize {
        self.remove_where(|t| t.session == session)
    }

    /// Cancel everything.
    pub fn clear(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        count
    }

    fn remove_where(&mut self, pred: impl Fn(&ScheduledTask) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| !pred(task));
        before - self.tasks.len()
    }

    /// Remove and return the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledTask> {
        let (&key, task) = self.tasks.first_key_value()?;
        if task.due > now {
            return None;
        }
        self.tasks.remove(&key)
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.keys().next().map(|(due, _)| *due)
    }

    /// Pending tasks for a session, earliest first.
    pub fn pending(&self, session: SessionId) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.values().filter(move |t| t.session == session)
    }

    /// Check if a session has a pending task of a given kind.
    pub fn has_pending(&self, session: SessionId, kind: TaskKind) -> bool {
        self.pending(session).any(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
