// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperatively scheduled, cancellable tasks.
//!
//! Indicators need two kinds of deferred work: a repeating refresh (elapsed
//! time and radius scaling, ~60 Hz) and a one-shot fade completion. Both run
//! on the caller's thread, only when the host calls
//! [`Dispatcher::advance`](crate::dispatcher::Dispatcher::advance).
//!
//! Tasks live in slots addressed by [`TaskHandle`]s. Freed slots are recycled
//! via a free list, and generation counters make a handle stale as soon as its
//! task is cancelled or has fired for the last time, so an owner can always
//! cancel the handle it stored without affecting a newer task in the same
//! slot.

use alloc::vec::Vec;
use core::fmt;

use crate::contact::Contact;
use crate::time::{Duration, HostTime};

/// A handle to a pending task in a [`TaskQueue`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    idx: u32,
    generation: u32,
}

impl TaskHandle {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskHandle({}@gen{})", self.idx, self.generation)
    }
}

/// What a task does when it fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TaskKind {
    /// Refresh the indicator in `slot` (elapsed label, radius scale).
    Tick {
        /// Pool slot of the indicator.
        slot: u32,
    },
    /// Complete the fade-out of the indicator in `slot`.
    FadeComplete {
        /// Pool slot of the indicator.
        slot: u32,
        /// Indicator bind generation the fade belongs to.
        generation: u32,
        /// Last sample of the contact, kept for the closing log line.
        contact: Contact,
    },
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    due: HostTime,
    period: Option<Duration>,
    kind: TaskKind,
}

/// Slot storage for pending tasks.
#[derive(Debug, Default)]
pub struct TaskQueue {
    entries: Vec<Option<Entry>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    pending: usize,
}

impl TaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` to fire once at `due`.
    pub fn schedule_once(&mut self, due: HostTime, kind: TaskKind) -> TaskHandle {
        self.insert(Entry {
            due,
            period: None,
            kind,
        })
    }

    /// Schedules `kind` to fire every `period`, first at `first`.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn schedule_repeating(
        &mut self,
        first: HostTime,
        period: Duration,
        kind: TaskKind,
    ) -> TaskHandle {
        assert!(period != Duration::ZERO, "repeating task period must not be zero");
        self.insert(Entry {
            due: first,
            period: Some(period),
            kind,
        })
    }

    /// Cancels a task. Returns `false` if the handle was already stale.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if !self.is_pending(handle) {
            return false;
        }
        self.free(handle.idx);
        true
    }

    /// Returns whether the handle refers to a task that has not yet been
    /// cancelled or fired for the last time.
    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        let idx = handle.idx as usize;
        idx < self.entries.len()
            && self.generation[idx] == handle.generation
            && self.entries[idx].is_some()
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending
    }

    /// Whether no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Removes and returns the earliest task due at or before `now`.
    ///
    /// Ties are broken by slot index so the firing order is deterministic.
    /// A repeating task is rescheduled one period later; if that is still not
    /// after `now` (the host stalled), missed periods are coalesced and the
    /// next firing is one period after `now`. Its handle stays valid.
    pub fn pop_due(&mut self, now: HostTime) -> Option<(TaskHandle, TaskKind)> {
        let (idx, entry) = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|e| (i, e)))
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(i, e)| (e.due, *i))?;

        #[expect(
            clippy::cast_possible_truncation,
            reason = "slot count is bounded by u32 handles"
        )]
        let handle = TaskHandle {
            idx: idx as u32,
            generation: self.generation[idx],
        };

        match entry.period {
            Some(period) => {
                let mut next = entry.due.saturating_add(period);
                if next <= now {
                    next = now.saturating_add(period);
                }
                if let Some(slot) = &mut self.entries[idx] {
                    slot.due = next;
                }
            }
            None => self.free(handle.idx),
        }

        Some((handle, entry.kind))
    }

    fn insert(&mut self, entry: Entry) -> TaskHandle {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(entry);
            idx
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "more than u32::MAX concurrent tasks is not a supported workload"
            )]
            let idx = self.entries.len() as u32;
            self.entries.push(Some(entry));
            self.generation.push(0);
            idx
        };
        self.pending += 1;
        TaskHandle {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn free(&mut self, idx: u32) {
        self.entries[idx as usize] = None;
        // Bump generation so old handles immediately become stale.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
        self.pending -= 1;
    }
}
