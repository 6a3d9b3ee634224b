// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use crate::contact::ContactId;
use crate::task::TaskQueue;

use super::Indicator;

/// Grow-only set of reusable indicators, addressed by slot.
///
/// Indicators are never destroyed during a session, so a slot index stays
/// valid for the lifetime of the pool. [`acquire`](Self::acquire) scans
/// linearly for the first detached indicator; pools stay in the single digits
/// (one per simultaneous finger), so no free list is kept.
#[derive(Debug, Default)]
pub struct IndicatorPool {
    indicators: Vec<Indicator>,
}

impl IndicatorPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot of a reusable indicator, constructing one if every
    /// existing indicator is still attached.
    ///
    /// The returned indicator is idle but not yet marked attached; the caller
    /// binds it and then calls [`attach`](Self::attach).
    pub fn acquire(&mut self) -> u32 {
        if let Some(idx) = self.indicators.iter().position(|i| !i.is_attached()) {
            return slot_of(idx);
        }
        self.indicators.push(Indicator::new());
        slot_of(self.indicators.len() - 1)
    }

    /// Marks the indicator in `slot` as placed on the surface.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of bounds.
    pub fn attach(&mut self, slot: u32) {
        self.indicators[slot as usize].set_attached(true);
    }

    /// Immediately resets every indicator, cancelling their tasks.
    ///
    /// Returns the slots that were attached, so the caller can remove their
    /// markers from the surface.
    pub fn release_all(&mut self, tasks: &mut TaskQueue) -> Vec<u32> {
        let mut detached = Vec::new();
        for (idx, indicator) in self.indicators.iter_mut().enumerate() {
            if indicator.is_attached() {
                detached.push(slot_of(idx));
            }
            indicator.reset(tasks);
        }
        detached
    }

    /// Finds the indicator bound to `contact`, if any.
    #[must_use]
    pub fn find_bound(&self, contact: ContactId) -> Option<u32> {
        self.indicators
            .iter()
            .position(|i| i.bound_contact() == Some(contact))
            .map(slot_of)
    }

    /// Returns the indicator in `slot`.
    #[must_use]
    pub fn get(&self, slot: u32) -> Option<&Indicator> {
        self.indicators.get(slot as usize)
    }

    /// Returns the indicator in `slot` mutably.
    pub fn get_mut(&mut self, slot: u32) -> Option<&mut Indicator> {
        self.indicators.get_mut(slot as usize)
    }

    /// Iterates over `(slot, indicator)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Indicator)> + '_ {
        self.indicators
            .iter()
            .enumerate()
            .map(|(idx, i)| (slot_of(idx), i))
    }

    /// # Panics
    ///
    /// Panics if `slot` is out of bounds.
    pub(crate) fn slot_mut(&mut self, slot: u32) -> &mut Indicator {
        &mut self.indicators[slot as usize]
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut Indicator)> + '_ {
        self.indicators
            .iter_mut()
            .enumerate()
            .map(|(idx, i)| (slot_of(idx), i))
    }

    /// Number of indicators ever constructed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    /// Whether no indicator was ever constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "pools never approach u32::MAX indicators"
)]
fn slot_of(idx: usize) -> u32 {
    idx as u32
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::config::Configuration;
    use crate::contact::{Contact, Phase};
    use crate::time::{Duration, HostTime};

    fn bind(pool: &mut IndicatorPool, tasks: &mut TaskQueue, id: u64) -> u32 {
        let slot = pool.acquire();
        let contact = Contact::new(ContactId(id), Phase::Began, Point::ZERO);
        pool.get_mut(slot).unwrap().bind(
            slot,
            &contact,
            &Configuration::DEFAULT,
            HostTime(0),
            Duration(10),
            tasks,
        );
        pool.attach(slot);
        slot
    }

    #[test]
    fn acquire_reuses_detached_indicators() {
        let mut pool = IndicatorPool::new();
        let mut tasks = TaskQueue::new();
        assert_eq!(bind(&mut pool, &mut tasks, 1), 0);
        assert_eq!(bind(&mut pool, &mut tasks, 2), 1);
        assert_eq!(pool.len(), 2);

        assert!(pool.get_mut(0).unwrap().finish_release(&mut tasks));
        assert_eq!(bind(&mut pool, &mut tasks, 3), 0, "first detached slot wins");
        assert_eq!(pool.len(), 2, "no new indicator was constructed");
    }

    #[test]
    fn unattached_acquire_is_not_handed_out_twice_once_attached() {
        let mut pool = IndicatorPool::new();
        let a = pool.acquire();
        assert_eq!(pool.acquire(), a, "acquire without attach hands out the same slot");
        pool.attach(a);
        assert_ne!(pool.acquire(), a);
    }

    #[test]
    fn release_all_detaches_everything_and_cancels_tasks() {
        let mut pool = IndicatorPool::new();
        let mut tasks = TaskQueue::new();
        bind(&mut pool, &mut tasks, 1);
        bind(&mut pool, &mut tasks, 2);
        assert_eq!(tasks.len(), 2);

        assert_eq!(pool.release_all(&mut tasks), [0, 1]);
        assert!(tasks.is_empty());
        assert!(pool.iter().all(|(_, i)| !i.is_attached() && !i.is_visible()));
        assert_eq!(pool.release_all(&mut tasks), [] as [u32; 0]);
    }

    #[test]
    fn find_bound_locates_by_identity() {
        let mut pool = IndicatorPool::new();
        let mut tasks = TaskQueue::new();
        bind(&mut pool, &mut tasks, 10);
        bind(&mut pool, &mut tasks, 20);
        assert_eq!(pool.find_bound(ContactId(20)), Some(1));
        assert_eq!(pool.find_bound(ContactId(30)), None);
    }
}
