// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interception of host events ahead of the host's own handling.
//!
//! A host window delivers [`EventBatch`]es to some handler of its own. An
//! [`EventInterceptor`] sits in front of that handler: it shows every batch to
//! an observer (normally a [`Dispatcher`](crate::dispatcher::Dispatcher))
//! first, then passes it on unchanged. The observer is held weakly, so the
//! interceptor degrades to a plain pass-through once the observer is gone.

use alloc::rc::Weak;
use core::cell::RefCell;

use crate::contact::EventBatch;

/// What the host can measure about its contacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether contacts carry a radius measurement. Simulators and mice
    /// usually do not.
    pub reports_radius: bool,
}

impl Capabilities {
    /// A host that reports contact radius.
    pub const FULL: Self = Self {
        reports_radius: true,
    };

    /// A host that reports positions only.
    pub const POSITION_ONLY: Self = Self {
        reports_radius: false,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

/// The host's own event handling.
pub trait EventHandler {
    /// Handles a batch the way the host would without any interception.
    fn handle_event(&mut self, batch: &EventBatch);
}

impl<F: FnMut(&EventBatch)> EventHandler for F {
    fn handle_event(&mut self, batch: &EventBatch) {
        self(batch);
    }
}

/// Something that wants to see host events before the host does.
pub trait EventObserver {
    /// Observes one batch.
    fn observe(&mut self, batch: &EventBatch);

    /// The host's coordinate space was rotated or resized.
    fn orientation_changed(&mut self) {}
}

/// Forwards every batch to an observer, then to the host handler.
pub struct EventInterceptor<V, H> {
    observer: Weak<RefCell<V>>,
    host: H,
}

impl<V, H> core::fmt::Debug for EventInterceptor<V, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventInterceptor")
            .field("observer_alive", &(self.observer.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

impl<V: EventObserver, H: EventHandler> EventInterceptor<V, H> {
    /// Wraps `host` so that `observer` sees every batch first.
    #[must_use]
    pub fn new(observer: Weak<RefCell<V>>, host: H) -> Self {
        Self { observer, host }
    }

    /// Delivers a batch: observer first (if still alive), then the host.
    ///
    /// # Panics
    ///
    /// Panics if the observer is already mutably borrowed, i.e. if this is
    /// called re-entrantly from inside the observer.
    pub fn send_event(&mut self, batch: &EventBatch) {
        if let Some(observer) = self.observer.upgrade() {
            observer.borrow_mut().observe(batch);
        }
        self.host.handle_event(batch);
    }

    /// Forwards an orientation change to the observer, if still alive.
    pub fn orientation_changed(&mut self) {
        if let Some(observer) = self.observer.upgrade() {
            observer.borrow_mut().orientation_changed();
        }
    }

    /// Whether the observer is still alive.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observer.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;

    use super::*;
    use crate::contact::EventKind;
    use crate::time::HostTime;

    #[derive(Default)]
    struct Log {
        seen: Vec<(&'static str, HostTime)>,
        resets: usize,
    }

    struct Observer(Rc<RefCell<Log>>);

    impl EventObserver for Observer {
        fn observe(&mut self, batch: &EventBatch) {
            self.0.borrow_mut().seen.push(("observer", batch.timestamp));
        }

        fn orientation_changed(&mut self) {
            self.0.borrow_mut().resets += 1;
        }
    }

    #[test]
    fn observer_sees_batch_before_host() {
        let log = Rc::new(RefCell::new(Log::default()));
        let observer = Rc::new(RefCell::new(Observer(log.clone())));
        let host_log = log.clone();
        let mut interceptor = EventInterceptor::new(Rc::downgrade(&observer), move |b: &EventBatch| {
            host_log.borrow_mut().seen.push(("host", b.timestamp));
        });

        interceptor.send_event(&EventBatch::other(EventKind::Motion, HostTime(7)));
        interceptor.orientation_changed();

        let log = log.borrow();
        assert_eq!(log.seen, [("observer", HostTime(7)), ("host", HostTime(7))]);
        assert_eq!(log.resets, 1);
    }

    #[test]
    fn dropped_observer_degrades_to_pass_through() {
        let log = Rc::new(RefCell::new(Log::default()));
        let observer = Rc::new(RefCell::new(Observer(log.clone())));
        let mut host_calls = 0_usize;
        {
            let mut interceptor =
                EventInterceptor::new(Rc::downgrade(&observer), |_: &EventBatch| host_calls += 1);
            assert!(interceptor.is_observing());
            drop(observer);
            assert!(!interceptor.is_observing());
            interceptor.send_event(&EventBatch::other(EventKind::Touches, HostTime(1)));
            interceptor.orientation_changed();
        }
        assert_eq!(host_calls, 1);
        assert!(log.borrow().seen.is_empty());
        assert_eq!(log.borrow().resets, 0);
    }
}
