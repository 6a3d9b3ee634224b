// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-event text frames describing every on-screen indicator.
//!
//! Each frame has one line per attached indicator, in slot order:
//!
//! ```text
//! Touch: [0]<B> c:(120.00, 48.50) r:22.00\t
//! ```
//!
//! The phase code and radius come from the contact that triggered the frame;
//! the center is the indicator's own. A frame identical to the previous one
//! is suppressed.

use alloc::string::String;
use core::fmt::Write as _;

use crate::config::Configuration;
use crate::contact::Contact;
use crate::indicator::IndicatorPool;

/// Builds diagnostics frames and suppresses repeats.
#[derive(Debug, Default)]
pub struct DiagnosticsLogger {
    previous: String,
    scratch: String,
}

impl DiagnosticsLogger {
    /// Creates a logger with no previous frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the frame for `contact` and returns it if logging is enabled
    /// and it differs from the previously emitted frame.
    ///
    /// Empty frames (no attached indicator) are never emitted.
    pub fn log(
        &mut self,
        contact: &Contact,
        pool: &IndicatorPool,
        config: &Configuration,
    ) -> Option<&str> {
        if !config.shows_log {
            return None;
        }
        self.scratch.clear();
        let code = contact.phase.code();
        let radius = contact.radius.unwrap_or(0.0);
        for (slot, indicator) in pool.iter().filter(|(_, i)| i.is_attached()) {
            let c = indicator.position();
            // Writing into a String cannot fail.
            let _ = writeln!(
                self.scratch,
                "Touch: [{slot}]<{code}> c:({:.2}, {:.2}) r:{radius:.2}\t",
                c.x, c.y
            );
        }
        if self.scratch.is_empty() || self.scratch == self.previous {
            return None;
        }
        core::mem::swap(&mut self.previous, &mut self.scratch);
        Some(&self.previous)
    }

    /// Forgets the previous frame so the next non-empty one is emitted.
    pub fn clear(&mut self) {
        self.previous.clear();
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::contact::{ContactId, Phase};
    use crate::task::TaskQueue;
    use crate::time::{Duration, HostTime};

    fn logging() -> Configuration {
        Configuration::builder().shows_log(true).build().unwrap()
    }

    fn pool_with(points: &[Point]) -> IndicatorPool {
        let mut pool = IndicatorPool::new();
        let mut tasks = TaskQueue::new();
        for (n, p) in points.iter().enumerate() {
            let slot = pool.acquire();
            let c = Contact::new(ContactId(n as u64), Phase::Began, *p);
            let ind = pool.get_mut(slot).unwrap();
            ind.bind(slot, &c, &logging(), HostTime(0), Duration(1), &mut tasks);
            ind.update_position(*p);
            pool.attach(slot);
        }
        pool
    }

    #[test]
    fn silent_when_logging_is_off() {
        let pool = pool_with(&[Point::new(1.0, 2.0)]);
        let c = Contact::new(ContactId(0), Phase::Began, Point::ZERO);
        let mut log = DiagnosticsLogger::new();
        assert_eq!(log.log(&c, &pool, &Configuration::DEFAULT), None);
    }

    #[test]
    fn one_line_per_attached_indicator() {
        let pool = pool_with(&[Point::new(120.0, 48.5), Point::new(3.0, 4.0)]);
        let c = Contact::new(ContactId(0), Phase::Moved, Point::ZERO).with_radius(22.0);
        let mut log = DiagnosticsLogger::new();
        assert_eq!(
            log.log(&c, &pool, &logging()),
            Some(
                "Touch: [0]<M> c:(120.00, 48.50) r:22.00\t\n\
                 Touch: [1]<M> c:(3.00, 4.00) r:22.00\t\n"
            )
        );
    }

    #[test]
    fn repeated_frames_are_suppressed() {
        let pool = pool_with(&[Point::new(1.0, 1.0)]);
        let c = Contact::new(ContactId(0), Phase::Stationary, Point::ZERO);
        let mut log = DiagnosticsLogger::new();
        assert!(log.log(&c, &pool, &logging()).is_some());
        assert_eq!(log.log(&c, &pool, &logging()), None);

        let moved = Contact::new(ContactId(0), Phase::Moved, Point::ZERO);
        assert!(log.log(&moved, &pool, &logging()).is_some());

        log.clear();
        assert!(log.log(&moved, &pool, &logging()).is_some());
    }

    #[test]
    fn empty_pool_emits_nothing() {
        let c = Contact::new(ContactId(0), Phase::Ended, Point::ZERO);
        let mut log = DiagnosticsLogger::new();
        assert_eq!(log.log(&c, &IndicatorPool::new(), &logging()), None);
    }
}
