// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for touchmark.
//!
//! This crate wires a [`Dispatcher`](touchmark_core::dispatcher::Dispatcher)
//! into a page:
//!
//! - [`DomSurface`]: markers as positioned `<div>`s in a container
//! - [`PointerSource`]: Pointer Events, captured before page handlers
//! - [`OrientationWatcher`]: rotation and resize as reset signals
//! - [`RafLoop`]: `requestAnimationFrame` driver for `advance`
//!
//! ```text
//!   let dispatcher = Rc::new(RefCell::new(
//!       Dispatcher::new(DomSurface::new(container.clone())?, Capabilities::FULL, timebase()),
//!   ));
//!   let interceptor = Rc::new(RefCell::new(
//!       EventInterceptor::new(Rc::downgrade(&dispatcher), |_: &EventBatch| {}),
//!   ));
//!   let _pointers = PointerSource::new(&container, interceptor.clone())?;
//!   let _rotation = OrientationWatcher::new(&window, interceptor)?;
//!   let raf = RafLoop::new(move |now| dispatcher.borrow_mut().advance(now));
//!   raf.start();
//! ```

#![no_std]

extern crate alloc;

mod listener;
mod orientation;
mod pointer;
mod raf;
mod surface;

pub use orientation::{ORIENTATION_EVENTS, OrientationWatcher};
pub use pointer::{
    POINTER_EVENTS, PointerSource, contact_from_event, phase_for_event_type, radius_from_extent,
};
pub use raf::RafLoop;
pub use surface::DomSurface;
pub use touchmark_core::surface::Surface;

use touchmark_core::time::{HostTime, Timebase};

/// Errors from setting up the browser backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The container element is not part of a document.
    #[error("container element has no owner document")]
    NoDocument,
    /// The browser refused an event listener registration.
    #[error("could not register a `{0}` listener")]
    Listener(&'static str),
}

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    raf::ms_to_host_time(raf::performance_now())
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::new(1000, 1)
}

#[cfg(test)]
mod tests {
    use touchmark_core::indicator::{fade_duration, tick_period};

    use super::*;

    #[test]
    fn timebase_is_microsecond() {
        let tb = timebase();
        assert_eq!(tb.ticks_to_nanos(1), 1000);
        assert_eq!(tb.ticks_to_nanos(1_000_000), 1_000_000_000);
    }

    #[test]
    fn indicator_timing_in_web_ticks() {
        assert_eq!(tick_period(timebase()).ticks(), 16_666);
        assert_eq!(fade_duration(timebase()).ticks(), 200_000);
    }

    #[test]
    fn backend_errors_describe_the_failure() {
        use alloc::string::ToString as _;
        assert_eq!(
            BackendError::Listener("pointerdown").to_string(),
            "could not register a `pointerdown` listener"
        );
    }
}
