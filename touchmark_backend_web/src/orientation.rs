// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport rotation and resize notifications.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use touchmark_core::source::{EventHandler, EventInterceptor, EventObserver};
use web_sys::Window;

use crate::BackendError;
use crate::listener::Listener;

/// Window events that invalidate marker positions.
pub const ORIENTATION_EVENTS: [&str; 2] = ["orientationchange", "resize"];

/// Forwards viewport rotations and resizes to an [`EventInterceptor`] as
/// orientation changes, which drop every marker immediately.
#[derive(Debug)]
pub struct OrientationWatcher {
    _listeners: Vec<Listener>,
}

impl OrientationWatcher {
    /// Subscribes to `window`'s rotation and resize events.
    pub fn new<V, H>(
        window: &Window,
        interceptor: Rc<RefCell<EventInterceptor<V, H>>>,
    ) -> Result<Self, BackendError>
    where
        V: EventObserver + 'static,
        H: EventHandler + 'static,
    {
        let listeners = ORIENTATION_EVENTS
            .into_iter()
            .map(|event_type| {
                let interceptor = Rc::clone(&interceptor);
                Listener::new(window.as_ref(), event_type, move |_| {
                    interceptor.borrow_mut().orientation_changed();
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            _listeners: listeners,
        })
    }
}
