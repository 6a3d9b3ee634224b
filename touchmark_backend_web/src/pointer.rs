// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer Events adapter.
//!
//! [`PointerSource`] listens for [Pointer Events][mdn] on a container in the
//! capture phase, converts each one into a single-contact
//! [`EventBatch`](touchmark_core::contact::EventBatch), and delivers it
//! through an [`EventInterceptor`], so the dispatcher sees it before any of
//! the page's own handlers.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/Pointer_events

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Point;
use touchmark_core::contact::{Contact, ContactId, EventBatch, Phase};
use touchmark_core::source::{EventHandler, EventInterceptor, EventObserver};
use wasm_bindgen::JsCast as _;
use web_sys::{HtmlElement, PointerEvent};

use crate::BackendError;
use crate::listener::Listener;

/// Pointer event types the adapter subscribes to.
pub const POINTER_EVENTS: [&str; 6] = [
    "pointerdown",
    "pointermove",
    "pointerup",
    "pointercancel",
    "pointerover",
    "pointerout",
];

/// Maps a DOM pointer event type to a contact phase.
///
/// A `pointermove` with no button pressed is a hovering pointer, not a
/// contact that is down.
#[must_use]
pub fn phase_for_event_type(event_type: &str, buttons: u16) -> Phase {
    match event_type {
        "pointerdown" => Phase::Began,
        "pointermove" if buttons == 0 => Phase::RegionMoved,
        "pointermove" => Phase::Moved,
        "pointerup" => Phase::Ended,
        "pointercancel" => Phase::Cancelled,
        "pointerover" | "pointerenter" => Phase::RegionEntered,
        "pointerout" | "pointerleave" => Phase::RegionExited,
        _ => Phase::Unknown,
    }
}

/// Contact radius from a pointer's reported contact geometry (CSS px).
///
/// Mice and pens report a 1×1 px contact, which is not a measurement.
#[must_use]
pub fn radius_from_extent(width: f64, height: f64) -> Option<f64> {
    let extent = width.max(height);
    (extent.is_finite() && extent > 1.0).then_some(extent / 2.0)
}

/// Converts a DOM pointer event into a contact sample, in coordinates
/// relative to `origin`.
#[must_use]
pub fn contact_from_event(event: &PointerEvent, origin: Point) -> Contact {
    let position = Point::new(
        f64::from(event.client_x()) - origin.x,
        f64::from(event.client_y()) - origin.y,
    );
    let contact = Contact::new(
        ContactId(u64::from(event.pointer_id().cast_unsigned())),
        phase_for_event_type(&event.type_(), event.buttons()),
        position,
    );
    match radius_from_extent(f64::from(event.width()), f64::from(event.height())) {
        Some(r) => contact.with_radius(r),
        None => contact,
    }
}

/// Feeds a container's pointer events to an [`EventInterceptor`].
///
/// Listeners are removed when the source is dropped.
#[derive(Debug)]
pub struct PointerSource {
    _listeners: Vec<Listener>,
}

impl PointerSource {
    /// Subscribes to pointer events on `container`.
    pub fn new<V, H>(
        container: &HtmlElement,
        interceptor: Rc<RefCell<EventInterceptor<V, H>>>,
    ) -> Result<Self, BackendError>
    where
        V: EventObserver + 'static,
        H: EventHandler + 'static,
    {
        let mut listeners = Vec::with_capacity(POINTER_EVENTS.len());
        for event_type in POINTER_EVENTS {
            let interceptor = Rc::clone(&interceptor);
            let element = container.clone();
            listeners.push(Listener::new(container.as_ref(), event_type, move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                let rect = element.get_bounding_client_rect();
                let contact = contact_from_event(event, Point::new(rect.left(), rect.top()));
                let batch = EventBatch::touches(crate::now(), vec![contact]);
                interceptor.borrow_mut().send_event(&batch);
            })?);
        }
        Ok(Self {
            _listeners: listeners,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_event_types_map_to_phases() {
        assert_eq!(phase_for_event_type("pointerdown", 1), Phase::Began);
        assert_eq!(phase_for_event_type("pointermove", 1), Phase::Moved);
        assert_eq!(phase_for_event_type("pointermove", 0), Phase::RegionMoved);
        assert_eq!(phase_for_event_type("pointerup", 0), Phase::Ended);
        assert_eq!(phase_for_event_type("pointercancel", 0), Phase::Cancelled);
        assert_eq!(phase_for_event_type("pointerover", 0), Phase::RegionEntered);
        assert_eq!(phase_for_event_type("pointerleave", 0), Phase::RegionExited);
        assert_eq!(phase_for_event_type("gotpointercapture", 0), Phase::Unknown);
    }

    #[test]
    fn mouse_sized_contacts_have_no_radius() {
        assert_eq!(radius_from_extent(1.0, 1.0), None);
        assert_eq!(radius_from_extent(0.0, 0.0), None);
        assert_eq!(radius_from_extent(f64::NAN, 1.0), None);
        assert_eq!(radius_from_extent(40.0, 30.0), Some(20.0));
    }
}
