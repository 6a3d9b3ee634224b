// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observation hooks for the dispatcher.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Dispatcher`](crate::dispatcher::Dispatcher) calls as contacts arrive and
//! indicators move through their lifecycle. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`TracingSink`] (the dispatcher's default) forwards everything to the
//! `tracing` facade; `touchmark_debug` has sinks that print, record, and
//! export these events.

use kurbo::Point;

use crate::contact::{Contact, ContactId};
use crate::surface::OverlayId;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every contact sample the dispatcher processes.
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    /// Dispatcher that processed the sample.
    pub overlay: OverlayId,
    /// Batch timestamp.
    pub timestamp: HostTime,
    /// The sample.
    pub contact: Contact,
    /// Slot of the indicator bound to the contact after processing, if any.
    pub slot: Option<u32>,
}

/// Emitted when an indicator changes lifecycle state.
#[derive(Clone, Copy, Debug)]
pub struct IndicatorEvent {
    /// Dispatcher that owns the indicator.
    pub overlay: OverlayId,
    /// Pool slot.
    pub slot: u32,
    /// Bind generation of the indicator.
    pub generation: u32,
    /// Contact the indicator visualizes (or visualized).
    pub contact: ContactId,
    /// When the transition happened.
    pub timestamp: HostTime,
    /// Indicator center at the transition.
    pub position: Point,
}

/// Emitted when the diagnostics logger produces a new frame.
#[derive(Clone, Copy, Debug)]
pub struct LogFrameEvent<'a> {
    /// Dispatcher that produced the frame.
    pub overlay: OverlayId,
    /// When the frame was produced.
    pub timestamp: HostTime,
    /// The frame text, one `\n`-terminated line per attached indicator.
    pub text: &'a str,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives events from the dispatcher.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for each processed contact sample.
    fn on_contact(&mut self, e: &ContactEvent) {
        _ = e;
    }

    /// Called when an indicator is bound to a contact and attached.
    fn on_indicator_bound(&mut self, e: &IndicatorEvent) {
        _ = e;
    }

    /// Called when an indicator's contact ends and its fade begins.
    fn on_indicator_released(&mut self, e: &IndicatorEvent) {
        _ = e;
    }

    /// Called when an indicator leaves the surface and becomes reusable.
    fn on_indicator_detached(&mut self, e: &IndicatorEvent) {
        _ = e;
    }

    /// Called with each new diagnostics frame.
    fn on_log_frame(&mut self, e: &LogFrameEvent<'_>) {
        _ = e;
    }
}

impl<T: TraceSink + ?Sized> TraceSink for &mut T {
    fn on_contact(&mut self, e: &ContactEvent) {
        (**self).on_contact(e);
    }

    fn on_indicator_bound(&mut self, e: &IndicatorEvent) {
        (**self).on_indicator_bound(e);
    }

    fn on_indicator_released(&mut self, e: &IndicatorEvent) {
        (**self).on_indicator_released(e);
    }

    fn on_indicator_detached(&mut self, e: &IndicatorEvent) {
        (**self).on_indicator_detached(e);
    }

    fn on_log_frame(&mut self, e: &LogFrameEvent<'_>) {
        (**self).on_log_frame(e);
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// A [`TraceSink`] that forwards events to the `tracing` facade.
///
/// Diagnostics frames go out at `info` level, lifecycle transitions at
/// `debug`, and individual contact samples at `trace`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn on_contact(&mut self, e: &ContactEvent) {
        tracing::trace!(
            overlay = e.overlay.0,
            contact = e.contact.id.0,
            phase = ?e.contact.phase,
            x = e.contact.position.x,
            y = e.contact.position.y,
            slot = ?e.slot,
            "contact"
        );
    }

    fn on_indicator_bound(&mut self, e: &IndicatorEvent) {
        tracing::debug!(overlay = e.overlay.0, slot = e.slot, contact = e.contact.0, "indicator bound");
    }

    fn on_indicator_released(&mut self, e: &IndicatorEvent) {
        tracing::debug!(overlay = e.overlay.0, slot = e.slot, contact = e.contact.0, "indicator fading");
    }

    fn on_indicator_detached(&mut self, e: &IndicatorEvent) {
        tracing::debug!(overlay = e.overlay.0, slot = e.slot, contact = e.contact.0, "indicator detached");
    }

    fn on_log_frame(&mut self, e: &LogFrameEvent<'_>) {
        tracing::info!(overlay = e.overlay.0, "{}", e.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Phase;

    #[derive(Default)]
    struct Counting {
        contacts: usize,
        frames: usize,
    }

    impl TraceSink for Counting {
        fn on_contact(&mut self, _: &ContactEvent) {
            self.contacts += 1;
        }

        fn on_log_frame(&mut self, _: &LogFrameEvent<'_>) {
            self.frames += 1;
        }
    }

    fn feed(mut sink: impl TraceSink) {
        sink.on_contact(&ContactEvent {
            overlay: OverlayId(1),
            timestamp: HostTime(0),
            contact: Contact::new(ContactId(1), Phase::Began, Point::ZERO),
            slot: Some(0),
        });
        sink.on_log_frame(&LogFrameEvent {
            overlay: OverlayId(1),
            timestamp: HostTime(0),
            text: "x",
        });
        // Unimplemented hooks stay no-ops.
        sink.on_indicator_bound(&IndicatorEvent {
            overlay: OverlayId(1),
            slot: 0,
            generation: 1,
            contact: ContactId(1),
            timestamp: HostTime(0),
            position: Point::ZERO,
        });
    }

    #[test]
    fn borrowed_sinks_forward_to_the_owner() {
        let mut owner = Counting::default();
        feed(&mut owner);
        feed(&mut owner);
        assert_eq!(owner.contacts, 2);
        assert_eq!(owner.frames, 2);
    }

    #[test]
    fn noop_and_tracing_sinks_accept_everything() {
        feed(NoopSink);
        feed(TracingSink);
    }
}
