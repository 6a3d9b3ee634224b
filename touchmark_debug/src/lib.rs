// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and Chrome trace export for touchmark
//! diagnostics.
//!
//! This crate provides [`TraceSink`](touchmark_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: one line per event, plus the diagnostics
//!   frames verbatim.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes indicator lifetimes as Chrome Trace Event
//!   Format JSON from recorded bytes.
//! - [`Tee`]: feeds every event to two sinks.

pub mod chrome;
pub mod pretty;
pub mod recorder;

use touchmark_core::trace::{ContactEvent, IndicatorEvent, LogFrameEvent, TraceSink};

/// A [`TraceSink`] that forwards every event to two sinks, `A` first.
#[derive(Clone, Debug, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_contact(&mut self, e: &ContactEvent) {
        self.0.on_contact(e);
        self.1.on_contact(e);
    }

    fn on_indicator_bound(&mut self, e: &IndicatorEvent) {
        self.0.on_indicator_bound(e);
        self.1.on_indicator_bound(e);
    }

    fn on_indicator_released(&mut self, e: &IndicatorEvent) {
        self.0.on_indicator_released(e);
        self.1.on_indicator_released(e);
    }

    fn on_indicator_detached(&mut self, e: &IndicatorEvent) {
        self.0.on_indicator_detached(e);
        self.1.on_indicator_detached(e);
    }

    fn on_log_frame(&mut self, e: &LogFrameEvent<'_>) {
        self.0.on_log_frame(e);
        self.1.on_log_frame(e);
    }
}
