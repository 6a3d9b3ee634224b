// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stdout). Diagnostics
//! frames are written verbatim. Timestamps are converted to milliseconds
//! using a [`Timebase`].

use std::io::Write;

use touchmark_core::time::{HostTime, Timebase};
use touchmark_core::trace::{ContactEvent, IndicatorEvent, LogFrameEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
    contacts: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .field("contacts", &self.contacts)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stdout.
    #[must_use]
    pub fn stdout(timebase: Timebase) -> Self {
        Self::new(Box::new(std::io::stdout()), timebase)
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self::with_writer(writer, timebase)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self {
            writer,
            timebase,
            contacts: false,
        }
    }

    /// Also print every individual contact sample (off by default; a moving
    /// finger produces one per frame).
    #[must_use]
    pub fn with_contacts(mut self, on: bool) -> Self {
        self.contacts = on;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn host_ms(&self, t: HostTime) -> f64 {
        t.to_nanos(self.timebase) as f64 / 1_000_000.0
    }

    fn indicator_line(&mut self, tag: &str, e: &IndicatorEvent) {
        let at = self.host_ms(e.timestamp);
        let _ = writeln!(
            self.writer,
            "[{tag}] slot={} gen={} contact={} at ({:.1}, {:.1}) t={at:.3}ms",
            e.slot, e.generation, e.contact.0, e.position.x, e.position.y,
        );
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_contact(&mut self, e: &ContactEvent) {
        if !self.contacts {
            return;
        }
        let at = self.host_ms(e.timestamp);
        let slot = e.slot.map_or_else(|| String::from("-"), |s| s.to_string());
        let _ = writeln!(
            self.writer,
            "[contact] id={} phase={} slot={slot} t={at:.3}ms",
            e.contact.id.0,
            e.contact.phase.code(),
        );
    }

    fn on_indicator_bound(&mut self, e: &IndicatorEvent) {
        self.indicator_line("bind", e);
    }

    fn on_indicator_released(&mut self, e: &IndicatorEvent) {
        self.indicator_line("fade", e);
    }

    fn on_indicator_detached(&mut self, e: &IndicatorEvent) {
        self.indicator_line("detach", e);
    }

    fn on_log_frame(&mut self, e: &LogFrameEvent<'_>) {
        let _ = self.writer.write_all(e.text.as_bytes());
    }
}
