// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each overlay becomes a process and each pool slot a thread, so every
//! indicator lifetime shows up as one span per slot: it opens when the
//! indicator is bound and closes when it leaves the surface, with the
//! fade-out marked by an instant event in between.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use touchmark_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Contact(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.contact.phase),
                    "cat": "Contact",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": e.overlay.0,
                    "tid": e.slot.unwrap_or(0),
                    "s": "t",
                    "args": {
                        "contact": e.contact.id.0,
                        "x": e.contact.position.x,
                        "y": e.contact.position.y,
                        "radius": e.contact.radius,
                    }
                }));
            }
            RecordedEvent::Bound(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Indicator",
                    "cat": "Indicator",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": e.overlay.0,
                    "tid": e.slot,
                    "args": {
                        "contact": e.contact.0,
                        "generation": e.generation,
                    }
                }));
            }
            RecordedEvent::Released(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FadeOut",
                    "cat": "Indicator",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": e.overlay.0,
                    "tid": e.slot,
                    "s": "t",
                    "args": {
                        "contact": e.contact.0,
                    }
                }));
            }
            RecordedEvent::Detached(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Indicator",
                    "cat": "Indicator",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": e.overlay.0,
                    "tid": e.slot,
                    "args": {
                        "contact": e.contact.0,
                    }
                }));
            }
            RecordedEvent::LogFrame {
                overlay,
                timestamp,
                text,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "LogFrame",
                    "cat": "Diagnostics",
                    "ts": ticks_to_us(timestamp.ticks(), timebase),
                    "pid": overlay.0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "text": text,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use kurbo::Point;
    use touchmark_core::contact::ContactId;
    use touchmark_core::surface::OverlayId;
    use touchmark_core::time::HostTime;
    use touchmark_core::trace::{IndicatorEvent, LogFrameEvent, TraceSink};

    use super::*;
    use crate::recorder::RecorderSink;

    fn at(ticks: u64) -> IndicatorEvent {
        IndicatorEvent {
            overlay: OverlayId(2),
            slot: 1,
            generation: 1,
            contact: ContactId(5),
            timestamp: HostTime(ticks),
            position: Point::ZERO,
        }
    }

    #[test]
    fn indicator_lifetime_becomes_a_span() {
        let mut rec = RecorderSink::new();
        rec.on_indicator_bound(&at(1_000_000));
        rec.on_indicator_released(&at(3_000_000));
        rec.on_log_frame(&LogFrameEvent {
            overlay: OverlayId(2),
            timestamp: HostTime(3_000_000),
            text: "Touch: [1]<E> c:(0.00, 0.00) r:0.00\t\n",
        });
        rec.on_indicator_detached(&at(203_000_000));

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "Indicator");
        assert_eq!(parsed[0]["pid"], 2);
        assert_eq!(parsed[0]["tid"], 1);
        assert_eq!(parsed[0]["ts"], 1000.0);

        assert_eq!(parsed[1]["name"], "FadeOut");
        assert_eq!(parsed[2]["cat"], "Diagnostics");
        assert!(
            parsed[2]["args"]["text"]
                .as_str()
                .is_some_and(|t| t.starts_with("Touch: [1]<E>"))
        );

        assert_eq!(parsed[3]["ph"], "E");
        assert_eq!(parsed[3]["tid"], 1);
        assert_eq!(parsed[3]["ts"], 203_000.0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
