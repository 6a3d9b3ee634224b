// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. [`decode`] reads them back as an
//! iterator of [`RecordedEvent`].
//!
//! Diagnostics frames are stored as a `u32` byte length followed by UTF-8.

use kurbo::Point;
use touchmark_core::contact::{Contact, ContactId, Phase};
use touchmark_core::surface::OverlayId;
use touchmark_core::time::HostTime;
use touchmark_core::trace::{ContactEvent, IndicatorEvent, LogFrameEvent, TraceSink};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_CONTACT: u8 = 1;
const TAG_BOUND: u8 = 2;
const TAG_RELEASED: u8 = 3;
const TAG_DETACHED: u8 = 4;
const TAG_LOG_FRAME: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_point(&mut self, p: Point) {
        self.write_f64(p.x);
        self.write_f64(p.y);
    }

    fn write_indicator(&mut self, tag: u8, e: &IndicatorEvent) {
        self.write_u8(tag);
        self.write_u32(e.overlay.0);
        self.write_u32(e.slot);
        self.write_u32(e.generation);
        self.write_u64(e.contact.0);
        self.write_u64(e.timestamp.ticks());
        self.write_point(e.position);
    }
}

impl TraceSink for RecorderSink {
    fn on_contact(&mut self, e: &ContactEvent) {
        self.write_u8(TAG_CONTACT);
        self.write_u32(e.overlay.0);
        self.write_u64(e.timestamp.ticks());
        self.write_u64(e.contact.id.0);
        self.write_u8(u8::try_from(e.contact.phase.code()).unwrap_or(b'Z'));
        self.write_point(e.contact.position);
        // NaN marks an absent radius.
        self.write_f64(e.contact.radius.unwrap_or(f64::NAN));
        self.write_u32(e.slot.unwrap_or(u32::MAX));
    }

    fn on_indicator_bound(&mut self, e: &IndicatorEvent) {
        self.write_indicator(TAG_BOUND, e);
    }

    fn on_indicator_released(&mut self, e: &IndicatorEvent) {
        self.write_indicator(TAG_RELEASED, e);
    }

    fn on_indicator_detached(&mut self, e: &IndicatorEvent) {
        self.write_indicator(TAG_DETACHED, e);
    }

    fn on_log_frame(&mut self, e: &LogFrameEvent<'_>) {
        let Ok(len) = u32::try_from(e.text.len()) else {
            return;
        };
        self.write_u8(TAG_LOG_FRAME);
        self.write_u32(e.overlay.0);
        self.write_u64(e.timestamp.ticks());
        self.write_u32(len);
        self.buf.extend_from_slice(e.text.as_bytes());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`ContactEvent`].
    Contact(ContactEvent),
    /// An indicator was bound and attached.
    Bound(IndicatorEvent),
    /// An indicator started fading out.
    Released(IndicatorEvent),
    /// An indicator left the surface.
    Detached(IndicatorEvent),
    /// A diagnostics frame.
    LogFrame {
        /// Dispatcher that produced the frame.
        overlay: OverlayId,
        /// When the frame was produced.
        timestamp: HostTime,
        /// Frame text.
        text: String,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecodeIter<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let data = self.data;
        let bytes = data.get(self.pos..self.pos.checked_add(n)?)?;
        self.pos += n;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_point(&mut self) -> Option<Point> {
        Some(Point::new(self.read_f64()?, self.read_f64()?))
    }

    fn decode_contact(&mut self) -> Option<RecordedEvent> {
        let overlay = OverlayId(self.read_u32()?);
        let timestamp = HostTime(self.read_u64()?);
        let id = ContactId(self.read_u64()?);
        let phase = Phase::from_code(char::from(self.read_u8()?));
        let position = self.read_point()?;
        let radius = Some(self.read_f64()?).filter(|r| !r.is_nan());
        let slot = Some(self.read_u32()?).filter(|s| *s != u32::MAX);
        Some(RecordedEvent::Contact(ContactEvent {
            overlay,
            timestamp,
            contact: Contact {
                id,
                phase,
                position,
                radius,
            },
            slot,
        }))
    }

    fn decode_indicator(&mut self) -> Option<IndicatorEvent> {
        Some(IndicatorEvent {
            overlay: OverlayId(self.read_u32()?),
            slot: self.read_u32()?,
            generation: self.read_u32()?,
            contact: ContactId(self.read_u64()?),
            timestamp: HostTime(self.read_u64()?),
            position: self.read_point()?,
        })
    }

    fn decode_log_frame(&mut self) -> Option<RecordedEvent> {
        let overlay = OverlayId(self.read_u32()?);
        let timestamp = HostTime(self.read_u64()?);
        let len = self.read_u32()? as usize;
        let text = String::from_utf8(self.take(len)?.to_vec()).ok()?;
        Some(RecordedEvent::LogFrame {
            overlay,
            timestamp,
            text,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_CONTACT => self.decode_contact(),
            TAG_BOUND => self.decode_indicator().map(RecordedEvent::Bound),
            TAG_RELEASED => self.decode_indicator().map(RecordedEvent::Released),
            TAG_DETACHED => self.decode_indicator().map(RecordedEvent::Detached),
            TAG_LOG_FRAME => self.decode_log_frame(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator_event() -> IndicatorEvent {
        IndicatorEvent {
            overlay: OverlayId(4),
            slot: 1,
            generation: 3,
            contact: ContactId(77),
            timestamp: HostTime(5_000),
            position: Point::new(12.5, -3.0),
        }
    }

    #[test]
    fn decodes_a_session_in_order() {
        let mut rec = RecorderSink::new();
        let sample = Contact::new(ContactId(77), Phase::Began, Point::new(12.5, -3.0));
        rec.on_contact(&ContactEvent {
            overlay: OverlayId(4),
            timestamp: HostTime(5_000),
            contact: sample.with_radius(21.0),
            slot: Some(1),
        });
        rec.on_indicator_bound(&indicator_event());
        rec.on_log_frame(&LogFrameEvent {
            overlay: OverlayId(4),
            timestamp: HostTime(5_000),
            text: "Touch: [1]<B> c:(12.50, -3.00) r:21.00\t\n",
        });
        rec.on_indicator_released(&indicator_event());
        rec.on_indicator_detached(&indicator_event());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 5);

        let RecordedEvent::Contact(c) = &events[0] else {
            panic!("expected contact, got {:?}", events[0]);
        };
        assert_eq!(c.contact, sample.with_radius(21.0));
        assert_eq!(c.slot, Some(1));

        let RecordedEvent::Bound(b) = &events[1] else {
            panic!("expected bound, got {:?}", events[1]);
        };
        assert_eq!((b.slot, b.generation, b.contact), (1, 3, ContactId(77)));
        assert_eq!(b.position, Point::new(12.5, -3.0));

        let RecordedEvent::LogFrame { text, .. } = &events[2] else {
            panic!("expected log frame, got {:?}", events[2]);
        };
        assert!(text.starts_with("Touch: [1]<B>"));
        assert!(matches!(events[3], RecordedEvent::Released(_)));
        assert!(matches!(events[4], RecordedEvent::Detached(_)));
    }

    #[test]
    fn absent_radius_and_slot_survive() {
        let mut rec = RecorderSink::new();
        rec.on_contact(&ContactEvent {
            overlay: OverlayId(1),
            timestamp: HostTime(0),
            contact: Contact::new(ContactId(1), Phase::RegionMoved, Point::ZERO),
            slot: None,
        });
        let Some(RecordedEvent::Contact(c)) = decode(rec.as_bytes()).next() else {
            panic!("expected a contact event");
        };
        assert_eq!(c.contact.radius, None);
        assert_eq!(c.contact.phase, Phase::RegionMoved);
        assert_eq!(c.slot, None);
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_indicator_bound(&indicator_event());
        rec.on_indicator_detached(&indicator_event());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }
}
