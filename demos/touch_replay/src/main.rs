// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted touch session that exercises the dispatcher and the diagnostics
//! pipeline.
//!
//! Replays two fingers at 60 Hz through a [`Dispatcher`] drawing into an
//! in-memory surface. Trace events go to `tracing`, a
//! [`PrettyPrintSink`](touchmark_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](touchmark_debug::recorder::RecorderSink); the recording is
//! exported as a Chrome trace JSON file at the end.
//!
//! ```text
//! RUST_LOG=touchmark_core=debug cargo run -p touch_replay -- trace.json
//! ```

use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use kurbo::Point;
use touchmark_core::config::Configuration;
use touchmark_core::contact::{Contact, ContactId, EventBatch, Phase};
use touchmark_core::dispatcher::Dispatcher;
use touchmark_core::source::Capabilities;
use touchmark_core::surface::{Marker, MarkerKey, Surface};
use touchmark_core::time::{HostTime, Timebase};
use touchmark_core::trace::TracingSink;
use touchmark_debug::Tee;
use touchmark_debug::pretty::PrettyPrintSink;
use touchmark_debug::recorder::RecorderSink;
use tracing_subscriber::EnvFilter;

/// Frames replayed while fingers are down.
const TOUCH_FRAMES: u64 = 48;
/// Extra frames to let the last fade finish.
const SETTLE_FRAMES: u64 = 16;
/// 16.6ms refresh interval in nanoseconds (≈60 Hz).
const REFRESH_INTERVAL_NS: u64 = 16_666_667;

const INDEX: ContactId = ContactId(1);
const MIDDLE: ContactId = ContactId(2);

/// Markers kept in memory, standing in for a host view hierarchy.
#[derive(Debug, Default)]
struct MemorySurface {
    markers: BTreeMap<MarkerKey, Marker>,
}

impl Surface for MemorySurface {
    fn attach(&mut self, key: MarkerKey, marker: &Marker) {
        self.markers.insert(key, marker.clone());
    }

    fn update(&mut self, key: MarkerKey, marker: &Marker) {
        if let Some(m) = self.markers.get_mut(&key) {
            m.clone_from(marker);
        }
    }

    fn detach(&mut self, key: MarkerKey) {
        self.markers.remove(&key);
    }

    fn markers(&self) -> Vec<MarkerKey> {
        self.markers.keys().copied().collect()
    }
}

/// Contacts reported on `frame`, if any.
///
/// The index finger swipes right from frame 0 to 30 with a steady radius.
/// The middle finger lands on frame 8, presses harder as it drags down, and
/// is cancelled on frame 40.
fn script(frame: u64) -> Vec<Contact> {
    #[expect(clippy::cast_precision_loss, reason = "frame numbers are small")]
    let f = frame as f64;
    let mut contacts = Vec::new();

    let index_phase = match frame {
        0 => Some(Phase::Began),
        30 => Some(Phase::Ended),
        1..30 if frame % 6 == 0 => Some(Phase::Stationary),
        1..30 => Some(Phase::Moved),
        _ => None,
    };
    if let Some(phase) = index_phase {
        contacts.push(
            Contact::new(INDEX, phase, Point::new(100.0 + 8.0 * f, 200.0)).with_radius(22.0),
        );
    }

    let middle_phase = match frame {
        8 => Some(Phase::Began),
        40 => Some(Phase::Cancelled),
        9..40 => Some(Phase::Moved),
        _ => None,
    };
    if let Some(phase) = middle_phase {
        let radius = 18.0 + (f - 8.0).max(0.0) * 0.5;
        contacts.push(
            Contact::new(MIDDLE, phase, Point::new(180.0, 120.0 + 5.0 * (f - 8.0)))
                .with_radius(radius),
        );
    }

    contacts
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "touch_trace.json".to_owned());
    let timebase = Timebase::NANOS;

    // -- sinks -------------------------------------------------------------
    let sink = Tee(
        TracingSink,
        Tee(PrettyPrintSink::stdout(timebase), RecorderSink::new()),
    );

    // -- dispatcher --------------------------------------------------------
    let mut dispatcher = Dispatcher::with_sink(
        MemorySurface::default(),
        Capabilities::FULL,
        timebase,
        sink,
    );
    let config = Configuration::builder()
        .shows_timer(true)
        .shows_log(true)
        .build()?;
    dispatcher.start(config);

    // -- simulated loop ----------------------------------------------------
    let mut now_ticks: u64 = 1_000_000_000; // start at 1s
    let mut peak_markers = 0;

    for frame in 0..TOUCH_FRAMES + SETTLE_FRAMES {
        let now = HostTime(now_ticks);
        let contacts = script(frame);
        if !contacts.is_empty() {
            dispatcher.handle(&EventBatch::touches(now, contacts));
        }
        dispatcher.advance(now);
        peak_markers = peak_markers.max(dispatcher.surface().markers.len());
        now_ticks += REFRESH_INTERVAL_NS;
    }

    tracing::info!(
        peak_markers,
        remaining = dispatcher.surface().markers.len(),
        pending_tasks = dispatcher.pending_tasks(),
        "replay finished"
    );
    dispatcher.stop();

    // -- export Chrome trace -----------------------------------------------
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    let Tee(_, Tee(_, recorder)) = dispatcher.sink();
    touchmark_debug::chrome::export(recorder.as_bytes(), timebase, &mut writer)?;

    println!("Wrote {path} ({} frames)", TOUCH_FRAMES + SETTLE_FRAMES);
    Ok(())
}
