// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contact-to-indicator state machine.
//!
//! Per contact identity the dispatcher walks
//! `Unseen → Active → Releasing → Unseen`:
//!
//! ```text
//!   Began ──► acquire + bind + attach          (Active)
//!   Moved / Stationary ──► update position
//!   Ended / Cancelled ──► unbind + fade out    (Releasing)
//!   fade completes ──► detach, slot reusable   (Unseen)
//! ```
//!
//! Everything happens on the caller's thread. [`handle`](Dispatcher::handle)
//! consumes event batches; [`advance`](Dispatcher::advance) runs the periodic
//! indicator refresh and the fade completions that are due. Hosts call
//! `advance` once per display frame.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::config::Configuration;
use crate::contact::{Contact, ContactId, EventBatch, EventKind, Phase};
use crate::diagnostics::DiagnosticsLogger;
use crate::indicator::{self, IndicatorPool};
use crate::source::{Capabilities, EventObserver};
use crate::surface::{MarkerKey, OverlayId, Surface};
use crate::task::{TaskKind, TaskQueue};
use crate::time::{Duration, HostTime, Timebase};
use crate::trace::{ContactEvent, IndicatorEvent, LogFrameEvent, TraceSink, TracingSink};

/// Binds contacts to indicators and keeps them in sync.
///
/// A dispatcher owns its surface, pool, and session state; independent
/// dispatchers (one per window, or one per test) never share anything.
#[derive(Debug)]
pub struct Dispatcher<S: Surface, T: TraceSink = TracingSink> {
    overlay: OverlayId,
    surface: S,
    sink: T,
    capabilities: Capabilities,
    timebase: Timebase,
    tick_period: Duration,
    fade: Duration,
    enabled: bool,
    config: Option<Configuration>,
    pool: IndicatorPool,
    bindings: HashMap<ContactId, u32>,
    contacts: HashMap<ContactId, Contact>,
    tasks: TaskQueue,
    logger: DiagnosticsLogger,
    /// Latest host time seen, used to stamp resets.
    last_seen: HostTime,
}

impl<S: Surface> Dispatcher<S> {
    /// Creates a disabled dispatcher drawing on `surface`, reporting through
    /// [`TracingSink`].
    ///
    /// `timebase` describes the [`HostTime`] values the host will pass in.
    pub fn new(surface: S, capabilities: Capabilities, timebase: Timebase) -> Self {
        Self::with_sink(surface, capabilities, timebase, TracingSink)
    }
}

impl<S: Surface, T: TraceSink> Dispatcher<S, T> {
    /// Creates a disabled dispatcher with a custom trace sink.
    pub fn with_sink(surface: S, capabilities: Capabilities, timebase: Timebase, sink: T) -> Self {
        let overlay = OverlayId::next();
        if !capabilities.reports_radius {
            tracing::warn!(
                overlay = overlay.0,
                "host does not report contact radius; indicators will not scale"
            );
        }
        Self {
            overlay,
            surface,
            sink,
            capabilities,
            timebase,
            tick_period: indicator::tick_period(timebase),
            fade: indicator::fade_duration(timebase),
            enabled: false,
            config: None,
            pool: IndicatorPool::new(),
            bindings: HashMap::new(),
            contacts: HashMap::new(),
            tasks: TaskQueue::new(),
            logger: DiagnosticsLogger::new(),
            last_seen: HostTime(0),
        }
    }

    /// Enables visualization with `config`.
    ///
    /// Removes markers left on the surface by other overlays. Calling it
    /// again replaces the configuration for contacts that begin afterwards.
    pub fn start(&mut self, config: Configuration) {
        self.config = Some(config);
        self.enabled = true;
        for key in self.surface.markers() {
            if key.overlay != self.overlay {
                self.surface.detach(key);
            }
        }
        if config.shows_log {
            tracing::info!(overlay = self.overlay.0, "visualizer started");
        }
    }

    /// Disables visualization and removes every indicator immediately.
    pub fn stop(&mut self) {
        self.enabled = false;
        self.hard_reset();
    }

    /// Whether [`handle`](Self::handle) currently has any effect.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The configuration of the current (or last) session.
    #[must_use]
    pub fn config(&self) -> Option<&Configuration> {
        self.config.as_ref()
    }

    /// Processes one batch of host events.
    ///
    /// Ignored unless enabled and `batch.kind` is [`EventKind::Touches`].
    pub fn handle(&mut self, batch: &EventBatch) {
        if !self.enabled || batch.kind != EventKind::Touches {
            tracing::trace!(overlay = self.overlay.0, kind = ?batch.kind, "batch ignored");
            return;
        }
        let now = batch.timestamp;
        self.last_seen = self.last_seen.max(now);
        for contact in &batch.contacts {
            match contact.phase {
                Phase::Began => self.begin(contact, now),
                Phase::Moved | Phase::Stationary => self.track(contact),
                phase if phase.is_terminal() => self.end(contact, now),
                _ => {}
            }
            self.sink.on_contact(&ContactEvent {
                overlay: self.overlay,
                timestamp: now,
                contact: *contact,
                slot: self.bindings.get(&contact.id).copied(),
            });
            self.log(contact, now);
        }
        self.flush();
    }

    /// Runs the indicator refreshes and fade completions due at `now`, and
    /// updates fading opacity.
    pub fn advance(&mut self, now: HostTime) {
        self.last_seen = self.last_seen.max(now);
        while let Some((_, kind)) = self.tasks.pop_due(now) {
            match kind {
                TaskKind::Tick { slot } => {
                    let radius = self
                        .pool
                        .get(slot)
                        .and_then(|i| i.bound_contact())
                        .and_then(|id| self.contacts.get(&id))
                        .and_then(Contact::measured_radius)
                        .filter(|_| self.capabilities.reports_radius);
                    self.pool.slot_mut(slot).tick(now, radius, self.timebase);
                }
                TaskKind::FadeComplete {
                    slot,
                    generation,
                    contact,
                } => {
                    if self.pool.get(slot).map(|i| i.generation()) != Some(generation) {
                        continue;
                    }
                    if self.finish(slot, now) {
                        self.log(&contact, now);
                    }
                }
            }
        }
        for (_, indicator) in self.pool.iter_mut() {
            indicator.update_fade(now);
        }
        self.flush();
    }

    /// Drops every indicator immediately, e.g. because the host's coordinate
    /// space rotated. Enablement is unchanged; contacts still down are only
    /// shown again once they begin anew.
    pub fn orientation_changed(&mut self) {
        self.hard_reset();
    }

    /// Removes every marker this dispatcher placed, without changing
    /// enablement.
    pub fn remove_all_markers(&mut self) {
        self.hard_reset();
    }

    /// Contacts currently shown by a visible indicator, in slot order.
    #[must_use]
    pub fn active_contacts(&self) -> Vec<Contact> {
        self.pool
            .iter()
            .filter(|(_, i)| i.is_visible())
            .filter_map(|(_, i)| i.bound_contact())
            .filter_map(|id| self.contacts.get(&id))
            .copied()
            .collect()
    }

    /// The indicator pool.
    #[must_use]
    pub fn pool(&self) -> &IndicatorPool {
        &self.pool
    }

    /// The host surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The host surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The trace sink.
    #[must_use]
    pub fn sink(&self) -> &T {
        &self.sink
    }

    /// Identity tagging this dispatcher's markers.
    #[must_use]
    pub fn overlay_id(&self) -> OverlayId {
        self.overlay
    }

    /// Number of scheduled refreshes and fade completions.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn key(&self, slot: u32) -> MarkerKey {
        MarkerKey {
            overlay: self.overlay,
            slot,
        }
    }

    fn begin(&mut self, contact: &Contact, now: HostTime) {
        let Some(mut config) = self.config else {
            return;
        };
        // Without radius reports every indicator keeps its default size.
        config.shows_touch_radius &= self.capabilities.reports_radius;
        // A contact that is still bound either missed its end event or is
        // fading out; either way its old indicator goes first.
        if let Some(slot) = self.pool.find_bound(contact.id) {
            self.bindings.remove(&contact.id);
            self.finish(slot, now);
        }

        let slot = self.pool.acquire();
        let key = self.key(slot);
        let indicator = self.pool.slot_mut(slot);
        indicator.bind(slot, contact, &config, now, self.tick_period, &mut self.tasks);
        indicator.update_position(contact.position);
        let marker = indicator.marker();
        let generation = indicator.generation();
        // The attach below carries the full state.
        let _ = indicator.take_dirty();
        self.pool.attach(slot);
        self.surface.attach(key, &marker);

        self.bindings.insert(contact.id, slot);
        self.contacts.insert(contact.id, *contact);
        self.sink.on_indicator_bound(&IndicatorEvent {
            overlay: self.overlay,
            slot,
            generation,
            contact: contact.id,
            timestamp: now,
            position: contact.position,
        });
    }

    fn track(&mut self, contact: &Contact) {
        let Some(&slot) = self.bindings.get(&contact.id) else {
            tracing::trace!(contact = contact.id.0, "update for unknown contact ignored");
            return;
        };
        self.contacts.insert(contact.id, *contact);
        self.pool.slot_mut(slot).update_position(contact.position);
    }

    fn end(&mut self, contact: &Contact, now: HostTime) {
        let Some(slot) = self.bindings.remove(&contact.id) else {
            tracing::trace!(contact = contact.id.0, "end for unknown contact ignored");
            return;
        };
        self.contacts.remove(&contact.id);
        let indicator = self.pool.slot_mut(slot);
        indicator.release(slot, contact, now, self.fade, &mut self.tasks);
        let e = IndicatorEvent {
            overlay: self.overlay,
            slot,
            generation: indicator.generation(),
            contact: contact.id,
            timestamp: now,
            position: indicator.position(),
        };
        self.sink.on_indicator_released(&e);
    }

    /// Completes the release of `slot` and removes its marker. Returns
    /// whether there was anything to finish.
    fn finish(&mut self, slot: u32, now: HostTime) -> bool {
        let key = self.key(slot);
        let indicator = self.pool.slot_mut(slot);
        let bound = indicator.bound_contact();
        let generation = indicator.generation();
        let position = indicator.position();
        if !indicator.finish_release(&mut self.tasks) {
            return false;
        }
        self.surface.detach(key);
        if let Some(contact) = bound {
            self.contacts.remove(&contact);
            self.sink.on_indicator_detached(&IndicatorEvent {
                overlay: self.overlay,
                slot,
                generation,
                contact,
                timestamp: now,
                position,
            });
        }
        true
    }

    fn hard_reset(&mut self) {
        let now = self.last_seen;
        let detached: Vec<IndicatorEvent> = self
            .pool
            .iter()
            .filter(|(_, i)| i.is_attached())
            .filter_map(|(slot, i)| {
                i.bound_contact().map(|contact| IndicatorEvent {
                    overlay: self.overlay,
                    slot,
                    generation: i.generation(),
                    contact,
                    timestamp: now,
                    position: i.position(),
                })
            })
            .collect();
        for slot in self.pool.release_all(&mut self.tasks) {
            let key = self.key(slot);
            self.surface.detach(key);
        }
        for e in &detached {
            self.sink.on_indicator_detached(e);
        }
        self.bindings.clear();
        self.contacts.clear();
        self.logger.clear();
    }

    fn log(&mut self, contact: &Contact, now: HostTime) {
        let Some(config) = &self.config else {
            return;
        };
        if let Some(text) = self.logger.log(contact, &self.pool, config) {
            self.sink.on_log_frame(&LogFrameEvent {
                overlay: self.overlay,
                timestamp: now,
                text,
            });
        }
    }

    fn flush(&mut self) {
        let overlay = self.overlay;
        for (slot, indicator) in self.pool.iter_mut() {
            if indicator.take_dirty() && indicator.is_attached() {
                self.surface.update(MarkerKey { overlay, slot }, &indicator.marker());
            }
        }
    }
}

impl<S: Surface, T: TraceSink> EventObserver for Dispatcher<S, T> {
    fn observe(&mut self, batch: &EventBatch) {
        self.handle(batch);
    }

    fn orientation_changed(&mut self) {
        self.hard_reset();
    }
}
