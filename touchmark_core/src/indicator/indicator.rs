// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single reusable contact marker.

use alloc::format;
use alloc::string::String;

use kurbo::{Affine, Point, Size};

use crate::config::Configuration;
use crate::contact::{Contact, ContactId};
use crate::surface::Marker;
use crate::task::{TaskHandle, TaskKind, TaskQueue};
use crate::time::{Duration, HostTime, Timebase};

/// Where an indicator is in its bind/release cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorState {
    /// Not bound; reusable once detached.
    Idle,
    /// Bound to a contact that is down.
    Active,
    /// The contact ended; the marker is fading out and still occupies its
    /// surface slot.
    Releasing {
        /// When the fade began.
        fade_start: HostTime,
        /// When the fade completes.
        fade_end: HostTime,
    },
}

/// A reusable visual marker for one contact.
///
/// Indicators are owned by an [`IndicatorPool`](super::IndicatorPool) and
/// driven by the dispatcher. The contact is referenced by identity only; the
/// indicator never owns or outlives-checks it.
#[derive(Debug)]
pub struct Indicator {
    state: IndicatorState,
    bound_contact: Option<ContactId>,
    config: Configuration,
    position: Point,
    size: Size,
    scale_ratio: f64,
    transform: Affine,
    elapsed_start: Option<HostTime>,
    timer_label: Option<String>,
    opacity: f32,
    visible: bool,
    attached: bool,
    tick: Option<TaskHandle>,
    fade: Option<TaskHandle>,
    generation: u32,
    dirty: bool,
}

impl Default for Indicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator {
    /// Creates an idle, detached indicator with the default size.
    #[must_use]
    pub fn new() -> Self {
        let config = Configuration::DEFAULT;
        Self {
            state: IndicatorState::Idle,
            bound_contact: None,
            config,
            position: Point::ZERO,
            size: config.default_size,
            scale_ratio: 1.0,
            transform: Affine::IDENTITY,
            elapsed_start: None,
            timer_label: None,
            opacity: 0.0,
            visible: false,
            attached: false,
            tick: None,
            fade: None,
            generation: 0,
            dirty: false,
        }
    }

    /// Binds this indicator to `contact` and starts its periodic refresh.
    ///
    /// Resets scale, opacity, and elapsed time, and resizes to
    /// `config.default_size`. The first refresh fires one `tick_period` after
    /// `now`; radius scaling is applied immediately when enabled.
    ///
    /// # Panics
    ///
    /// Panics if the indicator is already bound.
    pub fn bind(
        &mut self,
        slot: u32,
        contact: &Contact,
        config: &Configuration,
        now: HostTime,
        tick_period: Duration,
        tasks: &mut TaskQueue,
    ) {
        assert!(
            self.bound_contact.is_none(),
            "indicator in slot {slot} is already bound to {:?}",
            self.bound_contact
        );
        self.cancel_tasks(tasks);

        self.generation = self.generation.wrapping_add(1);
        self.state = IndicatorState::Active;
        self.bound_contact = Some(contact.id);
        self.config = *config;
        self.size = config.default_size;
        self.scale_ratio = 1.0;
        self.transform = Affine::IDENTITY;
        self.elapsed_start = Some(now);
        self.timer_label = config.shows_timer.then(|| String::from("0.00"));
        self.opacity = 1.0;
        self.visible = true;
        self.dirty = true;

        self.tick = Some(tasks.schedule_repeating(
            now.saturating_add(tick_period),
            tick_period,
            TaskKind::Tick { slot },
        ));

        if config.shows_touch_radius {
            self.apply_radius(contact.measured_radius());
        }
    }

    /// Moves the indicator.
    ///
    /// # Panics
    ///
    /// Panics if the indicator is not bound.
    pub fn update_position(&mut self, point: Point) {
        assert!(
            self.bound_contact.is_some(),
            "update_position on an unbound indicator"
        );
        if self.position != point {
            self.position = point;
            self.dirty = true;
        }
    }

    /// Periodic refresh: recomputes the elapsed-time label and, when radius
    /// display is on, the scale from `radius`.
    ///
    /// A missing or unusable radius leaves the scale unchanged. Does nothing
    /// unless the indicator is [`IndicatorState::Active`]. Returns whether
    /// anything visible changed.
    pub fn tick(&mut self, now: HostTime, radius: Option<f64>, timebase: Timebase) -> bool {
        if self.state != IndicatorState::Active {
            return false;
        }
        let was_dirty = self.dirty;
        self.dirty = false;
        if let (Some(start), Some(label)) = (self.elapsed_start, self.timer_label.as_mut()) {
            let secs = now.saturating_duration_since(start).as_secs_f64(timebase);
            let text = format!("{secs:.2}");
            if *label != text {
                *label = text;
                self.dirty = true;
            }
        }
        if self.config.shows_touch_radius {
            self.apply_radius(radius.filter(|r| r.is_finite() && *r > 0.0));
        }
        let changed = self.dirty;
        self.dirty |= was_dirty;
        changed
    }

    /// Stops the refresh and begins the fade-out.
    ///
    /// The contact stays bound until [`finish_release`](Self::finish_release)
    /// runs from the scheduled completion, which is when the indicator
    /// becomes reusable. `contact` is the terminal sample, handed back with
    /// the completion.
    ///
    /// # Panics
    ///
    /// Panics if the indicator is not [`IndicatorState::Active`].
    pub fn release(
        &mut self,
        slot: u32,
        contact: &Contact,
        now: HostTime,
        fade: Duration,
        tasks: &mut TaskQueue,
    ) {
        assert!(
            self.state == IndicatorState::Active,
            "release on an indicator that is not active: {:?}",
            self.state
        );
        self.cancel_tasks(tasks);
        let fade_end = now.saturating_add(fade);
        self.state = IndicatorState::Releasing {
            fade_start: now,
            fade_end,
        };
        self.fade = Some(tasks.schedule_once(
            fade_end,
            TaskKind::FadeComplete {
                slot,
                generation: self.generation,
                contact: *contact,
            },
        ));
    }

    /// Interpolates the fade-out opacity for `now`.
    pub fn update_fade(&mut self, now: HostTime) {
        let IndicatorState::Releasing {
            fade_start,
            fade_end,
        } = self.state
        else {
            return;
        };
        let total = fade_end.saturating_duration_since(fade_start).ticks();
        let done = now.saturating_duration_since(fade_start).ticks();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "opacity only needs f32 precision"
        )]
        let opacity = if total == 0 || done >= total {
            0.0
        } else {
            (1.0 - done as f64 / total as f64) as f32
        };
        if opacity != self.opacity {
            self.opacity = opacity;
            self.dirty = true;
        }
    }

    /// Completes a release: unbinds, hides, and detaches the indicator.
    ///
    /// Returns `false` (and does nothing) if there was nothing to finish, so
    /// the completion effect runs at most once per bind.
    pub fn finish_release(&mut self, tasks: &mut TaskQueue) -> bool {
        if self.state == IndicatorState::Idle && !self.attached {
            return false;
        }
        self.reset(tasks);
        true
    }

    /// Immediately returns the indicator to idle and detached, cancelling any
    /// refresh or fade.
    pub fn reset(&mut self, tasks: &mut TaskQueue) {
        self.cancel_tasks(tasks);
        self.state = IndicatorState::Idle;
        self.bound_contact = None;
        self.elapsed_start = None;
        self.timer_label = None;
        self.opacity = 0.0;
        self.visible = false;
        self.attached = false;
        self.dirty = false;
    }

    /// Renders the current visible state.
    #[must_use]
    pub fn marker(&self) -> Marker {
        Marker {
            center: self.position,
            size: self.size,
            transform: self.transform,
            opacity: self.opacity,
            color: self.config.color,
            timer_label: self.timer_label.clone(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> IndicatorState {
        self.state
    }

    /// The contact this indicator visualizes (kept through the fade-out).
    #[must_use]
    pub fn bound_contact(&self) -> Option<ContactId> {
        self.bound_contact
    }

    /// Center position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Last applied radius scale.
    #[must_use]
    pub fn scale_ratio(&self) -> f64 {
        self.scale_ratio
    }

    /// When the current binding started.
    #[must_use]
    pub fn elapsed_start(&self) -> Option<HostTime> {
        self.elapsed_start
    }

    /// Elapsed-time label, when the session shows timers.
    #[must_use]
    pub fn timer_label(&self) -> Option<&str> {
        self.timer_label.as_deref()
    }

    /// Current opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether the marker is visible (from bind to the end of its fade).
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the indicator occupies a slot on the surface.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Bind counter; changes on every [`bind`](Self::bind).
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Handle of the pending refresh, if any.
    #[must_use]
    pub fn tick_handle(&self) -> Option<TaskHandle> {
        self.tick
    }

    /// Handle of the pending fade completion, if any.
    #[must_use]
    pub fn fade_handle(&self) -> Option<TaskHandle> {
        self.fade
    }

    pub(crate) fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    /// Returns whether the visible state changed since the last call.
    pub(crate) fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    fn apply_radius(&mut self, radius: Option<f64>) {
        let Some(radius) = radius else {
            return;
        };
        let ratio = radius / self.config.reference_radius();
        // A zero-width configuration has no reference radius.
        if !ratio.is_finite() {
            return;
        }
        // Only touch the transform when the ratio moves.
        if ratio != self.scale_ratio {
            self.scale_ratio = ratio;
            self.transform = Affine::scale(ratio);
            self.dirty = true;
        }
    }

    fn cancel_tasks(&mut self, tasks: &mut TaskQueue) {
        if let Some(h) = self.tick.take() {
            tasks.cancel(h);
        }
        if let Some(h) = self.fade.take() {
            tasks.cancel(h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Phase;

    const PERIOD: Duration = Duration(16_666_667);
    const FADE: Duration = Duration(200_000_000);

    fn contact(radius: Option<f64>) -> Contact {
        Contact {
            id: ContactId(7),
            phase: Phase::Began,
            position: Point::new(10.0, 10.0),
            radius,
        }
    }

    fn bound(config: &Configuration, radius: Option<f64>) -> (Indicator, TaskQueue) {
        let mut tasks = TaskQueue::new();
        let mut ind = Indicator::new();
        ind.bind(0, &contact(radius), config, HostTime(0), PERIOD, &mut tasks);
        (ind, tasks)
    }

    #[test]
    fn bind_resets_visual_state_and_schedules_refresh() {
        let (ind, tasks) = bound(&Configuration::DEFAULT, None);
        assert_eq!(ind.state(), IndicatorState::Active);
        assert_eq!(ind.bound_contact(), Some(ContactId(7)));
        assert!(ind.is_visible());
        assert_eq!(ind.opacity(), 1.0);
        assert_eq!(ind.scale_ratio(), 1.0);
        assert_eq!(ind.elapsed_start(), Some(HostTime(0)));
        assert_eq!(ind.timer_label(), None);
        assert_eq!(tasks.len(), 1);
        assert!(tasks.is_pending(ind.tick_handle().unwrap()));
    }

    #[test]
    #[should_panic(expected = "already bound")]
    fn double_bind_panics() {
        let (mut ind, mut tasks) = bound(&Configuration::DEFAULT, None);
        ind.bind(
            0,
            &contact(None),
            &Configuration::DEFAULT,
            HostTime(1),
            PERIOD,
            &mut tasks,
        );
    }

    #[test]
    #[should_panic(expected = "unbound indicator")]
    fn moving_an_unbound_indicator_panics() {
        Indicator::new().update_position(Point::new(1.0, 1.0));
    }

    #[test]
    fn radius_scales_relative_to_half_width() {
        let (ind, _) = bound(&Configuration::DEFAULT, Some(45.0));
        assert_eq!(ind.scale_ratio(), 1.5);
        assert_eq!(ind.marker().transform, Affine::scale(1.5));
    }

    #[test]
    fn unchanged_radius_does_not_dirty_the_marker() {
        let (mut ind, _) = bound(&Configuration::DEFAULT, Some(45.0));
        assert!(ind.take_dirty());
        assert!(!ind.tick(HostTime(PERIOD.0), Some(45.0), Timebase::NANOS));
        assert!(!ind.take_dirty(), "same ratio must not trigger a redraw");
        assert!(ind.tick(HostTime(2 * PERIOD.0), Some(30.0), Timebase::NANOS));
        assert!(ind.take_dirty());
        assert_eq!(ind.scale_ratio(), 1.0);
    }

    #[test]
    fn missing_radius_keeps_ratio() {
        let (mut ind, _) = bound(&Configuration::DEFAULT, Some(60.0));
        assert_eq!(ind.scale_ratio(), 2.0);
        ind.tick(HostTime(PERIOD.0), None, Timebase::NANOS);
        ind.tick(HostTime(2 * PERIOD.0), Some(0.0), Timebase::NANOS);
        assert_eq!(ind.scale_ratio(), 2.0);
    }

    #[test]
    fn radius_ignored_when_display_is_off() {
        let config = Configuration::builder()
            .shows_touch_radius(false)
            .build()
            .unwrap();
        let (mut ind, _) = bound(&config, Some(60.0));
        ind.tick(HostTime(PERIOD.0), Some(90.0), Timebase::NANOS);
        assert_eq!(ind.scale_ratio(), 1.0);
    }

    #[test]
    fn timer_label_shows_elapsed_seconds() {
        let config = Configuration::builder().shows_timer(true).build().unwrap();
        let (mut ind, _) = bound(&config, None);
        assert_eq!(ind.timer_label(), Some("0.00"));
        ind.tick(HostTime(1_254_000_000), None, Timebase::NANOS);
        assert_eq!(ind.timer_label(), Some("1.25"));
        assert_eq!(ind.marker().timer_label.as_deref(), Some("1.25"));
    }

    #[test]
    fn release_cancels_refresh_and_fades_out() {
        let (mut ind, mut tasks) = bound(&Configuration::DEFAULT, None);
        let tick = ind.tick_handle().unwrap();
        ind.release(0, &contact(None), HostTime(1_000), FADE, &mut tasks);

        assert!(!tasks.is_pending(tick));
        assert!(tasks.is_pending(ind.fade_handle().unwrap()));
        assert_eq!(tasks.len(), 1);
        assert_eq!(ind.bound_contact(), Some(ContactId(7)), "kept until fade ends");
        assert!(ind.is_visible());

        ind.update_fade(HostTime(1_000 + FADE.0 / 2));
        assert!((ind.opacity() - 0.5).abs() < 1e-6);
        ind.update_fade(HostTime(1_000 + FADE.0));
        assert_eq!(ind.opacity(), 0.0);
    }

    #[test]
    fn finish_release_runs_once() {
        let (mut ind, mut tasks) = bound(&Configuration::DEFAULT, None);
        ind.set_attached(true);
        ind.release(0, &contact(None), HostTime(0), FADE, &mut tasks);
        assert!(ind.finish_release(&mut tasks));
        assert!(!ind.finish_release(&mut tasks));
        assert_eq!(ind.bound_contact(), None);
        assert!(!ind.is_visible());
        assert!(!ind.is_attached());
        assert!(tasks.is_empty());
    }

    #[test]
    fn rebind_bumps_generation() {
        let (mut ind, mut tasks) = bound(&Configuration::DEFAULT, None);
        let first = ind.generation();
        ind.reset(&mut tasks);
        ind.bind(
            0,
            &contact(None),
            &Configuration::DEFAULT,
            HostTime(5),
            PERIOD,
            &mut tasks,
        );
        assert_ne!(first, ind.generation());
        assert_eq!(tasks.len(), 1, "only the new refresh is pending");
    }

    #[test]
    fn degenerate_size_keeps_identity_scale() {
        let config = Configuration {
            default_size: Size::new(0.0, 0.0),
            ..Configuration::DEFAULT
        };
        let (mut ind, _tasks) = bound(&config, Some(20.0));
        assert_eq!(ind.scale_ratio(), 1.0);
        ind.tick(HostTime(16), Some(40.0), Timebase::NANOS);
        assert_eq!(ind.scale_ratio(), 1.0);
        assert_eq!(ind.marker().transform, Affine::IDENTITY);
    }
}
