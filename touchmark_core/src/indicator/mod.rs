// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contact indicators and the pool that recycles them.

#[expect(
    clippy::module_inception,
    reason = "the indicator type lives next to its pool"
)]
mod indicator;
mod pool;

pub use indicator::{Indicator, IndicatorState};
pub use pool::IndicatorPool;

use crate::time::{Duration, Timebase};

/// Period of the indicator refresh, in nanoseconds (60 Hz).
pub const TICK_PERIOD_NANOS: u64 = 16_666_667;

/// Length of the fade-out after a contact ends, in nanoseconds.
pub const FADE_NANOS: u64 = 200_000_000;

/// Refresh period expressed in `timebase` ticks.
#[must_use]
pub const fn tick_period(timebase: Timebase) -> Duration {
    Duration::from_nanos(TICK_PERIOD_NANOS, timebase)
}

/// Fade-out length expressed in `timebase` ticks.
#[must_use]
pub const fn fade_duration(timebase: Timebase) -> Duration {
    Duration::from_nanos(FADE_NANOS, timebase)
}
