// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation contract for host surfaces.
//!
//! Touchmark splits platform-specific work into *backend* crates. A backend
//! provides:
//!
//! - **Event feed**: converts native pointer events into
//!   [`EventBatch`](crate::contact::EventBatch)es and hands them to an
//!   [`EventInterceptor`](crate::source::EventInterceptor) ahead of the host's
//!   own handling.
//! - **Time**: a `now() -> HostTime` free function and the matching
//!   [`Timebase`](crate::time::Timebase).
//! - **Surface**: implements [`Surface`] to draw markers on top of the host
//!   content (e.g. absolutely positioned DOM elements).
//!
//! The dispatcher never draws anything itself. It hands the surface a
//! [`Marker`] snapshot whenever an indicator is attached or its visible state
//! changes, and asks the surface to drop the marker once the indicator is
//! reusable again.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use kurbo::{Affine, Point, Size};

use crate::config::Color;

/// Identifies the dispatcher that owns a marker.
///
/// Every [`Dispatcher`](crate::dispatcher::Dispatcher) allocates a fresh id,
/// so markers left on a shared surface by another (or an earlier) dispatcher
/// can be told apart from its own.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(pub u32);

impl OverlayId {
    /// Allocates a process-unique id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverlayId({})", self.0)
    }
}

/// Addresses one marker on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerKey {
    /// Owning dispatcher.
    pub overlay: OverlayId,
    /// Pool slot of the indicator drawn by this marker.
    pub slot: u32,
}

/// Everything a surface needs to draw one indicator.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Center of the marker in surface coordinates.
    pub center: Point,
    /// Unscaled size of the marker.
    pub size: Size,
    /// Transform about the marker's own center (radius scaling).
    pub transform: Affine,
    /// Opacity in `0.0..=1.0`; animates to zero while fading out.
    pub opacity: f32,
    /// Marker tint.
    pub color: Color,
    /// Elapsed-time label, when the session shows timers.
    pub timer_label: Option<String>,
}

/// A host surface markers are drawn on.
///
/// Implementations must tolerate `update` and `detach` for keys they never
/// saw (a host may have cleared its view hierarchy on its own).
pub trait Surface {
    /// Adds a marker for `key`.
    fn attach(&mut self, key: MarkerKey, marker: &Marker);

    /// Replaces the visible state of an attached marker.
    fn update(&mut self, key: MarkerKey, marker: &Marker);

    /// Removes the marker for `key`.
    fn detach(&mut self, key: MarkerKey);

    /// Lists every marker currently on the surface, whoever owns it.
    fn markers(&self) -> Vec<MarkerKey>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn attach(&mut self, key: MarkerKey, marker: &Marker) {
        (**self).attach(key, marker);
    }

    fn update(&mut self, key: MarkerKey, marker: &Marker) {
        (**self).update(key, marker);
    }

    fn detach(&mut self, key: MarkerKey) {
        (**self).detach(key);
    }

    fn markers(&self) -> Vec<MarkerKey> {
        (**self).markers()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;

    use super::{Marker, MarkerKey, Surface};

    /// In-memory surface that remembers every call.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) live: BTreeMap<MarkerKey, Marker>,
        pub(crate) attaches: usize,
        pub(crate) updates: usize,
        pub(crate) detaches: usize,
    }

    impl Surface for RecordingSurface {
        fn attach(&mut self, key: MarkerKey, marker: &Marker) {
            self.attaches += 1;
            self.live.insert(key, marker.clone());
        }

        fn update(&mut self, key: MarkerKey, marker: &Marker) {
            self.updates += 1;
            if let Some(m) = self.live.get_mut(&key) {
                *m = marker.clone();
            }
        }

        fn detach(&mut self, key: MarkerKey) {
            self.detaches += 1;
            self.live.remove(&key);
        }

        fn markers(&self) -> Vec<MarkerKey> {
            self.live.keys().copied().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_ids_are_unique() {
        let a = OverlayId::next();
        let b = OverlayId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn marker_keys_order_by_overlay_then_slot() {
        let k = |o, s| MarkerKey {
            overlay: OverlayId(o),
            slot: s,
        };
        let mut keys = [k(2, 0), k(1, 5), k(1, 1)];
        keys.sort();
        assert_eq!(keys, [k(1, 1), k(1, 5), k(2, 0)]);
    }
}
