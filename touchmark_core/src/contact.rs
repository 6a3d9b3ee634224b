// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contact records and event batches delivered by the host.
//!
//! A *contact* is one physical pointer or touch interaction. The host owns its
//! lifetime and identifies it with an opaque [`ContactId`]; this crate only
//! ever refers to contacts by that identity and looks the latest sample up
//! when it needs one.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use crate::time::HostTime;

/// Opaque identity token for a contact, assigned by the host.
///
/// Identities only need to be unique among contacts that are down at the same
/// time; hosts are free to reuse them afterwards (browsers reuse pointer ids).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactId(pub u64);

impl fmt::Debug for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContactId({})", self.0)
    }
}

/// Lifecycle stage of a contact at a given event.
///
/// `Unknown` is the catch-all for phases a newer host may report; it is
/// dispatched like the region phases (logged, no visual effect).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The contact touched down.
    Began,
    /// The contact moved.
    Moved,
    /// The contact is down but did not move since the previous event.
    Stationary,
    /// The contact lifted.
    Ended,
    /// The host cancelled the contact (e.g. a system gesture took over).
    Cancelled,
    /// A hovering pointer entered the surface.
    RegionEntered,
    /// A hovering pointer moved within the surface.
    RegionMoved,
    /// A hovering pointer left the surface.
    RegionExited,
    /// A phase this crate does not recognise.
    Unknown,
}

impl Phase {
    /// Returns the single-letter code used in diagnostics lines.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Began => 'B',
            Self::Moved => 'M',
            Self::Stationary => 'S',
            Self::Ended => 'E',
            Self::Cancelled => 'C',
            Self::RegionEntered => 'N',
            Self::RegionMoved => 'V',
            Self::RegionExited => 'X',
            Self::Unknown => 'Z',
        }
    }

    /// Inverse of [`code`](Self::code); unrecognised codes map to
    /// [`Phase::Unknown`].
    #[must_use]
    pub const fn from_code(code: char) -> Self {
        match code {
            'B' => Self::Began,
            'M' => Self::Moved,
            'S' => Self::Stationary,
            'E' => Self::Ended,
            'C' => Self::Cancelled,
            'N' => Self::RegionEntered,
            'V' => Self::RegionMoved,
            'X' => Self::RegionExited,
            _ => Self::Unknown,
        }
    }

    /// Whether this phase ends the contact's lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// One contact sample as delivered in an [`EventBatch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Host-assigned identity.
    pub id: ContactId,
    /// Phase of this sample.
    pub phase: Phase,
    /// Location in the overlay surface's coordinate space.
    pub position: Point,
    /// Major radius of the contact area, if the host can measure it.
    ///
    /// `None` (or zero) on hosts that cannot report it, such as a mouse or a
    /// simulator.
    pub radius: Option<f64>,
}

impl Contact {
    /// Creates a contact sample without a radius measurement.
    #[must_use]
    pub const fn new(id: ContactId, phase: Phase, position: Point) -> Self {
        Self {
            id,
            phase,
            position,
            radius: None,
        }
    }

    /// Returns this sample with the given radius measurement.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Returns the radius if it is a usable measurement (finite and positive).
    #[must_use]
    pub fn measured_radius(&self) -> Option<f64> {
        self.radius.filter(|r| r.is_finite() && *r > 0.0)
    }
}

/// Class of a host event.
///
/// Only [`EventKind::Touches`] batches reach the indicator state machine;
/// other classes share the same delivery path on most hosts and are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer or touch contacts.
    Touches,
    /// Physical button presses.
    Presses,
    /// Device motion (shake etc.).
    Motion,
    /// Anything else the host forwards.
    Other,
}

/// All contact samples the host delivered in one dispatch tick.
#[derive(Clone, Debug, PartialEq)]
pub struct EventBatch {
    /// Event class.
    pub kind: EventKind,
    /// Host time of the dispatch tick.
    pub timestamp: HostTime,
    /// Contact samples, in host order.
    pub contacts: Vec<Contact>,
}

impl EventBatch {
    /// Creates a [`EventKind::Touches`] batch.
    #[must_use]
    pub fn touches(timestamp: HostTime, contacts: Vec<Contact>) -> Self {
        Self {
            kind: EventKind::Touches,
            timestamp,
            contacts,
        }
    }

    /// Creates an empty batch of a non-contact class.
    #[must_use]
    pub fn other(kind: EventKind, timestamp: HostTime) -> Self {
        Self {
            kind,
            timestamp,
            contacts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_codes_are_distinct() {
        let phases = [
            Phase::Began,
            Phase::Moved,
            Phase::Stationary,
            Phase::Ended,
            Phase::Cancelled,
            Phase::RegionEntered,
            Phase::RegionMoved,
            Phase::RegionExited,
            Phase::Unknown,
        ];
        let codes: alloc::string::String = phases.iter().map(|p| p.code()).collect();
        assert_eq!(codes, "BMSECNVXZ");
        for p in phases {
            assert_eq!(Phase::from_code(p.code()), p);
        }
        assert_eq!(Phase::from_code('?'), Phase::Unknown);
    }

    #[test]
    fn only_ended_and_cancelled_are_terminal() {
        assert!(Phase::Ended.is_terminal());
        assert!(Phase::Cancelled.is_terminal());
        assert!(!Phase::Stationary.is_terminal());
        assert!(!Phase::RegionExited.is_terminal());
    }

    #[test]
    fn measured_radius_rejects_unusable_values() {
        let c = Contact::new(ContactId(1), Phase::Began, Point::ZERO);
        assert_eq!(c.measured_radius(), None);
        assert_eq!(c.with_radius(0.0).measured_radius(), None);
        assert_eq!(c.with_radius(-3.0).measured_radius(), None);
        assert_eq!(c.with_radius(f64::NAN).measured_radius(), None);
        assert_eq!(c.with_radius(22.5).measured_radius(), Some(22.5));
    }
}
