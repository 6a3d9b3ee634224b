// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM marker surface.
//!
//! Each marker is an absolutely positioned, round `<div>` appended to a
//! container element. Markers carry `data-touchmark-overlay` and
//! `data-touchmark-slot` attributes, so markers left behind by another
//! overlay (or a previous page state) can be found and removed.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Affine;
use touchmark_core::config::Color;
use touchmark_core::surface::{Marker, MarkerKey, OverlayId, Surface};
use wasm_bindgen::JsCast as _;
use web_sys::{Document, Element, HtmlElement};

use crate::BackendError;

const OVERLAY_ATTR: &str = "data-touchmark-overlay";
const SLOT_ATTR: &str = "data-touchmark-slot";

/// Draws markers as child `<div>`s of a container element.
///
/// The container should be positioned (e.g. `position: relative`) and sit
/// above the host content; markers never receive pointer events.
pub struct DomSurface {
    container: HtmlElement,
    document: Document,
    elements: BTreeMap<MarkerKey, HtmlElement>,
}

impl core::fmt::Debug for DomSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomSurface")
            .field("container", &"HtmlElement")
            .field("markers", &self.elements.len())
            .finish()
    }
}

impl DomSurface {
    /// Creates a surface that manages marker elements inside `container`.
    pub fn new(container: HtmlElement) -> Result<Self, BackendError> {
        let document = container.owner_document().ok_or(BackendError::NoDocument)?;
        Ok(Self {
            container,
            document,
            elements: BTreeMap::new(),
        })
    }

    /// Returns a reference to the container element.
    #[must_use]
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Returns the element drawing `key`, if this surface created it.
    #[must_use]
    pub fn element(&self, key: MarkerKey) -> Option<&HtmlElement> {
        self.elements.get(&key)
    }

    fn create(&self, key: MarkerKey) -> Option<HtmlElement> {
        let el: HtmlElement = self.document.create_element("div").ok()?.unchecked_into();
        let _ = el.set_attribute(OVERLAY_ATTR, &format!("{}", key.overlay.0));
        let _ = el.set_attribute(SLOT_ATTR, &format!("{}", key.slot));
        let s = el.style();
        let _ = s.set_property("position", "absolute");
        let _ = s.set_property("box-sizing", "border-box");
        let _ = s.set_property("border-radius", "50%");
        let _ = s.set_property("pointer-events", "none");
        let _ = s.set_property("transform-origin", "50% 50%");
        let _ = s.set_property("display", "flex");
        let _ = s.set_property("align-items", "flex-start");
        let _ = s.set_property("justify-content", "center");
        let _ = s.set_property("font", "11px monospace");
        Some(el)
    }
}

impl Surface for DomSurface {
    fn attach(&mut self, key: MarkerKey, marker: &Marker) {
        let Some(el) = self.create(key) else {
            tracing::warn!(overlay = key.overlay.0, slot = key.slot, "could not create marker element");
            return;
        };
        apply_marker(&el, marker);
        if self.container.append_child(&el).is_err() {
            tracing::warn!(overlay = key.overlay.0, slot = key.slot, "could not attach marker element");
            return;
        }
        if let Some(old) = self.elements.insert(key, el) {
            old.remove();
        }
    }

    fn update(&mut self, key: MarkerKey, marker: &Marker) {
        if let Some(el) = self.elements.get(&key) {
            apply_marker(el, marker);
        }
    }

    fn detach(&mut self, key: MarkerKey) {
        if let Some(el) = self.elements.remove(&key) {
            el.remove();
            return;
        }
        // Not ours: look it up in the DOM.
        let selector = format!(
            "[{OVERLAY_ATTR}=\"{}\"][{SLOT_ATTR}=\"{}\"]",
            key.overlay.0, key.slot
        );
        if let Ok(Some(el)) = self.container.query_selector(&selector) {
            el.remove();
        }
    }

    fn markers(&self) -> Vec<MarkerKey> {
        let Ok(list) = self.container.query_selector_all(&format!("[{OVERLAY_ATTR}]")) else {
            return self.elements.keys().copied().collect();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|el| {
                parse_key(
                    &el.get_attribute(OVERLAY_ATTR)?,
                    &el.get_attribute(SLOT_ATTR)?,
                )
            })
            .collect()
    }
}

fn apply_marker(el: &HtmlElement, marker: &Marker) {
    let s = el.style();
    let w = marker.size.width;
    let h = marker.size.height;
    let _ = s.set_property("left", &format!("{}px", marker.center.x - w / 2.0));
    let _ = s.set_property("top", &format!("{}px", marker.center.y - h / 2.0));
    let _ = s.set_property("width", &format!("{w}px"));
    let _ = s.set_property("height", &format!("{h}px"));
    let _ = s.set_property("background-color", &css_color(marker.color));
    let _ = s.set_property("color", &css_color(marker.color));
    let _ = s.set_property("opacity", &format!("{}", marker.opacity));
    let _ = s.set_property("transform", &css_matrix(marker.transform));
    el.set_text_content(marker.timer_label.as_deref());
}

/// Formats a color as CSS `rgba()`.
pub(crate) fn css_color(c: Color) -> String {
    format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, c.alpha)
}

/// Formats an affine transform as CSS `matrix()`.
pub(crate) fn css_matrix(xf: Affine) -> String {
    let [a, b, c, d, e, f] = xf.as_coeffs();
    format!("matrix({a}, {b}, {c}, {d}, {e}, {f})")
}

fn parse_key(overlay: &str, slot: &str) -> Option<MarkerKey> {
    Some(MarkerKey {
        overlay: OverlayId(overlay.parse().ok()?),
        slot: slot.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_render_as_rgba() {
        assert_eq!(css_color(Color::TOUCH_RED), "rgba(255, 64, 64, 0.8)");
    }

    #[test]
    fn radius_scale_renders_as_matrix() {
        assert_eq!(css_matrix(Affine::IDENTITY), "matrix(1, 0, 0, 1, 0, 0)");
        assert_eq!(css_matrix(Affine::scale(1.5)), "matrix(1.5, 0, 0, 1.5, 0, 0)");
    }

    #[test]
    fn marker_attributes_parse_back_to_keys() {
        assert_eq!(
            parse_key("3", "7"),
            Some(MarkerKey {
                overlay: OverlayId(3),
                slot: 7
            })
        );
        assert_eq!(parse_key("x", "7"), None);
        assert_eq!(parse_key("3", "-1"), None);
    }
}
