// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.
//!
//! A [`Configuration`] is passed to
//! [`Dispatcher::start`](crate::dispatcher::Dispatcher::start) and stays
//! immutable for the session. Each indicator copies it on bind, so restarting
//! with a new configuration only affects contacts that begin afterwards.

use kurbo::Size;

/// An sRGB color with 8-bit channels and a floating-point alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
}

impl Color {
    /// The default indicator tint.
    pub const TOUCH_RED: Self = Self::rgba(255, 64, 64, 0.8);

    /// Creates a color from channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self { r, g, b, alpha }
    }
}

/// Error returned by [`ConfigurationBuilder::build`].
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The indicator size is not a finite, positive extent.
    #[error("indicator size must be finite and positive, got {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
    /// The color alpha is outside `0.0..=1.0`.
    #[error("color alpha must be within 0.0..=1.0, got {0}")]
    InvalidAlpha(f32),
}

/// Visual and diagnostic options for one visualization session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Configuration {
    /// Indicator size before any radius scaling.
    pub default_size: Size,
    /// Indicator tint (also used for the timer label).
    pub color: Color,
    /// Scale indicators by the measured contact radius.
    pub shows_touch_radius: bool,
    /// Show an elapsed-time label above each indicator.
    pub shows_timer: bool,
    /// Emit per-frame diagnostics lines.
    pub shows_log: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Configuration {
    /// Default indicator edge length.
    pub const DEFAULT_EXTENT: f64 = 60.0;

    /// The default configuration: 60×60 red-ish markers, radius scaling on,
    /// timer and log off.
    pub const DEFAULT: Self = Self {
        default_size: Size::new(Self::DEFAULT_EXTENT, Self::DEFAULT_EXTENT),
        color: Color::TOUCH_RED,
        shows_touch_radius: true,
        shows_timer: false,
        shows_log: false,
    };

    /// Starts a builder from the defaults.
    #[must_use]
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder {
            config: Self::DEFAULT,
        }
    }

    /// The radius that maps to a scale ratio of `1.0`.
    #[must_use]
    pub fn reference_radius(&self) -> f64 {
        self.default_size.width / 2.0
    }
}

/// Builder for [`Configuration`]; unspecified fields keep their defaults.
#[derive(Clone, Copy, Debug)]
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    /// Sets the indicator size.
    #[must_use]
    pub fn default_size(mut self, size: Size) -> Self {
        self.config.default_size = size;
        self
    }

    /// Sets the indicator tint.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.config.color = color;
        self
    }

    /// Enables or disables radius-driven scaling.
    #[must_use]
    pub fn shows_touch_radius(mut self, on: bool) -> Self {
        self.config.shows_touch_radius = on;
        self
    }

    /// Enables or disables the elapsed-time label.
    #[must_use]
    pub fn shows_timer(mut self, on: bool) -> Self {
        self.config.shows_timer = on;
        self
    }

    /// Enables or disables diagnostics lines.
    #[must_use]
    pub fn shows_log(mut self, on: bool) -> Self {
        self.config.shows_log = on;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<Configuration, ConfigError> {
        let Size { width, height } = self.config.default_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidSize { width, height });
        }
        let alpha = self.config.color.alpha;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ConfigError::InvalidAlpha(alpha));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = Configuration::default();
        assert_eq!(c.default_size, Size::new(60.0, 60.0));
        assert!(c.shows_touch_radius);
        assert!(!c.shows_timer);
        assert!(!c.shows_log);
        assert_eq!(c.reference_radius(), 30.0);
    }

    #[test]
    fn builder_keeps_unspecified_defaults() {
        let c = Configuration::builder().shows_log(true).build().unwrap();
        assert!(c.shows_log);
        assert_eq!(c.color, Color::TOUCH_RED);
        assert!(c.shows_touch_radius);
    }

    #[test]
    fn builder_rejects_degenerate_sizes() {
        for size in [
            Size::new(0.0, 60.0),
            Size::new(60.0, -1.0),
            Size::new(f64::INFINITY, 60.0),
            Size::new(f64::NAN, 60.0),
        ] {
            let err = Configuration::builder().default_size(size).build();
            assert!(
                matches!(err, Err(ConfigError::InvalidSize { .. })),
                "{size:?} should be rejected"
            );
        }
    }

    #[test]
    fn builder_rejects_out_of_range_alpha() {
        let err = Configuration::builder()
            .color(Color::rgba(0, 0, 0, 1.5))
            .build();
        assert_eq!(err, Err(ConfigError::InvalidAlpha(1.5)));
    }
}
