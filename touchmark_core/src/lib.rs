// Copyright 2026 the Touchmark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contact tracking and indicator pooling for touch visualization overlays.
//!
//! `touchmark_core` draws a transient marker under every finger (or pointer)
//! that is down on a host surface, for demos, screen recordings, and input
//! debugging. It is `no_std` compatible (with `alloc`); all platform work is
//! delegated to a [`Surface`](surface::Surface) implementation and a backend
//! that feeds it events and time.
//!
//! # Architecture
//!
//! ```text
//!   Backend (pointer events)
//!       │
//!       ▼
//!   EventInterceptor ──► Dispatcher::handle() ──► host's own handler
//!                              │
//!              ┌───────────────┼──────────────────┐
//!              ▼               ▼                  ▼
//!        IndicatorPool    DiagnosticsLogger    TraceSink
//!              │
//!              ▼
//!        Surface::attach / update / detach
//!
//!   Backend (frame callback) ──► Dispatcher::advance() ──► ticks, fades
//! ```
//!
//! **[`dispatcher`]**: The state machine binding contacts to indicators.
//! One indicator per contact identity, reused once its fade-out completes.
//!
//! **[`indicator`]**: The reusable marker and its grow-only pool.
//!
//! **[`task`]**: Cancellable one-shot and repeating tasks, run only from
//! [`Dispatcher::advance`](dispatcher::Dispatcher::advance).
//!
//! **[`source`]**: The [`EventInterceptor`](source::EventInterceptor) that
//! shows host events to the dispatcher before the host handles them.
//!
//! **[`diagnostics`]**: Deduplicated per-event text frames.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, and
//! the default `tracing`-backed sink.
//!
//! **[`surface`]**, **[`contact`]**, **[`config`]**, **[`time`]**: The data
//! exchanged with the host.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod contact;
pub mod diagnostics;
pub mod dispatcher;
pub mod indicator;
pub mod source;
pub mod surface;
pub mod task;
pub mod time;
pub mod trace;
