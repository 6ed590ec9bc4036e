//! Field-and-panel coupling engine for a home-automation gateway: polls
//! Modbus/TCP field devices on a priority schedule, applies per-area
//! signal transforms (debounce, toggle latch, polarity, analog deadband),
//! and keeps an HMI panel in half-duplex sync with the result.
//!
//! Grounded throughout on `original_source/` (the Arduino controller this
//! crate replaces) and on `groblegark-coop`'s async/service idioms; see
//! `DESIGN.md` at the workspace root for the module-by-module grounding
//! ledger.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod area;
pub mod buffer;
pub mod callbacks;
pub mod cell;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod error_budget;
pub mod gateway;
pub mod hmi;
pub mod modbus;
pub mod pipeline;
pub mod signal;
pub mod system;
pub mod transform;
pub mod watchdog;
