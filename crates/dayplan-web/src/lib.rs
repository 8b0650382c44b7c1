#![forbid(unsafe_code)]

//! `dayplan-web` wires browser touch input into `dayplan-core`.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding JS pushes touch signals and applies
//!   the returned [`touch::HostCommand`]s to the DOM.
//! - **No bindings**: this crate does not depend on `wasm-bindgen`; a thin
//!   shim forwards events and drains the [`vibration::VibrationQueue`].
//! - **Explicit time**: drop-zoom transitions advance through
//!   [`touch::TouchAdapter::tick`].

#[cfg(feature = "input-parser")]
pub mod input_parser;
pub mod touch;
pub mod vibration;

#[cfg(feature = "input-parser")]
pub use input_parser::{TouchParseError, parse_touch_event};
pub use touch::{HostCommand, TouchAdapter, TouchDispatch, TouchInput, TouchPoint};
pub use vibration::VibrationQueue;
