#![no_std]
#![forbid(unsafe_code)]

//! # ICU Driver
//!
//! Interrupt-driven input capture: a timer latches its counter on signal
//! edges and this crate turns the latched values into pulse width and period
//! measurements, delivered to callbacks from interrupt context.
//!
//! ## Module Overview
//! - [`config`]   – channel and driver configuration.
//! - [`channel`]  – per-unit state machine and measurement arithmetic.
//! - [`dispatch`] – interrupt-context edge dispatcher.
//! - [`driver`]   – lifecycle controller owning the units.
//! - [`shared`]   – `static` cell for the process-wide driver.
//! - [`fault`]    – fault hook for errors raised in interrupt context.
//! - [`ext`]      – pin-change line dispatcher.
//!
//! Platform register access lives in the port crates, behind
//! [`icu_core::CaptureAdapter`].

// This must go first so the logging macros are visible to the other modules.
mod fmt;

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod ext;
pub mod fault;
pub mod shared;

pub use icu_core::*;

pub use channel::{Capture, CaptureChannel, CaptureSample, ChannelState};
pub use config::{
    CaptureCallback, ChannelConfig, ChannelConfigBuilder, DriverConfig, DriverConfigBuilder,
    OverflowCallback,
};
pub use dispatch::Delivery;
pub use driver::IcuDriver;
pub use ext::{ExtCallback, ExtConfig, ExtDriver, EXT_DEFAULT_PRIORITY, EXT_MAX_LINES};
pub use fault::{clear_fault_hook, raise_fault, set_fault_hook, Fault, FaultHook, FaultKind};
pub use shared::SharedIcu;
