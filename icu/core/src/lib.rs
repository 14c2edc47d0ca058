#![no_std]
#![forbid(unsafe_code)]

//! # ICU Core
//!
//! Core types, traits, and abstractions shared by the input capture driver
//! and its platform ports.
//!
//! A capture unit latches a free-running counter on signal edges. This crate
//! describes the pieces every platform has in common: which units exist, how
//! edges are reported, how counter deltas are computed, and the two seams a
//! platform must fill in ([`CaptureAdapter`] and [`InterruptController`]).

use core::fmt;

pub mod adapter;
pub mod counter;
pub mod edge;
pub mod interrupt;
pub mod unit;

pub use adapter::*;
pub use counter::*;
pub use edge::*;
pub use interrupt::*;
pub use unit::*;

/// ICU crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the ICU stack
pub type IcuResult<T> = Result<T, IcuError>;

/// Error types for ICU operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcuError {
    /// Operation not legal in the current lifecycle state
    InvalidState,
    /// Malformed channel configuration
    InvalidConfig,
    /// Capture unit not compiled into this build
    ChannelNotPresent,
    /// Physical capture line already used by another started unit
    LineBusy,
    /// Register adapter observed an impossible condition
    HardwareFault,
}

impl fmt::Display for IcuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcuError::InvalidState => write!(f, "Operation invalid in current state"),
            IcuError::InvalidConfig => write!(f, "Invalid channel configuration"),
            IcuError::ChannelNotPresent => write!(f, "Capture unit not present"),
            IcuError::LineBusy => write!(f, "Capture line already in use"),
            IcuError::HardwareFault => write!(f, "Hardware fault"),
        }
    }
}

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
impl std::error::Error for IcuError {}

#[cfg(feature = "defmt")]
impl defmt::Format for IcuError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            IcuError::InvalidState => defmt::write!(fmt, "InvalidState"),
            IcuError::InvalidConfig => defmt::write!(fmt, "InvalidConfig"),
            IcuError::ChannelNotPresent => defmt::write!(fmt, "ChannelNotPresent"),
            IcuError::LineBusy => defmt::write!(fmt, "LineBusy"),
            IcuError::HardwareFault => defmt::write!(fmt, "HardwareFault"),
        }
    }
}
