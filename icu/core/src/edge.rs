//! Edge polarity and edge-reason bitmask

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Which level of the input counts as the active pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolarity {
    /// Pulse is high: rising edge opens a period, falling edge closes the pulse
    RisingActiveHigh,
    /// Pulse is low: falling edge opens a period, rising edge closes the pulse
    FallingActiveLow,
}

impl Default for EdgePolarity {
    fn default() -> Self {
        EdgePolarity::RisingActiveHigh
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EdgePolarity {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            EdgePolarity::RisingActiveHigh => defmt::write!(fmt, "RisingActiveHigh"),
            EdgePolarity::FallingActiveLow => defmt::write!(fmt, "FallingActiveLow"),
        }
    }
}

/// Edges reported by one interrupt, as a bitmask
///
/// Bit 0 is the width (pulse-closing) edge, bit 1 the period (pulse-opening)
/// edge and bit 2 a hardware counter overflow. Several bits may be set when
/// the hardware latched more than one event before the interrupt was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeReason(u8);

impl EdgeReason {
    /// No edge observed
    pub const NONE: Self = Self(0);
    /// Width edge (rising edge on pin-change lines)
    pub const WIDTH: Self = Self(1 << 0);
    /// Period edge (falling edge on pin-change lines)
    pub const PERIOD: Self = Self(1 << 1);
    /// Hardware counter overflow
    pub const OVERFLOW: Self = Self(1 << 2);

    const ALL: u8 = Self::WIDTH.0 | Self::PERIOD.0 | Self::OVERFLOW.0;

    /// Build from raw bits, dropping undefined ones
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    /// Raw bit representation
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// True when at least one capture edge (width or period) is set
    pub const fn has_edge(self) -> bool {
        self.0 & (Self::WIDTH.0 | Self::PERIOD.0) != 0
    }
}

impl BitOr for EdgeReason {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EdgeReason {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for EdgeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeReason({:#05b})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EdgeReason {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "EdgeReason({=u8:b})", self.0);
    }
}
