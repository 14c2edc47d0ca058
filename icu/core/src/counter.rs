//! Counter arithmetic and clock scaling

use core::fmt;
use crate::{IcuError, IcuResult};

/// Elapsed timer ticks between two captures
pub type Ticks = u32;

/// Width of a free-running capture counter in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterWidth(u8);

impl CounterWidth {
    /// 16-bit counter (eTimer, most general-purpose timers)
    pub const BITS_16: Self = Self(16);
    /// 32-bit counter
    pub const BITS_32: Self = Self(32);

    /// Create a counter width, 1 to 32 bits
    pub fn new(bits: u8) -> IcuResult<Self> {
        if bits == 0 || bits > 32 {
            Err(IcuError::InvalidConfig)
        } else {
            Ok(Self(bits))
        }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Largest representable counter value
    pub const fn mask(self) -> u32 {
        if self.0 >= 32 {
            u32::MAX
        } else {
            (1u32 << self.0) - 1
        }
    }

    /// Number of distinct counter values
    pub const fn modulus(self) -> u64 {
        1u64 << self.0
    }

    /// Ticks from `prev` to `next`, modulo the counter range
    ///
    /// Both values are truncated to the counter width first, so a capture that
    /// wrapped past the maximum still yields the forward distance.
    pub const fn elapsed(self, prev: u32, next: u32) -> Ticks {
        next.wrapping_sub(prev) & self.mask()
    }

    /// Whether the counter wrapped going from `prev` to `next`
    pub const fn wrapped(self, prev: u32, next: u32) -> bool {
        (next & self.mask()) < (prev & self.mask())
    }
}

impl fmt::Display for CounterWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CounterWidth {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}-bit", self.0);
    }
}

/// Power-of-two divider between the source clock and the counter clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prescaler(u8);

impl Prescaler {
    /// Largest supported divider exponent (divide by 128)
    pub const MAX_LOG2: u8 = 7;

    /// Undivided counter clock
    pub const DIV1: Self = Self(0);

    /// Derive the divider so the counter runs at exactly `frequency` Hz
    ///
    /// Fails with [`IcuError::InvalidConfig`] when `frequency` is zero, does
    /// not divide `source_clock` exactly, or needs a divider outside 1..=128.
    pub fn from_clocks(source_clock: u32, frequency: u32) -> IcuResult<Self> {
        if frequency == 0 || frequency > source_clock {
            return Err(IcuError::InvalidConfig);
        }
        if source_clock % frequency != 0 {
            return Err(IcuError::InvalidConfig);
        }

        let divider = source_clock / frequency;
        if !divider.is_power_of_two() {
            return Err(IcuError::InvalidConfig);
        }

        let log2 = divider.trailing_zeros() as u8;
        if log2 > Self::MAX_LOG2 {
            return Err(IcuError::InvalidConfig);
        }
        Ok(Self(log2))
    }

    /// Divider exponent (0 = /1, 7 = /128)
    pub const fn log2(self) -> u8 {
        self.0
    }

    pub const fn divider(self) -> u32 {
        1u32 << self.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Prescaler {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "/{}", self.divider());
    }
}
