//! Capture unit and input channel identifiers

use core::fmt;

/// Number of capture units known to the driver
pub const UNIT_COUNT: usize = 12;

/// Number of capture units sharing one timer module
pub const UNITS_PER_MODULE: usize = 6;

/// Physical capture unit (one timer sub-module counter)
///
/// Units `Smod0..Smod5` live on timer module 0, `Smod6..Smod11` on module 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitId {
    Smod0,
    Smod1,
    Smod2,
    Smod3,
    Smod4,
    Smod5,
    Smod6,
    Smod7,
    Smod8,
    Smod9,
    Smod10,
    Smod11,
}

impl UnitId {
    /// All units in index order
    pub const ALL: [UnitId; UNIT_COUNT] = [
        UnitId::Smod0,
        UnitId::Smod1,
        UnitId::Smod2,
        UnitId::Smod3,
        UnitId::Smod4,
        UnitId::Smod5,
        UnitId::Smod6,
        UnitId::Smod7,
        UnitId::Smod8,
        UnitId::Smod9,
        UnitId::Smod10,
        UnitId::Smod11,
    ];

    /// Registry index of this unit
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a unit by registry index
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < UNIT_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Timer module hosting this unit
    pub const fn module(self) -> u8 {
        (self.index() / UNITS_PER_MODULE) as u8
    }

    /// Sub-module number within the hosting timer module
    pub const fn sub_module(self) -> u8 {
        (self.index() % UNITS_PER_MODULE) as u8
    }

    /// Whether support for this unit was compiled in
    pub const fn is_present(self) -> bool {
        match self {
            UnitId::Smod0 => cfg!(feature = "smod0"),
            UnitId::Smod1 => cfg!(feature = "smod1"),
            UnitId::Smod2 => cfg!(feature = "smod2"),
            UnitId::Smod3 => cfg!(feature = "smod3"),
            UnitId::Smod4 => cfg!(feature = "smod4"),
            UnitId::Smod5 => cfg!(feature = "smod5"),
            UnitId::Smod6 => cfg!(feature = "smod6"),
            UnitId::Smod7 => cfg!(feature = "smod7"),
            UnitId::Smod8 => cfg!(feature = "smod8"),
            UnitId::Smod9 => cfg!(feature = "smod9"),
            UnitId::Smod10 => cfg!(feature = "smod10"),
            UnitId::Smod11 => cfg!(feature = "smod11"),
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SMOD{}", self.index())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for UnitId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "SMOD{}", self.index());
    }
}

/// Timer input routed into a capture unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputChannel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
    Ch5,
    Ch6,
}

impl InputChannel {
    /// Zero-based input number as used by the hardware
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for InputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CH{}", self.index() + 1)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InputChannel {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "CH{}", self.index() + 1);
    }
}

/// A physical signal line: one input of one timer module
///
/// At most one started unit may capture from a given line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureLine {
    pub module: u8,
    pub input: InputChannel,
}

impl CaptureLine {
    pub const fn new(module: u8, input: InputChannel) -> Self {
        Self { module, input }
    }
}
