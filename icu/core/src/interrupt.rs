//! Interrupt controller abstraction

use core::fmt;
use crate::IcuResult;

/// Interrupt priority (0 = highest on most platforms)
pub type IrqPriority = u8;

/// Default priority for capture interrupts
pub const DEFAULT_IRQ_PRIORITY: IrqPriority = 7;

/// Platform interrupt source (vector) number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IrqSource(pub u16);

impl IrqSource {
    pub const fn new(vector: u16) -> Self {
        Self(vector)
    }

    pub const fn vector(self) -> u16 {
        self.0
    }
}

impl fmt::Display for IrqSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IRQ{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IrqSource {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "IRQ{}", self.0);
    }
}

/// Handler bound to an interrupt source; receives the source that fired
pub type IrqHandler = fn(IrqSource);

/// Interrupt controller the drivers register their dispatcher with
///
/// Implemented by the platform, consumed by the drivers.
pub trait InterruptController {
    /// Bind `handler` to `source`, replacing any previous binding
    fn register_handler(&mut self, source: IrqSource, handler: IrqHandler) -> IcuResult<()>;

    /// Set the priority of `source`
    fn set_priority(&mut self, source: IrqSource, priority: IrqPriority) -> IcuResult<()>;

    /// Allow `source` to raise interrupts
    fn unmask(&mut self, source: IrqSource);

    /// Prevent `source` from raising interrupts
    fn mask(&mut self, source: IrqSource);
}
