//! Capture register adapter abstraction
//!
//! One adapter instance drives the registers of one capture unit. Adapters
//! perform direct register accesses only: nothing here is retried and nothing
//! can fail in a recoverable way. A platform port implements the trait once
//! and the driver state machine stays untouched.

use crate::{CaptureLine, CounterWidth, EdgePolarity, EdgeReason, InputChannel, IrqSource, Prescaler};

/// Hardware setup applied when a unit is started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmSetup {
    /// Timer input the unit captures from
    pub input: InputChannel,
    /// Which edge opens a period
    pub polarity: EdgePolarity,
    /// Counter clock divider
    pub prescaler: Prescaler,
}

/// Register-level access to one capture unit
pub trait CaptureAdapter {
    /// Width of the capture counter
    fn counter_width(&self) -> CounterWidth;

    /// Clock feeding the counter prescaler, in Hz
    fn source_clock(&self) -> u32;

    /// Interrupt source raised by this unit
    fn irq_source(&self) -> IrqSource;

    /// Signal line this unit captures from when routed to `input`
    fn line(&self, input: InputChannel) -> CaptureLine;

    /// Configure the counter to latch on the edges implied by `setup` and
    /// clear any stale pending flag. Capture interrupts stay disabled.
    fn arm(&mut self, setup: &ArmSetup);

    /// Enable or disable the unit's capture interrupt requests
    fn set_interrupts(&mut self, enabled: bool);

    /// Stop the counter and return the registers to their reset state
    fn disarm(&mut self);

    /// Read which edges fired and clear those flags
    ///
    /// Clearing happens before returning so that a second, fast edge is
    /// latched as a new pending flag rather than lost.
    fn read_and_clear_pending(&mut self) -> EdgeReason;

    /// Counter value latched by the most recent capture
    fn read_counter(&mut self) -> u32;
}

/// Line identifier on a pin-change interrupt block
pub type LineId = u8;

/// Pending-flag access for pin-change (EXT) interrupt blocks
///
/// The same read-then-clear contract as [`CaptureAdapter::read_and_clear_pending`],
/// for peripherals that multiplex several lines over one register block.
pub trait PendingSource {
    /// Number of lines served by this block
    fn line_count(&self) -> u8;

    /// Read which edges fired on `line` and clear those flags
    fn read_and_clear_pending(&mut self, line: LineId) -> EdgeReason;
}
