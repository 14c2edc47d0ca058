//! GPIO pin-interrupt block
//!
//! Eight edge-sensitive lines. `RISE` and `FALL` latch the detected edges of
//! each line; both are cleared, together with `IST`, by writing the line bit.

use core::ptr;

use icu_core::{EdgeReason, IcuError, IcuResult, IrqPriority, IrqSource, LineId, PendingSource};
use icu_driver::{ExtConfig, ExtDriver, EXT_MAX_LINES};

/// Base address of `GPIO_PIN_INT`
pub const PIN_INT_BASE: usize = 0x4004_C000;
/// Number of pin-interrupt lines
pub const PIN_INT_LINES: u8 = 8;
/// NVIC number of `FLEX_INT0`; line `n` raises `FLEX_INT0 + n`
pub const FLEX_INT0_IRQ: u16 = 0;
/// Default priority of the pin-interrupt lines
pub const DEFAULT_PRIORITY: IrqPriority = 3;

/// `GPIO_PIN_INT` register block
#[repr(C)]
#[derive(Debug, Default)]
pub struct PinIntRegs {
    pub isel: u32,
    pub ienr: u32,
    pub sienr: u32,
    pub cienr: u32,
    pub ienf: u32,
    pub sienf: u32,
    pub cienf: u32,
    pub rise: u32,
    pub fall: u32,
    pub ist: u32,
}

/// Edges a line reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEdges {
    Rising,
    Falling,
    Both,
}

/// Decode the latched edges of `line` into an edge reason
///
/// A rising edge reports bit 0, a falling edge bit 1.
pub const fn decode_edges(rise: u32, fall: u32, line: LineId) -> EdgeReason {
    let rising = (rise >> line) & 1;
    let falling = (fall >> line) & 1;
    EdgeReason::from_bits_truncate((rising | (falling << 1)) as u8)
}

/// Pending source over the pin-interrupt block
pub struct PinInt {
    regs: *mut PinIntRegs,
}

// Only reached through this handle.
unsafe impl Send for PinInt {}

macro_rules! read_reg {
    ($pint:expr, $field:ident) => {
        // SAFETY: `regs` is valid and exclusively ours per the constructor contract.
        unsafe { ptr::addr_of!((*$pint.regs).$field).read_volatile() }
    };
}

macro_rules! write_reg {
    ($pint:expr, $field:ident, $value:expr) => {
        // SAFETY: `regs` is valid and exclusively ours per the constructor contract.
        unsafe { ptr::addr_of_mut!((*$pint.regs).$field).write_volatile($value) }
    };
}

impl PinInt {
    /// Pending source over the register block at `regs`
    ///
    /// # Safety
    /// `regs` must point to a pin-interrupt block valid for the lifetime of
    /// the source, and no other code may access that block.
    pub const unsafe fn new(regs: *mut PinIntRegs) -> Self {
        Self { regs }
    }

    /// Pending source at the memory-mapped block
    ///
    /// # Safety
    /// Only one source may exist.
    pub const unsafe fn take() -> Self {
        Self::new(PIN_INT_BASE as *mut PinIntRegs)
    }

    /// Make `line` edge sensitive on `edges`
    ///
    /// Routing a pin to the line (`PINTSEL`) is left to the board setup.
    pub fn set_edges(&mut self, line: LineId, edges: PinEdges) -> IcuResult<()> {
        if line >= PIN_INT_LINES {
            return Err(IcuError::ChannelNotPresent);
        }
        let bit = 1u32 << line;
        write_reg!(self, isel, read_reg!(self, isel) & !bit);

        let (rising, falling) = match edges {
            PinEdges::Rising => (true, false),
            PinEdges::Falling => (false, true),
            PinEdges::Both => (true, true),
        };
        if rising {
            write_reg!(self, sienr, bit);
        } else {
            write_reg!(self, cienr, bit);
        }
        if falling {
            write_reg!(self, sienf, bit);
        } else {
            write_reg!(self, cienf, bit);
        }
        Ok(())
    }
}

impl PendingSource for PinInt {
    fn line_count(&self) -> u8 {
        PIN_INT_LINES
    }

    fn read_and_clear_pending(&mut self, line: LineId) -> EdgeReason {
        let reason = decode_edges(read_reg!(self, rise), read_reg!(self, fall), line);
        let bit = 1u32 << line;
        write_reg!(self, rise, bit);
        write_reg!(self, fall, bit);
        write_reg!(self, ist, bit);
        reason
    }
}

/// EXT driver over the pin-interrupt block
pub type PinIntExt = ExtDriver<PinInt>;

/// EXT driver for `pint`, with lines on `FLEX_INT0..7`
pub fn ext_driver(pint: PinInt) -> PinIntExt {
    ExtDriver::new(pint, IrqSource(FLEX_INT0_IRQ))
}

/// EXT configuration with every line at [`DEFAULT_PRIORITY`]
pub fn ext_config() -> ExtConfig {
    ExtConfig {
        priorities: [DEFAULT_PRIORITY; EXT_MAX_LINES],
        ..ExtConfig::default()
    }
}
