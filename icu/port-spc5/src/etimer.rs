//! eTimer channel capture adapter
//!
//! Each capture unit is one eTimer channel. Capture 1 latches the edge that
//! opens a period, capture 2 the edge that closes the active phase. The
//! counter counts the prescaled IP bus clock and the capture inputs are taken
//! from the channel's secondary source.

use core::ptr;

use icu_core::{
    ArmSetup, CaptureAdapter, CaptureLine, CounterWidth, EdgePolarity, EdgeReason, InputChannel,
    IrqSource, UnitId, UNITS_PER_MODULE,
};

/// Base address of eTimer module 0
pub const ETIMER0_BASE: usize = 0xFFE1_8000;
/// Base address of eTimer module 1
pub const ETIMER1_BASE: usize = 0xFFE1_C000;
/// Address stride between the channels of one module
pub const CHANNEL_STRIDE: usize = 0x20;

/// INTC vector of channel 0 on eTimer module 0
pub const ETIMER0_TC0_VECTOR: u16 = 157;
/// INTC vector of channel 0 on eTimer module 1
pub const ETIMER1_TC0_VECTOR: u16 = 168;

/// Register block of one eTimer channel
#[repr(C)]
#[derive(Debug, Default)]
pub struct EtimerChannelRegs {
    pub comp1: u16,
    pub comp2: u16,
    pub capt1: u16,
    pub capt2: u16,
    pub load: u16,
    pub hold: u16,
    pub cntr: u16,
    pub ctrl1: u16,
    pub ctrl2: u16,
    pub ctrl3: u16,
    pub sts: u16,
    pub intdma: u16,
    pub cmpld1: u16,
    pub cmpld2: u16,
    pub ccctrl: u16,
    pub filt: u16,
}

pub mod ctrl1 {
    /// Count rising edges of the primary source
    pub const CNTMODE_RISING: u16 = 0b001 << 13;
    /// Primary source: IP bus clock divided by `2^n`, `n` added to this base
    pub const PRISRC_IPBUS_DIV: u16 = 0x18;
    pub const PRISRC_SHIFT: u16 = 8;
    pub const SECSRC_MASK: u16 = 0x1F;
}

pub mod ccctrl {
    pub const CPT2MODE_SHIFT: u16 = 6;
    pub const CPT1MODE_SHIFT: u16 = 4;
    pub const CPTMODE_FALLING: u16 = 0b01;
    pub const CPTMODE_RISING: u16 = 0b10;
    pub const ARM: u16 = 1 << 0;
}

/// Status flags; write one to clear
pub mod sts {
    pub const ICF2: u16 = 1 << 7;
    pub const ICF1: u16 = 1 << 6;
    pub const TOF: u16 = 1 << 3;
    pub const ALL: u16 = 0x03FF;
}

/// Interrupt enables, same bit positions as the status flags
pub mod intdma {
    pub const ICF2IE: u16 = 1 << 7;
    pub const ICF1IE: u16 = 1 << 6;
    pub const TOFIE: u16 = 1 << 3;
}

/// Translate status flags into an edge reason
///
/// `ICF1` (capture 1) marks a period edge, `ICF2` (capture 2) a width edge
/// and `TOF` a counter overflow.
pub const fn decode_status(status: u16) -> EdgeReason {
    let mut bits = 0;
    if status & sts::ICF2 != 0 {
        bits |= EdgeReason::WIDTH.bits();
    }
    if status & sts::ICF1 != 0 {
        bits |= EdgeReason::PERIOD.bits();
    }
    if status & sts::TOF != 0 {
        bits |= EdgeReason::OVERFLOW.bits();
    }
    EdgeReason::from_bits_truncate(bits)
}

/// Capture-mode bits for `polarity`
///
/// The period edge goes to capture 1, the opposite edge to capture 2.
pub const fn capture_modes(polarity: EdgePolarity) -> u16 {
    let (period_edge, width_edge) = match polarity {
        EdgePolarity::RisingActiveHigh => (ccctrl::CPTMODE_RISING, ccctrl::CPTMODE_FALLING),
        EdgePolarity::FallingActiveLow => (ccctrl::CPTMODE_FALLING, ccctrl::CPTMODE_RISING),
    };
    (period_edge << ccctrl::CPT1MODE_SHIFT) | (width_edge << ccctrl::CPT2MODE_SHIFT)
}

/// Capture adapter over one eTimer channel
pub struct EtimerChannel {
    regs: *mut EtimerChannelRegs,
    unit: UnitId,
    source_clock: u32,
    last_status: u16,
}

// The register block is only reached through this handle, which the driver
// owns exclusively.
unsafe impl Send for EtimerChannel {}

impl EtimerChannel {
    /// Adapter over the register block at `regs`
    ///
    /// # Safety
    /// `regs` must point to the eTimer channel serving `unit`, valid for the
    /// lifetime of the adapter, and no other code may access that block.
    pub const unsafe fn new(regs: *mut EtimerChannelRegs, unit: UnitId, source_clock: u32) -> Self {
        Self {
            regs,
            unit,
            source_clock,
            last_status: 0,
        }
    }

    /// Adapter for `unit` at its memory-mapped address
    ///
    /// # Safety
    /// Only one adapter may exist per unit.
    pub unsafe fn for_unit(unit: UnitId, source_clock: u32) -> Self {
        let base = match unit.module() {
            0 => ETIMER0_BASE,
            _ => ETIMER1_BASE,
        };
        let regs = (base + CHANNEL_STRIDE * unit.sub_module() as usize) as *mut EtimerChannelRegs;
        Self::new(regs, unit, source_clock)
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// INTC vector of `unit`
    pub const fn vector(unit: UnitId) -> u16 {
        let first = match unit.module() {
            0 => ETIMER0_TC0_VECTOR,
            _ => ETIMER1_TC0_VECTOR,
        };
        first + unit.sub_module() as u16
    }
}

macro_rules! read_reg {
    ($channel:expr, $field:ident) => {
        // SAFETY: `regs` is valid and exclusively ours per the constructor contract.
        unsafe { ptr::addr_of!((*$channel.regs).$field).read_volatile() }
    };
}

macro_rules! write_reg {
    ($channel:expr, $field:ident, $value:expr) => {
        // SAFETY: `regs` is valid and exclusively ours per the constructor contract.
        unsafe { ptr::addr_of_mut!((*$channel.regs).$field).write_volatile($value) }
    };
}

impl CaptureAdapter for EtimerChannel {
    fn counter_width(&self) -> CounterWidth {
        CounterWidth::BITS_16
    }

    fn source_clock(&self) -> u32 {
        self.source_clock
    }

    fn irq_source(&self) -> IrqSource {
        IrqSource(Self::vector(self.unit))
    }

    fn line(&self, input: InputChannel) -> CaptureLine {
        CaptureLine::new(self.unit.module(), input)
    }

    fn arm(&mut self, setup: &ArmSetup) {
        // Stop the counter before touching its setup.
        write_reg!(self, ctrl1, 0);
        write_reg!(self, ccctrl, 0);
        write_reg!(self, intdma, 0);
        write_reg!(self, ctrl2, 0);
        write_reg!(self, ctrl3, 0);
        write_reg!(self, load, 0);
        write_reg!(self, cntr, 0);
        write_reg!(self, comp1, 0xFFFF);
        write_reg!(self, comp2, 0xFFFF);
        write_reg!(self, filt, 0);
        write_reg!(self, sts, sts::ALL);
        self.last_status = 0;

        write_reg!(self, ccctrl, capture_modes(setup.polarity) | ccctrl::ARM);
        let prisrc = ctrl1::PRISRC_IPBUS_DIV + u16::from(setup.prescaler.log2());
        let secsrc = u16::from(setup.input.index()) & ctrl1::SECSRC_MASK;
        write_reg!(
            self,
            ctrl1,
            ctrl1::CNTMODE_RISING | (prisrc << ctrl1::PRISRC_SHIFT) | secsrc
        );
    }

    fn set_interrupts(&mut self, enabled: bool) {
        let mask = if enabled {
            intdma::ICF1IE | intdma::ICF2IE | intdma::TOFIE
        } else {
            0
        };
        write_reg!(self, intdma, mask);
    }

    fn disarm(&mut self) {
        write_reg!(self, intdma, 0);
        write_reg!(self, ctrl1, 0);
        write_reg!(self, ccctrl, 0);
        write_reg!(self, sts, sts::ALL);
        self.last_status = 0;
    }

    fn read_and_clear_pending(&mut self) -> EdgeReason {
        let status = read_reg!(self, sts) & (sts::ICF1 | sts::ICF2 | sts::TOF);
        if status != 0 {
            write_reg!(self, sts, status);
        }
        self.last_status = status;
        decode_status(status)
    }

    fn read_counter(&mut self) -> u32 {
        let status = self.last_status;
        let value = if status & sts::ICF1 != 0 {
            if status & sts::ICF2 != 0 {
                // Pop the width capture too so both FIFOs stay in step.
                let _ = read_reg!(self, capt2);
            }
            read_reg!(self, capt1)
        } else if status & sts::ICF2 != 0 {
            read_reg!(self, capt2)
        } else {
            read_reg!(self, cntr)
        };
        u32::from(value)
    }
}
