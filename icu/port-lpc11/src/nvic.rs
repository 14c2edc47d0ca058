//! NVIC-backed interrupt controller
//!
//! Cortex-M0 vectors are fixed at link time, so each vector used by the
//! driver forwards to [`handle_irq`], which looks up the handler registered
//! through [`InterruptController::register_handler`].

use core::cell::RefCell;

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;
use critical_section::Mutex;
use icu_core::{IcuError, IcuResult, InterruptController, IrqHandler, IrqPriority, IrqSource};

/// Number of external interrupts on the part
pub const NVIC_IRQS: usize = 32;
/// Implemented priority bits
pub const NVIC_PRIO_BITS: u8 = 2;

static HANDLERS: Mutex<RefCell<[Option<IrqHandler>; NVIC_IRQS]>> =
    Mutex::new(RefCell::new([None; NVIC_IRQS]));

/// Run the handler registered for external interrupt `irq`
///
/// Returns `false` if no handler is registered.
pub fn handle_irq(irq: u16) -> bool {
    let handler = critical_section::with(|cs| {
        HANDLERS
            .borrow_ref(cs)
            .get(irq as usize)
            .copied()
            .flatten()
    });
    match handler {
        Some(handler) => {
            handler(IrqSource(irq));
            true
        }
        None => false,
    }
}

/// Hardware priority byte for a logical priority
///
/// Only the top [`NVIC_PRIO_BITS`] bits of the byte are implemented; lower
/// logical values are more urgent.
pub const fn hw_priority(priority: IrqPriority) -> IcuResult<u8> {
    if priority >= 1 << NVIC_PRIO_BITS {
        return Err(IcuError::InvalidConfig);
    }
    Ok(priority << (8 - NVIC_PRIO_BITS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Irq(u16);

// SAFETY: `Irq` values are range-checked against `NVIC_IRQS` before use.
unsafe impl InterruptNumber for Irq {
    fn number(self) -> u16 {
        self.0
    }
}

fn irq(source: IrqSource) -> IcuResult<Irq> {
    if (source.vector() as usize) < NVIC_IRQS {
        Ok(Irq(source.vector()))
    } else {
        Err(IcuError::InvalidConfig)
    }
}

/// Interrupt controller owning the NVIC
pub struct NvicController {
    nvic: NVIC,
}

impl NvicController {
    pub fn new(nvic: NVIC) -> Self {
        Self { nvic }
    }

    /// Give the NVIC back
    pub fn free(self) -> NVIC {
        self.nvic
    }
}

impl InterruptController for NvicController {
    fn register_handler(&mut self, source: IrqSource, handler: IrqHandler) -> IcuResult<()> {
        let Irq(index) = irq(source)?;
        critical_section::with(|cs| HANDLERS.borrow_ref_mut(cs)[index as usize] = Some(handler));
        Ok(())
    }

    fn set_priority(&mut self, source: IrqSource, priority: IrqPriority) -> IcuResult<()> {
        let irq = irq(source)?;
        let priority = hw_priority(priority)?;
        // SAFETY: changing a priority cannot break a critical section the
        // driver relies on; its locks use `critical_section`.
        unsafe { self.nvic.set_priority(irq, priority) };
        Ok(())
    }

    fn unmask(&mut self, source: IrqSource) {
        if let Ok(irq) = irq(source) {
            // SAFETY: the handler for `irq` was registered before unmasking.
            unsafe { NVIC::unmask(irq) };
        }
    }

    fn mask(&mut self, source: IrqSource) {
        if let Ok(irq) = irq(source) {
            NVIC::mask(irq);
        }
    }
}
