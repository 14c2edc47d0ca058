//! INTC software-vector-mode interrupt controller
//!
//! A source is serviced only while its priority-select register holds a
//! non-zero priority, so masking writes 0 and unmasking restores the priority
//! set with [`InterruptController::set_priority`]. Handlers live in a
//! process-wide table that the platform's INTC entry point reaches through
//! [`handle_vector`].

use core::cell::RefCell;

use critical_section::Mutex;
use icu_core::{IcuError, IcuResult, InterruptController, IrqHandler, IrqPriority, IrqSource};

/// Number of INTC vectors
pub const INTC_VECTORS: usize = 256;
/// Highest INTC priority
pub const INTC_MAX_PRIORITY: IrqPriority = 15;
/// Address of `INTC_PSR0`
pub const INTC_PSR_BASE: usize = 0xFFF4_8040;

static HANDLERS: Mutex<RefCell<[Option<IrqHandler>; INTC_VECTORS]>> =
    Mutex::new(RefCell::new([None; INTC_VECTORS]));

/// Run the handler registered for `vector`
///
/// Call from the INTC software-vector entry with the vector number read from
/// `INTC_IACKR`. Returns `false` if no handler is registered.
pub fn handle_vector(vector: u16) -> bool {
    let handler = critical_section::with(|cs| {
        HANDLERS
            .borrow_ref(cs)
            .get(vector as usize)
            .copied()
            .flatten()
    });
    match handler {
        Some(handler) => {
            handler(IrqSource(vector));
            true
        }
        None => false,
    }
}

/// INTC priority-select registers
pub struct Intc {
    psr: *mut u8,
    priorities: [IrqPriority; INTC_VECTORS],
}

// The PSR block is only written through this handle.
unsafe impl Send for Intc {}

impl Intc {
    /// Controller over the PSR block at `psr`
    ///
    /// # Safety
    /// `psr` must point to `INTC_VECTORS` priority-select bytes valid for the
    /// lifetime of the controller, and only one controller may exist.
    pub const unsafe fn new(psr: *mut u8) -> Self {
        Self {
            psr,
            priorities: [0; INTC_VECTORS],
        }
    }

    /// Controller at the memory-mapped INTC
    ///
    /// # Safety
    /// Only one controller may exist.
    pub const unsafe fn take() -> Self {
        Self::new(INTC_PSR_BASE as *mut u8)
    }

    fn index(source: IrqSource) -> IcuResult<usize> {
        let index = source.vector() as usize;
        if index < INTC_VECTORS {
            Ok(index)
        } else {
            Err(IcuError::InvalidConfig)
        }
    }

    fn write_psr(&mut self, index: usize, value: u8) {
        // SAFETY: `index < INTC_VECTORS` and `psr` is valid per the constructor contract.
        unsafe { self.psr.add(index).write_volatile(value) }
    }
}

impl InterruptController for Intc {
    fn register_handler(&mut self, source: IrqSource, handler: IrqHandler) -> IcuResult<()> {
        let index = Self::index(source)?;
        critical_section::with(|cs| HANDLERS.borrow_ref_mut(cs)[index] = Some(handler));
        Ok(())
    }

    fn set_priority(&mut self, source: IrqSource, priority: IrqPriority) -> IcuResult<()> {
        let index = Self::index(source)?;
        if priority == 0 || priority > INTC_MAX_PRIORITY {
            return Err(IcuError::InvalidConfig);
        }
        self.priorities[index] = priority;
        Ok(())
    }

    fn unmask(&mut self, source: IrqSource) {
        if let Ok(index) = Self::index(source) {
            self.write_psr(index, self.priorities[index]);
        }
    }

    fn mask(&mut self, source: IrqSource) {
        if let Ok(index) = Self::index(source) {
            self.write_psr(index, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ptr;
    use core::sync::atomic::{AtomicU16, Ordering};

    /// Controller over `psr`; the block is only accessed through the pointer
    fn intc(psr: *mut [u8; INTC_VECTORS]) -> Intc {
        unsafe { Intc::new(psr.cast()) }
    }

    #[test]
    fn test_unmask_writes_priority() {
        let mut block = [0u8; INTC_VECTORS];
        let psr = ptr::addr_of_mut!(block);
        let mut intc = intc(psr);
        intc.set_priority(IrqSource(157), 7).unwrap();
        assert_eq!(unsafe { (*psr)[157] }, 0);

        intc.unmask(IrqSource(157));
        assert_eq!(unsafe { (*psr)[157] }, 7);

        intc.mask(IrqSource(157));
        assert_eq!(unsafe { (*psr)[157] }, 0);
    }

    #[test]
    fn test_priority_range() {
        let mut block = [0u8; INTC_VECTORS];
        let mut intc = intc(ptr::addr_of_mut!(block));
        assert_eq!(intc.set_priority(IrqSource(10), 0), Err(IcuError::InvalidConfig));
        assert_eq!(intc.set_priority(IrqSource(10), 16), Err(IcuError::InvalidConfig));
        assert_eq!(intc.set_priority(IrqSource(256), 3), Err(IcuError::InvalidConfig));
        assert!(intc.set_priority(IrqSource(10), 15).is_ok());
    }

    static LAST: AtomicU16 = AtomicU16::new(0);

    fn remember(source: IrqSource) {
        LAST.store(source.vector(), Ordering::SeqCst);
    }

    #[test]
    fn test_handle_vector_runs_registered_handler() {
        let mut block = [0u8; INTC_VECTORS];
        let mut intc = intc(ptr::addr_of_mut!(block));
        assert!(!handle_vector(201));

        intc.register_handler(IrqSource(200), remember).unwrap();
        assert!(handle_vector(200));
        assert_eq!(LAST.load(Ordering::SeqCst), 200);
    }
}
