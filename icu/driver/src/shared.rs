//! Process-wide driver instance
//!
//! Holds an [`IcuDriver`] in a `static` so that interrupt handlers and
//! application code can reach it, the same way the framework's registries
//! are held: a `critical_section::Mutex<RefCell<..>>`.
//!
//! ```ignore
//! static ICU: SharedIcu<EtimerChannel, Intc> = SharedIcu::new();
//!
//! fn icu_dispatch(source: IrqSource) {
//!     ICU.on_interrupt(source);
//! }
//!
//! let driver = IcuDriver::new(DriverConfig::default(), intc, icu_dispatch)
//!     .with_unit(UnitId::Smod0, smod0)?;
//! ICU.install(driver);
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use icu_core::{CaptureAdapter, IcuError, IcuResult, InterruptController, IrqSource, Ticks, UnitId};

use crate::channel::ChannelState;
use crate::config::ChannelConfig;
use crate::driver::IcuDriver;
use crate::fault::raise_fault;

/// Static cell owning the driver
pub struct SharedIcu<A, I> {
    driver: Mutex<RefCell<Option<IcuDriver<A, I>>>>,
}

impl<A, I> SharedIcu<A, I> {
    /// Empty cell; populate it once with [`Self::install`]
    pub const fn new() -> Self {
        Self {
            driver: Mutex::new(RefCell::new(None)),
        }
    }
}

impl<A, I> Default for SharedIcu<A, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: CaptureAdapter, I: InterruptController> SharedIcu<A, I> {
    /// Initialize `driver` and move it into the cell. Must be called once.
    pub fn install(&self, mut driver: IcuDriver<A, I>) {
        if !driver.is_initialized() {
            driver.init();
        }
        critical_section::with(|cs| {
            let mut slot = self.driver.borrow_ref_mut(cs);
            assert!(slot.is_none(), "ICU driver installed twice");
            *slot = Some(driver);
        });
    }

    /// Move the driver out, leaving the cell empty
    ///
    /// Stop its units first: registered handlers still point at this cell.
    pub fn take(&self) -> Option<IcuDriver<A, I>> {
        critical_section::with(|cs| self.driver.borrow_ref_mut(cs).take())
    }

    /// Run `f` on the driver inside a critical section
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut IcuDriver<A, I>) -> R,
    {
        critical_section::with(|cs| {
            let mut slot = self.driver.borrow_ref_mut(cs);
            let driver = slot.as_mut().expect("ICU driver used before install()");
            f(driver)
        })
    }

    pub fn start(&self, unit: UnitId, config: ChannelConfig) -> IcuResult<()> {
        self.with(|driver| driver.start(unit, config))
    }

    pub fn enable(&self, unit: UnitId) -> IcuResult<()> {
        self.with(|driver| driver.enable(unit))
    }

    pub fn disable(&self, unit: UnitId) -> IcuResult<()> {
        self.with(|driver| driver.disable(unit))
    }

    pub fn stop(&self, unit: UnitId) -> IcuResult<()> {
        self.with(|driver| driver.stop(unit))
    }

    pub fn state(&self, unit: UnitId) -> IcuResult<ChannelState> {
        self.with(|driver| driver.state(unit))
    }

    pub fn width(&self, unit: UnitId) -> nb::Result<Ticks, IcuError> {
        self.with(|driver| driver.width(unit))
    }

    pub fn period(&self, unit: UnitId) -> nb::Result<Ticks, IcuError> {
        self.with(|driver| driver.period(unit))
    }

    /// Serve the interrupt raised by `source`
    ///
    /// Callbacks run outside the critical section, so they may call the
    /// lifecycle operations of this cell (for example stop a unit after its
    /// last expected pulse). The unit stays locked while they run.
    pub fn on_interrupt(&self, source: IrqSource) {
        match self.with(|driver| driver.begin_dispatch(source)) {
            Ok(delivery) => {
                delivery.deliver();
                self.with(|driver| driver.end_dispatch(delivery.unit));
            }
            Err(fault) => raise_fault(fault),
        }
    }
}
