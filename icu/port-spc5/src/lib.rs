#![no_std]

//! # SPC5xx port
//!
//! Register-level pieces the ICU driver needs on SPC5xx parts:
//! - [`etimer`] – [`EtimerChannel`], the capture adapter over one eTimer
//!   channel (`Smod0..5` on eTimer0, `Smod6..11` on eTimer1).
//! - [`intc`] – [`Intc`], the interrupt controller, and the
//!   [`handle_vector`] entry point for the software vector table.
//!
//! ```ignore
//! static ICU: SharedIcu<EtimerChannel, Intc> = SharedIcu::new();
//!
//! fn icu_dispatch(source: IrqSource) {
//!     ICU.on_interrupt(source);
//! }
//!
//! let smod0 = unsafe { EtimerChannel::for_unit(UnitId::Smod0, 120_000_000) };
//! let driver = IcuDriver::new(DriverConfig::default(), unsafe { Intc::take() }, icu_dispatch)
//!     .with_unit(UnitId::Smod0, smod0)?;
//! ICU.install(driver);
//! ```

pub mod etimer;
pub mod intc;

pub use etimer::{EtimerChannel, EtimerChannelRegs};
pub use intc::{handle_vector, Intc};
