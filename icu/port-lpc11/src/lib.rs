#![no_std]

//! # LPC11Uxx port
//!
//! - [`pin_int`] – [`PinInt`], the pin-interrupt block as a
//!   [`icu_core::PendingSource`] for the EXT driver.
//! - [`nvic`] – [`NvicController`] and the [`handle_irq`] entry point.
//!
//! ```ignore
//! static EXT: Mutex<RefCell<Option<PinIntExt>>> = Mutex::new(RefCell::new(None));
//!
//! fn ext_dispatch(source: IrqSource) {
//!     critical_section::with(|cs| {
//!         if let Some(ext) = EXT.borrow_ref_mut(cs).as_mut() {
//!             if let Some(line) = ext.line_of(source) {
//!                 ext.on_interrupt(line);
//!             }
//!         }
//!     });
//! }
//!
//! #[interrupt]
//! fn FLEX_INT0() {
//!     handle_irq(0);
//! }
//! ```

pub mod nvic;
pub mod pin_int;

pub use nvic::{handle_irq, hw_priority, NvicController};
pub use pin_int::{ext_config, ext_driver, PinEdges, PinInt, PinIntExt, PinIntRegs};
