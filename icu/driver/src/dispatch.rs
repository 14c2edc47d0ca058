//! Edge dispatcher
//!
//! Interrupt-context entry point of a capture unit. A dispatch runs in three
//! fixed steps: read and clear the pending flags, read the latched counter,
//! hand both to the state machine. Clearing comes first so a fast second
//! edge raises a fresh interrupt instead of being lost.
//!
//! Dispatch is split in two halves so callbacks can run after any lock
//! protecting the channel has been released: [`CaptureChannel::begin_dispatch`]
//! computes a [`Delivery`] and leaves the channel locked,
//! [`Delivery::deliver`] runs the callbacks and
//! [`CaptureChannel::end_dispatch`] unlocks. [`CaptureChannel::dispatch`]
//! does all three when the caller owns the channel outright.

use icu_core::{CaptureAdapter, UnitId};

use crate::channel::{Capture, CaptureChannel};
use crate::config::{CaptureCallback, OverflowCallback};
use crate::fault::{raise_fault, Fault, FaultKind};

/// Measurements of one dispatch together with the callbacks to receive them
#[derive(Debug, Clone, Copy)]
pub struct Delivery {
    pub unit: UnitId,
    pub capture: Capture,
    width_callback: Option<CaptureCallback>,
    period_callback: Option<CaptureCallback>,
    overflow_callback: Option<OverflowCallback>,
}

impl Delivery {
    /// Delivery that reports nothing
    pub const fn empty(unit: UnitId) -> Self {
        Self {
            unit,
            capture: Capture {
                width: None,
                period: None,
                overflow: false,
            },
            width_callback: None,
            period_callback: None,
            overflow_callback: None,
        }
    }

    /// Invoke the callbacks: width, then period, then overflow
    pub fn deliver(self) {
        if let (Some(width), Some(callback)) = (self.capture.width, self.width_callback) {
            callback(self.unit, width);
        }
        if let (Some(period), Some(callback)) = (self.capture.period, self.period_callback) {
            callback(self.unit, period);
        }
        if let (true, Some(callback)) = (self.capture.overflow, self.overflow_callback) {
            callback(self.unit);
        }
    }
}

impl<A: CaptureAdapter> CaptureChannel<A> {
    /// First half of a dispatch: decode the edge and compute measurements
    ///
    /// On success the channel stays locked until [`Self::end_dispatch`].
    /// A channel that is no longer `Active` yields an empty delivery: the
    /// edge raced a `disable` and is dropped.
    pub fn begin_dispatch(&mut self) -> Result<Delivery, Fault> {
        let unit = self.unit();
        if !self.lock() {
            return Err(Fault::new(FaultKind::Reentered).with_unit(unit));
        }

        let reason = self.adapter_mut().read_and_clear_pending();
        if reason.is_empty() {
            self.unlock();
            return Err(Fault::new(FaultKind::SpuriousInterrupt).with_unit(unit));
        }
        let raw_count = self.adapter_mut().read_counter();
        trace!("{}: edge {} at {}", unit, reason, raw_count);

        let capture = match self.on_edge(reason, raw_count) {
            Ok(capture) => capture,
            Err(_) => return Ok(Delivery::empty(unit)),
        };

        let delivery = match self.config() {
            Some(config) => Delivery {
                unit,
                capture,
                width_callback: config.width_callback,
                period_callback: config.period_callback,
                overflow_callback: config.overflow_callback,
            },
            None => Delivery::empty(unit),
        };
        Ok(delivery)
    }

    /// Second half of a dispatch: release the channel
    pub fn end_dispatch(&mut self) {
        self.unlock();
    }

    /// Full dispatch for an exclusively owned channel
    ///
    /// Faults go to the process-wide fault hook.
    pub fn dispatch(&mut self) {
        match self.begin_dispatch() {
            Ok(delivery) => {
                delivery.deliver();
                self.end_dispatch();
            }
            Err(fault) => raise_fault(fault),
        }
    }
}
