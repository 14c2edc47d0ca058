//! Driver lifecycle controller
//!
//! [`IcuDriver`] owns one [`CaptureChannel`] per attached unit and the
//! interrupt controller. It validates unit selectors against the compiled-in
//! set, keeps physical lines exclusive, and binds each enabled unit's
//! interrupt source to the single dispatcher function.
//!
//! # Preconditions
//! `start`, `stop`, `enable` and `disable` must not race the dispatcher of
//! the same unit: call them with that unit's source masked, or from a context
//! the dispatcher cannot preempt. [`crate::SharedIcu`] provides the latter
//! through a critical section.

use heapless::LinearMap;
use icu_core::{
    CaptureAdapter, IcuError, IcuResult, InterruptController, IrqHandler, IrqSource, Ticks, UnitId,
    UNIT_COUNT,
};

use crate::channel::{CaptureChannel, ChannelState};
use crate::config::{ChannelConfig, DriverConfig};
use crate::dispatch::Delivery;
use crate::fault::{raise_fault, Fault, FaultKind};

/// Input capture driver for a set of units sharing one adapter type
pub struct IcuDriver<A, I> {
    config: DriverConfig,
    controller: I,
    dispatcher: IrqHandler,
    channels: [Option<CaptureChannel<A>>; UNIT_COUNT],
    bindings: LinearMap<IrqSource, UnitId, UNIT_COUNT>,
    initialized: bool,
}

impl<A: CaptureAdapter, I: InterruptController> IcuDriver<A, I> {
    /// Create a driver with no units attached
    ///
    /// `dispatcher` is the function registered for every enabled unit's
    /// interrupt source; it should forward to [`Self::on_interrupt`].
    pub fn new(config: DriverConfig, controller: I, dispatcher: IrqHandler) -> Self {
        Self {
            config,
            controller,
            dispatcher,
            channels: core::array::from_fn(|_| None),
            bindings: LinearMap::new(),
            initialized: false,
        }
    }

    /// Attach the adapter driving `unit`
    ///
    /// Only allowed before [`Self::init`]. Fails with `ChannelNotPresent` for
    /// units compiled out of the build.
    pub fn attach(&mut self, unit: UnitId, adapter: A) -> IcuResult<()> {
        assert!(!self.initialized, "units must be attached before init()");
        if !unit.is_present() {
            return Err(IcuError::ChannelNotPresent);
        }

        let slot = &mut self.channels[unit.index()];
        if slot.is_some() {
            return Err(IcuError::InvalidState);
        }
        *slot = Some(CaptureChannel::new(unit, adapter));
        Ok(())
    }

    /// Builder-style [`Self::attach`]
    pub fn with_unit(mut self, unit: UnitId, adapter: A) -> IcuResult<Self> {
        self.attach(unit, adapter)?;
        Ok(self)
    }

    /// Move every attached unit to `Stopped`. Must be called exactly once.
    pub fn init(&mut self) {
        assert!(!self.initialized, "ICU driver initialized twice");
        for channel in self.channels.iter_mut().flatten() {
            channel.init();
        }
        self.initialized = true;
        info!("ICU driver initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn controller(&self) -> &I {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut I {
        &mut self.controller
    }

    /// Lifecycle state of `unit`
    pub fn state(&self, unit: UnitId) -> IcuResult<ChannelState> {
        self.channel(unit).map(CaptureChannel::state)
    }

    /// Shared access to the channel of `unit`
    pub fn channel(&self, unit: UnitId) -> IcuResult<&CaptureChannel<A>> {
        assert!(self.initialized, "ICU driver used before init()");
        if !unit.is_present() {
            return Err(IcuError::ChannelNotPresent);
        }
        self.channels[unit.index()]
            .as_ref()
            .ok_or(IcuError::ChannelNotPresent)
    }

    fn channel_mut(&mut self, unit: UnitId) -> IcuResult<&mut CaptureChannel<A>> {
        assert!(self.initialized, "ICU driver used before init()");
        if !unit.is_present() {
            return Err(IcuError::ChannelNotPresent);
        }
        self.channels[unit.index()]
            .as_mut()
            .ok_or(IcuError::ChannelNotPresent)
    }

    /// Configure and arm `unit`: `Stopped → Ready`
    ///
    /// Fails with `LineBusy` if another started unit already captures from
    /// the same physical line.
    pub fn start(&mut self, unit: UnitId, config: ChannelConfig) -> IcuResult<()> {
        let line = self.channel(unit)?.adapter().line(config.input);
        let busy = self
            .channels
            .iter()
            .flatten()
            .filter(|other| other.unit() != unit)
            .any(|other| other.line() == Some(line));
        if busy {
            warn!("{}: line {} already captured", unit, config.input);
            return Err(IcuError::LineBusy);
        }

        self.channel_mut(unit)?.start(config)
    }

    /// Begin capturing on `unit`: `Ready → Active`
    ///
    /// Applies the unit's priority to its interrupt source, registers the
    /// dispatcher for it and unmasks it. Fails without registering anything
    /// when the controller rejects the priority.
    pub fn enable(&mut self, unit: UnitId) -> IcuResult<()> {
        let channel = self.channel(unit)?;
        if channel.state() != ChannelState::Ready {
            warn!("{}: enable refused in state {}", unit, channel.state());
            return Err(IcuError::InvalidState);
        }

        let source = channel.adapter().irq_source();
        match self.bindings.get(&source) {
            Some(owner) if *owner != unit => return Err(IcuError::InvalidConfig),
            _ => {}
        }

        // A priority the controller rejects leaves the source untouched.
        let priority = self.config.priority(unit);
        self.controller.set_priority(source, priority)?;
        self.controller.register_handler(source, self.dispatcher)?;

        self.channel_mut(unit)?.enable()?;
        self.bindings
            .insert(source, unit)
            .map_err(|_| IcuError::InvalidConfig)?;
        self.controller.unmask(source);
        debug!("{}: bound to {} at priority {}", unit, source, priority);
        Ok(())
    }

    /// Stop capturing on `unit`: `Active → Ready`, no-op when `Ready`
    pub fn disable(&mut self, unit: UnitId) -> IcuResult<()> {
        let was_active = self.channel(unit)?.state() == ChannelState::Active;
        self.channel_mut(unit)?.disable()?;
        if was_active {
            self.release_source(unit)?;
        }
        Ok(())
    }

    /// Release `unit` from any state back to `Stopped`
    pub fn stop(&mut self, unit: UnitId) -> IcuResult<()> {
        let was_active = self.channel(unit)?.state() == ChannelState::Active;
        if was_active {
            self.release_source(unit)?;
        }
        self.channel_mut(unit)?.stop();
        Ok(())
    }

    fn release_source(&mut self, unit: UnitId) -> IcuResult<()> {
        let source = self.channel(unit)?.adapter().irq_source();
        self.controller.mask(source);
        self.bindings.remove(&source);
        Ok(())
    }

    /// Last measured pulse width of `unit`
    pub fn width(&self, unit: UnitId) -> nb::Result<Ticks, IcuError> {
        self.channel(unit).map_err(nb::Error::Other)?.width()
    }

    /// Last measured period of `unit`
    pub fn period(&self, unit: UnitId) -> nb::Result<Ticks, IcuError> {
        self.channel(unit).map_err(nb::Error::Other)?.period()
    }

    /// Unit bound to `source`, if any
    pub fn bound_unit(&self, source: IrqSource) -> Option<UnitId> {
        self.bindings.get(&source).copied()
    }

    /// First half of an interrupt: find the unit and compute its delivery
    ///
    /// The unit stays locked until [`Self::end_dispatch`].
    pub fn begin_dispatch(&mut self, source: IrqSource) -> Result<Delivery, Fault> {
        let unit = self
            .bound_unit(source)
            .ok_or(Fault::new(FaultKind::UnboundSource).with_source(source))?;
        let channel = self.channels[unit.index()]
            .as_mut()
            .ok_or(Fault::new(FaultKind::UnboundSource).with_source(source))?;
        channel
            .begin_dispatch()
            .map_err(|fault| fault.with_source(source))
    }

    /// Second half of an interrupt: unlock `unit`
    pub fn end_dispatch(&mut self, unit: UnitId) {
        if let Some(channel) = self.channels[unit.index()].as_mut() {
            channel.end_dispatch();
        }
    }

    /// Serve the interrupt raised by `source`
    ///
    /// Callbacks run while the driver is borrowed; use
    /// [`crate::SharedIcu::on_interrupt`] when callbacks must be able to
    /// call back into the driver.
    pub fn on_interrupt(&mut self, source: IrqSource) {
        match self.begin_dispatch(source) {
            Ok(delivery) => {
                delivery.deliver();
                self.end_dispatch(delivery.unit);
            }
            Err(fault) => raise_fault(fault),
        }
    }
}
