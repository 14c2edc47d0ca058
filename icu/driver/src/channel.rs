//! Per-unit capture state machine
//!
//! A [`CaptureChannel`] binds one [`CaptureAdapter`] to the lifecycle
//! `Uninitialized → Stopped → Ready → Active` and turns successive raw
//! captures into pulse width and period measurements.
//!
//! The channel does not touch the interrupt controller; the lifecycle
//! controller in [`crate::driver`] does that around these transitions.

use core::fmt;

use icu_core::{
    ArmSetup, CaptureAdapter, CaptureLine, EdgeReason, IcuError, IcuResult, Prescaler, Ticks,
    UnitId,
};

use crate::config::ChannelConfig;

/// Lifecycle state of a capture channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Created, driver not yet initialized
    Uninitialized,
    /// No configuration bound, hardware idle
    Stopped,
    /// Configured and armed, interrupts off
    Ready,
    /// Capturing edges
    Active,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Uninitialized => write!(f, "Uninitialized"),
            ChannelState::Stopped => write!(f, "Stopped"),
            ChannelState::Ready => write!(f, "Ready"),
            ChannelState::Active => write!(f, "Active"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ChannelState::Uninitialized => defmt::write!(fmt, "Uninitialized"),
            ChannelState::Stopped => defmt::write!(fmt, "Stopped"),
            ChannelState::Ready => defmt::write!(fmt, "Ready"),
            ChannelState::Active => defmt::write!(fmt, "Active"),
        }
    }
}

/// Recorded capture boundaries and last measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureSample {
    /// Counter at the most recent edge of either kind
    pub boundary: Option<u32>,
    /// Counter at the most recent period edge
    pub period_start: Option<u32>,
    /// Last measured pulse width
    pub width: Option<Ticks>,
    /// Last measured period
    pub period: Option<Ticks>,
    /// Counter at the most recent capture, used to spot rollovers
    pub last_count: Option<u32>,
    /// A hardware overflow was reported that no capture has observed yet
    pub wrap_reported: bool,
}

impl CaptureSample {
    /// Sample with no baseline: the first edge only records a boundary
    pub const fn empty() -> Self {
        Self {
            boundary: None,
            period_start: None,
            width: None,
            period: None,
            last_count: None,
            wrap_reported: false,
        }
    }

    /// Sample with a zero baseline: the first edge is measured from zero
    pub const fn zero_baseline() -> Self {
        Self {
            boundary: Some(0),
            period_start: Some(0),
            width: None,
            period: None,
            last_count: Some(0),
            wrap_reported: false,
        }
    }

    /// Whether a capture has set the width or period baseline
    pub const fn has_baseline(&self) -> bool {
        self.boundary.is_some() || self.period_start.is_some()
    }
}

/// Measurements produced by one edge dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capture {
    pub width: Option<Ticks>,
    pub period: Option<Ticks>,
    pub overflow: bool,
}

impl Capture {
    /// True when nothing is to be reported
    pub const fn is_empty(&self) -> bool {
        self.width.is_none() && self.period.is_none() && !self.overflow
    }
}

/// One capture unit and its state machine
pub struct CaptureChannel<A> {
    unit: UnitId,
    adapter: A,
    state: ChannelState,
    config: Option<ChannelConfig>,
    prescaler: Prescaler,
    sample: CaptureSample,
    locked: bool,
}

impl<A: CaptureAdapter> CaptureChannel<A> {
    /// Wrap `adapter` as the handle of `unit`
    pub fn new(unit: UnitId, adapter: A) -> Self {
        Self {
            unit,
            adapter,
            state: ChannelState::Uninitialized,
            config: None,
            prescaler: Prescaler::DIV1,
            sample: CaptureSample::empty(),
            locked: false,
        }
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Configuration bound by `start`, if any
    pub fn config(&self) -> Option<&ChannelConfig> {
        self.config.as_ref()
    }

    /// Prescaler chosen by the last `start`
    pub fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// Recorded boundaries and measurements
    pub fn sample(&self) -> &CaptureSample {
        &self.sample
    }

    /// Whether an edge dispatch is in progress on this channel
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Signal line this channel occupies while started
    pub fn line(&self) -> Option<CaptureLine> {
        match self.state {
            ChannelState::Ready | ChannelState::Active => {
                self.config.map(|config| self.adapter.line(config.input))
            }
            _ => None,
        }
    }

    /// Move from `Uninitialized` to `Stopped`
    pub fn init(&mut self) {
        assert!(
            self.state == ChannelState::Uninitialized,
            "capture channel initialized twice"
        );
        self.state = ChannelState::Stopped;
    }

    /// Bind `config` and arm the hardware: `Stopped → Ready`
    ///
    /// On error the channel stays `Stopped` with no configuration bound.
    pub fn start(&mut self, config: ChannelConfig) -> IcuResult<()> {
        self.expect_initialized();
        if self.state != ChannelState::Stopped {
            warn!("{}: start refused in state {}", self.unit, self.state);
            return Err(IcuError::InvalidState);
        }

        config.validate()?;
        let prescaler = Prescaler::from_clocks(self.adapter.source_clock(), config.frequency)?;

        self.adapter.arm(&ArmSetup {
            input: config.input,
            polarity: config.polarity,
            prescaler,
        });

        self.prescaler = prescaler;
        self.config = Some(config);
        self.sample = CaptureSample::empty();
        self.state = ChannelState::Ready;
        debug!("{}: started, counter clock /{}", self.unit, prescaler.divider());
        Ok(())
    }

    /// Start capturing: `Ready → Active`
    ///
    /// Recorded boundaries are reset so the first edge follows the
    /// skip-first-capture policy of the bound configuration.
    pub fn enable(&mut self) -> IcuResult<()> {
        self.expect_initialized();
        let config = match (self.state, self.config) {
            (ChannelState::Ready, Some(config)) => config,
            _ => {
                warn!("{}: enable refused in state {}", self.unit, self.state);
                return Err(IcuError::InvalidState);
            }
        };

        self.sample = if config.skip_first_capture {
            CaptureSample::empty()
        } else {
            CaptureSample::zero_baseline()
        };

        // Edges latched while the unit sat in Ready are stale.
        let _ = self.adapter.read_and_clear_pending();
        self.adapter.set_interrupts(true);
        self.state = ChannelState::Active;
        debug!("{}: enabled", self.unit);
        Ok(())
    }

    /// Stop capturing: `Active → Ready`, no-op when already `Ready`
    pub fn disable(&mut self) -> IcuResult<()> {
        self.expect_initialized();
        match self.state {
            ChannelState::Active => {
                self.adapter.set_interrupts(false);
                self.state = ChannelState::Ready;
                debug!("{}: disabled", self.unit);
                Ok(())
            }
            ChannelState::Ready => Ok(()),
            _ => {
                warn!("{}: disable refused in state {}", self.unit, self.state);
                Err(IcuError::InvalidState)
            }
        }
    }

    /// Release the configuration and idle the hardware: any state → `Stopped`
    pub fn stop(&mut self) {
        self.expect_initialized();
        match self.state {
            ChannelState::Active => {
                self.adapter.set_interrupts(false);
                self.adapter.disarm();
            }
            ChannelState::Ready => self.adapter.disarm(),
            ChannelState::Stopped | ChannelState::Uninitialized => {}
        }

        self.config = None;
        self.sample = CaptureSample::empty();
        self.state = ChannelState::Stopped;
        debug!("{}: stopped", self.unit);
    }

    /// Last measured pulse width
    ///
    /// `WouldBlock` until a width has been measured since `enable`.
    pub fn width(&self) -> nb::Result<Ticks, IcuError> {
        self.measurement(self.sample.width)
    }

    /// Last measured period
    ///
    /// `WouldBlock` until a period has been measured since `enable`.
    pub fn period(&self) -> nb::Result<Ticks, IcuError> {
        self.measurement(self.sample.period)
    }

    fn measurement(&self, value: Option<Ticks>) -> nb::Result<Ticks, IcuError> {
        match self.state {
            ChannelState::Ready | ChannelState::Active => value.ok_or(nb::Error::WouldBlock),
            _ => Err(nb::Error::Other(IcuError::InvalidState)),
        }
    }

    /// Convert one dispatched capture into measurements
    ///
    /// Only valid while `Active`. The width edge is measured from the
    /// previous boundary of either kind, the period edge from the previous
    /// period edge. When both bits are set the width is computed first and
    /// both use `raw_count`. Deltas use modular subtraction over the counter
    /// width.
    ///
    /// Without a baseline the first capture, of either kind, seeds both the
    /// width and the period baseline and reports nothing; the next edge is
    /// measured from it.
    ///
    /// [`Capture::overflow`] is set once per counter rollover: either by the
    /// hardware overflow flag, or by a capture whose count is below the
    /// previous capture's when that rollover was not already flagged.
    pub fn on_edge(&mut self, reason: EdgeReason, raw_count: u32) -> IcuResult<Capture> {
        if self.state != ChannelState::Active {
            return Err(IcuError::InvalidState);
        }

        let counter = self.adapter.counter_width();
        let raw = raw_count & counter.mask();
        let hw_overflow = reason.contains(EdgeReason::OVERFLOW);
        let captured = reason.contains(EdgeReason::WIDTH) || reason.contains(EdgeReason::PERIOD);
        let mut capture = Capture::default();

        if !captured {
            if hw_overflow {
                self.sample.wrap_reported = true;
            }
            capture.overflow = hw_overflow;
            return Ok(capture);
        }

        let wrapped = self
            .sample
            .last_count
            .is_some_and(|prev| counter.wrapped(prev, raw));
        capture.overflow = hw_overflow || (wrapped && !self.sample.wrap_reported);
        // A flagged rollover not yet visible in this capture is still ahead of it.
        self.sample.wrap_reported = hw_overflow && !wrapped;
        self.sample.last_count = Some(raw);

        if !self.sample.has_baseline() {
            self.sample.boundary = Some(raw);
            self.sample.period_start = Some(raw);
            return Ok(capture);
        }

        if reason.contains(EdgeReason::WIDTH) {
            if let Some(prev) = self.sample.boundary {
                let width = counter.elapsed(prev, raw);
                capture.width = Some(width);
                self.sample.width = Some(width);
            }
            self.sample.boundary = Some(raw);
        }

        if reason.contains(EdgeReason::PERIOD) {
            if let Some(prev) = self.sample.period_start {
                let period = counter.elapsed(prev, raw);
                capture.period = Some(period);
                self.sample.period = Some(period);
            }
            self.sample.period_start = Some(raw);
            self.sample.boundary = Some(raw);
        }

        Ok(capture)
    }

    pub(crate) fn lock(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    pub(crate) fn unlock(&mut self) {
        self.locked = false;
    }

    fn expect_initialized(&self) {
        assert!(
            self.state != ChannelState::Uninitialized,
            "capture channel used before init()"
        );
    }
}
