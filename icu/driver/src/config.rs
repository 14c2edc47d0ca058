//! Channel and driver configuration

use icu_core::{
    EdgePolarity, IcuError, IcuResult, InputChannel, IrqPriority, Ticks, UnitId,
    DEFAULT_IRQ_PRIORITY, UNIT_COUNT,
};

/// Callback receiving a width or period measurement, in counter ticks
///
/// Runs in interrupt context: keep it short and never block.
pub type CaptureCallback = fn(UnitId, Ticks);

/// Callback signalling a counter overflow between captures
///
/// Runs in interrupt context: keep it short and never block.
pub type OverflowCallback = fn(UnitId);

/// Configuration of one capture channel
///
/// The configuration is copied into the channel by `start` and cannot be
/// changed while the channel is started; stop the channel to reconfigure it.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    /// Edge that opens a period
    pub polarity: EdgePolarity,
    /// Counter clock in Hz; must divide the unit's source clock exactly
    pub frequency: u32,
    /// Pulse width callback
    pub width_callback: Option<CaptureCallback>,
    /// Period callback
    pub period_callback: Option<CaptureCallback>,
    /// Counter overflow callback
    pub overflow_callback: Option<OverflowCallback>,
    /// Timer input the unit captures from
    pub input: InputChannel,
    /// Discard the first edge after `enable`
    ///
    /// The discarded edge, width or period, becomes the baseline of both
    /// measurements, so the second edge always reports one.
    ///
    /// When disabled the first edge is measured against a zero baseline, so
    /// the first width or period reported is the raw counter value at that
    /// edge rather than a real measurement.
    pub skip_first_capture: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            polarity: EdgePolarity::RisingActiveHigh,
            frequency: 0,
            width_callback: None,
            period_callback: None,
            overflow_callback: None,
            input: InputChannel::Ch1,
            skip_first_capture: true,
        }
    }
}

impl ChannelConfig {
    /// Creates a new channel configuration builder.
    pub fn builder() -> ChannelConfigBuilder {
        ChannelConfigBuilder::default()
    }

    /// Checks the fields that do not depend on the target unit.
    pub fn validate(&self) -> IcuResult<()> {
        if self.frequency == 0 {
            return Err(IcuError::InvalidConfig);
        }
        Ok(())
    }
}

/// Builder for ergonomic channel configuration construction.
#[derive(Debug, Clone, Default)]
pub struct ChannelConfigBuilder {
    config: ChannelConfig,
}

impl ChannelConfigBuilder {
    /// Sets the edge polarity.
    pub fn polarity(mut self, polarity: EdgePolarity) -> Self {
        self.config.polarity = polarity;
        self
    }

    /// Sets the counter clock in Hz.
    pub fn frequency(mut self, hz: u32) -> Self {
        self.config.frequency = hz;
        self
    }

    /// Sets the pulse width callback.
    pub fn width_callback(mut self, callback: CaptureCallback) -> Self {
        self.config.width_callback = Some(callback);
        self
    }

    /// Sets the period callback.
    pub fn period_callback(mut self, callback: CaptureCallback) -> Self {
        self.config.period_callback = Some(callback);
        self
    }

    /// Sets the overflow callback.
    pub fn overflow_callback(mut self, callback: OverflowCallback) -> Self {
        self.config.overflow_callback = Some(callback);
        self
    }

    /// Sets the timer input.
    pub fn input(mut self, input: InputChannel) -> Self {
        self.config.input = input;
        self
    }

    /// Enables or disables discarding of the first capture.
    pub fn skip_first_capture(mut self, skip: bool) -> Self {
        self.config.skip_first_capture = skip;
        self
    }

    /// Builds the channel configuration.
    pub fn build(self) -> ChannelConfig {
        self.config
    }
}

/// Driver-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Interrupt priority of each unit, indexed by [`UnitId::index`]
    pub priorities: [IrqPriority; UNIT_COUNT],
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            priorities: [DEFAULT_IRQ_PRIORITY; UNIT_COUNT],
        }
    }
}

impl DriverConfig {
    /// Creates a new driver configuration builder.
    pub fn builder() -> DriverConfigBuilder {
        DriverConfigBuilder::default()
    }

    /// Interrupt priority of `unit`
    pub fn priority(&self, unit: UnitId) -> IrqPriority {
        self.priorities[unit.index()]
    }
}

/// Builder for [`DriverConfig`].
#[derive(Debug, Clone, Default)]
pub struct DriverConfigBuilder {
    config: DriverConfig,
}

impl DriverConfigBuilder {
    /// Sets the interrupt priority of a single unit.
    pub fn priority(mut self, unit: UnitId, priority: IrqPriority) -> Self {
        self.config.priorities[unit.index()] = priority;
        self
    }

    /// Sets the interrupt priority of every unit.
    pub fn all_priorities(mut self, priority: IrqPriority) -> Self {
        self.config.priorities = [priority; UNIT_COUNT];
        self
    }

    /// Builds the driver configuration.
    pub fn build(self) -> DriverConfig {
        self.config
    }
}
