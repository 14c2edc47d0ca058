//! Pin-change (EXT) line dispatcher
//!
//! Forwards `(line, edge reason)` events from a pin-change interrupt block to
//! per-line callbacks. It shares the read-then-clear contract of the capture
//! dispatcher through [`PendingSource`].

use icu_core::{
    EdgeReason, IcuError, IcuResult, InterruptController, IrqHandler, IrqPriority, IrqSource,
    LineId, PendingSource,
};

use crate::fault::{raise_fault, Fault, FaultKind};

/// Maximum number of lines served by one EXT driver
pub const EXT_MAX_LINES: usize = 8;

/// Default line priority
///
/// Accepted by every shipped controller, including a Cortex-M0 NVIC with two
/// priority bits.
pub const EXT_DEFAULT_PRIORITY: IrqPriority = 3;

/// Per-line callback; runs in interrupt context
pub type ExtCallback = fn(LineId, EdgeReason);

/// EXT driver configuration
#[derive(Debug, Clone, Copy)]
pub struct ExtConfig {
    pub callbacks: [Option<ExtCallback>; EXT_MAX_LINES],
    pub priorities: [IrqPriority; EXT_MAX_LINES],
}

impl Default for ExtConfig {
    fn default() -> Self {
        Self {
            callbacks: [None; EXT_MAX_LINES],
            priorities: [EXT_DEFAULT_PRIORITY; EXT_MAX_LINES],
        }
    }
}

impl ExtConfig {
    /// Sets the callback of `line`.
    pub fn callback(mut self, line: LineId, callback: ExtCallback) -> Self {
        if let Some(slot) = self.callbacks.get_mut(line as usize) {
            *slot = Some(callback);
        }
        self
    }

    /// Sets the interrupt priority of `line`.
    pub fn priority(mut self, line: LineId, priority: IrqPriority) -> Self {
        if let Some(slot) = self.priorities.get_mut(line as usize) {
            *slot = priority;
        }
        self
    }
}

/// EXT driver over one pin-change interrupt block
///
/// Line `n` raises interrupt source `first_source + n`.
pub struct ExtDriver<P> {
    source: P,
    first_source: IrqSource,
    config: Option<ExtConfig>,
}

impl<P: PendingSource> ExtDriver<P> {
    pub fn new(source: P, first_source: IrqSource) -> Self {
        Self {
            source,
            first_source,
            config: None,
        }
    }

    pub fn pending_source(&self) -> &P {
        &self.source
    }

    pub fn pending_source_mut(&mut self) -> &mut P {
        &mut self.source
    }

    pub fn is_started(&self) -> bool {
        self.config.is_some()
    }

    /// Bind the line callbacks
    pub fn start(&mut self, config: ExtConfig) -> IcuResult<()> {
        if self.config.is_some() {
            return Err(IcuError::InvalidState);
        }
        self.config = Some(config);
        debug!("EXT started");
        Ok(())
    }

    /// Release the line callbacks
    pub fn stop(&mut self) {
        self.config = None;
        debug!("EXT stopped");
    }

    /// Interrupt source raised by `line`
    pub fn line_source(&self, line: LineId) -> IcuResult<IrqSource> {
        self.check_line(line)?;
        Ok(IrqSource(self.first_source.vector() + u16::from(line)))
    }

    /// Register `handler` for `line` and unmask it at the line's priority
    pub fn enable_line<I: InterruptController>(
        &mut self,
        controller: &mut I,
        line: LineId,
        handler: IrqHandler,
    ) -> IcuResult<()> {
        let config = self.config.ok_or(IcuError::InvalidState)?;
        let source = self.line_source(line)?;
        // A rejected priority leaves the line untouched.
        controller.set_priority(source, config.priorities[line as usize])?;
        controller.register_handler(source, handler)?;
        // Drop anything latched while the line was masked.
        let _ = self.source.read_and_clear_pending(line);
        controller.unmask(source);
        Ok(())
    }

    /// Mask `line`
    pub fn disable_line<I: InterruptController>(
        &mut self,
        controller: &mut I,
        line: LineId,
    ) -> IcuResult<()> {
        let source = self.line_source(line)?;
        controller.mask(source);
        Ok(())
    }

    /// Map an interrupt source back to its line
    pub fn line_of(&self, source: IrqSource) -> Option<LineId> {
        let line = source.vector().checked_sub(self.first_source.vector())?;
        let line = LineId::try_from(line).ok()?;
        (line < self.source.line_count()).then_some(line)
    }

    /// Serve the interrupt of `line`: read and clear its flags, then forward
    pub fn on_interrupt(&mut self, line: LineId) {
        if self.check_line(line).is_err() {
            raise_fault(Fault::new(FaultKind::InvalidLine));
            return;
        }
        let reason = self.source.read_and_clear_pending(line);
        self.on_pin_event(line, reason);
    }

    /// Forward an already decoded event to the line's callback
    pub fn on_pin_event(&self, line: LineId, reason: EdgeReason) {
        let callback = self
            .config
            .as_ref()
            .and_then(|config| config.callbacks.get(line as usize).copied().flatten());
        if let Some(callback) = callback {
            callback(line, reason);
        }
    }

    fn check_line(&self, line: LineId) -> IcuResult<()> {
        if (line as usize) < EXT_MAX_LINES && line < self.source.line_count() {
            Ok(())
        } else {
            Err(IcuError::ChannelNotPresent)
        }
    }
}
