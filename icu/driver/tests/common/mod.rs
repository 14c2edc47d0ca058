//! Host-side test doubles for the ICU driver
//!
//! `MockAdapter` models a 16-bit capture unit whose "hardware" is driven by the
//! test through a shared `MockHardware` handle. `MockController` records what
//! the driver asks of the interrupt controller. Callbacks record into a
//! thread-local log so tests can run in parallel.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use icu_driver::{
    ArmSetup, CaptureAdapter, CaptureLine, CounterWidth, EdgeReason, IcuError, IcuResult,
    InputChannel, InterruptController, IrqHandler, IrqPriority, IrqSource, Ticks, UnitId,
};

pub const SOURCE_CLOCK: u32 = 64_000_000;

/// Register state shared between the adapter and the test
#[derive(Debug, Default)]
pub struct HwState {
    pub armed: Option<ArmSetup>,
    pub interrupts: bool,
    pub pending: EdgeReason,
    pub latched: u32,
    /// Order of register accesses made by the adapter
    pub accesses: Vec<Access>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Arm,
    Disarm,
    Interrupts(bool),
    ReadPending,
    ReadCounter,
}

#[derive(Debug, Clone, Default)]
pub struct MockHardware(Arc<Mutex<HwState>>);

impl MockHardware {
    /// Latch an edge: set pending flags and the captured counter value
    pub fn edge(&self, reason: EdgeReason, counter: u32) {
        let mut hw = self.0.lock().unwrap();
        hw.pending |= reason;
        hw.latched = counter;
    }

    pub fn state<R>(&self, f: impl FnOnce(&HwState) -> R) -> R {
        f(&self.0.lock().unwrap())
    }

    pub fn clear_accesses(&self) {
        self.0.lock().unwrap().accesses.clear();
    }
}

pub struct MockAdapter {
    hw: MockHardware,
    module: u8,
    source: IrqSource,
}

impl MockAdapter {
    pub fn new(module: u8, source: IrqSource) -> (Self, MockHardware) {
        let hw = MockHardware::default();
        let adapter = Self {
            hw: hw.clone(),
            module,
            source,
        };
        (adapter, hw)
    }

    fn with_hw<R>(&self, f: impl FnOnce(&mut HwState) -> R) -> R {
        f(&mut self.hw.0.lock().unwrap())
    }
}

impl CaptureAdapter for MockAdapter {
    fn counter_width(&self) -> CounterWidth {
        CounterWidth::BITS_16
    }

    fn source_clock(&self) -> u32 {
        SOURCE_CLOCK
    }

    fn irq_source(&self) -> IrqSource {
        self.source
    }

    fn line(&self, input: InputChannel) -> CaptureLine {
        CaptureLine::new(self.module, input)
    }

    fn arm(&mut self, setup: &ArmSetup) {
        self.with_hw(|hw| {
            hw.accesses.push(Access::Arm);
            hw.armed = Some(*setup);
            hw.pending = EdgeReason::NONE;
        });
    }

    fn set_interrupts(&mut self, enabled: bool) {
        self.with_hw(|hw| {
            hw.accesses.push(Access::Interrupts(enabled));
            hw.interrupts = enabled;
        });
    }

    fn disarm(&mut self) {
        self.with_hw(|hw| {
            hw.accesses.push(Access::Disarm);
            hw.armed = None;
        });
    }

    fn read_and_clear_pending(&mut self) -> EdgeReason {
        self.with_hw(|hw| {
            hw.accesses.push(Access::ReadPending);
            core::mem::take(&mut hw.pending)
        })
    }

    fn read_counter(&mut self) -> u32 {
        self.with_hw(|hw| {
            hw.accesses.push(Access::ReadCounter);
            hw.latched
        })
    }
}

/// Interrupt controller that records registrations, priorities and masks
#[derive(Debug, Default)]
pub struct MockController {
    pub handlers: BTreeMap<IrqSource, IrqHandler>,
    pub priorities: BTreeMap<IrqSource, IrqPriority>,
    pub unmasked: BTreeMap<IrqSource, bool>,
    /// Highest priority accepted; anything above fails with `InvalidConfig`
    pub max_priority: Option<IrqPriority>,
}

impl MockController {
    pub fn with_max_priority(max_priority: IrqPriority) -> Self {
        Self {
            max_priority: Some(max_priority),
            ..Self::default()
        }
    }

    pub fn handler(&self, source: IrqSource) -> Option<IrqHandler> {
        self.handlers.get(&source).copied()
    }

    pub fn is_unmasked(&self, source: IrqSource) -> bool {
        self.unmasked.get(&source).copied().unwrap_or(false)
    }
}

impl InterruptController for MockController {
    fn register_handler(&mut self, source: IrqSource, handler: IrqHandler) -> IcuResult<()> {
        self.handlers.insert(source, handler);
        Ok(())
    }

    fn set_priority(&mut self, source: IrqSource, priority: IrqPriority) -> IcuResult<()> {
        if self.max_priority.is_some_and(|max| priority > max) {
            return Err(IcuError::InvalidConfig);
        }
        self.priorities.insert(source, priority);
        Ok(())
    }

    fn unmask(&mut self, source: IrqSource) {
        self.unmasked.insert(source, true);
    }

    fn mask(&mut self, source: IrqSource) {
        self.unmasked.insert(source, false);
    }
}

/// Callback invocations, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Width(UnitId, Ticks),
    Period(UnitId, Ticks),
    Overflow(UnitId),
}

thread_local! {
    static EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
}

pub fn on_width(unit: UnitId, ticks: Ticks) {
    EVENTS.with(|events| events.borrow_mut().push(Event::Width(unit, ticks)));
}

pub fn on_period(unit: UnitId, ticks: Ticks) {
    EVENTS.with(|events| events.borrow_mut().push(Event::Period(unit, ticks)));
}

pub fn on_overflow(unit: UnitId) {
    EVENTS.with(|events| events.borrow_mut().push(Event::Overflow(unit)));
}

/// Drain the events recorded on this thread
pub fn take_events() -> Vec<Event> {
    EVENTS.with(|events| events.borrow_mut().drain(..).collect())
}
