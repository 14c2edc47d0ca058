//! Process-wide fault hook for interrupt-context errors
//!
//! Interrupt handlers have no caller to return an error to. Impossible
//! conditions observed while dispatching are reported here instead. Without
//! an installed hook a fault panics.

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;
use icu_core::{IcuError, IrqSource, UnitId};

/// What went wrong in interrupt context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Interrupt raised with no pending capture flag
    SpuriousInterrupt,
    /// Dispatch entered on a channel that was still being dispatched
    Reentered,
    /// Interrupt from a source no enabled unit is bound to
    UnboundSource,
    /// Pin-change event on a line outside the block
    InvalidLine,
}

/// A hardware fault report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub kind: FaultKind,
    pub unit: Option<UnitId>,
    pub source: Option<IrqSource>,
}

impl Fault {
    pub const fn new(kind: FaultKind) -> Self {
        Self {
            kind,
            unit: None,
            source: None,
        }
    }

    pub const fn with_unit(mut self, unit: UnitId) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn with_source(mut self, source: IrqSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Every fault is a hardware fault
    pub const fn error(&self) -> IcuError {
        IcuError::HardwareFault
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::SpuriousInterrupt => write!(f, "spurious interrupt"),
            FaultKind::Reentered => write!(f, "re-entered dispatch"),
            FaultKind::UnboundSource => write!(f, "unbound interrupt source"),
            FaultKind::InvalidLine => write!(f, "invalid line"),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(unit) = self.unit {
            write!(f, " on {}", unit)?;
        }
        if let Some(source) = self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FaultKind {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            FaultKind::SpuriousInterrupt => defmt::write!(fmt, "SpuriousInterrupt"),
            FaultKind::Reentered => defmt::write!(fmt, "Reentered"),
            FaultKind::UnboundSource => defmt::write!(fmt, "UnboundSource"),
            FaultKind::InvalidLine => defmt::write!(fmt, "InvalidLine"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Fault {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Fault{{kind: {}, unit: {}, source: {}}}", self.kind, self.unit, self.source);
    }
}

/// Fault hook signature
pub type FaultHook = fn(Fault);

static FAULT_HOOK: Mutex<Cell<Option<FaultHook>>> = Mutex::new(Cell::new(None));

/// Install the process-wide fault hook, replacing any previous one
pub fn set_fault_hook(hook: FaultHook) {
    critical_section::with(|cs| FAULT_HOOK.borrow(cs).set(Some(hook)));
}

/// Remove the fault hook; later faults panic
pub fn clear_fault_hook() {
    critical_section::with(|cs| FAULT_HOOK.borrow(cs).set(None));
}

/// Report `fault` through the hook
///
/// The hook runs outside the critical section.
pub fn raise_fault(fault: Fault) {
    error!("ICU fault: {}", fault);

    let hook = critical_section::with(|cs| FAULT_HOOK.borrow(cs).get());
    match hook {
        Some(hook) => hook(fault),
        None => panic!("ICU hardware fault: {}", fault),
    }
}
