//! The ICU driver running on in-memory eTimer and INTC register blocks

use std::cell::RefCell;
use std::ptr;

use icu_driver::{
    ChannelConfig, ChannelState, DriverConfig, EdgePolarity, IcuDriver, IrqSource, SharedIcu,
    Ticks, UnitId,
};
use icu_port_spc5::etimer::sts;
use icu_port_spc5::intc::INTC_VECTORS;
use icu_port_spc5::{handle_vector, EtimerChannel, EtimerChannelRegs, Intc};

thread_local! {
    static WIDTHS: RefCell<Vec<Ticks>> = const { RefCell::new(Vec::new()) };
    static PERIODS: RefCell<Vec<Ticks>> = const { RefCell::new(Vec::new()) };
}

fn on_width(_: UnitId, ticks: Ticks) {
    WIDTHS.with(|w| w.borrow_mut().push(ticks));
}

fn on_period(_: UnitId, ticks: Ticks) {
    PERIODS.with(|p| p.borrow_mut().push(ticks));
}

static ICU: SharedIcu<EtimerChannel, Intc> = SharedIcu::new();

fn dispatch(source: IrqSource) {
    ICU.on_interrupt(source);
}

/// Latch a capture and raise the channel's vector
fn capture(regs: *mut EtimerChannelRegs, flag: u16, value: u16) {
    unsafe {
        if flag == sts::ICF1 {
            (*regs).capt1 = value;
        } else {
            (*regs).capt2 = value;
        }
        (*regs).sts = flag;
    }
    assert!(handle_vector(EtimerChannel::vector(UnitId::Smod6)));
    // In memory the write-one-to-clear leaves the flag set.
    unsafe { (*regs).sts = 0 };
}

#[test]
fn test_capture_on_etimer_registers() {
    // Both blocks are only accessed through these pointers.
    let mut regs_block = EtimerChannelRegs::default();
    let mut psr_block = [0u8; INTC_VECTORS];
    let regs = ptr::addr_of_mut!(regs_block);
    let psr = ptr::addr_of_mut!(psr_block);

    let channel = unsafe { EtimerChannel::new(regs, UnitId::Smod6, 80_000_000) };
    let intc = unsafe { Intc::new(psr.cast()) };
    let config = DriverConfig::builder().priority(UnitId::Smod6, 9).build();
    let driver = IcuDriver::new(config, intc, dispatch)
        .with_unit(UnitId::Smod6, channel)
        .unwrap();
    ICU.install(driver);

    let config = ChannelConfig::builder()
        .frequency(10_000_000)
        .polarity(EdgePolarity::RisingActiveHigh)
        .width_callback(on_width)
        .period_callback(on_period)
        .build();
    ICU.start(UnitId::Smod6, config).unwrap();
    ICU.enable(UnitId::Smod6).unwrap();

    let vector = usize::from(EtimerChannel::vector(UnitId::Smod6));
    assert_eq!(unsafe { (*psr)[vector] }, 9);
    assert_ne!(unsafe { (*regs).intdma }, 0);

    capture(regs, sts::ICF1, 1000);
    capture(regs, sts::ICF2, 1400);
    capture(regs, sts::ICF1, 3000);

    assert_eq!(WIDTHS.with(|w| w.borrow().clone()), vec![400]);
    assert_eq!(PERIODS.with(|p| p.borrow().clone()), vec![2000]);

    ICU.disable(UnitId::Smod6).unwrap();
    assert_eq!(unsafe { (*psr)[vector] }, 0);
    assert_eq!(unsafe { (*regs).intdma }, 0);

    ICU.stop(UnitId::Smod6).unwrap();
    assert_eq!(ICU.state(UnitId::Smod6), Ok(ChannelState::Stopped));
    assert_eq!(unsafe { (*regs).ctrl1 }, 0);

    // The driver must not outlive the register blocks.
    assert!(ICU.take().is_some());
}
