//! Tests for the `static` driver cell and its interrupt entry point

mod common;

use common::{on_period, on_width, take_events, Event, MockAdapter, MockController, MockHardware};
use icu_driver::{
    ChannelConfig, ChannelState, DriverConfig, EdgeReason, IcuDriver, IrqHandler, IrqSource,
    SharedIcu, UnitId,
};

type Icu = SharedIcu<MockAdapter, MockController>;

const SOURCE: IrqSource = IrqSource(157);

fn smod0_driver(dispatcher: IrqHandler) -> (IcuDriver<MockAdapter, MockController>, MockHardware) {
    let (adapter, hw) = MockAdapter::new(0, SOURCE);
    let driver = IcuDriver::new(DriverConfig::default(), MockController::default(), dispatcher)
        .with_unit(UnitId::Smod0, adapter)
        .unwrap();
    (driver, hw)
}

/// Latch an edge and run whatever handler the driver registered for it
fn fire(icu: &Icu, hw: &MockHardware, reason: EdgeReason, counter: u32) {
    hw.edge(reason, counter);
    let handler = icu
        .with(|driver| driver.controller().handler(SOURCE))
        .expect("no handler registered");
    handler(SOURCE);
}

#[test]
fn test_registered_handler_reaches_callbacks() {
    static ICU: Icu = SharedIcu::new();
    fn dispatch(source: IrqSource) {
        ICU.on_interrupt(source);
    }

    let (driver, hw) = smod0_driver(dispatch);
    ICU.install(driver);
    assert_eq!(ICU.state(UnitId::Smod0), Ok(ChannelState::Stopped));

    let config = ChannelConfig::builder()
        .frequency(4_000_000)
        .width_callback(on_width)
        .period_callback(on_period)
        .build();
    ICU.start(UnitId::Smod0, config).unwrap();
    ICU.enable(UnitId::Smod0).unwrap();

    fire(&ICU, &hw, EdgeReason::PERIOD, 100);
    fire(&ICU, &hw, EdgeReason::WIDTH, 350);
    fire(&ICU, &hw, EdgeReason::PERIOD, 1100);

    assert_eq!(
        take_events(),
        vec![
            Event::Width(UnitId::Smod0, 250),
            Event::Period(UnitId::Smod0, 1000),
        ]
    );
    assert_eq!(ICU.width(UnitId::Smod0), Ok(250));
    assert_eq!(ICU.period(UnitId::Smod0), Ok(1000));
}

#[test]
fn test_callback_may_stop_its_unit() {
    static ICU: Icu = SharedIcu::new();
    fn dispatch(source: IrqSource) {
        ICU.on_interrupt(source);
    }
    fn stop_after_period(unit: UnitId, ticks: u32) {
        on_period(unit, ticks);
        ICU.stop(unit).unwrap();
    }

    let (driver, hw) = smod0_driver(dispatch);
    ICU.install(driver);
    let config = ChannelConfig::builder()
        .frequency(1_000_000)
        .period_callback(stop_after_period)
        .skip_first_capture(false)
        .build();
    ICU.start(UnitId::Smod0, config).unwrap();
    ICU.enable(UnitId::Smod0).unwrap();

    fire(&ICU, &hw, EdgeReason::PERIOD, 500);

    assert_eq!(take_events(), vec![Event::Period(UnitId::Smod0, 500)]);
    assert_eq!(ICU.state(UnitId::Smod0), Ok(ChannelState::Stopped));
    ICU.with(|driver| {
        assert!(!driver.controller().is_unmasked(SOURCE));
        assert!(!driver.channel(UnitId::Smod0).unwrap().is_locked());
    });

    // A stopped unit can be started again.
    ICU.start(UnitId::Smod0, config).unwrap();
    assert_eq!(ICU.state(UnitId::Smod0), Ok(ChannelState::Ready));
}

#[test]
fn test_install_initializes_driver() {
    static ICU: Icu = SharedIcu::new();
    fn dispatch(source: IrqSource) {
        ICU.on_interrupt(source);
    }

    let (driver, _hw) = smod0_driver(dispatch);
    assert!(!driver.is_initialized());
    ICU.install(driver);
    assert!(ICU.with(|driver| driver.is_initialized()));
}

#[test]
fn test_take_empties_the_cell() {
    static ICU: Icu = SharedIcu::new();
    fn dispatch(source: IrqSource) {
        ICU.on_interrupt(source);
    }

    ICU.install(smod0_driver(dispatch).0);
    let driver = ICU.take().expect("driver was installed");
    assert!(driver.is_initialized());
    assert!(ICU.take().is_none());

    // The cell accepts a new driver once emptied.
    ICU.install(smod0_driver(dispatch).0);
    assert_eq!(ICU.state(UnitId::Smod0), Ok(ChannelState::Stopped));
}

#[test]
#[should_panic(expected = "installed twice")]
fn test_install_twice_panics() {
    static ICU: Icu = SharedIcu::new();
    fn dispatch(source: IrqSource) {
        ICU.on_interrupt(source);
    }

    ICU.install(smod0_driver(dispatch).0);
    ICU.install(smod0_driver(dispatch).0);
}

#[test]
#[should_panic(expected = "before install")]
fn test_use_before_install_panics() {
    static ICU: Icu = SharedIcu::new();
    let _ = ICU.state(UnitId::Smod0);
}
