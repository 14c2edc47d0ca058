//! Unit selection against the compiled-in unit set
//!
//! The default build compiles every unit in. Exercise the compiled-out path
//! with a reduced set:
//! `cargo test -p icu-driver --no-default-features --features smod0,smod1,smod3,smod4,smod6`

mod common;

use common::{MockAdapter, MockController};
use icu_driver::{IcuDriver, IrqSource, UnitId};

type Driver = IcuDriver<MockAdapter, MockController>;

fn unused_dispatcher(_: IrqSource) {}

fn driver() -> Driver {
    IcuDriver::new(Default::default(), MockController::default(), unused_dispatcher)
}

#[test]
fn test_present_units_follow_features() {
    assert_eq!(UnitId::Smod0.is_present(), cfg!(feature = "smod0"));
    assert_eq!(UnitId::Smod3.is_present(), cfg!(feature = "smod3"));
    assert_eq!(UnitId::Smod9.is_present(), cfg!(feature = "smod9"));
    assert_eq!(UnitId::Smod11.is_present(), cfg!(feature = "smod11"));
}

#[test]
#[cfg(all(feature = "smod0", not(feature = "smod9")))]
fn test_compiled_out_unit_is_not_present() {
    use icu_driver::{ChannelConfig, IcuError};

    let mut driver = driver();
    let (adapter, _hw) = MockAdapter::new(1, IrqSource(166));
    assert_eq!(
        driver.attach(UnitId::Smod9, adapter),
        Err(IcuError::ChannelNotPresent)
    );

    let (adapter, _hw) = MockAdapter::new(0, IrqSource(157));
    driver.attach(UnitId::Smod0, adapter).unwrap();
    driver.init();

    let config = ChannelConfig::builder().frequency(1_000_000).build();
    assert_eq!(driver.state(UnitId::Smod9), Err(IcuError::ChannelNotPresent));
    assert_eq!(
        driver.start(UnitId::Smod9, config),
        Err(IcuError::ChannelNotPresent)
    );
    assert_eq!(driver.enable(UnitId::Smod9), Err(IcuError::ChannelNotPresent));
    assert_eq!(driver.stop(UnitId::Smod9), Err(IcuError::ChannelNotPresent));
    assert!(driver.controller().handlers.is_empty());

    // Compiled-in units are unaffected.
    assert_eq!(driver.start(UnitId::Smod0, config), Ok(()));
}

#[test]
#[cfg(feature = "smod9")]
fn test_compiled_in_unit_attaches() {
    let mut driver = driver();
    let (adapter, _hw) = MockAdapter::new(1, IrqSource(166));
    assert_eq!(driver.attach(UnitId::Smod9, adapter), Ok(()));
}
