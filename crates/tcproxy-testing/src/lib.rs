//! Testing utilities for the TouchController proxy bridge.
//!
//! Every collaborator trait has a recording fake here, and
//! [`BridgeTestRule`] wires them all to an attached bridge on a private
//! runtime.

pub mod fakes;
pub mod proxy;
pub mod testing;

pub use fakes::*;
pub use proxy::*;
pub use testing::*;

/// Installs an `env_logger` writing to the test output. Safe to call from
/// every test; only the first call does anything.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
