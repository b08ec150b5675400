// Driver for the DFRobot dual-channel DC motor board
//
// Provides:
// - Register map and value encodings
// - Bus transport traits with an embedded-hal I2C adapter
// - Identity handshake and address scan
// - High-level motor controller API

pub mod bus;
mod discovery;
mod driver;
mod error;
mod identity;
pub mod registers;
#[cfg(test)]
pub(crate) mod testing;

#[cfg(target_os = "linux")]
pub use bus::LinuxI2cProvider;
pub use bus::{BusProvider, I2cRegisterBus, RegisterBus};
pub use discovery::scan;
pub use driver::MotorController;
pub use error::{MotorError, Result, TransportError};
pub use identity::{BoardIdentity, read_identity, validate_identity};
pub use registers::{Direction, MotorChannel, Register};
