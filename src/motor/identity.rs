// Board identity handshake (PID/VID registers)

use tracing::debug;

use super::bus::RegisterBus;
use super::error::TransportError;
use super::registers::{EXPECTED_PID, EXPECTED_VID, Register};

/// Product/vendor identifier pair reported by a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardIdentity {
    pub pid: u8,
    pub vid: u8,
}

impl BoardIdentity {
    /// True for the DC motor board this crate drives
    pub fn is_expected(&self) -> bool {
        self.pid == EXPECTED_PID && self.vid == EXPECTED_VID
    }
}

/// Read PID then VID
pub fn read_identity<B: RegisterBus>(bus: &mut B) -> Result<BoardIdentity, TransportError> {
    let pid = bus.read_u8(Register::Pid.addr())?;
    let vid = bus.read_u8(Register::Vid.addr())?;
    debug!("pid: 0x{:02X} vid: 0x{:02X}", pid, vid);
    Ok(BoardIdentity { pid, vid })
}

/// Check that the device on `bus` is a DC motor board
///
/// Transport failures count as "not this board".
pub fn validate_identity<B: RegisterBus>(bus: &mut B) -> bool {
    match read_identity(bus) {
        Ok(identity) => identity.is_expected(),
        Err(e) => {
            debug!("identity read failed: {}", e);
            false
        }
    }
}
