// Reports printed by the CLI in --json mode

use serde::{Deserialize, Serialize};

use crate::motor::{BoardIdentity, MotorChannel};

// Result of a bus scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub bus: String,
    pub addresses: Vec<u8>,
}

// One encoder speed sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EncoderReading {
    pub channel: u8,
    pub speed: i32,
}

impl EncoderReading {
    pub fn new(channel: MotorChannel, speed: i32) -> Self {
        Self {
            channel: channel.number(),
            speed,
        }
    }
}

/// Identity of a connected board
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoardStatus {
    pub address: u8,
    pub pid: u8,
    pub vid: u8,
    pub genuine: bool,
}

impl BoardStatus {
    pub fn new(address: u8, identity: BoardIdentity) -> Self {
        Self {
            address,
            pid: identity.pid,
            vid: identity.vid,
            genuine: identity.is_expected(),
        }
    }
}
