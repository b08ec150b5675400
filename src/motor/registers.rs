// DFRobot DC motor board register map
//
// All registers live on a single 7-bit I2C address. Channel-indexed registers
// are laid out with a fixed stride from their channel 1 base:
// encoder registers every 5 bytes, motor registers every 3 bytes.
// 16-bit registers are big-endian.

use std::ops::RangeInclusive;

use super::error::{MotorError, Result};

/// Expected product ID read from `Register::Pid`
pub const EXPECTED_PID: u8 = 0xDF;
/// Expected vendor ID read from `Register::Vid`
pub const EXPECTED_VID: u8 = 0x10;

/// Offset between encoder 1 and encoder 2 registers
pub const ENCODER_STRIDE: u8 = 5;
/// Offset between motor 1 and motor 2 registers
pub const MOTOR_STRIDE: u8 = 3;

/// Valid PWM duty cycle, in percent
pub const DUTY_CYCLE_RANGE: RangeInclusive<f32> = 0.0..=100.0;
/// Valid encoder reduction ratio
pub const REDUCTION_RATIO_RANGE: RangeInclusive<u16> = 1..=2000;
/// Valid PWM frequency, in Hz
pub const PWM_FREQUENCY_RANGE: RangeInclusive<u16> = 100..=12750;
/// PWM frequency is written as `frequency / PWM_FREQUENCY_STEP`
pub const PWM_FREQUENCY_STEP: u16 = 50;

/// Register addresses
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    SlaveAddr = 0x00,         // 1 byte, applied after reboot
    Pid = 0x01,               // 1 byte, read-only
    Vid = 0x02,               // 1 byte, read-only
    CtrlMode = 0x03,          // 1 byte: 0 = DC motor mode, otherwise PWM frequency / 50
    Encoder1Enable = 0x04,    // 1 byte: 0 = off, 1 = on
    Encoder1Speed = 0x05,     // 2 bytes, read-only (two's complement)
    Encoder1Ratio = 0x07,     // 2 bytes
    Encoder2Enable = 0x09,    // 1 byte
    Encoder2Speed = 0x0A,     // 2 bytes, read-only
    Encoder2Ratio = 0x0C,     // 2 bytes
    MotorPwm = 0x0E,          // 1 byte
    Motor1Orientation = 0x0F, // 1 byte, see `Direction`
    Motor1Speed = 0x10,       // 2 bytes: integer percent, tenths
    Motor2Orientation = 0x12,
    Motor2Speed = 0x13,
}

impl Register {
    pub fn addr(self) -> u8 {
        self as u8
    }
}

/// One of the two motor/encoder outputs of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorChannel {
    Channel1,
    Channel2,
}

impl MotorChannel {
    pub const ALL: [MotorChannel; 2] = [MotorChannel::Channel1, MotorChannel::Channel2];

    /// Zero-based index used for register offsets
    pub fn index(self) -> u8 {
        match self {
            MotorChannel::Channel1 => 0,
            MotorChannel::Channel2 => 1,
        }
    }

    /// Channel number as printed on the board (1 or 2)
    pub fn number(self) -> u8 {
        self.index() + 1
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(MotorChannel::Channel1),
            2 => Some(MotorChannel::Channel2),
            _ => None,
        }
    }

    pub fn encoder_enable(self) -> u8 {
        register_for(Register::Encoder1Enable, self, ENCODER_STRIDE)
    }

    pub fn encoder_speed(self) -> u8 {
        register_for(Register::Encoder1Speed, self, ENCODER_STRIDE)
    }

    pub fn encoder_ratio(self) -> u8 {
        register_for(Register::Encoder1Ratio, self, ENCODER_STRIDE)
    }

    pub fn motor_orientation(self) -> u8 {
        register_for(Register::Motor1Orientation, self, MOTOR_STRIDE)
    }

    /// The speed register always follows the orientation register
    pub fn motor_speed(self) -> u8 {
        self.motor_orientation() + 1
    }
}

impl std::fmt::Display for MotorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "M{}", self.number())
    }
}

/// Value written to a motor orientation register
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise = 0x01,
    CounterClockwise = 0x02,
    Stop = 0x05,
}

impl Direction {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Clockwise => "CW",
            Direction::CounterClockwise => "CCW",
            Direction::Stop => "STOP",
        };
        f.write_str(name)
    }
}

/// Register address of `base` shifted to `channel`
pub fn register_for(base: Register, channel: MotorChannel, stride: u8) -> u8 {
    base.addr() + stride * channel.index()
}

/// Encode a duty cycle as [integer percent, tenths of a percent]
///
/// Values outside 0..=100 (and NaN) are rejected.
pub fn encode_duty_cycle(duty_cycle: f32) -> Result<u16> {
    if !DUTY_CYCLE_RANGE.contains(&duty_cycle) {
        return Err(MotorError::Validation {
            parameter: "duty cycle",
            reason: format!("{} out of range 0-100", duty_cycle),
        });
    }
    let integer = duty_cycle as u16;
    let tenths = (duty_cycle * 10.0) as u16 % 10;
    Ok((integer << 8) | tenths)
}

/// Decode a raw encoder speed register (16-bit two's complement)
pub fn decode_encoder_speed(raw: u16) -> i32 {
    if raw & 0x8000 != 0 {
        -(0x10000 - raw as i32)
    } else {
        raw as i32
    }
}

/// Byte written to `Register::CtrlMode` for a PWM frequency
pub fn encode_pwm_frequency(frequency: u16) -> Result<u8> {
    if !PWM_FREQUENCY_RANGE.contains(&frequency) {
        return Err(MotorError::Validation {
            parameter: "PWM frequency",
            reason: format!("{} Hz out of range 100-12750", frequency),
        });
    }
    // 12750 / 50 = 255, always fits
    Ok((frequency / PWM_FREQUENCY_STEP) as u8)
}

pub fn check_reduction_ratio(ratio: u16) -> Result<u16> {
    if !REDUCTION_RATIO_RANGE.contains(&ratio) {
        return Err(MotorError::Validation {
            parameter: "reduction ratio",
            reason: format!("{} out of range 1-2000", ratio),
        });
    }
    Ok(ratio)
}

pub fn check_board_address(address: u8) -> Result<u8> {
    if !crate::config::BOARD_ADDRESS_RANGE.contains(&address) {
        return Err(MotorError::Validation {
            parameter: "board address",
            reason: format!("0x{:02X} out of range 1-127", address),
        });
    }
    Ok(address)
}
