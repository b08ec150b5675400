// High-level driver for one DFRobot DC motor board
//
// Owns the bus handle for a single board address. Every call is a blocking
// request/response on the caller's thread; share a controller across threads
// only behind an external lock.

use std::thread;

use tracing::{debug, info, warn};

use super::bus::{BusProvider, RegisterBus};
use super::error::{MotorError, Result};
use super::identity::{BoardIdentity, read_identity, validate_identity};
use super::registers::{
    Direction, MotorChannel, Register, check_board_address, check_reduction_ratio,
    decode_encoder_speed, encode_duty_cycle, encode_pwm_frequency,
};
use crate::config::PWM_SETTLE_DELAY;

/// `Register::CtrlMode` value selecting DC motor mode
const DC_MOTOR_MODE: u8 = 0;

/// Driver for a dual-channel DC motor board
pub struct MotorController<B: RegisterBus> {
    bus: B,
    address: u8,
}

impl<B: RegisterBus> MotorController<B> {
    /// Connect to the board at `address`, check its identity and reset it
    pub fn open<P>(provider: &mut P, address: u8) -> Result<Self>
    where
        P: BusProvider<Bus = B>,
    {
        info!("Opening DC motor board at 0x{:02X}", address);
        let bus = provider
            .open(address)
            .map_err(|source| MotorError::Connection { address, source })?;
        Self::from_bus(bus, address)
    }

    /// Take over an already-open bus handle
    ///
    /// The handle is dropped if the board does not identify itself.
    pub fn from_bus(mut bus: B, address: u8) -> Result<Self> {
        if !validate_identity(&mut bus) {
            warn!("No DC motor board answering at 0x{:02X}", address);
            return Err(MotorError::DeviceNotFound { address });
        }

        let mut controller = Self { bus, address };
        controller.reset();
        info!("Board at 0x{:02X} initialized", address);
        Ok(controller)
    }

    /// Bring the board to idle: DC mode, both motors stopped, encoders off
    ///
    /// Each step is attempted even if an earlier one failed.
    fn reset(&mut self) {
        if let Err(e) = self.bus.write_u8(Register::CtrlMode.addr(), DC_MOTOR_MODE) {
            warn!("Reset: failed to select DC motor mode: {}", e);
        }
        for channel in MotorChannel::ALL {
            if let Err(e) = self.stop_motor(channel) {
                warn!("Reset: failed to stop {}: {}", channel, e);
            }
        }
        for channel in MotorChannel::ALL {
            if let Err(e) = self.disable_encoder(channel) {
                warn!("Reset: failed to disable encoder {}: {}", channel, e);
            }
        }
    }

    /// Address this controller is bound to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Re-read PID/VID from the board
    pub fn identity(&mut self) -> Result<BoardIdentity> {
        Ok(read_identity(&mut self.bus)?)
    }

    /// Drive a motor
    ///
    /// # Arguments
    /// * `channel` - Motor channel
    /// * `direction` - `Clockwise` or `CounterClockwise`
    /// * `duty_cycle` - PWM duty cycle in percent, 0 to 100 (one decimal kept)
    pub fn move_motor(
        &mut self,
        channel: MotorChannel,
        direction: Direction,
        duty_cycle: f32,
    ) -> Result<()> {
        if direction == Direction::Stop {
            return Err(MotorError::Validation {
                parameter: "direction",
                reason: "expected CW or CCW, use stop_motor to halt".to_string(),
            });
        }
        let speed = encode_duty_cycle(duty_cycle)?;

        self.bus
            .write_u8(channel.motor_orientation(), direction.value())?;
        self.bus.write_u16_be(channel.motor_speed(), speed)?;

        debug!(
            "{} movement dir: {}, duty cycle: {:.1}%",
            channel, direction, duty_cycle
        );
        Ok(())
    }

    /// Stop a motor
    pub fn stop_motor(&mut self, channel: MotorChannel) -> Result<()> {
        self.bus
            .write_u8(channel.motor_orientation(), Direction::Stop.value())?;
        debug!("{} stop", channel);
        Ok(())
    }

    pub fn enable_encoder(&mut self, channel: MotorChannel) -> Result<()> {
        self.set_encoder(channel, true)
    }

    pub fn disable_encoder(&mut self, channel: MotorChannel) -> Result<()> {
        self.set_encoder(channel, false)
    }

    fn set_encoder(&mut self, channel: MotorChannel, enabled: bool) -> Result<()> {
        self.bus
            .write_u8(channel.encoder_enable(), u8::from(enabled))?;
        debug!(
            "{} encoder {}",
            channel,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// Set the gearbox reduction ratio used by the encoder (1 to 2000)
    pub fn set_reduction_ratio(&mut self, channel: MotorChannel, ratio: u16) -> Result<()> {
        let ratio = check_reduction_ratio(ratio)?;
        self.bus.write_u16_be(channel.encoder_ratio(), ratio)?;
        debug!("{} reduction ratio: {}", channel, ratio);
        Ok(())
    }

    /// Read the signed encoder speed of a channel
    ///
    /// Sign gives the rotation direction. A failed read is an error, never 0.
    pub fn encoder_speed(&mut self, channel: MotorChannel) -> Result<i32> {
        let raw = self.bus.read_u16_be(channel.encoder_speed())?;
        Ok(decode_encoder_speed(raw))
    }

    /// Set the PWM frequency of both channels (100 to 12750 Hz, 50 Hz steps)
    ///
    /// Blocks for `PWM_SETTLE_DELAY` while the board re-locks its PWM timer.
    pub fn set_pwm_frequency(&mut self, frequency: u16) -> Result<()> {
        let value = encode_pwm_frequency(frequency)?;
        self.bus.write_u8(Register::CtrlMode.addr(), value)?;
        debug!("PWM frequency: {} Hz", frequency);
        thread::sleep(PWM_SETTLE_DELAY);
        Ok(())
    }

    /// Store a new board address (1 to 127)
    ///
    /// Takes effect after the board is power-cycled. This controller keeps
    /// talking to the current address.
    pub fn set_address(&mut self, new_address: u8) -> Result<()> {
        let new_address = check_board_address(new_address)?;
        self.bus
            .write_u8(Register::SlaveAddr.addr(), new_address)?;
        info!(
            "Board 0x{:02X} will answer at 0x{:02X} after reboot",
            self.address, new_address
        );
        Ok(())
    }

    /// Stop both motors and release the bus
    pub fn close(self) {
        drop(self);
    }
}

impl<B: RegisterBus> Drop for MotorController<B> {
    fn drop(&mut self) {
        for channel in MotorChannel::ALL {
            if let Err(e) = self.stop_motor(channel) {
                warn!("Failed to stop {} on close: {}", channel, e);
            }
        }
        info!("Released board at 0x{:02X}", self.address);
    }
}
