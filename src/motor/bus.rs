// Register-addressed bus transport
//
// The board speaks plain I2C register access:
//   read:  [reg] then N bytes back (repeated start)
//   write: [reg, data...]
// 16-bit values are big-endian on the wire.

use embedded_hal::i2c::{Error as _, I2c};
use tracing::trace;

use super::error::TransportError;

/// A bus handle bound to a single board address
///
/// Dropping the handle closes it.
pub trait RegisterBus {
    fn read_u8(&mut self, register: u8) -> Result<u8, TransportError>;

    fn write_u8(&mut self, register: u8, value: u8) -> Result<(), TransportError>;

    fn read_u16_be(&mut self, register: u8) -> Result<u16, TransportError>;

    fn write_u16_be(&mut self, register: u8, value: u16) -> Result<(), TransportError>;
}

/// Opens bus handles bound to a board address
pub trait BusProvider {
    type Bus: RegisterBus;

    fn open(&mut self, address: u8) -> Result<Self::Bus, TransportError>;
}

/// `RegisterBus` over any embedded-hal I2C master
pub struct I2cRegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cRegisterBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying I2C master
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_into(&mut self, register: u8, buf: &mut [u8]) -> Result<(), TransportError> {
        self.i2c
            .write_read(self.address, &[register], buf)
            .map_err(|e| TransportError::I2c(e.kind()))?;
        trace!("0x{:02X} read reg 0x{:02X}: {:02X?}", self.address, register, buf);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        trace!("0x{:02X} write {:02X?}", self.address, bytes);
        self.i2c
            .write(self.address, bytes)
            .map_err(|e| TransportError::I2c(e.kind()))
    }
}

impl<I2C: I2c> RegisterBus for I2cRegisterBus<I2C> {
    fn read_u8(&mut self, register: u8) -> Result<u8, TransportError> {
        let mut buf = [0u8; 1];
        self.read_into(register, &mut buf)?;
        Ok(buf[0])
    }

    fn write_u8(&mut self, register: u8, value: u8) -> Result<(), TransportError> {
        self.write_bytes(&[register, value])
    }

    fn read_u16_be(&mut self, register: u8) -> Result<u16, TransportError> {
        let mut buf = [0u8; 2];
        self.read_into(register, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_u16_be(&mut self, register: u8, value: u16) -> Result<(), TransportError> {
        let [hi, lo] = value.to_be_bytes();
        self.write_bytes(&[register, hi, lo])
    }
}

#[cfg(target_os = "linux")]
pub use linux::LinuxI2cProvider;

#[cfg(target_os = "linux")]
mod linux {
    use std::path::{Path, PathBuf};

    use linux_embedded_hal::I2cdev;

    use super::{BusProvider, I2cRegisterBus, TransportError};

    /// Opens `/dev/i2c-N` once per board address
    pub struct LinuxI2cProvider {
        path: PathBuf,
    }

    impl LinuxI2cProvider {
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl BusProvider for LinuxI2cProvider {
        type Bus = I2cRegisterBus<I2cdev>;

        fn open(&mut self, address: u8) -> Result<Self::Bus, TransportError> {
            let dev = I2cdev::new(&self.path).map_err(|e| TransportError::Open {
                address,
                reason: format!("{}: {}", self.path.display(), e),
            })?;
            Ok(I2cRegisterBus::new(dev, address))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    /// Scripted I2C master: records writes, answers reads from a fixed buffer
    #[derive(Default)]
    struct ScriptedI2c {
        writes: Vec<(u8, Vec<u8>)>,
        reply: Vec<u8>,
        nack: bool,
    }

    impl ErrorType for ScriptedI2c {
        type Error = ErrorKind;
    }

    impl I2c for ScriptedI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.copy_from_slice(&self.reply[..buf.len()]),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_u8_frame() {
        let mut bus = I2cRegisterBus::new(ScriptedI2c::default(), 0x10);
        bus.write_u8(0x0F, 0x01).unwrap();
        assert_eq!(bus.release().writes, vec![(0x10, vec![0x0F, 0x01])]);
    }

    #[test]
    fn test_write_u16_is_big_endian() {
        let mut bus = I2cRegisterBus::new(ScriptedI2c::default(), 0x10);
        bus.write_u16_be(0x10, 0x3200).unwrap();
        assert_eq!(bus.release().writes, vec![(0x10, vec![0x10, 0x32, 0x00])]);
    }

    #[test]
    fn test_read_u16_is_big_endian() {
        let i2c = ScriptedI2c {
            reply: vec![0xFF, 0x9C],
            ..Default::default()
        };
        let mut bus = I2cRegisterBus::new(i2c, 0x11);
        assert_eq!(bus.read_u16_be(0x05).unwrap(), 0xFF9C);
        // register pointer goes out first
        assert_eq!(bus.release().writes, vec![(0x11, vec![0x05])]);
    }

    #[test]
    fn test_read_u8() {
        let i2c = ScriptedI2c {
            reply: vec![0xDF],
            ..Default::default()
        };
        let mut bus = I2cRegisterBus::new(i2c, 0x10);
        assert_eq!(bus.read_u8(0x01).unwrap(), 0xDF);
    }

    #[test]
    fn test_nack_maps_to_transport_error() {
        let i2c = ScriptedI2c {
            nack: true,
            ..Default::default()
        };
        let mut bus = I2cRegisterBus::new(i2c, 0x42);
        match bus.read_u8(0x01) {
            Err(TransportError::I2c(ErrorKind::NoAcknowledge(_))) => {}
            other => panic!("expected NACK, got {:?}", other),
        }
        assert!(bus.write_u8(0x03, 0).is_err());
    }
}
