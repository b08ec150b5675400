// Error types for the DC motor board

/// Failure reported by the bus transport for a single transaction
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I2C error: {0:?}")]
    I2c(embedded_hal::i2c::ErrorKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open bus for address 0x{address:02X}: {reason}")]
    Open { address: u8, reason: String },
}

/// Error types for board operations
#[derive(Debug, thiserror::Error)]
pub enum MotorError {
    #[error("Invalid {parameter}: {reason}")]
    Validation {
        parameter: &'static str,
        reason: String,
    },

    #[error("Could not connect to board at 0x{address:02X}: {source}")]
    Connection {
        address: u8,
        #[source]
        source: TransportError,
    },

    #[error("No DC motor board detected at 0x{address:02X}")]
    DeviceNotFound { address: u8 },

    #[error("Bus transaction failed: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, MotorError>;
