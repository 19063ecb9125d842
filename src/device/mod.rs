pub mod connection;
pub mod discovery;

pub use connection::Connection;
pub use discovery::{find, find_with, DeviceDescriptor, DeviceEnumerator, SerialportEnumerator};

use crate::serial::SerialError;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device not found")]
    NotFound,

    #[error("Device enumeration failed: {0}")]
    Enumeration(String),

    #[error("Handshake verification failed, device answered {response:?}")]
    HandshakeVerification { response: String },

    #[error("Command {command:?} failed: {source}")]
    Command {
        command: String,
        #[source]
        source: SerialError,
    },

    #[error("Serial error: {0}")]
    Serial(#[from] SerialError),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
