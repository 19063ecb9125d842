pub mod protocol;
pub mod transport;

pub use protocol::{Command, MouseButton};
pub use transport::{SerialOpener, SerialTransport, Transport, TransportOpener};

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("Failed to open port {port}: {source}")]
    OpenFailed {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Port is closed")]
    Closed,

    #[error("Short write: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialport error: {0}")]
    SerialportError(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, SerialError>;
