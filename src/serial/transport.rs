use std::io::{Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};

use super::{Result, SerialError};

/// Baseline timeout for a whole read or write operation.
pub const OP_TIMEOUT: Duration = Duration::from_millis(500);

/// Extra allowance per requested byte, so large transfers at low baud
/// rates are not cut off by the fixed baseline.
pub const PER_BYTE_TIMEOUT: Duration = Duration::from_millis(10);

fn op_timeout(len: usize) -> Duration {
    OP_TIMEOUT + PER_BYTE_TIMEOUT * len as u32
}

/// Raw byte channel to the device. One live transport per connection;
/// all I/O is blocking and bounded by the configured timeouts.
pub trait Transport: Send {
    /// Write the buffer and return how many bytes the platform accepted.
    /// Callers must treat anything short of the full buffer as a failure.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read up to `buffer.len()` bytes, returning however many arrived
    /// before the timeout elapsed (possibly zero).
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Release the underlying handle. Safe to call on error-unwind paths.
    fn close(&mut self) -> Result<()>;
}

/// Factory for transports, pluggable so the reconnect handshake can be
/// exercised against scripted fakes.
pub trait TransportOpener: Send {
    fn open(&self, port_name: &str, baud_rate: u32) -> Result<Box<dyn Transport>>;
}

/// Transport over a real serial port, configured 8-N-1 with no flow
/// control and binary framing.
pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let port = self.port.as_mut().ok_or(SerialError::Closed)?;

        port.set_timeout(op_timeout(data.len()))?;
        let written = port.write(data)?;
        port.flush()?;

        log::debug!("Wrote {} of {} bytes", written, data.len());
        Ok(written)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let port = self.port.as_mut().ok_or(SerialError::Closed)?;

        port.set_timeout(op_timeout(buffer.len()))?;
        match port.read(buffer) {
            Ok(bytes_read) => Ok(bytes_read),
            // A quiet line is not an error; report zero bytes and let the
            // caller decide what an empty response means.
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(SerialError::IoError(e)),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self.port.take() {
            Some(port) => {
                drop(port);
                Ok(())
            }
            None => Err(SerialError::Closed),
        }
    }
}

/// Default opener backed by the `serialport` crate.
pub struct SerialOpener;

impl TransportOpener for SerialOpener {
    fn open(&self, port_name: &str, baud_rate: u32) -> Result<Box<dyn Transport>> {
        let port = serialport::new(port_name, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(OP_TIMEOUT)
            .open()
            .map_err(|e| SerialError::OpenFailed {
                port: port_name.to_string(),
                source: e,
            })?;

        log::info!("Opened {} at {} baud", port_name, baud_rate);
        Ok(Box::new(SerialTransport { port: Some(port) }))
    }
}
