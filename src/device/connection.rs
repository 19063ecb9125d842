use std::thread;
use std::time::Duration;

use crate::serial::protocol::{encode, Command, MouseButton};
use crate::serial::transport::{SerialOpener, Transport, TransportOpener};
use crate::serial::SerialError;

use super::{DeviceError, Result};

/// Rate the device boots at.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Rate the device runs at after the rate-change handshake. Reverts to
/// the default on power cycle.
pub const HIGH_SPEED_BAUD_RATE: u32 = 4_000_000;

/// Opaque firmware command: switch the internal baud rate to 4,000,000.
const BAUD_CHANGE_SEQUENCE: [u8; 9] = [0xDE, 0xAD, 0x05, 0x00, 0xA5, 0x00, 0x09, 0x3D, 0x00];

const VERSION_QUERY: &str = "km.version()\r";

/// Substring the device must answer the version query with. Guards
/// against binding to some other adapter on the same port.
const IDENTITY_MARKER: &str = "MAKCU";

/// The device is not ready to respond until this long after a reopen.
/// Hardware timing, not tunable.
const SETTLE_DELAY: Duration = Duration::from_secs(1);

const VERSION_RESPONSE_CAPACITY: usize = 32;

/// Live link to one MAKCU device. Owns the transport handle and the
/// negotiated baud rate; command methods encode intents and push them
/// through the transport. One logical owner at a time, no internal
/// locking.
pub struct Connection {
    port_name: String,
    baud_rate: u32,
    transport: Option<Box<dyn Transport>>,
    opener: Box<dyn TransportOpener>,
}

impl Connection {
    /// Open the named port at the given baud rate.
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with(Box::new(SerialOpener), port_name, baud_rate)
    }

    /// Open through a caller-supplied transport factory. The factory is
    /// kept for the lifetime of the connection so the rate-change
    /// handshake can rebuild the transport through it.
    pub fn open_with(
        opener: Box<dyn TransportOpener>,
        port_name: &str,
        baud_rate: u32,
    ) -> Result<Self> {
        let transport = opener.open(port_name, baud_rate)?;
        log::info!("Connected to MAKCU on {} at {} baud", port_name, baud_rate);

        Ok(Self {
            port_name: port_name.to_string(),
            baud_rate,
            transport: Some(transport),
            opener,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Release the transport handle. Calling close on an already-closed
    /// connection reports an error but leaves the state untouched.
    pub fn close(&mut self) -> Result<()> {
        match self.transport.take() {
            Some(mut transport) => {
                log::info!("Closing {}", self.port_name);
                transport.close()?;
                Ok(())
            }
            None => Err(SerialError::Closed.into()),
        }
    }

    /// Renegotiate the link at the high-speed rate.
    ///
    /// Writes the rate-change sequence at the current rate, tears the
    /// transport down, reopens the same port at 4,000,000 baud and
    /// verifies the device's identity through a version query. On any
    /// failure the open handle is closed before the error surfaces;
    /// retry policy belongs to the caller.
    pub fn change_baud_rate(&mut self) -> Result<()> {
        let mut old = self.transport.take().ok_or(SerialError::Closed)?;

        let written = match old.write(&BAUD_CHANGE_SEQUENCE) {
            Ok(n) => n,
            Err(e) => {
                let _ = old.close();
                return Err(e.into());
            }
        };
        if written != BAUD_CHANGE_SEQUENCE.len() {
            // A truncated rate-change command may have desynchronized the
            // firmware; do not reopen at the new rate on top of it.
            let _ = old.close();
            return Err(SerialError::ShortWrite {
                written,
                expected: BAUD_CHANGE_SEQUENCE.len(),
            }
            .into());
        }

        // The old handle is being replaced either way; a failed close
        // must not abort the reconnection.
        if let Err(e) = old.close() {
            log::warn!(
                "Failed to close {} at {} baud: {}",
                self.port_name,
                self.baud_rate,
                e
            );
        }

        let mut new = self.opener.open(&self.port_name, HIGH_SPEED_BAUD_RATE)?;
        thread::sleep(SETTLE_DELAY);

        if let Err(e) = new.write(VERSION_QUERY.as_bytes()) {
            let _ = new.close();
            return Err(e.into());
        }

        let mut buffer = [0u8; VERSION_RESPONSE_CAPACITY];
        let bytes_read = match new.read(&mut buffer) {
            Ok(n) => n,
            Err(e) => {
                let _ = new.close();
                return Err(e.into());
            }
        };

        let response = String::from_utf8_lossy(&buffer[..bytes_read]).to_string();
        if !response.contains(IDENTITY_MARKER) {
            let _ = new.close();
            log::error!("Identity check failed, device answered {:?}", response);
            return Err(DeviceError::HandshakeVerification { response });
        }

        thread::sleep(SETTLE_DELAY);

        self.transport = Some(new);
        self.baud_rate = HIGH_SPEED_BAUD_RATE;
        log::info!(
            "Changed baud rate on {} to {}",
            self.port_name,
            HIGH_SPEED_BAUD_RATE
        );
        Ok(())
    }

    /// Query the firmware version string.
    pub fn version(&mut self) -> Result<String> {
        let transport = self.transport.as_mut().ok_or(SerialError::Closed)?;
        transport.write(VERSION_QUERY.as_bytes())?;

        let mut buffer = [0u8; VERSION_RESPONSE_CAPACITY];
        let bytes_read = transport.read(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer[..bytes_read])
            .trim()
            .to_string())
    }

    /// Relative move without curve shaping.
    pub fn mouse_move(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.send(&Command::mouse_move(dx, dy))
    }

    /// Relative move with the firmware's optional curve parameters: one
    /// smoothness value or three curve-fitting values. Any other count
    /// is rejected before anything touches the wire.
    pub fn mouse_move_curve(&mut self, dx: i32, dy: i32, curve: &[i32]) -> Result<()> {
        self.send(&Command::Move {
            dx,
            dy,
            curve: curve.to_vec(),
        })
    }

    pub fn button_down(&mut self, button: MouseButton) -> Result<()> {
        self.send(&Command::ButtonDown(button))
    }

    pub fn button_up(&mut self, button: MouseButton) -> Result<()> {
        self.send(&Command::ButtonUp(button))
    }

    /// Press and release, with an optional hold delay in between. A zero
    /// delay releases immediately.
    pub fn click(&mut self, button: MouseButton, hold: Duration) -> Result<()> {
        self.button_down(button)?;
        if !hold.is_zero() {
            thread::sleep(hold);
        }
        self.button_up(button)
    }

    /// Wheel step; the sign convention is the firmware's, passed through
    /// unchanged.
    pub fn scroll(&mut self, amount: i32) -> Result<()> {
        self.send(&Command::Wheel(amount))
    }

    fn send(&mut self, command: &Command) -> Result<()> {
        let line = encode(command)?;
        let transport = self.transport.as_mut().ok_or(SerialError::Closed)?;

        log::debug!("Sending {:?}", line.trim_end());
        let written = transport
            .write(line.as_bytes())
            .map_err(|source| DeviceError::Command {
                command: line.trim_end().to_string(),
                source,
            })?;

        if written != line.len() {
            return Err(DeviceError::Command {
                command: line.trim_end().to_string(),
                source: SerialError::ShortWrite {
                    written,
                    expected: line.len(),
                },
            });
        }

        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            let _ = transport.close();
        }
    }
}
