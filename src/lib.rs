//! Host-side driver for the MAKCU USB serial mouse/keyboard emulator.
//!
//! The usual flow: [`find`] the device among the enumerated serial
//! adapters, [`Connection::open`] it at the default rate, bump the link
//! with [`Connection::change_baud_rate`], then issue move/click/scroll
//! commands on the connection.
//!
//! ```no_run
//! use std::time::Duration;
//! use makcu::{Connection, MouseButton, DEFAULT_BAUD_RATE};
//!
//! # fn main() -> makcu::device::Result<()> {
//! let port = makcu::find()?;
//! let mut conn = Connection::open(&port, DEFAULT_BAUD_RATE)?;
//! conn.change_baud_rate()?;
//! conn.mouse_move(25, -10)?;
//! conn.click(MouseButton::Left, Duration::ZERO)?;
//! conn.close()?;
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod serial;

pub use device::connection::{Connection, DEFAULT_BAUD_RATE, HIGH_SPEED_BAUD_RATE};
pub use device::discovery::{find, find_with, DeviceDescriptor, DeviceEnumerator};
pub use device::DeviceError;
pub use serial::protocol::{Command, MouseButton};
pub use serial::transport::{Transport, TransportOpener};
pub use serial::SerialError;
