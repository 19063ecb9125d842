#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use makcu::serial::{Result, SerialError};
use makcu::{Transport, TransportOpener};

/// One observable action against the mock transport layer, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open { port: String, baud: u32 },
    Write(Vec<u8>),
    Close,
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Behavior of one mock transport. Scripts are consumed one per open
/// call, the first covering the initial connection.
#[derive(Debug, Default, Clone)]
pub struct Script {
    /// Bytes successive reads return; reads past the end return zero.
    pub responses: Vec<Vec<u8>>,
    /// Report this written-byte count for the next write.
    pub short_write: Option<usize>,
    /// Fail every write outright.
    pub fail_writes: bool,
    /// Fail the open call itself.
    pub fail_open: bool,
}

pub struct MockOpener {
    events: EventLog,
    scripts: Arc<Mutex<Vec<Script>>>,
}

impl MockOpener {
    pub fn new(scripts: Vec<Script>) -> (Box<Self>, EventLog) {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let opener = Box::new(Self {
            events: events.clone(),
            scripts: Arc::new(Mutex::new(scripts)),
        });
        (opener, events)
    }
}

impl TransportOpener for MockOpener {
    fn open(&self, port_name: &str, baud_rate: u32) -> Result<Box<dyn Transport>> {
        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.is_empty() {
                Script::default()
            } else {
                scripts.remove(0)
            }
        };

        if script.fail_open {
            return Err(SerialError::OpenFailed {
                port: port_name.to_string(),
                source: serialport::Error::new(serialport::ErrorKind::Unknown, "scripted failure"),
            });
        }

        self.events.lock().unwrap().push(Event::Open {
            port: port_name.to_string(),
            baud: baud_rate,
        });
        Ok(Box::new(MockTransport {
            events: self.events.clone(),
            script,
        }))
    }
}

pub struct MockTransport {
    events: EventLog,
    script: Script,
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.script.fail_writes {
            return Err(SerialError::IoError(io::Error::new(
                io::ErrorKind::Other,
                "scripted write failure",
            )));
        }

        self.events.lock().unwrap().push(Event::Write(data.to_vec()));
        match self.script.short_write.take() {
            Some(written) => Ok(written),
            None => Ok(data.len()),
        }
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if self.script.responses.is_empty() {
            return Ok(0);
        }

        let response = self.script.responses.remove(0);
        let len = response.len().min(buffer.len());
        buffer[..len].copy_from_slice(&response[..len]);
        Ok(len)
    }

    fn close(&mut self) -> Result<()> {
        self.events.lock().unwrap().push(Event::Close);
        Ok(())
    }
}

pub fn snapshot(events: &EventLog) -> Vec<Event> {
    events.lock().unwrap().clone()
}
