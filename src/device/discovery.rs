use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serialport::SerialPortType;

use super::{DeviceError, Result};

// The MAKCU enumerates behind a WCH CH343 USB-serial bridge.
pub const VENDOR_NAME: &str = "USB-Enhanced-SERIAL CH343";
pub const VENDOR_HWID: &str = "VID_1A86&PID_55D3";

static PORT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"COM\d+").expect("valid pattern"));

/// Snapshot of one enumerated serial device. Produced during a scan and
/// discarded once a port has been picked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub friendly_name: String,
    pub hardware_id: String,
    pub description: String,
    /// Canonical port name, when the enumeration backend already knows it.
    pub port_name: Option<String>,
}

/// Platform capability the discovery filter runs against. Kept behind a
/// trait so the filter logic is unit-testable with fake device lists.
pub trait DeviceEnumerator {
    /// List every serial-capable device currently attached.
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>>;

    /// Resolve a device's canonical port name from the platform's
    /// registry/property store.
    fn resolve_port_name(&self, descriptor: &DeviceDescriptor) -> Result<String>;
}

/// Default enumerator backed by `serialport::available_ports()`.
pub struct SerialportEnumerator;

impl DeviceEnumerator for SerialportEnumerator {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>> {
        let ports =
            serialport::available_ports().map_err(|e| DeviceError::Enumeration(e.to_string()))?;

        let mut descriptors = Vec::new();
        for port in ports {
            if let SerialPortType::UsbPort(usb_info) = port.port_type {
                descriptors.push(DeviceDescriptor {
                    friendly_name: usb_info.product.unwrap_or_default(),
                    hardware_id: format!("USB\\VID_{:04X}&PID_{:04X}", usb_info.vid, usb_info.pid),
                    description: usb_info.manufacturer.unwrap_or_default(),
                    port_name: Some(port.port_name),
                });
            }
        }

        Ok(descriptors)
    }

    fn resolve_port_name(&self, descriptor: &DeviceDescriptor) -> Result<String> {
        descriptor.port_name.clone().ok_or(DeviceError::NotFound)
    }
}

/// Locate the MAKCU and return its port identifier.
pub fn find() -> Result<String> {
    find_with(&SerialportEnumerator)
}

/// Discovery filter over an arbitrary enumerator. First match wins; the
/// port embedded in the friendly name takes precedence over the
/// platform-resolved one.
pub fn find_with(enumerator: &dyn DeviceEnumerator) -> Result<String> {
    for descriptor in enumerator.enumerate()? {
        if descriptor.friendly_name.is_empty()
            || descriptor.hardware_id.is_empty()
            || descriptor.description.is_empty()
        {
            continue;
        }

        if !descriptor.friendly_name.contains(VENDOR_NAME)
            && !descriptor.hardware_id.contains(VENDOR_HWID)
        {
            continue;
        }

        log::debug!(
            "Candidate device: {} [{}] {}",
            descriptor.friendly_name,
            descriptor.hardware_id,
            descriptor.description
        );

        if let Some(port) = embedded_port_token(&descriptor.friendly_name) {
            log::info!("Found MAKCU on {} (from friendly name)", port);
            return Ok(port);
        }

        let port = enumerator.resolve_port_name(&descriptor)?;
        if port.is_empty() {
            return Err(DeviceError::NotFound);
        }
        log::info!("Found MAKCU on {} (from port-name resolution)", port);
        return Ok(port);
    }

    log::warn!("No MAKCU device among enumerated serial adapters");
    Err(DeviceError::NotFound)
}

/// Extract a `COM<digits>` token from a friendly name. Some platforms
/// embed the port in parentheses, e.g. `USB-Enhanced-SERIAL CH343 (COM7)`,
/// so parentheses are stripped before matching.
fn embedded_port_token(friendly_name: &str) -> Option<String> {
    let stripped: String = friendly_name
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect();
    PORT_TOKEN
        .find(&stripped)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_extracted_from_parenthesised_name() {
        assert_eq!(
            embedded_port_token("USB-Enhanced-SERIAL CH343 (COM7)"),
            Some("COM7".to_string())
        );
    }

    #[test]
    fn token_extracted_from_bare_name() {
        assert_eq!(
            embedded_port_token("USB-Enhanced-SERIAL CH343 COM12"),
            Some("COM12".to_string())
        );
    }

    #[test]
    fn no_token_in_plain_name() {
        assert_eq!(embedded_port_token("USB-Enhanced-SERIAL CH343"), None);
    }
}
