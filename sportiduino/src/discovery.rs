//! Candidate port discovery

use tracing::debug;

/// Lists addresses that may have a master station attached
#[cfg_attr(test, mockall::automock)]
pub trait PortDiscovery: Send + Sync {
    fn candidate_addresses(&self) -> Vec<String>;
}

/// Ports of the running system
///
/// Asks the operating system for serial ports first. When that fails or
/// finds nothing, falls back to scanning `/dev` for USB serial device names
/// on Unix, or probing `COM1` to `COM32` on Windows.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

/// Device name prefixes of USB serial adapters
#[cfg(unix)]
const DEVICE_PREFIXES: &[&str] = &[
    "ttyUSB",
    "ttyACM",
    "cu.usbserial",
    "cu.wchusbserial",
    "cu.SLAB_USBtoUART",
];

#[cfg(windows)]
const MAX_COM_PORT: u32 = 32;

impl PortDiscovery for SystemPorts {
    fn candidate_addresses(&self) -> Vec<String> {
        match sportiduino_transport::serial::available_ports() {
            Ok(ports) if !ports.is_empty() => {
                debug!("System reports {} serial ports", ports.len());
                ports
            }
            Ok(_) => fallback_candidates(),
            Err(e) => {
                debug!("Could not list serial ports: {}", e);
                fallback_candidates()
            }
        }
    }
}

#[cfg(unix)]
fn fallback_candidates() -> Vec<String> {
    let entries = match std::fs::read_dir("/dev") {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Could not read /dev: {}", e);
            return Vec::new();
        }
    };
    
    let mut ports: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| DEVICE_PREFIXES.iter().any(|prefix| name.starts_with(prefix)))
        .map(|name| format!("/dev/{}", name))
        .collect();
    ports.sort();
    ports
}

#[cfg(windows)]
fn fallback_candidates() -> Vec<String> {
    (1..=MAX_COM_PORT).map(|n| format!("COM{}", n)).collect()
}

#[cfg(not(any(unix, windows)))]
fn fallback_candidates() -> Vec<String> {
    Vec::new()
}
