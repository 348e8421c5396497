//! USB HID transport built on `hidapi`.

use crate::config::ConfigurationPacket;
use crate::constants::{HID_REPORT_SIZE, MSG_GET_APP_PACKET, MSG_SET_APP_PACKET};
use crate::error::AMError;
use crate::transport::{Transport, check_response_type};
use bytes::Bytes;
use hidapi::HidApi;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

// Constants for USB device identification
pub const VID: u16 = 0x10C4;
pub const PID: u16 = 0x0002;

// Default timeout for HID operations
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Talks to the first attached AudioMoth. The device is looked up again on
/// every exchange, so unplugging and re-plugging needs no special handling.
pub struct HidTransport {
    api: Arc<Mutex<HidApi>>,
    timeout: Duration,
}

impl HidTransport {
    pub fn new() -> Result<Self, AMError> {
        let api = HidApi::new()?;
        info!("HID context initialised");
        Ok(Self {
            api: Arc::new(Mutex::new(api)),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn exchange(&self, message_type: u8, payload: &[u8]) -> Result<Option<Bytes>, AMError> {
        // Report id 0, then message type, then payload
        let mut report = vec![0u8; HID_REPORT_SIZE + 1];
        report[1] = message_type;
        report[2..2 + payload.len()].copy_from_slice(payload);

        let api = Arc::clone(&self.api);
        let read_timeout_ms = self.timeout.as_millis().min(i32::MAX as u128) as i32;

        let task = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, AMError> {
            let mut api = api
                .lock()
                .map_err(|_| AMError::Transport("HID context lock poisoned".to_string()))?;
            api.refresh_devices()?;

            let Some(info) = api
                .device_list()
                .find(|d| d.vendor_id() == VID && d.product_id() == PID)
            else {
                return Ok(None);
            };
            let device = info.open_device(&api)?;

            debug!(bytes = hex::encode(&report), "HID Write");
            device.write(&report)?;

            let mut buf = vec![0u8; HID_REPORT_SIZE];
            let read = device.read_timeout(&mut buf, read_timeout_ms)?;
            if read == 0 {
                return Err(AMError::Transport("no response within timeout".to_string()));
            }
            buf.truncate(read);
            debug!(bytes = hex::encode(&buf), "HID Read");
            Ok(Some(buf))
        });

        let response = timeout(self.timeout * 2, task).await???;
        if let Some(bytes) = &response {
            check_response_type(message_type, bytes)?;
        }
        Ok(response.map(Bytes::from))
    }
}

impl Transport for HidTransport {
    async fn request_status(&mut self) -> Result<Option<Bytes>, AMError> {
        self.exchange(MSG_GET_APP_PACKET, &[]).await
    }

    async fn send_configuration(&mut self, packet: &ConfigurationPacket) -> Result<Option<Bytes>, AMError> {
        self.exchange(MSG_SET_APP_PACKET, packet.as_bytes()).await
    }
}
