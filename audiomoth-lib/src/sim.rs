//! In-memory stand-in for a device, used by `--simulate` and by tests.

use crate::config::ConfigurationPacket;
use crate::constants::{HID_REPORT_SIZE, MSG_GET_APP_PACKET, MSG_SET_APP_PACKET};
use crate::error::AMError;
use crate::status::StatusPacketRaw;
use crate::transport::Transport;
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use zerocopy::IntoBytes;
use zerocopy::byteorder::little_endian::{U32, U64};

#[derive(Debug)]
struct SimState {
    device_id: u64,
    battery: u8,
    clock_offset: TimeDelta,
    connected: bool,
    closed: bool,
    fail_next: bool,
    corrupt_echo: Option<usize>,
    last_configuration: Option<ConfigurationPacket>,
    status_requests: usize,
}

/// A simulated recorder. Clones share state, so a test can keep one clone to
/// unplug the device while another is owned by the session.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedDevice {
    pub fn new(device_id: u64, battery: u8) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                device_id,
                battery,
                clock_offset: TimeDelta::zero(),
                connected: true,
                closed: false,
                fail_next: false,
                corrupt_echo: None,
                last_configuration: None,
                status_requests: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        // State is plain data; a panic elsewhere cannot leave it half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn unplug(&self) {
        self.state().connected = false;
    }

    pub fn plug_in(&self) {
        self.state().connected = true;
    }

    /// Make every later request fail with [`AMError::TransportClosed`].
    pub fn close(&self) {
        self.state().closed = true;
    }

    /// Make the next request fail with a recoverable transport error.
    pub fn fail_next(&self) {
        self.state().fail_next = true;
    }

    /// Flip the echoed byte at `offset` (packet offset, not response offset).
    pub fn corrupt_echo_at(&self, offset: usize) {
        self.state().corrupt_echo = Some(offset);
    }

    pub fn set_battery(&self, battery: u8) {
        self.state().battery = battery;
    }

    pub fn last_configuration(&self) -> Option<ConfigurationPacket> {
        self.state().last_configuration
    }

    pub fn status_requests(&self) -> usize {
        self.state().status_requests
    }

    pub fn device_time(&self) -> DateTime<Utc> {
        Utc::now() + self.state().clock_offset
    }

    fn check_link(state: &mut SimState) -> Result<bool, AMError> {
        if state.closed {
            return Err(AMError::TransportClosed);
        }
        if state.fail_next {
            state.fail_next = false;
            return Err(AMError::Transport("simulated transfer failure".to_string()));
        }
        Ok(state.connected)
    }

    fn report(mut buf: BytesMut) -> Bytes {
        buf.resize(HID_REPORT_SIZE, 0);
        buf.freeze()
    }
}

impl Transport for SimulatedDevice {
    async fn request_status(&mut self) -> Result<Option<Bytes>, AMError> {
        let mut state = self.state();
        state.status_requests += 1;
        if !Self::check_link(&mut state)? {
            return Ok(None);
        }

        let now = Utc::now() + state.clock_offset;
        let raw = StatusPacketRaw {
            status: MSG_GET_APP_PACKET,
            time: U32::new(now.timestamp().clamp(0, u32::MAX.into()) as u32),
            device_id: U64::new(state.device_id),
            battery: state.battery,
        };
        let mut buf = BytesMut::with_capacity(HID_REPORT_SIZE);
        buf.put_slice(raw.as_bytes());
        Ok(Some(Self::report(buf)))
    }

    async fn send_configuration(&mut self, packet: &ConfigurationPacket) -> Result<Option<Bytes>, AMError> {
        let mut state = self.state();
        if !Self::check_link(&mut state)? {
            return Ok(None);
        }

        let time = packet.header().time.get();
        if let Some(device_time) = DateTime::from_timestamp(time.into(), 0) {
            state.clock_offset = device_time - Utc::now();
        }
        state.last_configuration = Some(*packet);
        debug!(bytes = hex::encode(packet), "Simulated device stored configuration");

        let mut buf = BytesMut::with_capacity(HID_REPORT_SIZE);
        buf.put_u8(MSG_SET_APP_PACKET);
        buf.put_slice(packet.as_bytes());
        if let Some(offset) = state.corrupt_echo {
            if let Some(byte) = buf.get_mut(offset + 1) {
                *byte ^= 0xFF;
            }
        }
        Ok(Some(Self::report(buf)))
    }
}
