use crate::config::{ConfigurationPacket, ConfigurationRequest, verify_echoed_response};
use crate::error::AMError;
use crate::status::{self, StatusPacket};
use crate::transport::Transport;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Represents a connection to an AudioMoth through some [`Transport`].
///
/// Clones share the transport; the internal lock keeps exactly one request in
/// flight, so a status poll and a configuration write never interleave.
pub struct AudioMoth<T> {
    transport: Arc<Mutex<T>>,
}

impl<T> Clone for AudioMoth<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> AudioMoth<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
        }
    }

    /// Poll the device once. `Ok(None)` means no device is attached.
    pub async fn status(&self) -> Result<Option<StatusPacket>, AMError> {
        let response = {
            let mut transport = self.transport.lock().await;
            transport.request_status().await?
        };

        match response {
            Some(bytes) => {
                debug!(bytes = hex::encode(&bytes), "Status packet");
                status::decode(Some(bytes.as_ref())).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Send an already built packet and verify the echo.
    pub async fn send_packet(&self, packet: &ConfigurationPacket) -> Result<(), AMError> {
        let response = {
            let mut transport = self.transport.lock().await;
            transport.send_configuration(packet).await?
        };

        if let Some(bytes) = &response {
            debug!(bytes = hex::encode(bytes), "Configuration echo");
        }

        match verify_echoed_response(packet, response.as_deref()) {
            Ok(_) => {
                info!("Configuration accepted by device");
                Ok(())
            }
            Err(rejection) => {
                warn!(%rejection, "Configuration rejected");
                Err(rejection.into())
            }
        }
    }

    /// Encode `request`, send it and confirm the device applied it.
    pub async fn configure(&self, request: &ConfigurationRequest) -> Result<ConfigurationPacket, AMError> {
        let packet = request.to_packet()?;
        info!(
            gain = request.gain,
            sample_rate_index = request.sample_rate_index,
            intervals = request.schedule.len(),
            "Sending configuration"
        );
        self.send_packet(&packet).await?;
        Ok(packet)
    }
}
