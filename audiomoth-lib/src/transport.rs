use crate::config::ConfigurationPacket;
use crate::error::AMError;
use tracing::warn;
use bytes::Bytes;
use std::future::Future;

/// A channel that can carry one request/response exchange at a time.
///
/// Both operations resolve to `Ok(None)` when no device is attached; that is
/// a normal state, not an error.
pub trait Transport: Send + 'static {
    /// Ask the device for its status packet.
    fn request_status(&mut self) -> impl Future<Output = Result<Option<Bytes>, AMError>> + Send;

    /// Send a configuration packet and return the device's echo.
    fn send_configuration(
        &mut self,
        packet: &ConfigurationPacket,
    ) -> impl Future<Output = Result<Option<Bytes>, AMError>> + Send;
}

/// Reject a response whose first byte does not repeat the request's message
/// type, e.g. a stale configuration echo read while polling for status.
pub fn check_response_type(message_type: u8, response: &[u8]) -> Result<(), AMError> {
    match response.first() {
        Some(&got) if got == message_type => Ok(()),
        got => {
            warn!(expected = message_type, got = ?got, "Unexpected response type");
            Err(AMError::Transport(format!(
                "expected response type {message_type:#04x}, got {}",
                got.map_or_else(|| "nothing".to_string(), |b| format!("{b:#04x}"))
            )))
        }
    }
}
