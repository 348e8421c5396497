pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod life;
pub mod poll;
pub mod profile;
pub mod schedule;
pub mod sim;
pub mod status;
pub mod transport;

#[cfg(feature = "hid")]
pub mod hid;

#[cfg(test)]
mod tests;

// Re-export the session type and the pieces most callers need
pub use config::{ConfigurationPacket, ConfigurationRequest};
pub use device::AudioMoth;
pub use error::AMError;
pub use poll::{DisplayUpdate, PollLoop};
pub use transport::Transport;
