//! Periodic status polling.
//!
//! The loop waits a fixed interval, asks the device for its status and forwards
//! the outcome to the display side. A missing device or a failed transfer both
//! become [`DisplayUpdate::Disabled`]; polling carries on regardless, since the
//! user may plug the device back in at any time.

use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::device::AudioMoth;
use crate::error::AMError;
use crate::status::StatusPacket;
use crate::transport::Transport;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// What the display should show after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUpdate {
    Status(StatusPacket),
    /// No device, or the device could not be read
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Stopped,
}

pub struct PollLoop<T> {
    device: AudioMoth<T>,
    interval: Duration,
}

impl<T: Transport> PollLoop<T> {
    pub fn new(device: AudioMoth<T>) -> Self {
        Self {
            device,
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start polling on a background task.
    pub fn spawn(self, updates: mpsc::UnboundedSender<DisplayUpdate>) -> PollHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(PollState::Polling);
        let task = tokio::spawn(async move {
            self.run(updates, cancel_rx).await;
            let _ = state_tx.send(PollState::Stopped);
        });
        PollHandle {
            cancel: cancel_tx,
            state: state_rx,
            task,
        }
    }

    /// Poll until `cancel` turns true (or its sender is dropped), the transport
    /// closes, or nobody listens to `updates` any more.
    pub async fn run(self, updates: mpsc::UnboundedSender<DisplayUpdate>, mut cancel: watch::Receiver<bool>) {
        info!(interval_ms = self.interval.as_millis() as u64, "Starting status polling");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = cancelled(&mut cancel) => break,
            }
            if *cancel.borrow() {
                break;
            }

            let (update, terminal) = match self.device.status().await {
                Ok(Some(status)) => (DisplayUpdate::Status(status), false),
                Ok(None) => {
                    debug!("No device attached");
                    (DisplayUpdate::Disabled, false)
                }
                Err(e) => {
                    error!("Failed to read device status: {}", e);
                    (DisplayUpdate::Disabled, e.is_terminal())
                }
            };

            if updates.send(update).is_err() {
                warn!("Display receiver dropped, stopping status polling");
                break;
            }
            if terminal {
                break;
            }
        }

        info!("Status polling stopped");
    }
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    // An error means the sender is gone, which also ends polling.
    let _ = cancel.wait_for(|c| *c).await;
}

/// Control handle for a spawned [`PollLoop`]. Dropping it stops the loop.
pub struct PollHandle {
    cancel: watch::Sender<bool>,
    state: watch::Receiver<PollState>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Suppress all future polls. A request already in flight still completes.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Cancel and wait for the loop to finish.
    pub async fn stop(self) -> Result<(), AMError> {
        self.cancel();
        self.task.await?;
        Ok(())
    }

    /// Wait for the loop to stop on its own.
    pub async fn join(self) -> Result<(), AMError> {
        let PollHandle { cancel, task, .. } = self;
        task.await?;
        drop(cancel);
        Ok(())
    }
}
