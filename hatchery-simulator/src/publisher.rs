//! Reading publishers.
//!
//! The loop calls `publish` from inside a tick, so implementations must
//! return promptly: anything that could block hands off to another thread or
//! drops the snapshot.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use tracing::{debug, info, warn};

use hatchery_core::reading::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Delivered,
    Dropped,
}

pub trait ReadingPublisher: Send {
    fn publish(&mut self, snapshot: &Snapshot) -> PublishOutcome;
}

/// Hands snapshots to a bounded channel for a transport thread to serialize.
pub struct ChannelPublisher {
    tx: Sender<Snapshot>,
}

impl ChannelPublisher {
    pub fn bounded(capacity: usize) -> (Self, Receiver<Snapshot>) {
        let (tx, rx) = channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl ReadingPublisher for ChannelPublisher {
    fn publish(&mut self, snapshot: &Snapshot) -> PublishOutcome {
        match self.tx.try_send(snapshot.clone()) {
            Ok(()) => PublishOutcome::Delivered,
            Err(TrySendError::Full(_)) => {
                warn!(
                    time_ms = snapshot.simulated_time_ms,
                    "Reading consumer is behind, dropping snapshot"
                );
                PublishOutcome::Dropped
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Reading consumer is gone, dropping snapshot");
                PublishOutcome::Dropped
            }
        }
    }
}

/// Writes readings to the log.
#[derive(Debug, Default)]
pub struct LogPublisher;

impl ReadingPublisher for LogPublisher {
    fn publish(&mut self, snapshot: &Snapshot) -> PublishOutcome {
        info!(
            time_ms = snapshot.simulated_time_ms,
            units = snapshot.readings.len(),
            "Publishing readings"
        );
        for reading in &snapshot.readings {
            debug!(
                unit = reading.unit_id,
                temperature = reading.temperature,
                lamp = reading.lamp_state,
                "reading"
            );
        }
        PublishOutcome::Delivered
    }
}

/// Discards everything; for headless runs that only care about the digest.
#[derive(Debug, Default)]
pub struct NullPublisher;

impl ReadingPublisher for NullPublisher {
    fn publish(&mut self, _snapshot: &Snapshot) -> PublishOutcome {
        PublishOutcome::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(at: i64) -> Snapshot {
        Snapshot {
            simulated_time_ms: at,
            readings: Vec::new(),
        }
    }

    #[test]
    fn channel_delivers_until_full() {
        let (mut publisher, rx) = ChannelPublisher::bounded(1);
        assert_eq!(publisher.publish(&snapshot(1)), PublishOutcome::Delivered);
        assert_eq!(publisher.publish(&snapshot(2)), PublishOutcome::Dropped);
        assert_eq!(rx.try_recv().unwrap().simulated_time_ms, 1);
        assert_eq!(publisher.publish(&snapshot(3)), PublishOutcome::Delivered);
    }

    #[test]
    fn channel_without_consumer_drops() {
        let (mut publisher, rx) = ChannelPublisher::bounded(4);
        drop(rx);
        assert_eq!(publisher.publish(&snapshot(1)), PublishOutcome::Dropped);
    }
}
