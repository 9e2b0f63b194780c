//! Running BLAKE3 hash over published snapshots.
//!
//! Two runs with the same configuration, start time and scenario produce the
//! same digest; anything that changes a published reading changes it.

use blake3::Hasher;
use hatchery_core::reading::Snapshot;

#[derive(Debug, Clone, Default)]
pub struct ReadingDigest {
    hasher: Hasher,
    snapshots: u64,
}

impl ReadingDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, snapshot: &Snapshot) {
        for reading in &snapshot.readings {
            self.hasher.update(&reading.simulated_time_ms.to_le_bytes());
            self.hasher.update(&reading.unit_id.to_le_bytes());
            self.hasher.update(&reading.temperature.to_bits().to_le_bytes());
            self.hasher.update(&[reading.lamp_state]);
        }
        self.snapshots += 1;
    }

    pub fn snapshots(&self) -> u64 {
        self.snapshots
    }

    /// Hex digest of everything recorded so far.
    pub fn hex(&self) -> String {
        hex::encode(self.hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatchery_core::reading::Reading;

    fn snapshot(temperature: f64) -> Snapshot {
        Snapshot {
            simulated_time_ms: 100,
            readings: vec![Reading {
                simulated_time_ms: 100,
                unit_id: 0,
                temperature,
                lamp_state: 0,
            }],
        }
    }

    #[test]
    fn identical_input_identical_digest() {
        let mut a = ReadingDigest::new();
        let mut b = ReadingDigest::new();
        a.record(&snapshot(25.0));
        b.record(&snapshot(25.0));
        assert_eq!(a.hex(), b.hex());
        assert_eq!(a.snapshots(), 1);
    }

    #[test]
    fn temperature_change_alters_digest() {
        let mut a = ReadingDigest::new();
        let mut b = ReadingDigest::new();
        a.record(&snapshot(25.0));
        b.record(&snapshot(25.000_000_1));
        assert_ne!(a.hex(), b.hex());
    }
}
