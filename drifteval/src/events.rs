use crate::driving::Interval;

use serde::{Deserialize, Serialize};

/// parked phase as reported by the vehicle, `[start, end]` in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ParkedEvent {
    pub timestamp: [f64; 2],
}

/// reference states used for scoring
///
/// Other event kinds in the source data are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Events {
    #[serde(default)]
    pub driving_state: Vec<Interval>,
    #[serde(default)]
    pub parked_state: Vec<ParkedEvent>,
}

impl Events {
    /// append the events of a later period
    pub fn extend(&mut self, other: Events) {
        self.driving_state.extend(other.driving_state);
        self.parked_state.extend(other.parked_state);
    }

    pub fn driving_intervals(&self) -> &[Interval] {
        &self.driving_state
    }

    pub fn parked_intervals(&self) -> Vec<Interval> {
        self.parked_state
            .iter()
            .map(|p| Interval::new(p.timestamp[0], p.timestamp[1]))
            .collect()
    }
}

/// layout of a stored daily event file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventFile {
    pub imu_telematics: Events,
}
