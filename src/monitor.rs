// actimon — Display-client side decoder
//
// Parses the lines a peer receives and keeps a short rolling history for a
// dashboard: latest activity, recent readings and time spent per activity.

use std::collections::VecDeque;

use serde::Deserialize;

use crate::config::MONITOR_HISTORY_LEN;
use crate::events::Activity;

/// One decoded message. Only `act`, the accelerometer axes and `t` are
/// required; older firmware did not send confidence or gyro rates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reading {
    pub act: Activity,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    #[serde(default)]
    pub gx: f64,
    #[serde(default)]
    pub gy: f64,
    #[serde(default)]
    pub gz: f64,
    pub t: u64,
}

impl Reading {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }
}

#[derive(Debug, Clone)]
pub struct ActivityMonitor {
    history: VecDeque<Reading>,
    capacity: usize,
    rejected: u64,
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::with_capacity(MONITOR_HISTORY_LEN)
    }
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            rejected: 0,
        }
    }

    /// Decode and record one received line. Malformed lines are counted and
    /// otherwise ignored.
    pub fn ingest(&mut self, line: &str) -> Option<&Reading> {
        match Reading::parse(line) {
            Ok(reading) => {
                self.push(reading);
                self.history.back()
            }
            Err(e) => {
                log::warn!("Data processing error: {}", e);
                self.rejected += 1;
                None
            }
        }
    }

    pub fn push(&mut self, reading: Reading) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(reading);
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.history.back()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Up to `n` most recent readings, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Reading> {
        self.history.iter().skip(self.history.len().saturating_sub(n))
    }

    /// Readings per activity over the retained history, in label order,
    /// omitting activities that never appeared.
    pub fn distribution(&self) -> Vec<(Activity, usize)> {
        let mut counts = [0usize; Activity::COUNT];
        for reading in &self.history {
            counts[reading.act.index()] += 1;
        }
        Activity::ALL
            .iter()
            .zip(counts)
            .filter(|(_, n)| *n > 0)
            .map(|(&a, n)| (a, n))
            .collect()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
