// actimon — System Events & Data Types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Sensor Data (6-axis IMU reading)
// ---------------------------------------------------------------------------

/// One raw IMU reading: acceleration in g, angular rate in °/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImuSample {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

// ---------------------------------------------------------------------------
// Activity Classification
// ---------------------------------------------------------------------------

/// The classifier's fixed label set.
///
/// Declaration order is significant: it is the order in which confidence
/// maps are scanned, so the earlier variant wins an exact tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Walking,
    Jogging,
    Sitting,
    Standing,
    Upstairs,
    Downstairs,
}

impl Activity {
    pub const COUNT: usize = 6;

    pub const ALL: [Activity; Activity::COUNT] = [
        Self::Walking,
        Self::Jogging,
        Self::Sitting,
        Self::Standing,
        Self::Upstairs,
        Self::Downstairs,
    ];

    /// Label used on the wire and by the model.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Walking    => "Walking",
            Self::Jogging    => "Jogging",
            Self::Sitting    => "Sitting",
            Self::Standing   => "Standing",
            Self::Upstairs   => "Upstairs",
            Self::Downstairs => "Downstairs",
        }
    }

    /// Map a model label string to an `Activity`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }

    /// Position in the scan order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// One of the three gait classes the classifier tends to confuse.
    pub fn is_stairs(&self) -> bool {
        matches!(self, Self::Upstairs | Self::Downstairs)
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Activity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| Error::InvalidInput(format!("unknown activity label {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// Link Events — emitted by the link layer, consumed by the transmit task
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A peer opened a session.
    Connected,
    /// The peer went away.
    Disconnected,
}
