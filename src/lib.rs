//! Wearable activity monitor.
//!
//! An inference task turns accelerometer windows into a single activity label,
//! correcting the classifier's habit of confusing level walking with stairs,
//! and publishes it to a shared [`state::ActivityState`]. A transmit task
//! reads that state on a shorter period and, while a peer is connected, sends
//! it with a live IMU reading as one JSON line.
//!
//! Everything here is target-independent; the ESP-IDF drivers live in the
//! binary.

pub mod classifier;
pub mod clock;
pub mod confidence;
pub mod config;
pub mod error;
pub mod events;
pub mod link;
pub mod message;
pub mod monitor;
pub mod resolver;
pub mod sampler;
pub mod simulate;
pub mod state;
pub mod tasks;

pub use confidence::{ConfidenceMap, ResolvedActivity};
pub use error::{ClassifierError, Error, LinkError, Result};
pub use events::{Activity, ImuSample, LinkEvent};
pub use resolver::Resolver;
pub use state::ActivityState;
