// actimon — Outbound message format
//
// One flat JSON object per transmit tick:
//
//   {"act":"Walking","confidence":0.873,"ax":0.012,"ay":-0.981,"az":0.104,
//    "gx":1.5,"gy":-0.3,"gz":0.0,"t":123456}
//
// Key names and number precision are what the display client parses, so the
// fixed-decimal fields are written as raw JSON number tokens rather than left
// to float formatting.

use serde::Serialize;
use serde_json::value::RawValue;

use crate::confidence::ResolvedActivity;
use crate::events::{Activity, ImuSample};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutboundMessage {
    pub activity: Activity,
    pub confidence: f32,
    /// Acceleration in g.
    pub accel: [f32; 3],
    /// Angular rate in °/s.
    pub gyro: [f32; 3],
    /// Milliseconds since boot.
    pub timestamp_ms: u64,
}

#[derive(Serialize)]
struct Wire<'a> {
    act: &'a str,
    confidence: Box<RawValue>,
    ax: Box<RawValue>,
    ay: Box<RawValue>,
    az: Box<RawValue>,
    gx: Box<RawValue>,
    gy: Box<RawValue>,
    gz: Box<RawValue>,
    t: u64,
}

fn fixed(value: f32, decimals: usize) -> serde_json::Result<Box<RawValue>> {
    RawValue::from_string(format!("{value:.decimals$}"))
}

/// Format the current activity plus a live IMU reading.
///
/// The caller must only do this once the activity state is valid.
pub fn build_message(resolved: &ResolvedActivity, aux: &ImuSample, timestamp_ms: u64) -> OutboundMessage {
    OutboundMessage {
        activity: resolved.label,
        confidence: resolved.confidence,
        accel: [aux.ax, aux.ay, aux.az],
        gyro: [aux.gx, aux.gy, aux.gz],
        timestamp_ms,
    }
}

impl OutboundMessage {
    /// Serialise to the wire form. Fails only on a non-finite reading.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let wire = Wire {
            act: self.activity.label(),
            confidence: fixed(self.confidence, 3)?,
            ax: fixed(self.accel[0], 3)?,
            ay: fixed(self.accel[1], 3)?,
            az: fixed(self.accel[2], 3)?,
            gx: fixed(self.gyro[0], 1)?,
            gy: fixed(self.gyro[1], 1)?,
            gz: fixed(self.gyro[2], 1)?,
            t: self.timestamp_ms,
        };
        serde_json::to_string(&wire)
    }
}
