// actimon — Frame acquisition
//
// Reads one accelerometer window for the classifier: `frame_samples` readings
// paced at a fixed interval, each axis clamped to ±MAX_ACCEL_G and converted
// from g to m/s².

use std::time::Duration;

use crate::clock::Clock;
use crate::config::*;
use crate::error::ClassifierError;
use crate::events::ImuSample;

/// Interleaved x, y, z acceleration in m/s².
pub type Frame = Vec<f32>;

/// A 6-axis IMU that can be polled for one reading at a time.
pub trait MotionSensor: Send {
    fn read_sample(&mut self) -> Result<ImuSample, ClassifierError>;
}

impl<M: MotionSensor + ?Sized> MotionSensor for Box<M> {
    fn read_sample(&mut self) -> Result<ImuSample, ClassifierError> {
        (**self).read_sample()
    }
}

/// Source of classifier-ready frames.
pub trait SampleSource: Send {
    /// Block until `len` samples have been collected.
    fn read_frame(&mut self, len: usize) -> Result<Frame, ClassifierError>;
}

/// Clamp to the accepted range, then convert g to m/s².
pub fn normalise(g: f32) -> f32 {
    g.clamp(-MAX_ACCEL_G, MAX_ACCEL_G) * G_TO_MS2
}

pub struct FrameSampler<M, C> {
    sensor: M,
    clock: C,
    interval: Duration,
}

impl<M: MotionSensor, C: Clock> FrameSampler<M, C> {
    pub fn new(sensor: M, clock: C, interval: Duration) -> Self {
        Self { sensor, clock, interval }
    }
}

impl<M: MotionSensor, C: Clock> SampleSource for FrameSampler<M, C> {
    fn read_frame(&mut self, len: usize) -> Result<Frame, ClassifierError> {
        let mut frame = Vec::with_capacity(len * RAW_SAMPLES_PER_FRAME);
        let mut deadline = self.clock.now();

        for _ in 0..len {
            let data = self.sensor.read_sample()?;
            frame.push(normalise(data.ax));
            frame.push(normalise(data.ay));
            frame.push(normalise(data.az));

            // Sleep for the remainder of the sampling interval.
            deadline += self.interval;
            self.clock.sleep_until(deadline);
        }

        Ok(frame)
    }
}
