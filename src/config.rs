// actimon — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V) + MPU6050, or a host simulation.

use std::time::Duration;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON: i32 = 3;      // D1/A1 — Link toggle button (INPUT_PULLUP, active LOW)
pub const PIN_I2C_SDA: i32 = 6;     // D4    — I2C data line
pub const PIN_I2C_SCL: i32 = 7;     // D5    — I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_INFERENCE: usize = 8192;
pub const STACK_TRANSMIT: usize = 4096;
pub const STACK_INPUT: usize = 4096;
pub const STACK_MONITOR: usize = 4096;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SAMPLE_INTERVAL_MS: u64 = 50;           // 20 Hz, WISDM sampling rate
pub const INFERENCE_INTERVAL_MS: u64 = 5000;      // one classification every 5 s
pub const TRANSMIT_INTERVAL_MS: u64 = 500;        // 2 messages per second while connected
pub const INPUT_POLL_INTERVAL_MS: u64 = 10;       // 100 Hz button poll
pub const DEBOUNCE_MS: u64 = 50;
pub const MONITOR_SUMMARY_INTERVAL_MS: u64 = 30_000;

// ---------------------------------------------------------------------------
// Model geometry
// ---------------------------------------------------------------------------
pub const RAW_SAMPLES_PER_FRAME: usize = 3;   // accX, accY, accZ
pub const FRAME_SAMPLES: usize = 80;          // 4-second window @ 20 Hz
pub const FRAME_LEN: usize = FRAME_SAMPLES * RAW_SAMPLES_PER_FRAME; // 240

// ---------------------------------------------------------------------------
// Frame normalisation
// ---------------------------------------------------------------------------
pub const MAX_ACCEL_G: f32 = 2.0;             // clamp before unit conversion
pub const G_TO_MS2: f32 = 9.80665;

// ---------------------------------------------------------------------------
// Bias correction thresholds (Walking / Upstairs / Downstairs)
// ---------------------------------------------------------------------------
pub const MARGIN_MIN_WALKING: f32 = 0.1;
pub const MARGIN_WINDOW: f32 = 0.15;
pub const NEAR_TIE_SPREAD: f32 = 0.05;
pub const NEAR_TIE_MIN_WALKING: f32 = 0.25;

// ---------------------------------------------------------------------------
// Display client
// ---------------------------------------------------------------------------
pub const MONITOR_HISTORY_LEN: usize = 100;

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_8G: f32 = 4096.0;   // LSB/g  at ±8 g
pub const GYRO_SCALE_500: f32 = 65.5;     // LSB/°/s at ±500 °/s

/// Periods and frame geometry handed to the tasks at spawn time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeConfig {
    pub sample_interval: Duration,
    pub inference_interval: Duration,
    pub transmit_interval: Duration,
    pub frame_samples: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(SAMPLE_INTERVAL_MS),
            inference_interval: Duration::from_millis(INFERENCE_INTERVAL_MS),
            transmit_interval: Duration::from_millis(TRANSMIT_INTERVAL_MS),
            frame_samples: FRAME_SAMPLES,
        }
    }
}

impl RuntimeConfig {
    /// Wall time spent acquiring one frame.
    pub fn acquisition_time(&self) -> Duration {
        self.sample_interval * self.frame_samples as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runtime_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.frame_samples, 80);
        assert_eq!(config.transmit_interval, Duration::from_millis(500));
        assert_eq!(config.acquisition_time(), Duration::from_secs(4));
    }

    #[test]
    fn test_frame_fits_inside_inference_period() {
        let config = RuntimeConfig::default();
        assert!(config.acquisition_time() < config.inference_interval);
    }
}
