// actimon — MPU6050 IMU Driver
//
// Register-level driver on the shared I2C bus. Both the frame sampler and the
// transmit task read through it as a `MotionSensor`.

use esp_idf_hal::i2c::I2cDriver;
use parking_lot::Mutex;

use actimon::config::*;
use actimon::error::ClassifierError;
use actimon::events::ImuSample;
use actimon::sampler::MotionSensor;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 14-byte sensor burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

/// Cheap handle; the inference and transmit tasks each hold one.
#[derive(Clone, Copy)]
pub struct Mpu6050 {
    bus: SharedBus,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let mut bus = self.bus.lock();
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the sensor and configure accel (±8 g), gyro (±500 °/s), DLPF 21 Hz.
    pub fn init(&self) -> anyhow::Result<()> {
        const SETUP: [(u8, u8); 4] = [
            (REG_PWR_MGMT_1, 0x00),   // clear SLEEP
            (REG_CONFIG, 0x04),       // DLPF 21 Hz
            (REG_GYRO_CONFIG, 0x08),  // ±500 °/s
            (REG_ACCEL_CONFIG, 0x10), // ±8 g; frames are clamped to ±2 g later
        ];

        let mut bus = self.bus.lock();
        for (reg, value) in SETUP {
            bus.write(I2C_ADDR_MPU6050, &[reg, value], I2C_TIMEOUT_TICKS)
                .map_err(|e| anyhow::anyhow!("MPU6050 register {reg:#04x}: {e}"))?;
        }

        log::info!("MPU6050 initialised (±8g, ±500°/s, DLPF 21Hz)");
        Ok(())
    }
}

/// Big-endian i16 words of the 14-byte burst: accel x/y/z, temperature, gyro x/y/z.
fn burst_word(raw: &[u8; 14], index: usize) -> f32 {
    i16::from_be_bytes([raw[2 * index], raw[2 * index + 1]]) as f32
}

impl MotionSensor for Mpu6050 {
    /// Burst-read all six axes and convert to g and °/s.
    fn read_sample(&mut self) -> Result<ImuSample, ClassifierError> {
        let mut raw = [0u8; 14];
        self.bus
            .lock()
            .write_read(I2C_ADDR_MPU6050, &[REG_ACCEL_XOUT_H], &mut raw, I2C_TIMEOUT_TICKS)
            .map_err(|e| ClassifierError::Sensor(format!("MPU6050 burst read: {e}")))?;

        Ok(ImuSample {
            ax: burst_word(&raw, 0) / ACCEL_SCALE_8G,
            ay: burst_word(&raw, 1) / ACCEL_SCALE_8G,
            az: burst_word(&raw, 2) / ACCEL_SCALE_8G,
            gx: burst_word(&raw, 4) / GYRO_SCALE_500,
            gy: burst_word(&raw, 5) / GYRO_SCALE_500,
            gz: burst_word(&raw, 6) / GYRO_SCALE_500,
        })
    }
}
