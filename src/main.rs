// actimon — Firmware Entry Point
//
// Boot sequence (device):
//   1. Bring up the shared I2C bus and check the MPU6050 is present.
//   2. Configure the link toggle button.
//   3. Open the serial link session.
//   4. Spawn inference, transmit and input tasks.
//
// On a host the same inference and transmit tasks run against a simulated
// IMU, and a monitor task plays the part of the remote dashboard.
//
// Startup halts only when the sensor cannot be initialised. Every later
// failure is logged and the affected cycle or tick is skipped.

#[cfg(target_os = "espidf")]
mod drivers;
#[cfg(target_os = "espidf")]
mod input;

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use actimon::classifier;
use actimon::clock::{Clock, MonotonicClock};
use actimon::config::*;
use actimon::events::LinkEvent;
use actimon::link::LinkLayer;
use actimon::sampler::{FrameSampler, MotionSensor};
use actimon::state::ActivityState;
use actimon::tasks::inference::{inference_task, InferenceTask};
use actimon::tasks::transmit::{transmit_task, TransmitTask};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
fn main() -> anyhow::Result<()> {
    let config = RuntimeConfig::default();
    let clock = MonotonicClock::new();
    let state = Arc::new(ActivityState::new());
    let shutdown = Arc::new(AtomicBool::new(false));
    let (link_tx, link_rx) = mpsc::channel();

    #[cfg(target_os = "espidf")]
    let (sensor, aux, link) = device::start(link_tx.clone(), Arc::clone(&shutdown))?;

    #[cfg(not(target_os = "espidf"))]
    let (sensor, aux, link) = host::start(clock)?;

    // The session opens at boot; on the device the button toggles it later.
    link_tx.send(LinkEvent::Connected)?;

    spawn_core(sensor, aux, link, link_rx, clock, config, state, shutdown)?;
    log::info!("Boot complete — entering normal operation");

    // Main thread has nothing left to do — park it forever.
    // `link_tx` stays alive here so the transmit task's event channel does too.
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

/// Spawn the inference and transmit tasks around the shared activity state.
#[allow(clippy::too_many_arguments)]
fn spawn_core<M, A, L, C>(
    sensor: M,
    aux: A,
    link: L,
    link_events: Receiver<LinkEvent>,
    clock: C,
    config: RuntimeConfig,
    state: Arc<ActivityState>,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()>
where
    M: MotionSensor + 'static,
    A: MotionSensor + 'static,
    L: LinkLayer + 'static,
    C: Clock,
{
    // Inference task — owns the sampler and the classifier.
    let sampler = FrameSampler::new(sensor, clock.clone(), config.sample_interval);
    let inference = InferenceTask::new(
        sampler,
        classifier::default_classifier(),
        Arc::clone(&state),
        config.frame_samples,
    );
    let inference_clock = clock.clone();
    let inference_shutdown = Arc::clone(&shutdown);
    thread::Builder::new()
        .name("inference".into())
        .stack_size(STACK_INFERENCE)
        .spawn(move || {
            inference_task(inference, inference_clock, config.inference_interval, inference_shutdown);
        })?;

    // Transmit task — sole reader of the activity state.
    let transmit = TransmitTask::new(state, aux, link, link_events);
    thread::Builder::new()
        .name("transmit".into())
        .stack_size(STACK_TRANSMIT)
        .spawn(move || {
            transmit_task(transmit, clock, config.transmit_interval, shutdown);
        })?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Device bring-up (ESP32-C3 + MPU6050)
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
mod device {
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc::Sender;
    use std::sync::Arc;
    use std::thread;

    use anyhow::bail;
    use esp_idf_hal::gpio::{AnyInputPin, IOPin, Input, InputPin, PinDriver};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use parking_lot::Mutex;

    use actimon::config::*;
    use actimon::events::LinkEvent;
    use actimon::link::ConsoleLink;

    use crate::drivers::imu::Mpu6050;
    use crate::input::{input_task, InputManager};

    pub fn start(
        link_tx: Sender<LinkEvent>,
        shutdown: Arc<AtomicBool>,
    ) -> anyhow::Result<(Mpu6050, Mpu6050, ConsoleLink<std::io::Stdout>)> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("actimon firmware starting…");

        // ---- Peripherals --------------------------------------------------
        let peripherals = Peripherals::take()?;

        // ---- I2C bus (SDA = GPIO6, SCL = GPIO7) ----------------------------
        let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio6,
            peripherals.pins.gpio7,
            &i2c_config,
        )?;
        log::info!("I2C up on SDA={} SCL={}", PIN_I2C_SDA, PIN_I2C_SCL);
        // SAFETY: The I2C peripheral is a singleton obtained from `Peripherals::take()`.
        // It will live for the entire programme duration (embedded firmware never exits).
        let i2c_bus: &'static Mutex<I2cDriver<'static>> =
            Box::leak(Box::new(Mutex::new(unsafe { core::mem::transmute(i2c) })));

        // ---- Sensor self-test ---------------------------------------------
        let imu = Mpu6050::new(i2c_bus);
        if !imu.is_connected() {
            bail!("MPU6050 not found at 0x{:02X}", I2C_ADDR_MPU6050);
        }
        imu.init()?;

        // ---- Link toggle button -------------------------------------------
        let button = PinDriver::input(peripherals.pins.gpio3.downgrade_input())?;
        configure_pullup(&button);
        // SAFETY: GPIO peripheral lives forever, same argument as I2C above.
        let button_static: PinDriver<'static, AnyInputPin, Input> =
            unsafe { core::mem::transmute(button) };
        let input = InputManager::new(button_static, link_tx, true);

        thread::Builder::new()
            .name("input".into())
            .stack_size(STACK_INPUT)
            .spawn(move || input_task(input, shutdown))?;

        Ok((imu, imu, ConsoleLink::new(std::io::stdout())))
    }

    /// Configure internal pull-up on a PinDriver.  Separated because the borrow
    /// checker needs a helper for the downgraded pin type.
    fn configure_pullup(_pin: &PinDriver<'_, AnyInputPin, Input>) {
        unsafe {
            esp_idf_sys::gpio_set_pull_mode(
                PIN_BUTTON,
                esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
mod host {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use actimon::clock::MonotonicClock;
    use actimon::config::*;
    use actimon::link::ChannelLink;
    use actimon::simulate::SimulatedImu;
    use actimon::tasks::monitor::monitor_task;

    pub fn start(
        clock: MonotonicClock,
    ) -> anyhow::Result<(SimulatedImu<MonotonicClock>, SimulatedImu<MonotonicClock>, ChannelLink)> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("actimon host simulation starting…");

        let imu = SimulatedImu::demo(clock);

        // Monitor task — stands in for the dashboard on the far end of the link.
        let (msg_tx, msg_rx) = mpsc::channel();
        thread::Builder::new()
            .name("monitor".into())
            .stack_size(STACK_MONITOR)
            .spawn(move || {
                monitor_task(msg_rx, clock, Duration::from_millis(MONITOR_SUMMARY_INTERVAL_MS));
            })?;

        Ok((imu.clone(), imu, ChannelLink::new(msg_tx)))
    }
}
