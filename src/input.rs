// actimon — Link Toggle Button
//
// Debounced button handler. Each click opens or closes the link session,
// reported to the transmit task as a `LinkEvent`. Polled at ~100 Hz from its
// own task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use actimon::config::*;
use actimon::events::LinkEvent;

pub struct InputManager<'d> {
    pin: PinDriver<'d, AnyInputPin, Input>,
    link_tx: Sender<LinkEvent>,

    // Debounce state
    last_raw: bool,
    last_debounce: Instant,

    button_down: bool,
    connected: bool,
}

impl<'d> InputManager<'d> {
    pub fn new(pin: PinDriver<'d, AnyInputPin, Input>, link_tx: Sender<LinkEvent>, connected: bool) -> Self {
        Self {
            pin,
            link_tx,
            last_raw: true, // pull-up → idle HIGH
            last_debounce: Instant::now(),
            button_down: false,
            connected,
        }
    }

    /// Call every ~10 ms. Returns false once the transmit task has gone.
    pub fn update(&mut self) -> bool {
        let current = self.pin.is_high(); // true = released (pull-up)
        let now = Instant::now();

        // ---- debounce filter ----
        if current != self.last_raw {
            self.last_debounce = now;
        }
        self.last_raw = current;

        let stable_ms = now.duration_since(self.last_debounce).as_millis() as u64;
        if stable_ms < DEBOUNCE_MS {
            return true;
        }

        let pressed = !current; // active LOW

        if pressed && !self.button_down {
            self.button_down = true;
        }

        // ---- button released edge → toggle session ----
        if !pressed && self.button_down {
            self.button_down = false;
            self.connected = !self.connected;
            let event = if self.connected {
                LinkEvent::Connected
            } else {
                LinkEvent::Disconnected
            };
            log::info!("Button click — {:?}", event);
            return self.link_tx.send(event).is_ok();
        }

        true
    }
}

pub fn input_task(mut input: InputManager<'static>, shutdown: Arc<AtomicBool>) {
    log::info!("Input task started");

    let poll = Duration::from_millis(INPUT_POLL_INTERVAL_MS);
    while !shutdown.load(Ordering::SeqCst) {
        if !input.update() {
            log::warn!("Link event channel closed — exiting input task");
            return;
        }
        thread::sleep(poll);
    }
}
