// actimon — Transmit Task
//
// Every TRANSMIT_INTERVAL_MS: fold in any link events, then, if a peer is
// connected and an activity has been resolved, send the current activity plus
// a live IMU reading. A tick that cannot send is skipped, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, Ticker};
use crate::error::{ClassifierError, Error};
use crate::events::LinkEvent;
use crate::link::{LinkLayer, LinkSession};
use crate::message::{build_message, OutboundMessage};
use crate::sampler::MotionSensor;
use crate::state::ActivityState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No peer connected.
    Idle,
    /// No inference cycle has completed yet.
    NoActivity,
}

#[derive(Debug)]
pub enum TickOutcome {
    Sent(OutboundMessage),
    Skipped(SkipReason),
    /// A message was due but could not be built or delivered.
    Dropped(Error),
}

pub struct TransmitTask<M, L> {
    state: Arc<ActivityState>,
    aux: M,
    link: L,
    events: Receiver<LinkEvent>,
    session: LinkSession,
}

impl<M: MotionSensor, L: LinkLayer> TransmitTask<M, L> {
    pub fn new(state: Arc<ActivityState>, aux: M, link: L, events: Receiver<LinkEvent>) -> Self {
        Self {
            state,
            aux,
            link,
            events,
            session: LinkSession::Idle,
        }
    }

    pub fn session(&self) -> LinkSession {
        self.session
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            let next = self.session.on_event(event);
            if next != self.session {
                log::info!("Link session {:?} -> {:?}", self.session, next);
            }
            self.session = next;
        }
    }

    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        self.drain_events();

        if !self.session.is_connected() {
            return TickOutcome::Skipped(SkipReason::Idle);
        }

        let snapshot = self.state.snapshot();
        if !snapshot.valid {
            return TickOutcome::Skipped(SkipReason::NoActivity);
        }

        let aux = match self.aux.read_sample() {
            Ok(sample) => sample,
            Err(e) => return TickOutcome::Dropped(e.into()),
        };

        let message = build_message(&snapshot.resolved, &aux, now_ms);
        let line = match message.to_json() {
            Ok(line) => line,
            // Resolved confidences are always finite, so this is a bad IMU reading.
            Err(e) => {
                return TickOutcome::Dropped(ClassifierError::Sensor(format!("unserialisable reading: {e}")).into())
            }
        };

        match self.link.send(&line) {
            Ok(()) => TickOutcome::Sent(message),
            Err(e) => TickOutcome::Dropped(e.into()),
        }
    }
}

pub fn transmit_task<M, L, C>(
    mut task: TransmitTask<M, L>,
    clock: C,
    period: Duration,
    shutdown: Arc<AtomicBool>,
) where
    M: MotionSensor,
    L: LinkLayer,
    C: Clock,
{
    log::info!("Transmit task started");

    let mut ticker = Ticker::new(period, clock.now());

    loop {
        ticker.wait(&clock);
        if shutdown.load(Ordering::SeqCst) {
            log::info!("Transmit task stopping");
            return;
        }

        match task.tick(clock.now_ms()) {
            TickOutcome::Sent(message) => {
                log::debug!("Sent {} @ {} ms", message.activity, message.timestamp_ms);
            }
            TickOutcome::Skipped(_) => {}
            TickOutcome::Dropped(e) => {
                log::warn!("Message dropped: {}", e);
            }
        }
    }
}
