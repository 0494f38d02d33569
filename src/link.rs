// actimon — Link layer
//
// The transport itself is opaque: it reports sessions opening and closing as
// `LinkEvent`s on a channel and accepts fire-and-forget sends. A failed send
// is the caller's to log; nothing here retries.

use std::io::Write;
use std::sync::mpsc::Sender;

use crate::error::LinkError;
use crate::events::LinkEvent;

pub trait LinkLayer: Send {
    fn send(&mut self, message: &str) -> Result<(), LinkError>;
}

impl<L: LinkLayer + ?Sized> LinkLayer for Box<L> {
    fn send(&mut self, message: &str) -> Result<(), LinkError> {
        (**self).send(message)
    }
}

/// Session state as seen by the transmit task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkSession {
    #[default]
    Idle,
    Connected,
}

impl LinkSession {
    /// Apply one event. Repeated events of the same kind are no-ops.
    pub fn on_event(self, event: LinkEvent) -> Self {
        match (self, event) {
            (_, LinkEvent::Connected) => Self::Connected,
            (_, LinkEvent::Disconnected) => Self::Idle,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Newline-delimited messages on a byte stream (serial console, stdout).
pub struct ConsoleLink<W> {
    out: W,
}

impl<W: Write + Send> ConsoleLink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> LinkLayer for ConsoleLink<W> {
    fn send(&mut self, message: &str) -> Result<(), LinkError> {
        writeln!(self.out, "{message}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Hands messages to an in-process consumer.
pub struct ChannelLink {
    tx: Sender<String>,
}

impl ChannelLink {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl LinkLayer for ChannelLink {
    fn send(&mut self, message: &str) -> Result<(), LinkError> {
        self.tx.send(message.to_owned()).map_err(|_| LinkError::Closed)
    }
}
