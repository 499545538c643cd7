// src/display/events.rs
//! EventGate - the single point where external events reach the surface.
//!
//! Each `handle_events` call feeds the gate everything the backend reported plus
//! whatever other threads posted through an `EventSender`. The gate latches close
//! requests, keeps the most recent resize for the surface to apply, and buffers
//! the remaining input events for the application.

use crate::display::messages::DisplayEvent;
use crate::error::DisplayError;
use log::{debug, trace, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

/// Input events retained for `take_events` before the oldest are discarded.
pub const MAX_PENDING_EVENTS: usize = 256;

/// Cloneable handle for posting events from other threads.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<DisplayEvent>,
}

impl EventSender {
    /// Queues an event for the next `handle_events`.
    pub fn post(&self, event: DisplayEvent) -> Result<(), DisplayError> {
        self.tx
            .send(event)
            .map_err(|_| DisplayError::DeviceNotAvailable("display surface dropped".to_string()))
    }
}

pub struct EventGate {
    close_requested: bool,
    pending_resize: Option<(u32, u32)>,
    inbox: VecDeque<DisplayEvent>,
    tx: Sender<DisplayEvent>,
    rx: Receiver<DisplayEvent>,
}

impl Default for EventGate {
    fn default() -> Self {
        Self::new()
    }
}

impl EventGate {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            close_requested: false,
            pending_resize: None,
            inbox: VecDeque::new(),
            tx,
            rx,
        }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Events posted through senders since the last drain.
    pub fn drain_posted(&mut self) -> Vec<DisplayEvent> {
        let mut posted = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => posted.push(event),
                // The gate holds a sender itself, so the channel never disconnects.
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        posted
    }

    /// Classifies events: close signals latch, resizes coalesce, everything else is buffered.
    pub fn absorb(&mut self, events: impl IntoIterator<Item = DisplayEvent>) {
        for event in events {
            trace!("EventGate: {:?}", event);
            match event {
                DisplayEvent::CloseRequested => {
                    debug!("EventGate: close requested");
                    self.close_requested = true;
                }
                DisplayEvent::Resize {
                    width_px,
                    height_px,
                } => {
                    if width_px == 0 || height_px == 0 {
                        warn!(
                            "EventGate: ignoring resize to {}x{}",
                            width_px, height_px
                        );
                        continue;
                    }
                    self.pending_resize = Some((width_px, height_px));
                }
                DisplayEvent::Key { symbol, .. } if symbol.is_quit() => {
                    debug!("EventGate: quit key {:?}", symbol);
                    self.close_requested = true;
                    self.push_input(event);
                }
                other => self.push_input(other),
            }
        }
    }

    fn push_input(&mut self, event: DisplayEvent) {
        if self.inbox.len() == MAX_PENDING_EVENTS {
            warn!("EventGate: input backlog full, dropping oldest event");
            self.inbox.pop_front();
        }
        self.inbox.push_back(event);
    }

    /// The latched close flag. Querying does not poll.
    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    /// The latest resize since the last call, physical unrotated pixels.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take()
    }

    pub fn take_events(&mut self) -> Vec<DisplayEvent> {
        self.inbox.drain(..).collect()
    }

    /// Forgets all latched state and discards anything posted so far.
    pub fn reset(&mut self) {
        self.close_requested = false;
        self.pending_resize = None;
        self.inbox.clear();
        let stale = self.drain_posted();
        if !stale.is_empty() {
            debug!("EventGate: discarded {} stale posted events", stale.len());
        }
    }
}
