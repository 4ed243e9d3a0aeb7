// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The in-process bus that events are announced on.
//!
//! A [`Stage`] is the sending half: it is cheap to clone and never blocks. [`StageEvents`] is the
//! receiving half, typically drained back into an
//! [`EventDispatcher`](crate::reporter::EventDispatcher).

use junit_crew_events::DomainEvent;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError, unbounded_channel};
use tracing::debug;

/// Creates a new bus, returning its sending and receiving halves.
pub fn stage() -> (Stage, StageEvents) {
    let (sender, receiver) = unbounded_channel();
    (Stage { sender }, StageEvents { receiver })
}

/// The sending half of the bus.
#[derive(Clone, Debug)]
pub struct Stage {
    sender: UnboundedSender<DomainEvent>,
}

impl Stage {
    /// Announces an event.
    ///
    /// Announcing never fails: if nobody is listening any more, the event is dropped.
    pub fn announce(&self, event: DomainEvent) {
        if let Err(error) = self.sender.send(event) {
            debug!(
                "stage closed, dropping {} announcement",
                error.0.type_name()
            );
        }
    }
}

/// The receiving half of the bus.
#[derive(Debug)]
pub struct StageEvents {
    receiver: UnboundedReceiver<DomainEvent>,
}

impl StageEvents {
    /// Waits for the next event.
    ///
    /// Returns `None` once every [`Stage`] has been dropped and all events have been received.
    pub async fn recv(&mut self) -> Option<DomainEvent> {
        self.receiver.recv().await
    }

    /// Returns the next event if one is immediately available.
    pub fn try_recv(&mut self) -> Option<DomainEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Returns all events that are immediately available.
    pub fn drain_ready(&mut self) -> Vec<DomainEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
