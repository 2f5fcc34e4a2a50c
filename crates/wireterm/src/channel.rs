#![forbid(unsafe_code)]

//! The bounded event channel.
//!
//! A FIFO carrying events from the producers (input parser, resize
//! reconciliation, embedder posts) to the single consumer blocked in
//! `poll_event`. Capacity is fixed and small; a non-blocking post on a
//! full queue reports [`ScreenError::EventQueueFull`] and the caller
//! decides whether to retry blocking or drop.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::ScreenError;
use crate::event::Event;

/// Queue capacity; matches the engine's historical bound.
pub(crate) const EVENT_QUEUE_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub(crate) struct EventChannel {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl EventChannel {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx }
    }

    /// Non-blocking enqueue.
    pub(crate) fn post(&self, ev: Event) -> Result<(), ScreenError> {
        self.tx.try_send(ev).map_err(|_| ScreenError::EventQueueFull)
    }

    /// Blocking enqueue.
    pub(crate) fn post_wait(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Block until an event arrives or the quit channel disconnects.
    pub(crate) fn poll(&self, quit: &Receiver<()>) -> Option<Event> {
        crossbeam_channel::select! {
            recv(quit) -> _ => None,
            recv(self.rx) -> ev => ev.ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyCode, KeyEvent};

    fn key(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch)))
    }

    #[test]
    fn fifo_order() {
        let ch = EventChannel::new(EVENT_QUEUE_CAPACITY);
        let (_quit_tx, quit_rx) = bounded::<()>(0);
        ch.post(key('a')).unwrap();
        ch.post(key('b')).unwrap();
        assert_eq!(ch.poll(&quit_rx), Some(key('a')));
        assert_eq!(ch.poll(&quit_rx), Some(key('b')));
    }

    #[test]
    fn overflow_reports_full() {
        let ch = EventChannel::new(2);
        ch.post(key('a')).unwrap();
        ch.post(key('b')).unwrap();
        assert_eq!(ch.post(key('c')), Err(ScreenError::EventQueueFull));
    }

    #[test]
    fn poll_returns_none_on_quit() {
        let ch = EventChannel::new(2);
        let (quit_tx, quit_rx) = bounded::<()>(0);
        drop(quit_tx);
        assert_eq!(ch.poll(&quit_rx), None);
    }
}
