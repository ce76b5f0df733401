//! Typed events emitted by a render run.
//!
//! The orchestrator never talks to a presentation layer directly. It emits
//! [`RenderEvent`]s through an [`EventDispatcher`]; front ends register an
//! [`EventHandler`] or receive events over a channel with
//! [`ChannelEventHandler`].

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// Human-readable progress note.
    Status { message: String },

    /// Progress of the current unit, whole percent 0 to 100.
    JobProgress { percent: u8 },

    /// Progress of the whole batch, whole percent 0 to 100. Batch runs only.
    BatchProgress { percent: u8 },

    /// Terminal event, emitted exactly once per run.
    Finished { success: bool, message: String },
}

impl RenderEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &RenderEvent);
}

#[derive(Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: RenderEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards every event into an mpsc channel.
///
/// Send failures are ignored: a front end that stopped listening must not
/// stop the render.
pub struct ChannelEventHandler {
    tx: Mutex<Sender<RenderEvent>>,
}

impl ChannelEventHandler {
    pub fn new(tx: Sender<RenderEvent>) -> Self {
        Self { tx: Mutex::new(tx) }
    }
}

impl EventHandler for ChannelEventHandler {
    fn handle(&self, event: &RenderEvent) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<RenderEvent>>);

    impl EventHandler for Recorder {
        fn handle(&self, event: &RenderEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_dispatch_reaches_every_handler() {
        let (tx, rx) = mpsc::channel();
        let recorder = Arc::new(Recorder::default());

        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_handler(recorder.clone());
        dispatcher.add_handler(Arc::new(ChannelEventHandler::new(tx)));

        dispatcher.emit(RenderEvent::status("Rendering set"));
        dispatcher.emit(RenderEvent::JobProgress { percent: 12 });

        assert_eq!(recorder.0.lock().unwrap().len(), 2);
        assert_eq!(rx.try_recv().unwrap(), RenderEvent::status("Rendering set"));
        assert_eq!(
            rx.try_recv().unwrap(),
            RenderEvent::JobProgress { percent: 12 }
        );
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let handler = ChannelEventHandler::new(tx);
        handler.handle(&RenderEvent::Finished {
            success: true,
            message: "done".to_string(),
        });
    }
}
