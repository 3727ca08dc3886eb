use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::info;

use crate::analytics::HourlyCounter;

/// State shared by the producer, the processor and the display.
#[derive(Debug, Default)]
pub struct Controller {
    pub counter: HourlyCounter,
    shutdown: AtomicBool,
    producer_done: AtomicBool,
    processing_done: AtomicBool,
    messages: Mutex<Vec<String>>,
}

impl Controller {
    /// Logs `message` and queues it for the display's log pane.
    pub fn announce(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.messages.lock().push(message);
    }

    pub fn drain_messages(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn mark_producer_done(&self) {
        self.producer_done.store(true, Ordering::SeqCst);
    }

    pub fn producer_done(&self) -> bool {
        self.producer_done.load(Ordering::SeqCst)
    }

    pub fn mark_processing_done(&self) {
        self.processing_done.store(true, Ordering::SeqCst);
    }

    pub fn processing_done(&self) -> bool {
        self.processing_done.load(Ordering::SeqCst)
    }
}
