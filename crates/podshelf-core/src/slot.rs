//! Last-request-wins bookkeeping for async fetches.
//!
//! Each logical resource (catalog, show detail, genre titles) owns a
//! [`RequestSlot`]. Starting a request bumps the slot's generation and hands
//! out a [`Ticket`]; a result is applied only while its ticket is current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    key: String,
}

impl Ticket {
    /// What the request was for, e.g. the show id.
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestSlot {
    generation: Arc<AtomicU64>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier ticket.
    pub fn begin(&self, key: impl Into<String>) -> Ticket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation,
            key: key.into(),
        }
    }

    pub fn accepts(&self, ticket: &Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Invalidate any in-flight request without starting a new one.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
