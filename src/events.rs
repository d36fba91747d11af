//! Event delivery.
//!
//! `suggestionsUpdated` is broadcast to any number of subscribers. Delivery
//! is non-blocking: a subscriber whose queue is full simply misses that
//! update rather than stalling recomputation. This is shaped like
//! `tokio::sync::broadcast` but implemented over
//! `std::sync::mpsc::sync_channel` since the engine has no other async I/O
//! and dispatch stays synchronous and single-threaded end to end.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::Mutex;

use crate::suggestion::SuggestionsSnapshot;

/// Per-subscriber queue depth before updates start being dropped.
const SUBSCRIBER_CAPACITY: usize = 8;

pub struct SuggestionSubscriber {
    rx: Receiver<SuggestionsSnapshot>,
}

impl SuggestionSubscriber {
    /// Non-blocking receive of the latest queued snapshot, if any.
    pub fn try_recv(&self) -> Option<SuggestionsSnapshot> {
        self.rx.try_recv().ok()
    }
}

/// Broadcasts `suggestionsUpdated` events to every live subscriber.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<SyncSender<SuggestionsSnapshot>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> SuggestionSubscriber {
        let (tx, rx) = sync_channel(SUBSCRIBER_CAPACITY);
        self.subscribers.lock().unwrap().push(tx);
        SuggestionSubscriber { rx }
    }

    /// Publishes `snapshot` to every subscriber; a full or disconnected
    /// subscriber is dropped from the list rather than blocking the caller.
    pub fn publish(&self, snapshot: &SuggestionsSnapshot) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain_mut(|tx| match tx.try_send(snapshot.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!("suggestionsUpdated subscriber queue full, dropping update");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}
