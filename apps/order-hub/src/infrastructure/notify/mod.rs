//! Notification Hub
//!
//! Fan-out of snapshot refresh notices to live subscribers using a tokio
//! broadcast channel. Every subscriber holds its own receiver, so a slow or
//! dead connection never stalls the sender or its peers; the notice itself
//! carries no data - it is a poke telling clients to re-fetch if they care.

use tokio::sync::broadcast;

/// Default capacity of the notice channel. Notices are content-free, so a
/// lagged subscriber that drops some simply collapses them into one.
const DEFAULT_CAPACITY: usize = 16;

/// Content-free signal that the snapshot changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshNotice;

/// Central hub distributing [`RefreshNotice`]s to all subscribers.
#[derive(Debug)]
pub struct NotificationHub {
    tx: broadcast::Sender<RefreshNotice>,
}

impl NotificationHub {
    /// Create a hub with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity).0,
        }
    }

    /// Create a hub with the default capacity.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Register a new subscriber and get its receiver.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshNotice> {
        self.tx.subscribe()
    }

    /// Send a refresh notice to all subscribers.
    ///
    /// Returns the number of subscribers that received the notice, or
    /// `None` if nobody is currently listening (not an error).
    #[must_use]
    pub fn notify(&self) -> Option<usize> {
        self.tx.send(RefreshNotice).ok()
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::with_defaults()
    }
}
