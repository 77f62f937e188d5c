//! Per-book event bus.

use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

use crate::models::LeafIndex;
use crate::sequencer::TurnDirection;

/// Number of events a slow subscriber may fall behind before it lags.
pub const EVENT_CAPACITY: usize = 64;

/// Something that happened to one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookEvent {
    /// A rotation was armed on `leaf`.
    TurnStarted {
        leaf: LeafIndex,
        direction: TurnDirection,
    },
    /// The rotation on `leaf` reached its target.
    TurnFinished { leaf: LeafIndex },
    /// `leaf` was dropped from the store and detached from the scene.
    LeafEvicted { leaf: LeafIndex },
    /// A cleanup pass completed with `cursor` as the right page.
    CleanupFinished { cursor: LeafIndex },
}

/// Typed publish/subscribe channel owned by a single book.
#[derive(Debug, Clone)]
pub struct EventBus {
    book: Uuid,
    tx: broadcast::Sender<BookEvent>,
}

impl EventBus {
    pub fn new(book: Uuid) -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { book, tx }
    }

    /// Publishes an event. Events with no subscriber are dropped.
    pub fn publish(&self, event: BookEvent) {
        trace!(book = %self.book, ?event, "book event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookEvent> {
        self.tx.subscribe()
    }

    /// The book this bus belongs to.
    pub fn book(&self) -> Uuid {
        self.book
    }
}
