//! Garbage collection for off-screen leaves.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use super::PageStore;
use crate::events::{BookEvent, EventBus};
use crate::gate::TurnGate;
use crate::models::LeafIndex;
use crate::scene::SceneQueue;
use crate::sequencer::SequencerState;

/// Evicts every leaf that is not part of the visible spread.
#[derive(Clone)]
pub struct LeafCollector {
    store: Arc<dyn PageStore>,
    scene: Arc<SceneQueue>,
    events: EventBus,
}

impl LeafCollector {
    pub fn new(store: Arc<dyn PageStore>, scene: Arc<SceneQueue>, events: EventBus) -> Self {
        Self {
            store,
            scene,
            events,
        }
    }

    /// Performs a single collection pass around `cursor`.
    ///
    /// Leaves still rotating are skipped; their own landing triggers another pass.
    pub fn collect(&self, cursor: LeafIndex) -> Vec<LeafIndex> {
        let mut evicted = Vec::new();

        for (index, leaf) in self.store.snapshot() {
            if index == cursor || index + 1 == cursor {
                continue;
            }
            if leaf.is_animating() {
                debug!(leaf = index, "leaf still turning, keeping it for now");
                continue;
            }
            if let Some(leaf) = self.store.remove(index) {
                self.scene.detach(leaf.id());
                self.events.publish(BookEvent::LeafEvicted { leaf: index });
                evicted.push(index);
            }
        }

        if !evicted.is_empty() {
            debug!(cursor, ?evicted, "collected off-screen leaves");
        }
        self.events.publish(BookEvent::CleanupFinished { cursor });
        evicted
    }
}

/// Runs a collection pass every time a turn lands.
pub struct CleanupReactor {
    collector: LeafCollector,
    gate: Arc<TurnGate>,
}

impl CleanupReactor {
    pub fn new(collector: LeafCollector, gate: Arc<TurnGate>) -> Self {
        Self { collector, gate }
    }

    /// Starts the reaction loop. Ends when the event bus closes.
    pub async fn run(self, mut events: broadcast::Receiver<BookEvent>) {
        loop {
            match events.recv().await {
                Ok(BookEvent::TurnFinished { leaf }) => {
                    debug!(leaf, "turn landed, collecting");
                    self.collect().await;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "cleanup fell behind the event bus, collecting");
                    self.collect().await;
                }
                Err(RecvError::Closed) => {
                    info!("event bus closed, cleanup stopped");
                    return;
                }
            }
        }
    }

    /// Collects under the turn lock so the cursor cannot move mid-pass.
    pub async fn collect(&self) -> Vec<LeafIndex> {
        let permit = self.gate.acquire(SequencerState::Collecting).await;
        self.collector.collect(permit.cursor())
    }
}
