//! Turn sequencer: admits page turns one at a time.

use glam::Vec3;
use std::f32::consts::PI;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::builder::PageContentBuilder;
use crate::config::{Config, TurnRelease};
use crate::events::{BookEvent, EventBus};
use crate::gate::TurnGate;
use crate::models::{ImageRef, Leaf, LeafIndex, PagePair, RotationAnimation, Side, SPINE_AXIS};
use crate::scene::SceneQueue;
use crate::storage::{LeafCollector, PageStore};

/// Direction of a page turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnDirection {
    /// Turns the right page over to the left.
    Forward,
    /// Turns the left page back over to the right.
    Backward,
}

impl TurnDirection {
    /// Rotation axis of a leaf turned this way.
    pub fn axis(&self) -> Vec3 {
        match self {
            TurnDirection::Forward => SPINE_AXIS,
            TurnDirection::Backward => -SPINE_AXIS,
        }
    }
}

/// A classified gesture, as delivered by the gesture front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnIntent {
    Forward,
    Backward,
    None,
}

impl TurnIntent {
    pub fn direction(&self) -> Option<TurnDirection> {
        match self {
            TurnIntent::Forward => Some(TurnDirection::Forward),
            TurnIntent::Backward => Some(TurnDirection::Backward),
            TurnIntent::None => None,
        }
    }
}

/// Who currently holds the turn lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Loading,
    Turning(TurnDirection),
    Collecting,
}

/// How a turn request ended. Only `Turned` changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// `leaf` is rotating and the cursor now points at `cursor`.
    Turned { leaf: LeafIndex, cursor: LeafIndex },
    /// The book is already open at its first or last spread.
    AtEndCap,
    /// The turn lock stayed busy past the timeout.
    TimedOut,
    /// The leaf to turn still carries a running rotation.
    AlreadyTurning(LeafIndex),
    /// The leaf to turn is not in the store.
    MissingLeaf(LeafIndex),
}

impl TurnOutcome {
    pub fn is_turned(&self) -> bool {
        matches!(self, TurnOutcome::Turned { .. })
    }
}

/// Serializes turn requests against the cursor.
#[derive(Clone)]
pub struct TurnSequencer {
    inner: Arc<SequencerInner>,
}

struct SequencerInner {
    config: Arc<Config>,
    pairs: Arc<[PagePair<ImageRef>]>,
    store: Arc<dyn PageStore>,
    builder: PageContentBuilder,
    scene: Arc<SceneQueue>,
    events: EventBus,
    gate: Arc<TurnGate>,
    collector: LeafCollector,
}

impl TurnSequencer {
    pub fn new(
        config: Arc<Config>,
        pairs: Arc<[PagePair<ImageRef>]>,
        store: Arc<dyn PageStore>,
        builder: PageContentBuilder,
        scene: Arc<SceneQueue>,
        events: EventBus,
        gate: Arc<TurnGate>,
    ) -> Self {
        let collector = LeafCollector::new(store.clone(), scene.clone(), events.clone());
        Self {
            inner: Arc::new(SequencerInner {
                config,
                pairs,
                store,
                builder,
                scene,
                events,
                gate,
                collector,
            }),
        }
    }

    pub fn pair_count(&self) -> usize {
        self.inner.pairs.len()
    }

    /// Opens the book at its first spread: leaf 0 on the left, leaf 1 on the right.
    pub async fn load_initial(&self) {
        let inner = &self.inner;
        let mut permit = inner.gate.acquire(SequencerState::Loading).await;
        permit.advance(1);

        self.ensure_leaf(0, Side::Left).await;
        self.ensure_leaf(1, Side::Right).await;
        inner.collector.collect(permit.cursor());

        info!(book = %inner.events.book(), pairs = inner.pairs.len(), "book opened");
    }

    /// Handles one turn request from lock admission to lock release.
    pub async fn turn(&self, direction: TurnDirection) -> TurnOutcome {
        let inner = &self.inner;
        let Some(mut permit) = inner
            .gate
            .acquire_within(inner.config.turn_timeout, SequencerState::Turning(direction))
            .await
        else {
            debug!(?direction, "turn lock busy, dropping turn");
            return TurnOutcome::TimedOut;
        };

        let cursor = permit.cursor();
        let last = inner.pairs.len() - 1;
        let fan = inner.config.fan_angle;

        let (neighbor, turned, target, next) = match direction {
            TurnDirection::Forward => {
                if cursor >= last {
                    debug!(cursor, "at last spread, dropping forward turn");
                    return TurnOutcome::AtEndCap;
                }
                (
                    (cursor + 1, Side::Right),
                    cursor,
                    PI - cursor as f32 * fan,
                    cursor + 1,
                )
            }
            TurnDirection::Backward => {
                if cursor <= 1 {
                    debug!(cursor, "at first spread, dropping backward turn");
                    return TurnOutcome::AtEndCap;
                }
                ((cursor - 2, Side::Left), cursor - 1, cursor as f32 * fan, cursor - 1)
            }
        };

        self.ensure_leaf(neighbor.0, neighbor.1).await;

        let Some(leaf) = inner.store.get(turned) else {
            warn!(leaf = turned, cursor, "leaf to turn is missing, dropping turn");
            return TurnOutcome::MissingLeaf(turned);
        };

        // Subscribe before arming so the landing cannot be missed.
        let mut landing = match inner.config.release {
            TurnRelease::OnFinish => Some(inner.events.subscribe()),
            TurnRelease::OnArm => None,
        };

        let animation = RotationAnimation::new(target, direction.axis(), inner.config.speed);
        if !leaf.arm(animation) {
            debug!(leaf = turned, "leaf is still turning, dropping turn");
            return TurnOutcome::AlreadyTurning(turned);
        }

        permit.advance(next);
        inner.events.publish(BookEvent::TurnStarted {
            leaf: turned,
            direction,
        });
        info!(?direction, leaf = turned, cursor = next, "page turning");

        if let Some(landing) = landing.as_mut() {
            wait_for_landing(landing, turned, &leaf).await;
            inner.collector.collect(permit.cursor());
        }

        TurnOutcome::Turned {
            leaf: turned,
            cursor: next,
        }
    }

    /// Builds the leaf the next turn in `direction` will need.
    ///
    /// Loading runs without the turn lock. The leaf is placed under the lock,
    /// and only if it still borders the cursor; otherwise it is discarded.
    /// Returns the index of the leaf now in the store, or `None` at an end cap
    /// or when the cursor moved away during the load.
    pub async fn prefetch(&self, direction: TurnDirection) -> Option<LeafIndex> {
        let inner = &self.inner;
        let cursor = inner.gate.cursor();
        let last = inner.pairs.len() - 1;
        let index = match direction {
            TurnDirection::Forward if cursor < last => cursor + 1,
            TurnDirection::Backward if cursor > 1 => cursor - 2,
            _ => return None,
        };

        if inner.store.get(index).is_some() {
            return Some(index);
        }
        let leaf = self.build(index).await;

        let permit = inner.gate.acquire(SequencerState::Loading).await;
        let Some(side) = neighbor_side(permit.cursor(), index) else {
            debug!(
                leaf = index,
                cursor = permit.cursor(),
                "cursor moved during prefetch, discarding leaf"
            );
            return None;
        };
        self.place(index, leaf, side);
        Some(index)
    }

    /// Builds and inserts the leaf at `index` unless it already exists.
    /// Callers hold the turn lock. Returns whether this call inserted it.
    async fn ensure_leaf(&self, index: LeafIndex, side: Side) -> bool {
        if self.inner.store.get(index).is_some() {
            return false;
        }

        let leaf = self.build(index).await;
        self.place(index, leaf, side)
    }

    async fn build(&self, index: LeafIndex) -> Arc<Leaf> {
        let inner = &self.inner;
        assert!(
            index < inner.pairs.len(),
            "leaf index {} outside {} page pairs",
            index,
            inner.pairs.len()
        );

        let pair = &inner.pairs[index];
        let leaf = inner
            .builder
            .build_leaf(pair.front.as_ref(), pair.back.as_ref())
            .await;
        Arc::new(leaf)
    }

    /// Rests a built leaf on `side`, inserts it and queues its scene attachment.
    fn place(&self, index: LeafIndex, leaf: Arc<Leaf>, side: Side) -> bool {
        let inner = &self.inner;
        leaf.rest_on(side);
        if !inner.store.try_insert(index, leaf.clone()) {
            debug!(leaf = index, "leaf built concurrently, discarding duplicate");
            return false;
        }

        inner.scene.attach(leaf);
        debug!(leaf = index, ?side, "leaf built");
        true
    }
}

/// The side `index` rests on when the next turn from `cursor` needs it, if any.
fn neighbor_side(cursor: LeafIndex, index: LeafIndex) -> Option<Side> {
    if index == cursor + 1 {
        Some(Side::Right)
    } else if index + 2 == cursor {
        Some(Side::Left)
    } else {
        None
    }
}

/// Waits until the rotation armed on `leaf` has landed.
async fn wait_for_landing(
    events: &mut broadcast::Receiver<BookEvent>,
    index: LeafIndex,
    leaf: &Leaf,
) {
    loop {
        match events.recv().await {
            Ok(BookEvent::TurnFinished { leaf: finished }) if finished == index => return,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "turn fell behind the event bus");
                if !leaf.is_animating() {
                    return;
                }
            }
            Err(RecvError::Closed) => return,
        }
    }
}
