//! Scene graph attachment.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

use crate::models::Leaf;

/// Trait for the renderer's scene graph.
///
/// Calls are cheap graph mutations and are only made from the update loop.
pub trait Scene: Send + Sync {
    /// Attaches a leaf under `parent`. The scene must not keep the leaf alive.
    fn attach(&self, leaf: &Arc<Leaf>, parent: Uuid);

    /// Detaches a leaf. Unknown ids are ignored.
    fn detach(&self, leaf: Uuid);
}

/// A non-owning attachment record.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub parent: Uuid,
    pub leaf: Weak<Leaf>,
}

/// In-memory scene graph, useful for headless hosts and tests.
pub struct MemoryScene {
    attachments: DashMap<Uuid, Attachment>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self {
            attachments: DashMap::new(),
        }
    }

    pub fn is_attached(&self, leaf: Uuid) -> bool {
        self.attachments.contains_key(&leaf)
    }

    /// Ids of the leaves attached under `parent`.
    pub fn children_of(&self, parent: Uuid) -> Vec<Uuid> {
        self.attachments
            .iter()
            .filter(|entry| entry.value().parent == parent)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Attached leaves that are still alive.
    pub fn live_leaves(&self) -> Vec<Arc<Leaf>> {
        self.attachments
            .iter()
            .filter_map(|entry| entry.value().leaf.upgrade())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for MemoryScene {
    fn attach(&self, leaf: &Arc<Leaf>, parent: Uuid) {
        self.attachments.insert(
            leaf.id(),
            Attachment {
                parent,
                leaf: Arc::downgrade(leaf),
            },
        );
    }

    fn detach(&self, leaf: Uuid) {
        self.attachments.remove(&leaf);
    }
}

/// A pending scene mutation.
#[derive(Debug)]
pub enum SceneOp {
    Attach(Arc<Leaf>),
    Detach(Uuid),
}

/// Scene mutations recorded off the update loop and applied on it.
pub struct SceneQueue {
    parent: Uuid,
    ops: Mutex<Vec<SceneOp>>,
}

impl SceneQueue {
    pub fn new(parent: Uuid) -> Self {
        Self {
            parent,
            ops: Mutex::new(Vec::new()),
        }
    }

    pub fn attach(&self, leaf: Arc<Leaf>) {
        self.ops.lock().push(SceneOp::Attach(leaf));
    }

    pub fn detach(&self, leaf: Uuid) {
        self.ops.lock().push(SceneOp::Detach(leaf));
    }

    pub fn pending(&self) -> usize {
        self.ops.lock().len()
    }

    /// Applies queued operations in order. Returns how many were applied.
    pub fn flush(&self, scene: &dyn Scene) -> usize {
        let ops = std::mem::take(&mut *self.ops.lock());
        let count = ops.len();
        for op in ops {
            match op {
                SceneOp::Attach(leaf) => scene.attach(&leaf, self.parent),
                SceneOp::Detach(id) => scene.detach(id),
            }
        }
        if count > 0 {
            debug!(parent = %self.parent, count, "applied scene operations");
        }
        count
    }
}
