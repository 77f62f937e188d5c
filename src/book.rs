//! Multi-page book entity.

use async_trait::async_trait;
use glam::Vec3;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::builder::PageContentBuilder;
use crate::config::Config;
use crate::driver::RotationDriver;
use crate::entity::ImageEntity;
use crate::error::ViewerResult;
use crate::events::{BookEvent, EventBus};
use crate::gate::TurnGate;
use crate::loader::{FsImageLoader, ImageLoader};
use crate::models::{ImageRef, LeafIndex, PagePair};
use crate::pose::Anchor;
use crate::scene::{MemoryScene, Scene, SceneQueue};
use crate::sequencer::{SequencerState, TurnDirection, TurnIntent, TurnOutcome, TurnSequencer};
use crate::storage::{CleanupReactor, LeafCollector, MemoryPageStore, PageStore};

/// A book of leaves that can be paged through.
///
/// Owns the page store, the turn sequencer, the rotation driver and a cleanup
/// task. Must be created inside a tokio runtime.
pub struct BookView {
    id: Uuid,
    config: Arc<Config>,
    store: Arc<dyn PageStore>,
    scene: Arc<dyn Scene>,
    queue: Arc<SceneQueue>,
    events: EventBus,
    gate: Arc<TurnGate>,
    sequencer: TurnSequencer,
    driver: RotationDriver,
    anchor: Mutex<Anchor>,
    runtime: Handle,
    reactor: JoinHandle<()>,
}

impl BookView {
    /// Creates a book with an in-memory page store.
    ///
    /// # Panics
    ///
    /// Panics with fewer than two page pairs, or outside a tokio runtime.
    pub fn new(
        config: Config,
        pairs: Vec<PagePair<ImageRef>>,
        loader: Arc<dyn ImageLoader>,
        scene: Arc<dyn Scene>,
    ) -> Self {
        Self::with_store(config, pairs, loader, scene, Arc::new(MemoryPageStore::new()))
    }

    /// Creates a book with a custom page store.
    pub fn with_store(
        config: Config,
        pairs: Vec<PagePair<ImageRef>>,
        loader: Arc<dyn ImageLoader>,
        scene: Arc<dyn Scene>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        assert!(
            pairs.len() >= 2,
            "a book needs at least two page pairs, got {}",
            pairs.len()
        );

        let id = Uuid::new_v4();
        let config = Arc::new(config);
        let events = EventBus::new(id);
        let queue = Arc::new(SceneQueue::new(id));
        let gate = Arc::new(TurnGate::new(1));
        let builder = PageContentBuilder::new(loader, config.leaf_width, config.leaf_height);

        let sequencer = TurnSequencer::new(
            config.clone(),
            pairs.into(),
            store.clone(),
            builder,
            queue.clone(),
            events.clone(),
            gate.clone(),
        );
        let driver = RotationDriver::new(store.clone(), events.clone(), config.tolerance);

        let runtime = Handle::current();
        let reactor = CleanupReactor::new(
            LeafCollector::new(store.clone(), queue.clone(), events.clone()),
            gate.clone(),
        );
        let reactor = runtime.spawn(reactor.run(events.subscribe()));

        Self {
            id,
            config,
            store,
            scene,
            queue,
            events,
            gate,
            sequencer,
            driver,
            anchor: Mutex::new(Anchor::default()),
            runtime,
            reactor,
        }
    }

    pub fn builder() -> BookViewBuilder {
        BookViewBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of page pairs, end caps included.
    pub fn pair_count(&self) -> usize {
        self.sequencer.pair_count()
    }

    /// Index of the leaf shown on the right.
    pub fn cursor(&self) -> LeafIndex {
        self.gate.cursor()
    }

    pub fn watch_cursor(&self) -> watch::Receiver<LeafIndex> {
        self.gate.watch()
    }

    pub fn state(&self) -> SequencerState {
        self.gate.state()
    }

    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.store
    }

    pub fn scene(&self) -> &Arc<dyn Scene> {
        &self.scene
    }

    /// Subscribes to this book's events.
    pub fn subscribe(&self) -> broadcast::Receiver<BookEvent> {
        self.events.subscribe()
    }

    /// Turns one leaf and returns how the request ended.
    pub async fn turn(&self, direction: TurnDirection) -> TurnOutcome {
        self.sequencer.turn(direction).await
    }

    /// Queues a forward turn on the runtime.
    pub fn request_turn_forward(&self) -> JoinHandle<TurnOutcome> {
        self.request_turn(TurnDirection::Forward)
    }

    /// Queues a backward turn on the runtime.
    pub fn request_turn_backward(&self) -> JoinHandle<TurnOutcome> {
        self.request_turn(TurnDirection::Backward)
    }

    pub fn request_turn(&self, direction: TurnDirection) -> JoinHandle<TurnOutcome> {
        let sequencer = self.sequencer.clone();
        self.runtime
            .spawn(async move { sequencer.turn(direction).await })
    }

    /// Queues the turn a classified gesture asks for, if any.
    pub fn apply_intent(&self, intent: TurnIntent) -> Option<JoinHandle<TurnOutcome>> {
        intent.direction().map(|direction| self.request_turn(direction))
    }

    /// Builds the leaf the next turn in `direction` needs, ahead of the turn.
    pub async fn prefetch(&self, direction: TurnDirection) -> Option<LeafIndex> {
        self.sequencer.prefetch(direction).await
    }

    /// Runs one frame of the update loop: applies pending scene changes, then
    /// steps the rotations. Returns the leaves that landed.
    pub fn update(&self, dt: f32) -> Vec<LeafIndex> {
        self.queue.flush(self.scene.as_ref());
        self.driver.update(dt)
    }
}

#[async_trait]
impl ImageEntity for BookView {
    fn id(&self) -> Uuid {
        self.id
    }

    /// Builds the first spread. Pages that fail to load show blank.
    async fn load_initial(&self) -> ViewerResult<()> {
        self.sequencer.load_initial().await;
        Ok(())
    }

    fn turn_forward(&self) {
        self.request_turn_forward();
    }

    fn turn_backward(&self) {
        self.request_turn_backward();
    }

    /// Two pages wide, one page tall so a turning leaf stays inside.
    fn collision_extents(&self) -> Vec3 {
        Vec3::new(
            self.config.leaf_width * 2.0,
            self.config.leaf_width,
            self.config.leaf_height,
        )
    }

    fn anchor(&self) -> &Mutex<Anchor> {
        &self.anchor
    }
}

impl Drop for BookView {
    fn drop(&mut self) {
        self.reactor.abort();
    }
}

/// Builder for creating a book.
pub struct BookViewBuilder {
    config: Config,
    pairs: Vec<PagePair<ImageRef>>,
    loader: Option<Arc<dyn ImageLoader>>,
    scene: Option<Arc<dyn Scene>>,
    store: Option<Arc<dyn PageStore>>,
}

impl BookViewBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            pairs: Vec::new(),
            loader: None,
            scene: None,
            store: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the page pairs, end caps included.
    pub fn pairs(mut self, pairs: Vec<PagePair<ImageRef>>) -> Self {
        self.pairs = pairs;
        self
    }

    pub fn loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn scene(mut self, scene: Arc<dyn Scene>) -> Self {
        self.scene = Some(scene);
        self
    }

    pub fn store(mut self, store: Arc<dyn PageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the book. Defaults to the file system loader and an in-memory scene.
    pub fn build(self) -> BookView {
        let loader = self.loader.unwrap_or_else(|| Arc::new(FsImageLoader::new()));
        let scene = self.scene.unwrap_or_else(|| Arc::new(MemoryScene::new()));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryPageStore::new()));

        BookView::with_store(self.config, self.pairs, loader, scene, store)
    }
}

impl Default for BookViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}
