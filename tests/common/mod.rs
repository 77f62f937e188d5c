//! Common test utilities.

#![allow(dead_code)]

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

use folio_rs::{
    build_page_pairs, BookEvent, BookView, Config, ImageEntity, ImageRef, LeafIndex,
    MemoryImageLoader, MemoryScene,
};

/// One frame at 60 fps.
pub const FRAME: f32 = 1.0 / 60.0;

/// Frames after which a book that has not settled is considered stuck.
pub const MAX_FRAMES: usize = 2_000;

/// Smallest byte string the loaders accept as a PNG.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// Returns the in-memory reference for a page name.
pub fn page(name: &str) -> ImageRef {
    ImageRef::parse(&format!("mem://pages/{}", name)).unwrap()
}

/// Test book wrapper: a book over in-memory pages plus its collaborators.
pub struct TestBook {
    pub book: BookView,
    pub scene: Arc<MemoryScene>,
    pub loader: Arc<MemoryImageLoader>,
    events: broadcast::Receiver<BookEvent>,
    awaiting_cleanup: bool,
}

impl TestBook {
    /// Creates a book over `names` and opens it at the first spread.
    pub async fn open(names: &[&str], config: Config) -> Self {
        let loader = Arc::new(MemoryImageLoader::new());
        Self::open_with_loader(names, config, loader).await
    }

    pub async fn open_with_loader(
        names: &[&str],
        config: Config,
        loader: Arc<MemoryImageLoader>,
    ) -> Self {
        for name in names {
            loader.insert(page(name), PNG);
        }

        let scene = Arc::new(MemoryScene::new());
        let book = BookView::new(
            config,
            build_page_pairs(names.iter().map(|name| page(name))),
            loader.clone(),
            scene.clone(),
        );
        let events = book.subscribe();
        book.load_initial().await.unwrap();

        Self {
            book,
            scene,
            loader,
            events,
            awaiting_cleanup: false,
        }
    }

    /// Runs one frame and lets background tasks catch up.
    pub async fn frame(&mut self) -> Vec<LeafIndex> {
        let landed = self.book.update(FRAME);
        tokio::task::yield_now().await;
        self.drain();
        landed
    }

    /// Drives frames until nothing rotates and the last landing was collected.
    pub async fn settle(&mut self) {
        for _ in 0..MAX_FRAMES {
            self.frame().await;
            if !self.any_animating() && !self.awaiting_cleanup {
                // Apply detaches queued by the last pass.
                self.book.update(0.0);
                return;
            }
        }
        panic!("book did not settle within {} frames", MAX_FRAMES);
    }

    /// Yields until the cursor reaches `cursor`.
    pub async fn wait_for_cursor(&self, cursor: LeafIndex) {
        for _ in 0..MAX_FRAMES {
            if self.book.cursor() == cursor {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("cursor never reached {}", cursor);
    }

    pub fn indices(&self) -> Vec<LeafIndex> {
        self.book.store().indices()
    }

    pub fn any_animating(&self) -> bool {
        self.book
            .store()
            .snapshot()
            .values()
            .any(|leaf| leaf.is_animating())
    }

    /// Sorted ids of the leaves attached under this book.
    pub fn attached_ids(&self) -> Vec<uuid::Uuid> {
        let mut ids = self.scene.children_of(self.book.id());
        ids.sort();
        ids
    }

    /// Sorted ids of the leaves in the store.
    pub fn stored_ids(&self) -> Vec<uuid::Uuid> {
        let mut ids: Vec<_> = self
            .book
            .store()
            .snapshot()
            .values()
            .map(|leaf| leaf.id())
            .collect();
        ids.sort();
        ids
    }

    fn drain(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(BookEvent::TurnFinished { .. }) => self.awaiting_cleanup = true,
                Ok(BookEvent::CleanupFinished { .. }) => self.awaiting_cleanup = false,
                Ok(_) => {}
                Err(TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
    }
}
