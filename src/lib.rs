//! folio-rs: page-turn engine for paginated imagery shown as 3D entities.
//!
//! A [`BookView`] owns a small set of leaves around the visible spread, admits
//! page turns one at a time, animates them frame by frame and collects leaves
//! that went off-screen. Rendering, gesture classification and image decoding
//! stay with the host, behind the [`Scene`] and [`ImageLoader`] traits.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use folio_rs::{
//!     build_page_pairs, BookView, Config, FsImageLoader, ImageEntity, ImageRef, MemoryScene,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let pages = ["/books/love-1.jpg", "/books/love-2.jpg"]
//!         .iter()
//!         .map(|path| ImageRef::from_path(path).unwrap());
//!     let book = BookView::new(
//!         Config::default(),
//!         build_page_pairs(pages),
//!         Arc::new(FsImageLoader::new()),
//!         Arc::new(MemoryScene::new()),
//!     );
//!     book.load_initial().await.unwrap();
//!     book.request_turn_forward();
//!     book.update(1.0 / 60.0);
//! }
//! ```

pub mod book;
pub mod builder;
pub mod config;
pub mod driver;
pub mod entity;
pub mod error;
pub mod events;
pub mod gate;
pub mod loader;
pub mod models;
pub mod plate;
pub mod pose;
pub mod scene;
pub mod sequencer;
pub mod storage;

// Re-exports for convenience
pub use book::{BookView, BookViewBuilder};
pub use config::{Args, Config, TurnRelease};
pub use entity::ImageEntity;
pub use error::{ErrorCode, ViewerError, ViewerResult};
pub use events::BookEvent;
pub use loader::{FsImageLoader, ImageLoader, MemoryImageLoader};
pub use models::{build_page_pairs, ImageRef, LeafIndex, Manifest, PagePair};
pub use plate::Plate;
pub use scene::{MemoryScene, Scene};
pub use sequencer::{SequencerState, TurnDirection, TurnIntent, TurnOutcome};
pub use storage::{MemoryPageStore, PageStore};
