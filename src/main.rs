//! folio-rs: headless page-turn viewer.
//!
//! Opens an item from a manifest, runs a frame loop on its own thread and plays
//! a scripted sequence of page turns.

use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use folio_rs::{
    Args, BookEvent, BookView, Config, ErrorCode, FsImageLoader, ImageEntity, ImageLoader, Manifest,
    MemoryScene, Plate, TurnDirection, ViewerError,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug {
        Level::DEBUG
    } else if args.silent {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(LevelFilter::from_level(log_level).into()),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let manifest = Manifest::load(&args.manifest).await?;
    let item = match &args.item {
        Some(name) => manifest.item(name)?,
        None => manifest.first().ok_or_else(|| {
            ViewerError::with_message(ErrorCode::InvalidManifest, "Manifest has no items")
        })?,
    };

    let script = parse_script(&args.turns)?;
    let config = Config::from(args).with_leaf_size(item.width, item.height);
    config.validate()?;

    let loader: Arc<dyn ImageLoader> = Arc::new(FsImageLoader::new());

    if !item.is_book() {
        let plate = Plate::new(item.images[0].clone(), item.width, item.height, loader);
        plate.load_initial().await?;
        info!(item = %item.name, extents = ?plate.collision_extents(), "plate ready");
        return Ok(());
    }

    let scene = Arc::new(MemoryScene::new());
    let book = Arc::new(BookView::new(
        config.clone(),
        item.page_pairs(),
        loader,
        scene.clone(),
    ));
    book.load_initial().await?;
    info!(item = %item.name, pairs = book.pair_count(), "book ready");

    let running = Arc::new(AtomicBool::new(true));
    let frame_loop = spawn_frame_loop(book.clone(), config.frame_interval(), running.clone())?;

    let mut events = book.subscribe();
    for direction in script {
        let outcome = book.turn(direction).await;
        info!(?direction, ?outcome, cursor = book.cursor(), "turn handled");
        if outcome.is_turned() {
            wait_for_cleanup(&mut events, Duration::from_secs(5)).await;
        }
    }

    running.store(false, Ordering::Relaxed);
    if frame_loop.join().is_err() {
        warn!("frame loop panicked");
    }

    info!(
        cursor = book.cursor(),
        leaves = ?book.store().indices(),
        attached = scene.len(),
        "done"
    );
    Ok(())
}

fn parse_script(turns: &str) -> Result<Vec<TurnDirection>, ViewerError> {
    turns
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'f' | 'F' => Ok(TurnDirection::Forward),
            'b' | 'B' => Ok(TurnDirection::Backward),
            other => Err(ViewerError::with_message(
                ErrorCode::InvalidConfig,
                format!("Unknown turn '{}', expected 'f' or 'b'", other),
            )),
        })
        .collect()
}

/// Drives the book's update loop on a dedicated thread until `running` clears.
fn spawn_frame_loop(
    book: Arc<BookView>,
    interval: Duration,
    running: Arc<AtomicBool>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("frame-loop".to_string())
        .spawn(move || {
            let mut last = Instant::now();
            while running.load(Ordering::Relaxed) {
                std::thread::sleep(interval);
                let now = Instant::now();
                book.update(now.duration_since(last).as_secs_f32());
                last = now;
            }
        })
}

/// Waits until the reactor has collected after a landed turn.
async fn wait_for_cleanup(
    events: &mut tokio::sync::broadcast::Receiver<BookEvent>,
    limit: Duration,
) {
    let landed = async {
        let mut finished = false;
        loop {
            match events.recv().await {
                Ok(BookEvent::TurnFinished { .. }) => finished = true,
                Ok(BookEvent::CleanupFinished { .. }) if finished => return,
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return,
            }
        }
    };
    if tokio::time::timeout(limit, landed).await.is_err() {
        warn!("turn did not settle in time");
    }
}
