//! Viewer configuration.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ErrorCode, ViewerError, ViewerResult};

/// Default per-leaf fan angle, in radians.
pub const DEFAULT_FAN_ANGLE: f32 = 0.015;

/// Default angular tolerance for a finished turn, in radians.
pub const DEFAULT_TOLERANCE: f32 = 0.05;

/// Default turn speed, in radians per second.
pub const DEFAULT_TURN_SPEED: f32 = 3.0;

/// Default time a turn request waits for the turn lock.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(1);

/// Default leaf width, in meters.
pub const DEFAULT_LEAF_WIDTH: f32 = 1.1;

/// Default leaf height, in meters.
pub const DEFAULT_LEAF_HEIGHT: f32 = 1.418;

/// Default frame rate of the demo frame loop.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// When a turn gives up the turn lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnRelease {
    /// Right after the cursor moves; the rotation finishes on its own.
    #[default]
    OnArm,
    /// Only after the rotation finished and off-screen leaves were collected.
    OnFinish,
}

/// Command-line arguments for the demo viewer.
#[derive(Parser, Debug, Clone)]
#[command(name = "folio-rs")]
#[command(about = "Page through image books as 3D leaves")]
#[command(version)]
pub struct Args {
    /// Manifest file listing the viewable items.
    #[arg(long, short = 'm')]
    pub manifest: PathBuf,

    /// Item to open (defaults to the first item in the manifest).
    #[arg(long, short = 'i')]
    pub item: Option<String>,

    /// Turn script: 'f' turns forward, 'b' turns backward.
    #[arg(long, short = 't', default_value = "")]
    pub turns: String,

    /// Per-leaf fan angle in radians.
    #[arg(long, default_value_t = DEFAULT_FAN_ANGLE)]
    pub fan_angle: f32,

    /// Angular tolerance for a finished turn in radians.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f32,

    /// Turn speed in radians per second.
    #[arg(long, default_value_t = DEFAULT_TURN_SPEED)]
    pub speed: f32,

    /// Milliseconds a turn request waits for the turn lock.
    #[arg(long, default_value_t = DEFAULT_TURN_TIMEOUT.as_millis() as u64)]
    pub turn_timeout_ms: u64,

    /// Hold the turn lock until the page has visually landed.
    #[arg(long)]
    pub serialize_turns: bool,

    /// Frames per second of the update loop.
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
    pub frame_rate: u32,

    /// Enable debug logging.
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Enable silent mode (errors only).
    #[arg(long, short = 's')]
    pub silent: bool,
}

/// Viewer configuration derived from command-line arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Leaf width.
    pub leaf_width: f32,
    /// Leaf height.
    pub leaf_height: f32,
    /// Per-leaf fan angle so turned leaves splay instead of lying coplanar.
    pub fan_angle: f32,
    /// Angular tolerance within which a rotation counts as finished.
    pub tolerance: f32,
    /// Angular speed of a turn.
    pub speed: f32,
    /// How long a turn request waits for the turn lock before it is dropped.
    pub turn_timeout: Duration,
    /// Turn lock release policy.
    pub release: TurnRelease,
    /// Frame rate of the update loop.
    pub frame_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leaf_width: DEFAULT_LEAF_WIDTH,
            leaf_height: DEFAULT_LEAF_HEIGHT,
            fan_angle: DEFAULT_FAN_ANGLE,
            tolerance: DEFAULT_TOLERANCE,
            speed: DEFAULT_TURN_SPEED,
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            release: TurnRelease::default(),
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            fan_angle: args.fan_angle,
            tolerance: args.tolerance,
            speed: args.speed,
            turn_timeout: Duration::from_millis(args.turn_timeout_ms),
            release: if args.serialize_turns {
                TurnRelease::OnFinish
            } else {
                TurnRelease::OnArm
            },
            frame_rate: args.frame_rate,
            ..Config::default()
        }
    }
}

impl Config {
    /// Returns a copy with the leaf size replaced.
    pub fn with_leaf_size(mut self, width: f32, height: f32) -> Self {
        self.leaf_width = width;
        self.leaf_height = height;
        self
    }

    /// Returns the duration of one frame of the update loop.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }

    /// Checks that every tunable is usable.
    pub fn validate(&self) -> ViewerResult<()> {
        let positive = [
            ("leaf_width", self.leaf_width),
            ("leaf_height", self.leaf_height),
            ("tolerance", self.tolerance),
            ("speed", self.speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ViewerError::with_message(
                    ErrorCode::InvalidConfig,
                    format!("{} must be a positive number, got {}", name, value),
                ));
            }
        }
        if !(self.fan_angle.is_finite() && self.fan_angle >= 0.0) {
            return Err(ViewerError::with_message(
                ErrorCode::InvalidConfig,
                format!("fan_angle must not be negative, got {}", self.fan_angle),
            ));
        }
        if self.frame_rate == 0 {
            return Err(ViewerError::with_message(
                ErrorCode::InvalidConfig,
                "frame_rate must be at least 1",
            ));
        }
        Ok(())
    }
}
