use std::path::PathBuf;

use anyhow::Context;
use presence_core::{GuideRegion, Thresholds};

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// Frame width in pixels the guide geometry is computed against.
    pub frame_width: u32,
    /// Frame height in pixels.
    pub frame_height: u32,
    /// Horizontal guide radius as a fraction of frame width.
    pub guide_radius_x_frac: f32,
    /// Vertical guide radius as a fraction of frame height.
    pub guide_radius_y_frac: f32,
    /// Task count used when a Start caller passes 0.
    pub default_task_count: usize,
    /// Optional TOML file overriding classifier thresholds.
    pub thresholds_path: Option<PathBuf>,
    /// Engine request queue depth; frames arriving while the queue is
    /// full are dropped (and reported) rather than processed late.
    pub queue_depth: usize,
    /// Whether the daemon runs on the session bus (development mode).
    pub session_bus: bool,
}

impl Config {
    /// Load configuration from `PRESENCE_*` environment variables with
    /// defaults. 1280×720 matches the camera feed the guide overlay is
    /// rendered against by default.
    pub fn from_env() -> Self {
        Self {
            frame_width: env_u32("PRESENCE_FRAME_WIDTH", 1280),
            frame_height: env_u32("PRESENCE_FRAME_HEIGHT", 720),
            guide_radius_x_frac: env_f32("PRESENCE_GUIDE_RADIUS_X", 0.2),
            guide_radius_y_frac: env_f32("PRESENCE_GUIDE_RADIUS_Y", 0.4),
            default_task_count: env_usize("PRESENCE_DEFAULT_TASK_COUNT", 3),
            thresholds_path: std::env::var("PRESENCE_THRESHOLDS_PATH")
                .map(PathBuf::from)
                .ok(),
            queue_depth: env_usize("PRESENCE_QUEUE_DEPTH", 4),
            session_bus: std::env::var("PRESENCE_SESSION_BUS").is_ok(),
        }
    }

    /// Guide region for the configured frame geometry.
    pub fn guide(&self) -> GuideRegion {
        GuideRegion::with_radii(
            self.frame_width,
            self.frame_height,
            self.guide_radius_x_frac,
            self.guide_radius_y_frac,
        )
    }

    /// Thresholds from the configured TOML file, or defaults when no file
    /// is configured. Unset fields in the file keep their defaults.
    pub fn load_thresholds(&self) -> anyhow::Result<Thresholds> {
        let Some(path) = &self.thresholds_path else {
            return Ok(Thresholds::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read thresholds file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("invalid thresholds file {}", path.display()))
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
