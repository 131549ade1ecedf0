use serde::{Deserialize, Serialize};

/// World and session parameters, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Viewport width in world units.
    pub view_width: f32,
    /// Viewport height in world units. Terrain height bands are fractions of this.
    pub view_height: f32,
    /// Initial world width.
    pub world_width: f32,
    /// Width added each time the player nears the world edge.
    pub world_extension: f32,
    /// Travelled distance (player x / 10) at which the session is won.
    pub win_distance: f32,
    /// Simulation tick rate in Hz. Informational for the host loop; all
    /// engine timers count ticks.
    pub tick_rate_hz: f32,
    /// Seed for all session randomness (terrain, AI jitter, spawns).
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            view_width: 1280.0,
            view_height: 720.0,
            world_width: 6000.0,
            world_extension: 3000.0,
            win_distance: 15000.0,
            tick_rate_hz: 60.0,
            seed: 42,
        }
    }
}

impl SimConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("SCORCHLINE_CONFIG")
            .unwrap_or_else(|_| "config/scorchline.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<SimConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    SimConfig::default()
                },
            },
            Err(_) => SimConfig::default(),
        }
    }
}
