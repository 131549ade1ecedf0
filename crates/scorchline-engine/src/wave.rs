use rand::rngs::StdRng;

use crate::enemy::{self, Enemy};
use crate::events::SimEvent;
use crate::terrain::TerrainField;

/// Spawn quota per wave.
pub const ENEMIES_PER_WAVE: u32 = 20;
/// Maximum simultaneously active enemies.
pub const POPULATION_CAP: usize = 20;
/// Player-attributed kills that end a wave.
pub const KILL_TARGET: u32 = 20;
pub const INITIAL_BREAK_DURATION: u32 = 900;
/// Each successive wave shortens the break by this many ticks.
pub const BREAK_STEP: u32 = 300;
pub const MIN_BREAK_DURATION: u32 = 300;
pub const BASE_ACCURACY: f32 = 0.1;
pub const ACCURACY_INCREMENT: f32 = 0.05;

/// Wave phases. Transitions are total: Spawning -> Active once the quota is
/// out, Active -> Break at the kill target, Break -> Spawning on timer
/// expiry with the wave index incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    Spawning,
    Active,
    Break,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveState {
    /// 1-based wave index.
    pub wave: u32,
    pub spawned: u32,
    pub kills: u32,
    pub break_timer: u32,
    pub break_duration: u32,
    pub phase: WavePhase,
}

impl Default for WaveState {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveState {
    pub fn new() -> Self {
        Self {
            wave: 1,
            spawned: 0,
            kills: 0,
            break_timer: 0,
            break_duration: INITIAL_BREAK_DURATION,
            phase: WavePhase::Spawning,
        }
    }

    /// Enemy aim quality for the current wave.
    pub fn accuracy(&self) -> f32 {
        BASE_ACCURACY + (self.wave - 1) as f32 * ACCURACY_INCREMENT
    }

    /// Break length granted after the given wave, floored at the minimum.
    pub fn break_duration_for(wave: u32) -> u32 {
        INITIAL_BREAK_DURATION
            .saturating_sub((wave - 1) * BREAK_STEP)
            .max(MIN_BREAK_DURATION)
    }

    /// Player-attributed kill credit. Terrain fall-through and other
    /// environmental removals never call this.
    pub fn record_kills(&mut self, count: u32) {
        self.kills += count;
    }
}

/// Advance the wave machine one tick. Spawning is batched: as many enemies
/// as the population cap allows are emitted at once.
pub fn tick_wave(
    state: &mut WaveState,
    enemies: &mut Vec<Enemy>,
    player_x: f32,
    terrain: &TerrainField,
    rng: &mut StdRng,
    events: &mut Vec<SimEvent>,
) {
    match state.phase {
        WavePhase::Spawning => {
            let room = POPULATION_CAP.saturating_sub(enemies.len()) as u32;
            let remaining = ENEMIES_PER_WAVE.saturating_sub(state.spawned);
            let batch = room.min(remaining);
            for _ in 0..batch {
                enemies.push(enemy::spawn_enemy(
                    player_x,
                    terrain,
                    state.accuracy(),
                    rng,
                ));
            }
            state.spawned += batch;
            if state.spawned >= ENEMIES_PER_WAVE {
                state.phase = WavePhase::Active;
            }
        },
        WavePhase::Active => {
            if state.kills >= KILL_TARGET {
                state.phase = WavePhase::Break;
                state.break_timer = state.break_duration;
                // Stragglers don't carry into the intermission.
                enemies.clear();
                events.push(SimEvent::BreakStarted {
                    duration_ticks: state.break_timer,
                });
            } else if enemies.len() < POPULATION_CAP && state.spawned < ENEMIES_PER_WAVE {
                // Top up toward the quota if deaths opened room.
                let room = POPULATION_CAP - enemies.len();
                let batch = (room as u32).min(ENEMIES_PER_WAVE - state.spawned);
                for _ in 0..batch {
                    enemies.push(enemy::spawn_enemy(
                        player_x,
                        terrain,
                        state.accuracy(),
                        rng,
                    ));
                }
                state.spawned += batch;
            }
        },
        WavePhase::Break => {
            state.break_timer = state.break_timer.saturating_sub(1);
            if state.break_timer == 0 {
                state.wave += 1;
                state.spawned = 0;
                state.kills = 0;
                state.break_duration = WaveState::break_duration_for(state.wave);
                state.phase = WavePhase::Spawning;
                events.push(SimEvent::WaveStarted { wave: state.wave });
            }
        },
    }
}
