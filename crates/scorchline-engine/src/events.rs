use scorchline_core::weapon::WeaponKind;

/// Observable happenings emitted by a simulation tick. External
/// collaborators (renderer particle systems, audio cue playback, HUD)
/// consume these; the engine itself never blocks on them.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A detonation or impact burst at a world position. `intensity` scales
    /// the particle/audio response.
    Explosion { x: f32, y: f32, intensity: ExplosionIntensity },
    ShotFired { weapon: WeaponKind },
    EmptyMagazine,
    WeaponSwitched { weapon: WeaponKind },
    WallPlaced { x: f32, y: f32 },
    WallBroken { x: f32, y: f32 },
    EnemyKilled { x: f32, y: f32 },
    /// The local player took damage; carries the resulting health.
    PlayerDamaged { health: f32 },
    PlayerDied,
    PlayerRespawned,
    Jump,
    Dash,
    HealStarted,
    MineArmed { x: f32, y: f32 },
    BeamStarted,
    SpinningBeamsStarted,
    AreaStrike { x: f32 },
    WaveStarted { wave: u32 },
    BreakStarted { duration_ticks: u32 },
    SessionWon,
}

/// Relative scale of an explosion's audiovisual response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionIntensity {
    Impact,
    Blast,
    ChargedBlast,
    MineBlast,
}
