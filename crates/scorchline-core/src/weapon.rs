use serde::{Deserialize, Serialize};

/// The player's selectable weapons. The serialized name is the wire value of
/// the `currentWeapon` field, so variant renames are protocol changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponKind {
    Rifle,
    Shotgun,
    Sniper,
    Minigun,
    LaunchGun,
    Landmine,
}

/// Static firing parameters for a weapon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    /// Minimum ticks between shots.
    pub fire_interval: u32,
    /// Projectile launch speed in world units per tick (throw force for mines).
    pub projectile_speed: f32,
    /// Projectiles created per trigger pull.
    pub pellets: u32,
    /// Ammo consumed per trigger pull.
    pub ammo_usage: u32,
    /// Tracer color sent with `shoot` messages.
    pub color: &'static str,
}

const RIFLE: WeaponSpec = WeaponSpec {
    fire_interval: 9,
    projectile_speed: 15.0,
    pellets: 1,
    ammo_usage: 1,
    color: "#00FF00",
};

const SHOTGUN: WeaponSpec = WeaponSpec {
    fire_interval: 30,
    projectile_speed: 12.0,
    pellets: 8,
    ammo_usage: 1,
    color: "#FFFF00",
};

const SNIPER: WeaponSpec = WeaponSpec {
    fire_interval: 48,
    projectile_speed: 30.0,
    pellets: 1,
    ammo_usage: 1,
    color: "#0000FF",
};

const MINIGUN: WeaponSpec = WeaponSpec {
    fire_interval: 3,
    projectile_speed: 20.0,
    pellets: 1,
    ammo_usage: 1,
    color: "#FFFF00",
};

const LAUNCH_GUN: WeaponSpec = WeaponSpec {
    fire_interval: 30,
    projectile_speed: 40.0,
    pellets: 1,
    ammo_usage: 1,
    color: "#4488ff",
};

const LANDMINE: WeaponSpec = WeaponSpec {
    fire_interval: 60,
    projectile_speed: 15.0,
    pellets: 1,
    ammo_usage: 1,
    color: "#FF0000",
};

impl WeaponKind {
    pub const fn spec(self) -> &'static WeaponSpec {
        match self {
            WeaponKind::Rifle => &RIFLE,
            WeaponKind::Shotgun => &SHOTGUN,
            WeaponKind::Sniper => &SNIPER,
            WeaponKind::Minigun => &MINIGUN,
            WeaponKind::LaunchGun => &LAUNCH_GUN,
            WeaponKind::Landmine => &LANDMINE,
        }
    }

    /// Weapon cycle order for the next-weapon action.
    pub const CYCLE: &[WeaponKind] = &[
        WeaponKind::Rifle,
        WeaponKind::Shotgun,
        WeaponKind::Sniper,
        WeaponKind::Landmine,
    ];

    pub fn next_in_cycle(self) -> WeaponKind {
        let idx = Self::CYCLE.iter().position(|&w| w == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }
}
