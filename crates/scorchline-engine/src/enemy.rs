use rand::Rng;
use rand::rngs::StdRng;

use crate::GRAVITY;
use crate::events::SimEvent;
use crate::geom::{self, CenterBox, CornerBox};
use crate::player::{PLAYER_HEIGHT, PLAYER_WIDTH, Player};
use crate::terrain::TerrainField;
use crate::wall::{self, Wall};

pub const ENEMY_WIDTH: f32 = 30.0;
pub const ENEMY_HEIGHT: f32 = 50.0;
/// Beyond this distance enemies pursue; inside it they strafe.
pub const SEEK_DISTANCE: f32 = 300.0;
/// Enemies do not fire past this range.
pub const FIRE_RANGE: f32 = 1200.0;
/// Closer enemies attempt shots more often.
const NEAR_FIRE_DISTANCE: f32 = 600.0;
const NEAR_FIRE_CHANCE: f64 = 0.03;
const FAR_FIRE_CHANCE: f64 = 0.01;
const JUMP_CHANCE: f64 = 0.02;
const JUMP_IMPULSE: f32 = -10.0;
/// Upward kick applied when an enemy starts dying.
const DEATH_IMPULSE: f32 = -5.0;
/// Rightward drift of a dying enemy, per tick.
const DEATH_DRIFT: f32 = 3.0;
const DEATH_SPIN: f32 = 0.1;
/// Ticks a dying enemy stays in the collection before being purged.
pub const FADE_DURATION: u32 = 150;
/// Ammo refunded to the player per bullet kill.
pub const AMMO_REWARD: u32 = 5;
/// Enemies farther than this from the player are considered out of play.
const DESPAWN_DISTANCE: f32 = 6280.0;

pub const ENEMY_BULLET_SPEED: f32 = 10.0;
pub const ENEMY_BULLET_SIZE: f32 = 5.0;
pub const ENEMY_BULLET_DAMAGE: f32 = 10.0;
pub const ENEMY_BULLET_LIFETIME: u32 = 180;

/// Behavioral state. Removal from the collection is the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Active,
    Dying,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub state: EnemyState,
    /// Ticks until the next shot attempt is allowed.
    pub fire_cooldown: u32,
    /// Randomized per-enemy re-fire interval.
    pub fire_interval: u32,
    /// Wave-scaled aim quality in [0, 1]; higher is tighter spread.
    pub accuracy: f32,
    pub ammo_reward: u32,
    pub can_jump: bool,
    /// Fade-out drivers while dying.
    pub rotation: f32,
    pub fade_timer: u32,
}

impl Enemy {
    pub fn center_box(&self) -> CenterBox {
        CenterBox {
            cx: self.x,
            cy: self.y,
            w: ENEMY_WIDTH,
            h: ENEMY_HEIGHT,
        }
    }

    /// Transition Active -> Dying: stop shooting, kick upward, start the
    /// fade-out. Kill credit is the caller's concern and happens at the hit
    /// moment, not at fade completion.
    pub fn kill(&mut self) {
        self.state = EnemyState::Dying;
        self.vy = DEATH_IMPULSE;
        self.fade_timer = 0;
        self.rotation = 0.0;
    }

    /// Fade progress in [0, 1] for the render layer.
    pub fn fade_alpha(&self) -> f32 {
        1.0 - (self.fade_timer as f32 / FADE_DURATION as f32).min(1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyBullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub lifetime: u32,
}

/// Spawn an enemy near the player: random side, banded distance with
/// jitter, clamped into the world, a little above the ground.
pub fn spawn_enemy(
    player_x: f32,
    terrain: &TerrainField,
    accuracy: f32,
    rng: &mut StdRng,
) -> Enemy {
    const MIN_SPAWN_DIST: f32 = 800.0;
    const MAX_SPAWN_DIST: f32 = 2000.0;
    const SPAWN_JITTER: f32 = 400.0;
    const SPAWN_ELEVATION: f32 = 100.0;

    let distance = MIN_SPAWN_DIST + rng.random::<f32>() * (MAX_SPAWN_DIST - MIN_SPAWN_DIST);
    let direction = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
    let mut spawn_x = player_x + direction * distance;
    spawn_x += (rng.random::<f32>() - 0.5) * SPAWN_JITTER;
    spawn_x = spawn_x.clamp(0.0, terrain.world_width());

    let ground = terrain.height_at(spawn_x);
    let elevation = rng.random::<f32>() * SPAWN_ELEVATION;

    Enemy {
        x: spawn_x,
        y: ground - ENEMY_HEIGHT - elevation,
        vx: 0.0,
        vy: 0.0,
        state: EnemyState::Active,
        fire_cooldown: 0,
        fire_interval: rng.random_range(60..120),
        accuracy,
        ammo_reward: AMMO_REWARD,
        can_jump: true,
        rotation: 0.0,
        fade_timer: 0,
    }
}

/// Advance one active enemy: pursuit/strafe toward the player, gravity and
/// ground snap, wall blocking, and a gated fire attempt. Returns false if
/// the enemy wandered out of play and should be dropped.
pub fn tick_enemy(
    enemy: &mut Enemy,
    player: &Player,
    terrain: &TerrainField,
    walls: &[Wall],
    rng: &mut StdRng,
    bullets: &mut Vec<EnemyBullet>,
) -> bool {
    if (enemy.x - player.x).abs() > DESPAWN_DISTANCE {
        return false;
    }

    let dx = player.x - enemy.x;
    let dy = player.y - enemy.y;
    let distance = (dx * dx + dy * dy).sqrt();

    if distance > SEEK_DISTANCE {
        let speed = 2.0 + rng.random::<f32>() * 0.5;
        enemy.vx = dx.signum() * speed;

        if enemy.can_jump && rng.random_bool(JUMP_CHANCE) {
            enemy.vy = JUMP_IMPULSE;
            enemy.can_jump = false;
        }
    } else {
        // Strafe: mostly toward the player, sometimes away.
        let toward = if rng.random_bool(0.7) {
            dx.signum()
        } else {
            -dx.signum()
        };
        enemy.vx = toward * (1.5 + rng.random::<f32>());
    }

    let new_x = enemy.x + enemy.vx;
    if wall::any_blocks(
        walls,
        CenterBox {
            cx: new_x,
            cy: enemy.y,
            w: ENEMY_WIDTH,
            h: ENEMY_HEIGHT,
        },
    ) {
        enemy.vx = -enemy.vx;
    } else {
        enemy.x = new_x;
    }
    enemy.y += enemy.vy;
    enemy.vy += GRAVITY;

    let ground = terrain.height_at(enemy.x);
    if enemy.y >= ground - ENEMY_HEIGHT {
        enemy.y = ground - ENEMY_HEIGHT;
        enemy.vy = 0.0;
        enemy.can_jump = true;
    }

    if enemy.fire_cooldown > 0 {
        enemy.fire_cooldown -= 1;
    }

    let attempt_chance = if distance < NEAR_FIRE_DISTANCE {
        NEAR_FIRE_CHANCE
    } else {
        FAR_FIRE_CHANCE
    };
    if enemy.fire_cooldown == 0 && distance < FIRE_RANGE && rng.random_bool(attempt_chance) {
        let base_angle = dy.atan2(dx);
        let variance = (1.0 - enemy.accuracy) * std::f32::consts::PI;
        let spread_angle = base_angle + (rng.random::<f32>() - 0.5) * variance;
        bullets.push(EnemyBullet {
            x: enemy.x,
            y: enemy.y,
            vx: spread_angle.cos() * ENEMY_BULLET_SPEED,
            vy: spread_angle.sin() * ENEMY_BULLET_SPEED,
            lifetime: ENEMY_BULLET_LIFETIME,
        });
        enemy.fire_cooldown = enemy.fire_interval;
    }

    true
}

/// Advance a dying enemy's fade-out. Returns false once it should be purged.
pub fn tick_dying(enemy: &mut Enemy) -> bool {
    enemy.fade_timer += 1;
    enemy.rotation += DEATH_SPIN;
    enemy.y += enemy.vy;
    enemy.vy += GRAVITY;
    enemy.x += DEATH_DRIFT;
    enemy.fade_timer < FADE_DURATION
}

/// Advance all enemy bullets: expiry, motion, terrain stop, player hit.
pub fn tick_enemy_bullets(
    bullets: &mut Vec<EnemyBullet>,
    player: &mut Player,
    terrain: &TerrainField,
    world_width: f32,
    view_height: f32,
    events: &mut Vec<SimEvent>,
) {
    let player_box = CornerBox {
        x: player.x - PLAYER_WIDTH / 2.0,
        y: player.y - PLAYER_HEIGHT / 2.0,
        w: PLAYER_WIDTH,
        h: PLAYER_HEIGHT,
    };

    bullets.retain_mut(|bullet| {
        bullet.lifetime = bullet.lifetime.saturating_sub(1);
        if bullet.lifetime == 0 {
            return false;
        }

        bullet.x += bullet.vx;
        bullet.y += bullet.vy;

        if bullet.y + ENEMY_BULLET_SIZE > terrain.height_at(bullet.x) {
            return false;
        }

        let bullet_box = CornerBox {
            x: bullet.x,
            y: bullet.y,
            w: ENEMY_BULLET_SIZE,
            h: ENEMY_BULLET_SIZE,
        };
        if player.alive && geom::boxes_overlap(bullet_box, player_box) {
            player.damage(ENEMY_BULLET_DAMAGE);
            events.push(SimEvent::PlayerDamaged {
                health: player.health,
            });
            if !player.alive {
                events.push(SimEvent::PlayerDied);
            }
            return false;
        }

        bullet.x >= 0.0 && bullet.x <= world_width && bullet.y >= 0.0 && bullet.y <= view_height
    });
}
