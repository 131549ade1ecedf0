use scorchline_core::input::InputSnapshot;
use scorchline_core::weapon::WeaponKind;

use crate::GRAVITY;
use crate::events::SimEvent;
use crate::geom::CenterBox;
use crate::terrain::TerrainField;
use crate::wall::{self, Wall};

pub const PLAYER_WIDTH: f32 = 40.0;
pub const PLAYER_HEIGHT: f32 = 24.0;
pub const MAX_HEALTH: f32 = 100.0;
pub const MAX_AMMO: u32 = 200;
pub const SPAWN_X: f32 = 100.0;

pub const ACCELERATION: f32 = 0.5;
pub const FRICTION: f32 = 0.92;
pub const MAX_GROUND_SPEED: f32 = 8.0;
pub const JUMP_FORCE: f32 = -10.0;
/// Overall speed cap in free flight.
pub const FLIGHT_SPEED_CAP: f32 = 122.0;
pub const FLY_ACCELERATION: f32 = 0.3;
pub const MAX_FLY_SPEED: f32 = 10.0;

pub const DASH_SPEED: f32 = 15.0;
pub const DASH_DURATION: u32 = 15;
pub const DASH_COOLDOWN: u32 = 60;

/// Ground slopes steeper than this (radians) put the player into a slide.
pub const SLIDE_THRESHOLD: f32 = 0.3;
const SLIDE_FORCE: f32 = 0.5;

/// The player cannot leave this vertical margin of the viewport.
pub const TOP_MARGIN: f32 = 20.0;

pub const HEAL_AMOUNT: f32 = 25.0;
pub const HEAL_DURATION: u32 = 150;

/// How the avatar moves: free thrust in every direction, or gravity-bound
/// platforming with a jetpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    FreeFlight,
    Grounded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub health: f32,
    pub ammo: u32,
    pub gun_angle: f32,
    pub weapon: WeaponKind,
    pub mode: MoveMode,
    pub alive: bool,
    pub dashing: bool,
    pub sliding: bool,
    pub zoomed: bool,
    pub charging_throw: bool,
    pub can_jump: bool,
    pub fly_speed: f32,
    pub dash_timer: u32,
    pub dash_cooldown: u32,
    pub fire_cooldown: u32,
    /// Ticks of active healing remaining; 0 when idle.
    pub heal_timer: u32,
    /// Ticks until the relay-driven death hold releases.
    pub respawn_hold: u32,
}

impl Player {
    pub fn spawn(terrain: &TerrainField) -> Self {
        let ground = terrain.height_at(SPAWN_X);
        Self {
            x: SPAWN_X,
            y: ground - PLAYER_HEIGHT - 16.0,
            vx: 0.0,
            vy: 0.0,
            health: MAX_HEALTH,
            ammo: MAX_AMMO,
            gun_angle: 0.0,
            weapon: WeaponKind::Rifle,
            mode: MoveMode::FreeFlight,
            alive: true,
            dashing: false,
            sliding: false,
            zoomed: false,
            charging_throw: false,
            can_jump: true,
            fly_speed: 0.0,
            dash_timer: 0,
            dash_cooldown: 0,
            fire_cooldown: 0,
            heal_timer: 0,
            respawn_hold: 0,
        }
    }

    pub fn center_box(&self) -> CenterBox {
        CenterBox {
            cx: self.x,
            cy: self.y,
            w: PLAYER_WIDTH,
            h: PLAYER_HEIGHT,
        }
    }

    pub fn refund_ammo(&mut self, amount: u32) {
        self.ammo = (self.ammo + amount).min(MAX_AMMO);
    }

    pub fn damage(&mut self, amount: f32) {
        self.health -= amount;
        if self.health <= 0.0 {
            self.alive = false;
        }
    }
}

/// Pick the dash direction: movement keys first, then current velocity,
/// then the aim angle.
fn dash_angle(player: &Player, input: &InputSnapshot) -> f32 {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    let horiz = input.move_dir();
    let vert = match (input.ascend, input.descend) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };

    match (horiz as i8, vert as i8) {
        (1, 0) => 0.0,
        (-1, 0) => PI,
        (0, -1) => -FRAC_PI_2,
        (0, 1) => FRAC_PI_2,
        (1, -1) => -FRAC_PI_4,
        (1, 1) => FRAC_PI_4,
        (-1, -1) => -3.0 * FRAC_PI_4,
        (-1, 1) => 3.0 * FRAC_PI_4,
        _ => {
            if player.vx.abs() > 0.1 || player.vy.abs() > 0.1 {
                player.vy.atan2(player.vx)
            } else {
                player.gun_angle
            }
        },
    }
}

/// Advance the player one tick: cooldowns, mode-dependent thrust,
/// wall-checked integration, ground contact, and vertical clamping.
pub fn tick_player(
    player: &mut Player,
    input: &InputSnapshot,
    terrain: &TerrainField,
    walls: &[Wall],
    view_height: f32,
    events: &mut Vec<SimEvent>,
) {
    if !player.alive {
        if player.respawn_hold > 0 {
            player.respawn_hold -= 1;
            if player.respawn_hold == 0 {
                player.alive = true;
                events.push(SimEvent::PlayerRespawned);
            }
        }
        return;
    }

    player.gun_angle = if input.aim_angle.is_finite() {
        input.aim_angle
    } else {
        player.gun_angle
    };
    player.charging_throw = input.charging_throw;

    if player.dash_cooldown > 0 {
        player.dash_cooldown -= 1;
    }
    if player.fire_cooldown > 0 {
        player.fire_cooldown -= 1;
    }

    if input.toggle_move_mode {
        player.mode = match player.mode {
            MoveMode::FreeFlight => MoveMode::Grounded,
            MoveMode::Grounded => MoveMode::FreeFlight,
        };
    }
    if input.toggle_zoom && player.weapon == WeaponKind::Sniper {
        player.zoomed = !player.zoomed;
    }

    if input.heal && player.heal_timer == 0 && player.health < MAX_HEALTH {
        player.heal_timer = HEAL_DURATION;
        events.push(SimEvent::HealStarted);
    }
    if player.heal_timer > 0 {
        player.health = (player.health + HEAL_AMOUNT / HEAL_DURATION as f32).min(MAX_HEALTH);
        player.heal_timer -= 1;
    }

    if input.dash && !player.dashing && player.dash_cooldown == 0 {
        let angle = dash_angle(player, input);
        player.dashing = true;
        player.dash_timer = DASH_DURATION;
        player.dash_cooldown = DASH_COOLDOWN;
        player.vx = angle.cos() * DASH_SPEED;
        player.vy = angle.sin() * DASH_SPEED;
        events.push(SimEvent::Dash);
    }

    match player.mode {
        MoveMode::FreeFlight => {
            if input.move_right {
                player.vx += ACCELERATION;
            }
            if input.move_left {
                player.vx -= ACCELERATION;
            }
            if input.ascend {
                player.vy -= ACCELERATION;
            }
            if input.descend {
                player.vy += ACCELERATION;
            }
            player.vx *= FRICTION;
            player.vy *= FRICTION;

            let speed = (player.vx * player.vx + player.vy * player.vy).sqrt();
            if speed > FLIGHT_SPEED_CAP {
                let angle = player.vy.atan2(player.vx);
                player.vx = angle.cos() * FLIGHT_SPEED_CAP;
                player.vy = angle.sin() * FLIGHT_SPEED_CAP;
            }
        },
        MoveMode::Grounded => {
            let dir = input.move_dir();
            if dir != 0.0 {
                player.vx = (player.vx + dir * ACCELERATION)
                    .clamp(-MAX_GROUND_SPEED, MAX_GROUND_SPEED);
            } else {
                player.vx *= FRICTION;
                if player.vx.abs() < 0.1 {
                    player.vx = 0.0;
                }
            }

            player.vy += GRAVITY;

            if input.jump && player.can_jump {
                player.vy = JUMP_FORCE;
                player.can_jump = false;
                events.push(SimEvent::Jump);
            }

            if input.ascend {
                player.fly_speed = (player.fly_speed + FLY_ACCELERATION).min(MAX_FLY_SPEED);
                player.vy = -player.fly_speed;
            } else {
                player.fly_speed = 0.0;
            }
        },
    }

    // Integrate, rejecting the whole update if the proposed position is
    // inside any wall. No partial slide along the blocked axis.
    let new_x = player.x + player.vx;
    let new_y = player.y + player.vy;
    if !wall::any_blocks(
        walls,
        CenterBox {
            cx: new_x,
            cy: new_y,
            w: PLAYER_WIDTH,
            h: PLAYER_HEIGHT,
        },
    ) {
        player.x = new_x;
        player.y = new_y;
    }

    if player.mode == MoveMode::Grounded {
        let ground = terrain.height_at(player.x);
        if player.y >= ground - PLAYER_HEIGHT / 2.0 {
            player.y = ground - PLAYER_HEIGHT / 2.0;
            player.vy = 0.0;
            player.can_jump = true;

            let angle = terrain.slope_at(player.x);
            if angle.abs() > SLIDE_THRESHOLD {
                player.sliding = true;
                player.vx += angle.sin() * SLIDE_FORCE;
            } else {
                player.sliding = false;
            }
        } else {
            player.sliding = false;
        }
    }

    if player.dashing {
        player.dash_timer -= 1;
        if player.dash_timer == 0 {
            player.dashing = false;
        }
    }

    if player.y > view_height {
        player.alive = false;
        events.push(SimEvent::PlayerDied);
        return;
    }
    player.y = player.y.clamp(TOP_MARGIN, view_height - TOP_MARGIN);
}
