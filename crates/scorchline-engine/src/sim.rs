use rand::SeedableRng;
use rand::rngs::StdRng;

use scorchline_core::input::InputSnapshot;
use scorchline_core::net::messages::{ClientMessage, PlayerUpdate, ServerMessage};
use scorchline_core::weapon::WeaponKind;

use crate::config::SimConfig;
use crate::enemy::{self, Enemy, EnemyBullet, EnemyState};
use crate::events::SimEvent;
use crate::player::{self, Player};
use crate::projectile::{
    self, Bullet, Grenade, Landmine, Projectile, ResolutionOutcome, SpecialBeam, SpinningBeams,
};
use crate::remote::RemoteRoster;
use crate::terrain::TerrainField;
use crate::wall::Wall;
use crate::wave::{self, WaveState};

/// Area-strike cooldown in ticks.
pub const STRIKE_COOLDOWN: u32 = 1800;

/// Session-scoped progress counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    pub kill_count: u32,
    pub coins: u32,
    /// Travelled distance, derived from the player's x.
    pub distance: f32,
    pub won: bool,
}

/// Everything a tick produced for the outside world: observable events for
/// render/audio collaborators, and wire messages for the relay.
#[derive(Debug, Default)]
pub struct TickOutput {
    pub events: Vec<SimEvent>,
    pub outbound: Vec<ClientMessage>,
}

/// The whole simulation: terrain, entities, projectiles, wave machine, and
/// the remote roster, advanced one tick at a time. Single-threaded by
/// construction; the tick owns all mutable state and runs to completion.
pub struct CombatSim {
    pub config: SimConfig,
    pub terrain: TerrainField,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub dying_enemies: Vec<Enemy>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub projectiles: Vec<Projectile>,
    pub walls: Vec<Wall>,
    pub special_beam: Option<SpecialBeam>,
    pub beam_cooldown: u32,
    pub spinning_beams: Option<SpinningBeams>,
    pub spin_cooldown: u32,
    pub spin_used: bool,
    pub strike_cooldown: u32,
    pub wave: WaveState,
    pub remote: RemoteRoster,
    pub stats: SessionStats,
    pub tick_count: u64,
    rng: StdRng,
}

impl CombatSim {
    pub fn new(config: SimConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let terrain = TerrainField::generate(
            config.world_width,
            config.view_width,
            config.view_height,
            &mut rng,
        );
        let player = Player::spawn(&terrain);
        Self {
            config,
            terrain,
            player,
            enemies: Vec::new(),
            dying_enemies: Vec::new(),
            enemy_bullets: Vec::new(),
            projectiles: Vec::new(),
            walls: Vec::new(),
            special_beam: None,
            beam_cooldown: 0,
            spinning_beams: None,
            spin_cooldown: 0,
            spin_used: false,
            strike_cooldown: 0,
            wave: WaveState::new(),
            remote: RemoteRoster::new(),
            stats: SessionStats::default(),
            tick_count: 0,
            rng,
        }
    }

    /// Wholesale session restart: fresh terrain, fresh player, every
    /// collection and counter cleared. The remote roster survives because
    /// the relay connection outlives local restarts.
    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.terrain.reset(self.config.world_width, &mut self.rng);
        self.player = Player::spawn(&self.terrain);
        self.enemies.clear();
        self.dying_enemies.clear();
        self.enemy_bullets.clear();
        self.projectiles.clear();
        self.walls.clear();
        self.special_beam = None;
        self.beam_cooldown = 0;
        self.spinning_beams = None;
        self.spin_cooldown = 0;
        self.spin_used = false;
        self.strike_cooldown = 0;
        self.wave = WaveState::new();
        self.stats = SessionStats::default();
        self.tick_count = 0;
    }

    /// Advance the simulation one tick. Inbound relay messages are applied
    /// first, then entities, projectiles, the wave machine, and finally the
    /// sync boundary publishes the local delta.
    pub fn tick(&mut self, input: &InputSnapshot, inbound: Vec<ServerMessage>) -> TickOutput {
        let mut out = TickOutput::default();
        self.tick_count += 1;

        for msg in inbound {
            self.remote.apply(msg, &mut self.player, &mut out.events);
        }

        self.stats.distance = self.player.x / 10.0;
        if !self.stats.won && self.stats.distance >= self.config.win_distance {
            self.stats.won = true;
            out.events.push(SimEvent::SessionWon);
        }

        if !self.player.alive {
            // Dead players only wait out the respawn hold.
            player::tick_player(
                &mut self.player,
                input,
                &self.terrain,
                &self.walls,
                self.config.view_height,
                &mut out.events,
            );
            return out;
        }

        self.apply_weapon_input(input, &mut out.events);

        // Entity director: player first, then every active enemy.
        player::tick_player(
            &mut self.player,
            input,
            &self.terrain,
            &self.walls,
            self.config.view_height,
            &mut out.events,
        );

        let mut i = 0;
        while i < self.enemies.len() {
            let keep = enemy::tick_enemy(
                &mut self.enemies[i],
                &self.player,
                &self.terrain,
                &self.walls,
                &mut self.rng,
                &mut self.enemy_bullets,
            );
            if keep {
                i += 1;
            } else {
                // Out of play, not a kill: no credit of any kind.
                self.enemies.swap_remove(i);
            }
        }

        self.dying_enemies.retain_mut(enemy::tick_dying);

        enemy::tick_enemy_bullets(
            &mut self.enemy_bullets,
            &mut self.player,
            &self.terrain,
            self.terrain.world_width(),
            self.config.view_height,
            &mut out.events,
        );

        // Projectile simulator, including trigger handling and beams.
        self.handle_fire(input, &mut out);

        let mut outcome = projectile::tick_projectiles(
            &mut self.projectiles,
            &mut self.terrain,
            &mut self.walls,
            &mut self.enemies,
            &mut self.player,
            &mut out.events,
        );
        projectile::tick_special_beam(
            &mut self.special_beam,
            &mut self.beam_cooldown,
            &self.player,
            &mut self.enemies,
            &mut out.events,
            &mut outcome,
        );
        projectile::tick_spinning_beams(
            &mut self.spinning_beams,
            &mut self.spin_cooldown,
            &self.player,
            &mut self.enemies,
            &mut out.events,
            &mut outcome,
        );
        self.apply_outcome(outcome);

        // Wave machine sees the updated kill tally.
        wave::tick_wave(
            &mut self.wave,
            &mut self.enemies,
            self.player.x,
            &self.terrain,
            &mut self.rng,
            &mut out.events,
        );
        if out
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::BreakStarted { .. }))
        {
            // Wave-completion reward.
            self.stats.coins += 1;
        }

        if self
            .terrain
            .extend_if_needed(self.player.x, self.config.world_extension, &mut self.rng)
        {
            tracing::debug!(
                world_width = self.terrain.world_width(),
                "world extended"
            );
        }

        // Sync boundary: fold remote bullets, then publish the local state.
        self.remote.tick_bullets(
            &self.terrain,
            &mut self.player,
            self.terrain.world_width(),
            self.config.view_height,
            &mut out.outbound,
            &mut out.events,
        );
        out.outbound.push(ClientMessage::Update {
            player: PlayerUpdate {
                x: self.player.x,
                y: self.player.y,
                speed_x: self.player.vx,
                speed_y: self.player.vy,
                gun_angle: self.player.gun_angle,
                health: self.player.health,
                current_weapon: self.player.weapon,
            },
        });

        out
    }

    fn apply_weapon_input(&mut self, input: &InputSnapshot, events: &mut Vec<SimEvent>) {
        if let Some(weapon) = input.select_weapon {
            if weapon != self.player.weapon {
                self.player.weapon = weapon;
                self.player.zoomed = false;
                events.push(SimEvent::WeaponSwitched { weapon });
            }
        } else if input.cycle_weapon {
            let weapon = self.player.weapon.next_in_cycle();
            self.player.weapon = weapon;
            self.player.zoomed = false;
            events.push(SimEvent::WeaponSwitched { weapon });
        }
    }

    fn handle_fire(&mut self, input: &InputSnapshot, out: &mut TickOutput) {
        if input.place_wall {
            let wall = Wall::place_ahead(self.player.x, self.player.y, self.player.gun_angle);
            out.events.push(SimEvent::WallPlaced { x: wall.x, y: wall.y });
            self.walls.push(wall);
        }

        if input.throw_released {
            let grenade = Grenade::thrown(
                self.player.x,
                self.player.y,
                self.player.gun_angle,
                self.player.charging_throw,
            );
            self.projectiles.push(Projectile::Grenade(grenade));
            out.events.push(SimEvent::ShotFired {
                weapon: self.player.weapon,
            });
        }

        if input.special_beam
            && self.special_beam.is_none()
            && self.beam_cooldown == 0
        {
            self.special_beam = Some(SpecialBeam {
                remaining: projectile::BEAM_DURATION,
            });
            out.events.push(SimEvent::BeamStarted);
        }

        if input.spinning_beams
            && self.spinning_beams.is_none()
            && self.spin_cooldown == 0
            && !self.spin_used
        {
            self.spinning_beams = Some(SpinningBeams {
                angle: 0.0,
                remaining: projectile::BEAM_DURATION,
            });
            self.spin_used = true;
            out.events.push(SimEvent::SpinningBeamsStarted);
        }

        if input.area_strike && self.strike_cooldown == 0 {
            self.area_strike(out);
        }
        self.strike_cooldown = self.strike_cooldown.saturating_sub(1);

        if !(input.fire_held || input.fire_pressed) || self.player.fire_cooldown > 0 {
            return;
        }
        let weapon = self.player.weapon;
        let spec = weapon.spec();
        if self.player.ammo < spec.ammo_usage {
            out.events.push(SimEvent::EmptyMagazine);
            return;
        }
        self.player.ammo -= spec.ammo_usage;
        self.player.fire_cooldown = spec.fire_interval;

        match weapon {
            WeaponKind::Landmine => {
                self.projectiles.push(Projectile::Landmine(Landmine::thrown(
                    self.player.x,
                    self.player.y,
                    self.player.gun_angle,
                )));
            },
            _ => {
                let max_bounces = if weapon == WeaponKind::LaunchGun {
                    projectile::LAUNCH_ROUND_BOUNCES
                } else {
                    0
                };
                for _ in 0..spec.pellets {
                    let bullet = Bullet::fired(
                        self.player.x,
                        self.player.y,
                        self.player.gun_angle,
                        spec.projectile_speed,
                        spec.color,
                        max_bounces,
                    );
                    out.outbound.push(ClientMessage::Shoot {
                        x: bullet.x,
                        y: bullet.y,
                        dx: bullet.dx,
                        dy: bullet.dy,
                        color: bullet.color.to_string(),
                    });
                    self.projectiles.push(Projectile::Bullet(bullet));
                }
            },
        }
        out.events.push(SimEvent::ShotFired { weapon });
    }

    /// The area strike: flatten terrain around the player, kill (with
    /// credit) every enemy in the window, destroy every wall in it.
    fn area_strike(&mut self, out: &mut TickOutput) {
        self.strike_cooldown = STRIKE_COOLDOWN;
        let min_x = self.player.x - self.config.view_width;
        let max_x = self.player.x + self.config.view_width;

        self.terrain.flatten(min_x, max_x);

        let mut outcome = ResolutionOutcome::default();
        for enemy in self.enemies.iter_mut() {
            if enemy.state == EnemyState::Active && enemy.x >= min_x && enemy.x <= max_x {
                enemy.kill();
                outcome.kills += 1;
                outcome.coins += 1;
                out.events.push(SimEvent::EnemyKilled {
                    x: enemy.x,
                    y: enemy.y,
                });
            }
        }
        self.apply_outcome(outcome);

        self.walls.retain(|w| w.x < min_x || w.x > max_x);

        out.events.push(SimEvent::AreaStrike { x: self.player.x });
    }

    /// Fold a resolution outcome into session stats and the wave tally, and
    /// sweep newly dying enemies into the fade-out collection.
    fn apply_outcome(&mut self, outcome: ResolutionOutcome) {
        self.stats.kill_count += outcome.kills;
        self.stats.coins += outcome.coins;
        self.wave.record_kills(outcome.kills);
        if outcome.ammo_refund > 0 {
            self.player.refund_ammo(outcome.ammo_refund);
        }

        let mut i = 0;
        while i < self.enemies.len() {
            if self.enemies[i].state == EnemyState::Dying {
                let e = self.enemies.swap_remove(i);
                self.dying_enemies.push(e);
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> CombatSim {
        CombatSim::new(SimConfig::default())
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    #[test]
    fn tick_publishes_player_update() {
        let mut sim = sim();
        let out = sim.tick(&idle(), Vec::new());
        let update = out
            .outbound
            .iter()
            .find_map(|m| match m {
                ClientMessage::Update { player } => Some(player.clone()),
                _ => None,
            })
            .expect("every tick publishes an update");
        assert_eq!(update.x, sim.player.x);
        assert_eq!(update.current_weapon, sim.player.weapon);
    }

    #[test]
    fn first_tick_spawns_a_wave() {
        let mut sim = sim();
        sim.tick(&idle(), Vec::new());
        assert_eq!(sim.enemies.len(), wave::POPULATION_CAP);
        assert_eq!(sim.wave.phase, wave::WavePhase::Active);
    }

    #[test]
    fn firing_consumes_ammo_and_emits_shoot_message() {
        let mut sim = sim();
        let input = InputSnapshot {
            fire_held: true,
            ..Default::default()
        };
        let ammo_before = sim.player.ammo;
        let out = sim.tick(&input, Vec::new());
        assert_eq!(sim.player.ammo, ammo_before - 1);
        assert!(out.outbound.iter().any(|m| matches!(m, ClientMessage::Shoot { .. })));
        assert!(out.events.iter().any(|e| matches!(
            e,
            SimEvent::ShotFired { weapon: WeaponKind::Rifle }
        )));
        assert_eq!(sim.player.fire_cooldown, WeaponKind::Rifle.spec().fire_interval);
    }

    #[test]
    fn fire_cooldown_blocks_immediate_refire() {
        let mut sim = sim();
        let input = InputSnapshot {
            fire_held: true,
            ..Default::default()
        };
        sim.tick(&input, Vec::new());
        let ammo_after_first = sim.player.ammo;
        sim.tick(&input, Vec::new());
        assert_eq!(sim.player.ammo, ammo_after_first, "cooldown blocks the second shot");
    }

    #[test]
    fn shotgun_fires_a_full_pellet_volley() {
        let mut sim = sim();
        let input = InputSnapshot {
            select_weapon: Some(WeaponKind::Shotgun),
            fire_pressed: true,
            ..Default::default()
        };
        let out = sim.tick(&input, Vec::new());
        let shoot_count = out
            .outbound
            .iter()
            .filter(|m| matches!(m, ClientMessage::Shoot { .. }))
            .count();
        assert_eq!(shoot_count, WeaponKind::Shotgun.spec().pellets as usize);
    }

    #[test]
    fn empty_magazine_refuses_to_fire() {
        let mut sim = sim();
        sim.player.ammo = 0;
        let input = InputSnapshot {
            fire_held: true,
            ..Default::default()
        };
        let out = sim.tick(&input, Vec::new());
        assert!(out.events.contains(&SimEvent::EmptyMagazine));
        assert!(!out.outbound.iter().any(|m| matches!(m, ClientMessage::Shoot { .. })));
    }

    #[test]
    fn grenade_throw_uses_charge_state() {
        let mut sim = sim();
        let input = InputSnapshot {
            charging_throw: true,
            throw_released: true,
            ..Default::default()
        };
        sim.tick(&input, Vec::new());
        assert!(sim.projectiles.iter().any(|p| matches!(
            p,
            Projectile::Grenade(Grenade { charged: true, .. })
        )));
    }

    #[test]
    fn kills_flow_into_stats_wave_and_dying_list() {
        let mut sim = sim();
        sim.tick(&idle(), Vec::new());
        // Plant an enemy right on the player's aim line.
        sim.enemies[0].x = sim.player.x + 50.0;
        sim.enemies[0].y = sim.player.y;
        sim.player.gun_angle = 0.0;
        let input = InputSnapshot {
            fire_held: true,
            ..Default::default()
        };
        let mut killed = false;
        for _ in 0..40 {
            let (px, py) = (sim.player.x, sim.player.y);
            if let Some(e) = sim.enemies.first_mut() {
                e.x = px + 50.0;
                e.y = py;
            }
            sim.player.health = player::MAX_HEALTH;
            let out = sim.tick(&input, Vec::new());
            if out.events.iter().any(|e| matches!(e, SimEvent::EnemyKilled { .. })) {
                killed = true;
                break;
            }
        }
        assert!(killed, "a bullet along the aim line should land");
        assert_eq!(sim.stats.kill_count, 1);
        assert_eq!(sim.wave.kills, 1);
        assert_eq!(sim.dying_enemies.len(), 1);
        assert!(sim.stats.coins >= 1);
    }

    #[test]
    fn area_strike_flattens_kills_and_cools_down() {
        let mut sim = sim();
        sim.tick(&idle(), Vec::new());
        let enemy_count = sim.enemies.len();
        assert!(enemy_count > 0);
        let input = InputSnapshot {
            area_strike: true,
            ..Default::default()
        };
        let out = sim.tick(&input, Vec::new());
        assert!(out.events.iter().any(|e| matches!(e, SimEvent::AreaStrike { .. })));
        assert_eq!(sim.strike_cooldown, STRIKE_COOLDOWN - 1);
        // Enemies near the player died with credit; the wave machine may
        // have immediately started the break (20 kills) and cleared stragglers.
        assert!(sim.stats.kill_count > 0);

        // A second strike during cooldown is refused.
        let out2 = sim.tick(&input, Vec::new());
        assert!(!out2.events.iter().any(|e| matches!(e, SimEvent::AreaStrike { .. })));
    }

    #[test]
    fn spinning_beams_are_single_use() {
        let mut sim = sim();
        let input = InputSnapshot {
            spinning_beams: true,
            ..Default::default()
        };
        let out = sim.tick(&input, Vec::new());
        assert!(out.events.contains(&SimEvent::SpinningBeamsStarted));
        // Exhaust the beams; keep the player topped up so enemy fire cannot
        // end the run early.
        for _ in 0..projectile::BEAM_DURATION {
            sim.player.health = player::MAX_HEALTH;
            sim.tick(&idle(), Vec::new());
        }
        assert!(sim.spinning_beams.is_none());
        // Even after the cooldown would expire, re-use is denied.
        for _ in 0..projectile::BEAM_COOLDOWN + 10 {
            sim.player.health = player::MAX_HEALTH;
            sim.tick(&idle(), Vec::new());
        }
        let out = sim.tick(&input, Vec::new());
        assert!(!out.events.contains(&SimEvent::SpinningBeamsStarted));
    }

    #[test]
    fn dead_player_ticks_do_not_advance_combat() {
        let mut sim = sim();
        sim.tick(&idle(), Vec::new());
        sim.player.alive = false;
        let enemies_before = sim.enemies.clone();
        let out = sim.tick(
            &InputSnapshot {
                fire_held: true,
                ..Default::default()
            },
            Vec::new(),
        );
        assert!(!out.outbound.iter().any(|m| matches!(m, ClientMessage::Shoot { .. })));
        assert_eq!(sim.enemies, enemies_before, "enemies freeze while the player is down");
    }

    #[test]
    fn world_extends_when_player_reaches_edge() {
        let mut sim = sim();
        let width_before = sim.terrain.world_width();
        sim.player.x = width_before - sim.config.view_width + 10.0;
        sim.tick(&idle(), Vec::new());
        assert_eq!(
            sim.terrain.world_width(),
            width_before + sim.config.world_extension
        );
    }

    #[test]
    fn win_condition_fires_once() {
        let mut sim = sim();
        sim.player.x = sim.config.win_distance * 10.0 + 100.0;
        // Keep the player from being pushed around this tick.
        sim.player.vx = 0.0;
        let out = sim.tick(&idle(), Vec::new());
        assert!(out.events.contains(&SimEvent::SessionWon));
        assert!(sim.stats.won);
        let out2 = sim.tick(&idle(), Vec::new());
        assert!(!out2.events.contains(&SimEvent::SessionWon));
    }

    #[test]
    fn restart_resets_session_state() {
        let mut sim = sim();
        for _ in 0..50 {
            sim.tick(
                &InputSnapshot {
                    fire_held: true,
                    move_right: true,
                    ..Default::default()
                },
                Vec::new(),
            );
        }
        sim.restart();
        assert_eq!(sim.stats, SessionStats::default());
        assert!(sim.enemies.is_empty());
        assert!(sim.projectiles.is_empty());
        assert_eq!(sim.wave.wave, 1);
        assert_eq!(sim.player.ammo, player::MAX_AMMO);
        assert_eq!(sim.terrain.deformed_key_count(), 0);
        assert_eq!(sim.tick_count, 0);
    }

    #[test]
    fn same_seed_same_session() {
        let mut a = sim();
        let mut b = sim();
        let input = InputSnapshot {
            fire_held: true,
            move_right: true,
            ..Default::default()
        };
        for _ in 0..100 {
            a.tick(&input, Vec::new());
            b.tick(&input, Vec::new());
        }
        assert_eq!(a.player, b.player);
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.stats, b.stats);
    }
}
