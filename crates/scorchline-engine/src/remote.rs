use std::collections::HashMap;

use scorchline_core::net::messages::{
    BulletSnapshot, ClientMessage, PlayerSnapshot, RemoteId, ServerMessage,
};

use crate::events::{ExplosionIntensity, SimEvent};
use crate::geom::{self, CornerBox};
use crate::player::{PLAYER_HEIGHT, PLAYER_WIDTH, Player};
use crate::terrain::TerrainField;

/// Damage the local player takes from one remote bullet.
pub const REMOTE_BULLET_DAMAGE: f32 = 10.0;
/// Ticks the local player stays down after a relay `playerDied`.
pub const RESPAWN_HOLD: u32 = 180;

/// Id-keyed tables of the other players and their bullets, owned by the
/// sync boundary. The simulation reads them; only relay messages write
/// them. Authority over remote damage and terrain stays with the relay, so
/// remote bullets resolved here affect nothing but the local player.
#[derive(Debug, Clone, Default)]
pub struct RemoteRoster {
    pub local_id: Option<RemoteId>,
    pub players: HashMap<RemoteId, PlayerSnapshot>,
    pub bullets: HashMap<RemoteId, BulletSnapshot>,
}

impl RemoteRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.local_id.is_some()
    }

    /// Fold one relay message into the roster. Messages about unknown ids
    /// are stale and silently ignored.
    pub fn apply(&mut self, msg: ServerMessage, player: &mut Player, events: &mut Vec<SimEvent>) {
        match msg {
            ServerMessage::Init { id, players, bullets } => {
                self.players = players;
                self.players.remove(&id);
                self.bullets = bullets;
                self.local_id = Some(id);
            },
            ServerMessage::NewPlayer { player: snapshot } => {
                self.players.insert(snapshot.id.clone(), snapshot);
            },
            ServerMessage::UpdatePlayer { player: snapshot } => {
                if let Some(existing) = self.players.get_mut(&snapshot.id) {
                    *existing = snapshot;
                }
            },
            ServerMessage::RemovePlayer { id } => {
                self.players.remove(&id);
            },
            ServerMessage::NewBullet { bullet } => {
                self.bullets.insert(bullet.id.clone(), bullet);
            },
            ServerMessage::UpdateBullet { bullet } => {
                if let Some(existing) = self.bullets.get_mut(&bullet.id) {
                    *existing = bullet;
                }
            },
            ServerMessage::RemoveBullet { id } => {
                self.bullets.remove(&id);
            },
            ServerMessage::PlayerHit { id, health } => {
                if self.local_id.as_ref() == Some(&id) {
                    player.health = health;
                    events.push(SimEvent::PlayerDamaged { health });
                    if health <= 0.0 {
                        player.alive = false;
                    }
                }
            },
            ServerMessage::PlayerDied { id } => {
                if self.local_id.as_ref() == Some(&id) {
                    player.alive = false;
                    player.respawn_hold = RESPAWN_HOLD;
                    events.push(SimEvent::PlayerDied);
                }
            },
            ServerMessage::PlayerRespawn { player: snapshot } => {
                if self.local_id.as_ref() == Some(&snapshot.id) {
                    player.x = snapshot.x;
                    player.y = snapshot.y;
                    player.health = snapshot.health;
                    player.alive = true;
                    player.respawn_hold = 0;
                    events.push(SimEvent::PlayerRespawned);
                } else if let Some(existing) = self.players.get_mut(&snapshot.id) {
                    *existing = snapshot;
                }
            },
        }
    }

    /// Advance every remote bullet under the same terrain rules as local
    /// ones, but resolve hits only against the local player. Terrain
    /// contact removes the bullet without deforming; deformation authority
    /// for remote fire belongs to the relay.
    pub fn tick_bullets(
        &mut self,
        terrain: &TerrainField,
        player: &mut Player,
        world_width: f32,
        view_height: f32,
        outbound: &mut Vec<ClientMessage>,
        events: &mut Vec<SimEvent>,
    ) {
        let local_id = self.local_id.clone();
        let player_box = CornerBox {
            x: player.x - PLAYER_WIDTH / 2.0,
            y: player.y - PLAYER_HEIGHT / 2.0,
            w: PLAYER_WIDTH,
            h: PLAYER_HEIGHT,
        };

        let mut removed: Vec<RemoteId> = Vec::new();
        for (id, bullet) in self.bullets.iter_mut() {
            bullet.x += bullet.dx;
            bullet.y += bullet.dy;

            if bullet.y >= terrain.height_at(bullet.x) {
                events.push(SimEvent::Explosion {
                    x: bullet.x,
                    y: bullet.y,
                    intensity: ExplosionIntensity::Impact,
                });
                removed.push(id.clone());
                continue;
            }

            let own_bullet = local_id.as_ref() == Some(&bullet.player_id);
            if !own_bullet
                && player.alive
                && geom::point_in_box(bullet.x, bullet.y, player_box)
            {
                player.damage(REMOTE_BULLET_DAMAGE);
                events.push(SimEvent::PlayerDamaged {
                    health: player.health,
                });
                if !player.alive {
                    events.push(SimEvent::PlayerDied);
                }
                if let Some(target) = local_id.clone() {
                    outbound.push(ClientMessage::PlayerHit { target_id: target });
                }
                removed.push(id.clone());
                continue;
            }

            if bullet.x < 0.0 || bullet.x > world_width || bullet.y < 0.0 || bullet.y > view_height
            {
                removed.push(id.clone());
            }
        }

        for id in removed {
            self.bullets.remove(&id);
            outbound.push(ClientMessage::BulletRemove { id });
        }
    }
}
