use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::weapon::WeaponKind;

/// Relay-assigned entity identifier. Opaque to the client.
pub type RemoteId = String;

/// A remote player's state as carried by `init`/`newPlayer`/`updatePlayer`/
/// `playerRespawn`. Field names are the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: RemoteId,
    pub x: f32,
    pub y: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub gun_angle: f32,
    pub health: f32,
    pub current_weapon: WeaponKind,
}

/// A remote bullet as carried by `init`/`newBullet`/`updateBullet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletSnapshot {
    pub id: RemoteId,
    /// Owning player, used to skip self-hits when resolving locally.
    pub player_id: RemoteId,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub color: String,
}

/// The local player's state published once per tick in `update` messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub x: f32,
    pub y: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub gun_angle: f32,
    pub health: f32,
    pub current_weapon: WeaponKind,
}

/// Messages received from the relay. The `type` field discriminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full roster sent once at connection start.
    Init {
        id: RemoteId,
        players: HashMap<RemoteId, PlayerSnapshot>,
        bullets: HashMap<RemoteId, BulletSnapshot>,
    },
    NewPlayer { player: PlayerSnapshot },
    UpdatePlayer { player: PlayerSnapshot },
    RemovePlayer { id: RemoteId },
    NewBullet { bullet: BulletSnapshot },
    UpdateBullet { bullet: BulletSnapshot },
    RemoveBullet { id: RemoteId },
    /// Authoritative health after a hit on the identified player.
    PlayerHit { id: RemoteId, health: f32 },
    PlayerDied { id: RemoteId },
    PlayerRespawn { player: PlayerSnapshot },
}

/// Messages sent to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Per-tick local player state.
    Update { player: PlayerUpdate },
    /// A locally fired bullet; the relay assigns its id.
    Shoot { x: f32, y: f32, dx: f32, dy: f32, color: String },
    /// A remote bullet resolved locally (terrain, player hit, out of bounds).
    BulletRemove { id: RemoteId },
    /// The local player took a remote bullet hit.
    PlayerHit { target_id: RemoteId },
}
