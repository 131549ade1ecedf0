pub mod input;
pub mod net;
pub mod weapon;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::collections::HashMap;

    use crate::input::InputSnapshot;
    use crate::net::messages::{BulletSnapshot, PlayerSnapshot, RemoteId, ServerMessage};
    use crate::weapon::WeaponKind;

    /// Create a remote player snapshot with the given id at (x, y).
    pub fn make_player_snapshot(id: &str, x: f32, y: f32) -> PlayerSnapshot {
        PlayerSnapshot {
            id: id.to_string(),
            x,
            y,
            speed_x: 0.0,
            speed_y: 0.0,
            gun_angle: 0.0,
            health: 100.0,
            current_weapon: WeaponKind::Rifle,
        }
    }

    /// Create a remote bullet snapshot moving with velocity (dx, dy).
    pub fn make_bullet_snapshot(id: &str, owner: &str, x: f32, y: f32, dx: f32, dy: f32) -> BulletSnapshot {
        BulletSnapshot {
            id: id.to_string(),
            player_id: owner.to_string(),
            x,
            y,
            dx,
            dy,
            color: "#FF0000".to_string(),
        }
    }

    /// Build an `init` message assigning `local_id` with the given remote roster.
    pub fn make_init(local_id: &str, remotes: &[PlayerSnapshot]) -> ServerMessage {
        let players: HashMap<RemoteId, PlayerSnapshot> = remotes
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();
        ServerMessage::Init {
            id: local_id.to_string(),
            players,
            bullets: HashMap::new(),
        }
    }

    /// An input snapshot holding only the aim angle; everything else released.
    pub fn aim_only(angle: f32) -> InputSnapshot {
        InputSnapshot {
            aim_angle: angle,
            ..InputSnapshot::default()
        }
    }
}
