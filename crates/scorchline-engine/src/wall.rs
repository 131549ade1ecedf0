use crate::geom::{self, CenterBox};

pub const WALL_WIDTH: f32 = 5.0;
pub const WALL_HEIGHT: f32 = 60.0;
pub const WALL_HEALTH: u32 = 5;
/// How far ahead of the player a new wall is placed, along the aim angle.
pub const WALL_PLACE_DISTANCE: f32 = 50.0;

/// A placed barricade. `x` is the horizontal center while `y` is the top
/// edge; the two axes deliberately use different anchors and the collision
/// helpers below encode that asymmetry.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub health: u32,
}

impl Wall {
    /// Place a wall ahead of (px, py) along the aim angle.
    pub fn place_ahead(px: f32, py: f32, aim_angle: f32) -> Self {
        let x = px + aim_angle.cos() * WALL_PLACE_DISTANCE;
        let y = py + aim_angle.sin() * WALL_PLACE_DISTANCE - WALL_HEIGHT / 2.0;
        Self {
            x,
            y,
            width: WALL_WIDTH,
            height: WALL_HEIGHT,
            rotation: std::f32::consts::FRAC_PI_2,
            health: WALL_HEALTH,
        }
    }

    /// Whether an entity whose center is at (cx, cy) is inside the wall's
    /// blocking area.
    pub fn blocks(&self, cx: f32, cy: f32) -> bool {
        cx > self.x - self.width / 2.0
            && cx < self.x + self.width / 2.0
            && cy > self.y
            && cy < self.y + self.height
    }

    /// Whether a projectile segment crosses the (rotated) wall.
    pub fn segment_hits(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        geom::segment_intersects_rotated_box(
            x1,
            y1,
            x2,
            y2,
            self.x,
            self.y,
            self.width,
            self.height,
            self.rotation,
        )
    }

    /// Contact test for ballistic projectiles (grenades).
    pub fn ballistic_contact(&self, gx: f32, gy: f32) -> bool {
        (gx - self.x).abs() < self.width / 2.0 && gy > self.y && gy < self.y + self.height
    }
}

/// Whether any wall blocks an entity box whose center is the box center.
pub fn any_blocks(walls: &[Wall], entity: CenterBox) -> bool {
    walls.iter().any(|w| w.blocks(entity.cx, entity.cy))
}
