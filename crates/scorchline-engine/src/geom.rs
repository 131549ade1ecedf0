//! Pure intersection primitives.
//!
//! Two box representations coexist on purpose: [`CornerBox`] (top-left +
//! extents, used for point containment and AABB overlap) and [`CenterBox`]
//! (center + extents, used for segment tests against entities). Collision
//! behavior depends on which one a call site uses, so they are distinct
//! types rather than one box with a convention flag.

/// Axis-aligned box in top-left + extents form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Axis-aligned box in center + extents form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterBox {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl CenterBox {
    pub fn to_corner(self) -> CornerBox {
        CornerBox {
            x: self.cx - self.w / 2.0,
            y: self.cy - self.h / 2.0,
            w: self.w,
            h: self.h,
        }
    }
}

/// Half-open point containment: the left/top edges are inside, the
/// right/bottom edges are not.
pub fn point_in_box(px: f32, py: f32, b: CornerBox) -> bool {
    px >= b.x && px < b.x + b.w && py >= b.y && py < b.y + b.h
}

/// Overlap test between two corner-form boxes.
pub fn boxes_overlap(a: CornerBox, b: CornerBox) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Parametric segment/segment intersection. A denominator of exactly zero
/// (parallel or coincident segments) is defined as no intersection.
#[allow(clippy::too_many_arguments)]
pub fn segments_intersect(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    x3: f32,
    y3: f32,
    x4: f32,
    y4: f32,
) -> bool {
    let denominator = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denominator == 0.0 {
        return false;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denominator;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denominator;

    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Segment against a center-form box: containment of either endpoint, then
/// the four box edges.
pub fn segment_intersects_box(x1: f32, y1: f32, x2: f32, y2: f32, b: CenterBox) -> bool {
    let corner = b.to_corner();
    if point_in_box(x1, y1, corner) || point_in_box(x2, y2, corner) {
        return true;
    }

    let (bx, by, bw, bh) = (corner.x, corner.y, corner.w, corner.h);
    let edges = [
        (bx, by, bx + bw, by),           // top
        (bx + bw, by, bx + bw, by + bh), // right
        (bx + bw, by + bh, bx, by + bh), // bottom
        (bx, by + bh, bx, by),           // left
    ];

    edges
        .iter()
        .any(|&(x3, y3, x4, y4)| segments_intersect(x1, y1, x2, y2, x3, y3, x4, y4))
}

/// Segment against a box rotated by `rotation` about (cx, cy): the segment
/// is inverse-rotated into the box's local frame, then tested axis-aligned.
#[allow(clippy::too_many_arguments)]
pub fn segment_intersects_rotated_box(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    cx: f32,
    cy: f32,
    w: f32,
    h: f32,
    rotation: f32,
) -> bool {
    let (sin, cos) = (-rotation).sin_cos();
    let rotate = |px: f32, py: f32| {
        let rx = px - cx;
        let ry = py - cy;
        (rx * cos - ry * sin, rx * sin + ry * cos)
    };
    let (lx1, ly1) = rotate(x1, y1);
    let (lx2, ly2) = rotate(x2, y2);
    segment_intersects_box(
        lx1,
        ly1,
        lx2,
        ly2,
        CenterBox {
            cx: 0.0,
            cy: 0.0,
            w,
            h,
        },
    )
}

/// Smallest signed difference between two angles, wrapped to [-PI, PI].
pub fn angle_delta(a: f32, b: f32) -> f32 {
    let mut d = (a - b) % (2.0 * std::f32::consts::PI);
    if d > std::f32::consts::PI {
        d -= 2.0 * std::f32::consts::PI;
    } else if d < -std::f32::consts::PI {
        d += 2.0 * std::f32::consts::PI;
    }
    d
}
