// File: crates/chart-drawings/src/geometry.rs
// Summary: Lightweight geometry helpers for pixel math (points, rects, segment distance).

/// A point in pane pixel space (CSS or device, depending on the caller).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Pt {
    pub x: f64,
    pub y: f64,
}

impl Pt {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    pub fn distance_to(self, other: Pt) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn scaled(self, ratio: f64) -> Self {
        Self { x: self.x * ratio, y: self.y * ratio }
    }

    pub fn midpoint(self, other: Pt) -> Self {
        Self { x: (self.x + other.x) * 0.5, y: (self.y + other.y) * 0.5 }
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectF {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl RectF {
    pub const fn from_ltwh(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, right: left + width, bottom: top + height }
    }
    /// Rectangle spanning two y values (in any order) between `left` and `right`.
    pub fn between_ys(left: f64, right: f64, y_a: f64, y_b: f64) -> Self {
        Self { left, top: y_a.min(y_b), right, bottom: y_a.max(y_b) }
    }
    pub fn contains(&self, p: Pt) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

#[inline]
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo { lo } else if v > hi { hi } else { v }
}

/// Distance from `p` to the segment `a`-`b`, projecting onto the segment with
/// the parameter clamped to `[0, 1]`. A zero-length segment degrades to point distance.
pub fn distance_to_segment(p: Pt, a: Pt, b: Pt) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p.distance_to(a);
    }
    let t = clamp(((p.x - a.x) * dx + (p.y - a.y) * dy) / len2, 0.0, 1.0);
    p.distance_to(Pt::new(a.x + t * dx, a.y + t * dy))
}

/// Screen-space angle of `a`->`b` in degrees, counter-clockwise positive (y grows downward).
pub fn screen_angle_deg(a: Pt, b: Pt) -> f64 {
    (-(b.y - a.y)).atan2(b.x - a.x).to_degrees()
}
