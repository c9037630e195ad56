//! Integer geometry used across the toolkit.
//!
//! Widget positions are explicit pixel coordinates, so everything here is
//! `i32`-based. The only hit-test primitive in the whole tree is
//! [`Rect::contains_with_margin`]; every dispatch level uses it so touch
//! behavior stays uniform.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn contains(&self, p: Point) -> bool {
        self.contains_with_margin(p, 0)
    }

    /// Axis-aligned test inflated by a touch-area margin. The comparison is
    /// strict on all four edges, matching how the widget tree has always
    /// hit-tested (a point exactly on the unexpanded edge misses).
    pub fn contains_with_margin(&self, p: Point, margin: i32) -> bool {
        p.x > self.x - margin
            && p.x < self.x + self.w + margin
            && p.y > self.y - margin
            && p.y < self.y + self.h + margin
    }

    /// Intersection with `other`; degenerate (empty) results collapse to a
    /// zero-sized rect at the clamped origin.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        Rect {
            x,
            y,
            w: (r - x).max(0),
            h: (b - y).max(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

fn float_mod(a: f32, b: f32) -> f32 {
    a - b * (a / b).floor()
}

/// Wrap an angle into (0, 360].
pub fn constrain_angle(angle: f32) -> f32 {
    let a = float_mod(angle, 360.0);
    if a <= 0.0 {
        a + 360.0
    } else {
        a
    }
}

/// Signed shortest difference between two angles, in (-180, 180].
pub fn angle_diff(from: f32, to: f32) -> f32 {
    let mut dif = float_mod(to - from + 180.0, 360.0);
    if dif < 0.0 {
        dif += 360.0;
    }
    dif - 180.0
}
