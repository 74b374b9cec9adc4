//! Points, sides and angle helpers shared by the path generators and the
//! anchor resolver.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, TAU};

/// A point or direction in a surface's local coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        DVec2::from(self).distance(other.into())
    }

    /// Component-wise clamp into the unit square.
    pub fn clamp_unit(self) -> Self {
        DVec2::from(self).clamp(DVec2::ZERO, DVec2::ONE).into()
    }
}

impl From<DVec2> for Vector2 {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector2> for DVec2 {
    fn from(v: Vector2) -> Self {
        DVec2::new(v.x, v.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Fractional positions inside an element's quad.
pub struct Anchor;

impl Anchor {
    pub const TOP_LEFT: Vector2 = Vector2::new(0.0, 0.0);
    pub const TOP_RIGHT: Vector2 = Vector2::new(1.0, 0.0);
    pub const BOTTOM_LEFT: Vector2 = Vector2::new(0.0, 1.0);
    pub const BOTTOM_RIGHT: Vector2 = Vector2::new(1.0, 1.0);
    pub const CENTER_LEFT: Vector2 = Vector2::new(0.0, 0.5);
    pub const CENTER_RIGHT: Vector2 = Vector2::new(1.0, 0.5);
    pub const CENTER_TOP: Vector2 = Vector2::new(0.5, 0.0);
    pub const CENTER_BOTTOM: Vector2 = Vector2::new(0.5, 1.0);
    pub const CENTER_CENTER: Vector2 = Vector2::new(0.5, 0.5);
}

/// Compass direction an edge leaves or enters an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Right,
    Top,
    Left,
    Bottom,
}

impl Side {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "left" => Some(Self::Left),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Top => "top",
            Self::Left => "left",
            Self::Bottom => "bottom",
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn normalise_angle(r: f64) -> f64 {
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    let a = r.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Outward unit vector for a side, with y increasing upward.
pub fn side_to_unit_vector2(side: Side) -> Vector2 {
    match side {
        Side::Top => Vector2::new(0.0, 1.0),
        Side::Left => Vector2::new(-1.0, 0.0),
        Side::Right => Vector2::new(1.0, 0.0),
        Side::Bottom => Vector2::new(0.0, -1.0),
    }
}

/// Side whose 90° sector contains the angle. Sector boundaries sit on odd
/// multiples of π/4 and belong to the sector that starts there.
pub fn side_for_angle(rad: f64) -> Side {
    let a = normalise_angle(rad);
    if a >= 7.0 * FRAC_PI_4 || a < FRAC_PI_4 {
        Side::Right
    } else if a < 3.0 * FRAC_PI_4 {
        Side::Top
    } else if a < 5.0 * FRAC_PI_4 {
        Side::Left
    } else {
        Side::Bottom
    }
}

pub fn unit_vector_from_angle(rad: f64) -> Vector2 {
    Vector2::new(rad.cos(), rad.sin())
}

/// Side an anchor faces, measured from the element's center with y up.
/// Returns `None` for the center itself.
pub fn side_for_anchor(anchor: Vector2) -> Option<Side> {
    let dx = anchor.x - 0.5;
    let dy = 0.5 - anchor.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(side_for_angle(dy.atan2(dx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_normalise_negative_angle() {
        assert_relative_eq!(normalise_angle(-FRAC_PI_4), 7.0 * FRAC_PI_4);
        assert_relative_eq!(normalise_angle(5.0 * PI), PI);
        assert_eq!(normalise_angle(0.0), 0.0);
    }

    #[test]
    fn test_side_for_cardinal_angles() {
        assert_eq!(side_for_angle(0.0), Side::Right);
        assert_eq!(side_for_angle(PI / 2.0), Side::Top);
        assert_eq!(side_for_angle(PI), Side::Left);
        assert_eq!(side_for_angle(3.0 * PI / 2.0), Side::Bottom);
        assert_eq!(side_for_angle(-PI / 2.0), Side::Bottom);
    }

    #[test]
    fn test_side_sector_boundaries() {
        assert_eq!(side_for_angle(FRAC_PI_4), Side::Top);
        assert_eq!(side_for_angle(3.0 * FRAC_PI_4), Side::Left);
        assert_eq!(side_for_angle(5.0 * FRAC_PI_4), Side::Bottom);
        assert_eq!(side_for_angle(7.0 * FRAC_PI_4), Side::Right);
        assert_eq!(side_for_angle(FRAC_PI_4 - 1e-9), Side::Right);
    }

    #[test]
    fn test_unit_vectors_point_outward() {
        assert_eq!(side_to_unit_vector2(Side::Top), Vector2::new(0.0, 1.0));
        assert_eq!(side_to_unit_vector2(Side::Bottom), Vector2::new(0.0, -1.0));
        assert_eq!(side_to_unit_vector2(Side::Left), Vector2::new(-1.0, 0.0));
        assert_eq!(side_to_unit_vector2(Side::Right), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_unit_vector_agrees_with_side() {
        for side in [Side::Right, Side::Top, Side::Left, Side::Bottom] {
            let v = side_to_unit_vector2(side);
            assert_eq!(side_for_angle(v.y.atan2(v.x)), side);
        }
        let v = unit_vector_from_angle(PI / 2.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 1.0);
    }

    #[test]
    fn test_side_for_anchor() {
        assert_eq!(side_for_anchor(Anchor::CENTER_RIGHT), Some(Side::Right));
        assert_eq!(side_for_anchor(Anchor::CENTER_TOP), Some(Side::Top));
        assert_eq!(side_for_anchor(Anchor::CENTER_LEFT), Some(Side::Left));
        assert_eq!(side_for_anchor(Anchor::CENTER_BOTTOM), Some(Side::Bottom));
        assert_eq!(side_for_anchor(Anchor::CENTER_CENTER), None);
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(Vector2::new(-1.0, 2.0).clamp_unit(), Vector2::new(0.0, 1.0));
        assert_eq!(Vector2::new(0.25, 0.5).clamp_unit(), Vector2::new(0.25, 0.5));
    }

    #[test]
    fn test_dvec2_conversion() {
        let v = Vector2::new(3.0, -4.0);
        let d: DVec2 = v.into();
        assert_eq!(d, DVec2::new(3.0, -4.0));
        assert_eq!(Vector2::from(d), v);
        assert_eq!(Vector2::ZERO.distance(v), 5.0);
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!(Side::from_str("Left"), Some(Side::Left));
        assert_eq!(Side::from_str("up"), None);
    }
}
