//! Cubic bezier edges.

use glam::DVec2;

use super::{EdgePath, Num};
use crate::geometry::{Side, Vector2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierOptions {
    pub source_side: Side,
    pub target_side: Side,
    /// Pull strength for endpoints that face away from each other.
    pub curvature: f64,
}

impl Default for BezierOptions {
    fn default() -> Self {
        Self {
            source_side: Side::Bottom,
            target_side: Side::Top,
            curvature: 0.25,
        }
    }
}

fn control_offset(distance: f64, curvature: f64) -> f64 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        curvature * 25.0 * (-distance).sqrt()
    }
}

/// Control point for `from`, pulled along `side` relative to `to`.
fn control_point(side: Side, from: Vector2, to: Vector2, curvature: f64) -> Vector2 {
    match side {
        Side::Left => Vector2::new(from.x - control_offset(from.x - to.x, curvature), from.y),
        Side::Right => Vector2::new(from.x + control_offset(to.x - from.x, curvature), from.y),
        Side::Top => Vector2::new(from.x, from.y - control_offset(from.y - to.y, curvature)),
        Side::Bottom => Vector2::new(from.x, from.y + control_offset(to.y - from.y, curvature)),
    }
}

/// Curve point at t = 0.5. Not the arc-length midpoint, but O(1).
fn bezier_center(
    source: Vector2,
    source_control: Vector2,
    target_control: Vector2,
    target: Vector2,
) -> (Vector2, Vector2) {
    let source = DVec2::from(source);
    let center = source * 0.125
        + DVec2::from(source_control) * 0.375
        + DVec2::from(target_control) * 0.375
        + DVec2::from(target) * 0.125;
    (center.into(), (center - source).abs().into())
}

/// Build a cubic bezier edge from `source` to `target`.
///
/// ```
/// use nodal::geometry::{Side, Vector2};
/// use nodal::path::{bezier_path, BezierOptions};
///
/// let edge = bezier_path(
///     Vector2::new(0.0, 20.0),
///     Vector2::new(150.0, 100.0),
///     &BezierOptions { source_side: Side::Right, target_side: Side::Left, ..Default::default() },
/// );
/// assert_eq!(edge.path, "M0,20 C75,20 75,100 150,100");
/// ```
pub fn bezier_path(source: Vector2, target: Vector2, opts: &BezierOptions) -> EdgePath {
    let source_control = control_point(opts.source_side, source, target, opts.curvature);
    let target_control = control_point(opts.target_side, target, source, opts.curvature);
    let (label, offset) = bezier_center(source, source_control, target_control, target);

    let path = format!(
        "M{},{} C{},{} {},{} {},{}",
        Num(source.x),
        Num(source.y),
        Num(source_control.x),
        Num(source_control.y),
        Num(target_control.x),
        Num(target_control.y),
        Num(target.x),
        Num(target.y),
    );

    EdgePath {
        path,
        label,
        offset,
    }
}
