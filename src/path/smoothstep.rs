//! Orthogonal edges with rounded bends.
//!
//! Each endpoint leaves along its side for `offset` units before the gapped
//! points are joined by one or two axis-aligned waypoints. Interior vertices
//! are rounded with a quadratic bend. Coordinates are screen space (y grows
//! downward).

use glam::DVec2;

use super::{EdgePath, Num};
use crate::geometry::{Side, Vector2};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothStepOptions {
    pub source_side: Side,
    pub target_side: Side,
    /// Maximum radius of a rounded bend.
    pub border_radius: f64,
    /// Overrides the x of the vertical split between opposing handles.
    pub center_x: Option<f64>,
    /// Overrides the y of the horizontal split between opposing handles.
    pub center_y: Option<f64>,
    /// Length of the straight stub leaving each endpoint before the first turn.
    pub offset: f64,
}

impl Default for SmoothStepOptions {
    fn default() -> Self {
        Self {
            source_side: Side::Bottom,
            target_side: Side::Top,
            border_radius: 5.0,
            center_x: None,
            center_y: None,
            offset: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, v: DVec2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    fn set(self, v: &mut DVec2, value: f64) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
        }
    }

    fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

fn handle_direction(side: Side) -> DVec2 {
    match side {
        Side::Left => DVec2::NEG_X,
        Side::Right => DVec2::X,
        Side::Top => DVec2::NEG_Y,
        Side::Bottom => DVec2::Y,
    }
}

fn travel_direction(source: DVec2, source_side: Side, target: DVec2) -> DVec2 {
    if source_side.is_horizontal() {
        if source.x < target.x { DVec2::X } else { DVec2::NEG_X }
    } else if source.y < target.y {
        DVec2::Y
    } else {
        DVec2::NEG_Y
    }
}

/// Midpoint of the two endpoints and half their distance on each axis.
fn edge_center(source: DVec2, target: DVec2) -> (DVec2, DVec2) {
    let x_offset = (target.x - source.x).abs() / 2.0;
    let center_x = if target.x < source.x {
        target.x + x_offset
    } else {
        target.x - x_offset
    };
    let y_offset = (target.y - source.y).abs() / 2.0;
    let center_y = if target.y < source.y {
        target.y + y_offset
    } else {
        target.y - y_offset
    };
    (
        DVec2::new(center_x, center_y),
        DVec2::new(x_offset, y_offset),
    )
}

struct Route {
    points: Vec<DVec2>,
    label: DVec2,
    offset: DVec2,
}

fn route(source: DVec2, target: DVec2, opts: &SmoothStepOptions) -> Route {
    let offset = opts.offset;
    let source_dir = handle_direction(opts.source_side);
    let target_dir = handle_direction(opts.target_side);
    let source_gapped = source + source_dir * offset;
    let target_gapped = target + target_dir * offset;

    let dir = travel_direction(source_gapped, opts.source_side, target_gapped);
    let axis = if dir.x != 0.0 { Axis::X } else { Axis::Y };
    let curr_dir = axis.of(dir);

    let (default_center, default_offset) = edge_center(source, target);
    let mut source_gap_offset = DVec2::ZERO;
    let mut target_gap_offset = DVec2::ZERO;

    let waypoints: Vec<DVec2>;
    let label: DVec2;

    if axis.of(source_dir) * axis.of(target_dir) == -1.0 {
        // opposing handles
        let center_x = opts.center_x.unwrap_or(default_center.x);
        let center_y = opts.center_y.unwrap_or(default_center.y);
        //    --->
        //    |
        // >---
        let vertical_split = vec![
            DVec2::new(center_x, source_gapped.y),
            DVec2::new(center_x, target_gapped.y),
        ];
        //    |
        //  ---
        //  |
        let horizontal_split = vec![
            DVec2::new(source_gapped.x, center_y),
            DVec2::new(target_gapped.x, center_y),
        ];

        let along = axis.of(source_dir) == curr_dir;
        waypoints = match (axis, along) {
            (Axis::X, true) | (Axis::Y, false) => vertical_split,
            (Axis::X, false) | (Axis::Y, true) => horizontal_split,
        };
        label = DVec2::new(center_x, center_y);
    } else {
        // x from the source and y from the target, or the reverse
        let source_target = DVec2::new(source_gapped.x, target_gapped.y);
        let target_source = DVec2::new(target_gapped.x, source_gapped.y);

        let mut corner = match axis {
            Axis::X if source_dir.x == curr_dir => target_source,
            Axis::X => source_target,
            Axis::Y if source_dir.y == curr_dir => source_target,
            Axis::Y => target_source,
        };

        if opts.source_side == opts.target_side {
            // Same-side endpoints closer than the stub would make the corner
            // overlap a gapped point, so pull the trailing one back.
            let diff = (axis.of(source) - axis.of(target)).abs();
            if diff <= offset {
                let gap_offset = (offset - 1.0).min(offset - diff);
                if axis.of(source_dir) == curr_dir {
                    let sign = if axis.of(source_gapped) > axis.of(source) { -1.0 } else { 1.0 };
                    axis.set(&mut source_gap_offset, sign * gap_offset);
                } else {
                    let sign = if axis.of(target_gapped) > axis.of(target) { -1.0 } else { 1.0 };
                    axis.set(&mut target_gap_offset, sign * gap_offset);
                }
            }
        } else {
            // mixed sides, e.g. Right -> Bottom
            let opposite = axis.other();
            let is_same_dir = axis.of(source_dir) == opposite.of(target_dir);
            let source_gt = opposite.of(source_gapped) > opposite.of(target_gapped);
            let source_lt = opposite.of(source_gapped) < opposite.of(target_gapped);
            let flip = if axis.of(source_dir) == 1.0 {
                (!is_same_dir && source_gt) || (is_same_dir && source_lt)
            } else {
                (!is_same_dir && source_lt) || (is_same_dir && source_gt)
            };
            if flip {
                corner = match axis {
                    Axis::X => source_target,
                    Axis::Y => target_source,
                };
            }
        }

        let source_gap_point = source_gapped + source_gap_offset;
        let target_gap_point = target_gapped + target_gap_offset;
        let max_x = (source_gap_point.x - corner.x)
            .abs()
            .max((target_gap_point.x - corner.x).abs());
        let max_y = (source_gap_point.y - corner.y)
            .abs()
            .max((target_gap_point.y - corner.y).abs());

        // label goes on the longest segment
        label = if max_x >= max_y {
            DVec2::new((source_gap_point.x + target_gap_point.x) / 2.0, corner.y)
        } else {
            DVec2::new(corner.x, (source_gap_point.y + target_gap_point.y) / 2.0)
        };
        waypoints = vec![corner];
    }

    let mut points = Vec::with_capacity(waypoints.len() + 4);
    points.push(source);
    points.push(source_gapped + source_gap_offset);
    points.extend(waypoints);
    points.push(target_gapped + target_gap_offset);
    points.push(target);

    Route {
        points,
        label,
        offset: default_offset,
    }
}

/// Round the corner at `b` between segments `a-b` and `b-c`.
fn write_bend(out: &mut String, a: DVec2, b: DVec2, c: DVec2, size: f64) {
    let bend = (a.distance(b) / 2.0).min(b.distance(c) / 2.0).min(size);
    let DVec2 { x, y } = b;

    if (a.x == x && x == c.x) || (a.y == y && y == c.y) {
        let _ = write!(out, "L{} {}", Num(x), Num(y));
        return;
    }

    if a.y == y {
        // first segment is horizontal
        let x_dir = if a.x < c.x { -1.0 } else { 1.0 };
        let y_dir = if a.y < c.y { 1.0 } else { -1.0 };
        let _ = write!(
            out,
            "L {},{}Q {},{} {},{}",
            Num(x + bend * x_dir),
            Num(y),
            Num(x),
            Num(y),
            Num(x),
            Num(y + bend * y_dir)
        );
    } else {
        let x_dir = if a.x < c.x { 1.0 } else { -1.0 };
        let y_dir = if a.y < c.y { -1.0 } else { 1.0 };
        let _ = write!(
            out,
            "L {},{}Q {},{} {},{}",
            Num(x),
            Num(y + bend * y_dir),
            Num(x),
            Num(y),
            Num(x + bend * x_dir),
            Num(y)
        );
    }
}

/// Build an orthogonal edge from `source` to `target` with rounded bends.
pub fn smooth_step_path(source: Vector2, target: Vector2, opts: &SmoothStepOptions) -> EdgePath {
    let Route {
        points,
        label,
        offset,
    } = route(source.into(), target.into(), opts);

    let mut path = String::new();
    let last = points.len() - 1;
    for (i, p) in points.iter().enumerate() {
        if i > 0 && i < last {
            write_bend(&mut path, points[i - 1], *p, points[i + 1], opts.border_radius);
        } else {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(path, "{}{} {}", cmd, Num(p.x), Num(p.y));
        }
    }

    EdgePath {
        path,
        label: label.into(),
        offset: offset.into(),
    }
}
