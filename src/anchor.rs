//! Resolving fractional anchors on host elements to surface coordinates.

use glam::{DAffine2, DVec2};

use crate::geometry::Vector2;

/// Axis-aligned rectangle in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Four corners of an element's box, clockwise from top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub p1: Vector2,
    pub p2: Vector2,
    pub p3: Vector2,
    pub p4: Vector2,
}

impl Quad {
    pub fn from_rect(r: &Rect) -> Self {
        Self {
            p1: Vector2::new(r.left, r.top),
            p2: Vector2::new(r.right(), r.top),
            p3: Vector2::new(r.right(), r.bottom()),
            p4: Vector2::new(r.left, r.bottom()),
        }
    }

    /// Bilinear interpolation across the corners. `anchor` is clamped to the
    /// unit square first.
    pub fn interpolate(&self, anchor: Vector2) -> Vector2 {
        let Vector2 { x: ax, y: ay } = anchor.clamp_unit();
        let p = DVec2::from(self.p1) * ((1.0 - ax) * (1.0 - ay))
            + DVec2::from(self.p2) * (ax * (1.0 - ay))
            + DVec2::from(self.p3) * (ax * ay)
            + DVec2::from(self.p4) * ((1.0 - ax) * ay);
        p.into()
    }

    /// Every corner mapped through `m`.
    pub fn transformed(&self, m: &DAffine2) -> Self {
        Self {
            p1: transform_point(m, self.p1),
            p2: transform_point(m, self.p2),
            p3: transform_point(m, self.p3),
            p4: transform_point(m, self.p4),
        }
    }
}

/// `None` for singular (or non-finite) transforms.
pub fn invert(m: &DAffine2) -> Option<DAffine2> {
    let det = m.matrix2.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some(m.inverse())
}

pub fn transform_point(m: &DAffine2, p: Vector2) -> Vector2 {
    m.transform_point2(p.into()).into()
}

/// Geometry a host element exposes for anchoring.
pub trait AnchorElement {
    /// Transformed box quad, when the host can report one.
    fn box_quads(&self) -> Option<Quad> {
        None
    }

    fn bounding_client_rect(&self) -> Rect;

    /// Position relative to the offset parent (the surface container).
    fn offset_position(&self) -> Vector2;

    /// Untransformed inner size.
    fn client_size(&self) -> Vector2;

    /// Quad the element occupies in client space, falling back to its
    /// bounding rectangle.
    fn quad(&self) -> Quad {
        self.box_quads()
            .unwrap_or_else(|| Quad::from_rect(&self.bounding_client_rect()))
    }
}

/// The drawing surface anchors are resolved into.
pub trait SurfaceElement {
    /// Transform from the surface's local space to client space.
    fn screen_ctm(&self) -> Option<DAffine2>;
}

/// Map a client-space point into the surface's local space. Without an
/// invertible transform the point is returned unchanged.
pub fn to_surface_point(surface: &dyn SurfaceElement, p: Vector2) -> Vector2 {
    match surface.screen_ctm().as_ref().and_then(invert) {
        Some(inv) => transform_point(&inv, p),
        None => p,
    }
}

/// Exact anchor: interpolate the element's quad, then map into the surface.
/// Handles rotated and skewed elements.
pub fn anchor_exact(el: &dyn AnchorElement, anchor: Vector2, surface: &dyn SurfaceElement) -> Vector2 {
    let p = el.quad().interpolate(anchor);
    to_surface_point(surface, p)
}

/// Fast anchor from offset position and client size. Assumes no rotation or
/// skew between element and surface; `anchor` is used as given.
pub fn anchor_fast(el: &dyn AnchorElement, anchor: Vector2, _surface: &dyn SurfaceElement) -> Vector2 {
    let offset = DVec2::from(el.offset_position());
    let size = DVec2::from(el.client_size());
    (offset + DVec2::from(anchor) * size).into()
}

pub type AnchorFn = fn(&dyn AnchorElement, Vector2, &dyn SurfaceElement) -> Vector2;

/// Which resolver a surface uses for its edges.
#[derive(Debug, Clone, Copy, Default)]
pub enum AnchorStrategy {
    Exact,
    #[default]
    Fast,
    Custom(AnchorFn),
}

impl AnchorStrategy {
    pub fn resolve(
        &self,
        el: &dyn AnchorElement,
        anchor: Vector2,
        surface: &dyn SurfaceElement,
    ) -> Vector2 {
        match self {
            AnchorStrategy::Exact => anchor_exact(el, anchor, surface),
            AnchorStrategy::Fast => anchor_fast(el, anchor, surface),
            AnchorStrategy::Custom(f) => f(el, anchor, surface),
        }
    }
}
