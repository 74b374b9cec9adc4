//! In-memory surface host over positioned boxes, loadable from JSON.

use glam::{DAffine2, DVec2};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::anchor::{AnchorElement, AnchorStrategy, Quad, Rect, SurfaceElement};
use crate::geometry::Vector2;
use crate::surface::{
    ConnectDeclaration, ManualFrames, RenderedEdge, Surface, SurfaceHost, SurfaceOptions,
};
use crate::svg::SvgRenderer;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("Connector host is not a node: {0}")]
    UnknownHost(String),
}

/// A box positioned in surface-local coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation about the box center, in degrees.
    #[serde(default)]
    pub rotation: f64,
}

impl SceneNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Corners in surface-local space, rotation applied.
    pub fn local_quad(&self) -> Quad {
        let quad = Quad::from_rect(&Rect::new(self.x, self.y, self.width, self.height));
        if self.rotation == 0.0 {
            return quad;
        }
        let center = DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0);
        let m = DAffine2::from_translation(center)
            * DAffine2::from_angle(self.rotation.to_radians())
            * DAffine2::from_translation(-center);
        quad.transformed(&m)
    }
}

/// A node as the surface sees it, with client-space geometry.
#[derive(Debug, Clone)]
pub struct SceneElement {
    node: SceneNode,
    ctm: DAffine2,
}

impl AnchorElement for SceneElement {
    fn box_quads(&self) -> Option<Quad> {
        Some(self.node.local_quad().transformed(&self.ctm))
    }

    fn bounding_client_rect(&self) -> Rect {
        let Some(q) = self.box_quads() else {
            return Rect::default();
        };
        let xs = [q.p1.x, q.p2.x, q.p3.x, q.p4.x];
        let ys = [q.p1.y, q.p2.y, q.p3.y, q.p4.y];
        let left = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let right = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let top = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let bottom = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Rect::new(left, top, right - left, bottom - top)
    }

    fn offset_position(&self) -> Vector2 {
        Vector2::new(self.node.x, self.node.y)
    }

    fn client_size(&self) -> Vector2 {
        Vector2::new(self.node.width, self.node.height)
    }
}

/// Surface host backed by a map of boxes. Drawn edges are kept by key.
#[derive(Debug, Clone)]
pub struct Scene {
    width: f64,
    height: f64,
    ctm: DAffine2,
    elements: BTreeMap<String, SceneElement>,
    rendered: BTreeMap<String, RenderedEdge>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ctm: DAffine2::IDENTITY,
            elements: BTreeMap::new(),
            rendered: BTreeMap::new(),
        }
    }

    /// Set the surface-to-client transform (existing nodes included).
    pub fn with_transform(mut self, ctm: DAffine2) -> Self {
        self.ctm = ctm;
        for el in self.elements.values_mut() {
            el.ctm = ctm;
        }
        self
    }

    pub fn add_node(&mut self, node: SceneNode) -> Result<(), SceneError> {
        if self.elements.contains_key(&node.id) {
            return Err(SceneError::DuplicateNode(node.id));
        }
        let ctm = self.ctm;
        self.elements
            .insert(node.id.clone(), SceneElement { node, ctm });
        Ok(())
    }

    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> bool {
        match self.elements.get_mut(id) {
            Some(el) => {
                el.node.x = x;
                el.node.y = y;
                true
            }
            None => false,
        }
    }

    /// Remove a node from the scene, as if its element were unmounted.
    pub fn detach(&mut self, id: &str) -> Option<SceneNode> {
        self.elements.remove(id).map(|el| el.node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.elements.values().map(|el| &el.node)
    }

    pub fn rendered(&self) -> impl Iterator<Item = &RenderedEdge> {
        self.rendered.values()
    }

    pub fn rendered_edge(&self, key: &str) -> Option<&RenderedEdge> {
        self.rendered.get(key)
    }
}

impl SurfaceElement for Scene {
    fn screen_ctm(&self) -> Option<DAffine2> {
        Some(self.ctm)
    }
}

impl SurfaceHost for Scene {
    type Element = SceneElement;

    fn element(&self, id: &str) -> Option<&SceneElement> {
        self.elements.get(id)
    }

    fn client_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn apply_edge(&mut self, edge: RenderedEdge) {
        self.rendered.insert(edge.key.clone(), edge);
    }

    fn remove_edge(&mut self, key: &str) {
        self.rendered.remove(key);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    #[default]
    Fast,
    Exact,
}

impl From<AnchorMode> for AnchorStrategy {
    fn from(mode: AnchorMode) -> Self {
        match mode {
            AnchorMode::Fast => AnchorStrategy::Fast,
            AnchorMode::Exact => AnchorStrategy::Exact,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConnector {
    pub host: String,
    #[serde(default)]
    pub edges: Vec<ConnectDeclaration>,
}

fn default_scale() -> f64 {
    1.0
}

/// Scene description as read from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFile {
    pub width: f64,
    pub height: f64,
    /// Client-space position of the surface origin.
    #[serde(default)]
    pub origin: Vector2,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub anchor: AnchorMode,
    #[serde(default)]
    pub svg_attributes: BTreeMap<String, String>,
    pub nodes: Vec<SceneNode>,
    #[serde(default)]
    pub connectors: Vec<SceneConnector>,
}

impl SceneFile {
    pub fn from_json(source: &str) -> Result<Self, SceneError> {
        let file: SceneFile = serde_json::from_str(source)?;
        for connector in &file.connectors {
            if !file.nodes.iter().any(|n| n.id == connector.host) {
                return Err(SceneError::UnknownHost(connector.host.clone()));
            }
        }
        Ok(file)
    }

    pub fn transform(&self) -> DAffine2 {
        DAffine2::from_translation(self.origin.into()) * DAffine2::from_scale(DVec2::splat(self.scale))
    }

    /// Mount a surface over the scene with every connector declared. The
    /// initial draw is queued, not yet run.
    pub fn mount(self) -> Result<Surface<Scene, ManualFrames>, SceneError> {
        let mut scene = Scene::new(self.width, self.height).with_transform(self.transform());
        for node in self.nodes {
            scene.add_node(node)?;
        }
        let options = SurfaceOptions {
            svg_attributes: self.svg_attributes,
            get_node_anchor: self.anchor.into(),
            ..Default::default()
        };
        let mut surface = Surface::mount(scene, ManualFrames::new(), options);
        for connector in self.connectors {
            surface.connect(&connector.host, connector.edges);
        }
        Ok(surface)
    }
}

/// Load a scene, run one frame and serialize the result.
pub fn render_scene(source: &str, anchor: Option<AnchorMode>) -> Result<String, SceneError> {
    let mut file = SceneFile::from_json(source)?;
    if let Some(mode) = anchor {
        file.anchor = mode;
    }
    let mut surface = file.mount()?;
    if surface.requester_mut().take() {
        surface.on_frame();
    }
    Ok(SvgRenderer::default().render_surface(&surface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duplicate_node_rejected() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.add_node(SceneNode::new("a", 0.0, 0.0, 10.0, 10.0)).unwrap();
        let err = scene
            .add_node(SceneNode::new("a", 5.0, 5.0, 10.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, SceneError::DuplicateNode(id) if id == "a"));
    }

    #[test]
    fn test_rotated_quad_keeps_center() {
        let node = SceneNode::new("a", 0.0, 0.0, 40.0, 20.0).rotated(90.0);
        let q = node.local_quad();
        let center = q.interpolate(Vector2::new(0.5, 0.5));
        assert_relative_eq!(center.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(center.y, 10.0, epsilon = 1e-9);
        // top-left corner swings to the top-right of the center
        assert_relative_eq!(q.p1.x, 30.0, epsilon = 1e-9);
        assert_relative_eq!(q.p1.y, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bounding_rect_in_client_space() {
        let mut scene = Scene::new(100.0, 100.0)
            .with_transform(DAffine2::from_translation(DVec2::new(10.0, 20.0)));
        scene.add_node(SceneNode::new("a", 5.0, 5.0, 10.0, 4.0)).unwrap();
        let rect = scene.element("a").unwrap().bounding_client_rect();
        assert_eq!(rect, Rect::new(15.0, 25.0, 10.0, 4.0));
    }

    #[test]
    fn test_unknown_connector_host() {
        let err = SceneFile::from_json(
            r#"{"width": 10, "height": 10, "nodes": [], "connectors": [{"host": "x", "edges": ["y"]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::UnknownHost(h) if h == "x"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SceneFile::from_json("{"),
            Err(SceneError::Json(_))
        ));
    }
}
