//! The surface engine: edge registry, connector side-table and draw pass.

use std::collections::BTreeMap;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::anchor::{AnchorElement, AnchorStrategy, SurfaceElement};
use crate::geometry::{Anchor, Side, Vector2, side_for_anchor};
use crate::path::{BezierOptions, EdgePath, SmoothStepOptions, bezier_path, smooth_step_path};

use super::scheduler::{FrameRequester, FrameScheduler, ScheduleState};
use super::types::{ConnectDeclaration, DrawReport, EdgeDefinition, EdgeKind, RenderedEdge};

/// The container a surface draws into.
pub trait SurfaceHost: SurfaceElement {
    type Element: AnchorElement;

    /// Look up a connectable element by name.
    fn element(&self, id: &str) -> Option<&Self::Element>;

    /// Whether the element is still mounted. Connectors whose host is gone are
    /// pruned on the next draw.
    fn is_attached(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    /// Current container size.
    fn client_size(&self) -> (f64, f64);

    /// Receive the geometry for one edge.
    fn apply_edge(&mut self, edge: RenderedEdge);

    /// Called once per draw pass for each registry key that was removed.
    fn remove_edge(&mut self, _key: &str) {}
}

#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    #[error("unknown element `{0}`")]
    UnknownElement(String),
    #[error("anchor for `{0}` resolved to a non-finite point")]
    NonFinite(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("mount hook failed: {0}")]
    Failed(Box<dyn Error>),
    #[error("mount hook panicked: {0}")]
    Panicked(String),
}

pub type MountHook<H, R> = Box<dyn FnOnce(&mut Surface<H, R>) -> Result<(), Box<dyn Error>>>;

/// Options supplied when a surface is mounted.
pub struct SurfaceOptions<H: SurfaceHost, R: FrameRequester> {
    /// Passed unmodified to the rendered `<svg>` element.
    pub svg_attributes: BTreeMap<String, String>,
    pub get_node_anchor: AnchorStrategy,
    /// Presentation hint for the host; the engine only stores it.
    pub fade_in_duration: Option<Duration>,
    pub on_mount: Option<MountHook<H, R>>,
}

impl<H: SurfaceHost, R: FrameRequester> Default for SurfaceOptions<H, R> {
    fn default() -> Self {
        Self {
            svg_attributes: BTreeMap::new(),
            get_node_anchor: AnchorStrategy::default(),
            fade_in_duration: None,
            on_mount: None,
        }
    }
}

struct RegisteredEdge {
    def: EdgeDefinition,
    /// Connector host that declared the edge, if any.
    owner: Option<String>,
}

struct Connector {
    host: String,
    keys: Vec<String>,
}

pub struct Surface<H: SurfaceHost, R: FrameRequester> {
    host: H,
    scheduler: FrameScheduler<R>,
    edges: BTreeMap<String, RegisteredEdge>,
    connectors: Vec<Connector>,
    removed: Vec<String>,
    width: f64,
    height: f64,
    strategy: AnchorStrategy,
    svg_attributes: BTreeMap<String, String>,
    fade_in_duration: Option<Duration>,
}

impl<H: SurfaceHost, R: FrameRequester> Surface<H, R> {
    /// Mount a surface over `host`, run the mount hook and queue the first draw.
    pub fn mount(host: H, requester: R, mut options: SurfaceOptions<H, R>) -> Self {
        log::debug!("creating nodal surface");
        let (width, height) = host.client_size();
        let on_mount = options.on_mount.take();
        let mut surface = Self {
            host,
            scheduler: FrameScheduler::new(requester),
            edges: BTreeMap::new(),
            connectors: Vec::new(),
            removed: Vec::new(),
            width,
            height,
            strategy: options.get_node_anchor,
            svg_attributes: options.svg_attributes,
            fade_in_duration: options.fade_in_duration,
        };

        if let Some(hook) = on_mount {
            if let Err(e) = surface.run_hook(hook) {
                log::warn!("{}", e);
            }
        }

        surface.schedule();
        surface
    }

    fn run_hook(&mut self, hook: MountHook<H, R>) -> Result<(), HookError> {
        match panic::catch_unwind(AssertUnwindSafe(|| hook(self))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(HookError::Failed(e)),
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(HookError::Panicked(msg))
            }
        }
    }

    /// Upsert an edge under its `source->target` key. Does not redraw.
    pub fn register_edge(&mut self, def: EdgeDefinition) {
        self.insert(def, None);
    }

    pub fn unregister_edge(&mut self, key: &str) -> Option<EdgeDefinition> {
        let removed = self.edges.remove(key)?;
        self.removed.push(key.to_string());
        Some(removed.def)
    }

    fn insert(&mut self, def: EdgeDefinition, owner: Option<String>) {
        let key = def.key();
        self.removed.retain(|k| *k != key);
        self.edges.insert(key, RegisteredEdge { def, owner });
    }

    /// Declare the edges of a connector host, replacing any earlier declaration
    /// from the same host. Does not redraw.
    pub fn connect<I>(&mut self, host: &str, declarations: I)
    where
        I: IntoIterator<Item = ConnectDeclaration>,
    {
        let defs: Vec<EdgeDefinition> = declarations
            .into_iter()
            .flat_map(|d| d.normalize(host))
            .collect();
        let keys: Vec<String> = defs.iter().map(|d| d.key()).collect();

        if let Some(idx) = self.connectors.iter().position(|c| c.host == host) {
            let old = self.connectors.remove(idx);
            for key in &old.keys {
                if !keys.contains(key) {
                    self.remove_owned(key, host);
                }
            }
        }
        if defs.is_empty() {
            log::debug!("no edges declared for connector `{}`", host);
        }

        for def in defs {
            self.insert(def, Some(host.to_string()));
        }
        self.connectors.push(Connector {
            host: host.to_string(),
            keys,
        });
    }

    /// Forget a connector host and every edge it declared.
    pub fn disconnect(&mut self, host: &str) -> usize {
        let Some(idx) = self.connectors.iter().position(|c| c.host == host) else {
            return 0;
        };
        let connector = self.connectors.remove(idx);
        let mut removed = 0;
        for key in &connector.keys {
            if self.remove_owned(key, host) {
                removed += 1;
            }
        }
        removed
    }

    fn remove_owned(&mut self, key: &str, host: &str) -> bool {
        let owned = self
            .edges
            .get(key)
            .is_some_and(|e| e.owner.as_deref() == Some(host));
        if owned {
            self.edges.remove(key);
            self.removed.push(key.to_string());
        }
        owned
    }

    /// Queue a redraw for the next frame. Calls made while one is already
    /// queued collapse into it.
    pub fn schedule(&mut self) {
        if self.scheduler.schedule() {
            log::debug!("redraw queued");
        }
    }

    /// Frame callback from the host. Draws if a redraw was queued.
    pub fn on_frame(&mut self) -> Option<DrawReport> {
        if self.scheduler.fire() {
            Some(self.draw())
        } else {
            None
        }
    }

    /// Container resized: record the size and queue a redraw.
    pub fn resize(&mut self, width: f64, height: f64) {
        log::debug!("resizing nodal surface to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.schedule();
    }

    /// Recompute every edge now.
    pub fn draw(&mut self) -> DrawReport {
        let pruned = self.prune_detached();
        log::debug!("drawing {} nodal surface edges", self.edges.len());

        let mut report = DrawReport {
            pruned,
            ..Default::default()
        };
        let mut rendered = Vec::with_capacity(self.edges.len());
        for (key, entry) in &self.edges {
            match self.render_edge(key, &entry.def) {
                Ok(edge) => rendered.push(edge),
                Err(e) => {
                    log::warn!("skipping edge {}: {}", key, e);
                    report.skipped += 1;
                }
            }
        }

        for key in std::mem::take(&mut self.removed) {
            self.host.remove_edge(&key);
        }
        report.drawn = rendered.len();
        for edge in rendered {
            self.host.apply_edge(edge);
        }
        report
    }

    fn prune_detached(&mut self) -> usize {
        let detached: Vec<String> = self
            .connectors
            .iter()
            .filter(|c| !self.host.is_attached(&c.host))
            .map(|c| c.host.clone())
            .collect();

        let mut pruned = 0;
        for host in &detached {
            log::debug!("pruning detached connector `{}`", host);
            pruned += self.disconnect(host);
        }
        pruned
    }

    fn render_edge(&self, key: &str, def: &EdgeDefinition) -> Result<RenderedEdge, EdgeError> {
        let params = &def.params;
        let source_anchor = params.source_anchor.unwrap_or(Anchor::CENTER_CENTER);
        let target_anchor = params.target_anchor.unwrap_or(Anchor::CENTER_CENTER);
        let source_point = self.resolve(&def.source, source_anchor)?;
        let target_point = self.resolve(&def.target, target_anchor)?;

        let source_side = params
            .source_side
            .or_else(|| side_for_anchor(source_anchor))
            .unwrap_or(Side::Bottom);
        let target_side = params
            .target_side
            .or_else(|| side_for_anchor(target_anchor))
            .unwrap_or(Side::Top);

        let path: EdgePath = match params.kind {
            EdgeKind::Bezier => {
                let defaults = BezierOptions::default();
                let opts = BezierOptions {
                    source_side,
                    target_side,
                    curvature: params.curvature.unwrap_or(defaults.curvature),
                };
                bezier_path(source_point, target_point, &opts)
            }
            EdgeKind::SmoothStep => {
                let defaults = SmoothStepOptions::default();
                let opts = SmoothStepOptions {
                    source_side,
                    target_side,
                    border_radius: params.border_radius.unwrap_or(defaults.border_radius),
                    center_x: params.center_x,
                    center_y: params.center_y,
                    offset: params.offset.unwrap_or(defaults.offset),
                };
                smooth_step_path(source_point, target_point, &opts)
            }
        };

        Ok(RenderedEdge {
            key: key.to_string(),
            kind: params.kind,
            source_point,
            target_point,
            source_side,
            target_side,
            path,
            label: params.label.clone(),
        })
    }

    fn resolve(&self, id: &str, anchor: Vector2) -> Result<Vector2, EdgeError> {
        let el = self
            .host
            .element(id)
            .ok_or_else(|| EdgeError::UnknownElement(id.to_string()))?;
        let p = self.strategy.resolve(el, anchor, &self.host);
        if p.x.is_finite() && p.y.is_finite() {
            Ok(p)
        } else {
            Err(EdgeError::NonFinite(id.to_string()))
        }
    }

    pub fn edge(&self, key: &str) -> Option<&EdgeDefinition> {
        self.edges.get(key).map(|e| &e.def)
    }

    /// Registered edges in key order.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeDefinition> {
        self.edges.values().map(|e| &e.def)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_queued(&self) -> bool {
        self.scheduler.state() == ScheduleState::Queued
    }

    pub fn svg_attributes(&self) -> &BTreeMap<String, String> {
        &self.svg_attributes
    }

    pub fn fade_in_duration(&self) -> Option<Duration> {
        self.fade_in_duration
    }

    pub fn set_anchor_strategy(&mut self, strategy: AnchorStrategy) {
        self.strategy = strategy;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn requester(&self) -> &R {
        self.scheduler.requester()
    }

    pub fn requester_mut(&mut self) -> &mut R {
        self.scheduler.requester_mut()
    }
}
