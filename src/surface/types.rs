//! Edge declarations and the values a draw pass hands to the host.

use serde::{Deserialize, Serialize};

use crate::geometry::{Side, Vector2};
use crate::path::EdgePath;

/// Which generator draws an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Bezier,
    #[serde(alias = "smooth-step", alias = "smooth_step")]
    SmoothStep,
}

/// Style and anchoring of one edge. Unset fields take the generator defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeParams {
    pub kind: EdgeKind,
    pub source_anchor: Option<Vector2>,
    pub target_anchor: Option<Vector2>,
    /// Inferred from the anchor when unset.
    pub source_side: Option<Side>,
    pub target_side: Option<Side>,
    pub curvature: Option<f64>,
    pub border_radius: Option<f64>,
    pub offset: Option<f64>,
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub label: Option<String>,
}

/// A normalized connection between two named elements.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDefinition {
    pub source: String,
    pub target: String,
    pub params: EdgeParams,
}

impl EdgeDefinition {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            params: EdgeParams::default(),
        }
    }

    pub fn with_params(mut self, params: EdgeParams) -> Self {
        self.params = params;
        self
    }

    /// Registry key, `"source->target"`.
    pub fn key(&self) -> String {
        edge_key(&self.source, &self.target)
    }
}

pub fn edge_key(source: &str, target: &str) -> String {
    format!("{}->{}", source, target)
}

/// One element name, or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(name) => vec![name],
            OneOrMany::Many(names) => names,
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(name: &str) -> Self {
        OneOrMany::One(name.to_string())
    }
}

/// One entry of a connector's edge list.
///
/// In JSON a bare string is a [`Shorthand`](Self::Shorthand). An object names
/// its `source`, its `target`, or both; the connector host fills an omitted end.
/// Either end may list several names, fanning out to one edge per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectDeclaration {
    /// Edge from the connector host to the named target.
    Shorthand(String),
    /// Edges from the named sources into `target`, or into the connector host
    /// when no target is given.
    ExplicitSource {
        source: OneOrMany,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<OneOrMany>,
        #[serde(flatten)]
        params: EdgeParams,
    },
    /// Edges from the connector host to the named targets, with style.
    ExplicitTarget {
        target: OneOrMany,
        #[serde(flatten)]
        params: EdgeParams,
    },
}

impl ConnectDeclaration {
    /// Resolve against the connector host. Lists expand to every
    /// source/target pair, in declaration order.
    pub fn normalize(self, host: &str) -> Vec<EdgeDefinition> {
        let (sources, targets, params) = match self {
            ConnectDeclaration::Shorthand(target) => {
                (vec![host.to_string()], vec![target], EdgeParams::default())
            }
            ConnectDeclaration::ExplicitSource {
                source,
                target,
                params,
            } => {
                let targets = match target {
                    Some(t) => t.into_vec(),
                    None => vec![host.to_string()],
                };
                (source.into_vec(), targets, params)
            }
            ConnectDeclaration::ExplicitTarget { target, params } => {
                (vec![host.to_string()], target.into_vec(), params)
            }
        };

        let mut defs = Vec::with_capacity(sources.len() * targets.len());
        for source in &sources {
            for target in &targets {
                defs.push(EdgeDefinition::new(source.as_str(), target.as_str()).with_params(params.clone()));
            }
        }
        defs
    }
}

impl From<&str> for ConnectDeclaration {
    fn from(target: &str) -> Self {
        ConnectDeclaration::Shorthand(target.to_string())
    }
}

/// Result of drawing one edge, handed to [`SurfaceHost::apply_edge`](super::SurfaceHost::apply_edge).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEdge {
    pub key: String,
    pub kind: EdgeKind,
    pub source_point: Vector2,
    pub target_point: Vector2,
    pub source_side: Side,
    pub target_side: Side,
    pub path: EdgePath,
    pub label: Option<String>,
}

/// Counts from one draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawReport {
    pub drawn: usize,
    pub skipped: usize,
    pub pruned: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_targets_named_element() {
        let defs = ConnectDeclaration::from("b").normalize("a");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].key(), "a->b");
        assert_eq!(defs[0].params, EdgeParams::default());
    }

    #[test]
    fn test_explicit_source_points_into_host() {
        let decl = ConnectDeclaration::ExplicitSource {
            source: "upstream".into(),
            target: None,
            params: EdgeParams::default(),
        };
        assert_eq!(decl.normalize("me")[0].key(), "upstream->me");
    }

    #[test]
    fn test_declarations_from_json() {
        let decls: Vec<ConnectDeclaration> = serde_json::from_str(
            r#"[
                "b",
                {"target": "c", "kind": "smoothstep", "borderRadius": 8, "sourceSide": "right"},
                {"source": "d", "curvature": 0.5, "sourceAnchor": {"x": 1, "y": 0.5}}
            ]"#,
        )
        .unwrap();

        assert_eq!(decls[0], ConnectDeclaration::Shorthand("b".into()));
        match &decls[1] {
            ConnectDeclaration::ExplicitTarget { target, params } => {
                assert_eq!(target, &OneOrMany::One("c".into()));
                assert_eq!(params.kind, EdgeKind::SmoothStep);
                assert_eq!(params.border_radius, Some(8.0));
                assert_eq!(params.source_side, Some(Side::Right));
            }
            other => panic!("unexpected {:?}", other),
        }
        match &decls[2] {
            ConnectDeclaration::ExplicitSource { source, target, params } => {
                assert_eq!(source, &OneOrMany::One("d".into()));
                assert_eq!(target, &None);
                assert_eq!(params.curvature, Some(0.5));
                assert_eq!(params.source_anchor, Some(Vector2::new(1.0, 0.5)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    fn keys(decl: &str, host: &str) -> Vec<String> {
        let decl: ConnectDeclaration = serde_json::from_str(decl).unwrap();
        decl.normalize(host).iter().map(EdgeDefinition::key).collect()
    }

    #[test]
    fn test_both_ends_named() {
        assert_eq!(keys(r#"{"source": "x", "target": "y"}"#, "host"), ["x->y"]);
        assert_eq!(
            keys(r#"{"target": "y", "source": "x", "label": "via"}"#, "host"),
            ["x->y"]
        );
    }

    #[test]
    fn test_target_list_fans_out() {
        assert_eq!(keys(r#"{"target": ["b", "c"]}"#, "a"), ["a->b", "a->c"]);
    }

    #[test]
    fn test_source_list_fans_in() {
        let decl: ConnectDeclaration =
            serde_json::from_str(r#"{"source": ["b", "c"], "curvature": 0.4}"#).unwrap();
        let defs = decl.normalize("a");
        let keys: Vec<String> = defs.iter().map(EdgeDefinition::key).collect();
        assert_eq!(keys, ["b->a", "c->a"]);
        assert!(defs.iter().all(|d| d.params.curvature == Some(0.4)));
    }

    #[test]
    fn test_lists_on_both_ends() {
        assert_eq!(
            keys(r#"{"source": ["p", "q"], "target": ["r", "s"]}"#, "host"),
            ["p->r", "p->s", "q->r", "q->s"]
        );
    }

    #[test]
    fn test_empty_list_declares_nothing() {
        assert!(keys(r#"{"target": []}"#, "a").is_empty());
    }
}
