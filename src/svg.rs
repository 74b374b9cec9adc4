use crate::anchor::Quad;
use crate::measure::TextMetrics;
use crate::path::Num;
use crate::scene::Scene;
use crate::surface::{EdgeKind, FrameRequester, RenderedEdge, Surface};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

pub struct SvgRenderer {
    metrics: TextMetrics,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            metrics: TextMetrics::default(),
        }
    }
}

impl SvgRenderer {
    /// Serialize node outlines and drawn edges. `attributes` are copied onto the
    /// root element as given (values escaped).
    pub fn render<'a>(
        &self,
        width: f64,
        height: f64,
        attributes: &BTreeMap<String, String>,
        nodes: &[Quad],
        edges: impl IntoIterator<Item = &'a RenderedEdge>,
    ) -> String {
        let mut svg = String::new();
        // writing into a String cannot fail
        let _ = self.write_document(&mut svg, width, height, attributes, nodes, edges);
        svg
    }

    /// Snapshot of a surface over a [`Scene`].
    pub fn render_surface<R: FrameRequester>(&self, surface: &Surface<Scene, R>) -> String {
        let nodes: Vec<Quad> = surface.host().nodes().map(|n| n.local_quad()).collect();
        self.render(
            surface.width(),
            surface.height(),
            surface.svg_attributes(),
            &nodes,
            surface.host().rendered(),
        )
    }

    fn write_document<'a>(
        &self,
        svg: &mut String,
        width: f64,
        height: f64,
        attributes: &BTreeMap<String, String>,
        nodes: &[Quad],
        edges: impl IntoIterator<Item = &'a RenderedEdge>,
    ) -> fmt::Result {
        write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}""#,
            Num(width),
            Num(height),
            Num(width),
            Num(height)
        )?;
        for (name, value) in attributes {
            if !is_xml_name(name) {
                log::warn!("skipping invalid svg attribute name {:?}", name);
                continue;
            }
            write!(svg, r#" {}="{}""#, name, escape_xml(value))?;
        }
        writeln!(svg, ">")?;

        writeln!(
            svg,
            r#"<style>
  .node {{ fill: #fff; stroke: #333; stroke-width: 1.5; }}
  .edge {{ stroke: #666; stroke-width: 1.5; fill: none; }}
  .edge-label-bg {{ fill: #fff; }}
  .edge-label {{ font-family: monospace; font-size: 11px; fill: #333; }}
</style>"#
        )?;

        for q in nodes {
            writeln!(
                svg,
                r#"<polygon class="node" points="{},{} {},{} {},{} {},{}" />"#,
                Num(q.p1.x),
                Num(q.p1.y),
                Num(q.p2.x),
                Num(q.p2.y),
                Num(q.p3.x),
                Num(q.p3.y),
                Num(q.p4.x),
                Num(q.p4.y)
            )?;
        }

        // labels go on top of every edge
        let edges: Vec<&RenderedEdge> = edges.into_iter().collect();
        for edge in &edges {
            self.write_edge(svg, edge)?;
        }
        for edge in &edges {
            if let Some(label) = &edge.label {
                self.write_label(svg, edge, label)?;
            }
        }

        writeln!(svg, "</svg>")
    }

    fn write_edge(&self, svg: &mut String, edge: &RenderedEdge) -> fmt::Result {
        let kind = match edge.kind {
            EdgeKind::Bezier => "bezier",
            EdgeKind::SmoothStep => "smoothstep",
        };
        writeln!(
            svg,
            r#"<path class="edge edge-{}" data-edge="{}" d="{}" />"#,
            kind,
            escape_xml(&edge.key),
            edge.path.path
        )
    }

    fn write_label(&self, svg: &mut String, edge: &RenderedEdge, label: &str) -> fmt::Result {
        let (w, h) = self.metrics.label_size(label);
        let center = edge.path.label;
        writeln!(
            svg,
            r#"<rect class="edge-label-bg" x="{}" y="{}" width="{}" height="{}" rx="3" />"#,
            Num(center.x - w / 2.0),
            Num(center.y - h / 2.0),
            Num(w),
            Num(h)
        )?;
        writeln!(
            svg,
            r#"<text class="edge-label" x="{}" y="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
            Num(center.x),
            Num(center.y),
            escape_xml(label)
        )
    }
}

/// ASCII subset of the XML `Name` production.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Side, Vector2};
    use crate::path::EdgePath;

    fn edge(label: Option<&str>) -> RenderedEdge {
        RenderedEdge {
            key: "a->b".into(),
            kind: EdgeKind::Bezier,
            source_point: Vector2::new(0.0, 0.0),
            target_point: Vector2::new(10.0, 0.0),
            source_side: Side::Right,
            target_side: Side::Left,
            path: EdgePath {
                path: "M0,0 C5,0 5,0 10,0".into(),
                label: Vector2::new(5.0, 0.0),
                offset: Vector2::new(5.0, 0.0),
            },
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn test_render_passes_attributes_through() {
        let mut attrs = BTreeMap::new();
        attrs.insert("data-theme".to_string(), "dark \"x\"".to_string());
        let svg = SvgRenderer::default().render(200.0, 100.0, &attrs, &[], Vec::<&RenderedEdge>::new());

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="200" height="100""#));
        assert!(svg.contains(r#"data-theme="dark &quot;x&quot;""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_skips_invalid_attribute_names() {
        let mut attrs = BTreeMap::new();
        attrs.insert("class".to_string(), "ok".to_string());
        attrs.insert("on load".to_string(), "x".to_string());
        attrs.insert("a\"b".to_string(), "y".to_string());
        attrs.insert("".to_string(), "z".to_string());
        attrs.insert("1st".to_string(), "w".to_string());
        let svg = SvgRenderer::default().render(10.0, 10.0, &attrs, &[], Vec::<&RenderedEdge>::new());

        let root = svg.lines().next().unwrap();
        assert_eq!(
            root,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10" class="ok">"#
        );
    }

    #[test]
    fn test_xml_names() {
        assert!(is_xml_name("data-theme"));
        assert!(is_xml_name("xml:lang"));
        assert!(is_xml_name("_x.y"));
        assert!(!is_xml_name("has space"));
        assert!(!is_xml_name("-lead"));
        assert!(!is_xml_name("q\"uote"));
    }

    #[test]
    fn test_render_edge_and_label() {
        let e = edge(Some("a < b"));
        let svg = SvgRenderer::default().render(50.0, 50.0, &BTreeMap::new(), &[], [&e]);

        assert!(svg.contains(r#"data-edge="a-&gt;b""#));
        assert!(svg.contains(r#"d="M0,0 C5,0 5,0 10,0""#));
        assert!(svg.contains("a &lt; b</text>"));
        assert!(svg.contains(r#"class="edge-label-bg""#));
    }

    #[test]
    fn test_render_without_label() {
        let e = edge(None);
        let svg = SvgRenderer::default().render(50.0, 50.0, &BTreeMap::new(), &[], [&e]);
        assert!(!svg.contains("<text"));
    }
}
