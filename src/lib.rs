pub mod anchor;
pub mod geometry;
pub mod measure;
pub mod path;
pub mod scene;
pub mod surface;
pub mod svg;

use js_sys::Array;
use wasm_bindgen::prelude::*;

use geometry::{Side, Vector2, side_for_angle};
use path::{BezierOptions, EdgePath, SmoothStepOptions, bezier_path, smooth_step_path};
use scene::AnchorMode;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn parse_side(name: Option<String>, default: Side) -> Result<Side, String> {
    match name {
        None => Ok(default),
        Some(s) => Side::from_str(&s).ok_or_else(|| format!("Invalid side: {}", s)),
    }
}

/// `[path, labelX, labelY, offsetX, offsetY]`
fn edge_tuple(edge: &EdgePath) -> Array {
    let out = Array::new();
    out.push(&JsValue::from_str(&edge.path));
    out.push(&JsValue::from_f64(edge.label.x));
    out.push(&JsValue::from_f64(edge.label.y));
    out.push(&JsValue::from_f64(edge.offset.x));
    out.push(&JsValue::from_f64(edge.offset.y));
    out
}

#[wasm_bindgen(js_name = "getBezierPath")]
pub fn get_bezier_path(
    source_x: f64,
    source_y: f64,
    source_position: Option<String>,
    target_x: f64,
    target_y: f64,
    target_position: Option<String>,
    curvature: Option<f64>,
) -> Result<Array, String> {
    let defaults = BezierOptions::default();
    let opts = BezierOptions {
        source_side: parse_side(source_position, defaults.source_side)?,
        target_side: parse_side(target_position, defaults.target_side)?,
        curvature: curvature.unwrap_or(defaults.curvature),
    };
    let edge = bezier_path(
        Vector2::new(source_x, source_y),
        Vector2::new(target_x, target_y),
        &opts,
    );
    Ok(edge_tuple(&edge))
}

#[wasm_bindgen(js_name = "getSmoothStepPath")]
#[allow(clippy::too_many_arguments)]
pub fn get_smooth_step_path(
    source_x: f64,
    source_y: f64,
    source_position: Option<String>,
    target_x: f64,
    target_y: f64,
    target_position: Option<String>,
    border_radius: Option<f64>,
    center_x: Option<f64>,
    center_y: Option<f64>,
    offset: Option<f64>,
) -> Result<Array, String> {
    let defaults = SmoothStepOptions::default();
    let opts = SmoothStepOptions {
        source_side: parse_side(source_position, defaults.source_side)?,
        target_side: parse_side(target_position, defaults.target_side)?,
        border_radius: border_radius.unwrap_or(defaults.border_radius),
        center_x,
        center_y,
        offset: offset.unwrap_or(defaults.offset),
    };
    let edge = smooth_step_path(
        Vector2::new(source_x, source_y),
        Vector2::new(target_x, target_y),
        &opts,
    );
    Ok(edge_tuple(&edge))
}

#[wasm_bindgen(js_name = "sideForAngle")]
pub fn side_for_angle_name(radians: f64) -> String {
    side_for_angle(radians).as_str().to_string()
}

/// Render a JSON scene to SVG
#[wasm_bindgen(js_name = "sceneToSvg")]
pub fn scene_to_svg(source: &str, exact: Option<bool>) -> Result<String, String> {
    let anchor = exact.map(|e| if e { AnchorMode::Exact } else { AnchorMode::Fast });
    scene::render_scene(source, anchor).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_side() {
        assert_eq!(parse_side(None, Side::Top), Ok(Side::Top));
        assert_eq!(parse_side(Some("right".into()), Side::Top), Ok(Side::Right));
        assert!(parse_side(Some("north".into()), Side::Top).is_err());
    }

    #[test]
    fn test_side_names_roundtrip() {
        for side in [Side::Right, Side::Top, Side::Left, Side::Bottom] {
            assert_eq!(Side::from_str(side.as_str()), Some(side));
        }
    }

    #[test]
    fn test_scene_to_svg_reports_errors() {
        let err = scene_to_svg("not json", None).unwrap_err();
        assert!(err.starts_with("Invalid scene JSON"));
    }
}
