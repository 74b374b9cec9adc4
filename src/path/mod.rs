//! SVG path synthesis between two anchored endpoints.

mod bezier;
mod smoothstep;

pub use bezier::{BezierOptions, bezier_path};
pub use smoothstep::{SmoothStepOptions, smooth_step_path};

use crate::geometry::Vector2;
use std::fmt;

/// Output of a path generator.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    /// Path data for an SVG `<path d="...">`.
    pub path: String,
    /// Where a label for the edge should sit.
    pub label: Vector2,
    /// Absolute distance between the source and the label on each axis.
    pub offset: Vector2,
}

/// Formats a coordinate the way JavaScript stringifies numbers: `75.0`
/// becomes `75`, negative zero prints as `0`, and magnitudes from `1e21` up or
/// below `1e-6` use exponent form (`1e+21`, `1.5e-7`).
pub(crate) struct Num(pub f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v == 0.0 {
            return f.write_str("0");
        }
        if v.is_nan() {
            return f.write_str("NaN");
        }
        if v.is_infinite() {
            return f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
        }
        if v.abs() >= 1e21 || v.abs() < 1e-6 {
            let exp = format!("{:e}", v);
            return match exp.split_once('e') {
                Some((mantissa, power)) if !power.starts_with('-') => {
                    write!(f, "{}e+{}", mantissa, power)
                }
                _ => f.write_str(&exp),
            };
        }
        write!(f, "{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_formatting() {
        assert_eq!(Num(75.0).to_string(), "75");
        assert_eq!(Num(-0.0).to_string(), "0");
        assert_eq!(Num(12.5).to_string(), "12.5");
        assert_eq!(Num(-3.0).to_string(), "-3");
    }

    #[test]
    fn test_num_exponent_thresholds() {
        assert_eq!(Num(1e21).to_string(), "1e+21");
        assert_eq!(Num(-2.5e22).to_string(), "-2.5e+22");
        assert_eq!(Num(1e-7).to_string(), "1e-7");
        assert_eq!(Num(1.5e-7).to_string(), "1.5e-7");
        assert_eq!(Num(1e20).to_string(), "100000000000000000000");
        assert_eq!(Num(0.000001).to_string(), "0.000001");
    }

    #[test]
    fn test_num_non_finite() {
        assert_eq!(Num(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Num(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Num(f64::NAN).to_string(), "NaN");
    }
}
