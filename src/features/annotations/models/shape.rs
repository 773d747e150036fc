//! Annotation shapes drawn over a media frame.
//!
//! Coordinates are normalized to the frame: `0.0` is the left/top edge and
//! `1.0` the right/bottom edge, so annotations survive player resizes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MAX_TEXT_LENGTH: usize = 500;
const MAX_COLOR_LENGTH: usize = 32;
const MAX_FREEHAND_POINTS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Tagged by `type`, e.g. `{"type": "circle", "x": 0.5, "y": 0.5, "radius": 0.1}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationShape {
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Arrow {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Freehand {
        points: Vec<Point>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
}

fn check_unit(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be between 0 and 1", name))
    }
}

impl AnnotationShape {
    fn color(&self) -> Option<&str> {
        match self {
            AnnotationShape::Rectangle { color, .. }
            | AnnotationShape::Circle { color, .. }
            | AnnotationShape::Arrow { color, .. }
            | AnnotationShape::Freehand { color, .. }
            | AnnotationShape::Text { color, .. } => color.as_deref(),
        }
    }

    /// Check that the shape lies inside the frame and is well formed
    pub fn check_bounds(&self) -> Result<(), String> {
        if let Some(color) = self.color() {
            if color.is_empty() || color.len() > MAX_COLOR_LENGTH {
                return Err(format!("color must be 1-{} characters", MAX_COLOR_LENGTH));
            }
        }

        match self {
            AnnotationShape::Rectangle {
                x,
                y,
                width,
                height,
                ..
            } => {
                check_unit("x", *x)?;
                check_unit("y", *y)?;
                check_unit("width", *width)?;
                check_unit("height", *height)?;
                if x + width > 1.0 || y + height > 1.0 {
                    return Err("rectangle extends outside the frame".to_string());
                }
            }
            AnnotationShape::Circle { x, y, radius, .. } => {
                check_unit("x", *x)?;
                check_unit("y", *y)?;
                check_unit("radius", *radius)?;
            }
            AnnotationShape::Arrow { x1, y1, x2, y2, .. } => {
                check_unit("x1", *x1)?;
                check_unit("y1", *y1)?;
                check_unit("x2", *x2)?;
                check_unit("y2", *y2)?;
            }
            AnnotationShape::Freehand { points, .. } => {
                if points.len() < 2 {
                    return Err("freehand needs at least 2 points".to_string());
                }
                if points.len() > MAX_FREEHAND_POINTS {
                    return Err(format!(
                        "freehand supports at most {} points",
                        MAX_FREEHAND_POINTS
                    ));
                }
                for point in points {
                    check_unit("point x", point.x)?;
                    check_unit("point y", point.y)?;
                }
            }
            AnnotationShape::Text { x, y, text, .. } => {
                check_unit("x", *x)?;
                check_unit("y", *y)?;
                let len = text.trim().chars().count();
                if len == 0 || len > MAX_TEXT_LENGTH {
                    return Err(format!("text must be 1-{} characters", MAX_TEXT_LENGTH));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape(value: serde_json::Value) -> AnnotationShape {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deserializes_tagged_shapes() {
        let circle = shape(json!({"type": "circle", "x": 0.5, "y": 0.5, "radius": 0.1}));
        assert_eq!(
            circle,
            AnnotationShape::Circle {
                x: 0.5,
                y: 0.5,
                radius: 0.1,
                color: None
            }
        );
        assert!(serde_json::from_value::<AnnotationShape>(json!({"type": "hexagon"})).is_err());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let text = AnnotationShape::Text {
            x: 0.1,
            y: 0.2,
            text: "focus".into(),
            color: Some("#ff0000".into()),
        };
        let value = serde_json::to_value(&text).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["color"], "#ff0000");
    }

    #[test]
    fn test_validate_accepts_in_frame_shapes() {
        for value in [
            json!({"type": "rectangle", "x": 0.1, "y": 0.1, "width": 0.5, "height": 0.9}),
            json!({"type": "arrow", "x1": 0.0, "y1": 0.0, "x2": 1.0, "y2": 1.0}),
            json!({"type": "freehand", "points": [{"x": 0.1, "y": 0.1}, {"x": 0.2, "y": 0.3}]}),
            json!({"type": "text", "x": 0.5, "y": 0.5, "text": "here", "color": "red"}),
        ] {
            assert!(shape(value.clone()).check_bounds().is_ok(), "{}", value);
        }
    }

    #[test]
    fn test_validate_rejects_out_of_frame_and_malformed() {
        for value in [
            json!({"type": "rectangle", "x": 0.8, "y": 0.1, "width": 0.5, "height": 0.1}),
            json!({"type": "circle", "x": 1.5, "y": 0.5, "radius": 0.1}),
            json!({"type": "arrow", "x1": -0.1, "y1": 0.0, "x2": 1.0, "y2": 1.0}),
            json!({"type": "freehand", "points": [{"x": 0.1, "y": 0.1}]}),
            json!({"type": "text", "x": 0.5, "y": 0.5, "text": "  "}),
            json!({"type": "circle", "x": 0.5, "y": 0.5, "radius": 0.1, "color": ""}),
        ] {
            assert!(shape(value.clone()).check_bounds().is_err(), "{}", value);
        }
    }
}
