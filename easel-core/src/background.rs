//! Scene background values and dark-mode classification.

use serde::{Deserialize, Serialize};

use crate::color;

/// Backgrounds with a luminance below this are considered dark.
pub const DARK_MODE_THRESHOLD: f32 = 0.4;

/// A color stop of a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f32,
    /// Color at this position.
    pub color: String,
}

impl ColorStop {
    /// Create a color stop.
    #[must_use]
    pub fn new(offset: f32, color: impl Into<String>) -> Self {
        Self {
            offset,
            color: color.into(),
        }
    }
}

/// Gradient geometry, in coordinates relative to the painted box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GradientKind {
    /// Linear gradient from `(x, y)` to `(x2, y2)`.
    Linear {
        /// Start X.
        x: f32,
        /// Start Y.
        y: f32,
        /// End X.
        x2: f32,
        /// End Y.
        y2: f32,
    },
    /// Radial gradient centered at `(x, y)`.
    Radial {
        /// Center X.
        x: f32,
        /// Center Y.
        y: f32,
        /// Radius.
        r: f32,
    },
}

/// A gradient fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Geometry.
    pub kind: GradientKind,
    /// Ordered color stops.
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    /// Top-to-bottom linear gradient.
    #[must_use]
    pub fn vertical(stops: Vec<ColorStop>) -> Self {
        Self {
            kind: GradientKind::Linear {
                x: 0.0,
                y: 0.0,
                x2: 0.0,
                y2: 1.0,
            },
            stops,
        }
    }
}

/// How a pattern image tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternRepeat {
    /// Tile in both directions.
    #[default]
    Repeat,
    /// Tile horizontally.
    RepeatX,
    /// Tile vertically.
    RepeatY,
    /// Draw once.
    NoRepeat,
}

/// An image pattern fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Image source URI.
    pub image: String,
    /// Tiling mode.
    #[serde(default)]
    pub repeat: PatternRepeat,
}

/// Background of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Background {
    /// Flat color string.
    Color(String),
    /// Gradient.
    Gradient(Gradient),
    /// Image pattern.
    Pattern(Pattern),
}

impl From<&str> for Background {
    fn from(color: &str) -> Self {
        Background::Color(color.to_string())
    }
}

impl From<String> for Background {
    fn from(color: String) -> Self {
        Background::Color(color)
    }
}

impl From<Gradient> for Background {
    fn from(gradient: Gradient) -> Self {
        Background::Gradient(gradient)
    }
}

impl From<Pattern> for Background {
    fn from(pattern: Pattern) -> Self {
        Background::Pattern(pattern)
    }
}

/// Classify a background as dark.
///
/// Gradients average the luminance of their stops without weighting by
/// offset. Patterns, empty colors and absent backgrounds are not dark.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn is_dark_background(background: Option<&Background>) -> bool {
    match background {
        None => false,
        Some(Background::Color(c)) if c.is_empty() => false,
        Some(Background::Color(c)) => color::lum(c, 1.0) < DARK_MODE_THRESHOLD,
        Some(Background::Gradient(g)) => {
            if g.stops.is_empty() {
                return false;
            }
            let total: f32 = g.stops.iter().map(|s| color::lum(&s.color, 1.0)).sum();
            (total / g.stops.len() as f32) < DARK_MODE_THRESHOLD
        }
        Some(Background::Pattern(_)) => false,
    }
}
