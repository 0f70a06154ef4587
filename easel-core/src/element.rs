//! Scene elements - the drawable building blocks of a scene.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a renderer instance that owns elements.
///
/// Ids are handed out from a process-wide counter, so two instances never
/// share an id even when they live in different registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate the next process-unique instance id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ElementKind {
    /// An axis-aligned rectangle filling the transform box.
    Rect {
        /// Corner radius in pixels.
        #[serde(default)]
        corner_radius: f32,
    },

    /// An ellipse inscribed in the transform box.
    Circle,

    /// A text label or annotation.
    Text {
        /// Text content.
        content: String,
        /// Font size in pixels.
        font_size: f32,
        /// Text color as hex.
        color: String,
    },

    /// A 2D image (PNG, JPG, SVG).
    Image {
        /// Image source URI or base64 data.
        src: String,
        /// Image format.
        format: ImageFormat,
    },

    /// A container group for other elements.
    Group {
        /// Child element IDs.
        #[serde(default)]
        children: Vec<ElementId>,
    },
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG vector image.
    Svg,
    /// WebP image.
    WebP,
}

/// Transform for positioning, sizing and layering elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in radians.
    #[serde(default)]
    pub rotation: f32,
    /// Z-index for ordering inside a layer.
    #[serde(default)]
    pub z_index: i32,
    /// Layer the element is painted into.
    #[serde(default)]
    pub z_level: i32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            z_index: 0,
            z_level: 0,
        }
    }
}

/// Paint style applied by backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Fill color, `None` for no fill.
    pub fill: Option<String>,
    /// Stroke color, `None` for no stroke.
    pub stroke: Option<String>,
    /// Stroke width in pixels.
    pub stroke_width: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Some("#000000".to_string()),
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Bounds {
    /// Create a bounding box.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Grow the box by `amount` on every side.
    #[must_use]
    pub fn expanded(&self, amount: f32) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    /// Check if two boxes overlap.
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    /// Smallest box covering both.
    #[must_use]
    pub fn union(&self, other: &Bounds) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Self::new(x, y, right - x, bottom - y)
    }
}

/// A scene element with content, transform and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    #[serde(default)]
    pub id: ElementId,
    /// Element content type.
    pub kind: ElementKind,
    /// Position and size.
    #[serde(default)]
    pub transform: Transform,
    /// Paint style.
    #[serde(default)]
    pub style: Style,
    /// Whether this element takes part in hit testing.
    #[serde(default = "default_interactive")]
    pub interactive: bool,
    /// Cursor shown while hovering this element.
    #[serde(default)]
    pub cursor: Option<String>,
    /// Whether the pointer currently hovers this element.
    #[serde(skip)]
    pub hovered: bool,
    /// Optional parent element ID (for grouped elements).
    #[serde(skip)]
    pub parent: Option<ElementId>,
    /// Renderer instance this element is attached to.
    #[serde(skip)]
    owner: Option<InstanceId>,
}

fn default_interactive() -> bool {
    true
}

impl Element {
    /// Create a new element with the given kind.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            transform: Transform::default(),
            style: Style::default(),
            interactive: true,
            cursor: None,
            hovered: false,
            parent: None,
            owner: None,
        }
    }

    /// Rectangle at the given position.
    #[must_use]
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(ElementKind::Rect { corner_radius: 0.0 }).with_transform(Transform {
            x,
            y,
            width,
            height,
            ..Transform::default()
        })
    }

    /// Empty group.
    #[must_use]
    pub fn group() -> Self {
        Self::new(ElementKind::Group {
            children: Vec::new(),
        })
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the fill color.
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.style.fill = Some(fill.into());
        self
    }

    /// Set whether the element is interactive.
    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Set the hover cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Check if a point (in canvas coordinates) is within this element.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.bounds().contains(x, y)
    }

    /// Bounding box of the transform.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let t = &self.transform;
        Bounds::new(t.x, t.y, t.width, t.height)
    }

    /// Whether this element can hold children.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group { .. })
    }

    /// Child ids, empty for non-groups.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Group { children } => children,
            _ => &[],
        }
    }

    /// Renderer instance this element is attached to.
    #[must_use]
    pub fn owner(&self) -> Option<InstanceId> {
        self.owner
    }

    /// Record the owning renderer instance.
    pub fn attach(&mut self, owner: InstanceId) {
        self.owner = Some(owner);
    }

    /// Forget the owning renderer instance.
    pub fn detach(&mut self) {
        self.owner = None;
        self.hovered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_ids_are_unique() {
        let a = InstanceId::next();
        let b = InstanceId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn attach_and_detach_track_owner() {
        let mut el = Element::rect(0.0, 0.0, 10.0, 10.0);
        assert!(el.owner().is_none());

        let owner = InstanceId::next();
        el.attach(owner);
        el.hovered = true;
        assert_eq!(el.owner(), Some(owner));

        el.detach();
        assert!(el.owner().is_none());
        assert!(!el.hovered);
    }

    #[test]
    fn bounds_union_and_intersection() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(20.0, 20.0, 5.0, 5.0);
        assert!(!a.intersects(&b));

        let u = a.union(&b);
        assert_eq!(u, Bounds::new(0.0, 0.0, 25.0, 25.0));
        assert!(u.intersects(&b));

        assert!(a.expanded(12.0).intersects(&b));
    }

    #[test]
    fn element_deserializes_with_defaults() {
        let json = r#"{"kind":{"type":"rect","data":{"corner_radius":2.0}},"transform":{"x":1.0,"y":2.0,"width":3.0,"height":4.0}}"#;
        let el: Element = serde_json::from_str(json).expect("valid element");
        assert!(el.interactive);
        assert!(el.owner().is_none());
        assert_eq!(el.transform.z_level, 0);
        assert!((el.style.opacity - 1.0).abs() < f32::EPSILON);
    }
}
