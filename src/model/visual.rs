//! Visual element types (images, charts, graphs).

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a bounding box from its corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    /// Box area.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// Kind label assigned upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    /// Photograph or other raster image
    Image,
    /// Chart (bar, pie, ...)
    Chart,
    /// Graph or plot
    Graph,
}

impl std::fmt::Display for VisualKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisualKind::Image => write!(f, "image"),
            VisualKind::Chart => write!(f, "chart"),
            VisualKind::Graph => write!(f, "graph"),
        }
    }
}

/// An image, chart or graph located on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualElement {
    /// Classified kind
    pub kind: VisualKind,

    /// Position on the page, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    /// Text found near the element (captions, labels)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearby_text: Option<String>,
}

impl VisualElement {
    /// Create a new visual element.
    pub fn new(kind: VisualKind, bbox: Option<BoundingBox>) -> Self {
        Self {
            kind,
            bbox,
            nearby_text: None,
        }
    }

    /// Set nearby text and return self.
    pub fn with_nearby_text(mut self, text: impl Into<String>) -> Self {
        self.nearby_text = Some(text.into());
        self
    }

    /// Check if this element is a chart or graph.
    pub fn is_figure(&self) -> bool {
        matches!(self.kind, VisualKind::Chart | VisualKind::Graph)
    }
}
