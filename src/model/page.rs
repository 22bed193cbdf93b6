//! Page-level types.

use super::{Table, VisualElement};
use serde::{Deserialize, Serialize};

/// A single extracted page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Page number in the source file (0-indexed)
    pub index: u32,

    /// Raw extracted text
    #[serde(default)]
    pub text: String,

    /// Tables found on the page
    #[serde(default)]
    pub tables: Vec<Table>,

    /// Images, charts and graphs found on the page
    #[serde(default)]
    pub visual_elements: Vec<VisualElement>,

    /// Page rotation in degrees (0, 90, 180, 270)
    #[serde(default)]
    pub rotation: u16,

    /// Page width in points (1 point = 1/72 inch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,

    /// Page height in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

impl Page {
    /// Create a page with text and no geometry.
    pub fn new(index: u32, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Add a table and return self.
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Add a visual element and return self.
    pub fn with_visual(mut self, element: VisualElement) -> Self {
        self.visual_elements.push(element);
        self
    }

    /// Set rotation and return self.
    pub fn with_rotation(mut self, degrees: u16) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set dimensions and return self.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    fn needs_terminator(&self) -> bool {
        !self.text.is_empty() && !self.text.ends_with('\n')
    }

    /// Length in bytes of the text this page contributes to its chunk.
    pub fn contribution_len(&self) -> usize {
        self.text.len() + usize::from(self.needs_terminator())
    }

    /// Append this page's text, newline-terminated, to `buf`.
    pub fn push_contribution(&self, buf: &mut String) {
        buf.push_str(&self.text);
        if self.needs_terminator() {
            buf.push('\n');
        }
    }

    /// Layout oddities worth reporting alongside the findings.
    pub fn formatting_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.rotation % 360 != 0 {
            flags.push(format!("rotated_{}_degrees", self.rotation % 360));
        }
        if self.text.trim().is_empty() && !self.visual_elements.is_empty() {
            flags.push("image_only".to_string());
        }
        flags
    }

    /// Check if the page has no text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w > h) != (self.rotation % 180 == 90),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, VisualKind};

    #[test]
    fn test_page_new() {
        let page = Page::new(3, "hello");
        assert_eq!(page.index, 3);
        assert_eq!(page.text, "hello");
        assert!(page.tables.is_empty());
        assert_eq!(page.rotation, 0);
    }

    #[test]
    fn test_contribution_adds_newline_once() {
        let mut buf = String::new();
        Page::new(0, "abc").push_contribution(&mut buf);
        Page::new(1, "def\n").push_contribution(&mut buf);
        Page::new(2, "").push_contribution(&mut buf);
        assert_eq!(buf, "abc\ndef\n");
        assert_eq!(Page::new(0, "abc").contribution_len(), 4);
        assert_eq!(Page::new(0, "").contribution_len(), 0);
    }

    #[test]
    fn test_formatting_flags() {
        let page = Page::new(0, "text").with_rotation(90);
        assert_eq!(page.formatting_flags(), vec!["rotated_90_degrees"]);

        let scan = Page::new(1, "  ").with_visual(VisualElement::new(
            VisualKind::Image,
            Some(BoundingBox::new(0.0, 0.0, 612.0, 792.0)),
        ));
        assert_eq!(scan.formatting_flags(), vec!["image_only"]);
    }

    #[test]
    fn test_landscape_accounts_for_rotation() {
        let page = Page::new(0, "").with_size(792.0, 612.0);
        assert!(page.is_landscape());
        assert!(!page.with_rotation(90).is_landscape());
    }
}
