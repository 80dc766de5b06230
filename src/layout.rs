use std::collections::HashMap;

use crate::dom::{Dom, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i64,
    pub height: i64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

/// Vertical extent of an element, in document coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutBox {
    pub top: i64,
    pub height: i64,
}

impl LayoutBox {
    pub fn new(top: i64, height: i64) -> Self {
        Self {
            top,
            height: height.max(0),
        }
    }

    pub fn bottom(&self) -> i64 {
        self.top.saturating_add(self.height)
    }

    /// Half-open: `top <= y < bottom`.
    pub fn contains(&self, y: i64) -> bool {
        self.top <= y && y < self.bottom()
    }
}

/// Percentage of the scrollable range covered by `scroll_y`, in `[0, 100]`.
///
/// A document that does not scroll reports 0.
pub fn scroll_progress_percent(scroll_y: i64, document_height: i64, viewport_height: i64) -> f64 {
    let scrollable = document_height.saturating_sub(viewport_height);
    if scrollable <= 0 {
        return 0.0;
    }
    let ratio = scroll_y.clamp(0, scrollable) as f64 / scrollable as f64;
    (ratio * 100.0).clamp(0.0, 100.0)
}

/// Geometry the page cannot compute itself: the viewport, the scroll offset and
/// the boxes the host assigned to elements.
#[derive(Debug, Default)]
pub(crate) struct LayoutState {
    viewport: Viewport,
    scroll_y: i64,
    document_height: Option<i64>,
    boxes: HashMap<NodeId, LayoutBox>,
}

impl LayoutState {
    pub(crate) fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub(crate) fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Layout setters re-clamp the scroll offset and return the offset from
    /// before the change.
    pub(crate) fn set_viewport(&mut self, viewport: Viewport) -> i64 {
        self.viewport = viewport;
        self.reclamp()
    }

    pub(crate) fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    /// Moves the scroll offset, clamped to the scrollable range. Returns the
    /// offset actually applied.
    pub(crate) fn scroll_to(&mut self, y: i64) -> i64 {
        self.scroll_y = self.clamp_scroll(y);
        self.scroll_y
    }

    pub(crate) fn set_document_height(&mut self, height: i64) -> i64 {
        self.document_height = Some(height.max(0));
        self.reclamp()
    }

    /// Explicit height when set, otherwise the lowest assigned box bottom,
    /// never less than the viewport.
    pub(crate) fn document_height(&self) -> i64 {
        let content = self.document_height.unwrap_or_else(|| {
            self.boxes
                .values()
                .map(LayoutBox::bottom)
                .max()
                .unwrap_or(0)
        });
        content.max(self.viewport.height)
    }

    pub(crate) fn max_scroll(&self) -> i64 {
        (self.document_height() - self.viewport.height).max(0)
    }

    fn clamp_scroll(&self, y: i64) -> i64 {
        y.clamp(0, self.max_scroll())
    }

    fn reclamp(&mut self) -> i64 {
        let previous = self.scroll_y;
        self.scroll_y = self.clamp_scroll(previous);
        previous
    }

    pub(crate) fn set_box(&mut self, node: NodeId, layout_box: LayoutBox) -> i64 {
        self.boxes.insert(node, layout_box);
        self.reclamp()
    }

    pub(crate) fn box_of(&self, node: NodeId) -> Option<LayoutBox> {
        self.boxes.get(&node).copied()
    }

    /// Box of the node or of its nearest ancestor that has one. Text and
    /// markers have no box of their own.
    pub(crate) fn nearest_box(&self, dom: &Dom, node: NodeId) -> Option<LayoutBox> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(found) = self.box_of(current) {
                return Some(found);
            }
            cursor = dom.parent(current);
        }
        None
    }

    pub(crate) fn progress_percent(&self) -> f64 {
        scroll_progress_percent(self.scroll_y, self.document_height(), self.viewport.height)
    }
}
