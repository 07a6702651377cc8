#![forbid(unsafe_code)]

//! What the drivers need from the screen being presented.

use crate::scene::NodeId;

/// A detail screen that can be carried by the card transition.
///
/// Drivers never look past this trait: they move `content_node` around the
/// scene and drive scrolling through `scroll_node`.
pub trait PresentedScreen {
    /// Root node of the screen's content; this is what travels.
    fn content_node(&self) -> NodeId;

    /// Node holding the scroll offset reset on dismissal.
    fn scroll_node(&self) -> NodeId {
        self.content_node()
    }

    /// Corner radius to use for the card shape instead of the origin's.
    fn card_corner_radius(&self) -> Option<f64> {
        None
    }
}

/// A screen described by plain node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenNodes {
    pub content: NodeId,
    pub scroll: NodeId,
}

impl ScreenNodes {
    /// Content that scrolls itself.
    #[must_use]
    pub fn new(content: NodeId) -> Self {
        Self {
            content,
            scroll: content,
        }
    }

    #[must_use]
    pub fn with_scroll(mut self, scroll: NodeId) -> Self {
        self.scroll = scroll;
        self
    }
}

impl PresentedScreen for ScreenNodes {
    fn content_node(&self) -> NodeId {
        self.content
    }

    fn scroll_node(&self) -> NodeId {
        self.scroll
    }
}
