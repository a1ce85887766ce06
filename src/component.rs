//! Base trait and shared state for UI components.

use crate::Frame;
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;

/// Base trait for all UI components.
///
/// Components are single-threaded and event-driven: every handler runs to
/// completion on the UI event loop before the next one is dispatched.
pub trait Component: Send + Sync {
    /// Handle keyboard input.
    fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        let _ = event;
        Ok(())
    }

    /// Handle mouse input.
    fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<()> {
        let _ = event;
        Ok(())
    }

    /// Handle periodic updates.
    fn tick(&mut self) -> Result<()> {
        Ok(())
    }

    /// Render the component.
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Get component dimensions.
    fn size(&self) -> Rect;

    /// Set component dimensions.
    fn set_size(&mut self, size: Rect);

    /// Check if component has focus.
    fn has_focus(&self) -> bool {
        false
    }

    /// Set component focus.
    fn set_focus(&mut self, focus: bool) {
        let _ = focus;
    }

    /// Check if component is visible.
    fn is_visible(&self) -> bool {
        true
    }

    /// Set component visibility.
    fn set_visible(&mut self, visible: bool) {
        let _ = visible;
    }
}

/// Base component state.
#[derive(Debug, Clone)]
pub struct ComponentState {
    pub size: Rect,
    pub has_focus: bool,
    pub is_visible: bool,
}

impl Default for ComponentState {
    fn default() -> Self {
        Self {
            size: Rect::default(),
            has_focus: false,
            is_visible: true,
        }
    }
}

impl ComponentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: Rect) -> Self {
        self.size = size;
        self
    }

    pub fn with_focus(mut self, focus: bool) -> Self {
        self.has_focus = focus;
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }
}
