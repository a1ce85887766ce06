//! Pagination control driven by the grid.
//!
//! Tracks the current page, total item count, page size, and the window of
//! page numbers shown around the current page. Page changes come in on two
//! paths: user-originated ones (`select_*`, key and mouse handlers) emit a
//! [`PageChangeEvent`] to registered listeners, while the direct [`set_page`]
//! path changes the page silently so the grid's own resets never echo back
//! as public events.
//!
//! [`set_page`]: Pagination::set_page

use crate::events::{ListenerSet, Registration};
use crate::Frame;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::trace;

/// Where the pagination strip sits relative to the grid body.
///
/// Purely a layout directive; it has no effect on data flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationLocation {
    Top,
    Bottom,
}

/// The two configurable label strings, for localization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLabels {
    /// Text for the `Page` term.
    pub page: String,
    /// Text for the `of` term.
    pub of: String,
}

impl Default for PaginationLabels {
    fn default() -> Self {
        Self {
            page: "Page".to_string(),
            of: "of".to_string(),
        }
    }
}

/// Styling for the pagination strip.
#[derive(Debug, Clone)]
pub struct PaginationStyling {
    /// Style for the current page number.
    pub current_page_style: Style,

    /// Style for other page numbers.
    pub page_style: Style,

    /// Style for the navigation arrows.
    pub navigation_style: Style,

    /// Style for arrows with no page to go to.
    pub disabled_style: Style,

    /// Style for the label text.
    pub text_style: Style,
}

impl Default for PaginationStyling {
    fn default() -> Self {
        Self {
            current_page_style: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            page_style: Style::default().fg(Color::Blue),
            navigation_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            disabled_style: Style::default().fg(Color::DarkGray),
            text_style: Style::default(),
        }
    }
}

/// Emitted whenever the active page changes as a result of user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChangeEvent {
    pub old_page: usize,
    pub new_page: usize,
}

/// Presentational pagination control.
///
/// Pages are 1-based. The invariant `1 <= page <= last_page()` holds after
/// every state transition; pages beyond a shrunken last page are clamped
/// down silently since that reflects data change, not user navigation.
#[derive(Debug)]
pub struct Pagination {
    /// Current page (1-based).
    page: usize,

    /// Items per page.
    page_size: usize,

    /// Total number of items across all pages.
    total_items: usize,

    /// Count of page-number buttons shown around the current page.
    window_size: usize,

    labels: PaginationLabels,
    styling: PaginationStyling,
    visible: bool,

    /// Strip area from the last render, for mouse hit-testing.
    area: Rect,

    /// Rendered line cache, dropped on any state change or `refresh()`.
    cached_line: Option<Line<'static>>,

    listeners: ListenerSet<PageChangeEvent>,
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: usize = 20;
    pub const DEFAULT_WINDOW_SIZE: usize = 5;

    pub fn new() -> Self {
        Self {
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
            total_items: 0,
            window_size: Self::DEFAULT_WINDOW_SIZE,
            labels: PaginationLabels::default(),
            styling: PaginationStyling::default(),
            visible: true,
            area: Rect::default(),
            cached_line: None,
            listeners: ListenerSet::new(),
        }
    }

    /// Set the total item count, silently clamping the current page.
    pub fn set_total(&mut self, total: usize) {
        self.total_items = total;
        self.page = self.page.clamp(1, self.last_page());
        self.invalidate();
    }

    /// Set the page size. Values below 1 are clamped to 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = self.page.clamp(1, self.last_page());
        self.invalidate();
    }

    /// Direct page set: clamps into `[1, last_page]` and emits no event.
    ///
    /// This is the grid's reset path; user navigation goes through
    /// [`Pagination::select_page`] instead.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.last_page());
        self.invalidate();
    }

    /// Set the count of page-number buttons shown around the current page.
    pub fn set_window_size(&mut self, window_size: usize) {
        self.window_size = window_size.max(1);
        self.invalidate();
    }

    /// Force a re-render without any state change.
    pub fn refresh(&mut self) {
        self.cached_line = None;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_labels(&mut self, labels: PaginationLabels) {
        self.labels = labels;
        self.invalidate();
    }

    pub fn set_styling(&mut self, styling: PaginationStyling) {
        self.styling = styling;
        self.invalidate();
    }

    /// Navigate to `page` on behalf of the user.
    ///
    /// The target is clamped into `[1, last_page]`; if the clamped page
    /// differs from the current one, listeners are notified and the event is
    /// returned for the caller to act on.
    pub fn select_page(&mut self, page: usize) -> Option<PageChangeEvent> {
        let target = page.clamp(1, self.last_page());
        if target == self.page {
            return None;
        }
        let event = PageChangeEvent {
            old_page: self.page,
            new_page: target,
        };
        self.page = target;
        self.invalidate();
        trace!(old_page = event.old_page, new_page = event.new_page, "page change");
        self.listeners.notify(&event);
        Some(event)
    }

    pub fn select_next(&mut self) -> Option<PageChangeEvent> {
        self.select_page(self.page.saturating_add(1))
    }

    pub fn select_previous(&mut self) -> Option<PageChangeEvent> {
        self.select_page(self.page.saturating_sub(1).max(1))
    }

    pub fn select_first(&mut self) -> Option<PageChangeEvent> {
        self.select_page(1)
    }

    pub fn select_last(&mut self) -> Option<PageChangeEvent> {
        self.select_page(self.last_page())
    }

    /// Subscribe to user-originated page changes.
    pub fn add_page_change_listener<L>(&self, listener: L) -> Registration
    where
        L: Fn(&PageChangeEvent) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn labels(&self) -> &PaginationLabels {
        &self.labels
    }

    /// Last valid page: `ceil(total / page_size)`, or 1 when there are no
    /// items.
    pub fn last_page(&self) -> usize {
        if self.total_items == 0 {
            1
        } else {
            (self.total_items + self.page_size - 1) / self.page_size
        }
    }

    /// The visible page-number window: centered on the current page, at most
    /// `window_size` wide, clamped to `[1, last_page]`.
    pub fn page_window(&self) -> RangeInclusive<usize> {
        let last = self.last_page();
        let width = self.window_size.min(last);
        let half = width / 2;

        let mut start = self.page.saturating_sub(half).max(1);
        if start + width - 1 > last {
            start = last + 1 - width;
        }
        start..=start + width - 1
    }

    /// Handle a key event, returning the page change it caused, if any.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<PageChangeEvent> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.select_previous(),
            KeyCode::Right | KeyCode::Char('l') => self.select_next(),
            KeyCode::Home => self.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.select_last(),
            _ => None,
        }
    }

    /// Handle a mouse event, returning the page change it caused, if any.
    ///
    /// Scroll pages backward/forward; a left click on the left half of the
    /// strip goes to the previous page, on the right half to the next.
    pub fn handle_mouse_event(&mut self, event: MouseEvent) -> Option<PageChangeEvent> {
        if !self.visible || !self.hit(event.column, event.row) {
            return None;
        }
        match event.kind {
            MouseEventKind::ScrollUp => self.select_previous(),
            MouseEventKind::ScrollDown => self.select_next(),
            MouseEventKind::Down(MouseButton::Left) => {
                if event.column < self.area.x + self.area.width / 2 {
                    self.select_previous()
                } else {
                    self.select_next()
                }
            }
            _ => None,
        }
    }

    /// Whether a screen position falls inside the last rendered strip area.
    pub fn hit(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.x.saturating_add(self.area.width)
            && row >= self.area.y
            && row < self.area.y.saturating_add(self.area.height)
    }

    /// Render the strip into `area`. Hidden controls render nothing but
    /// still remember the area for hit-testing consistency.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.area = area;
        if !self.visible {
            return;
        }
        if self.cached_line.is_none() {
            self.cached_line = Some(self.build_line());
        }
        let line = self.cached_line.clone().unwrap_or_default();
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn invalidate(&mut self) {
        self.cached_line = None;
    }

    fn build_line(&self) -> Line<'static> {
        let last = self.last_page();
        let mut spans = Vec::new();

        spans.push(Span::styled(
            "« ",
            if self.page > 1 {
                self.styling.navigation_style
            } else {
                self.styling.disabled_style
            },
        ));

        for page in self.page_window() {
            if page == self.page {
                spans.push(Span::styled(
                    format!("[{}] ", page),
                    self.styling.current_page_style,
                ));
            } else {
                spans.push(Span::styled(format!("{} ", page), self.styling.page_style));
            }
        }

        spans.push(Span::styled(
            "»",
            if self.page < last {
                self.styling.navigation_style
            } else {
                self.styling.disabled_style
            },
        ));

        spans.push(Span::styled(
            format!("  {} {} {} {}", self.labels.page, self.page, self.labels.of, last),
            self.styling.text_style,
        ));

        Line::from(spans)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}
