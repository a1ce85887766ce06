//! Grid component where scrolling is replaced with a pagination control.
//!
//! [`PagedGrid`] owns a reference to a [`PagedDataSource`] and an embedded
//! [`Pagination`] control, and keeps both synchronized with the grid's sort
//! order, page size, and total item count. Page-change events from the
//! control, sort changes on the grid, and data-source change notifications
//! all funnel into a single recomputation routine that issues one query per
//! render: `size` first to update the control's total, then `fetch` with the
//! same query value to install the visible row set.

use crate::component::{Component, ComponentState};
use crate::datasource::{EmptyDataSource, PagedDataSource, Query, SortDirection, SortOrder};
use crate::error::GridError;
use crate::events::Registration;
use crate::pagination::{PageChangeEvent, Pagination, PaginationLabels, PaginationLocation};
use crate::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A row the grid can display.
pub trait GridItem: Debug + Clone + Send + Sync {
    /// Unique identifier for the row.
    fn id(&self) -> String;

    /// Cell text for a column field.
    fn cell(&self, field: &str) -> String;

    /// Custom styling for this row.
    fn style(&self) -> Option<Style> {
        None
    }

    /// Optional data payload for the row.
    fn data(&self) -> Option<serde_json::Value> {
        None
    }
}

/// Column definition: the field looked up on each row, a header title, and
/// a layout width.
#[derive(Debug, Clone)]
pub struct GridColumn {
    pub field: String,
    pub title: String,
    pub width: Constraint,
}

impl GridColumn {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            width: Constraint::Min(10),
        }
    }

    pub fn with_width(mut self, width: Constraint) -> Self {
        self.width = width;
        self
    }
}

/// Styling for the grid body.
#[derive(Debug, Clone)]
pub struct GridStyling {
    pub header_style: Style,
    pub row_style: Style,
    pub selected_row_style: Style,
    pub border_style: Style,
}

impl Default for GridStyling {
    fn default() -> Self {
        Self {
            header_style: Style::default().add_modifier(Modifier::BOLD),
            row_style: Style::default(),
            selected_row_style: Style::default().add_modifier(Modifier::REVERSED),
            border_style: Style::default().fg(Color::DarkGray),
        }
    }
}

/// Simple map-backed row implementation for common use cases.
#[derive(Debug, Clone)]
pub struct SimpleGridItem {
    id: String,
    cells: HashMap<String, String>,
    style: Option<Style>,
    data: Option<serde_json::Value>,
}

impl SimpleGridItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: HashMap::new(),
            style: None,
            data: None,
        }
    }

    pub fn with_cell(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(field.into(), value.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl GridItem for SimpleGridItem {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn cell(&self, field: &str) -> String {
        self.cells.get(field).cloned().unwrap_or_default()
    }

    fn style(&self) -> Option<Style> {
        self.style
    }

    fn data(&self) -> Option<serde_json::Value> {
        self.data.clone()
    }
}

/// Zero-based offset of the first item on `page` (1-based). A page value of
/// 0 is treated as page 1, not a user-facing page number.
fn page_offset(page: usize, page_size: usize) -> usize {
    if page > 0 {
        (page - 1) * page_size
    } else {
        0
    }
}

/// Grid view with page-based navigation over a paged data source.
pub struct PagedGrid<T, F = ()> {
    columns: Vec<GridColumn>,

    source: Arc<dyn PagedDataSource<T, F>>,
    source_registration: Option<Registration>,

    /// Flipped by the source's change listener, drained by `tick`.
    refresh_pending: Arc<AtomicBool>,

    pagination: Pagination,
    pagination_location: PaginationLocation,
    pagination_container: Option<Rect>,

    sort_orders: Vec<SortOrder>,

    /// The currently visible page of rows.
    rows: Vec<T>,
    selected: Option<usize>,

    state: ComponentState,
    styling: GridStyling,
}

impl<T, F> PagedGrid<T, F>
where
    T: GridItem + 'static,
    F: Send + Sync + 'static,
{
    /// Create a grid with the default page size and no data; the embedder
    /// supplies a source via [`PagedGrid::set_data_source`].
    pub fn new(columns: Vec<GridColumn>) -> Self {
        let mut grid = Self {
            columns,
            source: Arc::new(EmptyDataSource::new()),
            source_registration: None,
            refresh_pending: Arc::new(AtomicBool::new(false)),
            pagination: Pagination::new(),
            pagination_location: PaginationLocation::Bottom,
            pagination_container: None,
            sort_orders: Vec::new(),
            rows: Vec::new(),
            selected: None,
            state: ComponentState::new(),
            styling: GridStyling::default(),
        };
        grid.subscribe();
        grid
    }

    /// Create a grid with a custom page size. Values below 1 are clamped.
    pub fn with_page_size(columns: Vec<GridColumn>, page_size: usize) -> Self {
        let mut grid = Self::new(columns);
        grid.pagination.set_page_size(page_size);
        grid
    }

    /// Replace the active data source.
    ///
    /// A no-op when `source` is the identical reference already installed.
    /// Otherwise the previous source's change listener is removed, pagination
    /// resets to page 1, a change listener is registered on the new source,
    /// any row selection is cleared, and the grid recomputes synchronously.
    pub fn set_data_source(&mut self, source: Arc<dyn PagedDataSource<T, F>>) -> Result<()> {
        if Arc::ptr_eq(&self.source, &source) {
            return Ok(());
        }
        if let Some(registration) = self.source_registration.take() {
            registration.remove();
        }
        debug!("replacing data source");
        self.source = source;
        self.pagination.set_page(1);
        self.subscribe();
        self.selected = None;
        self.recompute(self.pagination.page())
    }

    pub fn data_source(&self) -> &Arc<dyn PagedDataSource<T, F>> {
        &self.source
    }

    fn subscribe(&mut self) {
        let pending = Arc::clone(&self.refresh_pending);
        let registration = self.source.add_change_listener(Box::new(move || {
            pending.store(true, Ordering::SeqCst);
        }));
        self.source_registration = Some(registration);
    }

    /// Set the page size and reset to page 1.
    ///
    /// Calling with the value already held still resets to page 1.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize(page_size).into());
        }
        self.pagination.set_page_size(page_size);
        self.refresh_paginator()
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size()
    }

    /// Navigate to `page` programmatically. Routes through the same
    /// recomputation path as a user-driven page change, so registered
    /// page-change listeners are notified; out-of-range pages are clamped.
    pub fn set_page(&mut self, page: usize) -> Result<()> {
        if let Some(change) = self.pagination.select_page(page) {
            self.recompute(change.new_page)?;
        }
        Ok(())
    }

    pub fn page(&self) -> usize {
        self.pagination.page()
    }

    /// Set the paginator window size: resets to page 1 and re-renders the
    /// control without re-fetching data.
    pub fn set_paginator_window_size(&mut self, window_size: usize) -> Result<()> {
        if window_size == 0 {
            return Err(GridError::InvalidWindowSize(window_size).into());
        }
        self.pagination.set_page(1);
        self.pagination.set_window_size(window_size);
        self.pagination.refresh();
        Ok(())
    }

    /// Set the texts displayed on the paginator, for localization.
    pub fn set_pagination_labels(
        &mut self,
        page_label: impl Into<String>,
        of_label: impl Into<String>,
    ) {
        self.pagination.set_labels(PaginationLabels {
            page: page_label.into(),
            of: of_label.into(),
        });
    }

    /// Toggle whether the pagination control is rendered; data flow is
    /// unaffected.
    pub fn set_pagination_visibility(&mut self, visible: bool) {
        self.pagination.set_visible(visible);
    }

    pub fn pagination_location(&self) -> PaginationLocation {
        self.pagination_location
    }

    pub fn set_pagination_location(&mut self, location: PaginationLocation) {
        self.pagination_location = location;
    }

    /// Designate an explicit screen region for the pagination control. When
    /// set, the location directive is ignored.
    pub fn set_pagination_container(&mut self, container: Option<Rect>) {
        self.pagination_container = container;
    }

    /// Subscribe to page-change events from the embedded control.
    pub fn add_page_change_listener<L>(&self, listener: L) -> Registration
    where
        L: Fn(&PageChangeEvent) + Send + Sync + 'static,
    {
        self.pagination.add_page_change_listener(listener)
    }

    /// Read access to the embedded control.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Reset the paginator to page 1, recompute, and force a control
    /// re-render.
    pub fn refresh_paginator(&mut self) -> Result<()> {
        self.pagination.set_page(1);
        self.recompute(self.pagination.page())?;
        self.pagination.refresh();
        Ok(())
    }

    /// Replace the sort order and re-fetch the current page window under the
    /// new order. Sorting never resets the page.
    pub fn sort(&mut self, orders: Vec<SortOrder>) -> Result<()> {
        self.sort_orders = orders;
        self.recompute(self.pagination.page())
    }

    /// Column-header toggle: ascending, then descending, then unsorted.
    pub fn toggle_sort(&mut self, field: &str) -> Result<()> {
        let next = match self.sort_orders.first() {
            Some(order) if order.field == field => match order.direction {
                SortDirection::Ascending => vec![SortOrder::descending(field)],
                SortDirection::Descending => Vec::new(),
            },
            _ => vec![SortOrder::ascending(field)],
        };
        self.sort(next)
    }

    pub fn sort_orders(&self) -> &[SortOrder] {
        &self.sort_orders
    }

    /// The currently visible page of rows.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn select_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.selected = Some(index);
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&T> {
        self.selected.and_then(|index| self.rows.get(index))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_styling(&mut self, styling: GridStyling) {
        self.styling = styling;
    }

    /// Recompute the visible window for `page`: build one query, push the
    /// source's total into the control, then fetch the row set with the same
    /// query value.
    fn recompute(&mut self, page: usize) -> Result<()> {
        let page_size = self.pagination.page_size();
        let offset = page_offset(page, page_size);
        let query = Query::new(offset, page_size, self.sort_orders.clone(), None);

        let total = self.source.size(&query)?;
        self.pagination.set_total(total);

        let rows = self.source.fetch(&query)?;
        debug!(
            page,
            offset,
            limit = page_size,
            total,
            rows = rows.len(),
            "recomputed page window"
        );
        if let Some(index) = self.selected {
            if index >= rows.len() {
                self.selected = None;
            }
        }
        self.rows = rows;
        Ok(())
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = None;
            return;
        }
        let next = match self.selected {
            None => 0,
            Some(current) if delta.is_negative() => current.saturating_sub(delta.unsigned_abs()),
            Some(current) => (current + delta.unsigned_abs()).min(self.rows.len() - 1),
        };
        self.selected = Some(next);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(self.columns.iter().map(|column| {
            let mut title = column.title.clone();
            if let Some(order) = self
                .sort_orders
                .iter()
                .find(|order| order.field == column.field)
            {
                title.push_str(match order.direction {
                    SortDirection::Ascending => " ▲",
                    SortDirection::Descending => " ▼",
                });
            }
            Cell::from(title)
        }))
        .style(self.styling.header_style);

        let rows = self.rows.iter().enumerate().map(|(index, item)| {
            let cells = self
                .columns
                .iter()
                .map(|column| Cell::from(item.cell(&column.field)));
            let style = if self.selected == Some(index) {
                self.styling.selected_row_style
            } else {
                item.style().unwrap_or(self.styling.row_style)
            };
            Row::new(cells).style(style)
        });

        let widths: Vec<Constraint> = self.columns.iter().map(|column| column.width).collect();
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.styling.border_style),
            )
            .column_spacing(1);
        frame.render_widget(table, area);
    }
}

impl<T, F> Component for PagedGrid<T, F>
where
    T: GridItem + 'static,
    F: Send + Sync + 'static,
{
    fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        match event.code {
            KeyCode::Up => {
                self.move_selection(-1);
                Ok(())
            }
            KeyCode::Down => {
                self.move_selection(1);
                Ok(())
            }
            _ => {
                if let Some(change) = self.pagination.handle_key_event(event) {
                    self.recompute(change.new_page)?;
                }
                Ok(())
            }
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<()> {
        if let Some(change) = self.pagination.handle_mouse_event(event) {
            self.recompute(change.new_page)?;
        }
        Ok(())
    }

    /// Drain pending data-source change notifications: each one triggers a
    /// full recomputation on the event loop, never inside the notifying
    /// thread.
    fn tick(&mut self) -> Result<()> {
        if self.refresh_pending.swap(false, Ordering::SeqCst) {
            self.refresh_paginator()?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.size = area;

        if let Some(container) = self.pagination_container {
            // Explicit container: the location directive is ignored and the
            // grid body keeps the full area.
            self.pagination.render(frame, container);
            self.render_body(frame, area);
            return;
        }
        if !self.pagination.is_visible() {
            self.render_body(frame, area);
            return;
        }

        let (strip, body) = match self.pagination_location {
            PaginationLocation::Top => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Min(0)])
                    .split(area);
                (chunks[0], chunks[1])
            }
            PaginationLocation::Bottom => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(1)])
                    .split(area);
                (chunks[1], chunks[0])
            }
        };
        self.pagination.render(frame, strip);
        self.render_body(frame, body);
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }

    fn has_focus(&self) -> bool {
        self.state.has_focus
    }

    fn set_focus(&mut self, focus: bool) {
        self.state.has_focus = focus;
    }

    fn is_visible(&self) -> bool {
        self.state.is_visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.is_visible = visible;
    }
}
