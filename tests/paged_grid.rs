//! Integration tests for the grid/pagination/data-source synchronization.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use paged_grid::{
    ChangeListener, Component, GridColumn, GridItem, InMemoryDataSource, ListenerSet,
    PagedDataSource, PagedGrid, PaginationLocation, Query, Registration, SimpleGridItem, SortOrder,
};
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::sync::{Arc, Mutex};

fn items(n: usize) -> Vec<SimpleGridItem> {
    (0..n)
        .map(|i| {
            SimpleGridItem::new(format!("item-{i}"))
                .with_cell("index", i.to_string())
                .with_cell("name", format!("Name {i}"))
        })
        .collect()
}

fn numeric_source(n: usize) -> Arc<InMemoryDataSource<SimpleGridItem>> {
    Arc::new(InMemoryDataSource::new(items(n)).with_sort_comparator(
        |a: &SimpleGridItem, b: &SimpleGridItem, field| {
            let left: usize = a.cell(field).parse().unwrap_or_default();
            let right: usize = b.cell(field).parse().unwrap_or_default();
            left.cmp(&right)
        },
    ))
}

fn grid(n: usize) -> PagedGrid<SimpleGridItem> {
    let mut grid = PagedGrid::with_page_size(
        vec![
            GridColumn::new("index", "#"),
            GridColumn::new("name", "Name"),
        ],
        10,
    );
    grid.set_data_source(numeric_source(n)).unwrap();
    grid
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn ninety_five_items_paginate_into_ten_pages() -> Result<()> {
    let mut grid = grid(95);
    assert_eq!(grid.pagination().last_page(), 10);

    grid.set_page(10)?;
    assert_eq!(grid.rows().len(), 5);
    assert_eq!(grid.rows()[0].id(), "item-90");
    Ok(())
}

#[test]
fn out_of_range_page_is_clamped_to_the_last_page() -> Result<()> {
    let mut grid = grid(95);

    grid.set_page(11)?;
    assert_eq!(grid.page(), 10);
    assert_eq!(grid.rows().len(), 5);

    // Already on the last page: a further out-of-range request changes
    // nothing and triggers no re-fetch.
    grid.set_page(99)?;
    assert_eq!(grid.page(), 10);
    Ok(())
}

#[test]
fn row_count_matches_the_window_arithmetic() -> Result<()> {
    let mut grid = grid(95);
    for page in 1..=10usize {
        grid.set_page(page)?;
        let offset = (page - 1) * 10;
        assert_eq!(grid.rows().len(), 10.min(95 - offset));
    }
    Ok(())
}

#[test]
fn sorting_keeps_the_current_page() -> Result<()> {
    let mut grid = grid(50);
    grid.set_page(3)?;

    grid.sort(vec![SortOrder::descending("index")])?;
    assert_eq!(grid.page(), 3);

    // Page 3 under descending order covers indices 29..=20.
    assert_eq!(grid.rows()[0].cell("index"), "29");
    assert_eq!(grid.rows()[9].cell("index"), "20");
    Ok(())
}

#[test]
fn swapping_the_source_resets_to_page_one_and_detaches_the_old_listener() -> Result<()> {
    let mut grid = grid(30);
    let old = numeric_source(30);
    grid.set_data_source(old.clone())?;
    grid.set_page(2)?;

    let new = numeric_source(95);
    grid.set_data_source(new.clone())?;
    assert_eq!(grid.page(), 1);
    assert_eq!(grid.pagination().total_items(), 95);

    // The old source's change notifications must no longer reach the grid: a
    // stale notification would reset the page on the next tick.
    grid.set_page(5)?;
    old.push(SimpleGridItem::new("stale"));
    grid.tick()?;
    assert_eq!(grid.page(), 5);

    // The new source's notifications do.
    new.push(SimpleGridItem::new("item-95").with_cell("index", "95"));
    grid.tick()?;
    assert_eq!(grid.page(), 1);
    assert_eq!(grid.pagination().total_items(), 96);
    Ok(())
}

#[test]
fn installing_the_identical_source_is_a_no_op() -> Result<()> {
    let mut grid = grid(50);
    let source = numeric_source(50);
    grid.set_data_source(source.clone())?;
    grid.set_page(3)?;

    grid.set_data_source(source)?;
    assert_eq!(grid.page(), 3);
    Ok(())
}

#[test]
fn setting_the_held_page_size_still_resets_to_page_one() -> Result<()> {
    let mut grid = grid(50);
    grid.set_page(3)?;

    grid.set_page_size(10)?;
    assert_eq!(grid.page(), 1);
    assert_eq!(grid.page_size(), 10);
    Ok(())
}

#[test]
fn page_change_events_fire_for_navigation_but_not_for_resets() -> Result<()> {
    let mut grid = grid(95);
    let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let _registration = grid.add_page_change_listener(move |event| {
        sink.lock().unwrap().push((event.old_page, event.new_page));
    });

    grid.handle_key_event(key(KeyCode::Right))?;
    grid.set_page(5)?;

    // Reset paths go through the direct set and stay silent.
    grid.set_page_size(10)?;
    grid.set_data_source(numeric_source(20))?;

    assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 5)]);
    Ok(())
}

#[test]
fn keyboard_navigation_walks_pages_and_refetches() -> Result<()> {
    let mut grid = grid(95);

    grid.handle_key_event(key(KeyCode::Right))?;
    assert_eq!(grid.page(), 2);
    assert_eq!(grid.rows()[0].id(), "item-10");

    grid.handle_key_event(key(KeyCode::End))?;
    assert_eq!(grid.page(), 10);
    assert_eq!(grid.rows().len(), 5);

    grid.handle_key_event(key(KeyCode::Home))?;
    assert_eq!(grid.page(), 1);
    assert_eq!(grid.rows()[0].id(), "item-0");
    Ok(())
}

/// Source that records every query it serves, for asserting that `size` and
/// `fetch` always observe the same query value.
struct RecordingSource {
    total: usize,
    size_queries: Mutex<Vec<(usize, usize, Vec<SortOrder>)>>,
    fetch_queries: Mutex<Vec<(usize, usize, Vec<SortOrder>)>>,
    listeners: ListenerSet<()>,
}

impl RecordingSource {
    fn new(total: usize) -> Self {
        Self {
            total,
            size_queries: Mutex::new(Vec::new()),
            fetch_queries: Mutex::new(Vec::new()),
            listeners: ListenerSet::new(),
        }
    }

    fn snapshot(query: &Query) -> (usize, usize, Vec<SortOrder>) {
        (query.offset, query.limit, query.sort_orders.clone())
    }
}

impl PagedDataSource<SimpleGridItem> for RecordingSource {
    fn size(&self, query: &Query) -> Result<usize> {
        self.size_queries.lock().unwrap().push(Self::snapshot(query));
        Ok(self.total)
    }

    fn fetch(&self, query: &Query) -> Result<Vec<SimpleGridItem>> {
        self.fetch_queries.lock().unwrap().push(Self::snapshot(query));
        let end = query.offset.saturating_add(query.limit).min(self.total);
        Ok((query.offset..end)
            .map(|i| SimpleGridItem::new(format!("item-{i}")).with_cell("index", i.to_string()))
            .collect())
    }

    fn add_change_listener(&self, listener: ChangeListener) -> Registration {
        self.listeners.add(move |_| listener())
    }
}

#[test]
fn size_and_fetch_always_see_the_same_query() -> Result<()> {
    let source = Arc::new(RecordingSource::new(95));
    let mut grid = PagedGrid::with_page_size(vec![GridColumn::new("index", "#")], 10);
    grid.set_data_source(source.clone())?;

    grid.set_page(10)?;
    grid.sort(vec![SortOrder::ascending("index")])?;
    grid.handle_key_event(key(KeyCode::Left))?;

    let sizes = source.size_queries.lock().unwrap();
    let fetches = source.fetch_queries.lock().unwrap();
    assert_eq!(sizes.len(), 4);
    assert_eq!(*sizes, *fetches);

    // The page-10 recomputation queried offset 90 with the full page limit.
    assert_eq!(sizes[1], (90, 10, Vec::new()));
    Ok(())
}

#[test]
fn window_size_change_re_renders_without_re_fetching() -> Result<()> {
    let source = Arc::new(RecordingSource::new(95));
    let mut grid = PagedGrid::with_page_size(vec![GridColumn::new("index", "#")], 10);
    grid.set_data_source(source.clone())?;
    grid.set_page(4)?;
    assert_eq!(source.fetch_queries.lock().unwrap().len(), 2);

    grid.set_paginator_window_size(3)?;
    assert_eq!(grid.page(), 1);
    assert_eq!(source.fetch_queries.lock().unwrap().len(), 2);
    assert_eq!(grid.pagination().window_size(), 3);
    Ok(())
}

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol.as_str())
        .collect()
}

#[test]
fn render_places_the_strip_per_location() -> Result<()> {
    let mut grid = grid(95);
    let mut terminal = Terminal::new(TestBackend::new(40, 12))?;

    terminal.draw(|frame| {
        let area = frame.size();
        grid.render(frame, area);
    })?;
    let text = buffer_text(&terminal);
    assert!(text.contains("Page 1 of 10"));
    assert!(text.contains("Name"));

    grid.set_pagination_location(PaginationLocation::Top);
    terminal.draw(|frame| {
        let area = frame.size();
        grid.render(frame, area);
    })?;
    assert!(buffer_text(&terminal).contains("Page 1 of 10"));
    Ok(())
}

#[test]
fn hidden_pagination_renders_only_the_body() -> Result<()> {
    let mut grid = grid(95);
    grid.set_pagination_visibility(false);
    let mut terminal = Terminal::new(TestBackend::new(40, 12))?;

    terminal.draw(|frame| {
        let area = frame.size();
        grid.render(frame, area);
    })?;
    let text = buffer_text(&terminal);
    assert!(!text.contains("Page 1 of 10"));
    assert!(text.contains("Name"));
    Ok(())
}

#[test]
fn explicit_container_overrides_the_location() -> Result<()> {
    let mut grid = grid(95);
    grid.set_pagination_location(PaginationLocation::Bottom);
    grid.set_pagination_container(Some(Rect::new(0, 0, 40, 1)));
    let mut terminal = Terminal::new(TestBackend::new(40, 12))?;

    terminal.draw(|frame| {
        let area = frame.size();
        grid.render(frame, area);
    })?;
    let text = buffer_text(&terminal);
    assert!(text.contains("Page 1 of 10"));
    Ok(())
}

#[test]
fn pagination_labels_are_configurable() -> Result<()> {
    let mut grid = grid(95);
    grid.set_pagination_labels("Seite", "von");
    let mut terminal = Terminal::new(TestBackend::new(40, 12))?;

    terminal.draw(|frame| {
        let area = frame.size();
        grid.render(frame, area);
    })?;
    assert!(buffer_text(&terminal).contains("Seite 1 von 10"));
    Ok(())
}

#[test]
fn mouse_scroll_on_the_strip_changes_pages() -> Result<()> {
    let mut grid = grid(95);
    let mut terminal = Terminal::new(TestBackend::new(40, 12))?;
    terminal.draw(|frame| {
        let area = frame.size();
        grid.render(frame, area);
    })?;

    // Strip sits on the bottom row by default.
    grid.handle_mouse_event(MouseEvent {
        kind: MouseEventKind::ScrollDown,
        column: 5,
        row: 11,
        modifiers: KeyModifiers::NONE,
    })?;
    assert_eq!(grid.page(), 2);

    // Scrolling over the body is not pagination input.
    grid.handle_mouse_event(MouseEvent {
        kind: MouseEventKind::ScrollDown,
        column: 5,
        row: 0,
        modifiers: KeyModifiers::NONE,
    })?;
    assert_eq!(grid.page(), 2);
    Ok(())
}

#[test]
fn source_mutation_is_picked_up_on_the_next_tick() -> Result<()> {
    let source = numeric_source(15);
    let mut grid = PagedGrid::with_page_size(
        vec![GridColumn::new("index", "#")],
        10,
    );
    grid.set_data_source(source.clone())?;
    assert_eq!(grid.pagination().last_page(), 2);

    for i in 15..25 {
        source.push(SimpleGridItem::new(format!("item-{i}")).with_cell("index", i.to_string()));
    }
    grid.tick()?;
    assert_eq!(grid.pagination().total_items(), 25);
    assert_eq!(grid.pagination().last_page(), 3);
    assert_eq!(grid.page(), 1);
    Ok(())
}

#[test]
fn filtered_sources_report_filtered_totals() -> Result<()> {
    // The grid itself always queries with an empty filter; a filtering
    // backend still composes through the same trait.
    let source: InMemoryDataSource<SimpleGridItem, String> =
        InMemoryDataSource::new(items(20)).with_filter(|item, needle: &String| {
            item.cell("name").contains(needle.as_str())
        });
    let query = Query::new(0, 50, Vec::new(), Some("Name 1".to_string()));

    // "Name 1" plus "Name 10".."Name 19".
    assert_eq!(source.size(&query)?, 11);
    assert_eq!(source.fetch(&query)?.len(), 11);
    Ok(())
}
