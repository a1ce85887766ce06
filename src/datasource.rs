//! Paged data-source contract consumed by the grid.
//!
//! A data source is a capability object with two query methods and a change
//! subscription. Alternate backends (in-memory list, remote API, database
//! cursor) plug in by implementing [`PagedDataSource`]; the grid only ever
//! holds a shared reference and never assumes a concrete type.

use crate::events::{ListenerSet, Registration};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Mutex;
use tracing::trace;

/// Callback invoked when a data source's underlying item set changes.
pub type ChangeListener = Box<dyn Fn() + Send + Sync>;

/// Ordering direction for a sorted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A single sort criterion: a field name and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Immutable description of one page-window request.
///
/// A query is constructed fresh for every recomputation and never mutated;
/// the grid issues `size` and `fetch` against the same value so total and
/// fetched window can never disagree about offset, limit, or sort order.
#[derive(Debug, Clone)]
pub struct Query<F = ()> {
    /// Zero-based index of the first requested item.
    pub offset: usize,
    /// Maximum number of items to return.
    pub limit: usize,
    /// Sort criteria, most significant first.
    pub sort_orders: Vec<SortOrder>,
    /// Optional backend filter.
    pub filter: Option<F>,
}

impl<F> Query<F> {
    pub fn new(offset: usize, limit: usize, sort_orders: Vec<SortOrder>, filter: Option<F>) -> Self {
        Self {
            offset,
            limit,
            sort_orders,
            filter,
        }
    }

    /// The item-index window this query covers.
    pub fn window(&self) -> Range<usize> {
        self.offset..self.offset.saturating_add(self.limit)
    }
}

/// Capability contract for paged data access.
///
/// `size` reports the total number of items matching the query's filter;
/// `fetch` returns the items inside the query's window. Errors from either
/// method propagate to the embedding application untouched; the grid
/// performs no retries.
pub trait PagedDataSource<T, F = ()>: Send + Sync {
    fn size(&self, query: &Query<F>) -> Result<usize>;

    fn fetch(&self, query: &Query<F>) -> Result<Vec<T>>;

    /// Subscribe to change notifications for the underlying item set.
    fn add_change_listener(&self, listener: ChangeListener) -> Registration;
}

/// Data source with no items, installed until the embedder supplies one.
#[derive(Debug, Default)]
pub struct EmptyDataSource {
    listeners: ListenerSet<()>,
}

impl EmptyDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, F> PagedDataSource<T, F> for EmptyDataSource {
    fn size(&self, _query: &Query<F>) -> Result<usize> {
        Ok(0)
    }

    fn fetch(&self, _query: &Query<F>) -> Result<Vec<T>> {
        Ok(Vec::new())
    }

    fn add_change_listener(&self, listener: ChangeListener) -> Registration {
        self.listeners.add(move |_| listener())
    }
}

type SortComparator<T> = Box<dyn Fn(&T, &T, &str) -> Ordering + Send + Sync>;
type FilterPredicate<T, F> = Box<dyn Fn(&T, &F) -> bool + Send + Sync>;

/// Vec-backed data source applying filter, sort orders, and windowing.
///
/// The reference backend for tests and simple embedders. Sorting requires a
/// field comparator supplied via [`InMemoryDataSource::with_sort_comparator`];
/// queries carrying sort orders are served unsorted without one. Mutating the
/// item set notifies all registered change listeners.
pub struct InMemoryDataSource<T, F = ()> {
    items: Mutex<Vec<T>>,
    comparator: Option<SortComparator<T>>,
    filter: Option<FilterPredicate<T, F>>,
    listeners: ListenerSet<()>,
}

impl<T, F> InMemoryDataSource<T, F>
where
    T: Clone + Send + Sync,
    F: Send + Sync,
{
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(items),
            comparator: None,
            filter: None,
            listeners: ListenerSet::new(),
        }
    }

    /// Attach a field comparator used to serve queries with sort orders.
    ///
    /// The comparator receives two items and the sorted field's name;
    /// descending direction is applied by the source itself.
    pub fn with_sort_comparator<C>(mut self, comparator: C) -> Self
    where
        C: Fn(&T, &T, &str) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Box::new(comparator));
        self
    }

    /// Attach a predicate used to serve queries carrying a filter.
    pub fn with_filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&T, &F) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Replace the full item set and notify change listeners.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.lock().unwrap() = items;
        self.listeners.notify(&());
    }

    /// Append one item and notify change listeners.
    pub fn push(&self, item: T) {
        self.items.lock().unwrap().push(item);
        self.listeners.notify(&());
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, query: &Query<F>) -> Vec<T> {
        let items = self.items.lock().unwrap();
        let mut view: Vec<T> = match (&self.filter, &query.filter) {
            (Some(matches), Some(filter)) => items
                .iter()
                .filter(|item| matches(item, filter))
                .cloned()
                .collect(),
            _ => items.clone(),
        };
        drop(items);

        if let Some(comparator) = &self.comparator {
            if !query.sort_orders.is_empty() {
                view.sort_by(|a, b| {
                    for order in &query.sort_orders {
                        let mut ordering = comparator(a, b, &order.field);
                        if order.direction == SortDirection::Descending {
                            ordering = ordering.reverse();
                        }
                        if ordering != Ordering::Equal {
                            return ordering;
                        }
                    }
                    Ordering::Equal
                });
            }
        }
        view
    }
}

impl<T, F> PagedDataSource<T, F> for InMemoryDataSource<T, F>
where
    T: Clone + Send + Sync,
    F: Send + Sync,
{
    fn size(&self, query: &Query<F>) -> Result<usize> {
        let items = self.items.lock().unwrap();
        let total = match (&self.filter, &query.filter) {
            (Some(matches), Some(filter)) => {
                items.iter().filter(|item| matches(item, filter)).count()
            }
            _ => items.len(),
        };
        Ok(total)
    }

    fn fetch(&self, query: &Query<F>) -> Result<Vec<T>> {
        let window = self
            .matching(query)
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect::<Vec<_>>();
        trace!(
            offset = query.offset,
            limit = query.limit,
            returned = window.len(),
            "served page window"
        );
        Ok(window)
    }

    fn add_change_listener(&self, listener: ChangeListener) -> Registration {
        self.listeners.add(move |_| listener())
    }
}
