//! A terminal data grid with page-based navigation instead of scrolling.
//!
//! The grid holds a reference to a [`PagedDataSource`] and drives an embedded
//! [`Pagination`] control so both stay synchronized with the grid's sort
//! order, page size, and total item count. Alternate backends plug in by
//! implementing the data-source trait; [`InMemoryDataSource`] is the
//! Vec-backed reference implementation.
//!
//! ```no_run
//! use std::sync::Arc;
//! use paged_grid::{GridColumn, InMemoryDataSource, PagedGrid, SimpleGridItem};
//!
//! let items: Vec<SimpleGridItem> = (0..95)
//!     .map(|i| SimpleGridItem::new(format!("item-{i}")).with_cell("name", format!("Name {i}")))
//!     .collect();
//!
//! let mut grid: PagedGrid<SimpleGridItem> =
//!     PagedGrid::with_page_size(vec![GridColumn::new("name", "Name")], 10);
//! grid.set_data_source(Arc::new(InMemoryDataSource::new(items)))?;
//! grid.set_page(3)?;
//! assert_eq!(grid.rows().len(), 10);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod component;
pub mod datasource;
pub mod error;
pub mod events;
pub mod grid;
pub mod pagination;

pub use component::{Component, ComponentState};
pub use datasource::{
    ChangeListener, EmptyDataSource, InMemoryDataSource, PagedDataSource, Query, SortDirection,
    SortOrder,
};
pub use error::GridError;
pub use events::{ListenerSet, Registration};
pub use grid::{GridColumn, GridItem, GridStyling, PagedGrid, SimpleGridItem};
pub use pagination::{
    PageChangeEvent, Pagination, PaginationLabels, PaginationLocation, PaginationStyling,
};

pub type Frame<'a> = ratatui::Frame<'a>;
