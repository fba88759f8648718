//! Generic filterable, sortable, paginated table.
//!
//! A screen owns a [`view::TableView`] built from a [`store::RecordStore`], a
//! column specification and the name of the field its filter box searches.
//! Everything a user sees (the filtered, sorted window of rows and the page
//! controls) is derived from that state on demand.

pub mod filter;
pub mod form;
pub mod paginator;
pub mod store;
pub mod view;

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

pub type RecordId = u64;

/// A row in a management screen.
///
/// `field` exposes raw values by their wire name (`hostelName`, `isActive`,
/// ...). Flags are reported as `"true"`/`"false"`; unknown names yield `None`.
pub trait Record: Clone {
    fn id(&self) -> RecordId;
    fn field(&self, name: &str) -> Option<String>;
    fn is_active(&self) -> bool;
}

/// A rendered cell value. Ordering is what column sorting uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Number(u64),
    Text(String),
    Flag(bool),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Number(_) => 0,
            Cell::Flag(_) => 1,
            Cell::Text(_) => 2,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Flag(true) => f.write_str("Yes"),
            Cell::Flag(false) => f.write_str("No"),
        }
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.cmp(b),
            (Cell::Flag(a), Cell::Flag(b)) => a.cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// One column of a screen's table.
pub struct Column<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub accessor: fn(&R) -> Cell,
    pub sortable: bool,
}

impl<R> Column<R> {
    pub fn new(key: &'static str, label: &'static str, accessor: fn(&R) -> Cell) -> Self {
        Self {
            key,
            label,
            accessor,
            sortable: true,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn value(&self, record: &R) -> Cell {
        (self.accessor)(record)
    }

    fn matches_name(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name) || self.label.eq_ignore_ascii_case(name)
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            label: self.label,
            accessor: self.accessor,
            sortable: self.sortable,
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowAction {
    View,
    Edit,
    Delete,
    ToggleStatus,
}

impl RowAction {
    pub fn label(self) -> &'static str {
        match self {
            RowAction::View => "view",
            RowAction::Edit => "edit",
            RowAction::Delete => "delete",
            RowAction::ToggleStatus => "toggle",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("page {requested} is out of range (1..={total_pages})")]
    PageOutOfRange { requested: usize, total_pages: usize },

    #[error("invalid page size {value}, expected one of 5, 10, 20, 50, 100, 150, 200")]
    InvalidPageSize { value: usize },

    #[error("page size '{raw}' is not a number")]
    PageSizeNotNumber { raw: String },

    #[error("already on the first page")]
    PreviousDisabled,

    #[error("already on the last page")]
    NextDisabled,

    #[error("no record with id {id}")]
    UnknownRecord { id: RecordId },

    #[error("a record with id {id} already exists")]
    DuplicateId { id: RecordId },

    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    #[error("column '{column}' is not sortable")]
    NotSortable { column: String },
}
