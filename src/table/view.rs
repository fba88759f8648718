use serde::Serialize;

use super::filter::FilterPredicate;
use super::paginator::{PageControls, PageSize, Paginator};
use super::store::RecordStore;
use super::{Cell, Column, Record, RecordId, RowAction, TableError};

/// Asks the operator to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: &'static str,
    pub direction: SortDirection,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    pub id: RecordId,
    pub cells: Vec<String>,
    pub actions: Vec<&'static str>,
}

/// What one screen draws: the visible window plus everything needed for the
/// header, footer and page controls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<RenderedRow>,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub filtered: usize,
    pub total: usize,
    pub filter: String,
    pub sort: Option<SortState>,
    pub controls: PageControls,
}

pub struct TableView<R> {
    store: RecordStore<R>,
    columns: Vec<Column<R>>,
    filter: FilterPredicate,
    sort: Option<SortState>,
    paginator: Paginator,
    actions: Vec<RowAction>,
}

impl<R: Record> TableView<R> {
    pub fn new(
        records: Vec<R>,
        columns: Vec<Column<R>>,
        filter_field: &'static str,
        actions: Vec<RowAction>,
    ) -> Self {
        Self {
            store: RecordStore::new(records),
            columns,
            filter: FilterPredicate::new(filter_field, ""),
            sort: None,
            paginator: Paginator::default(),
            actions,
        }
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn actions(&self) -> &[RowAction] {
        &self.actions
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn current_page(&self) -> usize {
        self.paginator.current()
    }

    pub fn page_size(&self) -> PageSize {
        self.paginator.size()
    }

    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages(self.filtered_len())
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.store.get(id)
    }

    pub fn next_id(&mut self) -> RecordId {
        self.store.next_id()
    }

    /// Replaces the filter text and returns to page 1.
    pub fn set_filter(&mut self, text: &str) {
        self.filter = FilterPredicate::new(self.filter.field(), text);
        self.paginator.reset();
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.paginator.set_size(size);
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<(), TableError> {
        let len = self.filtered_len();
        self.paginator.go_to(page, len)
    }

    pub fn next_page(&mut self) -> Result<(), TableError> {
        let len = self.filtered_len();
        self.paginator.next(len)
    }

    pub fn previous_page(&mut self) -> Result<(), TableError> {
        self.paginator.previous()
    }

    /// Sorts by `column`. Asking again for the active column flips direction.
    pub fn sort_by(&mut self, column: &str) -> Result<SortState, TableError> {
        let col = self
            .columns
            .iter()
            .find(|c| c.matches_name(column))
            .ok_or_else(|| TableError::UnknownColumn {
                column: column.to_string(),
            })?;
        if !col.sortable {
            return Err(TableError::NotSortable {
                column: col.label.to_string(),
            });
        }
        let direction = match self.sort {
            Some(current) if current.column == col.key => current.direction.flipped(),
            _ => SortDirection::Ascending,
        };
        let state = SortState {
            column: col.key,
            direction,
        };
        self.sort = Some(state);
        Ok(state)
    }

    /// Records passing the filter, in display order.
    pub fn filtered(&self) -> Vec<&R> {
        let mut rows = self.filter.apply(self.store.records());
        if let Some(state) = self.sort {
            if let Some(col) = self.columns.iter().find(|c| c.key == state.column) {
                rows.sort_by_cached_key(|r| col.value(r));
                if state.direction == SortDirection::Descending {
                    rows.reverse();
                }
            }
        }
        rows
    }

    pub fn filtered_len(&self) -> usize {
        self.store
            .records()
            .iter()
            .filter(|r| self.filter.matches(*r))
            .count()
    }

    pub fn current_rows(&self) -> Vec<&R> {
        let rows = self.filtered();
        self.paginator.slice(&rows).to_vec()
    }

    pub fn add(&mut self, record: R) -> Result<RecordId, TableError> {
        self.store.append(record)
    }

    pub fn replace(&mut self, record: R) -> Result<(), TableError> {
        self.store.replace(record)?;
        self.clamp_page();
        Ok(())
    }

    /// Edits in place. An edit can move the record out of the active filter,
    /// so the page is pulled back into range afterwards.
    pub fn update<F>(&mut self, id: RecordId, f: F) -> Result<(), TableError>
    where
        F: FnOnce(&mut R),
    {
        self.store.update(id, f)?;
        self.clamp_page();
        Ok(())
    }

    fn clamp_page(&mut self) {
        let len = self.filtered_len();
        self.paginator.clamp(len);
    }

    /// Removes a record once `confirm` agrees. `Ok(None)` means the operator
    /// declined and nothing changed.
    pub fn delete(
        &mut self,
        id: RecordId,
        confirm: &mut dyn Confirm,
        prompt: &str,
    ) -> Result<Option<R>, TableError> {
        if !self.store.contains(id) {
            return Err(TableError::UnknownRecord { id });
        }
        if !confirm.confirm(prompt) {
            log::debug!("delete of record {id} declined");
            return Ok(None);
        }
        let removed = self.store.remove(id)?;
        self.clamp_page();
        Ok(Some(removed))
    }

    pub fn render(&self, title: &str) -> RenderedPage {
        let filtered = self.filtered();
        let headers = self
            .columns
            .iter()
            .map(|c| match self.sort {
                Some(s) if s.column == c.key => format!("{} {}", c.label, s.direction.marker()),
                _ => c.label.to_string(),
            })
            .collect();
        let actions: Vec<&'static str> = self.actions.iter().map(|a| a.label()).collect();
        let rows = self
            .paginator
            .slice(&filtered)
            .iter()
            .map(|r| RenderedRow {
                id: r.id(),
                cells: self
                    .columns
                    .iter()
                    .map(|c| render_cell(c.value(r)))
                    .collect(),
                actions: actions.clone(),
            })
            .collect();
        RenderedPage {
            title: title.to_string(),
            headers,
            rows,
            page: self.paginator.current(),
            total_pages: self.paginator.total_pages(filtered.len()),
            page_size: self.paginator.size().get(),
            filtered: filtered.len(),
            total: self.store.len(),
            filter: self.filter.text().to_string(),
            sort: self.sort,
            controls: self.paginator.controls(filtered.len()),
        }
    }
}

fn render_cell(cell: Cell) -> String {
    cell.to_string()
}
