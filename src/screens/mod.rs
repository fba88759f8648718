//! Management screens: per-record configuration of the generic table.
//!
//! Each screen supplies its record type, columns, fixture, filter field and
//! (optionally) an add/edit form. [`ScreenState`] glues the table view and
//! the modal together and is driven through the object-safe [`ScreenTable`]
//! trait so the CLI can hold any screen behind one pointer.

pub mod beds;
pub mod hostels;

use serde::Serialize;
use thiserror::Error;

use crate::table::form::{Draft, FormError, FormSpec, Modal, ModalMode};
use crate::table::paginator::PageSize;
use crate::table::view::{Confirm, RenderedPage, SortState, TableView};
use crate::table::{Column, Record, RecordId, RowAction, TableError};

pub use beds::{BedAllocation, BedPayment};
pub use hostels::{Floor, Hostel, Room};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Hostels,
    Floors,
    Rooms,
    BedAllocation,
    BedPayment,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Hostels,
        Screen::Floors,
        Screen::Rooms,
        Screen::BedAllocation,
        Screen::BedPayment,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hostels" | "hostel" | "hostel-list" => Some(Self::Hostels),
            "floors" | "floor" | "hostel-floors" => Some(Self::Floors),
            "rooms" | "room" | "hostel-rooms" => Some(Self::Rooms),
            "bed-allocation" | "allocation" | "beds" => Some(Self::BedAllocation),
            "bed-payment" | "payment" | "payments" => Some(Self::BedPayment),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Screen::Hostels => "hostels",
            Screen::Floors => "floors",
            Screen::Rooms => "rooms",
            Screen::BedAllocation => "bed-allocation",
            Screen::BedPayment => "bed-payment",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Hostels => "Hostel List",
            Screen::Floors => "Hostel Floors",
            Screen::Rooms => "Hostel Rooms",
            Screen::BedAllocation => "Bed Allocation",
            Screen::BedPayment => "Bed Payment",
        }
    }

    /// Opens the screen seeded with its built-in fixture.
    pub fn open(self) -> Box<dyn ScreenTable> {
        match self {
            Screen::Hostels => Box::new(ScreenState::<Hostel>::from_fixture()),
            Screen::Floors => Box::new(ScreenState::<Floor>::from_fixture()),
            Screen::Rooms => Box::new(ScreenState::<Room>::from_fixture()),
            Screen::BedAllocation => Box::new(ScreenState::<BedAllocation>::from_fixture()),
            Screen::BedPayment => Box::new(ScreenState::<BedPayment>::from_fixture()),
        }
    }
}

/// Per-screen configuration of a record type.
pub trait ScreenRecord: Record + Serialize + 'static {
    const SCREEN: Screen;
    /// Singular noun used in prompts ("hostel", "room").
    const NOUN: &'static str;
    const FILTER_FIELD: &'static str;

    fn columns() -> Vec<Column<Self>>;

    fn actions() -> Vec<RowAction> {
        vec![RowAction::View, RowAction::Edit, RowAction::Delete]
    }

    fn fixture() -> Vec<Self>;

    fn form() -> Option<FormSpec> {
        None
    }

    fn blank(id: RecordId) -> Self;

    fn apply_draft(&mut self, _draft: &Draft) {}

    fn to_draft(&self) -> Draft {
        Draft::default()
    }

    fn set_active(&mut self, active: bool);
}

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("{screen} has no add/edit form")]
    NoForm { screen: &'static str },

    #[error("{screen} does not support '{action}'")]
    UnsupportedAction {
        screen: &'static str,
        action: &'static str,
    },

    #[error("failed to encode records: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

/// Page metadata plus the current page's records, for machine-readable output.
#[derive(Debug, Serialize)]
pub struct PageExport {
    pub screen: Screen,
    pub title: String,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub filtered: usize,
    pub total: usize,
    pub filter: String,
    pub sort: Option<SortState>,
    pub records: serde_json::Value,
}

/// A currently open add/edit modal, for display.
pub struct OpenForm<'a> {
    pub spec: &'a FormSpec,
    pub mode: ModalMode,
    pub draft: &'a Draft,
}

pub trait ScreenTable {
    fn screen(&self) -> Screen;
    fn set_filter(&mut self, text: &str);
    fn set_page_size(&mut self, size: PageSize);
    fn go_to_page(&mut self, page: usize) -> Result<(), ScreenError>;
    fn next_page(&mut self) -> Result<(), ScreenError>;
    fn previous_page(&mut self) -> Result<(), ScreenError>;
    fn sort_by(&mut self, column: &str) -> Result<SortState, ScreenError>;
    fn render(&self) -> RenderedPage;
    fn view(&self, id: RecordId) -> Result<Vec<(&'static str, String)>, ScreenError>;
    fn open_add(&mut self) -> Result<(), ScreenError>;
    fn open_edit(&mut self, id: RecordId) -> Result<(), ScreenError>;
    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), ScreenError>;
    /// Applies every assignment or none of them.
    fn set_fields(&mut self, assignments: &[(String, String)]) -> Result<(), ScreenError>;
    fn open_form(&self) -> Option<OpenForm<'_>>;
    fn submit(&mut self) -> Result<RecordId, ScreenError>;
    fn cancel(&mut self);
    fn delete(&mut self, id: RecordId, confirm: &mut dyn Confirm) -> Result<bool, ScreenError>;
    fn toggle(&mut self, id: RecordId) -> Result<bool, ScreenError>;
    fn export(&self) -> Result<PageExport, ScreenError>;
}

pub struct ScreenState<R: ScreenRecord> {
    view: TableView<R>,
    modal: Option<Modal>,
}

impl<R: ScreenRecord> ScreenState<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            view: TableView::new(records, R::columns(), R::FILTER_FIELD, R::actions()),
            modal: R::form().map(Modal::new),
        }
    }

    pub fn from_fixture() -> Self {
        Self::new(R::fixture())
    }

    pub fn table(&self) -> &TableView<R> {
        &self.view
    }

    fn supports(&self, action: RowAction) -> Result<(), ScreenError> {
        if self.view.actions().contains(&action) {
            Ok(())
        } else {
            Err(ScreenError::UnsupportedAction {
                screen: R::SCREEN.title(),
                action: action.label(),
            })
        }
    }

    fn modal_mut(&mut self) -> Result<&mut Modal, ScreenError> {
        self.modal.as_mut().ok_or(ScreenError::NoForm {
            screen: R::SCREEN.title(),
        })
    }
}

impl<R: ScreenRecord> ScreenTable for ScreenState<R> {
    fn screen(&self) -> Screen {
        R::SCREEN
    }

    fn set_filter(&mut self, text: &str) {
        self.view.set_filter(text);
    }

    fn set_page_size(&mut self, size: PageSize) {
        self.view.set_page_size(size);
    }

    fn go_to_page(&mut self, page: usize) -> Result<(), ScreenError> {
        Ok(self.view.go_to_page(page)?)
    }

    fn next_page(&mut self) -> Result<(), ScreenError> {
        Ok(self.view.next_page()?)
    }

    fn previous_page(&mut self) -> Result<(), ScreenError> {
        Ok(self.view.previous_page()?)
    }

    fn sort_by(&mut self, column: &str) -> Result<SortState, ScreenError> {
        Ok(self.view.sort_by(column)?)
    }

    fn render(&self) -> RenderedPage {
        self.view.render(R::SCREEN.title())
    }

    fn view(&self, id: RecordId) -> Result<Vec<(&'static str, String)>, ScreenError> {
        self.supports(RowAction::View)?;
        let record = self.view.get(id).ok_or(TableError::UnknownRecord { id })?;
        Ok(self
            .view
            .columns()
            .iter()
            .map(|c| (c.label, c.value(record).to_string()))
            .collect())
    }

    fn open_add(&mut self) -> Result<(), ScreenError> {
        self.modal_mut()?.open_add();
        Ok(())
    }

    fn open_edit(&mut self, id: RecordId) -> Result<(), ScreenError> {
        self.supports(RowAction::Edit)?;
        let draft = self
            .view
            .get(id)
            .ok_or(TableError::UnknownRecord { id })?
            .to_draft();
        self.modal_mut()?.open_edit(id, draft);
        Ok(())
    }

    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), ScreenError> {
        Ok(self.modal_mut()?.set(name, raw)?)
    }

    fn set_fields(&mut self, assignments: &[(String, String)]) -> Result<(), ScreenError> {
        Ok(self.modal_mut()?.set_all(assignments)?)
    }

    fn open_form(&self) -> Option<OpenForm<'_>> {
        let modal = self.modal.as_ref()?;
        let mode = modal.mode()?;
        Some(OpenForm {
            spec: modal.spec(),
            mode,
            draft: modal.draft(),
        })
    }

    fn submit(&mut self) -> Result<RecordId, ScreenError> {
        let (mode, draft) = self.modal_mut()?.submit()?;
        match mode {
            ModalMode::Add => {
                let mut record = R::blank(self.view.next_id());
                record.apply_draft(&draft);
                let id = self.view.add(record)?;
                log::info!("added {} {}", R::NOUN, id);
                Ok(id)
            }
            ModalMode::Edit(id) => {
                self.view.update(id, |r| r.apply_draft(&draft))?;
                log::info!("updated {} {}", R::NOUN, id);
                Ok(id)
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.close();
        }
    }

    fn delete(&mut self, id: RecordId, confirm: &mut dyn Confirm) -> Result<bool, ScreenError> {
        self.supports(RowAction::Delete)?;
        let prompt = format!("Are you sure you want to delete this {}?", R::NOUN);
        let removed = self.view.delete(id, confirm, &prompt)?;
        if removed.is_some() {
            log::info!("deleted {} {}", R::NOUN, id);
        }
        Ok(removed.is_some())
    }

    fn toggle(&mut self, id: RecordId) -> Result<bool, ScreenError> {
        self.supports(RowAction::ToggleStatus)?;
        let mut status = false;
        self.view.update(id, |r| {
            status = !r.is_active();
            r.set_active(status);
        })?;
        Ok(status)
    }

    fn export(&self) -> Result<PageExport, ScreenError> {
        let page = self.render();
        let rows = self.view.current_rows();
        let records =
            serde_json::to_value(&rows).map_err(|source| ScreenError::Encode { source })?;
        Ok(PageExport {
            screen: R::SCREEN,
            title: page.title,
            page: page.page,
            total_pages: page.total_pages,
            page_size: page.page_size,
            filtered: page.filtered,
            total: page.total,
            filter: page.filter,
            sort: page.sort,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_names_parse_with_aliases() {
        for screen in Screen::ALL {
            assert_eq!(Screen::parse(screen.name()), Some(screen));
        }
        assert_eq!(Screen::parse("Hostel-List"), Some(Screen::Hostels));
        assert_eq!(Screen::parse("payments"), Some(Screen::BedPayment));
        assert_eq!(Screen::parse("kitchen"), None);
    }

    #[test]
    fn every_screen_opens_on_first_page_of_five() {
        for screen in Screen::ALL {
            let table = screen.open();
            let page = table.render();
            assert_eq!(table.screen(), screen);
            assert_eq!(page.page, 1);
            assert_eq!(page.page_size, 5);
            assert_eq!(page.rows.len(), 5.min(page.total));
        }
    }

    #[test]
    fn add_then_edit_round_trips_through_modal() {
        let mut table = Screen::Floors.open();
        table.open_add().unwrap();
        table.set_field("hostelName", "Hostel Q").unwrap();
        table.set_field("hostelFloorName", "Floor 9").unwrap();
        let id = table.submit().unwrap();
        assert_eq!(id, 14);

        table.open_edit(id).unwrap();
        let form = table.open_form().unwrap();
        assert_eq!(form.mode, ModalMode::Edit(14));
        assert_eq!(form.draft.text("hostelFloorName"), "Floor 9");
        table.set_field("hostelFloorName", "Floor 10").unwrap();
        assert_eq!(table.submit().unwrap(), 14);

        let fields = table.view(14).unwrap();
        assert!(fields.contains(&("Hostel Floor", "Floor 10".to_string())));
    }

    #[test]
    fn failed_submit_keeps_form_open() {
        let mut table = Screen::Rooms.open();
        table.open_add().unwrap();
        table.set_field("roomNumber", "201").unwrap();
        let err = table.submit().unwrap_err();
        assert!(matches!(
            err,
            ScreenError::Form(FormError::MissingFields { .. })
        ));
        let form = table.open_form().unwrap();
        assert_eq!(form.draft.text("roomNumber"), "201");
        assert_eq!(table.render().total, 10);
    }

    #[test]
    fn cancel_discards_draft() {
        let mut table = Screen::Hostels.open();
        table.open_add().unwrap();
        table.set_field("hostelName", "Draft").unwrap();
        table.cancel();
        assert!(table.open_form().is_none());
        assert_eq!(table.render().total, 10);
    }

    #[test]
    fn bed_payment_toggles_but_has_no_form() {
        let mut table = Screen::BedPayment.open();
        assert!(matches!(
            table.open_add(),
            Err(ScreenError::NoForm { .. })
        ));
        assert!(matches!(
            table.delete(1, &mut |_: &str| true),
            Err(ScreenError::UnsupportedAction { .. })
        ));
        assert!(!table.toggle(1).unwrap());
        assert!(table.toggle(1).unwrap());
        assert!(table.toggle(2).unwrap());
    }

    #[test]
    fn export_carries_current_page_records() {
        let mut table = Screen::Rooms.open();
        table.next_page().unwrap();
        let export = table.export().unwrap();
        assert_eq!(export.page, 2);
        let records = export.records.as_array().unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0]["roomNumber"], "106");
    }
}
