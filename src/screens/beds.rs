use serde::{Deserialize, Serialize};

use super::hostels::ROOM_FIXTURE;
use super::{Screen, ScreenRecord};
use crate::table::form::{Draft, FieldSpec, FormSpec};
use crate::table::{Cell, Column, Record, RecordId, RowAction};

const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: &str) -> Cell {
    if value.trim().is_empty() {
        Cell::text(NOT_AVAILABLE)
    } else {
        Cell::text(value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedAllocation {
    pub id: RecordId,
    pub user_name: String,
    pub hostel_name: String,
    pub bed_type: String,
    pub room_number: String,
    pub user_id_proof: String,
    pub floor: String,
    pub bed_price: String,
    pub room_type: String,
    pub hostel_floor: String,
    pub is_active: bool,
}

impl Record for BedAllocation {
    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "id" => self.id.to_string(),
            "userName" => self.user_name.clone(),
            "hostelName" => self.hostel_name.clone(),
            "bedType" => self.bed_type.clone(),
            "roomNumber" => self.room_number.clone(),
            "userIdProof" => self.user_id_proof.clone(),
            "floor" => self.floor.clone(),
            "bedPrice" => self.bed_price.clone(),
            "roomType" => self.room_type.clone(),
            "hostelFloor" => self.hostel_floor.clone(),
            "isActive" => self.is_active.to_string(),
            _ => return None,
        };
        Some(value)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

const ALLOCATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("userName", "User Name").required(),
    FieldSpec::select("hostelName", "User Hostel Name", &["Hostel A", "Hostel B", "Hostel C"])
        .required(),
    FieldSpec::select("bedType", "User Bed Type", &["Single", "Double", "Queen"]).required(),
    FieldSpec::select("roomNumber", "Room Number", &["101", "102", "103"]).required(),
    FieldSpec::text("userIdProof", "User Id Proof").required(),
    FieldSpec::select("floor", "User Floor", &["1", "2", "3"]).required(),
    FieldSpec::select("bedPrice", "User Bed Price", &["1000", "1500", "2000"]).required(),
    FieldSpec::select("roomType", "Room Type", &["Standard", "Deluxe", "Suite"]).required(),
    FieldSpec::checkbox("isActive", "Is Active"),
];

impl ScreenRecord for BedAllocation {
    const SCREEN: Screen = Screen::BedAllocation;
    const NOUN: &'static str = "bed allocation";
    const FILTER_FIELD: &'static str = "roomNumber";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "S.no", |r: &Self| Cell::Number(r.id)),
            Column::new("hostelName", "Hostel Name", |r: &Self| {
                Cell::text(r.hostel_name.clone())
            }),
            Column::new("hostelFloor", "Hostel Floor", |r: &Self| or_na(&r.hostel_floor)),
            Column::new("roomNumber", "Room Number", |r: &Self| {
                Cell::text(r.room_number.clone())
            }),
            Column::new("roomType", "Room Type", |r: &Self| {
                Cell::text(r.room_type.clone())
            }),
            Column::new("userName", "User Name", |r: &Self| or_na(&r.user_name)),
            Column::new("userIdProof", "User Id Proof", |r: &Self| {
                or_na(&r.user_id_proof)
            }),
            Column::new("isActive", "Is Active", |r: &Self| Cell::Flag(r.is_active)),
        ]
    }

    fn fixture() -> Vec<Self> {
        ROOM_FIXTURE
            .iter()
            .enumerate()
            .map(|(i, (hostel, floor, number, kind, is_active))| BedAllocation {
                id: i as RecordId + 1,
                hostel_name: hostel.to_string(),
                hostel_floor: format!("Floor {floor}"),
                room_number: number.to_string(),
                room_type: kind.to_string(),
                is_active: *is_active,
                ..BedAllocation::default()
            })
            .collect()
    }

    fn form() -> Option<FormSpec> {
        Some(FormSpec {
            title: "Add New User Bed Allocation",
            fields: ALLOCATION_FIELDS,
        })
    }

    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn apply_draft(&mut self, draft: &Draft) {
        self.user_name = draft.text("userName").trim().to_string();
        self.hostel_name = draft.text("hostelName");
        self.bed_type = draft.text("bedType");
        self.room_number = draft.text("roomNumber");
        self.user_id_proof = draft.text("userIdProof").trim().to_string();
        self.floor = draft.text("floor");
        self.hostel_floor = format!("Floor {}", self.floor);
        self.bed_price = draft.text("bedPrice");
        self.room_type = draft.text("roomType");
        self.is_active = draft.flag("isActive");
    }

    fn to_draft(&self) -> Draft {
        Draft::default()
            .with_text("userName", self.user_name.clone())
            .with_text("hostelName", self.hostel_name.clone())
            .with_text("bedType", self.bed_type.clone())
            .with_text("roomNumber", self.room_number.clone())
            .with_text("userIdProof", self.user_id_proof.clone())
            .with_text("floor", self.floor.clone())
            .with_text("bedPrice", self.bed_price.clone())
            .with_text("roomType", self.room_type.clone())
            .with_flag("isActive", self.is_active)
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

/// Monthly rent line for an occupied bed. Rows are toggled between paid and
/// unpaid; there is no add/edit form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedPayment {
    pub id: RecordId,
    pub hostel_name: String,
    pub hostel_floor: String,
    pub room_type: String,
    pub room_number: String,
    pub user_name: Option<String>,
    pub month: Option<String>,
    pub payment_due: Option<String>,
    pub is_paid: bool,
}

fn optional(value: &Option<String>) -> Cell {
    or_na(value.as_deref().unwrap_or_default())
}

impl Record for BedPayment {
    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "hostelName" => Some(self.hostel_name.clone()),
            "hostelFloor" => Some(self.hostel_floor.clone()),
            "roomType" => Some(self.room_type.clone()),
            "roomNumber" => Some(self.room_number.clone()),
            "userName" => self.user_name.clone(),
            "month" => self.month.clone(),
            "paymentDue" => self.payment_due.clone(),
            "isPaid" => Some(self.is_paid.to_string()),
            _ => None,
        }
    }

    fn is_active(&self) -> bool {
        self.is_paid
    }
}

impl ScreenRecord for BedPayment {
    const SCREEN: Screen = Screen::BedPayment;
    const NOUN: &'static str = "payment";
    const FILTER_FIELD: &'static str = "roomNumber";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "S.no", |r: &Self| Cell::Number(r.id)),
            Column::new("hostelName", "Hostel Name", |r: &Self| {
                Cell::text(r.hostel_name.clone())
            }),
            Column::new("roomType", "Room Type", |r: &Self| {
                Cell::text(r.room_type.clone())
            }),
            Column::new("roomNumber", "Room Number", |r: &Self| {
                Cell::text(r.room_number.clone())
            }),
            Column::new("userName", "User Name", |r: &Self| optional(&r.user_name)),
            Column::new("month", "Month", |r: &Self| optional(&r.month)),
            Column::new("paymentDue", "Payment Due", |r: &Self| {
                optional(&r.payment_due)
            }),
            Column::new("isPaid", "Paid", |r: &Self| Cell::Flag(r.is_paid)),
        ]
    }

    fn actions() -> Vec<RowAction> {
        vec![RowAction::View, RowAction::ToggleStatus]
    }

    fn fixture() -> Vec<Self> {
        ROOM_FIXTURE
            .iter()
            .enumerate()
            .map(|(i, (hostel, floor, number, kind, is_paid))| BedPayment {
                id: i as RecordId + 1,
                hostel_name: hostel.to_string(),
                hostel_floor: format!("Floor {floor}"),
                room_type: kind.to_string(),
                room_number: number.to_string(),
                is_paid: *is_paid,
                ..BedPayment::default()
            })
            .collect()
    }

    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn set_active(&mut self, active: bool) {
        self.is_paid = active;
    }
}
