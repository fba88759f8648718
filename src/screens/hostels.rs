use serde::{Deserialize, Serialize};

use super::{Screen, ScreenRecord};
use crate::api::models::HostelSummary;
use crate::table::form::{Draft, FieldSpec, FormSpec};
use crate::table::{Cell, Column, Record, RecordId};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hostel {
    pub id: RecordId,
    pub hostel_name: String,
    pub is_active: bool,
}

impl Hostel {
    pub fn new(id: RecordId, hostel_name: &str, is_active: bool) -> Self {
        Self {
            id,
            hostel_name: hostel_name.to_string(),
            is_active,
        }
    }
}

impl From<HostelSummary> for Hostel {
    fn from(summary: HostelSummary) -> Self {
        Self {
            id: summary.id,
            hostel_name: summary.name,
            is_active: summary.is_active,
        }
    }
}

impl Record for Hostel {
    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "hostelName" => Some(self.hostel_name.clone()),
            "isActive" => Some(self.is_active.to_string()),
            _ => None,
        }
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

const HOSTEL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("hostelName", "Hostel Name").required(),
    FieldSpec::checkbox("isActive", "Is Active"),
];

impl ScreenRecord for Hostel {
    const SCREEN: Screen = Screen::Hostels;
    const NOUN: &'static str = "hostel";
    const FILTER_FIELD: &'static str = "hostelName";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "S.no", |r: &Self| Cell::Number(r.id)),
            Column::new("hostelName", "Hostel Name", |r: &Self| {
                Cell::text(r.hostel_name.clone())
            }),
            Column::new("isActive", "Is Active", |r: &Self| Cell::Flag(r.is_active)),
        ]
    }

    fn fixture() -> Vec<Self> {
        let active = ['A', 'C', 'E'];
        ('A'..='J')
            .enumerate()
            .map(|(i, letter)| {
                Hostel::new(
                    i as RecordId + 1,
                    &format!("Hostel {letter}"),
                    active.contains(&letter),
                )
            })
            .collect()
    }

    fn form() -> Option<FormSpec> {
        Some(FormSpec {
            title: "Add New Hostel",
            fields: HOSTEL_FIELDS,
        })
    }

    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn apply_draft(&mut self, draft: &Draft) {
        self.hostel_name = draft.text("hostelName").trim().to_string();
        self.is_active = draft.flag("isActive");
    }

    fn to_draft(&self) -> Draft {
        Draft::default()
            .with_text("hostelName", self.hostel_name.clone())
            .with_flag("isActive", self.is_active)
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: RecordId,
    pub hostel_name: String,
    pub hostel_floor_name: String,
    pub is_active: bool,
}

impl Record for Floor {
    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "hostelName" => Some(self.hostel_name.clone()),
            "hostelFloorName" => Some(self.hostel_floor_name.clone()),
            "isActive" => Some(self.is_active.to_string()),
            _ => None,
        }
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

const FLOOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("hostelName", "Hostel Name").required(),
    FieldSpec::text("hostelFloorName", "Hostel Floor").required(),
    FieldSpec::checkbox("isActive", "Is Active"),
];

impl ScreenRecord for Floor {
    const SCREEN: Screen = Screen::Floors;
    const NOUN: &'static str = "hostel floor";
    const FILTER_FIELD: &'static str = "hostelName";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "S.no", |r: &Self| Cell::Number(r.id)),
            Column::new("hostelName", "Hostel Name", |r: &Self| {
                Cell::text(r.hostel_name.clone())
            }),
            Column::new("hostelFloorName", "Hostel Floor", |r: &Self| {
                Cell::text(r.hostel_floor_name.clone())
            }),
            Column::new("isActive", "Is Active", |r: &Self| Cell::Flag(r.is_active)),
        ]
    }

    fn fixture() -> Vec<Self> {
        [
            ("Hostel A", 1, true),
            ("Hostel B", 2, false),
            ("Hostel C", 1, true),
            ("Hostel D", 3, true),
            ("Hostel E", 5, true),
            ("Hostel F", 1, true),
            ("Hostel G", 2, true),
            ("Hostel H", 1, true),
            ("Hostel I", 5, true),
            ("Hostel J", 1, true),
            ("Hostel K", 6, true),
            ("Hostel L", 7, true),
            ("Hostel M", 1, true),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (hostel, floor, is_active))| Floor {
            id: i as RecordId + 1,
            hostel_name: hostel.to_string(),
            hostel_floor_name: format!("Floor {floor}"),
            is_active,
        })
        .collect()
    }

    fn form() -> Option<FormSpec> {
        Some(FormSpec {
            title: "Add New Hostel Floor",
            fields: FLOOR_FIELDS,
        })
    }

    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn apply_draft(&mut self, draft: &Draft) {
        self.hostel_name = draft.text("hostelName").trim().to_string();
        self.hostel_floor_name = draft.text("hostelFloorName").trim().to_string();
        self.is_active = draft.flag("isActive");
    }

    fn to_draft(&self) -> Draft {
        Draft::default()
            .with_text("hostelName", self.hostel_name.clone())
            .with_text("hostelFloorName", self.hostel_floor_name.clone())
            .with_flag("isActive", self.is_active)
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RecordId,
    pub hostel_name: String,
    pub hostel_floor: String,
    pub room_number: String,
    pub room_price: String,
    pub room_type: String,
    pub is_active: bool,
}

impl Record for Room {
    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "hostelName" => Some(self.hostel_name.clone()),
            "hostelFloor" => Some(self.hostel_floor.clone()),
            "roomNumber" => Some(self.room_number.clone()),
            "roomPrice" => Some(self.room_price.clone()),
            "roomType" => Some(self.room_type.clone()),
            "isActive" => Some(self.is_active.to_string()),
            _ => None,
        }
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

const ROOM_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("hostelName", "Hostel Name"),
    FieldSpec::text("hostelFloor", "Hostel Floor"),
    FieldSpec::text("roomNumber", "Room Number").required(),
    FieldSpec::text("roomPrice", "Room Price"),
    FieldSpec::text("roomType", "Room Type").required(),
    FieldSpec::checkbox("isActive", "Is Active"),
];

/// Shared by the rooms and bed screens, which ship the same ten rooms.
pub(crate) const ROOM_FIXTURE: [(&str, u8, &str, &str, bool); 10] = [
    ("Hostel A", 1, "101", "Single", true),
    ("Hostel B", 3, "102", "Double", false),
    ("Hostel C", 2, "103", "Single", true),
    ("Hostel D", 1, "104", "Triple", true),
    ("Hostel E", 3, "105", "Quad", true),
    ("Hostel F", 5, "106", "Double", true),
    ("Hostel G", 6, "107", "Single", true),
    ("Hostel H", 2, "108", "Double", true),
    ("Hostel I", 7, "109", "Single", true),
    ("Hostel J", 6, "110", "Triple", false),
];

impl ScreenRecord for Room {
    const SCREEN: Screen = Screen::Rooms;
    const NOUN: &'static str = "room";
    const FILTER_FIELD: &'static str = "roomNumber";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "S.no", |r: &Self| Cell::Number(r.id)),
            Column::new("hostelName", "Hostel Name", |r: &Self| {
                Cell::text(r.hostel_name.clone())
            }),
            Column::new("hostelFloor", "Hostel Floor", |r: &Self| {
                Cell::text(r.hostel_floor.clone())
            }),
            Column::new("roomNumber", "Room Number", |r: &Self| {
                Cell::text(r.room_number.clone())
            }),
            Column::new("roomType", "Room Type", |r: &Self| {
                Cell::text(r.room_type.clone())
            }),
            Column::new("isActive", "Is Active", |r: &Self| Cell::Flag(r.is_active)),
        ]
    }

    fn fixture() -> Vec<Self> {
        ROOM_FIXTURE
            .iter()
            .enumerate()
            .map(|(i, (hostel, floor, number, kind, is_active))| Room {
                id: i as RecordId + 1,
                hostel_name: hostel.to_string(),
                hostel_floor: format!("Floor {floor}"),
                room_number: number.to_string(),
                room_price: String::new(),
                room_type: kind.to_string(),
                is_active: *is_active,
            })
            .collect()
    }

    fn form() -> Option<FormSpec> {
        Some(FormSpec {
            title: "Add New Hostel Room",
            fields: ROOM_FIELDS,
        })
    }

    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn apply_draft(&mut self, draft: &Draft) {
        self.hostel_name = draft.text("hostelName").trim().to_string();
        self.hostel_floor = draft.text("hostelFloor").trim().to_string();
        self.room_number = draft.text("roomNumber").trim().to_string();
        self.room_price = draft.text("roomPrice").trim().to_string();
        self.room_type = draft.text("roomType").trim().to_string();
        self.is_active = draft.flag("isActive");
    }

    fn to_draft(&self) -> Draft {
        Draft::default()
            .with_text("hostelName", self.hostel_name.clone())
            .with_text("hostelFloor", self.hostel_floor.clone())
            .with_text("roomNumber", self.room_number.clone())
            .with_text("roomPrice", self.room_price.clone())
            .with_text("roomType", self.room_type.clone())
            .with_flag("isActive", self.is_active)
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostel_fixture_has_ten_with_three_active() {
        let hostels = Hostel::fixture();
        assert_eq!(hostels.len(), 10);
        assert_eq!(hostels[9].hostel_name, "Hostel J");
        let active: Vec<_> = hostels
            .iter()
            .filter(|h| h.is_active)
            .map(|h| h.hostel_name.as_str())
            .collect();
        assert_eq!(active, vec!["Hostel A", "Hostel C", "Hostel E"]);
    }

    #[test]
    fn hostel_serializes_with_wire_names() {
        let json = serde_json::to_value(Hostel::new(3, "Hostel C", true)).unwrap();
        assert_eq!(json["hostelName"], "Hostel C");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn remote_summary_becomes_hostel() {
        let hostel = Hostel::from(HostelSummary {
            id: 42,
            hostel_id: Some("hostel_42".into()),
            name: "North Wing".into(),
            is_active: true,
        });
        assert_eq!(hostel, Hostel::new(42, "North Wing", true));
    }

    #[test]
    fn floor_fixture_has_thirteen() {
        assert_eq!(Floor::fixture().len(), 13);
        assert_eq!(Floor::fixture()[4].hostel_floor_name, "Floor 5");
    }

    #[test]
    fn room_filter_field_is_room_number() {
        let room = &Room::fixture()[3];
        assert_eq!(room.field(Room::FILTER_FIELD).as_deref(), Some("104"));
    }
}
