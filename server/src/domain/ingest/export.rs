//! CSV rendering of cleaned room records

use serde::Serialize;

use super::types::CleanRoom;

/// Attribute lists are flattened into one cell
const ATTRIBUTE_SEPARATOR: &str = "; ";

#[derive(Serialize)]
struct CsvRoom<'a> {
    institution: &'a str,
    campus: &'a str,
    building: &'a str,
    room: &'a str,
    room_number: Option<&'a str>,
    attributes: String,
    has_web_conf: bool,
    has_pc: bool,
    customized: bool,
}

impl<'a> From<&'a CleanRoom> for CsvRoom<'a> {
    fn from(room: &'a CleanRoom) -> Self {
        Self {
            institution: &room.institution,
            campus: &room.campus,
            building: &room.building,
            room: &room.room,
            room_number: room.room_number.as_deref(),
            attributes: room.attributes.join(ATTRIBUTE_SEPARATOR),
            has_web_conf: room.has_web_conf,
            has_pc: room.has_pc,
            customized: room.customized,
        }
    }
}

/// Render cleaned rooms as CSV with a header row
pub fn rooms_to_csv(rooms: &[CleanRoom]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for room in rooms {
        writer.serialize(CsvRoom::from(room))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}
