use crate::core::schema::ID_COLUMN;
use crate::models::{CellValue, Record};

pub struct RecordLinker;

impl RecordLinker {
    /// Stamp `id` on the project record and on every line item, replacing any
    /// previous value. This is the only link between the two tables.
    pub fn link(project: &mut Record, line_items: &mut [Record], id: i64) {
        project.set(ID_COLUMN, CellValue::Int(id));
        for item in line_items.iter_mut() {
            item.set(ID_COLUMN, CellValue::Int(id));
        }
    }
}
