pub mod cell;
pub mod column_type;
pub mod family;
pub mod grid;
pub mod record;

pub use cell::CellValue;
pub use column_type::ColumnType;
pub use family::Family;
pub use grid::Grid;
pub use record::Record;
