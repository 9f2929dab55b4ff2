pub mod grid;
pub mod identity;
pub mod linker;
pub mod log;
pub mod pivot;
pub mod retype;
pub mod schema;
pub mod upload;
pub mod writer;
