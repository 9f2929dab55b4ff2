pub mod datastore;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod stats;

pub use datastore::{Datastore, QueryRows, SqlValue};
pub use pool::DbPool;
