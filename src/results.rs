//! Driver-neutral row data handed from adapters to the executor.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::CustomDbRow;
