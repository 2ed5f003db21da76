//! Materialized statement results: a forward-only cursor over the records of one
//! response and the row shapes it can project them into.

mod result_set;
mod row;

pub use result_set::{ColumnDescriptor, RdsDataResult};
pub use row::{DynamicObject, FetchedRow, FieldAssignable, Row};
