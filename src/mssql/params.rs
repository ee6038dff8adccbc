use std::borrow::Cow;

use tiberius::Query;

use crate::types::RowValues;

/// Bind parameters directly to the query for SQL Server
///
/// Values are bound positionally, so `params[0]` becomes `@P1`.
pub fn bind_query_params<'a>(query: impl Into<Cow<'a, str>>, params: &[RowValues]) -> Query<'a> {
    let mut query_builder = Query::new(query);

    for param in params {
        match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Text(s) => query_builder.bind(s.clone()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => query_builder.bind(*dt),
            RowValues::Null => query_builder.bind(Option::<String>::None),
            RowValues::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}
