use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures_util::TryStreamExt;
use tiberius::numeric::Numeric;
use tiberius::{ColumnData, FromSql, QueryItem};

use super::client::MssqlClient;
use super::params::bind_query_params;
use crate::driver::DriverEvent;
use crate::error::DriverError;
use crate::results::ResultSet;
use crate::translation::count_statements;
use crate::types::RowValues;

/// Run a row-producing batch and report one completion per statement.
///
/// tiberius only surfaces statements that return a result set, so the
/// row-less statements (counted from the SQL text) are reported first, with
/// no rows, followed by the result sets in order.
pub(crate) async fn query_events(
    client: &mut MssqlClient,
    sql: Cow<'_, str>,
    params: &[RowValues],
) -> Result<Vec<DriverEvent>, DriverError> {
    let statements = count_statements(&sql);
    let result_sets = build_result_sets(client, sql, params).await?;
    let rowless = statements.saturating_sub(result_sets.len());

    let mut events = Vec::with_capacity(rowless + result_sets.len());
    events.extend((0..rowless).map(|_| DriverEvent::StatementDone { rows: None }));
    events.extend(
        result_sets
            .into_iter()
            .map(|set| DriverEvent::StatementDone { rows: Some(set) }),
    );
    Ok(events)
}

/// Run a mutation batch: one completion per statement, then the total row count.
pub(crate) async fn execute_events(
    client: &mut MssqlClient,
    sql: Cow<'_, str>,
    params: &[RowValues],
) -> Result<Vec<DriverEvent>, DriverError> {
    let result = bind_query_params(sql, params).execute(client).await?;
    let per_statement = result.rows_affected();

    let mut events: Vec<DriverEvent> = per_statement
        .iter()
        .map(|_| DriverEvent::StatementDone { rows: None })
        .collect();
    if events.is_empty() {
        events.push(DriverEvent::StatementDone { rows: None });
    }
    events.push(DriverEvent::RowCount(per_statement.iter().sum()));
    Ok(events)
}

/// Collect every result set a SQL Server batch returns, in order.
///
/// # Errors
///
/// Returns `DriverError` if execution or row decoding fails.
pub async fn build_result_sets(
    client: &mut MssqlClient,
    sql: Cow<'_, str>,
    params: &[RowValues],
) -> Result<Vec<ResultSet>, DriverError> {
    let mut stream = bind_query_params(sql, params).query(client).await?;

    let mut result_sets = Vec::new();
    let mut current: Option<ResultSet> = None;

    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => {
                if let Some(done) = current.take() {
                    result_sets.push(done);
                }
                let column_names: Vec<String> =
                    meta.columns().iter().map(|col| col.name().to_string()).collect();
                let mut result_set = ResultSet::with_capacity(10);
                result_set.set_column_names(Arc::new(column_names));
                current = Some(result_set);
            }
            QueryItem::Row(row) => {
                let result_set = current.as_mut().ok_or_else(|| {
                    DriverError::ExecutionError("row received before column metadata".to_string())
                })?;
                let values = row
                    .cells()
                    .map(|(_, data)| extract_value(data))
                    .collect::<Result<Vec<_>, _>>()?;
                result_set.add_row_values(values);
            }
        }
    }

    if let Some(done) = current {
        result_sets.push(done);
    }
    Ok(result_sets)
}

/// Convert one SQL Server cell into a middleware value.
fn extract_value(data: &ColumnData<'static>) -> Result<RowValues, DriverError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(RowValues::Int),
        ColumnData::F32(v) => v.map(|v| RowValues::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(RowValues::Float),
        ColumnData::Bit(v) => v.map(RowValues::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| RowValues::Text(s.to_string())),
        ColumnData::Guid(v) => v.map(|g| RowValues::Text(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|b| RowValues::Blob(b.to_vec())),
        ColumnData::Numeric(v) => v.map(numeric_value),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data)?.map(RowValues::Timestamp)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(data)?
            .map(|d| RowValues::Timestamp(d.and_time(NaiveTime::MIN))),
        ColumnData::Time(_) => NaiveTime::from_sql(data)?.map(|t| RowValues::Text(t.to_string())),
        ColumnData::DateTimeOffset(_) => {
            DateTime::<Utc>::from_sql(data)?.map(|dt| RowValues::Timestamp(dt.naive_utc()))
        }
        #[allow(unreachable_patterns)]
        _ => <&str>::from_sql(data)
            .ok()
            .flatten()
            .map(|s| RowValues::Text(s.to_string())),
    };
    Ok(value.unwrap_or(RowValues::Null))
}

/// Whole-valued numerics (identities come back as `numeric(38,0)`) stay integers.
fn numeric_value(n: Numeric) -> RowValues {
    if n.scale() == 0
        && let Ok(whole) = i64::try_from(n.value())
    {
        return RowValues::Int(whole);
    }
    RowValues::Float(f64::from(n))
}
