//! Generic table façade
//!
//! One engine for the whole CRUD surface, parameterized by a declared
//! [`TableSchema`]. Every operation degrades to a sentinel (`false`, `[]`,
//! `-1`) instead of raising: callers cannot distinguish "no rows" from
//! "query failed" without the logs. That contract is inherited from the
//! system this replaces and kept deliberately.

use serde_json::{Map, Value};

use crate::db::{value, Db, DbError, DbResult, SqlValue};
use crate::schema::{self, ColumnType, TableSchema};

/// CRUD operations for one registered table.
pub struct TableFacade<'a> {
    db: &'a Db,
    table: &'static TableSchema,
}

impl<'a> TableFacade<'a> {
    pub fn new(db: &'a Db, table: &'static TableSchema) -> Self {
        Self { db, table }
    }

    /// Look the table up in the registry; `None` for unregistered names.
    pub fn for_name(db: &'a Db, name: &str) -> Option<Self> {
        schema::lookup(name).map(|table| Self::new(db, table))
    }

    pub fn table(&self) -> &'static TableSchema {
        self.table
    }

    /// Drop and recreate the table.
    ///
    /// Tables that foreign-key-reference this one are dropped first, in
    /// declared-graph order, and stay dropped; callers re-initiate them.
    /// All drops are IF EXISTS, so a missing table is not an error.
    pub async fn initiate(&self) -> bool {
        let table = self.table;
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    for dep in schema::drop_order(table) {
                        let sql = dep.drop_sql();
                        sqlx::query(&sql).execute(&mut *conn).await?;
                    }
                    let sql = table.create_sql();
                    sqlx::query(&sql).execute(&mut *conn).await?;
                    Ok(())
                })
            })
            .await;
        self.swallow("initiate", result.map(|_| true), false)
    }

    /// Unconditional select of all rows, in schema column order.
    pub async fn fetch_all(&self) -> Vec<Vec<SqlValue>> {
        let table = self.table;
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let sql = table.select_sql();
                    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
                    let types: Vec<ColumnType> = table.columns.iter().map(|c| c.ty).collect();
                    rows.iter()
                        .map(|r| value::decode_row(r, &types).map_err(DbError::from))
                        .collect()
                })
            })
            .await;
        self.swallow("fetch_all", result, Vec::new())
    }

    /// Parameterized insert of one row.
    ///
    /// Fields are matched to schema columns by name (case-insensitive);
    /// absent columns insert NULL. Returns true iff a row was affected.
    pub async fn insert(&self, fields: &Map<String, Value>) -> bool {
        let table = self.table;
        let values = match coerce_insert_values(table, fields) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(table = table.name, error = %err, "insert rejected");
                return false;
            }
        };
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let sql = insert_sql(table);
                    let mut query = sqlx::query(&sql);
                    for v in values {
                        query = v.bind_to(query);
                    }
                    let outcome = query.execute(&mut *conn).await?;
                    Ok(outcome.rows_affected() > 0)
                })
            })
            .await;
        self.swallow("insert", result, false)
    }

    /// Parameterized update. Assignment and predicate column names are
    /// filtered against the schema; an empty assignment set is a no-op
    /// failure. An empty predicate updates every row.
    pub async fn update(&self, set: &Map<String, Value>, predicate: &Map<String, Value>) -> bool {
        let table = self.table;
        let (set_cols, set_values) = match filter_and_coerce(table, set) {
            Ok(bound) => bound,
            Err(err) => {
                tracing::warn!(table = table.name, error = %err, "update rejected");
                return false;
            }
        };
        if set_cols.is_empty() {
            tracing::warn!(table = table.name, "update with no recognized assignment columns");
            return false;
        }
        let (where_cols, where_values) = match filter_and_coerce(table, predicate) {
            Ok(bound) => bound,
            Err(err) => {
                tracing::warn!(table = table.name, error = %err, "update rejected");
                return false;
            }
        };
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let sql = update_sql(table, &set_cols, &where_cols);
                    let mut query = sqlx::query(&sql);
                    for v in set_values.into_iter().chain(where_values) {
                        query = v.bind_to(query);
                    }
                    let outcome = query.execute(&mut *conn).await?;
                    Ok(outcome.rows_affected() > 0)
                })
            })
            .await;
        self.swallow("update", result, false)
    }

    /// Parameterized delete. An empty predicate deletes every row.
    pub async fn delete(&self, predicate: &Map<String, Value>) -> bool {
        let table = self.table;
        let (where_cols, where_values) = match filter_and_coerce(table, predicate) {
            Ok(bound) => bound,
            Err(err) => {
                tracing::warn!(table = table.name, error = %err, "delete rejected");
                return false;
            }
        };
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let sql = delete_sql(table, &where_cols);
                    let mut query = sqlx::query(&sql);
                    for v in where_values {
                        query = v.bind_to(query);
                    }
                    let outcome = query.execute(&mut *conn).await?;
                    Ok(outcome.rows_affected() > 0)
                })
            })
            .await;
        self.swallow("delete", result, false)
    }

    /// Select only the requested columns, in request order.
    ///
    /// Unknown names are dropped against the schema allow-list; if none
    /// survive, no query runs. Caller text never reaches the SQL string.
    pub async fn project(&self, requested: &[String]) -> Vec<Vec<SqlValue>> {
        let table = self.table;
        let selected: Vec<&crate::schema::Column> = requested
            .iter()
            .filter_map(|name| table.column(name))
            .collect();
        if selected.is_empty() {
            return Vec::new();
        }
        let columns: Vec<&'static str> = selected.iter().map(|c| c.name).collect();
        let types: Vec<ColumnType> = selected.iter().map(|c| c.ty).collect();
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let sql = project_sql(table, &columns);
                    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
                    rows.iter()
                        .map(|r| value::decode_row(r, &types).map_err(DbError::from))
                        .collect()
                })
            })
            .await;
        self.swallow("project", result, Vec::new())
    }

    /// Row count, `-1` on failure.
    pub async fn count(&self) -> i64 {
        let table = self.table;
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let sql = format!("SELECT COUNT(*) FROM {}", table.name);
                    let row: (i64,) = sqlx::query_as(&sql).fetch_one(&mut *conn).await?;
                    Ok(row.0)
                })
            })
            .await;
        self.swallow("count", result, -1)
    }

    fn swallow<T>(&self, op: &'static str, result: DbResult<T>, sentinel: T) -> T {
        match result {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(
                    table = self.table.name,
                    op,
                    error = %err,
                    "facade operation degraded to sentinel"
                );
                sentinel
            }
        }
    }
}

/// Coerce insert fields into schema column order; absent fields become
/// typed NULLs and let the database's own constraints decide.
fn coerce_insert_values(
    table: &'static TableSchema,
    fields: &Map<String, Value>,
) -> DbResult<Vec<SqlValue>> {
    table
        .columns
        .iter()
        .map(|col| {
            let input = fields
                .iter()
                .find(|(name, _)| col.name.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
                .unwrap_or(&Value::Null);
            value::coerce(input, col.ty).map_err(|reason| DbError::BadValue {
                column: col.name.to_string(),
                reason,
            })
        })
        .collect()
}

/// Keep only fields naming schema columns; coerce the survivors.
/// Unknown names are dropped silently.
fn filter_and_coerce(
    table: &'static TableSchema,
    fields: &Map<String, Value>,
) -> DbResult<(Vec<&'static str>, Vec<SqlValue>)> {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for (name, input) in fields {
        let Some(col) = table.column(name) else {
            continue;
        };
        let value = value::coerce(input, col.ty).map_err(|reason| DbError::BadValue {
            column: col.name.to_string(),
            reason,
        })?;
        columns.push(col.name);
        values.push(value);
    }
    Ok((columns, values))
}

fn insert_sql(table: &TableSchema) -> String {
    let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        table.column_list(),
        placeholders.join(", ")
    )
}

fn update_sql(table: &TableSchema, set_cols: &[&str], where_cols: &[&str]) -> String {
    let mut idx = 0;
    let assignments: Vec<String> = set_cols
        .iter()
        .map(|c| {
            idx += 1;
            format!("{c} = ${idx}")
        })
        .collect();
    let mut sql = format!("UPDATE {} SET {}", table.name, assignments.join(", "));
    if !where_cols.is_empty() {
        let predicates: Vec<String> = where_cols
            .iter()
            .map(|c| {
                idx += 1;
                format!("{c} = ${idx}")
            })
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    sql
}

fn delete_sql(table: &TableSchema, where_cols: &[&str]) -> String {
    let mut sql = format!("DELETE FROM {}", table.name);
    if !where_cols.is_empty() {
        let predicates: Vec<String> = where_cols
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ${}", i + 1))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    sql
}

fn project_sql(table: &TableSchema, columns: &[&str]) -> String {
    format!("SELECT {} FROM {}", columns.join(", "), table.name)
}
