//! Dynamically typed column values
//!
//! Rows cross the façade as ordered sequences of [`SqlValue`], typed by the
//! declared schema rather than by Rust structs. Incoming JSON is coerced
//! per column type before binding; result rows are decoded per column type
//! after fetching. Values are always bound as placeholders, never spliced
//! into SQL text.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::Serializer;
use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use crate::schema::ColumnType;

/// One column value, carried in schema column order.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Decimal(Decimal),
    /// SQL NULL, tagged with the column type so binding stays typed.
    Null(ColumnType),
}

impl SqlValue {
    /// Bind this value as the next placeholder of `query`.
    pub fn bind_to<'q>(
        self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Integer(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
            SqlValue::Null(ColumnType::Text) => query.bind(None::<String>),
            SqlValue::Null(ColumnType::Integer) => query.bind(None::<i64>),
            SqlValue::Null(ColumnType::Date) => query.bind(None::<NaiveDate>),
            SqlValue::Null(ColumnType::Decimal) => query.bind(None::<Decimal>),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Text(v) => serializer.serialize_str(v),
            SqlValue::Integer(v) => serializer.serialize_i64(*v),
            SqlValue::Date(v) => serializer.serialize_str(&v.format("%Y-%m-%d").to_string()),
            SqlValue::Decimal(v) => match v.to_f64() {
                Some(f) => serializer.serialize_f64(f),
                None => serializer.serialize_str(&v.to_string()),
            },
            SqlValue::Null(_) => serializer.serialize_unit(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Text(v) => write!(f, "{v}"),
            SqlValue::Integer(v) => write!(f, "{v}"),
            SqlValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            SqlValue::Decimal(v) => write!(f, "{v}"),
            SqlValue::Null(_) => write!(f, "NULL"),
        }
    }
}

/// Coerce one JSON value to the declared column type.
///
/// Form-shaped clients send everything as strings, so string input is
/// accepted for every type. Dates must be `YYYY-MM-DD`.
pub fn coerce(input: &serde_json::Value, ty: ColumnType) -> Result<SqlValue, String> {
    use serde_json::Value;

    if input.is_null() {
        return Ok(SqlValue::Null(ty));
    }

    match ty {
        ColumnType::Text => match input {
            Value::String(s) => Ok(SqlValue::Text(s.clone())),
            Value::Number(n) => Ok(SqlValue::Text(n.to_string())),
            other => Err(format!("expected text, got {other}")),
        },
        ColumnType::Integer => match input {
            Value::Number(n) => n
                .as_i64()
                .map(SqlValue::Integer)
                .ok_or_else(|| format!("not an integer: {n}")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(SqlValue::Integer)
                .map_err(|_| format!("not an integer: '{s}'")),
            other => Err(format!("expected integer, got {other}")),
        },
        ColumnType::Date => match input {
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(SqlValue::Date)
                .map_err(|_| format!("not a YYYY-MM-DD date: '{s}'")),
            other => Err(format!("expected date string, got {other}")),
        },
        ColumnType::Decimal => match input {
            Value::Number(n) => Decimal::from_str(&n.to_string())
                .map(SqlValue::Decimal)
                .map_err(|e| format!("not a decimal: {e}")),
            Value::String(s) => Decimal::from_str(s.trim())
                .map(SqlValue::Decimal)
                .map_err(|_| format!("not a decimal: '{s}'")),
            other => Err(format!("expected decimal, got {other}")),
        },
    }
}

/// Decode one column of a fetched row by its declared type.
pub fn decode_column(row: &PgRow, idx: usize, ty: ColumnType) -> Result<SqlValue, sqlx::Error> {
    Ok(match ty {
        ColumnType::Text => match row.try_get::<Option<String>, _>(idx)? {
            Some(v) => SqlValue::Text(v),
            None => SqlValue::Null(ty),
        },
        ColumnType::Integer => match row.try_get::<Option<i32>, _>(idx)? {
            Some(v) => SqlValue::Integer(v as i64),
            None => SqlValue::Null(ty),
        },
        ColumnType::Date => match row.try_get::<Option<NaiveDate>, _>(idx)? {
            Some(v) => SqlValue::Date(v),
            None => SqlValue::Null(ty),
        },
        ColumnType::Decimal => match row.try_get::<Option<Decimal>, _>(idx)? {
            Some(v) => SqlValue::Decimal(v),
            None => SqlValue::Null(ty),
        },
    })
}

/// Decode a whole row against an ordered column type list.
pub fn decode_row(row: &PgRow, types: &[ColumnType]) -> Result<Vec<SqlValue>, sqlx::Error> {
    types
        .iter()
        .enumerate()
        .map(|(idx, ty)| decode_column(row, idx, *ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_date_strings() {
        let v = coerce(&json!("2024-03-05"), ColumnType::Date).unwrap();
        assert_eq!(
            v,
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
    }

    #[test]
    fn rejects_non_iso_dates() {
        assert!(coerce(&json!("03/05/2024"), ColumnType::Date).is_err());
        assert!(coerce(&json!("2024-13-40"), ColumnType::Date).is_err());
        assert!(coerce(&json!(20240305), ColumnType::Date).is_err());
    }

    #[test]
    fn coerces_integer_from_number_and_string() {
        assert_eq!(
            coerce(&json!(42), ColumnType::Integer).unwrap(),
            SqlValue::Integer(42)
        );
        assert_eq!(
            coerce(&json!("42"), ColumnType::Integer).unwrap(),
            SqlValue::Integer(42)
        );
        assert!(coerce(&json!(4.5), ColumnType::Integer).is_err());
        assert!(coerce(&json!("four"), ColumnType::Integer).is_err());
    }

    #[test]
    fn coerces_decimal_from_number_and_string() {
        assert_eq!(
            coerce(&json!("19.99"), ColumnType::Decimal).unwrap(),
            SqlValue::Decimal(Decimal::from_str("19.99").unwrap())
        );
        assert_eq!(
            coerce(&json!(19.99), ColumnType::Decimal).unwrap(),
            SqlValue::Decimal(Decimal::from_str("19.99").unwrap())
        );
    }

    #[test]
    fn null_keeps_column_type() {
        assert_eq!(
            coerce(&serde_json::Value::Null, ColumnType::Integer).unwrap(),
            SqlValue::Null(ColumnType::Integer)
        );
    }

    #[test]
    fn serializes_rows_as_json_scalars() {
        let row = vec![
            SqlValue::Integer(7),
            SqlValue::Text("hay".into()),
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            SqlValue::Decimal(Decimal::from_str("12.50").unwrap()),
            SqlValue::Null(ColumnType::Text),
        ];
        let encoded = serde_json::to_value(&row).unwrap();
        assert_eq!(encoded, json!([7, "hay", "2024-01-02", 12.5, null]));
    }
}
