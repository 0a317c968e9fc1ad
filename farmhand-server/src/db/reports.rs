//! Fixed report queries
//!
//! Named, parameterized query templates that do not fit the generic
//! façade: joins, aggregates, a relational division, and the structured
//! animal search. Same sentinel error policy as the façade.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::db::{value, Db, DbError, SqlValue};
use crate::schema::{registry, ColumnType};

/// Comparison operators accepted by the animal search.
const SEARCH_OPERATORS: &[&str] = &["=", "<>", "<", "<=", ">", ">="];

/// One structured search condition, as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCondition {
    pub column: String,
    pub op: String,
    pub value: Value,
    /// How this condition attaches to the previous one; AND when absent.
    #[serde(default)]
    pub connective: Option<String>,
}

/// Report queries over the farm tables.
pub struct Reports<'a> {
    db: &'a Db,
}

impl<'a> Reports<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Farmers on shift on the given date: Shift ⋈ Farmer.
    pub async fn shift_roster(&self, date: &str) -> Vec<Vec<SqlValue>> {
        let Ok(date) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") else {
            tracing::warn!(input = date, "shift roster called with unparseable date");
            return Vec::new();
        };
        self.fetch(
            "shift_roster",
            move |q| q.bind(date),
            "SELECT F.FarmerID, F.fName, F.fPhoneNumber \
             FROM Shift S JOIN Farmer F ON S.FarmerID = F.FarmerID \
             WHERE S.sDate = $1",
            &[ColumnType::Integer, ColumnType::Text, ColumnType::Text],
        )
        .await
    }

    /// Machinery counts grouped by condition.
    pub async fn machinery_by_condition(&self) -> Vec<Vec<SqlValue>> {
        self.fetch(
            "machinery_by_condition",
            |q| q,
            "SELECT Condition, COUNT(*)::INTEGER FROM Machinery \
             GROUP BY Condition ORDER BY Condition",
            &[ColumnType::Text, ColumnType::Integer],
        )
        .await
    }

    /// Per-day transaction totals at or above the threshold.
    pub async fn transaction_totals(&self, min_total: Decimal) -> Vec<Vec<SqlValue>> {
        self.fetch(
            "transaction_totals",
            move |q| q.bind(min_total),
            "SELECT tDate, SUM(Total) FROM Transaction \
             GROUP BY tDate HAVING SUM(Total) >= $1 ORDER BY tDate",
            &[ColumnType::Date, ColumnType::Decimal],
        )
        .await
    }

    /// Count of cows whose animal record weighs under the bound; `-1` on
    /// failure.
    pub async fn underweight_cows(&self, max_weight: Decimal) -> i64 {
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let row: (i64,) = sqlx::query_as(
                        "SELECT COUNT(*) FROM Cow C \
                         JOIN Animal A ON C.AnimalID = A.AnimalID \
                         WHERE A.Weight < $1",
                    )
                    .bind(max_weight)
                    .fetch_one(&mut *conn)
                    .await?;
                    Ok(row.0)
                })
            })
            .await;
        match result {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(error = %err, "underweight cow count degraded to sentinel");
                -1
            }
        }
    }

    /// Relational division: farmers with a shift on every distinct date
    /// present in Shift. An empty Shift table qualifies every farmer.
    pub async fn super_farmers(&self) -> Vec<Vec<SqlValue>> {
        self.fetch(
            "super_farmers",
            |q| q,
            "SELECT F.FarmerID, F.fName FROM Farmer F \
             WHERE NOT EXISTS (\
                 SELECT D.sDate FROM (SELECT DISTINCT sDate FROM Shift) D \
                 WHERE NOT EXISTS (\
                     SELECT 1 FROM Shift S \
                     WHERE S.FarmerID = F.FarmerID AND S.sDate = D.sDate\
                 )\
             ) ORDER BY F.FarmerID",
            &[ColumnType::Integer, ColumnType::Text],
        )
        .await
    }

    /// Egg collections with their chicken's animal record.
    pub async fn egg_products(&self) -> Vec<Vec<SqlValue>> {
        self.fetch(
            "egg_products",
            |q| q,
            "SELECT A.AnimalID, A.aName, E.CollectionDate, E.EggCount \
             FROM Animal A \
             JOIN Chicken C ON A.AnimalID = C.AnimalID \
             JOIN EggRecords E ON C.AnimalID = E.AnimalID \
             ORDER BY E.CollectionDate, A.AnimalID",
            &[
                ColumnType::Integer,
                ColumnType::Text,
                ColumnType::Date,
                ColumnType::Integer,
            ],
        )
        .await
    }

    /// Dairy collections with their cow's animal record.
    pub async fn dairy_products(&self) -> Vec<Vec<SqlValue>> {
        self.fetch(
            "dairy_products",
            |q| q,
            "SELECT A.AnimalID, A.aName, D.CollectionDate, D.Volume \
             FROM Animal A \
             JOIN Cow C ON A.AnimalID = C.AnimalID \
             JOIN DairyRecords D ON C.AnimalID = D.AnimalID \
             ORDER BY D.CollectionDate, A.AnimalID",
            &[
                ColumnType::Integer,
                ColumnType::Text,
                ColumnType::Date,
                ColumnType::Decimal,
            ],
        )
        .await
    }

    /// Products joined to the crop they came from.
    pub async fn crop_products(&self) -> Vec<Vec<SqlValue>> {
        self.fetch(
            "crop_products",
            |q| q,
            "SELECT P.ProductID, P.pName, C.cType, P.Price \
             FROM Products P JOIN Crop C ON P.CropID = C.CropID \
             ORDER BY P.ProductID",
            &[
                ColumnType::Integer,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Decimal,
            ],
        )
        .await
    }

    /// Purchase lines joined to their product.
    pub async fn purchased_products(&self) -> Vec<Vec<SqlValue>> {
        self.fetch(
            "purchased_products",
            |q| q,
            "SELECT PU.TransactionNumber, PR.pName, PR.Price, PU.Quantity \
             FROM Purchase PU JOIN Products PR ON PU.ProductID = PR.ProductID \
             ORDER BY PU.TransactionNumber, PR.ProductID",
            &[
                ColumnType::Integer,
                ColumnType::Text,
                ColumnType::Decimal,
                ColumnType::Integer,
            ],
        )
        .await
    }

    /// Animal rows matching the structured conditions.
    ///
    /// Conditions naming unknown columns or operators are dropped, and
    /// values are bound, never spliced. With no surviving conditions the
    /// select is unfiltered.
    pub async fn animal_search(&self, conditions: &[SearchCondition]) -> Vec<Vec<SqlValue>> {
        let (clause, binds) = build_animal_filter(conditions);
        let table = &registry::ANIMAL;
        let sql = if clause.is_empty() {
            table.select_sql()
        } else {
            format!("{} WHERE {}", table.select_sql(), clause)
        };
        let types: Vec<ColumnType> = table.columns.iter().map(|c| c.ty).collect();
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let mut query = sqlx::query(&sql);
                    for v in binds {
                        query = v.bind_to(query);
                    }
                    let rows = query.fetch_all(&mut *conn).await?;
                    rows.iter()
                        .map(|r| value::decode_row(r, &types).map_err(DbError::from))
                        .collect()
                })
            })
            .await;
        match result {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(error = %err, "animal search degraded to sentinel");
                Vec::new()
            }
        }
    }

    /// Run one fixed query and decode rows by the given column types.
    async fn fetch<B>(
        &self,
        name: &'static str,
        bind: B,
        sql: &'static str,
        types: &'static [ColumnType],
    ) -> Vec<Vec<SqlValue>>
    where
        B: for<'q> FnOnce(
                sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
            )
                -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>
            + Send
            + 'static,
    {
        let result = self
            .db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let rows = bind(sqlx::query(sql)).fetch_all(&mut *conn).await?;
                    rows.iter()
                        .map(|r| value::decode_row(r, types).map_err(DbError::from))
                        .collect()
                })
            })
            .await;
        match result {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(report = name, error = %err, "report degraded to sentinel");
                Vec::new()
            }
        }
    }
}

/// Build the WHERE clause and bind list for an animal search.
///
/// Returns placeholder text only; every comparison value lands in the
/// bind list.
fn build_animal_filter(conditions: &[SearchCondition]) -> (String, Vec<SqlValue>) {
    let table = &registry::ANIMAL;
    let mut clause = String::new();
    let mut binds: Vec<SqlValue> = Vec::new();
    for cond in conditions {
        let Some(col) = table.column(&cond.column) else {
            tracing::debug!(column = %cond.column, "search condition dropped: unknown column");
            continue;
        };
        let Some(op) = SEARCH_OPERATORS.iter().find(|o| **o == cond.op) else {
            tracing::debug!(op = %cond.op, "search condition dropped: unknown operator");
            continue;
        };
        let Ok(value) = value::coerce(&cond.value, col.ty) else {
            tracing::debug!(column = col.name, "search condition dropped: bad value");
            continue;
        };
        if !clause.is_empty() {
            let connective = match cond.connective.as_deref() {
                Some(c) if c.eq_ignore_ascii_case("or") => "OR",
                _ => "AND",
            };
            clause.push(' ');
            clause.push_str(connective);
            clause.push(' ');
        }
        binds.push(value);
        clause.push_str(&format!("{} {} ${}", col.name, op, binds.len()));
    }
    (clause, binds)
}
