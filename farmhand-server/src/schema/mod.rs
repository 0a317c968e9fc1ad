//! Declared table schemas
//!
//! Every table the API manages is described by a static [`TableSchema`]:
//! name, columns with semantic types, primary key, and foreign keys with
//! their on-delete policy. DDL and the drop-ordering graph are derived from
//! these declarations rather than hand-written per table.

pub mod registry;

pub use registry::{dependents, drop_order, lookup, REGISTRY};

/// Semantic column type, rendered to a PostgreSQL type in DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Date,
    Decimal,
}

impl ColumnType {
    /// PostgreSQL type name used in CREATE TABLE.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "VARCHAR(200)",
            ColumnType::Integer => "INTEGER",
            ColumnType::Date => "DATE",
            ColumnType::Decimal => "NUMERIC(10, 2)",
        }
    }
}

/// A single declared column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub not_null: bool,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            not_null: false,
        }
    }

    pub const fn required(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            not_null: true,
        }
    }
}

/// On-delete policy for a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

impl OnDelete {
    fn sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "ON DELETE CASCADE",
            OnDelete::SetNull => "ON DELETE SET NULL",
        }
    }
}

/// A declared foreign key constraint.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    /// Referencing columns on this table.
    pub columns: &'static [&'static str],
    /// Referenced table name.
    pub references: &'static str,
    /// Referenced columns, matching `columns` positionally.
    pub referenced_columns: &'static [&'static str],
    pub on_delete: OnDelete,
}

/// Full declaration of one logical table.
#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    /// Case-insensitive column lookup, returning the canonical declaration.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// All column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Comma-separated column list in declaration order.
    pub fn column_list(&self) -> String {
        self.column_names().collect::<Vec<_>>().join(", ")
    }

    /// CREATE TABLE statement with the declared PK and FK clauses.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if c.not_null {
                    format!("{} {} NOT NULL", c.name, c.ty.sql_type())
                } else {
                    format!("{} {}", c.name, c.ty.sql_type())
                }
            })
            .collect();

        parts.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));

        for fk in self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({}) {}",
                fk.columns.join(", "),
                fk.references,
                fk.referenced_columns.join(", "),
                fk.on_delete.sql()
            ));
        }

        format!("CREATE TABLE {} ({})", self.name, parts.join(", "))
    }

    /// DROP TABLE statement. IF EXISTS makes missing tables a no-op.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    /// SELECT of all rows in declared column order.
    pub fn select_sql(&self) -> String {
        format!("SELECT {} FROM {}", self.column_list(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::registry;
    use super::*;

    #[test]
    fn create_sql_renders_pk_and_fk() {
        let sql = registry::SHIFT.create_sql();
        assert_eq!(
            sql,
            "CREATE TABLE Shift (FarmerID INTEGER, sDate DATE, \
             PRIMARY KEY (FarmerID, sDate), \
             FOREIGN KEY (FarmerID) REFERENCES Farmer(FarmerID) ON DELETE CASCADE)"
        );
    }

    #[test]
    fn create_sql_renders_not_null() {
        let sql = registry::TRANSACTION.create_sql();
        assert!(sql.contains("cEmail VARCHAR(200) NOT NULL"));
        assert!(sql.contains("FOREIGN KEY (cEmail) REFERENCES Customer(cEmail) ON DELETE CASCADE"));
    }

    #[test]
    fn drop_sql_uses_if_exists() {
        assert_eq!(registry::FARMER.drop_sql(), "DROP TABLE IF EXISTS Farmer");
    }

    #[test]
    fn select_sql_lists_columns_in_schema_order() {
        assert_eq!(
            registry::CUSTOMER.select_sql(),
            "SELECT cEmail, cName, cPhoneNumber FROM Customer"
        );
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let col = registry::TRANSACTION.column("total").unwrap();
        assert_eq!(col.name, "Total");
        assert_eq!(col.ty, ColumnType::Decimal);
        assert!(registry::TRANSACTION.column("dropTable").is_none());
    }
}
