//! Column schema of the base record per dialect

use crate::id::{Dialect, RecordId};
use uuid::Uuid;

pub const ID: &str = "ID";
pub const CREATED_AT: &str = "CREATED_AT";
pub const UPDATED_AT: &str = "UPDATED_AT";
pub const DELETED_AT: &str = "DELETED_AT";

/// One column of the base record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub primary_key: bool,
    pub not_null: bool,
    pub default: Option<&'static str>,
    /// `None` leaves the name to [`ColumnDef::index_name`]
    pub index: Option<&'static str>,
    pub indexed: bool,
    /// Written on insert only, never on update
    pub create_only: bool,
}

impl ColumnDef {
    fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            primary_key: false,
            not_null: false,
            default: None,
            index: None,
            indexed: false,
            create_only: false,
        }
    }

    fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    fn default_value(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    fn indexed(mut self, name: Option<&'static str>) -> Self {
        self.indexed = true;
        self.index = name;
        self
    }

    fn create_only(mut self) -> Self {
        self.create_only = true;
        self
    }

    /// Column definition as it appears inside `CREATE TABLE`
    pub fn ddl(&self, dialect: Dialect) -> String {
        let mut out = format!("{} {}", dialect.quote(self.name), self.sql_type);
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = self.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        out
    }

    /// Index name, either explicit or derived from the table
    pub fn index_name(&self, table: &str) -> Option<String> {
        if !self.indexed {
            return None;
        }
        Some(match self.index {
            Some(name) => name.to_string(),
            None => format!("idx_{}_{}", table, self.name.to_lowercase()),
        })
    }
}

/// Base columns in declaration order
pub fn columns(dialect: Dialect) -> Vec<ColumnDef> {
    match dialect {
        Dialect::MySql => vec![
            ColumnDef::new(ID, String::SQL_TYPE).primary_key(),
            ColumnDef::new(CREATED_AT, "datetime(6)")
                .default_value("CURRENT_TIMESTAMP(6)")
                .indexed(Some("IDX_CREATED_AT"))
                .create_only(),
            ColumnDef::new(UPDATED_AT, "datetime(6)")
                .default_value("CURRENT_TIMESTAMP(6) ON UPDATE CURRENT_TIMESTAMP(6)")
                .indexed(Some("IDX_UPDATED_AT")),
            ColumnDef::new(DELETED_AT, "datetime(6)")
                .default_value("NULL")
                .indexed(Some("IDX_DELETED_AT")),
        ],
        Dialect::Postgres => vec![
            ColumnDef::new(ID, Uuid::SQL_TYPE)
                .primary_key()
                .default_value("uuid_generate_v4()"),
            ColumnDef::new(CREATED_AT, "timestamp(6)")
                .default_value("CURRENT_TIMESTAMP(6)")
                .indexed(None),
            ColumnDef::new(UPDATED_AT, "timestamp(6)")
                .default_value("CURRENT_TIMESTAMP(6)")
                .indexed(None),
            ColumnDef::new(DELETED_AT, "timestamp(6)").indexed(None),
        ],
    }
}

/// Column list and primary key clause for `CREATE TABLE`
pub fn column_ddl(dialect: Dialect) -> String {
    let cols = columns(dialect);
    let mut lines: Vec<String> = cols.iter().map(|c| c.ddl(dialect)).collect();
    let keys: Vec<String> = cols
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| dialect.quote(c.name))
        .collect();
    lines.push(format!("PRIMARY KEY ({})", keys.join(", ")));
    lines.join(",\n")
}

/// `CREATE INDEX` statements for the indexed base columns
pub fn index_ddl(dialect: Dialect, table: &str) -> Vec<String> {
    columns(dialect)
        .iter()
        .filter_map(|c| {
            c.index_name(table).map(|name| {
                format!(
                    "CREATE INDEX {} ON {} ({})",
                    dialect.quote(&name),
                    dialect.quote(table),
                    dialect.quote(c.name)
                )
            })
        })
        .collect()
}
