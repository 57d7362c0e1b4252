//! RecordId - Identifier representations per SQL dialect

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// SQL dialect a record variant targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Postgres,
}

impl Dialect {
    /// Quote an identifier for this dialect
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident),
            Dialect::Postgres => format!("\"{}\"", ident),
        }
    }
}

/// Who assigns the primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    /// Generated by the application right before the first insert
    Application,
    /// Generated by the storage engine on insert
    Database,
}

/// Primary key representation of a record variant
pub trait RecordId:
    Clone + fmt::Debug + fmt::Display + Eq + Hash + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const DIALECT: Dialect;
    const SOURCE: IdSource;
    /// Column type of the primary key
    const SQL_TYPE: &'static str;

    /// Placeholder held before an id is assigned
    fn unassigned() -> Self;

    fn is_assigned(&self) -> bool;

    /// Fresh random (v4) identifier
    fn generate() -> Self;
}

/// MySQL variant: uuid stored as 36-character text
impl RecordId for String {
    const DIALECT: Dialect = Dialect::MySql;
    const SOURCE: IdSource = IdSource::Application;
    const SQL_TYPE: &'static str = "varchar(36)";

    fn unassigned() -> Self {
        String::new()
    }

    fn is_assigned(&self) -> bool {
        !self.is_empty()
    }

    fn generate() -> Self {
        Uuid::new_v4().to_string()
    }
}

/// Postgres variant: native `uuid` column
impl RecordId for Uuid {
    const DIALECT: Dialect = Dialect::Postgres;
    const SOURCE: IdSource = IdSource::Database;
    const SQL_TYPE: &'static str = "uuid";

    fn unassigned() -> Self {
        Uuid::nil()
    }

    fn is_assigned(&self) -> bool {
        !self.is_nil()
    }

    fn generate() -> Self {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_id() {
        assert!(!String::unassigned().is_assigned());
        let id = String::generate();
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_native_id() {
        assert!(!Uuid::unassigned().is_assigned());
        assert!(Uuid::generate().is_assigned());
        assert_eq!(<Uuid as RecordId>::SOURCE, IdSource::Database);
    }

    #[test]
    fn test_quote() {
        assert_eq!(Dialect::MySql.quote("ID"), "`ID`");
        assert_eq!(Dialect::Postgres.quote("ID"), "\"ID\"");
    }
}
