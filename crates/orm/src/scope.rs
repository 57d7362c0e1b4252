//! Scope - Soft-delete visibility of queries

use crate::id::{Dialect, RecordId};
use crate::model::BaseModel;
use crate::schema::DELETED_AT;

/// Which rows a query sees. Ordinary queries exclude soft-deleted rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    Active,
    WithDeleted,
    OnlyDeleted,
}

impl Scope {
    pub fn admits<I: RecordId>(&self, model: &BaseModel<I>) -> bool {
        match self {
            Scope::Active => !model.is_deleted(),
            Scope::WithDeleted => true,
            Scope::OnlyDeleted => model.is_deleted(),
        }
    }

    /// `WHERE` predicate implementing this scope, if any
    pub fn sql_predicate(&self, dialect: Dialect) -> Option<String> {
        let column = dialect.quote(DELETED_AT);
        match self {
            Scope::Active => Some(format!("{} IS NULL", column)),
            Scope::WithDeleted => None,
            Scope::OnlyDeleted => Some(format!("{} IS NOT NULL", column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MySqlModel;
    use chrono::Utc;

    #[test]
    fn test_admits() {
        let active = MySqlModel::new();
        let mut deleted = MySqlModel::new();
        deleted.soft_delete(Utc::now());

        assert!(Scope::default().admits(&active));
        assert!(!Scope::default().admits(&deleted));
        assert!(Scope::WithDeleted.admits(&deleted));
        assert!(Scope::OnlyDeleted.admits(&deleted));
        assert!(!Scope::OnlyDeleted.admits(&active));
    }

    #[test]
    fn test_sql_predicate() {
        assert_eq!(
            Scope::Active.sql_predicate(Dialect::MySql).as_deref(),
            Some("`DELETED_AT` IS NULL")
        );
        assert_eq!(Scope::WithDeleted.sql_predicate(Dialect::Postgres), None);
        assert_eq!(
            Scope::OnlyDeleted.sql_predicate(Dialect::Postgres).as_deref(),
            Some("\"DELETED_AT\" IS NOT NULL")
        );
    }
}
