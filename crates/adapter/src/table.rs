//! In-memory record table
//!
//! Behaves like a single SQL table with soft delete: application-generated
//! ids are assigned by [`orm::BaseModel::prepare_create`]; for
//! database-generated variants the table plays the engine and assigns a
//! fresh id on insert.

use async_trait::async_trait;
use chrono::Utc;
use orm::{IdSource, Record, RecordId, RecordRepository, Scope};
use shared::{Context, Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const SCOPE: &str = "record";

/// In-memory [`RecordRepository`]
#[derive(Debug)]
pub struct MemoryTable<R: Record> {
    rows: Arc<RwLock<HashMap<R::Id, R>>>,
}

impl<R: Record> Clone for MemoryTable<R> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<R: Record> Default for MemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> MemoryTable<R> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn rows_mut(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<R::Id, R>>> {
        self.rows.write().map_err(|_| super::lock_poisoned("write"))
    }

    fn rows(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<R::Id, R>>> {
        self.rows.read().map_err(|_| super::lock_poisoned("read"))
    }

    /// Apply `change` to the row with `id` if `scope` admits it
    fn modify<F>(&self, id: &R::Id, scope: Scope, change: F) -> Result<()>
    where
        F: FnOnce(&mut R),
    {
        let mut rows = self.rows_mut()?;
        match rows.get_mut(id) {
            Some(row) if scope.admits(row.base()) => {
                change(row);
                Ok(())
            }
            _ => Err(Error::not_found(SCOPE, id.to_string())),
        }
    }
}

#[async_trait]
impl<R: Record> RecordRepository<R> for MemoryTable<R> {
    async fn insert(&self, ctx: &Context, mut record: R) -> Result<R> {
        ctx.check()?;
        let base = record.base_mut();
        base.prepare_create(Utc::now());
        if <R::Id as RecordId>::SOURCE == IdSource::Database && !base.has_id() {
            base.assign_id(<R::Id as RecordId>::generate())?;
        }

        let mut rows = self.rows_mut()?;
        let id = record.id().clone();
        if rows.contains_key(&id) {
            return Err(Error::invalid_input(format!("duplicate record id {}", id)));
        }
        rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, ctx: &Context, mut record: R) -> Result<R> {
        ctx.check()?;
        let mut rows = self.rows_mut()?;
        let id = record.id().clone();
        let stored = match rows.get(&id) {
            Some(row) if !row.base().is_deleted() => row,
            _ => return Err(Error::not_found(SCOPE, id.to_string())),
        };

        // The caller's copy may carry stale audit fields.
        let mut base = stored.base().clone();
        base.touch(Utc::now());
        *record.base_mut() = base;

        rows.insert(id, record.clone());
        Ok(record)
    }

    async fn soft_delete(&self, ctx: &Context, id: &R::Id) -> Result<()> {
        ctx.check()?;
        self.modify(id, Scope::Active, |row| {
            row.base_mut().soft_delete(Utc::now());
        })?;
        tracing::debug!(%id, "record soft-deleted");
        Ok(())
    }

    async fn restore(&self, ctx: &Context, id: &R::Id) -> Result<()> {
        ctx.check()?;
        self.modify(id, Scope::OnlyDeleted, |row| row.base_mut().restore())
    }

    async fn find(&self, ctx: &Context, id: &R::Id, scope: Scope) -> Result<R> {
        ctx.check()?;
        let rows = self.rows()?;
        rows.get(id)
            .filter(|row| scope.admits(row.base()))
            .cloned()
            .ok_or_else(|| Error::not_found(SCOPE, id.to_string()))
    }

    async fn list(&self, ctx: &Context, scope: Scope) -> Result<Vec<R>> {
        ctx.check()?;
        let rows = self.rows()?;
        let mut found: Vec<R> = rows
            .values()
            .filter(|row| scope.admits(row.base()))
            .cloned()
            .collect();
        found.sort_by_key(|row| row.base().created_at());
        Ok(found)
    }

    async fn count(&self, ctx: &Context, scope: Scope) -> Result<usize> {
        ctx.check()?;
        let rows = self.rows()?;
        Ok(rows.values().filter(|row| scope.admits(row.base())).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orm::{MySqlModel, PostgresModel};
    use shared::ErrorKind;

    #[derive(Debug, Clone)]
    struct User {
        base: PostgresModel,
        email: String,
    }

    impl Record for User {
        type Id = uuid::Uuid;

        fn base(&self) -> &PostgresModel {
            &self.base
        }

        fn base_mut(&mut self) -> &mut PostgresModel {
            &mut self.base
        }
    }

    #[tokio::test]
    async fn test_conformance_mysql() {
        let table: MemoryTable<MySqlModel> = MemoryTable::new();
        conformance::orm::run(&table, MySqlModel::new)
            .await
            .assert_passed();
    }

    #[tokio::test]
    async fn test_conformance_postgres() {
        let table: MemoryTable<PostgresModel> = MemoryTable::new();
        conformance::orm::run(&table, PostgresModel::new)
            .await
            .assert_passed();
    }

    #[tokio::test]
    async fn test_engine_assigns_uuid() {
        let ctx = Context::background();
        let table: MemoryTable<User> = MemoryTable::new();
        let user = User {
            base: PostgresModel::new(),
            email: "a@example.com".to_string(),
        };

        let stored = table.insert(&ctx, user).await.unwrap();
        assert!(stored.base.has_id());

        let found = table.find(&ctx, stored.id(), Scope::Active).await.unwrap();
        assert_eq!(found.email, "a@example.com");
    }

    #[tokio::test]
    async fn test_update_keeps_audit_fields() {
        let ctx = Context::background();
        let table: MemoryTable<User> = MemoryTable::new();
        let stored = table
            .insert(
                &ctx,
                User {
                    base: PostgresModel::new(),
                    email: "a@example.com".to_string(),
                },
            )
            .await
            .unwrap();

        let mut changed = stored.clone();
        changed.email = "b@example.com".to_string();
        let updated = table.update(&ctx, changed).await.unwrap();

        assert_eq!(updated.base.created_at(), stored.base.created_at());
        assert!(updated.base.updated_at() >= stored.base.updated_at());
        assert_eq!(
            table.find(&ctx, stored.id(), Scope::Active).await.unwrap().email,
            "b@example.com"
        );
    }

    #[tokio::test]
    async fn test_deleted_rows_hidden() {
        let ctx = Context::background();
        let table: MemoryTable<MySqlModel> = MemoryTable::new();
        let row = table.insert(&ctx, MySqlModel::new()).await.unwrap();
        table.soft_delete(&ctx, row.id()).await.unwrap();

        let err = table.update(&ctx, row.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(table.soft_delete(&ctx, row.id()).await.is_err());
        assert_eq!(table.count(&ctx, Scope::OnlyDeleted).await.unwrap(), 1);

        table.restore(&ctx, row.id()).await.unwrap();
        assert_eq!(table.list(&ctx, Scope::Active).await.unwrap().len(), 1);
    }
}
