//! BaseModel - Audit fields embedded in every persisted record

use crate::id::{IdSource, RecordId};
use crate::schema::{self, ColumnDef};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use uuid::Uuid;

/// Base model for MySQL tables (`varchar(36)` id, `datetime(6)` timestamps)
pub type MySqlModel = BaseModel<String>;

/// Base model for PostgreSQL tables (`uuid` id, `timestamp(6)` timestamps)
pub type PostgresModel = BaseModel<Uuid>;

/// Columns have microsecond precision
fn to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(at.nanosecond() / 1_000 * 1_000)
        .unwrap_or(at)
}

/// Common audit fields.
///
/// The id is assigned once and never changes. `deleted_at` is `None` for
/// active rows; a soft-deleted row keeps existing with the deletion time set.
/// `deleted_at` is not part of the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "I: RecordId")]
pub struct BaseModel<I> {
    id: I,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    deleted_at: Option<DateTime<Utc>>,
}

impl<I: RecordId> Default for BaseModel<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: RecordId> BaseModel<I> {
    /// A model not yet persisted: no id, zero timestamps
    pub fn new() -> Self {
        Self {
            id: I::unassigned(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            deleted_at: None,
        }
    }

    /// Rebuild a model from stored column values
    pub fn hydrate(
        id: I,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    // ========== Getters ==========

    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn has_id(&self) -> bool {
        self.id.is_assigned()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    // ========== Lifecycle ==========

    /// Step run by the persistence layer immediately before the first insert.
    ///
    /// Application-generated variants receive a fresh id unless one was
    /// already assigned; database-generated variants keep the placeholder
    /// for the engine to fill. Both timestamps are set to `now`.
    pub fn prepare_create(&mut self, now: DateTime<Utc>) {
        if I::SOURCE == IdSource::Application && !self.has_id() {
            self.id = I::generate();
        }
        let now = to_micros(now);
        self.created_at = now;
        self.updated_at = now;
    }

    /// Set the id explicitly (e.g. the value returned by the database).
    ///
    /// Fails if an id is already set or `id` is the placeholder.
    pub fn assign_id(&mut self, id: I) -> Result<()> {
        if self.has_id() {
            return Err(Error::invalid_input(format!(
                "record id already assigned ({})",
                self.id
            )));
        }
        if !id.is_assigned() {
            return Err(Error::invalid_input("cannot assign an empty record id"));
        }
        self.id = id;
        Ok(())
    }

    /// Refresh `updated_at`; run on every update
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = to_micros(now);
    }

    /// Mark as deleted. Returns `false` if it already was; the original
    /// deletion time is kept. `created_at` is never modified.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> bool {
        if self.deleted_at.is_some() {
            return false;
        }
        self.deleted_at = Some(to_micros(now));
        true
    }

    /// Undo a soft delete
    pub fn restore(&mut self) {
        self.deleted_at = None;
    }

    // ========== Schema ==========

    /// Column definitions for this variant
    pub fn columns() -> Vec<ColumnDef> {
        schema::columns(I::DIALECT)
    }

    /// Column DDL fragment for `CREATE TABLE`
    pub fn column_ddl() -> String {
        schema::column_ddl(I::DIALECT)
    }

    /// `CREATE INDEX` statements for the audit columns of `table`
    pub fn index_ddl(table: &str) -> Vec<String> {
        schema::index_ddl(I::DIALECT, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 123_456_789).unwrap()
    }

    #[test]
    fn test_mysql_id_generated_before_create() {
        let mut model = MySqlModel::new();
        assert!(!model.has_id());

        model.prepare_create(at(0));
        assert_eq!(model.id().len(), 36);
        assert_eq!(model.created_at(), model.updated_at());
    }

    #[test]
    fn test_existing_id_is_kept() {
        let mut model = MySqlModel::new();
        model.assign_id("fixed-id".to_string()).unwrap();
        model.prepare_create(at(0));
        assert_eq!(model.id(), "fixed-id");
    }

    #[test]
    fn test_postgres_id_left_to_database() {
        let mut model = PostgresModel::new();
        model.prepare_create(at(0));
        assert!(!model.has_id());

        let id = Uuid::new_v4();
        model.assign_id(id).unwrap();
        assert_eq!(model.id(), &id);
    }

    #[test]
    fn test_id_is_immutable() {
        let mut model = PostgresModel::new();
        model.assign_id(Uuid::new_v4()).unwrap();

        let err = model.assign_id(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.kind(), shared::ErrorKind::MalformedInput);
    }

    #[test]
    fn test_microsecond_precision() {
        let mut model = MySqlModel::new();
        model.prepare_create(at(0));
        assert_eq!(model.created_at().nanosecond(), 123_456_000);
    }

    #[test]
    fn test_soft_delete_keeps_created_at() {
        let mut model = MySqlModel::new();
        model.prepare_create(at(0));
        let created = model.created_at();

        model.touch(at(10));
        assert!(model.soft_delete(at(20)));

        assert!(model.is_deleted());
        assert_eq!(model.created_at(), created);
        assert!(model.deleted_at().unwrap() > model.updated_at());

        // Second delete keeps the first timestamp
        assert!(!model.soft_delete(at(30)));
        assert_eq!(model.deleted_at(), Some(to_micros(at(20))));

        model.restore();
        assert!(!model.is_deleted());
    }

    #[test]
    fn test_json_hides_deleted_at() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let model = MySqlModel::hydrate(
            "0b5c1e9e-1d7e-4c65-9d1e-3f0a9a1b2c3d".to_string(),
            created,
            created + Duration::seconds(1),
            Some(created + Duration::seconds(2)),
        );

        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "0b5c1e9e-1d7e-4c65-9d1e-3f0a9a1b2c3d",
                "createdAt": "2024-01-02T03:04:05Z",
                "updatedAt": "2024-01-02T03:04:06Z",
            })
        );

        let back: MySqlModel = serde_json::from_value(value).unwrap();
        assert!(!back.is_deleted());
    }
}
