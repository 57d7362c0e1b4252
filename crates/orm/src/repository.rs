//! Record repository port

use crate::id::RecordId;
use crate::model::BaseModel;
use crate::scope::Scope;
use async_trait::async_trait;
use shared::{Context, Result};

/// A persisted entity embedding a [`BaseModel`]
pub trait Record: Clone + Send + Sync + 'static {
    type Id: RecordId;

    fn base(&self) -> &BaseModel<Self::Id>;

    fn base_mut(&mut self) -> &mut BaseModel<Self::Id>;

    fn id(&self) -> &Self::Id {
        self.base().id()
    }
}

impl<I: RecordId> Record for BaseModel<I> {
    type Id = I;

    fn base(&self) -> &BaseModel<I> {
        self
    }

    fn base_mut(&mut self) -> &mut BaseModel<I> {
        self
    }
}

/// Persistence of records with soft-delete semantics.
///
/// Lookups of an absent id, or of a row hidden by the scope, fail with
/// [`shared::Error::NotFound`].
#[async_trait]
pub trait RecordRepository<R: Record>: Send + Sync {
    /// Insert a new record: assign the id and creation timestamps.
    /// Returns the stored copy.
    async fn insert(&self, ctx: &Context, record: R) -> Result<R>;

    /// Replace an active record. `created_at` is kept from the stored row
    /// and `updated_at` refreshed.
    async fn update(&self, ctx: &Context, record: R) -> Result<R>;

    /// Set the deletion timestamp; the row stays retrievable with
    /// [`Scope::WithDeleted`]
    async fn soft_delete(&self, ctx: &Context, id: &R::Id) -> Result<()>;

    async fn restore(&self, ctx: &Context, id: &R::Id) -> Result<()>;

    async fn find(&self, ctx: &Context, id: &R::Id, scope: Scope) -> Result<R>;

    /// Records visible in `scope`, oldest first
    async fn list(&self, ctx: &Context, scope: Scope) -> Result<Vec<R>>;

    async fn count(&self, ctx: &Context, scope: Scope) -> Result<usize>;
}
