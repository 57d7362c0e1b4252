//! # groundwork orm
//!
//! Base record for relational persistence: uuid primary key, audit
//! timestamps and soft deletion, parameterized over the identifier
//! representation.
//!
//! | Variant            | Id type  | Column type   | Id assigned by |
//! |--------------------|----------|---------------|----------------|
//! | [`MySqlModel`]     | `String` | `varchar(36)` | application    |
//! | [`PostgresModel`]  | `Uuid`   | `uuid`        | database       |
//!
//! ```ignore
//! #[derive(Clone)]
//! struct User {
//!     base: MySqlModel,
//!     email: String,
//! }
//!
//! impl Record for User {
//!     type Id = String;
//!     fn base(&self) -> &MySqlModel { &self.base }
//!     fn base_mut(&mut self) -> &mut MySqlModel { &mut self.base }
//! }
//! ```

pub mod id;
pub mod model;
pub mod repository;
pub mod schema;
pub mod scope;

pub use id::{Dialect, IdSource, RecordId};
pub use model::{BaseModel, MySqlModel, PostgresModel};
pub use repository::{Record, RecordRepository};
pub use schema::ColumnDef;
pub use scope::Scope;
