//! Schema reconciliation and migration planning for class/property/index
//! stores.
//!
//! `orientsync` compares a live store's schema (its classes, their
//! properties, and their indexes) against a declared target schema and
//! produces an ordered, inspectable, executable migration plan. Built-in
//! classes and reserved index names are never touched, so converging a
//! store cannot damage its internal metadata.
//!
//! # Architecture
//!
//! - **reconcile** - generic key-based diff of two collections
//! - **differ** - fetches store state and reconciles it against the target
//!   at class, property, and index granularity
//! - **plan** - ordered migration steps with `explain` (dry run) and
//!   `execute` (strictly serial apply)
//! - **store** - the asynchronous store collaborator contract
//! - **types** - the property-type alias table
//!
//! # Example
//!
//! ```rust,ignore
//! use orientsync::prelude::*;
//!
//! let target = vec![
//!     ClassSchema::new("Person")
//!         .extends("V")
//!         .property("email", "String")
//!         .index(IndexSchema::new("Person.email", "unique").property("email")),
//! ];
//!
//! let plan = plan_migration(&store, &target).await?;
//! println!("{}", plan.explain());
//! plan.execute().await?;
//! ```

pub mod differ;
pub mod error;
pub mod plan;
pub mod reconcile;
pub mod schema;
pub mod store;
pub mod types;

use differ::SchemaDiffer;
use plan::MigrationPlan;
use schema::ClassSchema;
use store::SchemaStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::differ::{diff_snapshots, ClassDiff, SchemaDiff, SchemaDiffer};
    pub use crate::error::{Result, SyncError};
    pub use crate::plan::{MigrationPlan, MigrationStep, StepAction};
    pub use crate::plan_migration;
    pub use crate::reconcile::{reconcile, reconcile_by, ListDiff};
    pub use crate::schema::{
        is_built_in_class, is_reserved_index, target_from_json, target_from_path, ClassSchema,
        IndexSchema, PropertySchema, RESERVED_INDEXES,
    };
    pub use crate::store::{RawIndex, RawIndexDefinition, SchemaStore};
    pub use crate::types::canonical_type;
}

/// Diffs the store against `target` and returns the resulting plan.
///
/// Convenience wrapper equivalent to [`SchemaDiffer::diff`] followed by
/// [`MigrationPlan::new`].
pub async fn plan_migration<'a, S: SchemaStore>(
    store: &'a S,
    target: &[ClassSchema],
) -> error::Result<MigrationPlan<'a, S>> {
    let diff = SchemaDiffer::new(store).diff(target).await?;
    Ok(MigrationPlan::new(store, diff))
}
