//! The store collaborator contract.
//!
//! The reconciliation engine never talks to a database directly; it is
//! handed a [`SchemaStore`] and issues every read and mutation through it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{ClassSchema, IndexSchema, PropertySchema};

/// Raw index record as returned by [`SchemaStore::list_indexes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIndex {
    /// Index name.
    pub name: String,
    /// Index type as reported by the store.
    #[serde(rename = "type")]
    pub index_type: String,
    /// Index definition; absent on some store-internal records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<RawIndexDefinition>,
}

/// The definition part of a raw index record: the owning class plus either
/// a single field or a composite field list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIndexDefinition {
    /// Owning class name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// The indexed field of a single-field definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The ordered fields of a composite definition.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Asynchronous handle to a live schema store.
///
/// Implementations translate these calls into the store's native schema
/// commands and surface client failures through
/// [`SyncError::Store`](crate::error::SyncError::Store). The engine issues
/// the two list calls concurrently and all mutations strictly serially.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Lists all classes, each with its properties resolved.
    async fn list_classes(&self) -> Result<Vec<ClassSchema>>;

    /// Lists all indexes as raw records.
    async fn list_indexes(&self) -> Result<Vec<RawIndex>>;

    /// Creates a class, optionally under a superclass.
    async fn create_class(&self, name: &str, super_class: Option<&str>) -> Result<()>;

    /// Drops a class by name.
    async fn drop_class(&self, name: &str) -> Result<()>;

    /// Creates a single property on an existing class.
    async fn create_property(&self, class: &str, property: &PropertySchema) -> Result<()>;

    /// Creates a batch of properties on an existing class.
    ///
    /// The default implementation loops [`create_property`]; stores with a
    /// native batch call may override it.
    ///
    /// [`create_property`]: SchemaStore::create_property
    async fn create_properties(
        &self,
        class: &str,
        properties: &[PropertySchema],
    ) -> Result<()> {
        for property in properties {
            self.create_property(class, property).await?;
        }
        Ok(())
    }

    /// Drops a property from a class.
    async fn drop_property(&self, class: &str, name: &str) -> Result<()>;

    /// Creates an index.
    async fn create_index(&self, index: &IndexSchema) -> Result<()>;

    /// Drops an index by name.
    async fn drop_index(&self, name: &str) -> Result<()>;
}
