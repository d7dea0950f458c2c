//! Schema differ.
//!
//! Fetches the store's current classes and indexes, normalizes them, and
//! reconciles them against the declared target schema at class, property,
//! and index granularity. Everything after the two store reads is pure
//! computation over immutable snapshots.

use futures::try_join;

use crate::error::{Result, SyncError};
use crate::reconcile::{reconcile_by, ListDiff};
use crate::schema::{
    is_built_in_class, is_reserved_index, ClassSchema, IndexSchema, PropertySchema,
};
use crate::store::{RawIndex, SchemaStore};
use crate::types::canonical_type;

/// Property reconciliation key: name plus canonical type.
fn property_key(property: &PropertySchema) -> (String, String) {
    (
        property.name.clone(),
        canonical_type(&property.property_type).to_string(),
    )
}

/// Index reconciliation key: name, upper-cased type, owning class, and the
/// ordered property list.
fn index_key(index: &IndexSchema) -> (String, String, Option<String>, Vec<String>) {
    (
        index.name.clone(),
        index.index_type.to_uppercase(),
        index.class.clone(),
        index.properties.clone(),
    )
}

/// Property diff for a class present on both sides.
#[derive(Debug, Clone)]
pub struct ClassDiff {
    /// Class name.
    pub name: String,
    /// The current class descriptor, as read from the store.
    pub current: ClassSchema,
    /// Property reconciliation: `left` = only in the store, `right` = only
    /// in the target.
    pub properties: ListDiff<PropertySchema>,
}

/// Aggregate result of reconciling a store against a target schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    /// Classes declared in the target but absent from the store.
    pub new_classes: Vec<ClassSchema>,
    /// Store classes absent from the target, built-ins excluded.
    pub extra_classes: Vec<ClassSchema>,
    /// Classes present on both sides, with their property diffs.
    pub existing_classes: Vec<ClassDiff>,
    /// Indexes declared in the target but absent from the store.
    pub new_indexes: Vec<IndexSchema>,
    /// Store indexes absent from the target, reserved names excluded.
    pub extra_indexes: Vec<IndexSchema>,
    /// Indexes present on both sides, as (current, target) pairs.
    pub existing_indexes: Vec<(IndexSchema, IndexSchema)>,
}

impl SchemaDiff {
    /// Returns true if the store already matches the target.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.new_classes.is_empty()
            && self.extra_classes.is_empty()
            && self.new_indexes.is_empty()
            && self.extra_indexes.is_empty()
            && self
                .existing_classes
                .iter()
                .all(|class| class.properties.is_unchanged())
    }
}

/// Diffs a live store against a target schema.
#[derive(Debug)]
pub struct SchemaDiffer<'a, S: SchemaStore> {
    store: &'a S,
}

impl<'a, S: SchemaStore> SchemaDiffer<'a, S> {
    /// Creates a differ over the given store handle.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetches the current schema and reconciles it against `target`.
    ///
    /// The two schema reads are issued concurrently and joined before any
    /// comparison; a failure of either read aborts the diff.
    pub async fn diff(&self, target: &[ClassSchema]) -> Result<SchemaDiff> {
        let (classes, indexes) =
            try_join!(self.store.list_classes(), self.store.list_indexes())?;
        diff_snapshots(classes, indexes, target)
    }
}

/// Reconciles already-fetched snapshots against a target schema.
///
/// Exposed for hosts that hold a recorded snapshot and want a diff without
/// a live store.
pub fn diff_snapshots(
    existing_classes: Vec<ClassSchema>,
    existing_indexes: Vec<RawIndex>,
    target: &[ClassSchema],
) -> Result<SchemaDiff> {
    validate_target(target)?;

    let existing_indexes: Vec<IndexSchema> = existing_indexes
        .into_iter()
        .filter(|raw| !is_reserved_index(&raw.name))
        .map(normalize_index)
        .collect();
    let target_indexes = flatten_target_indexes(target);

    let class_diff = reconcile_by(&existing_classes, target, |class| class.name.clone());
    let index_diff = reconcile_by(&existing_indexes, &target_indexes, index_key);

    let existing_classes = class_diff
        .common
        .into_iter()
        .map(|(current, declared)| ClassDiff {
            name: current.name.clone(),
            properties: reconcile_by(&current.properties, &declared.properties, property_key),
            current,
        })
        .collect();

    Ok(SchemaDiff {
        new_classes: class_diff.right,
        extra_classes: class_diff
            .left
            .into_iter()
            .filter(|class| !is_built_in_class(&class.name))
            .collect(),
        existing_classes,
        new_indexes: index_diff.right,
        extra_indexes: index_diff.left,
        existing_indexes: index_diff.common,
    })
}

/// Normalizes a raw store index record into an [`IndexSchema`].
///
/// Single-field definitions yield a one-element property list; composite
/// definitions yield the ordered field list.
fn normalize_index(raw: RawIndex) -> IndexSchema {
    let definition = raw.definition.unwrap_or_default();
    let properties = match definition.field {
        Some(field) => vec![field],
        None => definition.fields,
    };
    IndexSchema {
        name: raw.name,
        index_type: raw.index_type,
        class: definition.class_name,
        properties,
    }
}

/// Flattens per-class target index declarations into a single list,
/// stamping each with its owning class and upper-casing the type.
fn flatten_target_indexes(target: &[ClassSchema]) -> Vec<IndexSchema> {
    target
        .iter()
        .flat_map(|class| {
            class.indexes.iter().map(|index| IndexSchema {
                name: index.name.clone(),
                index_type: index.index_type.to_uppercase(),
                class: Some(class.name.clone()),
                properties: index.properties.clone(),
            })
        })
        .collect()
}

/// Rejects target schemas whose reconciliation keys are not unique.
fn validate_target(target: &[ClassSchema]) -> Result<()> {
    let mut class_names: Vec<&str> = Vec::new();
    for class in target {
        if class_names.contains(&class.name.as_str()) {
            return Err(SyncError::DuplicateSchemaEntry {
                kind: "class",
                key: class.name.clone(),
            });
        }
        class_names.push(&class.name);

        let mut property_keys = Vec::new();
        for property in &class.properties {
            let key = property_key(property);
            if property_keys.contains(&key) {
                return Err(SyncError::DuplicateSchemaEntry {
                    kind: "property",
                    key: format!("{}.{}", class.name, property.name),
                });
            }
            property_keys.push(key);
        }
    }

    let mut index_keys = Vec::new();
    for index in flatten_target_indexes(target) {
        let key = index_key(&index);
        if index_keys.contains(&key) {
            return Err(SyncError::DuplicateSchemaEntry {
                kind: "index",
                key: index.name,
            });
        }
        index_keys.push(key);
    }

    Ok(())
}
