//! In-memory schema store backend.
//!
//! [`MemStore`] implements [`SchemaStore`] against process-local state. It
//! backs the integration tests and offline plan rehearsal: mutations behave
//! like a real store (duplicate creates and missing drops fail), and every
//! applied mutation is appended to a log so tests can assert call order.

use std::sync::Mutex;

use async_trait::async_trait;

use orientsync::error::{Result, SyncError};
use orientsync::schema::{ClassSchema, IndexSchema, PropertySchema};
use orientsync::store::{RawIndex, RawIndexDefinition, SchemaStore};

const POISONED: &str = "store state poisoned";

#[derive(Debug, Default)]
struct State {
    classes: Vec<ClassSchema>,
    indexes: Vec<RawIndex>,
    log: Vec<String>,
}

/// An in-memory [`SchemaStore`].
#[derive(Debug, Default)]
pub struct MemStore {
    state: Mutex<State>,
}

impl MemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a class without logging.
    #[must_use]
    pub fn with_class(self, class: ClassSchema) -> Self {
        self.state.lock().expect(POISONED).classes.push(class);
        self
    }

    /// Seeds a raw index record without logging.
    #[must_use]
    pub fn with_raw_index(self, index: RawIndex) -> Self {
        self.state.lock().expect(POISONED).indexes.push(index);
        self
    }

    /// Seeds an index on a class; one field yields a single-field
    /// definition, several a composite one.
    #[must_use]
    pub fn with_index(self, name: &str, index_type: &str, class: &str, fields: &[&str]) -> Self {
        self.with_raw_index(raw_index(name, index_type, Some(class), fields))
    }

    /// The mutation log, in application order.
    #[must_use]
    pub fn log(&self) -> Vec<String> {
        self.state.lock().expect(POISONED).log.clone()
    }

    /// Snapshot of the current classes.
    #[must_use]
    pub fn classes(&self) -> Vec<ClassSchema> {
        self.state.lock().expect(POISONED).classes.clone()
    }

    /// Snapshot of the current raw index records.
    #[must_use]
    pub fn indexes(&self) -> Vec<RawIndex> {
        self.state.lock().expect(POISONED).indexes.clone()
    }
}

fn raw_index(
    name: &str,
    index_type: &str,
    class: Option<&str>,
    fields: &[&str],
) -> RawIndex {
    let definition = match fields {
        [field] => RawIndexDefinition {
            class_name: class.map(str::to_string),
            field: Some((*field).to_string()),
            fields: Vec::new(),
        },
        _ => RawIndexDefinition {
            class_name: class.map(str::to_string),
            field: None,
            fields: fields.iter().map(|field| (*field).to_string()).collect(),
        },
    };
    RawIndex {
        name: name.to_string(),
        index_type: index_type.to_string(),
        definition: Some(definition),
    }
}

#[async_trait]
impl SchemaStore for MemStore {
    async fn list_classes(&self) -> Result<Vec<ClassSchema>> {
        Ok(self.state.lock().expect(POISONED).classes.clone())
    }

    async fn list_indexes(&self) -> Result<Vec<RawIndex>> {
        Ok(self.state.lock().expect(POISONED).indexes.clone())
    }

    async fn create_class(&self, name: &str, super_class: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().expect(POISONED);
        if state.classes.iter().any(|class| class.name == name) {
            return Err(SyncError::store(format!("class '{name}' already exists")));
        }
        let mut class = ClassSchema::new(name);
        if let Some(super_class) = super_class {
            class = class.extends(super_class);
        }
        state.classes.push(class);
        state.log.push(match super_class {
            Some(super_class) => format!("create_class {name} extends {super_class}"),
            None => format!("create_class {name}"),
        });
        Ok(())
    }

    async fn drop_class(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().expect(POISONED);
        let before = state.classes.len();
        state.classes.retain(|class| class.name != name);
        if state.classes.len() == before {
            return Err(SyncError::store(format!("no such class '{name}'")));
        }
        state.log.push(format!("drop_class {name}"));
        Ok(())
    }

    async fn create_property(&self, class: &str, property: &PropertySchema) -> Result<()> {
        let mut state = self.state.lock().expect(POISONED);
        let Some(entry) = state.classes.iter_mut().find(|c| c.name == class) else {
            return Err(SyncError::store(format!("no such class '{class}'")));
        };
        if entry.properties.iter().any(|p| p.name == property.name) {
            return Err(SyncError::store(format!(
                "property '{}.{}' already exists",
                class, property.name
            )));
        }
        entry.properties.push(property.clone());
        state
            .log
            .push(format!("create_property {class}.{}", property.name));
        Ok(())
    }

    async fn drop_property(&self, class: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock().expect(POISONED);
        let Some(entry) = state.classes.iter_mut().find(|c| c.name == class) else {
            return Err(SyncError::store(format!("no such class '{class}'")));
        };
        let before = entry.properties.len();
        entry.properties.retain(|p| p.name != name);
        if entry.properties.len() == before {
            return Err(SyncError::store(format!(
                "no such property '{class}.{name}'"
            )));
        }
        state.log.push(format!("drop_property {class}.{name}"));
        Ok(())
    }

    async fn create_index(&self, index: &IndexSchema) -> Result<()> {
        let mut state = self.state.lock().expect(POISONED);
        if state.indexes.iter().any(|i| i.name == index.name) {
            return Err(SyncError::store(format!(
                "index '{}' already exists",
                index.name
            )));
        }
        let fields: Vec<&str> = index.properties.iter().map(String::as_str).collect();
        state.indexes.push(raw_index(
            &index.name,
            &index.index_type,
            index.class.as_deref(),
            &fields,
        ));
        state.log.push(format!("create_index {}", index.name));
        Ok(())
    }

    async fn drop_index(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().expect(POISONED);
        let before = state.indexes.len();
        state.indexes.retain(|index| index.name != name);
        if state.indexes.len() == before {
            return Err(SyncError::store(format!("no such index '{name}'")));
        }
        state.log.push(format!("drop_index {name}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_drop_class() {
        let store = MemStore::new();
        store.create_class("Person", Some("V")).await.unwrap();
        assert_eq!(store.classes()[0].super_class.as_deref(), Some("V"));

        store.drop_class("Person").await.unwrap();
        assert!(store.classes().is_empty());
        assert_eq!(
            store.log(),
            vec!["create_class Person extends V", "drop_class Person"]
        );
    }

    #[tokio::test]
    async fn duplicate_class_create_fails() {
        let store = MemStore::new().with_class(ClassSchema::new("Person"));
        let err = store.create_class("Person", None).await.unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));
    }

    #[tokio::test]
    async fn dropping_missing_entities_fails() {
        let store = MemStore::new();
        assert!(store.drop_class("Ghost").await.is_err());
        assert!(store.drop_index("ghost_idx").await.is_err());
        assert!(store.log().is_empty());
    }

    #[tokio::test]
    async fn properties_attach_to_their_class() {
        let store = MemStore::new().with_class(ClassSchema::new("Person"));
        store
            .create_property("Person", &PropertySchema::new("age", "Integer"))
            .await
            .unwrap();

        let err = store
            .create_property("Person", &PropertySchema::new("age", "Integer"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));

        store.drop_property("Person", "age").await.unwrap();
        assert!(store.classes()[0].properties.is_empty());
    }

    #[tokio::test]
    async fn created_index_round_trips_as_raw_record() {
        let store = MemStore::new();
        store
            .create_index(
                &IndexSchema::new("Person.email", "UNIQUE")
                    .on_class("Person")
                    .property("email"),
            )
            .await
            .unwrap();

        let raw = &store.indexes()[0];
        let definition = raw.definition.as_ref().unwrap();
        assert_eq!(definition.field.as_deref(), Some("email"));
        assert_eq!(definition.class_name.as_deref(), Some("Person"));
    }

    #[tokio::test]
    async fn composite_index_keeps_field_order() {
        let store =
            MemStore::new().with_index("idx", "NOTUNIQUE", "Person", &["name", "email"]);
        let raw = store.list_indexes().await.unwrap();
        assert_eq!(
            raw[0].definition.as_ref().unwrap().fields,
            vec!["name", "email"]
        );
    }
}
