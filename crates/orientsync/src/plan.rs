//! Migration planning and execution.
//!
//! Turns a [`SchemaDiff`] into an ordered list of described steps, with a
//! dry-run surface ([`MigrationPlan::explain`]) and strictly serial
//! application ([`MigrationPlan::execute`]).

use tracing::{error, info};

use crate::differ::SchemaDiff;
use crate::error::Result;
use crate::schema::{ClassSchema, IndexSchema, PropertySchema};
use crate::store::SchemaStore;
use crate::types::canonical_type;

/// A single executable mutation against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Drop an index by name.
    DropIndex {
        /// Index name.
        name: String,
    },
    /// Drop a class by name.
    DropClass {
        /// Class name.
        name: String,
    },
    /// Create a class with its superclass and declared properties.
    CreateClass {
        /// The class to create.
        class: ClassSchema,
    },
    /// Drop a property from an existing class.
    DropProperty {
        /// Owning class name.
        class: String,
        /// The property to drop.
        property: PropertySchema,
    },
    /// Create a property on an existing class.
    CreateProperty {
        /// Owning class name.
        class: String,
        /// The property to create.
        property: PropertySchema,
    },
    /// Create an index.
    CreateIndex {
        /// The index to create.
        index: IndexSchema,
    },
}

impl StepAction {
    /// Human-readable description, as rendered by `explain`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::DropIndex { name } => format!("Delete index {name}"),
            Self::DropClass { name } => format!("Delete class {name}."),
            Self::CreateClass { class } => {
                let mut description = format!("Create class {}", class.name);
                if let Some(super_class) = &class.super_class {
                    description.push_str(&format!(", with superClass {super_class}"));
                }
                if !class.properties.is_empty() {
                    let properties = class
                        .properties
                        .iter()
                        .map(|p| format!("{} {}", p.property_type, p.name))
                        .collect::<Vec<_>>()
                        .join(", ");
                    description.push_str(&format!(", with properties: {properties}"));
                }
                description.push('.');
                description
            }
            Self::DropProperty { class, property } => format!(
                "Delete property {} {} from {class}.",
                canonical_type(&property.property_type),
                property.name
            ),
            Self::CreateProperty { class, property } => format!(
                "Create property {} {} on {class}.",
                property.property_type, property.name
            ),
            Self::CreateIndex { index } => format!(
                "Create index {} ({}) {}",
                index.name,
                index.properties.join(", "),
                index.index_type
            ),
        }
    }

    /// Applies this action against the store.
    async fn apply<S: SchemaStore>(&self, store: &S) -> Result<()> {
        match self {
            Self::DropIndex { name } => store.drop_index(name).await,
            Self::DropClass { name } => store.drop_class(name).await,
            Self::CreateClass { class } => {
                store
                    .create_class(&class.name, class.super_class.as_deref())
                    .await?;
                if !class.properties.is_empty() {
                    // Absorbed: a failed property create never aborts the
                    // step once the class itself exists.
                    if let Err(err) =
                        store.create_properties(&class.name, &class.properties).await
                    {
                        error!(class = %class.name, error = %err, "property creation failed");
                    }
                }
                Ok(())
            }
            Self::DropProperty { class, property } => {
                store.drop_property(class, &property.name).await
            }
            Self::CreateProperty { class, property } => {
                store.create_property(class, property).await
            }
            Self::CreateIndex { index } => store.create_index(index).await,
        }
    }
}

/// A described, independently executable mutation.
#[derive(Debug, Clone)]
pub struct MigrationStep {
    /// One-line description for dry-run review.
    pub description: String,
    /// The mutation to apply.
    pub action: StepAction,
}

impl MigrationStep {
    /// Creates a step, deriving its description from the action.
    #[must_use]
    pub fn new(action: StepAction) -> Self {
        Self {
            description: action.describe(),
            action,
        }
    }
}

/// An ordered, immutable migration plan bound to a store handle.
///
/// `explain` may be called any number of times; `execute` is not idempotent
/// against a real store, so a new plan must be computed after every
/// execution.
#[derive(Debug)]
pub struct MigrationPlan<'a, S: SchemaStore> {
    store: &'a S,
    diff: SchemaDiff,
    steps: Vec<MigrationStep>,
}

impl<'a, S: SchemaStore> MigrationPlan<'a, S> {
    /// Builds the ordered step list from a diff.
    ///
    /// Steps come in five fixed phases: index drops, class drops, class
    /// creates, property drops then property creates, index creates. Index
    /// drops precede class drops because indexes can reference classes;
    /// index creates come last so every referenced class and property
    /// exists. The order is structural, never inferred per entity.
    #[must_use]
    pub fn new(store: &'a S, diff: SchemaDiff) -> Self {
        let mut steps = Vec::new();

        for index in &diff.extra_indexes {
            steps.push(MigrationStep::new(StepAction::DropIndex {
                name: index.name.clone(),
            }));
        }
        for class in &diff.extra_classes {
            steps.push(MigrationStep::new(StepAction::DropClass {
                name: class.name.clone(),
            }));
        }
        for class in &diff.new_classes {
            steps.push(MigrationStep::new(StepAction::CreateClass {
                class: class.clone(),
            }));
        }
        for class in &diff.existing_classes {
            for property in &class.properties.left {
                steps.push(MigrationStep::new(StepAction::DropProperty {
                    class: class.name.clone(),
                    property: property.clone(),
                }));
            }
        }
        for class in &diff.existing_classes {
            for property in &class.properties.right {
                steps.push(MigrationStep::new(StepAction::CreateProperty {
                    class: class.name.clone(),
                    property: property.clone(),
                }));
            }
        }
        for index in &diff.new_indexes {
            steps.push(MigrationStep::new(StepAction::CreateIndex {
                index: index.clone(),
            }));
        }

        Self { store, diff, steps }
    }

    /// The diff this plan was built from.
    #[must_use]
    pub fn diff(&self) -> &SchemaDiff {
        &self.diff
    }

    /// The ordered steps.
    #[must_use]
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Returns true if there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Renders the plan, one step description per line, in plan order.
    #[must_use]
    pub fn explain(&self) -> String {
        self.steps
            .iter()
            .map(|step| step.description.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Applies the steps strictly in order.
    ///
    /// Each step starts only after the previous one completed. The first
    /// failing step aborts the remainder; already-applied steps are not
    /// undone, so the store may be left partially migrated.
    pub async fn execute(&self) -> Result<()> {
        for step in &self.steps {
            info!(step = %step.description, "executing");
            step.action.apply(self.store).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::differ::diff_snapshots;
    use crate::error::SyncError;
    use crate::store::{RawIndex, RawIndexDefinition};

    /// Store mock that records calls in order and can fail on one of them.
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl RecordingStore {
        fn failing_on(call: &str) -> Self {
            Self {
                calls: Mutex::default(),
                fail_on: Some(call.to_string()),
            }
        }

        fn record(&self, call: String) -> Result<()> {
            if self.fail_on.as_deref() == Some(call.as_str()) {
                return Err(SyncError::store(format!("injected failure: {call}")));
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SchemaStore for RecordingStore {
        async fn list_classes(&self) -> Result<Vec<ClassSchema>> {
            Ok(Vec::new())
        }

        async fn list_indexes(&self) -> Result<Vec<RawIndex>> {
            Ok(Vec::new())
        }

        async fn create_class(&self, name: &str, super_class: Option<&str>) -> Result<()> {
            self.record(match super_class {
                Some(super_class) => format!("create_class {name} extends {super_class}"),
                None => format!("create_class {name}"),
            })
        }

        async fn drop_class(&self, name: &str) -> Result<()> {
            self.record(format!("drop_class {name}"))
        }

        async fn create_property(&self, class: &str, property: &PropertySchema) -> Result<()> {
            self.record(format!("create_property {class}.{}", property.name))
        }

        async fn drop_property(&self, class: &str, name: &str) -> Result<()> {
            self.record(format!("drop_property {class}.{name}"))
        }

        async fn create_index(&self, index: &IndexSchema) -> Result<()> {
            self.record(format!("create_index {}", index.name))
        }

        async fn drop_index(&self, name: &str) -> Result<()> {
            self.record(format!("drop_index {name}"))
        }
    }

    fn mixed_diff() -> SchemaDiff {
        let existing = vec![
            ClassSchema::new("Stale"),
            ClassSchema::new("Person")
                .property("age", "Integer")
                .property("nick", "String"),
        ];
        let existing_indexes = vec![RawIndex {
            name: "stale_idx".to_string(),
            index_type: "UNIQUE".to_string(),
            definition: Some(RawIndexDefinition {
                class_name: Some("Stale".to_string()),
                field: Some("email".to_string()),
                fields: Vec::new(),
            }),
        }];
        let target = vec![
            ClassSchema::new("Person")
                .property("age", "Integer")
                .property("email", "String"),
            ClassSchema::new("Pet")
                .extends("V")
                .property("name", "String")
                .index(IndexSchema::new("idx_pet_name", "notunique").property("name")),
        ];
        diff_snapshots(existing, existing_indexes, &target).unwrap()
    }

    #[test]
    fn phases_appear_in_fixed_order() {
        let store = RecordingStore::default();
        let plan = MigrationPlan::new(&store, mixed_diff());

        let descriptions: Vec<_> = plan
            .steps()
            .iter()
            .map(|step| step.description.clone())
            .collect();
        assert_eq!(
            descriptions,
            vec![
                "Delete index stale_idx",
                "Delete class Stale.",
                "Create class Pet, with superClass V, with properties: String name.",
                "Delete property String nick from Person.",
                "Create property String email on Person.",
                "Create index idx_pet_name (name) NOTUNIQUE",
            ]
        );
    }

    #[test]
    fn explain_has_one_line_per_step() {
        let store = RecordingStore::default();
        let plan = MigrationPlan::new(&store, mixed_diff());

        let explained: Vec<_> = plan.explain().lines().map(str::to_string).collect();
        assert_eq!(explained.len(), plan.len());
        for (line, step) in explained.iter().zip(plan.steps()) {
            assert_eq!(line, &step.description);
        }
    }

    #[test]
    fn empty_diff_yields_empty_plan() {
        let store = RecordingStore::default();
        let plan = MigrationPlan::new(&store, SchemaDiff::default());
        assert!(plan.is_empty());
        assert_eq!(plan.explain(), "");
    }

    #[test]
    fn scenario_new_class_then_new_property() {
        let existing = vec![ClassSchema::new("Person").property("age", "Integer")];
        let target = vec![
            ClassSchema::new("Person")
                .property("age", "Integer")
                .property("email", "String"),
            ClassSchema::new("Pet"),
        ];
        let diff = diff_snapshots(existing, Vec::new(), &target).unwrap();

        let store = RecordingStore::default();
        let plan = MigrationPlan::new(&store, diff);
        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.explain(),
            "Create class Pet.\nCreate property String email on Person."
        );
    }

    #[test]
    fn drop_property_description_resolves_type_codes() {
        let action = StepAction::DropProperty {
            class: "Person".to_string(),
            property: PropertySchema::new("age", "1"),
        };
        assert_eq!(action.describe(), "Delete property Integer age from Person.");
    }

    #[tokio::test]
    async fn execute_applies_steps_in_plan_order() {
        let store = RecordingStore::default();
        let plan = MigrationPlan::new(&store, mixed_diff());
        plan.execute().await.unwrap();

        assert_eq!(
            store.calls(),
            vec![
                "drop_index stale_idx",
                "drop_class Stale",
                "create_class Pet extends V",
                "create_property Pet.name",
                "drop_property Person.nick",
                "create_property Person.email",
                "create_index idx_pet_name",
            ]
        );
    }

    #[tokio::test]
    async fn failing_step_stops_execution() {
        let store = RecordingStore::failing_on("drop_class Stale");
        let plan = MigrationPlan::new(&store, mixed_diff());

        let err = plan.execute().await.unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));
        // Only the step before the failure ran; nothing after it did.
        assert_eq!(store.calls(), vec!["drop_index stale_idx"]);
    }

    #[tokio::test]
    async fn property_failure_inside_class_create_is_absorbed() {
        let store = RecordingStore::failing_on("create_property Pet.name");
        let plan = MigrationPlan::new(&store, mixed_diff());

        plan.execute().await.unwrap();
        // The class itself and every later step still went through.
        let calls = store.calls();
        assert!(calls.contains(&"create_class Pet extends V".to_string()));
        assert!(calls.contains(&"create_index idx_pet_name".to_string()));
        assert!(!calls.contains(&"create_property Pet.name".to_string()));
    }
}
