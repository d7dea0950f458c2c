//! Schema descriptor types.
//!
//! These types describe classes, their properties, and their indexes. The
//! same shapes cover both the current state read back from a store and the
//! declared target document, which is plain JSON:
//!
//! ```json
//! [
//!   {
//!     "name": "Person",
//!     "superClass": "V",
//!     "properties": [{"name": "email", "type": "String"}],
//!     "indexes": [{"name": "Person.email", "type": "unique", "properties": ["email"]}]
//!   }
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A named, typed property of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Property name.
    pub name: String,
    /// Property type: a canonical name, or a raw numeric store code.
    #[serde(rename = "type")]
    pub property_type: String,
}

impl PropertySchema {
    /// Creates a new property.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: property_type.into(),
        }
    }
}

/// A named index over one or more properties of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Index name.
    pub name: String,
    /// Index type (e.g. `UNIQUE`, `NOTUNIQUE`); compared case-insensitively.
    #[serde(rename = "type")]
    pub index_type: String,
    /// Owning class. Target documents leave this unset; the differ stamps
    /// it from the declaring class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Ordered list of indexed property names.
    #[serde(default)]
    pub properties: Vec<String>,
}

impl IndexSchema {
    /// Creates a new index with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>, index_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index_type: index_type.into(),
            class: None,
            properties: Vec::new(),
        }
    }

    /// Sets the owning class.
    #[must_use]
    pub fn on_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Appends an indexed property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(name.into());
        self
    }
}

/// A class with its properties and declared indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchema {
    /// Class name.
    pub name: String,
    /// Optional superclass.
    #[serde(
        rename = "superClass",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub super_class: Option<String>,
    /// Property definitions.
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
    /// Index declarations.
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
}

impl ClassSchema {
    /// Creates a new class with no properties or indexes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: None,
            properties: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Sets the superclass.
    #[must_use]
    pub fn extends(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    /// Appends a property.
    #[must_use]
    pub fn property(
        mut self,
        name: impl Into<String>,
        property_type: impl Into<String>,
    ) -> Self {
        self.properties.push(PropertySchema::new(name, property_type));
        self
    }

    /// Appends an index declaration.
    #[must_use]
    pub fn index(mut self, index: IndexSchema) -> Self {
        self.indexes.push(index);
        self
    }
}

/// Index names owned by the store's internal metadata, never touched.
pub const RESERVED_INDEXES: [&str; 4] =
    ["OFunction.name", "dictionary", "ORole.name", "OUser.name"];

/// Returns true for classes owned by the store's internal metadata.
///
/// `V`, `E`, and any name starting with `_` or `O` are never considered
/// for deletion, regardless of target content.
#[must_use]
pub fn is_built_in_class(name: &str) -> bool {
    name == "V" || name == "E" || name.starts_with('_') || name.starts_with('O')
}

/// Returns true for index names owned by the store's internal metadata.
#[must_use]
pub fn is_reserved_index(name: &str) -> bool {
    RESERVED_INDEXES.contains(&name)
}

/// Parses a target schema document from a JSON string.
pub fn target_from_json(json: &str) -> Result<Vec<ClassSchema>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads a target schema document from a JSON file.
pub fn target_from_path(path: impl AsRef<Path>) -> Result<Vec<ClassSchema>> {
    target_from_json(&std::fs::read_to_string(path)?)
}
