use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tags::Tag;

/// File form of a model: a document that may or may not carry a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ModelDocument {
    #[serde(default)]
    pub project: Option<Project>,
}

impl ModelDocument {
    /// Parse a model document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| Error::Other(err.to_string()))
    }
}

/// Root of the model graph.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub data_models: Vec<DataModel>,
}

/// Named grouping of diagrams; maps to one database schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub diagrams: Vec<Diagram>,
    /// Entities owned directly by the data model, outside any diagram.
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Named grouping of entities inside a data model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Diagram {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// A table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// A typed column of an entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    /// Stable identity, required only for columns targeted by `reference_to`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Abstract type name such as `VARCHAR` or `INTEGER`.
    pub data_type: String,
    /// Length or precision; `-1` on integer types requests auto-increment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<i32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub foreign_key: bool,
    /// Id of the column this one references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

fn default_nullable() -> bool {
    true
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: None,
            documentation: None,
            tags: Vec::new(),
            data_models: Vec::new(),
        }
    }
}

impl DataModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            tags: Vec::new(),
            diagrams: Vec::new(),
            entities: Vec::new(),
        }
    }
}

impl Diagram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            entities: Vec::new(),
        }
    }
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            tags: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

impl Column {
    /// Nullable column with no flags set.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            data_type: data_type.into(),
            length: None,
            nullable: true,
            primary_key: false,
            unique: false,
            foreign_key: false,
            reference_to: None,
            documentation: None,
            tags: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_length(mut self, length: i32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark as foreign key referencing the column with the given id.
    pub fn references(mut self, target_id: impl Into<String>) -> Self {
        self.foreign_key = true;
        self.reference_to = Some(target_id.into());
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

/// JSON Schema describing [`ModelDocument`].
pub fn model_json_schema() -> RootSchema {
    schemars::schema_for!(ModelDocument)
}
