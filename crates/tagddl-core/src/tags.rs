use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declared kind of a tag attached to a model element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// Table name override on an entity.
    Table,
    /// Column name override on a column.
    Column,
    /// Schema name on a data model.
    Schema,
    /// Table name prefix on a diagram.
    Prefix,
    /// Database name on the project.
    Database,
    /// Default value expression on a column.
    Default,
    /// Comma-separated enum literals on a column.
    Enum,
    /// Composite index membership on a column.
    Index,
    /// Named SQL body (function, procedure, trigger) selected by its target marker.
    Reference,
    /// Any tag the engine does not interpret.
    #[serde(other)]
    Other,
}

/// Target of a `reference` tag: the marker it points to and the routine it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TagReference {
    /// Marker name, matched against the configured function/procedure/trigger markers.
    pub target: String,
    /// Routine or trigger name.
    pub name: String,
    /// Trigger timing and event, e.g. `BEFORE INSERT OR UPDATE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

/// A typed key/value annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Tag {
    pub kind: TagKind,
    /// Name override, index name, default expression or opaque SQL body.
    #[serde(default)]
    pub value: String,
    /// Ordering position inside a composite index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,
    /// Whether the column is sorted descending inside a composite index.
    #[serde(default, skip_serializing_if = "is_false")]
    pub descending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<TagReference>,
}

impl Tag {
    /// Simple name/value tag.
    pub fn string(kind: TagKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            sequence: None,
            descending: false,
            reference: None,
        }
    }

    /// Composite index membership.
    pub fn index(name: impl Into<String>, sequence: i64, descending: bool) -> Self {
        Self {
            kind: TagKind::Index,
            value: name.into(),
            sequence: Some(sequence),
            descending,
            reference: None,
        }
    }

    /// Reference tag carrying an opaque SQL body.
    pub fn reference(
        target: impl Into<String>,
        name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            kind: TagKind::Reference,
            value: body.into(),
            sequence: None,
            descending: false,
            reference: Some(TagReference {
                target: target.into(),
                name: name.into(),
                event: None,
            }),
        }
    }

    /// Set the trigger timing/event of a reference tag.
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        if let Some(reference) = self.reference.as_mut() {
            reference.event = Some(event.into());
        }
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
