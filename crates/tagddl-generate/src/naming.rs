//! Identifier normalization and validation for generated SQL names.

use tagddl_core::{DEFAULT_SCHEMA, DataModel, Diagram, Entity, Node, TagKind};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::tags::tag_value;

/// PostgreSQL truncates identifiers beyond `NAMEDATALEN - 1` bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// A name that cannot be used as an unquoted identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentifier {
    /// Label of the offending element, e.g. `entity 'Order Item!'`.
    pub element: String,
    /// The rejected candidate name.
    pub candidate: String,
}

impl InvalidIdentifier {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(
            "invalid_identifier",
            format!(
                "'{}' is not a valid SQL identifier for {}",
                self.candidate, self.element
            ),
        )
        .for_element(self.element.clone())
    }
}

/// Spaces become underscores and the result is lower-cased.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().replace(' ', "_").to_lowercase()
}

/// True for non-empty unquoted identifiers: an ASCII letter or `_`, then
/// letters, digits or `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= MAX_IDENTIFIER_LEN
}

fn checked(candidate: String, node: Node<'_>) -> Result<String, InvalidIdentifier> {
    if is_valid_identifier(&candidate) {
        Ok(candidate)
    } else {
        Err(InvalidIdentifier {
            element: node.label(),
            candidate,
        })
    }
}

/// Override tag value when present, otherwise the normalized display name.
pub fn resolve_name<'a>(
    override_kind: TagKind,
    node: impl Into<Node<'a>>,
) -> Result<String, InvalidIdentifier> {
    let node = node.into();
    let candidate = match tag_value(override_kind, node) {
        Some(value) => value.to_string(),
        None => normalize_name(node.name()),
    };
    checked(candidate, node)
}

/// Like [`resolve_name`], reporting failures as an error diagnostic.
pub fn resolve_identifier<'a>(
    override_kind: TagKind,
    node: impl Into<Node<'a>>,
    diagnostics: &mut dyn DiagnosticSink,
) -> Option<String> {
    report(resolve_name(override_kind, node), diagnostics)
}

/// Forward a naming failure to the diagnostic sink.
pub fn report(
    result: Result<String, InvalidIdentifier>,
    diagnostics: &mut dyn DiagnosticSink,
) -> Option<String> {
    match result {
        Ok(name) => Some(name),
        Err(err) => {
            diagnostics.report(err.to_diagnostic());
            None
        }
    }
}

/// Normalized `prefix` tag of a diagram.
pub fn diagram_prefix(diagram: Option<&Diagram>) -> Option<String> {
    diagram
        .and_then(|diagram| tag_value(TagKind::Prefix, diagram))
        .map(normalize_name)
}

/// Join a prefix and a table name with a single underscore.
pub fn prefixed(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            if prefix.ends_with('_') {
                format!("{prefix}{name}")
            } else {
                format!("{prefix}_{name}")
            }
        }
        _ => name.to_string(),
    }
}

/// Unqualified table name of an entity, prefix included.
pub fn table_name(entity: &Entity, prefix: Option<&str>) -> Result<String, InvalidIdentifier> {
    let node = Node::from(entity);
    let base = match tag_value(TagKind::Table, node) {
        Some(value) => value.to_string(),
        None => normalize_name(&entity.name),
    };
    checked(prefixed(prefix, &base), node)
}

/// File name part of a data model or diagram: the normalized display name,
/// held to identifier characters so paths stay inside the output directory.
pub fn artifact_scope<'a>(node: impl Into<Node<'a>>) -> Result<String, InvalidIdentifier> {
    let node = node.into();
    checked(normalize_name(node.name()), node)
}

/// Schema of a data model, `public` when untagged.
pub fn schema_name(data_model: &DataModel) -> Result<String, InvalidIdentifier> {
    match tag_value(TagKind::Schema, data_model) {
        Some(value) => checked(value.to_string(), Node::from(data_model)),
        None => Ok(DEFAULT_SCHEMA.to_string()),
    }
}

/// Single-quoted SQL string literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
