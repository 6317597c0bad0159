use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::index::ModelIndex;
use crate::model::Project;
use crate::node::{Node, NodeKind};

/// Non-fatal inconsistency found in a model graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelIssue {
    pub code: String,
    pub element: String,
    pub message: String,
}

impl ModelIssue {
    fn new(code: &str, element: String, message: String) -> Self {
        Self {
            code: code.to_string(),
            element,
            message,
        }
    }
}

/// Check internal consistency of a project.
///
/// This checks:
/// - duplicate column ids
/// - `reference_to` links pointing at unknown ids
/// - columns without a data type
pub fn validate_model(project: &Project) -> Vec<ModelIssue> {
    let index = ModelIndex::new(project);
    let mut issues = Vec::new();
    let mut seen_ids = BTreeSet::new();

    let mut stack = vec![Node::from(project)];
    while let Some(node) = stack.pop() {
        if let Node::Column(column) = node {
            if let Some(id) = column.id.as_deref() {
                if !seen_ids.insert(id) {
                    issues.push(ModelIssue::new(
                        "duplicate_column_id",
                        node.label(),
                        format!("column id '{id}' is used more than once"),
                    ));
                }
            }

            if let Some(target) = column.reference_to.as_deref() {
                if index.locate(target).is_none() {
                    issues.push(ModelIssue::new(
                        "dangling_reference",
                        node.label(),
                        format!("referenced column id '{target}' not found"),
                    ));
                }
            }

            if column.data_type.trim().is_empty() {
                issues.push(ModelIssue::new(
                    "missing_data_type",
                    node.label(),
                    "column has no data type".to_string(),
                ));
            }
        }

        if node.kind() != NodeKind::Column {
            let mut children = node.children();
            children.reverse();
            stack.extend(children);
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, DataModel, Entity};

    #[test]
    fn reports_duplicate_ids_and_dangling_references() {
        let entity = Entity::new("orders")
            .with_column(Column::new("id", "INTEGER").with_id("orders.id"))
            .with_column(Column::new("copy", "INTEGER").with_id("orders.id"))
            .with_column(Column::new("user_id", "INTEGER").references("users.id"))
            .with_column(Column::new("blank", " "));
        let mut data_model = DataModel::new("shop");
        data_model.entities.push(entity);
        let mut project = Project::new("Shop");
        project.data_models.push(data_model);

        let codes: Vec<String> = validate_model(&project)
            .into_iter()
            .map(|issue| issue.code)
            .collect();
        assert_eq!(
            codes,
            vec![
                "duplicate_column_id".to_string(),
                "dangling_reference".to_string(),
                "missing_data_type".to_string(),
            ]
        );
    }

    #[test]
    fn consistent_model_has_no_issues() {
        let users = Entity::new("users").with_column(Column::new("id", "INTEGER").with_id("u.id"));
        let orders = Entity::new("orders").with_column(Column::new("user_id", "INTEGER").references("u.id"));
        let mut data_model = DataModel::new("shop");
        data_model.entities.extend([users, orders]);
        let mut project = Project::new("Shop");
        project.data_models.push(data_model);

        assert!(validate_model(&project).is_empty());
    }
}
