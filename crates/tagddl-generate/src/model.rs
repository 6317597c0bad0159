use serde::{Deserialize, Serialize};

use tagddl_core::{Project, Tag};

use crate::errors::GenerationError;

/// Change the caller should apply to the model so later runs resolve the same
/// names. The engine itself never writes to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelMutation {
    /// Add a tag to the project unless one of the same kind exists.
    AssignProjectTag { tag: Tag },
}

impl ModelMutation {
    /// Apply the mutation. Returns `true` when the project changed.
    pub fn apply(&self, project: &mut Project) -> bool {
        match self {
            ModelMutation::AssignProjectTag { tag } => {
                if project.tags.iter().any(|existing| existing.kind == tag.kind) {
                    return false;
                }
                project.tags.push(tag.clone());
                true
            }
        }
    }
}

/// Summary of a generated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub schema: String,
    pub table: String,
    /// File stem of the group the table was written to.
    pub group: String,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub generated_at: String,
    pub project: String,
    pub database: Option<String>,
    pub files: Vec<String>,
    pub tables: Vec<TableReport>,
    pub warnings: u64,
    pub errors: u64,
    pub mutations: Vec<ModelMutation>,
}

impl GenerationReport {
    pub fn new(run_id: String, project: String) -> Self {
        Self {
            run_id,
            generated_at: chrono::Utc::now().to_rfc3339(),
            project,
            database: None,
            files: Vec::new(),
            tables: Vec::new(),
            warnings: 0,
            errors: 0,
            mutations: Vec::new(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, GenerationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagddl_core::TagKind;

    #[test]
    fn assign_tag_is_applied_once() {
        let mut project = Project::new("Shop");
        let mutation = ModelMutation::AssignProjectTag {
            tag: Tag::string(TagKind::Database, "shop"),
        };

        assert!(mutation.apply(&mut project));
        assert!(!mutation.apply(&mut project));
        assert_eq!(project.tags.len(), 1);
        assert_eq!(project.tags[0].value, "shop");
    }
}
