use tracing::info;

use tagddl_core::{DataModel, Node};

use crate::diagnostics::Diagnostic;
use crate::emitter::SqlWriter;
use crate::engine::GenContext;
use crate::errors::GenerationError;
use crate::naming::{is_valid_identifier, normalize_name};
use crate::output::{ArtifactWriter, PairOutcome};
use crate::tags::references;

/// Stored routine flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Function,
    Procedure,
}

impl RoutineKind {
    pub fn keyword(self) -> &'static str {
        match self {
            RoutineKind::Function => "FUNCTION",
            RoutineKind::Procedure => "PROCEDURE",
        }
    }

    /// Artifact part of the file name.
    pub fn artifact(self) -> &'static str {
        match self {
            RoutineKind::Function => "function",
            RoutineKind::Procedure => "procedure",
        }
    }

    fn marker(self, ctx: &GenContext<'_>) -> String {
        match self {
            RoutineKind::Function => ctx.options.function.clone(),
            RoutineKind::Procedure => ctx.options.procedure.clone(),
        }
    }
}

/// Rendered routines of one kind.
#[derive(Debug, Clone, Default)]
pub struct RoutineOutput {
    pub create: String,
    pub drop: String,
    pub names: Vec<String>,
}

/// `CREATE OR REPLACE` each routine referenced from the data model, body
/// verbatim, with the matching `DROP ... CASCADE` in reverse order.
pub fn render_routines(
    data_model: &DataModel,
    kind: RoutineKind,
    ctx: &mut GenContext<'_>,
) -> RoutineOutput {
    let marker = kind.marker(ctx);
    let keyword = kind.keyword();
    let mut create = SqlWriter::new(ctx.options);
    let mut drops = Vec::new();
    let mut names = Vec::new();

    for (tag, reference) in references(data_model, &marker) {
        let name = normalize_name(&reference.name);
        if !is_valid_identifier(&name) {
            ctx.report(
                Diagnostic::error(
                    "invalid_identifier",
                    format!(
                        "'{name}' is not a valid {} name",
                        kind.artifact()
                    ),
                )
                .for_element(Node::from(data_model).label()),
            );
            continue;
        }

        create.line(format!("CREATE OR REPLACE {keyword} {name}"));
        create.lines(&tag.value);
        create.blank();
        drops.push(format!("DROP {keyword} IF EXISTS {name} () CASCADE;"));
        names.push(name);
    }

    let mut drop = SqlWriter::new(ctx.options);
    for statement in drops.iter().rev() {
        drop.line(statement);
    }

    RoutineOutput {
        create: create.finish(),
        drop: drop.finish(),
        names,
    }
}

/// Write `<scope>_function_*` or `<scope>_procedure_*` when the data model
/// references at least one routine of that kind.
pub fn generate_routines(
    data_model: &DataModel,
    scope: &str,
    kind: RoutineKind,
    ctx: &mut GenContext<'_>,
    artifacts: &mut ArtifactWriter<'_>,
) -> Result<usize, GenerationError> {
    let output = render_routines(data_model, kind, ctx);
    if output.names.is_empty() {
        return Ok(0);
    }

    let stem = format!("{scope}_{}", kind.artifact());
    if artifacts.write_pair(&stem, &output.create, &output.drop)? == PairOutcome::Duplicate {
        ctx.report(
            Diagnostic::error(
                "duplicate_artifact",
                format!("{} routines not written: '{stem}' files were already generated", kind.artifact()),
            )
            .for_element(Node::from(data_model).label()),
        );
        return Ok(0);
    }
    info!(
        event = "routines_generated",
        kind = kind.artifact(),
        data_model = %data_model.name,
        count = output.names.len()
    );
    Ok(output.names.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagddl_core::{ModelIndex, Project, Tag};

    use crate::diagnostics::CollectedDiagnostics;
    use crate::options::GenerateOptions;

    #[test]
    fn renders_functions_and_reverse_drops() {
        let mut data_model = DataModel::new("Shop");
        data_model.tags.push(Tag::reference(
            "function",
            "touch_updated",
            "() RETURNS trigger AS $$\nBEGIN\n  NEW.updated_at = now();\n  RETURN NEW;\nEND;\n$$ LANGUAGE plpgsql;",
        ));
        data_model.tags.push(Tag::reference("function", "noop", "() RETURNS void AS $$ $$ LANGUAGE sql;"));
        data_model.tags.push(Tag::reference("procedure", "archive", "() LANGUAGE sql AS $$ $$;"));
        data_model.tags.push(Tag::reference("function", "bad name!", "()"));

        let project = Project::new("Shop");
        let index = ModelIndex::new(&project);
        let options = GenerateOptions::default();
        let mut diagnostics = CollectedDiagnostics::new();
        let mut ctx = GenContext {
            options: &options,
            index: &index,
            diagnostics: &mut diagnostics,
        };

        let output = render_routines(&data_model, RoutineKind::Function, &mut ctx);
        assert_eq!(output.names, vec!["touch_updated".to_string(), "noop".to_string()]);
        assert!(output.create.starts_with(
            "CREATE OR REPLACE FUNCTION touch_updated\n() RETURNS trigger AS $$\nBEGIN\n  NEW.updated_at = now();\n"
        ));
        assert_eq!(
            output.drop,
            "DROP FUNCTION IF EXISTS noop () CASCADE;\nDROP FUNCTION IF EXISTS touch_updated () CASCADE;\n"
        );

        let procedures = render_routines(&data_model, RoutineKind::Procedure, &mut ctx);
        assert_eq!(procedures.names, vec!["archive".to_string()]);
        assert_eq!(procedures.drop, "DROP PROCEDURE IF EXISTS archive () CASCADE;\n");

        assert_eq!(diagnostics.errors().len(), 1);
    }
}
