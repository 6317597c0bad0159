//! Database and schema level scripts.

use std::collections::BTreeSet;

use tracing::info;

use tagddl_core::{DEFAULT_SCHEMA, Node, Project, Tag, TagKind};

use crate::emitter::SqlWriter;
use crate::engine::GenContext;
use crate::errors::GenerationError;
use crate::model::ModelMutation;
use crate::naming::{InvalidIdentifier, is_valid_identifier, normalize_name, quote_literal, schema_name};
use crate::output::ArtifactWriter;
use crate::tags::tag_value;

/// Database name of the project.
///
/// Uses the `database` tag when present. Otherwise the normalized project
/// name is chosen and returned with the mutation that records it on the
/// project, so later runs resolve the same name.
pub fn resolve_database_name(
    project: &Project,
) -> Result<(String, Option<ModelMutation>), InvalidIdentifier> {
    let (name, mutation) = match tag_value(TagKind::Database, project) {
        Some(value) => (value.to_string(), None),
        None => {
            let name = normalize_name(&project.name);
            let mutation = ModelMutation::AssignProjectTag {
                tag: Tag::string(TagKind::Database, name.clone()),
            };
            (name, Some(mutation))
        }
    };

    if is_valid_identifier(&name) {
        Ok((name, mutation))
    } else {
        Err(InvalidIdentifier {
            element: Node::from(project).label(),
            candidate: name,
        })
    }
}

/// `CREATE DATABASE` with owner, encoding, tablespace and optional locale.
pub fn render_database(project: &Project, name: &str, ctx: &GenContext<'_>) -> (String, String) {
    let options = ctx.options;
    let mut clauses = vec![
        format!("OWNER = {}", options.owner),
        format!("ENCODING = {}", quote_literal(&options.encoding)),
        format!("TABLESPACE = {}", options.tablespace),
    ];
    if options.has_collation() {
        clauses.push(format!("LC_COLLATE = {}", quote_literal(&options.collation)));
        clauses.push(format!("LC_CTYPE = {}", quote_literal(&options.collation)));
    }

    let mut create = SqlWriter::new(options);
    create.line(format!("CREATE DATABASE {name}"));
    create.indent().line("WITH");
    let last = clauses.len() - 1;
    for (idx, clause) in clauses.iter().enumerate() {
        if idx == last {
            create.line(format!("{clause};"));
        } else {
            create.line(clause);
        }
    }
    create.dedent();

    if let Some(doc) = Node::from(project).documentation() {
        create.blank();
        create.line(format!(
            "COMMENT ON DATABASE {name} IS {};",
            quote_literal(doc.trim())
        ));
    }

    let mut drop = SqlWriter::new(options);
    drop.line(format!("DROP DATABASE IF EXISTS {name};"));

    (create.finish(), drop.finish())
}

/// Write `db_create.sql` / `db_drop.sql`.
pub fn generate_database(
    project: &Project,
    name: &str,
    ctx: &GenContext<'_>,
    artifacts: &mut ArtifactWriter<'_>,
) -> Result<(), GenerationError> {
    let (create, drop) = render_database(project, name, ctx);
    artifacts.write_pair("db", &create, &drop)?;
    info!(event = "database_generated", database = %name);
    Ok(())
}

/// `CREATE SCHEMA` for every non-default schema, each name once.
///
/// An invalid schema name aborts the whole schema script; `None` is returned
/// after the error has been reported.
pub fn render_schemas(project: &Project, ctx: &mut GenContext<'_>) -> Option<(String, String)> {
    let owner = ctx.options.owner.clone();
    let mut create = SqlWriter::new(ctx.options);
    let mut drops = Vec::new();
    let mut seen = BTreeSet::new();

    for data_model in &project.data_models {
        let name = match schema_name(data_model) {
            Ok(name) => name,
            Err(err) => {
                ctx.report(err.to_diagnostic());
                return None;
            }
        };
        if name == DEFAULT_SCHEMA || !seen.insert(name.clone()) {
            continue;
        }

        create.line(format!("CREATE SCHEMA {name} AUTHORIZATION {owner};"));
        if let Some(doc) = Node::from(data_model).documentation() {
            create.line(format!(
                "COMMENT ON SCHEMA {name} IS {};",
                quote_literal(doc.trim())
            ));
        }
        create.blank();
        drops.push(format!("DROP SCHEMA IF EXISTS {name} CASCADE;"));
    }

    let mut drop = SqlWriter::new(ctx.options);
    for statement in drops.iter().rev() {
        drop.line(statement);
    }
    Some((create.finish(), drop.finish()))
}

/// Write `schema_create.sql` / `schema_drop.sql` when any schema is needed.
pub fn generate_schemas(
    project: &Project,
    ctx: &mut GenContext<'_>,
    artifacts: &mut ArtifactWriter<'_>,
) -> Result<(), GenerationError> {
    if let Some((create, drop)) = render_schemas(project, ctx) {
        artifacts.write_pair("schema", &create, &drop)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagddl_core::{DataModel, ModelIndex};

    use crate::diagnostics::CollectedDiagnostics;
    use crate::options::GenerateOptions;

    #[test]
    fn default_name_comes_with_mutation() {
        let project = Project::new("My Shop");
        let (name, mutation) = resolve_database_name(&project).expect("valid name");
        assert_eq!(name, "my_shop");
        assert_eq!(
            mutation,
            Some(ModelMutation::AssignProjectTag {
                tag: Tag::string(TagKind::Database, "my_shop"),
            })
        );

        let mut tagged = Project::new("My Shop");
        tagged.tags.push(Tag::string(TagKind::Database, "shop_db"));
        let (name, mutation) = resolve_database_name(&tagged).expect("valid name");
        assert_eq!(name, "shop_db");
        assert!(mutation.is_none());

        assert!(resolve_database_name(&Project::new("Shop #1")).is_err());
    }

    #[test]
    fn collation_adds_locale_clauses() {
        let mut project = Project::new("Shop");
        project.documentation = Some("Main store".to_string());
        let options = GenerateOptions {
            collation: "en_US.UTF-8".to_string(),
            ..GenerateOptions::default()
        };
        let index = ModelIndex::new(&project);
        let mut diagnostics = CollectedDiagnostics::new();
        let ctx = GenContext {
            options: &options,
            index: &index,
            diagnostics: &mut diagnostics,
        };

        let (create, drop) = render_database(&project, "shop", &ctx);
        assert_eq!(
            create,
            "CREATE DATABASE shop\n    WITH\n    OWNER = postgres\n    ENCODING = 'UTF8'\n    TABLESPACE = pg_default\n    LC_COLLATE = 'en_US.UTF-8'\n    LC_CTYPE = 'en_US.UTF-8';\n\nCOMMENT ON DATABASE shop IS 'Main store';\n"
        );
        assert_eq!(drop, "DROP DATABASE IF EXISTS shop;\n");
    }

    #[test]
    fn default_collation_is_omitted() {
        let project = Project::new("Shop");
        let options = GenerateOptions::default();
        let index = ModelIndex::new(&project);
        let mut diagnostics = CollectedDiagnostics::new();
        let ctx = GenContext {
            options: &options,
            index: &index,
            diagnostics: &mut diagnostics,
        };
        let (create, _) = render_database(&project, "shop", &ctx);
        assert!(!create.contains("LC_COLLATE"));
        assert!(create.ends_with("TABLESPACE = pg_default;\n"));
    }

    #[test]
    fn schemas_are_deduplicated_and_skip_public() {
        let mut project = Project::new("Shop");
        for (name, schema) in [("Sales", Some("sales")), ("Sales EU", Some("sales")), ("Core", None), ("Hr", Some("hr"))] {
            let mut data_model = DataModel::new(name);
            if let Some(schema) = schema {
                data_model.tags.push(Tag::string(TagKind::Schema, schema));
            }
            project.data_models.push(data_model);
        }
        let options = GenerateOptions::default();
        let index = ModelIndex::new(&project);
        let mut diagnostics = CollectedDiagnostics::new();
        let mut ctx = GenContext {
            options: &options,
            index: &index,
            diagnostics: &mut diagnostics,
        };

        let (create, drop) = render_schemas(&project, &mut ctx).expect("schemas rendered");
        assert_eq!(
            create,
            "CREATE SCHEMA sales AUTHORIZATION postgres;\n\nCREATE SCHEMA hr AUTHORIZATION postgres;\n\n"
        );
        assert_eq!(
            drop,
            "DROP SCHEMA IF EXISTS hr CASCADE;\nDROP SCHEMA IF EXISTS sales CASCADE;\n"
        );
    }

    #[test]
    fn invalid_schema_aborts_schema_script() {
        let mut project = Project::new("Shop");
        let mut data_model = DataModel::new("Sales");
        data_model.tags.push(Tag::string(TagKind::Schema, "sales eu"));
        project.data_models.push(data_model);

        let options = GenerateOptions::default();
        let index = ModelIndex::new(&project);
        let mut diagnostics = CollectedDiagnostics::new();
        let mut ctx = GenContext {
            options: &options,
            index: &index,
            diagnostics: &mut diagnostics,
        };
        assert!(render_schemas(&project, &mut ctx).is_none());
        assert_eq!(diagnostics.errors().len(), 1);
    }
}
