use tracing::info;

use tagddl_core::{DataModel, Entity};

use crate::diagnostics::Diagnostic;
use crate::emitter::SqlWriter;
use crate::engine::GenContext;
use crate::errors::GenerationError;
use crate::model::TableReport;
use crate::naming::{artifact_scope, diagram_prefix};
use crate::output::{ArtifactWriter, PairOutcome};
use crate::table::{TableScope, assemble_table};

/// Statements collected while assembling tables and emitted once after the
/// last table of a group.
#[derive(Debug, Default)]
pub struct DeferredStatements {
    foreign_keys: Vec<String>,
}

impl DeferredStatements {
    pub fn push_foreign_key(&mut self, statement: String) {
        self.foreign_keys.push(statement);
    }

    pub fn len(&self) -> usize {
        self.foreign_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foreign_keys.is_empty()
    }

    /// Append every collected statement to `writer` and clear the collector.
    pub fn flush_into(&mut self, writer: &mut SqlWriter) {
        if self.foreign_keys.is_empty() {
            return;
        }
        for statement in self.foreign_keys.drain(..) {
            writer.line(statement);
        }
        writer.blank();
    }
}

/// Entities rendered into one create/drop file pair.
#[derive(Debug, Clone)]
pub struct TableGroup<'m> {
    /// File stem, `<datamodel>_table` or `<datamodel>_<diagram>`.
    pub stem: String,
    pub prefix: Option<String>,
    pub entities: &'m [Entity],
}

/// Rendered text of a group.
#[derive(Debug, Clone, Default)]
pub struct GroupOutput {
    pub create: String,
    pub drop: String,
    /// Unqualified names of the tables generated, in creation order.
    pub tables: Vec<String>,
}

/// Render every entity of the group into shared buffers. Foreign keys follow
/// all tables; drops run in reverse creation order.
pub fn render_group(group: &TableGroup<'_>, schema: &str, ctx: &mut GenContext<'_>) -> GroupOutput {
    let scope = TableScope {
        schema,
        prefix: group.prefix.as_deref(),
    };
    let mut create = SqlWriter::new(ctx.options);
    let mut deferred = DeferredStatements::default();
    let mut drops = Vec::new();
    let mut tables = Vec::new();

    for entity in group.entities {
        if let Some(ddl) = assemble_table(entity, scope, ctx, &mut deferred) {
            create.append(&ddl.create);
            drops.push(ddl.drop);
            tables.push(ddl.name);
        }
    }
    deferred.flush_into(&mut create);

    let mut drop = SqlWriter::new(ctx.options);
    for fragment in drops.iter().rev() {
        for statement in fragment {
            drop.line(statement);
        }
    }

    GroupOutput {
        create: create.finish(),
        drop: drop.finish(),
        tables,
    }
}

/// Table groups of a data model: directly owned entities first, then one
/// group per diagram. `scope` is the data model's artifact scope; diagrams
/// whose name cannot be used in a file name are reported and left out.
pub fn table_groups<'m>(
    data_model: &'m DataModel,
    scope: &str,
    ctx: &mut GenContext<'_>,
) -> Vec<TableGroup<'m>> {
    let mut groups = vec![TableGroup {
        stem: format!("{scope}_table"),
        prefix: None,
        entities: &data_model.entities,
    }];

    for diagram in &data_model.diagrams {
        match artifact_scope(diagram) {
            Ok(name) => groups.push(TableGroup {
                stem: format!("{scope}_{name}"),
                prefix: diagram_prefix(Some(diagram)),
                entities: &diagram.entities,
            }),
            Err(err) => ctx.report(err.to_diagnostic()),
        }
    }
    groups
}

/// Write the table file pairs of a data model.
pub fn generate_tables(
    data_model: &DataModel,
    scope: &str,
    schema: &str,
    ctx: &mut GenContext<'_>,
    artifacts: &mut ArtifactWriter<'_>,
) -> Result<Vec<TableReport>, GenerationError> {
    let mut reports = Vec::new();

    for group in table_groups(data_model, scope, ctx) {
        let output = render_group(&group, schema, ctx);
        let outcome = artifacts.write_pair(&group.stem, &output.create, &output.drop)?;
        if outcome == PairOutcome::Duplicate {
            ctx.report(Diagnostic::error(
                "duplicate_artifact",
                format!(
                    "tables of '{}' not written: '{}' files were already generated",
                    data_model.name, group.stem
                ),
            ));
            continue;
        }

        info!(
            event = "table_group_generated",
            group = %group.stem,
            tables = output.tables.len()
        );
        reports.extend(output.tables.into_iter().map(|table| TableReport {
            schema: schema.to_string(),
            table,
            group: group.stem.clone(),
        }));
    }

    Ok(reports)
}
