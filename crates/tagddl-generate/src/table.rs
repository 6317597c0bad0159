//! CREATE TABLE assembly for a single entity.
//!
//! Column types are resolved once into a side table of [`ResolvedColumn`]s;
//! enum materialization rewrites the type there instead of touching the
//! model. Foreign key constraints are not emitted inline: they go to the
//! caller's [`DeferredStatements`] so they can follow every table of the
//! group.

use tracing::debug;

use tagddl_core::{Column, Entity, Node, TagKind};

use crate::assemble::DeferredStatements;
use crate::diagnostics::Diagnostic;
use crate::emitter::SqlWriter;
use crate::engine::GenContext;
use crate::naming::{self, is_valid_identifier, normalize_name, quote_literal};
use crate::options::DocumentationMode;
use crate::tags::{references, tag_value, tags_by_value};
use crate::types::{ENUM_TYPE, data_type, is_auto_increment};

/// Timing and event used when a trigger reference does not name one.
pub const DEFAULT_TRIGGER_EVENT: &str = "BEFORE INSERT OR UPDATE";

/// Schema and diagram prefix shared by the tables of one group.
#[derive(Debug, Clone, Copy)]
pub struct TableScope<'s> {
    pub schema: &'s str,
    pub prefix: Option<&'s str>,
}

/// Enum type generated for a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    /// Schema-qualified type name, `schema.table_column`.
    pub name: String,
    pub labels: Vec<String>,
}

/// Derived view of a column: its SQL name and effective type.
#[derive(Debug, Clone)]
pub struct ResolvedColumn<'m> {
    pub column: &'m Column,
    /// `None` when the column name is invalid; such columns are skipped.
    pub name: Option<String>,
    pub sql_type: String,
    pub enum_type: Option<EnumType>,
}

/// Output of one entity.
#[derive(Debug, Clone)]
pub struct TableDdl {
    pub name: String,
    pub qualified: String,
    pub create: String,
    /// `DROP TABLE` first, then the enum `DROP TYPE`s.
    pub drop: Vec<String>,
}

/// Resolve names and types of every column of `entity`.
pub fn resolve_columns<'m>(
    entity: &'m Entity,
    table: &str,
    schema: &str,
    ctx: &mut GenContext<'_>,
) -> Vec<ResolvedColumn<'m>> {
    entity
        .columns
        .iter()
        .map(|column| {
            let name = naming::resolve_identifier(TagKind::Column, column, &mut *ctx.diagnostics);
            let mut sql_type = data_type(column);
            let mut enum_type = None;

            if sql_type == ENUM_TYPE {
                if let Some(column_name) = name.as_deref() {
                    enum_type = materialize_enum(column, table, column_name, schema, ctx);
                }
                if let Some(generated) = &enum_type {
                    sql_type = generated.name.clone();
                }
            }

            ResolvedColumn {
                column,
                name,
                sql_type,
                enum_type,
            }
        })
        .collect()
}

fn materialize_enum(
    column: &Column,
    table: &str,
    column_name: &str,
    schema: &str,
    ctx: &mut GenContext<'_>,
) -> Option<EnumType> {
    let labels: Vec<String> = tag_value(TagKind::Enum, column)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if labels.is_empty() {
        ctx.report(
            Diagnostic::warning(
                "enum_without_values",
                format!("enum column '{table}.{column_name}' has no enum values"),
            )
            .for_element(Node::from(column).label()),
        );
        return None;
    }

    let type_name = format!("{table}_{column_name}");
    if !is_valid_identifier(&type_name) {
        ctx.report(
            Diagnostic::error(
                "invalid_identifier",
                format!("'{type_name}' is not a valid enum type name"),
            )
            .for_element(Node::from(column).label()),
        );
        return None;
    }

    Some(EnumType {
        name: format!("{schema}.{type_name}"),
        labels,
    })
}

/// Assemble the DDL of one entity. Returns `None` when the table name is
/// invalid; the error has been reported and nothing is emitted.
pub fn assemble_table(
    entity: &Entity,
    scope: TableScope<'_>,
    ctx: &mut GenContext<'_>,
    deferred: &mut DeferredStatements,
) -> Option<TableDdl> {
    let table = naming::report(
        naming::table_name(entity, scope.prefix),
        &mut *ctx.diagnostics,
    )?;
    let qualified = format!("{}.{}", scope.schema, table);
    let columns = resolve_columns(entity, &table, scope.schema, ctx);

    let mut writer = SqlWriter::new(ctx.options);
    let mut drop_types = Vec::new();

    for enum_type in columns.iter().filter_map(|column| column.enum_type.as_ref()) {
        let labels: Vec<String> = enum_type
            .labels
            .iter()
            .map(|label| quote_literal(label))
            .collect();
        writer.line(format!(
            "CREATE TYPE {} AS ENUM ({});",
            enum_type.name,
            labels.join(", ")
        ));
        writer.line(format!(
            "CREATE CAST (character varying AS {}) WITH INOUT AS IMPLICIT;",
            enum_type.name
        ));
        drop_types.push(format!("DROP TYPE IF EXISTS {} CASCADE;", enum_type.name));
    }
    if !drop_types.is_empty() {
        writer.blank();
    }

    let mut entries = Vec::new();
    let mut primary_key = Vec::new();
    let mut unique = Vec::new();
    let mut fk_indexes = Vec::new();
    let mut column_comments = Vec::new();

    for resolved in &columns {
        let Some(name) = resolved.name.as_deref() else {
            continue;
        };
        let column = resolved.column;
        entries.push(column_line(name, resolved));

        if column.primary_key {
            primary_key.push(name);
        }
        if column.unique {
            unique.push(name);
        }
        if column.foreign_key && !column.primary_key {
            fk_indexes.push(name);
        }
        if let Some(doc) = Node::from(column).documentation() {
            column_comments.push((name, doc));
        }
        if let Some(target) = column.reference_to.as_deref() {
            if ctx.options.foreign_key_constraint {
                match foreign_key_statement(&table, &qualified, name, target, ctx) {
                    Some(statement) => deferred.push_foreign_key(statement),
                    None => ctx.report(
                        Diagnostic::warning(
                            "unresolved_reference",
                            format!(
                                "foreign key target '{target}' of '{table}.{name}' cannot be resolved"
                            ),
                        )
                        .for_element(Node::from(column).label()),
                    ),
                }
            }
        }
    }

    if !primary_key.is_empty() {
        entries.push(format!("PRIMARY KEY ({})", primary_key.join(", ")));
    }

    writer.line(format!("CREATE TABLE {qualified} ("));
    writer.indent();
    let last = entries.len().saturating_sub(1);
    for (idx, entry) in entries.iter().enumerate() {
        if idx < last {
            writer.line(format!("{entry},"));
        } else {
            writer.line(entry);
        }
    }
    writer.dedent();
    writer.line(");");

    for name in &unique {
        writer.line(format!("ALTER TABLE {qualified} ADD UNIQUE ({name});"));
    }
    for name in &fk_indexes {
        writer.line(format!("CREATE INDEX ON {qualified} ({name});"));
    }
    for members in composite_indexes(&columns, ctx) {
        writer.line(format!("CREATE INDEX ON {qualified} ({});", members.join(", ")));
    }

    let mode = ctx.options.documentation_mode();
    if mode == DocumentationMode::Comment {
        if let Some(doc) = Node::from(entity).documentation() {
            writer.line(format!(
                "COMMENT ON TABLE {qualified} IS {};",
                quote_literal(doc.trim())
            ));
        }
    }
    for (name, doc) in &column_comments {
        writer.line(format!(
            "COMMENT ON COLUMN {qualified}.{name} IS {};",
            quote_literal(doc.trim())
        ));
    }

    emit_triggers(entity, &table, &qualified, ctx, &mut writer);

    if mode == DocumentationMode::SeedRows {
        emit_seed_rows(entity, &columns, &qualified, ctx, &mut writer);
    }
    writer.blank();

    let mut drop = vec![format!("DROP TABLE IF EXISTS {qualified} CASCADE;")];
    drop.extend(drop_types);

    debug!(table = %qualified, columns = columns.len(), "table assembled");
    ctx.report(
        Diagnostic::info(
            "table_generated",
            format!("table DDL generated for {qualified}"),
        )
        .for_element(Node::from(entity).label()),
    );

    Some(TableDdl {
        name: table,
        qualified,
        create: writer.finish(),
        drop,
    })
}

/// `name type [NOT NULL] [DEFAULT value]`. Serial detection looks at the
/// mapped type, not at a generated enum type name.
fn column_line(name: &str, resolved: &ResolvedColumn<'_>) -> String {
    let column = resolved.column;
    let mut line = format!("{name} {}", resolved.sql_type);
    if column.primary_key || !column.nullable {
        line.push_str(" NOT NULL");
    }
    if !is_auto_increment(&data_type(column)) {
        if let Some(default) = tag_value(TagKind::Default, column) {
            line.push_str(" DEFAULT ");
            line.push_str(default);
        }
    }
    line
}

/// Resolve the referenced column against its own entity, diagram prefix and
/// data model schema.
fn foreign_key_statement(
    table: &str,
    qualified: &str,
    column: &str,
    target_id: &str,
    ctx: &GenContext<'_>,
) -> Option<String> {
    let target = ctx.index.resolve(target_id)?;
    let ref_schema = naming::schema_name(target.data_model).ok()?;
    let ref_prefix = naming::diagram_prefix(target.diagram);
    let ref_table = naming::table_name(target.entity, ref_prefix.as_deref()).ok()?;
    let ref_column = naming::resolve_name(TagKind::Column, target.column).ok()?;

    Some(format!(
        "ALTER TABLE {qualified} ADD CONSTRAINT FK_{table}__{column} FOREIGN KEY ({column}) \
         REFERENCES {ref_schema}.{ref_table}({ref_column});"
    ))
}

/// Column lists of the composite indexes, in first-appearance order of the
/// index names. Members are ordered by sequence, ties keep declaration order.
fn composite_indexes(columns: &[ResolvedColumn<'_>], ctx: &mut GenContext<'_>) -> Vec<Vec<String>> {
    let mut groups: Vec<(String, Vec<(i64, String)>)> = Vec::new();

    for resolved in columns {
        let Some(name) = resolved.name.as_deref() else {
            continue;
        };
        for tag in tags_by_value(TagKind::Index, resolved.column) {
            let index_name = tag.value.trim();
            if index_name.is_empty() {
                ctx.report(
                    Diagnostic::warning("unnamed_index", format!("index tag on '{name}' has no name"))
                        .for_element(Node::from(resolved.column).label()),
                );
                continue;
            }

            let member = if tag.descending {
                format!("{name} DESC")
            } else {
                name.to_string()
            };
            let sequence = tag.sequence.unwrap_or(0);

            match groups.iter_mut().find(|(group, _)| group == index_name) {
                Some((_, members)) => members.push((sequence, member)),
                None => groups.push((index_name.to_string(), vec![(sequence, member)])),
            }
        }
    }

    groups
        .into_iter()
        .map(|(_, mut members)| {
            members.sort_by_key(|(sequence, _)| *sequence);
            members.into_iter().map(|(_, member)| member).collect()
        })
        .collect()
}

fn emit_triggers(
    entity: &Entity,
    table: &str,
    qualified: &str,
    ctx: &mut GenContext<'_>,
    writer: &mut SqlWriter,
) {
    let marker = ctx.options.trigger.clone();
    for (tag, reference) in references(entity, &marker) {
        let trigger = format!("{table}_{}", normalize_name(&reference.name));
        if !is_valid_identifier(&trigger) {
            ctx.report(
                Diagnostic::error(
                    "invalid_identifier",
                    format!("'{trigger}' is not a valid trigger name"),
                )
                .for_element(Node::from(entity).label()),
            );
            continue;
        }

        let event = reference
            .event
            .as_deref()
            .map(str::trim)
            .filter(|event| !event.is_empty())
            .unwrap_or(DEFAULT_TRIGGER_EVENT);
        writer.line(format!("CREATE TRIGGER {trigger} {event} ON {qualified}"));
        writer.lines(&tag.value);
    }
}

/// One `INSERT` per non-blank documentation line; fields map to columns by
/// position and empty or missing fields become `NULL`.
fn emit_seed_rows(
    entity: &Entity,
    columns: &[ResolvedColumn<'_>],
    qualified: &str,
    ctx: &mut GenContext<'_>,
    writer: &mut SqlWriter,
) {
    let Some(doc) = Node::from(entity).documentation() else {
        return;
    };
    let names: Vec<&str> = columns
        .iter()
        .filter_map(|column| column.name.as_deref())
        .collect();
    if names.is_empty() {
        return;
    }

    for (line_no, line) in doc.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() > columns.len() {
            ctx.report(
                Diagnostic::warning(
                    "seed_row_overflow",
                    format!(
                        "seed row {} of {qualified} has {} fields for {} columns; extra fields ignored",
                        line_no + 1,
                        fields.len(),
                        columns.len()
                    ),
                )
                .for_element(Node::from(entity).label()),
            );
        }

        let values: Vec<String> = columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.name.is_some())
            .map(|(idx, _)| seed_value(fields.get(idx).copied()))
            .collect();
        writer.line(format!(
            "INSERT INTO {qualified} ({}) VALUES ({});",
            names.join(", "),
            values.join(", ")
        ));
    }
}

fn seed_value(field: Option<&str>) -> String {
    match field.map(str::trim) {
        Some(value) if !value.is_empty() && !value.eq_ignore_ascii_case("null") => {
            quote_literal(value)
        }
        _ => "NULL".to_string(),
    }
}
